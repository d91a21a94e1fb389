use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable integer identifier shared by catalog entries and tracked habits.
pub type RoutineId = i64;

/// Fixed set of routine categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wellness,
    Health,
    Productivity,
    Social,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Wellness,
        Category::Health,
        Category::Productivity,
        Category::Social,
    ];

    /// Emoji shown when an entry has no override.
    pub fn emoji(&self) -> &'static str {
        match self {
            Category::Wellness => "✨",
            Category::Health => "💪",
            Category::Productivity => "📋",
            Category::Social => "💬",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Wellness => "wellness",
            Category::Health => "health",
            Category::Productivity => "productivity",
            Category::Social => "social",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wellness" => Ok(Category::Wellness),
            "health" => Ok(Category::Health),
            "productivity" => Ok(Category::Productivity),
            "social" => Ok(Category::Social),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// A routine the user can choose to track. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineCatalogEntry {
    pub id: RoutineId,
    pub title: String,
    pub description: String,
    /// The service sends `""` for "no image".
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,
    pub category: Category,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub emoji: Option<String>,
}

impl RoutineCatalogEntry {
    pub fn new(id: RoutineId, title: &str, description: &str, category: Category) -> Self {
        Self {
            id,
            title: title.to_string(),
            description: description.to_string(),
            image: None,
            category,
            emoji: None,
        }
    }

    pub fn with_image(mut self, image: &str) -> Self {
        self.image = Some(image.to_string());
        self
    }

    pub fn with_emoji(mut self, emoji: &str) -> Self {
        self.emoji = Some(emoji.to_string());
        self
    }

    /// Override emoji if present, otherwise the category emoji.
    pub fn display_emoji(&self) -> &str {
        self.emoji.as_deref().unwrap_or_else(|| self.category.emoji())
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}
