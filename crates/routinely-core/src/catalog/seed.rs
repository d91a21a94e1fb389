//! Built-in routine list.
//!
//! This is the only fallback dataset: it is served whenever the remote
//! catalog cannot be used.

use super::entry::{Category, RoutineCatalogEntry};

pub fn fallback_routines() -> Vec<RoutineCatalogEntry> {
    vec![
        RoutineCatalogEntry::new(1, "Morning coffee", "Enjoy a fragrant cup of coffee", Category::Wellness)
            .with_image("/img/98fd940d-ad9b-4e4e-bd6d-0da9f913eb39.jpg"),
        RoutineCatalogEntry::new(2, "Walk", "Take a walk in the fresh air", Category::Health)
            .with_image("/img/4199bbc4-eada-4e3a-886a-5eef208549c2.jpg"),
        RoutineCatalogEntry::new(3, "Tidy up", "Put the house in order", Category::Productivity)
            .with_image("/img/f84e1606-90bd-4fbe-9887-68fbc1a19a7b.jpg"),
        RoutineCatalogEntry::new(4, "Meditation", "A few minutes of mindfulness", Category::Wellness)
            .with_image("/img/4ec3a5d7-5270-45cb-88a1-32f7a28f2a75.jpg"),
        RoutineCatalogEntry::new(5, "Reading", "Read an interesting book", Category::Productivity)
            .with_image("/img/b2a913a3-aae0-4a82-b9dc-530c418b6978.jpg"),
        RoutineCatalogEntry::new(6, "Exercise", "Light physical exercise", Category::Health)
            .with_image("/img/4b0f574c-0359-41d3-a20a-886bd6712be3.jpg"),
        RoutineCatalogEntry::new(7, "Call family", "Talk with your loved ones", Category::Social)
            .with_emoji("📞"),
        RoutineCatalogEntry::new(8, "Plan the day", "Make a plan for tomorrow", Category::Productivity)
            .with_emoji("📋"),
        RoutineCatalogEntry::new(9, "Healthy breakfast", "Wholesome food in the morning", Category::Health)
            .with_emoji("🥗"),
        RoutineCatalogEntry::new(10, "Gratitude", "Reflect on the good things today", Category::Wellness)
            .with_emoji("🙏"),
    ]
}
