mod config;
pub mod database;
pub mod memory;

pub use config::{ApiConfig, Config, DisplayConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::StorageError;

/// String-valued key-value storage that survives process restarts.
///
/// The session store reads and writes through this trait so tests can run
/// against [`MemoryStore`] instead of the on-disk [`Database`].
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/routinely[-dev]/` based on ROUTINELY_ENV.
///
/// Set ROUTINELY_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ROUTINELY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("routinely-dev")
    } else {
        base_dir.join("routinely")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
