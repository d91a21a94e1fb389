pub mod auth;
pub mod catalog;
pub mod config;
pub mod reset;
pub mod shell;

use routinely_core::{ApiClient, App, Config, Database};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Configuration plus the client built from it.
pub struct Context {
    pub config: Config,
    pub api: ApiClient,
}

impl Context {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load()?;
        let api = ApiClient::from_config(&config.api)?;
        Ok(Self { config, api })
    }

    /// App over the on-disk store, hydrated from the persisted session.
    pub fn open_app(&self, width: Option<u32>) -> routinely_core::Result<App<Database>> {
        let db = Database::open()?;
        let display = &self.config.display;
        Ok(App::new(
            db,
            width.unwrap_or(display.viewport_width),
            display.mobile_breakpoint,
        ))
    }
}
