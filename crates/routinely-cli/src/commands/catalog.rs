use clap::Subcommand;
use routinely_core::{catalog, CatalogSource};

use super::{CmdResult, Context};
use crate::render;

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List the routine library
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(action: CatalogAction) -> CmdResult {
    let ctx = Context::load()?;
    match action {
        CatalogAction::List { json } => {
            let catalog = catalog::load_catalog(&ctx.api).await;
            if json {
                let out = serde_json::json!({
                    "source": catalog.source(),
                    "habits": catalog.entries(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                if catalog.source() == CatalogSource::Fallback {
                    println!("{}", render::FALLBACK_NOTICE);
                }
                for entry in catalog.entries() {
                    println!("{}", render::catalog_line(entry, false));
                }
            }
        }
    }
    Ok(())
}
