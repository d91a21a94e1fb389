use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "routinely", version, about = "Routinely habit tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, sign up, sign out
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Password reset
    Reset {
        #[command(subcommand)]
        action: commands::reset::ResetAction,
    },
    /// Routine library
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Interactive session
    Shell {
        /// Starting viewport width in pixels (defaults to display.viewport_width)
        #[arg(long)]
        width: Option<u32>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ROUTINELY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Auth { action } => commands::auth::run(action).await,
        Commands::Reset { action } => commands::reset::run(action).await,
        Commands::Catalog { action } => commands::catalog::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Shell { width } => commands::shell::run(width).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
