//! Intersul - command-line console for the field-service API
//!
//! Main entry point for the Intersul CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::Style;

mod commands;

use commands::{auth, catalog, clients, services, stats, theme, users};
use intersul_console::ConsoleError;

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// Intersul - field-service console
#[derive(Parser)]
#[command(name = "intersul")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API URL (default: http://localhost:3000)
    #[arg(long, global = true, env = "INTERSUL_API_URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in to the API
    Login(auth::LoginArgs),

    /// Forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Client management
    Clients(clients::ClientsArgs),

    /// Copy-machine catalog
    Catalog(catalog::CatalogArgs),

    /// Service orders
    Services(services::ServicesArgs),

    /// User management
    Users(users::UsersArgs),

    /// Light/dark theme preference
    Theme(theme::ThemeArgs),

    /// Dashboard statistics
    Stats,
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "intersul=debug,intersul_console=debug,intersul_client=debug,intersul_query=debug,intersul_session=debug,info"
    } else {
        "intersul=warn,intersul_console=warn,intersul_client=warn,intersul_session=warn,error"
    };

    let log_dir = intersul_config::xdg_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "intersul.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "intersul=trace,intersul_console=trace,intersul_client=trace,intersul_query=trace,intersul_session=trace,info",
                )),
        )
        .init();

    let ctx = commands::Context::load(cli.server, cli.json, cli.verbose)?;

    let result = match cli.command {
        Commands::Login(args) => auth::login(args, &ctx).await,
        Commands::Logout => auth::logout(&ctx).await,
        Commands::Whoami => auth::whoami(&ctx).await,
        Commands::Clients(args) => clients::run(args, &ctx).await,
        Commands::Catalog(args) => catalog::run(args, &ctx).await,
        Commands::Services(args) => services::run(args, &ctx).await,
        Commands::Users(args) => users::run(args, &ctx).await,
        Commands::Theme(args) => theme::run(args, &ctx).await,
        Commands::Stats => stats::run(&ctx).await,
    };

    ctx.app.teardown().await;

    if let Err(e) = result {
        match e.downcast_ref::<ConsoleError>() {
            Some(err) => commands::report(err, &ctx),
            None => {
                let red = Style::new().red();
                eprintln!("{} {:#}", red.apply_to("Error:"), e);
            }
        }
        drop(_guard);
        std::process::exit(1);
    }

    Ok(())
}
