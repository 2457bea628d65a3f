mod migrate;
mod run;

pub use migrate::MigrateCommand;
pub use run::RunCommand;

use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};

use faculty_core::config::FacultyConfig;

/// Faculty records service.
#[derive(Parser)]
#[command(name = "faculty")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server.
    Run(RunCommand),

    /// Manage database migrations.
    Migrate(MigrateCommand),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run(cmd) => cmd.execute().await,
            Commands::Migrate(cmd) => cmd.execute().await,
        }
    }
}

/// Load `.env`, then the config file. Without a config file, fall back to
/// defaults around `DATABASE_URL`.
pub(crate) fn load_config(path: &str) -> Result<FacultyConfig> {
    dotenvy::dotenv().ok();

    if Path::new(path).exists() {
        return Ok(FacultyConfig::from_file(path)?);
    }

    match std::env::var("DATABASE_URL") {
        Ok(url) => Ok(FacultyConfig::default_with_database_url(&url)),
        Err(_) => anyhow::bail!(
            "Configuration file not found: {}\nCreate it or set DATABASE_URL.",
            path
        ),
    }
}
