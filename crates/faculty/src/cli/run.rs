use anyhow::Result;
use clap::Parser;
use console::style;
use tracing::info;

use faculty::{logging, FacultyServer};

use super::load_config;

/// Run the faculty server.
#[derive(Parser)]
pub struct RunCommand {
    /// Configuration file path.
    #[arg(short, long, default_value = "faculty.toml")]
    pub config: String,

    /// Port to listen on (overrides config).
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    pub host: Option<String>,

    /// Directory of additional SQL migrations.
    #[arg(short, long, default_value = "migrations")]
    pub migrations_dir: String,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RunCommand {
    /// Execute the run command.
    pub async fn execute(self) -> Result<()> {
        let mut config = load_config(&self.config)?;
        logging::init(&config.observability, self.verbose)?;

        if let Some(port) = self.port {
            config.gateway.port = port;
        }
        if let Some(host) = self.host {
            config.gateway.host = host;
        }

        println!();
        println!(
            "  {} v{}",
            style("Faculty").bold().cyan(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "  {} Listening on {}",
            style("→").dim(),
            style(format!("http://{}:{}", config.gateway.host, config.gateway.port)).cyan()
        );
        println!(
            "  {} Uploads in {}",
            style("→").dim(),
            config.storage.upload_dir.display()
        );
        println!();

        info!("Loaded configuration from {}", self.config);

        let server = FacultyServer::builder()
            .config(config)
            .migrations_dir(&self.migrations_dir)
            .build()?;

        server.run().await?;

        println!("\n  {} Stopped", style("✓").green());
        Ok(())
    }
}
