use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use faculty_runtime::migrations::{load_migrations_from_dir, MigrationRunner};
use faculty_runtime::Database;

use super::load_config;

/// Manage database migrations.
#[derive(Parser)]
pub struct MigrateCommand {
    #[command(subcommand)]
    pub action: MigrateAction,

    /// Configuration file path.
    #[arg(short, long, default_value = "faculty.toml", global = true)]
    pub config: String,

    /// Directory of additional SQL migrations.
    #[arg(short, long, default_value = "migrations", global = true)]
    pub migrations_dir: String,
}

#[derive(Subcommand)]
pub enum MigrateAction {
    /// Apply all pending migrations.
    Up,

    /// Show applied and pending migrations.
    Status,
}

impl MigrateCommand {
    pub async fn execute(self) -> Result<()> {
        let config = load_config(&self.config)?;

        let db = Database::from_config(&config.database).await?;
        let runner = MigrationRunner::new(db.primary().clone());
        let available = load_migrations_from_dir(Path::new(&self.migrations_dir))?;

        println!();
        match self.action {
            MigrateAction::Up => {
                println!("  {} Running pending migrations...", style("→").dim());
                let applied = runner.run(available).await?;
                if applied.is_empty() {
                    println!("  {} Database is up to date", style("ℹ").blue());
                } else {
                    for name in &applied {
                        println!("  {} Applied: {}", style("✓").green(), name);
                    }
                }
            }

            MigrateAction::Status => {
                let applied = runner.applied_migrations().await?;
                let pending = runner.pending_migrations(&available).await?;

                if applied.is_empty() && pending.is_empty() {
                    println!("  {} No migrations found", style("ℹ").blue());
                }
                if !applied.is_empty() {
                    println!("  {} Applied:", style("✓").green());
                    for m in &applied {
                        println!(
                            "      {} {}",
                            m.name,
                            style(m.applied_at.format("%Y-%m-%d %H:%M:%S")).dim()
                        );
                    }
                }
                if !pending.is_empty() {
                    println!("  {} Pending:", style("○").yellow());
                    for name in &pending {
                        println!("      {}", name);
                    }
                }
            }
        }
        println!();

        db.close().await;
        Ok(())
    }
}
