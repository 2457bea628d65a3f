use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::broadcast;

use faculty_core::config::FacultyConfig;
use faculty_core::error::{FacultyError, Result};
use faculty_runtime::db::Database;
use faculty_runtime::gateway::{AppState, GatewayServer};
use faculty_runtime::migrations::{load_migrations_from_dir, Migration, MigrationRunner};
use faculty_runtime::storage::PhotoStorage;
use faculty_runtime::store::PgFacultyStore;
use faculty_runtime::workflow::FacultyService;

/// The assembled faculty service: database, migrations and HTTP gateway.
pub struct FacultyServer {
    config: FacultyConfig,
    migrations_dir: PathBuf,
    extra_migrations: Vec<Migration>,
    shutdown_tx: broadcast::Sender<()>,
}

impl FacultyServer {
    pub fn builder() -> FacultyServerBuilder {
        FacultyServerBuilder::new()
    }

    pub fn config(&self) -> &FacultyConfig {
        &self.config
    }

    /// Connect, migrate and serve until a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        tracing::info!("Faculty service starting");

        let db = Database::from_config(&self.config.database).await?;
        let pool = db.primary().clone();
        tracing::info!("Connected to database");

        let mut migrations = load_migrations_from_dir(&self.migrations_dir)?;
        migrations.extend(self.extra_migrations.clone());
        let applied = MigrationRunner::new(pool.clone()).run(migrations).await?;
        tracing::info!(applied = applied.len(), "Migrations completed");

        let photos = PhotoStorage::from_config(&self.config.storage);
        tokio::fs::create_dir_all(photos.dir()).await?;

        let service = FacultyService::new(Arc::new(PgFacultyStore::new(pool)));
        let gateway = GatewayServer::new(self.config.gateway.clone(), AppState::new(service, photos));

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let shutdown = async move {
            tokio::select! {
                _ = shutdown_signal() => {
                    tracing::info!("Received shutdown signal");
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Received shutdown notification");
                }
            }
        };

        let result = gateway.run(shutdown).await;

        db.close().await;
        tracing::info!("Faculty service stopped");
        result
    }

    /// Request shutdown.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// A handle that can request shutdown after `run` has taken the server.
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Builder for [`FacultyServer`].
pub struct FacultyServerBuilder {
    config: Option<FacultyConfig>,
    migrations_dir: PathBuf,
    extra_migrations: Vec<Migration>,
}

impl FacultyServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            migrations_dir: PathBuf::from("migrations"),
            extra_migrations: Vec::new(),
        }
    }

    /// Directory of additional `.sql` migrations, `./migrations` by default.
    pub fn migrations_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.migrations_dir = path.into();
        self
    }

    /// Add a migration programmatically.
    pub fn migration(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.extra_migrations.push(Migration::new(name, sql));
        self
    }

    pub fn config(mut self, config: FacultyConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<FacultyServer> {
        let config = self
            .config
            .ok_or_else(|| FacultyError::Config("Configuration is required".to_string()))?;

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(FacultyServer {
            config,
            migrations_dir: self.migrations_dir,
            extra_migrations: self.extra_migrations,
            shutdown_tx,
        })
    }
}

impl Default for FacultyServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
