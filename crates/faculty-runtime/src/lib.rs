pub mod db;
pub mod gateway;
pub mod migrations;
pub mod storage;
pub mod store;
pub mod workflow;

pub use db::Database;
pub use gateway::{ApiError, ApiResponse, AppState, GatewayServer};
pub use migrations::{Migration, MigrationRunner};
pub use storage::PhotoStorage;
pub use store::PgFacultyStore;
pub use workflow::{FacultyService, SaveOutcome};
