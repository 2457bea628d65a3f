//! Faculty records service.
//!
//! Intake, verification, approval and notification of faculty records
//! behind a REST API backed by PostgreSQL.

pub mod logging;
mod runtime;

pub use faculty_core;
pub use faculty_runtime::migrations::Migration;

pub use runtime::{FacultyServer, FacultyServerBuilder};
