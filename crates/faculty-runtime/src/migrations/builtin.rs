//! Built-in schema migrations.
//!
//! These create the tables the faculty store reads and writes. They are
//! applied once and tracked in `faculty_migrations`.

use super::runner::Migration;

const FACULTY_RECORDS_SQL: &str = include_str!("../../migrations/0001_faculty_records.sql");

/// Get all built-in migrations, in the order they must be applied.
pub fn get_builtin_migrations() -> Vec<Migration> {
    vec![Migration::new("0001_faculty_records", FACULTY_RECORDS_SQL)]
}
