//! Testing utilities.
//!
//! Workflow and HTTP tests run against [`MemoryFacultyStore`]. Store tests
//! that need real SQL use [`TestDatabase`], which only connects when a test
//! database is configured explicitly.

pub mod db;
pub mod memory;

pub use db::{IsolatedTestDb, TestDatabase};
pub use memory::MemoryFacultyStore;

use serde_json::{json, Value};

/// A complete, valid faculty form payload.
pub fn sample_submission(name: &str, mobile_number: &str) -> Value {
    json!({
        "name": name,
        "mobileNumber": mobile_number,
        "facultyType": "internal",
        "designation": "Instructor",
        "department": "Electronics",
        "joined": "2026-03-14",
        "majorDomains": ["Radar"],
        "modulesHandled": ["M1"],
        "coursesHandled": [{"courseName": "Signals"}],
        "publications": []
    })
}
