pub mod config;
pub mod error;
pub mod faculty;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::FacultyConfig;
pub use error::{FacultyError, Result};
pub use faculty::{
    FacultyDraft, FacultyFilter, FacultyProfile, FacultyRecord, FacultySubmission, FacultyType,
    FacultyView, WorkflowStatus,
};
pub use store::{FacultyStore, RecordOrder, RecordQuery, StoreFuture, Transition};
