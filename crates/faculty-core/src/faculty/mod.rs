//! Faculty records, drafts and the workflow they move through.

mod filter;
pub mod input;
mod record;
mod report;
mod status;
mod submission;

pub use filter::{FacultyFilter, ListField, TextField};
pub use record::{
    CourseHandled, Education, FacultyDraft, FacultyProfile, FacultyRecord, FacultyView,
    Publication, DEFAULT_EMPLOYMENT_STATUS,
};
pub use report::{
    entries_by_period, sessions_by_period, EntryBucket, ReportPeriod, SessionBucket, REPORT_YEARS,
};
pub use status::{FacultyType, WorkflowStatus};
pub use submission::{generate_staffid, FacultySubmission, ValidSubmission};
