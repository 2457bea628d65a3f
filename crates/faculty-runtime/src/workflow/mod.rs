//! Faculty workflow service.
//!
//! Every status change is a conditional store update on the status the
//! record was loaded in. When another request moved the record first the
//! update matches nothing and the operation fails with a conflict.

mod approval;
mod drafts;
mod intake;
mod notify;
mod query;

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use faculty_core::error::{FacultyError, Result};
use faculty_core::faculty::{FacultyRecord, WorkflowStatus};
use faculty_core::store::{FacultyStore, Transition};

pub use intake::SaveOutcome;
pub use query::ConfirmedUpdate;

pub(crate) const FACULTY_NOT_FOUND: &str = "Faculty not found";

/// Pending and confirmed records: the ones reachable by id for edits,
/// lookups and deletes.
const ACTIVE_STATUSES: &[WorkflowStatus] = &[
    WorkflowStatus::Pending,
    WorkflowStatus::Verified,
    WorkflowStatus::Confirmed,
];

/// Workflow operations over a [`FacultyStore`].
#[derive(Clone)]
pub struct FacultyService {
    store: Arc<dyn FacultyStore>,
}

impl FacultyService {
    pub fn new(store: Arc<dyn FacultyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn FacultyStore> {
        &self.store
    }

    /// Load a record if its status is one of `statuses`.
    async fn find_in(&self, id: Uuid, statuses: &[WorkflowStatus]) -> Result<FacultyRecord> {
        self.store
            .get(id)
            .await?
            .filter(|r| statuses.contains(&r.workflow_status))
            .ok_or_else(|| FacultyError::not_found(FACULTY_NOT_FOUND))
    }

    /// Apply a transition to a loaded record.
    async fn advance(&self, record: &FacultyRecord, transition: Transition) -> Result<FacultyRecord> {
        let from = record.workflow_status;
        let to = transition.to;
        if !from.can_transition_to(to) {
            return Err(FacultyError::Internal(format!(
                "illegal workflow transition {} -> {}",
                from, to
            )));
        }

        let moved = self
            .store
            .transition(record.id, from, transition)
            .await?
            .ok_or_else(concurrent_change)?;

        info!(faculty_id = %record.id, %from, %to, "Faculty workflow transition");
        Ok(moved)
    }
}

pub(crate) fn concurrent_change() -> FacultyError {
    FacultyError::Conflict("Faculty record was changed by another request, reload and retry".into())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use faculty_core::faculty::{FacultySubmission, ValidSubmission};
    use faculty_core::testing::{sample_submission, MemoryFacultyStore};

    use super::FacultyService;

    pub fn service() -> (FacultyService, Arc<MemoryFacultyStore>) {
        let store = Arc::new(MemoryFacultyStore::new());
        (FacultyService::new(store.clone()), store)
    }

    pub fn submission(name: &str, mobile: &str) -> ValidSubmission {
        FacultySubmission::from_value(sample_submission(name, mobile))
            .and_then(FacultySubmission::validate)
            .expect("sample submission is valid")
    }
}
