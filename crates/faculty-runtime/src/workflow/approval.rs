use uuid::Uuid;

use faculty_core::error::{FacultyError, Result};
use faculty_core::faculty::{FacultyRecord, WorkflowStatus};
use faculty_core::store::{RecordOrder, RecordQuery, Transition};

use super::FacultyService;

/// Remarks stored when a rejection carries none.
pub const DEFAULT_REJECTION_REMARKS: &str = "No remarks provided";

/// Rejected listings return at most this many records.
pub const REJECTED_LIST_LIMIT: i64 = 10;

fn rejection_remarks(remarks: Option<String>) -> String {
    remarks
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| DEFAULT_REJECTION_REMARKS.to_string())
}

impl FacultyService {
    /// Mark a pending record as verified. Already verified records are
    /// returned as they are.
    pub async fn verify(&self, id: Uuid) -> Result<FacultyRecord> {
        let record = self.find_in(id, WorkflowStatus::PENDING).await?;
        if record.workflow_status == WorkflowStatus::Verified {
            return Ok(record);
        }
        self.advance(&record, Transition::to(WorkflowStatus::Verified))
            .await
    }

    /// Move a verified record to confirmed.
    pub async fn approve(&self, id: Uuid) -> Result<FacultyRecord> {
        let record = self.find_in(id, WorkflowStatus::PENDING).await?;
        if record.workflow_status != WorkflowStatus::Verified {
            return Err(FacultyError::validation(
                "Faculty must be verified before approval",
            ));
        }
        self.advance(&record, Transition::to(WorkflowStatus::Confirmed))
            .await
    }

    pub async fn reject_verification(
        &self,
        id: Uuid,
        remarks: Option<String>,
    ) -> Result<FacultyRecord> {
        let record = self.find_in(id, WorkflowStatus::PENDING).await?;
        self.advance(
            &record,
            Transition::to(WorkflowStatus::RejectedVerification)
                .with_rejection_remarks(rejection_remarks(remarks)),
        )
        .await
    }

    pub async fn reject_approval(
        &self,
        id: Uuid,
        remarks: Option<String>,
    ) -> Result<FacultyRecord> {
        let record = self.find_in(id, WorkflowStatus::PENDING).await?;
        if record.workflow_status != WorkflowStatus::Verified {
            return Err(FacultyError::validation(
                "Faculty must be verified before rejection",
            ));
        }
        self.advance(
            &record,
            Transition::to(WorkflowStatus::RejectedApproval)
                .with_rejection_remarks(rejection_remarks(remarks)),
        )
        .await
    }

    /// Verified records waiting for approval, oldest first.
    pub async fn list_pending_approval(&self) -> Result<Vec<FacultyRecord>> {
        self.store
            .list(RecordQuery::with_statuses(&[WorkflowStatus::Verified]))
            .await
    }

    /// Most recently rejected at the approval step.
    pub async fn list_rejected_approvals(&self) -> Result<Vec<FacultyRecord>> {
        self.list_rejected(WorkflowStatus::RejectedApproval).await
    }

    /// Most recently rejected at the verification step.
    pub async fn list_rejected_verifications(&self) -> Result<Vec<FacultyRecord>> {
        self.list_rejected(WorkflowStatus::RejectedVerification)
            .await
    }

    async fn list_rejected(&self, status: WorkflowStatus) -> Result<Vec<FacultyRecord>> {
        self.store
            .list(
                RecordQuery::with_statuses(&[status])
                    .order(RecordOrder::UpdatedDesc)
                    .limit(REJECTED_LIST_LIMIT),
            )
            .await
    }
}
