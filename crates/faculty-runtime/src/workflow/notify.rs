use chrono::Utc;
use uuid::Uuid;

use faculty_core::error::{FacultyError, Result};
use faculty_core::faculty::{FacultyRecord, WorkflowStatus};
use faculty_core::store::{RecordOrder, RecordQuery, Transition};

use super::{FacultyService, FACULTY_NOT_FOUND};

impl FacultyService {
    /// Notify the principal about a confirmed faculty member.
    pub async fn notify(&self, id: Uuid, remarks: Option<String>) -> Result<FacultyRecord> {
        let record = self.find_in(id, WorkflowStatus::CONFIRMED).await?;
        let remarks = remarks.filter(|r| !r.trim().is_empty());
        self.advance(
            &record,
            Transition::to(WorkflowStatus::NotifiedPrincipal).with_notification(remarks, Utc::now()),
        )
        .await
    }

    /// Notified records the head of office has not acknowledged yet.
    pub async fn list_pending_for_hoo(&self) -> Result<Vec<FacultyRecord>> {
        self.list_notified(WorkflowStatus::NotifiedPrincipal).await
    }

    pub async fn acknowledge_hoo(&self, id: Uuid) -> Result<FacultyRecord> {
        let record = self.find_in(id, WorkflowStatus::NOTIFIED).await?;
        match record.workflow_status {
            WorkflowStatus::NotifiedPrincipal => {
                self.advance(&record, Transition::to(WorkflowStatus::NotifiedHoo))
                    .await
            }
            _ => Ok(record),
        }
    }

    /// Records acknowledged by the head of office, awaiting the SI.
    pub async fn list_pending_for_si(&self) -> Result<Vec<FacultyRecord>> {
        self.list_notified(WorkflowStatus::NotifiedHoo).await
    }

    pub async fn acknowledge_si(&self, id: Uuid) -> Result<FacultyRecord> {
        let record = self.find_in(id, WorkflowStatus::NOTIFIED).await?;
        match record.workflow_status {
            WorkflowStatus::NotifiedHoo => {
                self.advance(&record, Transition::to(WorkflowStatus::NotifiedSi))
                    .await
            }
            WorkflowStatus::NotifiedSi => Ok(record),
            WorkflowStatus::NotifiedPrincipal => Err(FacultyError::validation(
                "Head of office must acknowledge before the SI",
            )),
            _ => Err(FacultyError::not_found(FACULTY_NOT_FOUND)),
        }
    }

    /// Records acknowledged by everyone in the chain.
    pub async fn list_fully_acknowledged(&self) -> Result<Vec<FacultyRecord>> {
        self.list_notified(WorkflowStatus::NotifiedSi).await
    }

    async fn list_notified(&self, status: WorkflowStatus) -> Result<Vec<FacultyRecord>> {
        self.store
            .list(RecordQuery::with_statuses(&[status]).order(RecordOrder::NotificationDesc))
            .await
    }
}
