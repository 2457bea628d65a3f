use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::faculty::{FacultyDraft, FacultyFilter, FacultyRecord, WorkflowStatus};

/// Boxed future returned by store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Sort order for record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordOrder {
    /// Oldest submission first.
    #[default]
    CreatedAsc,
    /// Most recently changed first.
    UpdatedDesc,
    /// Most recently notified first.
    NotificationDesc,
}

/// Selection of faculty records by workflow status.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    /// Statuses to include. Empty selects nothing.
    pub statuses: Vec<WorkflowStatus>,
    pub filter: Option<FacultyFilter>,
    pub order: RecordOrder,
    pub limit: Option<i64>,
}

impl RecordQuery {
    pub fn with_statuses(statuses: &[WorkflowStatus]) -> Self {
        Self {
            statuses: statuses.to_vec(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: FacultyFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn order(mut self, order: RecordOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A workflow status change plus the audit fields it stamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub to: WorkflowStatus,
    pub rejection_remarks: Option<String>,
    pub notify_remarks: Option<String>,
    pub notification_date: Option<DateTime<Utc>>,
}

impl Transition {
    pub fn to(status: WorkflowStatus) -> Self {
        Self {
            to: status,
            rejection_remarks: None,
            notify_remarks: None,
            notification_date: None,
        }
    }

    pub fn with_rejection_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.rejection_remarks = Some(remarks.into());
        self
    }

    pub fn with_notification(mut self, remarks: Option<String>, at: DateTime<Utc>) -> Self {
        self.notify_remarks = remarks;
        self.notification_date = Some(at);
        self
    }

    /// Apply the change to an in-memory record.
    pub fn apply(&self, record: &mut FacultyRecord, at: DateTime<Utc>) {
        record.workflow_status = self.to;
        if self.to == WorkflowStatus::Verified {
            record.verified_at = Some(at);
        }
        if self.rejection_remarks.is_some() {
            record.rejection_remarks = self.rejection_remarks.clone();
        }
        if self.notification_date.is_some() {
            record.notify_remarks = self.notify_remarks.clone();
            record.notification_date = self.notification_date;
        }
        record.updated_at = at;
    }
}

/// Persistence for faculty records and drafts.
///
/// Status changes go through [`FacultyStore::transition`] and
/// [`FacultyStore::update`], which only apply when the stored status still
/// equals the expected one. A `None` result means the record is missing or
/// has moved on.
pub trait FacultyStore: Send + Sync {
    /// Insert a new record.
    fn insert(&self, record: FacultyRecord) -> StoreFuture<'_, FacultyRecord>;

    /// Load a record in any status.
    fn get(&self, id: Uuid) -> StoreFuture<'_, Option<FacultyRecord>>;

    /// Replace the editable fields of a record whose status is `expected`.
    ///
    /// The record's own `workflow_status` is written as the new status.
    fn update(
        &self,
        record: FacultyRecord,
        expected: WorkflowStatus,
    ) -> StoreFuture<'_, Option<FacultyRecord>>;

    /// Move a record from `from` to `transition.to` in one step.
    fn transition(
        &self,
        id: Uuid,
        from: WorkflowStatus,
        transition: Transition,
    ) -> StoreFuture<'_, Option<FacultyRecord>>;

    /// Delete a record if its status is one of `statuses`.
    fn delete(&self, id: Uuid, statuses: Vec<WorkflowStatus>) -> StoreFuture<'_, bool>;

    /// List records matching a query.
    fn list(&self, query: RecordQuery) -> StoreFuture<'_, Vec<FacultyRecord>>;

    /// Insert or overwrite the draft for `draft.staffid`.
    fn save_draft(&self, draft: FacultyDraft) -> StoreFuture<'_, FacultyDraft>;

    fn get_draft(&self, staffid: String) -> StoreFuture<'_, Option<FacultyDraft>>;

    fn delete_draft(&self, staffid: String) -> StoreFuture<'_, bool>;

    /// Delete drafts whose form carries this name and mobile number.
    fn delete_drafts_matching(
        &self,
        name: String,
        mobile_number: String,
    ) -> StoreFuture<'_, u64>;

    /// Check the backing storage is reachable.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faculty::{FacultyProfile, FacultyType};

    #[test]
    fn test_query_builder() {
        let query = RecordQuery::with_statuses(WorkflowStatus::PENDING)
            .order(RecordOrder::UpdatedDesc)
            .limit(10);
        assert_eq!(query.statuses.len(), 2);
        assert_eq!(query.order, RecordOrder::UpdatedDesc);
        assert_eq!(query.limit, Some(10));
        assert!(query.filter.is_none());
    }

    #[test]
    fn test_transition_apply_stamps_audit_fields() {
        let profile = FacultyProfile::new("Asha Rao", "9876543210", FacultyType::Internal);
        let mut record = FacultyRecord::new("FAC1", profile, true);
        let at = Utc::now();

        Transition::to(WorkflowStatus::Confirmed).apply(&mut record, at);
        assert_eq!(record.workflow_status, WorkflowStatus::Confirmed);
        assert!(record.verified_at.is_some());
        assert!(record.notification_date.is_none());

        Transition::to(WorkflowStatus::NotifiedPrincipal)
            .with_notification(Some("Report Monday".into()), at)
            .apply(&mut record, at);
        assert_eq!(record.notify_remarks.as_deref(), Some("Report Monday"));
        assert_eq!(record.notification_date, Some(at));
        assert_eq!(record.updated_at, at);

        // Later steps keep the notification stamp.
        Transition::to(WorkflowStatus::NotifiedHoo).apply(&mut record, at);
        assert_eq!(record.notify_remarks.as_deref(), Some("Report Monday"));
    }

    #[test]
    fn test_verify_transition_stamps_verified_at() {
        let profile = FacultyProfile::new("Asha Rao", "9876543210", FacultyType::Internal);
        let mut record = FacultyRecord::new("FAC1", profile, false);
        let at = Utc::now();

        Transition::to(WorkflowStatus::Verified).apply(&mut record, at);
        assert_eq!(record.verified_at, Some(at));

        Transition::to(WorkflowStatus::RejectedVerification)
            .with_rejection_remarks("Wrong department")
            .apply(&mut record, at);
        assert_eq!(record.verified_at, Some(at));
        assert!(record.view().verified);
    }
}
