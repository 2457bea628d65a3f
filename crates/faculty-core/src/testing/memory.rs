//! In-memory store for tests.

use std::collections::HashMap;
use std::future::ready;
use std::sync::RwLock;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{FacultyError, Result};
use crate::faculty::{FacultyDraft, FacultyRecord, WorkflowStatus};
use crate::store::{FacultyStore, RecordOrder, RecordQuery, StoreFuture, Transition};

/// A [`FacultyStore`] backed by hash maps.
///
/// Semantics mirror the Postgres store: conditional updates, draft upserts
/// and the same ordering rules.
#[derive(Default)]
pub struct MemoryFacultyStore {
    records: RwLock<HashMap<Uuid, FacultyRecord>>,
    drafts: RwLock<HashMap<String, FacultyDraft>>,
}

impl MemoryFacultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in the given statuses.
    pub fn count(&self, statuses: &[WorkflowStatus]) -> usize {
        self.records
            .read()
            .map(|records| {
                records
                    .values()
                    .filter(|r| statuses.contains(&r.workflow_status))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Every record, for direct assertions.
    pub fn all(&self) -> Vec<FacultyRecord> {
        self.records
            .read()
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    fn lock_error() -> FacultyError {
        FacultyError::Internal("memory store lock poisoned".to_string())
    }

    fn do_update(&self, record: FacultyRecord, expected: WorkflowStatus) -> Result<Option<FacultyRecord>> {
        let mut records = self.records.write().map_err(|_| Self::lock_error())?;
        match records.get_mut(&record.id) {
            Some(stored) if stored.workflow_status == expected => {
                let mut updated = record;
                updated.created_at = stored.created_at;
                updated.updated_at = Utc::now();
                *stored = updated.clone();
                Ok(Some(updated))
            }
            _ => Ok(None),
        }
    }

    fn do_transition(
        &self,
        id: Uuid,
        from: WorkflowStatus,
        transition: &Transition,
    ) -> Result<Option<FacultyRecord>> {
        let mut records = self.records.write().map_err(|_| Self::lock_error())?;
        match records.get_mut(&id) {
            Some(stored) if stored.workflow_status == from => {
                transition.apply(stored, Utc::now());
                Ok(Some(stored.clone()))
            }
            _ => Ok(None),
        }
    }

    fn do_list(&self, query: &RecordQuery) -> Result<Vec<FacultyRecord>> {
        let records = self.records.read().map_err(|_| Self::lock_error())?;
        let mut selected: Vec<FacultyRecord> = records
            .values()
            .filter(|r| query.statuses.contains(&r.workflow_status))
            .filter(|r| query.filter.as_ref().map(|f| f.matches(r)).unwrap_or(true))
            .cloned()
            .collect();

        match query.order {
            RecordOrder::CreatedAsc => selected.sort_by_key(|r| r.created_at),
            RecordOrder::UpdatedDesc => selected.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
            RecordOrder::NotificationDesc => {
                selected.sort_by(|a, b| b.notification_date.cmp(&a.notification_date))
            }
        }

        if let Some(limit) = query.limit {
            selected.truncate(limit.max(0) as usize);
        }

        Ok(selected)
    }
}

impl FacultyStore for MemoryFacultyStore {
    fn insert(&self, record: FacultyRecord) -> StoreFuture<'_, FacultyRecord> {
        let result = self
            .records
            .write()
            .map_err(|_| Self::lock_error())
            .map(|mut records| {
                records.insert(record.id, record.clone());
                record
            });
        Box::pin(ready(result))
    }

    fn get(&self, id: Uuid) -> StoreFuture<'_, Option<FacultyRecord>> {
        let result = self
            .records
            .read()
            .map_err(|_| Self::lock_error())
            .map(|records| records.get(&id).cloned());
        Box::pin(ready(result))
    }

    fn update(
        &self,
        record: FacultyRecord,
        expected: WorkflowStatus,
    ) -> StoreFuture<'_, Option<FacultyRecord>> {
        Box::pin(ready(self.do_update(record, expected)))
    }

    fn transition(
        &self,
        id: Uuid,
        from: WorkflowStatus,
        transition: Transition,
    ) -> StoreFuture<'_, Option<FacultyRecord>> {
        Box::pin(ready(self.do_transition(id, from, &transition)))
    }

    fn delete(&self, id: Uuid, statuses: Vec<WorkflowStatus>) -> StoreFuture<'_, bool> {
        let result = self
            .records
            .write()
            .map_err(|_| Self::lock_error())
            .map(|mut records| {
                let deletable = records
                    .get(&id)
                    .map(|r| statuses.contains(&r.workflow_status))
                    .unwrap_or(false);
                deletable && records.remove(&id).is_some()
            });
        Box::pin(ready(result))
    }

    fn list(&self, query: RecordQuery) -> StoreFuture<'_, Vec<FacultyRecord>> {
        Box::pin(ready(self.do_list(&query)))
    }

    fn save_draft(&self, draft: FacultyDraft) -> StoreFuture<'_, FacultyDraft> {
        let result = self
            .drafts
            .write()
            .map_err(|_| Self::lock_error())
            .map(|mut drafts| {
                drafts.insert(draft.staffid.clone(), draft.clone());
                draft
            });
        Box::pin(ready(result))
    }

    fn get_draft(&self, staffid: String) -> StoreFuture<'_, Option<FacultyDraft>> {
        let result = self
            .drafts
            .read()
            .map_err(|_| Self::lock_error())
            .map(|drafts| drafts.get(&staffid).cloned());
        Box::pin(ready(result))
    }

    fn delete_draft(&self, staffid: String) -> StoreFuture<'_, bool> {
        let result = self
            .drafts
            .write()
            .map_err(|_| Self::lock_error())
            .map(|mut drafts| drafts.remove(&staffid).is_some());
        Box::pin(ready(result))
    }

    fn delete_drafts_matching(
        &self,
        name: String,
        mobile_number: String,
    ) -> StoreFuture<'_, u64> {
        let result = self
            .drafts
            .write()
            .map_err(|_| Self::lock_error())
            .map(|mut drafts| {
                let before = drafts.len();
                drafts.retain(|_, draft| !draft.matches(&name, &mobile_number));
                (before - drafts.len()) as u64
            });
        Box::pin(ready(result))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(ready(Ok(())))
    }
}
