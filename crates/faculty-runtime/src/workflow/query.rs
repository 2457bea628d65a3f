use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use faculty_core::error::{FacultyError, Result};
use faculty_core::faculty::{
    entries_by_period, sessions_by_period, EntryBucket, FacultyFilter,
    FacultyRecord, ReportPeriod, SessionBucket, WorkflowStatus,
};
use faculty_core::store::RecordQuery;

use super::{concurrent_change, FacultyService, ACTIVE_STATUSES, FACULTY_NOT_FOUND};

/// Partial update of a confirmed record's free-text fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmedUpdate {
    #[serde(default)]
    pub conduct: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl FacultyService {
    /// All pending records, verified or not, oldest first.
    pub async fn list_pending(&self) -> Result<Vec<FacultyRecord>> {
        self.store
            .list(RecordQuery::with_statuses(WorkflowStatus::PENDING))
            .await
    }

    pub async fn list_confirmed(&self) -> Result<Vec<FacultyRecord>> {
        self.store
            .list(RecordQuery::with_statuses(WorkflowStatus::CONFIRMED))
            .await
    }

    /// Search confirmed records. An empty result is reported as not found.
    pub async fn filter(&self, filter: FacultyFilter) -> Result<Vec<FacultyRecord>> {
        let found = self
            .store
            .list(RecordQuery::with_statuses(WorkflowStatus::CONFIRMED).filter(filter))
            .await?;

        if found.is_empty() {
            return Err(FacultyError::not_found(
                "No faculty found matching the given criteria",
            ));
        }
        Ok(found)
    }

    /// Look up a pending or confirmed record.
    pub async fn get(&self, id: Uuid) -> Result<FacultyRecord> {
        self.find_in(id, ACTIVE_STATUSES).await
    }

    /// Delete a pending or confirmed record and return it.
    pub async fn delete(&self, id: Uuid) -> Result<FacultyRecord> {
        let record = self.find_in(id, ACTIVE_STATUSES).await?;
        if !self.store.delete(id, ACTIVE_STATUSES.to_vec()).await? {
            return Err(FacultyError::not_found(FACULTY_NOT_FOUND));
        }
        info!(faculty_id = %id, "Faculty deleted");
        Ok(record)
    }

    /// Overwrite conduct and remarks on a confirmed record.
    pub async fn update_confirmed(&self, id: Uuid, update: ConfirmedUpdate) -> Result<FacultyRecord> {
        let mut record = self.find_in(id, WorkflowStatus::CONFIRMED).await?;
        if let Some(conduct) = update.conduct {
            record.conduct = conduct;
        }
        if let Some(remarks) = update.remarks {
            record.remarks = remarks;
        }

        self.store
            .update(record, WorkflowStatus::Confirmed)
            .await?
            .ok_or_else(concurrent_change)
    }

    /// Confirmed faculty entries per month of `period`, or per year.
    pub async fn entries_report(&self, period: ReportPeriod) -> Result<Vec<EntryBucket>> {
        let confirmed = self.list_confirmed().await?;
        Ok(entries_by_period(&confirmed, period))
    }

    /// Courses handled by confirmed faculty per month of `period`, or per year.
    pub async fn sessions_report(&self, period: ReportPeriod) -> Result<Vec<SessionBucket>> {
        let confirmed = self.list_confirmed().await?;
        Ok(sessions_by_period(&confirmed, period))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use serde_json::json;

    async fn confirmed(service: &FacultyService, name: &str, mobile: &str) -> FacultyRecord {
        let record = service
            .save(submission(name, mobile), None)
            .await
            .unwrap()
            .into_record();
        service.verify(record.id).await.unwrap();
        service.approve(record.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_and_delete_cover_pending_and_confirmed() {
        let (service, store) = service();
        let pending = service
            .save(submission("Asha", "1"), None)
            .await
            .unwrap()
            .into_record();
        let done = confirmed(&service, "Ravi", "2").await;

        assert_eq!(service.get(pending.id).await.unwrap().id, pending.id);
        assert_eq!(service.get(done.id).await.unwrap().id, done.id);

        let removed = service.delete(pending.id).await.unwrap();
        assert_eq!(removed.id, pending.id);
        service.delete(done.id).await.unwrap();
        assert!(store.all().is_empty());

        assert!(matches!(
            service.delete(done.id).await.unwrap_err(),
            FacultyError::NotFound(_)
        ));
        assert!(matches!(
            service.get(Uuid::new_v4()).await.unwrap_err(),
            FacultyError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_notified_records_are_not_reachable_by_id() {
        let (service, _) = service();
        let done = confirmed(&service, "Asha", "1").await;
        service.notify(done.id, None).await.unwrap();

        assert!(service.get(done.id).await.is_err());
        assert!(service.delete(done.id).await.is_err());
    }

    #[tokio::test]
    async fn test_filter_confirmed_only() {
        let (service, _) = service();
        confirmed(&service, "Asha Rao", "1").await;
        confirmed(&service, "Ravi Kumar", "2").await;
        service.save(submission("Asha Pending", "3"), None).await.unwrap();

        let filter: FacultyFilter = serde_json::from_value(json!({
            "name": "ASHA",
            "majorDomains": "[\"Radar\",\"Lidar\"]"
        }))
        .unwrap();
        let found = service.filter(filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.name, "Asha Rao");

        let filter: FacultyFilter =
            serde_json::from_value(json!({"department": "Mechanical"})).unwrap();
        let err = service.filter(filter).await.unwrap_err();
        assert!(matches!(err, FacultyError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_confirmed_overwrites_given_fields() {
        let (service, _) = service();
        let done = confirmed(&service, "Asha", "1").await;

        let updated = service
            .update_confirmed(
                done.id,
                ConfirmedUpdate {
                    conduct: Some("Excellent".into()),
                    remarks: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.conduct, "Excellent");
        assert_eq!(updated.remarks, "");

        let pending = service
            .save(submission("Ravi", "2"), None)
            .await
            .unwrap()
            .into_record();
        assert!(matches!(
            service
                .update_confirmed(pending.id, ConfirmedUpdate::default())
                .await
                .unwrap_err(),
            FacultyError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_reports_count_confirmed_only() {
        let (service, _) = service();
        confirmed(&service, "Asha", "1").await;
        confirmed(&service, "Ravi", "2").await;
        service.save(submission("Meera", "3"), None).await.unwrap();

        // Sample submissions join on 2026-03-14 with one course each
        let entries = service.entries_report(ReportPeriod::Year(2026)).await.unwrap();
        assert_eq!(entries[2].internal, 2);
        assert_eq!(entries.iter().map(|b| b.total).sum::<u64>(), 2);

        let sessions = service.sessions_report(ReportPeriod::All).await.unwrap();
        assert_eq!(sessions[1].label, "2026");
        assert_eq!(sessions[1].sessions, 2);
    }

    #[tokio::test]
    async fn test_list_pending_excludes_other_stages() {
        let (service, _) = service();
        let a = service.save(submission("Asha", "1"), None).await.unwrap().into_record();
        service.verify(a.id).await.unwrap();
        service.save(submission("Ravi", "2"), None).await.unwrap();
        confirmed(&service, "Meera", "3").await;

        assert_eq!(service.list_pending().await.unwrap().len(), 2);
        assert_eq!(service.list_confirmed().await.unwrap().len(), 1);
    }
}
