use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use faculty_core::error::{FacultyError, Result};
use faculty_core::faculty::{FacultyDraft, FacultyProfile, FacultyRecord, TextField, WorkflowStatus};
use faculty_core::store::{FacultyStore, RecordOrder, RecordQuery, StoreFuture, Transition};

const RECORD_COLUMNS: &str = "id, staff_id, workflow_status, profile, photograph, conduct, \
     remarks, rejection_remarks, notify_remarks, notification_date, verified_at, created_at, \
     updated_at";

const DRAFT_COLUMNS: &str = "staff_id, faculty_type, data, last_updated";

/// PostgreSQL-backed faculty store.
#[derive(Clone)]
pub struct PgFacultyStore {
    pool: PgPool,
}

impl PgFacultyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn insert_record(&self, record: FacultyRecord) -> Result<FacultyRecord> {
        let profile = serde_json::to_value(&record.profile)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO faculty_records (
                id, staff_id, workflow_status, name, mobile_number, faculty_type,
                profile, photograph, conduct, remarks, verified_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(record.id)
        .bind(&record.staffid)
        .bind(record.workflow_status.as_str())
        .bind(&record.profile.name)
        .bind(&record.profile.mobile_number)
        .bind(record.profile.faculty_type.as_str())
        .bind(profile)
        .bind(&record.photograph)
        .bind(&record.conduct)
        .bind(&record.remarks)
        .bind(record.verified_at)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await?;

        record_from_row(&row)
    }

    async fn get_record(&self, id: Uuid) -> Result<Option<FacultyRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM faculty_records WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn update_record(
        &self,
        record: FacultyRecord,
        expected: WorkflowStatus,
    ) -> Result<Option<FacultyRecord>> {
        let profile = serde_json::to_value(&record.profile)?;

        let row = sqlx::query(&format!(
            r#"
            UPDATE faculty_records
            SET staff_id = $3,
                workflow_status = $4,
                name = $5,
                mobile_number = $6,
                faculty_type = $7,
                profile = $8,
                photograph = $9,
                conduct = $10,
                remarks = $11,
                verified_at = $12,
                updated_at = NOW()
            WHERE id = $1 AND workflow_status = $2
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(record.id)
        .bind(expected.as_str())
        .bind(&record.staffid)
        .bind(record.workflow_status.as_str())
        .bind(&record.profile.name)
        .bind(&record.profile.mobile_number)
        .bind(record.profile.faculty_type.as_str())
        .bind(profile)
        .bind(&record.photograph)
        .bind(&record.conduct)
        .bind(&record.remarks)
        .bind(record.verified_at)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn transition_record(
        &self,
        id: Uuid,
        from: WorkflowStatus,
        transition: Transition,
    ) -> Result<Option<FacultyRecord>> {
        // Notification remarks are only written together with a notification date
        let row = sqlx::query(&format!(
            r#"
            UPDATE faculty_records
            SET workflow_status = $3,
                rejection_remarks = COALESCE($4, rejection_remarks),
                notify_remarks = CASE WHEN $6::timestamptz IS NULL THEN notify_remarks ELSE $5 END,
                notification_date = COALESCE($6, notification_date),
                verified_at = CASE WHEN $3 = 'verified' THEN NOW() ELSE verified_at END,
                updated_at = NOW()
            WHERE id = $1 AND workflow_status = $2
            RETURNING {}
            "#,
            RECORD_COLUMNS
        ))
        .bind(id)
        .bind(from.as_str())
        .bind(transition.to.as_str())
        .bind(&transition.rejection_remarks)
        .bind(&transition.notify_remarks)
        .bind(transition.notification_date)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn delete_record(&self, id: Uuid, statuses: Vec<WorkflowStatus>) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM faculty_records WHERE id = $1 AND workflow_status = ANY($2)")
                .bind(id)
                .bind(status_names(&statuses))
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_records(&self, query: RecordQuery) -> Result<Vec<FacultyRecord>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM faculty_records WHERE workflow_status = ANY(",
            RECORD_COLUMNS
        ));
        builder.push_bind(status_names(&query.statuses));
        builder.push(")");

        if let Some(filter) = &query.filter {
            for (field, needle) in filter.text_criteria() {
                builder.push(format!(
                    " AND strpos(lower(coalesce({}, '')), lower(",
                    text_column(field)
                ));
                builder.push_bind(needle.to_string());
                builder.push(")) > 0");
            }
            for (field, values) in filter.list_criteria() {
                builder.push(format!(" AND profile->'{}' ?| ", field.json_key()));
                builder.push_bind(values.to_vec());
            }
        }

        builder.push(match query.order {
            RecordOrder::CreatedAsc => " ORDER BY created_at ASC",
            RecordOrder::UpdatedDesc => " ORDER BY updated_at DESC",
            RecordOrder::NotificationDesc => " ORDER BY notification_date DESC NULLS LAST",
        });

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        tracing::debug!(sql = builder.sql(), "Listing faculty records");

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn upsert_draft(&self, draft: FacultyDraft) -> Result<FacultyDraft> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO faculty_drafts (staff_id, faculty_type, data, name, mobile_number, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (staff_id) DO UPDATE SET
                faculty_type = EXCLUDED.faculty_type,
                data = EXCLUDED.data,
                name = EXCLUDED.name,
                mobile_number = EXCLUDED.mobile_number,
                last_updated = EXCLUDED.last_updated
            RETURNING {}
            "#,
            DRAFT_COLUMNS
        ))
        .bind(&draft.staffid)
        .bind(&draft.faculty_type)
        .bind(&draft.data)
        .bind(draft.name())
        .bind(draft.mobile_number())
        .bind(draft.last_updated)
        .fetch_one(&self.pool)
        .await?;

        draft_from_row(&row)
    }

    async fn fetch_draft(&self, staffid: String) -> Result<Option<FacultyDraft>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM faculty_drafts WHERE staff_id = $1",
            DRAFT_COLUMNS
        ))
        .bind(&staffid)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(draft_from_row).transpose()
    }

    async fn remove_draft(&self, staffid: String) -> Result<bool> {
        let result = sqlx::query("DELETE FROM faculty_drafts WHERE staff_id = $1")
            .bind(&staffid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_drafts_matching(&self, name: String, mobile_number: String) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM faculty_drafts WHERE name = $1 AND mobile_number = $2")
                .bind(&name)
                .bind(&mobile_number)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

impl FacultyStore for PgFacultyStore {
    fn insert(&self, record: FacultyRecord) -> StoreFuture<'_, FacultyRecord> {
        Box::pin(self.insert_record(record))
    }

    fn get(&self, id: Uuid) -> StoreFuture<'_, Option<FacultyRecord>> {
        Box::pin(self.get_record(id))
    }

    fn update(
        &self,
        record: FacultyRecord,
        expected: WorkflowStatus,
    ) -> StoreFuture<'_, Option<FacultyRecord>> {
        Box::pin(self.update_record(record, expected))
    }

    fn transition(
        &self,
        id: Uuid,
        from: WorkflowStatus,
        transition: Transition,
    ) -> StoreFuture<'_, Option<FacultyRecord>> {
        Box::pin(self.transition_record(id, from, transition))
    }

    fn delete(&self, id: Uuid, statuses: Vec<WorkflowStatus>) -> StoreFuture<'_, bool> {
        Box::pin(self.delete_record(id, statuses))
    }

    fn list(&self, query: RecordQuery) -> StoreFuture<'_, Vec<FacultyRecord>> {
        Box::pin(self.list_records(query))
    }

    fn save_draft(&self, draft: FacultyDraft) -> StoreFuture<'_, FacultyDraft> {
        Box::pin(self.upsert_draft(draft))
    }

    fn get_draft(&self, staffid: String) -> StoreFuture<'_, Option<FacultyDraft>> {
        Box::pin(self.fetch_draft(staffid))
    }

    fn delete_draft(&self, staffid: String) -> StoreFuture<'_, bool> {
        Box::pin(self.remove_draft(staffid))
    }

    fn delete_drafts_matching(
        &self,
        name: String,
        mobile_number: String,
    ) -> StoreFuture<'_, u64> {
        Box::pin(self.remove_drafts_matching(name, mobile_number))
    }

    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1").execute(&self.pool).await?;
            Ok(())
        })
    }
}

fn status_names(statuses: &[WorkflowStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// SQL expression holding a filterable text field.
fn text_column(field: TextField) -> String {
    match field {
        TextField::Name => "name".to_string(),
        TextField::Staffid => "staff_id".to_string(),
        TextField::MobileNumber => "mobile_number".to_string(),
        TextField::FacultyType => "faculty_type".to_string(),
        other => format!("profile->>'{}'", other.json_key()),
    }
}

fn record_from_row(row: &PgRow) -> Result<FacultyRecord> {
    let status: String = row.try_get("workflow_status")?;
    let profile: Value = row.try_get("profile")?;
    let profile: FacultyProfile = serde_json::from_value(profile)
        .map_err(|e| FacultyError::Serialization(format!("Corrupt faculty profile: {}", e)))?;

    Ok(FacultyRecord {
        id: row.try_get("id")?,
        staffid: row.try_get("staff_id")?,
        workflow_status: status.parse()?,
        profile,
        photograph: row.try_get("photograph")?,
        conduct: row.try_get("conduct")?,
        remarks: row.try_get("remarks")?,
        rejection_remarks: row.try_get("rejection_remarks")?,
        notify_remarks: row.try_get("notify_remarks")?,
        notification_date: row.try_get("notification_date")?,
        verified_at: row.try_get("verified_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn draft_from_row(row: &PgRow) -> Result<FacultyDraft> {
    Ok(FacultyDraft {
        staffid: row.try_get("staff_id")?,
        faculty_type: row.try_get("faculty_type")?,
        data: row.try_get("data")?,
        last_updated: row.try_get("last_updated")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrations::MigrationRunner;
    use crate::workflow::test_support::submission;
    use crate::workflow::FacultyService;
    use std::sync::Arc;
    use faculty_core::faculty::{FacultyFilter, FacultyType};
    use faculty_core::testing::TestDatabase;
    use serde_json::json;

    #[test]
    fn test_text_columns() {
        assert_eq!(text_column(TextField::Staffid), "staff_id");
        assert_eq!(text_column(TextField::Email), "profile->>'email'");
        assert_eq!(text_column(TextField::Status), "profile->>'status'");
    }

    fn record(name: &str, mobile: &str, verified: bool) -> FacultyRecord {
        let mut profile = FacultyProfile::new(name, mobile, FacultyType::Internal);
        profile.major_domains = vec!["Radar".into(), "Sonar".into()];
        profile.department = Some("Electronics".into());
        FacultyRecord::new(format!("FAC-{}", name), profile, verified)
    }

    #[tokio::test]
    async fn test_postgres_store_workflow() {
        let Some(db) = TestDatabase::from_env_if_set().await else {
            return;
        };
        let isolated = db.isolated("store_workflow").await.unwrap();
        MigrationRunner::new(isolated.pool().clone())
            .run(Vec::new())
            .await
            .unwrap();
        let store = PgFacultyStore::new(isolated.pool().clone());

        let saved = store.insert(record("Asha Rao", "9876543210", true)).await.unwrap();
        assert_eq!(saved.workflow_status, WorkflowStatus::Verified);
        assert_eq!(saved.profile.major_domains, vec!["Radar", "Sonar"]);

        // Stale expected status leaves the row alone.
        let stale = store
            .transition(saved.id, WorkflowStatus::Pending, Transition::to(WorkflowStatus::Confirmed))
            .await
            .unwrap();
        assert!(stale.is_none());

        let confirmed = store
            .transition(saved.id, WorkflowStatus::Verified, Transition::to(WorkflowStatus::Confirmed))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(confirmed.workflow_status, WorkflowStatus::Confirmed);

        let notified = store
            .transition(
                saved.id,
                WorkflowStatus::Confirmed,
                Transition::to(WorkflowStatus::NotifiedPrincipal)
                    .with_notification(Some("Report Monday".into()), chrono::Utc::now()),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(notified.notify_remarks.as_deref(), Some("Report Monday"));
        assert!(notified.notification_date.is_some());

        let acked = store
            .transition(
                saved.id,
                WorkflowStatus::NotifiedPrincipal,
                Transition::to(WorkflowStatus::NotifiedHoo),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(acked.notify_remarks.as_deref(), Some("Report Monday"));

        isolated.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_postgres_store_filter_and_drafts() {
        let Some(db) = TestDatabase::from_env_if_set().await else {
            return;
        };
        let isolated = db.isolated("store_filter").await.unwrap();
        MigrationRunner::new(isolated.pool().clone())
            .run(Vec::new())
            .await
            .unwrap();
        let store = PgFacultyStore::new(isolated.pool().clone());

        for (name, mobile) in [("Asha Rao", "111"), ("Ravi Kumar", "222")] {
            let saved = store.insert(record(name, mobile, true)).await.unwrap();
            store
                .transition(saved.id, WorkflowStatus::Verified, Transition::to(WorkflowStatus::Confirmed))
                .await
                .unwrap();
        }

        let filter: FacultyFilter = serde_json::from_value(json!({
            "name": "asha",
            "department": "electro",
            "majorDomains": ["Sonar", "Lidar"]
        }))
        .unwrap();
        let found = store
            .list(RecordQuery::with_statuses(WorkflowStatus::CONFIRMED).filter(filter))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].profile.name, "Asha Rao");

        let draft = FacultyDraft::new(
            "FAC1",
            Some("internal".into()),
            json!({"name": "Ravi Kumar", "mobileNumber": "222"}),
        );
        store.save_draft(draft).await.unwrap();
        assert!(store.get_draft("FAC1".into()).await.unwrap().is_some());

        let removed = store
            .delete_drafts_matching("Ravi Kumar".into(), "222".into())
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(!store.delete_draft("FAC1".into()).await.unwrap());

        isolated.cleanup().await.unwrap();
    }

    #[tokio::test]
    async fn test_postgres_accepts_long_free_text_identity() {
        let Some(db) = TestDatabase::from_env_if_set().await else {
            return;
        };
        let isolated = db.isolated("store_long_text").await.unwrap();
        MigrationRunner::new(isolated.pool().clone())
            .run(Vec::new())
            .await
            .unwrap();
        let store = Arc::new(PgFacultyStore::new(isolated.pool().clone()));
        let service = FacultyService::new(store.clone());

        let long_mobile = "9".repeat(43);
        let draft = service
            .autosave(
                Some("FAC1".into()),
                Some("internal faculty member".into()),
                Some(json!({"name": "A".repeat(300), "mobileNumber": long_mobile})),
            )
            .await
            .unwrap();
        assert_eq!(draft.faculty_type.as_deref(), Some("internal faculty member"));

        let mut valid = submission("Asha Rao", &long_mobile);
        valid.staffid = Some("S".repeat(70));
        let created = service.save(valid, None).await.unwrap().into_record();
        assert_eq!(created.staffid.len(), 70);

        let mut edit = submission("Asha Rao", &long_mobile);
        edit.id = Some(created.id);
        edit.verified = Some(true);
        let updated = service.save(edit, None).await.unwrap().into_record();
        assert_eq!(updated.workflow_status, WorkflowStatus::Verified);
        assert!(updated.verified_at.is_some());
        assert_eq!(updated.staffid, created.staffid);

        let rejected = service.reject_verification(created.id, None).await.unwrap();
        assert!(rejected.view().verified);

        let other = service
            .save(submission("Ravi Kumar", "222"), None)
            .await
            .unwrap()
            .into_record();
        let removed = service.delete(other.id).await.unwrap();
        assert_eq!(removed.id, other.id);
        assert!(store.get(other.id).await.unwrap().is_none());
        assert!(!store
            .delete(created.id, WorkflowStatus::PENDING.to_vec())
            .await
            .unwrap());

        isolated.cleanup().await.unwrap();
    }
}
