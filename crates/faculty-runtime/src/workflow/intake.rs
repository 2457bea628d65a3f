use chrono::Utc;
use tracing::{info, warn};

use faculty_core::error::Result;
use faculty_core::faculty::{FacultyRecord, ValidSubmission, WorkflowStatus};

use super::{concurrent_change, FacultyService, ACTIVE_STATUSES};

/// Result of saving a faculty form.
#[derive(Debug, Clone)]
pub enum SaveOutcome {
    Created(FacultyRecord),
    Updated {
        record: FacultyRecord,
        /// Photograph the update replaced, no longer referenced by the record.
        replaced_photograph: Option<String>,
    },
}

impl SaveOutcome {
    pub fn record(&self) -> &FacultyRecord {
        match self {
            Self::Created(record) | Self::Updated { record, .. } => record,
        }
    }

    pub fn into_record(self) -> FacultyRecord {
        match self {
            Self::Created(record) | Self::Updated { record, .. } => record,
        }
    }

    pub fn replaced_photograph(&self) -> Option<&str> {
        match self {
            Self::Created(_) => None,
            Self::Updated {
                replaced_photograph,
                ..
            } => replaced_photograph.as_deref(),
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

impl FacultyService {
    /// Insert a new pending record, or update an existing pending or
    /// confirmed one when the submission carries an id.
    ///
    /// `photograph` is the stored path of a newly uploaded photo. Without
    /// one, an update keeps the record's current photograph.
    pub async fn save(
        &self,
        submission: ValidSubmission,
        photograph: Option<String>,
    ) -> Result<SaveOutcome> {
        let outcome = match submission.id {
            None => self.create(submission, photograph).await?,
            Some(id) => {
                let existing = self.find_in(id, ACTIVE_STATUSES).await?;
                self.replace(existing, submission, photograph).await?
            }
        };

        let record = outcome.record();
        if record.workflow_status.is_pending() {
            self.clear_matching_drafts(record).await;
        }

        Ok(outcome)
    }

    async fn create(
        &self,
        submission: ValidSubmission,
        photograph: Option<String>,
    ) -> Result<SaveOutcome> {
        let staffid = submission.staffid_or_generate();
        let mut record = FacultyRecord::new(
            staffid,
            submission.profile,
            submission.verified.unwrap_or(false),
        );
        record.photograph = photograph;
        record.conduct = submission.conduct.unwrap_or_default();
        record.remarks = submission.remarks.unwrap_or_default();

        let saved = self.store.insert(record).await?;
        info!(
            faculty_id = %saved.id,
            staffid = %saved.staffid,
            status = %saved.workflow_status,
            "Faculty submitted"
        );
        Ok(SaveOutcome::Created(saved))
    }

    async fn replace(
        &self,
        existing: FacultyRecord,
        submission: ValidSubmission,
        photograph: Option<String>,
    ) -> Result<SaveOutcome> {
        let expected = existing.workflow_status;
        let mut record = existing;

        record.profile = submission.profile;
        if let Some(staffid) = submission.staffid {
            record.staffid = staffid;
        }
        let mut replaced_photograph = None;
        if photograph.is_some() && photograph != record.photograph {
            replaced_photograph = std::mem::replace(&mut record.photograph, photograph);
        }
        if let Some(conduct) = submission.conduct {
            record.conduct = conduct;
        }
        if let Some(remarks) = submission.remarks {
            record.remarks = remarks;
        }
        // Confirmed records ignore the verified flag
        if expected.is_pending() {
            match submission.verified {
                Some(true) => {
                    record.workflow_status = WorkflowStatus::Verified;
                    record.verified_at.get_or_insert_with(Utc::now);
                }
                Some(false) => {
                    record.workflow_status = WorkflowStatus::Pending;
                    record.verified_at = None;
                }
                None => {}
            }
        }

        let saved = self
            .store
            .update(record, expected)
            .await?
            .ok_or_else(concurrent_change)?;

        info!(faculty_id = %saved.id, status = %saved.workflow_status, "Faculty updated");
        Ok(SaveOutcome::Updated {
            record: saved,
            replaced_photograph,
        })
    }

    /// Drop autosaved drafts for the form that produced `record`.
    async fn clear_matching_drafts(&self, record: &FacultyRecord) {
        let result = self
            .store
            .delete_drafts_matching(
                record.profile.name.clone(),
                record.profile.mobile_number.clone(),
            )
            .await;

        match result {
            Ok(0) => {}
            Ok(removed) => info!(faculty_id = %record.id, removed, "Cleared autosaved drafts"),
            Err(e) => warn!(faculty_id = %record.id, "Failed to clear autosaved drafts: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use faculty_core::error::FacultyError;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_defaults_to_unverified_pending() {
        let (service, store) = service();

        let outcome = service.save(submission("Asha Rao", "9876543210"), None).await.unwrap();
        assert!(outcome.is_created());

        let record = outcome.record();
        assert_eq!(record.workflow_status, WorkflowStatus::Pending);
        assert!(record.staffid.starts_with("FAC"));
        assert_eq!(record.profile.status, "serving");
        assert_eq!(record.conduct, "");
        assert_eq!(store.count(WorkflowStatus::PENDING), 1);
    }

    #[tokio::test]
    async fn test_create_honours_explicit_verified() {
        let (service, _) = service();
        let mut valid = submission("Asha Rao", "9876543210");
        valid.verified = Some(true);

        let record = service.save(valid, None).await.unwrap().into_record();
        assert_eq!(record.workflow_status, WorkflowStatus::Verified);
    }

    #[tokio::test]
    async fn test_save_clears_matching_draft() {
        let (service, _) = service();
        service
            .autosave(
                Some("FAC1".into()),
                Some("internal".into()),
                Some(json!({"name": "Asha Rao", "mobileNumber": "9876543210"})),
            )
            .await
            .unwrap();
        service
            .autosave(
                Some("FAC2".into()),
                None,
                Some(json!({"name": "Asha Rao", "mobileNumber": "1111111111"})),
            )
            .await
            .unwrap();

        service.save(submission("Asha Rao", "9876543210"), None).await.unwrap();

        assert!(service.get_draft("FAC1").await.is_err());
        assert!(service.get_draft("FAC2").await.is_ok());
    }

    #[tokio::test]
    async fn test_update_pending_keeps_photo_and_honours_verified() {
        let (service, store) = service();
        let created = service
            .save(submission("Asha Rao", "9876543210"), Some("uploads/a.png".into()))
            .await
            .unwrap()
            .into_record();

        let mut edit = submission("Asha R.", "9876543210");
        edit.id = Some(created.id);
        edit.verified = Some(true);

        let outcome = service.save(edit, None).await.unwrap();
        assert!(!outcome.is_created());
        assert!(outcome.replaced_photograph().is_none());

        let updated = outcome.into_record();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.staffid, created.staffid);
        assert_eq!(updated.profile.name, "Asha R.");
        assert_eq!(updated.photograph.as_deref(), Some("uploads/a.png"));
        assert_eq!(updated.workflow_status, WorkflowStatus::Verified);
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn test_new_photograph_reports_the_replaced_one() {
        let (service, _) = service();
        let created = service
            .save(submission("Asha Rao", "9876543210"), Some("uploads/a.png".into()))
            .await
            .unwrap()
            .into_record();

        let mut edit = submission("Asha Rao", "9876543210");
        edit.id = Some(created.id);
        let outcome = service.save(edit, Some("uploads/b.png".into())).await.unwrap();
        assert_eq!(outcome.replaced_photograph(), Some("uploads/a.png"));
        assert_eq!(outcome.record().photograph.as_deref(), Some("uploads/b.png"));
    }

    #[tokio::test]
    async fn test_unverifying_a_pending_record_clears_verified_at() {
        let (service, _) = service();
        let created = service
            .save(submission("Asha Rao", "9876543210"), None)
            .await
            .unwrap()
            .into_record();
        let verified = service.verify(created.id).await.unwrap();
        assert!(verified.verified_at.is_some());

        let mut edit = submission("Asha Rao", "9876543210");
        edit.id = Some(created.id);
        edit.verified = Some(false);
        let updated = service.save(edit, None).await.unwrap().into_record();
        assert_eq!(updated.workflow_status, WorkflowStatus::Pending);
        assert!(updated.verified_at.is_none());

        let rejected = service.reject_verification(created.id, None).await.unwrap();
        assert!(!rejected.view().verified);
    }

    #[tokio::test]
    async fn test_update_confirmed_ignores_verified_flag() {
        let (service, _) = service();
        let created = service
            .save(submission("Asha Rao", "9876543210"), None)
            .await
            .unwrap()
            .into_record();
        service.verify(created.id).await.unwrap();
        service.approve(created.id).await.unwrap();

        let mut edit = submission("Asha Rao", "9876543210");
        edit.id = Some(created.id);
        edit.verified = Some(false);
        edit.remarks = Some("Transferred".into());

        let updated = service.save(edit, Some("uploads/b.png".into())).await.unwrap().into_record();
        assert_eq!(updated.workflow_status, WorkflowStatus::Confirmed);
        assert_eq!(updated.remarks, "Transferred");
        assert_eq!(updated.photograph.as_deref(), Some("uploads/b.png"));
    }

    #[tokio::test]
    async fn test_update_of_rejected_or_missing_is_not_found() {
        let (service, _) = service();
        let created = service
            .save(submission("Asha Rao", "9876543210"), None)
            .await
            .unwrap()
            .into_record();
        service.reject_verification(created.id, None).await.unwrap();

        let mut edit = submission("Asha Rao", "9876543210");
        edit.id = Some(created.id);
        assert!(matches!(
            service.save(edit, None).await.unwrap_err(),
            FacultyError::NotFound(_)
        ));

        let mut edit = submission("Ghost", "0");
        edit.id = Some(uuid::Uuid::new_v4());
        assert!(matches!(
            service.save(edit, None).await.unwrap_err(),
            FacultyError::NotFound(_)
        ));
    }
}
