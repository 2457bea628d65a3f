use serde_json::{Map, Value};
use tracing::debug;

use faculty_core::error::{FacultyError, Result};
use faculty_core::faculty::FacultyDraft;

use super::FacultyService;

const DRAFT_NOT_FOUND: &str = "No autosaved faculty found for this staff id";

impl FacultyService {
    /// Create or overwrite the draft for `staffid`.
    pub async fn autosave(
        &self,
        staffid: Option<String>,
        faculty_type: Option<String>,
        data: Option<Value>,
    ) -> Result<FacultyDraft> {
        let staffid = staffid
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| FacultyError::validation("Staff id is required for autosave"))?;

        let data = match data {
            None | Some(Value::Null) => Value::Object(Map::new()),
            Some(value @ Value::Object(_)) => value,
            Some(_) => return Err(FacultyError::validation("Autosave data must be an object")),
        };

        let faculty_type = faculty_type.filter(|t| !t.trim().is_empty());
        let draft = self
            .store
            .save_draft(FacultyDraft::new(staffid, faculty_type, data))
            .await?;

        debug!(staffid = %draft.staffid, "Autosaved faculty draft");
        Ok(draft)
    }

    pub async fn get_draft(&self, staffid: &str) -> Result<FacultyDraft> {
        self.store
            .get_draft(staffid.to_string())
            .await?
            .ok_or_else(|| FacultyError::not_found(DRAFT_NOT_FOUND))
    }

    pub async fn delete_draft(&self, staffid: &str) -> Result<()> {
        if self.store.delete_draft(staffid.to_string()).await? {
            debug!(staffid = %staffid, "Deleted faculty draft");
            Ok(())
        } else {
            Err(FacultyError::not_found(DRAFT_NOT_FOUND))
        }
    }
}
