use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::input::{flat_list, object_list, opt_bool, opt_date, opt_string};
use super::record::{
    CourseHandled, Education, FacultyProfile, Publication, DEFAULT_EMPLOYMENT_STATUS,
};
use super::status::FacultyType;
use crate::error::{FacultyError, Result};

/// Faculty form payload as received from a client.
///
/// Every field is optional here; [`FacultySubmission::validate`] enforces
/// the required ones and fills defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultySubmission {
    #[serde(default, alias = "_id", deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub staffid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub mobile_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub faculty_type: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub qualification: Option<String>,
    #[serde(default, deserialize_with = "opt_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_date")]
    pub joined: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_date")]
    pub date_of_joining: Option<NaiveDate>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub conduct: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub remarks: Option<String>,
    #[serde(default, deserialize_with = "opt_bool")]
    pub verified: Option<bool>,
    #[serde(default, deserialize_with = "flat_list")]
    pub major_domains: Vec<String>,
    #[serde(default, deserialize_with = "flat_list")]
    pub minor_domains: Vec<String>,
    #[serde(default, deserialize_with = "flat_list")]
    pub modules_handled: Vec<String>,
    #[serde(default, deserialize_with = "object_list")]
    pub educational_details: Vec<Education>,
    #[serde(default, deserialize_with = "object_list")]
    pub courses_handled: Vec<CourseHandled>,
    #[serde(default, deserialize_with = "object_list")]
    pub publications: Vec<Publication>,
}

/// A submission that passed validation.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    /// Existing record to update, if any.
    pub id: Option<Uuid>,
    /// Caller-supplied staff id; `None` means one is generated on insert.
    pub staffid: Option<String>,
    pub profile: FacultyProfile,
    pub conduct: Option<String>,
    pub remarks: Option<String>,
    pub verified: Option<bool>,
}

impl ValidSubmission {
    /// The caller's staff id, or a fresh `FAC<epoch millis>` one.
    pub fn staffid_or_generate(&self) -> String {
        self.staffid.clone().unwrap_or_else(generate_staffid)
    }
}

/// Generate a staff id from the current timestamp.
pub fn generate_staffid() -> String {
    format!("FAC{}", Utc::now().timestamp_millis())
}

impl FacultySubmission {
    /// Decode a submission from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| FacultyError::validation(format!("Invalid faculty payload: {}", e)))
    }

    /// Check required fields and apply defaults.
    pub fn validate(self) -> Result<ValidSubmission> {
        let id = self
            .id
            .map(|raw| {
                Uuid::parse_str(&raw)
                    .map_err(|_| FacultyError::validation(format!("Invalid faculty id '{}'", raw)))
            })
            .transpose()?;

        let name = self
            .name
            .ok_or_else(|| FacultyError::validation("Name is required"))?;
        let mobile_number = self
            .mobile_number
            .ok_or_else(|| FacultyError::validation("Mobile number is required"))?;
        let faculty_type: FacultyType = self
            .faculty_type
            .ok_or_else(|| FacultyError::validation("Faculty type is required"))?
            .parse()?;

        let profile = FacultyProfile {
            name,
            mobile_number,
            faculty_type,
            email: self.email,
            designation: self.designation,
            department: self.department,
            qualification: self.qualification,
            date_of_birth: self.date_of_birth,
            joined: self.joined,
            date_of_joining: self.date_of_joining,
            status: self
                .status
                .unwrap_or_else(|| DEFAULT_EMPLOYMENT_STATUS.to_string()),
            major_domains: self.major_domains,
            minor_domains: self.minor_domains,
            modules_handled: self.modules_handled,
            educational_details: self.educational_details,
            courses_handled: self.courses_handled,
            publications: self.publications,
        };

        Ok(ValidSubmission {
            id,
            staffid: self.staffid,
            profile,
            conduct: self.conduct,
            remarks: self.remarks,
            verified: self.verified,
        })
    }
}
