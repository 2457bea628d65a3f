use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::input::{coerce_string, opt_string};
use super::status::{FacultyType, WorkflowStatus};

/// Default employment status for new faculty.
pub const DEFAULT_EMPLOYMENT_STATUS: &str = "serving";

/// One entry of a faculty member's education history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default, deserialize_with = "opt_string")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub specialization: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub year_of_passing: Option<String>,
    /// Form fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A course the faculty member has taught.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseHandled {
    #[serde(default, deserialize_with = "opt_string")]
    pub course_name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub batch: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub from_date: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub to_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub journal: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub year: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Business fields of a faculty member, independent of workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyProfile {
    pub name: String,
    pub mobile_number: String,
    pub faculty_type: FacultyType,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub designation: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub joined: Option<NaiveDate>,
    #[serde(default)]
    pub date_of_joining: Option<NaiveDate>,
    /// Employment status, e.g. `serving` or `retired`.
    #[serde(default = "default_employment_status")]
    pub status: String,
    #[serde(default)]
    pub major_domains: Vec<String>,
    #[serde(default)]
    pub minor_domains: Vec<String>,
    #[serde(default)]
    pub modules_handled: Vec<String>,
    #[serde(default)]
    pub educational_details: Vec<Education>,
    #[serde(default)]
    pub courses_handled: Vec<CourseHandled>,
    #[serde(default)]
    pub publications: Vec<Publication>,
}

fn default_employment_status() -> String {
    DEFAULT_EMPLOYMENT_STATUS.to_string()
}

impl FacultyProfile {
    pub fn new(
        name: impl Into<String>,
        mobile_number: impl Into<String>,
        faculty_type: FacultyType,
    ) -> Self {
        Self {
            name: name.into(),
            mobile_number: mobile_number.into(),
            faculty_type,
            email: None,
            designation: None,
            department: None,
            qualification: None,
            date_of_birth: None,
            joined: None,
            date_of_joining: None,
            status: default_employment_status(),
            major_domains: Vec::new(),
            minor_domains: Vec::new(),
            modules_handled: Vec::new(),
            educational_details: Vec::new(),
            courses_handled: Vec::new(),
            publications: Vec::new(),
        }
    }

    /// Date used for reporting: `joined`, falling back to `dateOfJoining`.
    pub fn join_date(&self) -> Option<NaiveDate> {
        self.joined.or(self.date_of_joining)
    }
}

/// A faculty record at any stage after submission.
#[derive(Debug, Clone, PartialEq)]
pub struct FacultyRecord {
    pub id: Uuid,
    pub staffid: String,
    pub workflow_status: WorkflowStatus,
    pub profile: FacultyProfile,
    pub photograph: Option<String>,
    pub conduct: String,
    pub remarks: String,
    pub rejection_remarks: Option<String>,
    pub notify_remarks: Option<String>,
    pub notification_date: Option<DateTime<Utc>>,
    /// When the record passed verification. Kept through a later rejection.
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FacultyRecord {
    /// Create a freshly submitted record.
    pub fn new(staffid: impl Into<String>, profile: FacultyProfile, verified: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            staffid: staffid.into(),
            workflow_status: if verified {
                WorkflowStatus::Verified
            } else {
                WorkflowStatus::Pending
            },
            profile,
            photograph: None,
            conduct: String::new(),
            remarks: String::new(),
            rejection_remarks: None,
            notify_remarks: None,
            notification_date: None,
            verified_at: verified.then_some(now),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the record is or was verified. A rejection at verification
    /// keeps the flag of the record it was made on.
    pub fn is_verified(&self) -> bool {
        let status = self.workflow_status;
        status.is_verified()
            || (status == WorkflowStatus::RejectedVerification && self.verified_at.is_some())
    }

    /// JSON representation with the derived workflow flags.
    pub fn view(&self) -> FacultyView {
        let status = self.workflow_status;
        FacultyView {
            id: self.id,
            staffid: self.staffid.clone(),
            profile: self.profile.clone(),
            workflow_status: status,
            verified: self.is_verified(),
            photograph: self.photograph.clone(),
            conduct: Some(self.conduct.clone()),
            remarks: self.remarks.clone(),
            rejection_remarks: self.rejection_remarks.clone(),
            verification_rejection: status == WorkflowStatus::RejectedVerification,
            approval_rejection: status == WorkflowStatus::RejectedApproval,
            notify_principal: status.principal_notified(),
            notify_hoo: status.hoo_acknowledged(),
            notify_si: status.si_acknowledged(),
            notify_remarks: self.notify_remarks.clone(),
            notification_date: self.notification_date,
            verified_at: self.verified_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Wire shape of a faculty record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyView {
    pub id: Uuid,
    pub staffid: String,
    #[serde(flatten)]
    pub profile: FacultyProfile,
    pub workflow_status: WorkflowStatus,
    pub verified: bool,
    pub photograph: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conduct: Option<String>,
    pub remarks: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_remarks: Option<String>,
    pub verification_rejection: bool,
    pub approval_rejection: bool,
    #[serde(rename = "notifyprincipal")]
    pub notify_principal: bool,
    #[serde(rename = "notifyhoo")]
    pub notify_hoo: bool,
    #[serde(rename = "notifysi")]
    pub notify_si: bool,
    #[serde(rename = "notifyremarks", skip_serializing_if = "Option::is_none")]
    pub notify_remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FacultyView {
    /// Drop the conduct field from the output.
    pub fn without_conduct(mut self) -> Self {
        self.conduct = None;
        self
    }
}

/// An autosaved, partially completed faculty form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyDraft {
    pub staffid: String,
    pub faculty_type: Option<String>,
    pub data: Value,
    pub last_updated: DateTime<Utc>,
}

impl FacultyDraft {
    pub fn new(staffid: impl Into<String>, faculty_type: Option<String>, data: Value) -> Self {
        Self {
            staffid: staffid.into(),
            faculty_type,
            data,
            last_updated: Utc::now(),
        }
    }

    /// Name typed into the draft so far.
    pub fn name(&self) -> Option<String> {
        self.data.get("name").cloned().and_then(coerce_string)
    }

    /// Mobile number typed into the draft so far.
    pub fn mobile_number(&self) -> Option<String> {
        self.data.get("mobileNumber").cloned().and_then(coerce_string)
    }

    /// Whether this draft was the form behind a submission.
    pub fn matches(&self, name: &str, mobile_number: &str) -> bool {
        self.name().as_deref() == Some(name) && self.mobile_number().as_deref() == Some(mobile_number)
    }
}
