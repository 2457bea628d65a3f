use serde::Deserialize;

use super::input::{flat_list, opt_string};
use super::record::FacultyRecord;

/// Text field matched case-insensitively as a substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    Staffid,
    MobileNumber,
    Email,
    Designation,
    Department,
    FacultyType,
    Status,
}

impl TextField {
    /// Key of the field in the stored profile JSON.
    pub fn json_key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Staffid => "staffid",
            Self::MobileNumber => "mobileNumber",
            Self::Email => "email",
            Self::Designation => "designation",
            Self::Department => "department",
            Self::FacultyType => "facultyType",
            Self::Status => "status",
        }
    }

    fn value<'a>(&self, record: &'a FacultyRecord) -> Option<&'a str> {
        let profile = &record.profile;
        match self {
            Self::Name => Some(&profile.name),
            Self::Staffid => Some(&record.staffid),
            Self::MobileNumber => Some(&profile.mobile_number),
            Self::Email => profile.email.as_deref(),
            Self::Designation => profile.designation.as_deref(),
            Self::Department => profile.department.as_deref(),
            Self::FacultyType => Some(profile.faculty_type.as_str()),
            Self::Status => Some(&profile.status),
        }
    }
}

/// List field matched by set membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    MajorDomains,
    MinorDomains,
    ModulesHandled,
}

impl ListField {
    pub fn json_key(&self) -> &'static str {
        match self {
            Self::MajorDomains => "majorDomains",
            Self::MinorDomains => "minorDomains",
            Self::ModulesHandled => "modulesHandled",
        }
    }

    fn values<'a>(&self, record: &'a FacultyRecord) -> &'a [String] {
        match self {
            Self::MajorDomains => &record.profile.major_domains,
            Self::MinorDomains => &record.profile.minor_domains,
            Self::ModulesHandled => &record.profile.modules_handled,
        }
    }
}

/// Conjunctive search over confirmed faculty.
///
/// Blank fields are ignored. A list criterion matches when the record's
/// list shares at least one value with it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyFilter {
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub staffid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub mobile_number: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub designation: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub faculty_type: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "flat_list")]
    pub major_domains: Vec<String>,
    #[serde(default, deserialize_with = "flat_list")]
    pub minor_domains: Vec<String>,
    #[serde(default, deserialize_with = "flat_list")]
    pub modules_handled: Vec<String>,
}

impl FacultyFilter {
    pub fn text_criteria(&self) -> Vec<(TextField, &str)> {
        [
            (TextField::Name, &self.name),
            (TextField::Staffid, &self.staffid),
            (TextField::MobileNumber, &self.mobile_number),
            (TextField::Email, &self.email),
            (TextField::Designation, &self.designation),
            (TextField::Department, &self.department),
            (TextField::FacultyType, &self.faculty_type),
            (TextField::Status, &self.status),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    pub fn list_criteria(&self) -> Vec<(ListField, &[String])> {
        [
            (ListField::MajorDomains, &self.major_domains),
            (ListField::MinorDomains, &self.minor_domains),
            (ListField::ModulesHandled, &self.modules_handled),
        ]
        .into_iter()
        .filter(|(_, values)| !values.is_empty())
        .map(|(field, values)| (field, values.as_slice()))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.text_criteria().is_empty() && self.list_criteria().is_empty()
    }

    /// Evaluate the filter against a record in memory.
    pub fn matches(&self, record: &FacultyRecord) -> bool {
        let text_ok = self.text_criteria().into_iter().all(|(field, needle)| {
            field
                .value(record)
                .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false)
        });

        text_ok
            && self.list_criteria().into_iter().all(|(field, wanted)| {
                field
                    .values(record)
                    .iter()
                    .any(|value| wanted.contains(value))
            })
    }
}
