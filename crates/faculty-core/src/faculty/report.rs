use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::record::FacultyRecord;
use super::status::FacultyType;
use crate::error::FacultyError;

/// Years covered by the all-time report.
pub const REPORT_YEARS: RangeInclusive<i32> = 2025..=2035;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Reporting window: one calendar year by month, or all years by year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Year(i32),
    All,
}

impl ReportPeriod {
    fn labels(&self) -> Vec<String> {
        match self {
            Self::Year(_) => MONTHS.iter().map(|m| m.to_string()).collect(),
            Self::All => REPORT_YEARS.map(|y| y.to_string()).collect(),
        }
    }

    fn bucket(&self, date: NaiveDate) -> Option<usize> {
        match self {
            Self::Year(year) if date.year() == *year => Some(date.month0() as usize),
            Self::Year(_) => None,
            Self::All if REPORT_YEARS.contains(&date.year()) => {
                Some((date.year() - *REPORT_YEARS.start()) as usize)
            }
            Self::All => None,
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = FacultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        match s.parse::<i32>() {
            Ok(year) if (1900..=9999).contains(&year) => Ok(Self::Year(year)),
            _ => Err(FacultyError::validation(format!("Invalid year '{}'", s))),
        }
    }
}

/// Faculty joined within one bucket, split by type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryBucket {
    pub label: String,
    pub internal: u64,
    pub external: u64,
    pub contract: u64,
    pub total: u64,
}

/// Courses handled by faculty who joined within one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBucket {
    pub label: String,
    pub sessions: u64,
}

/// Count faculty entries per bucket by faculty type.
pub fn entries_by_period(records: &[FacultyRecord], period: ReportPeriod) -> Vec<EntryBucket> {
    let mut buckets: Vec<EntryBucket> = period
        .labels()
        .into_iter()
        .map(|label| EntryBucket {
            label,
            internal: 0,
            external: 0,
            contract: 0,
            total: 0,
        })
        .collect();

    for record in records {
        let Some(idx) = record.profile.join_date().and_then(|d| period.bucket(d)) else {
            continue;
        };
        let bucket = &mut buckets[idx];
        match record.profile.faculty_type {
            FacultyType::Internal => bucket.internal += 1,
            FacultyType::External => bucket.external += 1,
            FacultyType::Contract => bucket.contract += 1,
        }
        bucket.total += 1;
    }

    buckets
}

/// Sum courses handled per bucket.
pub fn sessions_by_period(records: &[FacultyRecord], period: ReportPeriod) -> Vec<SessionBucket> {
    let mut buckets: Vec<SessionBucket> = period
        .labels()
        .into_iter()
        .map(|label| SessionBucket { label, sessions: 0 })
        .collect();

    for record in records {
        if let Some(idx) = record.profile.join_date().and_then(|d| period.bucket(d)) {
            buckets[idx].sessions += record.profile.courses_handled.len() as u64;
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faculty::{CourseHandled, FacultyProfile};

    fn confirmed(faculty_type: FacultyType, joined: Option<&str>, fallback: Option<&str>) -> FacultyRecord {
        let mut profile = FacultyProfile::new("Asha Rao", "9876543210", faculty_type);
        profile.joined = joined.map(|d| d.parse().unwrap());
        profile.date_of_joining = fallback.map(|d| d.parse().unwrap());
        profile.courses_handled = vec![CourseHandled::default(); 2];
        FacultyRecord::new("FAC1", profile, true)
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("All".parse::<ReportPeriod>().unwrap(), ReportPeriod::All);
        assert_eq!("2026".parse::<ReportPeriod>().unwrap(), ReportPeriod::Year(2026));
        assert!("twenty".parse::<ReportPeriod>().is_err());
        assert!("".parse::<ReportPeriod>().is_err());
    }

    #[test]
    fn test_monthly_buckets() {
        let records = vec![
            confirmed(FacultyType::Internal, Some("2026-01-10"), None),
            confirmed(FacultyType::External, Some("2026-01-20"), None),
            confirmed(FacultyType::Contract, None, Some("2026-12-01")),
            confirmed(FacultyType::Internal, Some("2027-01-10"), None),
        ];

        let buckets = entries_by_period(&records, ReportPeriod::Year(2026));
        assert_eq!(buckets.len(), 12);
        assert_eq!(buckets[0].label, "Jan");
        assert_eq!(buckets[0].internal, 1);
        assert_eq!(buckets[0].external, 1);
        assert_eq!(buckets[0].total, 2);
        assert_eq!(buckets[11].contract, 1);
        assert_eq!(buckets.iter().map(|b| b.total).sum::<u64>(), 3);
    }

    #[test]
    fn test_joined_takes_precedence_over_date_of_joining() {
        let records = vec![confirmed(
            FacultyType::Internal,
            Some("2026-03-01"),
            Some("2026-07-01"),
        )];
        let buckets = entries_by_period(&records, ReportPeriod::Year(2026));
        assert_eq!(buckets[2].total, 1);
        assert_eq!(buckets[6].total, 0);
    }

    #[test]
    fn test_all_years_sum_matches_in_window_records() {
        let records = vec![
            confirmed(FacultyType::Internal, Some("2025-01-01"), None),
            confirmed(FacultyType::External, Some("2030-06-15"), None),
            confirmed(FacultyType::Contract, Some("2035-12-31"), None),
            confirmed(FacultyType::Internal, Some("2024-12-31"), None),
            confirmed(FacultyType::Internal, Some("2036-01-01"), None),
            confirmed(FacultyType::Internal, None, None),
        ];

        let buckets = entries_by_period(&records, ReportPeriod::All);
        assert_eq!(buckets.len(), 11);
        assert_eq!(buckets[0].label, "2025");
        assert_eq!(buckets[10].label, "2035");

        let in_window = records
            .iter()
            .filter(|r| {
                r.profile
                    .join_date()
                    .map(|d| REPORT_YEARS.contains(&d.year()))
                    .unwrap_or(false)
            })
            .count() as u64;
        assert_eq!(buckets.iter().map(|b| b.total).sum::<u64>(), in_window);
        assert_eq!(in_window, 3);
    }

    #[test]
    fn test_sessions_sum_courses() {
        let records = vec![
            confirmed(FacultyType::Internal, Some("2026-05-01"), None),
            confirmed(FacultyType::External, Some("2026-05-09"), None),
        ];

        let buckets = sessions_by_period(&records, ReportPeriod::Year(2026));
        assert_eq!(buckets[4].sessions, 4);

        let buckets = sessions_by_period(&records, ReportPeriod::All);
        assert_eq!(buckets[1].sessions, 4);
    }
}
