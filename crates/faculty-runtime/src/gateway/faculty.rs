//! Handlers for the `/faculty` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use faculty_core::faculty::input::opt_string;
use faculty_core::faculty::{
    FacultyFilter, FacultyRecord, FacultySubmission, FacultyView, ReportPeriod,
};

use super::extract::{JsonBody, SubmissionForm};
use super::response::{ApiError, ApiResponse, ApiResult};
use super::server::AppState;
use crate::workflow::{ConfirmedUpdate, SaveOutcome};

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("Invalid faculty id '{}'", raw)))
}

fn views(records: Vec<FacultyRecord>) -> Vec<FacultyView> {
    records.iter().map(FacultyRecord::view).collect()
}

pub async fn save_faculty(State(state): State<AppState>, form: SubmissionForm) -> ApiResult {
    let submission = FacultySubmission::from_value(form.fields)?.validate()?;

    let photograph = match &form.photograph {
        Some(file) => Some(state.photos.store(file).await?),
        None => None,
    };

    let outcome = match state.service.save(submission, photograph.clone()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if let Some(path) = &photograph {
                state.photos.remove(path).await;
            }
            return Err(e.into());
        }
    };

    if let Some(old) = outcome.replaced_photograph() {
        state.photos.remove(old).await;
    }

    Ok(match outcome {
        SaveOutcome::Created(record) => ApiResponse::success(record.view())
            .with_message("Faculty saved successfully")
            .with_status(StatusCode::CREATED),
        SaveOutcome::Updated { record, .. } => {
            ApiResponse::success(record.view()).with_message("Faculty updated successfully")
        }
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveBody {
    #[serde(default, deserialize_with = "opt_string")]
    staffid: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    faculty_type: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    /// Form fields sent at the top level instead of under `data`.
    #[serde(flatten)]
    rest: Map<String, Value>,
}

pub async fn autosave_faculty(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AutosaveBody>,
) -> ApiResult {
    let data = match body.data {
        Some(data) => Some(data),
        None if !body.rest.is_empty() => Some(Value::Object(body.rest)),
        None => None,
    };

    let draft = state
        .service
        .autosave(body.staffid, body.faculty_type, data)
        .await?;
    Ok(ApiResponse::success(draft).with_message("Faculty autosaved successfully"))
}

#[derive(Debug, Deserialize)]
pub struct DraftQuery {
    staffid: Option<String>,
}

pub async fn get_autosaved_faculty(
    State(state): State<AppState>,
    Query(query): Query<DraftQuery>,
) -> ApiResult {
    let staffid = query
        .staffid
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::validation("Staff id is required"))?;
    let draft = state.service.get_draft(staffid.trim()).await?;
    Ok(ApiResponse::success(draft))
}

pub async fn delete_autosaved_faculty(
    State(state): State<AppState>,
    Path(staffid): Path<String>,
) -> ApiResult {
    state.service.delete_draft(&staffid).await?;
    Ok(ApiResponse::message("Autosaved faculty deleted successfully"))
}

pub async fn get_all_faculties(State(state): State<AppState>) -> ApiResult {
    let pending: Vec<FacultyView> = state
        .service
        .list_pending()
        .await?
        .iter()
        .map(|r| r.view().without_conduct())
        .collect();
    Ok(ApiResponse::success(pending))
}

pub async fn list_confirmed(State(state): State<AppState>) -> ApiResult {
    let confirmed = state.service.list_confirmed().await?;
    Ok(ApiResponse::success(views(confirmed)))
}

pub async fn list_pending_approval(State(state): State<AppState>) -> ApiResult {
    let waiting = state.service.list_pending_approval().await?;
    Ok(ApiResponse::success(views(waiting)))
}

pub async fn get_faculty(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let record = state.service.get(parse_id(&id)?).await?;
    Ok(ApiResponse::success(record.view()))
}

pub async fn delete_faculty(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let removed = state.service.delete(parse_id(&id)?).await?;
    if let Some(photo) = &removed.photograph {
        state.photos.remove(photo).await;
    }
    Ok(ApiResponse::message("Faculty deleted successfully"))
}

pub async fn update_faculty(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<ConfirmedUpdate>,
) -> ApiResult {
    let record = state.service.update_confirmed(parse_id(&id)?, update).await?;
    Ok(ApiResponse::success(record.view()).with_message("Faculty updated successfully"))
}

pub async fn verify_faculty(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let record = state.service.verify(parse_id(&id)?).await?;
    Ok(ApiResponse::success(record.view()).with_message("Faculty verified successfully"))
}

pub async fn approve_faculty(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let record = state.service.approve(parse_id(&id)?).await?;
    Ok(ApiResponse::success(record.view())
        .with_message("Faculty approved and moved to confirmed successfully"))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectBody {
    #[serde(default, alias = "remarks", deserialize_with = "opt_string")]
    rejection_remarks: Option<String>,
}

pub async fn reject_verification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<RejectBody>,
) -> ApiResult {
    let record = state
        .service
        .reject_verification(parse_id(&id)?, body.rejection_remarks)
        .await?;
    Ok(ApiResponse::success(record.view()).with_message("Faculty verification rejected"))
}

pub async fn reject_approval(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<RejectBody>,
) -> ApiResult {
    let record = state
        .service
        .reject_approval(parse_id(&id)?, body.rejection_remarks)
        .await?;
    Ok(ApiResponse::success(record.view()).with_message("Faculty approval rejected"))
}

pub async fn rejected_approvals(State(state): State<AppState>) -> ApiResult {
    let rejected = state.service.list_rejected_approvals().await?;
    Ok(ApiResponse::success(views(rejected)))
}

pub async fn rejected_verifications(State(state): State<AppState>) -> ApiResult {
    let rejected = state.service.list_rejected_verifications().await?;
    Ok(ApiResponse::success(views(rejected)))
}

#[derive(Debug, Default, Deserialize)]
pub struct NotifyBody {
    #[serde(
        default,
        rename = "notifyremarks",
        alias = "notifyRemarks",
        alias = "remarks",
        deserialize_with = "opt_string"
    )]
    notify_remarks: Option<String>,
}

pub async fn notify_faculty(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<NotifyBody>,
) -> ApiResult {
    let record = state
        .service
        .notify(parse_id(&id)?, body.notify_remarks)
        .await?;
    Ok(ApiResponse::success(record.view()).with_message("Principal notified successfully"))
}

pub async fn pending_for_hoo(State(state): State<AppState>) -> ApiResult {
    let records = state.service.list_pending_for_hoo().await?;
    Ok(ApiResponse::success(views(records)))
}

pub async fn acknowledge_hoo(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let record = state.service.acknowledge_hoo(parse_id(&id)?).await?;
    Ok(ApiResponse::success(record.view()).with_message("Acknowledged by head of office"))
}

pub async fn pending_for_si(State(state): State<AppState>) -> ApiResult {
    let records = state.service.list_pending_for_si().await?;
    Ok(ApiResponse::success(views(records)))
}

pub async fn acknowledge_si(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let record = state.service.acknowledge_si(parse_id(&id)?).await?;
    Ok(ApiResponse::success(record.view()).with_message("Acknowledged by SI"))
}

pub async fn fully_acknowledged(State(state): State<AppState>) -> ApiResult {
    let records = state.service.list_fully_acknowledged().await?;
    Ok(ApiResponse::success(views(records)))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    year: Option<String>,
}

impl ReportQuery {
    /// Requested period; the current year when none is given.
    fn period(&self) -> Result<ReportPeriod, ApiError> {
        match self.year.as_deref().map(str::trim) {
            None | Some("") => Ok(ReportPeriod::Year(Utc::now().year())),
            Some(raw) => Ok(raw.parse::<ReportPeriod>()?),
        }
    }
}

pub async fn monthly_entries(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult {
    let buckets = state.service.entries_report(query.period()?).await?;
    Ok(ApiResponse::success(buckets))
}

pub async fn sessions_handled(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult {
    let buckets = state.service.sessions_report(query.period()?).await?;
    Ok(ApiResponse::success(buckets))
}

pub async fn filter_faculties(
    State(state): State<AppState>,
    JsonBody(filter): JsonBody<FacultyFilter>,
) -> ApiResult {
    let records = state.service.filter(filter).await?;
    Ok(ApiResponse::success(views(records)))
}
