use crate::auth::actor::Actor;
use crate::error::AppError;
use crate::model::presence::{PresenceRecord, PresenceStatus};
use crate::service::PresenceService;
use crate::service::aggregation::{GroupBy, MonthlySummary, PresenceAnalysis};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct RecordPresence {
    /// Target user. Required for admins; students may omit it or pass their own id.
    #[schema(example = 5)]
    pub user_id: Option<u64>,
    #[schema(example = "present")]
    pub status: PresenceStatus,
    /// Defaults to today. Must not be in the past.
    #[schema(example = "2024-06-01", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Limit the history to one user
    pub user_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct AnalysisRequest {
    #[schema(example = "2024-06-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-06-30", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "class")]
    pub group_by: GroupBy,
}

#[derive(Serialize, ToSchema)]
pub struct RecordResponse {
    #[schema(example = "Attendance recorded")]
    pub message: String,
    pub data: PresenceRecord,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    #[schema(example = "Attendance history found")]
    pub message: String,
    pub data: Vec<PresenceRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    pub data: MonthlySummary,
}

#[derive(Serialize, ToSchema)]
pub struct AnalysisResponse {
    pub data: PresenceAnalysis,
}

fn history_response(records: Vec<PresenceRecord>) -> HttpResponse {
    let message = if records.is_empty() {
        "No attendance history"
    } else {
        "Attendance history found"
    };
    HttpResponse::Ok().json(HistoryResponse {
        message: message.into(),
        data: records,
    })
}

/// Record attendance
#[utoipa::path(
    post,
    path = "/api/presence",
    request_body(
        content = RecordPresence,
        description = "Attendance payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Attendance recorded", body = RecordResponse),
        (status = 400, description = "Invalid status or a date in the past"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Recording for another user is not allowed"),
        (status = 409, description = "Attendance already recorded for this date"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn record_presence(
    actor: Actor,
    service: web::Data<PresenceService>,
    payload: web::Json<RecordPresence>,
) -> Result<impl Responder, AppError> {
    let payload = payload.into_inner();

    let record = service
        .record(&actor, payload.user_id, payload.status, payload.date)
        .await?;

    Ok(HttpResponse::Created().json(RecordResponse {
        message: "Attendance recorded".into(),
        data: record,
    }))
}

/// Attendance history of the caller, or of anyone for admins
#[utoipa::path(
    get,
    path = "/api/presence/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Attendance history, possibly empty", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Viewing another user's history is not allowed")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn history(
    actor: Actor,
    service: web::Data<PresenceService>,
    query: web::Query<HistoryQuery>,
) -> Result<impl Responder, AppError> {
    let records = service.history(&actor, query.user_id).await?;
    Ok(history_response(records))
}

/// Attendance history of one user (admin only)
#[utoipa::path(
    get,
    path = "/api/presence/history/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User whose history to fetch")
    ),
    responses(
        (status = 200, description = "Attendance history", body = HistoryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "No attendance history for this user")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn history_by_user_id(
    actor: Actor,
    service: web::Data<PresenceService>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let records = service
        .history_by_user_id(&actor, path.into_inner())
        .await?;
    Ok(history_response(records))
}

/// Per-status counts of the current month
#[utoipa::path(
    get,
    path = "/api/presence/summary/{user_id}",
    params(
        ("user_id" = u64, Path, description = "User to summarize")
    ),
    responses(
        (status = 200, description = "Monthly summary", body = SummaryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn monthly_summary(
    _actor: Actor,
    service: web::Data<PresenceService>,
    path: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let summary = service.monthly_summary(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(SummaryResponse { data: summary }))
}

/// Attendance rates grouped by class or position
#[utoipa::path(
    post,
    path = "/api/presence/analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Grouped analysis", body = AnalysisResponse),
        (status = 400, description = "Invalid date range or group_by"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Presence"
)]
pub async fn analyze_presence(
    _actor: Actor,
    service: web::Data<PresenceService>,
    payload: web::Json<AnalysisRequest>,
) -> Result<impl Responder, AppError> {
    let analysis = service
        .analyze_presence(payload.start_date, payload.end_date, payload.group_by)
        .await?;
    Ok(HttpResponse::Ok().json(AnalysisResponse { data: analysis }))
}
