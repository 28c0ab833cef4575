//! `/v1/admin` routes: read-only reports plus the moderation actions that feed them.

use std::future::Future;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, Query, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::metrics::{record_moderation_action, record_report_build, record_report_failure};
use super::state::{GuardedModerationService, GuardedReportingEngine, ServerState};
use crate::lesson_store::{AdminActionType, LessonModerationUpdate, ReportStatus};
use crate::moderation::ModerationError;
use crate::reporting::{ReportError, ReportKind};

pub const ADMIN_EMAIL_HEADER: &str = "x-admin-email";

#[derive(Serialize)]
struct Success<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

impl<T: Serialize> Success<T> {
    fn new(body: T) -> Self {
        Success {
            success: true,
            body,
        }
    }
}

#[derive(Serialize)]
struct Failure {
    success: bool,
    message: String,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(Failure {
            success: false,
            message: message.into(),
        }),
    )
        .into_response()
}

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReviewedReports {
    updated_reports: usize,
}

#[derive(Deserialize, Debug, Default)]
struct PageQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct GrowthQuery {
    days: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct LessonsQuery {
    page: Option<String>,
    limit: Option<String>,
    category: Option<String>,
    visibility: Option<String>,
    is_featured: Option<String>,
    review_status: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ActivityQuery {
    page: Option<String>,
    limit: Option<String>,
    action_type: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ReviewReportsBody {
    status: String,
}

/// The acting admin, taken from the `X-Admin-Email` header.
///
/// Authentication happens upstream; this only identifies who to log.
#[derive(Debug)]
pub struct AdminEmail(pub String);

pub enum AdminExtractionError {
    MissingHeader,
}

impl IntoResponse for AdminExtractionError {
    fn into_response(self) -> Response {
        match self {
            AdminExtractionError::MissingHeader => failure(
                StatusCode::BAD_REQUEST,
                "Missing X-Admin-Email header",
            ),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminEmail {
    type Rejection = AdminExtractionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ADMIN_EMAIL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| AdminEmail(value.to_string()))
            .ok_or(AdminExtractionError::MissingHeader)
    }
}

fn failure_reason(err: &ReportError) -> &'static str {
    match err {
        ReportError::Store(_) => "store",
        ReportError::Timeout(_) => "timeout",
        ReportError::TaskFailed(_) => "task_failed",
    }
}

fn report_failure(kind: ReportKind, input: &str, err: ReportError) -> Response {
    error!(
        "Could not build {} report (input: {}): {}",
        kind.as_str(),
        input,
        err
    );
    record_report_failure(kind.as_str(), failure_reason(&err));
    failure(StatusCode::INTERNAL_SERVER_ERROR, kind.failure_message())
}

/// Awaits a report build, timing it and turning the outcome into a response.
async fn serve_report<T: Serialize>(
    kind: ReportKind,
    input: String,
    build: impl Future<Output = Result<T, ReportError>>,
) -> Response {
    debug!("Building {} report with {}", kind.as_str(), input);
    let start = Instant::now();
    let result = build.await;
    record_report_build(kind.as_str(), start.elapsed());

    match result {
        Ok(report) => Json(Success::new(report)).into_response(),
        Err(err) => report_failure(kind, &input, err),
    }
}

async fn get_dashboard(State(reporting): State<GuardedReportingEngine>) -> Response {
    let now = Utc::now();
    serve_report(
        ReportKind::Dashboard,
        format!("now={}", now.to_rfc3339()),
        reporting.dashboard_summary(now),
    )
    .await
}

async fn get_growth(
    State(reporting): State<GuardedReportingEngine>,
    Query(query): Query<GrowthQuery>,
) -> Response {
    let now = Utc::now();
    let days = reporting.growth_days(query.days.as_deref());
    serve_report(
        ReportKind::Growth,
        format!("days={}", days),
        reporting.growth_series(now, days),
    )
    .await
}

async fn get_lessons(
    State(reporting): State<GuardedReportingEngine>,
    Query(query): Query<LessonsQuery>,
) -> Response {
    let page = reporting.page_request(query.page.as_deref(), query.limit.as_deref());
    let filter = reporting.lesson_filter(
        query.category.as_deref(),
        query.visibility.as_deref(),
        query.is_featured.as_deref(),
        query.review_status.as_deref(),
    );
    let input = format!("{:?} {:?}", filter, page);
    serve_report(
        ReportKind::LessonModeration,
        input,
        reporting.lesson_moderation_page(filter, page),
    )
    .await
}

async fn get_reports(
    State(reporting): State<GuardedReportingEngine>,
    Query(query): Query<PageQuery>,
) -> Response {
    let page = reporting.page_request(query.page.as_deref(), query.limit.as_deref());
    serve_report(
        ReportKind::ReportQueue,
        format!("{:?}", page),
        reporting.report_queue_page(page),
    )
    .await
}

async fn get_activity(
    State(reporting): State<GuardedReportingEngine>,
    Query(query): Query<ActivityQuery>,
) -> Response {
    let page = reporting.page_request(query.page.as_deref(), query.limit.as_deref());
    let action_type = query.action_type.as_deref().filter(|s| !s.is_empty());
    serve_report(
        ReportKind::AdminActivity,
        format!("actionType={:?} {:?}", action_type, page),
        reporting.admin_activity_page(action_type, page),
    )
    .await
}

fn moderation_failure(action: AdminActionType, lesson_id: &str, err: ModerationError) -> Response {
    let (status, outcome) = match &err {
        ModerationError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        ModerationError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid"),
        ModerationError::Store(_) | ModerationError::TaskFailed(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "error")
        }
    };
    record_moderation_action(action.as_str(), outcome);

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(
            "{} action on lesson {} failed: {}",
            action.as_str(),
            lesson_id,
            err
        );
        failure(status, "Failed to apply moderation action")
    } else {
        warn!(
            "{} action on lesson {} rejected: {}",
            action.as_str(),
            lesson_id,
            err
        );
        failure(status, err.to_string())
    }
}

fn invalid_body(action: AdminActionType, rejection: JsonRejection) -> Response {
    record_moderation_action(action.as_str(), "invalid");
    failure(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

async fn patch_lesson(
    AdminEmail(admin): AdminEmail,
    State(moderation): State<GuardedModerationService>,
    Path(id): Path<String>,
    body: Result<Json<LessonModerationUpdate>, JsonRejection>,
) -> Response {
    let action = AdminActionType::Moderated;
    let Json(update) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(action, rejection),
    };

    match moderation.moderate_lesson(&admin, &id, update).await {
        Ok(()) => {
            record_moderation_action(action.as_str(), "ok");
            Json(Success::new(Empty {})).into_response()
        }
        Err(err) => moderation_failure(action, &id, err),
    }
}

async fn delete_lesson(
    AdminEmail(admin): AdminEmail,
    State(moderation): State<GuardedModerationService>,
    Path(id): Path<String>,
) -> Response {
    let action = AdminActionType::Deleted;
    match moderation.delete_lesson(&admin, &id).await {
        Ok(()) => {
            record_moderation_action(action.as_str(), "ok");
            Json(Success::new(Empty {})).into_response()
        }
        Err(err) => moderation_failure(action, &id, err),
    }
}

async fn patch_reports(
    AdminEmail(admin): AdminEmail,
    State(moderation): State<GuardedModerationService>,
    Path(lesson_id): Path<String>,
    body: Result<Json<ReviewReportsBody>, JsonRejection>,
) -> Response {
    let action = AdminActionType::ReportReviewed;
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(action, rejection),
    };
    let Some(status) = ReportStatus::parse(body.status.trim()) else {
        record_moderation_action(action.as_str(), "invalid");
        return failure(
            StatusCode::BAD_REQUEST,
            format!("Unknown report status '{}'", body.status),
        );
    };

    match moderation.review_reports(&admin, &lesson_id, status).await {
        Ok(updated_reports) => {
            record_moderation_action(action.as_str(), "ok");
            Json(Success::new(ReviewedReports { updated_reports })).into_response()
        }
        Err(err) => moderation_failure(action, &lesson_id, err),
    }
}

pub fn make_admin_routes(state: ServerState) -> Router {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/growth", get(get_growth))
        .route("/lessons", get(get_lessons))
        .route("/lessons/{id}", patch(patch_lesson).delete(delete_lesson))
        .route("/reports", get(get_reports))
        .route("/reports/{lesson_id}", patch(patch_reports))
        .route("/activity", get(get_activity))
        .with_state(state)
}
