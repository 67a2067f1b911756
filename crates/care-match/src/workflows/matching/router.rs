use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use super::domain::{EngagementId, LeadId, TherapistId};
use super::repository::{
    EngagementStatusView, LeadNotifier, LeadView, MatchingRepository, RepositoryError,
};
use super::service::{EngagementDraft, LeadResponseAction, MatchingService, MatchingServiceError};

/// Router builder exposing HTTP endpoints for engagement intake, match runs,
/// and the two lead status toggles.
pub fn matching_router<R, N>(service: Arc<MatchingService<R, N>>) -> Router
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    Router::new()
        .route("/api/v1/engagements", post(open_engagement_handler::<R, N>))
        .route(
            "/api/v1/engagements/:engagement_id",
            get(engagement_status_handler::<R, N>),
        )
        .route(
            "/api/v1/engagements/:engagement_id/match",
            post(run_match_handler::<R, N>),
        )
        .route(
            "/api/v1/leads/:lead_id/response",
            post(lead_response_handler::<R, N>),
        )
        .route(
            "/api/v1/leads/:lead_id/approve",
            post(approve_lead_handler::<R, N>),
        )
        .route(
            "/api/v1/therapists/:therapist_id/leads",
            get(visible_leads_handler::<R, N>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RunMatchRequest {
    /// Reference time for visibility windows; defaults to the current time.
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LeadResponseRequest {
    pub(crate) response: LeadResponseAction,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct VisibleLeadsQuery {
    /// Evaluation instant for the visibility filter; defaults to now.
    #[serde(default)]
    pub(crate) at: Option<DateTime<Utc>>,
}

pub(crate) async fn open_engagement_handler<R, N>(
    State(service): State<Arc<MatchingService<R, N>>>,
    axum::Json(draft): axum::Json<EngagementDraft>,
) -> Response
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    match service.open_engagement(draft) {
        Ok(engagement) => {
            let view = EngagementStatusView::from_engagement(&engagement);
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn engagement_status_handler<R, N>(
    State(service): State<Arc<MatchingService<R, N>>>,
    Path(engagement_id): Path<String>,
) -> Response
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    let id = EngagementId(engagement_id);
    match service.engagement(&id) {
        Ok(engagement) => {
            let view = EngagementStatusView::from_engagement(&engagement);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn run_match_handler<R, N>(
    State(service): State<Arc<MatchingService<R, N>>>,
    Path(engagement_id): Path<String>,
    body: Option<axum::Json<RunMatchRequest>>,
) -> Response
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    let id = EngagementId(engagement_id);
    let now = body
        .and_then(|axum::Json(request)| request.now)
        .unwrap_or_else(Utc::now);

    match service.run_matching(&id, now) {
        Ok(leads) => {
            let views: Vec<LeadView> = leads.iter().map(LeadView::from_lead).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn lead_response_handler<R, N>(
    State(service): State<Arc<MatchingService<R, N>>>,
    Path(lead_id): Path<String>,
    axum::Json(request): axum::Json<LeadResponseRequest>,
) -> Response
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    let id = LeadId(lead_id);
    match service.record_response(&id, request.response) {
        Ok(lead) => (StatusCode::OK, axum::Json(LeadView::from_lead(&lead))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn approve_lead_handler<R, N>(
    State(service): State<Arc<MatchingService<R, N>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    let id = LeadId(lead_id);
    match service.approve_lead(&id) {
        Ok(lead) => (StatusCode::OK, axum::Json(LeadView::from_lead(&lead))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn visible_leads_handler<R, N>(
    State(service): State<Arc<MatchingService<R, N>>>,
    Path(therapist_id): Path<String>,
    Query(query): Query<VisibleLeadsQuery>,
) -> Response
where
    R: MatchingRepository + 'static,
    N: LeadNotifier + 'static,
{
    let id = TherapistId(therapist_id);
    let at = query.at.unwrap_or_else(Utc::now);

    match service.visible_leads(&id, at) {
        Ok(leads) => {
            let views: Vec<LeadView> = leads.iter().map(LeadView::from_lead).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: MatchingServiceError) -> Response {
    let status = match &error {
        MatchingServiceError::Validation(_) | MatchingServiceError::Match(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        MatchingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MatchingServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        MatchingServiceError::EngagementNotOpen(_)
        | MatchingServiceError::EngagementFilled(_)
        | MatchingServiceError::LeadAlreadyResolved(_) => StatusCode::CONFLICT,
        MatchingServiceError::Repository(RepositoryError::Unavailable(_))
        | MatchingServiceError::Alert(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}
