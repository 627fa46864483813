//! Review server HTTP handlers.

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use log::{error, info, warn};

use super::queries::{fetch_candidate, insert_approved};
use super::types::{ApprovedPoint, ReviewState, SaveForm};
use crate::config::END_OF_DATA;

const REVIEW_PAGE: &str = include_str!("../../static/review.html");

/// The map review page
pub async fn review_page() -> Html<&'static str> {
    Html(REVIEW_PAGE)
}

/// Next unreviewed record, or the end-of-data marker
pub async fn next_record(State(state): State<ReviewState>) -> Response {
    match fetch_candidate(&state.pool, &state.tables).await {
        Ok(Some(candidate)) => candidate.to_body().into_response(),
        Ok(None) => END_OF_DATA.into_response(),
        Err(e) => {
            error!("Failed to fetch a review candidate: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "database error").into_response()
        }
    }
}

/// Stores an approved point and answers `0`
pub async fn save_point(State(state): State<ReviewState>, Form(form): Form<SaveForm>) -> Response {
    let point = match ApprovedPoint::try_from(form) {
        Ok(point) => point,
        Err(reason) => {
            warn!("Rejected save request: {reason}");
            return (StatusCode::BAD_REQUEST, reason).into_response();
        }
    };
    match insert_approved(&state.pool, &state.tables.output_table, &point).await {
        Ok(()) => {
            info!(
                "Approved locality {} result {} at {}, {}",
                point.locality_id, point.result_id, point.latitude, point.longitude
            );
            "0".into_response()
        }
        Err(e) => {
            error!("Failed to save approved point: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "database error").into_response()
        }
    }
}

/// CORS preflight
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Adds the permissive CORS headers to every response.
pub async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(
            "Origin, Accept, Content-Type, X-Requested-With, X-CSRF-Token",
        ),
    );
    response
}
