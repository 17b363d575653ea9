//! Endpoint handlers.
//!
//! Handlers receive the [`RequestContext`] explicitly and pass it down.
//! `/work` input is validated by [`validate_work_request`], which runs
//! outside the metrics layer, so a rejected request never reaches the
//! instrumented region or opens a business span.

use axum::{
    extract::{Query, Request, State},
    middleware::Next,
    response::Response,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::http::request::RequestContext;
use crate::http::response::{ApiError, HelloResponse, WorkResponse};
use crate::http::server::AppState;
use crate::work::{DurationError, WorkDuration};

pub const HELLO_ROUTE: &str = "/hello";
pub const WORK_ROUTE: &str = "/work";

pub async fn hello(ctx: RequestContext) -> Json<HelloResponse> {
    let timestamp = Utc::now().timestamp_millis();
    let request_id = ctx.request_id().map(ToString::to_string);

    info!(
        endpoint = HELLO_ROUTE,
        timestamp,
        request_id = request_id.as_deref(),
        "hello endpoint invoked"
    );

    Json(HelloResponse {
        status: "Hello".to_string(),
        timestamp,
        request_id,
    })
}

/// Raw query; `ms` stays textual so an empty value can mean "absent".
#[derive(Debug, Deserialize)]
pub struct WorkQuery {
    ms: Option<String>,
}

/// Parse and bound-check `ms`, then hand the validated duration to the route.
pub async fn validate_work_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Query(query) = Query::<WorkQuery>::try_from_uri(request.uri()).map_err(|rejection| {
        warn!(endpoint = WORK_ROUTE, error = %rejection, "work request rejected");
        DurationError::NotAnInteger
    })?;

    let duration = WorkDuration::from_query(query.ms.as_deref(), &state.work_limits).map_err(|err| {
        warn!(endpoint = WORK_ROUTE, requested_ms = query.ms.as_deref(), error = %err, "work request rejected");
        err
    })?;

    request.extensions_mut().insert(duration);
    Ok(next.run(request).await)
}

pub async fn work(
    State(state): State<AppState>,
    ctx: RequestContext,
    Extension(duration): Extension<WorkDuration>,
) -> Result<Json<WorkResponse>, ApiError> {
    info!(endpoint = WORK_ROUTE, requested_ms = duration.as_millis(), "work api invoked");

    let report = state.work.perform_work(&ctx, duration).await.map_err(|err| {
        warn!(endpoint = WORK_ROUTE, requested_ms = duration.as_millis(), error = %err, "work api failed");
        ApiError::from(err)
    })?;
    let requested_ms = report.requested.as_millis();
    let actual_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX);

    let request_id = ctx.request_id().map(ToString::to_string);
    info!(
        endpoint = WORK_ROUTE,
        request_id = request_id.as_deref(),
        requested_ms,
        actual_ms,
        "work api complete"
    );

    Ok(Json(WorkResponse {
        status: "work complete".to_string(),
        requested_ms,
        actual_ms,
        request_id,
    }))
}
