//! The shared axum handler every mounted API's route dispatches to
//! (§4.I): build a [`RequestContext`] from the inbound request, walk the
//! plan, translate its [`BuiltResponse`] back into an axum response.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Extension, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use servflow_context::RequestContext;
use servflow_response::BuiltResponse;

use crate::mounted_api::MountedApi;

/// §8: "body path over 1 MiB is truncated to 1 MiB for `body()` lookups"
/// — oversized requests still execute, `body()` just can't see past this
/// many bytes of the raw request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

fn header_map_to_strings(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.to_string(), value.to_str().ok()?.to_string())))
        .collect()
}

fn truncate_body(body: &[u8]) -> &[u8] {
    &body[..body.len().min(MAX_BODY_BYTES)]
}

fn built_response_to_axum(built: BuiltResponse) -> Response {
    let status = StatusCode::from_u16(built.code).unwrap_or(StatusCode::OK);
    match built.content_type {
        Some(content_type) => (status, [("content-type", content_type)], built.body).into_response(),
        None => (status, built.body).into_response(),
    }
}

/// Any failure below this point is logged, never surfaced — §4.I: "Any
/// `nil` response or error from the plan results in HTTP 500 with a
/// static opaque message".
const OPAQUE_ERROR_BODY: &str = "internal server error";

pub async fn run_plan(
    Extension(api): Extension<Arc<MountedApi>>,
    headers: HeaderMap,
    Path(url_params): Path<HashMap<String, String>>,
    Query(query_params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let mut ctx = RequestContext::new()
        .with_headers(header_map_to_strings(&headers))
        .with_query_params(query_params)
        .with_url_params(url_params)
        .with_sub_executor(api.sub_executor());

    let truncated = truncate_body(&body);
    if !truncated.is_empty() {
        if let Ok(value) = serde_json::from_slice(truncated) {
            ctx = ctx.with_body(value);
        }
    }

    match api.runtime.execute(&api.plan, &ctx, api.plan.http_next.clone(), "").await {
        Ok(built) => built_response_to_axum(built),
        Err(err) => {
            tracing::error!(plan_id = %api.plan.id, error = %err, "plan execution failed");
            (StatusCode::INTERNAL_SERVER_ERROR, OPAQUE_ERROR_BODY).into_response()
        }
    }
}

pub async fn health() -> &'static str {
    "ok"
}
