//! Mounts every configured API's `<method> <listenPath>` (§4.I) onto one
//! [`Router`], plus the global `GET /health` the binding always provides
//! regardless of how many APIs are configured.
//!
//! `listenPath` uses axum's own path-parameter syntax (`{name}`) — the
//! reference source gives no different convention for it, so the
//! binding just forwards it straight to axum's router rather than
//! inventing a translation layer.

use std::sync::Arc;

use axum::extract::Extension;
use axum::routing::{delete, get, head, options, patch, post, put, MethodRouter};
use axum::Router;
use servflow_core::HttpMethod;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{health, run_plan};
use crate::mounted_api::MountedApi;

fn method_router(method: HttpMethod, api: Arc<MountedApi>) -> MethodRouter {
    let route = match method {
        HttpMethod::Get => get(run_plan),
        HttpMethod::Post => post(run_plan),
        HttpMethod::Put => put(run_plan),
        HttpMethod::Patch => patch(run_plan),
        HttpMethod::Delete => delete(run_plan),
        HttpMethod::Options => options(run_plan),
        HttpMethod::Head => head(run_plan),
    };
    route.layer(Extension(api))
}

/// Build the router for a set of compiled, mounted APIs.
pub fn build_router(apis: Vec<MountedApi>) -> Router {
    let mut router = Router::new().route("/health", get(health));

    for api in apis {
        let method = api.plan.http_method;
        let listen_path = api.plan.http_listen_path.clone();
        router = router.route(&listen_path, method_router(method, Arc::new(api)));
    }

    router.layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive())
}
