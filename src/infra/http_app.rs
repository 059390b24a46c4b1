use axum::{
    routing::{any_service, get},
    Router,
};
use std::sync::Arc;

use crate::infra::mcp::MessagesSvc;
use crate::infra::runtime::mcp_transport::{make_streamable_http_service, LocalSessionManager};

/// `/healthz` + streamable MCP at `/mcp`.
pub fn build_app(factory: impl Fn() -> MessagesSvc + Send + Sync + Clone + 'static) -> Router {
    let session_mgr = Arc::new(LocalSessionManager::default());
    let mcp_service = make_streamable_http_service(factory, session_mgr);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route_service("/mcp", any_service(mcp_service))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use hyper::Request;
    use tower::ServiceExt;

    use crate::clients::osascript::FnRunner;

    #[tokio::test]
    async fn healthz_answers_ok() {
        let runner = Arc::new(FnRunner::new(|_s: String| async move { Ok(String::new()) }));
        let app = build_app(move || MessagesSvc::new(runner.clone()));
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert!(resp.status().is_success());
        let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }
}
