// Module: http
// HTTP/JSON control surface and the viewer WebSocket endpoint

pub mod error;
pub mod health;
pub mod live;
pub mod websocket;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use chatcast_core::hub::MessageHub;
use chatcast_core::relay::SessionCoordinator;

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SessionCoordinator>,
    pub hub: MessageHub,
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState, static_dir: Option<&str>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/live/connect", post(live::connect))
        .route("/api/live/disconnect", post(live::disconnect))
        .route("/ws", get(websocket::websocket_handler))
        .with_state(state);

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router.layer(cors).layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use chatcast_core::upstream::{
        ConnectOptions, LiveClient, LiveClientFactory, LiveEventReceiver, UpstreamError,
    };

    struct StubClient {
        fail_connect: bool,
    }

    #[async_trait::async_trait]
    impl LiveClient for StubClient {
        async fn connect(&self) -> Result<(), UpstreamError> {
            if self.fail_connect {
                Err(UpstreamError::Connect("handshake refused".to_string()))
            } else {
                Ok(())
            }
        }

        async fn disconnect(&self) -> Result<(), UpstreamError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct StubFactory {
        fail_connect: AtomicBool,
    }

    impl LiveClientFactory for StubFactory {
        fn create(
            &self,
            _stream_id: &str,
            _options: ConnectOptions,
        ) -> (Arc<dyn LiveClient>, LiveEventReceiver) {
            let (_tx, rx) = mpsc::unbounded_channel();
            let client = Arc::new(StubClient {
                fail_connect: self.fail_connect.load(Ordering::Relaxed),
            });
            (client, rx)
        }
    }

    fn test_router(factory: Arc<StubFactory>) -> Router {
        let hub = MessageHub::new();
        let coordinator = Arc::new(SessionCoordinator::new(
            factory as Arc<dyn LiveClientFactory>,
            hub.clone(),
        ));
        create_router(AppState { coordinator, hub }, None)
    }

    fn json_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_status() {
        let router = test_router(Arc::new(StubFactory::default()));

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["subscribers"], 0);
        assert!(json.get("streamId").is_none());
    }

    #[tokio::test]
    async fn test_connect_requires_stream_id() {
        let router = test_router(Arc::new(StubFactory::default()));

        let response = router
            .oneshot(json_post("/api/live/connect", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "streamId is required");
    }

    #[tokio::test]
    async fn test_connect_acknowledges_start() {
        let router = test_router(Arc::new(StubFactory::default()));

        let response = router
            .oneshot(json_post("/api/live/connect", r#"{"streamId":"abc123"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Connection process to abc123 started.");
    }

    #[tokio::test]
    async fn test_connect_failure_returns_500_with_cause() {
        let factory = Arc::new(StubFactory::default());
        factory.fail_connect.store(true, Ordering::Relaxed);
        let router = test_router(factory);

        let response = router
            .oneshot(json_post("/api/live/connect", r#"{"streamId":"abc123"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Failed to start upstream connection");
        assert!(json["error"].as_str().unwrap().contains("handshake refused"));
    }

    #[tokio::test]
    async fn test_disconnect_without_session_returns_400() {
        let router = test_router(Arc::new(StubFactory::default()));

        let response = router
            .oneshot(json_post("/api/live/disconnect", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["message"], "No active upstream session");
    }

    #[tokio::test]
    async fn test_connect_then_disconnect_round_trip() {
        let router = test_router(Arc::new(StubFactory::default()));

        let response = router
            .clone()
            .oneshot(json_post("/api/live/connect", r#"{"streamId":"abc123"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["streamId"], "abc123");

        let response = router
            .oneshot(json_post("/api/live/disconnect", "{}"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "Upstream session disconnected.");
    }
}
