//! HTTP surface for the single-actor report server.
//!
//! Every request runs inside a store request scope (see [`scope`]), so write
//! locks a handler takes are released when its response is produced. The
//! handlers serve stored resources, accept client submissions to the actor's
//! outbox, accept federated deliveries to its inbox, and answer a permissive
//! OAuth handshake.

pub mod actor;
pub mod auth;
pub mod clock;
pub mod config;
pub mod delivery;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod hooks;
pub mod router;
pub mod scope;
pub mod server;
pub mod state;
pub mod tls;

pub use auth::{Credentials, PermissiveVerifier, Verifier, ISSUED_CODE, ISSUED_TOKEN};
pub use clock::{Clock, FixedClock, LocalClock};
pub use config::{ServerConfig, TlsConfig};
pub use delivery::{Deliverer, SyncDeliverer};
pub use error::{ServerError, ServerResult};
pub use hooks::{Callbacker, Direction, NothingCallbacker};
pub use server::ReportServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use chrono::{DateTime, Utc};
    use repsrv_types::{Iri, Resource};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    #[derive(Default)]
    struct RecordingDeliverer {
        sent: Mutex<Vec<(Value, String)>>,
    }

    #[async_trait]
    impl Deliverer for RecordingDeliverer {
        async fn deliver(&self, payload: &[u8], to: &Iri) {
            let value = serde_json::from_slice(payload).unwrap();
            self.sent.lock().unwrap().push((value, to.to_string()));
        }
    }

    fn app() -> Router {
        ReportServer::new(ServerConfig::default()).unwrap().router()
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn get(app: &Router, uri: &str) -> Response {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_outbox(body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/actor/outbox")
            .header(header::CONTENT_TYPE, "application/activity+json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn post_inbox(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/actor/inbox")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let response = get(&app(), "/v1/health").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn info_endpoint() {
        let response = get(&app(), "/v1/info").await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["actor"], "http://localhost:8080/actor");
        assert_eq!(body["objects"], 0);
    }

    #[tokio::test]
    async fn actor_profile_is_served() {
        let response = get(&app(), "/actor").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/activity+json"
        );
        let body = json_body(response).await;
        assert_eq!(body["id"], "http://localhost:8080/actor");
        assert_eq!(body["type"], "Person");
        assert_eq!(body["inbox"], "http://localhost:8080/actor/inbox");
        assert_eq!(
            body["endpoints"]["oauthTokenEndpoint"],
            "http://localhost:8080/token"
        );
    }

    #[tokio::test]
    async fn collections_start_empty() {
        let app = app();
        for path in ["/actor/inbox", "/actor/outbox", "/actor/following", "/actor/liked"] {
            let response = get(&app, path).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
            let body = json_body(response).await;
            assert_eq!(body["type"], "OrderedCollection");
            assert_eq!(body["totalItems"], 0);
        }
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let response = get(&app(), "/new/404").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn outbox_requires_token() {
        let app = app();
        let note = json!({"type": "Create", "object": {"type": "Note"}});
        let response = send(&app, post_outbox(note.clone(), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let response = send(&app, post_outbox(note, Some("wrong"))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn outbox_post_creates_and_lists() {
        let app = app();
        let note = json!({"id": "https://elsewhere/1", "type": "Create"});
        let response = send(&app, post_outbox(note, Some(ISSUED_TOKEN))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();
        assert_eq!(location, "http://localhost:8080/new/1");

        let created = json_body(get(&app, "/new/1").await).await;
        assert_eq!(created["id"], location);
        assert_eq!(created["actor"], "http://localhost:8080/actor");
        assert!(created["published"].is_string());

        let outbox = json_body(get(&app, "/actor/outbox").await).await;
        assert_eq!(outbox["orderedItems"], json!([location]));
        assert_eq!(outbox["totalItems"], 1);
    }

    #[tokio::test]
    async fn outbox_posts_are_newest_first() {
        let app = app();
        for _ in 0..2 {
            let response = send(&app, post_outbox(json!({"type": "Like"}), Some(ISSUED_TOKEN))).await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }
        let outbox = json_body(get(&app, "/actor/outbox").await).await;
        assert_eq!(
            outbox["orderedItems"],
            json!(["http://localhost:8080/new/2", "http://localhost:8080/new/1"])
        );
    }

    #[tokio::test]
    async fn outbox_rejects_non_objects() {
        let response = send(&app(), post_outbox(json!([1, 2]), Some(ISSUED_TOKEN))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn published_comes_from_the_clock() {
        let server = ReportServer::new(ServerConfig::default()).unwrap();
        let at = DateTime::parse_from_rfc3339("2024-05-06T07:08:09Z")
            .unwrap()
            .with_timezone(&Utc);
        let state = server.state().clone().with_clock(Arc::new(FixedClock(at)));
        let app = router::build_router(state);
        send(&app, post_outbox(json!({"type": "Create"}), Some(ISSUED_TOKEN))).await;
        let created = json_body(get(&app, "/new/1").await).await;
        assert_eq!(created["published"], "2024-05-06T07:08:09Z");
    }

    #[tokio::test]
    async fn outbox_delivers_to_remote_recipients() {
        let server = ReportServer::new(ServerConfig::default()).unwrap();
        let deliverer = Arc::new(RecordingDeliverer::default());
        let state = server.state().clone().with_deliverer(deliverer.clone());
        let app = router::build_router(state);

        let activity = json!({
            "type": "Create",
            "to": ["https://remote.example/alice", "https://www.w3.org/ns/activitystreams#Public"],
            "cc": "http://localhost:8080/actor/followers",
            "bcc": ["https://remote.example/bob"],
        });
        let response = send(&app, post_outbox(activity, Some(ISSUED_TOKEN))).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let sent = deliverer.sent.lock().unwrap();
        let targets: Vec<&str> = sent.iter().map(|(_, to)| to.as_str()).collect();
        assert_eq!(
            targets,
            vec!["https://remote.example/alice", "https://remote.example/bob"]
        );
        for (payload, _) in sent.iter() {
            assert!(payload.get("bcc").is_none());
            assert_eq!(payload["id"], "http://localhost:8080/new/1");
        }
    }

    #[tokio::test]
    async fn inbox_requires_id() {
        let response = send(&app(), post_inbox(json!({"type": "Follow"}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn inbox_rejects_local_ids() {
        let activity = json!({"id": "http://localhost:8080/new/9", "type": "Follow"});
        let response = send(&app(), post_inbox(activity)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn inbox_post_stores_and_lists() {
        let server = ReportServer::new(ServerConfig::default()).unwrap();
        let app = server.router();
        let activity = json!({"id": "https://remote.example/follow/1", "type": "Follow"});
        let response = send(&app, post_inbox(activity.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        // Redelivery is idempotent.
        let response = send(&app, post_inbox(activity)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let inbox = json_body(get(&app, "/actor/inbox").await).await;
        assert_eq!(inbox["orderedItems"], json!(["https://remote.example/follow/1"]));
        assert_eq!(inbox["totalItems"], 1);

        let id = Iri::parse("https://remote.example/follow/1").unwrap();
        assert!(server.state().store.has(&id));
        let scope = server.state().store.begin_request();
        let stored: Resource = server
            .state()
            .store
            .get(&id, repsrv_store::AccessMode::Read, scope.caller())
            .await
            .unwrap();
        assert!(stored.is_kind("Follow"));
    }

    #[tokio::test]
    async fn authorize_redirects_with_code_and_state() {
        let response = get(
            &app(),
            "/auth?redirect_uri=https%3A%2F%2Fclient.example%2Fcb&state=xyz&response_type=code",
        )
        .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(
            location,
            format!("https://client.example/cb?state=xyz&code={ISSUED_CODE}")
        );
    }

    #[tokio::test]
    async fn authorize_requires_redirect_uri() {
        let response = get(&app(), "/auth?state=xyz").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn token_endpoint_issues_bearer() {
        let app = app();
        for method in ["GET", "POST"] {
            let request = Request::builder()
                .method(method)
                .uri("/token")
                .body(Body::empty())
                .unwrap();
            let response = send(&app, request).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()[header::PRAGMA], "no-cache");
            let body = json_body(response).await;
            assert_eq!(body["access_token"], ISSUED_TOKEN);
            assert_eq!(body["token_type"], "Bearer");
        }
    }

    #[tokio::test]
    async fn locks_do_not_leak_across_requests() {
        let app = app();
        // Each POST takes the outbox write lock; a leaked lock would hang the second.
        let first = send(&app, post_outbox(json!({"type": "Like"}), Some(ISSUED_TOKEN)));
        let first = tokio::time::timeout(std::time::Duration::from_secs(5), first).await;
        assert_eq!(first.unwrap().status(), StatusCode::CREATED);
        let second = send(&app, post_outbox(json!({"type": "Like"}), Some(ISSUED_TOKEN)));
        let second = tokio::time::timeout(std::time::Duration::from_secs(5), second).await;
        assert_eq!(second.unwrap().status(), StatusCode::CREATED);
    }
}
