#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use serde_json::{json, Value};
use tower::Service;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::{routes, ServerState};

pub struct TestApp {
    pub router: Router,
    pub state: ServerState,
}

pub struct Response {
    pub status: StatusCode,
    pub set_cookie: Option<String>,
    pub body: Value,
}

pub fn memory_app() -> TestApp {
    let mut cfg = AppConfig::default();
    cfg.server.store = "memory".into();
    cfg.auth.jwt_secret = "test-secret".into();
    let state = ServerState::in_memory(&cfg);
    TestApp { router: routes::build_router(state.clone(), CorsLayer::very_permissive()), state }
}

impl TestApp {
    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut b = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            b = b.header("authorization", format!("Bearer {}", t));
        }
        let body = match body {
            Some(v) => {
                b = b.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };
        self.call(b.body(body).unwrap()).await
    }

    pub async fn call(&self, req: Request<Body>) -> Response {
        let resp = self.router.clone().call(req).await.unwrap();
        let status = resp.status();
        let set_cookie = resp
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Response { status, set_cookie, body }
    }

    /// Register (or bootstrap, for admins) and log in; returns `(user_id, token)`.
    pub async fn login_as(&self, role: &str) -> (Uuid, String) {
        let email = format!("{}_{}@example.com", role, Uuid::new_v4());
        let password = "S3curePass!";
        if role == "admin" {
            self.state.auth.ensure_admin(&email, password).await.unwrap();
        } else {
            let r = self
                .send("POST", "/auth/register", None, Some(json!({"email": email, "name": "Tester", "password": password, "role": role})))
                .await;
            assert_eq!(r.status, StatusCode::CREATED);
        }
        let r = self.send("POST", "/auth/login", None, Some(json!({"email": email, "password": password}))).await;
        assert_eq!(r.status, StatusCode::OK);
        let id = Uuid::parse_str(r.body["data"]["id"].as_str().unwrap()).unwrap();
        (id, r.body["token"].as_str().unwrap().to_string())
    }

    pub async fn create_provider(&self, token: &str, body: Value) -> Value {
        let r = self.send("POST", "/service-providers", Some(token), Some(body)).await;
        assert_eq!(r.status, StatusCode::CREATED, "create failed: {}", r.body);
        r.body["data"].clone()
    }
}
