//! Router-level harness: drives the full app over the in-memory stores.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::macros::datetime;
use tower::ServiceExt;

use crate::{
    app::build_app,
    clock::FixedClock,
    memory::MemoryStore,
    posts::repo::{NewPost, Post},
    state::AppState,
    users::repo::User,
};

pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub clock: Arc<FixedClock>,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(datetime!(2024-03-01 12:00 UTC)));
        let store = Arc::new(MemoryStore::default());
        let state = AppState::fake(store.clone(), clock.clone());
        Self {
            router: build_app(state.clone()),
            state,
            clock,
            store,
        }
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, token);
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(req.body(body).expect("request")).await
    }

    /// Sends `body` verbatim as JSON, for malformed payloads.
    pub async fn call_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, token);
        }
        self.send(req.body(Body::from(body.to_string())).expect("request"))
            .await
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.expect("response");
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    /// Creates a user and a token for them.
    pub async fn seed_user(&self, display_name: &str, email: &str, password: &str) -> (User, String) {
        let user = self.store.seed_user(display_name, email, password).await;
        let token = self.state.keys.issue(user.id).expect("issue token");
        (user, token)
    }

    pub async fn seed_post(&self, user_id: i64, title: &str, content: &str) -> Post {
        self.state
            .posts
            .create(NewPost {
                user_id,
                title: title.to_string(),
                content: content.to_string(),
            })
            .await
            .expect("seed post")
    }

    pub async fn user_by_email(&self, email: &str) -> User {
        self.state
            .users
            .find_by_email(email)
            .await
            .expect("lookup")
            .expect("user exists")
    }

    pub async fn post(&self, id: i64) -> Post {
        self.state
            .posts
            .find_by_id(id)
            .await
            .expect("lookup")
            .expect("post exists")
    }
}
