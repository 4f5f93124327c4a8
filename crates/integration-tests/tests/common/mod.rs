//! Shared helpers for the HTTP-level tests: a router wired to an in-memory
//! store plus a token mint, so requests go through the real middleware and
//! extractor stack.
#![allow(dead_code)]

use std::sync::Arc;

use auth_adapters::JwtIdentityResolver;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use domains::{ForumStore, UserRef, WriteBatch};
use http_body_util::BodyExt;
use services::Forum;
use storage_adapters::MemoryForumStore;
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &[u8] = b"integration-test-secret";

pub struct TestApp {
    pub router: Router,
    pub forum: Forum,
    resolver: Arc<JwtIdentityResolver>,
    store: Arc<MemoryForumStore>,
}

pub async fn build_app() -> TestApp {
    let store = Arc::new(MemoryForumStore::new());
    let forum = Forum::new(store.clone());
    let resolver = Arc::new(JwtIdentityResolver::new(SECRET));
    let router = api_adapters::router(api_adapters::AppState::new(
        forum.clone(),
        resolver.clone(),
    ));
    TestApp { router, forum, resolver, store }
}

impl TestApp {
    /// Registers a user in the directory and returns a valid bearer token
    /// for them alongside their id.
    pub async fn signed_up_user(&self, username: &str) -> (Uuid, String) {
        let user = UserRef {
            id: Uuid::new_v4(),
            username: username.to_string(),
            reputation: 10,
            version: 0,
        };
        self.store
            .apply(WriteBatch::new().put_user(user.clone()))
            .await
            .unwrap();
        (user.id, self.token(user.id))
    }

    pub fn token(&self, user: Uuid) -> String {
        self.resolver
            .mint(user, chrono::Duration::minutes(30))
            .unwrap()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: &str,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
