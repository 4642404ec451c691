// tests/common/mod.rs
// Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{body, http::Request, Router};
use news_curator::article::parse_timestamp;
use news_curator::store::InMemoryStore;
use news_curator::{router, AppState, Article, CategoryConfig};
use serde_json::Value;
use tower::ServiceExt;

pub fn article(id: &str, category: Option<&str>, source: Option<&str>, date: &str) -> Article {
    Article {
        id: id.to_string(),
        slug: format!("{id}-slug"),
        title: format!("Title {id}"),
        excerpt: String::new(),
        author: "Desk".to_string(),
        category: category.map(str::to_string),
        tags: String::new(),
        image_url: String::new(),
        primary_source: source.map(str::to_string),
        spot_number: None,
        published: true,
        published_at: parse_timestamp(date),
        created_at: None,
    }
}

/// The newsroom snapshot used across the HTTP tests.
pub fn newsroom() -> Vec<Article> {
    let mut draft = article("draft", Some("World"), Some("https://reuters.com"), "2024-03-01");
    draft.published = false;
    vec![
        article("gh1", Some("Technology"), Some("https://github.com/blog"), "2024-01-01"),
        article("gh2", Some("Technology"), Some("https://github.com/blog"), "2024-02-01"),
        article("nat", Some("Science"), Some("https://nature.com/articles"), "2024-01-15"),
        article("gov", Some("Politics"), Some("Government Policy Report"), "2024-01-10"),
        article("blank", Some("World"), Some("   "), "2024-01-05"),
        article("none", Some("World"), None, "2024-01-06"),
        draft,
    ]
}

pub fn build_app(articles: Vec<Article>) -> Router {
    let state = AppState::new(
        Arc::new(InMemoryStore::new(articles)),
        CategoryConfig::default_seed(),
    );
    router(state)
}

pub async fn get(app: &Router, uri: &str) -> (http::StatusCode, http::HeaderMap, Value) {
    send(app, Request::builder().uri(uri).body(body::Body::empty()).unwrap()).await
}

pub async fn send(
    app: &Router,
    req: Request<body::Body>,
) -> (http::StatusCode, http::HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, json)
}
