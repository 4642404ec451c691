use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::cache::{CacheOutcome, NoCache, ResponseCache, TtlCache};
use crate::categories::CategoryConfig;
use crate::config::Settings;
use crate::error::ApiError;
use crate::homepage::build_homepage;
use crate::metrics::{ARTICLES_LOADED, CACHE_BYPASS, CACHE_HITS, CACHE_MISSES, SOURCE_QUERIES};
use crate::sources::{Grouping, PageParams, SourceAggregator, SourceGroup, SourcePage};
use crate::store::{ArticleStore, InMemoryStore};

/// Response header reporting the cache outcome (`HIT`, `MISS`, `BYPASS`).
pub const CACHE_HEADER: &str = "x-cache";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub categories: Arc<CategoryConfig>,
    pub cache: Arc<dyn ResponseCache>,
    pub cache_ttl: Duration,
    pub sources: SourceAggregator,
}

impl AppState {
    /// Raw grouping, fresh in-memory cache with the default TTL.
    pub fn new(store: Arc<dyn ArticleStore>, categories: CategoryConfig) -> Self {
        let categories = Arc::new(categories);
        Self {
            sources: SourceAggregator::new(store.clone(), categories.clone(), Grouping::Raw),
            store,
            categories,
            cache: Arc::new(TtlCache::new()),
            cache_ttl: Settings::default().cache_ttl,
        }
    }

    pub fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.sources = SourceAggregator::new(self.store.clone(), self.categories.clone(), grouping);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>, ttl: Duration) -> Self {
        self.cache = cache;
        self.cache_ttl = ttl;
        self
    }

    /// Wire the state the binary runs with. A zero TTL disables caching.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let store = InMemoryStore::load_or_empty(&settings.articles_path)?;
        gauge!(ARTICLES_LOADED).set(store.len() as f64);
        info!(
            path = %settings.articles_path.display(),
            articles = store.len(),
            "article snapshot loaded"
        );

        let categories = settings.load_categories()?;
        info!(categories = categories.len(), "category configuration loaded");

        let cache: Arc<dyn ResponseCache> = if settings.cache_ttl.is_zero() {
            Arc::new(NoCache)
        } else {
            Arc::new(TtlCache::new())
        };

        Ok(Self::new(Arc::new(store), categories)
            .with_cache(cache, settings.cache_ttl)
            .with_grouping(settings.grouping))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/categories", get(categories))
        .route("/sources", get(list_sources))
        .route("/sources/search", get(search_sources))
        .route("/sources/{source_id}/articles", get(source_articles))
        .route("/homepage", get(homepage))
        .route("/admin/reload", post(admin_reload))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SourcesQuery {
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    q: Option<String>,
}

// Strings so that `page=abc` clamps to the default instead of a 400.
#[derive(Debug, Deserialize)]
struct PageQuery {
    page: Option<String>,
    limit: Option<String>,
    sort: Option<String>,
}

async fn categories(State(state): State<AppState>) -> Json<CategoryConfig> {
    Json(state.categories.as_ref().clone())
}

async fn list_sources(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(q): Query<SourcesQuery>,
) -> Result<Response, ApiError> {
    counter!(SOURCE_QUERIES, "kind" => "list").increment(1);
    let key = cache_key("sources", &uri);
    let sources = &state.sources;
    let category = q.category.as_deref();
    cached(&state, &headers, key, move || async move {
        let groups = sources.list(category).await?;
        to_json(&groups)
    })
    .await
}

async fn search_sources(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<SourceGroup>>, ApiError> {
    counter!(SOURCE_QUERIES, "kind" => "search").increment(1);
    Ok(Json(state.sources.search(q.q.as_deref()).await?))
}

/// `source_id` arrives percent-encoded; the `Path` extractor decodes it.
async fn source_articles(
    State(state): State<AppState>,
    Path(source_id): Path<String>,
    Query(q): Query<PageQuery>,
) -> Result<Json<SourcePage>, ApiError> {
    counter!(SOURCE_QUERIES, "kind" => "articles").increment(1);
    let params = PageParams::from_query(q.page.as_deref(), q.limit.as_deref(), q.sort.as_deref());
    Ok(Json(state.sources.articles(&source_id, &params).await?))
}

async fn homepage(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response, ApiError> {
    let key = cache_key("homepage", &uri);
    let (store, categories) = (&state.store, &state.categories);
    cached(&state, &headers, key, move || async move {
        let published = store.published().await?;
        to_json(&build_homepage(categories, &published))
    })
    .await
}

async fn admin_reload(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let n = state.store.reload().await?;
    state.cache.clear();
    gauge!(ARTICLES_LOADED).set(n as f64);
    info!(articles = n, store = state.store.name(), "articles reloaded, response cache cleared");
    Ok(Json(json!({ "articles": n })))
}

/* ----------------------------
Response caching
---------------------------- */

fn cache_key(prefix: &str, uri: &Uri) -> String {
    format!("{prefix}:{uri}")
}

/// Requests carrying credentials are administrative: always recompute.
fn is_admin(headers: &HeaderMap) -> bool {
    headers.contains_key(AUTHORIZATION)
}

async fn cached<F, Fut>(
    state: &AppState,
    headers: &HeaderMap,
    key: String,
    compute: F,
) -> Result<Response, ApiError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Value, ApiError>>,
{
    if is_admin(headers) {
        counter!(CACHE_BYPASS).increment(1);
        return Ok(with_cache_header(compute().await?, CacheOutcome::Bypass));
    }
    if let Some(v) = state.cache.get(&key) {
        counter!(CACHE_HITS).increment(1);
        return Ok(with_cache_header(v, CacheOutcome::Hit));
    }

    let v = compute().await?;
    state.cache.set(key, v.clone(), state.cache_ttl);
    counter!(CACHE_MISSES).increment(1);
    Ok(with_cache_header(v, CacheOutcome::Miss))
}

fn with_cache_header(body: Value, outcome: CacheOutcome) -> Response {
    ([(CACHE_HEADER, outcome.as_str())], Json(body)).into_response()
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::Internal(e.into()))
}
