// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod article;
pub mod cache;
pub mod categories;
pub mod config;
pub mod error;
pub mod homepage;
pub mod metrics;
pub mod source_key;
pub mod sources;
pub mod spots;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::article::{Article, ManualSpot};
pub use crate::categories::{CategoryConfig, CategoryEntry};
pub use crate::source_key::normalize;
pub use crate::spots::{assign_spots, SpotLayout};

use axum::Router;

/// Build the HTTP router from environment settings, the same way the binary
/// does (minus the `/metrics` exporter).
pub async fn app() -> anyhow::Result<Router> {
    let settings = config::Settings::from_env();
    let state = AppState::from_settings(&settings)?;
    Ok(router(state))
}
