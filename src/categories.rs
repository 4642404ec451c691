//! # Category Configuration
//!
//! The single, ordered list of homepage categories. Order is section order
//! on the homepage; `max_articles` caps how many articles a section shows.
//!
//! The same value is handed to the source aggregator (to resolve category
//! filters) and to the spot engine, so the category list lives in one place.

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEntry {
    pub name: String,
    /// Section heading. Falls back to `name` when blank.
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub min_articles: usize,
    pub max_articles: usize,
    /// Informational; automatic numbering always starts at the first
    /// category spot and runs without gaps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_spot: Option<u32>,
}

impl CategoryEntry {
    pub fn new(name: &str, display_name: &str, max_articles: usize) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            min_articles: 0,
            max_articles,
            start_spot: None,
        }
    }
}

/// Only built through [`CategoryConfig::new`] (or the seed), so a loaded
/// configuration is always validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryConfig {
    categories: Vec<CategoryEntry>,
}

impl CategoryConfig {
    /// Validate and build a configuration. Names are trimmed, blank display
    /// names fall back to the name, and blank or duplicate names are errors.
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut categories = Vec::with_capacity(entries.len());
        for mut entry in entries {
            entry.name = entry.name.trim().to_string();
            if entry.name.is_empty() {
                bail!("category entry with blank name");
            }
            if !seen.insert(entry.name.to_lowercase()) {
                return Err(anyhow!("duplicate category '{}'", entry.name));
            }
            if entry.display_name.trim().is_empty() {
                entry.display_name = entry.name.clone();
            }
            categories.push(entry);
        }
        Ok(Self { categories })
    }

    /// Entries in configuration order.
    pub fn entries(&self) -> &[CategoryEntry] {
        &self.categories
    }

    pub fn get(&self, name: &str) -> Option<&CategoryEntry> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Case-insensitive lookup, used to resolve user-supplied filters.
    pub fn resolve(&self, name: &str) -> Option<&CategoryEntry> {
        let wanted = name.trim();
        self.categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(wanted))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Built-in homepage layout: nine sections of up to six articles.
    pub fn default_seed() -> Self {
        let mut categories: Vec<CategoryEntry> = [
            ("World", "World News"),
            ("Technology", "Technology"),
            ("Business", "Business"),
            ("Economy", "Economy"),
            ("Environment", "Environment"),
            ("Education", "Education"),
            ("Law & Crime", "Law & Crime"),
            ("Science", "Science"),
            ("Politics", "Politics"),
        ]
        .into_iter()
        .map(|(name, display)| CategoryEntry {
            min_articles: 3,
            ..CategoryEntry::new(name, display, 6)
        })
        .collect();
        if let Some(first) = categories.first_mut() {
            first.start_spot = Some(crate::spots::FIRST_CATEGORY_SPOT);
        }
        Self { categories }
    }
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self::default_seed()
    }
}
