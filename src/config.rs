//! Runtime settings (env) and the category configuration file loader.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::categories::{CategoryConfig, CategoryEntry};
use crate::sources::Grouping;

// --- env names & defaults ---
pub const ENV_ARTICLES_PATH: &str = "ARTICLES_PATH";
pub const ENV_CATEGORIES_PATH: &str = "CATEGORIES_PATH";
pub const ENV_CACHE_TTL_MS: &str = "CACHE_TTL_MS";
pub const ENV_SOURCE_GROUPING: &str = "SOURCE_GROUPING";

pub const DEFAULT_ARTICLES_PATH: &str = "config/articles.json";
pub const DEFAULT_CATEGORIES_TOML: &str = "config/categories.toml";
pub const DEFAULT_CATEGORIES_JSON: &str = "config/categories.json";
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub articles_path: PathBuf,
    pub categories_path: Option<PathBuf>,
    pub cache_ttl: Duration,
    pub grouping: Grouping,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            articles_path: PathBuf::from(DEFAULT_ARTICLES_PATH),
            categories_path: None,
            cache_ttl: Duration::from_millis(DEFAULT_CACHE_TTL_MS),
            grouping: Grouping::Raw,
        }
    }
}

impl Settings {
    /// Read settings from the environment. Unparseable values fall back to
    /// defaults with a warning instead of aborting startup.
    pub fn from_env() -> Self {
        let mut s = Self::default();

        if let Some(p) = non_empty_env(ENV_ARTICLES_PATH) {
            s.articles_path = PathBuf::from(p);
        }
        s.categories_path = non_empty_env(ENV_CATEGORIES_PATH).map(PathBuf::from);

        if let Some(raw) = non_empty_env(ENV_CACHE_TTL_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => s.cache_ttl = Duration::from_millis(ms),
                Err(_) => tracing::warn!(value = %raw, "invalid {ENV_CACHE_TTL_MS}, using default"),
            }
        }
        if let Some(raw) = non_empty_env(ENV_SOURCE_GROUPING) {
            match raw.parse::<Grouping>() {
                Ok(g) => s.grouping = g,
                Err(e) => tracing::warn!(error = %e, "invalid {ENV_SOURCE_GROUPING}, using raw"),
            }
        }
        s
    }

    /// Category configuration for these settings: explicit path if set,
    /// otherwise the default file locations, otherwise the built-in seed.
    pub fn load_categories(&self) -> Result<CategoryConfig> {
        match &self.categories_path {
            Some(p) => {
                if !p.exists() {
                    return Err(anyhow!(
                        "{ENV_CATEGORIES_PATH} points to non-existent path {}",
                        p.display()
                    ));
                }
                load_categories_from(p)
            }
            None => load_categories_default(),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Load categories from an explicit path. Supports TOML or JSON formats.
pub fn load_categories_from(path: &Path) -> Result<CategoryConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading categories from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_categories(&content, ext.as_str())
        .with_context(|| format!("parsing categories from {}", path.display()))
}

/// Fallbacks: config/categories.toml, config/categories.json, built-in seed.
pub fn load_categories_default() -> Result<CategoryConfig> {
    for candidate in [DEFAULT_CATEGORIES_TOML, DEFAULT_CATEGORIES_JSON] {
        let p = PathBuf::from(candidate);
        if p.exists() {
            return load_categories_from(&p);
        }
    }
    Ok(CategoryConfig::default_seed())
}

#[derive(Deserialize)]
struct CategoryFile {
    categories: Vec<CategoryEntry>,
}

fn parse_categories(s: &str, hint_ext: &str) -> Result<CategoryConfig> {
    let entries = if hint_ext == "json" {
        parse_json(s)?
    } else if hint_ext == "toml" {
        toml::from_str::<CategoryFile>(s)?.categories
    } else {
        // Unknown extension: sniff.
        parse_json(s).or_else(|_| toml::from_str::<CategoryFile>(s).map(|f| f.categories))?
    };
    CategoryConfig::new(entries)
}

/// JSON: either a bare array of entries or `{ "categories": [...] }`.
fn parse_json(s: &str) -> Result<Vec<CategoryEntry>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        List(Vec<CategoryEntry>),
        Wrapped(CategoryFile),
    }
    Ok(match serde_json::from_str::<Shape>(s)? {
        Shape::List(v) => v,
        Shape::Wrapped(f) => f.categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    const TOML: &str = r#"
[[categories]]
name = "World"
displayName = "World News"
minArticles = 3
maxArticles = 6
startSpot = 10

[[categories]]
name = "Technology"
maxArticles = 4
"#;

    #[test]
    fn toml_and_json_formats_work() {
        let c = parse_categories(TOML, "toml").unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.entries()[0].display_name, "World News");
        assert_eq!(c.entries()[1].display_name, "Technology");
        assert_eq!(c.entries()[1].max_articles, 4);

        let json = r#"[{"name":"Science","maxArticles":2}]"#;
        let c = parse_categories(json, "json").unwrap();
        assert_eq!(c.entries()[0].name, "Science");

        let wrapped = r#"{"categories":[{"name":"Science","maxArticles":2}]}"#;
        assert_eq!(parse_categories(wrapped, "").unwrap().len(), 1);
    }

    #[test]
    fn duplicates_are_rejected_on_load() {
        let json = r#"[{"name":"World","maxArticles":2},{"name":"World","maxArticles":3}]"#;
        assert!(parse_categories(json, "json").is_err());
    }

    #[serial_test::serial]
    #[test]
    fn settings_from_env_with_fallbacks() {
        for k in [
            ENV_ARTICLES_PATH,
            ENV_CATEGORIES_PATH,
            ENV_CACHE_TTL_MS,
            ENV_SOURCE_GROUPING,
        ] {
            env::remove_var(k);
        }
        assert_eq!(Settings::from_env(), Settings::default());

        env::set_var(ENV_CACHE_TTL_MS, "1500");
        env::set_var(ENV_SOURCE_GROUPING, "Normalized");
        env::set_var(ENV_ARTICLES_PATH, "/tmp/a.json");
        let s = Settings::from_env();
        assert_eq!(s.cache_ttl, Duration::from_millis(1500));
        assert_eq!(s.grouping, Grouping::Normalized);
        assert_eq!(s.articles_path, PathBuf::from("/tmp/a.json"));

        env::set_var(ENV_CACHE_TTL_MS, "soon");
        env::set_var(ENV_SOURCE_GROUPING, "fuzzy");
        let s = Settings::from_env();
        assert_eq!(s.cache_ttl, Duration::from_millis(DEFAULT_CACHE_TTL_MS));
        assert_eq!(s.grouping, Grouping::Raw);

        for k in [ENV_ARTICLES_PATH, ENV_CACHE_TTL_MS, ENV_SOURCE_GROUPING] {
            env::remove_var(k);
        }
    }

    #[serial_test::serial]
    #[test]
    fn explicit_categories_path_is_used_and_checked() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("cats.toml");
        fs::write(&p, TOML).unwrap();

        let s = Settings {
            categories_path: Some(p),
            ..Settings::default()
        };
        assert_eq!(s.load_categories().unwrap().len(), 2);

        let missing = Settings {
            categories_path: Some(tmp.path().join("missing.toml")),
            ..Settings::default()
        };
        assert!(missing.load_categories().is_err());
    }
}
