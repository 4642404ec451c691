//! Article store: the read interface the aggregator and homepage consume,
//! plus an in-memory snapshot implementation backed by a JSON export.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::article::Article;

#[async_trait::async_trait]
pub trait ArticleStore: Send + Sync {
    /// Every article with `published == true`.
    async fn published(&self) -> Result<Vec<Article>>;

    async fn published_by_category(&self, category: &str) -> Result<Vec<Article>> {
        let mut v = self.published().await?;
        v.retain(|a| a.category.as_deref() == Some(category));
        Ok(v)
    }

    /// Published articles whose stored primary source equals `source` exactly.
    async fn published_by_source(&self, source: &str) -> Result<Vec<Article>> {
        let mut v = self.published().await?;
        v.retain(|a| a.primary_source.as_deref() == Some(source));
        Ok(v)
    }

    /// Re-read the backing data. Returns the number of articles now held.
    /// Live stores have nothing to refresh.
    async fn reload(&self) -> Result<usize> {
        Ok(self.published().await?.len())
    }

    fn name(&self) -> &'static str;
}

/// Snapshot of the article collection held in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    articles: RwLock<Vec<Article>>,
    origin: Option<PathBuf>,
}

impl InMemoryStore {
    pub fn new(articles: Vec<Article>) -> Self {
        Self {
            articles: RwLock::new(articles),
            origin: None,
        }
    }

    /// Load a JSON array export. The path is remembered for [`ArticleStore::reload`].
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let articles = read_articles(path)?;
        Ok(Self {
            articles: RwLock::new(articles),
            origin: Some(path.to_path_buf()),
        })
    }

    /// Like [`InMemoryStore::load_from_file`], but a missing file yields an
    /// empty store that will pick the file up on reload.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "article snapshot not found, starting empty");
            return Ok(Self {
                articles: RwLock::new(Vec::new()),
                origin: Some(path.to_path_buf()),
            });
        }
        Self::load_from_file(path)
    }

    /// Swap the whole snapshot.
    pub fn replace_all(&self, articles: Vec<Article>) -> Result<()> {
        let mut guard = self
            .articles
            .write()
            .map_err(|_| anyhow!("article store lock poisoned"))?;
        *guard = articles;
        Ok(())
    }

    /// Number of articles held, published or not.
    pub fn len(&self) -> usize {
        self.articles.read().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl ArticleStore for InMemoryStore {
    async fn published(&self) -> Result<Vec<Article>> {
        let guard = self
            .articles
            .read()
            .map_err(|_| anyhow!("article store lock poisoned"))?;
        Ok(guard.iter().filter(|a| a.published).cloned().collect())
    }

    async fn reload(&self) -> Result<usize> {
        let Some(path) = self.origin.as_deref() else {
            return Ok(self.len());
        };
        let fresh = read_articles(path)?;
        let n = fresh.len();
        self.replace_all(fresh)?;
        Ok(n)
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

fn read_articles(path: &Path) -> Result<Vec<Article>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading articles from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("parsing articles from {}", path.display()))
}
