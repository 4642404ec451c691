//! # Primary Source Aggregator
//!
//! Groups published articles by their primary source and answers the three
//! read queries behind `/sources`:
//!
//! - list every source (optionally within one category), largest group first
//! - search sources by case-insensitive substring
//! - page through the articles of a single source
//!
//! The pure functions work on an article slice; [`SourceAggregator`] wires
//! them to an [`ArticleStore`] and the shared [`CategoryConfig`].

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::article::Article;
use crate::categories::CategoryConfig;
use crate::source_key;
use crate::spots::most_recent_first;
use crate::store::ArticleStore;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// How articles are put into the same group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// Exact stored `primarySource` value.
    #[default]
    Raw,
    /// [`source_key::normalize_str`] of the stored value; the first member's
    /// raw value names the group.
    Normalized,
}

impl Grouping {
    fn key(self, source: &str) -> String {
        match self {
            Grouping::Raw => source.to_string(),
            Grouping::Normalized => source_key::normalize_str(source),
        }
    }
}

impl FromStr for Grouping {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "exact" => Ok(Grouping::Raw),
            "normalized" | "normalised" => Ok(Grouping::Normalized),
            other => Err(anyhow::anyhow!("unknown source grouping '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub category: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<&Article> for ArticleSummary {
    fn from(a: &Article) -> Self {
        Self {
            id: a.id.clone(),
            title: a.title.clone(),
            slug: a.slug.clone(),
            category: a.category.clone(),
            published_at: a.published_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestArticle {
    pub title: String,
    pub slug: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceGroup {
    pub source_id: String,
    pub count: usize,
    /// Distinct member categories, sorted.
    pub categories: Vec<String>,
    pub latest_article: Option<LatestArticle>,
    /// Members, most recent first.
    pub articles: Vec<ArticleSummary>,
}

/// Listing shape returned for one source's articles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceArticle {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub category: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub image_url: String,
    pub tags: String,
}

impl From<&Article> for SourceArticle {
    fn from(a: &Article) -> Self {
        Self {
            id: a.id.clone(),
            title: a.title.clone(),
            slug: a.slug.clone(),
            excerpt: a.excerpt.clone(),
            category: a.category.clone(),
            published_at: a.published_at,
            image_url: a.image_url.clone(),
            tags: a.tags.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Date,
    Category,
}

impl SortMode {
    /// Anything other than `category` means date order.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("category") => SortMode::Category,
            _ => SortMode::Date,
        }
    }
}

/// Clamped pagination request: `page >= 1` and `1 <= limit <= MAX_LIMIT`
/// hold for every value, whichever constructor built it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: usize,
    limit: usize,
    sort: SortMode,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortMode::Date,
        }
    }
}

impl PageParams {
    pub fn new(page: usize, limit: usize, sort: SortMode) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
            sort,
        }
    }

    /// Build from loosely typed query values. Missing, non-numeric and zero
    /// values take the defaults; the rest is clamped (`page >= 1`,
    /// `1 <= limit <= 100`).
    pub fn from_query(page: Option<&str>, limit: Option<&str>, sort: Option<&str>) -> Self {
        let page = parse_nonzero(page).map_or(DEFAULT_PAGE, |p| p.max(1) as usize);
        let limit = parse_nonzero(limit).map_or(DEFAULT_LIMIT, |l| {
            l.clamp(1, MAX_LIMIT as i64) as usize
        });
        Self::new(page, limit, SortMode::parse(sort))
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

fn parse_nonzero(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n != 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(total: usize, params: &PageParams) -> Self {
        let total_pages = total.div_ceil(params.limit);
        Self {
            total,
            page: params.page,
            limit: params.limit,
            total_pages,
            has_next_page: params.page < total_pages,
            has_prev_page: params.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcePage {
    pub articles: Vec<SourceArticle>,
    pub pagination: Pagination,
    pub source: String,
}

/// Group published articles that carry a primary source.
pub fn group_by_source<'a, I>(articles: I, grouping: Grouping) -> Vec<SourceGroup>
where
    I: IntoIterator<Item = &'a Article>,
{
    // key -> (display id, members); `order` keeps first-seen order for ties.
    let mut groups: HashMap<String, (String, Vec<&Article>)> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for article in articles {
        if !article.published {
            continue;
        }
        let Some(source) = article.source() else {
            continue;
        };
        let key = grouping.key(source);
        groups
            .entry(key.clone())
            .or_insert_with(|| {
                order.push(key);
                (source.to_string(), Vec::new())
            })
            .1
            .push(article);
    }

    let mut out: Vec<SourceGroup> = order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .map(|(source_id, mut members)| {
            members.sort_by(|a, b| most_recent_first(a, b));
            let categories: BTreeSet<String> = members
                .iter()
                .filter_map(|a| a.category_name().map(str::to_string))
                .collect();
            SourceGroup {
                source_id,
                count: members.len(),
                categories: categories.into_iter().collect(),
                latest_article: members.first().map(|a| LatestArticle {
                    title: a.title.clone(),
                    slug: a.slug.clone(),
                    published_at: a.published_at,
                }),
                articles: members.iter().map(|a| ArticleSummary::from(*a)).collect(),
            }
        })
        .collect();

    // Largest first; stable sort keeps first-seen order among equal counts.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// All source groups, optionally restricted to one category.
pub fn list_sources(
    articles: &[Article],
    category: Option<&str>,
    grouping: Grouping,
) -> Vec<SourceGroup> {
    let filter = category.map(str::trim).filter(|c| !c.is_empty());
    group_by_source(
        articles
            .iter()
            .filter(|a| filter.map_or(true, |c| a.category.as_deref() == Some(c))),
        grouping,
    )
}

/// Source groups whose stored source contains `query`, ignoring case.
pub fn search_sources(
    articles: &[Article],
    query: Option<&str>,
    grouping: Grouping,
) -> Result<Vec<SourceGroup>, SourceError> {
    let needle = search_needle(query)?;
    Ok(sources_containing(articles, &needle, grouping))
}

/// Validate a search query and fold it for case-insensitive matching.
pub fn search_needle(query: Option<&str>) -> Result<String, SourceError> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
        .ok_or_else(|| SourceError::InvalidInput("Search query is required".to_string()))
}

/// Whole groups (as `list_sources` forms them) in which at least one
/// published member's stored source contains `needle`.
fn sources_containing(
    articles: &[Article],
    needle: &str,
    grouping: Grouping,
) -> Vec<SourceGroup> {
    let matched: HashSet<String> = articles
        .iter()
        .filter(|a| a.published)
        .filter_map(Article::source)
        .filter(|s| s.to_lowercase().contains(needle))
        .map(|s| grouping.key(s))
        .collect();

    group_by_source(
        articles
            .iter()
            .filter(|a| a.source().is_some_and(|s| matched.contains(&grouping.key(s)))),
        grouping,
    )
}

/// One page of the published articles that belong to `source_id`.
pub fn articles_for_source(
    articles: &[Article],
    source_id: &str,
    params: &PageParams,
    grouping: Grouping,
) -> SourcePage {
    let wanted = grouping.key(source_id);
    let mut matching: Vec<&Article> = articles
        .iter()
        .filter(|a| a.published)
        .filter(|a| {
            a.primary_source
                .as_deref()
                .is_some_and(|s| grouping.key(s) == wanted)
        })
        .collect();

    match params.sort {
        SortMode::Date => matching.sort_by(|a, b| most_recent_first(a, b)),
        SortMode::Category => matching.sort_by(|a, b| {
            a.category
                .as_deref()
                .unwrap_or_default()
                .cmp(b.category.as_deref().unwrap_or_default())
                .then_with(|| most_recent_first(a, b))
        }),
    }

    let pagination = Pagination::new(matching.len(), params);
    let page = matching
        .into_iter()
        .skip(params.offset())
        .take(params.limit)
        .map(SourceArticle::from)
        .collect();

    SourcePage {
        articles: page,
        pagination,
        source: source_id.to_string(),
    }
}

/// Store-backed front for the source queries.
#[derive(Clone)]
pub struct SourceAggregator {
    store: Arc<dyn ArticleStore>,
    categories: Arc<CategoryConfig>,
    grouping: Grouping,
}

impl SourceAggregator {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        categories: Arc<CategoryConfig>,
        grouping: Grouping,
    ) -> Self {
        Self {
            store,
            categories,
            grouping,
        }
    }

    /// Category filters are matched against the configured names without
    /// regard to case; names outside the configuration are used verbatim.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<SourceGroup>> {
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let articles = match category {
            Some(c) => {
                let name = self
                    .categories
                    .resolve(c)
                    .map_or(c, |entry| entry.name.as_str());
                self.store.published_by_category(name).await?
            }
            None => self.store.published().await?,
        };
        Ok(group_by_source(&articles, self.grouping))
    }

    pub async fn search(&self, query: Option<&str>) -> Result<Vec<SourceGroup>, SourceError> {
        // Reject before touching the store.
        let needle = search_needle(query)?;
        let articles = self.store.published().await?;
        Ok(sources_containing(&articles, &needle, self.grouping))
    }

    pub async fn articles(&self, source_id: &str, params: &PageParams) -> Result<SourcePage> {
        let articles = match self.grouping {
            Grouping::Raw => self.store.published_by_source(source_id).await?,
            Grouping::Normalized => self.store.published().await?,
        };
        Ok(articles_for_source(&articles, source_id, params, self.grouping))
    }

    pub fn grouping(&self) -> Grouping {
        self.grouping
    }
}
