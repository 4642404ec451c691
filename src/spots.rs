//! # Spot Assignment Engine
//!
//! Pure layout logic that maps `(category config, articles)` → numbered
//! homepage sections. No I/O and no logging; callers decide what to do with
//! the articles that could not be placed.
//!
//! Policy:
//! - articles are bucketed by exact category name; unknown or missing
//!   categories are reported in [`SpotLayout::skipped`]
//! - each bucket is ordered most recent first (`publishedAt`, else
//!   `createdAt`; undated articles last) and cut to `max_articles`
//! - sections are numbered in configuration order starting at
//!   [`FIRST_CATEGORY_SPOT`]; empty sections are omitted and consume no spots

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::RangeInclusive;

use crate::article::Article;
use crate::categories::CategoryConfig;

/// Slots reserved for the manually curated featured tier.
pub const FEATURED_SPOTS: RangeInclusive<u32> = 1..=9;

/// First slot handed out by the automatic engine.
pub const FIRST_CATEGORY_SPOT: u32 = 10;

/// A grid position produced by the engine. Kept apart from
/// [`crate::article::ManualSpot`], which is editor-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AutomaticSpot(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpottedArticle {
    pub spot: AutomaticSpot,
    #[serde(flatten)]
    pub article: Article,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySection {
    pub category: String,
    pub display_name: String,
    pub start_spot: u32,
    pub end_spot: u32,
    pub articles: Vec<SpottedArticle>,
}

impl CategorySection {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum SkipReason {
    MissingCategory,
    UnrecognizedCategory(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedArticle {
    pub id: String,
    pub title: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpotLayout {
    pub sections: Vec<CategorySection>,
    /// Articles that matched no configured category.
    #[serde(skip)]
    pub skipped: Vec<SkippedArticle>,
    /// Articles dropped because their section was already full.
    #[serde(skip)]
    pub over_capacity: usize,
}

impl SpotLayout {
    /// Every assigned spot, in order.
    pub fn spots(&self) -> impl Iterator<Item = u32> + '_ {
        self.sections
            .iter()
            .flat_map(|s| s.articles.iter().map(|a| a.spot.0))
    }

    pub fn placed_count(&self) -> usize {
        self.sections.iter().map(CategorySection::len).sum()
    }

    /// The spot the next section would start at.
    pub fn next_spot(&self) -> u32 {
        self.sections
            .last()
            .map(|s| s.end_spot + 1)
            .unwrap_or(FIRST_CATEGORY_SPOT)
    }

    pub fn section(&self, category: &str) -> Option<&CategorySection> {
        self.sections.iter().find(|s| s.category == category)
    }
}

/// Lay out `articles` into numbered category sections.
pub fn assign_spots(config: &CategoryConfig, articles: &[Article]) -> SpotLayout {
    // 1) Bucket by configured category name.
    let mut buckets: HashMap<&str, Vec<&Article>> = config
        .entries()
        .iter()
        .map(|c| (c.name.as_str(), Vec::new()))
        .collect();
    let mut skipped = Vec::new();

    for article in articles {
        let Some(category) = article.category_name() else {
            skipped.push(skip(article, SkipReason::MissingCategory));
            continue;
        };
        match buckets.get_mut(category) {
            Some(bucket) => bucket.push(article),
            None => skipped.push(skip(
                article,
                SkipReason::UnrecognizedCategory(category.to_string()),
            )),
        }
    }

    // 2) Number in configuration order.
    let mut sections = Vec::new();
    let mut over_capacity = 0usize;
    let mut current = FIRST_CATEGORY_SPOT;

    for entry in config.entries() {
        let mut bucket = buckets.remove(entry.name.as_str()).unwrap_or_default();
        bucket.sort_by(|a, b| most_recent_first(a, b));

        if bucket.len() > entry.max_articles {
            over_capacity += bucket.len() - entry.max_articles;
            bucket.truncate(entry.max_articles);
        }
        if bucket.is_empty() {
            continue;
        }

        let start = current;
        let placed: Vec<SpottedArticle> = bucket
            .into_iter()
            .zip(start..)
            .map(|(article, spot)| SpottedArticle {
                spot: AutomaticSpot(spot),
                article: article.clone(),
            })
            .collect();
        current += placed.len() as u32;

        sections.push(CategorySection {
            category: entry.name.clone(),
            display_name: entry.display_name.clone(),
            start_spot: start,
            end_spot: current - 1,
            articles: placed,
        });
    }

    SpotLayout {
        sections,
        skipped,
        over_capacity,
    }
}

/// Newest first; undated last; ties broken by slug then id so the order does
/// not depend on input order.
pub(crate) fn most_recent_first(a: &Article, b: &Article) -> Ordering {
    match (a.recency(), b.recency()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.slug.cmp(&b.slug))
    .then_with(|| a.id.cmp(&b.id))
}

fn skip(article: &Article, reason: SkipReason) -> SkippedArticle {
    SkippedArticle {
        id: article.id.clone(),
        title: article.title.clone(),
        reason,
    }
}
