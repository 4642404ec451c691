//! Article records as the rest of the service sees them.
//!
//! The store snapshot is a JSON export of the CMS collection. Older exports
//! use snake_case field names (`primary_source`, `spot_number`,
//! `image_url`); newer ones use camelCase. Both are accepted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::spots::FEATURED_SPOTS;

/// A manually curated placement stored on the article itself.
///
/// Editors type either a grid position (`3`) or a letter code (`"B"`).
/// These never come out of the automatic spot engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ManualSpot {
    Position(i64),
    Code(String),
}

impl ManualSpot {
    /// The featured slot this placement targets, if it is one.
    /// Numeric strings (`"4"`) count as positions.
    pub fn featured_position(&self) -> Option<u32> {
        let n = match self {
            ManualSpot::Position(n) => *n,
            ManualSpot::Code(code) => code.trim().parse::<i64>().ok()?,
        };
        let n = u32::try_from(n).ok()?;
        FEATURED_SPOTS.contains(&n).then_some(n)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(alias = "_id")]
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Comma-separated, as the editor stores them.
    #[serde(default)]
    pub tags: String,
    #[serde(default, alias = "image_url")]
    pub image_url: String,
    #[serde(default, alias = "primary_source")]
    pub primary_source: Option<String>,
    #[serde(
        default,
        alias = "spot_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub spot_number: Option<ManualSpot>,
    #[serde(default)]
    pub published: bool,
    #[serde(default, alias = "published_at", deserialize_with = "lenient_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "created_at", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Article {
    /// Timestamp used for "most recent first" ordering: publication time,
    /// falling back to creation time.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.published_at.or(self.created_at)
    }

    /// The primary source, if it is present and not blank.
    pub fn source(&self) -> Option<&str> {
        self.primary_source
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    /// Category name, if present and not blank.
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Parse the timestamp shapes found in exports: RFC 3339, bare dates, and
/// epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|n| n.and_utc());
    }
    None
}

/// Unparseable or wrongly-typed timestamps become `None` instead of failing
/// the whole snapshot.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => parse_timestamp(&s),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    })
}
