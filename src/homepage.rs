//! Homepage layout: the hand-curated featured tier (spots 1 to 9) on top of the
//! automatically numbered category sections.
//!
//! This is where skipped articles get logged; the spot engine itself stays
//! silent.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::article::Article;
use crate::categories::CategoryConfig;
use crate::spots::{assign_spots, most_recent_first, CategorySection, SkipReason, SpotLayout};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeaturedSlot {
    pub spot: u32,
    #[serde(flatten)]
    pub article: Article,
}

/// An article that asked for a featured slot someone else got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedConflict {
    pub spot: u32,
    pub article_id: String,
    pub winner_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Homepage {
    pub featured: Vec<FeaturedSlot>,
    pub sections: Vec<CategorySection>,
}

/// Fill featured slots from manual `spotNumber` placements in `1..=9`.
/// When several articles claim one slot the most recent keeps it.
pub fn assign_featured(articles: &[Article]) -> (Vec<FeaturedSlot>, Vec<FeaturedConflict>) {
    let mut claims: BTreeMap<u32, Vec<&Article>> = BTreeMap::new();
    for article in articles {
        if let Some(spot) = article
            .spot_number
            .as_ref()
            .and_then(|s| s.featured_position())
        {
            claims.entry(spot).or_default().push(article);
        }
    }

    let mut slots = Vec::with_capacity(claims.len());
    let mut conflicts = Vec::new();
    for (spot, mut claimants) in claims {
        claimants.sort_by(|a, b| most_recent_first(a, b));
        let winner = claimants[0];
        for loser in &claimants[1..] {
            conflicts.push(FeaturedConflict {
                spot,
                article_id: loser.id.clone(),
                winner_id: winner.id.clone(),
            });
        }
        slots.push(FeaturedSlot {
            spot,
            article: winner.clone(),
        });
    }
    (slots, conflicts)
}

/// Build the full homepage from the published article list.
pub fn build_homepage(config: &CategoryConfig, published: &[Article]) -> Homepage {
    let (featured, conflicts) = assign_featured(published);
    for c in &conflicts {
        warn!(
            spot = c.spot,
            article = %c.article_id,
            winner = %c.winner_id,
            "featured spot already taken, article not featured"
        );
    }

    let layout = assign_spots(config, published);
    log_layout(&layout);

    Homepage {
        featured,
        sections: layout.sections,
    }
}

fn log_layout(layout: &SpotLayout) {
    for s in &layout.skipped {
        match &s.reason {
            SkipReason::MissingCategory => warn!(
                article = %s.id,
                title = %s.title,
                "article is missing category, skipping"
            ),
            SkipReason::UnrecognizedCategory(c) => warn!(
                article = %s.id,
                title = %s.title,
                category = %c,
                "article has unrecognized category, skipping"
            ),
        }
    }
    for section in &layout.sections {
        info!(
            category = %section.category,
            start = section.start_spot,
            end = section.end_spot,
            articles = section.len(),
            "spot range assigned"
        );
    }
    info!(
        placed = layout.placed_count(),
        sections = layout.sections.len(),
        skipped = layout.skipped.len(),
        over_capacity = layout.over_capacity,
        "homepage layout built"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::{parse_timestamp, ManualSpot};

    fn mk(id: &str, spot: Option<ManualSpot>, date: &str) -> Article {
        Article {
            id: id.to_string(),
            slug: id.to_string(),
            title: id.to_string(),
            excerpt: String::new(),
            author: String::new(),
            category: Some("World".to_string()),
            tags: String::new(),
            image_url: String::new(),
            primary_source: None,
            spot_number: spot,
            published: true,
            published_at: parse_timestamp(date),
            created_at: None,
        }
    }

    #[test]
    fn featured_slots_follow_manual_positions() {
        let articles = vec![
            mk("a", Some(ManualSpot::Position(2)), "2024-01-01"),
            mk("b", Some(ManualSpot::Code("1".into())), "2024-01-01"),
            mk("c", Some(ManualSpot::Code("X".into())), "2024-01-01"),
            mk("d", Some(ManualSpot::Position(12)), "2024-01-01"),
            mk("e", None, "2024-01-01"),
        ];
        let (slots, conflicts) = assign_featured(&articles);
        let placed: Vec<(u32, &str)> = slots
            .iter()
            .map(|s| (s.spot, s.article.id.as_str()))
            .collect();
        assert_eq!(placed, vec![(1, "b"), (2, "a")]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn most_recent_claimant_wins_a_contested_slot() {
        let articles = vec![
            mk("old", Some(ManualSpot::Position(1)), "2023-01-01"),
            mk("new", Some(ManualSpot::Position(1)), "2024-01-01"),
        ];
        let (slots, conflicts) = assign_featured(&articles);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].article.id, "new");
        assert_eq!(
            conflicts,
            vec![FeaturedConflict {
                spot: 1,
                article_id: "old".into(),
                winner_id: "new".into()
            }]
        );
    }

    #[test]
    fn featured_articles_still_fill_category_sections() {
        let articles = vec![mk("a", Some(ManualSpot::Position(1)), "2024-01-01")];
        let page = build_homepage(&CategoryConfig::default_seed(), &articles);
        assert_eq!(page.featured.len(), 1);
        assert_eq!(page.sections.len(), 1);
        assert_eq!(page.sections[0].start_spot, 10);
    }
}
