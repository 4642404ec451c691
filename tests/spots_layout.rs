// tests/spots_layout.rs
mod common;

use common::article;
use news_curator::spots::FIRST_CATEGORY_SPOT;
use news_curator::{assign_spots, Article, CategoryConfig, CategoryEntry};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

fn bulk(prefix: &str, category: &str, n: usize) -> Vec<Article> {
    (0..n)
        .map(|i| {
            article(
                &format!("{prefix}{i:02}"),
                Some(category),
                None,
                &format!("2024-02-{:02}", i + 1),
            )
        })
        .collect()
}

#[test]
fn world_then_technology_capped_at_six() {
    let mut articles = bulk("w", "World", 4);
    articles.extend(bulk("t", "Technology", 8));

    let layout = assign_spots(&CategoryConfig::default_seed(), &articles);
    assert_eq!(layout.sections.len(), 2);

    let world = layout.section("World").unwrap();
    assert_eq!((world.start_spot, world.end_spot), (10, 13));
    assert_eq!(world.display_name, "World News");

    let tech = layout.section("Technology").unwrap();
    assert_eq!((tech.start_spot, tech.end_spot), (14, 19));
    // the two oldest fall off
    let ids: Vec<&str> = tech.articles.iter().map(|a| a.article.id.as_str()).collect();
    assert_eq!(ids, vec!["t07", "t06", "t05", "t04", "t03", "t02"]);
    assert_eq!(layout.over_capacity, 2);
    assert_eq!(layout.next_spot(), 20);
}

#[test]
fn spots_are_contiguous_and_within_capacity() {
    let config = CategoryConfig::new(vec![
        CategoryEntry::new("A", "", 2),
        CategoryEntry::new("B", "", 5),
        CategoryEntry::new("C", "", 1),
        CategoryEntry::new("D", "", 3),
    ])
    .unwrap();
    let mut articles = bulk("a", "A", 7);
    articles.extend(bulk("c", "C", 3));
    articles.extend(bulk("d", "D", 2));
    articles.push(article("x", Some("Sports"), None, "2024-01-01"));
    articles.push(article("y", None, None, "2024-01-01"));

    let layout = assign_spots(&config, &articles);
    let spots: Vec<u32> = layout.spots().collect();
    let end = FIRST_CATEGORY_SPOT + spots.len() as u32;
    let expected: Vec<u32> = (FIRST_CATEGORY_SPOT..end).collect();
    assert_eq!(spots, expected);

    for section in &layout.sections {
        let cap = config.get(&section.category).unwrap().max_articles;
        assert!(section.len() <= cap);
        assert!(!section.is_empty());
        assert_eq!(section.end_spot - section.start_spot + 1, section.len() as u32);
    }
    assert!(layout.section("B").is_none(), "empty sections are omitted");
    assert_eq!(layout.skipped.len(), 2);
}

#[test]
fn layout_does_not_depend_on_input_order() {
    let config = CategoryConfig::default_seed();
    let mut articles = bulk("w", "World", 9);
    articles.extend(bulk("s", "Science", 4));
    articles.extend(bulk("p", "Politics", 7));
    let baseline = assign_spots(&config, &articles);

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..20 {
        articles.shuffle(&mut rng);
        assert_eq!(assign_spots(&config, &articles), baseline);
    }
}

#[test]
fn case_mismatched_category_is_skipped_not_placed() {
    let articles = vec![article("lc", Some("world"), None, "2024-01-01")];
    let layout = assign_spots(&CategoryConfig::default_seed(), &articles);
    assert!(layout.sections.is_empty());
    assert_eq!(layout.skipped.len(), 1);
    assert_eq!(layout.next_spot(), FIRST_CATEGORY_SPOT);
}
