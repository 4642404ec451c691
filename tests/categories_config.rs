// tests/categories_config.rs
use news_curator::config::{load_categories_from, load_categories_default, Settings};
use news_curator::CategoryConfig;
use std::{env, fs};

#[serial_test::serial]
#[test]
fn repo_config_matches_builtin_seed() {
    // Run from the crate root, where config/categories.toml lives.
    let from_file = load_categories_from(std::path::Path::new("config/categories.toml"))
        .expect("repo categories.toml should load");
    assert_eq!(from_file, CategoryConfig::default_seed());
}

#[test]
fn json_file_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("categories.json");
    fs::write(
        &p,
        r#"[{"name":"World","displayName":"World News","maxArticles":6},{"name":"Technology","maxArticles":6}]"#,
    )
    .unwrap();
    let c = load_categories_from(&p).unwrap();
    assert_eq!(c.len(), 2);
    assert_eq!(c.entries()[1].display_name, "Technology");
}

#[test]
fn malformed_file_reports_path() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("categories.toml");
    fs::write(&p, "[[categories]]\nname = 1\n").unwrap();
    let err = load_categories_from(&p).unwrap_err();
    assert!(format!("{err:#}").contains("categories.toml"));
}

#[serial_test::serial]
#[test]
fn default_falls_back_to_seed_without_files() {
    // Isolate CWD so the repo's config/ does not interfere.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();

    let c = load_categories_default().unwrap();
    assert_eq!(c, CategoryConfig::default_seed());

    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/categories.toml"),
        "[[categories]]\nname = \"Science\"\nmaxArticles = 2\n",
    )
    .unwrap();
    let c = load_categories_default().unwrap();
    assert_eq!(c.len(), 1);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn settings_point_at_explicit_file() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("cats.toml");
    fs::write(&p, "[[categories]]\nname = \"Politics\"\nmaxArticles = 3\n").unwrap();

    env::set_var("CATEGORIES_PATH", p.display().to_string());
    let s = Settings::from_env();
    env::remove_var("CATEGORIES_PATH");

    let c = s.load_categories().unwrap();
    assert_eq!(c.entries()[0].name, "Politics");
}
