//! Journey: load content catalogs from disk
//!
//! Covers normalization on load, unit aggregation, lookups and the errors
//! reported for missing or malformed files.

use cadence_core::content::{GRAMMAR_FILE, TEXTS_FILE};
use cadence_core::{Catalog, ContentError};
use cadence_e2e_tests::harness::TestDatabaseManager;
use cadence_e2e_tests::mocks::TestDataFactory;
use chrono::{Duration, Utc};

#[tokio::test]
async fn test_load_normalizes_and_aggregates_units() {
    let fixture = TestDataFactory::write_catalog();
    let catalog = Catalog::load(fixture.path()).await.unwrap();

    assert_eq!(catalog.vocabulary.len(), 24);
    assert_eq!(catalog.grammar.len(), 3);
    assert_eq!(catalog.templates.len(), 6);
    assert_eq!(catalog.texts.len(), 1);

    // "Unit1" tags and a padded "Unit1 " grammar unit both land in unit1
    assert_eq!(catalog.vocabulary_by_unit("unit1").len(), 20);
    assert_eq!(catalog.vocabulary_by_unit("UNIT1").len(), 20);
    assert_eq!(catalog.grammar_by_unit("unit1").len(), 2);

    let units = catalog.units();
    let ids: Vec<&str> = units.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(ids, vec!["unit1", "unit2"]);
    assert_eq!(units[0].vocab_count, 20);
    assert_eq!(units[0].grammar_count, 2);
    assert_eq!(units[0].text_count, 1);
    assert_eq!(units[1].vocab_count, 4);
    assert_eq!(units[1].text_count, 0);
}

#[tokio::test]
async fn test_lookups_accept_numeric_ids() {
    let fixture = TestDataFactory::write_catalog();
    let catalog = Catalog::load(fixture.path()).await.unwrap();

    let word = catalog.vocabulary_by_id("200").unwrap();
    assert_eq!(word.word, "trabalho");
    assert_eq!(word.translation, "работа");

    let rule = catalog.grammar_by_id("7").unwrap();
    assert_eq!(rule.unit, "unit2");
    assert_eq!(rule.examples[0].source, "o carro");

    // Legacy field spellings
    let first = catalog.vocabulary_by_id("w01").unwrap();
    assert_eq!(first.translation, "привет");
    assert!(first.example.is_some());

    let text = catalog.text_by_id("t1").unwrap();
    assert!(!text.text.is_empty());
    assert_eq!(text.questions[0].answer, "café");

    assert!(catalog.vocabulary_by_id("missing").is_none());
}

#[tokio::test]
async fn test_templates_load_leniently() {
    let fixture = TestDataFactory::write_catalog();
    let catalog = Catalog::load(fixture.path()).await.unwrap();

    let essay = catalog
        .templates
        .iter()
        .find(|t| t.declared_type == "essay")
        .unwrap();
    assert!(essay.kind.is_none(), "unknown types load but are never synthesized");

    let tagged = catalog.templates_by_tags(&["unit1"]);
    assert_eq!(tagged.len(), 6);
    assert!(catalog.templates_by_tags(&["unit9"]).is_empty());
}

#[tokio::test]
async fn test_missing_file_is_a_read_error() {
    let fixture = TestDataFactory::write_catalog();
    std::fs::remove_file(fixture.file(TEXTS_FILE)).unwrap();

    let err = Catalog::load(fixture.path()).await.unwrap_err();
    assert!(matches!(err, ContentError::Read { .. }), "got {err:?}");
    assert!(err.to_string().contains(TEXTS_FILE));
}

#[tokio::test]
async fn test_malformed_file_is_a_parse_error() {
    let fixture = TestDataFactory::write_catalog();
    fixture.overwrite(GRAMMAR_FILE, "{ \"grammar\": [ { \"id\": ");

    let err = Catalog::load(fixture.path()).await.unwrap_err();
    assert!(matches!(err, ContentError::Parse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_sprint_materials_fall_back_to_whole_unit() {
    let fixture = TestDataFactory::write_catalog();
    let catalog = Catalog::load(fixture.path()).await.unwrap();
    let db = TestDatabaseManager::new_temp();
    let now = Utc::now();

    // Every unit1 word practiced and not yet due
    let ids = TestDataFactory::unit1_ids();
    let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    db.seed_progress(&id_refs, 4, now + Duration::days(10));
    let learner = db.learner();

    let materials = catalog.sprint_materials("unit1", &learner, 5, now);
    assert_eq!(materials.stats.due_for_review, 0);
    assert_eq!(materials.stats.new_items, 0);
    assert_eq!(materials.vocabulary.len(), 20);

    // unit2 has no tagged templates, so the full set is used
    let unit2 = catalog.sprint_materials("unit2", &learner, 5, now);
    assert_eq!(unit2.vocabulary.len(), 4);
    assert_eq!(unit2.templates.len(), catalog.templates.len());
}
