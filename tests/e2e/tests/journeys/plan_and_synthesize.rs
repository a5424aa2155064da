//! Journey: plan a sprint and build its exercises
//!
//! Covers a fresh learner in the initial phase, a learner mid-unit with
//! error-prone words, and a sprint focused on one grammar rule.

use std::collections::{BTreeMap, HashSet};

use cadence_core::content::DEFAULT_NEW_MATERIALS;
use cadence_core::{
    identify_error_prone_items, recommend, ExerciseKind, ItemStatus, LearningPhase, ProgressStore,
    SelectionStrategy, SprintPlanner, SynthesisInput, Synthesizer,
};
use cadence_e2e_tests::harness::TestDatabaseManager;
use cadence_e2e_tests::mocks::TestDataFactory;
use chrono::{Duration, Utc};

#[test]
fn test_fresh_learner_gets_only_new_items() {
    let db = TestDatabaseManager::new_temp();
    let learner = db.learner();
    let catalog = TestDataFactory::catalog();
    let vocab = catalog.vocabulary_by_unit("unit1");
    let mut rng = TestDataFactory::rng(1);

    let plan = SprintPlanner::default().plan(&vocab, &learner, 10, &[], Utc::now(), &mut rng);

    assert_eq!(plan.metadata.phase, LearningPhase::Initial);
    assert_eq!(plan.readiness.total, 20);
    assert_eq!(plan.readiness.not_started, 20);
    assert_eq!(plan.distribution.new_count, 10);
    assert_eq!(plan.distribution.review_count, 0);
    assert_eq!(plan.items.len(), 10);
    assert!(plan.items.iter().all(|d| d.status == ItemStatus::NotStarted));
    assert_eq!(plan.statistics.new_items_percentage, 100);
    assert_eq!(plan.statistics.review_items_percentage, 0);
    assert_eq!(plan.statistics.priority_focus, "new material");

    let ids: HashSet<&str> = plan.item_ids().into_iter().collect();
    assert_eq!(ids.len(), 10, "plan must not repeat items");

    let advice = recommend(&plan);
    assert_eq!(advice.phase, LearningPhase::Initial);
    assert!(advice.daily_goal > 0);
}

#[test]
fn test_synthesized_sprint_is_valid_and_translation_heavy() {
    let db = TestDatabaseManager::new_temp();
    let learner = db.learner();
    let catalog = TestDataFactory::catalog();
    let materials = catalog.sprint_materials("unit1", &learner, 10, Utc::now());
    let mut rng = TestDataFactory::rng(7);

    let input = SynthesisInput::unfocused(&materials.vocabulary, &materials.templates)
        .with_grammar(&materials.grammar);
    let exercises = Synthesizer::default().synthesize(&input, 10, &mut rng);

    assert_eq!(exercises.len(), 10);
    assert!(exercises.iter().all(|e| e.is_valid()));

    let keys: HashSet<_> = exercises.iter().map(|e| e.dedup_key()).collect();
    assert_eq!(keys.len(), exercises.len(), "exercises must be distinct");

    let mut by_kind: BTreeMap<ExerciseKind, usize> = BTreeMap::new();
    for exercise in &exercises {
        *by_kind.entry(exercise.kind()).or_default() += 1;
    }
    let translations = by_kind.get(&ExerciseKind::Translation).copied().unwrap_or(0);
    assert!(translations >= 4);
    assert!(by_kind.values().all(|&n| n <= translations));

    // Every translation points back at a planned vocabulary item
    let planned: HashSet<&str> = materials.vocabulary.iter().map(|v| v.id.as_str()).collect();
    for exercise in exercises.iter().filter(|e| e.kind() == ExerciseKind::Translation) {
        let item = exercise.item_id.as_deref().expect("translation has an item");
        assert!(planned.contains(item));
    }
}

#[test]
fn test_requested_count_is_clamped() {
    let catalog = TestDataFactory::catalog();
    let vocab = catalog.vocabulary_by_unit("unit1");
    let input = SynthesisInput::unfocused(&vocab, &catalog.templates);
    let synthesizer = Synthesizer::default();

    let small = synthesizer.synthesize(&input, 1, &mut TestDataFactory::rng(2));
    assert_eq!(small.len(), 5);

    let large = synthesizer.synthesize(&input, 100, &mut TestDataFactory::rng(2));
    assert_eq!(large.len(), 15);
}

#[test]
fn test_mid_unit_plan_puts_error_prone_words_first() {
    let db = TestDatabaseManager::new_temp();
    let now = Utc::now();
    let catalog = TestDataFactory::catalog();
    let vocab = catalog.vocabulary_by_unit("unit1");

    // w01-w08 practiced and not yet due, w09-w12 due
    db.seed_progress(
        &["w01", "w02", "w03", "w04", "w05", "w06", "w07", "w08"],
        3,
        now + Duration::days(5),
    );
    db.seed_progress(&["w09", "w10", "w11", "w12"], 1, now - Duration::hours(2));

    // w10 was missed every time it came up
    db.seed_sprint("unit1", &["w09", "w10"], 1, now - Duration::days(2));
    db.seed_sprint("unit1", &["w11", "w10"], 1, now - Duration::days(1));

    let history = db.storage.sprints_by_unit("unit1").unwrap();
    let error_prone = identify_error_prone_items(&history, &vocab, 0.3);
    assert_eq!(error_prone, vec!["w10".to_string()]);

    let learner = db.learner();
    let mut rng = TestDataFactory::rng(3);
    let plan = SprintPlanner::new(SelectionStrategy::PhaseBased).plan(&vocab, &learner, 10, &error_prone, now, &mut rng);

    assert_eq!(plan.readiness.completion_percentage, 40);
    assert_eq!(plan.metadata.phase, LearningPhase::Consolidation);
    assert_eq!(plan.distribution.new_count, 6);
    assert_eq!(plan.distribution.review_count, 4);

    assert_eq!(plan.items.len(), 10);
    assert_eq!(plan.items[6].id, "w10", "error-prone items lead the review block");
    let review: HashSet<&str> = plan.items[6..].iter().map(|d| d.id.as_str()).collect();
    assert_eq!(review, HashSet::from(["w09", "w10", "w11", "w12"]));
    assert!(plan.items[..6].iter().all(|d| !d.status.is_started()));

    assert_eq!(plan.statistics.review_items_percentage, 40);
    assert_eq!(plan.statistics.priority_focus, "error-prone words");
}

#[test]
fn test_fixed_ratio_strategy_fills_sprint() {
    let db = TestDatabaseManager::new_temp();
    let now = Utc::now();
    let catalog = TestDataFactory::catalog();
    let vocab = catalog.vocabulary_by_unit("unit1");
    db.seed_progress(&["w01", "w02", "w03"], 2, now - Duration::hours(1));

    let learner = db.learner();
    let plan = SprintPlanner::new(SelectionStrategy::FixedRatio).plan(
        &vocab,
        &learner,
        10,
        &[],
        now,
        &mut TestDataFactory::rng(4),
    );

    assert_eq!(plan.metadata.strategy, SelectionStrategy::FixedRatio);
    assert_eq!(plan.items.len(), 10);
    let ids: HashSet<&str> = plan.item_ids().into_iter().collect();
    assert_eq!(ids.len(), 10);
}

#[test]
fn test_grammar_focused_sprint_links_every_exercise() {
    let catalog = TestDataFactory::catalog();
    let rule = catalog.grammar_by_id("g1").unwrap();
    let vocab = catalog.vocabulary_by_unit(&rule.unit);
    let input = SynthesisInput::focused(&vocab, &catalog.templates, rule);

    let exercises = Synthesizer::default().synthesize(&input, 5, &mut TestDataFactory::rng(5));

    assert_eq!(exercises.len(), 5);
    for exercise in &exercises {
        assert!(exercise.is_valid());
        let link = exercise.grammar.as_ref().expect("focused exercises carry the rule");
        assert_eq!(link.id, "g1");
    }
}

#[test]
fn test_sprint_materials_report_counts() {
    let db = TestDatabaseManager::new_temp();
    let now = Utc::now();
    db.seed_progress(&["w01", "w02"], 1, now - Duration::hours(1));

    let learner = db.learner();
    let catalog = TestDataFactory::catalog();
    let materials = catalog.sprint_materials("unit1", &learner, DEFAULT_NEW_MATERIALS, now);

    assert_eq!(materials.stats.due_for_review, 2);
    assert_eq!(materials.stats.new_items, DEFAULT_NEW_MATERIALS);
    assert_eq!(materials.stats.total_in_unit, 20);
    assert_eq!(materials.vocabulary.len(), 2 + DEFAULT_NEW_MATERIALS);
    assert_eq!(materials.grammar.len(), 2);
    assert_eq!(materials.texts.len(), 1);
}
