//! Journey: answer a sprint, score it and keep history
//!
//! Covers SRS updates from outcomes, scoring and feedback, sprint history
//! and the daily streak.

use cadence_core::{
    analyze_exercise_types, feedback, format_sprint_result, score, sprint_statistics, Exercise,
    ExerciseKind, ExerciseOutcome, ExercisePayload, Grade, ProgressStore, TranslationDirection,
};
use cadence_e2e_tests::harness::TestDatabaseManager;
use cadence_e2e_tests::mocks::TestDataFactory;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

const TEN_WORDS: [&str; 10] = ["w01", "w02", "w03", "w04", "w05", "w06", "w07", "w08", "w09", "w10"];

#[test]
fn test_eight_of_ten_sprint() {
    let db = TestDatabaseManager::new_temp();
    let mut learner = db.learner();
    let now = Utc.with_ymd_and_hms(2026, 5, 4, 18, 30, 0).unwrap();

    let outcomes = TestDataFactory::outcomes(&TEN_WORDS, 8, now);

    // Wrong first answers leave items untracked; right ones start at level 0
    let updated = learner.record_outcomes(&db.storage, &outcomes).unwrap();
    assert_eq!(updated, 8);
    assert_eq!(db.progress_count(), 8);
    assert!(!learner.progress_map().contains_key("w09"));
    let w01 = &learner.progress_map()["w01"];
    assert_eq!(w01.level, 0);
    assert_eq!(w01.next_review, now);
    assert!(learner.due_ids(now).contains(&"w01".to_string()));

    let stats = score(&outcomes, 120, now);
    assert_eq!(stats.accuracy, 80);
    assert_eq!(stats.grade, Grade::B);
    assert_eq!(stats.minutes_taken, 2);
    assert_eq!(stats.exercises_per_minute, 5.0);

    let result = format_sprint_result(stats, "unit1", None, outcomes);
    assert_eq!(result.id, format!("sprint_{}", now.timestamp_millis()));

    let advice = feedback(&result.stats);
    assert_eq!(advice.message, "Well done!");
    assert!(!advice.should_repeat);

    learner.complete_sprint(&db.storage, &result, now.date_naive()).unwrap();
    assert_eq!(learner.total_sprints(), 1);
    assert_eq!(learner.streak_days(), 1);

    // Everything survives a reload
    let reloaded = db.learner();
    assert_eq!(reloaded.total_sprints(), 1);
    assert_eq!(reloaded.streak_days(), 1);
    assert_eq!(reloaded.last_sprint_date(), Some(now.date_naive()));
    assert_eq!(reloaded.progress_map().get("w01").map(|p| p.level), Some(0));

    let history = db.storage.sprints_by_unit("unit1").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], result);
}

#[test]
fn test_repeated_answers_climb_and_reset() {
    let db = TestDatabaseManager::new_temp();
    let mut learner = db.learner();
    let start = Utc.with_ymd_and_hms(2026, 1, 10, 9, 0, 0).unwrap();

    let mut at = start;
    for expected in 0..=3u8 {
        let record = learner.record_answer(&db.storage, "w05", true, at).unwrap().unwrap();
        assert_eq!(record.level, expected);
        at = record.next_review;
    }
    assert_eq!(learner.unit_stats("unit1", &TestDataFactory::catalog().vocabulary_by_unit("unit1")).learned, 1);

    let record = learner.record_answer(&db.storage, "w05", false, at).unwrap().unwrap();
    assert_eq!(record.level, 0);
    assert_eq!(record.correct, 4);
    assert_eq!(record.incorrect, 1);
    assert_eq!(record.next_review, at + Duration::days(1));

    let stored = db.storage.get_progress("w05").unwrap().unwrap();
    assert_eq!(stored, record);
}

#[test]
fn test_streak_across_days() {
    let db = TestDatabaseManager::new_temp();
    let mut learner = db.learner();
    let day = |d: u32| NaiveDate::from_ymd_opt(2026, 3, d).unwrap();

    let complete = |learner: &mut cadence_core::LearnerState, d: u32, hour: u32| {
        let at = Utc.with_ymd_and_hms(2026, 3, d, hour, 0, 0).unwrap();
        let outcomes = TestDataFactory::outcomes(&["w01", "w02"], 2, at);
        let result = format_sprint_result(score(&outcomes, 60, at), "unit1", None, outcomes);
        learner.complete_sprint(&db.storage, &result, day(d)).unwrap();
    };

    complete(&mut learner, 1, 8);
    assert_eq!(learner.streak_days(), 1);

    complete(&mut learner, 1, 20);
    assert_eq!(learner.streak_days(), 1, "second sprint on the same day");

    complete(&mut learner, 2, 8);
    assert_eq!(learner.streak_days(), 2);

    complete(&mut learner, 5, 8);
    assert_eq!(learner.streak_days(), 1, "a missed day restarts the streak");

    assert_eq!(learner.total_sprints(), 4);
    assert_eq!(db.learner().streak_days(), 1);
}

#[test]
fn test_history_statistics() {
    let db = TestDatabaseManager::new_temp();
    let base = Utc.with_ymd_and_hms(2026, 4, 1, 12, 0, 0).unwrap();

    db.seed_sprint("unit1", &TEN_WORDS, 10, base);
    db.seed_sprint("unit1", &TEN_WORDS, 6, base + Duration::days(1));
    db.seed_sprint("unit2", &["200", "201"], 1, base + Duration::days(2));

    let unit1 = sprint_statistics(&db.storage, Some("unit1")).unwrap();
    assert_eq!(unit1.total_sprints, 2);
    assert_eq!(unit1.average_accuracy, 80);
    assert_eq!(unit1.best_accuracy, 100);
    assert_eq!(unit1.last_sprint_date, Some(base + Duration::days(1)));

    let recent = db.storage.recent_sprints(2).unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].unit_id, "unit2", "newest first");

    let all = sprint_statistics(&db.storage, None).unwrap();
    assert_eq!(all.total_sprints, 3);
}

#[test]
fn test_grammar_sprint_replaces_previous_attempt() {
    let db = TestDatabaseManager::new_temp();
    let mut learner = db.learner();
    let catalog = TestDataFactory::catalog();
    let rule = catalog.grammar_by_id("g1").unwrap();
    let mut rng = TestDataFactory::rng(11);

    let exercise = Exercise::new(
        ExercisePayload::Translation {
            question: "bom dia".into(),
            direction: TranslationDirection::SourceToTarget,
        },
        "доброе утро",
        &mut rng,
    )
    .with_grammar(rule);

    for (day, correct) in [(1, false), (2, true)] {
        let at = Utc.with_ymd_and_hms(2026, 2, day, 10, 0, 0).unwrap();
        let outcomes = vec![ExerciseOutcome::from_exercise(&exercise, correct, at)];
        let result = format_sprint_result(score(&outcomes, 30, at), "unit1", Some(rule.id.as_str()), outcomes);
        assert_eq!(result.id, "grammar_unit1_g1");
        learner.complete_sprint(&db.storage, &result, at.date_naive()).unwrap();
    }

    let history = db.storage.sprints_by_unit("unit1").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].stats.accuracy, 100);
    assert_eq!(learner.total_sprints(), 2);
}

#[test]
fn test_breakdown_by_exercise_type() {
    let now = Utc::now();
    let mut outcomes = TestDataFactory::outcomes(&["w01", "w02", "w03"], 2, now);
    outcomes.push(ExerciseOutcome {
        exercise_id: "ex_match".into(),
        item_id: None,
        is_correct: false,
        kind: ExerciseKind::Matching,
        timestamp: now,
        snapshot: None,
    });

    let by_kind = analyze_exercise_types(&outcomes);
    assert_eq!(by_kind[&ExerciseKind::Translation].accuracy, 67);
    assert_eq!(by_kind[&ExerciseKind::Matching].correct, 0);

    let stats = score(&outcomes, 0, now);
    assert_eq!(stats.accuracy, 50);
    assert_eq!(stats.exercises_per_minute, 0.0);
    assert!(feedback(&stats).should_repeat);
}

#[test]
fn test_progress_survives_reopening_the_database() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("learner.db");
    let at = Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap();

    {
        let db = TestDatabaseManager::new_at_path(path.clone());
        let mut learner = db.learner();
        learner.record_answer(&db.storage, "w03", true, at).unwrap();
        learner.record_answer(&db.storage, "w03", true, at).unwrap();
        assert_eq!(db.path(), &path);
    }

    let reopened = TestDatabaseManager::new_at_path(path);
    let record = reopened.storage.get_progress("w03").unwrap().unwrap();
    assert_eq!(record.level, 1);
    assert_eq!(record.correct, 2);
    assert_eq!(reopened.learner().progress_map()["w03"], record);
}
