//! Test Data Factory
//!
//! Provides utilities for generating realistic test data:
//! - Vocabulary, grammar, template and text catalogs
//! - Catalog directories written as JSON for loading tests
//! - Answered sprints for scoring and error-prone detection

use std::path::{Path, PathBuf};

use cadence_core::{Catalog, ExerciseKind, ExerciseOutcome, VocabularyItem};
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde_json::{json, Value};
use tempfile::TempDir;
use uuid::Uuid;

/// Twenty Portuguese/Russian pairs tagged `unit1`
pub const UNIT1_WORDS: [(&str, &str); 20] = [
    ("olá", "привет"),
    ("bom dia", "доброе утро"),
    ("boa tarde", "добрый день"),
    ("boa noite", "добрый вечер"),
    ("obrigado", "спасибо"),
    ("por favor", "пожалуйста"),
    ("sim", "да"),
    ("não", "нет"),
    ("casa", "дом"),
    ("livro", "книга"),
    ("água", "вода"),
    ("pão", "хлеб"),
    ("café", "кофе"),
    ("amigo", "друг"),
    ("cidade", "город"),
    ("rua", "улица"),
    ("falar", "говорить"),
    ("comer", "есть"),
    ("beber", "пить"),
    ("morar", "жить"),
];

/// A catalog directory on disk
///
/// The directory is removed when the fixture is dropped.
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Overwrite one catalog file with raw text
    pub fn overwrite(&self, name: &str, contents: &str) {
        std::fs::write(self.file(name), contents).expect("Failed to overwrite catalog file");
    }
}

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestDataFactory::write_catalog();
/// let catalog = Catalog::load(fixture.path()).await?;
///
/// let outcomes = TestDataFactory::outcomes(&["w01", "w02"], 1, Utc::now());
/// ```
pub struct TestDataFactory;

impl TestDataFactory {
    // ========================================================================
    // VOCABULARY
    // ========================================================================

    /// Id of the n-th unit1 word, `w01`..`w20`
    pub fn word_id(n: usize) -> String {
        format!("w{:02}", n + 1)
    }

    pub fn unit1_ids() -> Vec<String> {
        (0..UNIT1_WORDS.len()).map(Self::word_id).collect()
    }

    fn vocabulary_json() -> Value {
        let mut items: Vec<Value> = UNIT1_WORDS
            .iter()
            .enumerate()
            .map(|(i, (word, translation))| {
                let topic = if i >= 16 { "verbs" } else { "basics" };
                json!({
                    "id": Self::word_id(i),
                    "word": word,
                    "translation_ru": translation,
                    "example_pt": format!("Eu digo {} todos os dias.", word),
                    "tags": ["Unit1", topic],
                })
            })
            .collect();

        // Unit 2 uses numeric ids and a few extra words
        for (i, (word, translation)) in [("trabalho", "работа"), ("escola", "школа"), ("carro", "машина")]
            .iter()
            .enumerate()
        {
            items.push(json!({
                "id": 200 + i,
                "word": word,
                "translation": translation,
                "tags": ["unit2"],
            }));
        }
        // Incomplete entry, skipped by synthesis
        items.push(json!({ "id": "broken", "word": "", "translation": "пусто", "tags": ["unit2"] }));

        json!({ "vocabulary": items })
    }

    /// Vocabulary items as loaded from the fixture catalog
    pub fn vocabulary() -> Vec<VocabularyItem> {
        let file: Value = Self::vocabulary_json();
        serde_json::from_value(file["vocabulary"].clone()).expect("fixture vocabulary is valid")
    }

    // ========================================================================
    // GRAMMAR / TEMPLATES / TEXTS
    // ========================================================================

    fn grammar_json() -> Value {
        json!({
            "grammar": [
                {
                    "id": "g1",
                    "unit": "Unit1 ",
                    "title": "Saudações",
                    "explanation_ru": "Приветствия зависят от времени суток.",
                    "examples": [
                        { "pt": "Bom dia, Maria!", "ru": "Доброе утро, Мария!" },
                        { "pt": "Boa noite, amigo.", "ru": "Добрый вечер, друг." },
                        { "pt": "Olá, tudo bem?", "ru": "Привет, как дела?" }
                    ],
                    "templates": [
                        {
                            "type": "multiple_choice",
                            "template": "Как сказать 'доброе утро'?",
                            "options": ["Bom dia", "Boa noite", "Boa tarde"],
                            "correct": "Bom dia"
                        }
                    ]
                },
                {
                    "id": "g2",
                    "unit": "unit1",
                    "title": "Verbos em -ar",
                    "explanation_ru": "Спряжение глаголов на -ar в настоящем времени.",
                    "examples": [
                        { "pt": "Eu falo português.", "ru": "Я говорю по-португальски." },
                        { "pt": "Nós moramos em Lisboa.", "ru": "Мы живём в Лиссабоне." }
                    ],
                    "templates": []
                },
                {
                    "id": 7,
                    "unit": "unit2",
                    "title": "Artigos",
                    "explanation_ru": "Определённые артикли o и a.",
                    "examples": [{ "pt": "o carro", "ru": "машина" }]
                }
            ]
        })
    }

    fn templates_json() -> Value {
        json!({
            "templates": [
                {
                    "type": "fill_blank",
                    "base": "De {time} eu digo ___.",
                    "params": [{ "placeholder": "{time}", "from": "time" }],
                    "correct_logic": "Resposta: manhã - bom dia, tarde - boa tarde, noite - boa noite",
                    "hint": "Time of day",
                    "tags": ["unit1"]
                },
                {
                    "type": "fill_blank",
                    "template": "Eu ___ português.",
                    "correct": "falo",
                    "distractors": ["fala", "falam"],
                    "tags": ["unit1"]
                },
                {
                    "type": "multiple_choice",
                    "template": "Как сказать 'спасибо'?",
                    "options": ["obrigado", "por favor", "olá"],
                    "correct": "obrigado",
                    "tags": ["unit1"]
                },
                {
                    "type": "transform",
                    "base": "Escreva o número {n} por extenso.",
                    "params": [{ "placeholder": "{n}", "from": "numbers" }],
                    "transform_type": "number_to_word",
                    "tags": ["unit1"]
                },
                {
                    "type": "match",
                    "template": "Соедините пары",
                    "tags": ["unit1"]
                },
                {
                    "type": "essay",
                    "template": "Unsupported type",
                    "tags": ["unit1"]
                }
            ]
        })
    }

    fn texts_json() -> Value {
        json!({
            "texts": [
                {
                    "id": "t1",
                    "unit": "unit1",
                    "title": "No café",
                    "content": "A Maria bebe café com o amigo todas as manhãs.",
                    "questions": [
                        {
                            "type": "multiple_choice",
                            "q": "O que bebe a Maria?",
                            "a": "café",
                            "options": ["café", "água", "chá"]
                        },
                        { "type": "open", "q": "Com quem?", "a": "com o amigo" }
                    ]
                }
            ]
        })
    }

    // ========================================================================
    // CATALOGS
    // ========================================================================

    /// Write the four catalog files to a fresh temporary directory
    pub fn write_catalog() -> CatalogFixture {
        let dir = TempDir::new().expect("Failed to create catalog directory");
        let files = [
            ("vocabulary.json", Self::vocabulary_json()),
            ("grammar.json", Self::grammar_json()),
            ("templates.json", Self::templates_json()),
            ("texts.json", Self::texts_json()),
        ];
        for (name, value) in files {
            let body = serde_json::to_string_pretty(&value).expect("fixture serializes");
            std::fs::write(dir.path().join(name), body).expect("Failed to write catalog file");
        }
        CatalogFixture { dir }
    }

    /// The fixture catalog built in memory
    pub fn catalog() -> Catalog {
        let grammar = serde_json::from_value(Self::grammar_json()["grammar"].clone()).expect("fixture grammar is valid");
        let templates =
            serde_json::from_value(Self::templates_json()["templates"].clone()).expect("fixture templates are valid");
        let texts = serde_json::from_value(Self::texts_json()["texts"].clone()).expect("fixture texts are valid");
        Catalog::from_parts(Self::vocabulary(), grammar, templates, texts)
    }

    // ========================================================================
    // OUTCOMES
    // ========================================================================

    /// Translation outcomes for `items`, the first `correct` answered correctly
    pub fn outcomes(items: &[&str], correct: usize, at: DateTime<Utc>) -> Vec<ExerciseOutcome> {
        items
            .iter()
            .enumerate()
            .map(|(i, item)| ExerciseOutcome {
                exercise_id: format!("ex_{}", Uuid::new_v4().simple()),
                item_id: Some(item.to_string()),
                is_correct: i < correct,
                kind: ExerciseKind::Translation,
                timestamp: at,
                snapshot: None,
            })
            .collect()
    }

    pub fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_catalog_shape() {
        let catalog = TestDataFactory::catalog();
        assert_eq!(catalog.vocabulary_by_unit("unit1").len(), 20);
        assert_eq!(catalog.grammar_by_unit("unit1").len(), 2);
        assert_eq!(catalog.templates.len(), 6);
    }

    #[test]
    fn test_outcomes_mark_leading_items_correct() {
        let outcomes = TestDataFactory::outcomes(&["a", "b", "c"], 2, Utc::now());
        let correct: Vec<bool> = outcomes.iter().map(|o| o.is_correct).collect();
        assert_eq!(correct, vec![true, true, false]);
        assert_ne!(outcomes[0].exercise_id, outcomes[1].exercise_id);
    }
}
