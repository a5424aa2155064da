//! Reading comprehension exercises from texts.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::types::{Exercise, ExerciseKind, ExercisePayload, TextLink};
use crate::content::{TextEntry, TextQuestion};

/// One exercise per well-formed question of `text`
///
/// Multiple-choice questions need two distinct options including the answer;
/// otherwise the question is asked as short answer. Questions without text or
/// answer are skipped.
pub fn comprehension_exercises<R: Rng + ?Sized>(text: &TextEntry, rng: &mut R) -> Vec<Exercise> {
    let link = TextLink::from(text);

    text.questions
        .iter()
        .filter_map(|q| question_exercise(q, rng))
        .map(|mut exercise| {
            exercise.text = Some(link.clone());
            exercise
        })
        .collect()
}

fn question_exercise<R: Rng + ?Sized>(q: &TextQuestion, rng: &mut R) -> Option<Exercise> {
    let question = q.question.trim();
    let answer = q.answer.trim();
    if question.is_empty() || answer.is_empty() {
        tracing::debug!(question = %q.question, "Skipping malformed comprehension question");
        return None;
    }

    let wants_choice = ExerciseKind::parse_name(&q.kind) == Some(ExerciseKind::MultipleChoice);
    let mut seen = HashSet::new();
    let mut options: Vec<String> = q
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty() && seen.insert(o.clone()))
        .collect();

    let payload = if wants_choice && options.len() >= 2 && options.iter().any(|o| o == answer) {
        options.shuffle(rng);
        ExercisePayload::MultipleChoice {
            question: question.to_string(),
            options,
        }
    } else {
        ExercisePayload::ShortAnswer {
            question: question.to_string(),
        }
    };

    let mut exercise = Exercise::new(payload, answer, rng);
    exercise.hint = q.hint.clone();
    Some(exercise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn text() -> TextEntry {
        serde_json::from_value(serde_json::json!({
            "id": "t1",
            "unit": "unit1",
            "title": "No café",
            "text": "A Ana pede um café.",
            "questions": [
                {"type": "multiple_choice", "question": "O que a Ana pede?", "answer": "um café", "options": ["um chá", "um café", "um café"]},
                {"type": "multiple_choice", "question": "Quem pede?", "answer": "Ana", "options": ["Ana"]},
                {"type": "short_answer", "q": "Onde ela está?", "a": "No café"},
                {"type": "short_answer", "q": "", "a": "nada"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_comprehension_kinds_and_links() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let exercises = comprehension_exercises(&text(), &mut rng);

        assert_eq!(exercises.len(), 3);
        assert_eq!(exercises[0].kind(), ExerciseKind::MultipleChoice);
        assert_eq!(exercises[0].options().len(), 2);
        assert!(exercises[0].is_valid());
        // a single option degrades to short answer
        assert_eq!(exercises[1].kind(), ExerciseKind::ShortAnswer);
        assert_eq!(exercises[2].correct, "No café");

        for exercise in &exercises {
            let link = exercise.text.as_ref().unwrap();
            assert_eq!(link.id, "t1");
            assert_eq!(link.unit, "unit1");
            assert!(exercise.item_id.is_none());
        }
    }
}
