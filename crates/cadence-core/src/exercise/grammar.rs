//! Linking exercises and vocabulary to grammar rules.

use super::types::{Exercise, GrammarLink};
use crate::content::{GrammarRule, VocabularyItem};

/// Title tokens shorter than this are ignored when matching tags
const MIN_TITLE_TOKEN: usize = 3;

/// First rule whose title or examples textually relate to `exercise`
///
/// A rule relates when its title appears in the question or answer, or when
/// one of its example sentences contains the question, the answer, an option
/// or a matching word.
pub fn find_relevant_grammar<'a>(exercise: &Exercise, rules: &'a [GrammarRule]) -> Option<&'a GrammarRule> {
    let mut needles: Vec<String> = Vec::new();
    if let Some(q) = exercise.question() {
        needles.push(q.to_lowercase());
    }
    needles.push(exercise.correct.to_lowercase());
    needles.extend(exercise.options().iter().map(|o| o.to_lowercase()));
    needles.extend(exercise.pairs().iter().map(|p| p.source.to_lowercase()));
    needles.retain(|n| !n.trim().is_empty());

    rules.iter().find(|rule| {
        let title = rule.title.trim().to_lowercase();
        let title_hit = !title.is_empty() && needles.iter().take(2).any(|n| n.contains(&title));

        title_hit
            || rule.examples.iter().any(|example| {
                let source = example.source.to_lowercase();
                needles.iter().any(|n| source.contains(n.as_str()))
            })
    })
}

/// Attach a relevant rule to every exercise that has none yet
pub fn annotate_with_grammar(exercises: &mut [Exercise], rules: &[GrammarRule]) {
    if rules.is_empty() {
        return;
    }
    for exercise in exercises.iter_mut().filter(|e| e.grammar.is_none()) {
        if let Some(rule) = find_relevant_grammar(exercise, rules) {
            exercise.grammar = Some(GrammarLink::from(rule));
        }
    }
}

/// Vocabulary that illustrates `rule`
///
/// An item relates when its word appears in an example sentence, its
/// translation appears in an example translation, or one of its tags
/// contains a word of the rule title.
pub fn related_vocabulary<'a>(vocabulary: &'a [VocabularyItem], rule: &GrammarRule) -> Vec<&'a VocabularyItem> {
    let sources: Vec<String> = rule.examples.iter().map(|e| e.source.to_lowercase()).collect();
    let targets: Vec<String> = rule.examples.iter().map(|e| e.target.to_lowercase()).collect();
    let title_tokens: Vec<String> = rule
        .title
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TITLE_TOKEN)
        .map(str::to_string)
        .collect();

    vocabulary
        .iter()
        .filter(|item| {
            let word = item.word.trim().to_lowercase();
            let translation = item.translation.trim().to_lowercase();

            (!word.is_empty() && sources.iter().any(|s| s.contains(&word)))
                || (!translation.is_empty() && targets.iter().any(|t| t.contains(&translation)))
                || item
                    .tags
                    .iter()
                    .any(|tag| title_tokens.iter().any(|token| tag.contains(token.as_str())))
        })
        .collect()
}
