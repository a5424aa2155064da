//! Exercise synthesis for a sprint
//!
//! The requested count is clamped to `[min_count, max_count]` and split across
//! types by fixed weights. Translations are filled first, then each templated
//! type from ranked templates. Invalid and duplicate exercises never enter
//! the result; missing slots are back-filled with translations of distinct
//! unused items. When content runs out the result is shorter, never padded.
//!
//! Focused mode practices one grammar rule: only related exercises survive,
//! every exercise carries the rule, and a result that is still short is
//! completed with fresh-id copies of what was produced.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use super::answer::AnswerResolver;
use super::comprehension::comprehension_exercises;
use super::generators::{
    fill_blank_exercise, matching_exercise, multiple_choice_exercise, transform_exercise,
    translation_exercise,
};
use super::grammar::{annotate_with_grammar, related_vocabulary};
use super::types::{DedupKey, Exercise, ExerciseKind, ExercisePayload, GrammarLink};
use crate::config::CadenceConfig;
use crate::content::{GrammarRule, Template, TextEntry, VocabularyItem};

/// Share of a sprint given to one exercise type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeQuota {
    pub kind: ExerciseKind,
    pub weight: f64,
    /// Minimum slots regardless of sprint size
    pub floor: usize,
}

/// Type weights, in generation order
pub const TYPE_QUOTAS: [TypeQuota; 5] = [
    TypeQuota { kind: ExerciseKind::Translation, weight: 0.40, floor: 2 },
    TypeQuota { kind: ExerciseKind::MultipleChoice, weight: 0.25, floor: 1 },
    TypeQuota { kind: ExerciseKind::FillBlank, weight: 0.20, floor: 1 },
    TypeQuota { kind: ExerciseKind::Matching, weight: 0.10, floor: 0 },
    TypeQuota { kind: ExerciseKind::Transform, weight: 0.05, floor: 0 },
];

/// Extra distractors for multiple choice built from grammar examples
pub const GREETING_POOL: [&str; 8] = [
    "Olá",
    "Bom dia",
    "Boa tarde",
    "Boa noite",
    "Obrigado",
    "Por favor",
    "Com licença",
    "Até logo",
];

/// Rule template types tried when topping up a focused sprint
const FOCUS_PRIORITY: [ExerciseKind; 4] = [
    ExerciseKind::FillBlank,
    ExerciseKind::MultipleChoice,
    ExerciseKind::Transform,
    ExerciseKind::Matching,
];

/// Distractors drawn for an example-based question
const EXAMPLE_DISTRACTORS: usize = 3;

// ============================================================================
// INPUT
// ============================================================================

/// Material one synthesis run draws from
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    /// Unit vocabulary
    pub vocabulary: &'a [VocabularyItem],
    pub templates: &'a [Template],
    /// Unit grammar, used to annotate exercises in unfocused mode
    pub grammar: &'a [GrammarRule],
    /// Rule to practice exclusively
    pub focus: Option<&'a GrammarRule>,
    /// Reading texts, a last resort when other content runs out
    pub texts: &'a [TextEntry],
}

impl<'a> SynthesisInput<'a> {
    pub fn unfocused(vocabulary: &'a [VocabularyItem], templates: &'a [Template]) -> Self {
        Self {
            vocabulary,
            templates,
            grammar: &[],
            focus: None,
            texts: &[],
        }
    }

    pub fn focused(vocabulary: &'a [VocabularyItem], templates: &'a [Template], rule: &'a GrammarRule) -> Self {
        Self::unfocused(vocabulary, templates).with_focus(rule)
    }

    pub fn with_grammar(mut self, grammar: &'a [GrammarRule]) -> Self {
        self.grammar = grammar;
        self
    }

    pub fn with_focus(mut self, rule: &'a GrammarRule) -> Self {
        self.focus = Some(rule);
        self
    }

    pub fn with_texts(mut self, texts: &'a [TextEntry]) -> Self {
        self.texts = texts;
        self
    }
}

// ============================================================================
// COLLECTOR
// ============================================================================

/// Valid, deduplicated exercises up to a limit
struct Collector {
    exercises: Vec<Exercise>,
    keys: HashSet<DedupKey>,
    limit: usize,
}

impl Collector {
    fn new(limit: usize) -> Self {
        Self {
            exercises: Vec::with_capacity(limit),
            keys: HashSet::new(),
            limit,
        }
    }

    fn is_full(&self) -> bool {
        self.exercises.len() >= self.limit
    }

    fn count_of(&self, kind: ExerciseKind) -> usize {
        self.exercises.iter().filter(|e| e.kind() == kind).count()
    }

    fn push(&mut self, exercise: Exercise) -> bool {
        if self.is_full() || !exercise.is_valid() || !self.keys.insert(exercise.dedup_key()) {
            return false;
        }
        self.exercises.push(exercise);
        true
    }

    fn retain(&mut self, keep: impl FnMut(&Exercise) -> bool) {
        self.exercises.retain(keep);
        self.keys = self.exercises.iter().map(Exercise::dedup_key).collect();
    }

    /// Copies with fresh ids, cycling through what is already collected
    fn fill_with_clones<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let originals = self.exercises.len();
        if originals == 0 {
            return;
        }
        let mut next = 0;
        while !self.is_full() {
            let copy = self.exercises[next % originals].clone_with_new_id(rng);
            self.exercises.push(copy);
            next += 1;
        }
    }
}

// ============================================================================
// SYNTHESIZER
// ============================================================================

#[derive(Debug)]
pub struct Synthesizer {
    min_count: usize,
    max_count: usize,
    resolver: AnswerResolver,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(5, 15)
    }
}

impl Synthesizer {
    pub fn new(min_count: usize, max_count: usize) -> Self {
        Self {
            min_count: min_count.min(max_count),
            max_count,
            resolver: AnswerResolver::standard(),
        }
    }

    pub fn from_config(config: &CadenceConfig) -> Self {
        Self::new(config.min_exercises, config.max_exercises)
    }

    pub fn with_resolver(mut self, resolver: AnswerResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn clamp_count(&self, requested: usize) -> usize {
        requested.clamp(self.min_count, self.max_count)
    }

    /// Slots per type for a sprint of `count` exercises
    ///
    /// Rounded weights with per-type floors; the sum may exceed `count`, in
    /// which case later types get fewer slots.
    pub fn quotas(&self, count: usize) -> Vec<(ExerciseKind, usize)> {
        TYPE_QUOTAS
            .iter()
            .map(|q| (q.kind, ((count as f64 * q.weight).round() as usize).max(q.floor)))
            .collect()
    }

    /// Build up to `requested` (clamped) exercises from `input`
    pub fn synthesize<R: Rng + ?Sized>(
        &self,
        input: &SynthesisInput<'_>,
        requested: usize,
        rng: &mut R,
    ) -> Vec<Exercise> {
        let count = self.clamp_count(requested);
        if input.vocabulary.is_empty() {
            tracing::warn!("No vocabulary to synthesize exercises from");
            return Vec::new();
        }

        let quotas = self.quotas(count);
        let quota = |kind: ExerciseKind| quotas.iter().find(|(k, _)| *k == kind).map_or(0, |(_, n)| *n);

        let focus_vocab: Vec<VocabularyItem> = input
            .focus
            .map(|rule| related_vocabulary(input.vocabulary, rule).into_iter().cloned().collect())
            .unwrap_or_default();
        // Templates in a focused run draw words from the rule's vocabulary
        let template_vocab: &[VocabularyItem] = if focus_vocab.is_empty() {
            input.vocabulary
        } else {
            &focus_vocab
        };

        let mut out = Collector::new(count);
        let mut translated: HashSet<String> = HashSet::new();

        // Translations, grammar-related items first
        let translation_quota = quota(ExerciseKind::Translation);
        if let Some(rule) = input.focus {
            self.add_translations(&mut out, &focus_vocab, translation_quota, Some(rule), &mut translated, rng);
        }
        self.add_translations(&mut out, input.vocabulary, translation_quota, None, &mut translated, rng);

        // Templated types
        for kind in [ExerciseKind::MultipleChoice, ExerciseKind::FillBlank] {
            self.add_templated(&mut out, kind, quota(kind), input, template_vocab, rng);
        }
        self.add_matching(&mut out, quota(ExerciseKind::Matching), input, &focus_vocab, rng);
        self.add_templated(
            &mut out,
            ExerciseKind::Transform,
            quota(ExerciseKind::Transform),
            input,
            template_vocab,
            rng,
        );

        // Back-fill
        self.add_translations(&mut out, input.vocabulary, usize::MAX, None, &mut translated, rng);

        match input.focus {
            Some(rule) => self.finish_focused(&mut out, rule, &focus_vocab, template_vocab, &mut translated, rng),
            None => {
                for text in input.texts {
                    if out.is_full() {
                        break;
                    }
                    for exercise in comprehension_exercises(text, rng) {
                        out.push(exercise);
                    }
                }
                annotate_with_grammar(&mut out.exercises, input.grammar);
            }
        }

        let mut exercises = out.exercises;
        exercises.shuffle(rng);
        exercises.truncate(count);

        if exercises.len() < count {
            tracing::warn!(
                requested = count,
                produced = exercises.len(),
                "Content exhausted before reaching the requested count"
            );
        }
        tracing::info!(
            count = exercises.len(),
            focus = input.focus.map(|r| r.id.as_str()).unwrap_or("none"),
            "Synthesized exercises"
        );

        exercises
    }

    fn add_translations<R: Rng + ?Sized>(
        &self,
        out: &mut Collector,
        pool: &[VocabularyItem],
        quota: usize,
        link: Option<&GrammarRule>,
        used: &mut HashSet<String>,
        rng: &mut R,
    ) {
        let mut candidates: Vec<&VocabularyItem> = pool.iter().filter(|v| !used.contains(&v.id)).collect();
        candidates.shuffle(rng);

        for item in candidates {
            if out.is_full() || out.count_of(ExerciseKind::Translation) >= quota {
                break;
            }
            let Some(mut exercise) = translation_exercise(item, rng) else {
                continue;
            };
            if let Some(rule) = link {
                exercise = exercise.with_grammar(rule);
            }
            if out.push(exercise) {
                used.insert(item.id.clone());
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn add_templated<R: Rng + ?Sized>(
        &self,
        out: &mut Collector,
        kind: ExerciseKind,
        quota: usize,
        input: &SynthesisInput<'_>,
        vocabulary: &[VocabularyItem],
        rng: &mut R,
    ) {
        if let Some(rule) = input.focus {
            let own: Vec<&Template> = rule.templates.iter().filter(|t| t.kind == Some(kind)).collect();
            self.fill_slots(out, kind, quota, &own, vocabulary, Some(rule), rng);
            if kind == ExerciseKind::MultipleChoice {
                add_example_choices(out, rule, quota, rng);
            }
        }

        let ranked = ranked_templates(input, kind);
        self.fill_slots(out, kind, quota, &ranked, vocabulary, input.focus, rng);
    }

    /// Cycle through `templates` until `kind` reaches `quota`
    #[allow(clippy::too_many_arguments)]
    fn fill_slots<R: Rng + ?Sized>(
        &self,
        out: &mut Collector,
        kind: ExerciseKind,
        quota: usize,
        templates: &[&Template],
        vocabulary: &[VocabularyItem],
        link: Option<&GrammarRule>,
        rng: &mut R,
    ) {
        if templates.is_empty() {
            return;
        }
        let attempts = templates.len().max(quota) * 2;

        for template in templates.iter().cycle().take(attempts) {
            if out.is_full() || out.count_of(kind) >= quota {
                break;
            }
            let Some(mut exercise) = self.from_template(kind, template, vocabulary, rng) else {
                continue;
            };
            if let Some(rule) = link {
                exercise = exercise.with_grammar(rule);
            }
            out.push(exercise);
        }
    }

    fn add_matching<R: Rng + ?Sized>(
        &self,
        out: &mut Collector,
        quota: usize,
        input: &SynthesisInput<'_>,
        focus_vocab: &[VocabularyItem],
        rng: &mut R,
    ) {
        let (pool, link) = match input.focus {
            Some(rule) if focus_vocab.len() >= 2 => (focus_vocab, Some(rule)),
            _ => (input.vocabulary, None),
        };

        for _ in 0..quota * 2 {
            if out.is_full() || out.count_of(ExerciseKind::Matching) >= quota {
                break;
            }
            let Some(mut exercise) = matching_exercise(pool, rng) else {
                break;
            };
            if let Some(rule) = link {
                exercise = exercise.with_grammar(rule);
            }
            out.push(exercise);
        }
    }

    fn from_template<R: Rng + ?Sized>(
        &self,
        kind: ExerciseKind,
        template: &Template,
        vocabulary: &[VocabularyItem],
        rng: &mut R,
    ) -> Option<Exercise> {
        match kind {
            ExerciseKind::MultipleChoice => multiple_choice_exercise(template, vocabulary, &self.resolver, rng),
            ExerciseKind::FillBlank => fill_blank_exercise(template, vocabulary, &self.resolver, rng),
            ExerciseKind::Transform => transform_exercise(template, vocabulary, &self.resolver, rng),
            ExerciseKind::Matching => matching_exercise(vocabulary, rng),
            ExerciseKind::Translation | ExerciseKind::ShortAnswer => None,
        }
    }

    /// Keep related exercises, top up from the rule, tag and pad with copies
    fn finish_focused<R: Rng + ?Sized>(
        &self,
        out: &mut Collector,
        rule: &GrammarRule,
        focus_vocab: &[VocabularyItem],
        template_vocab: &[VocabularyItem],
        translated: &mut HashSet<String>,
        rng: &mut R,
    ) {
        let related_ids: HashSet<&str> = focus_vocab.iter().map(|v| v.id.as_str()).collect();
        out.retain(|e| {
            e.grammar.as_ref().is_some_and(|g| g.id == rule.id)
                || related_ids.iter().any(|id| e.practices(id))
        });

        self.add_translations(out, focus_vocab, usize::MAX, Some(rule), translated, rng);

        for kind in FOCUS_PRIORITY {
            for template in rule.templates.iter().filter(|t| t.kind == Some(kind)) {
                if out.is_full() {
                    break;
                }
                if let Some(exercise) = self.from_template(kind, template, template_vocab, rng) {
                    out.push(exercise.with_grammar(rule));
                }
            }
        }
        add_example_choices(out, rule, usize::MAX, rng);

        for exercise in out.exercises.iter_mut().filter(|e| e.grammar.is_none()) {
            exercise.grammar = Some(GrammarLink::from(rule));
        }
        out.fill_with_clones(rng);
    }
}

/// Templates of `kind`, ranked by relevance
///
/// Templates mentioning the focus rule's title come first, then those whose
/// vocabulary placeholders use tags present in the unit. Unfocused runs keep
/// the remaining templates last; focused runs drop them.
fn ranked_templates<'a>(input: &SynthesisInput<'a>, kind: ExerciseKind) -> Vec<&'a Template> {
    let unit_tags: HashSet<&str> = input
        .vocabulary
        .iter()
        .flat_map(|v| v.tags.iter().map(String::as_str))
        .collect();
    let title = input.focus.map(|r| r.title.as_str());
    let templates: &'a [Template] = input.templates;

    let mut ranked: Vec<(u8, &'a Template)> = templates
        .iter()
        .filter(|t| t.kind == Some(kind))
        .filter_map(|t| {
            let rank = if title.is_some_and(|title| t.mentions(title)) {
                0
            } else if t.references_tags(|tag| unit_tags.contains(tag)) {
                1
            } else if input.focus.is_none() {
                2
            } else {
                return None;
            };
            Some((rank, t))
        })
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank);
    ranked.into_iter().map(|(_, t)| t).collect()
}

/// Multiple choice asking for the source sentence of a rule example
///
/// Each example is asked at most once per sprint.
fn add_example_choices<R: Rng + ?Sized>(out: &mut Collector, rule: &GrammarRule, quota: usize, rng: &mut R) {
    let mut order: Vec<usize> = (0..rule.examples.len()).collect();
    order.shuffle(rng);

    for index in order {
        if out.is_full() || out.count_of(ExerciseKind::MultipleChoice) >= quota {
            break;
        }
        let asked = out.exercises.iter().any(|e| {
            e.kind() == ExerciseKind::MultipleChoice && e.question() == Some(rule.examples[index].target.trim())
        });
        if asked {
            continue;
        }
        if let Some(exercise) = example_choice(rule, index, rng) {
            out.push(exercise);
        }
    }
}

fn example_choice<R: Rng + ?Sized>(rule: &GrammarRule, index: usize, rng: &mut R) -> Option<Exercise> {
    let example = rule.examples.get(index)?;
    let correct = example.source.trim();
    let question = example.target.trim();
    if correct.is_empty() || question.is_empty() {
        return None;
    }

    let mut pool: Vec<String> = rule
        .examples
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, e)| e.source.trim().to_string())
        .chain(GREETING_POOL.iter().map(|s| s.to_string()))
        .filter(|s| !s.is_empty() && s != correct)
        .collect();
    pool.sort();
    pool.dedup();
    pool.shuffle(rng);

    let mut options = vec![correct.to_string()];
    options.extend(pool.into_iter().take(EXAMPLE_DISTRACTORS));
    options.shuffle(rng);

    let mut exercise = Exercise::new(
        ExercisePayload::MultipleChoice {
            question: question.to_string(),
            options,
        },
        correct,
        rng,
    );
    exercise.hint = Some(rule.title.clone()).filter(|t| !t.trim().is_empty());
    Some(exercise.with_grammar(rule))
}
