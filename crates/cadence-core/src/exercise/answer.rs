//! Correct-answer derivation
//!
//! A template either names its answer outright (`correct`) or describes it in
//! free text (`correct_logic`). The resolver tries each [`AnswerStrategy`] in
//! order and takes the first answer one produces:
//!
//! 1. [`ExplicitAssignment`]: `correct = 'value'`
//! 2. [`MappingPairs`]: `manhã - bom dia, tarde - boa tarde`, keyed by the
//!    value substituted into the template's first placeholder
//! 3. [`TokenAfterColon`]: `Use the reflexive form: levanto.`

use std::sync::LazyLock;

use regex::Regex;

static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)correct\s*[=:\-]\s*['"]([^'"]+)['"]"#).expect("assignment pattern is valid")
});

static PAIR_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;]+").expect("pair separator pattern is valid"));

static PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\-:]+)[\-:]+(.+)").expect("pair pattern is valid"));

static LEADING_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s.,;()]+)").expect("token pattern is valid"));

/// What a strategy sees of a template being instantiated
#[derive(Debug, Clone, Copy)]
pub struct AnswerContext<'a> {
    pub logic: &'a str,
    /// Value substituted into the first placeholder, if any
    pub substituted: Option<&'a str>,
    /// Whether the template has placeholders
    pub dynamic: bool,
}

/// One way of reading a correct answer out of free-text logic
pub trait AnswerStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn derive(&self, ctx: &AnswerContext<'_>) -> Option<String>;
}

/// `correct = "value"` style assignments
#[derive(Debug, Default, Clone, Copy)]
pub struct ExplicitAssignment;

impl AnswerStrategy for ExplicitAssignment {
    fn name(&self) -> &'static str {
        "explicit_assignment"
    }

    fn derive(&self, ctx: &AnswerContext<'_>) -> Option<String> {
        ASSIGNMENT
            .captures(ctx.logic)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// `key - value` pairs; only applies to templates with placeholders
#[derive(Debug, Default, Clone, Copy)]
pub struct MappingPairs;

impl AnswerStrategy for MappingPairs {
    fn name(&self) -> &'static str {
        "mapping_pairs"
    }

    fn derive(&self, ctx: &AnswerContext<'_>) -> Option<String> {
        if !ctx.dynamic {
            return None;
        }
        let pairs = mapping_pairs(ctx.logic);
        let first = pairs.first().map(|(_, v)| v.clone());

        ctx.substituted
            .map(|s| s.trim().to_lowercase())
            .and_then(|key| pairs.into_iter().find(|(k, _)| *k == key).map(|(_, v)| v))
            .or(first)
    }
}

/// First token after the first colon
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenAfterColon;

impl AnswerStrategy for TokenAfterColon {
    fn name(&self) -> &'static str {
        "token_after_colon"
    }

    fn derive(&self, ctx: &AnswerContext<'_>) -> Option<String> {
        let (_, rest) = ctx.logic.split_once(':')?;
        LEADING_TOKEN
            .captures(rest.trim())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim_end_matches('.').to_string())
            .filter(|s| !s.is_empty())
    }
}

/// `(lowercased key, value)` pairs described by mapping logic
///
/// Only the text after the first colon is considered when one is present,
/// so a leading instruction like `Greeting by time:` is skipped.
pub(crate) fn mapping_pairs(logic: &str) -> Vec<(String, String)> {
    let body = logic.split_once(':').map_or(logic, |(_, rest)| rest);

    PAIR_SEPARATOR
        .split(body)
        .filter_map(|chunk| {
            let caps = PAIR.captures(chunk.trim())?;
            let key = caps.get(1)?.as_str().trim().to_lowercase();
            let value = caps.get(2)?.as_str().trim().trim_end_matches('.').trim().to_string();
            (!key.is_empty() && !value.is_empty()).then_some((key, value))
        })
        .collect()
}

/// Ordered list of strategies
pub struct AnswerResolver {
    strategies: Vec<Box<dyn AnswerStrategy>>,
}

impl AnswerResolver {
    pub fn new(strategies: Vec<Box<dyn AnswerStrategy>>) -> Self {
        Self { strategies }
    }

    /// Assignment, then mapping, then token after colon
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(ExplicitAssignment),
            Box::new(MappingPairs),
            Box::new(TokenAfterColon),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn resolve(&self, ctx: &AnswerContext<'_>) -> Option<String> {
        self.strategies.iter().find_map(|strategy| {
            let answer = strategy.derive(ctx)?;
            tracing::debug!(strategy = strategy.name(), answer = %answer, "Derived answer");
            Some(answer)
        })
    }
}

impl Default for AnswerResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for AnswerResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerResolver")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(logic: &'a str, substituted: Option<&'a str>) -> AnswerContext<'a> {
        AnswerContext {
            logic,
            substituted,
            dynamic: substituted.is_some(),
        }
    }

    #[test]
    fn test_explicit_assignment() {
        let resolver = AnswerResolver::standard();
        assert_eq!(
            resolver.resolve(&ctx("correct = 'sou'", None)).as_deref(),
            Some("sou")
        );
        assert_eq!(
            resolver.resolve(&ctx(r#"Correct: "estou""#, None)).as_deref(),
            Some("estou")
        );
    }

    #[test]
    fn test_mapping_uses_substituted_value() {
        let resolver = AnswerResolver::standard();
        let logic = "Greeting by time: manhã - bom dia, tarde - boa tarde, noite - boa noite";

        assert_eq!(
            resolver.resolve(&ctx(logic, Some("tarde"))).as_deref(),
            Some("boa tarde")
        );
        assert_eq!(
            resolver.resolve(&ctx(logic, Some("Noite"))).as_deref(),
            Some("boa noite")
        );
    }

    #[test]
    fn test_mapping_falls_back_to_first_value() {
        let logic = "manhã - bom dia; tarde - boa tarde.";
        assert_eq!(
            MappingPairs.derive(&ctx(logic, Some("madrugada"))).as_deref(),
            Some("bom dia")
        );
    }

    #[test]
    fn test_mapping_skipped_for_static_templates() {
        let logic = "Answer: bom-dia";
        assert!(MappingPairs.derive(&ctx(logic, None)).is_none());
        assert_eq!(
            AnswerResolver::standard().resolve(&ctx(logic, None)).as_deref(),
            Some("bom-dia")
        );
    }

    #[test]
    fn test_token_after_colon() {
        let resolver = AnswerResolver::standard();
        assert_eq!(
            resolver.resolve(&ctx("Use the reflexive form: levanto.", None)).as_deref(),
            Some("levanto")
        );
        assert_eq!(
            resolver.resolve(&ctx("Plural form: casas (feminine)", None)).as_deref(),
            Some("casas")
        );
    }

    #[test]
    fn test_sentence_without_pairs_resolves_token() {
        let resolver = AnswerResolver::standard();
        assert_eq!(
            resolver
                .resolve(&ctx("Use reflexive verb in present: levanto.", Some("6")))
                .as_deref(),
            Some("levanto")
        );
    }

    #[test]
    fn test_nothing_derivable() {
        assert!(AnswerResolver::standard()
            .resolve(&ctx("Think about it", None))
            .is_none());
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            AnswerResolver::default().strategy_names(),
            vec!["explicit_assignment", "mapping_pairs", "token_after_colon"]
        );
    }
}
