//! Predicates for picking rules out of the tree.

use std::path::MAIN_SEPARATOR;

use crate::rule::{Pattern, Rule, Transform};

/// Capability interface for rule predicates.
///
/// Implemented for every `Fn(&Rule) -> bool`, so ad-hoc closures and named
/// matchers pass through the navigator interchangeably. `describe` feeds the
/// not-found error message.
pub trait Matcher {
    fn matches(&self, rule: &Rule) -> bool;

    fn describe(&self) -> String {
        "<closure predicate>".to_string()
    }
}

impl<F> Matcher for F
where
    F: Fn(&Rule) -> bool,
{
    fn matches(&self, rule: &Rule) -> bool {
        self(rule)
    }
}

/// Matches a rule whose declared pattern equals the given source text.
pub struct PatternIs(Pattern);

impl PatternIs {
    pub fn new(source: impl Into<String>) -> Self {
        Self(Pattern::new(source))
    }
}

impl Matcher for PatternIs {
    fn matches(&self, rule: &Rule) -> bool {
        rule.pattern.as_ref() == Some(&self.0)
    }

    fn describe(&self) -> String {
        format!("pattern == {}", self.0)
    }
}

/// Matches a rule whose transform is a single path containing the named step
/// as a separator-delimited segment.
///
/// The segment check mirrors how step packages appear in resolved paths:
/// `{sep}name{sep}` never matches a prefix of a longer package name.
pub struct TransformPathContains {
    name: String,
    segment: String,
}

impl TransformPathContains {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let segment = format!("{MAIN_SEPARATOR}{name}{MAIN_SEPARATOR}");
        Self { name, segment }
    }
}

impl Matcher for TransformPathContains {
    fn matches(&self, rule: &Rule) -> bool {
        matches!(&rule.transform, Some(Transform::Path(path)) if path.contains(&self.segment))
    }

    fn describe(&self) -> String {
        format!("transform path contains '{}'", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_equal_pattern_source_when_matching_then_rule_is_selected() {
        let matcher = PatternIs::new(r"\.css$");

        assert!(matcher.matches(&Rule::with_pattern(r"\.css$")));
        assert!(!matcher.matches(&Rule::with_pattern(r"\.scss$")));
        assert!(!matcher.matches(&Rule::default()));
    }

    #[test]
    fn given_step_name_when_matching_then_only_delimited_segments_count() {
        let matcher = TransformPathContains::new("css-loader");

        let hit = Rule::transform_step("/toolchain/css-loader/index.js", None);
        let near_miss = Rule::transform_step("/toolchain/css-loader-legacy/index.js", None);
        let bare = Rule::transform_step("css-loader", None);

        assert!(matcher.matches(&hit));
        assert!(!matcher.matches(&near_miss));
        assert!(!matcher.matches(&bare));
    }

    #[test]
    fn given_chain_transform_when_matching_by_path_then_rule_is_not_selected() {
        let matcher = TransformPathContains::new("css-loader");
        let rule = Rule {
            transform: Some(Transform::Chain(vec![Rule::transform_step(
                "/toolchain/css-loader/index.js",
                None,
            )])),
            ..Rule::default()
        };

        assert!(!matcher.matches(&rule));
    }

    #[test]
    fn given_closure_when_used_as_matcher_then_blanket_impl_applies() {
        let matcher = |rule: &Rule| rule.options.is_some();

        let with_options = Rule {
            options: Some(serde_json::json!({})),
            ..Rule::default()
        };
        assert!(matcher.matches(&with_options));
        assert!(!matcher.matches(&Rule::default()));
    }
}
