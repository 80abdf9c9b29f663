//! Rule model: the data structures a bundler pipeline configuration is made of.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Match pattern declared on a rule, stored as regex source text.
///
/// Equality is source-text equality: two patterns are the same rule-selector
/// exactly when they were written the same way. Matching against a candidate
/// path compiles the source on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern(String);

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn source(&self) -> &str {
        &self.0
    }

    /// Test a candidate path against the compiled pattern.
    pub fn is_match(&self, candidate: &str) -> Result<bool, regex::Error> {
        Ok(Regex::new(&self.0)?.is_match(candidate))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The transform a rule applies: a single path-like identifier, or an inline
/// chain of child rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Transform {
    Path(String),
    Chain(Vec<Rule>),
}

/// One entry in the pipeline's rule tree.
///
/// A structural record: the fields the navigator and the style pass care about
/// are typed and optional; everything else a configuration may carry lands in
/// `extra` and round-trips untouched.
///
/// `Clone` produces a fully independent deep copy. Mutating a clone's nested
/// collections or option bags never affects the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rule {
    /// Pattern selecting the inputs this rule claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Pattern>,

    /// Pattern carving inputs back out of `pattern`'s selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,

    /// Transform applied to claimed inputs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,

    /// Child rules applied in order when this rule matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Rule>>,

    /// Alternative child rules; the first one that matches wins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<Rule>>,

    /// Option bag for the transform. Opaque to the navigator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,

    /// Any other fields the configuration carries, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    /// Rule selecting inputs by pattern.
    pub fn with_pattern(source: impl Into<String>) -> Self {
        Self {
            pattern: Some(Pattern::new(source)),
            ..Self::default()
        }
    }

    /// Rule that runs a single transform step, optionally with options.
    pub fn transform_step(path: impl Into<String>, options: Option<Value>) -> Self {
        Self {
            transform: Some(Transform::Path(path.into())),
            options,
            ..Self::default()
        }
    }

    /// The rule's nested child collection.
    ///
    /// Exactly one source is consulted, in fixed precedence order: `steps` when
    /// present and non-empty, else `one_of` when present, else the chain of
    /// `transform` when it holds one, else nothing. Later sources are never
    /// consulted once an earlier one applies, even when several are populated.
    pub fn children(&self) -> &[Rule] {
        if let Some(steps) = &self.steps {
            if !steps.is_empty() {
                return steps;
            }
        }
        if let Some(alternatives) = &self.one_of {
            return alternatives;
        }
        if let Some(Transform::Chain(chain)) = &self.transform {
            return chain;
        }
        &[]
    }

    /// Mutable access to the collection `children` selects.
    ///
    /// `None` when the rule has no child source at all.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Rule>> {
        if self.steps.as_ref().is_some_and(|steps| !steps.is_empty()) {
            return self.steps.as_mut();
        }
        if self.one_of.is_some() {
            return self.one_of.as_mut();
        }
        match &mut self.transform {
            Some(Transform::Chain(chain)) => Some(chain),
            _ => None,
        }
    }

    /// Merge default options into the rule's option bag.
    ///
    /// Keys already present win over the defaults. A missing bag becomes the
    /// defaults; a non-object bag is left untouched.
    pub fn merge_default_options(&mut self, defaults: Value) {
        let mut merged = match defaults {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        match self.options.take() {
            Some(Value::Object(existing)) => {
                merged.extend(existing);
                self.options = Some(Value::Object(merged));
            }
            Some(other) => self.options = Some(other),
            None => self.options = Some(Value::Object(merged)),
        }
    }
}

/// The `module` section of a pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConfig {
    pub rules: Vec<Rule>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A bundler pipeline configuration.
///
/// Only `module.rules` is typed; every other section is preserved verbatim so
/// the object handed back to the build pipeline differs from its input solely
/// in the rule tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub module: ModuleConfig,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn marker(name: &str) -> Rule {
        Rule {
            extra: [("name".to_string(), json!(name))].into_iter().collect(),
            ..Rule::default()
        }
    }

    #[rstest]
    #[case::steps_only(Some(vec![marker("s")]), None, None, Some("s"))]
    #[case::steps_shadow_one_of(Some(vec![marker("s")]), Some(vec![marker("o")]), None, Some("s"))]
    #[case::empty_steps_fall_through(Some(vec![]), Some(vec![marker("o")]), None, Some("o"))]
    #[case::one_of_shadows_chain(None, Some(vec![marker("o")]), Some(Transform::Chain(vec![marker("c")])), Some("o"))]
    #[case::chain_last(None, None, Some(Transform::Chain(vec![marker("c")])), Some("c"))]
    #[case::single_path_has_no_children(None, None, Some(Transform::Path("/t/x/i.js".into())), None)]
    #[case::bare_rule(None, None, None, None)]
    fn given_child_sources_when_reading_children_then_first_present_wins(
        #[case] steps: Option<Vec<Rule>>,
        #[case] one_of: Option<Vec<Rule>>,
        #[case] transform: Option<Transform>,
        #[case] expected: Option<&str>,
    ) {
        let mut rule = Rule {
            steps,
            one_of,
            transform,
            ..Rule::default()
        };

        let first = rule.children().first().map(|r| r.extra["name"].as_str().unwrap().to_string());
        assert_eq!(first.as_deref(), expected);

        // Mutable access selects the same source.
        let first_mut = rule
            .children_mut()
            .and_then(|v| v.first().map(|r| r.extra["name"].as_str().unwrap().to_string()));
        assert_eq!(first_mut.as_deref(), expected);
    }

    #[test]
    fn given_empty_one_of_when_reading_children_then_chain_is_not_consulted() {
        let rule = Rule {
            one_of: Some(vec![]),
            transform: Some(Transform::Chain(vec![marker("c")])),
            ..Rule::default()
        };

        assert!(rule.children().is_empty());
    }

    #[test]
    fn given_existing_options_when_merging_defaults_then_existing_keys_win() {
        let mut rule = Rule {
            options: Some(json!({ "importLoaders": 1, "modules": false })),
            ..Rule::default()
        };

        rule.merge_default_options(json!({ "modules": true, "localIdentName": "[local]" }));

        assert_eq!(
            rule.options,
            Some(json!({ "importLoaders": 1, "modules": false, "localIdentName": "[local]" }))
        );
    }

    #[test]
    fn given_no_options_when_merging_defaults_then_bag_becomes_defaults() {
        let mut rule = Rule::default();

        rule.merge_default_options(json!({ "sourceMap": true }));

        assert_eq!(rule.options, Some(json!({ "sourceMap": true })));
    }

    #[test]
    fn given_non_object_options_when_merging_defaults_then_bag_is_untouched() {
        let mut rule = Rule {
            options: Some(json!("inline")),
            ..Rule::default()
        };

        rule.merge_default_options(json!({ "sourceMap": true }));

        assert_eq!(rule.options, Some(json!("inline")));
    }

    #[test]
    fn given_pattern_when_probing_candidates_then_compiled_regex_decides() {
        let pattern = Pattern::new(r"\.s[ac]ss$");

        assert!(pattern.is_match("src/app.scss").unwrap());
        assert!(pattern.is_match("src/app.sass").unwrap());
        assert!(!pattern.is_match("src/app.css").unwrap());
    }

    #[test]
    fn given_unknown_fields_when_round_tripping_then_they_are_preserved() {
        let raw = json!({
            "pattern": "\\.css$",
            "sideEffects": true,
            "oneOf": [{ "pattern": "\\.module\\.css$" }]
        });

        let rule: Rule = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(rule.extra["sideEffects"], json!(true));
        assert_eq!(rule.one_of.as_ref().map(Vec::len), Some(1));

        let back = serde_json::to_value(&rule).unwrap();
        assert_eq!(back, raw);
    }
}
