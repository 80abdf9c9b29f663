//! Render a rule tree with termtree, for logs and debugging sessions.

use termtree::Tree;

use crate::rule::{PipelineConfig, Rule, Transform};

pub trait RuleTreeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl RuleTreeConvert for Rule {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children().iter().map(|c| c.to_tree_string()).collect();

        Tree::new(summary(self)).with_leaves(leaves)
    }
}

impl RuleTreeConvert for [Rule] {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.iter().map(|r| r.to_tree_string()).collect();

        Tree::new("rules".to_string()).with_leaves(leaves)
    }
}

impl RuleTreeConvert for PipelineConfig {
    fn to_tree_string(&self) -> Tree<String> {
        self.module.rules.as_slice().to_tree_string()
    }
}

/// One-line label for a rule: its pattern if declared, else its transform
/// path, else a marker for what kind of grouping node it is.
fn summary(rule: &Rule) -> String {
    if let Some(pattern) = &rule.pattern {
        return pattern.to_string();
    }
    match &rule.transform {
        Some(Transform::Path(path)) => path.clone(),
        Some(Transform::Chain(_)) => "<chain>".to_string(),
        None if rule.one_of.is_some() => "<one-of>".to_string(),
        None => "<rule>".to_string(),
    }
}
