//! Rule tree navigator: first-match depth-first search and relative insertion.
//!
//! The navigator owns no state. Every operation takes the root, runs a fresh
//! search, and hands back either a [`Locator`] into the real owning collection
//! or the not-found signal. Insertions never reuse an earlier locator, so a
//! structural change elsewhere in the tree cannot leave a stale handle behind.

use tracing::{debug, instrument};

use crate::errors::{RewireError, RewireResult};
use crate::matcher::Matcher;
use crate::rule::{PipelineConfig, Rule};

/// The storage location of a matched rule: the collection that actually owns
/// it, by mutable reference, and its position there.
///
/// Holding a locator is holding exclusive access to the owning collection;
/// it goes stale the moment anything else mutates the tree.
pub struct Locator<'a> {
    pub rules: &'a mut Vec<Rule>,
    pub index: usize,
}

impl<'a> Locator<'a> {
    pub fn rule(&mut self) -> &mut Rule {
        &mut self.rules[self.index]
    }

    pub fn into_rule(self) -> &'a mut Rule {
        &mut self.rules[self.index]
    }
}

/// A place a search can start from: a bare rule collection, a single rule
/// (the search begins at its children), or a whole pipeline configuration.
pub trait RuleSource {
    fn top_rules(&self) -> &[Rule];

    /// The collection `top_rules` reads from, or `None` when the source has
    /// no owned collection to mutate.
    fn top_rules_mut(&mut self) -> Option<&mut Vec<Rule>>;
}

impl RuleSource for Vec<Rule> {
    fn top_rules(&self) -> &[Rule] {
        self
    }

    fn top_rules_mut(&mut self) -> Option<&mut Vec<Rule>> {
        Some(self)
    }
}

impl RuleSource for Rule {
    fn top_rules(&self) -> &[Rule] {
        self.children()
    }

    fn top_rules_mut(&mut self) -> Option<&mut Vec<Rule>> {
        self.children_mut()
    }
}

impl RuleSource for PipelineConfig {
    fn top_rules(&self) -> &[Rule] {
        &self.module.rules
    }

    fn top_rules_mut(&mut self) -> Option<&mut Vec<Rule>> {
        Some(&mut self.module.rules)
    }
}

/// Pre-order, left-to-right, depth-before-breadth: test a node, then its
/// children, then its next sibling. Records the descent path to the owning
/// collection and returns the match's index within it.
fn search_rules<M>(rules: &[Rule], matcher: &M, path: &mut Vec<usize>) -> Option<usize>
where
    M: Matcher + ?Sized,
{
    for (index, rule) in rules.iter().enumerate() {
        if matcher.matches(rule) {
            return Some(index);
        }
        path.push(index);
        if let Some(found) = search_rules(rule.children(), matcher, path) {
            return Some(found);
        }
        path.pop();
    }
    None
}

/// Find the first rule satisfying the predicate, anywhere in the (sub)tree.
///
/// Returns a [`Locator`] for the collection that actually contains the match,
/// which may be a descendant's child collection rather than the root. `None`
/// is the explicit not-found signal; the navigator never panics on it.
///
/// The search runs in two phases: an immutable pass discovers the sibling path
/// to the owning collection, then a mutable descent along that path produces
/// the borrow the locator carries.
#[instrument(level = "debug", skip(root, matcher), fields(predicate = %matcher.describe()))]
pub fn locate<'a, S, M>(root: &'a mut S, matcher: &M) -> Option<Locator<'a>>
where
    S: RuleSource + ?Sized,
    M: Matcher + ?Sized,
{
    let mut path = Vec::new();
    let index = search_rules(root.top_rules(), matcher, &mut path)?;
    debug!(depth = path.len(), index, "located rule");

    let mut rules = root.top_rules_mut()?;
    for &step in &path {
        rules = rules.get_mut(step)?.children_mut()?;
    }
    Some(Locator { rules, index })
}

/// [`locate`] and dereference. Not finding a match is an error here: call
/// sites reach for this only when the rule is asserted to exist.
pub fn find_rule<'a, S, M>(root: &'a mut S, matcher: &M) -> RewireResult<&'a mut Rule>
where
    S: RuleSource + ?Sized,
    M: Matcher + ?Sized,
{
    match locate(root, matcher) {
        Some(found) => Ok(found.into_rule()),
        None => Err(RewireError::RuleNotFound(matcher.describe())),
    }
}

/// Splice a rule into the matched rule's owning collection, directly before
/// the match. Runs its own fresh search.
pub fn insert_before<S, M>(root: &mut S, matcher: &M, rule: Rule) -> RewireResult<()>
where
    S: RuleSource + ?Sized,
    M: Matcher + ?Sized,
{
    splice(root, matcher, rule, 0)
}

/// Splice a rule into the matched rule's owning collection, directly after
/// the match. Runs its own fresh search.
pub fn insert_after<S, M>(root: &mut S, matcher: &M, rule: Rule) -> RewireResult<()>
where
    S: RuleSource + ?Sized,
    M: Matcher + ?Sized,
{
    splice(root, matcher, rule, 1)
}

#[instrument(level = "debug", skip(root, matcher, rule), fields(predicate = %matcher.describe()))]
fn splice<S, M>(root: &mut S, matcher: &M, rule: Rule, offset: usize) -> RewireResult<()>
where
    S: RuleSource + ?Sized,
    M: Matcher + ?Sized,
{
    let found = match locate(root, matcher) {
        Some(found) => found,
        None => return Err(RewireError::RuleNotFound(matcher.describe())),
    };
    debug!(at = found.index + offset, "splicing rule");
    found.rules.insert(found.index + offset, rule);
    Ok(())
}
