//! Surgical editing of bundler module-rule trees.
//!
//! A pipeline configuration carries an ordered tree of module rules; rules may
//! nest child rules under several alternative fields. This crate finds rules
//! anywhere in that tree by predicate — first match, depth-first, left to
//! right — and hands back the actual owning collection so new rules can be
//! spliced in place, before or after the match. On top of the navigator sits
//! the style-pipeline pass, which clones the stock CSS rule into CSS-modules
//! and Sass variants and attaches them at the right positions.
//!
//! The tree is mutated synchronously under exclusive `&mut` access; the crate
//! owns no state across calls and performs no I/O.

pub mod display;
pub mod errors;
pub mod matcher;
pub mod navigator;
pub mod rule;
pub mod styles;

pub use display::RuleTreeConvert;
pub use errors::{RewireError, RewireResult};
pub use matcher::{Matcher, PatternIs, TransformPathContains};
pub use navigator::{find_rule, insert_after, insert_before, locate, Locator, RuleSource};
pub use rule::{ModuleConfig, Pattern, PipelineConfig, Rule, Transform};
pub use styles::{ModulesDirResolver, StylePipeline, TransformResolver};
