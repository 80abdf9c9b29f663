//! Style-pipeline augmentation: derive CSS-modules, Sass, and Sass-modules
//! rules from the stock CSS rule and splice them into the tree.
//!
//! This is the flagship client of the navigator. It performs no search logic
//! of its own: every lookup and every insertion goes through a fresh
//! predicate-based search, so the pass stays correct regardless of where in
//! the tree the stock rules live.

use std::path::PathBuf;

use serde_json::json;
use tracing::{debug, instrument};

use crate::errors::{RewireError, RewireResult};
use crate::matcher::{PatternIs, TransformPathContains};
use crate::navigator::{find_rule, insert_after, insert_before};
use crate::rule::{Pattern, PipelineConfig, Rule};

/// Pattern selecting plain CSS inputs.
pub const CSS_PATTERN: &str = r"\.css$";
/// Pattern selecting CSS-modules inputs.
pub const CSS_MODULE_PATTERN: &str = r"\.module\.css$";
/// Pattern selecting Sass inputs, both syntaxes.
pub const SASS_PATTERN: &str = r"\.s[ac]ss$";
/// Pattern selecting Sass-modules inputs.
pub const SASS_MODULE_PATTERN: &str = r"\.module\.s[ac]ss$";

const CSS_STEP: &str = "css-loader";
const POSTCSS_STEP: &str = "postcss-loader";
const URL_REBASE_STEP: &str = "resolve-url-loader";
const SASS_STEP: &str = "sass-loader";
const FILE_EMITTER_STEP: &str = "file-loader";

/// Supplies absolute identifiers for named transform steps.
///
/// The pass only ever asks for a name and splices whatever comes back; how the
/// identifier is produced (module directory layout, lockfile, registry) is the
/// caller's business.
pub trait TransformResolver {
    fn resolve(&self, name: &str) -> RewireResult<String>;
}

impl<F> TransformResolver for F
where
    F: Fn(&str) -> RewireResult<String>,
{
    fn resolve(&self, name: &str) -> RewireResult<String> {
        self(name)
    }
}

/// Resolves step names against a modules directory: `<base>/<name>/index.js`.
pub struct ModulesDirResolver {
    base: PathBuf,
}

impl ModulesDirResolver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl TransformResolver for ModulesDirResolver {
    fn resolve(&self, name: &str) -> RewireResult<String> {
        let path = self.base.join(name).join("index.js");
        path.into_os_string()
            .into_string()
            .map_err(|_| RewireError::Resolve {
                name: name.to_string(),
                reason: "resolved path is not valid UTF-8".to_string(),
            })
    }
}

/// The augmentation pass. Configure include paths for the Sass compiler, then
/// run [`apply`](StylePipeline::apply) once over a configuration.
pub struct StylePipeline<R> {
    resolver: R,
    include_paths: Vec<String>,
}

impl<R: TransformResolver> StylePipeline<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            include_paths: Vec::new(),
        }
    }

    /// Directories the Sass compile step searches for `@import`s.
    pub fn with_include_paths(mut self, paths: impl IntoIterator<Item = String>) -> Self {
        self.include_paths = paths.into_iter().collect();
        self
    }

    /// Mutate the configuration in place. The stock CSS rule and the file
    /// emitter rule must exist; a configuration without them is malformed for
    /// this pass and surfaces as [`RewireError::RuleNotFound`].
    #[instrument(level = "debug", skip(self, config))]
    pub fn apply(&self, config: &mut PipelineConfig) -> RewireResult<()> {
        let css_matcher = PatternIs::new(CSS_PATTERN);
        let file_emitter = TransformPathContains::new(FILE_EMITTER_STEP);

        // Derive the css-modules rule from the stock css rule before that
        // rule learns its module-exclusion pattern.
        let mut css_modules_rule = find_rule(config, &css_matcher)?.clone();
        {
            let css_step = find_rule(&mut css_modules_rule, &TransformPathContains::new(CSS_STEP))?;
            css_step.merge_default_options(json!({
                "modules": true,
                "localIdentName": "[local]___[hash:base64:5]",
            }));
        }
        insert_before(config, &file_emitter, css_modules_rule)?;
        debug!("attached css-modules rule");

        // The stock rule no longer claims module files.
        find_rule(config, &css_matcher)?.exclude = Some(Pattern::new(CSS_MODULE_PATTERN));

        // Sass rule: same chain as the stock css rule, widened with a
        // url-rebase step and the Sass compiler after the postcss step.
        let mut sass_rule = find_rule(config, &css_matcher)?.clone();
        sass_rule.pattern = Some(Pattern::new(SASS_PATTERN));
        sass_rule.exclude = Some(Pattern::new(SASS_MODULE_PATTERN));

        let postcss_matcher = TransformPathContains::new(POSTCSS_STEP);
        insert_after(
            &mut sass_rule,
            &postcss_matcher,
            Rule::transform_step(
                self.resolver.resolve(URL_REBASE_STEP)?,
                Some(json!({ "sourceMap": true })),
            ),
        )?;
        insert_after(
            &mut sass_rule,
            &TransformPathContains::new(URL_REBASE_STEP),
            Rule::transform_step(
                self.resolver.resolve(SASS_STEP)?,
                Some(json!({
                    "sourceMap": true,
                    "includePaths": self.include_paths.clone(),
                })),
            ),
        )?;
        find_rule(&mut sass_rule, &postcss_matcher)?
            .merge_default_options(json!({ "sourceMap": true }));

        insert_before(config, &file_emitter, sass_rule.clone())?;
        debug!("attached sass rule");

        // Sass-modules rule: the sass rule without the module exclusion.
        let mut sass_modules_rule = sass_rule;
        sass_modules_rule.pattern = Some(Pattern::new(SASS_MODULE_PATTERN));
        sass_modules_rule.exclude = None;
        insert_before(config, &file_emitter, sass_modules_rule)?;
        debug!("attached sass-modules rule");

        Ok(())
    }
}
