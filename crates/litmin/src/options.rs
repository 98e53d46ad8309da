//! Option resolution
//!
//! User options arrive as a YAML tree. They are deep-merged over the built-in
//! defaults, then read into typed records once per session. The result is
//! immutable and can be shared across threads.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::Result;
use crate::filter::FileFilter;

/// Configuration directory searched for by hosts
pub const CONFIG_DIR: &str = ".config";
/// Configuration file name inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "litmin.yaml";

const DEFAULT_EXTENSIONS: [&str; 8] = ["js", "mjs", "cjs", "jsx", "ts", "mts", "cts", "tsx"];

/// One glob pattern or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Patterns::One(pattern) => vec![pattern.clone()],
            Patterns::Many(patterns) => patterns.clone(),
        }
    }
}

/// Options for the HTML minifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HtmlMinifyOptions {
    /// Keep closing tags that HTML allows omitting
    pub keep_closing_tags: bool,
    pub keep_comments: bool,
    pub keep_html_and_head_opening_tags: bool,
    /// Minify `<style>` contents
    pub minify_css: bool,
    /// Minify `<script>` contents
    pub minify_js: bool,
}

impl Default for HtmlMinifyOptions {
    fn default() -> Self {
        // Templates are fragments spliced next to each other at runtime, so
        // closing tags stay.
        Self {
            keep_closing_tags: true,
            keep_comments: false,
            keep_html_and_head_opening_tags: true,
            minify_css: false,
            minify_js: false,
        }
    }
}

/// Options for the CSS minifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CssMinifyOptions {
    pub minify: bool,
    /// Recover from invalid rules, reporting them as warnings
    pub error_recovery: bool,
}

impl Default for CssMinifyOptions {
    fn default() -> Self {
        Self {
            minify: true,
            error_recovery: true,
        }
    }
}

/// The user-facing options tree, in typed form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserOptions {
    pub include: Patterns,
    pub exclude: Patterns,
    pub html: HtmlMinifyOptions,
    pub css: CssMinifyOptions,
}

impl Default for UserOptions {
    fn default() -> Self {
        Self {
            include: Patterns::Many(
                DEFAULT_EXTENSIONS
                    .iter()
                    .map(|ext| format!("**/*.{ext}"))
                    .collect(),
            ),
            exclude: Patterns::One("**/node_modules/**".to_string()),
            html: HtmlMinifyOptions::default(),
            css: CssMinifyOptions::default(),
        }
    }
}

/// Deep-merge `source` over `target`, returning a new tree.
///
/// Mappings present on both sides merge key by key. Everything else
/// (sequences, scalars, tagged values, or a mapping meeting a non-mapping)
/// is taken from `source` wholesale. Neither input is modified.
pub fn merge_options(target: &Value, source: &Value) -> Value {
    match (target, source) {
        (Value::Mapping(target_map), Value::Mapping(source_map)) => {
            let mut merged = target_map.clone();
            for (key, source_value) in source_map {
                let merged_value = match target_map.get(key) {
                    Some(target_value) => merge_options(target_value, source_value),
                    None => source_value.clone(),
                };
                merged.insert(key.clone(), merged_value);
            }
            Value::Mapping(merged)
        }
        _ => source.clone(),
    }
}

/// Options for one transform session
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub filter: FileFilter,
    pub html: HtmlMinifyOptions,
    pub css: CssMinifyOptions,
}

impl ResolvedOptions {
    /// Merge a user options tree over the defaults and resolve it.
    ///
    /// A null tree (e.g. an empty file) means "all defaults".
    pub fn resolve(user: &Value) -> Result<Self> {
        let defaults = serde_yaml::to_value(UserOptions::default())?;
        let merged = match user {
            Value::Null => defaults,
            _ => merge_options(&defaults, user),
        };
        let options: UserOptions = serde_yaml::from_value(merged)?;
        Self::from_user(options)
    }

    pub fn default_options() -> Result<Self> {
        Self::from_user(UserOptions::default())
    }

    /// Resolve options from YAML text
    pub fn from_yaml(text: &str) -> Result<Self> {
        let user: Value = serde_yaml::from_str(text)?;
        Self::resolve(&user)
    }

    fn from_user(options: UserOptions) -> Result<Self> {
        let include = options.include.to_vec();
        let exclude = options.exclude.to_vec();
        let filter = FileFilter::new(&include, &exclude)?;
        Ok(Self {
            include,
            exclude,
            filter,
            html: options.html,
            css: options.css,
        })
    }
}

/// Load and resolve an options file
pub fn load_options_file(path: &Path) -> Result<ResolvedOptions> {
    let text = fs_err::read_to_string(path)?;
    let resolved = ResolvedOptions::from_yaml(&text)?;
    tracing::debug!(path = %path.display(), "loaded options");
    Ok(resolved)
}
