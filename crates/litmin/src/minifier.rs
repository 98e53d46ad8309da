//! Minifier adapter
//!
//! The transform only talks to minifiers through [`Minifier`]. The built-in
//! implementation uses minify-html for HTML and lightningcss for CSS.

use std::sync::{Arc, RwLock};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use crate::options::{CssMinifyOptions, HtmlMinifyOptions, ResolvedOptions};
use crate::tag::MarkupKind;
use crate::transform::SkipReason;

/// Result of one minifier invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinifyOutcome {
    pub code: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl MinifyOutcome {
    pub fn success(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Default::default()
        }
    }

    /// Keep the minified code only if nothing about it is uncertain.
    ///
    /// Any error blocks. For CSS, any warning blocks as well.
    pub fn accept(self, kind: MarkupKind) -> Result<String, SkipReason> {
        let blocking = match kind {
            MarkupKind::Html => self.errors,
            MarkupKind::Css => self.errors.into_iter().chain(self.warnings).collect(),
        };
        if blocking.is_empty() {
            Ok(self.code)
        } else {
            Err(SkipReason::Minifier {
                kind,
                problems: blocking,
            })
        }
    }
}

/// A markup minifier for each supported kind
pub trait Minifier: Send + Sync {
    fn minify_html(&self, text: &str, options: &HtmlMinifyOptions) -> MinifyOutcome;

    fn minify_css(&self, text: &str, options: &CssMinifyOptions) -> MinifyOutcome;

    /// Dispatch on `kind` with that kind's resolved options
    fn minify(&self, kind: MarkupKind, text: &str, options: &ResolvedOptions) -> MinifyOutcome {
        match kind {
            MarkupKind::Html => self.minify_html(text, &options.html),
            MarkupKind::Css => self.minify_css(text, &options.css),
        }
    }
}

/// minify-html + lightningcss
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMinifier;

impl Minifier for BuiltinMinifier {
    fn minify_html(&self, text: &str, options: &HtmlMinifyOptions) -> MinifyOutcome {
        let cfg = minify_html::Cfg {
            keep_closing_tags: options.keep_closing_tags,
            keep_comments: options.keep_comments,
            keep_html_and_head_opening_tags: options.keep_html_and_head_opening_tags,
            minify_css: options.minify_css,
            minify_js: options.minify_js,
            ..minify_html::Cfg::default()
        };

        let result = minify_html::minify(text.as_bytes(), &cfg);
        match String::from_utf8(result) {
            Ok(code) => MinifyOutcome::success(code),
            Err(_) => MinifyOutcome::failure("minification produced invalid UTF-8"),
        }
    }

    fn minify_css(&self, text: &str, options: &CssMinifyOptions) -> MinifyOutcome {
        let warnings = Arc::new(RwLock::new(Vec::new()));
        let parser_options = ParserOptions {
            error_recovery: options.error_recovery,
            warnings: Some(Arc::clone(&warnings)),
            ..ParserOptions::default()
        };

        let mut stylesheet = match StyleSheet::parse(text, parser_options) {
            Ok(s) => s,
            Err(e) => return MinifyOutcome::failure(format!("failed to parse CSS: {e}")),
        };

        if options.minify
            && let Err(e) = stylesheet.minify(MinifyOptions::default())
        {
            return MinifyOutcome::failure(format!("failed to minify CSS: {e}"));
        }

        let printer_options = PrinterOptions {
            minify: options.minify,
            ..Default::default()
        };
        let mut outcome = match stylesheet.to_css(printer_options) {
            Ok(result) => MinifyOutcome::success(result.code),
            Err(e) => MinifyOutcome::failure(format!("failed to serialize CSS: {e}")),
        };

        outcome.warnings = match warnings.read() {
            Ok(collected) => collected.iter().map(|w| w.to_string()).collect(),
            Err(_) => vec!["CSS warning sink was poisoned".to_string()],
        };
        outcome
    }
}
