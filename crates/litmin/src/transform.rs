//! The transform hook
//!
//! For each file: parse, find markup-bearing tagged templates, minify each one
//! independently, splice the results back. A node either ends up rewritten or
//! untouched; a file either parses or is returned as-is.

use std::ops::Range;
use std::sync::Arc;

use oxc::allocator::Allocator;
use oxc::ast::ast::TaggedTemplateExpression;
use oxc::ast_visit::{Visit, walk};
use oxc::parser::Parser;
use oxc::span::SourceType;
use sourcemap::SourceMap;

use crate::decompose::{TemplateNode, decompose};
use crate::filter::normalize_id;
use crate::minifier::{BuiltinMinifier, Minifier};
use crate::options::ResolvedOptions;
use crate::placeholder::PlaceholderMap;
use crate::rewrite::{Edit, RewriteOutcome, apply_edits};
use crate::tag::{MarkupKind, classify_tag};
use crate::{Error, Result};

/// Why a single template was left as written
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("span of interpolation {index:?} could not be resolved")]
    SpanUnresolved { index: Option<usize> },

    #[error("template has {segments} segments for {interpolations} interpolations")]
    Malformed {
        segments: usize,
        interpolations: usize,
    },

    #[error("segment {segment} contains an invalid escape sequence")]
    InvalidEscape { segment: usize },

    #[error("segment {segment} already contains a placeholder token")]
    PlaceholderCollision { segment: usize },

    #[error("{kind} minifier reported: {}", problems.join("; "))]
    Minifier {
        kind: MarkupKind,
        problems: Vec<String>,
    },

    #[error("placeholder {index} is missing from the minified output")]
    PlaceholderMissing { index: usize },

    #[error("placeholder {index} occurs more than once in the minified output")]
    PlaceholderDuplicated { index: usize },
}

/// Rewritten file text and its source map
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub code: String,
    pub map: SourceMap,
}

impl TransformOutput {
    /// Serialize the source map as JSON
    pub fn map_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.map.to_writer(&mut buf)?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Runs the transform with one set of options.
///
/// Holds no per-file state, so one instance can serve many files at once.
pub struct Transformer {
    options: Arc<ResolvedOptions>,
    minifier: Box<dyn Minifier>,
}

impl Transformer {
    pub fn new(options: ResolvedOptions) -> Self {
        Self::with_minifier(Arc::new(options), BuiltinMinifier)
    }

    pub fn with_minifier(options: Arc<ResolvedOptions>, minifier: impl Minifier + 'static) -> Self {
        Self {
            options,
            minifier: Box::new(minifier),
        }
    }

    pub fn options(&self) -> &ResolvedOptions {
        &self.options
    }

    /// Transform `source`, identified by `file_id`.
    ///
    /// Returns `None` when the file is filtered out, fails to parse, or has
    /// nothing to minify. Parse failures are logged, never returned.
    pub fn transform(&self, source: &str, file_id: &str) -> Option<TransformOutput> {
        if !self.options.filter.matches(file_id) {
            tracing::trace!(file = file_id, "filtered out");
            return None;
        }

        match self.rewrite(source, file_id) {
            Ok(RewriteOutcome::Rewritten { code, map }) => Some(TransformOutput { code, map }),
            Ok(RewriteOutcome::Unchanged) => None,
            Err(e) => {
                tracing::error!(file = file_id, "{e}");
                None
            }
        }
    }

    /// Parse `source` and rewrite its markup templates, ignoring the file filter
    pub fn rewrite(&self, source: &str, file_id: &str) -> Result<RewriteOutcome> {
        let allocator = Allocator::default();
        let parser_result = Parser::new(&allocator, source, source_type(file_id)).parse();

        if parser_result.panicked || !parser_result.errors.is_empty() {
            let message = parser_result
                .errors
                .first()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "parser panicked".to_string());
            return Err(Error::Parse {
                file: file_id.to_string(),
                message,
            });
        }

        let mut collector = TemplateCollector {
            source,
            candidates: Vec::new(),
        };
        collector.visit_program(&parser_result.program);

        let candidates = collector.candidates.len();
        let mut edits = Vec::new();
        for (span, decomposed) in collector.candidates {
            match decomposed.and_then(|node| self.minify_node(source, &node)) {
                Ok(Some(edit)) => {
                    tracing::trace!(
                        file = file_id,
                        start = edit.start,
                        end = edit.end,
                        saved = (edit.end - edit.start) - edit.replacement.len(),
                        "minified template"
                    );
                    edits.push(edit);
                }
                Ok(None) => {}
                Err(reason) => {
                    tracing::debug!(
                        file = file_id,
                        start = span.start,
                        end = span.end,
                        %reason,
                        "skipping template"
                    );
                }
            }
        }

        tracing::debug!(file = file_id, candidates, rewritten = edits.len(), "transformed");
        Ok(apply_edits(source, file_id, edits))
    }

    /// Minify one decomposed template.
    ///
    /// `Ok(None)` means the result would not be any smaller than the original.
    pub fn minify_node(
        &self,
        source: &str,
        node: &TemplateNode,
    ) -> std::result::Result<Option<Edit>, SkipReason> {
        let placeholders = PlaceholderMap::capture(source, node)?;
        let text = placeholders.encode(node)?;
        let minified = self
            .minifier
            .minify(node.kind, &text, &self.options)
            .accept(node.kind)?;
        let body = placeholders.decode(&minified)?;

        let replacement = format!("`{body}`");
        if replacement.len() >= node.span.len() {
            return Ok(None);
        }
        Ok(Some(Edit::new(node.span.start, node.span.end, replacement)))
    }
}

/// Parser dialect for a file identifier; TypeScript when the extension is unknown
fn source_type(file_id: &str) -> SourceType {
    SourceType::from_path(normalize_id(file_id)).unwrap_or_else(|_| SourceType::ts())
}

/// Collects markup templates in source order.
///
/// Interpolations of a collected template are not descended into: they are
/// carried over verbatim, nested templates included.
struct TemplateCollector<'s> {
    source: &'s str,
    candidates: Vec<(Range<usize>, std::result::Result<TemplateNode, SkipReason>)>,
}

impl<'a> Visit<'a> for TemplateCollector<'_> {
    fn visit_tagged_template_expression(&mut self, it: &TaggedTemplateExpression<'a>) {
        match classify_tag(&it.tag) {
            Some(kind) => {
                let span = it.quasi.span.start as usize..it.quasi.span.end as usize;
                self.candidates
                    .push((span, decompose(self.source, kind, &it.quasi)));
            }
            None => walk::walk_tagged_template_expression(self, it),
        }
    }
}
