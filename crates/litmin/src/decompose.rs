//! Template decomposition
//!
//! Splits a template literal into its literal segments and the source spans of
//! its interpolations.

use std::ops::Range;

use oxc::ast::ast::TemplateLiteral;
use oxc::span::GetSpan;

use crate::tag::MarkupKind;
use crate::transform::SkipReason;

/// A markup-bearing template literal, ready for minification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateNode {
    /// Byte range of the literal in the original buffer, backticks included
    pub span: Range<usize>,
    /// Markup carried by the literal
    pub kind: MarkupKind,
    /// Literal segments as written in source
    pub segments: Vec<String>,
    /// Literal segments with escapes resolved
    pub cooked: Vec<String>,
    /// Byte ranges of the interpolated expressions in the original buffer
    pub interpolations: Vec<Range<usize>>,
}

impl TemplateNode {
    /// Original text of interpolation `index`
    pub fn interpolation_source<'s>(&self, source: &'s str, index: usize) -> Option<&'s str> {
        self.interpolations
            .get(index)
            .and_then(|range| source.get(range.clone()))
    }
}

/// Decompose `literal` into segments and interpolation spans.
///
/// Every interpolation span must resolve to text inside the literal's own
/// span; otherwise the whole node is skipped.
pub fn decompose(
    source: &str,
    kind: MarkupKind,
    literal: &TemplateLiteral<'_>,
) -> Result<TemplateNode, SkipReason> {
    let span = literal.span.start as usize..literal.span.end as usize;
    if source.get(span.clone()).is_none() {
        return Err(SkipReason::SpanUnresolved { index: None });
    }

    if literal.quasis.len() != literal.expressions.len() + 1 {
        return Err(SkipReason::Malformed {
            segments: literal.quasis.len(),
            interpolations: literal.expressions.len(),
        });
    }

    let mut segments = Vec::with_capacity(literal.quasis.len());
    let mut cooked = Vec::with_capacity(literal.quasis.len());
    for (index, quasi) in literal.quasis.iter().enumerate() {
        segments.push(quasi.value.raw.as_str().to_string());
        match &quasi.value.cooked {
            Some(value) => cooked.push(value.as_str().to_string()),
            None => return Err(SkipReason::InvalidEscape { segment: index }),
        }
    }

    let mut interpolations = Vec::with_capacity(literal.expressions.len());
    for (index, expr) in literal.expressions.iter().enumerate() {
        let expr_span = expr.span();
        let range = expr_span.start as usize..expr_span.end as usize;
        let resolved = !range.is_empty()
            && range.start > span.start
            && range.end < span.end
            && source.get(range.clone()).is_some();
        if !resolved {
            return Err(SkipReason::SpanUnresolved { index: Some(index) });
        }
        interpolations.push(range);
    }

    debug_assert_eq!(segments.len(), interpolations.len() + 1);

    Ok(TemplateNode {
        span,
        kind,
        segments,
        cooked,
        interpolations,
    })
}
