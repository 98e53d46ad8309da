//! Placeholder encoding
//!
//! Interpolations are swapped for `__LIT_EXPRESSION_<i>__` tokens before the
//! markup reaches a minifier, and swapped back afterwards. The tokens are plain
//! identifier characters, so neither HTML nor CSS minifiers split or drop them;
//! the prefix is rare enough that it does not show up in real markup. That is
//! an assumption, so a segment that already contains the prefix is refused.

use crate::decompose::TemplateNode;
use crate::transform::SkipReason;

pub const PLACEHOLDER_PREFIX: &str = "__LIT_EXPRESSION_";
pub const PLACEHOLDER_SUFFIX: &str = "__";

/// Token standing in for interpolation `index`
pub fn placeholder(index: usize) -> String {
    format!("{PLACEHOLDER_PREFIX}{index}{PLACEHOLDER_SUFFIX}")
}

/// Original source text of each interpolation, by index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMap {
    expressions: Vec<String>,
}

impl PlaceholderMap {
    /// Capture the interpolation texts of `node` from `source`.
    pub fn capture(source: &str, node: &TemplateNode) -> Result<Self, SkipReason> {
        let expressions = (0..node.interpolations.len())
            .map(|index| {
                node.interpolation_source(source, index)
                    .map(str::to_string)
                    .ok_or(SkipReason::SpanUnresolved { index: Some(index) })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { expressions })
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.expressions.get(index).map(String::as_str)
    }

    /// Interleave the cooked segments of `node` with placeholder tokens.
    pub fn encode(&self, node: &TemplateNode) -> Result<String, SkipReason> {
        debug_assert_eq!(node.cooked.len(), self.expressions.len() + 1);

        let mut text = String::new();
        for (index, segment) in node.cooked.iter().enumerate() {
            if segment.contains(PLACEHOLDER_PREFIX) {
                return Err(SkipReason::PlaceholderCollision { segment: index });
            }
            if index > 0 {
                text.push_str(&placeholder(index - 1));
            }
            text.push_str(segment);
        }
        Ok(text)
    }

    /// Turn minifier output back into template literal body syntax.
    ///
    /// Literal text is escaped for a template literal; each token must occur
    /// exactly once and is replaced with `${<original source>}`. Tokens are
    /// located before any substitution happens.
    pub fn decode(&self, minified: &str) -> Result<String, SkipReason> {
        let escaped = escape_template_text(minified);

        let mut hits: Vec<(usize, usize, usize)> = Vec::with_capacity(self.expressions.len());
        for index in 0..self.expressions.len() {
            let token = placeholder(index);
            let mut found = escaped.match_indices(token.as_str());
            let Some((start, _)) = found.next() else {
                return Err(SkipReason::PlaceholderMissing { index });
            };
            if found.next().is_some() {
                return Err(SkipReason::PlaceholderDuplicated { index });
            }
            hits.push((start, start + token.len(), index));
        }
        hits.sort_unstable();

        let mut out = String::with_capacity(escaped.len());
        let mut cursor = 0;
        for (start, end, index) in hits {
            out.push_str(&escaped[cursor..start]);
            out.push_str("${");
            out.push_str(&self.expressions[index]);
            out.push('}');
            cursor = end;
        }
        out.push_str(&escaped[cursor..]);
        Ok(out)
    }
}

/// Escape text so it reads back as the same string inside a template literal.
///
/// A raw CR in a template reads back as LF, so it is written as `\r`. The
/// Unicode line and paragraph separators are escaped too, leaving `\n` as the
/// only line terminator the rewritten text can contain.
fn escape_template_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::MarkupKind;

    /// Build a node over `source` with the given segments and interpolation texts
    fn node_for(source: &str, segments: &[&str], exprs: &[&str]) -> TemplateNode {
        let interpolations = exprs
            .iter()
            .map(|expr| {
                let start = source.find(expr).expect("expression present in source");
                start..start + expr.len()
            })
            .collect();
        TemplateNode {
            span: 0..source.len(),
            kind: MarkupKind::Html,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            cooked: segments.iter().map(|s| s.to_string()).collect(),
            interpolations,
        }
    }

    #[test]
    fn test_encode_interleaves_tokens() {
        let source = "`<div>${x}</div>`";
        let node = node_for(source, &["<div>", "</div>"], &["x"]);
        let map = PlaceholderMap::capture(source, &node).unwrap();

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(0), Some("x"));
        assert_eq!(map.encode(&node).unwrap(), "<div>__LIT_EXPRESSION_0__</div>");
    }

    #[test]
    fn test_decode_restores_exact_source() {
        let source = "`<p class=\"${ cls ?? 'a' }\">${items.map((i) => i * 2)}</p>`";
        let node = node_for(
            source,
            &["<p class=\"", "\">", "</p>"],
            &["cls ?? 'a'", "items.map((i) => i * 2)"],
        );
        let map = PlaceholderMap::capture(source, &node).unwrap();

        let decoded = map
            .decode("<p class=__LIT_EXPRESSION_0__>__LIT_EXPRESSION_1__</p>")
            .unwrap();
        assert_eq!(decoded, "<p class=${cls ?? 'a'}>${items.map((i) => i * 2)}</p>");
    }

    #[test]
    fn test_decode_follows_minified_order() {
        let source = "`${a}${b}`";
        let node = node_for(source, &["", "", ""], &["a", "b"]);
        let map = PlaceholderMap::capture(source, &node).unwrap();

        let decoded = map.decode("__LIT_EXPRESSION_1__ __LIT_EXPRESSION_0__").unwrap();
        assert_eq!(decoded, "${b} ${a}");
    }

    #[test]
    fn test_token_prefixes_do_not_collide() {
        let exprs: Vec<String> = (0..12).map(|i| format!("e{i}")).collect();
        let source = exprs.join(" ");
        let expr_refs: Vec<&str> = exprs.iter().map(String::as_str).collect();
        let segments = vec![""; 13];
        let node = node_for(&source, &segments, &expr_refs);
        let map = PlaceholderMap::capture(&source, &node).unwrap();

        let encoded = map.encode(&node).unwrap();
        let decoded = map.decode(&encoded).unwrap();
        let expected: String = exprs.iter().map(|e| format!("${{{e}}}")).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_expression_text_is_not_rescanned() {
        let source = "`${'__LIT_EXPRESSION_1__'}${b}`";
        let node = node_for(source, &["", "", ""], &["'__LIT_EXPRESSION_1__'", "b"]);
        let map = PlaceholderMap::capture(source, &node).unwrap();

        let decoded = map.decode("__LIT_EXPRESSION_0____LIT_EXPRESSION_1__").unwrap();
        assert_eq!(decoded, "${'__LIT_EXPRESSION_1__'}${b}");
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let source = "`<p>${x}</p>`";
        let node = node_for(source, &["<p>", "</p>"], &["x"]);
        let map = PlaceholderMap::capture(source, &node).unwrap();

        assert_eq!(
            map.decode("<p></p>"),
            Err(SkipReason::PlaceholderMissing { index: 0 })
        );
    }

    #[test]
    fn test_duplicated_token_is_an_error() {
        let source = "`<p>${x}</p>`";
        let node = node_for(source, &["<p>", "</p>"], &["x"]);
        let map = PlaceholderMap::capture(source, &node).unwrap();

        assert_eq!(
            map.decode("__LIT_EXPRESSION_0__<p>__LIT_EXPRESSION_0__</p>"),
            Err(SkipReason::PlaceholderDuplicated { index: 0 })
        );
    }

    #[test]
    fn test_collision_with_existing_prefix() {
        let source = "`__LIT_EXPRESSION_9__`";
        let node = node_for(source, &["__LIT_EXPRESSION_9__"], &[]);
        let map = PlaceholderMap::capture(source, &node).unwrap();

        assert_eq!(
            map.encode(&node),
            Err(SkipReason::PlaceholderCollision { segment: 0 })
        );
    }

    #[test]
    fn test_literal_text_is_escaped() {
        let map = PlaceholderMap {
            expressions: Vec::new(),
        };
        assert_eq!(map.decode(r"a\b").unwrap(), r"a\\b");
        assert_eq!(map.decode("a`b").unwrap(), r"a\`b");
        assert_eq!(map.decode("${x}").unwrap(), r"\${x}");
        assert_eq!(map.decode("$ {x} $").unwrap(), "$ {x} $");
    }

    #[test]
    fn test_line_terminators_are_escaped() {
        let map = PlaceholderMap {
            expressions: Vec::new(),
        };
        assert_eq!(map.decode("a\rb").unwrap(), r"a\rb");
        assert_eq!(map.decode("a\r\nb").unwrap(), "a\\r\nb");
        assert_eq!(map.decode("a\u{2028}b\u{2029}c").unwrap(), r"a\u2028b\u2029c");
        assert_eq!(map.decode("a\nb").unwrap(), "a\nb");
    }

    #[test]
    fn test_escaped_carriage_return_survives_round_trip() {
        let source = "`<pre>a\\rb${x}</pre>`";
        let mut node = node_for(source, &["<pre>a\\rb", "</pre>"], &["x"]);
        node.cooked = vec!["<pre>a\rb".to_string(), "</pre>".to_string()];
        let map = PlaceholderMap::capture(source, &node).unwrap();

        let encoded = map.encode(&node).unwrap();
        assert_eq!(encoded, "<pre>a\rb__LIT_EXPRESSION_0__</pre>");
        assert_eq!(map.decode(&encoded).unwrap(), r"<pre>a\rb${x}</pre>");
    }
}
