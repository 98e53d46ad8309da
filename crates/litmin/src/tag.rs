//! Tag classification
//!
//! Maps the tag of a tagged template to the kind of markup it carries. The
//! accepted tags form a closed set: a bare alias (`html`) or the alias read off
//! the `lit` namespace (`lit.html`). Everything else is left alone.

use oxc::ast::ast::Expression;

/// Namespace identifier accepted as the base of a member-access tag
pub const LIT_NAMESPACE: &str = "lit";

/// Kind of markup carried by a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupKind {
    Html,
    Css,
}

impl MarkupKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkupKind::Html => "html",
            MarkupKind::Css => "css",
        }
    }
}

impl std::fmt::Display for MarkupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every tag name recognized as markup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagAlias {
    /// `html`
    Html,
    /// `unsafeHTML`
    UnsafeHtml,
    /// `css`
    Css,
    /// `unsafeCSS`
    UnsafeCss,
}

impl TagAlias {
    pub const ALL: [TagAlias; 4] = [
        TagAlias::Html,
        TagAlias::UnsafeHtml,
        TagAlias::Css,
        TagAlias::UnsafeCss,
    ];

    /// Look up an alias by its identifier as written in source
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(TagAlias::Html),
            "unsafeHTML" => Some(TagAlias::UnsafeHtml),
            "css" => Some(TagAlias::Css),
            "unsafeCSS" => Some(TagAlias::UnsafeCss),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TagAlias::Html => "html",
            TagAlias::UnsafeHtml => "unsafeHTML",
            TagAlias::Css => "css",
            TagAlias::UnsafeCss => "unsafeCSS",
        }
    }

    pub fn kind(self) -> MarkupKind {
        match self {
            TagAlias::Html | TagAlias::UnsafeHtml => MarkupKind::Html,
            TagAlias::Css | TagAlias::UnsafeCss => MarkupKind::Css,
        }
    }
}

/// Classify a tag expression.
///
/// Accepts `alias` and `lit.alias`; computed access (`lit["html"]`), calls,
/// deeper member chains and every other shape yield `None`.
pub fn classify_tag(tag: &Expression<'_>) -> Option<MarkupKind> {
    let name = match tag {
        Expression::Identifier(ident) => ident.name.as_str(),
        Expression::StaticMemberExpression(member) => match &member.object {
            Expression::Identifier(base) if base.name.as_str() == LIT_NAMESPACE => {
                member.property.name.as_str()
            }
            _ => return None,
        },
        _ => return None,
    };

    TagAlias::from_name(name).map(TagAlias::kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc::allocator::Allocator;
    use oxc::ast::ast::Statement;
    use oxc::parser::Parser;
    use oxc::span::SourceType;

    /// Parse `<tag>`x`` and classify its tag
    fn classify_source(tag: &str) -> Option<MarkupKind> {
        let source = format!("{tag}`x`;");
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, &source, SourceType::mjs()).parse();
        assert!(ret.errors.is_empty(), "parse failed for {source}");

        let Some(Statement::ExpressionStatement(stmt)) = ret.program.body.first() else {
            panic!("expected an expression statement for {source}");
        };
        let Expression::TaggedTemplateExpression(tagged) = &stmt.expression else {
            panic!("expected a tagged template for {source}");
        };
        classify_tag(&tagged.tag)
    }

    #[test]
    fn test_every_alias_bare_and_namespaced() {
        for alias in TagAlias::ALL {
            let expected = Some(alias.kind());
            assert_eq!(classify_source(alias.name()), expected, "bare {}", alias.name());
            assert_eq!(
                classify_source(&format!("lit.{}", alias.name())),
                expected,
                "namespaced {}",
                alias.name()
            );
        }
    }

    #[test]
    fn test_alias_names_round_trip() {
        for alias in TagAlias::ALL {
            assert_eq!(TagAlias::from_name(alias.name()), Some(alias));
        }
        assert_eq!(TagAlias::from_name("HTML"), None);
        assert_eq!(TagAlias::from_name("svg"), None);
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert_eq!(classify_source("other"), None);
        assert_eq!(classify_source("String.raw"), None);
        assert_eq!(classify_source("foo.html"), None);
        assert_eq!(classify_source("lit.svg"), None);
        assert_eq!(classify_source("lit['html']"), None);
        assert_eq!(classify_source("a.lit.html"), None);
        assert_eq!(classify_source("html()"), None);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(classify_source("html"), Some(MarkupKind::Html));
        assert_eq!(classify_source("unsafeCSS"), Some(MarkupKind::Css));
        assert_eq!(MarkupKind::Css.to_string(), "css");
    }
}
