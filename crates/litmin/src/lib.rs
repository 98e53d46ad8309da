//! # litmin
//!
//! Shrinks HTML and CSS embedded in tagged template literals.
//!
//! litmin parses a JavaScript/TypeScript module, finds templates tagged with
//! `html`, `css` (or their `lit.`-namespaced and `unsafe*` variants), minifies
//! the markup with every `${...}` interpolation swapped for an inert
//! placeholder, and splices the result back into the original text. Everything
//! outside the rewritten templates is kept byte-for-byte.
//!
//! ## Example
//!
//! ```text
//! use litmin::{ResolvedOptions, Transformer};
//!
//! let transformer = Transformer::new(ResolvedOptions::default_options()?);
//! match transformer.transform("const t = html`<p>  hi  </p>`;", "src/app.ts") {
//!     Some(out) => println!("{}", out.code),
//!     None => println!("unchanged"),
//! }
//! ```
//!
//! A node that cannot be minified safely is left as written; a file that does
//! not parse is returned unmodified. The transform never fails past its own
//! boundary.

mod decompose;
mod filter;
mod minifier;
mod options;
mod placeholder;
mod rewrite;
mod tag;
mod transform;

pub use decompose::{TemplateNode, decompose};
pub use filter::FileFilter;
pub use minifier::{BuiltinMinifier, Minifier, MinifyOutcome};
pub use options::{
    CONFIG_DIR, CONFIG_FILE, CssMinifyOptions, HtmlMinifyOptions, Patterns, ResolvedOptions,
    UserOptions, load_options_file, merge_options,
};
pub use placeholder::{PLACEHOLDER_PREFIX, PLACEHOLDER_SUFFIX, PlaceholderMap, placeholder};
pub use rewrite::{Edit, RewriteOutcome, apply_edits};
pub use tag::{LIT_NAMESPACE, MarkupKind, TagAlias, classify_tag};
pub use transform::{SkipReason, TransformOutput, Transformer};

/// Error type for litmin operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source file could not be parsed
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    /// A glob pattern in the include/exclude lists is malformed
    #[error("invalid glob pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The options tree does not deserialize into the option records
    #[error("invalid options: {0}")]
    Options(#[from] serde_yaml::Error),

    /// I/O error while reading a configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source map could not be serialized
    #[error("invalid source map: {0}")]
    SourceMap(#[from] sourcemap::Error),

    /// The serialized source map is not UTF-8
    #[error("source map is not valid UTF-8: {0}")]
    SourceMapEncoding(#[from] std::string::FromUtf8Error),
}

/// Result type alias for litmin operations.
pub type Result<T> = std::result::Result<T, Error>;
