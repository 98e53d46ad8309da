//! Rewrite engine
//!
//! Applies a file's edits against the original text in one pass and records a
//! source map from the rewritten text back to the original.

use sourcemap::{SourceMap, SourceMapBuilder};

/// Replace `start..end` of the original buffer with `replacement`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub replacement: String,
}

impl Edit {
    pub fn new(start: usize, end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start,
            end,
            replacement: replacement.into(),
        }
    }
}

/// Result of applying a file's edits
#[derive(Debug)]
pub enum RewriteOutcome {
    /// Nothing to apply; the original text stands
    Unchanged,
    Rewritten { code: String, map: SourceMap },
}

/// Apply `edits` to `source`.
///
/// Edits must be disjoint. Mappings are emitted at the start of every edit,
/// at the start of every untouched run, and at each line start inside an
/// untouched run. Columns are UTF-16 code units.
pub fn apply_edits(source: &str, file_id: &str, mut edits: Vec<Edit>) -> RewriteOutcome {
    if edits.is_empty() {
        return RewriteOutcome::Unchanged;
    }

    edits.sort_by_key(|edit| edit.start);
    debug_assert!(
        edits.windows(2).all(|pair| pair[0].end <= pair[1].start),
        "overlapping edits"
    );
    debug_assert!(edits.iter().all(|edit| edit.start <= edit.end && edit.end <= source.len()));

    let lines = LineIndex::new(source);
    let mut builder = SourceMapBuilder::new(None);
    let src_id = builder.add_source(file_id.into());
    builder.set_source_contents(src_id, Some(source.into()));

    let mut out = Output::with_capacity(source.len());
    let mut cursor = 0;
    for edit in &edits {
        out.copy_unchanged(&source[cursor..edit.start], cursor, &lines, &mut builder, src_id);
        out.map_here(edit.start, &lines, &mut builder, src_id);
        out.push(&edit.replacement);
        cursor = edit.end;
    }
    out.copy_unchanged(&source[cursor..], cursor, &lines, &mut builder, src_id);

    RewriteOutcome::Rewritten {
        code: out.code,
        map: builder.into_sourcemap(),
    }
}

/// Line starts of the original buffer
struct LineIndex<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { source, starts }
    }

    /// (line, UTF-16 column) of a byte offset
    fn position(&self, offset: usize) -> (u32, u32) {
        let line = self.starts.partition_point(|&start| start <= offset) - 1;
        let column = self.source[self.starts[line]..offset].encode_utf16().count();
        (line as u32, column as u32)
    }
}

/// Rewritten text plus its current line/column
struct Output {
    code: String,
    line: u32,
    column: u32,
}

impl Output {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            code: String::with_capacity(capacity),
            line: 0,
            column: 0,
        }
    }

    fn push(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += c.len_utf16() as u32;
            }
        }
        self.code.push_str(text);
    }

    /// Map the current output position to `offset` in the original
    fn map_here(
        &self,
        offset: usize,
        lines: &LineIndex<'_>,
        builder: &mut SourceMapBuilder,
        src_id: u32,
    ) {
        let (src_line, src_col) = lines.position(offset);
        builder.add_raw(
            self.line,
            self.column,
            src_line,
            src_col,
            Some(src_id),
            None,
            false,
        );
    }

    /// Copy an untouched run starting at original `offset`
    fn copy_unchanged(
        &mut self,
        text: &str,
        offset: usize,
        lines: &LineIndex<'_>,
        builder: &mut SourceMapBuilder,
        src_id: u32,
    ) {
        if text.is_empty() {
            return;
        }
        let mut line_offset = offset;
        for line in text.split_inclusive('\n') {
            self.map_here(line_offset, lines, builder, src_id);
            self.push(line);
            line_offset += line.len();
        }
    }
}
