//! Canonical, backend-independent result types

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::command::error::ApplyError;

/// Cursor position: 1-based line, 1-based byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// True when both coordinates are 1-based (non-zero)
    pub fn is_valid(&self) -> bool {
        self.line >= 1 && self.column >= 1
    }
}

/// Span within one file. `end` is never before `start`; `start == end` is an insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Returns `None` when `end` precedes `start`.
    pub fn new(start: Position, end: Position) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub const fn point(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Both ends 1-based and not inverted. Deserialized ranges skip `new`, so check them here.
    pub fn is_valid(&self) -> bool {
        self.start.is_valid() && self.end.is_valid() && self.start <= self.end
    }
}

/// Navigable point in a file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filepath: PathBuf,
    #[serde(flatten)]
    pub position: Position,
}

impl Location {
    pub fn new(filepath: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            filepath: filepath.into(),
            position: Position::new(line, column),
        }
    }
}

/// Replace the text covered by `range` in `filepath` with `replacement_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditChunk {
    pub replacement_text: String,
    pub filepath: PathBuf,
    pub range: Range,
}

impl EditChunk {
    pub fn new(replacement_text: impl Into<String>, filepath: impl Into<PathBuf>, range: Range) -> Self {
        Self {
            replacement_text: replacement_text.into(),
            filepath: filepath.into(),
            range,
        }
    }
}

/// One applicable fix or transformation, possibly spanning several files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixIt {
    /// Human readable description (empty for rename and format)
    pub text: String,
    /// Backend supplied kind, e.g. "quickfix" or "refactor.rewrite"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Where the fix was requested
    pub location: Location,
    pub chunks: Vec<EditChunk>,
}

impl FixIt {
    pub fn new(text: impl Into<String>, location: Location, chunks: Vec<EditChunk>) -> Self {
        Self {
            text: text.into(),
            kind: None,
            location,
            chunks,
        }
    }

    pub fn with_kind(mut self, kind: Option<String>) -> Self {
        self.kind = kind;
        self
    }

    /// Chunks grouped by file, files in order of first appearance.
    pub fn chunks_by_file(&self) -> IndexMap<&Path, Vec<&EditChunk>> {
        let mut groups: IndexMap<&Path, Vec<&EditChunk>> = IndexMap::new();
        for chunk in &self.chunks {
            groups.entry(chunk.filepath.as_path()).or_default().push(chunk);
        }
        groups
    }

    /// Applies the chunks targeting `filepath` to `text`, the buffer they were computed against.
    pub fn apply_to(&self, filepath: &Path, text: &str) -> Result<String, ApplyError> {
        let line_starts = line_starts(text);

        let mut spans = Vec::new();
        for chunk in self.chunks.iter().filter(|c| c.filepath == filepath) {
            let start = byte_offset(text, &line_starts, chunk.range.start)?;
            let end = byte_offset(text, &line_starts, chunk.range.end)?;
            spans.push((start, end, chunk.replacement_text.as_str()));
        }
        spans.sort_by_key(|(start, end, _)| (*start, *end));

        let mut output = String::with_capacity(text.len());
        let mut cursor = 0;
        for (start, end, replacement) in spans {
            if start < cursor {
                return Err(ApplyError::Overlap(filepath.to_path_buf()));
            }
            output.push_str(&text[cursor..start]);
            output.push_str(replacement);
            cursor = end;
        }
        output.push_str(&text[cursor..]);

        Ok(output)
    }
}

fn line_starts(text: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

fn byte_offset(text: &str, line_starts: &[usize], position: Position) -> Result<usize, ApplyError> {
    let out_of_bounds = || ApplyError::OutOfBounds(position);

    if !position.is_valid() {
        return Err(out_of_bounds());
    }
    let line = position.line as usize - 1;
    let line_start = *line_starts.get(line).ok_or_else(out_of_bounds)?;
    // the newline itself is addressable, anything after it belongs to the next line
    let line_end = line_starts
        .get(line + 1)
        .map_or(text.len(), |next| next - 1);
    let offset = line_start + position.column as usize - 1;

    if offset > line_end || !text.is_char_boundary(offset) {
        return Err(out_of_bounds());
    }
    Ok(offset)
}
