//! Backend payloads to canonical types
//!
//! Backend positions are 0-based lines and UTF-16 code units; canonical
//! positions are 1-based lines and 1-based byte columns. Converting needs the
//! text of the line, taken from the request buffer for the requested file and
//! from disk for any other file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tower_lsp::lsp_types::{
    self as lsp, DocumentChangeOperation, DocumentChanges, DocumentSymbol, DocumentSymbolResponse,
    GotoDefinitionResponse, HoverContents, MarkedString, OneOf, TextEdit, Url, WorkspaceEdit,
    WorkspaceSymbolResponse,
};
use tracing::debug;

use crate::command::error::CommandError;
use crate::command::types::{EditChunk, Location, Position, Range};

static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:---|___)[ \t]*$").expect("separator pattern"));

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)\n```").expect("fenced block pattern"));

pub struct ResponseTranslator {
    files: HashMap<PathBuf, Option<Vec<String>>>,
}

impl ResponseTranslator {
    /// Seeds the translator with the buffer the request was issued against.
    pub fn new(filepath: &Path, contents: &str) -> Self {
        let mut files = HashMap::new();
        files.insert(filepath.to_path_buf(), Some(split_lines(contents)));
        Self { files }
    }

    pub fn to_lsp_position(&mut self, filepath: &Path, position: Position) -> lsp::Position {
        let line = position.line.saturating_sub(1);
        let byte = position.column.saturating_sub(1) as usize;

        let character = match self.line_text(filepath, line) {
            Some(text) => utf16_len(prefix_up_to(text, byte)) + byte.saturating_sub(text.len()) as u32,
            None => byte as u32,
        };

        lsp::Position::new(line, character)
    }

    pub fn to_lsp_range(&mut self, filepath: &Path, range: Range) -> lsp::Range {
        lsp::Range::new(
            self.to_lsp_position(filepath, range.start),
            self.to_lsp_position(filepath, range.end),
        )
    }

    pub fn position(&mut self, filepath: &Path, position: lsp::Position) -> Position {
        let character = position.character as usize;

        let byte = match self.line_text(filepath, position.line) {
            Some(text) => byte_index_of_utf16(text, character),
            None => character,
        };

        Position::new(position.line + 1, byte as u32 + 1)
    }

    pub fn range(&mut self, filepath: &Path, range: lsp::Range) -> Result<Range, CommandError> {
        let start = self.position(filepath, range.start);
        let end = self.position(filepath, range.end);
        Range::new(start, end).ok_or_else(|| {
            CommandError::InvalidResponse(format!("range ends before it starts: {:?}", range))
        })
    }

    pub fn location(&mut self, location: &lsp::Location) -> Result<Location, CommandError> {
        let filepath = uri_to_path(&location.uri)?;
        let position = self.position(&filepath, location.range.start);
        Ok(Location { filepath, position })
    }

    pub fn locations(&mut self, locations: &[lsp::Location]) -> Result<Vec<Location>, CommandError> {
        locations.iter().map(|l| self.location(l)).collect()
    }

    /// Definition, declaration, implementation and type-definition replies
    pub fn goto_response(
        &mut self,
        response: Option<GotoDefinitionResponse>,
    ) -> Result<Vec<Location>, CommandError> {
        match response {
            None => Ok(Vec::new()),
            Some(GotoDefinitionResponse::Scalar(location)) => Ok(vec![self.location(&location)?]),
            Some(GotoDefinitionResponse::Array(locations)) => self.locations(&locations),
            Some(GotoDefinitionResponse::Link(links)) => links
                .iter()
                .map(|link| {
                    self.location(&lsp::Location::new(
                        link.target_uri.clone(),
                        link.target_selection_range,
                    ))
                })
                .collect(),
        }
    }

    /// Flattens a document outline depth-first.
    pub fn document_symbols(
        &mut self,
        filepath: &Path,
        response: Option<DocumentSymbolResponse>,
    ) -> Result<Vec<Location>, CommandError> {
        match response {
            None => Ok(Vec::new()),
            Some(DocumentSymbolResponse::Flat(symbols)) => symbols
                .iter()
                .map(|symbol| self.location(&symbol.location))
                .collect(),
            Some(DocumentSymbolResponse::Nested(symbols)) => {
                let mut locations = Vec::new();
                self.flatten_symbols(filepath, &symbols, &mut locations);
                Ok(locations)
            }
        }
    }

    fn flatten_symbols(
        &mut self,
        filepath: &Path,
        symbols: &[DocumentSymbol],
        locations: &mut Vec<Location>,
    ) {
        for symbol in symbols {
            let position = self.position(filepath, symbol.selection_range.start);
            locations.push(Location {
                filepath: filepath.to_path_buf(),
                position,
            });
            if let Some(children) = &symbol.children {
                self.flatten_symbols(filepath, children, locations);
            }
        }
    }

    pub fn workspace_symbols(
        &mut self,
        response: Option<WorkspaceSymbolResponse>,
    ) -> Result<Vec<Location>, CommandError> {
        match response {
            None => Ok(Vec::new()),
            Some(WorkspaceSymbolResponse::Flat(symbols)) => symbols
                .iter()
                .map(|symbol| self.location(&symbol.location))
                .collect(),
            Some(WorkspaceSymbolResponse::Nested(symbols)) => symbols
                .iter()
                .map(|symbol| match &symbol.location {
                    OneOf::Left(location) => self.location(location),
                    OneOf::Right(location) => {
                        Ok(Location::new(uri_to_path(&location.uri)?, 1, 1))
                    }
                })
                .collect(),
        }
    }

    /// Translates edits 1:1, keeping the backend's order.
    pub fn text_edits(
        &mut self,
        filepath: &Path,
        edits: &[TextEdit],
    ) -> Result<Vec<EditChunk>, CommandError> {
        edits
            .iter()
            .map(|edit| {
                Ok(EditChunk::new(
                    edit.new_text.clone(),
                    filepath,
                    self.range(filepath, edit.range)?,
                ))
            })
            .collect()
    }

    /// Collects every text edit of a workspace edit, ordered by file then by range start.
    pub fn workspace_edit(&mut self, edit: &WorkspaceEdit) -> Result<Vec<EditChunk>, CommandError> {
        let mut per_file: Vec<(Url, Vec<TextEdit>)> = Vec::new();

        if let Some(document_changes) = &edit.document_changes {
            let documents: Vec<&lsp::TextDocumentEdit> = match document_changes {
                DocumentChanges::Edits(edits) => edits.iter().collect(),
                DocumentChanges::Operations(operations) => operations
                    .iter()
                    .filter_map(|operation| match operation {
                        DocumentChangeOperation::Edit(edit) => Some(edit),
                        DocumentChangeOperation::Op(op) => {
                            debug!("Ignoring resource operation {:?}", op);
                            None
                        }
                    })
                    .collect(),
            };

            for document in documents {
                let edits = document
                    .edits
                    .iter()
                    .map(|edit| match edit {
                        OneOf::Left(edit) => edit.clone(),
                        OneOf::Right(annotated) => annotated.text_edit.clone(),
                    })
                    .collect();
                per_file.push((document.text_document.uri.clone(), edits));
            }
        } else if let Some(changes) = &edit.changes {
            per_file.extend(changes.iter().map(|(uri, edits)| (uri.clone(), edits.clone())));
        }

        let mut chunks = Vec::new();
        for (uri, edits) in per_file {
            let filepath = uri_to_path(&uri)?;
            chunks.extend(self.text_edits(&filepath, &edits)?);
        }

        chunks.sort_by(|a, b| {
            a.filepath
                .cmp(&b.filepath)
                .then(a.range.start.cmp(&b.range.start))
        });
        Ok(chunks)
    }

    fn line_text(&mut self, filepath: &Path, line: u32) -> Option<&str> {
        let lines = self
            .files
            .entry(filepath.to_path_buf())
            .or_insert_with(|| read_lines(filepath))
            .as_ref()?;
        lines.get(line as usize).map(String::as_str)
    }
}

/// Plain text of a hover reply; `None` when the backend supplied nothing.
pub fn hover_text(contents: &HoverContents) -> Option<String> {
    let text = match contents {
        HoverContents::Markup(markup) => markup.value.clone(),
        HoverContents::Scalar(marked) => marked_string(marked),
        HoverContents::Array(items) => items
            .iter()
            .map(marked_string)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    (!text.trim().is_empty()).then_some(text)
}

fn marked_string(marked: &MarkedString) -> String {
    match marked {
        MarkedString::String(text) => text.clone(),
        MarkedString::LanguageString(block) => {
            format!("```{}\n{}\n```", block.language, block.value)
        }
    }
}

/// Documentation view of hover text: fence and blank lines dropped, separator kept.
pub fn documentation(hover: &str) -> Option<String> {
    let text = hover
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Type view of hover text: the last fenced block ahead of the separator.
pub fn type_signature(hover: &str) -> Option<String> {
    let head = SEPARATOR
        .find(hover)
        .map(|separator| &hover[..separator.start()])
        .unwrap_or(hover);

    let signature = match FENCED_BLOCK.captures_iter(head).last() {
        Some(block) => block[1].trim().to_string(),
        None => head
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string(),
    };
    (!signature.is_empty()).then_some(signature)
}

pub fn uri_to_path(uri: &Url) -> Result<PathBuf, CommandError> {
    uri.to_file_path()
        .map_err(|_| CommandError::InvalidResponse(format!("not a file URI: {}", uri)))
}

pub fn path_to_uri(filepath: &Path) -> Result<Url, CommandError> {
    Url::from_file_path(filepath).map_err(|_| {
        CommandError::InvalidRequest(format!("filepath must be absolute: {:?}", filepath))
    })
}

fn split_lines(contents: &str) -> Vec<String> {
    contents.lines().map(str::to_string).collect()
}

fn read_lines(filepath: &Path) -> Option<Vec<String>> {
    match std::fs::read_to_string(filepath) {
        Ok(contents) => Some(split_lines(&contents)),
        Err(e) => {
            debug!("Cannot read {:?} for position conversion: {}", filepath, e);
            None
        }
    }
}

fn prefix_up_to(text: &str, byte: usize) -> &str {
    let mut end = byte.min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

fn byte_index_of_utf16(text: &str, character: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if units >= character {
            return index;
        }
        units += ch.len_utf16();
    }
    // past the end of the line means the end of the line
    text.len()
}
