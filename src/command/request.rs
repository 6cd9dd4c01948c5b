use std::path::PathBuf;

use serde::Deserialize;

use crate::command::types::{Position, Range};

/// Whole-buffer formatting preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    pub tab_size: u32,
    pub insert_spaces: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
        }
    }
}

/// One subcommand invocation as received from the editor
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: String,
    pub filepath: PathBuf,
    #[serde(default)]
    pub buffer_text: String,
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub range: Option<Range>,
    #[serde(default)]
    pub format_options: Option<FormatOptions>,
}

impl CommandRequest {
    pub fn new(
        command: &str,
        filepath: impl Into<PathBuf>,
        buffer_text: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            command: command.to_string(),
            filepath: filepath.into(),
            buffer_text: buffer_text.into(),
            line,
            column,
            arguments: Vec::new(),
            range: None,
            format_options: None,
        }
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_format_options(mut self, options: FormatOptions) -> Self {
        self.format_options = Some(options);
        self
    }

    pub fn cursor(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// All arguments joined by spaces, or `None` when there are none
    pub fn joined_arguments(&self) -> Option<String> {
        let joined = self.arguments.join(" ");
        let trimmed = joined.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}
