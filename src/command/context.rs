use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tower_lsp::lsp_types::{
    PartialResultParams, TextDocumentIdentifier, TextDocumentPositionParams,
    WorkDoneProgressParams,
};
use tracing::{debug, warn};

use crate::command::error::CommandError;
use crate::command::request::CommandRequest;
use crate::command::translate::{ResponseTranslator, path_to_uri};
use crate::command::types::Location;
use crate::lsp::backend::LanguageBackend;

/// Everything a handler needs for one request
pub struct CommandContext<'a> {
    pub backend: &'a dyn LanguageBackend,
    pub request: &'a CommandRequest,
    pub translator: ResponseTranslator,
    timeout: Duration,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        backend: &'a dyn LanguageBackend,
        request: &'a CommandRequest,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            request,
            translator: ResponseTranslator::new(&request.filepath, &request.buffer_text),
            timeout,
        }
    }

    /// One bounded backend round trip with typed params and result.
    pub async fn send<P, R>(&self, method: &str, params: P) -> Result<R, CommandError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let params = serde_json::to_value(params)
            .map_err(|e| CommandError::InvalidRequest(format!("{}: {}", method, e)))?;

        debug!("Requesting {} for {:?}", method, self.request.filepath);

        let value = tokio::time::timeout(self.timeout, self.backend.request(method, params))
            .await
            .map_err(|_| {
                warn!("{} timed out after {:?}", method, self.timeout);
                CommandError::Timeout {
                    method: method.to_string(),
                    timeout: self.timeout,
                }
            })??;

        serde_json::from_value(value)
            .map_err(|e| CommandError::InvalidResponse(format!("{}: {}", method, e)))
    }

    pub fn text_document(&self) -> Result<TextDocumentIdentifier, CommandError> {
        Ok(TextDocumentIdentifier::new(path_to_uri(
            &self.request.filepath,
        )?))
    }

    /// Document and cursor in backend coordinates
    pub fn position_params(&mut self) -> Result<TextDocumentPositionParams, CommandError> {
        let text_document = self.text_document()?;
        let position = self
            .translator
            .to_lsp_position(&self.request.filepath, self.request.cursor());
        Ok(TextDocumentPositionParams::new(text_document, position))
    }

    /// Location of the cursor, recorded on produced FixIts
    pub fn cursor_location(&self) -> Location {
        Location {
            filepath: self.request.filepath.clone(),
            position: self.request.cursor(),
        }
    }
}

pub fn work_done() -> WorkDoneProgressParams {
    WorkDoneProgressParams::default()
}

pub fn partial_result() -> PartialResultParams {
    PartialResultParams::default()
}
