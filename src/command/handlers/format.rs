use tower_lsp::lsp_types::{
    DocumentFormattingParams, DocumentRangeFormattingParams, FormattingOptions, TextEdit,
};

use crate::command::classify;
use crate::command::context::{CommandContext, work_done};
use crate::command::error::CommandError;
use crate::command::response::CommandResponse;
use crate::command::types::FixIt;

/// Whole-buffer or range formatting as a single FixIt. An empty edit list is a valid result.
pub async fn format(cx: &mut CommandContext<'_>) -> Result<CommandResponse, CommandError> {
    let request = cx.request;
    let preferences = request.format_options.unwrap_or_default();
    let options = FormattingOptions {
        tab_size: preferences.tab_size,
        insert_spaces: preferences.insert_spaces,
        ..Default::default()
    };
    let text_document = cx.text_document()?;

    let edits: Option<Vec<TextEdit>> = match request.range {
        Some(range) => {
            let params = DocumentRangeFormattingParams {
                text_document,
                range: cx.translator.to_lsp_range(&request.filepath, range),
                options,
                work_done_progress_params: work_done(),
            };
            cx.send("textDocument/rangeFormatting", params).await?
        }
        None => {
            let params = DocumentFormattingParams {
                text_document,
                options,
                work_done_progress_params: work_done(),
            };
            cx.send("textDocument/formatting", params).await?
        }
    };

    let chunks = cx
        .translator
        .text_edits(&request.filepath, &edits.unwrap_or_default())?;
    Ok(classify::fixits(vec![FixIt::new(
        "",
        cx.cursor_location(),
        chunks,
    )]))
}
