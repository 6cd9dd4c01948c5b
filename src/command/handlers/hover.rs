use tower_lsp::lsp_types::{Hover, HoverParams};

use crate::command::classify;
use crate::command::context::{CommandContext, work_done};
use crate::command::error::CommandError;
use crate::command::response::CommandResponse;
use crate::command::translate::{documentation, hover_text, type_signature};

async fn hover(cx: &mut CommandContext<'_>) -> Result<Option<String>, CommandError> {
    let params = HoverParams {
        text_document_position_params: cx.position_params()?,
        work_done_progress_params: work_done(),
    };
    let hover: Option<Hover> = cx.send("textDocument/hover", params).await?;
    Ok(hover.and_then(|hover| hover_text(&hover.contents)))
}

pub async fn get_doc(cx: &mut CommandContext<'_>) -> Result<CommandResponse, CommandError> {
    let text = hover(cx).await?;
    classify::documentation(text.as_deref().and_then(documentation))
}

pub async fn get_type(cx: &mut CommandContext<'_>) -> Result<CommandResponse, CommandError> {
    let text = hover(cx).await?;
    classify::type_info(text.as_deref().and_then(type_signature))
}
