use tower_lsp::lsp_types::{
    CodeAction, CodeActionContext, CodeActionOrCommand, CodeActionParams, CodeActionResponse,
    CodeActionTriggerKind,
};
use tracing::debug;

use crate::command::classify;
use crate::command::context::{CommandContext, partial_result, work_done};
use crate::command::error::CommandError;
use crate::command::response::CommandResponse;
use crate::command::types::{FixIt, Range};

/// One FixIt per code action carrying an edit, resolving lazy actions first.
pub async fn fixits(cx: &mut CommandContext<'_>) -> Result<CommandResponse, CommandError> {
    let request = cx.request;
    let range = request
        .range
        .unwrap_or_else(|| Range::point(request.cursor()));

    let params = CodeActionParams {
        text_document: cx.text_document()?,
        range: cx.translator.to_lsp_range(&request.filepath, range),
        context: CodeActionContext {
            diagnostics: Vec::new(),
            only: None,
            trigger_kind: Some(CodeActionTriggerKind::INVOKED),
        },
        work_done_progress_params: work_done(),
        partial_result_params: partial_result(),
    };
    let actions: Option<CodeActionResponse> = cx.send("textDocument/codeAction", params).await?;

    let mut fixits = Vec::new();
    for action in actions.unwrap_or_default() {
        let action = match action {
            CodeActionOrCommand::CodeAction(action) => action,
            CodeActionOrCommand::Command(command) => {
                debug!("Skipping bare command {:?}", command.title);
                continue;
            }
        };
        if let Some(fixit) = to_fixit(cx, action).await? {
            fixits.push(fixit);
        }
    }

    Ok(classify::fixits(fixits))
}

async fn to_fixit(
    cx: &mut CommandContext<'_>,
    action: CodeAction,
) -> Result<Option<FixIt>, CommandError> {
    if let Some(disabled) = &action.disabled {
        debug!("Skipping disabled action {:?}: {}", action.title, disabled.reason);
        return Ok(None);
    }

    let action = if action.edit.is_some() {
        action
    } else {
        cx.send::<_, CodeAction>("codeAction/resolve", &action).await?
    };
    let Some(edit) = &action.edit else {
        debug!("Action {:?} carries no edit", action.title);
        return Ok(None);
    };

    let chunks = cx.translator.workspace_edit(edit)?;
    let kind = action.kind.as_ref().map(|kind| kind.as_str().to_string());
    Ok(Some(
        FixIt::new(action.title.clone(), cx.cursor_location(), chunks).with_kind(kind),
    ))
}
