use tower_lsp::lsp_types::{RenameParams, WorkspaceEdit};

use crate::command::classify;
use crate::command::context::{CommandContext, work_done};
use crate::command::error::CommandError;
use crate::command::response::CommandResponse;
use crate::command::types::FixIt;

/// Workspace rename as one FixIt, chunks grouped by file then ordered by position.
pub async fn rename(
    cx: &mut CommandContext<'_>,
    new_name: &str,
) -> Result<CommandResponse, CommandError> {
    let params = RenameParams {
        text_document_position: cx.position_params()?,
        new_name: new_name.to_string(),
        work_done_progress_params: work_done(),
    };
    let edit: Option<WorkspaceEdit> = cx.send("textDocument/rename", params).await?;

    let fixit = match edit {
        Some(edit) => Some(FixIt::new(
            "",
            cx.cursor_location(),
            cx.translator.workspace_edit(&edit)?,
        )),
        None => None,
    };
    classify::rename(fixit)
}
