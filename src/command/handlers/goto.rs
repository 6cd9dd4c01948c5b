//! GoTo family: positional navigation, symbol search and document outline

use tower_lsp::lsp_types::{
    self as lsp, DocumentSymbolParams, DocumentSymbolResponse, GotoDefinitionParams,
    GotoDefinitionResponse, ReferenceContext, ReferenceParams, ServerCapabilities,
    WorkspaceSymbolParams, WorkspaceSymbolResponse,
};
use tracing::debug;

use crate::command::classify::{self, Resolved};
use crate::command::context::{CommandContext, partial_result, work_done};
use crate::command::error::CommandError;
use crate::command::response::CommandResponse;
use crate::command::subcommand::Capability;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMethod {
    Definition,
    Declaration,
    Implementation,
    References,
    TypeDefinition,
}

impl NavigationMethod {
    pub fn method(&self) -> &'static str {
        match self {
            NavigationMethod::Definition => "textDocument/definition",
            NavigationMethod::Declaration => "textDocument/declaration",
            NavigationMethod::Implementation => "textDocument/implementation",
            NavigationMethod::References => "textDocument/references",
            NavigationMethod::TypeDefinition => "textDocument/typeDefinition",
        }
    }

    pub fn capability(&self) -> Capability {
        match self {
            NavigationMethod::Definition => Capability::Definition,
            NavigationMethod::Declaration => Capability::Declaration,
            NavigationMethod::Implementation => Capability::Implementation,
            NavigationMethod::References => Capability::References,
            NavigationMethod::TypeDefinition => Capability::TypeDefinition,
        }
    }
}

pub const GOTO: &[NavigationMethod] =
    &[NavigationMethod::Declaration, NavigationMethod::Definition];
pub const GOTO_DECLARATION: &[NavigationMethod] =
    &[NavigationMethod::Declaration, NavigationMethod::Definition];
pub const GOTO_DEFINITION: &[NavigationMethod] =
    &[NavigationMethod::Definition, NavigationMethod::Declaration];

/// Issues one positional navigation request.
pub async fn resolve(
    cx: &mut CommandContext<'_>,
    method: NavigationMethod,
) -> Result<Resolved, CommandError> {
    let position = cx.position_params()?;

    let locations = match method {
        NavigationMethod::References => {
            let params = ReferenceParams {
                text_document_position: position,
                work_done_progress_params: work_done(),
                partial_result_params: partial_result(),
                context: ReferenceContext {
                    include_declaration: true,
                },
            };
            let response: Option<Vec<lsp::Location>> = cx.send(method.method(), params).await?;
            cx.translator.locations(&response.unwrap_or_default())?
        }
        _ => {
            let params = GotoDefinitionParams {
                text_document_position_params: position,
                work_done_progress_params: work_done(),
                partial_result_params: partial_result(),
            };
            let response: Option<GotoDefinitionResponse> =
                cx.send(method.method(), params).await?;
            cx.translator.goto_response(response)?
        }
    };

    Ok(Resolved::from(locations))
}

/// Tries each advertised method in turn until one yields a location. Errors stop the chain.
pub async fn chain(
    cx: &mut CommandContext<'_>,
    methods: &[NavigationMethod],
    capabilities: &ServerCapabilities,
) -> Result<CommandResponse, CommandError> {
    for method in methods {
        if !method.capability().advertised_by(capabilities) {
            debug!("{} not advertised, skipping", method.method());
            continue;
        }
        let resolved = resolve(cx, *method).await?;
        if !resolved.is_empty() {
            return classify::navigation(resolved);
        }
        debug!("{} found nothing", method.method());
    }
    classify::navigation(Resolved::Empty)
}

pub async fn single(
    cx: &mut CommandContext<'_>,
    method: NavigationMethod,
) -> Result<CommandResponse, CommandError> {
    classify::navigation(resolve(cx, method).await?)
}

pub async fn symbol(
    cx: &mut CommandContext<'_>,
    query: &str,
) -> Result<CommandResponse, CommandError> {
    let params = WorkspaceSymbolParams {
        query: query.to_string(),
        work_done_progress_params: work_done(),
        partial_result_params: partial_result(),
    };
    let response: Option<WorkspaceSymbolResponse> = cx.send("workspace/symbol", params).await?;
    classify::navigation(cx.translator.workspace_symbols(response)?.into())
}

pub async fn outline(cx: &mut CommandContext<'_>) -> Result<CommandResponse, CommandError> {
    let params = DocumentSymbolParams {
        text_document: cx.text_document()?,
        work_done_progress_params: work_done(),
        partial_result_params: partial_result(),
    };
    let response: Option<DocumentSymbolResponse> =
        cx.send("textDocument/documentSymbol", params).await?;

    let request = cx.request;
    classify::navigation(
        cx.translator
            .document_symbols(&request.filepath, response)?
            .into(),
    )
}
