//! Shared fixtures for the end-to-end tests
//!
//! `FakeAnalyzer` is a tiny in-process language server answering from a
//! textual scan of the fixture workspace. It is reached exactly the way a
//! real backend would be: through `ServiceBackend` over a `tower_lsp::LspService`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tower_lsp::jsonrpc::{Request, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, ClientSocket, LanguageServer, LspService};

use lsp_subcommands::command::{CommandDispatcher, CommandRequest};
use lsp_subcommands::config::Settings;
use lsp_subcommands::lsp::lifecycle::handshake;
use lsp_subcommands::lsp::{CompleterState, ServiceBackend};

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub const LIB_RS: &str = r#"pub mod universe;

use universe::{create_universe, Universe};

/// Entry point of the simulation
pub fn run() -> Universe {
    let world = create_universe();
    let unused = 42;
    world
}
"#;

pub const UNIVERSE_RS: &str = "/// A universe
pub struct Universe {
\tsize: u32,
}

pub trait Expand {
\tfn expand(&self);
}

impl Expand for Universe {
\tfn expand(&self) {}
}

impl Expand for u32 {
\tfn expand(&self) {}
}

/// Be careful when using that function
pub fn create_universe() -> Universe {
\tUniverse { size: 1 }
}
";

/// Fixture crate on disk: `src/lib.rs` and `src/universe.rs`
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/lib.rs"), LIB_RS).unwrap();
        std::fs::write(dir.path().join("src/universe.rs"), UNIVERSE_RS).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Request against the on-disk contents of `relative`
    pub fn request(&self, command: &str, relative: &str, line: u32, column: u32) -> CommandRequest {
        CommandRequest::new(command, self.path(relative), self.read(relative), line, column)
    }
}

/// Drains server-to-client messages so the server never blocks on them.
pub fn spawn_notification_collector(mut socket: ClientSocket) -> mpsc::UnboundedReceiver<Request> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(message) = socket.next().await {
            let _ = tx.send(message);
        }
    });
    rx
}

pub fn fake_service() -> LspService<FakeAnalyzer> {
    let (service, socket) = LspService::new(FakeAnalyzer::new);
    spawn_notification_collector(socket);
    service
}

/// Dispatcher over a fresh fake backend, before any handshake
pub fn dispatcher() -> CommandDispatcher {
    let backend = Arc::new(ServiceBackend::with_factory(fake_service));
    let state = Arc::new(CompleterState::new());
    CommandDispatcher::new(
        backend,
        state,
        Settings::new("rust").with_request_timeout(TIMEOUT),
    )
}

pub async fn initialize(dispatcher: &CommandDispatcher, workspace: &Workspace) {
    handshake(
        dispatcher.backend().as_ref(),
        workspace.root(),
        dispatcher.state(),
        TIMEOUT,
    )
    .await
    .unwrap();
}

pub async fn ready_dispatcher(workspace: &Workspace) -> CommandDispatcher {
    let dispatcher = dispatcher();
    initialize(&dispatcher, workspace).await;
    dispatcher
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn span(line: usize, start: usize, len: usize) -> Range {
    Range::new(
        Position::new(line as u32, start as u32),
        Position::new(line as u32, (start + len) as u32),
    )
}

fn word_at(text: &str, position: Position) -> Option<String> {
    let line = text.lines().nth(position.line as usize)?;
    let cursor = position.character as usize;
    if !line.get(cursor..)?.chars().next().is_some_and(is_ident) {
        return None;
    }
    let start = line[..cursor]
        .rfind(|c: char| !is_ident(c))
        .map_or(0, |index| index + 1);
    let end = line[cursor..]
        .find(|c: char| !is_ident(c))
        .map_or(line.len(), |index| cursor + index);
    Some(line[start..end].to_string())
}

fn occurrences(text: &str, word: &str) -> Vec<Range> {
    let mut ranges = Vec::new();
    for (index, line) in text.lines().enumerate() {
        for (start, _) in line.match_indices(word) {
            let end = start + word.len();
            let before = line[..start].chars().next_back();
            let after = line[end..].chars().next();
            if before.is_some_and(is_ident) || after.is_some_and(is_ident) {
                continue;
            }
            ranges.push(span(index, start, word.len()));
        }
    }
    ranges
}

#[derive(Debug, Clone)]
struct Definition {
    name: String,
    kind: SymbolKind,
    range: Range,
    signature: String,
    docs: Vec<String>,
    indented: bool,
}

fn definitions(text: &str) -> Vec<Definition> {
    let lines: Vec<&str> = text.lines().collect();
    let mut found = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();
        let item = trimmed.strip_prefix("pub ").unwrap_or(trimmed);
        let offset = indent + (trimmed.len() - item.len());

        for (keyword, kind) in [
            ("fn ", SymbolKind::FUNCTION),
            ("struct ", SymbolKind::STRUCT),
            ("trait ", SymbolKind::INTERFACE),
        ] {
            let Some(rest) = item.strip_prefix(keyword) else {
                continue;
            };
            let name: String = rest.chars().take_while(|c| is_ident(*c)).collect();
            if name.is_empty() {
                continue;
            }
            let mut docs: Vec<String> = lines[..index]
                .iter()
                .rev()
                .map(|line| line.trim_start())
                .take_while(|line| line.starts_with("///"))
                .map(|line| line.trim_start_matches("///").trim().to_string())
                .collect();
            docs.reverse();

            found.push(Definition {
                range: span(index, offset + keyword.len(), name.len()),
                name,
                kind,
                signature: trimmed.trim_end_matches('{').trim_end().to_string(),
                docs,
                indented: indent > 0,
            });
        }
    }
    found
}

fn goto_response(locations: Vec<Location>) -> Option<GotoDefinitionResponse> {
    match locations.len() {
        0 => None,
        1 => locations.into_iter().next().map(GotoDefinitionResponse::Scalar),
        _ => Some(GotoDefinitionResponse::Array(locations)),
    }
}

/// Textual stand-in for a real analyzer, good enough for the fixture workspace.
pub struct FakeAnalyzer {
    root: Mutex<Option<PathBuf>>,
    documents: Mutex<HashMap<Url, String>>,
}

impl FakeAnalyzer {
    pub fn new(_client: Client) -> Self {
        Self {
            root: Mutex::new(None),
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Every source file, open documents taking precedence over disk
    fn files(&self) -> Vec<(Url, String)> {
        let Some(root) = self.root.lock().unwrap().clone() else {
            return Vec::new();
        };
        let mut paths: Vec<PathBuf> = std::fs::read_dir(root.join("src"))
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok().map(|entry| entry.path()))
                    .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
                    .collect()
            })
            .unwrap_or_default();
        paths.sort();

        paths
            .into_iter()
            .filter_map(|path| {
                let uri = Url::from_file_path(&path).ok()?;
                let text = self.text(&uri)?;
                Some((uri, text))
            })
            .collect()
    }

    fn text(&self, uri: &Url) -> Option<String> {
        if let Some(text) = self.documents.lock().unwrap().get(uri) {
            return Some(text.clone());
        }
        std::fs::read_to_string(uri.to_file_path().ok()?).ok()
    }

    fn word(&self, params: &TextDocumentPositionParams) -> Option<String> {
        let text = self.text(&params.text_document.uri)?;
        word_at(&text, params.position)
    }

    fn find_definitions(&self, name: &str) -> Vec<(Url, Definition)> {
        self.files()
            .into_iter()
            .flat_map(|(uri, text)| {
                definitions(&text)
                    .into_iter()
                    .filter(|definition| definition.name == name)
                    .map(move |definition| (uri.clone(), definition))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn definition_locations(&self, name: &str) -> Vec<Location> {
        self.find_definitions(name)
            .into_iter()
            .map(|(uri, definition)| Location::new(uri, definition.range))
            .collect()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for FakeAnalyzer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        #[allow(deprecated)]
        let root = params.root_uri.and_then(|uri| uri.to_file_path().ok());
        *self.root.lock().unwrap() = root;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                definition_provider: Some(OneOf::Left(true)),
                declaration_provider: Some(DeclarationCapability::Simple(true)),
                implementation_provider: Some(ImplementationProviderCapability::Simple(true)),
                references_provider: Some(OneOf::Left(true)),
                type_definition_provider: Some(TypeDefinitionProviderCapability::Simple(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                document_formatting_provider: Some(OneOf::Left(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                rename_provider: Some(OneOf::Left(true)),
                document_symbol_provider: Some(OneOf::Left(true)),
                workspace_symbol_provider: Some(OneOf::Left(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "fake-analyzer".to_string(),
                version: None,
            }),
        })
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.documents
            .lock()
            .unwrap()
            .insert(params.text_document.uri, params.text_document.text);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        if let Some(change) = params.content_changes.into_iter().last() {
            self.documents
                .lock()
                .unwrap()
                .insert(params.text_document.uri, change.text);
        }
    }

    async fn goto_declaration(
        &self,
        _params: request::GotoDeclarationParams,
    ) -> Result<Option<request::GotoDeclarationResponse>> {
        Ok(None)
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let Some(word) = self.word(&params.text_document_position_params) else {
            return Ok(None);
        };
        Ok(goto_response(self.definition_locations(&word)))
    }

    async fn goto_type_definition(
        &self,
        params: request::GotoTypeDefinitionParams,
    ) -> Result<Option<request::GotoTypeDefinitionResponse>> {
        let Some(word) = self.word(&params.text_document_position_params) else {
            return Ok(None);
        };
        let target = self
            .find_definitions(&word)
            .into_iter()
            .find_map(|(_, definition)| match definition.kind {
                SymbolKind::STRUCT => Some(definition.name),
                _ => definition
                    .signature
                    .split("->")
                    .nth(1)
                    .map(|ty| ty.trim().chars().take_while(|c| is_ident(*c)).collect()),
            });

        Ok(target.and_then(|name| goto_response(self.definition_locations(&name))))
    }

    async fn goto_implementation(
        &self,
        params: request::GotoImplementationParams,
    ) -> Result<Option<request::GotoImplementationResponse>> {
        let Some(word) = self.word(&params.text_document_position_params) else {
            return Ok(None);
        };
        let prefix = format!("impl {} for ", word);

        let mut locations = Vec::new();
        for (uri, text) in self.files() {
            for (index, line) in text.lines().enumerate() {
                if line.starts_with(&prefix) {
                    locations.push(Location::new(uri.clone(), span(index, 0, 4)));
                }
            }
        }
        Ok(goto_response(locations))
    }

    async fn references(&self, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
        let Some(word) = self.word(&params.text_document_position) else {
            return Ok(None);
        };
        let declarations: Vec<Location> = self.definition_locations(&word);

        let mut locations = Vec::new();
        for (uri, text) in self.files() {
            for range in occurrences(&text, &word) {
                let location = Location::new(uri.clone(), range);
                if params.context.include_declaration || !declarations.contains(&location) {
                    locations.push(location);
                }
            }
        }
        Ok(Some(locations))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let Some(word) = self.word(&params.text_document_position_params) else {
            return Ok(None);
        };
        let Some((uri, definition)) = self.find_definitions(&word).into_iter().next() else {
            return Ok(None);
        };

        let module = uri
            .to_file_path()
            .ok()
            .and_then(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let mut value = format!(
            "```rust\nlsp_fixture::{}\n```\n\n```rust\n{}\n```",
            module, definition.signature
        );
        if !definition.docs.is_empty() {
            value.push_str("\n\n---\n\n");
            value.push_str(&definition.docs.join("\n"));
        }

        Ok(Some(Hover {
            contents: HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value,
            }),
            range: Some(definition.range),
        }))
    }

    async fn document_symbol(
        &self,
        params: DocumentSymbolParams,
    ) -> Result<Option<DocumentSymbolResponse>> {
        let Some(text) = self.text(&params.text_document.uri) else {
            return Ok(None);
        };

        let mut symbols: Vec<DocumentSymbol> = Vec::new();
        let mut parent: Option<usize> = None;
        let lines: Vec<&str> = text.lines().collect();
        let mut items = definitions(&text).into_iter().peekable();

        for (index, line) in lines.iter().enumerate() {
            let definition = items
                .next_if(|definition| definition.range.start.line as usize == index);

            match definition {
                Some(definition) if definition.indented => {
                    if let Some(parent) = parent {
                        symbols[parent]
                            .children
                            .get_or_insert_with(Vec::new)
                            .push(document_symbol(definition));
                    }
                }
                Some(definition) => {
                    parent = (definition.kind == SymbolKind::INTERFACE).then_some(symbols.len());
                    symbols.push(document_symbol(definition));
                }
                None if !line.is_empty() && !line.starts_with(char::is_whitespace) => {
                    parent = None;
                }
                None => {}
            }
        }

        Ok(Some(DocumentSymbolResponse::Nested(symbols)))
    }

    async fn symbol(
        &self,
        params: WorkspaceSymbolParams,
    ) -> Result<Option<Vec<SymbolInformation>>> {
        let mut symbols = Vec::new();
        for (uri, text) in self.files() {
            for definition in definitions(&text) {
                if definition.name.contains(&params.query) {
                    #[allow(deprecated)]
                    let symbol = SymbolInformation {
                        name: definition.name,
                        kind: definition.kind,
                        tags: None,
                        deprecated: None,
                        location: Location::new(uri.clone(), definition.range),
                        container_name: None,
                    };
                    symbols.push(symbol);
                }
            }
        }
        Ok(Some(symbols))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let Some(text) = self.text(&params.text_document.uri) else {
            return Ok(None);
        };
        let line_index = params.range.start.line as usize;
        let Some(line) = text.lines().nth(line_index) else {
            return Ok(Some(Vec::new()));
        };

        let trimmed = line.trim_start();
        let Some(rest) = trimmed.strip_prefix("let ") else {
            return Ok(Some(Vec::new()));
        };
        let name: String = rest.chars().take_while(|c| is_ident(*c)).collect();
        if name.is_empty() || name.starts_with('_') || occurrences(&text, &name).len() > 1 {
            return Ok(Some(Vec::new()));
        }

        let character = line.len() - rest.len();
        Ok(Some(vec![
            CodeActionOrCommand::Command(Command::new(
                "Run tests".to_string(),
                "fake.runTests".to_string(),
                None,
            )),
            CodeActionOrCommand::CodeAction(CodeAction {
                title: format!("Prefix `{}` with an underscore", name),
                kind: Some(CodeActionKind::QUICKFIX),
                data: Some(json!({
                    "uri": params.text_document.uri,
                    "line": line_index,
                    "character": character,
                })),
                ..Default::default()
            }),
        ]))
    }

    async fn code_action_resolve(&self, mut action: CodeAction) -> Result<CodeAction> {
        let Some(data) = action.data.clone() else {
            return Ok(action);
        };
        let uri: Url = serde_json::from_value(data["uri"].clone())
            .map_err(|_| tower_lsp::jsonrpc::Error::invalid_params("bad uri"))?;
        let position = Position::new(
            data["line"].as_u64().unwrap_or_default() as u32,
            data["character"].as_u64().unwrap_or_default() as u32,
        );

        action.edit = Some(WorkspaceEdit::new(HashMap::from([(
            uri,
            vec![TextEdit::new(Range::new(position, position), "_".to_string())],
        )])));
        Ok(action)
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let Some(text) = self.text(&params.text_document.uri) else {
            return Ok(None);
        };
        let tab_size = params.options.tab_size.max(1);

        let mut edits = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let indent = &line[..line.len() - line.trim_start().len()];
            let width: u32 = indent
                .chars()
                .map(|c| if c == '\t' { tab_size } else { 1 })
                .sum();
            let wanted = if params.options.insert_spaces {
                " ".repeat(width as usize)
            } else {
                "\t".repeat((width / tab_size) as usize) + &" ".repeat((width % tab_size) as usize)
            };
            if wanted != indent {
                edits.push(TextEdit::new(span(index, 0, indent.len()), wanted));
            }
        }
        Ok(Some(edits))
    }

    async fn rename(&self, params: RenameParams) -> Result<Option<WorkspaceEdit>> {
        let Some(word) = self.word(&params.text_document_position) else {
            return Ok(None);
        };
        if self.find_definitions(&word).is_empty() {
            return Ok(None);
        }

        let mut changes = HashMap::new();
        for (uri, text) in self.files() {
            let edits: Vec<TextEdit> = occurrences(&text, &word)
                .into_iter()
                .map(|range| TextEdit::new(range, params.new_name.clone()))
                .collect();
            if !edits.is_empty() {
                changes.insert(uri, edits);
            }
        }
        Ok(Some(WorkspaceEdit::new(changes)))
    }
}

#[allow(deprecated)]
fn document_symbol(definition: Definition) -> DocumentSymbol {
    DocumentSymbol {
        name: definition.name,
        detail: Some(definition.signature),
        kind: definition.kind,
        tags: None,
        deprecated: None,
        range: definition.range,
        selection_range: definition.range,
        children: None,
    }
}
