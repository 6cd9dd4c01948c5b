//! Fixed subcommand set and its dispatch table

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tower_lsp::lsp_types::ServerCapabilities;

use crate::command::error::CommandError;
use crate::command::request::CommandRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    Format,
    FixIt,
    GetDoc,
    GetType,
    GoTo,
    GoToDeclaration,
    GoToDefinition,
    GoToDocumentOutline,
    GoToImplementation,
    GoToReferences,
    GoToSymbol,
    GoToType,
    RefactorRename,
    RestartServer,
}

/// Backend capability a subcommand relies on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Definition,
    Declaration,
    Implementation,
    References,
    TypeDefinition,
    Hover,
    Formatting,
    CodeAction,
    Rename,
    DocumentSymbol,
    WorkspaceSymbol,
}

impl Capability {
    /// Key of the matching provider in the backend's `ServerCapabilities`
    pub fn provider_key(&self) -> &'static str {
        match self {
            Capability::Definition => "definitionProvider",
            Capability::Declaration => "declarationProvider",
            Capability::Implementation => "implementationProvider",
            Capability::References => "referencesProvider",
            Capability::TypeDefinition => "typeDefinitionProvider",
            Capability::Hover => "hoverProvider",
            Capability::Formatting => "documentFormattingProvider",
            Capability::CodeAction => "codeActionProvider",
            Capability::Rename => "renameProvider",
            Capability::DocumentSymbol => "documentSymbolProvider",
            Capability::WorkspaceSymbol => "workspaceSymbolProvider",
        }
    }

    /// True when `capabilities` carries this provider without switching it off.
    pub fn advertised_by(&self, capabilities: &ServerCapabilities) -> bool {
        provided(&advertised(capabilities), self)
    }
}

fn advertised(capabilities: &ServerCapabilities) -> Value {
    serde_json::to_value(capabilities).unwrap_or(Value::Null)
}

fn provided(advertised: &Value, capability: &Capability) -> bool {
    !matches!(
        advertised.get(capability.provider_key()),
        None | Some(Value::Null) | Some(Value::Bool(false))
    )
}

/// Shape of the free-form arguments following the subcommand name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentShape {
    None,
    /// Arguments are joined into one required value
    Required(&'static str),
}

impl ArgumentShape {
    /// The joined arguments when the shape requires them, failing with the usage text otherwise.
    pub fn extract(&self, request: &CommandRequest) -> Result<Option<String>, CommandError> {
        match self {
            ArgumentShape::None => Ok(None),
            ArgumentShape::Required(usage) => request
                .joined_arguments()
                .map(Some)
                .ok_or_else(|| CommandError::MissingArgument(usage.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub subcommand: Subcommand,
    pub name: &'static str,
    /// Any one of these providers enables the subcommand; empty means always available
    pub capabilities: &'static [Capability],
    /// Fail with `ServerNotInitialized` until the backend is ready
    pub requires_ready: bool,
    pub arguments: ArgumentShape,
}

const fn entry(
    subcommand: Subcommand,
    name: &'static str,
    capabilities: &'static [Capability],
    arguments: ArgumentShape,
) -> Descriptor {
    Descriptor {
        subcommand,
        name,
        capabilities,
        requires_ready: true,
        arguments,
    }
}

use self::Capability as C;

pub static SUBCOMMANDS: [Descriptor; 14] = [
    entry(Subcommand::Format, "Format", &[C::Formatting], ArgumentShape::None),
    entry(Subcommand::FixIt, "FixIt", &[C::CodeAction], ArgumentShape::None),
    entry(Subcommand::GetDoc, "GetDoc", &[C::Hover], ArgumentShape::None),
    entry(Subcommand::GetType, "GetType", &[C::Hover], ArgumentShape::None),
    entry(
        Subcommand::GoTo,
        "GoTo",
        &[C::Declaration, C::Definition],
        ArgumentShape::None,
    ),
    entry(
        Subcommand::GoToDeclaration,
        "GoToDeclaration",
        &[C::Declaration, C::Definition],
        ArgumentShape::None,
    ),
    entry(
        Subcommand::GoToDefinition,
        "GoToDefinition",
        &[C::Definition, C::Declaration],
        ArgumentShape::None,
    ),
    entry(
        Subcommand::GoToDocumentOutline,
        "GoToDocumentOutline",
        &[C::DocumentSymbol],
        ArgumentShape::None,
    ),
    entry(
        Subcommand::GoToImplementation,
        "GoToImplementation",
        &[C::Implementation],
        ArgumentShape::None,
    ),
    entry(
        Subcommand::GoToReferences,
        "GoToReferences",
        &[C::References],
        ArgumentShape::None,
    ),
    entry(
        Subcommand::GoToSymbol,
        "GoToSymbol",
        &[C::WorkspaceSymbol],
        ArgumentShape::Required(crate::command::error::SYMBOL_QUERY_REQUIRED),
    ),
    entry(
        Subcommand::GoToType,
        "GoToType",
        &[C::TypeDefinition],
        ArgumentShape::None,
    ),
    entry(
        Subcommand::RefactorRename,
        "RefactorRename",
        &[C::Rename],
        ArgumentShape::Required(crate::command::error::RENAME_USAGE),
    ),
    Descriptor {
        subcommand: Subcommand::RestartServer,
        name: "RestartServer",
        capabilities: &[],
        requires_ready: false,
        arguments: ArgumentShape::None,
    },
];

impl Subcommand {
    pub fn descriptor(self) -> &'static Descriptor {
        // SUBCOMMANDS is declared in variant order
        &SUBCOMMANDS[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    pub fn all() -> impl Iterator<Item = Subcommand> {
        SUBCOMMANDS.iter().map(|descriptor| descriptor.subcommand)
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Subcommand {
    type Err = CommandError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        SUBCOMMANDS
            .iter()
            .find(|descriptor| descriptor.name == name)
            .map(|descriptor| descriptor.subcommand)
            .ok_or_else(|| CommandError::UnsupportedCommand(name.to_string()))
    }
}

/// Names of the subcommands the backend advertises support for
pub fn defined_subcommands(capabilities: &ServerCapabilities) -> Vec<&'static str> {
    let advertised = advertised(capabilities);
    let provides = |capability: &Capability| provided(&advertised, capability);

    SUBCOMMANDS
        .iter()
        .filter(|descriptor| {
            descriptor.capabilities.is_empty() || descriptor.capabilities.iter().any(provides)
        })
        .map(|descriptor| descriptor.name)
        .collect()
}
