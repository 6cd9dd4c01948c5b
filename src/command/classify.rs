//! Cardinality of backend results and how each command reports it

use crate::command::error::CommandError;
use crate::command::response::CommandResponse;
use crate::command::types::{FixIt, Location};

/// Zero, one or many locations from a navigation request
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Empty,
    One(Location),
    Many(Vec<Location>),
}

impl Resolved {
    pub fn is_empty(&self) -> bool {
        matches!(self, Resolved::Empty)
    }
}

impl From<Vec<Location>> for Resolved {
    fn from(mut locations: Vec<Location>) -> Self {
        match locations.len() {
            0 => Resolved::Empty,
            1 => Resolved::One(locations.remove(0)),
            _ => Resolved::Many(locations),
        }
    }
}

/// Shared by every GoTo-family command
pub fn navigation(resolved: Resolved) -> Result<CommandResponse, CommandError> {
    match resolved {
        Resolved::Empty => Err(CommandError::cannot_jump()),
        Resolved::One(location) => Ok(CommandResponse::Location(location)),
        Resolved::Many(locations) => Ok(CommandResponse::Locations(locations)),
    }
}

pub fn documentation(text: Option<String>) -> Result<CommandResponse, CommandError> {
    text.map(|detailed_info| CommandResponse::DetailedInfo { detailed_info })
        .ok_or_else(CommandError::no_documentation)
}

pub fn type_info(text: Option<String>) -> Result<CommandResponse, CommandError> {
    text.map(|message| CommandResponse::Message { message })
        .ok_or_else(CommandError::unknown_type)
}

/// A rename that touches nothing means the cursor was not on a symbol.
pub fn rename(fixit: Option<FixIt>) -> Result<CommandResponse, CommandError> {
    match fixit {
        Some(fixit) if !fixit.chunks.is_empty() => Ok(CommandResponse::FixIts {
            fixits: vec![fixit],
        }),
        _ => Err(CommandError::cannot_rename()),
    }
}

/// No applicable action is a successful empty list, never an error.
pub fn fixits(fixits: Vec<FixIt>) -> CommandResponse {
    CommandResponse::FixIts { fixits }
}
