//! Response surface returned to the front end

use serde::Serialize;
use serde_json::{Value, json};

use crate::command::error::CommandError;
use crate::command::types::{FixIt, Location};

/// Successful outcome of a subcommand
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Location(Location),
    Locations(Vec<Location>),
    FixIts { fixits: Vec<FixIt> },
    DetailedInfo { detailed_info: String },
    Message { message: String },
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Failure,
}

impl Status {
    /// HTTP-style status code for front ends that need one
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Failure => 500,
        }
    }
}

/// Status plus JSON body, ready to be written back to the editor
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: Status,
    pub body: Value,
}

impl Reply {
    pub fn from_result(result: Result<CommandResponse, CommandError>) -> Self {
        let rendered = result.and_then(|response| {
            serde_json::to_value(&response)
                .map_err(|e| CommandError::InvalidResponse(format!("cannot render result: {}", e)))
        });

        match rendered {
            Ok(body) => Self {
                status: Status::Ok,
                body,
            },
            Err(error) => Self::from_error(&error),
        }
    }

    pub fn from_error(error: &CommandError) -> Self {
        Self {
            status: Status::Failure,
            body: json!({
                "exception": { "TYPE": error.kind() },
                "message": error.to_string(),
            }),
        }
    }
}
