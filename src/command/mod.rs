// Subcommand layer
//
// types      - canonical Position, Range, Location, EditChunk, FixIt
// request    - inbound request shape
// response   - canonical results and their rendered reply
// error      - typed error taxonomy
// translate  - backend payloads to canonical types
// classify   - result cardinality to success or typed error
// subcommand - fixed subcommand set and dispatch table
// context    - per-request state shared by handlers
// handlers   - one module per command family
// dispatcher - readiness gate, document sync and routing

pub mod classify;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod request;
pub mod response;
pub mod subcommand;
pub mod translate;
pub mod types;

pub use dispatcher::CommandDispatcher;
pub use error::CommandError;
pub use request::{CommandRequest, FormatOptions};
pub use response::{CommandResponse, Reply, Status};
pub use subcommand::Subcommand;
pub use types::{EditChunk, FixIt, Location, Position, Range};
