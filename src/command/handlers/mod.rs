// Per-subcommand handlers
//
// goto      - GoTo family, symbol search, document outline
// format    - whole-buffer and range formatting
// fixit     - code actions as FixIts
// hover     - GetDoc and GetType
// rename    - RefactorRename
// lifecycle - RestartServer

pub mod fixit;
pub mod format;
pub mod goto;
pub mod hover;
pub mod lifecycle;
pub mod rename;
