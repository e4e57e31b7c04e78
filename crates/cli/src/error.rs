//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success, including a quit requested by the input source
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: simulation error (bad config dimensions, worker pool failure)
//! - 11: I/O error (output file creation)
//! - 12: input error (bad JSON params, unreadable config file)
//! - 13: serialization error
//! - 14: recording error (GIF/PNG encoding or write failure)

use flowfield_core::EngineError;
use flowfield_recorder::RecordError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    Engine(EngineError),
    Io(String),
    Input(String),
    Serialization(String),
    Record(RecordError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
            CliError::Record(_) => 14,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Engine(e) => write!(f, "{e}"),
            CliError::Record(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CliError({}): {self}", self.exit_code())
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::ParamTypeMismatch { .. }
            | EngineError::InvalidColor(_)
            | EngineError::InvalidPalette(_)
            | EngineError::InvalidConfig(_) => CliError::Input(e.to_string()),
            other => CliError::Engine(other),
        }
    }
}

impl From<RecordError> for CliError {
    fn from(e: RecordError) -> Self {
        CliError::Record(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
