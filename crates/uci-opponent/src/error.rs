//! Error types for the external move generator

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while asking an external program for a move
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// No program is configured on this deployment
    #[error("no move generator is available")]
    Unavailable,

    /// The program could not be started
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the program failed
    #[error("engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The program closed its output before answering
    #[error("engine exited before sending {expected}")]
    UnexpectedEof { expected: &'static str },

    /// The program did not answer within the hard timeout
    #[error("engine did not answer within {0:?}")]
    Timeout(Duration),

    /// The program's reply could not be understood
    #[error("malformed engine reply: {line:?}")]
    MalformedReply { line: String },
}

/// Result type alias for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;
