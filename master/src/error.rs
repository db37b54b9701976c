use std::io;

use thiserror::Error;

use crate::session::SessionState;

/// Text at `line` that matches no token pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error on line {line} of recipe: '{excerpt}'")]
pub struct LexError {
    pub line: usize,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Error on line {line} of recipe: unexpected token '{lexeme}'")]
    UnexpectedToken { line: usize, lexeme: String },
    #[error("Unexpected end of recipe")]
    UnexpectedEndOfInput,
    #[error("Error on line {line} of recipe: '{lexeme}' is out of range")]
    OutOfRange { line: usize, lexeme: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// The device answered a handshake, acknowledgment or confirmation step
/// with something other than the expected line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "{}Error: Expected: \"{expected}\", but got: \"{got}\". Device out of sync.",
    unit_prefix(.unit)
)]
pub struct DeviceSyncError {
    pub expected: String,
    pub got: String,
    /// The wire unit that was being acknowledged, if any.
    pub unit: Option<String>,
}

impl DeviceSyncError {
    pub const TIMEOUT: &'static str = "<timeout>";

    pub fn is_timeout(&self) -> bool {
        self.got == Self::TIMEOUT
    }
}

fn unit_prefix(unit: &Option<String>) -> String {
    match unit {
        Some(unit) => format!("Failed sending command: \"{}\". ", unit),
        None => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sync(#[from] DeviceSyncError),
    #[error("serial link error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot {operation} while the session is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
}
