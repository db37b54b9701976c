//! Host side of the mash/lauter controller: compiles recipes and drives the
//! device over its serial link.

pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod port;
pub mod recipe;
pub mod session;
pub mod status;
pub mod status_log;

pub use config::{BrewConfig, SerialConfig};
pub use error::{CompileError, DeviceSyncError, LexError, ParseError, SessionError};
pub use recipe::Recipe;
pub use session::{DeviceEvent, Session, SessionState};
pub use status::{decode_status, StageStatus, StageTiming, StatusReport};
pub use status_log::StatusLog;
