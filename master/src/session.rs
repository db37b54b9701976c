//! Lockstep session with the controller over the serial link.
//!
//! ```text
//! AwaitingHandshake --PROGRAM RUNNING--> Ready --write_recipe--> Transmitting
//! Transmitting --OK per unit--> AwaitingRunConfirmation --RUNNING SCRIPT--> Monitoring
//! Monitoring --PAUSED--> OperatorPaused --resume (K)--> Monitoring
//! any mismatch or timeout --> Failed
//! ```
//!
//! There is never more than one outstanding operation on the link: every
//! write is followed by the read of its acknowledgment before anything else
//! is sent. A failed session is not recovered, the device has to be reset.

use std::io::{self, BufRead, BufReader, Read, Write};

use log::{debug, error, info, warn};
use mash_lauter_control::{WireUnit, ACK, PAUSED, PROGRAM_RUNNING, RESUME, RUNNING_SCRIPT};
use serial2::SerialPort;

use crate::config::SerialConfig;
use crate::error::{DeviceSyncError, SessionError};
use crate::port;
use crate::recipe::Recipe;
use crate::status::{decode_status, StatusReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingHandshake,
    Ready,
    Transmitting,
    AwaitingRunConfirmation,
    Monitoring,
    OperatorPaused,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// The device waits for the operator; call [`Session::resume`].
    Paused,
    Status { line: String, report: StatusReport },
}

pub struct Session<P> {
    link: BufReader<P>,
    state: SessionState,
}

impl Session<SerialPort> {
    /// Open the configured serial port and wait for the device handshake.
    pub fn open(config: &SerialConfig) -> Result<Self, SessionError> {
        let port = port::open(config)?;
        Self::handshake(port)
    }
}

impl<P: Read + Write> Session<P> {
    /// Take ownership of an opened link and wait for `PROGRAM RUNNING`.
    pub fn handshake(link: P) -> Result<Self, SessionError> {
        let mut session = Session {
            link: BufReader::new(link),
            state: SessionState::AwaitingHandshake,
        };
        session.expect_line(PROGRAM_RUNNING, None)?;
        session.transition(SessionState::Ready);
        info!("device ready");
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Send every wire unit of `recipe`, one at a time, each acknowledged
    /// with `OK`, then wait for the device to confirm it started.
    pub fn write_recipe(&mut self, recipe: &Recipe) -> Result<(), SessionError> {
        self.require(SessionState::Ready, "write a recipe")?;
        self.transition(SessionState::Transmitting);

        let units = recipe.to_wire_units();
        for unit in &units {
            debug!("sending {} ({:02x?})", unit, unit.as_bytes());
            self.send(unit.as_bytes())?;
            self.expect_line(ACK, Some(unit))?;
        }

        self.transition(SessionState::AwaitingRunConfirmation);
        self.expect_line(RUNNING_SCRIPT, None)?;
        self.transition(SessionState::Monitoring);
        info!("recipe accepted, {} units sent", units.len());
        Ok(())
    }

    /// Block for the next status line and return it without the line
    /// terminator.
    pub fn read_current_status(&mut self) -> Result<String, SessionError> {
        self.require(SessionState::Monitoring, "read status")?;
        match self.read_line() {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(self.fail(io::Error::new(io::ErrorKind::UnexpectedEof, "serial link closed").into())),
            Err(e) if is_timeout(&e) => Err(self.fail(
                DeviceSyncError {
                    expected: "status line".to_string(),
                    got: DeviceSyncError::TIMEOUT.to_string(),
                    unit: None,
                }
                .into(),
            )),
            Err(e) => Err(self.fail(e.into())),
        }
    }

    /// Read and interpret the next status line.
    pub fn next_event(&mut self) -> Result<DeviceEvent, SessionError> {
        let line = self.read_current_status()?;
        if line == PAUSED {
            self.transition(SessionState::OperatorPaused);
            info!("device paused, waiting for operator");
            return Ok(DeviceEvent::Paused);
        }

        let report = decode_status(&line);
        if report.is_error() {
            warn!("device reported: {}", line);
        }
        Ok(DeviceEvent::Status { line, report })
    }

    /// Tell a paused device to carry on.
    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::OperatorPaused, "resume")?;
        self.send(&[RESUME])?;
        self.transition(SessionState::Monitoring);
        info!("resumed by operator");
        Ok(())
    }

    pub fn get_ref(&self) -> &P {
        self.link.get_ref()
    }

    pub fn into_inner(self) -> P {
        self.link.into_inner()
    }

    fn require(&self, state: SessionState, operation: &'static str) -> Result<(), SessionError> {
        if self.state == state {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!("session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        error!("{}", err);
        self.transition(SessionState::Failed);
        err
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let link = self.link.get_mut();
        let written = link.write_all(bytes).and_then(|_| link.flush());
        written.map_err(|e| self.fail(e.into()))
    }

    /// `Ok(None)` when the link reached end of input. Bytes that are not
    /// UTF-8 come back as U+FFFD.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut raw = Vec::new();
        if self.link.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&raw);
        Ok(Some(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string()))
    }

    fn expect_line(&mut self, expected: &str, unit: Option<&WireUnit>) -> Result<(), SessionError> {
        let got = match self.read_line() {
            Ok(line) => line.unwrap_or_default(),
            Err(e) if is_timeout(&e) => DeviceSyncError::TIMEOUT.to_string(),
            Err(e) => return Err(self.fail(e.into())),
        };
        if got.trim() == expected {
            return Ok(());
        }
        Err(self.fail(
            DeviceSyncError {
                expected: expected.to_string(),
                got,
                unit: unit.map(|u| u.to_string()),
            }
            .into(),
        ))
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
