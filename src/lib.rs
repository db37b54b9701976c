#![cfg_attr(not(test), no_std)]

//! Wire protocol shared by the host and the mash/lauter controller.
//!
//! Every instruction goes out as a 3 byte ASCII mnemonic, followed by zero,
//! one or two 4 byte operands. Each group is a separate wire unit and the
//! device answers every unit with an `OK` line.
//!
//! Operands are little-endian: `u32` for volumes (mL) and durations (ms),
//! IEEE-754 `f32` for temperatures (°C).

use core::fmt::{self, Write};
use serde_derive::{Deserialize, Serialize};

/// Serial link speed, fixed by the firmware.
pub const BAUD_RATE: u32 = 9600;

/// Line sent by the device once it is ready to accept a recipe.
pub const PROGRAM_RUNNING: &str = "PROGRAM RUNNING";
/// Per wire unit acknowledgment.
pub const ACK: &str = "OK";
/// Sent after the last unit, once the device starts executing.
pub const RUNNING_SCRIPT: &str = "RUNNING SCRIPT";
/// The device waits for the operator.
pub const PAUSED: &str = "PAUSED";
/// Prefix of device-reported faults.
pub const ERROR_PREFIX: &str = "ERROR:";
/// Written by the host to leave the paused state.
pub const RESUME: u8 = b'K';

// we could use new-type pattern here but let's keep it simple
pub type Millilitres = u32;
pub type Millis = u32;
pub type Celsius = f32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub enum Instruction {
    Initialize,
    BeginMashing,
    BeginSparging,
    Pause,
    SetMashWaterVolume(Millilitres),
    Heat(Celsius),
    HoldFor(Celsius, Millis),
    End,
}

impl Instruction {
    pub fn mnemonic(&self) -> Mnemonic {
        match self {
            Instruction::Initialize => Mnemonic::Ini,
            Instruction::BeginMashing => Mnemonic::Msh,
            Instruction::BeginSparging => Mnemonic::Spg,
            Instruction::Pause => Mnemonic::Pau,
            Instruction::SetMashWaterVolume(_) => Mnemonic::Mwv,
            Instruction::Heat(_) => Mnemonic::Hea,
            Instruction::HoldFor(_, _) => Mnemonic::Hld,
            Instruction::End => Mnemonic::End,
        }
    }

    /// The wire units of this instruction, mnemonic first, operands in
    /// field order.
    pub fn wire_units(&self) -> impl Iterator<Item = WireUnit> {
        let mnemonic = Some(WireUnit::mnemonic_unit(self.mnemonic()));
        let operands = match *self {
            Instruction::SetMashWaterVolume(ml) => [Some(WireUnit::integer(ml)), None],
            Instruction::Heat(c) => [Some(WireUnit::float(c)), None],
            Instruction::HoldFor(c, ms) => [Some(WireUnit::float(c)), Some(WireUnit::integer(ms))],
            _ => [None, None],
        };
        [mnemonic, operands[0], operands[1]].into_iter().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mnemonic {
    Ini,
    Msh,
    Spg,
    Pau,
    Mwv,
    Hea,
    Hld,
    End,
}

impl Mnemonic {
    pub const ALL: [Mnemonic; 8] = [
        Mnemonic::Ini,
        Mnemonic::Msh,
        Mnemonic::Spg,
        Mnemonic::Pau,
        Mnemonic::Mwv,
        Mnemonic::Hea,
        Mnemonic::Hld,
        Mnemonic::End,
    ];

    pub const fn as_bytes(&self) -> &'static [u8; 3] {
        match self {
            Mnemonic::Ini => b"INI",
            Mnemonic::Msh => b"MSH",
            Mnemonic::Spg => b"SPG",
            Mnemonic::Pau => b"PAU",
            Mnemonic::Mwv => b"MWV",
            Mnemonic::Hea => b"HEA",
            Mnemonic::Hld => b"HLD",
            Mnemonic::End => b"END",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_bytes().iter().try_for_each(|&b| f.write_char(char::from(b)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMnemonic;

impl TryFrom<&[u8]> for Mnemonic {
    type Error = UnknownMnemonic;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Mnemonic::ALL
            .into_iter()
            .find(|m| m.as_bytes() == bytes)
            .ok_or(UnknownMnemonic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireUnit {
    Mnemonic(Mnemonic),
    Integer([u8; 4]),
    Float([u8; 4]),
}

impl WireUnit {
    pub fn mnemonic_unit(mnemonic: Mnemonic) -> Self {
        WireUnit::Mnemonic(mnemonic)
    }

    pub fn integer(value: u32) -> Self {
        WireUnit::Integer(value.to_le_bytes())
    }

    pub fn float(value: f32) -> Self {
        WireUnit::Float(value.to_le_bytes())
    }

    /// Bytes as they go out on the link.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            WireUnit::Mnemonic(m) => &m.as_bytes()[..],
            WireUnit::Integer(bytes) | WireUnit::Float(bytes) => &bytes[..],
        }
    }

    pub fn mnemonic(&self) -> Option<Mnemonic> {
        match self {
            WireUnit::Mnemonic(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            WireUnit::Integer(bytes) => Some(u32::from_le_bytes(*bytes)),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            WireUnit::Float(bytes) => Some(f32::from_le_bytes(*bytes)),
            _ => None,
        }
    }
}

/// Names the unit in diagnostics, e.g. `HLD`, `3600000` or `65`.
impl fmt::Display for WireUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireUnit::Mnemonic(m) => write!(f, "{}", m),
            WireUnit::Integer(bytes) => write!(f, "{}", u32::from_le_bytes(*bytes)),
            WireUnit::Float(bytes) => write!(f, "{}", f32::from_le_bytes(*bytes)),
        }
    }
}
