use std::fmt;

use mash_lauter_control::{Instruction, WireUnit};

use crate::error::CompileError;
use crate::lexer::tokenize;
use crate::parser::parse;

/// A compiled recipe. Immutable once built; the instruction stream is never
/// empty and ends with a single [`Instruction::End`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    instructions: Vec<Instruction>,
}

impl Recipe {
    /// Lex and parse `text`. Nothing is produced for a recipe with any error.
    pub fn compile(text: &str) -> Result<Self, CompileError> {
        let tokens = tokenize(text)?;
        let instructions = parse(&tokens)?;
        log::debug!("compiled {} instructions", instructions.len());
        Ok(Recipe { instructions })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Every wire unit in transmission order.
    pub fn to_wire_units(&self) -> Vec<WireUnit> {
        self.instructions.iter().flat_map(Instruction::wire_units).collect()
    }

    pub fn to_human_readable(&self) -> Vec<String> {
        self.instructions.iter().map(|i| Listing(i).to_string()).collect()
    }
}

/// One line of the operator listing.
struct Listing<'a>(&'a Instruction);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self.0 {
            Instruction::Initialize => write!(f, "INITIALIZE"),
            Instruction::BeginMashing => write!(f, "BEGIN MASHING"),
            Instruction::BeginSparging => write!(f, "BEGIN SPARGING"),
            Instruction::Pause => write!(f, "PAUSE"),
            Instruction::SetMashWaterVolume(ml) => write!(f, "MASH WATER VOLUME: {} mL", ml),
            Instruction::Heat(c) => write!(f, "HEAT TO: {:.2} C", c),
            Instruction::HoldFor(c, ms) => write!(f, "HOLD AT: {:.2} C FOR: {} seconds", c, ms / 1000),
            Instruction::End => write!(f, "END"),
        }
    }
}
