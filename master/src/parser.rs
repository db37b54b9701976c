//! Recursive-descent parser turning recipe tokens into instructions.
//!
//! ```text
//! statement   := INITIALIZE | MASHING | SPARGING | PAUSE | mash_volume | heat | hold_for
//! mash_volume := MASH_VOLUME volume
//! heat        := HEAT temperature
//! hold_for    := HOLD temperature FOR time
//! volume      := (FLOAT|INTEGER) (LITERS | MILLILITERS)
//! temperature := (FLOAT|INTEGER) (CELSIUS | FAHRENHEIT)
//! time        := (FLOAT|INTEGER) (MILLISECONDS | SECONDS | MINUTES | HOURS)
//! ```
//!
//! Every production takes the token slice and a position and either returns
//! the position after what it consumed, or reports no match and leaves the
//! caller's position untouched so the next alternative can be tried. Once a
//! production has seen its leading keyword it is committed, and a malformed
//! operand is an error rather than a silent skip.
//!
//! Operands are unit-normalized here: °C, mL and ms.

use mash_lauter_control::{Celsius, Instruction, Millilitres, Millis};

use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

/// `Ok(None)`: no match at this position. `Ok(Some((value, next)))`: matched,
/// continue at `next`.
type Step<T> = Result<Option<(T, usize)>, ParseError>;

type Production = fn(&[Token], usize) -> Step<Instruction>;

const PRODUCTIONS: [Production; 3] = [mash_volume, heat, hold_for];

/// Parse the whole token sequence. The result always ends with exactly one
/// [`Instruction::End`].
pub fn parse(tokens: &[Token]) -> Result<Vec<Instruction>, ParseError> {
    let mut program = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        match statement(tokens, pos)? {
            Some((instructions, next)) => {
                program.extend(instructions);
                pos = next;
            }
            None => return Err(unexpected(tokens, pos)),
        }
    }

    program.push(Instruction::End);
    Ok(program)
}

fn statement(tokens: &[Token], pos: usize) -> Step<Vec<Instruction>> {
    let Some(token) = tokens.get(pos) else {
        return Ok(None);
    };

    let keyword = match token.kind {
        TokenKind::Initialize => Some(vec![Instruction::Initialize]),
        // entering a stage waits for the operator before heating starts
        TokenKind::Mashing => Some(vec![Instruction::BeginMashing, Instruction::Pause]),
        TokenKind::Sparging => Some(vec![Instruction::BeginSparging, Instruction::Pause]),
        TokenKind::Pause => Some(vec![Instruction::Pause]),
        _ => None,
    };
    if let Some(instructions) = keyword {
        return Ok(Some((instructions, pos + 1)));
    }

    for production in PRODUCTIONS {
        if let Some((instruction, next)) = production(tokens, pos)? {
            return Ok(Some((vec![instruction], next)));
        }
    }
    Ok(None)
}

fn mash_volume(tokens: &[Token], pos: usize) -> Step<Instruction> {
    if !at(tokens, pos, TokenKind::MashVolume) {
        return Ok(None);
    }
    let (volume, next) = volume(tokens, pos + 1)?;
    Ok(Some((Instruction::SetMashWaterVolume(volume), next)))
}

fn heat(tokens: &[Token], pos: usize) -> Step<Instruction> {
    if !at(tokens, pos, TokenKind::Heat) {
        return Ok(None);
    }
    let (temperature, next) = temperature(tokens, pos + 1)?;
    Ok(Some((Instruction::Heat(temperature), next)))
}

fn hold_for(tokens: &[Token], pos: usize) -> Step<Instruction> {
    if !at(tokens, pos, TokenKind::Hold) {
        return Ok(None);
    }
    let (temperature, next) = temperature(tokens, pos + 1)?;
    let next = expect(tokens, next, TokenKind::For)?;
    let (duration, next) = duration(tokens, next)?;
    Ok(Some((Instruction::HoldFor(temperature, duration), next)))
}

fn volume(tokens: &[Token], pos: usize) -> Result<(Millilitres, usize), ParseError> {
    let (number, token) = number(tokens, pos)?;
    let factor = unit(tokens, pos + 1, |kind| match kind {
        TokenKind::Liters => Some(1000),
        TokenKind::Milliliters => Some(1),
        _ => None,
    })?;
    Ok((number.scale_to_u32(factor, token)?, pos + 2))
}

fn temperature(tokens: &[Token], pos: usize) -> Result<(Celsius, usize), ParseError> {
    let (number, token) = number(tokens, pos)?;
    let scale = unit(tokens, pos + 1, |kind| match kind {
        TokenKind::Celsius => Some(Scale::Celsius),
        TokenKind::Fahrenheit => Some(Scale::Fahrenheit),
        _ => None,
    })?;
    let celsius = scale.to_celsius(number.as_f64()) as f32;
    if !celsius.is_finite() {
        return Err(out_of_range(token));
    }
    Ok((celsius, pos + 2))
}

fn duration(tokens: &[Token], pos: usize) -> Result<(Millis, usize), ParseError> {
    let (number, token) = number(tokens, pos)?;
    let factor = unit(tokens, pos + 1, |kind| match kind {
        TokenKind::Milliseconds => Some(1),
        TokenKind::Seconds => Some(1000),
        TokenKind::Minutes => Some(60 * 1000),
        TokenKind::Hours => Some(60 * 60 * 1000),
        _ => None,
    })?;
    Ok((number.scale_to_u32(factor, token)?, pos + 2))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scale {
    Celsius,
    Fahrenheit,
}

impl Scale {
    fn to_celsius(self, value: f64) -> f64 {
        match self {
            Scale::Celsius => value,
            Scale::Fahrenheit => (value - 32.0) / 1.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(x) => x,
        }
    }

    /// Multiply by `factor` and fit into a `u32`, truncating fractions
    /// toward zero.
    fn scale_to_u32(self, factor: i64, token: &Token) -> Result<u32, ParseError> {
        let scaled = match self {
            Number::Integer(n) => n.checked_mul(factor).and_then(|v| u32::try_from(v).ok()),
            Number::Float(x) => {
                let v = (x * factor as f64).trunc();
                (0.0..=u32::MAX as f64).contains(&v).then_some(v as u32)
            }
        };
        scaled.ok_or_else(|| out_of_range(token))
    }
}

fn number(tokens: &[Token], pos: usize) -> Result<(Number, &Token), ParseError> {
    let token = tokens.get(pos).ok_or(ParseError::UnexpectedEndOfInput)?;
    let number = match token.kind {
        TokenKind::Integer => token
            .lexeme
            .parse()
            .map(Number::Integer)
            .map_err(|_| out_of_range(token))?,
        TokenKind::Float => token
            .lexeme
            .parse()
            .map(Number::Float)
            .map_err(|_| out_of_range(token))?,
        _ => return Err(unexpected(tokens, pos)),
    };
    Ok((number, token))
}

fn unit<U>(tokens: &[Token], pos: usize, pick: impl Fn(TokenKind) -> Option<U>) -> Result<U, ParseError> {
    let token = tokens.get(pos).ok_or(ParseError::UnexpectedEndOfInput)?;
    pick(token.kind).ok_or_else(|| unexpected(tokens, pos))
}

fn expect(tokens: &[Token], pos: usize, kind: TokenKind) -> Result<usize, ParseError> {
    match tokens.get(pos) {
        Some(token) if token.kind == kind => Ok(pos + 1),
        _ => Err(unexpected(tokens, pos)),
    }
}

fn at(tokens: &[Token], pos: usize, kind: TokenKind) -> bool {
    tokens.get(pos).is_some_and(|t| t.kind == kind)
}

fn unexpected(tokens: &[Token], pos: usize) -> ParseError {
    match tokens.get(pos) {
        Some(token) => ParseError::UnexpectedToken {
            line: token.line,
            lexeme: token.lexeme.clone(),
        },
        None => ParseError::UnexpectedEndOfInput,
    }
}

fn out_of_range(token: &Token) -> ParseError {
    ParseError::OutOfRange {
        line: token.line,
        lexeme: token.lexeme.clone(),
    }
}
