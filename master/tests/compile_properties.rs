use mash_lauter_control::{Instruction, Mnemonic, WireUnit};
use master::{CompileError, LexError, ParseError, Recipe};
use proptest::prelude::*;
use proptest::sample::select;

/// Rebuild instructions from their wire units, the way the device reads them.
fn decode_wire(units: &[WireUnit]) -> Vec<Instruction> {
    let mut units = units.iter();
    let mut program = Vec::new();
    while let Some(unit) = units.next() {
        let mnemonic = unit.mnemonic().expect("instruction starts with a mnemonic");
        let mut operand = || units.next().expect("operand follows mnemonic");
        let instruction = match mnemonic {
            Mnemonic::Ini => Instruction::Initialize,
            Mnemonic::Msh => Instruction::BeginMashing,
            Mnemonic::Spg => Instruction::BeginSparging,
            Mnemonic::Pau => Instruction::Pause,
            Mnemonic::End => Instruction::End,
            Mnemonic::Mwv => Instruction::SetMashWaterVolume(operand().as_u32().unwrap()),
            Mnemonic::Hea => Instruction::Heat(operand().as_f32().unwrap()),
            Mnemonic::Hld => {
                let temperature = operand().as_f32().unwrap();
                Instruction::HoldFor(temperature, operand().as_u32().unwrap())
            }
        };
        program.push(instruction);
    }
    program
}

fn statement() -> impl Strategy<Value = String> {
    let temperature = (-20i32..120, select(vec!["C", "F", "deg. c", "fahrenheit"]))
        .prop_map(|(t, unit)| format!("{} {}", t, unit));
    let fractional = (0u32..1000, select(vec!["C", "F"])).prop_map(|(t, unit)| format!("{}.{} {}", t / 10, t % 10, unit));
    let temperature = prop_oneof![temperature, fractional];
    let duration = (0u32..1000, select(vec!["ms", "s", "secs", "m", "minutes", "h"]))
        .prop_map(|(d, unit)| format!("{} {}", d, unit));
    let volume = (0u32..100_000, select(vec!["ml", "L", "liters"])).prop_map(|(v, unit)| format!("{} {}", v / 1000, unit));

    prop_oneof![
        Just("initialize:".to_string()),
        Just("mashing:".to_string()),
        Just("sparging:".to_string()),
        Just("pause".to_string()),
        volume.prop_map(|v| format!("mash volume: {}", v)),
        temperature.clone().prop_map(|t| format!("heat to: {}", t)),
        (temperature, duration).prop_map(|(t, d)| format!("hold at: {} for: {}", t, d)),
    ]
}

proptest! {
    #[test]
    fn wire_units_round_trip(statements in prop::collection::vec(statement(), 0..20)) {
        let text = statements.join("\n");
        let recipe = Recipe::compile(&text).unwrap();

        let decoded = decode_wire(&recipe.to_wire_units());
        prop_assert_eq!(decoded.len(), recipe.instructions().len());
        for (decoded, compiled) in decoded.iter().zip(recipe.instructions()) {
            match (decoded, compiled) {
                (Instruction::Heat(a), Instruction::Heat(b)) => prop_assert_eq!(a.to_bits(), b.to_bits()),
                (Instruction::HoldFor(a, x), Instruction::HoldFor(b, y)) => {
                    prop_assert_eq!(a.to_bits(), b.to_bits());
                    prop_assert_eq!(x, y);
                }
                _ => prop_assert_eq!(decoded, compiled),
            }
        }
    }

    #[test]
    fn stream_ends_with_a_single_end(statements in prop::collection::vec(statement(), 0..20)) {
        let recipe = Recipe::compile(&statements.join("\n")).unwrap();
        let instructions = recipe.instructions();
        prop_assert_eq!(instructions.last(), Some(&Instruction::End));
        prop_assert_eq!(instructions.iter().filter(|i| **i == Instruction::End).count(), 1);
    }

    #[test]
    fn stages_are_always_followed_by_pause(statements in prop::collection::vec(statement(), 0..20)) {
        let recipe = Recipe::compile(&statements.join("\n")).unwrap();
        for pair in recipe.instructions().windows(2) {
            if matches!(pair[0], Instruction::BeginMashing | Instruction::BeginSparging) {
                prop_assert_eq!(pair[1], Instruction::Pause);
            }
        }
    }

    #[test]
    fn recipe_text_is_case_insensitive(statements in prop::collection::vec(statement(), 0..10)) {
        let text = statements.join("\n");
        let lower = Recipe::compile(&text).unwrap();
        let upper = Recipe::compile(&text.to_uppercase()).unwrap();
        prop_assert_eq!(lower, upper);
    }
}

#[test]
fn fahrenheit_heat() {
    let recipe = Recipe::compile("heat to: 100 F").unwrap();
    match recipe.instructions() {
        [Instruction::Heat(c), Instruction::End] => assert!((c - 37.777_78).abs() < 1e-4, "{c}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn mash_volume_in_litres() {
    let recipe = Recipe::compile("mash volume: 2 L").unwrap();
    assert_eq!(
        recipe.instructions(),
        &[Instruction::SetMashWaterVolume(2000), Instruction::End]
    );
}

#[test]
fn hold_for_an_hour() {
    let recipe = Recipe::compile("hold at: 65 C for: 1 h").unwrap();
    assert_eq!(
        recipe.instructions(),
        &[Instruction::HoldFor(65.0, 3_600_000), Instruction::End]
    );
}

#[test]
fn mashing_alone() {
    let recipe = Recipe::compile("mashing:").unwrap();
    assert_eq!(
        recipe.instructions(),
        &[Instruction::BeginMashing, Instruction::Pause, Instruction::End]
    );
}

#[test]
fn unknown_word_is_a_lex_error_on_its_line() {
    let err = Recipe::compile("initialize:\nmashing:\nfoo: 1 bar").unwrap_err();
    assert!(matches!(err, CompileError::Lex(LexError { line: 3, .. })), "{err:?}");
}

#[test]
fn heat_without_temperature_is_a_parse_error() {
    let err = Recipe::compile("mashing:\nheat to:\npause").unwrap_err();
    assert_eq!(
        err,
        CompileError::Parse(ParseError::UnexpectedToken {
            line: 3,
            lexeme: "pause".to_string()
        })
    );
}
