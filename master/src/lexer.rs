//! Recipe tokenizer.
//!
//! Patterns are tried in a fixed order at every position and the first one
//! that matches wins, so the more specific patterns must come first
//! (`mash volume:` has to be seen before `mash`, `3.0` before `3`).
//! Matching is case-insensitive and there are no word boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::LexError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    MashVolume,
    Initialize,
    Mashing,
    Sparging,
    Heat,
    Hold,
    Pause,
    For,
    Float,
    Integer,
    Celsius,
    Fahrenheit,
    Milliliters,
    Liters,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }
}

// Within a pattern the longer spellings come first: alternation is
// leftmost-first, so `c` ahead of `celsius` would stop after one letter.
const PATTERNS: [(&str, TokenKind); 18] = [
    (r"(mash )?(water )?vol(\.|ume)?:?", TokenKind::MashVolume),
    (r"initializ(e|ation):?", TokenKind::Initialize),
    (r"mash(ing)?:?", TokenKind::Mashing),
    (r"sparg(e|ing):?", TokenKind::Sparging),
    (r"heat( to)?:?", TokenKind::Heat),
    (r"hold( at)?:?", TokenKind::Hold),
    (r"wait|pause", TokenKind::Pause),
    (r"for:?", TokenKind::For),
    (r"[-+]?[0-9]+\.[0-9]*", TokenKind::Float),
    (r"[-+]?[0-9]+", TokenKind::Integer),
    (r"((deg\.?|degrees?) )?(celsius|centigrade|c)", TokenKind::Celsius),
    (r"((deg\.?|degrees?) )?(fahrenheit|f)", TokenKind::Fahrenheit),
    (r"ml|milliliters|millilitres", TokenKind::Milliliters),
    (r"liters?|litres?|l", TokenKind::Liters),
    (r"ms|milliseconds?", TokenKind::Milliseconds),
    (r"seconds?|secs?|s", TokenKind::Seconds),
    (r"minutes?|mins?|m", TokenKind::Minutes),
    (r"hours?|h", TokenKind::Hours),
];

static TOKEN_TABLE: Lazy<Vec<(Regex, TokenKind)>> = Lazy::new(|| {
    PATTERNS
        .iter()
        .map(|(pattern, kind)| {
            let anchored = format!(r"\A(?i:{})", pattern);
            (Regex::new(&anchored).expect("token patterns are valid"), *kind)
        })
        .collect()
});

/// Split `text` into tokens, tracking 1-based line numbers.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut rest = text;
    let mut line = 1;

    loop {
        let trimmed = rest.trim_start();
        line += rest[..rest.len() - trimmed.len()].matches('\n').count();
        rest = trimmed;
        if rest.is_empty() {
            break;
        }

        let matched = TOKEN_TABLE
            .iter()
            .find_map(|(regex, kind)| regex.find(rest).map(|m| (*kind, m.end())));

        match matched {
            Some((kind, len)) => {
                tokens.push(Token::new(kind, &rest[..len], line));
                rest = &rest[len..];
            }
            _ => {
                let excerpt = rest.split('\n').next().unwrap_or(rest);
                return Err(LexError {
                    line,
                    excerpt: excerpt.trim_end().to_string(),
                });
            }
        }
    }

    log::debug!("lexed {} tokens over {} lines", tokens.len(), line);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[rstest]
    #[case("mash volume:", TokenKind::MashVolume)]
    #[case("mash water volume:", TokenKind::MashVolume)]
    #[case("Vol.", TokenKind::MashVolume)]
    #[case("initialize:", TokenKind::Initialize)]
    #[case("INITIALIZATION", TokenKind::Initialize)]
    #[case("mashing:", TokenKind::Mashing)]
    #[case("mash", TokenKind::Mashing)]
    #[case("sparge", TokenKind::Sparging)]
    #[case("Sparging:", TokenKind::Sparging)]
    #[case("heat to:", TokenKind::Heat)]
    #[case("hold at:", TokenKind::Hold)]
    #[case("wait", TokenKind::Pause)]
    #[case("PAUSE", TokenKind::Pause)]
    #[case("for:", TokenKind::For)]
    #[case("-3.25", TokenKind::Float)]
    #[case("3.", TokenKind::Float)]
    #[case("+42", TokenKind::Integer)]
    #[case("degrees celsius", TokenKind::Celsius)]
    #[case("centigrade", TokenKind::Celsius)]
    #[case("degrees C", TokenKind::Celsius)]
    #[case("deg. F", TokenKind::Fahrenheit)]
    #[case("fahrenheit", TokenKind::Fahrenheit)]
    #[case("millilitres", TokenKind::Milliliters)]
    #[case("litres", TokenKind::Liters)]
    #[case("L", TokenKind::Liters)]
    #[case("milliseconds", TokenKind::Milliseconds)]
    #[case("secs", TokenKind::Seconds)]
    #[case("min", TokenKind::Minutes)]
    #[case("hours", TokenKind::Hours)]
    fn single_token(#[case] text: &str, #[case] expected: TokenKind) {
        let tokens = tokenize(text).unwrap();
        assert_eq!(tokens.len(), 1, "{text:?} lexed as {tokens:?}");
        assert_eq!(tokens[0].kind, expected);
        assert_eq!(tokens[0].lexeme, text);
    }

    #[test]
    fn mash_volume_wins_over_mashing() {
        assert_eq!(
            kinds("mash volume: 20 L"),
            vec![TokenKind::MashVolume, TokenKind::Integer, TokenKind::Liters]
        );
    }

    #[test]
    fn float_wins_over_integer() {
        let tokens = tokenize("3.0").unwrap();
        assert_eq!(tokens, vec![Token::new(TokenKind::Float, "3.0", 1)]);
    }

    #[test]
    fn milliseconds_wins_over_minutes() {
        assert_eq!(kinds("10 ms"), vec![TokenKind::Integer, TokenKind::Milliseconds]);
        assert_eq!(kinds("10 m"), vec![TokenKind::Integer, TokenKind::Minutes]);
    }

    #[test]
    fn tracks_line_numbers() {
        let tokens = tokenize("initialize:\nmashing:\n\n  heat to: 65 C\n").unwrap();
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 4, 4]);
    }

    #[test]
    fn full_recipe() {
        let text = "initialize:\nmashing:\n  mash volume: 20 L\n  heat to: 65 C\n  hold at: 65 C for: 60 m\nsparging:\n  heat to: 78 C\npause\n";
        assert_eq!(
            kinds(text),
            vec![
                TokenKind::Initialize,
                TokenKind::Mashing,
                TokenKind::MashVolume,
                TokenKind::Integer,
                TokenKind::Liters,
                TokenKind::Heat,
                TokenKind::Integer,
                TokenKind::Celsius,
                TokenKind::Hold,
                TokenKind::Integer,
                TokenKind::Celsius,
                TokenKind::For,
                TokenKind::Integer,
                TokenKind::Minutes,
                TokenKind::Sparging,
                TokenKind::Heat,
                TokenKind::Integer,
                TokenKind::Celsius,
                TokenKind::Pause,
            ]
        );
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").unwrap().is_empty());
        assert!(tokenize(" \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn unknown_text_reports_line_and_excerpt() {
        let err = tokenize("initialize:\n\nzap: 1 bar\nheat to: 65 C").unwrap_err();
        assert_eq!(
            err,
            LexError {
                line: 3,
                excerpt: "zap: 1 bar".to_string()
            }
        );
    }

    #[test]
    fn unknown_text_on_last_line() {
        let err = tokenize("heat to: 65 C ?").unwrap_err();
        assert_eq!(err.line, 1);
        assert_eq!(err.excerpt, "?");
    }
}
