//! # Ingredient Line Lexer
//!
//! This module splits a raw ingredient line into classified tokens that the
//! line parser consumes. It is a pure function of the input text.
//!
//! ## Features
//!
//! - Integers, decimals, vulgar fractions ("1/2" and glyphs such as ½, ¾)
//!   and mixed numbers ("2 1/2", "2½"), all parsed into exact rationals
//! - Ranges joined by `-` or `–` ("1-2"); worded ranges ("1 to 2") are left
//!   as separate tokens for the parser to assemble
//! - Unit words matched case-insensitively against the unit alias table,
//!   longest-match-first so multi-word aliases ("fluid ounce", "cuillère à
//!   soupe") win over their fragments
//! - Attached units ("500g") are split into a number and a unit token
//! - Unknown tokens default to `Word`

use fraction::Fraction;
use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

use crate::unit_model::{canonical_unit, Unit, MAX_ALIAS_WORDS};

/// A classified token from a raw ingredient line
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// An integer or decimal amount, held as an exact rational
    Number(Fraction),
    /// A vulgar fraction ("1/2", "¾")
    Fraction(Fraction),
    /// A dash-joined range ("1-2")
    Range(Fraction, Fraction),
    /// A recognized unit word; the original spelling is preserved
    UnitWord { unit: Unit, text: String },
    /// Any other word
    Word(String),
    /// Structural punctuation (comma, parentheses, ...)
    Punctuation(char),
}

lazy_static! {
    static ref NUMBER_RE: Regex =
        Regex::new(r"^\d+(?:\.\d+)?$").expect("number pattern should be valid");
    static ref FRACTION_RE: Regex =
        Regex::new(r"^(\d+)\s*/\s*(\d+)$").expect("fraction pattern should be valid");
    static ref RANGE_RE: Regex = Regex::new(r"^(\d+(?:\.\d+)?)[-–—](\d+(?:\.\d+)?)$")
        .expect("range pattern should be valid");
    static ref ATTACHED_UNIT_RE: Regex = Regex::new(r"^(\d+(?:\.\d+)?)([a-zA-Zà-ÿ]+)$")
        .expect("attached unit pattern should be valid");
}

/// Punctuation characters that are emitted as their own tokens
const PUNCTUATION: [char; 5] = [',', '(', ')', ';', ':'];

/// Map a Unicode vulgar-fraction glyph to its exact value
fn vulgar_fraction(c: char) -> Option<Fraction> {
    let (n, d) = match c {
        '½' => (1, 2),
        '⅓' => (1, 3),
        '⅔' => (2, 3),
        '¼' => (1, 4),
        '¾' => (3, 4),
        '⅕' => (1, 5),
        '⅖' => (2, 5),
        '⅗' => (3, 5),
        '⅘' => (4, 5),
        '⅙' => (1, 6),
        '⅚' => (5, 6),
        '⅛' => (1, 8),
        '⅜' => (3, 8),
        '⅝' => (5, 8),
        '⅞' => (7, 8),
        _ => return None,
    };
    Some(Fraction::new(n as u64, d as u64))
}

/// Parse an integer or decimal string into an exact rational.
///
/// "2.5" becomes 5/2, not a float. Returns `None` on overflow or when the
/// fractional part is unreasonably long for a recipe quantity.
fn parse_decimal(text: &str) -> Option<Fraction> {
    match text.split_once('.') {
        None => text.parse::<u64>().ok().map(|n| Fraction::new(n, 1u64)),
        Some((int_part, frac_part)) => {
            if frac_part.is_empty() || frac_part.len() > 9 {
                return None;
            }
            let int: u64 = if int_part.is_empty() {
                0
            } else {
                int_part.parse().ok()?
            };
            let frac: u64 = frac_part.parse().ok()?;
            let denominator = 10u64.checked_pow(frac_part.len() as u32)?;
            let numerator = int.checked_mul(denominator)?.checked_add(frac)?;
            Some(Fraction::new(numerator, denominator))
        }
    }
}

/// Split a line into word pieces and single-character punctuation pieces
fn split_line(line: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for c in line.chars() {
        if c.is_whitespace() {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
        } else if PUNCTUATION.contains(&c) {
            if !current.is_empty() {
                pieces.push(std::mem::take(&mut current));
            }
            pieces.push(c.to_string());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Classify a single piece into one or more tokens
fn classify(piece: &str, tokens: &mut Vec<Token>) {
    if piece.chars().count() == 1 {
        let c = piece.chars().next().unwrap_or(' ');
        if PUNCTUATION.contains(&c) {
            tokens.push(Token::Punctuation(c));
            return;
        }
        if let Some(value) = vulgar_fraction(c) {
            tokens.push(Token::Fraction(value));
            return;
        }
    }

    // "2½" is a mixed number in one piece
    if let Some(last) = piece.chars().last() {
        if let Some(frac) = vulgar_fraction(last) {
            let head: String = piece.chars().take(piece.chars().count() - 1).collect();
            if !head.is_empty() && NUMBER_RE.is_match(&head) {
                if let Some(whole) = parse_decimal(&head) {
                    tokens.push(Token::Number(whole));
                    tokens.push(Token::Fraction(frac));
                    return;
                }
            }
        }
    }

    if let Some(caps) = RANGE_RE.captures(piece) {
        if let (Some(lo), Some(hi)) = (parse_decimal(&caps[1]), parse_decimal(&caps[2])) {
            tokens.push(Token::Range(lo, hi));
            return;
        }
    }

    if let Some(caps) = FRACTION_RE.captures(piece) {
        let numerator = parse_decimal(&caps[1]);
        let denominator: u64 = caps[2].parse().unwrap_or(0);
        if let (Some(n), true) = (numerator, denominator != 0) {
            tokens.push(Token::Fraction(n / Fraction::new(denominator, 1u64)));
            return;
        }
        // malformed fraction, fall through to Word
    }

    if NUMBER_RE.is_match(piece) {
        if let Some(value) = parse_decimal(piece) {
            tokens.push(Token::Number(value));
            return;
        }
    }

    // "500g": number with the unit attached
    if let Some(caps) = ATTACHED_UNIT_RE.captures(piece) {
        if let Some(value) = parse_decimal(&caps[1]) {
            tokens.push(Token::Number(value));
            classify(&caps[2], tokens);
            return;
        }
    }

    tokens.push(Token::Word(piece.to_string()));
}

/// Merge word runs into unit tokens, longest alias first.
///
/// A window of up to [`MAX_ALIAS_WORDS`] consecutive `Word` tokens is joined
/// and looked up in the alias table; the longest match wins, so "fluid
/// ounces" never half-matches as the word "fluid" plus the unit "ounces".
fn merge_unit_words(tokens: Vec<Token>) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut i = 0;

    'outer: while i < tokens.len() {
        if matches!(tokens[i], Token::Word(_)) {
            for window in (1..=MAX_ALIAS_WORDS).rev() {
                if i + window > tokens.len() {
                    continue;
                }
                let words: Option<Vec<&str>> = tokens[i..i + window]
                    .iter()
                    .map(|t| match t {
                        Token::Word(w) => Some(w.as_str()),
                        _ => None,
                    })
                    .collect();
                if let Some(words) = words {
                    let phrase = words.join(" ");
                    if let Some(unit) = canonical_unit(&phrase) {
                        merged.push(Token::UnitWord { unit, text: phrase });
                        i += window;
                        continue 'outer;
                    }
                }
            }
        }
        merged.push(tokens[i].clone());
        i += 1;
    }
    merged
}

/// Tokenize a raw ingredient line.
///
/// Pure function of the input text; no state is read or mutated beyond the
/// immutable unit alias table.
///
/// # Examples
///
/// ```rust
/// use groceries::lexer::{tokenize, Token};
///
/// let tokens = tokenize("2 cups flour");
/// assert_eq!(tokens.len(), 3);
/// assert!(matches!(tokens[0], Token::Number(_)));
/// assert!(matches!(tokens[1], Token::UnitWord { .. }));
/// assert!(matches!(tokens[2], Token::Word(_)));
/// ```
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for piece in split_line(line) {
        classify(&piece, &mut tokens);
    }
    let tokens = merge_unit_words(tokens);
    trace!("Tokenized '{}' into {} tokens", line, tokens.len());
    tokens
}
