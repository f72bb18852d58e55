use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static FORMULA_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[A-Z][a-z]*\d*)+$").expect("formula shape pattern is valid"));

static ELEMENT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]*)(\d*)").expect("element token pattern is valid"));

/// One `Element` + count token of a simplified chemical formula.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementCount {
    pub symbol: String,
    pub count: u32,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum FormulaError {
    #[error("Formula is empty")]
    Empty,

    #[error("Malformed formula '{0}': expected element symbols followed by optional counts")]
    Malformed(String),

    #[error("Atom count overflows in formula '{0}'")]
    CountOverflow(String),
}

/// Splits a simplified formula (`C6H12O6`, `CH3Cl`) into element tokens.
///
/// The grammar is a flat sequence of `[A-Z][a-z]*` symbols each followed by an optional decimal
/// count; parentheses, charges and hydrate dots are not part of it. A missing count means 1.
pub fn parse_formula(formula: &str) -> Result<Vec<ElementCount>, FormulaError> {
    let formula = formula.trim();
    if formula.is_empty() {
        return Err(FormulaError::Empty);
    }
    if !FORMULA_SHAPE.is_match(formula) {
        return Err(FormulaError::Malformed(formula.to_string()));
    }

    ELEMENT_TOKEN
        .captures_iter(formula)
        .map(|caps| {
            let symbol = caps[1].to_string();
            let digits = &caps[2];
            let count = if digits.is_empty() {
                1
            } else {
                digits
                    .parse::<u32>()
                    .map_err(|_| FormulaError::CountOverflow(formula.to_string()))?
            };
            Ok(ElementCount { symbol, count })
        })
        .collect()
}

/// Counts every non-hydrogen atom in `formula`.
///
/// A malformed or empty formula counts as zero heavy atoms; callers treat zero as "no size
/// information" and suppress any ratio that would divide by it.
pub fn count_heavy_atoms(formula: &str) -> u32 {
    match parse_formula(formula) {
        Ok(tokens) => tokens
            .iter()
            .filter(|token| token.symbol != "H")
            .fold(0u32, |sum, token| sum.saturating_add(token.count)),
        Err(_) => 0,
    }
}
