//! Atom selection expressions for the molecule viewer.
//!
//! A selection is a list of `key:value` clauses separated by `;`. A clause may carry several
//! values separated by commas (`resi:19,23`), and a comma-separated token that contains a `:`
//! starts a new clause, so `resi:19,chain:B` is read as two clauses. Only whitelisted keys are
//! accepted, and every value is validated against the key's type.

use phf::{Map, phf_map};
use serde_json::{Map as JsonMap, Value};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    /// Integers and inclusive integer ranges (`10-20`).
    Integer,
    /// Free text, quoted or bare.
    Text,
    Flag,
}

static SELECTION_KEYS: Map<&'static str, ValueKind> = phf_map! {
    "resi" => ValueKind::Integer,
    "serial" => ValueKind::Integer,
    "model" => ValueKind::Integer,
    "resn" => ValueKind::Text,
    "chain" => ValueKind::Text,
    "elem" => ValueKind::Text,
    "atom" => ValueKind::Text,
    "ss" => ValueKind::Text,
    "hetflag" => ValueKind::Flag,
    "invert" => ValueKind::Flag,
    "byres" => ValueKind::Flag,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionValue {
    Integer(i64),
    Range(i64, i64),
    Text(String),
    Flag(bool),
}

impl fmt::Display for SelectionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Range(a, b) => write!(f, "{a}-{b}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Flag(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionClause {
    pub key: String,
    pub values: Vec<SelectionValue>,
}

/// A parsed, validated selection expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AtomSelection {
    pub clauses: Vec<SelectionClause>,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SelectionError {
    #[error("Clause '{0}' is missing a ':' between key and value")]
    MissingSeparator(String),

    #[error("Unknown selection key '{0}'")]
    UnknownKey(String),

    #[error("Selection key '{0}' appears more than once")]
    DuplicateKey(String),

    #[error("Selection key '{0}' has no value")]
    EmptyValue(String),

    #[error("Invalid value '{value}' for selection key '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

impl AtomSelection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[SelectionValue]> {
        self.clauses
            .iter()
            .find(|clause| clause.key == key)
            .map(|clause| clause.values.as_slice())
    }

    /// The selection as the JSON object a viewer library consumes.
    ///
    /// Single values map to scalars, multiple values to arrays, and ranges to `"a-b"` strings.
    pub fn to_json(&self) -> Value {
        let mut object = JsonMap::new();
        for clause in &self.clauses {
            let mut values: Vec<Value> = clause.values.iter().map(value_to_json).collect();
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            object.insert(clause.key.clone(), value);
        }
        Value::Object(object)
    }
}

fn value_to_json(value: &SelectionValue) -> Value {
    match value {
        SelectionValue::Integer(n) => Value::from(*n),
        SelectionValue::Range(a, b) => Value::from(format!("{a}-{b}")),
        SelectionValue::Text(s) => Value::from(s.clone()),
        SelectionValue::Flag(b) => Value::from(*b),
    }
}

impl fmt::Display for AtomSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .clauses
            .iter()
            .map(|clause| {
                let values: Vec<String> = clause.values.iter().map(ToString::to_string).collect();
                format!("{}:{}", clause.key, values.join(","))
            })
            .collect();
        f.write_str(&rendered.join(";"))
    }
}

/// Parses a selection expression such as `resi:19,23;chain:'B'`.
///
/// An empty (or whitespace-only) expression selects everything.
pub fn parse_selection(expr: &str) -> Result<AtomSelection, SelectionError> {
    let mut clauses: Vec<SelectionClause> = Vec::new();

    for segment in split_outside_quotes(expr, ';') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let mut current: Option<(String, Vec<String>)> = None;
        for token in split_outside_quotes(segment, ',') {
            let token = token.trim();
            if let Some((key, value)) = split_key_value(token) {
                if let Some((key, raw)) = current.take() {
                    let clause = build_clause(key, raw, &clauses)?;
                    clauses.push(clause);
                }
                current = Some((key.to_string(), vec![value.to_string()]));
            } else if let Some((_, raw)) = current.as_mut() {
                raw.push(token.to_string());
            } else {
                return Err(SelectionError::MissingSeparator(segment.to_string()));
            }
        }
        if let Some((key, raw)) = current.take() {
            let clause = build_clause(key, raw, &clauses)?;
            clauses.push(clause);
        }
    }

    Ok(AtomSelection { clauses })
}

/// Splits on `separator` wherever it lies outside quotes. An unterminated quote runs to the end.
fn split_outside_quotes(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, ch) in input.char_indices() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), c) if c == open => quote = None,
            (None, c) if c == separator => {
                parts.push(&input[start..index]);
                start = index + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Splits `key:value` on the first colon that lies outside quotes.
fn split_key_value(token: &str) -> Option<(&str, &str)> {
    let mut quote: Option<char> = None;
    for (index, ch) in token.char_indices() {
        match (quote, ch) {
            (None, '\'' | '"') => quote = Some(ch),
            (Some(open), c) if c == open => quote = None,
            (None, ':') => return Some((token[..index].trim(), token[index + 1..].trim())),
            _ => {}
        }
    }
    None
}

fn build_clause(
    key: String,
    raw_values: Vec<String>,
    existing: &[SelectionClause],
) -> Result<SelectionClause, SelectionError> {
    let kind = *SELECTION_KEYS
        .get(key.as_str())
        .ok_or_else(|| SelectionError::UnknownKey(key.clone()))?;
    if existing.iter().any(|clause| clause.key == key) {
        return Err(SelectionError::DuplicateKey(key));
    }

    let mut values = Vec::with_capacity(raw_values.len());
    for raw in raw_values {
        if raw.is_empty() {
            return Err(SelectionError::EmptyValue(key));
        }
        values.push(parse_value(&key, kind, &raw)?);
    }
    Ok(SelectionClause { key, values })
}

fn parse_value(key: &str, kind: ValueKind, raw: &str) -> Result<SelectionValue, SelectionError> {
    let invalid = |reason| SelectionError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        reason,
    };

    match kind {
        ValueKind::Integer => {
            if let Ok(n) = raw.parse::<i64>() {
                return Ok(SelectionValue::Integer(n));
            }
            // A leading '-' belongs to a negative start, so split on the next dash.
            let split_at = raw
                .char_indices()
                .skip(1)
                .find(|(_, c)| *c == '-')
                .map(|(i, _)| i)
                .ok_or_else(|| invalid("expected an integer or a range like 10-20"))?;
            let start = raw[..split_at]
                .trim()
                .parse::<i64>()
                .map_err(|_| invalid("range start is not an integer"))?;
            let end = raw[split_at + 1..]
                .trim()
                .parse::<i64>()
                .map_err(|_| invalid("range end is not an integer"))?;
            if start > end {
                return Err(invalid("range start is greater than its end"));
            }
            Ok(SelectionValue::Range(start, end))
        }
        ValueKind::Text => {
            let text = unquote(raw).ok_or_else(|| invalid("unterminated quote"))?;
            if text.is_empty() {
                return Err(SelectionError::EmptyValue(key.to_string()));
            }
            Ok(SelectionValue::Text(text.to_string()))
        }
        ValueKind::Flag => match raw {
            "true" => Ok(SelectionValue::Flag(true)),
            "false" => Ok(SelectionValue::Flag(false)),
            _ => Err(invalid("expected true or false")),
        },
    }
}

fn unquote(raw: &str) -> Option<&str> {
    let first = raw.chars().next()?;
    if first == '\'' || first == '"' {
        if raw.len() >= 2 && raw.ends_with(first) {
            Some(&raw[1..raw.len() - 1])
        } else {
            None
        }
    } else {
        Some(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_placeholder_example() {
        let sel = parse_selection("resi:19,23;chain:'B'").unwrap();
        assert_eq!(
            sel.get("resi"),
            Some(&[SelectionValue::Integer(19), SelectionValue::Integer(23)][..])
        );
        assert_eq!(
            sel.get("chain"),
            Some(&[SelectionValue::Text("B".to_string())][..])
        );
    }

    #[test]
    fn comma_token_with_colon_starts_new_clause() {
        let sel = parse_selection("resi:10-20, chain:A").unwrap();
        assert_eq!(sel.clauses.len(), 2);
        assert_eq!(sel.get("resi"), Some(&[SelectionValue::Range(10, 20)][..]));
    }

    #[test]
    fn negative_numbers_and_ranges() {
        let sel = parse_selection("resi:-5--1").unwrap();
        assert_eq!(sel.get("resi"), Some(&[SelectionValue::Range(-5, -1)][..]));
        let sel = parse_selection("resi:-3").unwrap();
        assert_eq!(sel.get("resi"), Some(&[SelectionValue::Integer(-3)][..]));
    }

    #[test]
    fn flags_and_quoted_text() {
        let sel = parse_selection("hetflag:true;resn:\"HOH\"").unwrap();
        assert_eq!(sel.get("hetflag"), Some(&[SelectionValue::Flag(true)][..]));
        assert_eq!(
            sel.get("resn"),
            Some(&[SelectionValue::Text("HOH".to_string())][..])
        );
    }

    #[test]
    fn quoted_colon_is_not_a_separator() {
        let sel = parse_selection("atom:'C:1'").unwrap();
        assert_eq!(
            sel.get("atom"),
            Some(&[SelectionValue::Text("C:1".to_string())][..])
        );
    }

    #[test]
    fn quoted_separators_stay_inside_the_value() {
        let sel = parse_selection("atom:'C;1';resn:\"A,B\",HOH").unwrap();
        assert_eq!(
            sel.get("atom"),
            Some(&[SelectionValue::Text("C;1".to_string())][..])
        );
        assert_eq!(
            sel.get("resn"),
            Some(
                &[
                    SelectionValue::Text("A,B".to_string()),
                    SelectionValue::Text("HOH".to_string())
                ][..]
            )
        );
        assert!(matches!(
            parse_selection("atom:'C;1"),
            Err(SelectionError::InvalidValue { reason: "unterminated quote", .. })
        ));
    }

    #[test]
    fn empty_expression_selects_everything() {
        assert_eq!(parse_selection("  ").unwrap(), AtomSelection::all());
        assert_eq!(parse_selection(";;").unwrap(), AtomSelection::all());
    }

    #[test]
    fn rejects_code_and_unknown_keys() {
        assert_eq!(
            parse_selection("alert(1)"),
            Err(SelectionError::MissingSeparator("alert(1)".to_string()))
        );
        assert_eq!(
            parse_selection("constructor:1"),
            Err(SelectionError::UnknownKey("constructor".to_string()))
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            parse_selection("resi:abc"),
            Err(SelectionError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_selection("resi:20-10"),
            Err(SelectionError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_selection("hetflag:yes"),
            Err(SelectionError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_selection("chain:'B"),
            Err(SelectionError::InvalidValue { .. })
        ));
        assert_eq!(
            parse_selection("chain:"),
            Err(SelectionError::EmptyValue("chain".to_string()))
        );
        assert_eq!(
            parse_selection("chain:A;chain:B"),
            Err(SelectionError::DuplicateKey("chain".to_string()))
        );
    }

    #[test]
    fn converts_to_viewer_json() {
        let sel = parse_selection("resi:19,23;chain:B;hetflag:false").unwrap();
        assert_eq!(
            sel.to_json(),
            json!({ "resi": [19, 23], "chain": "B", "hetflag": false })
        );
    }

    #[test]
    fn display_round_trips_through_parser() {
        let sel = parse_selection("resi:1-4,9;chain:'A'").unwrap();
        assert_eq!(sel.to_string(), "resi:1-4,9;chain:'A'");
        assert_eq!(parse_selection(&sel.to_string()).unwrap(), sel);
    }
}
