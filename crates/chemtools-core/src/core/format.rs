/// Text shown in a result card whenever the inputs cannot produce a valid value.
pub const PLACEHOLDER: &str = "–";

/// Parses a numeric form field.
///
/// Surrounding whitespace is ignored. Empty input, unparsable text and non-finite values
/// (`inf`, `NaN`) all yield `None`, so callers never propagate a `NaN` into a result.
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a count field the way integer form inputs are read: an optional sign followed by
/// leading decimal digits, ignoring whatever follows (`"3 days"` → 3, `"2.5"` → 2).
pub fn parse_count(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i64>().ok().map(|n| sign * n)
}

/// Formats `value` with a fixed number of decimals, or the placeholder when it is not finite.
pub fn fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    let text = format!("{value:.decimals$}");
    // "-0.00" reads as noise in a result card.
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Rounds `value` to `digits` significant digits and prints the shortest representation,
/// dropping trailing zeros (`1.500000` → `1.5`).
pub fn significant(value: f64, digits: u32) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }
    format!("{}", round_significant(value, digits))
}

/// Rounds through the decimal scientific form, so tiny and huge magnitudes keep exactly
/// `digits` significant digits.
pub fn round_significant(value: f64, digits: u32) -> f64 {
    if value == 0.0 || !value.is_finite() || digits == 0 {
        return value;
    }
    let precision = (digits - 1) as usize;
    format!("{value:.precision$e}").parse().unwrap_or(value)
}
