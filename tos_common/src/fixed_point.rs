//! Two-decimal fixed-point text handling shared by [`crate::Money`] and [`crate::TaxRate`].
use std::fmt;

/// Parses a decimal string with at most two fractional digits into a count of hundredths.
///
/// `"354"`, `"354.5"` and `"354.00"` are accepted. A leading `-` is allowed; exponents, `+` signs, thousands
/// separators and bare `"."` fragments are not.
pub(crate) fn parse_hundredths(s: &str) -> Result<i64, String> {
    let s = s.trim();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let (whole, frac) = match digits.split_once('.') {
        Some((_, "")) => return Err(format!("'{s}' has a trailing decimal point")),
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() {
        return Err(format!("'{s}' has no whole part"));
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{s}' is not a decimal number"));
    }
    if frac.len() > 2 {
        return Err(format!("'{s}' has more than two decimal places"));
    }
    let whole = whole.parse::<i64>().map_err(|e| format!("'{s}' is out of range. {e}"))?;
    let frac = match frac.len() {
        0 => 0,
        1 => i64::from(frac.as_bytes()[0] - b'0') * 10,
        _ => i64::from(frac.as_bytes()[0] - b'0') * 10 + i64::from(frac.as_bytes()[1] - b'0'),
    };
    let value = whole.checked_mul(100).and_then(|v| v.checked_add(frac)).ok_or_else(|| format!("'{s}' is too large"))?;
    Ok(if negative { -value } else { value })
}

pub(crate) fn fmt_hundredths(value: i64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
}
