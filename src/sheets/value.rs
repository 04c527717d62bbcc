use serde_json::Value;
use std::fmt;

// Largest integer a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Numeric content of a single cell.
///
/// Cells come back from the API as text. The text is coerced leniently: anything
/// that is not a number becomes NaN and is written back as such, never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellNumber(f64);

impl CellNumber {
    /// Coerce the first row of a read response.
    ///
    /// A row is rendered the way a script runtime stringifies an array, cells
    /// joined by commas, so a multi-cell row never parses as a number.
    pub fn from_row(row: &[Value]) -> Self {
        let text = row.iter().map(cell_text).collect::<Vec<_>>().join(",");
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Self {
        Self(parse_number(text))
    }

    pub fn incremented(self) -> Self {
        Self(self.0 + 1.0)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// JSON representation for a values update.
    ///
    /// Non-finite numbers have no JSON form and are sent as their text.
    pub fn to_json(self) -> Value {
        let n = self.value();
        if !n.is_finite() {
            return Value::String(self.to_string());
        }
        if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            return Value::from(n as i64);
        }
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(self.to_string()))
    }
}

impl fmt::Display for CellNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n.is_nan() {
            write!(f, "NaN")
        } else if n.is_infinite() {
            write!(f, "{}Infinity", if n < 0.0 { "-" } else { "" })
        } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            write!(f, "{}", n as i64)
        } else if n.abs() < 1e-6 || n.abs() >= 1e21 {
            // Exponent form with an explicit sign, e.g. `1e-7`, `1.5e+21`
            let formatted = format!("{:e}", n);
            match formatted.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    write!(f, "{}e+{}", mantissa, exponent)
                }
                _ => write!(f, "{}", formatted),
            }
        } else {
            write!(f, "{}", n)
        }
    }
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_number(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() {
        return 0.0;
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&text[2..], radix);
    }

    // f64::from_str also accepts "inf" and "nan" spellings; only plain decimal
    // literals count here.
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
    .unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integer_text() {
        let n = CellNumber::from_row(&[json!("41")]);
        assert_eq!(n.incremented().to_json(), json!(42));
    }

    #[test]
    fn test_numeric_cell() {
        let n = CellNumber::from_row(&[json!(9)]);
        assert_eq!(n.incremented().to_json(), json!(10));

        let n = CellNumber::from_row(&[json!(1.5)]);
        assert_eq!(n.incremented().to_json(), json!(2.5));
    }

    #[test]
    fn test_non_numeric_is_nan() {
        let n = CellNumber::from_row(&[json!("abc")]).incremented();
        assert!(n.value().is_nan());
        assert_eq!(n.to_json(), json!("NaN"));
        assert_eq!(n.to_string(), "NaN");
    }

    #[test]
    fn test_rust_only_spellings_are_nan() {
        for text in ["inf", "nan", "infinity", "1_000", "12px"] {
            assert!(CellNumber::parse(text).value().is_nan(), "{} should be NaN", text);
        }
    }

    #[test]
    fn test_blank_is_zero() {
        assert_eq!(CellNumber::from_row(&[]).value(), 0.0);
        assert_eq!(CellNumber::from_row(&[json!("")]).value(), 0.0);
        assert_eq!(CellNumber::from_row(&[json!("   ")]).value(), 0.0);
    }

    #[test]
    fn test_multi_cell_row_is_nan() {
        let n = CellNumber::from_row(&[json!("1"), json!("2")]);
        assert!(n.value().is_nan());
    }

    #[test]
    fn test_whitespace_and_exponent() {
        assert_eq!(CellNumber::parse(" 7 ").value(), 7.0);
        assert_eq!(CellNumber::parse("1e3").value(), 1000.0);
        assert_eq!(CellNumber::parse("-.5").value(), -0.5);
    }

    #[test]
    fn test_radix_prefixes() {
        assert_eq!(CellNumber::parse("0x1F").value(), 31.0);
        assert_eq!(CellNumber::parse("0o17").value(), 15.0);
        assert_eq!(CellNumber::parse("0b101").value(), 5.0);
        assert!(CellNumber::parse("0x").value().is_nan());
        assert!(CellNumber::parse("0b102").value().is_nan());
    }

    #[test]
    fn test_infinity() {
        let n = CellNumber::parse("-Infinity").incremented();
        assert_eq!(n.to_json(), json!("-Infinity"));
        assert_eq!(CellNumber::parse("Infinity").to_string(), "Infinity");
    }

    #[test]
    fn test_text_rendering_of_fractions() {
        assert_eq!(CellNumber::parse("0.5").to_string(), "0.5");
        assert_eq!(CellNumber::parse("0.000001").to_string(), "0.000001");
        assert_eq!(CellNumber::parse("1e-7").to_string(), "1e-7");
        assert_eq!(CellNumber::parse("-2.5e-8").to_string(), "-2.5e-8");
        assert_eq!(CellNumber::parse("1e21").to_string(), "1e+21");
        assert_eq!(
            CellNumber::parse("123456789012345680000").to_string(),
            "123456789012345680000"
        );
    }

    #[test]
    fn test_large_integers_stay_exact() {
        let n = CellNumber::parse("9007199254740990").incremented();
        assert_eq!(n.to_json(), json!(9_007_199_254_740_991_i64));
    }
}
