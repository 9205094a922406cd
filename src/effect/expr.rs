//! Effect Expressions
//!
//! Grammar, first match wins, case-insensitive:
//!
//! | text           | result              |
//! |----------------|---------------------|
//! | `max`          | `max`               |
//! | `min`          | `0`                 |
//! | `add:N`, `+N`  | `current + N`       |
//! | `-N`           | `current - N`       |
//! | `multiply:N`   | `current * N`       |
//! | `N`            | `N`                 |
//! | anything else  | `current` unchanged |

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectExpr {
    Max,
    Min,
    Add(f64),
    Multiply(f64),
    Set(f64),
    /// Unparseable; applying it leaves the value unchanged
    Invalid,
}

fn number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

impl EffectExpr {
    pub fn parse(text: &str) -> Self {
        let text = text.trim().to_lowercase();

        if text == "max" {
            return EffectExpr::Max;
        }
        if text == "min" {
            return EffectExpr::Min;
        }

        let parsed = if let Some(rest) = text.strip_prefix("add:") {
            number(rest).map(EffectExpr::Add)
        } else if let Some(rest) = text.strip_prefix('+') {
            number(rest).map(EffectExpr::Add)
        } else if text.starts_with('-') {
            // The sign stays part of the number
            number(&text).map(EffectExpr::Add)
        } else if let Some(rest) = text.strip_prefix("multiply:") {
            number(rest).map(EffectExpr::Multiply)
        } else {
            number(&text).map(EffectExpr::Set)
        };

        parsed.unwrap_or(EffectExpr::Invalid)
    }

    pub fn apply(&self, current: f64, max: f64) -> f64 {
        match *self {
            EffectExpr::Max => max,
            EffectExpr::Min => 0.0,
            EffectExpr::Add(n) => current + n,
            EffectExpr::Multiply(n) => current * n,
            EffectExpr::Set(n) => n,
            EffectExpr::Invalid => current,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, EffectExpr::Invalid)
    }
}

/// Evaluate `expression` against a stat's current and maximum value.
pub fn apply(expression: &str, current: f64, max: f64) -> f64 {
    EffectExpr::parse(expression).apply(current, max)
}

/// Tooltip text for an effect value: `MAX`, signed strings as written,
/// non-negative numbers with a leading `+`.
pub fn format_value(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.eq_ignore_ascii_case("max") {
        return "MAX".to_string();
    }
    if trimmed == "0" || trimmed.starts_with('+') || trimmed.starts_with('-') {
        return trimmed.to_string();
    }
    match number(trimmed) {
        Some(n) if n >= 0.0 => format!("+{}", n),
        Some(n) => n.to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_ignore_current() {
        for current in [-20.0, 0.0, 5.0, 250.0] {
            assert_eq!(apply("max", current, 100.0), 100.0);
            assert_eq!(apply("MIN", current, 100.0), 0.0);
        }
    }

    #[test]
    fn test_relative_forms() {
        assert_eq!(apply("add:10", 5.0, 100.0), 15.0);
        assert_eq!(apply("+10", 5.0, 100.0), 15.0);
        assert_eq!(apply("-10", 5.0, 100.0), -5.0);
        assert_eq!(apply("multiply:2", 5.0, 100.0), 10.0);
        assert_eq!(apply("Multiply:0.5", 8.0, 100.0), 4.0);
    }

    #[test]
    fn test_absolute_and_fallback() {
        assert_eq!(apply("42", 5.0, 100.0), 42.0);
        assert_eq!(apply("garbage", 5.0, 100.0), 5.0);
        assert_eq!(apply("add:lots", 5.0, 100.0), 5.0);
        assert_eq!(apply("", 5.0, 100.0), 5.0);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        assert_eq!(EffectExpr::parse("inf"), EffectExpr::Invalid);
        assert_eq!(EffectExpr::parse("+NaN"), EffectExpr::Invalid);
        assert_eq!(apply("multiply:infinity", 5.0, 100.0), 5.0);
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(EffectExpr::parse(" +2.5 "), EffectExpr::Add(2.5));
        assert_eq!(EffectExpr::parse("-3"), EffectExpr::Add(-3.0));
        assert_eq!(EffectExpr::parse("7"), EffectExpr::Set(7.0));
        assert!(!EffectExpr::parse("x").is_valid());
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value("max"), "MAX");
        assert_eq!(format_value("+10"), "+10");
        assert_eq!(format_value("-5"), "-5");
        assert_eq!(format_value("25"), "+25");
        assert_eq!(format_value("0"), "0");
        assert_eq!(format_value("multiply:2"), "multiply:2");
    }
}
