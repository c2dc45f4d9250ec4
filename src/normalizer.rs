//! Unit and currency handling.
//!
//! Extracted numbers are never rescaled here: units and currency travel as metadata next to the
//! raw values, and presentation code decides how to display them. The only transformation this
//! module performs is turning formatted text such as `"$1.250,00"` into a number.

use crate::processed::OutputMetadata;
use crate::schema::{ConfigurationMetadata, Units};

const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', 'R'];

impl Units {
    pub fn divisor(&self) -> f64 {
        match self {
            Units::Normal => 1.0,
            Units::Thousands => 1_000.0,
            Units::Millions => 1_000_000.0,
        }
    }

    /// Value as it should be displayed under these units.
    pub fn scale(&self, value: f64) -> f64 {
        value / self.divisor()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Normal => "normal",
            Units::Thousands => "thousands",
            Units::Millions => "millions",
        }
    }
}

/// Copies the display metadata of a configuration onto extraction output.
pub fn normalize_metadata(metadata: &ConfigurationMetadata) -> OutputMetadata {
    OutputMetadata {
        currency: metadata.currency.clone(),
        units: metadata.units,
        locale: metadata.locale.clone(),
    }
}

/// Spanish locales write `1.234.567,89`; everything else writes `1,234,567.89`.
pub fn uses_decimal_comma(locale: &str) -> bool {
    let locale = locale.trim().to_ascii_lowercase();
    locale == "es" || locale.starts_with("es-") || locale.starts_with("es_")
}

/// Parses a formatted numeric string according to `locale`.
///
/// Currency symbols, whitespace and a trailing `%` are dropped. Accounting parentheses and a
/// leading or trailing minus make the value negative. Returns `None` for anything that is not
/// a finite number once cleaned.
pub fn parse_locale_number(locale: &str, raw: &str) -> Option<f64> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !c.is_whitespace())
        .collect();

    if let Some(stripped) = cleaned.strip_suffix('%') {
        cleaned = stripped.to_string();
    }

    let mut negative = false;
    if cleaned.starts_with('(') && cleaned.ends_with(')') && cleaned.len() > 2 {
        negative = true;
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }
    if let Some(stripped) = cleaned.strip_prefix('-') {
        negative = !negative;
        cleaned = stripped.to_string();
    } else if let Some(stripped) = cleaned.strip_suffix('-') {
        negative = !negative;
        cleaned = stripped.to_string();
    }
    if let Some(stripped) = cleaned.strip_prefix('+') {
        cleaned = stripped.to_string();
    }

    let canonical: String = if uses_decimal_comma(locale) {
        cleaned
            .chars()
            .filter(|c| *c != '.')
            .map(|c| if c == ',' { '.' } else { c })
            .collect()
    } else {
        cleaned.chars().filter(|c| *c != ',').collect()
    };

    let digits = canonical.chars().filter(|c| c.is_ascii_digit()).count();
    let points = canonical.chars().filter(|c| *c == '.').count();
    if digits == 0 || points > 1 || digits + points != canonical.len() {
        return None;
    }

    let value: f64 = canonical.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_spanish_locale() {
        assert_eq!(parse_locale_number("es", "1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_locale_number("es-MX", "$1.250,00"), Some(1250.0));
        assert_eq!(parse_locale_number("es-AR", "-3.500"), Some(-3500.0));
        assert_eq!(parse_locale_number("es_CL", "(1.234,50)"), Some(-1234.5));
    }

    #[test]
    fn test_parse_default_locale() {
        assert_eq!(parse_locale_number("en", "1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_locale_number("en-US", "$ 1,250.00"), Some(1250.0));
        assert_eq!(parse_locale_number("pt-BR", "R$1,000"), Some(1000.0));
        assert_eq!(parse_locale_number("en-GB", "£2,000.5"), Some(2000.5));
        assert_eq!(parse_locale_number("en", "500-"), Some(-500.0));
        assert_eq!(parse_locale_number("en", "41.2%"), Some(41.2));
        assert_eq!(parse_locale_number("en", "+12"), Some(12.0));
    }

    #[test]
    fn test_unparseable_strings_yield_none() {
        assert_eq!(parse_locale_number("en", ""), None);
        assert_eq!(parse_locale_number("en", "   "), None);
        assert_eq!(parse_locale_number("en", "n/a"), None);
        assert_eq!(parse_locale_number("en", "Revenue"), None);
        assert_eq!(parse_locale_number("en", "1.2.3"), None);
        assert_eq!(parse_locale_number("en", "$"), None);
        assert_eq!(parse_locale_number("en", "inf"), None);
        assert_eq!(parse_locale_number("en", "()"), None);
    }

    #[test]
    fn test_units_scaling() {
        assert_eq!(Units::Normal.scale(1500.0), 1500.0);
        assert_eq!(Units::Thousands.scale(1500.0), 1.5);
        assert_eq!(Units::Millions.scale(2_500_000.0), 2.5);
        assert_eq!(Units::Thousands.as_str(), "thousands");
    }

    #[test]
    fn test_normalize_metadata_is_passthrough() {
        let metadata = ConfigurationMetadata {
            currency: "ARS".to_string(),
            locale: "es-AR".to_string(),
            units: Units::Millions,
            fiscal_year_start: Some(7),
            date_format: None,
        };

        let output = normalize_metadata(&metadata);
        assert_eq!(output.currency, "ARS");
        assert_eq!(output.locale, "es-AR");
        assert_eq!(output.units, Units::Millions);
    }
}
