use chrono::{Datelike, Days, NaiveDate};

/// Fixed English month abbreviations used for every period label.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Serial of 1970-01-01 in the 1900 date system.
pub const UNIX_EPOCH_SERIAL: f64 = 25_569.0;

/// Serial of 9999-12-31, the last date a spreadsheet can hold.
pub const MAX_DATE_SERIAL: f64 = 2_958_465.0;

/// Day zero of the 1900 date system. Using 1899-12-30 instead of 1899-12-31 absorbs the
/// phantom 1900-02-29, so every serial from March 1900 on decodes to the right day.
pub fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Decodes a 1900-system date serial. The fractional (time-of-day) part is ignored.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_DATE_SERIAL).contains(&serial) {
        return None;
    }

    excel_epoch().checked_add_days(Days::new(serial.floor() as u64))
}

pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    if (1..=12).contains(&month) {
        Some(MONTH_ABBREVIATIONS[(month - 1) as usize])
    } else {
        None
    }
}

/// `"Jan 2025"`
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {}", MONTH_ABBREVIATIONS[date.month0() as usize], date.year())
}

/// `"Q3 2024"`
pub fn quarter_label(quarter: u32, year: i32) -> String {
    format!("Q{} {}", quarter, year)
}

/// Display label for a data-row field. Standard statement fields get their accounting name,
/// anything else is humanized from its key.
pub fn field_label(key: &str) -> String {
    let label = match key {
        "totalRevenue" => "Total Revenue",
        "cogs" => "Cost of Goods Sold",
        "totalOpex" => "Total Operating Expenses",
        "netIncome" => "Net Income",
        "grossProfit" => "Gross Profit",
        "grossMargin" => "Gross Margin",
        "ebitda" => "EBITDA",
        "ebitdaMargin" => "EBITDA Margin",
        "earningsBeforeTaxes" => "Earnings Before Taxes",
        _ => return humanize_key(key),
    };
    label.to_string()
}

/// `"totalInflows"` -> `"Total Inflows"`, `"other_expenses"` -> `"Other Expenses"`.
pub fn humanize_key(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in key.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }

        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }

        current.push(c);
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(
            excel_serial_to_date(45658.0),
            NaiveDate::from_ymd_opt(2025, 1, 1)
        );
        assert_eq!(
            excel_serial_to_date(45689.75),
            NaiveDate::from_ymd_opt(2025, 2, 1)
        );
        assert_eq!(
            excel_serial_to_date(UNIX_EPOCH_SERIAL),
            NaiveDate::from_ymd_opt(1970, 1, 1)
        );
        assert_eq!(
            excel_serial_to_date(61.0),
            NaiveDate::from_ymd_opt(1900, 3, 1)
        );

        assert_eq!(excel_serial_to_date(0.0), None);
        assert_eq!(excel_serial_to_date(-4.0), None);
        assert_eq!(excel_serial_to_date(f64::NAN), None);
        assert_eq!(excel_serial_to_date(MAX_DATE_SERIAL + 1.0), None);
    }

    #[test]
    fn test_labels() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap();
        assert_eq!(month_label(date), "Mar 2025");
        assert_eq!(quarter_label(2, 2024), "Q2 2024");
        assert_eq!(month_abbreviation(12), Some("Dec"));
        assert_eq!(month_abbreviation(13), None);
    }

    #[test]
    fn test_field_labels() {
        assert_eq!(field_label("totalRevenue"), "Total Revenue");
        assert_eq!(field_label("cogs"), "Cost of Goods Sold");
        assert_eq!(field_label("monthlyGeneration"), "Monthly Generation");
        assert_eq!(humanize_key("other_expenses"), "Other Expenses");
        assert_eq!(humanize_key("q1Bonus"), "Q1 Bonus");
        assert_eq!(humanize_key(""), "");
    }
}
