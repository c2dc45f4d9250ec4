use crate::coordinates::{column_to_index, index_to_column, CellRange};
use crate::error::{ExtractionError, Result};
use crate::schema::{Configuration, PeriodDefinition, PeriodMappingEntry, PeriodType};
use crate::utils::{excel_serial_to_date, month_abbreviation, month_label, quarter_label};
use crate::workbook::{CellValue, Sheet};
use log::{debug, warn};

/// Period labels and the sheet columns they were read from. Both vectors have the same length
/// and every extractor reads exactly these columns, in this order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedPeriods {
    pub labels: Vec<String>,
    /// 0-based column indexes.
    pub columns: Vec<u32>,
}

impl ResolvedPeriods {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn column_letters(&self) -> Vec<String> {
        self.columns.iter().map(|c| index_to_column(*c)).collect()
    }

    fn push(&mut self, column: u32, label: String) {
        self.columns.push(column);
        self.labels.push(label);
    }
}

/// Resolves the period columns of `configuration` against `sheet`.
///
/// A non-empty `periodMapping` is authoritative and the periods row is not read at all.
/// Otherwise each column of `periodsRange` is read on `periodsRow` and kept only if it holds a
/// date or a non-empty label. Zero periods is a configuration error.
pub fn resolve_periods(configuration: &Configuration, sheet: &Sheet) -> Result<ResolvedPeriods> {
    let periods = match configuration.period_mapping() {
        Some(mapping) => periods_from_mapping(mapping),
        None => periods_from_sheet(
            sheet,
            configuration.periods_row(),
            configuration.periods_range(),
        )?,
    };

    if periods.is_empty() {
        return Err(ExtractionError::ConfigurationError(format!(
            "No valid periods found (periods row {}, range '{}')",
            configuration.periods_row(),
            configuration.periods_range()
        )));
    }

    debug!(
        "Resolved {} periods from columns {:?}",
        periods.len(),
        periods.column_letters()
    );

    Ok(periods)
}

pub fn periods_from_mapping(mapping: &[PeriodMappingEntry]) -> ResolvedPeriods {
    let mut entries: Vec<(u32, String)> = Vec::with_capacity(mapping.len());

    for entry in mapping {
        match column_to_index(&entry.column) {
            Ok(column) => entries.push((column, period_label(&entry.period))),
            Err(e) => warn!("Ignoring period mapping entry: {}", e),
        }
    }

    entries.sort_by_key(|(column, _)| *column);
    entries.dedup_by_key(|(column, _)| *column);

    let mut periods = ResolvedPeriods::default();
    for (column, label) in entries {
        periods.push(column, label);
    }
    periods
}

pub fn periods_from_sheet(
    sheet: &Sheet,
    periods_row: i64,
    periods_range: &str,
) -> Result<ResolvedPeriods> {
    let range = CellRange::parse(periods_range)?;
    let row = u32::try_from(periods_row)
        .ok()
        .filter(|r| *r >= 1)
        .ok_or_else(|| {
            ExtractionError::ConfigurationError(format!(
                "Periods row {} must be a positive integer",
                periods_row
            ))
        })?;

    let mut periods = ResolvedPeriods::default();
    for column in range.columns() {
        match header_label(sheet.cell(column, row)) {
            Some(label) => periods.push(column, label),
            None => debug!(
                "Dropping column {} from periods: no date or label in row {}",
                index_to_column(column),
                row
            ),
        }
    }

    Ok(periods)
}

/// Period label for a header cell, or `None` when the cell neither holds a date nor text.
pub fn header_label(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Number(serial) => excel_serial_to_date(*serial).map(month_label),
        CellValue::Date(datetime) => Some(month_label(datetime.date())),
        CellValue::Text(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        CellValue::Empty | CellValue::Bool(_) | CellValue::Error(_) => None,
    }
}

/// Display label of an explicitly mapped period. A non-blank `label` wins over everything else.
pub fn period_label(period: &PeriodDefinition) -> String {
    if let Some(label) = period.label.as_deref().map(str::trim) {
        if !label.is_empty() {
            return label.to_string();
        }
    }

    match period.period_type {
        PeriodType::Month => match period.month.and_then(month_abbreviation) {
            Some(month) => format!("{} {}", month, period.year),
            None => period.year.to_string(),
        },
        PeriodType::Quarter => match period.quarter.filter(|q| (1..=4).contains(q)) {
            Some(quarter) => quarter_label(quarter, period.year),
            None => period.year.to_string(),
        },
        PeriodType::Year => period.year.to_string(),
        PeriodType::Custom => period
            .custom_value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| period.year.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::CellAddress;
    use chrono::NaiveDate;

    fn definition(period_type: PeriodType, year: i32) -> PeriodDefinition {
        PeriodDefinition {
            period_type,
            year,
            month: None,
            quarter: None,
            label: None,
            custom_value: None,
        }
    }

    fn entry(column: &str, period: PeriodDefinition) -> PeriodMappingEntry {
        PeriodMappingEntry {
            column: column.to_string(),
            period,
        }
    }

    #[test]
    fn test_date_serial_headers() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set(CellAddress::new(1, 8), CellValue::Number(45658.0));
        sheet.set(CellAddress::new(2, 8), CellValue::Number(45689.0));
        sheet.set(CellAddress::new(3, 8), CellValue::Number(45717.0));

        let periods = periods_from_sheet(&sheet, 8, "B8:D8").unwrap();
        assert_eq!(periods.labels, vec!["Jan 2025", "Feb 2025", "Mar 2025"]);
        assert_eq!(periods.columns, vec![1, 2, 3]);
    }

    #[test]
    fn test_unusable_columns_are_dropped() {
        let mut sheet = Sheet::new("Sheet1");
        sheet.set(CellAddress::new(1, 1), CellValue::Text("  Ene-24 ".to_string()));
        sheet.set(CellAddress::new(2, 1), CellValue::Text("   ".to_string()));
        sheet.set(CellAddress::new(3, 1), CellValue::Bool(true));
        sheet.set(
            CellAddress::new(5, 1),
            CellValue::Date(
                NaiveDate::from_ymd_opt(2024, 3, 31)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            ),
        );
        sheet.set(CellAddress::new(6, 1), CellValue::Number(-3.0));

        let periods = periods_from_sheet(&sheet, 1, "B1:G1").unwrap();
        assert_eq!(periods.labels, vec!["Ene-24", "Mar 2024"]);
        assert_eq!(periods.column_letters(), vec!["B", "F"]);
    }

    #[test]
    fn test_mapping_is_sorted_by_column() {
        let mut march = definition(PeriodType::Month, 2025);
        march.month = Some(3);
        let mut q1 = definition(PeriodType::Quarter, 2025);
        q1.quarter = Some(1);
        let mut labelled = definition(PeriodType::Month, 2025);
        labelled.label = Some("Budget Jan".to_string());

        let periods = periods_from_mapping(&[
            entry("AA", q1),
            entry("C", march),
            entry("B", labelled),
            entry("1B", definition(PeriodType::Year, 2025)),
        ]);

        assert_eq!(periods.labels, vec!["Budget Jan", "Mar 2025", "Q1 2025"]);
        assert_eq!(periods.column_letters(), vec!["B", "C", "AA"]);
    }

    #[test]
    fn test_period_label_synthesis() {
        assert_eq!(period_label(&definition(PeriodType::Year, 2024)), "2024");

        let mut custom = definition(PeriodType::Custom, 2024);
        assert_eq!(period_label(&custom), "2024");
        custom.custom_value = Some("H1 2024".to_string());
        assert_eq!(period_label(&custom), "H1 2024");

        let mut bad_month = definition(PeriodType::Month, 2024);
        bad_month.month = Some(13);
        assert_eq!(period_label(&bad_month), "2024");

        let mut blank_label = definition(PeriodType::Quarter, 2024);
        blank_label.quarter = Some(4);
        blank_label.label = Some("  ".to_string());
        assert_eq!(period_label(&blank_label), "Q4 2024");
    }

    #[test]
    fn test_invalid_periods_row() {
        let sheet = Sheet::new("Sheet1");
        let result = periods_from_sheet(&sheet, 0, "B1:D1");
        assert!(matches!(result, Err(ExtractionError::ConfigurationError(_))));

        let result = periods_from_sheet(&sheet, 1, "B1-D1");
        assert!(matches!(result, Err(ExtractionError::InvalidCellReference(_))));
    }
}
