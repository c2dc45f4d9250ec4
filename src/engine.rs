use crate::coordinates::index_to_column;
use crate::error::Result;
use crate::normalizer::{normalize_metadata, parse_locale_number};
use crate::periods::{resolve_periods, ResolvedPeriods};
use crate::processed::{CategorySeries, ProcessedData, RowSeries};
use crate::schema::{CategoryDefinition, Configuration};
use crate::utils::{field_label, humanize_key};
use crate::workbook::{CellValue, Sheet};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A cell that should have held a number but did not. Its value is recorded as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellParseWarning {
    /// Path of the configured field, e.g. `dataRows.totalRevenue` or
    /// `categories.revenue.productSales.online`.
    pub field: String,
    pub column: String,
    pub row: u32,
    pub raw: String,
    pub reason: String,
}

/// Extraction output together with the non-fatal problems found on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    pub data: ProcessedData,
    pub warnings: Vec<CellParseWarning>,
    /// Field paths of required categories whose row had no numeric value in any period.
    pub empty_required_rows: Vec<String>,
}

pub struct StatementExtractor<'a> {
    configuration: &'a Configuration,
    sheet: &'a Sheet,
    periods: ResolvedPeriods,
    warnings: Vec<CellParseWarning>,
    empty_required_rows: Vec<String>,
}

impl<'a> StatementExtractor<'a> {
    pub fn new(configuration: &'a Configuration, sheet: &'a Sheet) -> Result<Self> {
        let periods = resolve_periods(configuration, sheet)?;
        Ok(Self {
            configuration,
            sheet,
            periods,
            warnings: Vec::new(),
            empty_required_rows: Vec::new(),
        })
    }

    pub fn periods(&self) -> &ResolvedPeriods {
        &self.periods
    }

    /// Reads `row` in every period column. Rows below 1 read as all-null.
    pub fn extract_row(&mut self, field: &str, row: i64, label: String) -> RowSeries {
        let row = match u32::try_from(row).ok().filter(|r| *r >= 1) {
            Some(row) => row,
            None => return RowSeries::from_values(label, vec![None; self.periods.len()]),
        };

        let values = self
            .periods
            .columns
            .clone()
            .into_iter()
            .map(|column| self.numeric_cell(field, column, row))
            .collect();

        RowSeries::from_values(label, values)
    }

    pub fn extract_data_rows(&mut self) -> BTreeMap<String, RowSeries> {
        let mut rows = BTreeMap::new();

        for (key, row) in self.configuration.data_rows() {
            let Some(row) = row.filter(|r| *r >= 1) else {
                continue;
            };
            let series = self.extract_row(&format!("dataRows.{}", key), row, field_label(&key));
            rows.insert(key, series);
        }

        rows
    }

    /// Extracts every configured category and its subcategories. Parent totals come from the
    /// parent's own row only.
    pub fn extract_categories(&mut self) -> BTreeMap<String, BTreeMap<String, CategorySeries>> {
        let configuration = self.configuration;
        let mut sections = BTreeMap::new();

        for (section, categories) in configuration.categories() {
            let mut nodes = BTreeMap::new();
            for (key, definition) in categories {
                let path = format!("categories.{}.{}", section, key);
                nodes.insert(key.clone(), self.extract_category(&path, key, definition));
            }
            sections.insert(section.clone(), nodes);
        }

        sections
    }

    fn extract_category(
        &mut self,
        path: &str,
        key: &str,
        definition: &CategoryDefinition,
    ) -> CategorySeries {
        let own = self.extract_row(path, definition.row, display_label(&definition.label, key));
        self.check_required(path, definition.required, &own);

        let subcategories = definition.subcategories.as_ref().map(|subs| {
            subs.iter()
                .map(|(sub_key, sub)| {
                    let sub_path = format!("{}.{}", path, sub_key);
                    let series =
                        self.extract_row(&sub_path, sub.row, display_label(&sub.label, sub_key));
                    self.check_required(&sub_path, sub.required, &series);
                    (sub_key.clone(), series)
                })
                .collect()
        });

        CategorySeries {
            label: own.label,
            values: own.values,
            total: own.total,
            subcategories,
        }
    }

    pub fn finish(mut self) -> Extraction {
        let data_rows = self.extract_data_rows();
        let categories = self.extract_categories();

        debug!(
            "Extracted {} data rows and {} category sections over {} periods",
            data_rows.len(),
            categories.len(),
            self.periods.len()
        );
        for warning in &self.warnings {
            debug!(
                "Unparseable cell {}{} for {}: '{}' ({})",
                warning.column, warning.row, warning.field, warning.raw, warning.reason
            );
        }

        Extraction {
            data: ProcessedData {
                statement_type: self.configuration.statement_type(),
                periods: self.periods.labels,
                data_rows,
                categories,
                metadata: normalize_metadata(&self.configuration.metadata),
            },
            warnings: self.warnings,
            empty_required_rows: self.empty_required_rows,
        }
    }

    fn check_required(&mut self, path: &str, required: bool, series: &RowSeries) {
        if required && !series.has_data() {
            warn!("Required row '{}' has no numeric values", path);
            self.empty_required_rows.push(path.to_string());
        }
    }

    fn numeric_cell(&mut self, field: &str, column: u32, row: u32) -> Option<f64> {
        let sheet = self.sheet;
        let cell = sheet.cell(column, row);
        let reason = match cell {
            CellValue::Number(n) if n.is_finite() => return Some(*n),
            CellValue::Number(_) => "number is not finite",
            CellValue::Empty => return None,
            CellValue::Text(text) if text.trim().is_empty() => return None,
            CellValue::Text(text) => {
                match parse_locale_number(&self.configuration.metadata.locale, text) {
                    Some(value) => return Some(value),
                    None => "text is not a number",
                }
            }
            CellValue::Date(_) => "date where a number was expected",
            CellValue::Bool(_) => "boolean where a number was expected",
            CellValue::Error(_) => "cell holds a spreadsheet error",
        };

        self.warnings.push(CellParseWarning {
            field: field.to_string(),
            column: index_to_column(column),
            row,
            raw: cell.to_string(),
            reason: reason.to_string(),
        });
        None
    }
}

fn display_label(label: &str, key: &str) -> String {
    let label = label.trim();
    if label.is_empty() {
        humanize_key(key)
    } else {
        label.to_string()
    }
}

/// Runs the row extractor and category aggregator of `configuration` over `sheet`.
pub fn extract_from_sheet(configuration: &Configuration, sheet: &Sheet) -> Result<Extraction> {
    Ok(StatementExtractor::new(configuration, sheet)?.finish())
}
