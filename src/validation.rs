use crate::coordinates::{column_to_index, is_valid_range, CellRange};
use crate::schema::Configuration;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    pub total_fields: usize,
    pub mapped_fields: usize,
    pub required_fields: usize,
    pub categories_count: usize,
}

/// Errors block extraction; warnings describe a configuration that works but looks suspicious.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub summary: ValidationSummary,
}

/// A data row, category or subcategory claiming a spreadsheet row.
struct RowAssignment {
    path: String,
    /// Set for subcategories: the path of the category they belong to.
    parent: Option<String>,
}

pub struct ConfigurationValidator<'a> {
    configuration: &'a Configuration,
    errors: Vec<String>,
    warnings: Vec<String>,
    assignments: BTreeMap<i64, Vec<RowAssignment>>,
}

impl<'a> ConfigurationValidator<'a> {
    pub fn new(configuration: &'a Configuration) -> Self {
        Self {
            configuration,
            errors: Vec::new(),
            warnings: Vec::new(),
            assignments: BTreeMap::new(),
        }
    }

    pub fn validate(mut self) -> ValidationResult {
        self.check_identity();
        self.check_periods();
        let (total_fields, mapped_fields) = self.check_data_rows();
        let categories_count = self.check_categories();
        self.check_duplicate_rows();

        let required_fields = self.configuration.statement_type().required_fields().len();

        if categories_count == 0 {
            self.warnings.push(
                "No categories configured; detailed breakdowns will not be available".to_string(),
            );
        }

        if total_fields > 0 && mapped_fields * 2 < total_fields {
            self.warnings.push(format!(
                "Only {} of {} fields are mapped (less than 50%)",
                mapped_fields, total_fields
            ));
        }

        debug!(
            "Validated configuration '{}': {} errors, {} warnings",
            self.configuration.name,
            self.errors.len(),
            self.warnings.len()
        );

        ValidationResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            summary: ValidationSummary {
                total_fields,
                mapped_fields,
                required_fields,
                categories_count,
            },
        }
    }

    fn check_identity(&mut self) {
        if self.configuration.name.trim().is_empty() {
            self.errors.push("Configuration name is required".to_string());
        }

        if let Some(month) = self.configuration.metadata.fiscal_year_start {
            if !(1..=12).contains(&month) {
                self.errors.push(format!(
                    "fiscalYearStart must be a month between 1 and 12 (got {})",
                    month
                ));
            }
        }
    }

    fn check_periods(&mut self) {
        let configuration = self.configuration;
        let periods_range = configuration.periods_range();

        let periods_row = match u32::try_from(configuration.periods_row()) {
            Ok(row) if row >= 1 => Some(row),
            _ => {
                self.errors.push(format!(
                    "periodsRow must be between 1 and {} (got {})",
                    u32::MAX,
                    configuration.periods_row()
                ));
                None
            }
        };

        if !is_valid_range(periods_range) {
            self.errors.push(format!(
                "periodsRange '{}' must have the form 'B8:M8'",
                periods_range
            ));
        } else {
            match CellRange::parse(periods_range) {
                Ok(range) => {
                    if let Some(row) = periods_row.filter(|r| !range.contains_row(*r)) {
                        self.warnings.push(format!(
                            "periodsRange '{}' does not include periodsRow {}",
                            periods_range, row
                        ));
                    }
                }
                Err(e) => self.errors.push(format!("periodsRange is invalid: {}", e)),
            }
        }

        if let Some(mapping) = configuration.period_mapping() {
            for (idx, entry) in mapping.iter().enumerate() {
                if column_to_index(&entry.column).is_err() {
                    self.errors.push(format!(
                        "periodMapping entry #{} has invalid column '{}'",
                        idx, entry.column
                    ));
                }
            }
        }
    }

    /// Returns `(total_fields, mapped_fields)`.
    fn check_data_rows(&mut self) -> (usize, usize) {
        let statement_type = self.configuration.statement_type();
        let required = statement_type.required_fields();
        let rows = self.configuration.data_rows();
        let mut mapped = 0;

        for (field, row) in &rows {
            let is_required = required.contains(&field.as_str());
            match row {
                Some(row) if *row >= 1 => {
                    mapped += 1;
                    self.assign(*row, format!("dataRows.{}", field), None);
                }
                Some(row) if !is_required => self.warnings.push(format!(
                    "Field '{}' has invalid row {} and will be ignored",
                    field, row
                )),
                _ if is_required => self.errors.push(format!(
                    "Required field '{}' must be mapped to a row >= 1 for {} configurations",
                    field, statement_type
                )),
                _ => {}
            }
        }

        (rows.len(), mapped)
    }

    /// Returns the number of category entries across all sections.
    fn check_categories(&mut self) -> usize {
        let configuration = self.configuration;
        let statement_type = configuration.statement_type();
        let standard = statement_type.category_sections();
        let mut count = 0;

        for (section, categories) in configuration.categories() {
            if !standard.contains(&section.as_str()) {
                self.warnings.push(format!(
                    "Category section '{}' is not standard for {} statements",
                    section, statement_type
                ));
            }

            for (key, category) in categories {
                count += 1;
                let path = format!("categories.{}.{}", section, key);
                self.check_category_row(&path, category.row, None);

                for (sub_key, sub) in category.subcategories.iter().flatten() {
                    let sub_path = format!("{}.{}", path, sub_key);
                    self.check_category_row(&sub_path, sub.row, Some(path.as_str()));
                }
            }
        }

        count
    }

    fn check_category_row(&mut self, path: &str, row: i64, parent: Option<&str>) {
        if row < 1 {
            self.errors.push(format!(
                "Category '{}' must be mapped to a row of at least 1 (got {})",
                path, row
            ));
            return;
        }

        self.assign(row, path.to_string(), parent.map(str::to_string));
    }

    fn assign(&mut self, row: i64, path: String, parent: Option<String>) {
        self.assignments
            .entry(row)
            .or_default()
            .push(RowAssignment { path, parent });
    }

    /// Warns once per spreadsheet row claimed by more than one data row or category. A
    /// subcategory may share the row of its own parent.
    fn check_duplicate_rows(&mut self) {
        for (row, entries) in &self.assignments {
            let mut colliding: Vec<&str> = Vec::new();
            let mut seen: HashSet<&str> = HashSet::new();

            for (i, a) in entries.iter().enumerate() {
                for b in entries.iter().skip(i + 1) {
                    let parent_and_child = a.parent.as_deref() == Some(b.path.as_str())
                        || b.parent.as_deref() == Some(a.path.as_str());
                    if parent_and_child {
                        continue;
                    }
                    for path in [a.path.as_str(), b.path.as_str()] {
                        if seen.insert(path) {
                            colliding.push(path);
                        }
                    }
                }
            }

            if !colliding.is_empty() {
                self.warnings.push(format!(
                    "Duplicate row {}: {} are mapped to the same row",
                    row,
                    colliding.join(", ")
                ));
            }
        }
    }
}

/// Checks a configuration without needing a workbook.
pub fn validate_configuration(configuration: &Configuration) -> ValidationResult {
    ConfigurationValidator::new(configuration).validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pnl(structure: &str) -> Configuration {
        Configuration::from_json_str(&format!(
            r#"{{ "name": "P&L 2025", "type": "pnl", "structure": {} }}"#,
            structure
        ))
        .unwrap()
    }

    const CATEGORIES: &str = r#""categories": {
        "revenue": { "products": { "row": 3, "label": "Products" } }
    }"#;

    fn duplicate_warnings(result: &ValidationResult) -> Vec<&String> {
        result
            .warnings
            .iter()
            .filter(|w| w.starts_with("Duplicate row"))
            .collect()
    }

    #[test]
    fn test_missing_total_revenue_is_an_error() {
        let config = pnl(&format!(
            r#"{{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": {{ "cogs": 4, "totalOpex": 10, "netIncome": 18 }}, {} }}"#,
            CATEGORIES
        ));

        let result = validate_configuration(&config);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("totalRevenue"));
    }

    #[test]
    fn test_zero_categories_is_only_a_warning() {
        let config = pnl(
            r#"{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": { "totalRevenue": 2, "cogs": 4, "totalOpex": 10,
                               "netIncome": 18 } }"#,
        );

        let result = validate_configuration(&config);
        assert!(result.is_valid, "errors: {:?}", result.errors);
        assert!(result.warnings.iter().any(|w| w.contains("No categories")));
        assert_eq!(result.summary.categories_count, 0);
        assert_eq!(result.summary.required_fields, 4);
        assert_eq!(result.summary.mapped_fields, 4);
        assert_eq!(result.summary.total_fields, 16);
        assert!(result.warnings.iter().any(|w| w.contains("Only 4 of 16")));
    }

    #[test]
    fn test_structural_errors() {
        let config = Configuration::from_json_str(
            r#"{ "name": "  ", "type": "cashflow",
                 "metadata": { "fiscalYearStart": 13 },
                 "structure": {
                     "periodsRow": 0, "periodsRange": "B8-M8",
                     "periodMapping": [
                         { "column": "4", "period": { "type": "year", "year": 2024 } }
                     ] } }"#,
        )
        .unwrap();

        let result = validate_configuration(&config);
        assert!(!result.is_valid);
        assert!(result.errors.iter().any(|e| e.contains("name")));
        assert!(result.errors.iter().any(|e| e.contains("periodsRow")));
        assert!(result.errors.iter().any(|e| e.contains("periodsRange")));
        assert!(result.errors.iter().any(|e| e.contains("fiscalYearStart")));
        assert!(result.errors.iter().any(|e| e.contains("periodMapping")));
        for field in [
            "initialBalance",
            "finalBalance",
            "totalInflows",
            "totalOutflows",
            "monthlyGeneration",
        ] {
            assert!(result.errors.iter().any(|e| e.contains(field)), "missing {}", field);
        }
    }

    #[test]
    fn test_oversized_periods_row_is_an_error() {
        let config = pnl(&format!(
            r#"{{ "periodsRow": 4294967297, "periodsRange": "B1:M1",
                 "dataRows": {{ "totalRevenue": 2, "cogs": 4, "totalOpex": 10,
                                "netIncome": 18 }}, {} }}"#,
            CATEGORIES
        ));

        let result = validate_configuration(&config);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("periodsRow"));
        assert!(!result.warnings.iter().any(|w| w.contains("does not include")));
    }

    #[test]
    fn test_duplicate_required_rows_warn() {
        let config = pnl(&format!(
            r#"{{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": {{ "totalRevenue": 2, "cogs": 2, "totalOpex": 10,
                                "netIncome": 18 }}, {} }}"#,
            CATEGORIES
        ));

        let result = validate_configuration(&config);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("Duplicate row 2")
            && w.contains("dataRows.totalRevenue")
            && w.contains("dataRows.cogs")));
    }

    #[test]
    fn test_duplicate_optional_rows_warn() {
        let config = pnl(&format!(
            r#"{{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": {{ "totalRevenue": 2, "cogs": 4, "totalOpex": 10, "netIncome": 18,
                                "grossProfit": 5, "ebitda": 5 }}, {} }}"#,
            CATEGORIES
        ));

        let result = validate_configuration(&config);
        assert!(result.is_valid);
        let duplicates = duplicate_warnings(&result);
        assert_eq!(duplicates.len(), 1);
        assert!(duplicates[0].contains("Duplicate row 5"));
        assert!(duplicates[0].contains("dataRows.grossProfit"));
        assert!(duplicates[0].contains("dataRows.ebitda"));
    }

    #[test]
    fn test_data_row_and_category_sharing_a_row_warn() {
        let config = pnl(
            r#"{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": { "totalRevenue": 2, "cogs": 4, "totalOpex": 10, "netIncome": 18 },
                 "categories": {
                     "revenue": { "products": { "row": 2, "label": "Products" } }
                 } }"#,
        );

        let result = validate_configuration(&config);
        assert!(result.is_valid);
        let duplicates = duplicate_warnings(&result);
        assert_eq!(duplicates.len(), 1);
        assert!(duplicates[0].contains("Duplicate row 2"));
        assert!(duplicates[0].contains("dataRows.totalRevenue"));
        assert!(duplicates[0].contains("categories.revenue.products"));
    }

    #[test]
    fn test_duplicate_category_rows_warn() {
        let config = pnl(
            r#"{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": { "totalRevenue": 2, "cogs": 4, "totalOpex": 10, "netIncome": 18 },
                 "categories": {
                     "revenue": {
                         "products": { "row": 3, "label": "Products" },
                         "services": { "row": 3, "label": "Services" }
                     }
                 } }"#,
        );

        let result = validate_configuration(&config);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("Duplicate row 3")
            && w.contains("revenue.products")
            && w.contains("revenue.services")));
    }

    #[test]
    fn test_subcategory_may_share_its_parent_row() {
        let config = pnl(
            r#"{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": { "totalRevenue": 2, "cogs": 4, "totalOpex": 10, "netIncome": 18 },
                 "categories": {
                     "opex": {
                         "payroll": {
                             "row": 7, "label": "Payroll",
                             "subcategories": { "salaries": { "row": 7, "label": "Salaries" } }
                         }
                     }
                 } }"#,
        );

        let result = validate_configuration(&config);
        assert!(result.is_valid);
        assert!(duplicate_warnings(&result).is_empty());
        assert_eq!(result.summary.categories_count, 1);
    }

    #[test]
    fn test_category_rows_must_be_positive() {
        let config = pnl(
            r#"{ "periodsRow": 1, "periodsRange": "B1:M1",
                 "dataRows": { "totalRevenue": 2, "cogs": 4, "totalOpex": 10, "netIncome": 18 },
                 "categories": { "inflows": { "misc": { "row": 0, "label": "Misc" } } } }"#,
        );

        let result = validate_configuration(&config);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("inflows.misc"));
        assert!(result.warnings.iter().any(|w| w.contains("'inflows' is not standard")));
    }

    #[test]
    fn test_periods_row_outside_range_warns() {
        let config = pnl(&format!(
            r#"{{ "periodsRow": 2, "periodsRange": "B1:M1",
                 "dataRows": {{ "totalRevenue": 5, "cogs": 4, "totalOpex": 10,
                                "netIncome": 18 }}, {} }}"#,
            CATEGORIES
        ));

        let result = validate_configuration(&config);
        assert!(result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("does not include periodsRow 2")));
    }
}
