use crate::schema::{StatementType, Units};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One line item across every resolved period.
///
/// `values` is parallel to [`ProcessedData::periods`]. A `None` entry means the cell was empty or
/// not numeric, which is not the same thing as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
    /// Sum of the non-null values.
    pub total: f64,
}

impl RowSeries {
    pub fn from_values(label: String, values: Vec<Option<f64>>) -> Self {
        let total = values.iter().flatten().sum();
        Self {
            label,
            values,
            total,
        }
    }

    pub fn has_data(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
    /// Sum of the category's own row. Subcategories never contribute to it.
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<BTreeMap<String, RowSeries>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMetadata {
    pub currency: String,
    pub units: Units,
    pub locale: String,
}

/// Structured statement extracted from one workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedData {
    #[serde(rename = "type")]
    pub statement_type: StatementType,
    pub periods: Vec<String>,
    pub data_rows: BTreeMap<String, RowSeries>,
    pub categories: BTreeMap<String, BTreeMap<String, CategorySeries>>,
    pub metadata: OutputMetadata,
}

impl ProcessedData {
    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    pub fn data_row(&self, key: &str) -> Option<&RowSeries> {
        self.data_rows.get(key)
    }

    pub fn category(&self, section: &str, key: &str) -> Option<&CategorySeries> {
        self.categories.get(section).and_then(|s| s.get(key))
    }

    /// Value of `key` in the period labelled `period`, if both exist and the cell had data.
    pub fn value_at(&self, key: &str, period: &str) -> Option<f64> {
        let index = self.periods.iter().position(|p| p == period)?;
        self.data_row(key)?.values.get(index).copied().flatten()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProcessedData {
        let mut data_rows = BTreeMap::new();
        data_rows.insert(
            "totalRevenue".to_string(),
            RowSeries::from_values(
                "Total Revenue".to_string(),
                vec![Some(100.0), None, Some(50.0)],
            ),
        );

        let mut revenue = BTreeMap::new();
        revenue.insert(
            "services".to_string(),
            CategorySeries {
                label: "Services".to_string(),
                values: vec![Some(1.0), Some(2.0), Some(3.0)],
                total: 6.0,
                subcategories: None,
            },
        );
        let mut categories = BTreeMap::new();
        categories.insert("revenue".to_string(), revenue);

        ProcessedData {
            statement_type: StatementType::Pnl,
            periods: vec!["Jan 2025".into(), "Feb 2025".into(), "Mar 2025".into()],
            data_rows,
            categories,
            metadata: OutputMetadata {
                currency: "USD".to_string(),
                units: Units::Normal,
                locale: "en-US".to_string(),
            },
        }
    }

    #[test]
    fn test_row_series_total_skips_nulls() {
        let series = RowSeries::from_values("x".to_string(), vec![Some(1.5), None, Some(-0.5)]);
        assert_eq!(series.total, 1.0);
        assert!(series.has_data());

        let empty = RowSeries::from_values("y".to_string(), vec![None, None]);
        assert_eq!(empty.total, 0.0);
        assert!(!empty.has_data());
    }

    #[test]
    fn test_json_shape() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(value["type"], "pnl");
        assert_eq!(value["periods"][0], "Jan 2025");
        assert!(value["dataRows"]["totalRevenue"]["values"][1].is_null());
        assert_eq!(value["dataRows"]["totalRevenue"]["total"], 150.0);
        assert_eq!(value["metadata"]["units"], "normal");
        assert!(value["categories"]["revenue"]["services"]
            .get("subcategories")
            .is_none());
    }

    #[test]
    fn test_accessors() {
        let data = sample();
        assert_eq!(data.period_count(), 3);
        assert_eq!(data.value_at("totalRevenue", "Mar 2025"), Some(50.0));
        assert_eq!(data.value_at("totalRevenue", "Feb 2025"), None);
        assert_eq!(data.value_at("totalRevenue", "Dec 2030"), None);
        assert_eq!(data.category("revenue", "services").unwrap().total, 6.0);
        assert!(data.category("opex", "services").is_none());
    }
}
