use crate::error::{ExtractionError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    #[schemars(description = "Profit & loss statement (income statement)")]
    Pnl,

    #[schemars(description = "Cash flow statement")]
    Cashflow,
}

impl StatementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pnl => "pnl",
            Self::Cashflow => "cashflow",
        }
    }

    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Pnl => PnlDataRows::REQUIRED,
            Self::Cashflow => CashFlowDataRows::REQUIRED,
        }
    }

    pub fn known_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Pnl => PnlDataRows::KNOWN,
            Self::Cashflow => CashFlowDataRows::KNOWN,
        }
    }

    /// Category sections a configuration of this type is expected to use.
    pub fn category_sections(&self) -> &'static [&'static str] {
        match self {
            Self::Pnl => &[
                "revenue",
                "cogs",
                "opex",
                "otherIncome",
                "otherExpenses",
                "taxes",
            ],
            Self::Cashflow => &["inflows", "outflows"],
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatementType {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pnl" => Ok(Self::Pnl),
            "cashflow" => Ok(Self::Cashflow),
            other => Err(ExtractionError::ConfigurationError(format!(
                "Unknown statement type '{}'. Expected 'pnl' or 'cashflow'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    #[schemars(description = "Values are stated as-is")]
    Normal,

    #[schemars(description = "Values are displayed in thousands")]
    Thousands,

    #[schemars(description = "Values are displayed in millions")]
    Millions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationMetadata {
    #[schemars(description = "ISO currency code of the statement (e.g. 'USD', 'MXN', 'ARS')")]
    pub currency: String,

    #[schemars(
        description = "Locale of the source spreadsheet (e.g. 'es-MX'); 'es-*' uses decimal commas"
    )]
    pub locale: String,

    #[schemars(description = "Display units for the extracted values")]
    pub units: Units,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Month (1-12) in which the fiscal year starts")]
    pub fiscal_year_start: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Free-form hint describing how dates are written in the source")]
    pub date_format: Option<String>,
}

impl Default for ConfigurationMetadata {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
            locale: "en-US".to_string(),
            units: Units::Normal,
            fiscal_year_start: None,
            date_format: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeriodType {
    Month,
    Quarter,
    Year,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDefinition {
    #[serde(rename = "type")]
    pub period_type: PeriodType,

    pub year: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Month number 1-12 for month periods")]
    pub month: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Quarter number 1-4 for quarter periods")]
    pub quarter: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Display label. When set it is used verbatim.")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct PeriodMappingEntry {
    #[schemars(description = "Column letters holding this period's values (e.g. 'B', 'AA')")]
    pub column: String,

    pub period: PeriodDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct SubcategoryDefinition {
    #[schemars(description = "1-based spreadsheet row")]
    pub row: i64,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct CategoryDefinition {
    #[schemars(description = "1-based row holding the category's own pre-computed values")]
    pub row: i64,

    #[serde(default)]
    pub label: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<BTreeMap<String, SubcategoryDefinition>>,
}

/// `section -> categoryKey -> definition`
pub type CategorySections = BTreeMap<String, BTreeMap<String, CategoryDefinition>>;

/// Field-to-row mapping of one statement type.
pub trait DataRowMap {
    /// Fields every configuration of this type must map to a row >= 1.
    const REQUIRED: &'static [&'static str];

    /// Every field the statement type declares, required ones first.
    const KNOWN: &'static [&'static str];

    /// All declared fields in `KNOWN` order followed by custom keys. `None` means unmapped.
    fn rows(&self) -> Vec<(String, Option<i64>)>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PnlDataRows {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cogs: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_opex: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_income: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_profit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_margin: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebitda_margin: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depreciation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_income: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_expense: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub earnings_before_taxes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_income: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_expenses: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_margin: Option<i64>,

    /// Rows outside the standard P&L vocabulary.
    #[serde(flatten)]
    pub custom: BTreeMap<String, Option<i64>>,
}

impl DataRowMap for PnlDataRows {
    const REQUIRED: &'static [&'static str] = &["totalRevenue", "cogs", "totalOpex", "netIncome"];

    const KNOWN: &'static [&'static str] = &[
        "totalRevenue",
        "cogs",
        "totalOpex",
        "netIncome",
        "grossProfit",
        "grossMargin",
        "ebitda",
        "ebitdaMargin",
        "depreciation",
        "operatingIncome",
        "interestExpense",
        "earningsBeforeTaxes",
        "taxes",
        "otherIncome",
        "otherExpenses",
        "netMargin",
    ];

    fn rows(&self) -> Vec<(String, Option<i64>)> {
        let known = [
            self.total_revenue,
            self.cogs,
            self.total_opex,
            self.net_income,
            self.gross_profit,
            self.gross_margin,
            self.ebitda,
            self.ebitda_margin,
            self.depreciation,
            self.operating_income,
            self.interest_expense,
            self.earnings_before_taxes,
            self.taxes,
            self.other_income,
            self.other_expenses,
            self.net_margin,
        ];

        Self::KNOWN
            .iter()
            .zip(known)
            .map(|(name, row)| (name.to_string(), row))
            .chain(self.custom.iter().map(|(k, v)| (k.clone(), *v)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowDataRows {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_balance: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_balance: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_inflows: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_outflows: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lowest_balance: Option<i64>,

    #[serde(flatten)]
    pub custom: BTreeMap<String, Option<i64>>,
}

impl DataRowMap for CashFlowDataRows {
    const REQUIRED: &'static [&'static str] = &[
        "initialBalance",
        "finalBalance",
        "totalInflows",
        "totalOutflows",
        "monthlyGeneration",
    ];

    const KNOWN: &'static [&'static str] = &[
        "initialBalance",
        "finalBalance",
        "totalInflows",
        "totalOutflows",
        "monthlyGeneration",
        "lowestBalance",
    ];

    fn rows(&self) -> Vec<(String, Option<i64>)> {
        let known = [
            self.initial_balance,
            self.final_balance,
            self.total_inflows,
            self.total_outflows,
            self.monthly_generation,
            self.lowest_balance,
        ];

        Self::KNOWN
            .iter()
            .zip(known)
            .map(|(name, row)| (name.to_string(), row))
            .chain(self.custom.iter().map(|(k, v)| (k.clone(), *v)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatementStructure<R: Default> {
    #[serde(default)]
    #[schemars(description = "1-based row holding the period headers")]
    pub periods_row: i64,

    #[serde(default)]
    #[schemars(description = "Range spanning the period columns, e.g. 'B8:M8'")]
    pub periods_range: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Explicit period per column. When non-empty, the periods row is not read."
    )]
    pub period_mapping: Option<Vec<PeriodMappingEntry>>,

    #[serde(default)]
    pub data_rows: R,

    #[serde(default)]
    pub categories: CategorySections,
}

pub type PnlStructure = StatementStructure<PnlDataRows>;
pub type CashFlowStructure = StatementStructure<CashFlowDataRows>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StatementLayout {
    Pnl { structure: PnlStructure },
    Cashflow { structure: CashFlowStructure },
}

fn default_version() -> u32 {
    1
}

/// A saved description of how one spreadsheet layout maps onto a statement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub metadata: ConfigurationMetadata,

    #[serde(flatten)]
    pub layout: StatementLayout,
}

impl Configuration {
    pub fn pnl(
        name: impl Into<String>,
        metadata: ConfigurationMetadata,
        structure: PnlStructure,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            version: default_version(),
            metadata,
            layout: StatementLayout::Pnl { structure },
        }
    }

    pub fn cashflow(
        name: impl Into<String>,
        metadata: ConfigurationMetadata,
        structure: CashFlowStructure,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            version: default_version(),
            metadata,
            layout: StatementLayout::Cashflow { structure },
        }
    }

    pub fn statement_type(&self) -> StatementType {
        match &self.layout {
            StatementLayout::Pnl { .. } => StatementType::Pnl,
            StatementLayout::Cashflow { .. } => StatementType::Cashflow,
        }
    }

    pub fn periods_row(&self) -> i64 {
        match &self.layout {
            StatementLayout::Pnl { structure } => structure.periods_row,
            StatementLayout::Cashflow { structure } => structure.periods_row,
        }
    }

    pub fn periods_range(&self) -> &str {
        match &self.layout {
            StatementLayout::Pnl { structure } => &structure.periods_range,
            StatementLayout::Cashflow { structure } => &structure.periods_range,
        }
    }

    pub fn period_mapping(&self) -> Option<&[PeriodMappingEntry]> {
        let mapping = match &self.layout {
            StatementLayout::Pnl { structure } => structure.period_mapping.as_deref(),
            StatementLayout::Cashflow { structure } => structure.period_mapping.as_deref(),
        };
        mapping.filter(|entries| !entries.is_empty())
    }

    pub fn data_rows(&self) -> Vec<(String, Option<i64>)> {
        match &self.layout {
            StatementLayout::Pnl { structure } => structure.data_rows.rows(),
            StatementLayout::Cashflow { structure } => structure.data_rows.rows(),
        }
    }

    pub fn categories(&self) -> &CategorySections {
        match &self.layout {
            StatementLayout::Pnl { structure } => &structure.categories,
            StatementLayout::Cashflow { structure } => &structure.categories,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Configuration)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
