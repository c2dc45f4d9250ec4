//! # Financial Statement Extractor
//!
//! A library for pulling P&L and cash flow statements out of spreadsheets whose layout is
//! described by a declarative configuration instead of being guessed.
//!
//! ## Core Concepts
//!
//! - **Configuration**: Where the period headers live (`periodsRow`, `periodsRange` or an explicit
//!   `periodMapping`), which row holds each summary line (`dataRows`) and which rows hold the
//!   detailed breakdown (`categories`)
//! - **Periods**: One label per column, read from date headers or taken from the mapping
//! - **ProcessedData**: One value per period for every mapped row. Cells that are not numbers
//!   become `null`, never `0`
//! - **Validation**: Errors block extraction, warnings flag layouts that look suspicious
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_statement_extractor::*;
//!
//! let configuration = Configuration::from_json_str(&std::fs::read_to_string("pnl.json")?)?;
//! let bytes = std::fs::read("statements.xlsx")?;
//!
//! let result = validate_configuration(&configuration);
//! assert!(result.is_valid, "{:?}", result.errors);
//!
//! let data = extract(&bytes, &configuration, StatementType::Pnl, Some("P&L 2025"))?;
//! println!("{:?}", data.value_at("totalRevenue", "Jan 2025"));
//! ```

pub mod coordinates;
pub mod engine;
pub mod error;
pub mod normalizer;
pub mod periods;
pub mod processed;
pub mod report;
pub mod schema;
pub mod templates;
pub mod utils;
pub mod validation;
pub mod workbook;

pub use coordinates::{column_to_index, index_to_column, CellAddress, CellRange};
pub use engine::{extract_from_sheet, CellParseWarning, Extraction, StatementExtractor};
pub use error::{ExtractionError, Result};
pub use normalizer::parse_locale_number;
pub use periods::ResolvedPeriods;
pub use processed::*;
pub use schema::*;
pub use validation::{validate_configuration, ValidationResult, ValidationSummary};
pub use workbook::{list_sheets, preview_sheet, CellValue, Sheet, SheetPreview, Workbook};

use log::{debug, info};

pub struct StatementProcessor;

impl StatementProcessor {
    /// Checks that `configuration` can be used to extract a `statement_type` statement.
    pub fn prepare(configuration: &Configuration, statement_type: StatementType) -> Result<()> {
        if configuration.statement_type() != statement_type {
            return Err(ExtractionError::StatementTypeMismatch {
                expected: statement_type,
                found: configuration.statement_type(),
            });
        }

        let validation = validate_configuration(configuration);
        for warning in &validation.warnings {
            debug!("Configuration warning: {}", warning);
        }
        if !validation.is_valid {
            return Err(ExtractionError::ConfigurationError(validation.errors.join("; ")));
        }

        Ok(())
    }

    pub fn process(
        bytes: &[u8],
        configuration: &Configuration,
        statement_type: StatementType,
        selected_sheet: Option<&str>,
    ) -> Result<Extraction> {
        Self::prepare(configuration, statement_type)?;

        let workbook = Workbook::from_bytes(bytes)?;
        let sheet = workbook.sheet(selected_sheet)?;

        Self::process_sheet_unchecked(configuration, sheet)
    }

    /// Same as [`StatementProcessor::process`] for a sheet that is already in memory.
    pub fn process_sheet(
        configuration: &Configuration,
        statement_type: StatementType,
        sheet: &Sheet,
    ) -> Result<Extraction> {
        Self::prepare(configuration, statement_type)?;
        Self::process_sheet_unchecked(configuration, sheet)
    }

    fn process_sheet_unchecked(configuration: &Configuration, sheet: &Sheet) -> Result<Extraction> {
        info!(
            "Extracting {} statement '{}' from sheet '{}'",
            configuration.statement_type(),
            configuration.name,
            sheet.name
        );

        extract_from_sheet(configuration, sheet)
    }
}

/// Extracts the statement described by `configuration` from a workbook buffer.
///
/// The configuration must be of type `statement_type` and pass validation. When
/// `selected_sheet` is omitted or missing from the workbook, the first sheet is used.
pub fn extract(
    bytes: &[u8],
    configuration: &Configuration,
    statement_type: StatementType,
    selected_sheet: Option<&str>,
) -> Result<ProcessedData> {
    StatementProcessor::process(bytes, configuration, statement_type, selected_sheet)
        .map(|extraction| extraction.data)
}

/// Like [`extract`], but also returns the cells that could not be read as numbers and the
/// required categories that came back empty.
pub fn extract_with_diagnostics(
    bytes: &[u8],
    configuration: &Configuration,
    statement_type: StatementType,
    selected_sheet: Option<&str>,
) -> Result<Extraction> {
    StatementProcessor::process(bytes, configuration, statement_type, selected_sheet)
}

pub fn extract_sheet(
    sheet: &Sheet,
    configuration: &Configuration,
    statement_type: StatementType,
) -> Result<ProcessedData> {
    StatementProcessor::process_sheet(configuration, statement_type, sheet)
        .map(|extraction| extraction.data)
}
