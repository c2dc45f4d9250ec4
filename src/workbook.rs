//! Workbook loading and cell lookup.
//!
//! Workbooks are parsed with `calamine` straight from the uploaded bytes; the format (XLSX, XLSM,
//! XLSB, XLS, ODS) is detected from the content. Every sheet is copied into an owned [`Sheet`],
//! so nothing handed back to callers borrows from the input buffer.

use crate::coordinates::{index_to_column, CellAddress};
use crate::error::{ExtractionError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
    Bool(bool),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.date())
                } else {
                    write!(f, "{}", dt)
                }
            }
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Error(e) => write!(f, "#{}", e),
        }
    }
}

impl From<&Data> for CellValue {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::Error(e) => CellValue::Error(format!("{:?}", e)),
            Data::DateTime(dt) => {
                if dt.is_datetime() {
                    // as_datetime accounts for the 1904 date system
                    match dt.as_datetime() {
                        Some(value) => CellValue::Date(value),
                        None => CellValue::Number(dt.as_f64()),
                    }
                } else {
                    CellValue::Number(dt.as_f64())
                }
            }
            Data::DateTimeIso(s) => parse_iso_datetime(s)
                .map(CellValue::Date)
                .unwrap_or_else(|| CellValue::Text(s.clone())),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// One worksheet, addressed with absolute coordinates.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    cells: HashMap<CellAddress, CellValue>,
    max_row: u32,
    max_column: u32,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn from_range(name: &str, range: &Range<Data>) -> Self {
        let mut sheet = Sheet::new(name);
        let (start_row, start_col) = range.start().unwrap_or((0, 0));

        for (row, col, data) in range.used_cells() {
            let value = CellValue::from(data);
            if value == CellValue::Empty {
                continue;
            }
            let address = CellAddress::new(start_col + col as u32, start_row + row as u32 + 1);
            sheet.set(address, value);
        }

        sheet
    }

    pub fn set(&mut self, address: CellAddress, value: CellValue) {
        self.max_row = self.max_row.max(address.row);
        self.max_column = self.max_column.max(address.column + 1);
        self.cells.insert(address, value);
    }

    /// Value at a 0-based column and 1-based row. Anything outside the populated area is
    /// [`CellValue::Empty`].
    pub fn cell(&self, column: u32, row: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells
            .get(&CellAddress::new(column, row))
            .unwrap_or(&EMPTY)
    }

    /// Value at column letters (`"B"`, `"AA"`) and a 1-based row.
    pub fn cell_at(&self, column: &str, row: u32) -> Result<&CellValue> {
        let column = crate::coordinates::column_to_index(column)?;
        Ok(self.cell(column, row))
    }

    /// Number of rows up to the last populated one.
    pub fn row_count(&self) -> u32 {
        self.max_row
    }

    /// Number of columns up to the last populated one.
    pub fn column_count(&self) -> u32 {
        self.max_column
    }

    pub fn preview(&self, max_rows: u32) -> SheetPreview {
        let rows = (1..=self.max_row.min(max_rows))
            .map(|row| {
                (0..self.max_column)
                    .map(|col| self.cell(col, row).to_string())
                    .collect()
            })
            .collect();

        SheetPreview {
            name: self.name.clone(),
            columns: (0..self.max_column).map(index_to_column).collect(),
            rows,
            total_rows: self.max_row,
        }
    }
}

/// First rows of a sheet as display text, for building a configuration by hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetPreview {
    pub name: String,
    /// Column letters, parallel to each row's cells.
    pub columns: Vec<String>,
    /// `rows[0]` is spreadsheet row 1.
    pub rows: Vec<Vec<String>>,
    pub total_rows: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
            ExtractionError::WorkbookError(format!("Failed to parse spreadsheet: {}", e))
        })?;

        let names = workbook.sheet_names();
        let mut sheets = Vec::with_capacity(names.len());

        for name in &names {
            match workbook.worksheet_range(name) {
                Ok(range) => sheets.push(Sheet::from_range(name, &range)),
                Err(e) => debug!("Skipping unreadable sheet '{}': {}", name, e),
            }
        }

        if sheets.is_empty() {
            return Err(ExtractionError::WorkbookError(
                "Workbook contains no readable sheets".to_string(),
            ));
        }

        Ok(Self { sheets })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// The named sheet, or the first sheet when `name` is omitted or not present.
    pub fn sheet(&self, name: Option<&str>) -> Result<&Sheet> {
        if let Some(name) = name {
            if let Some(sheet) = self.sheets.iter().find(|s| s.name == name) {
                return Ok(sheet);
            }
            warn!("Sheet '{}' not found, falling back to the first sheet", name);
        }

        self.sheets
            .first()
            .ok_or_else(|| ExtractionError::WorkbookError("Workbook has no sheets".to_string()))
    }
}

pub fn list_sheets(bytes: &[u8]) -> Result<Vec<String>> {
    Ok(Workbook::from_bytes(bytes)?.sheet_names())
}

pub fn preview_sheet(bytes: &[u8], sheet: Option<&str>, max_rows: u32) -> Result<SheetPreview> {
    let workbook = Workbook::from_bytes(bytes)?;
    Ok(workbook.sheet(sheet)?.preview(max_rows))
}
