//! A1-style spreadsheet coordinates.
//!
//! Columns are handled as 0-based indexes internally and rows as the 1-based numbers users see
//! in a spreadsheet application, which is also how configurations address them.

use crate::error::{ExtractionError, Result};
use regex::Regex;
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]+)(\d+):([A-Z]+)(\d+)$").expect("hardcoded regex should be valid")
});

static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)(\d+)$").expect("hardcoded regex should be valid")
});

/// Widest sheet supported by current spreadsheet formats (column XFD).
pub const MAX_COLUMNS: u32 = 16_384;

/// Returns true when `range` has the `B8:M8` shape configurations must use.
pub fn is_valid_range(range: &str) -> bool {
    RANGE_PATTERN.is_match(range)
}

/// Converts column letters to a 0-based index: `A` -> 0, `Z` -> 25, `AA` -> 26.
pub fn column_to_index(letters: &str) -> Result<u32> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ExtractionError::InvalidCellReference(format!(
            "'{}' is not a column name",
            letters
        )));
    }

    let mut index: u32 = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        index = index
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .filter(|v| *v <= MAX_COLUMNS)
            .ok_or_else(|| {
                ExtractionError::InvalidCellReference(format!(
                    "Column '{}' is beyond the last spreadsheet column",
                    letters
                ))
            })?;
    }

    Ok(index - 1)
}

/// Converts a 0-based column index back to letters: 0 -> `A`, 27 -> `AB`.
pub fn index_to_column(index: u32) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// 0-based column index.
    pub column: u32,
    /// 1-based row number.
    pub row: u32,
}

impl CellAddress {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    pub fn parse(address: &str) -> Result<Self> {
        let address = address.trim();
        let caps = ADDRESS_PATTERN.captures(address).ok_or_else(|| {
            ExtractionError::InvalidCellReference(format!("'{}' is not a cell address", address))
        })?;

        let column = column_to_index(&caps[1])?;
        let row = parse_row(&caps[2], address)?;
        Ok(Self { column, row })
    }

    pub fn column_letters(&self) -> String {
        index_to_column(self.column)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

/// An inclusive rectangular range such as `B8:M8`, normalized so `start` is top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    pub fn parse(range: &str) -> Result<Self> {
        let range = range.trim();
        let caps = RANGE_PATTERN.captures(range).ok_or_else(|| {
            ExtractionError::InvalidCellReference(format!(
                "'{}' is not a range of the form 'B8:M8'",
                range
            ))
        })?;

        let first = CellAddress {
            column: column_to_index(&caps[1])?,
            row: parse_row(&caps[2], range)?,
        };
        let second = CellAddress {
            column: column_to_index(&caps[3])?,
            row: parse_row(&caps[4], range)?,
        };

        Ok(Self {
            start: CellAddress::new(
                first.column.min(second.column),
                first.row.min(second.row),
            ),
            end: CellAddress::new(
                first.column.max(second.column),
                first.row.max(second.row),
            ),
        })
    }

    /// 0-based column indexes spanned, left to right.
    pub fn columns(&self) -> RangeInclusive<u32> {
        self.start.column..=self.end.column
    }

    pub fn column_letters(&self) -> Vec<String> {
        self.columns().map(index_to_column).collect()
    }

    pub fn rows(&self) -> RangeInclusive<u32> {
        self.start.row..=self.end.row
    }

    pub fn contains_row(&self, row: u32) -> bool {
        self.rows().contains(&row)
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

fn parse_row(digits: &str, context: &str) -> Result<u32> {
    match digits.parse::<u32>() {
        Ok(row) if row >= 1 => Ok(row),
        _ => Err(ExtractionError::InvalidCellReference(format!(
            "Row '{}' in '{}' must be a positive integer",
            digits, context
        ))),
    }
}
