//! Workbook access.
//!
//! Sheets are read once through calamine and copied into a small owned grid
//! addressed by absolute (row, column) position, so the sources never see
//! calamine types and can be driven from in-memory rows in tests.

use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;
use tracing::debug;

use crate::error::{DailyError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(value: &str) -> Self {
        Cell::Text(value.to_string())
    }

    /// Blank cells and whitespace-only text count as empty
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Integer value of the cell. Numbers are truncated; text must be an integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Cell::Number(_) => None,
            Cell::Text(s) => s.trim().parse().ok(),
        }
    }

    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.trim().to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::DateTime(dt) => Cell::Number(dt.as_f64()),
            Data::Bool(b) => Cell::Text(b.to_string()),
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }
}

static EMPTY: Cell = Cell::Empty;

/// A rectangular sheet. Out-of-range positions read as empty.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Read a named sheet from an .xls or .xlsx workbook
    pub fn open(path: &Path, sheet_name: &str) -> Result<Self> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook.worksheet_range(sheet_name)?;

        // calamine ranges start at the first used cell; rebuild from A1
        let (height, width) = match range.end() {
            Some((row, col)) => (row as usize + 1, col as usize + 1),
            None => (0, 0),
        };
        let mut rows = vec![vec![Cell::Empty; width]; height];
        for (row, col, data) in range.used_cells() {
            let abs_row = row + range.start().map_or(0, |s| s.0 as usize);
            let abs_col = col + range.start().map_or(0, |s| s.1 as usize);
            rows[abs_row][abs_col] = Cell::from(data);
        }

        debug!(
            path = %path.display(),
            sheet = sheet_name,
            rows = height,
            columns = width,
            "Loaded sheet"
        );
        Ok(Self { rows })
    }

    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Header text of every column in `row`
    pub fn header(&self, row: usize) -> Vec<String> {
        (0..self.ncols()).map(|col| self.cell(row, col).as_text()).collect()
    }
}

/// Column lookup by header name
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    columns: Vec<String>,
}

impl HeaderIndex {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| DailyError::MissingField(name.to_string()))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}
