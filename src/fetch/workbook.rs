// src/fetch/workbook.rs

use anyhow::{Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// A single spreadsheet cell, detached from the reader library.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Cell content as text; `None` for empty cells.
    ///
    /// Whole floats render without a fraction (`3.0` → `"3"`).
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Text(s) => Some(s.clone()),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<&Data> for Cell {
    fn from(d: &Data) -> Self {
        match d {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// All sheets of one downloaded workbook, as row-major cell grids.
///
/// Row 0 is the first row of the sheet, even if it is blank.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<(String, Vec<Vec<Cell>>)>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push((name.into(), rows));
        self
    }

    /// Decode xlsx/xls/ods bytes, keeping only the named sheets.
    ///
    /// Sheets not in `wanted` are never parsed. A wanted sheet that the
    /// workbook lacks is simply absent from the result.
    pub fn from_bytes(bytes: Vec<u8>, wanted: &[String]) -> Result<Self> {
        let mut book =
            open_workbook_auto_from_rs(Cursor::new(bytes)).context("opening workbook")?;
        let present = book.sheet_names();

        let mut workbook = Self::new();
        for name in wanted.iter().filter(|w| present.contains(*w)) {
            let range = book
                .worksheet_range(name)
                .with_context(|| format!("reading sheet `{}`", name))?;

            // calamine trims leading blank rows; put them back so skip counts line up
            let leading = range.start().map(|(row, _)| row as usize).unwrap_or(0);
            let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(leading + range.height());
            rows.extend(std::iter::repeat_with(Vec::new).take(leading));
            rows.extend(range.rows().map(|r| r.iter().map(Cell::from).collect()));
            workbook = workbook.with_sheet(name.as_str(), rows);
        }
        Ok(workbook)
    }

    pub fn sheet(&self, name: &str) -> Option<&[Vec<Cell>]> {
        self.sheets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows.as_slice())
    }
}
