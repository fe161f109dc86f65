// Append-only rectangular table with fixed-width rendering and first-match lookup.
use crate::core::error::{Error, ErrorKind};

const FIELD_SEPARATOR: char = '|';

/// Append-only table of string fields. The column count is fixed by the first
/// appended row; row 0 conventionally holds the header. The widest field seen
/// so far is cached at append time so whole-table rendering is single-pass.
#[derive(Debug, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
    max_field_len: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_count(&self) -> usize {
        self.rows.len()
    }

    /// Zero while the table is empty, immutable once the first row lands.
    pub fn columns_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Append one row, taking ownership. A failed append changes nothing.
    pub fn append(&mut self, row: Vec<String>) -> Result<(), Error> {
        if row.is_empty() {
            return Err(Error::new(ErrorKind::EmptyRow)
                .with_message("a row must have at least one field"));
        }
        if !self.rows.is_empty() && row.len() != self.columns_count() {
            return Err(Error::new(ErrorKind::RowLengthMismatch).with_message(format!(
                "row has {} fields but the table has {} columns",
                row.len(),
                self.columns_count()
            )));
        }
        let widest = row
            .iter()
            .map(|field| field.chars().count())
            .max()
            .unwrap_or(0);
        self.max_field_len = self.max_field_len.max(widest);
        self.rows.push(row);
        Ok(())
    }

    pub fn field(&self, row: usize, column: usize) -> Result<&str, Error> {
        if row >= self.rows.len() {
            return Err(index_error("row", row, self.rows.len()));
        }
        if column >= self.columns_count() {
            return Err(index_error("column", column, self.columns_count()));
        }
        Ok(&self.rows[row][column])
    }

    /// First row at index >= 1 whose field at `column` equals `value` exactly.
    /// Row 0 is the header and never matches; a table with fewer than two rows
    /// has no match.
    pub fn find_row(&self, column: usize, value: &str) -> Result<Option<&[String]>, Error> {
        if column >= self.columns_count() {
            return Err(index_error("column", column, self.columns_count()));
        }
        Ok(self
            .rows
            .iter()
            .skip(1)
            .find(|row| row[column] == value)
            .map(Vec::as_slice))
    }

    /// Resolve a header name to its 0-based column index by exact match
    /// against row 0.
    pub fn column_index(&self, name: &str) -> Result<usize, Error> {
        self.rows
            .first()
            .and_then(|header| header.iter().position(|field| field == name))
            .ok_or_else(|| {
                Error::new(ErrorKind::ColumnNotFound)
                    .with_message(format!("column with name {name:?} not found"))
            })
    }

    /// Render every row at the table-wide field width.
    pub fn render(&self) -> String {
        render_rows(self.rows.iter().map(Vec::as_slice), self.max_field_len)
    }

    /// Render the header row plus the first row matching `value` at `column`,
    /// padded to the widest field among only those rows. Without a match the
    /// header renders alone.
    pub fn render_filtered(&self, column: usize, value: &str) -> Result<String, Error> {
        let matched = self.find_row(column, value)?;
        let mut view: Vec<&[String]> = Vec::with_capacity(2);
        if let Some(header) = self.rows.first() {
            view.push(header.as_slice());
        }
        if let Some(row) = matched {
            view.push(row);
        }
        let width = view
            .iter()
            .flat_map(|row| row.iter())
            .map(|field| field.chars().count())
            .max()
            .unwrap_or(0);
        Ok(render_rows(view.into_iter(), width))
    }
}

fn index_error(what: &str, index: usize, bound: usize) -> Error {
    Error::new(ErrorKind::IndexOutOfRange)
        .with_message(format!("{what} index out of range (0..{bound})"))
        .with_index(index)
}

/// Each row renders as `|` followed by every field right-aligned to `width`
/// and closed with `|`, one row per line. An empty row set renders to the
/// empty string.
fn render_rows<'a>(rows: impl Iterator<Item = &'a [String]>, width: usize) -> String {
    let mut out = String::new();
    for row in rows {
        out.push(FIELD_SEPARATOR);
        for field in row {
            out.push_str(&format!("{field:>width$}"));
            out.push(FIELD_SEPARATOR);
        }
        out.push('\n');
    }
    out
}
