// Single-pass CSV scanning with one-character lookahead and exact error positions.
use std::iter::Peekable;
use std::path::Path;

use crate::core::error::{Error, ErrorKind};
use crate::core::source::{self, Encoding};
use crate::core::table::Table;

const DELIMITER: char = ',';
const QUOTE: char = '"';
const CR: char = '\r';
const LF: char = '\n';

/// 1-based source coordinate, advanced as characters are consumed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Position {
    pub line: u64,
    pub column: u64,
}

impl Position {
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Every consumed character moves the column, except the line-break pair:
    /// LF starts the next line, CR is absorbed by the CRLF terminator.
    pub fn advance(&mut self, ch: char) {
        match ch {
            LF => {
                self.line += 1;
                self.column = 1;
            }
            CR => {}
            _ => self.column += 1,
        }
    }
}

/// Field-and-row state machine over a pulled character stream.
///
/// Consumes the source end-to-end and yields a fully populated [`Table`], or
/// the first positioned format error. No partial table ever escapes.
pub struct Scanner<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    pos: Position,
    row: Vec<String>,
    slot_filled: bool,
}

impl<I: Iterator<Item = char>> Scanner<I> {
    pub fn new(chars: I) -> Self {
        Self {
            chars: chars.peekable(),
            pos: Position::start(),
            row: Vec::new(),
            slot_filled: false,
        }
    }

    pub fn run(mut self) -> Result<Table, Error> {
        let mut table = Table::new();
        while let Some(ch) = self.bump() {
            if ch == QUOTE {
                let field = self.read_quoted_field()?;
                self.push_field(field)?;
            } else if ch == DELIMITER {
                if !self.slot_filled {
                    self.row.push(String::new());
                }
                self.slot_filled = false;
            } else if ch == CR {
                if !self.slot_filled {
                    self.row.push(String::new());
                }
                self.finish_row(&mut table)?;
                match self.bump() {
                    Some(LF) => {}
                    _ => {
                        return Err(self
                            .error(ErrorKind::ExpectingLineFeed)
                            .with_message("carriage return must be followed by a line feed"));
                    }
                }
            } else {
                let field = self.read_unquoted_field(ch)?;
                self.push_field(field)?;
            }
        }
        if !self.row.is_empty() {
            self.finish_row(&mut table)?;
        }
        tracing::debug!(
            rows = table.rows_count(),
            columns = table.columns_count(),
            "scan complete"
        );
        Ok(table)
    }

    /// Accumulate a field opened by a quote. The opening quote is already
    /// consumed; `""` collapses to one literal quote, a lone quote closes the
    /// field, and the stored value carries no quoting artifacts.
    fn read_quoted_field(&mut self) -> Result<String, Error> {
        let mut field = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(self
                        .error(ErrorKind::UnterminatedQuotedField)
                        .with_message("source ended inside a quoted field"));
                }
                Some(QUOTE) => {
                    if self.peek() == Some(QUOTE) {
                        self.bump();
                        field.push(QUOTE);
                    } else {
                        return Ok(field);
                    }
                }
                Some(ch) => field.push(ch),
            }
        }
    }

    /// Accumulate an unquoted field starting at `first`. The field ends when
    /// the lookahead is a delimiter, CR, LF, or end-of-input; those characters
    /// stay unconsumed for the main dispatch loop.
    fn read_unquoted_field(&mut self, first: char) -> Result<String, Error> {
        let mut field = String::from(first);
        while let Some(next) = self.peek() {
            match next {
                DELIMITER | CR | LF => break,
                QUOTE => {
                    return Err(self
                        .error(ErrorKind::UnexpectedQuoteInField)
                        .with_message("quote character inside an unquoted field"));
                }
                _ => {
                    self.bump();
                    field.push(next);
                }
            }
        }
        Ok(field)
    }

    /// One value per delimiter-separated slot; a second value before the next
    /// delimiter means the separator was missing.
    fn push_field(&mut self, field: String) -> Result<(), Error> {
        if self.slot_filled {
            return Err(self
                .error(ErrorKind::MissingFieldSeparator)
                .with_message("two field values in one slot; a comma must separate fields"));
        }
        self.row.push(field);
        self.slot_filled = true;
        Ok(())
    }

    fn finish_row(&mut self, table: &mut Table) -> Result<(), Error> {
        let row = std::mem::take(&mut self.row);
        self.slot_filled = false;
        table
            .append(row)
            .map_err(|err| err.with_position(self.pos.line, self.pos.column))
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next();
        if let Some(ch) = ch {
            self.pos.advance(ch);
        }
        ch
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind).with_position(self.pos.line, self.pos.column)
    }
}

/// Scan an in-memory source.
pub fn scan_str(input: &str) -> Result<Table, Error> {
    Scanner::new(input.chars()).run()
}

/// Read a file, decode it per `encoding`, and scan it in one call. Errors are
/// annotated with the path.
pub fn read_file(path: &Path, encoding: Encoding) -> Result<Table, Error> {
    let text = source::read_to_string(path, encoding)?;
    scan_str(&text).map_err(|err| err.with_path(path))
}
