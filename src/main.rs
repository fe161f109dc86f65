//! Purpose: `tablite` CLI entry point: read, render, and filter delimited tables.
//! Role: Binary crate root; parses args, runs the scan, prints the table on stdout.
//! Invariants: Stdout carries only the rendered table (fixed-width text or JSON).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `tablite::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

use tablite::{Encoding, Error, ErrorKind, Table, read_file, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    // Reset SIGPIPE to default so `tablite big.csv | head` exits cleanly
    // instead of panicking.
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    init_tracing();

    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Usage)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                let message = clap_error_summary(&err);
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(message)
                        .with_hint(usage_hint()),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    run_command(cli)
        .map_err(add_scan_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "tablite",
    version,
    about = "Strict CSV tables in the terminal",
    long_about = r#"Reads a comma-delimited file into a rectangular table and prints it as
|-delimited rows with every field right-aligned to the widest field.

With a filter, prints the header row plus the first row whose field in the
chosen column equals the filter value exactly. Row boundaries are CRLF;
quoted fields may carry commas, quotes (doubled), and line breaks."#,
    after_help = r#"EXAMPLES
  $ tablite people.csv
  $ tablite people.csv name Alice          # filter by header name
  $ tablite people.csv 2 "New York"        # filter by 1-based column index
  $ tablite --encoding utf16le export.csv
  $ tablite --json people.csv

LEARN MORE
  $ tablite --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        help = "Path to the delimited text file",
        value_hint = ValueHint::FilePath,
        required_unless_present = "completions"
    )]
    file: Option<PathBuf>,

    #[arg(
        help = "Filter column: 1-based index or header name",
        requires = "value"
    )]
    column: Option<String>,

    #[arg(help = "Filter value, matched exactly")]
    value: Option<String>,

    #[arg(
        long,
        default_value = "utf8",
        value_enum,
        help = "Text encoding of the source: ascii|utf8|utf16le|utf16be"
    )]
    encoding: EncodingArg,

    #[arg(long, help = "Emit the table as JSON instead of the padded layout")]
    json: bool,

    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[arg(long, value_enum, help = "Generate shell completions and exit")]
    completions: Option<Shell>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum EncodingArg {
    Ascii,
    Utf8,
    Utf16le,
    Utf16be,
}

impl EncodingArg {
    fn to_encoding(self) -> Encoding {
        match self {
            EncodingArg::Ascii => Encoding::Ascii,
            EncodingArg::Utf8 => Encoding::Utf8,
            EncodingArg::Utf16le => Encoding::Utf16Le,
            EncodingArg::Utf16be => Encoding::Utf16Be,
        }
    }
}

fn run_command(cli: Cli) -> Result<RunOutcome, Error> {
    if let Some(shell) = cli.completions {
        clap_complete::aot::generate(shell, &mut Cli::command(), "tablite", &mut io::stdout());
        return Ok(RunOutcome::ok());
    }

    let Some(file) = cli.file.as_deref() else {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("a file path is required")
            .with_hint(usage_hint()));
    };

    let table = read_file(file, cli.encoding.to_encoding())?;

    match (cli.column.as_deref(), cli.value.as_deref()) {
        (Some(column), Some(value)) => {
            let column = resolve_filter_column(&table, column)?;
            if cli.json {
                emit_json(filtered_json(&table, column, value)?);
            } else {
                print!("{}", table.render_filtered(column, value)?);
            }
        }
        _ => {
            if cli.json {
                emit_json(table_json(&table));
            } else {
                print!("{}", table.render());
            }
        }
    }
    Ok(RunOutcome::ok())
}

/// A column argument that parses as an integer selects by 1-based index;
/// anything else resolves as a header name.
fn resolve_filter_column(table: &Table, column: &str) -> Result<usize, Error> {
    match column.parse::<i64>() {
        Ok(index) if index < 1 => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("column index must start from 1, got {index}"))
            .with_hint(usage_hint())),
        Ok(index) => Ok(index as usize - 1),
        Err(_) => table.column_index(column),
    }
}

fn usage_hint() -> String {
    "Usage: tablite <FILE> [COLUMN VALUE]; COLUMN is a 1-based index or header name. Try `tablite --help`.".to_string()
}

fn add_scan_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::NotFound => {
            err.with_hint("Check the file path; tablite reads one delimited text file.")
        }
        ErrorKind::UnexpectedQuoteInField | ErrorKind::MissingFieldSeparator => err.with_hint(
            "Fields containing commas, quotes, or line breaks must be quoted, with embedded quotes doubled.",
        ),
        ErrorKind::ExpectingLineFeed => {
            err.with_hint("Rows end with CRLF; a bare carriage return is not a terminator.")
        }
        _ => err,
    }
}

fn table_json(table: &Table) -> Value {
    let rows: Vec<&[String]> = table.rows().collect();
    json!({
        "columns_count": table.columns_count(),
        "rows_count": table.rows_count(),
        "rows": rows,
    })
}

fn filtered_json(table: &Table, column: usize, value: &str) -> Result<Value, Error> {
    let matched = table.find_row(column, value)?;
    let mut view: Vec<&[String]> = Vec::with_capacity(2);
    if let Some(header) = table.rows().next() {
        view.push(header);
    }
    if let Some(row) = matched {
        view.push(row);
    }
    Ok(json!({
        "columns_count": table.columns_count(),
        "rows_count": view.len(),
        "rows": view,
    }))
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Usage\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::SourceRead => "source read failure".to_string(),
        ErrorKind::UnterminatedQuotedField => "unterminated quoted field".to_string(),
        ErrorKind::UnexpectedQuoteInField => "unexpected quote in field".to_string(),
        ErrorKind::ExpectingLineFeed => "expecting line feed after carriage return".to_string(),
        ErrorKind::MissingFieldSeparator => "missing field separator".to_string(),
        ErrorKind::RowLengthMismatch => "row length mismatch".to_string(),
        ErrorKind::EmptyRow => "empty row".to_string(),
        ErrorKind::IndexOutOfRange => "index out of range".to_string(),
        ErrorKind::ColumnNotFound => "column not found".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    if let Some(column) = err.column() {
        inner.insert("column".to_string(), json!(column));
    }
    if let Some(index) = err.index() {
        inner.insert("index".to_string(), json!(index));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));

    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(line) = err.line() {
        lines.push(format!(
            "{} {line}",
            colorize_label("line:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(column) = err.column() {
        lines.push(format!(
            "{} {column}",
            colorize_label("column:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(index) = err.index() {
        lines.push(format!(
            "{} {index}",
            colorize_label("index:", use_color, AnsiColor::Yellow)
        ));
    }

    let causes = error_causes(err);
    if let Some(cause) = causes.first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }

    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
