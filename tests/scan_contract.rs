//! Purpose: Library-level contract tests for scanning real table shapes.
//! Role: Exercises `scan_str`/`read_file`/`Table` together across encodings.
//! Invariants: One fixture, identical rows regardless of source encoding.
use pretty_assertions::assert_eq;
use tablite::{decode, read_file, scan_str, Encoding, Table};

// Quoted fields carry embedded separators, doubled quotes, line breaks, and
// non-ASCII text; the last data row is entirely empty fields.
const MIXED: &str = concat!(
    "id,name,notes\r\n",
    "1,Anna,plain\r\n",
    "2,\"Nowak, Jan\",\"likes \"\"pierogi\"\"\"\r\n",
    "3,\u{141}ucja,\"first\r\nsecond line\"\r\n",
    "4,,\\r literal\r\n",
    ",,\r\n",
);

fn mixed_rows() -> Vec<Vec<String>> {
    let to_row = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect::<Vec<_>>();
    vec![
        to_row(&["id", "name", "notes"]),
        to_row(&["1", "Anna", "plain"]),
        to_row(&["2", "Nowak, Jan", "likes \"pierogi\""]),
        to_row(&["3", "\u{141}ucja", "first\r\nsecond line"]),
        to_row(&["4", "", "\\r literal"]),
        to_row(&["", "", ""]),
    ]
}

fn collect(table: &Table) -> Vec<Vec<String>> {
    table.rows().map(|row| row.to_vec()).collect()
}

fn utf16_bytes(text: &str, to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
    text.encode_utf16().flat_map(to_bytes).collect()
}

#[test]
fn mixed_fixture_parses_from_utf8_text() {
    let table = scan_str(MIXED).expect("scan");
    assert_eq!(collect(&table), mixed_rows());
}

#[test]
fn mixed_fixture_parses_identically_across_encodings() {
    let from_utf8 = decode(MIXED.as_bytes(), Encoding::Utf8).expect("utf8");
    let from_le = decode(
        &utf16_bytes(MIXED, u16::to_le_bytes),
        Encoding::Utf16Le,
    )
    .expect("utf16le");
    let from_be = decode(
        &utf16_bytes(MIXED, u16::to_be_bytes),
        Encoding::Utf16Be,
    )
    .expect("utf16be");

    let rows = collect(&scan_str(&from_utf8).expect("scan utf8"));
    assert_eq!(rows, collect(&scan_str(&from_le).expect("scan utf16le")));
    assert_eq!(rows, collect(&scan_str(&from_be).expect("scan utf16be")));
    assert_eq!(rows, mixed_rows());
}

#[test]
fn mixed_fixture_reads_from_disk_per_encoding() {
    let dir = tempfile::tempdir().expect("tempdir");

    let utf8_path = dir.path().join("mixed-utf8.csv");
    std::fs::write(&utf8_path, MIXED.as_bytes()).expect("write utf8");
    let utf16_path = dir.path().join("mixed-utf16.csv");
    std::fs::write(&utf16_path, utf16_bytes(MIXED, u16::to_le_bytes)).expect("write utf16");

    let from_utf8 = read_file(&utf8_path, Encoding::Utf8).expect("read utf8");
    let from_utf16 = read_file(&utf16_path, Encoding::Utf16Le).expect("read utf16");
    assert_eq!(collect(&from_utf8), collect(&from_utf16));
}

#[test]
fn ascii_clean_file_reads_under_declared_ascii() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("plain.csv");
    std::fs::write(&path, b"h1,h2\r\na,b\r\n").expect("write");

    let table = read_file(&path, Encoding::Ascii).expect("read");
    assert_eq!(table.rows_count(), 2);
    assert_eq!(table.field(1, 0).expect("field"), "a");
}

#[test]
fn parsed_tables_are_rectangular() {
    let table = scan_str(MIXED).expect("scan");
    assert!(table.rows_count() > 0);
    assert_eq!(table.columns_count(), 3);
    for row in table.rows() {
        assert_eq!(row.len(), table.columns_count());
    }

    let empty = scan_str("").expect("scan");
    assert_eq!(empty.rows_count(), 0);
    assert_eq!(empty.columns_count(), 0);
}

#[test]
fn header_only_file_keeps_its_empty_fields() {
    let table = scan_str("header1,,header3\r\n").expect("scan");
    assert_eq!(table.rows_count(), 1);
    assert_eq!(collect(&table), vec![vec![
        "header1".to_string(),
        String::new(),
        "header3".to_string(),
    ]]);
}

#[test]
fn single_field_without_terminator_is_one_cell() {
    let table = scan_str("value").expect("scan");
    assert_eq!(table.rows_count(), 1);
    assert_eq!(table.columns_count(), 1);
    assert_eq!(table.field(0, 0).expect("field"), "value");
}

#[test]
fn embedded_separator_is_addressable_by_index() {
    let table = scan_str("a,\"b,c\"\r\nd,e\r\n").expect("scan");
    assert_eq!(table.field(0, 1).expect("field"), "b,c");
    assert_eq!(collect(&table), vec![
        vec!["a".to_string(), "b,c".to_string()],
        vec!["d".to_string(), "e".to_string()],
    ]);
}

#[test]
fn doubled_quotes_collapse_in_stored_fields() {
    let table = scan_str("a,\"x\"\"y\"\r\n").expect("scan");
    assert_eq!(collect(&table), vec![vec!["a".to_string(), "x\"y".to_string()]]);
}

#[test]
fn find_row_retrieves_by_exact_field_value() {
    let table = scan_str(MIXED).expect("scan");
    let row = table
        .find_row(1, "Nowak, Jan")
        .expect("find")
        .expect("match");
    assert_eq!(row[0], "2");
    assert_eq!(table.find_row(1, "zz").expect("find"), None);
}

#[test]
fn filtered_render_from_parsed_input() {
    let table = scan_str("name,age\r\nAnna,31\r\nJan,44\r\n").expect("scan");
    let column = table.column_index("age").expect("column");
    let view = table.render_filtered(column, "44").expect("render");
    assert_eq!(view, "|name| age|\n| Jan|  44|\n");
}
