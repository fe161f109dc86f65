//! Purpose: Acquire and decode delimited-text sources into scanner-ready strings.
//! Exports: `Encoding`, `decode`, `read_to_string`.
//! Role: Decoding collaborator between the filesystem and the scanner.
//! Invariants: A leading byte-order mark overrides the declared encoding and is stripped.
//! Invariants: Decode failures surface as `SourceRead` with the original cause preserved.

use std::fs;
use std::io;
use std::path::Path;

use crate::core::error::{Error, ErrorKind};

const BOM_UTF8: &[u8] = &[0xEF, 0xBB, 0xBF];
const BOM_UTF16_LE: &[u8] = &[0xFF, 0xFE];
const BOM_UTF16_BE: &[u8] = &[0xFE, 0xFF];

/// Declared text encoding of an input source.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Encoding {
    /// Strict 7-bit ASCII; any byte at or above 0x80 is rejected.
    Ascii,
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
}

/// Decode raw source bytes into text. A recognized byte-order mark wins over
/// the declared encoding; without one the declared encoding applies to the
/// whole byte sequence.
pub fn decode(bytes: &[u8], declared: Encoding) -> Result<String, Error> {
    if let Some(rest) = bytes.strip_prefix(BOM_UTF8) {
        return decode_utf8(rest);
    }
    if let Some(rest) = bytes.strip_prefix(BOM_UTF16_LE) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(BOM_UTF16_BE) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    match declared {
        Encoding::Ascii => decode_ascii(bytes),
        Encoding::Utf8 => decode_utf8(bytes),
        Encoding::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
        Encoding::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
    }
}

/// Read a file and decode it per `declared`, annotating errors with the path.
pub fn read_to_string(path: &Path, declared: Encoding) -> Result<String, Error> {
    let bytes = fs::read(path).map_err(|err| read_error(path, err))?;
    tracing::debug!(bytes = bytes.len(), encoding = ?declared, "read source file");
    decode(&bytes, declared).map_err(|err| err.with_path(path))
}

fn read_error(path: &Path, err: io::Error) -> Error {
    let kind = match err.kind() {
        io::ErrorKind::NotFound => ErrorKind::NotFound,
        _ => ErrorKind::SourceRead,
    };
    let message = match kind {
        ErrorKind::NotFound => "source file not found",
        _ => "failed to read source file",
    };
    Error::new(kind)
        .with_message(message)
        .with_path(path)
        .with_source(err)
}

fn decode_ascii(bytes: &[u8]) -> Result<String, Error> {
    for (offset, byte) in bytes.iter().enumerate() {
        if *byte >= 0x80 {
            return Err(Error::new(ErrorKind::SourceRead)
                .with_message(format!(
                    "byte 0x{byte:02X} at offset {offset} is not ASCII"
                ))
                .with_hint("Declare --encoding utf8 or utf16le if the file is not plain ASCII."));
        }
    }
    Ok(bytes.iter().map(|byte| *byte as char).collect())
}

fn decode_utf8(bytes: &[u8]) -> Result<String, Error> {
    String::from_utf8(bytes.to_vec()).map_err(|err| {
        let offset = err.utf8_error().valid_up_to();
        Error::new(ErrorKind::SourceRead)
            .with_message(format!("invalid UTF-8 byte sequence at offset {offset}"))
            .with_source(err)
    })
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, Error> {
    if bytes.len() % 2 != 0 {
        return Err(Error::new(ErrorKind::SourceRead).with_message(format!(
            "UTF-16 source has an odd byte length ({})",
            bytes.len()
        )));
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map_err(|err| {
            Error::new(ErrorKind::SourceRead)
                .with_message("unpaired surrogate in UTF-16 source")
                .with_source(err)
        })
}
