//! Purpose: Shared core library crate used by the `tablite` CLI and tests.
//! Exports: `core` (scanning, source decoding, table storage, errors).
//! Role: Internal library backing the binary; not yet a stable public SDK.
//! Invariants: Treat the crate API as internal until a dedicated library release.
//! Invariants: Core modules prefer explicit inputs/outputs over hidden state.
pub mod core;

pub use crate::core::error::{to_exit_code, Error, ErrorKind};
pub use crate::core::scan::{read_file, scan_str, Position, Scanner};
pub use crate::core::source::{decode, read_to_string, Encoding};
pub use crate::core::table::Table;
