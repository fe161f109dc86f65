// Core modules implementing scanning, source decoding, table storage, and error modeling.
pub mod error;
pub mod scan;
pub mod source;
pub mod table;
