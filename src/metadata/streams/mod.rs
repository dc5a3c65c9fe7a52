//! Metadata stream readers.
//!
//! A CLI metadata blob is organized as a set of named streams. This crate decodes
//! exactly one of them: the `#~` tables stream holding the relational record
//! tables (the `#-` variant is read identically). The heap streams (`#Strings`,
//! `#US`, `#Blob`, `#GUID`) are external collaborators - the tables stream only
//! stores indexes into them, and those indexes are surfaced as opaque values for
//! the caller's heap readers to interpret.

mod tablesstream;

pub use tablesstream::{TableSummary, TablesStream};
