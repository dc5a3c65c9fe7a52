//! Core infrastructure for metadata table processing.
//!
//! This module provides the foundational types for working with the relational
//! tables of a CLI metadata stream: the static catalog describing every table's
//! columns, the index-width rules that size those columns for a concrete stream,
//! and the schema-driven record accessor that projects typed fields out of
//! packed rows.
//!
//! # Architecture
//!
//! The metadata format organizes type, method, field, and assembly information
//! in fixed-stride tables following the ECMA-335 specification. Rather than
//! giving every table its own row type, this module describes each table as a
//! value - a [`TableDescriptor`] listing its columns as tagged [`ColumnKind`]
//! variants - and drives all row decoding through one accessor that consults
//! the table's resolved [`TableSchema`]. Column widths are not fixed by the
//! format: heap indexes widen with the `HeapSizes` flags and row indexes widen
//! with the row counts of their target tables, so layouts are resolved once per
//! stream and reused for every access.
//!
//! # Key Components
//!
//! - [`TableId`] - Enumeration of the 45 defined table numbers
//! - [`catalog`] - Static registry of every table's ordered column list
//! - [`CodedIndexType`] - The 13 tagged-reference families and their codec
//! - [`TableInfo`] - Row counts, heap flags, and the index-width rules
//! - [`TableSchema`] - Resolved per-column offsets, widths and row stride
//! - [`Table`] / [`Row`] - Borrowed table views and typed record access
//!
//! # Thread Safety
//!
//! Everything here is immutable after construction. [`Table`] and [`Row`] are
//! `Copy` views into the stream buffer and may be queried from any number of
//! threads; [`Table::par_rows`] hands rows to rayon for bulk scans.

mod catalog;
mod codedindex;
mod id;
mod info;
mod row;
mod schema;

pub use catalog::{catalog, Column, ColumnKind, HeapKind, TableDescriptor};
pub use codedindex::{CodedIndex, CodedIndexType};
pub use id::TableId;
pub use info::{HeapSizes, TableInfo, TableRowInfo};
pub use row::{Row, RowIterator, Table};
pub use schema::TableSchema;
