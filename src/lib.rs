// Copyright 2025-2026 The dotmeta contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotmeta
//!
//! A zero-copy reader for the CLI/ECMA-335 metadata tables stream embedded in
//! .NET assemblies and Windows Metadata (`.winmd`) files. Given a borrowed byte
//! buffer containing a `#~` (or `#-`) stream, `dotmeta` determines which of the
//! 45 metadata tables are present, resolves every table's dynamically sized row
//! layout, and exposes typed per-row field access - fixed-width constants, heap
//! indexes, simple foreign keys, and coded indexes - without copying any data.
//!
//! # Architecture
//!
//! - **File Layer**: Safe little-endian readers over borrowed byte slices
//! - **Catalog**: A static registry describing every table's ordered columns
//! - **Schema Resolution**: Per-stream computation of column offsets, widths
//!   and row strides from the `HeapSizes` flags and the row-count vector
//! - **Stream Reader**: Header validation and table byte-range location
//! - **Record Access**: Lazy, schema-driven projection of typed fields
//!
//! What this crate deliberately does *not* do: PE/COFF loading and the CLI
//! header walk that locates the metadata root, heap content decoding, signature
//! blob parsing, and IL. The caller hands in the stream bytes; decoded heap and
//! row indexes come back as opaque 1-based values (0 denoting absence) for the
//! caller's heap readers to interpret.
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use dotmeta::{TableId, TablesStream};
//!
//! # fn example(data: &[u8]) -> dotmeta::Result<()> {
//! let stream = TablesStream::from(data)?;
//! println!(
//!     "schema {}.{}, {} tables",
//!     stream.major_version(),
//!     stream.minor_version(),
//!     stream.table_count()
//! );
//!
//! // Walk every present table in ascending table-number order
//! for table in stream.tables() {
//!     println!("{}: {} rows of {} bytes", table.name(), table.row_count(), table.stride());
//! }
//!
//! // Typed access into a specific table
//! if let Some(methods) = stream.table(TableId::MethodDef) {
//!     for row in methods.rows() {
//!         let rva = row.u32(0)?;
//!         let name = row.string_index(3)?;
//!         let signature = row.blob_index(4)?;
//!         println!("method rva={rva:#x} name=#{name} sig=#{signature}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A [`TablesStream`] holds only a borrowed view of the caller's buffer plus
//! immutable precomputed schemata. Any number of readers may share one buffer,
//! and one reader may be queried from any number of threads; rows decode on
//! demand and nothing is memoised per row.

mod error;
pub(crate) mod file;
pub mod metadata;

/// `dotmeta` Result type.
///
/// A type alias for `std::result::Result<T, Error>` where the error type is
/// always [`crate::Error`], used consistently for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

pub use error::Error;

pub use metadata::streams::{TableSummary, TablesStream};
pub use metadata::tables::{
    catalog, CodedIndex, CodedIndexType, Column, ColumnKind, HeapKind, HeapSizes, Row,
    RowIterator, Table, TableDescriptor, TableId, TableInfo, TableRowInfo, TableSchema,
};
