use thiserror::Error;

use crate::metadata::tables::CodedIndexType;

/// The generic Error type, covering every failure this library can report.
///
/// All variants are structural: once a buffer fails to parse there is no
/// retry short of supplying a new buffer, and a successfully opened stream
/// never fails on in-range positional reads.
///
/// # Error Categories
///
/// ## Construction errors (reported once, at [`crate::TablesStream::from`])
/// - [`Error::Truncated`] - Buffer shorter than the header or the declared payload
/// - [`Error::ReservedFieldMismatch`] - Reserved header bytes hold unexpected values
/// - [`Error::UnknownTableBit`] - `Valid` names a table number outside the catalog
///
/// ## Positional-access errors (reported per call)
/// - [`Error::OutOfBounds`] - Row index past the table's row count
/// - [`Error::BadCodedIndex`] - Coded index tag with no target table
/// - [`Error::SchemaMalformed`] - Catalog inconsistency or typed-accessor misuse
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The buffer ends before the data it declares.
    ///
    /// Raised when the buffer is shorter than the 24-byte header plus the
    /// `Rows[]` prefix, when the concatenated table payloads overrun the
    /// buffer, or when a field read would leave the row span.
    #[error("Buffer ends before the declared table content")]
    Truncated,

    /// A reserved header field holds an unexpected value.
    ///
    /// The tables stream header requires `Reserved0 == 0` and
    /// `Reserved1 == 1`. Anything else is rejected.
    #[error("Reserved header field holds an unexpected value")]
    ReservedFieldMismatch,

    /// The `Valid` bitmask names a table this catalog does not define.
    ///
    /// Carries the offending bit position (0-63).
    #[error("Valid bitmask names unknown table 0x{0:02X}")]
    UnknownTableBit(u8),

    /// The table catalog is internally inconsistent, or a typed accessor
    /// was used against a column of a different kind.
    ///
    /// This indicates a programming error rather than malformed input.
    #[error("Table catalog misuse - {0}")]
    SchemaMalformed(&'static str),

    /// A row index at or past the table's row count was requested.
    #[error("Row index {index} is out of bounds for a table of {rows} rows")]
    OutOfBounds {
        /// The requested 0-based row index
        index: u32,
        /// The number of rows in the table
        rows: u32,
    },

    /// A coded index decoded to a tag with no target table.
    #[error("Tag {tag} has no target table in the {family:?} family")]
    BadCodedIndex {
        /// The coded index family the value was decoded against
        family: CodedIndexType,
        /// The decoded tag value
        tag: u32,
    },
}
