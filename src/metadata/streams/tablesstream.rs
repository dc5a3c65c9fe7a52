use strum::IntoEnumIterator;

use crate::{
    file::io::read_le,
    metadata::tables::{catalog, HeapSizes, Table, TableId, TableInfo, TableSchema},
    Error::{ReservedFieldMismatch, Truncated, UnknownTableBit},
    Result,
};

/// Size of the fixed part of the stream header, before the `Rows[]` prefix.
const HEADER_SIZE: usize = 24;

/// Reader for the `#~` tables stream of a CLI metadata blob.
///
/// Borrows a caller-owned byte buffer for its whole lifetime and hands out
/// zero-copy views into it. Opening the stream parses and validates the
/// 24-byte header, reads the packed row counts, resolves every table's byte
/// layout and locates every present table's row blob; all of that happens once,
/// in [`TablesStream::from`]. Row decoding stays lazy - a [`Table`] view
/// projects records on demand and nothing is cached per row.
///
/// The `#-` (unoptimized) stream variant carries the same header and table
/// layout and is read identically.
///
/// ## Example
/// ```rust,no_run
/// use dotmeta::{TablesStream, TableId};
///
/// # fn example(data: &[u8]) -> dotmeta::Result<()> {
/// let stream = TablesStream::from(data)?;
///
/// if let Some(typedefs) = stream.table(TableId::TypeDef) {
///     println!("TypeDef rows: {}", typedefs.row_count());
///     for row in typedefs.rows() {
///         let name_index = row.string_index(1)?;
///         println!("  row {}: name at #Strings[{}]", row.index(), name_index);
///     }
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## Reference
/// * [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - II.24.2.6
pub struct TablesStream<'a> {
    /// Major version of the table schemata, shall be 2
    major_version: u8,
    /// Minor version of the table schemata, shall be 0
    minor_version: u8,
    /// Bit vector of present tables
    valid: u64,
    /// Bit vector of sorted tables (advisory, never enforced here)
    sorted: u64,
    /// Row counts and index-width rules for this stream
    info: TableInfo,
    /// Resolved layout of every table, indexed by table number
    schemas: Vec<TableSchema>,
    /// Each present table's row blob, indexed by table number
    ranges: Vec<Option<&'a [u8]>>,
}

/// Summary information for one present table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSummary {
    /// The table number
    pub id: TableId,
    /// The table's row count
    pub rows: u32,
}

impl<'a> TablesStream<'a> {
    /// Open a tables stream over a borrowed buffer.
    ///
    /// ## Arguments
    /// * 'data' - The stream bytes, starting at the 24-byte header
    ///
    /// # Errors
    /// * [`crate::Error::Truncated`] - buffer shorter than header plus row
    ///   counts, or the concatenated table payloads do not end exactly at the
    ///   buffer's end
    /// * [`crate::Error::ReservedFieldMismatch`] - `Reserved0 != 0` or
    ///   `Reserved1 != 1`
    /// * [`crate::Error::UnknownTableBit`] - `Valid` names a table number
    ///   outside the catalog
    pub fn from(data: &'a [u8]) -> Result<TablesStream<'a>> {
        if data.len() < HEADER_SIZE {
            return Err(Truncated);
        }

        let reserved_0 = read_le::<u32>(data)?;
        let reserved_1 = read_le::<u8>(&data[7..])?;
        if reserved_0 != 0 || reserved_1 != 1 {
            return Err(ReservedFieldMismatch);
        }

        let valid = read_le::<u64>(&data[8..])?;
        let known_mask = (1_u64 << (TableId::MAX + 1)) - 1;
        let unknown = valid & !known_mask;
        if unknown != 0 {
            #[allow(clippy::cast_possible_truncation)]
            return Err(UnknownTableBit(unknown.trailing_zeros() as u8));
        }

        let info = TableInfo::new(data, valid)?;

        let schemas: Vec<TableSchema> = TableId::iter()
            .map(|id| TableSchema::resolve(catalog(id), &info))
            .collect();

        let mut ranges: Vec<Option<&'a [u8]>> = vec![None; schemas.len()];
        let mut cursor = HEADER_SIZE + valid.count_ones() as usize * 4;

        for id in TableId::iter() {
            if (valid & (1 << id as u64)) == 0 {
                continue;
            }

            let end = (info.row_count(id) as usize)
                .checked_mul(schemas[id as usize].stride() as usize)
                .and_then(|size| cursor.checked_add(size))
                .ok_or(Truncated)?;
            let Some(blob) = data.get(cursor..end) else {
                return Err(Truncated);
            };

            ranges[id as usize] = Some(blob);
            cursor = end;
        }

        if cursor != data.len() {
            return Err(Truncated);
        }

        Ok(TablesStream {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            schemas,
            ranges,
        })
    }

    /// Major version of the table schemata.
    #[must_use]
    pub fn major_version(&self) -> u8 {
        self.major_version
    }

    /// Minor version of the table schemata.
    #[must_use]
    pub fn minor_version(&self) -> u8 {
        self.minor_version
    }

    /// The `Valid` bitmask of present tables; bit position equals table number.
    #[must_use]
    pub fn valid(&self) -> u64 {
        self.valid
    }

    /// The `Sorted` bitmask. Advisory: exposed, never enforced.
    #[must_use]
    pub fn sorted(&self) -> u64 {
        self.sorted
    }

    /// The heap widening flags of this stream.
    #[must_use]
    pub fn heap_sizes(&self) -> HeapSizes {
        self.info.heap_sizes()
    }

    /// Row counts and index-width rules of this stream.
    #[must_use]
    pub fn info(&self) -> &TableInfo {
        &self.info
    }

    /// Check if a specific table is present.
    #[must_use]
    pub fn has_table(&self, id: TableId) -> bool {
        (self.valid & (1_u64 << (id as u8))) != 0
    }

    /// The number of present tables.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// The row count of a specific table; 0 when the table is absent.
    #[must_use]
    pub fn row_count(&self, id: TableId) -> u32 {
        self.info.row_count(id)
    }

    /// True if the `Sorted` bitmask flags the table as sorted.
    #[must_use]
    pub fn is_sorted(&self, id: TableId) -> bool {
        (self.sorted & (1_u64 << (id as u8))) != 0
    }

    /// Get a view of a specific table.
    ///
    /// The `TableId` doubles as the catalog selector: the returned view knows
    /// its descriptor, resolved schema, row count and row blob.
    ///
    /// ## Returns
    /// * `Some(Table)` - when the table is present (possibly with zero rows)
    /// * `None` - when the `Valid` bit is clear
    #[must_use]
    pub fn table(&self, id: TableId) -> Option<Table<'_>> {
        let blob = self.ranges[id as usize]?;

        Some(Table::new(
            catalog(id),
            &self.schemas[id as usize],
            blob,
            self.info.row_count(id),
        ))
    }

    /// Iterate over all present tables in ascending table-number order.
    ///
    /// Finite and restartable; yields exactly [`TablesStream::table_count`]
    /// views.
    pub fn tables(&self) -> impl Iterator<Item = Table<'_>> + '_ {
        TableId::iter().filter_map(move |id| self.table(id))
    }

    /// Iterate over the numbers of all present tables, in ascending order.
    pub fn present_tables(&self) -> impl Iterator<Item = TableId> + '_ {
        TableId::iter().filter(move |id| self.has_table(*id))
    }

    /// Get a summary of all present tables with their row counts.
    #[must_use]
    pub fn table_summary(&self) -> Vec<TableSummary> {
        self.present_tables()
            .map(|id| TableSummary {
                id,
                rows: self.row_count(id),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_valid_mask() {
        let mut data = vec![0_u8; 24];
        data[4] = 2; // MajorVersion
        data[7] = 1; // Reserved1

        let stream = TablesStream::from(&data).unwrap();
        assert_eq!(stream.major_version(), 2);
        assert_eq!(stream.minor_version(), 0);
        assert_eq!(stream.valid(), 0);
        assert_eq!(stream.sorted(), 0);
        assert_eq!(stream.table_count(), 0);
        assert_eq!(stream.tables().count(), 0);
        assert!(stream.table(TableId::Module).is_none());
    }

    #[test]
    fn short_header() {
        let data = vec![0_u8; 23];
        assert_eq!(TablesStream::from(&data).err(), Some(Error::Truncated));
    }

    #[test]
    fn reserved_fields_reject() {
        let mut data = vec![0_u8; 24];
        data[7] = 1;
        data[0] = 0xFF; // Reserved0 must be 0
        assert_eq!(
            TablesStream::from(&data).err(),
            Some(Error::ReservedFieldMismatch)
        );

        let mut data = vec![0_u8; 24];
        data[7] = 0; // Reserved1 must be 1
        assert_eq!(
            TablesStream::from(&data).err(),
            Some(Error::ReservedFieldMismatch)
        );
    }

    #[test]
    fn unknown_table_bit() {
        let mut data = vec![0_u8; 24 + 4];
        data[7] = 1;
        let valid: u64 = 1 << 0x30;
        data[8..16].copy_from_slice(&valid.to_le_bytes());

        assert_eq!(
            TablesStream::from(&data).err(),
            Some(Error::UnknownTableBit(0x30))
        );
    }
}
