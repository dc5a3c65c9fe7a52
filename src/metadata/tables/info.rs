use bitflags::bitflags;
use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::{read_le, read_le_at},
    metadata::tables::{CodedIndexType, TableId},
    Error::Truncated,
    Result,
};

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    /// The `HeapSizes` byte of the stream header.
    ///
    /// Each set bit widens the corresponding heap index from 2 to 4 bytes.
    pub struct HeapSizes : u8 {
        /// Indexes into the `#Strings` heap are 4 bytes
        const WIDE_STRING = 0x01;
        /// Indexes into the `#GUID` heap are 4 bytes
        const WIDE_GUID = 0x02;
        /// Indexes into the `#Blob` heap are 4 bytes
        const WIDE_BLOB = 0x04;
    }
}

/// Holds the row count of one table and the index widths derived from it.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// The count of rows in this table
    pub rows: u32,
    /// Number of bits required to represent any valid row index
    pub bits: u8,
    /// If the count is >= 2^16, simple indexes into this table take 4 bytes instead of 2
    pub is_large: bool,
}

impl TableRowInfo {
    /// Creates a new `TableRowInfo` for the given row count, deriving the bit
    /// count any index into the table needs.
    ///
    /// ## Arguments
    /// * `rows` - The number of rows in the table
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            // 32 - leading zeros is always <= 32, fits in u8
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: rows > u32::from(u16::MAX),
        }
    }
}

/// Row counts and index-width rules for one tables stream.
///
/// Built once from the header's `Valid` bitmask, the packed `Rows[]` prefix and
/// the `HeapSizes` byte; immutable afterwards. Every index-width decision the
/// schema resolver makes goes through this type:
///
/// - heap index: 4 bytes when the heap's `HeapSizes` bit is set, else 2
/// - simple index into table `T`: 4 bytes when `rows(T) >= 2^16`, else 2
/// - coded index over family `F` with `t` tag bits: 4 bytes when the largest
///   target row count needs more than `16 - t` bits, else 2
#[derive(Clone, Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_bits: Vec<u8>,
    heap_sizes: HeapSizes,
}

impl TableInfo {
    /// Parse the `Rows[]` prefix and `HeapSizes` byte out of a tables stream buffer.
    ///
    /// The row count of table `t` sits at position `popcount(Valid & ((1 << t) - 1))`
    /// of the prefix; walking the set bits in ascending table order visits exactly
    /// those positions.
    ///
    /// ## Arguments
    /// * 'data' - The full stream buffer, starting at the 24-byte header
    /// * '`valid`' - The `Valid` bitmask; bits beyond the catalog must already be cleared
    ///
    /// # Errors
    /// [`crate::Error::Truncated`] if the buffer cannot hold the header and one
    /// `u32` row count per set bit.
    pub fn new(data: &[u8], valid: u64) -> Result<Self> {
        let row_count_end = 24 + valid.count_ones() as usize * 4;
        if data.len() < row_count_end {
            return Err(Truncated);
        }

        let mut rows = vec![TableRowInfo::default(); TableId::COUNT];
        let mut next_row_offset = 24;

        for table_id in TableId::iter() {
            if (valid & (1 << table_id as usize)) == 0 {
                continue;
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let mut info = TableInfo {
            rows,
            coded_bits: vec![0; CodedIndexType::COUNT],
            heap_sizes: HeapSizes::from_bits_truncate(read_le::<u8>(&data[6..])?),
        };

        info.calculate_coded_index_bits();

        Ok(info)
    }

    #[cfg(test)]
    /// Special constructor for unit-tests
    ///
    /// ## Arguments
    /// * 'valid_tables' - A slice of tuples providing (table_id, row_count) of the valid tables
    /// * 'heap_sizes'   - The heap widening flags to assume
    pub fn new_test(valid_tables: &[(TableId, u32)], heap_sizes: HeapSizes) -> Self {
        let mut info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::COUNT],
            coded_bits: vec![0; CodedIndexType::COUNT],
            heap_sizes,
        };

        for (id, rows) in valid_tables {
            info.rows[*id as usize] = TableRowInfo::new(*rows);
        }

        info.calculate_coded_index_bits();
        info
    }

    /// The heap widening flags of this stream.
    #[must_use]
    pub fn heap_sizes(&self) -> HeapSizes {
        self.heap_sizes
    }

    /// Returns the row-count record for a specific table.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// Returns the row count of a specific table; 0 when the table is absent.
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        self.rows[table as usize].rows
    }

    /// True if simple indexes into the requested table take 4 bytes instead of 2.
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Size in bytes of an index into the '#Strings' heap.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.heap_sizes.contains(HeapSizes::WIDE_STRING) {
            4
        } else {
            2
        }
    }

    /// Size in bytes of an index into the '#GUID' heap.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.heap_sizes.contains(HeapSizes::WIDE_GUID) {
            4
        } else {
            2
        }
    }

    /// Size in bytes of an index into the '#Blob' heap.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.heap_sizes.contains(HeapSizes::WIDE_BLOB) {
            4
        } else {
            2
        }
    }

    /// Number of bits an index into a specific table needs.
    #[must_use]
    pub fn table_index_bits(&self, table_id: TableId) -> u8 {
        self.rows[table_id as usize].bits
    }

    /// Size in bytes of a simple index into a specific table.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].bits > 16 {
            4
        } else {
            2
        }
    }

    /// Number of bits a coded index of the given family needs, tag included.
    #[must_use]
    pub fn coded_index_bits(&self, family: CodedIndexType) -> u8 {
        self.coded_bits[family as usize]
    }

    /// Size in bytes of a coded index column of the given family.
    #[must_use]
    pub fn coded_index_bytes(&self, family: CodedIndexType) -> u8 {
        if self.coded_bits[family as usize] > 16 {
            4
        } else {
            2
        }
    }

    fn calculate_coded_index_size(&self, family: CodedIndexType) -> u8 {
        let max_bits = family
            .targets()
            .iter()
            .map(|table| self.table_index_bits(*table))
            .max()
            .unwrap_or(1);

        max_bits + family.tag_bits()
    }

    fn calculate_coded_index_bits(&mut self) {
        for family in CodedIndexType::iter() {
            self.coded_bits[family as usize] = self.calculate_coded_index_size(family);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_widths() {
        let info = TableInfo::new_test(&[], HeapSizes::WIDE_STRING | HeapSizes::WIDE_BLOB);

        assert_eq!(info.str_bytes(), 4);
        assert_eq!(info.guid_bytes(), 2);
        assert_eq!(info.blob_bytes(), 4);
    }

    #[test]
    fn simple_index_threshold() {
        let small = TableInfo::new_test(&[(TableId::TypeDef, 0xFFFF)], HeapSizes::empty());
        assert_eq!(small.table_index_bytes(TableId::TypeDef), 2);
        assert!(!small.is_large(TableId::TypeDef));

        let large = TableInfo::new_test(&[(TableId::TypeDef, 0x1_0000)], HeapSizes::empty());
        assert_eq!(large.table_index_bytes(TableId::TypeDef), 4);
        assert!(large.is_large(TableId::TypeDef));
    }

    #[test]
    fn coded_index_threshold() {
        // HasCustomAttribute carries 5 tag bits, the row threshold is 2^11
        let small = TableInfo::new_test(&[(TableId::MethodDef, 2047)], HeapSizes::empty());
        assert_eq!(small.coded_index_bytes(CodedIndexType::HasCustomAttribute), 2);

        let large = TableInfo::new_test(&[(TableId::MethodDef, 2048)], HeapSizes::empty());
        assert_eq!(large.coded_index_bytes(CodedIndexType::HasCustomAttribute), 4);

        // TypeDefOrRef carries 2 tag bits, the row threshold is 2^14
        let small = TableInfo::new_test(&[(TableId::TypeSpec, 0x3FFF)], HeapSizes::empty());
        assert_eq!(small.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);

        let large = TableInfo::new_test(&[(TableId::TypeSpec, 0x4000)], HeapSizes::empty());
        assert_eq!(large.coded_index_bytes(CodedIndexType::TypeDefOrRef), 4);
    }

    #[test]
    fn rows_prefix_positions() {
        // Valid = Module | Field | Param, counts packed in ascending table order
        let mut data = vec![0_u8; 24 + 12];
        data[7] = 1;
        let valid: u64 = (1 << TableId::Module as u64)
            | (1 << TableId::Field as u64)
            | (1 << TableId::Param as u64);
        data[8..16].copy_from_slice(&valid.to_le_bytes());
        data[24..28].copy_from_slice(&7_u32.to_le_bytes());
        data[28..32].copy_from_slice(&11_u32.to_le_bytes());
        data[32..36].copy_from_slice(&13_u32.to_le_bytes());

        let info = TableInfo::new(&data, valid).unwrap();
        assert_eq!(info.row_count(TableId::Module), 7);
        assert_eq!(info.row_count(TableId::Field), 11);
        assert_eq!(info.row_count(TableId::Param), 13);
        assert_eq!(info.row_count(TableId::TypeDef), 0);
    }

    #[test]
    fn rows_prefix_truncated() {
        let mut data = vec![0_u8; 24 + 4];
        let valid: u64 = 0b101; // two tables, but room for one count
        data[8..16].copy_from_slice(&valid.to_le_bytes());

        assert!(matches!(TableInfo::new(&data, valid), Err(Truncated)));
    }
}
