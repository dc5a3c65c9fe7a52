use crate::metadata::tables::{ColumnKind, HeapKind, TableDescriptor, TableInfo};

/// The resolved byte layout of one table's rows.
///
/// Maps every column of a [`TableDescriptor`] to its byte offset and width
/// within a row, given the row counts and heap flags of a concrete stream.
/// Resolved once when the stream is opened and immutable afterwards: widths
/// depend only on the row-count vector and the `HeapSizes` byte, both of which
/// are fixed for the stream's lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableSchema {
    offsets: Vec<u16>,
    widths: Vec<u8>,
    stride: u16,
}

impl TableSchema {
    /// Resolve a table's layout.
    ///
    /// Walks the descriptor's columns in declared order, assigning each the
    /// width its kind dictates and accumulating offsets. No fixed-point
    /// iteration is needed: every width rule reads only `info`, never another
    /// table's resolved layout.
    ///
    /// ## Arguments
    /// * `descriptor` - The catalog entry for the table
    /// * `info` - Row counts and heap flags of the stream being opened
    #[must_use]
    pub fn resolve(descriptor: &TableDescriptor, info: &TableInfo) -> TableSchema {
        let mut offsets = Vec::with_capacity(descriptor.columns.len());
        let mut widths = Vec::with_capacity(descriptor.columns.len());
        let mut offset: u16 = 0;

        for column in descriptor.columns {
            let width = match column.kind {
                ColumnKind::Constant(width) => width,
                ColumnKind::HeapIndex(HeapKind::Str) => info.str_bytes(),
                ColumnKind::HeapIndex(HeapKind::Guid) => info.guid_bytes(),
                ColumnKind::HeapIndex(HeapKind::Blob) => info.blob_bytes(),
                ColumnKind::SimpleIndex(target) => info.table_index_bytes(target),
                ColumnKind::CodedIndex(family) => info.coded_index_bytes(family),
            };

            offsets.push(offset);
            widths.push(width);
            offset += u16::from(width);
        }

        TableSchema {
            offsets,
            widths,
            stride: offset,
        }
    }

    /// Byte offset of each column within a row, in column order.
    #[must_use]
    pub fn offsets(&self) -> &[u16] {
        &self.offsets
    }

    /// Byte width of each column, in column order.
    #[must_use]
    pub fn widths(&self) -> &[u8] {
        &self.widths
    }

    /// The `(offset, width)` pair of one column, or `None` past the column list.
    #[must_use]
    pub fn column(&self, col: usize) -> Option<(u16, u8)> {
        Some((*self.offsets.get(col)?, *self.widths.get(col)?))
    }

    /// Total byte width of one row.
    #[must_use]
    pub fn stride(&self) -> u16 {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{catalog, CodedIndexType, HeapSizes, TableId, TableInfo};

    #[test]
    fn module_stride_small_heaps() {
        let info = TableInfo::new_test(&[(TableId::Module, 1)], HeapSizes::empty());
        let schema = TableSchema::resolve(catalog(TableId::Module), &info);

        assert_eq!(schema.widths(), &[2, 2, 2, 2, 2]);
        assert_eq!(schema.offsets(), &[0, 2, 4, 6, 8]);
        assert_eq!(schema.stride(), 10);
    }

    #[test]
    fn field_stride_mixed_heaps() {
        // string and blob wide, guid narrow
        let info = TableInfo::new_test(
            &[(TableId::Field, 1)],
            HeapSizes::WIDE_STRING | HeapSizes::WIDE_BLOB,
        );
        let schema = TableSchema::resolve(catalog(TableId::Field), &info);

        assert_eq!(schema.widths(), &[2, 4, 4]);
        assert_eq!(schema.stride(), 10);
    }

    #[test]
    fn coded_index_promotion_changes_stride() {
        // All HasCustomAttribute targets small: Parent packs into 2 bytes
        let small = TableInfo::new_test(
            &[(TableId::CustomAttribute, 10), (TableId::MethodDef, 2047)],
            HeapSizes::empty(),
        );
        let schema = TableSchema::resolve(catalog(TableId::CustomAttribute), &small);
        assert_eq!(schema.stride(), 6);

        // One target crossing 2^(16-5) rows promotes the column for every user
        let large = TableInfo::new_test(
            &[(TableId::CustomAttribute, 10), (TableId::MethodDef, 2048)],
            HeapSizes::empty(),
        );
        assert_eq!(large.coded_index_bytes(CodedIndexType::HasCustomAttribute), 4);
        let schema = TableSchema::resolve(catalog(TableId::CustomAttribute), &large);
        assert_eq!(schema.stride(), 8);
    }

    #[test]
    fn simple_index_promotion() {
        let info = TableInfo::new_test(
            &[(TableId::TypeDef, 5), (TableId::Field, 0x1_0000)],
            HeapSizes::empty(),
        );
        let schema = TableSchema::resolve(catalog(TableId::TypeDef), &info);

        // Flags(4) + TypeName(2) + TypeNamespace(2) + Extends(2) + FieldList(4) + MethodList(2)
        assert_eq!(schema.widths(), &[4, 2, 2, 2, 4, 2]);
        assert_eq!(schema.stride(), 16);
    }
}
