use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::tables::{
        CodedIndex, ColumnKind, HeapKind, TableDescriptor, TableId, TableSchema,
    },
    Error::{OutOfBounds, SchemaMalformed, Truncated},
    Result,
};

/// A view over one table's packed row blob.
///
/// Borrows the table's byte range out of the stream buffer together with its
/// resolved schema; rows are decoded lazily, on access, and never cached. The
/// view is `Copy` and may be handed to any number of threads.
#[derive(Clone, Copy)]
pub struct Table<'a> {
    descriptor: &'static TableDescriptor,
    schema: &'a TableSchema,
    data: &'a [u8],
    rows: u32,
}

impl<'a> Table<'a> {
    pub(crate) fn new(
        descriptor: &'static TableDescriptor,
        schema: &'a TableSchema,
        data: &'a [u8],
        rows: u32,
    ) -> Table<'a> {
        Table {
            descriptor,
            schema,
            data,
            rows,
        }
    }

    /// The table number.
    #[must_use]
    pub fn id(&self) -> TableId {
        self.descriptor.id
    }

    /// The table name as ECMA-335 spells it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// The catalog entry describing this table's columns.
    #[must_use]
    pub fn descriptor(&self) -> &'static TableDescriptor {
        self.descriptor
    }

    /// The resolved byte layout of this table's rows.
    #[must_use]
    pub fn schema(&self) -> &'a TableSchema {
        self.schema
    }

    /// The number of rows in this table.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.rows
    }

    /// The byte width of one row.
    #[must_use]
    pub fn stride(&self) -> u16 {
        self.schema.stride()
    }

    /// The table's packed row blob, exactly `row_count * stride` bytes.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Project the *i*-th row out of the blob.
    ///
    /// ## Arguments
    /// * `index` - The 0-based row index
    ///
    /// # Errors
    /// [`crate::Error::OutOfBounds`] when `index >= row_count`.
    pub fn row(&self, index: u32) -> Result<Row<'a>> {
        if index >= self.rows {
            return Err(OutOfBounds {
                index,
                rows: self.rows,
            });
        }

        let stride = self.schema.stride() as usize;
        let start = index as usize * stride;
        let Some(data) = self.data.get(start..start + stride) else {
            return Err(Truncated);
        };

        Ok(Row {
            descriptor: self.descriptor,
            schema: self.schema,
            data,
            index,
        })
    }

    /// Sequential iterator over all rows.
    #[must_use]
    pub fn rows(&self) -> RowIterator<'a> {
        RowIterator {
            table: *self,
            next: 0,
        }
    }

    /// Parallel iterator over all rows, for bulk scans of large tables.
    pub fn par_rows(&self) -> impl ParallelIterator<Item = Row<'a>> {
        let table = *self;
        (0..table.rows).into_par_iter().filter_map(move |index| table.row(index).ok())
    }
}

/// Typed projection of a single record.
///
/// Borrows the row's `stride`-byte span; every accessor reads little-endian,
/// unaligned-safe, at the offset the resolved schema assigns the column. Heap
/// and row index values are surfaced verbatim: they are 1-based in the file
/// format and 0 denotes an absent reference.
#[derive(Clone, Copy)]
pub struct Row<'a> {
    descriptor: &'static TableDescriptor,
    schema: &'a TableSchema,
    data: &'a [u8],
    index: u32,
}

impl<'a> Row<'a> {
    /// The raw bytes of this row, exactly `stride` long.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.data
    }

    /// The 0-based index of this row within its table.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    fn layout(&self, col: usize) -> Result<(usize, u8, ColumnKind)> {
        match self.schema.column(col) {
            Some((offset, width)) => {
                Ok((offset as usize, width, self.descriptor.columns[col].kind))
            }
            None => Err(SchemaMalformed("column index past the column list")),
        }
    }

    /// Read a 1-byte constant at the column's offset.
    ///
    /// # Errors
    /// [`crate::Error::Truncated`] when the read leaves the row span,
    /// [`crate::Error::SchemaMalformed`] for a column index past the list.
    pub fn u8(&self, col: usize) -> Result<u8> {
        let (mut offset, _, _) = self.layout(col)?;
        read_le_at::<u8>(self.data, &mut offset)
    }

    /// Read a 2-byte constant at the column's offset.
    ///
    /// # Errors
    /// [`crate::Error::Truncated`] when the read leaves the row span,
    /// [`crate::Error::SchemaMalformed`] for a column index past the list.
    pub fn u16(&self, col: usize) -> Result<u16> {
        let (mut offset, _, _) = self.layout(col)?;
        read_le_at::<u16>(self.data, &mut offset)
    }

    /// Read a 4-byte constant at the column's offset.
    ///
    /// # Errors
    /// [`crate::Error::Truncated`] when the read leaves the row span,
    /// [`crate::Error::SchemaMalformed`] for a column index past the list.
    pub fn u32(&self, col: usize) -> Result<u32> {
        let (mut offset, _, _) = self.layout(col)?;
        read_le_at::<u32>(self.data, &mut offset)
    }

    /// Read an 8-byte constant at the column's offset.
    ///
    /// # Errors
    /// [`crate::Error::Truncated`] when the read leaves the row span,
    /// [`crate::Error::SchemaMalformed`] for a column index past the list.
    pub fn u64(&self, col: usize) -> Result<u64> {
        let (mut offset, _, _) = self.layout(col)?;
        read_le_at::<u64>(self.data, &mut offset)
    }

    /// Read a `#Strings` heap index, width-normalised to `u32`.
    ///
    /// # Errors
    /// [`crate::Error::SchemaMalformed`] when the column is not a string-heap
    /// index, [`crate::Error::Truncated`] when the read leaves the row span.
    pub fn string_index(&self, col: usize) -> Result<u32> {
        self.heap_index(col, HeapKind::Str, "column is not a #Strings index")
    }

    /// Read a `#GUID` heap index, width-normalised to `u32`.
    ///
    /// # Errors
    /// [`crate::Error::SchemaMalformed`] when the column is not a GUID-heap
    /// index, [`crate::Error::Truncated`] when the read leaves the row span.
    pub fn guid_index(&self, col: usize) -> Result<u32> {
        self.heap_index(col, HeapKind::Guid, "column is not a #GUID index")
    }

    /// Read a `#Blob` heap index, width-normalised to `u32`.
    ///
    /// # Errors
    /// [`crate::Error::SchemaMalformed`] when the column is not a blob-heap
    /// index, [`crate::Error::Truncated`] when the read leaves the row span.
    pub fn blob_index(&self, col: usize) -> Result<u32> {
        self.heap_index(col, HeapKind::Blob, "column is not a #Blob index")
    }

    fn heap_index(&self, col: usize, expected: HeapKind, msg: &'static str) -> Result<u32> {
        let (mut offset, width, kind) = self.layout(col)?;
        match kind {
            ColumnKind::HeapIndex(heap) if heap == expected => {
                read_le_at_dyn(self.data, &mut offset, width == 4)
            }
            _ => Err(SchemaMalformed(msg)),
        }
    }

    /// Read a simple foreign key: the target table and the raw 1-based row
    /// number stored in the field (0 denotes absent).
    ///
    /// # Errors
    /// [`crate::Error::SchemaMalformed`] when the column is not a simple
    /// index, [`crate::Error::Truncated`] when the read leaves the row span.
    pub fn simple_index(&self, col: usize) -> Result<(TableId, u32)> {
        let (mut offset, width, kind) = self.layout(col)?;
        match kind {
            ColumnKind::SimpleIndex(target) => {
                let row = read_le_at_dyn(self.data, &mut offset, width == 4)?;
                Ok((target, row))
            }
            _ => Err(SchemaMalformed("column is not a simple index")),
        }
    }

    /// Read and decode a coded index reference.
    ///
    /// A stored value of 0 decodes to the family's first target with row 0,
    /// the null reference; check [`CodedIndex::is_null`].
    ///
    /// # Errors
    /// [`crate::Error::SchemaMalformed`] when the column is not a coded
    /// index, [`crate::Error::BadCodedIndex`] when the tag selects no target,
    /// [`crate::Error::Truncated`] when the read leaves the row span.
    pub fn coded_index(&self, col: usize) -> Result<CodedIndex> {
        let (mut offset, width, kind) = self.layout(col)?;
        match kind {
            ColumnKind::CodedIndex(family) => {
                let value = read_le_at_dyn(self.data, &mut offset, width == 4)?;
                let (table, row) = family.decode(value)?;
                Ok(CodedIndex { table, row })
            }
            _ => Err(SchemaMalformed("column is not a coded index")),
        }
    }
}

/// Sequential iterator over the rows of a [`Table`]. Finite and restartable;
/// a fresh one is handed out by every [`Table::rows`] call.
pub struct RowIterator<'a> {
    table: Table<'a>,
    next: u32,
}

impl<'a> Iterator for RowIterator<'a> {
    type Item = Row<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.table.rows {
            return None;
        }

        let row = self.table.row(self.next).ok();
        self.next += 1;
        row
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.rows - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::{catalog, HeapSizes, TableInfo};
    use crate::Error;

    fn typedef_table<'a>(
        schema: &'a TableSchema,
        data: &'a [u8],
        rows: u32,
    ) -> Table<'a> {
        Table::new(catalog(TableId::TypeDef), schema, data, rows)
    }

    #[test]
    fn typed_access_narrow() {
        let data = vec![
            0x01, 0x00, 0x10, 0x00, // Flags
            0x02, 0x02, // TypeName
            0x03, 0x03, // TypeNamespace
            0x0D, 0x00, // Extends: tag 1 -> TypeRef, row 3
            0x04, 0x04, // FieldList
            0x05, 0x05, // MethodList
        ];

        let info = TableInfo::new_test(&[(TableId::TypeDef, 1)], HeapSizes::empty());
        let schema = TableSchema::resolve(catalog(TableId::TypeDef), &info);
        let table = typedef_table(&schema, &data, 1);

        let row = table.row(0).unwrap();
        assert_eq!(row.u32(0).unwrap(), 0x0010_0001);
        assert_eq!(row.string_index(1).unwrap(), 0x0202);
        assert_eq!(row.string_index(2).unwrap(), 0x0303);

        let extends = row.coded_index(3).unwrap();
        assert_eq!(extends.table, TableId::TypeRef);
        assert_eq!(extends.row, 3);
        assert!(!extends.is_null());

        assert_eq!(row.simple_index(4).unwrap(), (TableId::Field, 0x0404));
        assert_eq!(row.simple_index(5).unwrap(), (TableId::MethodDef, 0x0505));
    }

    #[test]
    fn typed_access_wide() {
        // Large string heap and a large Field table widen their columns
        let data = vec![
            0x01, 0x00, 0x00, 0x00, // Flags
            0x02, 0x02, 0x02, 0x02, // TypeName
            0x03, 0x03, 0x03, 0x03, // TypeNamespace
            0x00, 0x00, // Extends: null
            0x04, 0x04, 0x04, 0x04, // FieldList
            0x05, 0x05, // MethodList
        ];

        let info = TableInfo::new_test(
            &[(TableId::TypeDef, 1), (TableId::Field, 0x1_0000)],
            HeapSizes::WIDE_STRING,
        );
        let schema = TableSchema::resolve(catalog(TableId::TypeDef), &info);
        assert_eq!(schema.stride(), 20);
        let table = typedef_table(&schema, &data, 1);

        let row = table.row(0).unwrap();
        assert_eq!(row.string_index(1).unwrap(), 0x0202_0202);
        assert!(row.coded_index(3).unwrap().is_null());
        assert_eq!(row.simple_index(4).unwrap(), (TableId::Field, 0x0404_0404));
    }

    #[test]
    fn out_of_bounds_row() {
        let info = TableInfo::new_test(&[(TableId::TypeDef, 1)], HeapSizes::empty());
        let schema = TableSchema::resolve(catalog(TableId::TypeDef), &info);
        let data = vec![0_u8; schema.stride() as usize];
        let table = typedef_table(&schema, &data, 1);

        assert!(table.row(0).is_ok());
        assert!(matches!(
            table.row(1),
            Err(Error::OutOfBounds { index: 1, rows: 1 })
        ));
    }

    #[test]
    fn accessor_misuse() {
        let info = TableInfo::new_test(&[(TableId::TypeDef, 1)], HeapSizes::empty());
        let schema = TableSchema::resolve(catalog(TableId::TypeDef), &info);
        let data = vec![0_u8; schema.stride() as usize];
        let table = typedef_table(&schema, &data, 1);
        let row = table.row(0).unwrap();

        // Flags is a constant, not a heap index
        assert!(matches!(row.string_index(0), Err(Error::SchemaMalformed(_))));
        // TypeName is a string index, not a blob index
        assert!(matches!(row.blob_index(1), Err(Error::SchemaMalformed(_))));
        // Extends is coded, not simple
        assert!(matches!(row.simple_index(3), Err(Error::SchemaMalformed(_))));
        // Past the column list
        assert!(matches!(row.u16(6), Err(Error::SchemaMalformed(_))));
    }

    #[test]
    fn field_read_past_row_span() {
        let info = TableInfo::new_test(&[(TableId::TypeDef, 1)], HeapSizes::empty());
        let schema = TableSchema::resolve(catalog(TableId::TypeDef), &info);
        let data = vec![0_u8; schema.stride() as usize];
        let table = typedef_table(&schema, &data, 1);
        let row = table.row(0).unwrap();

        // An 8-byte read at the last 2-byte column leaves the 14-byte span
        assert_eq!(row.u64(5), Err(Truncated));
    }

    #[test]
    fn row_iteration() {
        let info = TableInfo::new_test(&[(TableId::Field, 3)], HeapSizes::empty());
        let schema = TableSchema::resolve(catalog(TableId::Field), &info);
        let stride = schema.stride() as usize;

        let mut data = vec![0_u8; stride * 3];
        for (index, chunk) in data.chunks_mut(stride).enumerate() {
            chunk[0] = index as u8 + 1;
        }

        let table = Table::new(catalog(TableId::Field), &schema, &data, 3);

        let flags: Vec<u16> = table.rows().map(|row| row.u16(0).unwrap()).collect();
        assert_eq!(flags, vec![1, 2, 3]);
        assert_eq!(table.rows().len(), 3);

        // Restartable: a second pass sees the same rows
        let again: Vec<u16> = table.rows().map(|row| row.u16(0).unwrap()).collect();
        assert_eq!(again, flags);
    }

    #[test]
    fn parallel_rows_match_sequential() {
        let info = TableInfo::new_test(&[(TableId::Field, 64)], HeapSizes::empty());
        let schema = TableSchema::resolve(catalog(TableId::Field), &info);
        let stride = schema.stride() as usize;

        let mut data = vec![0_u8; stride * 64];
        for (index, chunk) in data.chunks_mut(stride).enumerate() {
            chunk[0] = index as u8;
        }

        let table = Table::new(catalog(TableId::Field), &schema, &data, 64);

        let sequential: u32 = table.rows().map(|row| u32::from(row.u8(0).unwrap())).sum();
        let parallel: u32 = table
            .par_rows()
            .map(|row| u32::from(row.u8(0).unwrap()))
            .sum();
        assert_eq!(sequential, parallel);
    }
}
