//! The static table catalog.
//!
//! Every metadata table is described here as a value: an ordered list of named
//! columns, each tagged with the rule that determines its byte width. The schema
//! resolver walks these descriptors against the row counts and heap flags of a
//! concrete stream to produce byte-exact layouts; the record accessor consults
//! them to type-check field access. Column layouts follow ECMA-335 §II.22, with
//! the CLR layouts for the Ptr and Enc tables the standard omits.

use strum::EnumCount;

use crate::metadata::tables::{CodedIndexType, TableId};

/// Names one of the three heaps a table column can index into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeapKind {
    /// The `#Strings` heap
    Str,
    /// The `#GUID` heap
    Guid,
    /// The `#Blob` heap
    Blob,
}

/// The width rule of a single table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// A fixed-width unsigned constant of 1, 2, 4 or 8 bytes.
    Constant(u8),
    /// A 1-based index into one of the heaps; 2 or 4 bytes per `HeapSizes`.
    HeapIndex(HeapKind),
    /// A 1-based row index into exactly one target table; 2 or 4 bytes
    /// depending on that table's row count.
    SimpleIndex(TableId),
    /// A tagged reference multiplexing several target tables; 2 or 4 bytes
    /// depending on the largest target's row count and the tag width.
    CodedIndex(CodedIndexType),
}

/// One column of a metadata table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    /// The column name as ECMA-335 spells it
    pub name: &'static str,
    /// The rule that determines the column's byte width
    pub kind: ColumnKind,
}

/// Describes one metadata table: its number, name and ordered column list.
#[derive(Debug, PartialEq, Eq)]
pub struct TableDescriptor {
    /// The table number
    pub id: TableId,
    /// The table name as ECMA-335 spells it
    pub name: &'static str,
    /// The ordered column list
    pub columns: &'static [Column],
}

impl TableDescriptor {
    /// Find a column's position by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }
}

const fn cnst(name: &'static str, width: u8) -> Column {
    Column {
        name,
        kind: ColumnKind::Constant(width),
    }
}

const fn heap(name: &'static str, kind: HeapKind) -> Column {
    Column {
        name,
        kind: ColumnKind::HeapIndex(kind),
    }
}

const fn simple(name: &'static str, target: TableId) -> Column {
    Column {
        name,
        kind: ColumnKind::SimpleIndex(target),
    }
}

const fn coded(name: &'static str, family: CodedIndexType) -> Column {
    Column {
        name,
        kind: ColumnKind::CodedIndex(family),
    }
}

const fn table(
    id: TableId,
    name: &'static str,
    columns: &'static [Column],
) -> TableDescriptor {
    TableDescriptor { id, name, columns }
}

/// The catalog itself, indexed by table number.
static CATALOG: [TableDescriptor; TableId::COUNT] = [
    table(
        TableId::Module,
        "Module",
        &[
            cnst("Generation", 2),
            heap("Name", HeapKind::Str),
            heap("Mvid", HeapKind::Guid),
            heap("EncId", HeapKind::Guid),
            heap("EncBaseId", HeapKind::Guid),
        ],
    ),
    table(
        TableId::TypeRef,
        "TypeRef",
        &[
            coded("ResolutionScope", CodedIndexType::ResolutionScope),
            heap("TypeName", HeapKind::Str),
            heap("TypeNamespace", HeapKind::Str),
        ],
    ),
    table(
        TableId::TypeDef,
        "TypeDef",
        &[
            cnst("Flags", 4),
            heap("TypeName", HeapKind::Str),
            heap("TypeNamespace", HeapKind::Str),
            coded("Extends", CodedIndexType::TypeDefOrRef),
            simple("FieldList", TableId::Field),
            simple("MethodList", TableId::MethodDef),
        ],
    ),
    table(
        TableId::FieldPtr,
        "FieldPtr",
        &[simple("Field", TableId::Field)],
    ),
    table(
        TableId::Field,
        "Field",
        &[
            cnst("Flags", 2),
            heap("Name", HeapKind::Str),
            heap("Signature", HeapKind::Blob),
        ],
    ),
    table(
        TableId::MethodPtr,
        "MethodPtr",
        &[simple("Method", TableId::MethodDef)],
    ),
    table(
        TableId::MethodDef,
        "MethodDef",
        &[
            cnst("Rva", 4),
            cnst("ImplFlags", 2),
            cnst("Flags", 2),
            heap("Name", HeapKind::Str),
            heap("Signature", HeapKind::Blob),
            simple("ParamList", TableId::Param),
        ],
    ),
    table(
        TableId::ParamPtr,
        "ParamPtr",
        &[simple("Param", TableId::Param)],
    ),
    table(
        TableId::Param,
        "Param",
        &[
            cnst("Flags", 2),
            cnst("Sequence", 2),
            heap("Name", HeapKind::Str),
        ],
    ),
    table(
        TableId::InterfaceImpl,
        "InterfaceImpl",
        &[
            simple("Class", TableId::TypeDef),
            coded("Interface", CodedIndexType::TypeDefOrRef),
        ],
    ),
    table(
        TableId::MemberRef,
        "MemberRef",
        &[
            coded("Class", CodedIndexType::MemberRefParent),
            heap("Name", HeapKind::Str),
            heap("Signature", HeapKind::Blob),
        ],
    ),
    table(
        TableId::Constant,
        "Constant",
        &[
            cnst("Type", 1),
            cnst("Padding", 1),
            coded("Parent", CodedIndexType::HasConstant),
            heap("Value", HeapKind::Blob),
        ],
    ),
    table(
        TableId::CustomAttribute,
        "CustomAttribute",
        &[
            coded("Parent", CodedIndexType::HasCustomAttribute),
            coded("Type", CodedIndexType::CustomAttributeType),
            heap("Value", HeapKind::Blob),
        ],
    ),
    table(
        TableId::FieldMarshal,
        "FieldMarshal",
        &[
            coded("Parent", CodedIndexType::HasFieldMarshal),
            heap("NativeType", HeapKind::Blob),
        ],
    ),
    table(
        TableId::DeclSecurity,
        "DeclSecurity",
        &[
            cnst("Action", 2),
            coded("Parent", CodedIndexType::HasDeclSecurity),
            heap("PermissionSet", HeapKind::Blob),
        ],
    ),
    table(
        TableId::ClassLayout,
        "ClassLayout",
        &[
            cnst("PackingSize", 2),
            cnst("ClassSize", 4),
            simple("Parent", TableId::TypeDef),
        ],
    ),
    table(
        TableId::FieldLayout,
        "FieldLayout",
        &[cnst("Offset", 4), simple("Field", TableId::Field)],
    ),
    table(
        TableId::StandAloneSig,
        "StandAloneSig",
        &[heap("Signature", HeapKind::Blob)],
    ),
    table(
        TableId::EventMap,
        "EventMap",
        &[
            simple("Parent", TableId::TypeDef),
            simple("EventList", TableId::Event),
        ],
    ),
    table(
        TableId::EventPtr,
        "EventPtr",
        &[simple("Event", TableId::Event)],
    ),
    table(
        TableId::Event,
        "Event",
        &[
            cnst("EventFlags", 2),
            heap("Name", HeapKind::Str),
            coded("EventType", CodedIndexType::TypeDefOrRef),
        ],
    ),
    table(
        TableId::PropertyMap,
        "PropertyMap",
        &[
            simple("Parent", TableId::TypeDef),
            simple("PropertyList", TableId::Property),
        ],
    ),
    table(
        TableId::PropertyPtr,
        "PropertyPtr",
        &[simple("Property", TableId::Property)],
    ),
    table(
        TableId::Property,
        "Property",
        &[
            cnst("Flags", 2),
            heap("Name", HeapKind::Str),
            heap("Type", HeapKind::Blob),
        ],
    ),
    table(
        TableId::MethodSemantics,
        "MethodSemantics",
        &[
            cnst("Semantics", 2),
            simple("Method", TableId::MethodDef),
            coded("Association", CodedIndexType::HasSemantics),
        ],
    ),
    table(
        TableId::MethodImpl,
        "MethodImpl",
        &[
            simple("Class", TableId::TypeDef),
            coded("MethodBody", CodedIndexType::MethodDefOrRef),
            coded("MethodDeclaration", CodedIndexType::MethodDefOrRef),
        ],
    ),
    table(
        TableId::ModuleRef,
        "ModuleRef",
        &[heap("Name", HeapKind::Str)],
    ),
    table(
        TableId::TypeSpec,
        "TypeSpec",
        &[heap("Signature", HeapKind::Blob)],
    ),
    table(
        TableId::ImplMap,
        "ImplMap",
        &[
            cnst("MappingFlags", 2),
            coded("MemberForwarded", CodedIndexType::MemberForwarded),
            heap("ImportName", HeapKind::Str),
            simple("ImportScope", TableId::ModuleRef),
        ],
    ),
    table(
        TableId::FieldRVA,
        "FieldRVA",
        &[cnst("Rva", 4), simple("Field", TableId::Field)],
    ),
    table(
        TableId::EncLog,
        "EncLog",
        &[cnst("Token", 4), cnst("FuncCode", 4)],
    ),
    table(TableId::EncMap, "EncMap", &[cnst("Token", 4)]),
    table(
        TableId::Assembly,
        "Assembly",
        &[
            cnst("HashAlgId", 4),
            cnst("MajorVersion", 2),
            cnst("MinorVersion", 2),
            cnst("BuildNumber", 2),
            cnst("RevisionNumber", 2),
            cnst("Flags", 4),
            heap("PublicKey", HeapKind::Blob),
            heap("Name", HeapKind::Str),
            heap("Culture", HeapKind::Str),
        ],
    ),
    table(
        TableId::AssemblyProcessor,
        "AssemblyProcessor",
        &[cnst("Processor", 4)],
    ),
    table(
        TableId::AssemblyOS,
        "AssemblyOS",
        &[
            cnst("OSPlatformId", 4),
            cnst("OSMajorVersion", 4),
            cnst("OSMinorVersion", 4),
        ],
    ),
    table(
        TableId::AssemblyRef,
        "AssemblyRef",
        &[
            cnst("MajorVersion", 2),
            cnst("MinorVersion", 2),
            cnst("BuildNumber", 2),
            cnst("RevisionNumber", 2),
            cnst("Flags", 4),
            heap("PublicKeyOrToken", HeapKind::Blob),
            heap("Name", HeapKind::Str),
            heap("Culture", HeapKind::Str),
            heap("HashValue", HeapKind::Blob),
        ],
    ),
    table(
        TableId::AssemblyRefProcessor,
        "AssemblyRefProcessor",
        &[
            cnst("Processor", 4),
            simple("AssemblyRef", TableId::AssemblyRef),
        ],
    ),
    table(
        TableId::AssemblyRefOS,
        "AssemblyRefOS",
        &[
            cnst("OSPlatformId", 4),
            cnst("OSMajorVersion", 4),
            cnst("OSMinorVersion", 4),
            simple("AssemblyRef", TableId::AssemblyRef),
        ],
    ),
    table(
        TableId::File,
        "File",
        &[
            cnst("Flags", 4),
            heap("Name", HeapKind::Str),
            heap("HashValue", HeapKind::Blob),
        ],
    ),
    table(
        TableId::ExportedType,
        "ExportedType",
        &[
            cnst("Flags", 4),
            cnst("TypeDefId", 4),
            heap("TypeName", HeapKind::Str),
            heap("TypeNamespace", HeapKind::Str),
            coded("Implementation", CodedIndexType::Implementation),
        ],
    ),
    table(
        TableId::ManifestResource,
        "ManifestResource",
        &[
            cnst("Offset", 4),
            cnst("Flags", 4),
            heap("Name", HeapKind::Str),
            coded("Implementation", CodedIndexType::Implementation),
        ],
    ),
    table(
        TableId::NestedClass,
        "NestedClass",
        &[
            simple("NestedClass", TableId::TypeDef),
            simple("EnclosingClass", TableId::TypeDef),
        ],
    ),
    table(
        TableId::GenericParam,
        "GenericParam",
        &[
            cnst("Number", 2),
            cnst("Flags", 2),
            coded("Owner", CodedIndexType::TypeOrMethodDef),
            heap("Name", HeapKind::Str),
        ],
    ),
    table(
        TableId::MethodSpec,
        "MethodSpec",
        &[
            coded("Method", CodedIndexType::MethodDefOrRef),
            heap("Instantiation", HeapKind::Blob),
        ],
    ),
    table(
        TableId::GenericParamConstraint,
        "GenericParamConstraint",
        &[
            simple("Owner", TableId::GenericParam),
            coded("Constraint", CodedIndexType::TypeDefOrRef),
        ],
    ),
];

/// Look up the descriptor of a table.
///
/// Total over [`TableId`]; the catalog defines every table the `Valid` bitmask
/// can legally name.
#[must_use]
pub fn catalog(id: TableId) -> &'static TableDescriptor {
    &CATALOG[id as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn catalog_positions_match_ids() {
        for id in TableId::iter() {
            let descriptor = catalog(id);
            assert_eq!(descriptor.id, id);
            assert!(!descriptor.columns.is_empty());
        }
    }

    #[test]
    fn column_lookup() {
        let typedef = catalog(TableId::TypeDef);
        assert_eq!(typedef.column_index("Extends"), Some(3));
        assert_eq!(typedef.column_index("NoSuchColumn"), None);

        assert_eq!(
            typedef.columns[4].kind,
            ColumnKind::SimpleIndex(TableId::Field)
        );
    }

    #[test]
    fn constant_widths_are_legal() {
        for id in TableId::iter() {
            for column in catalog(id).columns {
                if let ColumnKind::Constant(width) = column.kind {
                    assert!(matches!(width, 1 | 2 | 4 | 8), "{}", column.name);
                }
            }
        }
    }
}
