use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifies one of the metadata tables defined for the `#~` stream.
///
/// The discriminant of each variant is the table number used by the `Valid` and
/// `Sorted` bitmasks: bit position equals table number. Table numbers `0x2D..=0x3F`
/// are unassigned; a `Valid` bitmask naming one of them is rejected at parse time.
///
/// Iteration via [`strum::IntoEnumIterator`] visits tables in ascending table-number
/// order, which is also the order their row payloads appear in the stream.
///
/// ## Reference
/// * [ECMA-335 Partition II, Section 22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Metadata Tables
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash)]
#[repr(u8)]
pub enum TableId {
    /// `Module` table (0x00) - the one row describing the current module.
    Module = 0x00,
    /// `TypeRef` table (0x01) - references to types in external scopes.
    TypeRef = 0x01,
    /// `TypeDef` table (0x02) - types defined in this module.
    TypeDef = 0x02,
    /// `FieldPtr` table (0x03) - indirection layer for the Field table in
    /// unoptimized (`#-`) streams.
    FieldPtr = 0x03,
    /// `Field` table (0x04) - field definitions.
    Field = 0x04,
    /// `MethodPtr` table (0x05) - indirection layer for the MethodDef table.
    MethodPtr = 0x05,
    /// `MethodDef` table (0x06) - method definitions.
    MethodDef = 0x06,
    /// `ParamPtr` table (0x07) - indirection layer for the Param table.
    ParamPtr = 0x07,
    /// `Param` table (0x08) - parameter definitions.
    Param = 0x08,
    /// `InterfaceImpl` table (0x09) - interfaces implemented by types.
    InterfaceImpl = 0x09,
    /// `MemberRef` table (0x0A) - references to members of external types.
    MemberRef = 0x0A,
    /// `Constant` table (0x0B) - compile-time constants for fields, params and properties.
    Constant = 0x0B,
    /// `CustomAttribute` table (0x0C) - custom attribute applications.
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table (0x0D) - marshalling descriptors for interop.
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table (0x0E) - declarative security permissions.
    DeclSecurity = 0x0E,
    /// `ClassLayout` table (0x0F) - explicit packing and size for types.
    ClassLayout = 0x0F,
    /// `FieldLayout` table (0x10) - explicit field offsets.
    FieldLayout = 0x10,
    /// `StandAloneSig` table (0x11) - standalone signatures.
    StandAloneSig = 0x11,
    /// `EventMap` table (0x12) - mapping from types to their events.
    EventMap = 0x12,
    /// `EventPtr` table (0x13) - indirection layer for the Event table.
    EventPtr = 0x13,
    /// `Event` table (0x14) - event definitions.
    Event = 0x14,
    /// `PropertyMap` table (0x15) - mapping from types to their properties.
    PropertyMap = 0x15,
    /// `PropertyPtr` table (0x16) - indirection layer for the Property table.
    PropertyPtr = 0x16,
    /// `Property` table (0x17) - property definitions.
    Property = 0x17,
    /// `MethodSemantics` table (0x18) - associates methods with events and properties.
    MethodSemantics = 0x18,
    /// `MethodImpl` table (0x19) - explicit method implementation overrides.
    MethodImpl = 0x19,
    /// `ModuleRef` table (0x1A) - references to external modules.
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B) - instantiated and constructed type signatures.
    TypeSpec = 0x1B,
    /// `ImplMap` table (0x1C) - P/Invoke mappings.
    ImplMap = 0x1C,
    /// `FieldRVA` table (0x1D) - initial data locations for fields.
    FieldRVA = 0x1D,
    /// `EncLog` table (0x1E) - Edit-and-Continue log.
    EncLog = 0x1E,
    /// `EncMap` table (0x1F) - Edit-and-Continue token remapping.
    EncMap = 0x1F,
    /// `Assembly` table (0x20) - the defining assembly's identity.
    Assembly = 0x20,
    /// `AssemblyProcessor` table (0x21) - processor information (unused in practice).
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` table (0x22) - OS information (unused in practice).
    AssemblyOS = 0x22,
    /// `AssemblyRef` table (0x23) - referenced assembly identities.
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` table (0x24) - processor info for references.
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` table (0x25) - OS info for references.
    AssemblyRefOS = 0x25,
    /// `File` table (0x26) - files of a multi-file assembly.
    File = 0x26,
    /// `ExportedType` table (0x27) - types exported from other modules of this assembly.
    ExportedType = 0x27,
    /// `ManifestResource` table (0x28) - embedded or linked resources.
    ManifestResource = 0x28,
    /// `NestedClass` table (0x29) - nesting relationships between types.
    NestedClass = 0x29,
    /// `GenericParam` table (0x2A) - generic parameter definitions.
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B) - instantiated generic methods.
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table (0x2C) - constraints on generic parameters.
    GenericParamConstraint = 0x2C,
}

impl TableId {
    /// The highest table number this catalog defines.
    pub const MAX: u8 = TableId::GenericParamConstraint as u8;

    /// Resolve a raw table number to its [`TableId`], or `None` for numbers
    /// outside the catalog.
    ///
    /// ## Arguments
    /// * `number` - The raw table number (bit position in `Valid`/`Sorted`)
    #[must_use]
    pub fn from_number(number: u8) -> Option<TableId> {
        if number > Self::MAX {
            return None;
        }

        TableId::iter().find(|id| *id as u8 == number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::EnumCount;

    #[test]
    fn discriminants_are_dense() {
        // Table numbers 0x00..=0x2C are all assigned, in declaration order.
        for (position, id) in TableId::iter().enumerate() {
            assert_eq!(id as usize, position);
        }
        assert_eq!(TableId::COUNT, 45);
        assert_eq!(TableId::MAX, 0x2C);
    }

    #[test]
    fn from_number_roundtrip() {
        for id in TableId::iter() {
            assert_eq!(TableId::from_number(id as u8), Some(id));
        }

        assert_eq!(TableId::from_number(0x2D), None);
        assert_eq!(TableId::from_number(0x3F), None);
    }
}
