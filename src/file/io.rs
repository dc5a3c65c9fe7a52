//! Low-level byte order and safe reading utilities for tables stream parsing.
//!
//! This module provides the [`LeRead`] trait for safe, little-endian reading of the
//! unsigned integer widths that appear in metadata table records. It is used throughout
//! the metadata modules to ensure correct parsing of binary data structures.

use crate::{Error::Truncated, Result};

/// Trait for implementing type specific safe readers.
///
/// This trait abstracts over reading unsigned integers from byte slices in a safe and
/// endian-aware way. It is implemented for the widths a table record can carry
/// (1, 2, 4 and 8 bytes).
pub trait LeRead: Sized {
    #[allow(missing_docs)]
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

impl LeRead for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }
}

impl LeRead for u16 {
    type Bytes = [u8; 2];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u16::from_le_bytes(bytes)
    }
}

impl LeRead for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }
}

impl LeRead for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }
}

/// Generic method to safely read T in little-endian from a data stream.
///
/// ## Arguments
/// * 'data' - The data buffer / stream to read from
pub fn read_le<T: LeRead>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Generic method to safely read T from an offset and in little-endian from a data stream.
///
/// ## Arguments
/// * 'data'    - The data buffer / stream to read from
/// * 'offset'  - An offset to read from, will be advanced by the amount of bytes read
pub fn read_le_at<T: LeRead>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(Truncated);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(Truncated);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Safely read 4 or 2 bytes from an offset and in little-endian from a data stream.
///
/// ## Arguments
/// * 'data'        - The data buffer / stream to read from
/// * 'offset'      - An offset to read from, will be advanced by the amount of bytes read
/// * `is_large`    - Indicates if 2 or 4 bytes should be read
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}
