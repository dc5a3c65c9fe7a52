//! Low-level binary reading utilities.
//!
//! The outer loader hands this crate a borrowed byte slice containing a `#~` stream;
//! everything in here operates on such slices. PE/COFF parsing and the CLI header walk
//! that locate the stream live with the caller, not here.

pub(crate) mod io;
