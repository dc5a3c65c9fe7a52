//! Metadata table parsing for CLI and Windows Metadata binaries.
//!
//! This module contains the tables-stream decoding infrastructure: the static
//! table catalog, the dynamically sized schemata, and the `#~` stream reader.
//!
//! # Key Components
//!
//! - [`streams`] - The tables stream reader ([`streams::TablesStream`])
//! - [`tables`] - Table catalog, index-width rules, schema resolution and
//!   typed record access

pub mod streams;
pub mod tables;
