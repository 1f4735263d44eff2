//! Loading configuration files into annotated records.
//!
//! Your starting point should probably be [`load_record_from_path`] for your own
//! record types, or [`Configuration::load_from_path`] for the bundled service schema.
//!
//! # Internals
//! Loading happens in two stages, based on unvalidated ("unresolved") and
//! validated ("resolved") configuration structures.
//!
//! The TOML file is first deserialized into an unresolved structure whose fields
//! are all optional in the file: anything missing keeps its zero value. That
//! structure implements [`Record`][crate::Record], so it is then run through
//! [`validate`][crate::validate], which applies `default` annotations and checks
//! `required` and `requires` ones.
//!
//! The validated structure is then turned into its resolved version by
//! [`resolve`][traits::ResolvableConfiguration::resolve], which is where any
//! additional semantic checks live, e.g. parsing logging filters or canonicalizing paths.

#![allow(rustdoc::private_intra_doc_links)]

mod structure;
mod traits;
mod utilities;

pub use structure::*;
pub use utilities::{get_default_configuration_file_path, load_record_from_path, load_record_from_str};
