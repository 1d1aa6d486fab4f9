//! # Lumen Formats
//!
//! Photometric file readers for the Lumen framework. Every reader produces
//! an immutable [`Edf`](lumen_core::Edf).
//!
//! Supported formats:
//! - [IES LM-63](ies): revisions 1986, 1991, 1995 and 2002, photometric
//!   type C (types A and B load with a warning)

pub mod ies;

pub use ies::{load, parse_str, IesError, LoadPolicy};
