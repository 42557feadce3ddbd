//! `pdfhunt` crate (library surface).
//!
//! The primary entrypoint is the `pdfhunt` binary. This library exists so the selection
//! boundary and the core types can be reused without depending on internal crate layout.

pub mod selection;

pub use pdfhunt_core as core;
pub use pdfhunt_local as local;
