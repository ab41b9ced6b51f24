//! linguist-qm
//!
//! Compiler and decompiler for compact binary translation catalogs (`.qm`),
//! with the in-memory message store and plural rules they depend on.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod locale;
pub mod numerus;
pub mod qm;
pub mod release;

/// Entry builders shared by unit tests.
#[cfg(test)]
mod test_utils;

pub use catalog::{
    Catalog,
    CatalogEntry,
};
pub use diagnostics::Diagnostics;
pub use qm::{
    QmError,
    ReleaseOptions,
    SaveMode,
};
