//! The compiled binary catalog format.
//!
//! A compiled catalog is a 16 byte magic number followed by tagged blocks
//! (`u8 tag`, `u32 length`, payload), all big-endian. Messages are found
//! through a sorted table of (hash, offset) pairs; stripped catalogs omit
//! key fields a lookup can do without and add a context hash table.

pub mod context_table;
pub mod error;
/// Wire constants and byte helpers.
mod format;
pub mod hash;
pub mod reader;
pub mod writer;

pub use context_table::ContextTable;
pub use error::QmError;
pub use format::{
    BlockTag,
    MAGIC,
    RecordTag,
};
pub use hash::{
    elf_hash,
    record_hash,
};
pub use reader::{
    QmFile,
    decompile,
};
pub use writer::{
    Compiled,
    ReleaseOptions,
    ReleaseStats,
    SaveMode,
    compile,
    write_to,
};
