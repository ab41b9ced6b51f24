//! Translation catalogs: the entry model and the indexed message store.

pub mod entry;
pub mod index;
pub mod store;

pub use entry::{
    CONTEXT_COMMENT,
    CatalogEntry,
    EntryType,
    Reference,
    elided_id,
    make_msg_id,
};
pub use store::{
    Catalog,
    Duplicates,
    LocationsType,
    normalized_translations,
};
