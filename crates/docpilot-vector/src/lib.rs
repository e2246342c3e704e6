//! LanceDB-backed index store.

pub mod collection;
pub mod schema;
pub mod table;

pub use collection::LanceCollection;
pub use table::LanceStore;
