mod gateway;
mod local_store;
mod models;
mod schema;
mod sqlite_store;
mod trait_def;

pub use gateway::{BookService, CommitOutcome, DEFAULT_CATALOG_NAME};
pub use local_store::{DeviceKv, FileDeviceKv, LocalBookStore};
pub use models::{Book, BookDraft, BookPatch, Catalog, CatalogPatch};
pub use sqlite_store::SqliteBookStore;
pub use trait_def::{BookStore, StoreError, StoreResult};
