//! Quote sources and persistence

pub mod index;
pub mod provider;
pub mod store;
pub mod yahoo;

pub use index::IndexFile;
pub use provider::{DataError, DataProvider, FetchResult, RawQuote};
pub use store::{JsonFileStore, PriorSnapshot, SnapshotStore, StoreError};
pub use yahoo::YahooProvider;
