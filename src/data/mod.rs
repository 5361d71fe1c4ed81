//! Data module - CSV loading, schema checks and the load cache

mod cache;
mod loader;
pub mod schema;

pub use cache::DatasetCache;
pub use loader::{DataLoader, DatasetKey, DatasetStatus, LoadedDatasets};
