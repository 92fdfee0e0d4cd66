pub mod collections;
pub mod kv;

pub use collections::{Collections, Storage, keys};
pub use kv::{FileStore, KeyValueStore, MemoryStore};

use crate::config::StorageConfig;
use crate::error::AppResult;

pub fn open_storage(config: &StorageConfig) -> AppResult<Storage> {
    let store = FileStore::open(&config.data_dir)?;
    Ok(Storage::new(store))
}
