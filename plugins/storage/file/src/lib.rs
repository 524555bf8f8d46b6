mod config;
mod storage;

use std::sync::Arc;

use avro_meta_api::{AttributeStore, StoreError, StoreFactory};

use config::FileStoreConfig;
pub use config::WriteMode;
pub use storage::FileAttributeStore;

// ════════════════════════════════════════════════════════════════
//  Factory
// ════════════════════════════════════════════════════════════════

pub struct FileStoreFactory;

impl StoreFactory for FileStoreFactory {
    fn create(&self, config_json: &str) -> Result<Arc<dyn AttributeStore>, StoreError> {
        let cfg: FileStoreConfig = serde_json::from_str(config_json)
            .map_err(|e| StoreError::config(format!("file store config: {e}")))?;
        if cfg.data_dir.is_empty() {
            return Err(StoreError::config("file store: data_dir is required"));
        }
        let store = FileAttributeStore::open(&cfg.data_dir, cfg.write_mode)?;
        Ok(Arc::new(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_requires_data_dir() {
        assert!(FileStoreFactory.create("{}").is_err());
        assert!(FileStoreFactory.create(r#"{"data_dir": ""}"#).is_err());
    }

    #[test]
    fn factory_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("repo");
        let json = serde_json::json!({ "data_dir": data_dir, "write_mode": "append" }).to_string();
        assert!(FileStoreFactory.create(&json).is_ok());
        assert!(data_dir.is_dir());
    }
}
