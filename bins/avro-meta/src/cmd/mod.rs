pub mod check;
pub mod export;
pub mod import;
pub mod schema;

use std::path::Path;
use std::sync::Arc;

use avro_meta::config::StoreConfig;
use avro_meta::AvroInputMeta;
use avro_meta_api::{AttributeStore, StoreFactory};
use avro_meta_store_file::FileStoreFactory;
use avro_meta_store_memory::MemoryStoreFactory;

use crate::error::CliError;

/// Build the attribute store named by `[store] kind`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn AttributeStore>, CliError> {
    let factory: &dyn StoreFactory = match config.kind.as_str() {
        "memory" => &MemoryStoreFactory,
        "file" => &FileStoreFactory,
        other => return Err(CliError::UnknownStore(other.to_string())),
    };
    let store = factory.create(&config.config_json())?;
    tracing::debug!(kind = %config.kind, "opened attribute store");
    Ok(store)
}

/// Store for commands whose result must outlive the process.
pub fn open_persistent_store(
    config: &StoreConfig,
    command: &'static str,
) -> Result<Arc<dyn AttributeStore>, CliError> {
    if config.kind == "memory" {
        return Err(CliError::EphemeralStore(command));
    }
    open_store(config)
}

pub fn read_step_markup(path: &Path) -> Result<AvroInputMeta, CliError> {
    let xml = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut meta = AvroInputMeta::new();
    meta.load_xml(&xml)
        .map_err(|e| CliError::Meta(e.with_context(path.display())))?;
    Ok(meta)
}

pub fn write_output(out: Option<&Path>, text: &str) -> Result<(), CliError> {
    match out {
        Some(path) => std::fs::write(path, text).map_err(|source| CliError::Io {
            path: path.display().to_string(),
            source,
        }),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
