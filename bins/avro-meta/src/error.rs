#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Meta(#[from] avro_meta::MetaError),

    #[error("store: {0}")]
    Store(#[from] avro_meta_api::StoreError),

    #[error("unknown store kind '{0}' (expected \"memory\" or \"file\")")]
    UnknownStore(String),

    #[error("'{0}' needs a persistent store: the memory store is discarded on exit, set [store] kind = \"file\"")]
    EphemeralStore(&'static str),

    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} configuration error(s)")]
    CheckFailed(usize),
}
