// ════════════════════════════════════════════════════════════════
//  Configuration
// ════════════════════════════════════════════════════════════════

/// How attribute writes reach the step file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Rewrite the step file with the attribute replaced in place.
    #[default]
    Upsert,
    /// Append a line; readers keep the last line per `(code, nr)`.
    Append,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct FileStoreConfig {
    pub data_dir: String,
    #[serde(default)]
    pub write_mode: WriteMode,
}

// ════════════════════════════════════════════════════════════════
//  On-disk format
// ════════════════════════════════════════════════════════════════

/// One attribute per line of `{data_dir}/{step}.jsonl`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct DiskAttribute {
    pub transformation: String,
    pub code: String,
    pub nr: usize,
    pub value: String,
}
