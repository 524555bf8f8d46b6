use crate::error::MetaError;

/// One input path pattern with its matching rules (row view of
/// `FileLocations`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileLocation {
    pub file_name: String,
    pub file_mask: String,
    pub exclude_file_mask: String,
    pub file_required: bool,
    pub include_sub_folders: bool,
    /// Where the path is resolved (local, named cluster, ...). Empty = default.
    pub environment: String,
}

impl FileLocation {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self { file_name: file_name.into(), ..Self::default() }
    }
}

/// Input file locations as parallel arrays.
///
/// The arrays are public because editors fill them column by column and may
/// leave some shorter than others. `normalize()` pads every array to the
/// longest one. `AvroInputMeta` normalizes in place before a save; the
/// codecs read through `padded_rows()` so a ragged block is never lost.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileLocations {
    pub file_name: Vec<String>,
    pub file_mask: Vec<String>,
    pub exclude_file_mask: Vec<String>,
    pub file_required: Vec<bool>,
    pub include_sub_folders: Vec<bool>,
    pub environment: Vec<String>,
}

impl FileLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows. Always consistent.
    pub fn from_rows(rows: impl IntoIterator<Item = FileLocation>) -> Self {
        let mut block = Self::new();
        for row in rows {
            block.push(row);
        }
        block
    }

    /// Append one row. Normalizes first so the row lands at the same index
    /// in every array.
    pub fn push(&mut self, row: FileLocation) {
        self.normalize();
        self.file_name.push(row.file_name);
        self.file_mask.push(row.file_mask);
        self.exclude_file_mask.push(row.exclude_file_mask);
        self.file_required.push(row.file_required);
        self.include_sub_folders.push(row.include_sub_folders);
        self.environment.push(row.environment);
    }

    /// Length of the longest array.
    pub fn len(&self) -> usize {
        self.lengths().into_iter().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lengths(&self) -> [usize; 6] {
        [
            self.file_name.len(),
            self.file_mask.len(),
            self.exclude_file_mask.len(),
            self.file_required.len(),
            self.include_sub_folders.len(),
            self.environment.len(),
        ]
    }

    pub fn is_consistent(&self) -> bool {
        let lengths = self.lengths();
        lengths.iter().all(|&l| l == lengths[0])
    }

    /// Pad every array to the longest one: `""` for text, `false` for flags.
    /// Never truncates. Returns the number of rows.
    pub fn normalize(&mut self) -> usize {
        let n = self.len();
        self.file_name.resize(n, String::new());
        self.file_mask.resize(n, String::new());
        self.exclude_file_mask.resize(n, String::new());
        self.file_required.resize(n, false);
        self.include_sub_folders.resize(n, false);
        self.environment.resize(n, String::new());
        n
    }

    pub fn check_consistent(&self) -> Result<usize, MetaError> {
        if self.is_consistent() {
            Ok(self.file_name.len())
        } else {
            Err(MetaError::InvariantViolation(format!(
                "file locations arrays differ in length: {:?}",
                self.lengths()
            )))
        }
    }

    /// Row view. Fails when the block was not normalized.
    pub fn rows(&self) -> Result<Vec<FileLocation>, MetaError> {
        self.check_consistent()?;
        Ok(self.padded_rows())
    }

    /// Row view of the block as `normalize()` would leave it. `self` is not
    /// touched.
    pub fn padded_rows(&self) -> Vec<FileLocation> {
        (0..self.len())
            .map(|i| FileLocation {
                file_name: self.file_name.get(i).cloned().unwrap_or_default(),
                file_mask: self.file_mask.get(i).cloned().unwrap_or_default(),
                exclude_file_mask: self.exclude_file_mask.get(i).cloned().unwrap_or_default(),
                file_required: self.file_required.get(i).copied().unwrap_or(false),
                include_sub_folders: self.include_sub_folders.get(i).copied().unwrap_or(false),
                environment: self.environment.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }
}
