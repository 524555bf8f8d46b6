use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use avro_meta_api::{AttributeStore, ObjectId, StepAttribute, StoreError};

use super::config::{DiskAttribute, WriteMode};

// ════════════════════════════════════════════════════════════════
//  FileAttributeStore
// ════════════════════════════════════════════════════════════════

/// JSON-lines attribute store: one file per step.
///
/// A process-wide mutex serializes file access; concurrent processes on the
/// same directory are not coordinated.
pub struct FileAttributeStore {
    data_dir: PathBuf,
    write_mode: WriteMode,
    io: Mutex<()>,
}

type Attributes = BTreeMap<(String, usize), DiskAttribute>;

impl FileAttributeStore {
    pub fn open(data_dir: impl AsRef<Path>, write_mode: WriteMode) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| StoreError::io(format!("mkdir {}: {e}", data_dir.display())))?;
        Ok(Self {
            data_dir,
            write_mode,
            io: Mutex::new(()),
        })
    }

    /// Path of the step file. Step ids become file names, so anything that
    /// could escape `data_dir` is refused.
    fn step_path(&self, step: &ObjectId) -> Result<PathBuf, StoreError> {
        let id = step.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !id.starts_with('.');
        if !valid {
            return Err(StoreError::config(format!("step id '{id}' is not usable as a file name")));
        }
        Ok(self.data_dir.join(format!("{id}.jsonl")))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>, StoreError> {
        self.io.lock().map_err(|_| StoreError::new("file store lock poisoned"))
    }

    /// Fold the step file into its latest attribute values.
    fn load(&self, path: &Path) -> Result<Attributes, StoreError> {
        let mut attrs = Attributes::new();
        let f = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(attrs),
            Err(e) => return Err(StoreError::io(format!("open {}: {e}", path.display()))),
        };
        for line in std::io::BufReader::new(f).lines() {
            let line = line.map_err(|e| StoreError::io(format!("read line: {e}")))?;
            if line.is_empty() {
                continue;
            }
            let attr: DiskAttribute = serde_json::from_str(&line)
                .map_err(|e| StoreError::format_err(format!("parse {}: {e}", path.display())))?;
            attrs.insert((attr.code.clone(), attr.nr), attr);
        }
        Ok(attrs)
    }

    fn rewrite(&self, path: &Path, attrs: &Attributes) -> Result<(), StoreError> {
        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut f = std::fs::File::create(&tmp)
                .map_err(|e| StoreError::io(format!("create {}: {e}", tmp.display())))?;
            for attr in attrs.values() {
                writeln!(f, "{}", serde_json::to_string(attr)?)
                    .map_err(|e| StoreError::io(format!("write: {e}")))?;
            }
            f.sync_all().map_err(|e| StoreError::io(format!("sync: {e}")))?;
        }
        std::fs::rename(&tmp, path)
            .map_err(|e| StoreError::io(format!("rename {}: {e}", tmp.display())))
    }

    fn append(&self, path: &Path, attr: &DiskAttribute) -> Result<(), StoreError> {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| StoreError::io(format!("open {}: {e}", path.display())))?;
        writeln!(f, "{}", serde_json::to_string(attr)?)
            .map_err(|e| StoreError::io(format!("write: {e}")))
    }
}

// ════════════════════════════════════════════════════════════════
//  AttributeStore impl
// ════════════════════════════════════════════════════════════════

impl AttributeStore for FileAttributeStore {
    fn save_step_attribute(
        &self,
        transformation: &ObjectId,
        step: &ObjectId,
        nr: usize,
        code: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let path = self.step_path(step)?;
        let attr = DiskAttribute {
            transformation: transformation.to_string(),
            code: code.to_string(),
            nr,
            value: value.to_string(),
        };
        let _guard = self.lock()?;
        match self.write_mode {
            WriteMode::Append => self.append(&path, &attr),
            WriteMode::Upsert => {
                let mut attrs = self.load(&path)?;
                attrs.insert((attr.code.clone(), nr), attr);
                self.rewrite(&path, &attrs)
            }
        }
    }

    fn step_attribute(
        &self,
        step: &ObjectId,
        nr: usize,
        code: &str,
    ) -> Result<Option<String>, StoreError> {
        let path = self.step_path(step)?;
        let _guard = self.lock()?;
        let attrs = self.load(&path)?;
        Ok(attrs.get(&(code.to_string(), nr)).map(|a| a.value.clone()))
    }

    fn count_step_attributes(&self, step: &ObjectId, code: &str) -> Result<usize, StoreError> {
        let path = self.step_path(step)?;
        let _guard = self.lock()?;
        let attrs = self.load(&path)?;
        Ok(attrs.keys().filter(|(c, _)| c == code).count())
    }

    fn delete_step_attributes(&self, step: &ObjectId) -> Result<(), StoreError> {
        let path = self.step_path(step)?;
        let _guard = self.lock()?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(step = %step, path = %path.display(), "removed step file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(format!("remove {}: {e}", path.display()))),
        }
    }

    /// One tmp-file write and rename for the whole step, in either write
    /// mode. The old file stays in place until the rename.
    fn replace_step_attributes(
        &self,
        transformation: &ObjectId,
        step: &ObjectId,
        attributes: &[StepAttribute],
    ) -> Result<(), StoreError> {
        let path = self.step_path(step)?;
        let attrs: Attributes = attributes
            .iter()
            .map(|a| {
                let attr = DiskAttribute {
                    transformation: transformation.to_string(),
                    code: a.code.clone(),
                    nr: a.nr,
                    value: a.value.clone(),
                };
                ((a.code.clone(), a.nr), attr)
            })
            .collect();
        let _guard = self.lock()?;
        self.rewrite(&path, &attrs)?;
        tracing::debug!(step = %step, attributes = attrs.len(), "replaced step file");
        Ok(())
    }
}
