use avro_meta_api::{AttributeStore, ObjectId, StepAttribute};

use crate::catalog;
use crate::codec::{MetaCodec, flag, parse_flag};
use crate::error::MetaError;
use crate::field::FieldDescriptor;
use crate::file_locations::{FileLocation, FileLocations};
use crate::meta::AvroInputMeta;

// Scalar attribute codes (row 0).
const FILENAME: &str = "filename";
const SCHEMA_FILENAME: &str = "schemaFilename";
const USE_STREAM_FIELD: &str = "useStreamField";
const STREAM_FIELD_NAME: &str = "stream_fieldname";

// File location rows. `FILE_NAME` is the anchor: its count is the row count.
const FILE_NAME: &str = "file_name";
const FILE_MASK: &str = "file_mask";
const EXCLUDE_FILE_MASK: &str = "exclude_file_mask";
const FILE_REQUIRED: &str = "file_required";
const INCLUDE_SUBFOLDERS: &str = "include_subfolders";
const ENVIRONMENT: &str = "environment";
const FILE_ROW: [&str; 6] = [
    FILE_NAME,
    FILE_MASK,
    EXCLUDE_FILE_MASK,
    FILE_REQUIRED,
    INCLUDE_SUBFOLDERS,
    ENVIRONMENT,
];

// Field rows. `FIELD_TYPE` is the anchor.
const FIELD_PATH: &str = "path";
const FIELD_NAME: &str = "name";
const FIELD_TYPE: &str = "type";
const FIELD_SOURCE_TYPE: &str = "sourcetype";
const FIELD_NULLABLE: &str = "nullable";
const FIELD_DEFAULT: &str = "default";
const FIELD_ROW: [&str; 6] = [
    FIELD_TYPE,
    FIELD_PATH,
    FIELD_NAME,
    FIELD_SOURCE_TYPE,
    FIELD_NULLABLE,
    FIELD_DEFAULT,
];

/// Attribute-store persistence of the step.
///
/// Scalars are stored at row 0; the file locations and the field list are
/// indexed rows. Row counts are never stored: on load each block is counted
/// through its anchor attribute and every other attribute of the block must
/// report the same count.
pub struct RepositoryCodec<'s> {
    store: &'s dyn AttributeStore,
}

impl<'s> RepositoryCodec<'s> {
    pub fn new(store: &'s dyn AttributeStore) -> Self {
        Self { store }
    }

    /// Write the whole step through one `replace_step_attributes` call, so
    /// rows of an earlier, longer save never survive.
    pub fn to_repository(
        &self,
        meta: &AvroInputMeta,
        transformation: &ObjectId,
        step: &ObjectId,
    ) -> Result<(), MetaError> {
        let files = meta.file_locations.padded_rows();
        let mut rows = RowBuffer::default();

        rows.put(0, FILENAME, &meta.filename);
        rows.put(0, SCHEMA_FILENAME, &meta.schema_filename);
        rows.put(0, USE_STREAM_FIELD, flag(meta.use_field_as_input_stream));
        rows.put(0, STREAM_FIELD_NAME, &meta.input_stream_field_name);

        for (i, file) in files.iter().enumerate() {
            rows.put(i, FILE_NAME, &file.file_name);
            rows.put(i, FILE_MASK, &file.file_mask);
            rows.put(i, EXCLUDE_FILE_MASK, &file.exclude_file_mask);
            rows.put(i, FILE_REQUIRED, flag(file.file_required));
            rows.put(i, INCLUDE_SUBFOLDERS, flag(file.include_sub_folders));
            rows.put(i, ENVIRONMENT, &file.environment);
        }

        for (i, field) in meta.fields.iter().enumerate() {
            rows.put(i, FIELD_PATH, &field.source_field_name);
            rows.put(i, FIELD_NAME, &field.target_field_name);
            rows.put(i, FIELD_TYPE, field.avro_type.code().to_string());
            rows.put(i, FIELD_SOURCE_TYPE, field.value_type.code().to_string());
            rows.put(i, FIELD_NULLABLE, flag(field.nullable));
            rows.put(i, FIELD_DEFAULT, &field.default_value);
        }

        self.store
            .replace_step_attributes(transformation, step, &rows.0)
            .map_err(|e| MetaError::write_store(step, "*", 0, e))?;

        tracing::debug!(
            transformation = %transformation,
            step = %step,
            files = files.len(),
            fields = meta.fields.len(),
            attributes = rows.0.len(),
            "saved step to repository"
        );
        Ok(())
    }

    pub fn from_repository(&self, step: &ObjectId) -> Result<AvroInputMeta, MetaError> {
        let reader = RowReader { store: self.store, step };

        let filename = reader.get(0, FILENAME)?;
        let schema_filename = reader.get(0, SCHEMA_FILENAME)?;
        let use_field_as_input_stream = parse_flag(&reader.get(0, USE_STREAM_FIELD)?);
        let input_stream_field_name = reader.get(0, STREAM_FIELD_NAME)?;

        let file_count = reader.row_count(&FILE_ROW)?;
        let mut file_locations = FileLocations::new();
        for i in 0..file_count {
            file_locations.push(FileLocation {
                file_name: reader.get(i, FILE_NAME)?,
                file_mask: reader.get(i, FILE_MASK)?,
                exclude_file_mask: reader.get(i, EXCLUDE_FILE_MASK)?,
                file_required: parse_flag(&reader.get(i, FILE_REQUIRED)?),
                include_sub_folders: parse_flag(&reader.get(i, INCLUDE_SUBFOLDERS)?),
                environment: reader.get(i, ENVIRONMENT)?,
            });
        }

        let field_count = reader.row_count(&FIELD_ROW)?;
        let mut fields = Vec::with_capacity(field_count);
        for i in 0..field_count {
            let field = reader
                .field(i)
                .map_err(|e| e.with_context(format!("field #{i}")))?;
            fields.push(field);
        }

        tracing::debug!(step = %step, files = file_count, fields = field_count, "read step from repository");

        Ok(AvroInputMeta {
            filename,
            schema_filename,
            use_field_as_input_stream,
            input_stream_field_name,
            file_locations,
            fields,
        })
    }
}

impl MetaCodec for RepositoryCodec<'_> {
    type Target<'a> = (&'a ObjectId, &'a ObjectId);
    type Source<'a> = &'a ObjectId;
    type Output = ();

    fn save(&self, meta: &AvroInputMeta, (transformation, step): Self::Target<'_>) -> Result<(), MetaError> {
        self.to_repository(meta, transformation, step)
    }

    fn load(&self, step: &ObjectId) -> Result<AvroInputMeta, MetaError> {
        self.from_repository(step)
    }
}

#[derive(Default)]
struct RowBuffer(Vec<StepAttribute>);

impl RowBuffer {
    fn put(&mut self, nr: usize, code: &str, value: impl Into<String>) {
        self.0.push(StepAttribute::new(nr, code, value));
    }
}

struct RowReader<'a> {
    store: &'a dyn AttributeStore,
    step: &'a ObjectId,
}

impl RowReader<'_> {
    /// Attribute that must exist. Empty values are fine, absence is not.
    fn get(&self, nr: usize, code: &str) -> Result<String, MetaError> {
        self.store
            .step_attribute(self.step, nr, code)
            .map_err(|e| MetaError::read_store(self.step, code, nr, e))?
            .ok_or_else(|| MetaError::read(self.step, code, nr, "attribute missing"))
    }

    fn count(&self, code: &str) -> Result<usize, MetaError> {
        self.store
            .count_step_attributes(self.step, code)
            .map_err(|e| MetaError::read_store(self.step, code, 0, e))
    }

    /// Row count of a block: the anchor's count, cross-checked against
    /// every other attribute of the block.
    fn row_count(&self, block: &[&str]) -> Result<usize, MetaError> {
        let anchor = block[0];
        let rows = self.count(anchor)?;
        for &code in &block[1..] {
            let other = self.count(code)?;
            if other != rows {
                return Err(MetaError::read(
                    self.step,
                    code,
                    other.min(rows),
                    format!("row count mismatch: '{anchor}' has {rows} rows, '{code}' has {other}"),
                ));
            }
        }
        Ok(rows)
    }

    fn field(&self, i: usize) -> Result<FieldDescriptor, MetaError> {
        Ok(FieldDescriptor {
            source_field_name: self.get(i, FIELD_PATH)?,
            target_field_name: self.get(i, FIELD_NAME)?,
            avro_type: catalog::avro_type_by_code_str(&self.get(i, FIELD_TYPE)?)?,
            value_type: catalog::value_type_by_code_str(&self.get(i, FIELD_SOURCE_TYPE)?)?,
            nullable: parse_flag(&self.get(i, FIELD_NULLABLE)?),
            default_value: self.get(i, FIELD_DEFAULT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use avro_meta_api::StoreError;
    use avro_meta_store_memory::MemoryAttributeStore;

    use super::*;
    use crate::catalog::{AvroType, ValueType};

    fn ids() -> (ObjectId, ObjectId) {
        (ObjectId::new("trans-1"), ObjectId::new("step-1"))
    }

    fn seed_scalars(store: &MemoryAttributeStore, step: &ObjectId) {
        let (tid, _) = ids();
        store.save_step_attribute(&tid, step, 0, "filename", "SampleFileName").unwrap();
        store.save_step_attribute(&tid, step, 0, "schemaFilename", "SampleSchemaFileName").unwrap();
        store.save_step_attribute(&tid, step, 0, "stream_fieldname", "StreamFieldName").unwrap();
        store.save_step_attribute(&tid, step, 0, "useStreamField", "Y").unwrap();
    }

    fn seed_field(store: &MemoryAttributeStore, step: &ObjectId, nr: usize, path: &str, name: &str) {
        let (tid, _) = ids();
        store.save_step_attribute(&tid, step, nr, "path", path).unwrap();
        store.save_step_attribute(&tid, step, nr, "name", name).unwrap();
        store.save_step_attribute(&tid, step, nr, "type", "0").unwrap();
        store.save_step_attribute(&tid, step, nr, "sourcetype", "0").unwrap();
        store.save_step_attribute(&tid, step, nr, "nullable", "N").unwrap();
        store.save_step_attribute(&tid, step, nr, "default", "").unwrap();
    }

    #[test]
    fn reads_seeded_step() {
        let store = MemoryAttributeStore::new();
        let (_, sid) = ids();
        seed_scalars(&store, &sid);
        seed_field(&store, &sid, 0, "SamplePath", "SampleName");

        let meta = RepositoryCodec::new(&store).from_repository(&sid).unwrap();
        assert_eq!(meta.filename, "SampleFileName");
        assert_eq!(meta.schema_filename, "SampleSchemaFileName");
        assert_eq!(meta.input_stream_field_name, "StreamFieldName");
        assert!(meta.use_field_as_input_stream);
        assert!(meta.file_locations.is_empty());

        let field = &meta.fields[0];
        assert_eq!(field.target_field_name, "SampleName");
        assert_eq!(field.source_field_name, "SamplePath");
        assert_eq!(field.avro_type.name(), "string");
        assert_eq!(field.value_type, ValueType::None);
    }

    #[test]
    fn writes_indexed_rows_with_numeric_type_codes() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        let mut meta = AvroInputMeta::new();
        meta.fields = vec![
            FieldDescriptor::new("a", "a", AvroType::String),
            FieldDescriptor::new("b.c", "c", AvroType::Double).with_nullable(false),
        ];
        RepositoryCodec::new(&store).to_repository(&meta, &tid, &sid).unwrap();

        assert_eq!(store.count_step_attributes(&sid, "type").unwrap(), 2);
        assert_eq!(store.step_attribute(&sid, 1, "type").unwrap().as_deref(), Some("5"));
        assert_eq!(store.step_attribute(&sid, 1, "sourcetype").unwrap().as_deref(), Some("1"));
        assert_eq!(store.step_attribute(&sid, 1, "nullable").unwrap().as_deref(), Some("N"));
        assert_eq!(store.step_attribute(&sid, 0, "useStreamField").unwrap().as_deref(), Some("N"));
        assert_eq!(store.count_step_attributes(&sid, "file_name").unwrap(), 0);
    }

    #[test]
    fn saving_fewer_fields_drops_stale_rows() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        let codec = RepositoryCodec::new(&store);
        let mut meta = AvroInputMeta::new();
        meta.fields = vec![
            FieldDescriptor::new("a", "a", AvroType::String),
            FieldDescriptor::new("b", "b", AvroType::String),
        ];
        codec.to_repository(&meta, &tid, &sid).unwrap();
        meta.fields.pop();
        codec.to_repository(&meta, &tid, &sid).unwrap();

        assert_eq!(codec.from_repository(&sid).unwrap().fields.len(), 1);
    }

    #[test]
    fn row_count_mismatch_is_a_read_error() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        seed_scalars(&store, &sid);
        seed_field(&store, &sid, 0, "p0", "n0");
        seed_field(&store, &sid, 1, "p1", "n1");
        // third row has a type but no path/name
        store.save_step_attribute(&tid, &sid, 2, "type", "0").unwrap();

        let err = RepositoryCodec::new(&store).from_repository(&sid).unwrap_err();
        match err {
            MetaError::RepositoryRead { code, detail, .. } => {
                assert_eq!(code, "path");
                assert!(detail.contains("'type' has 3 rows"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_scalar_is_a_read_error() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        store.save_step_attribute(&tid, &sid, 0, "filename", "").unwrap();

        let err = RepositoryCodec::new(&store).from_repository(&sid).unwrap_err();
        assert!(matches!(err, MetaError::RepositoryRead { ref code, .. } if code == "schemaFilename"));
    }

    #[test]
    fn unknown_type_code_aborts_load() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        seed_scalars(&store, &sid);
        seed_field(&store, &sid, 0, "p", "n");
        store.save_step_attribute(&tid, &sid, 0, "type", "99").unwrap();

        let err = RepositoryCodec::new(&store).from_repository(&sid).unwrap_err();
        assert!(matches!(err, MetaError::UnknownType { ref value, .. } if value == "99"));
    }

    #[test]
    fn unknown_sourcetype_code_aborts_load() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        seed_scalars(&store, &sid);
        seed_field(&store, &sid, 0, "p", "n");
        store.save_step_attribute(&tid, &sid, 0, "sourcetype", "7").unwrap();

        let err = RepositoryCodec::new(&store).from_repository(&sid).unwrap_err();
        match err {
            MetaError::UnknownType { catalog, value, at } => {
                assert_eq!(catalog, "value");
                assert_eq!(value, "7");
                assert_eq!(at.as_deref(), Some("field #0"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_row_count_mismatch_is_a_read_error() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        let mut meta = AvroInputMeta::new();
        meta.file_locations.push(FileLocation::new("/in/a"));
        meta.file_locations.push(FileLocation::new("/in/b"));
        RepositoryCodec::new(&store).to_repository(&meta, &tid, &sid).unwrap();
        store.save_step_attribute(&tid, &sid, 2, "file_mask", ".*").unwrap();

        let err = RepositoryCodec::new(&store).from_repository(&sid).unwrap_err();
        match err {
            MetaError::RepositoryRead { code, detail, .. } => {
                assert_eq!(code, "file_mask");
                assert!(detail.contains("'file_name' has 2 rows, 'file_mask' has 3"), "{detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_block_is_saved_padded() {
        let store = MemoryAttributeStore::new();
        let (tid, sid) = ids();
        let mut meta = AvroInputMeta::new();
        meta.file_locations.file_name = vec!["/in/a".into(), "/in/b".into()];
        meta.file_locations.file_required = vec![true];
        let codec = RepositoryCodec::new(&store);

        codec.to_repository(&meta, &tid, &sid).unwrap();
        assert_eq!(store.count_step_attributes(&sid, "environment").unwrap(), 2);

        let rows = codec.from_repository(&sid).unwrap().file_locations.rows().unwrap();
        assert!(rows[0].file_required);
        assert_eq!(rows[1], FileLocation::new("/in/b"));
    }

    /// Records how the codec writes: whole-step replaces versus single rows.
    #[derive(Default)]
    struct RecordingStore {
        inner: MemoryAttributeStore,
        replaces: std::sync::atomic::AtomicUsize,
        single_writes: std::sync::atomic::AtomicUsize,
    }

    impl AttributeStore for RecordingStore {
        fn save_step_attribute(&self, t: &ObjectId, s: &ObjectId, nr: usize, code: &str, value: &str) -> Result<(), StoreError> {
            self.single_writes.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.save_step_attribute(t, s, nr, code, value)
        }
        fn step_attribute(&self, s: &ObjectId, nr: usize, code: &str) -> Result<Option<String>, StoreError> {
            self.inner.step_attribute(s, nr, code)
        }
        fn count_step_attributes(&self, s: &ObjectId, code: &str) -> Result<usize, StoreError> {
            self.inner.count_step_attributes(s, code)
        }
        fn delete_step_attributes(&self, s: &ObjectId) -> Result<(), StoreError> {
            self.inner.delete_step_attributes(s)
        }
        fn replace_step_attributes(&self, t: &ObjectId, s: &ObjectId, rows: &[StepAttribute]) -> Result<(), StoreError> {
            self.replaces.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.replace_step_attributes(t, s, rows)
        }
    }

    #[test]
    fn save_is_one_whole_step_replace() {
        use std::sync::atomic::Ordering;

        let store = RecordingStore::default();
        let (tid, sid) = ids();
        let mut meta = AvroInputMeta::new();
        meta.file_locations.push(FileLocation::new("/in/a"));
        meta.fields = vec![FieldDescriptor::new("a", "a", AvroType::String)];

        let codec = RepositoryCodec::new(&store);
        codec.to_repository(&meta, &tid, &sid).unwrap();

        assert_eq!(store.replaces.load(Ordering::SeqCst), 1);
        assert_eq!(store.single_writes.load(Ordering::SeqCst), 0);
        assert_eq!(codec.from_repository(&sid).unwrap(), meta);
    }

    struct UnreachableStore;

    impl AttributeStore for UnreachableStore {
        fn save_step_attribute(&self, _: &ObjectId, _: &ObjectId, _: usize, _: &str, _: &str) -> Result<(), StoreError> {
            Err(StoreError::io("connection refused"))
        }
        fn step_attribute(&self, _: &ObjectId, _: usize, _: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::io("connection refused"))
        }
        fn count_step_attributes(&self, _: &ObjectId, _: &str) -> Result<usize, StoreError> {
            Err(StoreError::io("connection refused"))
        }
        fn delete_step_attributes(&self, _: &ObjectId) -> Result<(), StoreError> {
            Err(StoreError::io("connection refused"))
        }
    }

    #[test]
    fn store_failures_surface_as_repository_errors() {
        let (tid, sid) = ids();
        let codec = RepositoryCodec::new(&UnreachableStore);

        let err = codec.from_repository(&sid).unwrap_err();
        assert!(matches!(err, MetaError::RepositoryRead { ref detail, .. } if detail == "connection refused"));

        let err = codec.to_repository(&AvroInputMeta::new(), &tid, &sid).unwrap_err();
        assert!(matches!(err, MetaError::RepositoryWrite { .. }));
    }
}
