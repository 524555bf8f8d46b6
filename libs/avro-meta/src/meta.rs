use avro_meta_api::{AttributeStore, ObjectId, VariableSpace};

use crate::check::{self, CheckRemark};
use crate::codec::MetaCodec;
use crate::error::MetaError;
use crate::field::FieldDescriptor;
use crate::file_locations::FileLocations;
use crate::markup::MarkupCodec;
use crate::repository::RepositoryCodec;

/// Where the step reads Avro data from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource<'a> {
    /// Each incoming row carries an Avro file name in this field.
    StreamField(&'a str),
    Files(&'a FileLocations),
}

/// Metadata of the Avro input step.
///
/// Both the stream field and the file locations are persisted; only one of
/// them is active, see `active_source()`. Not synchronized: callers must
/// not mutate an instance while a save or load is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvroInputMeta {
    pub filename: String,
    pub schema_filename: String,
    pub use_field_as_input_stream: bool,
    pub input_stream_field_name: String,
    pub file_locations: FileLocations,
    pub fields: Vec<FieldDescriptor>,
}

impl AvroInputMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_source(&self) -> InputSource<'_> {
        if self.use_field_as_input_stream {
            InputSource::StreamField(&self.input_stream_field_name)
        } else {
            InputSource::Files(&self.file_locations)
        }
    }

    pub fn resolved_filename(&self, space: &dyn VariableSpace) -> String {
        space.environment_substitute(&self.filename)
    }

    pub fn resolved_schema_filename(&self, space: &dyn VariableSpace) -> String {
        space.environment_substitute(&self.schema_filename)
    }

    pub fn check(&self) -> Vec<CheckRemark> {
        check::check(self)
    }

    /// Pad the file locations block before a save and verify the result.
    fn prepare_for_save(&mut self) -> Result<(), MetaError> {
        let rows = self.file_locations.normalize();
        self.file_locations.check_consistent()?;
        tracing::trace!(rows, "normalized file locations");
        Ok(())
    }

    // ── Markup ──

    pub fn get_xml(&mut self) -> Result<String, MetaError> {
        self.get_xml_with(&MarkupCodec::default())
    }

    pub fn get_xml_with(&mut self, codec: &MarkupCodec) -> Result<String, MetaError> {
        self.prepare_for_save()?;
        codec.save(self, ())
    }

    /// Replace the whole state with the document's content. On error `self`
    /// is left untouched.
    pub fn load_xml(&mut self, xml: &str) -> Result<(), MetaError> {
        *self = MarkupCodec::default().load(xml)?;
        Ok(())
    }

    // ── Repository ──

    /// Replace the stored step with this one.
    ///
    /// Atomic when the store overrides `replace_step_attributes` (the memory
    /// and file stores do). With the default row-by-row fallback a failed save
    /// can leave a partial step; rolling that back belongs to the caller's
    /// transaction.
    pub fn save_rep(
        &mut self,
        store: &dyn AttributeStore,
        transformation: &ObjectId,
        step: &ObjectId,
    ) -> Result<(), MetaError> {
        self.prepare_for_save()?;
        RepositoryCodec::new(store).save(self, (transformation, step))
    }

    /// Replace the whole state with the stored step. On error `self` is left
    /// untouched.
    pub fn read_rep(&mut self, store: &dyn AttributeStore, step: &ObjectId) -> Result<(), MetaError> {
        *self = RepositoryCodec::new(store).load(step)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use avro_meta_api::Variables;

    use super::*;
    use crate::catalog::AvroType;

    const FILE_NAME_VALID_PATH: &str = "path/to/file";

    #[test]
    fn get_xml_normalizes_partially_filled_file_locations() {
        let mut meta = AvroInputMeta::new();
        meta.file_locations.file_name = vec![FILE_NAME_VALID_PATH.to_string()];

        meta.get_xml().unwrap();

        let block = &meta.file_locations;
        assert_eq!(block.file_name.len(), block.file_mask.len());
        assert_eq!(block.file_name.len(), block.exclude_file_mask.len());
        assert_eq!(block.file_name.len(), block.file_required.len());
        assert_eq!(block.file_name.len(), block.include_sub_folders.len());
        assert_eq!(block.file_name.len(), block.environment.len());
        assert_eq!(block.file_name, vec![FILE_NAME_VALID_PATH.to_string()]);
    }

    #[test]
    fn failed_load_leaves_state_untouched() {
        let mut meta = AvroInputMeta::new();
        meta.filename = "keep-me".into();
        meta.fields.push(FieldDescriptor::new("a", "a", AvroType::String));
        let before = meta.clone();

        let bad = "<step><filename>x</filename><fields><field><type>notatype</type></field></fields></step>";
        assert!(meta.load_xml(bad).is_err());
        assert_eq!(meta, before);
    }

    #[test]
    fn active_source_follows_stream_flag() {
        let mut meta = AvroInputMeta::new();
        meta.input_stream_field_name = "avro_file".into();
        assert!(matches!(meta.active_source(), InputSource::Files(_)));

        meta.use_field_as_input_stream = true;
        assert_eq!(meta.active_source(), InputSource::StreamField("avro_file"));
    }

    #[test]
    fn resolves_paths_through_variable_space() {
        let mut vars = Variables::new();
        vars.set("IN", "/data");
        let mut meta = AvroInputMeta::new();
        meta.filename = "${IN}/orders.avro".into();
        meta.schema_filename = FILE_NAME_VALID_PATH.into();

        assert_eq!(meta.resolved_filename(&vars), "/data/orders.avro");
        assert_eq!(meta.resolved_schema_filename(&vars), FILE_NAME_VALID_PATH);
        // stored value is untouched
        assert_eq!(meta.filename, "${IN}/orders.avro");
    }
}
