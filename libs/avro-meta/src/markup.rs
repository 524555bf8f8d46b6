use crate::catalog::{self, ValueType};
use crate::codec::{MetaCodec, flag, parse_flag};
use crate::error::MetaError;
use crate::field::FieldDescriptor;
use crate::file_locations::{FileLocation, FileLocations};
use crate::meta::AvroInputMeta;
use crate::xml::{Element, XmlWriter, parse_document};

// Element names.
const ROOT: &str = "step";
const FILENAME: &str = "filename";
const SCHEMA_FILENAME: &str = "schemaFilename";
const USE_STREAM_FIELD: &str = "useFieldAsInputStream";
const STREAM_FIELD_NAME: &str = "stream_fieldname";

const FILES: &str = "files";
const FILE: &str = "file";
const FILE_NAME: &str = "name";
const FILE_MASK: &str = "filemask";
const EXCLUDE_FILE_MASK: &str = "exclude_filemask";
const FILE_REQUIRED: &str = "file_required";
const INCLUDE_SUBFOLDERS: &str = "include_subfolders";
const ENVIRONMENT: &str = "environment";

const FIELDS: &str = "fields";
const FIELD: &str = "field";
const FIELD_PATH: &str = "path";
const FIELD_NAME: &str = "name";
const FIELD_TYPE: &str = "type";
const FIELD_SOURCE_TYPE: &str = "sourcetype";
const FIELD_NULLABLE: &str = "nullable";
const FIELD_DEFAULT: &str = "default";

/// XML persistence of the step.
///
/// Writes a `<step>` document; reads any root element so the fragment can
/// be embedded in a host's own step element. `<fields>` is the one required
/// container, every scalar and row value is optional on load.
#[derive(Debug, Clone, Copy)]
pub struct MarkupCodec {
    indent: usize,
}

impl Default for MarkupCodec {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl MarkupCodec {
    pub fn new(indent: usize) -> Self {
        Self { indent }
    }

    pub fn to_markup(&self, meta: &AvroInputMeta) -> Result<String, MetaError> {
        let files = meta.file_locations.padded_rows();

        let mut w = XmlWriter::new(self.indent);
        w.open(ROOT)?;
        w.leaf(FILENAME, &meta.filename)?;
        w.leaf(SCHEMA_FILENAME, &meta.schema_filename)?;
        w.leaf(USE_STREAM_FIELD, flag(meta.use_field_as_input_stream))?;
        w.leaf(STREAM_FIELD_NAME, &meta.input_stream_field_name)?;

        w.open(FILES)?;
        for file in &files {
            w.open(FILE)?;
            w.leaf(FILE_NAME, &file.file_name)?;
            w.leaf(FILE_MASK, &file.file_mask)?;
            w.leaf(EXCLUDE_FILE_MASK, &file.exclude_file_mask)?;
            w.leaf(FILE_REQUIRED, flag(file.file_required))?;
            w.leaf(INCLUDE_SUBFOLDERS, flag(file.include_sub_folders))?;
            w.leaf(ENVIRONMENT, &file.environment)?;
            w.close(FILE)?;
        }
        w.close(FILES)?;

        w.open(FIELDS)?;
        for field in &meta.fields {
            w.open(FIELD)?;
            w.leaf(FIELD_PATH, &field.source_field_name)?;
            w.leaf(FIELD_NAME, &field.target_field_name)?;
            w.leaf(FIELD_TYPE, field.avro_type.name())?;
            w.leaf(FIELD_SOURCE_TYPE, field.value_type.name())?;
            w.leaf(FIELD_NULLABLE, flag(field.nullable))?;
            w.leaf(FIELD_DEFAULT, &field.default_value)?;
            w.close(FIELD)?;
        }
        w.close(FIELDS)?;
        w.close(ROOT)?;

        tracing::debug!(
            files = files.len(),
            fields = meta.fields.len(),
            "serialized step to markup"
        );
        w.finish()
    }

    pub fn from_markup(&self, xml: &str) -> Result<AvroInputMeta, MetaError> {
        let root = parse_document(xml)?;
        let fields_node = root.child(FIELDS).ok_or_else(|| {
            MetaError::MalformedConfig(format!("<{}> has no <{FIELDS}> element", root.name))
        })?;

        let file_locations = match root.child(FILES) {
            Some(files) => FileLocations::from_rows(files.children_named(FILE).map(read_file)),
            None => FileLocations::new(),
        };

        let fields = fields_node
            .children_named(FIELD)
            .enumerate()
            .map(|(i, node)| read_field(node).map_err(|e| e.with_context(format!("field #{i}"))))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            files = file_locations.len(),
            fields = fields.len(),
            "loaded step from markup"
        );

        Ok(AvroInputMeta {
            filename: root.child_text(FILENAME).to_string(),
            schema_filename: root.child_text(SCHEMA_FILENAME).to_string(),
            use_field_as_input_stream: parse_flag(root.child_text(USE_STREAM_FIELD)),
            input_stream_field_name: root.child_text(STREAM_FIELD_NAME).to_string(),
            file_locations,
            fields,
        })
    }
}

fn read_file(node: &Element) -> FileLocation {
    FileLocation {
        file_name: node.child_text(FILE_NAME).to_string(),
        file_mask: node.child_text(FILE_MASK).to_string(),
        exclude_file_mask: node.child_text(EXCLUDE_FILE_MASK).to_string(),
        file_required: parse_flag(node.child_text(FILE_REQUIRED)),
        include_sub_folders: parse_flag(node.child_text(INCLUDE_SUBFOLDERS)),
        environment: node.child_text(ENVIRONMENT).to_string(),
    }
}

fn read_field(node: &Element) -> Result<FieldDescriptor, MetaError> {
    let avro_type = catalog::avro_type_by_name(node.child_text(FIELD_TYPE))?;
    let value_type = match node.child(FIELD_SOURCE_TYPE) {
        Some(n) if !n.text.trim().is_empty() => catalog::value_type_by_name(&n.text)?,
        _ => ValueType::None,
    };
    Ok(FieldDescriptor {
        source_field_name: node.child_text(FIELD_PATH).to_string(),
        target_field_name: node.child_text(FIELD_NAME).to_string(),
        avro_type,
        value_type,
        nullable: parse_flag(node.child_text(FIELD_NULLABLE)),
        default_value: node.child_text(FIELD_DEFAULT).to_string(),
    })
}

impl MetaCodec for MarkupCodec {
    type Target<'a> = ();
    type Source<'a> = &'a str;
    type Output = String;

    fn save(&self, meta: &AvroInputMeta, _target: ()) -> Result<String, MetaError> {
        self.to_markup(meta)
    }

    fn load(&self, xml: &str) -> Result<AvroInputMeta, MetaError> {
        self.from_markup(xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AvroType;

    fn sample() -> AvroInputMeta {
        let mut meta = AvroInputMeta::new();
        meta.filename = "/in/orders.avro".into();
        meta.schema_filename = "/schemas/order.avsc".into();
        meta.file_locations.push(FileLocation {
            file_name: "/in".into(),
            file_mask: ".*\\.avro".into(),
            exclude_file_mask: String::new(),
            file_required: true,
            include_sub_folders: false,
            environment: "local".into(),
        });
        meta.fields = vec![
            FieldDescriptor::new("order.id", "id", AvroType::Long).with_nullable(false),
            FieldDescriptor::new("order.note", "note", AvroType::String).with_default("n/a"),
        ];
        meta
    }

    #[test]
    fn writes_every_value_even_when_empty() {
        let xml = MarkupCodec::new(0).to_markup(&sample()).unwrap();
        assert!(xml.starts_with("<step><filename>/in/orders.avro</filename>"));
        assert!(xml.contains("<useFieldAsInputStream>N</useFieldAsInputStream><stream_fieldname/>"));
        assert!(xml.contains("<exclude_filemask/>"));
        assert!(xml.contains(
            "<field><path>order.id</path><name>id</name><type>long</type>\
             <sourcetype>integer</sourcetype><nullable>N</nullable><default/></field>"
        ));
    }

    #[test]
    fn round_trips_through_markup() {
        let codec = MarkupCodec::default();
        let meta = sample();
        let xml = codec.to_markup(&meta).unwrap();
        assert_eq!(codec.from_markup(&xml).unwrap(), meta);
    }

    #[test]
    fn missing_values_default_to_empty_and_false() {
        let meta = MarkupCodec::default()
            .from_markup("<step><fields><field><type>int</type></field></fields></step>")
            .unwrap();
        assert_eq!(meta.filename, "");
        assert!(!meta.use_field_as_input_stream);
        assert!(meta.file_locations.is_empty());
        let f = &meta.fields[0];
        assert_eq!(f.source_field_name, "");
        assert_eq!(f.avro_type, AvroType::Int);
        assert_eq!(f.value_type, ValueType::None);
        assert!(!f.nullable);
    }

    #[test]
    fn missing_fields_container_is_malformed() {
        let err = MarkupCodec::default()
            .from_markup("<step><filename>x</filename></step>")
            .unwrap_err();
        assert!(matches!(err, MetaError::MalformedConfig(_)));
    }

    #[test]
    fn unknown_type_name_fails_whole_load() {
        let xml = "<step><fields>\
                   <field><name>a</name><type>string</type></field>\
                   <field><name>b</name><type>notatype</type></field>\
                   </fields></step>";
        let err = MarkupCodec::default().from_markup(xml).unwrap_err();
        match err {
            MetaError::UnknownType { value, at, .. } => {
                assert_eq!(value, "notatype");
                assert_eq!(at.as_deref(), Some("field #1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_block_is_written_padded() {
        let mut meta = sample();
        meta.file_locations.file_name.push("/extra".into());
        let before = meta.clone();

        let codec = MarkupCodec::default();
        let loaded = codec.from_markup(&codec.to_markup(&meta).unwrap()).unwrap();
        assert_eq!(meta, before);

        let rows = loaded.file_locations.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], FileLocation::new("/extra"));
    }

    #[test]
    fn unknown_sourcetype_fails_whole_load() {
        let xml = "<step><fields>\
                   <field><name>a</name><type>string</type><sourcetype>notavaluetype</sourcetype></field>\
                   </fields></step>";
        let err = MarkupCodec::default().from_markup(xml).unwrap_err();
        match err {
            MetaError::UnknownType { value, at, .. } => {
                assert_eq!(value, "notavaluetype");
                assert_eq!(at.as_deref(), Some("field #0"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
