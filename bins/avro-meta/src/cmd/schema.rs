use avro_meta::{AvroInputMeta, MarkupCodec};
use avro_meta::schema::fields_from_schema_file;

use crate::cmd::write_output;
use crate::config::{GlobalArgs, SchemaArgs, load_config};
use crate::error::CliError;

/// Print a step document whose field list mirrors the schema.
pub fn run(global: &GlobalArgs, args: SchemaArgs) -> Result<(), CliError> {
    let config = load_config(&global.config)?;

    let mut meta = AvroInputMeta::new();
    meta.schema_filename = args.schema.display().to_string();
    meta.fields = fields_from_schema_file(&args.schema)?;

    let xml = meta.get_xml_with(&MarkupCodec::new(config.markup.indent))?;
    write_output(None, &xml)?;
    tracing::info!(schema = %args.schema.display(), fields = meta.fields.len(), "derived fields");
    Ok(())
}
