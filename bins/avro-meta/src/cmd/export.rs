use avro_meta::{AvroInputMeta, MarkupCodec};
use avro_meta_api::ObjectId;

use crate::cmd::{open_persistent_store, write_output};
use crate::config::{ExportArgs, GlobalArgs, load_config};
use crate::error::CliError;

pub fn run(global: &GlobalArgs, args: ExportArgs) -> Result<(), CliError> {
    let config = load_config(&global.config)?;
    let store = open_persistent_store(&config.store, "export")?;

    let step = ObjectId::new(args.step);
    let mut meta = AvroInputMeta::new();
    meta.read_rep(store.as_ref(), &step)?;
    let xml = meta.get_xml_with(&MarkupCodec::new(config.markup.indent))?;

    write_output(args.out.as_deref(), &xml)?;
    tracing::info!(%step, fields = meta.fields.len(), "exported step");
    Ok(())
}
