use avro_meta_api::ObjectId;

use crate::cmd::{open_persistent_store, read_step_markup};
use crate::config::{GlobalArgs, ImportArgs, load_config};
use crate::error::CliError;

pub fn run(global: &GlobalArgs, args: ImportArgs) -> Result<(), CliError> {
    let config = load_config(&global.config)?;
    let store = open_persistent_store(&config.store, "import")?;

    let mut meta = read_step_markup(&args.xml)?;
    let transformation = ObjectId::new(args.transformation);
    let step = ObjectId::new(args.step);
    meta.save_rep(store.as_ref(), &transformation, &step)?;

    tracing::info!(
        xml = %args.xml.display(),
        %transformation,
        %step,
        fields = meta.fields.len(),
        "imported step"
    );
    Ok(())
}
