use avro_meta::Severity;

use crate::cmd::read_step_markup;
use crate::config::{CheckArgs, GlobalArgs};
use crate::error::CliError;

pub fn run(_global: &GlobalArgs, args: CheckArgs) -> Result<(), CliError> {
    let meta = read_step_markup(&args.xml)?;
    let remarks = meta.check();
    for remark in &remarks {
        println!("{remark}");
    }

    let errors = remarks.iter().filter(|r| r.severity == Severity::Error).count();
    if errors > 0 {
        return Err(CliError::CheckFailed(errors));
    }
    tracing::info!(xml = %args.xml.display(), warnings = remarks.len(), "step is valid");
    Ok(())
}
