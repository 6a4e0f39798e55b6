//! Standalone device rename handler.

use crate::cli::{GlobalOpts, RenameDeviceArgs};
use crate::error::CliError;

use super::{Engine, util};

pub async fn handle(
    engine: &Engine,
    args: &RenameDeviceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let prompt = format!("Rename device {} to \"{}\"?", args.device_id, args.name);
    if !util::confirm(&prompt, global.yes)? {
        return Ok(());
    }

    engine.rename_device(&args.device_id, &args.name).await?;
    if !global.quiet {
        eprintln!("✓ Device renamed; name stored as an override");
    }
    Ok(())
}
