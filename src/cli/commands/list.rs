//! List command implementation.

use std::path::Path;

use crate::config::SettingsPatch;
use crate::error::Result;

use super::{connect, print_snapshot, runtime};

/// Fetch the checklist and print it.
pub fn execute(config: Option<&Path>, overrides: &SettingsPatch, json: bool) -> Result<()> {
    let (settings, engine) = connect(config, overrides)?;
    let snapshot = runtime()?.block_on(engine.refresh(&settings))?;
    print_snapshot(&snapshot, json)
}
