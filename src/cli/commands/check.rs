//! Connectivity check command implementation.

use std::path::Path;

use colored::Colorize;
use serde::Serialize;

use crate::config::SettingsPatch;
use crate::error::{Error, Result};
use crate::remote::RepoAccess;

use super::{connect, runtime};

#[derive(Serialize)]
struct CheckOutput {
    repository: RepoAccess,
    file: String,
    file_exists: bool,
    item_count: usize,
}

/// Verify repository access and report on the checklist file.
pub fn execute(config: Option<&Path>, overrides: &SettingsPatch, json: bool) -> Result<()> {
    let (settings, engine) = connect(config, overrides)?;

    let (access, snapshot) = runtime()?.block_on(async {
        let access = engine.check_access(&settings).await?;
        let snapshot = engine.refresh(&settings).await?;
        Ok::<_, Error>((access, snapshot))
    })?;

    if json {
        let output = CheckOutput {
            repository: access,
            file: snapshot.file.path.clone(),
            file_exists: snapshot.sha.is_some(),
            item_count: snapshot.checklist.item_count(),
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("{} {}", "✓".green(), access.full_name.bold());
    println!("  Default branch: {}", access.default_branch);
    println!(
        "  Visibility:     {}",
        if access.private { "private" } else { "public" }
    );
    if access.can_push {
        println!("  Write access:   {}", "yes".green());
    } else {
        println!(
            "  Write access:   {} (add and remove will fail)",
            "no".yellow()
        );
    }

    if snapshot.sha.is_some() {
        println!(
            "  Checklist:      {} ({} items)",
            snapshot.file.path,
            snapshot.checklist.item_count()
        );
    } else {
        println!(
            "  Checklist:      {} {}",
            snapshot.file.path,
            "(not created yet; the first add creates it)".dimmed()
        );
    }

    Ok(())
}
