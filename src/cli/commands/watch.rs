//! Watch command implementation.

use std::path::Path;
use std::time::Duration;

use colored::Colorize;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::SettingsPatch;
use crate::error::Result;
use crate::sync::AutoRefresh;

use super::{connect, print_snapshot, runtime};

/// Refresh on a timer and reprint whenever the file changes, until Ctrl-C.
///
/// A failed refresh is reported and the previous listing stays current.
pub fn execute(
    interval: Option<u64>,
    config: Option<&Path>,
    overrides: &SettingsPatch,
    json: bool,
) -> Result<()> {
    let (settings, engine) = connect(config, overrides)?;
    let period = interval.map_or_else(
        || settings.refresh_interval(),
        |secs| Duration::from_secs(secs.max(1)),
    );

    runtime()?.block_on(async {
        let first = engine.refresh(&settings).await?;
        print_snapshot(&first, json)?;
        let mut last_sha = first.sha;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let auto = AutoRefresh::spawn(engine.clone(), settings.clone(), period, move |result| {
            let _ = tx.send(result);
        });
        info!(file = %settings.file_key(), seconds = period.as_secs(), "watching");

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => break,
                received = rx.recv() => match received {
                    Some(Ok(snapshot)) => {
                        if snapshot.sha != last_sha {
                            if !json {
                                println!();
                            }
                            print_snapshot(&snapshot, json)?;
                            last_sha = snapshot.sha;
                        }
                    }
                    Some(Err(e)) => {
                        if json {
                            eprintln!("{}", e.to_structured_json());
                        } else {
                            eprintln!("{} {e}", "Refresh failed:".red());
                        }
                    }
                    None => break,
                },
            }
        }

        auto.stop().await;
        Ok(())
    })
}
