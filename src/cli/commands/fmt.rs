//! Local formatting command implementation.
//!
//! Decodes a Markdown file and prints its normalized rendering: the fixed
//! preamble, deduplicated items, and no empty categories. Nothing remote
//! is touched.

use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::codec::{self, Dialect};
use crate::error::{Error, Result};
use crate::model::Checklist;

#[derive(Serialize)]
struct FmtOutput<'a> {
    checklist: &'a Checklist,
    rendered: &'a str,
}

/// Format `path`, or stdin when `path` is `None`.
pub fn execute(path: Option<&Path>, dialect: Option<Dialect>, json: bool) -> Result<()> {
    let input = match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidArgument(format!("Cannot read {}: {e}", path.display()))
        })?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let dialect = dialect.unwrap_or_default();
    let (checklist, rendered) = format_text(&input, dialect);

    if json {
        let output = FmtOutput {
            checklist: &checklist,
            rendered: &rendered,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        print!("{rendered}");
    }

    Ok(())
}

/// Decode `input` and render it back in `dialect`.
///
/// Decoding always accepts checkbox bullets so that a task list can be
/// converted to plain bullets and back.
fn format_text(input: &str, dialect: Dialect) -> (Checklist, String) {
    let checklist = codec::parse_with(input, Dialect::TaskList).pruned();
    let rendered = codec::render_with(&checklist, dialect);
    (checklist, rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_normalizes() {
        let input = "## A\n* x\n-   x\n## Empty\n## B\n- y\n";
        let (checklist, rendered) = format_text(input, Dialect::Plain);
        assert_eq!(checklist.len(), 2);
        assert_eq!(
            rendered,
            format!("{}## A\n\n- x\n\n## B\n\n- y\n\n", codec::preamble())
        );
    }

    #[test]
    fn test_format_converts_dialects() {
        let (_, tasks) = format_text("## A\n- x\n", Dialect::TaskList);
        assert!(tasks.contains("- [ ] x\n"));

        let (_, plain) = format_text(&tasks, Dialect::Plain);
        assert!(plain.contains("- x\n"));
        assert!(!plain.contains("[ ]"));
    }
}
