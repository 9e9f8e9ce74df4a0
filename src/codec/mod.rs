//! Markdown codec for review checklists.
//!
//! Converts between [`Checklist`] and a small Markdown dialect:
//!
//! ```text
//! # Code Review Checklist
//!
//! This file is referenced automatically by GitHub Copilot Spaces.
//!
//! ## Correctness
//!
//! - Check null handling
//!
//! ```
//!
//! Decoding is best-effort and never fails: level-2 headings open a
//! category, `-` or `*` bullets add items to the open category, and every
//! other line is ignored. Encoding emits a fixed preamble followed by each
//! non-empty category.
//!
//! The round trip holds up to pruning: `parse(&render(c)) == c.pruned()`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::Checklist;

/// Title line of every rendered document.
pub const TITLE: &str = "# Code Review Checklist";

/// Description paragraph following the title.
pub const DESCRIPTION: &str = "This file is referenced automatically by GitHub Copilot Spaces.";

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(.+)$").expect("valid heading pattern"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+(.+)$").expect("valid bullet pattern"));

static CHECKBOX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[[ xX]\]\s+(.+)$").expect("valid checkbox pattern"));

/// Bullet flavour used for items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// `- item`
    #[default]
    Plain,
    /// `- [ ] item`; decoding also accepts checked boxes.
    TaskList,
}

impl Dialect {
    /// Parse from a config or CLI string.
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" | "list" => Some(Self::Plain),
            "task_list" | "tasklist" | "task-list" | "checkbox" => Some(Self::TaskList),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::TaskList => "task_list",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode Markdown using the plain dialect.
#[must_use]
pub fn parse(text: &str) -> Checklist {
    parse_with(text, Dialect::Plain)
}

/// Decode Markdown into a checklist.
///
/// Headings with no items still produce an (empty) category here;
/// pruning happens on mutation and on render.
#[must_use]
pub fn parse_with(text: &str, dialect: Dialect) -> Checklist {
    let mut checklist = Checklist::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(caps) = HEADING.captures(line) {
            let name = caps[1].trim().to_string();
            checklist.entry(&name);
            current = Some(name);
            continue;
        }

        let Some(category) = current.as_deref() else {
            continue;
        };

        if let Some(caps) = BULLET.captures(line) {
            let mut item = caps.get(1).map_or("", |m| m.as_str()).trim();
            if dialect == Dialect::TaskList {
                if let Some(inner) = CHECKBOX.captures(item).and_then(|c| c.get(1)) {
                    item = inner.as_str().trim();
                }
            }
            if !item.is_empty() {
                checklist.add_item(category, item);
            }
        }
    }

    checklist
}

/// Encode a checklist using the plain dialect.
#[must_use]
pub fn render(checklist: &Checklist) -> String {
    render_with(checklist, Dialect::Plain)
}

/// Encode a checklist as Markdown.
///
/// Empty categories are skipped so the output re-decodes to the pruned
/// checklist.
#[must_use]
pub fn render_with(checklist: &Checklist, dialect: Dialect) -> String {
    let bullet = match dialect {
        Dialect::Plain => "- ",
        Dialect::TaskList => "- [ ] ",
    };

    let mut out = format!("{TITLE}\n\n{DESCRIPTION}\n\n");

    for category in checklist.categories() {
        if category.items.is_empty() {
            continue;
        }
        out.push_str("## ");
        out.push_str(&category.name);
        out.push_str("\n\n");
        for item in &category.items {
            out.push_str(bullet);
            out.push_str(&item.content);
            out.push('\n');
        }
        out.push('\n');
    }

    out
}

/// Rendered form of an empty checklist.
#[must_use]
pub fn preamble() -> String {
    format!("{TITLE}\n\n{DESCRIPTION}\n\n")
}
