//! Output formatting for `warehouse` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, OutputMode::Json)
    }
}

/// Render rows with the shared table style
pub fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Rows as a table, or as a JSON array with `--json`
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    if mode.is_json() {
        return print_json(items);
    }
    if items.is_empty() {
        println!("(nothing to show)");
    } else {
        println!("{}", render_table(items));
    }
    Ok(())
}

/// Print a single Serialize item as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Key/value row for summary tables.
#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    pub field: String,
    pub value: String,
}

impl FieldRow {
    pub fn new(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

pub fn print_fields(rows: &[FieldRow]) {
    println!("{}", render_table(rows));
}

/// Print a section heading.
pub fn print_heading(title: &str) {
    println!("\n\x1b[1m{title}\x1b[0m");
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("\x1b[32m{msg}\x1b[0m");
}

/// Print a warning message.
pub fn print_warn(msg: &str) {
    println!("\x1b[33m{msg}\x1b[0m");
}

/// Ask a yes/no question on stdin; anything but "y"/"yes" declines
pub fn confirm(prompt: &str) -> bool {
    use std::io::{self, BufRead, Write};
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(_) => false,
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
