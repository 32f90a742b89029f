//! `passlock audit` — display the audit log.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{session_dir, Cli};
use crate::errors::{PasslockError, Result};

/// Execute the `audit` command.
pub fn execute(cli: &Cli, last: usize) -> Result<()> {
    let dir = session_dir(cli)?;
    let audit = AuditLog::open(&dir)
        .ok_or_else(|| PasslockError::AuditError("failed to open audit database".into()))?;

    let entries = audit.recent(last)?;
    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Entry", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.entry_id.clone().unwrap_or_else(|| "-".into()),
            entry.details.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

fn colorize_operation(op: &str) -> String {
    match op {
        "init" => style(op).green().to_string(),
        "add" | "save" => style(op).blue().to_string(),
        "delete" => style(op).red().to_string(),
        "unlock" | "logout" => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorize_keeps_operation_text() {
        console::set_colors_enabled(false);
        assert_eq!(colorize_operation("delete"), "delete");
        assert_eq!(colorize_operation("whatever"), "whatever");
    }
}
