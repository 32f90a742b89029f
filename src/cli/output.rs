//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::password::{Strength, StrengthReport};
use crate::vault::{Entry, VaultInfo};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (ID, Name, Username, URL, Tags, Created).
///
/// Passwords are never shown here; use `show --reveal` for that.
pub fn print_entries_table(entries: &[Entry]) {
    if entries.is_empty() {
        info("No entries found.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["ID", "Name", "Username", "URL", "Tags", "Created"]);

    for e in entries {
        table.add_row(vec![
            e.id.clone(),
            e.name.clone(),
            e.username.clone(),
            e.url.clone().unwrap_or_else(|| "-".into()),
            join_tags(e),
            e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print every field of one entry.  The password is masked unless `reveal`.
pub fn print_entry(entry: &Entry, reveal: bool) {
    let password = if reveal {
        entry.password.clone()
    } else {
        "\u{2022}".repeat(8)
    };

    println!("{:>10}  {}", style("ID").bold(), entry.id);
    println!("{:>10}  {}", style("Name").bold(), entry.name);
    println!("{:>10}  {}", style("Username").bold(), entry.username);
    println!("{:>10}  {}", style("Password").bold(), password);
    if let Some(url) = &entry.url {
        println!("{:>10}  {}", style("URL").bold(), url);
    }
    if let Some(notes) = &entry.notes {
        println!("{:>10}  {}", style("Notes").bold(), notes);
    }
    if !entry.tags.is_empty() {
        println!("{:>10}  {}", style("Tags").bold(), join_tags(entry));
    }
    println!(
        "{:>10}  {}",
        style("Created").bold(),
        entry.created_at.format("%Y-%m-%d %H:%M:%S")
    );
}

/// Print a strength report with a colored label and any feedback.
pub fn print_strength(report: &StrengthReport) {
    let label = match report.strength {
        Strength::Weak => style(report.strength.to_string()).red().bold(),
        Strength::Fair => style(report.strength.to_string()).yellow().bold(),
        Strength::Good => style(report.strength.to_string()).blue().bold(),
        Strength::Strong => style(report.strength.to_string()).green().bold(),
    };

    println!(
        "Strength: {label} ({}%, score {})",
        report.percentage, report.score
    );
    for hint in &report.feedback {
        tip(hint);
    }
}

/// Print the unauthenticated vault metadata.
pub fn print_vault_info(path: &std::path::Path, info: &VaultInfo) {
    println!("{:>10}  {}", style("Vault").bold(), path.display());
    println!("{:>10}  {}", style("Salt").bold(), info.salt);
    println!(
        "{:>10}  {} bytes",
        style("Sealed").bold(),
        info.ciphertext_len
    );
}

fn join_tags(entry: &Entry) -> String {
    if entry.tags.is_empty() {
        return "-".into();
    }
    entry.tags.iter().cloned().collect::<Vec<_>>().join(", ")
}
