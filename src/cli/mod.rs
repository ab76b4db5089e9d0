//! Command-line front end
//!
//! Argument parsing, sender selection, the confirmation prompt and the final
//! summary. The binary wires these to the item source and the scheduler.

pub mod args;
pub mod senders;

pub use args::{Cli, LONG_VERSION};
pub use senders::{collect_senders, dedup_items, load_sender_list, parse_sender_lines};

use crate::core::batch::{DeleteMode, RunReport};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

/// Exit status after Ctrl+C
pub const EXIT_CANCELLED: u8 = 130;
/// Exit status when items were left behind
pub const EXIT_INCOMPLETE: u8 = 2;

/// `y` or `yes`, case-insensitive
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Question shown before a large delete
pub fn confirmation_prompt(total: usize, folder: &str, mode: DeleteMode) -> String {
    let action = match mode {
        DeleteMode::Soft => "delete (move to Deleted Items)",
        DeleteMode::Hard => "hard delete (permanent)",
    };
    format!(
        "About to {} {} message(s) in '{}'. Proceed? [y/N]: ",
        action, total, folder
    )
}

/// Ask on stdin; EOF or a read error counts as "no". Blocks the calling
/// thread.
pub fn confirm(prompt: &str) -> bool {
    print!("\n{}", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_affirmative(&answer),
    }
}

/// Human summary of a finished run
pub fn format_summary(report: &RunReport, mode: DeleteMode) -> String {
    let mut lines = vec![format!(
        "Done. {} {} message(s).",
        capitalize(mode.label()),
        report.succeeded
    )];
    if !report.fatal.is_empty() {
        lines.push(format!(
            "{} message(s) could not be deleted and were skipped.",
            report.fatal.len()
        ));
    }
    if !report.given_up.is_empty() {
        lines.push(format!(
            "Gave up on {} message(s) after {} wave(s).",
            report.given_up.len(),
            report.waves
        ));
    }
    if report.cancelled {
        lines.push("Stopped early by Ctrl+C.".to_string());
    }
    lines.join("\n")
}

/// Process exit status for a finished run
pub fn exit_status(report: &RunReport) -> u8 {
    if report.cancelled {
        EXIT_CANCELLED
    } else if !report.is_complete() {
        EXIT_INCOMPLETE
    } else {
        0
    }
}

pub fn exit_code(report: &RunReport) -> ExitCode {
    ExitCode::from(exit_status(report))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
