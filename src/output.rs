//! Colored console output for layout reports.
//!
//! Color scheme: blue+bold headers, cyan values, green success,
//! yellow warnings, dimmed secondary text.

use crate::report::{LayoutEntry, LayoutReport};
use colored::Colorize;

// ── Helpers ────────────────────────────────────────────────────────

/// Format a byte span inside a slot as `[from..to)`.
pub fn format_span(entry: &LayoutEntry) -> String {
    if entry.slot == entry.end_slot {
        format!("[{}..{})", entry.offset, entry.end_offset)
    } else {
        format!(
            "[{}..{}) to slot {}",
            entry.offset, entry.end_offset, entry.end_slot
        )
    }
}

// ── Session ────────────────────────────────────────────────────────

/// Print what was loaded.
pub fn print_loaded(contracts: usize, declarations: usize) {
    println!();
    println!("{}", "=== Storage Layout ===".blue().bold());
    println!("  Contracts:    {}", contracts.to_string().cyan());
    println!("  Struct/enum:  {}", declarations.to_string().cyan());
}

// ── Layout ─────────────────────────────────────────────────────────

/// Print one contract's layout as a table.
pub fn print_layout(report: &LayoutReport, bases: &[String]) {
    println!();
    println!("{}", format!("{}:", report.contract).blue().bold());
    if bases.len() > 1 {
        println!(
            "  {} {}",
            "Inherits:".dimmed(),
            bases[1..].join(", ").dimmed()
        );
    }
    if report.is_empty() {
        println!("  {}", "(no storage variables)".dimmed());
        return;
    }
    println!(
        "  {:>6}  {:<16}  {:<32}  {}",
        "slot".dimmed(),
        "bytes".dimmed(),
        "variable".dimmed(),
        "type".dimmed()
    );
    for entry in &report.entries {
        println!(
            "  {:>6}  {:<16}  {:<32}  {}",
            entry.slot.cyan(),
            format_span(entry),
            entry.label,
            entry.type_string.dimmed()
        );
    }
    println!(
        "  {} {} slots used",
        "OK".green().bold(),
        report.slots_used.cyan()
    );
}

/// Print a warning line.
pub fn print_warning(msg: &str) {
    println!("  {} {}", "WARNING:".yellow().bold(), msg);
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slot: &str, offset: usize, end_slot: &str, end_offset: usize) -> LayoutEntry {
        LayoutEntry {
            ast_id: 1,
            label: "x".into(),
            type_string: "uint8".into(),
            slot: slot.into(),
            offset,
            end_slot: end_slot.into(),
            end_offset,
            size: "1".to_string(),
            path: vec![],
        }
    }

    #[test]
    fn test_format_span_single_slot() {
        assert_eq!(format_span(&entry("0", 4, "0", 8)), "[4..8)");
    }

    #[test]
    fn test_format_span_multi_slot() {
        assert_eq!(format_span(&entry("2", 0, "4", 32)), "[0..32) to slot 4");
    }
}
