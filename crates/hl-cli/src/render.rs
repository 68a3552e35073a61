use colored::Colorize;
use hl_ledger::{BlockView, ValidationReport};
use serde::Serialize;

/// Human-readable listing of a chain snapshot.
pub fn chain_text<P: Serialize>(views: &[BlockView<P>]) -> String {
    let mut out = String::new();
    for view in views {
        let payload = serde_json::to_string(&view.payload)
            .unwrap_or_else(|e| format!("<unencodable: {e}>"));
        out.push_str(&format!("{}  {}\n", format!("#{}", view.position).yellow().bold(), payload));
        out.push_str(&format!("    time      {}\n", view.timestamp));
        out.push_str(&format!("    digest    {}\n", view.digest.to_string().dimmed()));
        out.push_str(&format!("    previous  {}\n", view.previous_digest.to_string().dimmed()));
    }
    out
}

/// One-line validity verdict.
pub fn verdict_text(valid: bool, block_count: usize) -> String {
    if valid {
        format!("{} chain valid ({block_count} blocks)", "✓".green().bold())
    } else {
        format!("{} chain INVALID ({block_count} blocks)", "✗".red().bold())
    }
}

/// Full validation report.
pub fn report_text(report: &ValidationReport) -> String {
    let mut out = verdict_text(report.is_valid(), report.block_count as usize);
    out.push('\n');
    out.push_str(&format!("  Digests: {}\n", flag(report.digests_consistent, "consistent", "stale")));
    out.push_str(&format!("  Links: {}\n", flag(report.links_intact, "intact", "broken")));
    for violation in &report.violations {
        out.push_str(&format!(
            "  {} block {}: {}\n",
            "!".red().bold(),
            violation.position,
            violation.description
        ));
    }
    out
}

fn flag(ok: bool, good: &str, bad: &str) -> String {
    if ok {
        good.green().to_string()
    } else {
        bad.red().to_string()
    }
}

pub fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
