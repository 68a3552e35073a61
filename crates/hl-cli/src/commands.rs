use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use hl_ledger::{BlockView, DigestAlgorithm, Ledger, LedgerConfig, SharedLedger};
use serde_json::json;

use crate::cli::*;
use crate::render;
use crate::session::Session;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref(), cli.algorithm)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let succeeded = match cli.command {
        Command::Demo(_) => cmd_demo(config, cli.format, &mut out)?,
        Command::Session(args) => cmd_session(config, cli.format, args, &mut out)?,
        Command::Verify(args) => cmd_verify(config, cli.format, args, &mut out)?,
    };
    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn load_config(path: Option<&Path>, algorithm: Option<DigestAlgorithm>) -> anyhow::Result<LedgerConfig> {
    let mut config = match path {
        Some(path) => LedgerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LedgerConfig::default(),
    };
    if let Some(algorithm) = algorithm {
        config.algorithm = algorithm;
    }
    Ok(config)
}

fn cmd_demo(config: LedgerConfig, format: OutputFormat, out: &mut impl Write) -> anyhow::Result<bool> {
    let mut ledger: Ledger<String> = Ledger::with_config(config)?;
    let text = format == OutputFormat::Text;

    if text {
        writeln!(out, "{} Created ledger with genesis block ({})", "✓".green().bold(), ledger.config().algorithm.to_string().cyan())?;
    }
    for payload in ["A", "B"] {
        let position = ledger.append(payload.to_string())?;
        if text {
            writeln!(out, "{} append {:?} → block #{position} {}", "+".green().bold(), payload, ledger.last().digest().short_hex().dimmed())?;
        }
    }
    let before = ledger.is_valid();
    if text {
        writeln!(out, "{}", render::verdict_text(before, ledger.len()))?;
    }

    let tampered = ledger.tamper(1, "A-hacked".to_string());
    if text {
        writeln!(out, "{} tamper block #1 → \"A-hacked\": {}", "!".yellow().bold(), if tampered { "applied" } else { "rejected" })?;
        writeln!(out, "{}", render::verdict_text(ledger.is_valid(), ledger.len()))?;
    }

    let out_of_range = ledger.tamper(5, "x".to_string());
    let after = ledger.is_valid();
    if text {
        writeln!(out, "{} tamper block #5 → \"x\": {}", "!".yellow().bold(), if out_of_range { "applied" } else { "rejected (index out of range)" })?;
        writeln!(out, "{}", render::verdict_text(after, ledger.len()))?;
        write!(out, "{}", render::report_text(&ledger.verify()))?;
    } else {
        let summary = json!({
            "valid_before_tamper": before,
            "tampered": tampered,
            "out_of_range_tampered": out_of_range,
            "valid_after_tamper": after,
            "chain": ledger.snapshot(),
            "report": ledger.verify(),
        });
        writeln!(out, "{}", render::json(&summary)?)?;
    }
    Ok(true)
}

fn cmd_session(config: LedgerConfig, format: OutputFormat, args: SessionArgs, out: &mut impl Write) -> anyhow::Result<bool> {
    let ledger = SharedLedger::new(Ledger::<String>::with_config(config)?);
    let mut session = Session::new(&ledger, out, format);
    match args.script {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("opening script {}", path.display()))?;
            session.run(BufReader::new(file))?;
        }
        None => session.run(io::stdin().lock())?,
    }
    Ok(true)
}

fn cmd_verify(config: LedgerConfig, format: OutputFormat, args: VerifyArgs, out: &mut impl Write) -> anyhow::Result<bool> {
    let source = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("reading snapshot {}", args.snapshot.display()))?;
    let views: Vec<BlockView<serde_json::Value>> = serde_json::from_str(&source)
        .with_context(|| format!("parsing snapshot {}", args.snapshot.display()))?;
    let ledger = Ledger::from_snapshot(views, config)?;
    let report = ledger.verify();

    match format {
        OutputFormat::Text => write!(out, "{}", render::report_text(&report))?,
        OutputFormat::Json => writeln!(out, "{}", render::json(&report)?)?,
    }

    Ok(report.is_valid())
}
