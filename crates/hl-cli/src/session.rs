//! Line-oriented host session.
//!
//! Each input line is one command:
//!
//! ```text
//! append <text>
//! tamper <index> <text>
//! validate
//! show
//! report
//! export
//! help
//! quit
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A line that fails to
//! parse is reported and the session continues.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Context;
use colored::Colorize;
use hl_ledger::{LedgerReader, LedgerWriter};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::render;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionCommand {
    Append(String),
    Tamper { index: i64, payload: String },
    Validate,
    Show,
    Report,
    Export,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("`{command}` needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("invalid block index: {0}")]
    InvalidIndex(String),
}

const HELP: &str = "\
commands:
  append <text>          add a block
  tamper <index> <text>  overwrite a payload without updating its digest
  validate               check the whole chain
  show                   list every block
  report                 list every violation
  export                 print the chain as JSON
  quit                   end the session";

impl FromStr for SessionCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" => Err(ParseError::Empty),
            "append" | "add" => {
                if rest.is_empty() {
                    return Err(ParseError::MissingArgument {
                        command: "append",
                        argument: "a payload",
                    });
                }
                Ok(Self::Append(rest.to_string()))
            }
            "tamper" => {
                let (index, payload) = rest.split_once(char::is_whitespace).ok_or(
                    ParseError::MissingArgument {
                        command: "tamper",
                        argument: "an index and a payload",
                    },
                )?;
                let index = index
                    .parse::<i64>()
                    .map_err(|_| ParseError::InvalidIndex(index.to_string()))?;
                Ok(Self::Tamper {
                    index,
                    payload: payload.trim().to_string(),
                })
            }
            "validate" | "valid" => Ok(Self::Validate),
            "show" | "chain" => Ok(Self::Show),
            "report" => Ok(Self::Report),
            "export" => Ok(Self::Export),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

/// Executes session commands against a ledger and writes results to `out`.
pub struct Session<'a, L, W> {
    ledger: &'a L,
    out: W,
    format: OutputFormat,
}

impl<'a, L, W> Session<'a, L, W>
where
    L: LedgerWriter<String> + LedgerReader<String>,
    W: Write,
{
    pub fn new(ledger: &'a L, out: W, format: OutputFormat) -> Self {
        Self {
            ledger,
            out,
            format,
        }
    }

    /// Run commands from `input` until it ends or `quit` is read.
    pub fn run<R: BufRead>(&mut self, input: R) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line.context("reading session input")?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match trimmed.parse::<SessionCommand>() {
                Ok(SessionCommand::Quit) => break,
                Ok(command) => self.execute(command)?,
                Err(err) => {
                    tracing::debug!(line = trimmed, %err, "rejected session line");
                    self.emit_error(&err.to_string())?;
                }
            }
        }
        Ok(())
    }

    pub fn execute(&mut self, command: SessionCommand) -> anyhow::Result<()> {
        match command {
            SessionCommand::Append(payload) => {
                let position = self.ledger.append(payload)?;
                match self.format {
                    OutputFormat::Text => {
                        writeln!(self.out, "{} appended block #{position}", "+".green().bold())?
                    }
                    OutputFormat::Json => writeln!(self.out, "{}", json!({ "appended": position }))?,
                }
            }
            SessionCommand::Tamper { index, payload } => {
                let applied = self.ledger.tamper(index, payload)?;
                match (self.format, applied) {
                    (OutputFormat::Text, true) => writeln!(
                        self.out,
                        "{} block #{index} tampered (digest left unchanged)",
                        "!".yellow().bold()
                    )?,
                    (OutputFormat::Text, false) => {
                        writeln!(self.out, "{} invalid block index {index}", "✗".red().bold())?
                    }
                    (OutputFormat::Json, _) => writeln!(
                        self.out,
                        "{}",
                        json!({ "tampered": applied, "index": index })
                    )?,
                }
            }
            SessionCommand::Validate => {
                let valid = self.ledger.is_valid()?;
                match self.format {
                    OutputFormat::Text => {
                        let count = self.ledger.block_count()?;
                        writeln!(self.out, "{}", render::verdict_text(valid, count))?
                    }
                    OutputFormat::Json => writeln!(self.out, "{}", json!({ "is_valid": valid }))?,
                }
            }
            SessionCommand::Show => {
                let views = self.ledger.snapshot()?;
                match self.format {
                    OutputFormat::Text => write!(self.out, "{}", render::chain_text(&views))?,
                    OutputFormat::Json => writeln!(self.out, "{}", serde_json::to_string(&views)?)?,
                }
            }
            SessionCommand::Report => {
                let report = self.ledger.verify()?;
                match self.format {
                    OutputFormat::Text => write!(self.out, "{}", render::report_text(&report))?,
                    OutputFormat::Json => writeln!(self.out, "{}", serde_json::to_string(&report)?)?,
                }
            }
            SessionCommand::Export => {
                let views = self.ledger.snapshot()?;
                writeln!(self.out, "{}", render::json(&views)?)?;
            }
            SessionCommand::Help => writeln!(self.out, "{HELP}")?,
            SessionCommand::Quit => {}
        }
        Ok(())
    }

    fn emit_error(&mut self, message: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.out, "{} {message}", "error:".red().bold())?,
            OutputFormat::Json => writeln!(self.out, "{}", json!({ "error": message }))?,
        }
        Ok(())
    }
}
