use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use hl_ledger::DigestAlgorithm;

#[derive(Parser)]
#[command(
    name = "hashlink",
    about = "HashLink — tamper-evident, hash-linked ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Ledger configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Digest algorithm (sha256, sha-256, blake3); overrides the config file
    #[arg(long, global = true)]
    pub algorithm: Option<DigestAlgorithm>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Append two blocks, tamper with one, and validate along the way
    Demo(DemoArgs),
    /// Drive a ledger with line commands from a script or stdin
    Session(SessionArgs),
    /// Validate an exported JSON snapshot
    Verify(VerifyArgs),
}

#[derive(Args)]
pub struct DemoArgs {}

#[derive(Args)]
pub struct SessionArgs {
    /// Read commands from this file instead of stdin
    #[arg(long)]
    pub script: Option<PathBuf>,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub snapshot: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_demo() {
        let cli = Cli::try_parse_from(["hashlink", "demo"]).unwrap();
        assert!(matches!(cli.command, Command::Demo(_)));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.config.is_none());
    }

    #[test]
    fn parse_session_script() {
        let cli = Cli::try_parse_from(["hashlink", "session", "--script", "cmds.txt"]).unwrap();
        if let Command::Session(args) = cli.command {
            assert_eq!(args.script, Some(PathBuf::from("cmds.txt")));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_session_stdin() {
        let cli = Cli::try_parse_from(["hashlink", "session"]).unwrap();
        if let Command::Session(args) = cli.command {
            assert!(args.script.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["hashlink", "verify", "chain.json"]).unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.snapshot, PathBuf::from("chain.json"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn verify_requires_a_path() {
        assert!(Cli::try_parse_from(["hashlink", "verify"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "hashlink", "demo", "--verbose", "--format", "json", "--config", "hl.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("hl.toml")));
        assert!(cli.algorithm.is_none());
    }

    #[test]
    fn parse_algorithm_override() {
        let cli = Cli::try_parse_from(["hashlink", "demo", "--algorithm", "SHA-256"]).unwrap();
        assert_eq!(cli.algorithm, Some(DigestAlgorithm::Sha256));

        let cli = Cli::try_parse_from(["hashlink", "--algorithm", "blake3", "verify", "c.json"]).unwrap();
        assert_eq!(cli.algorithm, Some(DigestAlgorithm::Blake3));
    }

    #[test]
    fn unknown_algorithm_is_a_usage_error() {
        let err = Cli::try_parse_from(["hashlink", "demo", "--algorithm", "md5"]).err().unwrap();
        assert!(err.to_string().contains("unknown digest algorithm: md5"));
    }
}
