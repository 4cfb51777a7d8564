//! # furs CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to the
//! subcommand handlers in the `furs_cli` library.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use furs_cli::echo::{run_echo, EchoArgs};
use furs_cli::verify::{run_verify, VerifyArgs};
use furs_cli::zoi::{run_zoi, ZoiArgs};

/// FURS fiscal verification operator tool.
///
/// Endpoints and the client certificate OU come from `FURS_ENV` and the
/// other `FURS_*` variables; keys and certificates are passed as PEM files.
#[derive(Parser, Debug)]
#[command(name = "furs", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    /// Without it, `RUST_LOG` applies (default: info).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Round-trip a message through the FURS echo endpoint.
    Echo(EchoArgs),

    /// Compute the protective mark (ZOI) of an invoice offline.
    Zoi(ZoiArgs),

    /// Verify a signed token and print its payload.
    VerifyToken(VerifyArgs),
}

fn log_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = log_filter(cli.verbose);
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "furs CLI starting");

    let result = match cli.command {
        Commands::Echo(args) => run_echo(&args),
        Commands::Zoi(args) => run_zoi(&args),
        Commands::VerifyToken(args) => run_verify(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn cli_parse_echo() {
        let cli = Cli::try_parse_from([
            "furs",
            "echo",
            "--bundle",
            "pos.pem",
            "--server-cert",
            "furs.pem",
            "--ca",
            "ca1.pem",
            "--ca",
            "ca2.pem",
            "hello",
        ])
        .unwrap();
        if let Commands::Echo(args) = cli.command {
            assert_eq!(args.credential.bundle, PathBuf::from("pos.pem"));
            assert_eq!(args.ca.len(), 2);
            assert_eq!(args.message, "hello");
            assert!(args.credential.ou.is_none());
        } else {
            panic!("expected echo");
        }
    }

    #[test]
    fn cli_parse_echo_requires_ca() {
        let result = Cli::try_parse_from([
            "furs",
            "echo",
            "--bundle",
            "pos.pem",
            "--server-cert",
            "furs.pem",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_zoi_with_negative_amount() {
        let cli = Cli::try_parse_from([
            "furs",
            "zoi",
            "--bundle",
            "pos.pem",
            "--server-cert",
            "furs.pem",
            "--ou",
            "DavPotRac",
            "--tax-number",
            "12345678",
            "--issued",
            "2019-08-01T13:45:07",
            "--premise",
            "A17",
            "--device",
            "PP1",
            "--number",
            "DEVX",
            "--amount",
            "-12.34",
        ])
        .unwrap();
        if let Commands::Zoi(args) = cli.command {
            assert_eq!(args.tax_number, 12345678);
            assert_eq!(args.amount.to_string(), "-12.34");
            assert_eq!(args.credential.ou.as_deref(), Some("DavPotRac"));
            assert!(!args.show_input);
        } else {
            panic!("expected zoi");
        }
    }

    #[test]
    fn cli_parse_verify_token_header_only_needs_no_cert() {
        let cli =
            Cli::try_parse_from(["furs", "verify-token", "reply.token", "--header-only"]).unwrap();
        if let Commands::VerifyToken(args) = cli.command {
            assert!(args.header_only);
            assert!(args.cert.is_none());
        } else {
            panic!("expected verify-token");
        }
    }

    #[test]
    fn cli_parse_verify_token_requires_cert() {
        assert!(Cli::try_parse_from(["furs", "verify-token", "reply.token"]).is_err());
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "furs",
            "-vv",
            "--json-logs",
            "verify-token",
            "t",
            "--cert",
            "c.pem",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json_logs);
    }
}
