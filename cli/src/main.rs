// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

mod logger;

use std::process;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand};
use ptr_probe::{Candidate, Limits, Prober};

/// Exit code for candidates that do not fit into a native address.
const EXIT_RANGE_ERROR: i32 = 3;

/// Helper for passing VERSION to opt.
/// If `CARGO_VERSION_INFO` is set, use it, otherwise use `CARGO_PKG_VERSION`.
fn version() -> &'static str {
    option_env!("CARGO_VERSION_INFO").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Checks whether addresses are mapped in this process without touching them
#[derive(Debug, Parser)]
#[clap(version = version())]
struct Cli {
    #[clap(subcommand)]
    cmd: Command,
    #[clap(flatten)]
    common: Common,
}

#[derive(Debug, Args)]
struct Common {
    /// Enables verbose logging
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Prints `true` if ADDRESS lies on a mapped page of this process, `false` otherwise
    Check {
        /// The address, in decimal or with a 0x, 0o or 0b prefix. Any width is accepted.
        #[clap(allow_hyphen_values = true)]
        address: Candidate,
    },
    /// Prints the address limits and page size of this platform
    Limits,
}

fn main() {
    let cli = Cli::parse();

    logger::init(cli.common.verbose);

    if let Err(err) = run(cli.cmd) {
        log::error!("{err:#}");

        let code = match err.downcast_ref::<ptr_probe::Error>() {
            Some(ptr_probe::Error::Overflow(_)) => EXIT_RANGE_ERROR,
            _ => 1,
        };
        process::exit(code);
    }
}

fn run(cmd: Command) -> anyhow::Result<()> {
    match cmd {
        Command::Check { address } => {
            log::debug!("probing {address:?}");

            let prober = Prober::host()?;
            let residency = prober.probe(address)?;

            println!("{}", bool::from(residency));
        }
        Command::Limits => {
            for (name, value) in Limits::HOST.entries() {
                println!("{name:<12} {value}");
            }

            // independent of whether the host can answer residency queries
            let page_size =
                ptr_probe::host::page_size().context("failed to determine the page size")?;
            println!("{:<12} {page_size}", "PAGE_SIZE");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn check_takes_exactly_one_address() {
        assert!(Cli::try_parse_from(["ptr-probe", "check"]).is_err());
        assert!(Cli::try_parse_from(["ptr-probe", "check", "0x1000", "0x2000"]).is_err());

        let cli = Cli::try_parse_from(["ptr-probe", "-v", "check", "0x1000"]).unwrap();
        assert_eq!(cli.common.verbose, 1);
        let Command::Check { address } = cli.cmd else {
            panic!("expected the check subcommand");
        };
        assert_eq!(address, Candidate::new(0x1000));
    }

    #[test]
    fn check_rejects_non_addresses() {
        for arg in ["-1", "1.5", "banana", "", "1_", "1__2", "0x1.8"] {
            let err = Cli::try_parse_from(["ptr-probe", "check", arg]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation, "{arg:?}");
        }
    }

    #[test]
    fn limits_do_not_need_a_residency_query() {
        run(Command::Limits).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn overflow_maps_to_range_error() {
        let err = run(Command::Check {
            address: Candidate::new(u128::MAX),
        })
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ptr_probe::Error>(),
            Some(ptr_probe::Error::Overflow(_))
        ));
    }
}
