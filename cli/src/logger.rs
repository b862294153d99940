// Copyright 2025 Jonas Kruckenberg
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::Write;

use anstyle::{AnsiColor, Color, Style};
use log::{Level, log_enabled};

/// Installs the global logger. `RUST_LOG` takes precedence over `verbosity`.
pub fn init(verbosity: u8) {
    let mut builder = env_logger::Builder::new();

    builder
        .format_indent(Some(8))
        .filter_level(verbosity_level(verbosity).to_level_filter())
        .parse_default_env()
        .format(|f, record| {
            let style = f.default_level_style(record.level()).bold();

            write!(
                f,
                "{style}{:>6}{style:#} ",
                prettyprint_level(record.level())
            )?;

            if log_enabled!(Level::Debug) {
                let style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack)));

                write!(f, "{style}[{}]{style:#} ", record.target())?;
            }

            writeln!(f, "{}", record.args())
        })
        .init();
}

/// This maps the occurrence of `--verbose` flags to the correct log level
fn verbosity_level(num: u8) -> Level {
    match num {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        3.. => Level::Trace,
    }
}

/// The default string representation for `Level` is all uppercaps which doesn't mix well with
/// the probe results printed to stdout.
fn prettyprint_level(lvl: Level) -> &'static str {
    match lvl {
        Level::Error => "Error",
        Level::Warn => "Warn",
        Level::Info => "Info",
        Level::Debug => "Debug",
        Level::Trace => "Trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity() {
        assert_eq!(verbosity_level(0), Level::Warn);
        assert_eq!(verbosity_level(2), Level::Debug);
        assert_eq!(verbosity_level(u8::MAX), Level::Trace);
    }
}
