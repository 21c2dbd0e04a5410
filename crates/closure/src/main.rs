// Copyright 2024 International Digital Economy Academy
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::io::IsTerminal;

use clap::Parser;
use cli::{ClosureSubcommands, UniversalFlags};
use colored::*;

mod cli;

/// Initialize logging.
///
/// `RUST_LOG` filters the log output printed to stderr; without it only
/// warnings are shown, or debug output with `--verbose`.
fn init_tracing(flags: &UniversalFlags) {
    let log_env_set = std::env::var("RUST_LOG").is_ok();
    let default_level = if flags.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_line_number(log_env_set)
        .with_level(true)
        .with_writer(std::io::stderr);
    if !log_env_set {
        fmt.with_target(false).without_time().init();
    } else {
        fmt.compact().init();
    }
}

pub fn main() {
    let cli = cli::ClosureCli::parse();
    let flags = cli.flags;

    init_tracing(&flags);

    let res = match cli.subcommand {
        ClosureSubcommands::Resolve(r) => cli::run_resolve(&flags, r),
    };

    match res {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {:?}", "error".red().bold(), e);
            std::process::exit(-1);
        }
    }
}
