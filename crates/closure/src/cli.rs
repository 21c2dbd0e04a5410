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

pub mod resolve;

pub use resolve::*;

#[derive(Debug, clap::Parser)]
#[clap(
    name = "closure",
    about = "Transitive dependency closure of package versions."
)]
pub struct ClosureCli {
    #[clap(subcommand)]
    pub subcommand: ClosureSubcommands,

    #[clap(flatten)]
    pub flags: UniversalFlags,
}

#[derive(Debug, clap::Parser)]
pub enum ClosureSubcommands {
    Resolve(ResolveSubcommand),
}

#[derive(Debug, Default, clap::Parser)]
#[clap(next_help_heading("Common options"))]
pub struct UniversalFlags {
    /// Suppress output
    #[clap(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase verbosity
    #[clap(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn test_cli() {
        ClosureCli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        let cli = ClosureCli::try_parse_from([
            "closure",
            "resolve",
            "--snapshot",
            "registry.json",
            "--registry",
            "npmjs.org",
            "express",
            "4.18.2",
            "--max-depth",
            "3",
            "--kind",
            "runtime",
            "-q",
        ])
        .unwrap();
        assert!(cli.flags.quiet);
        let ClosureSubcommands::Resolve(cmd) = cli.subcommand;
        assert_eq!(cmd.package, "express");
        assert_eq!(cmd.version, "4.18.2");
        let options = cmd.options();
        assert_eq!(options.max_depth, 3);
        assert_eq!(options.kind.as_deref(), Some("runtime"));
        assert!(!options.include_optional);
    }
}
