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

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use closure_resolver::resolver::{DEFAULT_MAX_DEPENDENCIES, DEFAULT_MAX_DEPTH};
use closure_resolver::{
    ClosureResolver, MemoryStore, ResolveOptions, ResolvedDependency, SemverSatisfier, VersionRef,
};

use super::UniversalFlags;

/// Resolve the transitive dependencies of a package version
#[derive(Debug, clap::Parser)]
pub struct ResolveSubcommand {
    /// JSON snapshot of the registries to resolve against
    #[clap(long, short = 's', env = "CLOSURE_SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Registry the root package is published to
    #[clap(long, short = 'r')]
    pub registry: String,

    /// Name of the root package
    pub package: String,

    /// Version of the root package
    pub version: String,

    /// Maximum number of levels to descend below the root
    #[clap(long, env = "CLOSURE_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Fail when the closure has more entries than this
    #[clap(long, env = "CLOSURE_MAX_DEPENDENCIES", default_value_t = DEFAULT_MAX_DEPENDENCIES)]
    pub max_dependencies: usize,

    /// Follow optional dependencies
    #[clap(long)]
    pub include_optional: bool,

    /// Only follow dependencies of this kind, e.g. `runtime`
    #[clap(long)]
    pub kind: Option<String>,

    /// Print the closure as JSON
    #[clap(long)]
    pub json: bool,
}

impl ResolveSubcommand {
    pub fn options(&self) -> ResolveOptions {
        ResolveOptions {
            max_depth: self.max_depth,
            max_dependencies: self.max_dependencies,
            include_optional: self.include_optional,
            kind: self.kind.clone(),
        }
    }

    pub fn root(&self) -> VersionRef {
        VersionRef::new(&self.registry, &self.package, &self.version)
    }
}

pub fn run_resolve(flags: &UniversalFlags, cmd: ResolveSubcommand) -> anyhow::Result<i32> {
    let closure = resolve_snapshot(&cmd)?;

    let mut stdout = std::io::stdout().lock();
    if cmd.json {
        serde_json::to_writer_pretty(&mut stdout, &closure)?;
        writeln!(stdout)?;
    } else if !flags.quiet {
        write!(stdout, "{}", render_closure(&closure))?;
    }
    Ok(0)
}

fn resolve_snapshot(cmd: &ResolveSubcommand) -> anyhow::Result<Vec<ResolvedDependency>> {
    let file = File::open(&cmd.snapshot)
        .with_context(|| format!("failed to open snapshot `{}`", cmd.snapshot.display()))?;
    let store = MemoryStore::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse snapshot `{}`", cmd.snapshot.display()))?;

    let satisfier = SemverSatisfier;
    let resolver = ClosureResolver::new(&store, &satisfier);
    let root = cmd.root();
    let closure = resolver
        .resolve(&root, &cmd.options())
        .with_context(|| format!("failed to resolve {root}"))?;
    Ok(closure)
}

/// One line per entry: `name@version`, requirements, kind.
pub fn render_closure(closure: &[ResolvedDependency]) -> String {
    let labels: Vec<String> = closure.iter().map(|dep| dep.to_string()).collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0);
    let mut out = String::new();
    for (dep, label) in closure.iter().zip(&labels) {
        out.push_str(&format!(
            "{label:<width$}  {}  {}{}\n",
            dep.requirements,
            dep.kind,
            if dep.optional { " (optional)" } else { "" }
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use expect_test::expect;

    use super::*;

    const SNAPSHOT: &str = r#"{
        "registries": {
            "crates.io": [
                {
                    "name": "app",
                    "ecosystem": "cargo",
                    "versions": [
                        {
                            "number": "1.0.0",
                            "dependencies": [
                                {"package_name": "serde", "requirements": "1.0"},
                                {"package_name": "log", "requirements": "^0.4", "optional": true}
                            ]
                        }
                    ]
                },
                {
                    "name": "serde",
                    "ecosystem": "cargo",
                    "versions": [
                        {"number": "1.0.100"},
                        {"number": "1.0.200"}
                    ]
                },
                {
                    "name": "log",
                    "ecosystem": "cargo",
                    "versions": [{"number": "0.4.20"}]
                }
            ]
        }
    }"#;

    fn command(snapshot: PathBuf, extra: &[&str]) -> ResolveSubcommand {
        use clap::Parser;
        let snapshot = snapshot.to_string_lossy().into_owned();
        let mut args = vec![
            "resolve",
            "-s",
            snapshot.as_str(),
            "-r",
            "crates.io",
            "app",
            "1.0.0",
        ];
        args.extend_from_slice(extra);
        ResolveSubcommand::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_resolve_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let closure = resolve_snapshot(&command(path.clone(), &[])).unwrap();
        expect![[r#"
            serde@1.0.100  1.0  runtime
        "#]]
        .assert_eq(&render_closure(&closure));

        let closure = resolve_snapshot(&command(path, &["--include-optional"])).unwrap();
        expect![[r#"
            serde@1.0.100  1.0  runtime
            log@0.4.20     ^0.4  runtime (optional)
        "#]]
        .assert_eq(&render_closure(&closure));
    }

    #[test]
    fn test_resolve_missing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_snapshot(&command(dir.path().join("missing.json"), &[])).unwrap_err();
        assert!(err.to_string().starts_with("failed to open snapshot"));
    }

    #[test]
    fn test_resolve_reports_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.json");
        std::fs::write(&path, SNAPSHOT).unwrap();

        let err = resolve_snapshot(&command(
            path,
            &["--include-optional", "--max-dependencies", "1"],
        ))
        .unwrap_err();
        expect![[r#"
            failed to resolve app@1.0.0 in crates.io

            Caused by:
                Too many dependencies: 2 exceeds limit of 1"#]]
        .assert_eq(&format!("{err:?}"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_closure(&[]), "");
    }
}
