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

//! Range matching, the one part of resolution that depends on the syntax an
//! ecosystem uses for its requirements.

use closure_model::{
    requirement,
    version::{as_comparator, coerce, PartialVersion},
};
use semver::{Comparator, Op, VersionReq};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SatisfierError {
    #[error("Version `{0}` cannot be compared against ranges")]
    InvalidVersion(String),
    #[error("Invalid requirement `{requirement}`: {reason}")]
    InvalidRequirement { requirement: String, reason: String },
}

/// Answers whether a version satisfies a requirement in a given ecosystem.
pub trait ConstraintSatisfier {
    fn satisfies(
        &self,
        version: &str,
        requirement: &str,
        ecosystem: &str,
    ) -> Result<bool, SatisfierError>;
}

impl<S> ConstraintSatisfier for &S
where
    S: ConstraintSatisfier + ?Sized,
{
    fn satisfies(
        &self,
        version: &str,
        requirement: &str,
        ecosystem: &str,
    ) -> Result<bool, SatisfierError> {
        (**self).satisfies(version, requirement, ecosystem)
    }
}

/// Semver-based satisfier understanding the range dialects most registries
/// share:
///
/// - `||` separates alternatives,
/// - comparators inside one alternative are separated by commas or spaces,
/// - `a - b` is an inclusive hyphen range,
/// - `~>` is the rubygems pessimistic operator,
/// - a bare version is exact, except for cargo where it means `^`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SemverSatisfier;

impl ConstraintSatisfier for SemverSatisfier {
    fn satisfies(
        &self,
        version: &str,
        requirement: &str,
        ecosystem: &str,
    ) -> Result<bool, SatisfierError> {
        let parsed =
            coerce(version).ok_or_else(|| SatisfierError::InvalidVersion(version.to_owned()))?;
        let bare_op = bare_operator(ecosystem);

        for alternative in requirement.split("||") {
            let req = parse_alternative(alternative.trim(), bare_op).map_err(|reason| {
                SatisfierError::InvalidRequirement {
                    requirement: requirement.to_owned(),
                    reason,
                }
            })?;
            if req.matches(&parsed) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn bare_operator(ecosystem: &str) -> Op {
    if ecosystem.eq_ignore_ascii_case("cargo") {
        Op::Caret
    } else {
        Op::Exact
    }
}

fn parse_partial(text: &str) -> Result<PartialVersion, String> {
    PartialVersion::parse(text).ok_or_else(|| format!("`{}` is not a version", text))
}

/// Parses one `||`-free alternative into a semver requirement.
fn parse_alternative(alternative: &str, bare_op: Op) -> Result<VersionReq, String> {
    let mut comparators = Vec::new();

    if let Some((low, high)) = alternative.split_once(" - ") {
        comparators.push(parse_partial(low)?.as_comparator(Op::GreaterEq));
        comparators.push(parse_partial(high)?.as_comparator(Op::LessEq));
        return Ok(VersionReq { comparators });
    }

    let normalized = requirement::normalize(&alternative.replace(',', " "));
    for token in normalized.split_whitespace() {
        let split = token
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '!' | '~' | '^'))
            .unwrap_or(token.len());
        let (op, text) = token.split_at(split);
        if requirement::is_wildcard(text) {
            continue;
        }
        let version = parse_partial(text)?;
        match op {
            "~>" => comparators.extend(pessimistic(&version)),
            "" => comparators.push(version.as_comparator(bare_op)),
            "=" | "==" => comparators.push(version.as_comparator(Op::Exact)),
            ">" => comparators.push(version.as_comparator(Op::Greater)),
            ">=" => comparators.push(version.as_comparator(Op::GreaterEq)),
            "<" => comparators.push(version.as_comparator(Op::Less)),
            "<=" => comparators.push(version.as_comparator(Op::LessEq)),
            "~" => comparators.push(version.as_comparator(Op::Tilde)),
            "^" => comparators.push(version.as_comparator(Op::Caret)),
            other => return Err(format!("unsupported operator `{}`", other)),
        }
    }

    if comparators.is_empty() {
        return Ok(VersionReq::STAR);
    }
    Ok(VersionReq { comparators })
}

/// `~> 1` is `>=1.0.0, <2.0.0`, `~> 1.2` is `>=1.2.0, <2.0.0` and
/// `~> 1.2.3` is `>=1.2.3, <1.3.0`.
fn pessimistic(version: &PartialVersion) -> [Comparator; 2] {
    let lower = as_comparator(version.to_version(), Op::GreaterEq);
    let upper = match (version.minor, version.patch) {
        (Some(minor), Some(_)) => semver::Version::new(version.major, minor + 1, 0),
        _ => semver::Version::new(version.major + 1, 0, 0),
    };
    [lower, as_comparator(upper, Op::Less)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sat(version: &str, req: &str) -> bool {
        SemverSatisfier.satisfies(version, req, "npm").unwrap()
    }

    #[test]
    fn test_bare_version_is_exact() {
        assert!(sat("1.0.0", "1.0.0"));
        assert!(!sat("1.0.1", "1.0.0"));
        assert!(sat("1.4.0", "1"));
        assert!(!sat("2.0.0", "1.x"));

        let cargo = |v: &str, r: &str| SemverSatisfier.satisfies(v, r, "cargo").unwrap();
        assert!(cargo("1.4.0", "1.0.0"));
        assert!(!cargo("2.0.0", "1.0.0"));
    }

    #[test]
    fn test_comparators() {
        assert!(sat("1.5.0", ">=1.0.0 <2.0.0"));
        assert!(sat("1.5.0", ">= 1.0.0, < 2.0.0"));
        assert!(!sat("2.0.0", ">=1.0.0 <2.0.0"));
        assert!(sat("1.2.9", "~1.2.3"));
        assert!(!sat("1.3.0", "~1.2.3"));
        assert!(sat("1.9.0", "^1.2.3"));
        assert!(sat("v1.2.3", "=1.2.3"));
    }

    #[test]
    fn test_alternatives_and_ranges() {
        assert!(sat("2.1.0", "^1.0.0 || ^2.0.0"));
        assert!(!sat("3.0.0", "^1.0.0 || ^2.0.0"));
        assert!(sat("1.5.0", "1.0.0 - 2.0.0"));
        assert!(sat("2.0.0", "1.0.0 - 2.0.0"));
        assert!(!sat("2.0.1", "1.0.0 - 2.0.0"));
        assert!(sat("0.0.1", "*"));
    }

    #[test]
    fn test_pessimistic() {
        assert!(sat("4.9.0", "~> 4.1"));
        assert!(!sat("5.0.0", "~> 4.1"));
        assert!(sat("4.1.9", "~> 4.1.2"));
        assert!(!sat("4.2.0", "~> 4.1.2"));
        assert!(sat("1.7.0", "~> 1"));
    }

    #[test]
    fn test_long_versions_are_truncated() {
        assert!(sat("8.0.2", ">= 5.2.4.5"));
        assert!(sat("8.0.2.1", ">= 5.2.4.5"));
    }

    #[test]
    fn test_failures() {
        assert!(matches!(
            SemverSatisfier.satisfies("8.0.0.rc1", ">=1", "rubygems"),
            Err(SatisfierError::InvalidVersion(_))
        ));
        assert!(matches!(
            SemverSatisfier.satisfies("1.0.0", "!=1.0.1", "npm"),
            Err(SatisfierError::InvalidRequirement { .. })
        ));
        assert!(matches!(
            SemverSatisfier.satisfies("1.0.0", "main", "go"),
            Err(SatisfierError::InvalidRequirement { .. })
        ));
    }
}
