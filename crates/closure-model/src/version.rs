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

//! Version utilities

use semver::{Comparator, Op, Prerelease, Version};

/// Parses a version number the way registries publish them: surrounding
/// whitespace, a leading `=` and a leading `v` are ignored. Returns `None` if
/// the remainder is not a complete semantic version.
pub fn clean(number: &str) -> Option<Version> {
    let trimmed = number.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed).trim_start();
    let trimmed = trimmed
        .strip_prefix(|c: char| c == 'v' || c == 'V')
        .unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}

/// The cleaned form of a version number, or the number itself when it is not
/// semver-shaped.
pub fn clean_number(number: &str) -> String {
    match clean(number) {
        Some(version) => version.to_string(),
        None => number.to_owned(),
    }
}

/// Like [`clean`], but also accepts numbers with missing or extra numeric
/// components (`1.2`, `5.2.4.5`), padding or truncating them to three.
pub fn coerce(number: &str) -> Option<Version> {
    clean(number).or_else(|| PartialVersion::parse(number).map(|v| v.to_version()))
}

/// A possibly incomplete version as written inside a requirement, such as
/// `1`, `1.2`, `1.x` or `1.2.3-beta.1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialVersion {
    pub major: u64,
    pub minor: Option<u64>,
    pub patch: Option<u64>,
    pub pre: Prerelease,
}

impl PartialVersion {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text
            .strip_prefix(|c: char| c == 'v' || c == 'V')
            .unwrap_or(text);
        // Build metadata never takes part in matching.
        let text = text.split_once('+').map_or(text, |(core, _)| core);
        let (core, pre) = match text.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (text, None),
        };

        let mut numbers = Vec::with_capacity(3);
        for part in core.split('.') {
            if matches!(part, "x" | "X" | "*") {
                break;
            }
            let n = part.parse::<u64>().ok()?;
            if numbers.len() < 3 {
                numbers.push(n);
            }
        }

        let major = *numbers.first()?;
        let minor = numbers.get(1).copied();
        let patch = numbers.get(2).copied();
        let pre = match pre {
            Some(pre) if patch.is_some() => Prerelease::new(pre).ok()?,
            Some(_) => return None,
            None => Prerelease::EMPTY,
        };
        Some(PartialVersion {
            major,
            minor,
            patch,
            pre,
        })
    }

    /// Fills the missing components with zeros.
    pub fn to_version(&self) -> Version {
        Version {
            major: self.major,
            minor: self.minor.unwrap_or(0),
            patch: self.patch.unwrap_or(0),
            pre: self.pre.clone(),
            build: semver::BuildMetadata::EMPTY,
        }
    }

    /// Converts the partial version into a semver comparator
    pub fn as_comparator(&self, op: Op) -> Comparator {
        Comparator {
            op,
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            pre: self.pre.clone(),
        }
    }
}

/// Converts a version into a semver comparator
pub fn as_comparator(version: Version, op: Op) -> Comparator {
    Comparator {
        op,
        major: version.major,
        minor: Some(version.minor),
        patch: Some(version.patch),
        pre: version.pre,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean() {
        assert_eq!(clean_number("v1.2.3"), "1.2.3");
        assert_eq!(clean_number(" =1.2.3 "), "1.2.3");
        assert_eq!(clean_number("= v2.0.0-rc.1"), "2.0.0-rc.1");
        assert_eq!(clean_number("8.0.2.1"), "8.0.2.1");
        assert_eq!(clean_number("1.0"), "1.0");
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("5.2.4.5").unwrap().to_string(), "5.2.4");
        assert_eq!(coerce("1.2").unwrap().to_string(), "1.2.0");
        assert_eq!(coerce("v3").unwrap().to_string(), "3.0.0");
        assert!(coerce("8.0.0.rc1").is_none());
        assert!(coerce("latest").is_none());
    }

    #[test]
    fn test_partial_version() {
        let v = PartialVersion::parse("1.x").unwrap();
        assert_eq!((v.major, v.minor, v.patch), (1, None, None));

        let v = PartialVersion::parse("1.2.3-beta.1+build.5").unwrap();
        assert_eq!(v.to_version().to_string(), "1.2.3-beta.1");

        // A prerelease tag needs a full version in front of it.
        assert!(PartialVersion::parse("1.2-beta").is_none());
        assert!(PartialVersion::parse("").is_none());
    }

    #[test]
    fn test_as_comparator() {
        let v = PartialVersion::parse("1.2").unwrap();
        assert_eq!(v.as_comparator(Op::Tilde).to_string(), "~1.2");
        let c = as_comparator(Version::new(2, 0, 0), Op::Less);
        assert_eq!(c.to_string(), "<2.0.0");
    }
}
