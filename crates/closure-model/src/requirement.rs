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

//! Canonical form of requirement strings.
//!
//! Requirement strings come straight from package manifests, so the same
//! range shows up as `>= 1.0`, `>=1.0` or ` >=1.0 `. Matching is memoized on
//! the normalized form.

/// Characters that make up a comparison operator (`>=`, `~>`, `^`, ...).
fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!' | '~' | '^')
}

/// Normalizes a raw requirement string:
///
/// - surrounding whitespace is removed and inner runs collapse to one space,
/// - an operator separated from its version is joined to it (`>= 1` becomes `>=1`),
/// - no whitespace is kept in front of a comma.
pub fn normalize(requirement: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut pending_operator: Option<String> = None;

    for token in requirement.split_whitespace() {
        if token.chars().all(is_operator_char) {
            // A dangling operator binds to whatever follows it.
            let op = pending_operator.get_or_insert_with(String::new);
            op.push_str(token);
            continue;
        }
        match pending_operator.take() {
            Some(op) => tokens.push(op + token),
            None => tokens.push(token.to_owned()),
        }
    }
    if let Some(op) = pending_operator {
        tokens.push(op);
    }

    tokens.join(" ").replace(" ,", ",")
}

/// Whether a (normalized) requirement accepts every version.
pub fn is_wildcard(requirement: &str) -> bool {
    matches!(requirement.trim(), "" | "*" | "x" | "X" | "latest")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(">= 5.2.4.5"), ">=5.2.4.5");
        assert_eq!(normalize("  ^1.2.3  "), "^1.2.3");
        assert_eq!(normalize(">= 1.0 ,  < 2.0"), ">=1.0, <2.0");
        assert_eq!(normalize(">=1.0.0   <2.0.0"), ">=1.0.0 <2.0.0");
        assert_eq!(normalize("1.0.0 - 2.0.0"), "1.0.0 - 2.0.0");
        assert_eq!(normalize("~> 4.1"), "~>4.1");
        assert_eq!(normalize("^1 ||  ^2"), "^1 || ^2");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_is_wildcard() {
        assert!(is_wildcard(""));
        assert!(is_wildcard("*"));
        assert!(is_wildcard(" latest "));
        assert!(!is_wildcard("1.x"));
        assert!(!is_wildcard(">=0.0.0"));
    }
}
