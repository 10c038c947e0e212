//! Pre-release version classification.
//!
//! A version is a pre-release when a hyphen anywhere in it is followed by one
//! of the qualifiers `alpha`, `a`, `beta`, `b`, `milestone`, `m`, `rc`, `cr`
//! or `snapshot` (case-insensitive). The qualifier is a prefix match, so
//! `1.0.0-a1` and `1.0.0-M6` are pre-releases, and so is a trailing qualifier
//! such as `33.0.0-jre-SNAPSHOT`. Qualifiers not introduced by a hyphen
//! (`2.0.0.RC1`) are treated as stable.

use std::sync::OnceLock;

use regex::Regex;

/// Hyphen, then a qualifier token.
const PRE_RELEASE_PATTERN: &str = r"(?i)-(?:alpha|a|beta|b|milestone|m|rc|cr|snapshot)";

fn pre_release_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(PRE_RELEASE_PATTERN).expect("valid pre-release pattern"))
}

/// Returns `true` if the version carries a pre-release qualifier.
#[must_use]
pub fn is_pre_release(version: &str) -> bool {
    pre_release_regex().is_match(version)
}
