//! Product slugs.
//!
//! Slugs are derived from product names with [`generate_slug`] and checked
//! for uniqueness against the backend through [`SlugClient`].

mod client;

pub use client::SlugClient;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Characters that never survive into a slug.
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s-]").expect("Invalid regex"));

/// Runs of separators collapsed to a single hyphen.
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("Invalid regex"));

/// Errors from the slug availability check.
#[derive(Debug, Error)]
pub enum SlugError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("backend responded with status {status}")]
    Backend { status: u16 },
}

/// Whether a slug is free to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugAvailability {
    Available,
    Taken,
    /// Nothing to check yet.
    Unknown,
}

impl SlugAvailability {
    #[must_use]
    pub const fn from_exists(exists: bool) -> Self {
        if exists { Self::Taken } else { Self::Available }
    }
}

/// Derive a URL slug from a product name.
///
/// Lowercases, drops anything but ASCII word characters, whitespace and
/// hyphens, collapses separator runs to one hyphen and trims hyphens from
/// both ends.
#[must_use]
pub fn generate_slug(name: &str) -> String {
    let lowered = name.to_lowercase();
    let cleaned = DISALLOWED_RE.replace_all(lowered.trim(), "");
    SEPARATOR_RE
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_slug_basic() {
        assert_eq!(generate_slug("Naruto Hoodie"), "naruto-hoodie");
    }

    #[test]
    fn test_generate_slug_strips_punctuation() {
        assert_eq!(generate_slug("  One Piece: Straw Hat!! "), "one-piece-straw-hat");
        assert_eq!(generate_slug("Café Ghibli"), "caf-ghibli");
    }

    #[test]
    fn test_generate_slug_collapses_separators() {
        assert_eq!(generate_slug("Attack__on -- Titan"), "attack-on-titan");
        assert_eq!(generate_slug("--Edge--"), "edge");
    }

    #[test]
    fn test_generate_slug_empty() {
        assert_eq!(generate_slug("!!!"), "");
        assert_eq!(generate_slug(""), "");
    }

    #[test]
    fn test_availability_from_exists() {
        assert_eq!(SlugAvailability::from_exists(true), SlugAvailability::Taken);
        assert_eq!(SlugAvailability::from_exists(false), SlugAvailability::Available);
    }
}
