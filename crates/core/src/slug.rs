//! URL-safe movie identifiers.
//!
//! Slugs are derived from the display title plus release year so that
//! remakes sharing a title (e.g. "Dune" 1984 and 2021) stay distinct.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\-]").expect("valid regex"));
static REPEATED_DASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-{2,}").expect("valid regex"));

/// Lower-case, turn whitespace runs into a single dash, drop anything that
/// is not `[a-z0-9-]`, then collapse repeated dashes.
///
/// # Examples
///
/// ```
/// use cinematoday_core::slug::slugify;
///
/// assert_eq!(slugify("  The Matrix  "), "the-matrix");
/// assert_eq!(slugify("Mission: Impossible - Fallout"), "mission-impossible-fallout");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(lowered.trim(), "-");
    let cleaned = DISALLOWED_RE.replace_all(&dashed, "");
    REPEATED_DASH_RE.replace_all(&cleaned, "-").into_owned()
}

/// Extract the year from a catalog release date (`YYYY-MM-DD`).
///
/// Returns `None` for an empty date.
pub fn release_year(release_date: &str) -> Option<&str> {
    release_date
        .split('-')
        .next()
        .filter(|year| !year.is_empty())
}

/// Slug candidate for a catalog title: `slugify("{title}-{year}")`, or just
/// the title when the release date is unknown.
pub fn candidate_slug(title: &str, release_date: Option<&str>) -> String {
    match release_date.and_then(release_year) {
        Some(year) => slugify(&format!("{title}-{year}")),
        None => slugify(title),
    }
}

/// Slug used when the candidate already belongs to another movie.
pub fn disambiguated_slug(candidate: &str, external_id: &str) -> String {
    format!("{candidate}-{external_id}")
}
