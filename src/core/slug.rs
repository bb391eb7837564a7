//! Slug normalization.
//!
//! Maps human-entered names to filesystem- and reference-safe identifiers.

/// Convert text to a slug: lowercase ASCII letters, digits and single hyphens.
///
/// Every character outside `[a-z0-9-]` becomes a hyphen, runs of hyphens
/// collapse to one, and leading/trailing hyphens are stripped. The mapping is
/// idempotent: `slugify(&slugify(x)) == slugify(x)`.
///
/// # Examples
///
/// ```
/// use codex_accounts::core::slug::slugify;
///
/// assert_eq!(slugify("Work Account"), "work-account");
/// assert_eq!(slugify("  --Prod__Key!! "), "prod-key");
/// ```
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_hyphen = false;

    for ch in text.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }

    out.trim_matches('-').to_string()
}
