//! Slug derivation and validation for post URLs.
//!
//! A slug is the title with every run of whitespace replaced by a single
//! hyphen, lower-cased, with characters that would break a URL path segment
//! removed. Non-ASCII letters are kept.

/// Characters that are dropped because they terminate or escape a path
/// segment.
const RESERVED: [char; 5] = ['/', '?', '#', '%', '\\'];

/// Derive the base slug for `title`. The result may be empty when the title
/// consists only of reserved characters.
///
/// # Examples
/// ```
/// use postnest::domain::slug::slugify_title;
///
/// assert_eq!(slugify_title("Hello World"), "hello-world");
/// assert_eq!(slugify_title("  Tabs\tand   spaces "), "tabs-and-spaces");
/// ```
pub fn slugify_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|ch| !RESERVED.contains(ch))
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Disambiguate `base` for the `attempt`-th collision. Attempt `1` is the
/// base itself; later attempts append `-2`, `-3`, and so on.
pub fn with_suffix(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_owned()
    } else {
        format!("{base}-{attempt}")
    }
}

/// Return `true` when `value` could have been produced by [`slugify_title`]
/// (optionally followed by a suffix).
pub(crate) fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.trim() == value
        && !value.chars().any(|ch| {
            ch.is_whitespace() || ch.is_uppercase() || RESERVED.contains(&ch)
        })
}
