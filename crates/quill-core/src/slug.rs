//! URL slug derivation for post titles and category names.

/// Derive a lowercase, hyphen-separated slug from display text.
///
/// Only ASCII letters, digits, whitespace and hyphens are kept. Each run of
/// whitespace becomes a single hyphen and hyphens are trimmed from both ends.
/// Inputs made only of punctuation produce an empty string.
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();

    let mut slug = String::with_capacity(lowered.len());
    let mut in_separator = false;
    for ch in lowered.chars() {
        if ch.is_whitespace() {
            if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        } else if ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-' {
            slug.push(ch);
            in_separator = false;
        }
        // Anything else, underscores included, is dropped without ending a
        // whitespace run.
    }

    slug.trim_matches('-').to_string()
}
