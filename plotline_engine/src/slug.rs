/// Fallback used when a title has no characters usable in a file name.
pub const FALLBACK_SLUG: &str = "story";

/// Normalize a story title into a filesystem-safe slug.
///
/// ASCII letters and digits are lowercased. Runs of anything else become a single dash,
/// `-` and `_` are kept, and leading or trailing separators are dropped.
pub fn sanitize_slug(raw: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else if ch == '-' || ch == '_' {
            if !slug.is_empty() {
                slug.push(ch);
            }
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    let trimmed = slug.trim_matches(&['-', '_'][..]);
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}
