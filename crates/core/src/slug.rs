//! Article slugs and one-time tokens.

use rand::Rng;

/// Length of the random suffix appended to every article slug.
pub const SLUG_SUFFIX_LENGTH: usize = 8;

/// Longest prefix taken from the title before the suffix is appended.
const MAX_SLUG_BASE_LENGTH: usize = 80;

/// Length of one-time tokens sent in activation and reset emails.
pub const TOKEN_LENGTH: usize = 40;

/// Lower-case the title, collapse every run of non-alphanumerics into a
/// single `-`, and trim leading/trailing dashes.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for ch in title.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.chars().count() > MAX_SLUG_BASE_LENGTH {
        slug = slug.chars().take(MAX_SLUG_BASE_LENGTH).collect();
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// Build a unique-enough slug for a new article: `slugify(title)` plus a
/// random lowercase suffix.
pub fn article_slug(title: &str) -> String {
    let suffix: String = random_alphanumeric(SLUG_SUFFIX_LENGTH).to_lowercase();
    let base = slugify(title);
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}

/// Generate a random one-time token for activation / password reset links.
pub fn generate_token() -> String {
    random_alphanumeric(TOKEN_LENGTH)
}

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Hello,   World!! "), "hello-world");
        assert_eq!(slugify("Rust & Axum -- a guide"), "rust-axum-a-guide");
    }

    #[test]
    fn slugify_of_symbols_only_is_empty() {
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_truncates_long_titles() {
        let title = "word ".repeat(40);
        let slug = slugify(&title);
        assert!(slug.len() <= 80);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn article_slug_appends_suffix() {
        let slug = article_slug("My First Post");
        assert!(slug.starts_with("my-first-post-"));
        assert_eq!(slug.len(), "my-first-post-".len() + SLUG_SUFFIX_LENGTH);
    }

    #[test]
    fn article_slugs_differ() {
        assert_ne!(article_slug("same"), article_slug("same"));
    }

    #[test]
    fn token_is_alphanumeric() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
