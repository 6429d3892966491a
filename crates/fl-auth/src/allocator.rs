//! Derives unique human-readable identifiers from free text.
//!
//! Usernames are derived from display names and self-resolve collisions by
//! appending an ascending numeric suffix (`chefraj`, `chefraj1`, ...).
//! Restaurant slugs do the same with a hyphen separator (`karims`,
//! `karims-1`, ...). User-SUPPLIED slugs never pass through derivation:
//! they are checked with [`legal`] and used verbatim, and a collision on
//! one is a rejection, not a renumbering.

use fl_core::SLUG_MAX;
use fl_core::SLUG_MIN;
use fl_core::USERNAME_MAX;

/// Legal alphabet and length limits for a derived identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// Lowercase alphanumeric, 1-20 chars, bare numeric suffix.
    Username,
    /// Lowercase alphanumeric plus hyphen, 3-100 chars, hyphenated suffix.
    Slug,
}

impl Charset {
    fn min(self) -> usize {
        match self {
            Self::Username => 1,
            Self::Slug => SLUG_MIN,
        }
    }
    fn max(self) -> usize {
        match self {
            Self::Username => USERNAME_MAX,
            Self::Slug => SLUG_MAX,
        }
    }
    fn separator(self) -> &'static str {
        match self {
            Self::Username => "",
            Self::Slug => "-",
        }
    }
    /// Stem used when normalization strips the entire input.
    fn fallback(self) -> &'static str {
        match self {
            Self::Username => "creator",
            Self::Slug => "place",
        }
    }
    fn permits(self, c: char) -> bool {
        match self {
            Self::Username => c.is_ascii_lowercase() || c.is_ascii_digit(),
            Self::Slug => c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-',
        }
    }
}

/// Structural validation for user-supplied identifiers.
pub fn legal(candidate: &str, charset: Charset) -> bool {
    candidate.len() >= charset.min()
        && candidate.len() <= charset.max()
        && candidate.chars().all(|c| charset.permits(c))
}

/// Lowercases, strips characters outside the charset's alphabet, collapses
/// whitespace runs and duplicate hyphens (slug only), and truncates to the
/// charset's maximum length. An input with nothing legal in it normalizes
/// to the charset's fallback stem so allocation always has a base.
pub fn normalize(base: &str, charset: Charset) -> String {
    let lowered = base.to_lowercase();
    let mut stem = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        match charset {
            Charset::Username if charset.permits(c) => stem.push(c),
            Charset::Username => {}
            Charset::Slug if charset.permits(c) || c.is_whitespace() => {
                // whitespace runs and hyphen runs both collapse to one hyphen
                match c.is_whitespace() || c == '-' {
                    true if stem.ends_with('-') => {}
                    true => stem.push('-'),
                    false => stem.push(c),
                }
            }
            Charset::Slug => {}
        }
    }
    let stem = stem.trim_matches('-');
    let stem = match stem.is_empty() {
        true => charset.fallback(),
        false => stem,
    };
    match stem.len() > charset.max() {
        true => stem[..charset.max()].trim_end_matches('-').to_string(),
        false => stem.to_string(),
    }
}

/// Infinite candidate stream: the normalized base, then suffixed variants
/// `base1`, `base2`, ... (hyphenated for slugs). The stem is shortened when
/// necessary so no candidate exceeds the charset's maximum length.
pub fn candidates(base: &str, charset: Charset) -> impl Iterator<Item = String> {
    let stem = normalize(base, charset);
    (0usize..).map(move |n| match n {
        0 => stem.clone(),
        n => {
            let suffix = format!("{}{}", charset.separator(), n);
            let keep = charset
                .max()
                .saturating_sub(suffix.len())
                .min(stem.len());
            format!("{}{}", stem[..keep].trim_end_matches('-'), suffix)
        }
    })
}

/// Resolves the first free candidate against a taken-check. The suffix
/// space is unbounded, so this terminates against any finite taken-set.
pub fn allocate<F>(base: &str, charset: Charset, mut taken: F) -> String
where
    F: FnMut(&str) -> bool,
{
    candidates(base, charset)
        .find(|candidate| !taken(candidate))
        .expect("suffix space is unbounded")
}
