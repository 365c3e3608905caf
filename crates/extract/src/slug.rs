// ABOUTME: Slug generation for boon names and per-source slug uniqueness.
// ABOUTME: slugify is pure; SlugAllocator appends numeric suffixes for repeated names.

use std::collections::HashMap;

/// Slug used when a name contains no alphanumeric characters at all.
pub const FALLBACK_SLUG: &str = "unknown";

/// Derives a lowercase, underscore-separated identifier from a display name.
///
/// Apostrophes are removed outright so "Hunter's" becomes "hunters", every
/// other run of non-alphanumeric characters collapses into one underscore,
/// and leading/trailing underscores are trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Returns true if `s` satisfies the slug shape invariants.
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('_')
        && !s.ends_with('_')
        && !s.contains("__")
        && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Hands out slugs that are unique within one source.
///
/// The first occurrence of a name keeps its plain slug; later ones get
/// `_2`, `_3`, ... in the order they are allocated.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    seen: HashMap<String, usize>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the slug for `name`, suffixing it if already taken.
    pub fn allocate(&mut self, name: &str) -> String {
        let base = slugify(name);
        let mut n = *self.seen.get(&base).unwrap_or(&0);
        loop {
            n += 1;
            let candidate = if n == 1 {
                base.clone()
            } else {
                format!("{}_{}", base, n)
            };
            // A suffixed slug may itself collide with a literal name like "x 2".
            if n == 1 || !self.seen.contains_key(&candidate) {
                self.seen.insert(base.clone(), n);
                if n > 1 {
                    self.seen.insert(candidate.clone(), 1);
                }
                return candidate;
            }
        }
    }
}
