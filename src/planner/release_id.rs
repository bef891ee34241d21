//! Dotted release id matching.

/// A parsed view of a release id such as `4.3` or `2.1.7.1`.
///
/// Matching is dotted-component aware: the prefix `2.0` matches `2.0` and
/// `2.0.5` but not `2.05`.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseId<'a> {
    raw: &'a str,
}

impl<'a> ReleaseId<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self { raw }
    }

    pub fn as_str(&self) -> &str {
        self.raw
    }

    /// The numeric major version, if the id starts with one.
    pub fn major(&self) -> Option<u32> {
        self.raw
            .split('.')
            .next()
            .and_then(|first| first.parse::<u32>().ok())
    }

    /// The major version, restricted to the range the planner has rules for.
    /// Future or unparsable majors return `None` and take the fallback arms.
    pub fn known_major(&self) -> Option<u32> {
        self.major().filter(|major| (1..=8).contains(major))
    }

    /// Exact match.
    pub fn is(&self, exact: &str) -> bool {
        self.raw == exact
    }

    /// Dotted-prefix match: `prefix` must be the whole id or be followed by
    /// a dot.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        match self.raw.strip_prefix(prefix) {
            Some("") => true,
            Some(rest) => rest.starts_with('.'),
            None => false,
        }
    }
}
