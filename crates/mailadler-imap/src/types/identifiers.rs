//! IMAP identifier types.

/// Command tag for matching requests with responses.
///
/// Tags are the prefix followed by a zero-padded four digit counter, for
/// example `A0001`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Creates a new tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Formats the tag for counter value `n`.
    #[must_use]
    pub fn format(prefix: &str, n: u32) -> Self {
        Self(format!("{prefix}{n:04}"))
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the first space-separated token of `line` is this tag.
    #[must_use]
    pub fn matches_line(&self, line: &str) -> bool {
        line.split(' ').next() == Some(self.as_str())
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
