//! IMAP command tag generator.
//!
//! Tags are used to match commands with their responses.

use crate::types::Tag;

/// Tag generator for IMAP commands.
///
/// Generates sequential tags in the format "A0001", "A0002", etc. The counter
/// starts at 1 and is never reset, so a tag is never reused on a connection.
#[derive(Debug, Clone)]
pub struct TagGenerator {
    counter: u32,
    prefix: String,
}

impl TagGenerator {
    /// Creates a new tag generator with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            counter: 0,
            prefix: prefix.into(),
        }
    }

    /// Generates the next tag.
    ///
    /// # Panics
    ///
    /// Panics if the tag counter would overflow `u32::MAX`. In practice, this
    /// would require 4+ billion tags in a single session, which is unrealistic.
    #[must_use]
    pub fn next(&mut self) -> Tag {
        let Some(n) = self.counter.checked_add(1) else {
            panic!("tag counter overflow: generated {} tags in this session", self.counter);
        };
        self.counter = n;
        Tag::format(&self.prefix, n)
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new("A")
    }
}
