//! Parser configuration.
//!
//! The defaults reproduce the reference grammar exactly, including its
//! acceptance of a leading `+` on numbers. [`ParseOptions::strict`] gives a
//! standards-conforming parser that also bounds nesting depth.

/// Nesting depth used by [`ParseOptions::strict`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What to do when an object literal repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// The last occurrence's value replaces earlier ones.
    #[default]
    LastWins,
    /// Later occurrences are ignored.
    FirstWins,
    /// The document is rejected.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Accept `+1` as a number. Standard JSON only allows `-`.
    pub allow_leading_plus: bool,
    pub duplicate_keys: DuplicateKeys,
    /// Maximum number of nested arrays/objects, or `None` for no limit.
    pub max_depth: Option<usize>,
}

impl ParseOptions {
    /// The reference grammar: leading `+` allowed, last key wins, no depth limit.
    pub const fn lenient() -> Self {
        Self {
            allow_leading_plus: true,
            duplicate_keys: DuplicateKeys::LastWins,
            max_depth: None,
        }
    }

    /// Standard JSON numbers and a bounded nesting depth.
    pub const fn strict() -> Self {
        Self {
            allow_leading_plus: false,
            duplicate_keys: DuplicateKeys::LastWins,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }

    pub const fn with_leading_plus(mut self, allow: bool) -> Self {
        self.allow_leading_plus = allow;
        self
    }

    pub const fn with_duplicate_keys(mut self, policy: DuplicateKeys) -> Self {
        self.duplicate_keys = policy;
        self
    }

    pub const fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::lenient()
    }
}
