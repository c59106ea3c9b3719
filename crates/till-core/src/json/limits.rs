//! Parser limits.
//!
//! The parser is recursive, so nesting depth is bounded explicitly instead of
//! relying on the thread's stack size.

/// Default maximum nesting depth for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Upper bound on any configured depth. Keeps recursion well inside a
/// default thread stack.
pub const MAX_DEPTH_CEILING: usize = 512;

/// Limits applied while parsing JSON text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonLimits {
    max_depth: usize,
}

impl JsonLimits {
    /// `max_depth` above [`MAX_DEPTH_CEILING`] is lowered to the ceiling.
    pub const fn new(max_depth: usize) -> Self {
        let max_depth = if max_depth > MAX_DEPTH_CEILING {
            MAX_DEPTH_CEILING
        } else {
            max_depth
        };
        Self { max_depth }
    }

    /// Maximum number of nested arrays/objects. The top-level container
    /// counts as depth 1.
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for JsonLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}
