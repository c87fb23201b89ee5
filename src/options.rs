/// Default cap on the number of `=+` links in one tag chain.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Knobs for the tag parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Capture everything after `=` verbatim instead of parsing a value.
    pub raw_values: bool,
    /// Maximum number of nested tag values (`a=+b=+c` has depth 2).
    pub max_depth: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        ParseOptions {
            raw_values: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn raw_values(mut self, raw_values: bool) -> Self {
        self.raw_values = raw_values;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::new()
    }
}
