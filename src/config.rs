//! Matcher configuration.

/// Knobs applied when rules are parsed and texts are split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Drop leading and trailing whitespace from each operand, and ignore
    /// whitespace-only runs between operators.
    pub trim_operands: bool,
    /// Stop splitting at the first NUL byte, as a C string would.
    pub stop_at_nul: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trim_operands: true,
            stop_at_nul: true,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trim_operands(mut self, trim: bool) -> Self {
        self.trim_operands = trim;
        self
    }

    pub fn with_stop_at_nul(mut self, stop: bool) -> Self {
        self.stop_at_nul = stop;
        self
    }
}
