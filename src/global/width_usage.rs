
use derive_more::Display;

/// What the minimum width of a node is used for by width inference.
///
/// Passes set the mode they need before running; there is no enforced order
/// between the values.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum WidthMinUsage {
    /// Widths are only checked for lint warnings
    #[display(fmt = "LintWidth")]
    LintWidth,
    /// Widths must match operand widths exactly
    #[display(fmt = "MatchesWidth")]
    MatchesWidth,
    /// Implicit widening and truncation as the source language defines it
    #[display(fmt = "VerilogWidth")]
    VerilogWidth,
}

impl Default for WidthMinUsage {
    fn default() -> Self {
        WidthMinUsage::LintWidth
    }
}

impl WidthMinUsage {
    pub fn is_lint(self) -> bool {
        self == WidthMinUsage::LintWidth
    }
}
