//! Run-scoped diagnostics log.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The pipeline stage a diagnostic was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading input files.
    Load,
    /// Selecting the eligible population.
    Eligibility,
    /// Building the rate and working-days maps.
    Lookup,
    /// Computing per-employee payouts.
    Payout,
}

/// One recoverable problem observed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stage that raised it.
    pub stage: Stage,
    /// What it is about (a source name, an identifier).
    pub subject: String,
    /// Human-readable description.
    pub message: String,
}

/// Accumulates diagnostics so they can be surfaced at the end of the run
/// instead of interrupting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and emits it as a warning event.
    pub fn record(&mut self, stage: Stage, subject: impl Into<String>, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            stage,
            subject: subject.into(),
            message: message.into(),
        };
        warn!(
            stage = ?diagnostic.stage,
            subject = %diagnostic.subject,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    /// All diagnostics in the order they were recorded.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Appends every entry of another log.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(Stage::Load, "ativos", "file not found");
        diagnostics.record(Stage::Lookup, "base_sindicato", "using fallback rates");

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.entries()[0].subject, "ativos");
        assert_eq!(diagnostics.entries()[1].stage, Stage::Lookup);
    }

    #[test]
    fn test_extend_merges_logs() {
        let mut a = Diagnostics::new();
        a.record(Stage::Load, "a", "x");
        let mut b = Diagnostics::new();
        b.record(Stage::Payout, "b", "y");
        a.extend(b);
        assert_eq!(a.len(), 2);
    }
}
