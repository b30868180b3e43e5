//! Import warnings
//!
//! Nodes the walker cannot map are skipped or truncated rather than failing
//! the import; each case is reported as a warning.

use serde::{Deserialize, Serialize};

/// Warning severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    /// Nothing was lost; the node carried no data.
    Info,
    /// Part of the document was ignored.
    Warning,
}

impl std::fmt::Display for WarningSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A node the walker skipped or only partly imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportWarning {
    /// Slash-separated names from the root collection to the node.
    pub path: String,
    /// Human-readable description of the issue
    pub message: String,
    /// Severity level
    pub severity: WarningSeverity,
}

impl ImportWarning {
    /// A node with neither a request nor children.
    pub fn empty_node(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: "item has no request and no children; skipped".to_string(),
            severity: WarningSeverity::Info,
        }
    }

    /// A request node that also lists children.
    pub fn children_under_request(path: impl Into<String>, count: usize) -> Self {
        Self {
            path: path.into(),
            message: format!("request item has {count} child item(s); children ignored"),
            severity: WarningSeverity::Warning,
        }
    }
}

impl std::fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.path, self.message)
    }
}

/// Aggregate statistics from warnings
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WarningStats {
    /// Count of informational warnings
    pub info_count: usize,
    /// Count of warning-level warnings
    pub warning_count: usize,
}

impl WarningStats {
    /// Calculate stats from a list of warnings
    #[must_use]
    pub fn from_warnings(warnings: &[ImportWarning]) -> Self {
        let mut stats = Self::default();
        for w in warnings {
            match w.severity {
                WarningSeverity::Info => stats.info_count += 1,
                WarningSeverity::Warning => stats.warning_count += 1,
            }
        }
        stats
    }

    /// Total count of all warnings
    #[must_use]
    pub const fn total(&self) -> usize {
        self.info_count + self.warning_count
    }
}
