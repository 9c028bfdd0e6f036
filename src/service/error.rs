use std::fmt;

/// Stable classification of every failure the service reports.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Request rejected at the boundary, nothing was touched.
    Validation,
    /// Raw transaction could not be decoded, nothing was broadcast.
    Decode,
    /// Gateway rejected the transaction or timed out, the ledger is unchanged.
    Broadcast,
    NotFound,
    /// Write refused because it would break a ledger invariant.
    Conflict,
    NoHeight,
    Store,
    /// Key generation or signing collaborator failed.
    Collaborator,
}

impl ErrorCategory {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Decode => "decode",
            ErrorCategory::Broadcast => "broadcast",
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::NoHeight => "no_height",
            ErrorCategory::Store => "store",
            ErrorCategory::Collaborator => "collaborator",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
