//! Validation status and trigger policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of the last validation run of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidateStatus {
    Valid,
    Invalid,
    Validating,
}

impl ValidateStatus {
    /// Every status, in display order.
    pub const ALL: [ValidateStatus; 3] = [
        ValidateStatus::Valid,
        ValidateStatus::Invalid,
        ValidateStatus::Validating,
    ];

    /// Name of the icon shown next to an item in this status.
    pub fn icon(self) -> &'static str {
        match self {
            ValidateStatus::Invalid => "close-circle-filled",
            ValidateStatus::Validating => "loading",
            ValidateStatus::Valid => "check-circle-filled",
        }
    }

    /// Lowercase name, as used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            ValidateStatus::Valid => "valid",
            ValidateStatus::Invalid => "invalid",
            ValidateStatus::Validating => "validating",
        }
    }
}

impl fmt::Display for ValidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which interaction makes a control's validation status visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Visible once the value has been changed.
    #[default]
    Change,
    /// Visible once the input has lost focus.
    Blur,
}
