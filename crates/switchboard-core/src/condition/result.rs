//! Tri-state evaluation result

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of evaluating a field or a condition set.
///
/// `Abstain` means the condition had no opinion for this context. It must
/// survive until the final combination step and never be read as `Inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationResult {
    Active,
    Inactive,
    Abstain,
}

impl EvaluationResult {
    /// `Some(bool)` for a vote, `None` for an abstention
    pub fn as_bool(self) -> Option<bool> {
        match self {
            EvaluationResult::Active => Some(true),
            EvaluationResult::Inactive => Some(false),
            EvaluationResult::Abstain => None,
        }
    }

    pub fn is_active(self) -> bool {
        self == EvaluationResult::Active
    }

    pub fn is_abstain(self) -> bool {
        self == EvaluationResult::Abstain
    }

    /// OR with abstention: any active wins, then any inactive
    pub fn or(self, other: EvaluationResult) -> EvaluationResult {
        use EvaluationResult::*;
        match (self, other) {
            (Active, _) | (_, Active) => Active,
            (Inactive, _) | (_, Inactive) => Inactive,
            (Abstain, Abstain) => Abstain,
        }
    }
}

impl From<bool> for EvaluationResult {
    fn from(value: bool) -> Self {
        if value {
            EvaluationResult::Active
        } else {
            EvaluationResult::Inactive
        }
    }
}

impl From<Option<bool>> for EvaluationResult {
    fn from(value: Option<bool>) -> Self {
        value.map_or(EvaluationResult::Abstain, EvaluationResult::from)
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationResult::Active => write!(f, "active"),
            EvaluationResult::Inactive => write!(f, "inactive"),
            EvaluationResult::Abstain => write!(f, "abstain"),
        }
    }
}
