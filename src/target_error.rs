use std::{error, fmt};

/// Reasons a target is dropped from one cutlen iteration.  These never abort
/// the sweep.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetError {
    InsufficientFlankingData { found: usize, needed: usize },
    EmptyMaskedRegion,
    ModelFit(String),
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFlankingData { found, needed } => write!(
                f,
                "insufficient flanking data ({} points, at least {} needed)",
                found, needed
            ),
            Self::EmptyMaskedRegion => write!(f, "no depth entries in aligned region"),
            Self::ModelFit(s) => write!(f, "model fit failed: {}", s),
        }
    }
}

impl error::Error for TargetError {}
