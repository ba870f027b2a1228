use std::fmt;

use crate::progression::Phase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    /// Rows of unequal length, no rows at all, or an unknown marker.
    Malformed { level: String, reason: String },
    /// The requested level index is past the end of the pack. Not a failure:
    /// progression treats it as the cue for victory.
    LevelsExhausted { requested: usize, count: usize },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { level, reason } => {
                write!(f, "Level '{level}' is malformed: {reason}")
            }
            Self::LevelsExhausted { requested, count } => {
                write!(f, "Level index {requested} is past the last level ({count} levels)")
            }
        }
    }
}

impl std::error::Error for LevelError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressionError {
    InvalidTransition { from: Phase, to: Phase },
}

impl fmt::Display for ProgressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid progression transition {from:?} -> {to:?}")
            }
        }
    }
}

impl std::error::Error for ProgressionError {}
