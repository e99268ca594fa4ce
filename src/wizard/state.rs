//! Submission lifecycle state machine.

use serde::{Deserialize, Serialize};

/// Phases of one submission attempt.
///
/// Idle → Validating → Submitting → Succeeded | Failed → Idle. A failed
/// local validation goes straight back to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: SubmissionPhase) -> bool {
        use SubmissionPhase::*;
        matches!(
            (self, target),
            (Idle, Validating)
                | (Validating, Idle)
                | (Validating, Submitting)
                | (Submitting, Succeeded)
                | (Submitting, Failed)
                | (Succeeded, Idle)
                | (Failed, Idle)
        )
    }

    /// Whether a request is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    /// Whether a new attempt may start from here. Settled outcomes count as
    /// idle once acknowledged.
    pub fn accepts_submit(&self) -> bool {
        matches!(self, Self::Idle | Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for SubmissionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Submitting => "submitting",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Submission phase plus the number of requests issued this session.
#[derive(Debug, Clone, Default)]
pub struct SubmissionState {
    pub phase: SubmissionPhase,
    pub requests_sent: u32,
}

impl SubmissionState {
    /// Move to `target`, rejecting transitions the machine does not allow.
    pub fn transition(&mut self, target: SubmissionPhase) -> Result<SubmissionPhase, String> {
        if !self.phase.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.phase, target));
        }
        if target == SubmissionPhase::Submitting {
            self.requests_sent += 1;
        }
        self.phase = target;
        Ok(target)
    }
}
