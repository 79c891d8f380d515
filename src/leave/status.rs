use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::error::AppError;

/// Where a leave application sits in its review.
///
/// The string forms are what the `status` column stores.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum LeaveStatus {
    #[default]
    Submitted,
    Received,
    #[serde(rename = "Awaiting_Documentation")]
    #[strum(serialize = "Awaiting_Documentation")]
    AwaitingDocumentation,
    #[serde(rename = "Ready_for_Approval")]
    #[strum(serialize = "Ready_for_Approval")]
    ReadyForApproval,
    Approved,
    Rejected,
    Canceled,
}

impl LeaveStatus {
    /// Human readable label for list views.
    pub const fn label(self) -> &'static str {
        match self {
            LeaveStatus::Submitted => "Submitted",
            LeaveStatus::Received => "HR Received",
            LeaveStatus::AwaitingDocumentation => "Awaiting Employee Documentation",
            LeaveStatus::ReadyForApproval => "Ready for Director Approval",
            LeaveStatus::Approved => "Approved",
            LeaveStatus::Rejected => "Rejected",
            LeaveStatus::Canceled => "Canceled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            LeaveStatus::Approved | LeaveStatus::Rejected | LeaveStatus::Canceled
        )
    }

    /// States reachable in one step.
    pub const fn next_states(self) -> &'static [LeaveStatus] {
        use LeaveStatus::*;
        match self {
            Submitted => &[Received, Canceled],
            Received => &[AwaitingDocumentation, ReadyForApproval, Canceled],
            AwaitingDocumentation => &[ReadyForApproval, Canceled],
            ReadyForApproval => &[Approved, Rejected, Canceled],
            Approved | Rejected | Canceled => &[],
        }
    }

    pub fn can_transition_to(self, next: LeaveStatus) -> bool {
        self.next_states().contains(&next)
    }

    pub fn transition(self, next: LeaveStatus) -> Result<LeaveStatus, AppError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(AppError::IllegalTransition {
                from: self,
                to: next,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn default_is_submitted() {
        assert_eq!(LeaveStatus::default(), LeaveStatus::Submitted);
    }

    #[test]
    fn stored_names_round_trip() {
        assert_eq!(
            LeaveStatus::AwaitingDocumentation.as_ref(),
            "Awaiting_Documentation"
        );
        assert_eq!(
            LeaveStatus::from_str("Ready_for_Approval").unwrap(),
            LeaveStatus::ReadyForApproval
        );
        for status in LeaveStatus::iter() {
            assert_eq!(LeaveStatus::from_str(status.as_ref()).unwrap(), status);
        }
        assert!(LeaveStatus::from_str("Pending").is_err());
    }

    #[test]
    fn serde_uses_stored_names() {
        let json = serde_json::to_string(&LeaveStatus::ReadyForApproval).unwrap();
        assert_eq!(json, "\"Ready_for_Approval\"");
    }

    #[test]
    fn happy_path_reaches_approval() {
        let status = LeaveStatus::Submitted
            .transition(LeaveStatus::Received)
            .and_then(|s| s.transition(LeaveStatus::AwaitingDocumentation))
            .and_then(|s| s.transition(LeaveStatus::ReadyForApproval))
            .and_then(|s| s.transition(LeaveStatus::Approved))
            .unwrap();
        assert_eq!(status, LeaveStatus::Approved);
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for status in LeaveStatus::iter().filter(|s| s.is_terminal()) {
            for next in LeaveStatus::iter() {
                assert!(!status.can_transition_to(next), "{status} -> {next}");
            }
        }
    }

    #[test]
    fn cancel_reachable_from_every_open_state() {
        for status in LeaveStatus::iter().filter(|s| !s.is_terminal()) {
            assert!(status.can_transition_to(LeaveStatus::Canceled));
        }
    }

    #[test]
    fn skipping_review_is_rejected() {
        let err = LeaveStatus::Submitted
            .transition(LeaveStatus::Approved)
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::IllegalTransition {
                from: LeaveStatus::Submitted,
                to: LeaveStatus::Approved
            }
        ));
    }
}
