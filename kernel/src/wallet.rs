//! The wallet that signs and broadcasts meeting contract calls.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{
    id::{MeetingId, UserId},
    meeting::{policy::MeetingAction, Meeting},
};

/// EIP-1193 provider error code for a request the user rejected.
pub const USER_REJECTED_REQUEST: i64 = 4001;

/// Called once the transaction has been submitted, before it is mined.
pub type OnSubmitted = Box<dyn FnOnce(String) + Send + 'static>;

#[derive(Debug, Clone, PartialEq)]
pub enum WalletOperation {
    Rsvp { stake: f64 },
    GuyCancel,
    StartEvent,
    EndEvent { attendees: Vec<UserId> },
    EventCancel,
    Withdraw,
    GetChange,
}

impl WalletOperation {
    pub fn for_action(action: MeetingAction, meeting: &Meeting) -> Self {
        match action {
            MeetingAction::Rsvp => Self::Rsvp {
                stake: meeting.stake,
            },
            MeetingAction::CancelRsvp => Self::GuyCancel,
            MeetingAction::Start => Self::StartEvent,
            MeetingAction::End => Self::EndEvent {
                attendees: meeting.roster.attend.clone(),
            },
            MeetingAction::Cancel => Self::EventCancel,
            // Ended meetings pay out; cancelled ones return the stake.
            MeetingAction::Withdraw if meeting.state.is_ended() => Self::Withdraw,
            MeetingAction::Withdraw => Self::GetChange,
        }
    }

    /// Contract method name.
    pub fn method(&self) -> &'static str {
        match self {
            Self::Rsvp { .. } => "rsvp",
            Self::GuyCancel => "guyCancel",
            Self::StartEvent => "startEvent",
            Self::EndEvent { .. } => "endEvent",
            Self::EventCancel => "eventCancel",
            Self::Withdraw => "withdraw",
            Self::GetChange => "getChange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
}

#[derive(Debug, Error)]
pub enum TxError {
    #[error("the request was declined in the wallet")]
    UserDeclined,
    #[error("{reason}")]
    Rejected { code: Option<i64>, reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TxError {
    /// Classifies an error reported by the wallet provider.
    pub fn from_provider(code: Option<i64>, reason: impl Into<String>) -> Self {
        match code {
            Some(USER_REJECTED_REQUEST) => Self::UserDeclined,
            code => Self::Rejected {
                code,
                reason: reason.into(),
            },
        }
    }
}

#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Resolves once the transaction is confirmed. `on_submitted` fires
    /// earlier, when the wallet hands back a transaction hash.
    async fn execute(
        &self,
        meeting_id: &MeetingId,
        operation: WalletOperation,
        on_submitted: OnSubmitted,
    ) -> Result<TxReceipt, TxError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::meeting::{
        fixtures::{meeting, user_ids},
        lifecycle::LifecycleState,
    };

    #[test]
    fn user_rejection_code_becomes_declined() {
        assert!(matches!(
            TxError::from_provider(Some(4001), "User denied transaction signature"),
            TxError::UserDeclined
        ));
        assert!(matches!(
            TxError::from_provider(Some(-32603), "execution reverted"),
            TxError::Rejected { code: Some(-32603), .. }
        ));
        assert!(matches!(
            TxError::from_provider(None, "timeout"),
            TxError::Rejected { code: None, .. }
        ));
    }

    #[test]
    fn withdraw_picks_the_contract_call_by_state() {
        let mut m = meeting("0xm");
        m.state = LifecycleState::Ended;
        assert_eq!(
            WalletOperation::for_action(MeetingAction::Withdraw, &m),
            WalletOperation::Withdraw
        );
        m.state = LifecycleState::Cancelled;
        assert_eq!(
            WalletOperation::for_action(MeetingAction::Withdraw, &m).method(),
            "getChange"
        );
    }

    #[test]
    fn end_event_carries_attendees() {
        let mut m = meeting("0xm");
        m.roster.attend = user_ids(&["a", "b"]);
        assert_eq!(
            WalletOperation::for_action(MeetingAction::End, &m),
            WalletOperation::EndEvent {
                attendees: user_ids(&["a", "b"])
            }
        );
    }
}
