//! Drives a meeting action through the wallet and then into storage.
//!
//! A caller picks an action, the coordinator checks its gate, asks the wallet
//! to sign the matching contract call, and once the transaction is confirmed
//! mirrors the outcome into the local snapshot and the repository. Progress
//! is published through a `watch` channel and user-facing failures through an
//! unbounded `mpsc` channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::error::AppError;
use thiserror::Error;
use tokio::sync::{mpsc, watch};

use crate::{
    model::{
        meeting::{
            event::{TransitionMeeting, UpdateParticipant},
            lifecycle::Transition,
            policy::{self, MeetingAction},
            Meeting,
        },
        user::User,
    },
    repository::meeting::MeetingRepository,
    wallet::{TransactionService, TxError, WalletOperation},
};

/// Which actions are waiting on the wallet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub rsvp: bool,
    pub cancel_rsvp: bool,
    pub start: bool,
    pub end: bool,
    pub cancel: bool,
    pub withdraw: bool,
}

impl LoadingState {
    pub fn is_loading(&self, action: MeetingAction) -> bool {
        match action {
            MeetingAction::Rsvp => self.rsvp,
            MeetingAction::CancelRsvp => self.cancel_rsvp,
            MeetingAction::Start => self.start,
            MeetingAction::End => self.end,
            MeetingAction::Cancel => self.cancel,
            MeetingAction::Withdraw => self.withdraw,
        }
    }

    pub fn set(&mut self, action: MeetingAction, loading: bool) {
        let flag = match action {
            MeetingAction::Rsvp => &mut self.rsvp,
            MeetingAction::CancelRsvp => &mut self.cancel_rsvp,
            MeetingAction::Start => &mut self.start,
            MeetingAction::End => &mut self.end,
            MeetingAction::Cancel => &mut self.cancel,
            MeetingAction::Withdraw => &mut self.withdraw,
        };
        *flag = loading;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("{reason}")]
    NotPermitted {
        action: MeetingAction,
        reason: String,
    },
    #[error("Failed to retrieve contract address! Please go back to home and create a new event!")]
    NotDeployed,
    #[error("the transaction was declined in the wallet")]
    Declined,
    #[error("{}: {reason}", .action.failure_prefix())]
    Transaction {
        action: MeetingAction,
        reason: String,
    },
    #[error("{}.", .action.failure_prefix())]
    Failed {
        action: MeetingAction,
        #[source]
        source: anyhow::Error,
    },
    #[error(transparent)]
    Persistence(#[from] AppError),
}

impl ActionError {
    /// What to tell the user, if anything.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            Self::Declined | Self::Persistence(_) => None,
            other => Some(Notification {
                message: other.to_string(),
            }),
        }
    }

    fn from_wallet(action: MeetingAction, error: TxError) -> Self {
        match error {
            TxError::UserDeclined => Self::Declined,
            TxError::Rejected { reason, .. } => Self::Transaction { action, reason },
            TxError::Other(source) => Self::Failed { action, source },
        }
    }
}

pub struct ActionCoordinator {
    wallet: Arc<dyn TransactionService>,
    meetings: Arc<dyn MeetingRepository>,
    loading: Arc<watch::Sender<LoadingState>>,
    notifications: mpsc::UnboundedSender<Notification>,
}

impl ActionCoordinator {
    pub fn new(
        wallet: Arc<dyn TransactionService>,
        meetings: Arc<dyn MeetingRepository>,
    ) -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (loading, _) = watch::channel(LoadingState::default());
        let (notifications, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            wallet,
            meetings,
            loading: Arc::new(loading),
            notifications,
        };
        (coordinator, rx)
    }

    pub fn loading(&self) -> watch::Receiver<LoadingState> {
        self.loading.subscribe()
    }

    /// Runs `action` for `user` and, on success, leaves `meeting` holding the
    /// stored copy and `user` holding the updated participation lists.
    pub async fn perform(
        &self,
        action: MeetingAction,
        meeting: &mut Meeting,
        user: &mut User,
        now: DateTime<Utc>,
    ) -> Result<(), ActionError> {
        let result = self.run(action, meeting, user, now).await;
        match &result {
            Ok(()) => tracing::info!(%action, meeting_id = %meeting.id, "action confirmed"),
            Err(ActionError::Declined) => {
                tracing::info!(%action, meeting_id = %meeting.id, "action declined in wallet")
            }
            Err(e) => tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                %action,
                meeting_id = %meeting.id,
                "action failed"
            ),
        }
        if let Some(notification) = result.as_ref().err().and_then(ActionError::notification) {
            // Nobody listening is not an error for the action itself.
            let _ = self.notifications.send(notification);
        }
        result
    }

    async fn run(
        &self,
        action: MeetingAction,
        meeting: &mut Meeting,
        user: &mut User,
        now: DateTime<Utc>,
    ) -> Result<(), ActionError> {
        let gate = policy::evaluate(action, meeting, user, now);
        if !gate.allowed {
            return Err(ActionError::NotPermitted {
                action,
                reason: gate.reason,
            });
        }
        if !gate.visible {
            return Err(ActionError::NotPermitted {
                action,
                reason: "You are not registered for this event.".into(),
            });
        }
        if !meeting.is_deployed {
            return Err(ActionError::NotDeployed);
        }

        self.loading.send_modify(|s| s.set(action, true));
        let loading = Arc::clone(&self.loading);
        let on_submitted = Box::new(move |tx_hash: String| {
            tracing::debug!(%action, %tx_hash, "transaction submitted");
            loading.send_modify(|s| s.set(action, false));
        });
        let operation = WalletOperation::for_action(action, meeting);
        let receipt = self
            .wallet
            .execute(&meeting.id, operation, on_submitted)
            .await;
        self.loading.send_modify(|s| s.set(action, false));
        let receipt = receipt.map_err(|e| ActionError::from_wallet(action, e))?;
        tracing::debug!(%action, tx_hash = %receipt.tx_hash, "transaction confirmed");

        self.record(action, meeting, user).await
    }

    // The local copies change only once the store has accepted the write.
    async fn record(
        &self,
        action: MeetingAction,
        meeting: &mut Meeting,
        user: &mut User,
    ) -> Result<(), ActionError> {
        let participant = UpdateParticipant::new(meeting.id.clone(), user.id.clone());
        let stored = match action {
            MeetingAction::Rsvp => self.meetings.register(participant).await?,
            MeetingAction::CancelRsvp => self.meetings.cancel_registration(participant).await?,
            MeetingAction::Withdraw => self.meetings.withdraw(participant).await?,
            MeetingAction::Start => self.transition(meeting, Transition::Start).await?,
            MeetingAction::End => self.transition(meeting, Transition::End).await?,
            MeetingAction::Cancel => self.transition(meeting, Transition::Cancel).await?,
        };
        *meeting = stored;
        match action {
            MeetingAction::Rsvp => user.record_registration(&meeting.id),
            MeetingAction::CancelRsvp => user.record_cancellation(&meeting.id),
            MeetingAction::Withdraw => user.record_withdrawal(&meeting.id),
            MeetingAction::Start | MeetingAction::End | MeetingAction::Cancel => {}
        }
        Ok(())
    }

    async fn transition(
        &self,
        meeting: &Meeting,
        transition: Transition,
    ) -> Result<Meeting, AppError> {
        meeting
            .state
            .apply(transition)
            .map_err(|e| AppError::Conflict(e.to_string()))?;
        self.meetings
            .transition(TransitionMeeting::new(meeting.id.clone(), transition))
            .await
    }
}
