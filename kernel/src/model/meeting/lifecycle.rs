use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Persisted lifecycle of a meeting.
///
/// Replaces the three independent `started` / `ended` / `cancelled` booleans
/// of the document model. Every change goes through [`LifecycleState::apply`],
/// which only accepts the moves listed in [`TRANSITIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// Stored under the pending transaction hash, contract not yet mined.
    Pending,
    Active,
    Started,
    Ended,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Transition {
    Deploy,
    Start,
    End,
    Cancel,
}

pub const TRANSITIONS: &[(LifecycleState, Transition, LifecycleState)] = &[
    (LifecycleState::Pending, Transition::Deploy, LifecycleState::Active),
    (LifecycleState::Active, Transition::Start, LifecycleState::Started),
    (LifecycleState::Started, Transition::End, LifecycleState::Ended),
    (LifecycleState::Active, Transition::Cancel, LifecycleState::Cancelled),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("cannot {transition} a meeting in state {from}")]
    InvalidTransition {
        from: LifecycleState,
        transition: Transition,
    },
    #[error("inconsistent meeting flags: {0:?}")]
    InconsistentFlags(MeetingFlags),
}

impl LifecycleState {
    pub fn apply(self, transition: Transition) -> Result<Self, LifecycleError> {
        TRANSITIONS
            .iter()
            .find(|(from, via, _)| *from == self && *via == transition)
            .map(|(_, _, to)| *to)
            .ok_or(LifecycleError::InvalidTransition {
                from: self,
                transition,
            })
    }

    /// Rebuilds a state from the legacy boolean flags, rejecting
    /// combinations no valid progression can produce.
    pub fn from_flags(flags: MeetingFlags, is_deployed: bool) -> Result<Self, LifecycleError> {
        let MeetingFlags {
            started,
            ended,
            cancelled,
        } = flags;
        if (ended && !started) || (started && cancelled) || (!is_deployed && (started || cancelled)) {
            return Err(LifecycleError::InconsistentFlags(flags));
        }
        Ok(match (is_deployed, started, ended, cancelled) {
            (false, ..) => Self::Pending,
            (true, true, true, _) => Self::Ended,
            (true, true, false, _) => Self::Started,
            (true, false, _, true) => Self::Cancelled,
            (true, false, _, false) => Self::Active,
        })
    }

    pub fn flags(self) -> MeetingFlags {
        MeetingFlags {
            started: matches!(self, Self::Started | Self::Ended),
            ended: self == Self::Ended,
            cancelled: self == Self::Cancelled,
        }
    }

    pub fn status(self, deploying: bool) -> MeetingStatus {
        self.flags().status(deploying)
    }

    pub fn is_deployed(self) -> bool {
        self != Self::Pending
    }

    pub fn is_started(self) -> bool {
        self.flags().started
    }

    pub fn is_ended(self) -> bool {
        self == Self::Ended
    }

    pub fn is_cancelled(self) -> bool {
        self == Self::Cancelled
    }
}

/// The three booleans exposed on the wire for compatibility with the
/// document shape (`isStarted`, `isEnded`, `isCancelled`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeetingFlags {
    pub started: bool,
    pub ended: bool,
    pub cancelled: bool,
}

impl MeetingFlags {
    // First match wins; `started` is checked before `cancelled`.
    pub fn status(&self, deploying: bool) -> MeetingStatus {
        if deploying {
            MeetingStatus::Deploying
        } else if self.started {
            if self.ended {
                MeetingStatus::Ended
            } else {
                MeetingStatus::Started
            }
        } else if self.cancelled {
            MeetingStatus::Cancelled
        } else {
            MeetingStatus::Active
        }
    }
}

/// Display status of a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum MeetingStatus {
    Deploying,
    Active,
    Started,
    Ended,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [LifecycleState; 5] = [
        LifecycleState::Pending,
        LifecycleState::Active,
        LifecycleState::Started,
        LifecycleState::Ended,
        LifecycleState::Cancelled,
    ];
    const ALL_TRANSITIONS: [Transition; 4] = [
        Transition::Deploy,
        Transition::Start,
        Transition::End,
        Transition::Cancel,
    ];

    #[test]
    fn happy_path_progression() {
        let state = LifecycleState::Pending
            .apply(Transition::Deploy)
            .and_then(|s| s.apply(Transition::Start))
            .and_then(|s| s.apply(Transition::End));
        assert_eq!(state, Ok(LifecycleState::Ended));
        assert_eq!(
            LifecycleState::Active.apply(Transition::Cancel),
            Ok(LifecycleState::Cancelled)
        );
    }

    #[test]
    fn only_tabled_transitions_are_accepted() {
        for from in ALL_STATES {
            for transition in ALL_TRANSITIONS {
                let tabled = TRANSITIONS
                    .iter()
                    .any(|(f, t, _)| *f == from && *t == transition);
                assert_eq!(from.apply(transition).is_ok(), tabled, "{from} {transition}");
            }
        }
    }

    #[test]
    fn cancelled_meeting_cannot_start() {
        assert_eq!(
            LifecycleState::Cancelled.apply(Transition::Start),
            Err(LifecycleError::InvalidTransition {
                from: LifecycleState::Cancelled,
                transition: Transition::Start,
            })
        );
    }

    #[test]
    fn status_rule_prefers_deploying_then_started() {
        let started_and_cancelled = MeetingFlags {
            started: true,
            ended: false,
            cancelled: true,
        };
        assert_eq!(started_and_cancelled.status(true), MeetingStatus::Deploying);
        assert_eq!(started_and_cancelled.status(false), MeetingStatus::Started);

        let ended_without_start = MeetingFlags {
            started: false,
            ended: true,
            cancelled: false,
        };
        assert_eq!(ended_without_start.status(false), MeetingStatus::Active);
    }

    #[test]
    fn ended_status_implies_started() {
        for state in ALL_STATES {
            for deploying in [false, true] {
                if state.status(deploying) == MeetingStatus::Ended {
                    assert!(state.flags().started);
                }
            }
        }
    }

    #[test]
    fn pending_state_reports_active_unless_deploying() {
        assert_eq!(LifecycleState::Pending.status(false), MeetingStatus::Active);
        assert_eq!(LifecycleState::Pending.status(true), MeetingStatus::Deploying);
    }

    #[test]
    fn flags_round_trip_through_state() {
        for state in ALL_STATES {
            let rebuilt = LifecycleState::from_flags(state.flags(), state.is_deployed());
            assert_eq!(rebuilt, Ok(state));
        }
    }

    #[test]
    fn inconsistent_flags_are_rejected() {
        let flags = MeetingFlags {
            started: false,
            ended: true,
            cancelled: false,
        };
        assert_eq!(
            LifecycleState::from_flags(flags, true),
            Err(LifecycleError::InconsistentFlags(flags))
        );
        let flags = MeetingFlags {
            started: true,
            ended: false,
            cancelled: true,
        };
        assert!(LifecycleState::from_flags(flags, true).is_err());
    }

    #[test]
    fn state_names_match_storage_format() {
        assert_eq!(LifecycleState::Cancelled.as_ref(), "CANCELLED");
        assert_eq!("STARTED".parse::<LifecycleState>(), Ok(LifecycleState::Started));
        assert!("started".parse::<LifecycleState>().is_err());
    }
}
