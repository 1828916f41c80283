use kernel::model::meeting::{
    lifecycle::MeetingStatus,
    payout::{format_eth, Payout},
    policy::ActionGate,
};
use serde::{Deserialize, Serialize};

use super::meeting::MeetingResponse;

#[derive(Debug, Default, Deserialize)]
pub struct MeetingViewQuery {
    /// Wallet address of the viewer; absent for an anonymous visitor.
    pub user: Option<String>,
    /// Set by a client that is still waiting for the deployment to be mined.
    #[serde(default)]
    pub deploying: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingViewResponse {
    pub meeting: MeetingResponse,
    pub status: MeetingStatus,
    pub gates: Vec<ActionGate>,
    pub payout: PayoutResponse,
    pub registered: usize,
    pub max_participants: i32,
}

// Amounts are pre-rendered with four decimals.
#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PayoutResponse {
    #[serde(rename_all = "camelCase")]
    Ended {
        total_staked: String,
        ended_payout: String,
    },
    #[serde(rename_all = "camelCase")]
    Preview {
        payout_pool: String,
        active_preview_payout: String,
        estimated_payout: String,
    },
}

impl From<Payout> for PayoutResponse {
    fn from(value: Payout) -> Self {
        match value {
            Payout::Ended {
                total_staked,
                ended_payout,
            } => Self::Ended {
                total_staked: format_eth(total_staked),
                ended_payout: format_eth(ended_payout),
            },
            Payout::Preview {
                payout_pool,
                active_preview_payout,
                estimated_payout,
            } => Self::Preview {
                payout_pool: format_eth(payout_pool),
                active_preview_payout: format_eth(active_preview_payout),
                estimated_payout: format_eth(estimated_payout),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payout_is_tagged_and_formatted() {
        let json = serde_json::to_value(PayoutResponse::from(Payout::Preview {
            payout_pool: 6.0,
            active_preview_payout: 0.0,
            estimated_payout: 3.0,
        }))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "preview",
                "payoutPool": "6.0000",
                "activePreviewPayout": "0.0000",
                "estimatedPayout": "3.0000"
            })
        );
    }
}
