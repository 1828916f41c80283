use super::Meeting;

/// Money figures shown for a meeting, in ETH.
///
/// An ended meeting pays out of its own pool. Any other meeting previews the
/// pool carried over from its parent in the series; without a parent every
/// figure is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Payout {
    Ended {
        total_staked: f64,
        ended_payout: f64,
    },
    Preview {
        payout_pool: f64,
        active_preview_payout: f64,
        estimated_payout: f64,
    },
}

pub fn compute(meeting: &Meeting, parent: Option<&Meeting>) -> Payout {
    let registered = meeting.roster.total_registered();
    let eligible = meeting.roster.eligible();

    if meeting.state.is_ended() {
        let total_staked = finite(meeting.stake * registered as f64);
        return Payout::Ended {
            total_staked,
            ended_payout: share(total_staked, eligible),
        };
    }

    // Ignore a predecessor that is not the one this meeting points at.
    let parent = parent.filter(|p| meeting.parent.as_ref() == Some(&p.id));
    let payout_pool = parent
        .map(|p| finite(p.stake * p.roster.total_registered() as f64))
        .unwrap_or(0.0);

    Payout::Preview {
        payout_pool,
        active_preview_payout: share(payout_pool, eligible),
        estimated_payout: share(payout_pool, registered),
    }
}

/// Renders an amount with four decimal places.
pub fn format_eth(amount: f64) -> String {
    format!("{:.4}", finite(amount))
}

fn share(pool: f64, participants: usize) -> f64 {
    if participants == 0 {
        return 0.0;
    }
    finite(pool / participants as f64)
}

fn finite(amount: f64) -> f64 {
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}
