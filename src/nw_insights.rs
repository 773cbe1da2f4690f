// Per-agent insight data shown in the inspector panel and the explorer sparklines

use rand::Rng;

use crate::nw_interface::{ActivityEntry, ActivityKind, EARNINGS_HISTORY_MONTHS};

/// Monthly earnings samples around a tenth of the lifetime earnings (±20%)
pub fn earnings_history<R: Rng + ?Sized>(earnings: f64, rng: &mut R) -> Vec<f64> {
    let base = earnings / 10.0;
    (0..EARNINGS_HISTORY_MONTHS)
        .map(|_| base * (0.8 + rng.gen::<f64>() * 0.4))
        .collect()
}

/// Recent payouts, split from the trailing 30 day earnings
pub fn activity_log(earnings_30d: f64) -> Vec<ActivityEntry> {
    [
        (ActivityKind::ReferralBonus, 0.1, 2),
        (ActivityKind::SalesCommission, 0.4, 5),
        (ActivityKind::MonthlyBonus, 0.5, 10),
    ]
    .into_iter()
    .map(|(kind, share, days_ago)| ActivityEntry {
        kind,
        amount: earnings_30d * share,
        days_ago,
    })
    .collect()
}
