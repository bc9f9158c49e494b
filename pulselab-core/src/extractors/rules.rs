//! Rule-bucket cascades.
//!
//! Every extractor scores its inputs through ordered decision tables: a list
//! of (predicate, sub-score, label) tiers evaluated in priority order, with a
//! mandatory default branch. Keeping the tables explicit makes each bucket
//! independently testable and keeps the threshold constants in one place per
//! extractor.

use crate::domain::IndicatorDetail;

/// Matched tier of a cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierOutcome {
    pub points: f64,
    pub label: &'static str,
}

/// Evaluate tiers in order; the first matching predicate wins, otherwise the
/// default branch applies.
pub fn evaluate<T>(
    value: &T,
    tiers: &[(&dyn Fn(&T) -> bool, f64, &'static str)],
    default: (f64, &'static str),
) -> TierOutcome {
    for (predicate, points, label) in tiers {
        if predicate(value) {
            return TierOutcome {
                points: *points,
                label,
            };
        }
    }
    TierOutcome {
        points: default.0,
        label: default.1,
    }
}

/// Build a detail row from a raw value and a matched tier.
pub fn detail(value: f64, outcome: TierOutcome) -> IndicatorDetail {
    IndicatorDetail {
        value: crate::domain::round2(value),
        status: outcome.label.to_string(),
        points: outcome.points,
    }
}
