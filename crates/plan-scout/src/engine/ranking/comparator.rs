//! The final ordering over ranked plans, kept separate from the scoring
//! math so the tie-break behavior can be tested on hand-built values.

use std::cmp::Ordering;

use super::RankedPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One step of the multi-key comparison. Values within `epsilon` of each
/// other are treated as equal and fall through to the next step.
pub struct SortStep {
    pub name: &'static str,
    pub epsilon: f64,
    pub direction: Direction,
    pub key: fn(&RankedPlan) -> f64,
}

/// The ordering, in priority order: combined score (descending, with
/// near-equality at 0.001), annual cost (ascending), quality score
/// (descending, exact), and finally plan name (ascending).
pub const SORT_STEPS: [SortStep; 3] = [
    SortStep {
        name: "combined_score",
        epsilon: 1e-3,
        direction: Direction::Descending,
        key: |plan| plan.combined_score,
    },
    SortStep {
        name: "annual_cost",
        epsilon: 1e-2,
        direction: Direction::Ascending,
        key: |plan| plan.annual_cost,
    },
    SortStep {
        name: "quality_score",
        epsilon: 0.0,
        direction: Direction::Descending,
        key: |plan| plan.quality_score,
    },
];

/// Compare two ranked plans under the full key sequence.
pub fn compare(a: &RankedPlan, b: &RankedPlan) -> Ordering {
    for step in &SORT_STEPS {
        let (x, y) = ((step.key)(a), (step.key)(b));
        if (x - y).abs() > step.epsilon {
            let ordering = x.total_cmp(&y);
            return match step.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            };
        }
    }
    a.plan.plan_name.cmp(&b.plan.plan_name)
}
