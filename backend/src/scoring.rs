//! Points calculation for score predictions.
//!
//! A prediction earns:
//! - 3 points when both scores match the final result exactly,
//! - 1 point when it picks the right outcome (same winner, or a draw) with a
//!   different score,
//! - 0 points otherwise.
//!
//! Everything here is pure. Re-scoring an event always recomputes from the
//! final result, so applying the same result twice yields the same points.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

pub const EXACT_SCORE_POINTS: i32 = 3;
pub const CORRECT_OUTCOME_POINTS: i32 = 1;
pub const MISS_POINTS: i32 = 0;

/// A pair of scores, either a final result or a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scoreline {
    pub score1: i32,
    pub score2: i32,
}

impl Scoreline {
    pub fn new(score1: i32, score2: i32) -> Self {
        Self { score1, score2 }
    }

    /// Reject negative scores
    pub fn validate(&self) -> Result<(), String> {
        if self.score1 < 0 || self.score2 < 0 {
            return Err("scores must be non-negative".to_string());
        }
        Ok(())
    }

    /// Which side came out ahead: `Greater` means team 1 won, `Equal` a draw
    pub fn outcome(&self) -> Ordering {
        self.score1.cmp(&self.score2)
    }
}

/// Points awarded to `prediction` given the final `result`
pub fn points_for(prediction: Scoreline, result: Scoreline) -> i32 {
    if prediction == result {
        EXACT_SCORE_POINTS
    } else if prediction.outcome() == result.outcome() {
        CORRECT_OUTCOME_POINTS
    } else {
        MISS_POINTS
    }
}

/// Score every prediction against `result`, keyed by bet id.
/// The output covers all inputs; nothing is carried over from earlier runs.
pub fn score_predictions<I>(result: Scoreline, predictions: I) -> Vec<(Uuid, i32)>
where
    I: IntoIterator<Item = (Uuid, Scoreline)>,
{
    predictions
        .into_iter()
        .map(|(bet_id, prediction)| (bet_id, points_for(prediction, result)))
        .collect()
}

/// Sum points per user. Every user in `members` appears in the output, with 0 when
/// they have no (scored) bets. Points of users outside `members` are ignored.
pub fn tally_points<M, B>(members: M, bets: B) -> HashMap<Uuid, i64>
where
    M: IntoIterator<Item = Uuid>,
    B: IntoIterator<Item = (Uuid, Option<i32>)>,
{
    let mut totals: HashMap<Uuid, i64> = members.into_iter().map(|id| (id, 0)).collect();
    for (user_id, points) in bets {
        if let Some(total) = totals.get_mut(&user_id) {
            *total += i64::from(points.unwrap_or(0));
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(a: i32, b: i32) -> Scoreline {
        Scoreline::new(a, b)
    }

    #[test]
    fn test_reference_scenario() {
        let result = s(2, 1);
        assert_eq!(points_for(s(2, 1), result), 3);
        assert_eq!(points_for(s(3, 0), result), 1);
        assert_eq!(points_for(s(1, 2), result), 0);
        // draw predicted, not the actual outcome
        assert_eq!(points_for(s(1, 1), result), 0);
    }

    #[test]
    fn test_draws() {
        assert_eq!(points_for(s(1, 1), s(1, 1)), 3);
        assert_eq!(points_for(s(2, 2), s(1, 1)), 1);
        assert_eq!(points_for(s(0, 0), s(3, 3)), 1);
        assert_eq!(points_for(s(1, 0), s(0, 0)), 0);
    }

    #[test]
    fn test_away_wins() {
        assert_eq!(points_for(s(0, 2), s(1, 2)), 1);
        assert_eq!(points_for(s(1, 2), s(1, 2)), 3);
        assert_eq!(points_for(s(2, 1), s(1, 2)), 0);
    }

    #[test]
    fn test_points_are_only_0_1_or_3() {
        for a in 0..5 {
            for b in 0..5 {
                for c in 0..5 {
                    for d in 0..5 {
                        let p = points_for(s(a, b), s(c, d));
                        assert!(matches!(p, 0 | 1 | 3));
                        assert_eq!(p == 3, a == c && b == d);
                    }
                }
            }
        }
    }

    #[test]
    fn test_score_predictions_is_idempotent() {
        let bets = vec![
            (Uuid::new_v4(), s(2, 1)),
            (Uuid::new_v4(), s(0, 0)),
            (Uuid::new_v4(), s(4, 0)),
        ];
        let first = score_predictions(s(2, 1), bets.clone());
        let second = score_predictions(s(2, 1), bets);
        assert_eq!(first, second);
        assert_eq!(
            first.iter().map(|(_, p)| *p).collect::<Vec<_>>(),
            vec![3, 0, 1]
        );
    }

    #[test]
    fn test_tally_points() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let totals = tally_points(
            vec![alice, bob],
            vec![
                (alice, Some(3)),
                (alice, Some(1)),
                (alice, None),
                (stranger, Some(3)),
            ],
        );

        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&alice], 4);
        assert_eq!(totals[&bob], 0);
        assert!(!totals.contains_key(&stranger));
    }

    #[test]
    fn test_scoreline_validate() {
        assert!(s(0, 0).validate().is_ok());
        assert!(s(-1, 0).validate().is_err());
    }
}
