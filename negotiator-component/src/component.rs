use derive_more::Display;
use serde::{Deserialize, Serialize};

use boa_domain::{Bid, BidDetails, IssueId, NegotiationSession, OutcomeSpace, Range};

/// Decision of `AcceptanceStrategy` about the last opponent bid.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actions {
    Accept,
    Reject,
}

/// Negotiation profile we use against the opponent.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    /// Opponent concedes, so we concede too.
    Cooperative,
    /// Opponent is aggressive. We hold our position until late.
    Offensive,
}

impl Regime {
    /// Models that don't classify the opponent leave us in offensive regime.
    pub fn of(model: Option<&dyn OpponentModel>) -> Regime {
        match model.and_then(|model| model.is_cooperative()) {
            Some(true) => Regime::Cooperative,
            _ => Regime::Offensive,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SelectionError {
    #[error("No candidate bids to choose from.")]
    NoCandidates,
    #[error("Outcome space is empty.")]
    EmptyOutcomeSpace,
    #[error("Target utility {0} is not a finite number.")]
    InvalidTarget(f64),
}

/// Width of the initial candidates window and the step it is widened by.
pub const WINDOW_INCREASE: f64 = 0.01;
/// Candidates window is widened until it holds this many bids.
pub const EXPECTED_BIDS_IN_WINDOW: usize = 3;
/// Window isn't widened above this utility.
pub const MAX_WINDOW_UPPER: f64 = 1.01;

/// Learns opponent preferences from the bids it makes.
///
/// Model state belongs to a single negotiation session and is mutated only
/// by `update_model`. Other components get read-only access.
pub trait OpponentModel: Send {
    /// Called for each opponent bid, after it was added to session history.
    /// Implementations should skip parts of the bid they don't understand
    /// instead of failing.
    fn update_model(&mut self, session: &NegotiationSession, bid: &Bid, time: f64);

    /// Estimated opponent utility of bid in range [0, 1].
    fn bid_evaluation(&self, bid: &Bid) -> f64;

    /// Estimated importance of issue for the opponent.
    fn issue_weight(&self, issue: IssueId) -> f64;

    /// `None` if model doesn't classify opponent behavior.
    fn is_cooperative(&self) -> Option<bool> {
        None
    }
}

/// Chooses one bid from a set of bids with similar utility for us, taking
/// opponent preferences into account.
pub trait BidSelector: Send {
    /// `candidates` must not be empty.
    fn select(
        &mut self,
        model: &dyn OpponentModel,
        candidates: &[BidDetails],
    ) -> anyhow::Result<BidDetails>;

    /// Tells if opponent model should still be updated at this time.
    fn may_update(&self, time: f64) -> bool;

    /// Selects bid among outcomes close to target utility. Candidates window
    /// starts at `[target, target + WINDOW_INCREASE]` and is widened upwards
    /// until it contains `EXPECTED_BIDS_IN_WINDOW` bids or reaches `MAX_WINDOW_UPPER`.
    fn select_near(
        &mut self,
        space: &dyn OutcomeSpace,
        model: &dyn OpponentModel,
        target: f64,
    ) -> anyhow::Result<BidDetails> {
        if !target.is_finite() {
            return Err(SelectionError::InvalidTarget(target).into());
        }

        let mut range = Range::new(target, target + WINDOW_INCREASE);
        loop {
            let candidates = space.bids_in_range(range);
            if candidates.len() >= EXPECTED_BIDS_IN_WINDOW || range.upper >= MAX_WINDOW_UPPER {
                if candidates.is_empty() {
                    log::debug!(
                        "No bids with utility in [{}, {}]. Falling back to the best bid.",
                        range.lower,
                        range.upper
                    );
                    return space
                        .max_bid()
                        .ok_or_else(|| SelectionError::EmptyOutcomeSpace.into());
                }
                return self.select(model, &candidates);
            }
            range.upper += WINDOW_INCREASE;
        }
    }
}

/// Everything `OfferingStrategy` can use to compute next bid.
pub struct OfferingContext<'a> {
    pub session: &'a NegotiationSession,
    /// `None` if no opponent model is used in this session.
    pub opponent_model: Option<&'a dyn OpponentModel>,
    pub om_strategy: &'a mut dyn BidSelector,
}

/// Decides which bid should be offered next.
pub trait OfferingStrategy: Send {
    fn determine_opening_bid(&mut self, ctx: OfferingContext<'_>) -> anyhow::Result<BidDetails> {
        self.determine_next_bid(ctx)
    }

    fn determine_next_bid(&mut self, ctx: OfferingContext<'_>) -> anyhow::Result<BidDetails>;

    /// Utility we aim for at given time.
    fn target_utility(&self, time: f64, regime: Regime) -> f64;
}

pub struct AcceptanceInput<'a> {
    /// Bid we would send, if we rejected opponent's bid.
    pub next_own_bid: &'a BidDetails,
    pub last_opponent_bid: &'a BidDetails,
    pub best_opponent_bid: &'a BidDetails,
    pub time: f64,
}

/// Decides if the last opponent bid should be accepted. Implementations
/// should be pure functions of their input.
pub trait AcceptanceStrategy: Send {
    fn determine_acceptability(&self, input: &AcceptanceInput<'_>) -> Actions;
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_domain::{AdditiveUtilitySpace, Domain, Issue, SortedOutcomeSpace};

    struct FirstCandidate;

    impl BidSelector for FirstCandidate {
        fn select(
            &mut self,
            _model: &dyn OpponentModel,
            candidates: &[BidDetails],
        ) -> anyhow::Result<BidDetails> {
            candidates
                .first()
                .cloned()
                .ok_or_else(|| SelectionError::NoCandidates.into())
        }

        fn may_update(&self, _time: f64) -> bool {
            true
        }
    }

    struct Indifferent(Option<bool>);

    impl OpponentModel for Indifferent {
        fn update_model(&mut self, _session: &NegotiationSession, _bid: &Bid, _time: f64) {}

        fn bid_evaluation(&self, _bid: &Bid) -> f64 {
            0.5
        }

        fn issue_weight(&self, _issue: IssueId) -> f64 {
            0.0
        }

        fn is_cooperative(&self) -> Option<bool> {
            self.0
        }
    }

    fn outcome_space() -> SortedOutcomeSpace {
        let domain = Domain::new(
            "test",
            vec![Issue::new(1, "price", &["0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10"])],
        )
        .unwrap();
        let space = AdditiveUtilitySpace::from_yaml_str(
            r#"
weights: { 1: 1.0 }
evaluators:
  1:
    evaluations: { "0": 0, "1": 1, "2": 2, "3": 3, "4": 4, "5": 5, "6": 6, "7": 7, "8": 8, "9": 9, "10": 10 }
"#,
        )
        .unwrap();
        SortedOutcomeSpace::new(&domain, &space).unwrap()
    }

    #[test]
    fn test_regime_of_model() {
        let unknown = Indifferent(None);
        let offensive = Indifferent(Some(false));
        let cooperative = Indifferent(Some(true));

        assert_eq!(Regime::of(None), Regime::Offensive);
        assert_eq!(Regime::of(Some(&unknown as &dyn OpponentModel)), Regime::Offensive);
        assert_eq!(Regime::of(Some(&offensive as &dyn OpponentModel)), Regime::Offensive);
        assert_eq!(Regime::of(Some(&cooperative as &dyn OpponentModel)), Regime::Cooperative);
    }

    #[test]
    fn test_select_near_widens_window() {
        let space = outcome_space();
        let model = Indifferent(None);

        // Utilities are multiples of 0.1, so window has to grow until it holds 0.8, 0.9 and 1.0.
        let bid = FirstCandidate.select_near(&space, &model, 0.75).unwrap();
        assert!(bid.my_undiscounted_util >= 0.75);
        assert!(bid.my_undiscounted_util <= 1.0 + 1e-9);
    }

    #[test]
    fn test_select_near_uses_what_is_available_at_the_top() {
        let space = outcome_space();
        let model = Indifferent(None);

        // Only one bid above 0.95.
        let bid = FirstCandidate.select_near(&space, &model, 0.95).unwrap();
        assert!((bid.my_undiscounted_util - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_near_falls_back_to_max_bid() {
        let space = outcome_space();
        let model = Indifferent(None);

        let bid = FirstCandidate.select_near(&space, &model, 1.2).unwrap();
        assert!((bid.my_undiscounted_util - 1.0).abs() < 1e-9);
        assert!(FirstCandidate.select_near(&space, &model, f64::NAN).is_err());
    }
}
