use crate::bid::Bid;
use crate::history::{BidDetails, BidHistory};
use crate::issue::Domain;
use crate::outcome_space::{OutcomeSpace, SortedOutcomeSpace};
use crate::utility::AdditiveUtilitySpace;
use crate::Error;

/// State of a single bilateral negotiation, shared read-only by
/// negotiation components. Each session owns its histories; nothing is
/// shared between sessions.
pub struct NegotiationSession {
    domain: Domain,
    utility_space: AdditiveUtilitySpace,
    outcome_space: Box<dyn OutcomeSpace + Send>,
    opponent_history: BidHistory,
    own_history: BidHistory,
    time: f64,
}

impl NegotiationSession {
    pub fn new(
        domain: Domain,
        utility_space: AdditiveUtilitySpace,
    ) -> Result<NegotiationSession, Error> {
        domain.validate()?;
        utility_space.validate(&domain)?;

        let outcome_space = SortedOutcomeSpace::new(&domain, &utility_space)?;
        Ok(Self::with_outcome_space(
            domain,
            utility_space,
            Box::new(outcome_space),
        ))
    }

    pub fn with_outcome_space(
        domain: Domain,
        utility_space: AdditiveUtilitySpace,
        outcome_space: Box<dyn OutcomeSpace + Send>,
    ) -> NegotiationSession {
        NegotiationSession {
            domain,
            utility_space,
            outcome_space,
            opponent_history: BidHistory::new(),
            own_history: BidHistory::new(),
            time: 0.0,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn utility_space(&self) -> &AdditiveUtilitySpace {
        &self.utility_space
    }

    pub fn outcome_space(&self) -> &dyn OutcomeSpace {
        self.outcome_space.as_ref()
    }

    pub fn opponent_history(&self) -> &BidHistory {
        &self.opponent_history
    }

    pub fn own_history(&self) -> &BidHistory {
        &self.own_history
    }

    pub fn utility(&self, bid: &Bid) -> f64 {
        self.utility_space.utility(bid)
    }

    /// Normalized negotiation time. 0 is start, 1 is deadline, though it can
    /// slightly exceed 1.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Time is supplied by negotiation protocol and can only move forward.
    pub fn set_time(&mut self, time: f64) {
        if !time.is_finite() {
            log::warn!("Ignoring non-finite negotiation time: {}.", time);
            return;
        }

        let time = time.max(0.0);
        if time < self.time {
            log::warn!(
                "Ignoring negotiation time {} earlier than current time {}.",
                time,
                self.time
            );
            return;
        }
        self.time = time;
    }

    pub fn record_opponent_bid(&mut self, bid: Bid, time: f64) -> &BidDetails {
        self.set_time(time);
        if let Err(e) = self.domain.check_bid(&bid) {
            log::warn!("Opponent bid {} doesn't match domain. {}", bid, e);
        }

        let util = self.utility(&bid);
        self.opponent_history
            .push(BidDetails::new(bid, util, self.time))
    }

    pub fn record_own_bid(&mut self, details: BidDetails) {
        self.own_history.push(details);
    }
}
