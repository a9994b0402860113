use anyhow::anyhow;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use boa_domain::{Bid, BidDetails, NegotiationSession};
use boa_negotiator_component::{
    AcceptanceInput, AcceptanceStrategy, Actions, BidSelector, ComponentParameters,
    OfferingContext, OfferingStrategy, OpponentModel,
};

use crate::factory::{self, create_components, NegotiatorConfig};

/// Our reaction to opponent bid.
#[derive(Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
pub enum RoundResponse {
    #[display(fmt = "Accept {}", bid)]
    Accept { bid: Bid },
    #[display(fmt = "Counter {}", bid)]
    Counter { bid: Bid },
}

/// Negotiating agent composed of Bidding strategy, Opponent model
/// and Acceptance strategy. One instance handles a single session.
pub struct BoaNegotiator {
    session: NegotiationSession,
    opponent_model: Option<Box<dyn OpponentModel>>,
    bidding_strategy: Box<dyn OfferingStrategy>,
    om_strategy: Box<dyn BidSelector>,
    acceptance_strategy: Box<dyn AcceptanceStrategy>,

    /// Bid we will send, if we don't accept opponent's offer.
    next_bid: Option<BidDetails>,
}

impl BoaNegotiator {
    pub fn init(session: NegotiationSession, config: NegotiatorConfig) -> anyhow::Result<Self> {
        let components = create_components(config, &session)?;
        log::info!(
            "Initialized negotiator in domain '{}' with {} possible outcomes.",
            session.domain().name,
            session.outcome_space().size()
        );

        Ok(BoaNegotiator {
            session,
            opponent_model: components.opponent_model,
            bidding_strategy: components.bidding_strategy,
            om_strategy: components.om_strategy,
            acceptance_strategy: components.acceptance_strategy,
            next_bid: None,
        })
    }

    pub fn session(&self) -> &NegotiationSession {
        &self.session
    }

    pub fn opponent_model(&self) -> Option<&dyn OpponentModel> {
        self.opponent_model.as_deref()
    }

    /// Records opponent bid in session history and updates opponent model.
    pub fn update_model(&mut self, bid: Bid, time: f64) {
        let details = self.session.record_opponent_bid(bid, time);
        let bid = details.bid.clone();
        log::debug!(
            "Opponent offered {} with utility {:.3}.",
            bid,
            details.my_undiscounted_util
        );

        let time = self.session.time();
        if let Some(model) = self.opponent_model.as_mut() {
            if self.om_strategy.may_update(time) {
                model.update_model(&self.session, &bid, time);
            } else {
                log::debug!("Opponent model is no longer updated at time {:.3}.", time);
            }
        }
    }

    pub fn determine_opening_bid(&mut self) -> anyhow::Result<BidDetails> {
        let ctx = OfferingContext {
            session: &self.session,
            opponent_model: self.opponent_model.as_deref(),
            om_strategy: &mut *self.om_strategy,
        };
        let bid = self
            .bidding_strategy
            .determine_opening_bid(ctx)
            .map_err(|e| anyhow!("Failed to determine opening bid. {}", e))?;

        self.next_bid = Some(bid.clone());
        Ok(bid)
    }

    pub fn determine_next_bid(&mut self) -> anyhow::Result<BidDetails> {
        let ctx = OfferingContext {
            session: &self.session,
            opponent_model: self.opponent_model.as_deref(),
            om_strategy: &mut *self.om_strategy,
        };
        let bid = self
            .bidding_strategy
            .determine_next_bid(ctx)
            .map_err(|e| anyhow!("Failed to determine next bid. {}", e))?;

        self.next_bid = Some(bid.clone());
        Ok(bid)
    }

    /// Rejects if opponent didn't make any bid yet, or we don't know
    /// what we would offer instead.
    pub fn determine_acceptability(&self) -> Actions {
        let history = self.session.opponent_history();
        let (next_own_bid, last_opponent_bid, best_opponent_bid) =
            match (self.next_bid.as_ref(), history.last(), history.best()) {
                (Some(next), Some(last), Some(best)) => (next, last, best),
                _ => return Actions::Reject,
            };

        self.acceptance_strategy
            .determine_acceptability(&AcceptanceInput {
                next_own_bid,
                last_opponent_bid,
                best_opponent_bid,
                time: self.session.time(),
            })
    }

    /// Handles the whole round: learns from opponent bid and either accepts
    /// it or sends counter offer.
    pub fn respond(&mut self, bid: Bid, time: f64) -> anyhow::Result<RoundResponse> {
        self.update_model(bid, time);
        let next = self.determine_next_bid()?;

        match self.determine_acceptability() {
            Actions::Accept => {
                let last = self
                    .session
                    .opponent_history()
                    .last()
                    .ok_or_else(|| anyhow!("No opponent bid to accept."))?;
                log::info!(
                    "Accepting opponent bid {} with utility {:.3} at time {:.3}.",
                    last.bid,
                    last.my_undiscounted_util,
                    self.session.time()
                );
                Ok(RoundResponse::Accept {
                    bid: last.bid.clone(),
                })
            }
            Actions::Reject => {
                let bid = next.bid.clone();
                self.session.record_own_bid(next);
                Ok(RoundResponse::Counter { bid })
            }
        }
    }

    /// Makes the first offer of the session.
    pub fn open(&mut self, time: f64) -> anyhow::Result<Bid> {
        self.session.set_time(time);
        let opening = self.determine_opening_bid()?;
        log::info!(
            "Opening negotiation with {} (utility {:.3}).",
            opening.bid,
            opening.my_undiscounted_util
        );

        let bid = opening.bid.clone();
        self.session.record_own_bid(opening);
        Ok(bid)
    }

    pub fn parameter_listing(config: &NegotiatorConfig) -> anyhow::Result<Vec<ComponentParameters>> {
        factory::parameter_listing(config)
    }
}
