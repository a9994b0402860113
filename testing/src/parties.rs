use anyhow::anyhow;
use rand::rngs::StdRng;
use rand::SeedableRng;

use boa_negotiators::domain::{Bid, NegotiationSession};
use boa_negotiators::{BoaNegotiator, NegotiatorConfig, RoundResponse};

/// Side of alternating offers protocol.
pub trait Party: Send {
    fn name(&self) -> &str;

    /// Makes the first offer of the session.
    fn open(&mut self, time: f64) -> anyhow::Result<Bid>;

    /// Reacts to opponent's offer by accepting it or sending counter offer.
    fn respond(&mut self, bid: &Bid, time: f64) -> anyhow::Result<RoundResponse>;
}

/// `BoaNegotiator` as a session party.
pub struct BoaParty {
    name: String,
    negotiator: BoaNegotiator,
}

impl BoaParty {
    pub fn new(
        name: &str,
        session: NegotiationSession,
        config: NegotiatorConfig,
    ) -> anyhow::Result<BoaParty> {
        Ok(BoaParty {
            name: name.to_string(),
            negotiator: BoaNegotiator::init(session, config)
                .map_err(|e| anyhow!("Failed to create party '{}'. {}", name, e))?,
        })
    }

    pub fn negotiator(&self) -> &BoaNegotiator {
        &self.negotiator
    }
}

impl Party for BoaParty {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self, time: f64) -> anyhow::Result<Bid> {
        self.negotiator.open(time)
    }

    fn respond(&mut self, bid: &Bid, time: f64) -> anyhow::Result<RoundResponse> {
        self.negotiator.respond(bid.clone(), time)
    }
}

/// Never concedes. Offers the same bid and accepts only this bid.
pub struct Hardliner {
    name: String,
    bid: Bid,
}

impl Hardliner {
    pub fn new(name: &str, bid: Bid) -> Hardliner {
        Hardliner {
            name: name.to_string(),
            bid,
        }
    }

    /// Hardliner insisting on the best bid according to `session` utility.
    pub fn best_for(name: &str, session: &NegotiationSession) -> anyhow::Result<Hardliner> {
        let best = session
            .outcome_space()
            .max_bid()
            .ok_or_else(|| anyhow!("Outcome space of '{}' is empty.", name))?;
        Ok(Hardliner::new(name, best.bid))
    }
}

impl Party for Hardliner {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self, _time: f64) -> anyhow::Result<Bid> {
        Ok(self.bid.clone())
    }

    fn respond(&mut self, bid: &Bid, _time: f64) -> anyhow::Result<RoundResponse> {
        if bid == &self.bid {
            Ok(RoundResponse::Accept { bid: bid.clone() })
        } else {
            Ok(RoundResponse::Counter {
                bid: self.bid.clone(),
            })
        }
    }
}

/// Plays prepared list of bids and never accepts. Repeats the last bid
/// after the script ends.
pub struct ScriptedOpponent {
    name: String,
    script: Vec<Bid>,
    next: usize,
}

impl ScriptedOpponent {
    pub fn new(name: &str, script: Vec<Bid>) -> anyhow::Result<ScriptedOpponent> {
        if script.is_empty() {
            anyhow::bail!("Script of '{}' has no bids.", name);
        }
        Ok(ScriptedOpponent {
            name: name.to_string(),
            script,
            next: 0,
        })
    }

    fn next_bid(&mut self) -> Bid {
        let idx = self.next.min(self.script.len() - 1);
        self.next += 1;
        self.script[idx].clone()
    }
}

impl Party for ScriptedOpponent {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self, _time: f64) -> anyhow::Result<Bid> {
        Ok(self.next_bid())
    }

    fn respond(&mut self, _bid: &Bid, _time: f64) -> anyhow::Result<RoundResponse> {
        Ok(RoundResponse::Counter {
            bid: self.next_bid(),
        })
    }
}

/// Offers random bids from the domain and accepts bids with utility
/// above `reservation`.
pub struct RandomWalker {
    name: String,
    session: NegotiationSession,
    reservation: f64,
    rng: StdRng,
}

impl RandomWalker {
    pub fn new(name: &str, session: NegotiationSession, reservation: f64, seed: u64) -> Self {
        RandomWalker {
            name: name.to_string(),
            session,
            reservation,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn random_bid(&mut self) -> Bid {
        self.session.domain().random_bid(&mut self.rng)
    }
}

impl Party for RandomWalker {
    fn name(&self) -> &str {
        &self.name
    }

    fn open(&mut self, _time: f64) -> anyhow::Result<Bid> {
        Ok(self.random_bid())
    }

    fn respond(&mut self, bid: &Bid, _time: f64) -> anyhow::Result<RoundResponse> {
        if self.session.utility(bid) >= self.reservation {
            return Ok(RoundResponse::Accept { bid: bid.clone() });
        }

        Ok(RoundResponse::Counter {
            bid: self.random_bid(),
        })
    }
}
