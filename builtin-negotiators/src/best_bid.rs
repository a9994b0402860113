use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use boa_domain::{BidDetails, NegotiationSession};
use boa_negotiator_component::params::{parse_config, ParameterSpec};
use boa_negotiator_component::static_lib::{Component, ComponentFactory};
use boa_negotiator_component::{BidSelector, OpponentModel, SelectionError};

/// Opponent model estimations below this value are treated as zero.
const UNINFORMATIVE_EVALUATION: f64 = 1e-4;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Time after which opponent model should not be updated.
    pub t: f64,
    pub own_weight: f64,
    pub opponent_weight: f64,
    /// Seed for random choice when opponent model is uninformative.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            t: 1.1,
            own_weight: 0.7,
            opponent_weight: 0.3,
            seed: None,
        }
    }
}

struct ScoredBid<'a> {
    details: &'a BidDetails,
    score: f64,
}

/// Chooses the candidate maximizing weighted sum of our utility and
/// estimated opponent utility.
pub struct WeightedBestBid {
    update_threshold: f64,
    own_weight: f64,
    opponent_weight: f64,
    rng: StdRng,
}

impl WeightedBestBid {
    pub fn with_config(config: Config) -> WeightedBestBid {
        let defaults = Config::default();
        let valid = |weight: f64| weight.is_finite() && weight >= 0.0;

        let (own_weight, opponent_weight) = if valid(config.own_weight)
            && valid(config.opponent_weight)
            && config.own_weight + config.opponent_weight > 0.0
        {
            (config.own_weight, config.opponent_weight)
        } else {
            log::warn!(
                "Invalid selector weights: ownWeight = {}, opponentWeight = {}. Using {} and {}.",
                config.own_weight,
                config.opponent_weight,
                defaults.own_weight,
                defaults.opponent_weight
            );
            (defaults.own_weight, defaults.opponent_weight)
        };

        let update_threshold = if config.t.is_nan() {
            log::warn!("Invalid value of parameter 't'. Using default: {}.", defaults.t);
            defaults.t
        } else {
            config.t
        };

        WeightedBestBid {
            update_threshold,
            own_weight,
            opponent_weight,
            rng: match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        }
    }

    fn score(&self, own_utility: f64, opponent_utility: f64) -> f64 {
        (self.own_weight * own_utility + self.opponent_weight * opponent_utility)
            / (self.own_weight + self.opponent_weight)
    }
}

impl BidSelector for WeightedBestBid {
    fn select(
        &mut self,
        model: &dyn OpponentModel,
        candidates: &[BidDetails],
    ) -> anyhow::Result<BidDetails> {
        match candidates {
            [] => return Err(SelectionError::NoCandidates.into()),
            [single] => return Ok(single.clone()),
            _ => (),
        }

        let mut informative = false;
        let mut best: Option<ScoredBid> = None;
        for details in candidates {
            let opponent_utility = model.bid_evaluation(&details.bid);
            if opponent_utility > UNINFORMATIVE_EVALUATION {
                informative = true;
            }

            let score = self.score(details.my_undiscounted_util, opponent_utility);
            if best.as_ref().map_or(true, |best| score > best.score) {
                best = Some(ScoredBid { details, score });
            }
        }

        if !informative {
            log::debug!(
                "Opponent model can't distinguish {} candidates. Choosing randomly.",
                candidates.len()
            );
            return Ok(candidates[self.rng.gen_range(0..candidates.len())].clone());
        }

        best.map(|best| best.details.clone())
            .ok_or_else(|| SelectionError::NoCandidates.into())
    }

    fn may_update(&self, time: f64) -> bool {
        time < self.update_threshold
    }
}

impl ComponentFactory for WeightedBestBid {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _session: &NegotiationSession,
    ) -> anyhow::Result<Self> {
        let config: Config = parse_config(config)?;
        Ok(WeightedBestBid::with_config(config))
    }

    fn parameter_spec() -> Vec<ParameterSpec> {
        let defaults = Config::default();
        vec![
            ParameterSpec::new(
                "t",
                defaults.t,
                "Time after which the OM should not be updated",
            ),
            ParameterSpec::new(
                "ownWeight",
                defaults.own_weight,
                "Weight of the agent's own utility",
            ),
            ParameterSpec::new(
                "opponentWeight",
                defaults.opponent_weight,
                "Weight of the opponent's utility",
            ),
        ]
    }

    fn into_component(self) -> Component {
        Component::OmStrategy(Box::new(self))
    }
}
