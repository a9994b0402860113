use serde::{Deserialize, Serialize};

use boa_domain::{AdditiveUtilitySpace, Bid, IssueId, NegotiationSession};
use boa_negotiator_component::params::{or_default, parse_config, ParameterSpec};
use boa_negotiator_component::static_lib::{Component, ComponentFactory};
use boa_negotiator_component::OpponentModel;

const BLEND_TOLERANCE: f64 = 1e-9;
const CAP_TOLERANCE: f64 = 1e-12;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Learning coefficient.
    pub l: f64,
    /// Score added to each offered value.
    pub v: f64,
    /// Number of opponent moves checked for concessions.
    pub m: i64,
    pub w_frequency: f64,
    pub w_time: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            l: 0.2,
            v: 1.0,
            m: 4,
            w_frequency: 0.5,
            w_time: 0.5,
        }
    }
}

/// HardHeaded frequency model. Issues, which the opponent doesn't change
/// between consecutive bids, are considered important to it. Values it
/// offers often are considered preferred. Estimation can be blended with
/// similarity to recent opponent bids.
pub struct FrequencyModel {
    opponent_space: AdditiveUtilitySpace,
    num_issues: usize,
    golden: f64,
    value_addition: f64,
    window: usize,
    w_frequency: f64,
    w_time: f64,

    offers: Vec<Bid>,
    cooperative: bool,
}

impl FrequencyModel {
    pub fn with_config(session: &NegotiationSession, config: Config) -> FrequencyModel {
        let defaults = Config::default();
        let l = or_default("l", config.l, defaults.l, |l| l > 0.0 && l <= 1.0);
        let v = or_default("v", config.v, defaults.v, |v| v > 0.0);

        let window = match config.m {
            m @ 2..=4 => m as usize,
            m => {
                log::warn!(
                    "Invalid value of parameter 'm': {}. Using default: {}.",
                    m,
                    defaults.m
                );
                defaults.m as usize
            }
        };

        let (w_frequency, w_time) = if config.w_frequency < 0.0
            || config.w_time < 0.0
            || (config.w_frequency + config.w_time - 1.0).abs() > BLEND_TOLERANCE
        {
            log::warn!(
                "Blend weights w_frequency = {}, w_time = {} don't sum up to 1. Using {} and {}.",
                config.w_frequency,
                config.w_time,
                defaults.w_frequency,
                defaults.w_time
            );
            (defaults.w_frequency, defaults.w_time)
        } else {
            (config.w_frequency, config.w_time)
        };

        let num_issues = session.domain().num_issues();
        FrequencyModel {
            opponent_space: AdditiveUtilitySpace::flat(session.domain()),
            num_issues,
            golden: l / num_issues as f64,
            value_addition: v,
            window,
            w_frequency,
            w_time,
            offers: vec![],
            cooperative: true,
        }
    }

    /// No issue weight can grow above this value, because every other issue
    /// keeps at least the golden value.
    pub fn max_weight(&self) -> f64 {
        1.0 - (self.num_issues as f64 - 1.0) * self.golden
    }

    pub fn opponent_space(&self) -> &AdditiveUtilitySpace {
        &self.opponent_space
    }

    fn update_weights(&mut self, previous: &Bid, bid: &Bid) {
        let cap = self.max_weight();
        let golden = self.golden;

        let mut eligible = self
            .opponent_space
            .weights()
            .filter(|(id, _)| match (previous.value(*id), bid.value(*id)) {
                (Some(prev), Some(current)) => prev == current,
                _ => {
                    log::warn!("Opponent bid has no value for issue {}. Skipping.", id);
                    false
                }
            })
            .collect::<Vec<_>>();

        // Removing issue from eligible set lowers the total, so remaining
        // issues have to be checked again.
        loop {
            let total = 1.0 + golden * eligible.len() as f64;
            let before = eligible.len();
            eligible.retain(|(_, weight)| (weight + golden) / total <= cap + CAP_TOLERANCE);
            if eligible.len() == before {
                break;
            }
        }

        let total = 1.0 + golden * eligible.len() as f64;
        let weights = self.opponent_space.weights().collect::<Vec<_>>();
        for (id, weight) in weights {
            let new_weight = if eligible.iter().any(|(eligible, _)| *eligible == id) {
                (weight + golden) / total
            } else {
                weight / total
            };
            self.opponent_space.set_weight(id, new_weight);
        }
    }

    fn update_values(&mut self, bid: &Bid) {
        let addition = self.value_addition;
        for (id, value) in bid.iter() {
            let known = self
                .opponent_space
                .evaluator_mut(id)
                .map(|evaluator| evaluator.add_evaluation(value, addition))
                .unwrap_or(false);
            if !known {
                log::warn!("Unknown value '{}' of issue {} in opponent bid.", value, id);
            }
        }
    }

    fn update_cooperation(&mut self, session: &NegotiationSession) {
        if !self.cooperative {
            return;
        }

        let history = session.opponent_history();
        if history.len() <= self.window {
            return;
        }

        let recent = history.last_n(self.window + 1);
        let moved = recent.windows(2).any(|pair| {
            pair[0].my_undiscounted_util != pair[1].my_undiscounted_util
                && pair[0].bid != pair[1].bid
        });
        if moved {
            log::debug!("Opponent changed its offers. Considering it offensive.");
            self.cooperative = false;
        }
    }

    /// Recency of the observed bid most similar to `bid`. The most recent
    /// bid scores 1, the earliest of `n` bids scores 1/n.
    pub fn time_similarity(&self, bid: &Bid) -> f64 {
        let n = self.offers.len();
        let closest = self
            .offers
            .iter()
            .enumerate()
            .map(|(idx, offer)| (idx, bid.distance(offer)))
            .fold(None, |closest: Option<(usize, f64)>, (idx, distance)| {
                match closest {
                    Some((_, best)) if best < distance => closest,
                    _ => Some((idx, distance)),
                }
            });

        match closest {
            Some((idx, _)) => (idx + 1) as f64 / n as f64,
            None => 1.0,
        }
    }
}

impl OpponentModel for FrequencyModel {
    fn update_model(&mut self, session: &NegotiationSession, bid: &Bid, _time: f64) {
        self.offers.push(bid.clone());

        let history = session.opponent_history();
        if history.len() < 2 {
            return;
        }

        if let Some(previous) = history.get(history.len() - 2) {
            self.update_weights(&previous.bid, bid);
        }
        self.update_values(bid);
        self.update_cooperation(session);
    }

    fn bid_evaluation(&self, bid: &Bid) -> f64 {
        let utility = self.opponent_space.utility(bid);
        let similarity = if self.w_time > 0.0 {
            self.time_similarity(bid)
        } else {
            0.0
        };
        (self.w_frequency * utility + self.w_time * similarity).clamp(0.0, 1.0)
    }

    fn issue_weight(&self, issue: IssueId) -> f64 {
        self.opponent_space.weight(issue)
    }

    fn is_cooperative(&self) -> Option<bool> {
        Some(self.cooperative)
    }
}

impl ComponentFactory for FrequencyModel {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        session: &NegotiationSession,
    ) -> anyhow::Result<Self> {
        let config: Config = parse_config(config)?;
        Ok(FrequencyModel::with_config(session, config))
    }

    fn parameter_spec() -> Vec<ParameterSpec> {
        let defaults = Config::default();
        vec![
            ParameterSpec::new(
                "l",
                defaults.l,
                "The learning coefficient determines how quickly the issue weights are learned",
            ),
            ParameterSpec::new("v", defaults.v, "Score added to offered values"),
            ParameterSpec::new(
                "m",
                defaults.m as f64,
                "Number of opponent moves checked before considering the opponent non-cooperative",
            ),
            ParameterSpec::new("w_frequency", defaults.w_frequency, "Weight of frequency estimation"),
            ParameterSpec::new("w_time", defaults.w_time, "Weight of similarity to recent bids"),
        ]
    }

    fn into_component(self) -> Component {
        Component::OpponentModel(Box::new(self))
    }
}
