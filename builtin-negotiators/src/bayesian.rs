use serde::{Deserialize, Serialize};

use boa_domain::{Bid, IssueId, NegotiationSession, Value};
use boa_negotiator_component::params::{parse_config, ParameterSpec};
use boa_negotiator_component::static_lib::{Component, ComponentFactory};
use boa_negotiator_component::OpponentModel;

/// Number of discrete issue weight levels: 0.0, 0.1, ..., 1.0.
const WEIGHT_LEVELS: usize = 11;
/// Opponent is expected to concede this much utility with every bid.
const CONCESSION_STEP: f64 = 0.05;
const MIN_EXPECTED_UTILITY: f64 = 0.2;
const SIGMA: f64 = 0.25;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Use only the most probable hypotheses, if greater than 0.
    pub m: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Shape {
    Downhill,
    Uphill,
    Triangular { peak: usize },
}

impl Shape {
    /// Evaluation of value with index `idx` out of `count` values.
    fn evaluate(&self, idx: usize, count: usize) -> f64 {
        if count <= 1 {
            return 1.0;
        }

        let last = (count - 1) as f64;
        let idx_f = idx as f64;
        match *self {
            Shape::Downhill => (last - idx_f) / last,
            Shape::Uphill => idx_f / last,
            Shape::Triangular { peak } => {
                let peak_f = peak as f64;
                if idx == peak {
                    1.0
                } else if idx < peak {
                    idx_f / peak_f
                } else {
                    (last - idx_f) / (last - peak_f)
                }
            }
        }
    }
}

/// Belief about opponent preferences over a single issue.
#[derive(Clone, Debug)]
struct IssueBelief {
    issue: IssueId,
    values: Vec<Value>,
    weights: Vec<f64>,
    weight_probs: Vec<f64>,
    shapes: Vec<Shape>,
    shape_probs: Vec<f64>,
}

impl IssueBelief {
    fn new(issue: IssueId, values: Vec<Value>) -> IssueBelief {
        let mut shapes = vec![Shape::Downhill, Shape::Uphill];
        shapes.extend((0..values.len()).map(|peak| Shape::Triangular { peak }));

        IssueBelief {
            issue,
            values,
            weights: (0..WEIGHT_LEVELS)
                .map(|level| level as f64 / (WEIGHT_LEVELS - 1) as f64)
                .collect(),
            weight_probs: uniform(WEIGHT_LEVELS),
            shape_probs: uniform(shapes.len()),
            shapes,
        }
    }

    fn value_index(&self, bid: &Bid) -> Option<usize> {
        let value = bid.value(self.issue)?;
        self.values.iter().position(|known| known == value)
    }

    fn expected_weight(&self, most_probable: bool) -> f64 {
        if most_probable {
            self.weights[argmax(&self.weight_probs)]
        } else {
            expectation(&self.weights, &self.weight_probs)
        }
    }

    fn expected_evaluation(&self, idx: usize, most_probable: bool) -> f64 {
        let count = self.values.len();
        if most_probable {
            self.shapes[argmax(&self.shape_probs)].evaluate(idx, count)
        } else {
            self.shapes
                .iter()
                .zip(self.shape_probs.iter())
                .map(|(shape, prob)| shape.evaluate(idx, count) * prob)
                .sum()
        }
    }
}

fn uniform(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

fn expectation(values: &[f64], probs: &[f64]) -> f64 {
    values.iter().zip(probs.iter()).map(|(v, p)| v * p).sum()
}

fn argmax(probs: &[f64]) -> usize {
    probs
        .iter()
        .enumerate()
        .fold(0, |best, (idx, prob)| if *prob > probs[best] { idx } else { best })
}

fn likelihood(predicted: f64, expected: f64) -> f64 {
    let diff = predicted - expected;
    (-(diff * diff) / (2.0 * SIGMA * SIGMA)).exp()
}

/// Multiplies prior by likelihoods and normalizes. Falls back to uniform
/// distribution if the posterior can't be normalized.
fn posterior(prior: &[f64], likelihoods: impl Iterator<Item = f64>) -> Vec<f64> {
    let unnormalized = prior
        .iter()
        .zip(likelihoods)
        .map(|(prior, likelihood)| prior * likelihood)
        .collect::<Vec<_>>();
    let sum: f64 = unnormalized.iter().sum();

    if sum > 0.0 && sum.is_finite() {
        unnormalized.into_iter().map(|p| p / sum).collect()
    } else {
        log::debug!("Degenerated posterior distribution. Resetting to uniform.");
        uniform(prior.len())
    }
}

/// Scalable Bayesian opponent model. Keeps independent beliefs about weight
/// and evaluation function of each issue and assumes the opponent concedes
/// at a constant pace.
pub struct BayesianModel {
    beliefs: Vec<IssueBelief>,
    most_probable: bool,
    observed: usize,
}

impl BayesianModel {
    pub fn with_config(session: &NegotiationSession, config: Config) -> BayesianModel {
        BayesianModel {
            beliefs: session
                .domain()
                .issues
                .iter()
                .map(|issue| IssueBelief::new(issue.id, issue.values.clone()))
                .collect(),
            most_probable: config.m > 0.0,
            observed: 0,
        }
    }

    /// Utility the opponent is expected to have for its `k`-th bid.
    pub fn expected_utility(k: usize) -> f64 {
        (1.0 - CONCESSION_STEP * k as f64).max(MIN_EXPECTED_UTILITY)
    }

    fn expected_weights(&self) -> Vec<f64> {
        self.beliefs
            .iter()
            .map(|belief| belief.expected_weight(self.most_probable))
            .collect()
    }

    fn normalized_weights(&self) -> Vec<f64> {
        let weights = self.expected_weights();
        let sum: f64 = weights.iter().sum();
        if sum > 0.0 {
            weights.into_iter().map(|weight| weight / sum).collect()
        } else {
            uniform(self.beliefs.len())
        }
    }

    /// Expected evaluation of the bid value for every issue. `None` for
    /// issues the bid has no legal value of.
    fn evaluations(&self, bid: &Bid) -> Vec<Option<f64>> {
        self.beliefs
            .iter()
            .map(|belief| {
                belief
                    .value_index(bid)
                    .map(|idx| belief.expected_evaluation(idx, self.most_probable))
            })
            .collect()
    }
}

impl OpponentModel for BayesianModel {
    fn update_model(&mut self, _session: &NegotiationSession, bid: &Bid, _time: f64) {
        let target = Self::expected_utility(self.observed);
        self.observed += 1;

        let weights = self.expected_weights();
        let normalized = self.normalized_weights();
        let evaluations = self.evaluations(bid);
        let total_weight: f64 = weights.iter().sum();

        let mut updated = Vec::with_capacity(self.beliefs.len());
        for (j, belief) in self.beliefs.iter().enumerate() {
            let idx = match belief.value_index(bid) {
                Some(idx) => idx,
                None => {
                    log::warn!(
                        "Opponent bid has no known value for issue {}. Skipping.",
                        belief.issue
                    );
                    updated.push(None);
                    continue;
                }
            };

            let others = |weights: &[f64]| -> f64 {
                weights
                    .iter()
                    .zip(evaluations.iter())
                    .enumerate()
                    .filter(|(i, _)| *i != j)
                    .map(|(_, (weight, eval))| weight * eval.unwrap_or(0.0))
                    .sum()
            };

            // Weight hypothesis replaces expected weight of this issue.
            let evaluation = evaluations[j].unwrap_or(0.0);
            let others_weight = total_weight - weights[j];
            let others_utility = others(&weights[..]);
            let weight_probs = posterior(
                &belief.weight_probs,
                belief.weights.iter().map(|hypothesis| {
                    let total = hypothesis + others_weight;
                    let predicted = if total > 0.0 {
                        (hypothesis * evaluation + others_utility) / total
                    } else {
                        0.0
                    };
                    likelihood(predicted, target)
                }),
            );

            let others_normalized = others(&normalized[..]);
            let count = belief.values.len();
            let shape_probs = posterior(
                &belief.shape_probs,
                belief.shapes.iter().map(|shape| {
                    let predicted = normalized[j] * shape.evaluate(idx, count) + others_normalized;
                    likelihood(predicted, target)
                }),
            );

            updated.push(Some((weight_probs, shape_probs)));
        }

        for (belief, update) in self.beliefs.iter_mut().zip(updated) {
            if let Some((weight_probs, shape_probs)) = update {
                belief.weight_probs = weight_probs;
                belief.shape_probs = shape_probs;
            }
        }
    }

    fn bid_evaluation(&self, bid: &Bid) -> f64 {
        self.normalized_weights()
            .iter()
            .zip(self.evaluations(bid))
            .map(|(weight, eval)| weight * eval.unwrap_or(0.0))
            .sum::<f64>()
            .clamp(0.0, 1.0)
    }

    fn issue_weight(&self, issue: IssueId) -> f64 {
        self.beliefs
            .iter()
            .zip(self.normalized_weights())
            .find(|(belief, _)| belief.issue == issue)
            .map(|(_, weight)| weight)
            .unwrap_or(0.0)
    }
}

impl ComponentFactory for BayesianModel {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        session: &NegotiationSession,
    ) -> anyhow::Result<Self> {
        let config: Config = parse_config(config)?;
        Ok(BayesianModel::with_config(session, config))
    }

    fn parameter_spec() -> Vec<ParameterSpec> {
        vec![ParameterSpec::new(
            "m",
            0.0,
            "If higher than 0 the most probable hypothesis is only used",
        )]
    }

    fn into_component(self) -> Component {
        Component::OpponentModel(Box::new(self))
    }
}
