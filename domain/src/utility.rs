use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::convert::TryFrom;
use std::path::Path;

use crate::bid::Bid;
use crate::issue::{Domain, IssueId, Value};
use crate::Error;

const WEIGHTS_TOLERANCE: f64 = 1e-6;

/// Unnormalized scores of issue values. Scores are normalized by
/// the maximum score only when evaluating.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorDiscrete {
    evaluations: HashMap<Value, f64>,
}

impl EvaluatorDiscrete {
    pub fn new(evaluations: impl IntoIterator<Item = (Value, f64)>) -> EvaluatorDiscrete {
        EvaluatorDiscrete {
            evaluations: evaluations.into_iter().collect(),
        }
    }

    pub fn set_evaluation(&mut self, value: Value, evaluation: f64) {
        self.evaluations.insert(value, evaluation);
    }

    /// Adds `delta` to the score of a value known to evaluator.
    /// Returns false, if value isn't known.
    pub fn add_evaluation(&mut self, value: &Value, delta: f64) -> bool {
        match self.evaluations.get_mut(value) {
            Some(score) => {
                *score += delta;
                true
            }
            None => false,
        }
    }

    pub fn evaluation_not_normalized(&self, value: &Value) -> Option<f64> {
        self.evaluations.get(value).cloned()
    }

    pub fn max_evaluation(&self) -> f64 {
        self.evaluations
            .values()
            .cloned()
            .fold(0.0, f64::max)
    }

    /// Score of value normalized to [0, 1].
    pub fn evaluation(&self, value: &Value) -> Option<f64> {
        let score = self.evaluations.get(value)?;
        let max = self.max_evaluation();
        if max <= 0.0 {
            return Some(0.0);
        }
        Some((score / max).max(0.0))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.evaluations.keys()
    }
}

/// Linear additive utility function: sum over issues of issue weight
/// multiplied by value evaluation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditiveUtilitySpace {
    weights: BTreeMap<IssueId, f64>,
    evaluators: BTreeMap<IssueId, EvaluatorDiscrete>,
}

impl AdditiveUtilitySpace {
    pub fn new(
        weights: BTreeMap<IssueId, f64>,
        evaluators: BTreeMap<IssueId, EvaluatorDiscrete>,
    ) -> AdditiveUtilitySpace {
        AdditiveUtilitySpace {
            weights,
            evaluators,
        }
    }

    /// Flat space with uniform weights and all value scores set to 1.
    pub fn flat(domain: &Domain) -> AdditiveUtilitySpace {
        let weight = 1.0 / domain.num_issues() as f64;
        AdditiveUtilitySpace {
            weights: domain.issue_ids().map(|id| (id, weight)).collect(),
            evaluators: domain
                .issues
                .iter()
                .map(|issue| {
                    let evaluator =
                        EvaluatorDiscrete::new(issue.values.iter().map(|v| (v.clone(), 1.0)));
                    (issue.id, evaluator)
                })
                .collect(),
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<AdditiveUtilitySpace, Error> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn weight(&self, issue: IssueId) -> f64 {
        self.weights.get(&issue).cloned().unwrap_or(0.0)
    }

    pub fn set_weight(&mut self, issue: IssueId, weight: f64) {
        self.weights.insert(issue, weight);
    }

    pub fn weights(&self) -> impl Iterator<Item = (IssueId, f64)> + '_ {
        self.weights.iter().map(|(id, weight)| (*id, *weight))
    }

    pub fn weights_sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Rescales weights to sum up to 1. Noop if all weights are zero.
    pub fn normalize_weights(&mut self) {
        let sum = self.weights_sum();
        if sum > 0.0 {
            self.weights.values_mut().for_each(|weight| *weight /= sum);
        }
    }

    pub fn evaluator(&self, issue: IssueId) -> Option<&EvaluatorDiscrete> {
        self.evaluators.get(&issue)
    }

    pub fn evaluator_mut(&mut self, issue: IssueId) -> Option<&mut EvaluatorDiscrete> {
        self.evaluators.get_mut(&issue)
    }

    /// Utility of bid. Issues and values unknown to this space contribute 0.
    pub fn utility(&self, bid: &Bid) -> f64 {
        self.weights
            .iter()
            .map(|(id, weight)| {
                let evaluation = bid
                    .value(*id)
                    .and_then(|value| self.evaluators.get(id)?.evaluation(value))
                    .unwrap_or(0.0);
                weight * evaluation
            })
            .sum()
    }

    /// Strict version of `utility`, which fails on values unknown to this space.
    pub fn try_utility(&self, bid: &Bid) -> Result<f64, Error> {
        let mut utility = 0.0;
        for (id, weight) in &self.weights {
            let value = bid.value(*id).ok_or(Error::MissingIssue(*id))?;
            let evaluation = self
                .evaluators
                .get(id)
                .ok_or(Error::UnknownIssue(*id))?
                .evaluation(value)
                .ok_or_else(|| Error::UnknownValue {
                    issue: *id,
                    value: value.clone(),
                })?;
            utility += weight * evaluation;
        }
        Ok(utility)
    }

    /// Checks if space is a valid utility function over the domain.
    pub fn validate(&self, domain: &Domain) -> Result<(), Error> {
        for issue in &domain.issues {
            let weight = self.weights.get(&issue.id).ok_or_else(|| {
                Error::InvalidUtilitySpace(format!("No weight for issue {}.", issue.id))
            })?;
            if !weight.is_finite() || *weight < 0.0 {
                return Err(Error::InvalidUtilitySpace(format!(
                    "Weight of issue {} is invalid: {}.",
                    issue.id, weight
                )));
            }

            let evaluator = self.evaluators.get(&issue.id).ok_or_else(|| {
                Error::InvalidUtilitySpace(format!("No evaluator for issue {}.", issue.id))
            })?;
            for value in &issue.values {
                if evaluator.evaluation_not_normalized(value).is_none() {
                    return Err(Error::InvalidUtilitySpace(format!(
                        "No evaluation of value '{}' for issue {}.",
                        value, issue.id
                    )));
                }
            }
        }

        let sum = self.weights_sum();
        if (sum - 1.0).abs() > WEIGHTS_TOLERANCE {
            return Err(Error::InvalidUtilitySpace(format!(
                "Weights sum up to {} instead of 1.",
                sum
            )));
        }
        Ok(())
    }
}

impl TryFrom<&Path> for AdditiveUtilitySpace {
    type Error = Error;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let content = std::fs::read_to_string(path).map_err(|error| Error::File {
            path: path.to_path_buf(),
            error,
        })?;
        AdditiveUtilitySpace::from_yaml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::Issue;

    fn domain() -> Domain {
        Domain::new(
            "test",
            vec![
                Issue::new(1, "price", &["low", "high"]),
                Issue::new(2, "delivery", &["fast", "slow"]),
            ],
        )
        .unwrap()
    }

    fn space() -> AdditiveUtilitySpace {
        AdditiveUtilitySpace::from_yaml_str(
            r#"
weights:
  1: 0.75
  2: 0.25
evaluators:
  1:
    evaluations: { low: 10, high: 5 }
  2:
    evaluations: { fast: 1, slow: 0 }
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_utility_normalizes_evaluations() {
        let space = space();
        space.validate(&domain()).unwrap();

        let bid = Bid::from_pairs(&[(1, "high"), (2, "fast")]);
        assert!((space.utility(&bid) - (0.75 * 0.5 + 0.25)).abs() < 1e-12);
        assert!((space.try_utility(&bid).unwrap() - space.utility(&bid)).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_value_contributes_nothing() {
        let space = space();
        let bid = Bid::from_pairs(&[(1, "free"), (2, "fast")]);

        assert!((space.utility(&bid) - 0.25).abs() < 1e-12);
        assert!(space.try_utility(&bid).is_err());
    }

    #[test]
    fn test_flat_space() {
        let space = AdditiveUtilitySpace::flat(&domain());
        space.validate(&domain()).unwrap();
        assert!((space.utility(&Bid::from_pairs(&[(1, "low"), (2, "slow")])) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_validate_rejects_weights_not_summing_to_one() {
        let mut space = space();
        space.set_weight(IssueId(2), 0.5);
        assert!(matches!(
            space.validate(&domain()),
            Err(Error::InvalidUtilitySpace(_))
        ));
    }
}
