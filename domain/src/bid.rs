use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::issue::{IssueId, Value};

/// Assignment of one value to every issue. Bids are never modified after
/// construction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bid {
    values: BTreeMap<IssueId, Value>,
}

impl Bid {
    pub fn new(values: impl IntoIterator<Item = (IssueId, Value)>) -> Bid {
        Bid {
            values: values.into_iter().collect(),
        }
    }

    /// Convenience constructor, mostly useful in tests.
    pub fn from_pairs(pairs: &[(u32, &str)]) -> Bid {
        Bid::new(
            pairs
                .iter()
                .map(|(issue, value)| (IssueId(*issue), Value::from(*value))),
        )
    }

    pub fn value(&self, issue: IssueId) -> Option<&Value> {
        self.values.get(&issue)
    }

    pub fn issues(&self) -> impl Iterator<Item = IssueId> + '_ {
        self.values.keys().cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IssueId, &Value)> {
        self.values.iter().map(|(id, value)| (*id, value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn count_equal_values(&self, other: &Bid) -> usize {
        self.values
            .iter()
            .filter(|(id, value)| other.value(**id) == Some(value))
            .count()
    }

    /// Fraction of issues with different values. Issues assigned in only one
    /// of the bids count as different.
    pub fn distance(&self, other: &Bid) -> f64 {
        let issues = self
            .values
            .keys()
            .chain(other.values.keys())
            .collect::<BTreeSet<_>>();
        if issues.is_empty() {
            return 0.0;
        }

        let differing = issues
            .iter()
            .filter(|id| self.values.get(id) != other.values.get(id))
            .count();
        differing as f64 / issues.len() as f64
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self
            .values
            .iter()
            .map(|(id, value)| format!("{}: {}", id, value))
            .collect::<Vec<_>>();
        write!(f, "Bid[{}]", values.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[(1, "a"), (2, "b")], &[(1, "a"), (2, "b")], 0.0; "identical bids")]
    #[test_case(&[(1, "a"), (2, "b")], &[(1, "a"), (2, "c")], 0.5; "one of two differs")]
    #[test_case(&[(1, "a"), (2, "b"), (3, "c")], &[(1, "x"), (2, "y"), (3, "z")], 1.0; "all differ")]
    #[test_case(&[(1, "a"), (2, "b")], &[(1, "a")], 0.5; "missing issue counts as different")]
    fn test_bid_distance(first: &[(u32, &str)], second: &[(u32, &str)], expected: f64) {
        let first = Bid::from_pairs(first);
        let second = Bid::from_pairs(second);

        assert!((first.distance(&second) - expected).abs() < 1e-12);
        assert!((second.distance(&first) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_bid_equality_and_display() {
        let bid = Bid::from_pairs(&[(2, "b"), (1, "a")]);
        let same = Bid::from_pairs(&[(1, "a"), (2, "b")]);

        assert_eq!(bid, same);
        assert_eq!(bid.count_equal_values(&same), 2);
        assert_eq!(bid.to_string(), "Bid[1: a, 2: b]");
    }
}
