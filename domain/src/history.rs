use serde::{Deserialize, Serialize};

use crate::bid::Bid;

/// Bid together with our own utility of it and the time it was made at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidDetails {
    pub bid: Bid,
    pub my_undiscounted_util: f64,
    pub time: f64,
}

impl BidDetails {
    pub fn new(bid: Bid, my_undiscounted_util: f64, time: f64) -> BidDetails {
        BidDetails {
            bid,
            my_undiscounted_util,
            time,
        }
    }

    pub fn at_time(self, time: f64) -> BidDetails {
        BidDetails { time, ..self }
    }
}

/// Append-only sequence of bids made by one party.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BidHistory {
    history: Vec<BidDetails>,
}

impl BidHistory {
    pub fn new() -> BidHistory {
        BidHistory::default()
    }

    pub fn push(&mut self, details: BidDetails) -> &BidDetails {
        self.history.push(details);
        &self.history[self.history.len() - 1]
    }

    pub fn last(&self) -> Option<&BidDetails> {
        self.history.last()
    }

    /// Bid with the highest own utility. The earliest one wins ties.
    pub fn best(&self) -> Option<&BidDetails> {
        self.history.iter().fold(None, |best, details| match best {
            Some(best) if best.my_undiscounted_util >= details.my_undiscounted_util => Some(best),
            _ => Some(details),
        })
    }

    /// At most `n` most recent bids in chronological order.
    pub fn last_n(&self, n: usize) -> &[BidDetails] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    pub fn get(&self, idx: usize) -> Option<&BidDetails> {
        self.history.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BidDetails> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(value: &str, util: f64, time: f64) -> BidDetails {
        BidDetails::new(Bid::from_pairs(&[(1, value)]), util, time)
    }

    #[test]
    fn test_best_prefers_earliest_on_ties() {
        let mut history = BidHistory::new();
        assert!(history.best().is_none());

        history.push(details("a", 0.4, 0.1));
        history.push(details("b", 0.7, 0.2));
        history.push(details("c", 0.7, 0.3));
        history.push(details("d", 0.5, 0.4));

        assert_eq!(history.best().unwrap().time, 0.2);
        assert_eq!(history.last().unwrap().time, 0.4);
    }

    #[test]
    fn test_last_n() {
        let mut history = BidHistory::new();
        history.push(details("a", 0.4, 0.1));
        history.push(details("b", 0.7, 0.2));

        assert_eq!(history.last_n(5).len(), 2);
        assert_eq!(history.last_n(1)[0].time, 0.2);
        assert!(history.last_n(0).is_empty());
    }
}
