use boa_negotiators::domain::Bid;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NegotiationStage {
    Offer { party: String, bid: Bid, time: f64 },
    Accept { party: String, bid: Bid, time: f64 },
    Error { party: String, error: String },
    Deadline,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Agreement {
    pub bid: Bid,
    pub time: f64,
    /// Party, that accepted opponent's offer.
    pub accepted_by: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NegotiationResult {
    pub stage: Vec<NegotiationStage>,
    pub agreement: Option<Agreement>,
}

/// Identifies session between two parties. First party opens negotiations.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, derive_more::Display)]
#[display(fmt = "{}-{}", _0, _1)]
pub struct PartyPair(pub String, pub String);

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiationRecord {
    pub results: BTreeMap<String, NegotiationResult>,
    pub max_rounds: usize,
}

/// Record shared between concurrently running sessions.
#[derive(Clone, Debug)]
pub struct NegotiationRecordSync(pub Arc<Mutex<NegotiationRecord>>);

impl NegotiationRecordSync {
    pub fn new(max_rounds: usize) -> NegotiationRecordSync {
        NegotiationRecordSync(Arc::new(Mutex::new(NegotiationRecord {
            results: Default::default(),
            max_rounds,
        })))
    }

    fn lock(&self) -> MutexGuard<'_, NegotiationRecord> {
        // Record of a panicked session stays readable.
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, pair: &PartyPair, stage: NegotiationStage) {
        self.lock()
            .results
            .entry(pair.to_string())
            .or_default()
            .stage
            .push(stage);
    }

    pub fn offer(&self, pair: &PartyPair, party: &str, bid: Bid, time: f64) {
        self.push(
            pair,
            NegotiationStage::Offer {
                party: party.to_string(),
                bid,
                time,
            },
        );
    }

    pub fn accept(&self, pair: &PartyPair, party: &str, bid: Bid, time: f64) {
        let mut record = self.lock();
        let result = record.results.entry(pair.to_string()).or_default();

        result.stage.push(NegotiationStage::Accept {
            party: party.to_string(),
            bid: bid.clone(),
            time,
        });
        result.agreement = Some(Agreement {
            bid,
            time,
            accepted_by: party.to_string(),
        });
    }

    pub fn error(&self, pair: &PartyPair, party: &str, e: anyhow::Error) {
        self.push(
            pair,
            NegotiationStage::Error {
                party: party.to_string(),
                error: e.to_string(),
            },
        );
    }

    pub fn deadline(&self, pair: &PartyPair) {
        self.push(pair, NegotiationStage::Deadline);
    }

    pub fn result(&self, pair: &PartyPair) -> Option<NegotiationResult> {
        self.lock().results.get(&pair.to_string()).cloned()
    }

    pub fn snapshot(&self) -> NegotiationRecord {
        self.lock().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.lock()
            .results
            .values()
            .all(|result| result.is_finished())
    }
}

impl NegotiationResult {
    pub fn is_finished(&self) -> bool {
        if self.agreement.is_some() {
            return true;
        }

        matches!(
            self.stage.last(),
            Some(NegotiationStage::Error { .. }) | Some(NegotiationStage::Deadline)
        )
    }

    /// Number of offers made by both parties.
    pub fn offers(&self) -> usize {
        self.stage
            .iter()
            .filter(|stage| matches!(stage, NegotiationStage::Offer { .. }))
            .count()
    }

    pub fn offers_of<'a>(&'a self, party: &'a str) -> impl Iterator<Item = &'a Bid> + 'a {
        self.stage.iter().filter_map(move |stage| match stage {
            NegotiationStage::Offer { party: p, bid, .. } if p == party => Some(bid),
            _ => None,
        })
    }

    pub fn errors(&self) -> Vec<String> {
        self.stage
            .iter()
            .filter_map(|stage| match stage {
                NegotiationStage::Error { party, error } => Some(format!("{}: {}", party, error)),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Display for NegotiationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl fmt::Display for NegotiationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string_pretty(&self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(value: &str) -> Bid {
        Bid::from_pairs(&[(1, value)])
    }

    #[test]
    fn test_record_agreement() {
        let record = NegotiationRecordSync::new(10);
        let pair = PartyPair("buyer".to_string(), "seller".to_string());

        record.offer(&pair, "buyer", bid("low"), 0.0);
        assert!(!record.is_finished());

        record.offer(&pair, "seller", bid("high"), 0.1);
        record.accept(&pair, "buyer", bid("high"), 0.2);
        assert!(record.is_finished());

        let result = record.result(&pair).unwrap();
        assert_eq!(result.offers(), 2);
        assert_eq!(result.offers_of("seller").collect::<Vec<_>>(), vec![&bid("high")]);
        assert_eq!(result.agreement.unwrap().accepted_by, "buyer");
    }

    #[test]
    fn test_record_error_finishes_session() {
        let record = NegotiationRecordSync::new(10);
        let pair = PartyPair("a".to_string(), "b".to_string());

        record.error(&pair, "b", anyhow::anyhow!("Broken"));
        let result = record.result(&pair).unwrap();
        assert!(result.is_finished());
        assert_eq!(result.errors(), vec!["b: Broken".to_string()]);
    }

    #[test]
    fn test_record_display_is_json() {
        let record = NegotiationRecordSync::new(10);
        let pair = PartyPair("a".to_string(), "b".to_string());
        record.deadline(&pair);

        let display = record.snapshot().to_string();
        let parsed: serde_json::Value = serde_json::from_str(&display).unwrap();
        assert_eq!(parsed["results"]["a-b"]["stage"][0], "Deadline");
        assert_eq!(parsed["max_rounds"], 10);
    }
}
