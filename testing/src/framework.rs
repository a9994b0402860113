use anyhow::anyhow;
use futures::future::join_all;
use futures::FutureExt;
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;

use boa_negotiators::RoundResponse;

use crate::error::NegotiatorError;
use crate::negotiation_record::{
    NegotiationRecord, NegotiationRecordSync, NegotiationResult, PartyPair,
};
use crate::parties::Party;

#[derive(thiserror::Error)]
#[error("{error}\nNegotiation traceback:\n\n{negotiation_traceback}")]
pub struct FrameworkError {
    error: anyhow::Error,
    negotiation_traceback: NegotiationRecord,
}

/// Emulates alternating offers protocol between two parties. Time is
/// normalized by number of rounds, so the last response is made at time 1.
#[derive(Clone, Debug)]
pub struct Framework {
    pub rounds: usize,
    pub test_timeout: Duration,
}

impl Framework {
    pub fn new(rounds: usize) -> Framework {
        let _ = env_logger::builder().try_init();

        Framework {
            rounds,
            test_timeout: Duration::from_secs(10),
        }
    }

    pub fn test_timeout(mut self, timeout: Duration) -> Self {
        self.test_timeout = timeout;
        self
    }

    /// Runs single session on current thread. Errors of parties end
    /// the session and are stored in the result.
    pub fn run_session(
        &self,
        first: &mut dyn Party,
        second: &mut dyn Party,
    ) -> Result<NegotiationResult, FrameworkError> {
        let record = NegotiationRecordSync::new(self.rounds);
        let pair = PartyPair(first.name().to_string(), second.name().to_string());

        negotiate(self.rounds, &pair, first, second, &record);

        record.result(&pair).ok_or_else(|| {
            FrameworkError::from(anyhow!("Session {} left no record.", pair), &record)
        })
    }

    /// Runs independent sessions concurrently. Each session gets its own
    /// blocking task, since negotiation components may pause the thread.
    pub async fn run_sessions(
        &self,
        sessions: Vec<(Box<dyn Party>, Box<dyn Party>)>,
    ) -> Result<NegotiationRecord, FrameworkError> {
        let record = NegotiationRecordSync::new(self.rounds);

        let tasks = sessions
            .into_iter()
            .map(|(mut first, mut second)| {
                let pair = PartyPair(first.name().to_string(), second.name().to_string());
                let task_pair = pair.clone();
                let task_record = record.clone();
                let rounds = self.rounds;

                let task = tokio::task::spawn_blocking(move || {
                    negotiate(
                        rounds,
                        &task_pair,
                        first.as_mut(),
                        second.as_mut(),
                        &task_record,
                    )
                });
                timeout(self.test_timeout, task).map(move |result| (pair, result))
            })
            .collect::<Vec<_>>();

        for (pair, result) in join_all(tasks).await {
            match result {
                Ok(Ok(())) => (),
                Ok(Err(e)) => {
                    return Err(FrameworkError::from(
                        NegotiatorError::Task {
                            session: pair.to_string(),
                            error: e.to_string(),
                        },
                        &record,
                    ))
                }
                Err(_) => {
                    return Err(FrameworkError::from(
                        NegotiatorError::Timeout(pair.to_string()),
                        &record,
                    ))
                }
            }
        }

        Ok(record.snapshot())
    }
}

fn negotiate(
    rounds: usize,
    pair: &PartyPair,
    first: &mut dyn Party,
    second: &mut dyn Party,
    record: &NegotiationRecordSync,
) {
    log::info!("Starting negotiations {}.", pair);

    let mut last = match first.open(0.0) {
        Ok(bid) => bid,
        Err(e) => {
            log::warn!("[{}] {} failed to open negotiations. {}", pair, first.name(), e);
            record.error(pair, first.name(), e);
            return;
        }
    };
    record.offer(pair, first.name(), last.clone(), 0.0);

    let mut parties: [&mut dyn Party; 2] = [first, second];
    for round in 1..=rounds {
        let time = round as f64 / rounds as f64;
        let party = &mut parties[round % 2];
        let name = party.name().to_string();

        match party.respond(&last, time) {
            Ok(RoundResponse::Accept { bid }) if bid == last => {
                log::info!("[{}] {} accepted {} at time {:.3}.", pair, name, bid, time);
                record.accept(pair, &name, bid, time);
                return;
            }
            Ok(RoundResponse::Accept { bid }) => {
                let e = NegotiatorError::AcceptedUnknownBid {
                    party: name.clone(),
                    bid: bid.to_string(),
                };
                record.error(pair, &name, e.into());
                return;
            }
            Ok(RoundResponse::Counter { bid }) => {
                log::debug!("[{}] {} offers {} at time {:.3}.", pair, name, bid, time);
                record.offer(pair, &name, bid.clone(), time);
                last = bid;
            }
            Err(e) => {
                log::warn!("[{}] {} failed at time {:.3}. {}", pair, name, time, e);
                let e = NegotiatorError::Party {
                    party: name.clone(),
                    error: e.to_string(),
                };
                record.error(pair, &name, e.into());
                return;
            }
        }
    }

    log::info!("Negotiations {} reached deadline without agreement.", pair);
    record.deadline(pair);
}

impl FrameworkError {
    pub fn from(error: impl Into<anyhow::Error>, record: &NegotiationRecordSync) -> FrameworkError {
        FrameworkError {
            error: error.into(),
            negotiation_traceback: record.snapshot(),
        }
    }
}

impl fmt::Debug for FrameworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation_record::NegotiationStage;
    use crate::parties::{Hardliner, ScriptedOpponent};
    use boa_negotiators::domain::Bid;

    fn bid(value: &str) -> Bid {
        Bid::from_pairs(&[(1, value)])
    }

    struct Failing;

    impl Party for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn open(&mut self, _time: f64) -> anyhow::Result<Bid> {
            Ok(bid("x"))
        }

        fn respond(&mut self, _bid: &Bid, _time: f64) -> anyhow::Result<RoundResponse> {
            anyhow::bail!("Can't respond.")
        }
    }

    #[test]
    fn test_hardliner_accepts_own_bid() {
        let framework = Framework::new(10);
        let mut first = ScriptedOpponent::new("scripted", vec![bid("a"), bid("b")]).unwrap();
        let mut second = Hardliner::new("hardliner", bid("b"));

        let result = framework.run_session(&mut first, &mut second).unwrap();
        let agreement = result.agreement.as_ref().unwrap();
        assert_eq!(agreement.bid, bid("b"));
        assert_eq!(agreement.accepted_by, "hardliner");
        // a, b from hardliner, b from script.
        assert_eq!(result.offers(), 3);
        assert_eq!(agreement.time, 0.3);
    }

    #[test]
    fn test_deadline_without_agreement() {
        let framework = Framework::new(4);
        let mut first = Hardliner::new("first", bid("a"));
        let mut second = Hardliner::new("second", bid("b"));

        let result = framework.run_session(&mut first, &mut second).unwrap();
        assert!(result.agreement.is_none());
        assert_eq!(result.offers(), 5);
        assert_eq!(result.stage.last(), Some(&NegotiationStage::Deadline));
    }

    #[test]
    fn test_party_error_ends_session() {
        let framework = Framework::new(10);
        let mut first = Hardliner::new("first", bid("a"));
        let mut second = Failing;

        let result = framework.run_session(&mut first, &mut second).unwrap();
        assert!(result.is_finished());
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("Can't respond."));
    }

    #[tokio::test]
    async fn test_run_sessions_concurrently() {
        let framework = Framework::new(6).test_timeout(Duration::from_secs(5));
        let sessions: Vec<(Box<dyn Party>, Box<dyn Party>)> = (0..4)
            .map(|i| {
                let first: Box<dyn Party> = Box::new(Hardliner::new(&format!("a{}", i), bid("a")));
                let second: Box<dyn Party> =
                    Box::new(Hardliner::new(&format!("b{}", i), bid("b")));
                (first, second)
            })
            .collect();

        let record = framework.run_sessions(sessions).await.unwrap();
        assert_eq!(record.results.len(), 4);
        assert!(record
            .results
            .values()
            .all(|result| result.stage.last() == Some(&NegotiationStage::Deadline)));
    }
}
