use serde::{Deserialize, Serialize};

use boa_domain::NegotiationSession;
use boa_negotiator_component::params::{parse_config, ParameterSpec};
use boa_negotiator_component::static_lib::{Component, ComponentFactory};
use boa_negotiator_component::{AcceptanceInput, AcceptanceStrategy, Actions};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub t: f64,
    pub tt: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            a: 1.02,
            b: 0.0,
            c: 0.95,
            t: 0.99,
            tt: 0.8,
        }
    }
}

/// Accepts opponent bid if it is close enough to the bid we would send,
/// if it is close to the best opponent bid near the deadline or if it
/// is good enough on its own.
#[derive(Clone, Debug)]
pub struct CombiAcceptance {
    config: Config,
}

impl CombiAcceptance {
    pub fn with_config(config: Config) -> CombiAcceptance {
        CombiAcceptance { config }
    }

    /// Decision based on our utilities of the next own bid, last opponent bid
    /// and the best opponent bid so far.
    pub fn decide(&self, next: f64, last: f64, best: f64, time: f64) -> Actions {
        let Config { a, b, c, t, tt } = self.config;

        if a * last + b >= next {
            log::debug!("Accepting: opponent bid {:.3} is close to our next bid {:.3}.", last, next);
            Actions::Accept
        } else if time >= t && last >= tt * best {
            log::debug!(
                "Accepting: deadline is near and opponent bid {:.3} is close to its best {:.3}.",
                last,
                best
            );
            Actions::Accept
        } else if last >= c {
            log::debug!("Accepting: opponent bid {:.3} is above {:.3}.", last, c);
            Actions::Accept
        } else {
            Actions::Reject
        }
    }
}

impl AcceptanceStrategy for CombiAcceptance {
    fn determine_acceptability(&self, input: &AcceptanceInput<'_>) -> Actions {
        self.decide(
            input.next_own_bid.my_undiscounted_util,
            input.last_opponent_bid.my_undiscounted_util,
            input.best_opponent_bid.my_undiscounted_util,
            input.time,
        )
    }
}

impl ComponentFactory for CombiAcceptance {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _session: &NegotiationSession,
    ) -> anyhow::Result<Self> {
        Ok(CombiAcceptance::with_config(parse_config(config)?))
    }

    fn parameter_spec() -> Vec<ParameterSpec> {
        let defaults = Config::default();
        vec![
            ParameterSpec::new(
                "a",
                defaults.a,
                "Accept when the opponent's utility * a + b is greater than the utility of our current bid",
            ),
            ParameterSpec::new(
                "b",
                defaults.b,
                "Accept when the opponent's utility * a + b is greater than the utility of our current bid",
            ),
            ParameterSpec::new(
                "c",
                defaults.c,
                "Accept when the opponent's utility is higher than c",
            ),
            ParameterSpec::new(
                "t",
                defaults.t,
                "Accept bids close to the best opponent bid, when time is higher or equal to t",
            ),
            ParameterSpec::new(
                "tt",
                defaults.tt,
                "Fraction of the best opponent bid utility accepted after t",
            ),
        ]
    }

    fn into_component(self) -> Component {
        Component::AcceptanceStrategy(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_domain::{Bid, BidDetails};
    use test_case::test_case;

    fn defaults() -> CombiAcceptance {
        CombiAcceptance::with_config(Config::default())
    }

    #[test_case(0.9, 0.85, 0.85, 0.5, Actions::Reject; "no condition holds")]
    #[test_case(0.9, 0.96, 0.96, 0.5, Actions::Accept; "good opponent bid")]
    #[test_case(0.9, 0.89, 0.89, 0.5, Actions::Accept; "close to next bid")]
    #[test_case(0.9, 0.7, 0.8, 0.995, Actions::Accept; "deadline and close to best")]
    #[test_case(0.9, 0.6, 0.8, 0.995, Actions::Reject; "deadline but far from best")]
    #[test_case(0.9, 0.7, 0.8, 0.98, Actions::Reject; "close to best before deadline")]
    fn test_decide(next: f64, last: f64, best: f64, time: f64, expected: Actions) {
        assert_eq!(defaults().decide(next, last, best, time), expected);
    }

    #[test]
    fn test_unreachable_conditions_reject() {
        let acceptance = CombiAcceptance::with_config(Config {
            a: 0.0,
            b: -1.0,
            c: 2.0,
            t: 2.0,
            tt: 0.8,
        });
        for last in [0.0, 0.5, 1.0] {
            assert_eq!(acceptance.decide(0.5, last, 1.0, 1.0), Actions::Reject);
        }
    }

    fn never_by_time() -> CombiAcceptance {
        CombiAcceptance::with_config(Config {
            a: 1.0,
            b: 0.0,
            c: 1.1,
            t: 1.1,
            tt: 0.8,
        })
    }

    #[test_case(0.9, 0.85; "slightly worse than next")]
    #[test_case(0.9, 0.0; "worthless bid")]
    #[test_case(1.0, 0.99; "almost next")]
    fn test_worse_than_next_is_rejected_at_any_time(next: f64, last: f64) {
        let acceptance = never_by_time();
        for time in [0.0, 0.5, 0.99, 1.0, 1.05] {
            assert_eq!(acceptance.decide(next, last, last, time), Actions::Reject);
        }
    }

    #[test_case(0.3, 0.96, 0.99)]
    #[test_case(0.5, 0.95, 1.0)]
    fn test_above_c_is_accepted_at_any_time(best: f64, last: f64, next: f64) {
        let acceptance = CombiAcceptance::with_config(Config {
            c: last,
            ..never_by_time().config
        });
        for time in [0.0, 0.5, 0.99, 1.0, 1.05] {
            assert_eq!(acceptance.decide(next, last, best, time), Actions::Accept);
        }
    }

    #[test]
    fn test_determine_acceptability_uses_input_utilities() {
        let details = |util: f64| BidDetails::new(Bid::from_pairs(&[(1, "a")]), util, 0.5);
        let next = details(0.9);
        let last = details(0.96);
        let best = details(0.96);

        let input = AcceptanceInput {
            next_own_bid: &next,
            last_opponent_bid: &last,
            best_opponent_bid: &best,
            time: 0.5,
        };
        assert_eq!(defaults().determine_acceptability(&input), Actions::Accept);
    }
}
