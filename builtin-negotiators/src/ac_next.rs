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
}

impl Default for Config {
    fn default() -> Self {
        Config {
            a: 1.02,
            b: 0.0,
            c: 0.98,
            t: 0.99,
        }
    }
}

/// Accepts opponent bid better than our next bid, any bid after time `t`
/// and bids above `c`.
#[derive(Clone, Debug)]
pub struct NextOrTimeAcceptance {
    config: Config,
}

impl NextOrTimeAcceptance {
    pub fn with_config(config: Config) -> NextOrTimeAcceptance {
        NextOrTimeAcceptance { config }
    }

    pub fn decide(&self, next: f64, last: f64, time: f64) -> Actions {
        let Config { a, b, c, t } = self.config;
        if a * last + b >= next || time >= t || last >= c {
            Actions::Accept
        } else {
            Actions::Reject
        }
    }
}

impl AcceptanceStrategy for NextOrTimeAcceptance {
    fn determine_acceptability(&self, input: &AcceptanceInput<'_>) -> Actions {
        self.decide(
            input.next_own_bid.my_undiscounted_util,
            input.last_opponent_bid.my_undiscounted_util,
            input.time,
        )
    }
}

impl ComponentFactory for NextOrTimeAcceptance {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _session: &NegotiationSession,
    ) -> anyhow::Result<Self> {
        Ok(NextOrTimeAcceptance::with_config(parse_config(config)?))
    }

    fn parameter_spec() -> Vec<ParameterSpec> {
        let defaults = Config::default();
        vec![
            ParameterSpec::new("a", defaults.a, "Multiplier of the opponent's utility"),
            ParameterSpec::new("b", defaults.b, "Offset added to the opponent's utility"),
            ParameterSpec::new(
                "c",
                defaults.c,
                "Accept when the opponent's utility is higher than c",
            ),
            ParameterSpec::new(
                "t",
                defaults.t,
                "Accept any bid when time is higher or equal to t",
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
    use test_case::test_case;

    #[test_case(0.9, 0.85, 0.5, Actions::Reject; "nothing holds")]
    #[test_case(0.9, 0.1, 0.99, Actions::Accept; "deadline")]
    #[test_case(1.0, 0.96, 0.5, Actions::Reject; "below c")]
    #[test_case(1.0, 0.98, 0.5, Actions::Accept; "above c")]
    #[test_case(0.5, 0.495, 0.5, Actions::Accept; "close to next bid")]
    fn test_decide(next: f64, last: f64, time: f64, expected: Actions) {
        let acceptance = NextOrTimeAcceptance::with_config(Config::default());
        assert_eq!(acceptance.decide(next, last, time), expected);
    }

    #[test]
    fn test_parse_config() {
        let config = serde_yaml::from_str("c: 0.9").unwrap();
        let session = crate::fixtures::flat_session(1);
        let acceptance = NextOrTimeAcceptance::new("NextOrTimeAcceptance", config, &session).unwrap();
        assert_eq!(acceptance.decide(1.0, 0.9, 0.0), Actions::Accept);
    }
}
