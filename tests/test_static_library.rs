use serde::{Deserialize, Serialize};

use boa_negotiators::builtin::{register_negotiators, LIBRARY};
use boa_negotiators::component::{
    factory, list_registered, register_negotiator, AcceptanceInput, AcceptanceStrategy, Actions,
    Component, ComponentFactory, ParameterSpec,
};
use boa_negotiators::domain::{Bid, NegotiationSession};
use boa_negotiators::{BoaNegotiator, ComponentConfig, NegotiatorConfig};
use boa_negotiators_testing::{load_session, BoaParty, Framework, Hardliner};

/// Accepts every bid with utility above threshold.
struct AcceptAbove {
    threshold: f64,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct AcceptAboveConfig {
    threshold: f64,
}

impl AcceptanceStrategy for AcceptAbove {
    fn determine_acceptability(&self, input: &AcceptanceInput<'_>) -> Actions {
        if input.last_opponent_bid.my_undiscounted_util >= self.threshold {
            Actions::Accept
        } else {
            Actions::Reject
        }
    }
}

impl ComponentFactory for AcceptAbove {
    fn new(
        _name: &str,
        config: serde_yaml::Value,
        _session: &NegotiationSession,
    ) -> anyhow::Result<Self> {
        let config: AcceptAboveConfig = serde_yaml::from_value(config)?;
        Ok(AcceptAbove {
            threshold: config.threshold,
        })
    }

    fn parameter_spec() -> Vec<ParameterSpec> {
        vec![ParameterSpec::new("threshold", 0.0, "Minimal accepted utility")]
    }

    fn into_component(self) -> Component {
        Component::AcceptanceStrategy(Box::new(self))
    }
}

fn session() -> NegotiationSession {
    load_session("laptop_domain.yaml", "laptop_buyer.yaml").unwrap()
}

fn static_config() -> NegotiatorConfig {
    NegotiatorConfig {
        opponent_model: Some(ComponentConfig::static_lib(LIBRARY, "BayesianModel")),
        bidding_strategy: ComponentConfig::static_lib(LIBRARY, "RegimeConcession")
            .with_params(serde_yaml::from_str("scareDelay: 1ms").unwrap()),
        om_strategy: ComponentConfig::static_lib(LIBRARY, "WeightedBestBid"),
        acceptance_strategy: ComponentConfig::static_lib("testing", "AcceptAbove")
            .with_params(serde_yaml::from_str("threshold: 0.6").unwrap()),
    }
}

fn register() {
    register_negotiators();
    register_negotiator("testing", "AcceptAbove", factory::<AcceptAbove>());
}

#[test]
fn test_registered_components() {
    register();

    let registered = list_registered();
    for name in [
        "boa::FrequencyModel",
        "boa::BayesianModel",
        "boa::RegimeConcession",
        "boa::WeightedBestBid",
        "boa::CombiAcceptance",
        "boa::NextOrTimeAcceptance",
        "testing::AcceptAbove",
    ] {
        assert!(registered.contains(&name.to_string()), "{} not registered", name);
    }

    let listing = BoaNegotiator::parameter_listing(&static_config()).unwrap();
    assert_eq!(listing.len(), 4);
    assert_eq!(listing[3].component, "AcceptAbove");
    assert_eq!(listing[3].parameters[0].name, "threshold");
}

#[test]
fn test_static_components_negotiate() {
    register();
    let framework = Framework::new(20);

    // Utility 0.4 * 1 + 0.3 * 0.6 + 0.1 * 0.6 + 0.2 * 0.75 = 0.79 for buyer.
    let seller_bid = Bid::from_pairs(&[(1, "apple"), (2, "512"), (3, "17"), (4, "2y")]);
    let mut seller = Hardliner::new("seller", seller_bid.clone());
    let mut buyer = BoaParty::new("buyer", session(), static_config()).unwrap();

    let result = framework.run_session(&mut seller, &mut buyer).unwrap();
    let agreement = result.agreement.clone().unwrap();
    assert_eq!(agreement.bid, seller_bid);
    // Accepted in the first response.
    assert_eq!(agreement.time, 0.05);
}

#[test]
fn test_unregistered_library_fails() {
    register();

    let config = NegotiatorConfig {
        acceptance_strategy: ComponentConfig::static_lib("missing", "AcceptAbove"),
        ..NegotiatorConfig::default()
    };
    let error = BoaNegotiator::init(session(), config).err().unwrap();
    assert!(error.to_string().contains("missing::AcceptAbove"));
}
