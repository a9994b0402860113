use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

use boa_builtin_negotiators::{
    BayesianModel, CombiAcceptance, FrequencyModel, NextOrTimeAcceptance, RegimeConcession,
    WeightedBestBid,
};
use boa_domain::NegotiationSession;
use boa_negotiator_component::static_lib::{
    create_static_component, static_parameter_spec, Component, ComponentFactory,
};
use boa_negotiator_component::{
    AcceptanceStrategy, BidSelector, ComponentParameters, OfferingStrategy, OpponentModel,
    ParameterSpec,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[non_exhaustive]
pub enum LoadMode {
    BuiltIn,
    /// Component registered with `register_negotiator` under `library`.
    StaticLib { library: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub load_mode: LoadMode,
    #[serde(default)]
    pub params: serde_yaml::Value,
}

impl ComponentConfig {
    pub fn builtin(name: &str) -> ComponentConfig {
        ComponentConfig {
            name: name.to_string(),
            load_mode: LoadMode::BuiltIn,
            params: serde_yaml::Value::Null,
        }
    }

    pub fn static_lib(library: &str, name: &str) -> ComponentConfig {
        ComponentConfig {
            name: name.to_string(),
            load_mode: LoadMode::StaticLib {
                library: library.to_string(),
            },
            params: serde_yaml::Value::Null,
        }
    }

    pub fn with_params(self, params: serde_yaml::Value) -> ComponentConfig {
        ComponentConfig { params, ..self }
    }
}

/// Components used by `BoaNegotiator`. Negotiator works without opponent
/// model, if `opponent_model` is `None`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NegotiatorConfig {
    #[serde(default)]
    pub opponent_model: Option<ComponentConfig>,
    pub bidding_strategy: ComponentConfig,
    pub om_strategy: ComponentConfig,
    pub acceptance_strategy: ComponentConfig,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        NegotiatorConfig {
            opponent_model: Some(ComponentConfig::builtin("FrequencyModel")),
            bidding_strategy: ComponentConfig::builtin("RegimeConcession"),
            om_strategy: ComponentConfig::builtin("WeightedBestBid"),
            acceptance_strategy: ComponentConfig::builtin("CombiAcceptance"),
        }
    }
}

pub struct Components {
    pub opponent_model: Option<Box<dyn OpponentModel>>,
    pub bidding_strategy: Box<dyn OfferingStrategy>,
    pub om_strategy: Box<dyn BidSelector>,
    pub acceptance_strategy: Box<dyn AcceptanceStrategy>,
}

pub fn create_components(
    config: NegotiatorConfig,
    session: &NegotiationSession,
) -> anyhow::Result<Components> {
    let opponent_model = match config.opponent_model {
        Some(config) => Some(create_component(config, session)?.into_opponent_model()?),
        None => {
            log::info!("Negotiating without opponent model.");
            None
        }
    };

    Ok(Components {
        opponent_model,
        bidding_strategy: create_component(config.bidding_strategy, session)?
            .into_offering_strategy()?,
        om_strategy: create_component(config.om_strategy, session)?.into_om_strategy()?,
        acceptance_strategy: create_component(config.acceptance_strategy, session)?
            .into_acceptance_strategy()?,
    })
}

pub fn create_component(
    config: ComponentConfig,
    session: &NegotiationSession,
) -> anyhow::Result<Component> {
    let name = config.name;
    let component = match config.load_mode {
        LoadMode::BuiltIn => create_builtin(&name, config.params, session),
        LoadMode::StaticLib { library } => {
            create_static_component(&format!("{}::{}", library, name), config.params, session)
        }
    }
    .map_err(|e| anyhow!("Negotiation component '{}' failed to initialize. {}", name, e))?;

    log::debug!("Created {} component '{}'.", component.kind(), name);
    Ok(component)
}

pub fn create_builtin(
    name: &str,
    config: serde_yaml::Value,
    session: &NegotiationSession,
) -> anyhow::Result<Component> {
    fn build<T: ComponentFactory>(
        name: &str,
        config: serde_yaml::Value,
        session: &NegotiationSession,
    ) -> anyhow::Result<Component> {
        Ok(T::new(name, config, session)?.into_component())
    }

    match name {
        "FrequencyModel" => build::<FrequencyModel>(name, config, session),
        "BayesianModel" => build::<BayesianModel>(name, config, session),
        "RegimeConcession" => build::<RegimeConcession>(name, config, session),
        "WeightedBestBid" => build::<WeightedBestBid>(name, config, session),
        "CombiAcceptance" => build::<CombiAcceptance>(name, config, session),
        "NextOrTimeAcceptance" => build::<NextOrTimeAcceptance>(name, config, session),
        _ => bail!("BuiltIn negotiation component {} doesn't exists.", name),
    }
}

pub fn builtin_parameter_spec(name: &str) -> anyhow::Result<Vec<ParameterSpec>> {
    Ok(match name {
        "FrequencyModel" => FrequencyModel::parameter_spec(),
        "BayesianModel" => BayesianModel::parameter_spec(),
        "RegimeConcession" => RegimeConcession::parameter_spec(),
        "WeightedBestBid" => WeightedBestBid::parameter_spec(),
        "CombiAcceptance" => CombiAcceptance::parameter_spec(),
        "NextOrTimeAcceptance" => NextOrTimeAcceptance::parameter_spec(),
        _ => bail!("BuiltIn negotiation component {} doesn't exists.", name),
    })
}

fn component_parameters(config: &ComponentConfig) -> anyhow::Result<ComponentParameters> {
    let parameters = match &config.load_mode {
        LoadMode::BuiltIn => builtin_parameter_spec(&config.name)?,
        LoadMode::StaticLib { library } => {
            static_parameter_spec(&format!("{}::{}", library, config.name))?
        }
    };
    Ok(ComponentParameters {
        component: config.name.clone(),
        parameters,
    })
}

/// Tunable parameters with defaults of all configured components.
pub fn parameter_listing(config: &NegotiatorConfig) -> anyhow::Result<Vec<ComponentParameters>> {
    config
        .opponent_model
        .iter()
        .chain([
            &config.bidding_strategy,
            &config.om_strategy,
            &config.acceptance_strategy,
        ])
        .map(component_parameters)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boa_domain::{AdditiveUtilitySpace, Domain, Issue};

    fn session() -> NegotiationSession {
        let domain = Domain::new(
            "test",
            vec![
                Issue::new(1, "price", &["low", "high"]),
                Issue::new(2, "delivery", &["fast", "slow"]),
            ],
        )
        .unwrap();
        let utility = AdditiveUtilitySpace::flat(&domain);
        NegotiationSession::new(domain, utility).unwrap()
    }

    #[test]
    fn test_negotiator_config() {
        let config = NegotiatorConfig {
            opponent_model: Some(
                ComponentConfig::builtin("FrequencyModel")
                    .with_params(serde_yaml::from_str("w_frequency: 1\nw_time: 0").unwrap()),
            ),
            ..NegotiatorConfig::default()
        };

        let serialized = serde_yaml::to_string(&config).unwrap();
        let config: NegotiatorConfig = serde_yaml::from_str(&serialized).unwrap();

        let components = create_components(config, &session()).unwrap();
        assert!(components.opponent_model.is_some());
    }

    #[test]
    fn test_config_without_opponent_model() {
        let config: NegotiatorConfig = serde_yaml::from_str(
            r#"
bidding_strategy:
  name: RegimeConcession
  load_mode: BuiltIn
  params:
    minUtility: 0.6
om_strategy:
  name: WeightedBestBid
  load_mode: BuiltIn
acceptance_strategy:
  name: NextOrTimeAcceptance
  load_mode: BuiltIn
"#,
        )
        .unwrap();

        let components = create_components(config, &session()).unwrap();
        assert!(components.opponent_model.is_none());
    }

    #[test]
    fn test_unknown_builtin_component() {
        let config = NegotiatorConfig {
            acceptance_strategy: ComponentConfig::builtin("AcceptAll"),
            ..NegotiatorConfig::default()
        };
        let error = create_components(config, &session()).err().unwrap();
        assert!(error.to_string().contains("AcceptAll"));
    }

    #[test]
    fn test_component_in_wrong_slot() {
        let config = NegotiatorConfig {
            om_strategy: ComponentConfig::builtin("CombiAcceptance"),
            ..NegotiatorConfig::default()
        };
        assert!(create_components(config, &session()).is_err());
    }

    #[test]
    fn test_invalid_params_fail() {
        let config = NegotiatorConfig {
            bidding_strategy: ComponentConfig::builtin("RegimeConcession")
                .with_params(serde_yaml::from_str("scareDelay: sometimes").unwrap()),
            ..NegotiatorConfig::default()
        };
        let error = create_components(config, &session()).err().unwrap();
        assert!(error.to_string().contains("RegimeConcession"));
    }

    #[test]
    fn test_parameter_listing() {
        let listing = parameter_listing(&NegotiatorConfig::default()).unwrap();
        let components = listing
            .iter()
            .map(|params| params.component.as_str())
            .collect::<Vec<_>>();

        assert_eq!(
            components,
            vec![
                "FrequencyModel",
                "RegimeConcession",
                "WeightedBestBid",
                "CombiAcceptance"
            ]
        );
        assert!(listing[3]
            .parameters
            .iter()
            .any(|param| param.name == "tt" && param.default == 0.8));
    }
}
