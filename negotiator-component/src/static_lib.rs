use anyhow::{anyhow, bail};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use boa_domain::NegotiationSession;

use crate::component::{AcceptanceStrategy, BidSelector, OfferingStrategy, OpponentModel};
use crate::params::ParameterSpec;

/// Any of the negotiation components.
pub enum Component {
    OpponentModel(Box<dyn OpponentModel>),
    OfferingStrategy(Box<dyn OfferingStrategy>),
    OmStrategy(Box<dyn BidSelector>),
    AcceptanceStrategy(Box<dyn AcceptanceStrategy>),
}

impl Component {
    pub fn kind(&self) -> &'static str {
        match self {
            Component::OpponentModel(_) => "OpponentModel",
            Component::OfferingStrategy(_) => "OfferingStrategy",
            Component::OmStrategy(_) => "OmStrategy",
            Component::AcceptanceStrategy(_) => "AcceptanceStrategy",
        }
    }

    pub fn into_opponent_model(self) -> anyhow::Result<Box<dyn OpponentModel>> {
        match self {
            Component::OpponentModel(model) => Ok(model),
            other => bail!("Expected OpponentModel, got {}.", other.kind()),
        }
    }

    pub fn into_offering_strategy(self) -> anyhow::Result<Box<dyn OfferingStrategy>> {
        match self {
            Component::OfferingStrategy(strategy) => Ok(strategy),
            other => bail!("Expected OfferingStrategy, got {}.", other.kind()),
        }
    }

    pub fn into_om_strategy(self) -> anyhow::Result<Box<dyn BidSelector>> {
        match self {
            Component::OmStrategy(strategy) => Ok(strategy),
            other => bail!("Expected OmStrategy, got {}.", other.kind()),
        }
    }

    pub fn into_acceptance_strategy(self) -> anyhow::Result<Box<dyn AcceptanceStrategy>> {
        match self {
            Component::AcceptanceStrategy(strategy) => Ok(strategy),
            other => bail!("Expected AcceptanceStrategy, got {}.", other.kind()),
        }
    }
}

/// Implemented by components that can be created from yaml config.
pub trait ComponentFactory: Sized {
    fn new(name: &str, config: serde_yaml::Value, session: &NegotiationSession)
        -> anyhow::Result<Self>;

    /// Tunable parameters with their default values.
    fn parameter_spec() -> Vec<ParameterSpec>;

    fn into_component(self) -> Component;
}

pub type ConstructorFunction = Box<
    dyn Fn(&str, serde_yaml::Value, &NegotiationSession) -> anyhow::Result<Component>
        + Send
        + Sync,
>;

pub struct ComponentConstructor {
    pub create: ConstructorFunction,
    pub parameter_spec: fn() -> Vec<ParameterSpec>,
}

lazy_static! {
    /// Contains functions that can create components by name.
    static ref CONSTRUCTORS: Arc<Mutex<HashMap<String, ComponentConstructor>>> = Arc::new(Mutex::new(HashMap::new()));
}

fn constructors() -> MutexGuard<'static, HashMap<String, ComponentConstructor>> {
    // Registry holds only constructors, so poisoned lock can't leave it inconsistent.
    CONSTRUCTORS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn factory<T: ComponentFactory + 'static>() -> ComponentConstructor {
    ComponentConstructor {
        create: Box::new(
            |name: &str, config: serde_yaml::Value, session: &NegotiationSession| {
                Ok(T::new(name, config, session)?.into_component())
            },
        ),
        parameter_spec: T::parameter_spec,
    }
}

pub fn register_negotiator(library: &str, name: &str, constructor: ComponentConstructor) {
    let name_path = format!("{}::{}", library, name);
    log::debug!("Registering negotiation component '{}'.", name_path);

    constructors().insert(name_path, constructor);
}

pub fn create_static_component(
    name_path: &str,
    config: serde_yaml::Value,
    session: &NegotiationSession,
) -> anyhow::Result<Component> {
    let map = constructors();
    match map.get(name_path) {
        Some(constructor) => (constructor.create)(name_path, config, session),
        None => Err(anyhow!("Negotiation component '{}' not found.", name_path)),
    }
}

pub fn static_parameter_spec(name_path: &str) -> anyhow::Result<Vec<ParameterSpec>> {
    let map = constructors();
    match map.get(name_path) {
        Some(constructor) => Ok((constructor.parameter_spec)()),
        None => Err(anyhow!("Negotiation component '{}' not found.", name_path)),
    }
}

pub fn list_registered() -> Vec<String> {
    let mut names = constructors().keys().cloned().collect::<Vec<_>>();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{AcceptanceInput, Actions};
    use boa_domain::{AdditiveUtilitySpace, Domain, Issue};

    pub struct RejectAll;

    impl AcceptanceStrategy for RejectAll {
        fn determine_acceptability(&self, _input: &AcceptanceInput<'_>) -> Actions {
            Actions::Reject
        }
    }

    impl ComponentFactory for RejectAll {
        fn new(
            _name: &str,
            _config: serde_yaml::Value,
            _session: &NegotiationSession,
        ) -> anyhow::Result<Self> {
            Ok(RejectAll)
        }

        fn parameter_spec() -> Vec<ParameterSpec> {
            vec![]
        }

        fn into_component(self) -> Component {
            Component::AcceptanceStrategy(Box::new(self))
        }
    }

    fn session() -> NegotiationSession {
        let domain = Domain::new("test", vec![Issue::new(1, "price", &["low", "high"])]).unwrap();
        let utility = AdditiveUtilitySpace::flat(&domain);
        NegotiationSession::new(domain, utility).unwrap()
    }

    #[test]
    fn test_register_and_create() {
        register_negotiator("test-lib", "RejectAll", factory::<RejectAll>());

        let session = session();
        let component =
            create_static_component("test-lib::RejectAll", serde_yaml::Value::Null, &session)
                .unwrap();
        assert_eq!(component.kind(), "AcceptanceStrategy");
        assert!(component.into_opponent_model().is_err());

        assert!(static_parameter_spec("test-lib::RejectAll").unwrap().is_empty());
        assert!(list_registered().contains(&"test-lib::RejectAll".to_string()));
    }

    #[test]
    fn test_create_unknown_component() {
        let session = session();
        assert!(
            create_static_component("test-lib::Unknown", serde_yaml::Value::Null, &session)
                .is_err()
        );
    }
}
