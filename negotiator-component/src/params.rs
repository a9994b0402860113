use derive_more::Display;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Description of single tunable component parameter.
#[derive(Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
#[display(fmt = "{} = {} ({})", name, default, description)]
pub struct ParameterSpec {
    pub name: String,
    pub default: f64,
    pub description: String,
}

impl ParameterSpec {
    pub fn new(name: &str, default: f64, description: &str) -> ParameterSpec {
        ParameterSpec {
            name: name.to_string(),
            default,
            description: description.to_string(),
        }
    }
}

/// Parameters of one component in negotiator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentParameters {
    pub component: String,
    pub parameters: Vec<ParameterSpec>,
}

/// Parses component config. Missing (null) config means defaults.
pub fn parse_config<T: DeserializeOwned + Default>(config: serde_yaml::Value) -> anyhow::Result<T> {
    Ok(match config {
        serde_yaml::Value::Null => T::default(),
        config => serde_yaml::from_value(config)?,
    })
}

/// Replaces parameter value, which doesn't satisfy `valid`, with default.
pub fn or_default(name: &str, value: f64, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
    if value.is_finite() && valid(value) {
        value
    } else {
        log::warn!(
            "Invalid value of parameter '{}': {}. Using default: {}.",
            name,
            value,
            default
        );
        default
    }
}
