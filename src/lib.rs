pub mod factory;
mod negotiator;

pub use factory::{ComponentConfig, LoadMode, NegotiatorConfig};
pub use negotiator::{BoaNegotiator, RoundResponse};

pub mod builtin {
    pub use boa_builtin_negotiators::{
        register_negotiators, BayesianModel, CombiAcceptance, FrequencyModel,
        NextOrTimeAcceptance, RegimeConcession, WeightedBestBid, LIBRARY,
    };
}

pub mod component {
    pub use boa_negotiator_component::static_lib::{
        factory, list_registered, register_negotiator, Component, ComponentFactory,
    };
    pub use boa_negotiator_component::{
        AcceptanceInput, AcceptanceStrategy, Actions, BidSelector, ComponentParameters,
        OfferingContext, OfferingStrategy, OpponentModel, ParameterSpec, Pause, Regime,
        SelectionError,
    };
}

pub mod domain {
    pub use boa_domain::{
        AdditiveUtilitySpace, Bid, BidDetails, BidHistory, Domain, Error, Issue, IssueId,
        NegotiationSession, OutcomeSpace, SortedOutcomeSpace, Value,
    };
}
