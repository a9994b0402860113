pub mod component;
pub mod params;
pub mod pause;
pub mod static_lib;

pub use component::{
    AcceptanceInput, AcceptanceStrategy, Actions, BidSelector, OfferingContext, OfferingStrategy,
    OpponentModel, Regime, SelectionError,
};
pub use params::{ComponentParameters, ParameterSpec};
pub use pause::{Pause, ThreadSleep};
pub use static_lib::{Component, ComponentFactory};

pub use boa_domain::{Bid, BidDetails, IssueId, NegotiationSession};
