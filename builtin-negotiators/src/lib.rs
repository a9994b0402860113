pub mod ac_combi;
pub mod ac_next;
pub mod bayesian;
pub mod best_bid;
pub mod frequency;
pub mod time_dependent;

#[cfg(test)]
mod fixtures;

pub use ac_combi::CombiAcceptance;
pub use ac_next::NextOrTimeAcceptance;
pub use bayesian::BayesianModel;
pub use best_bid::WeightedBestBid;
pub use frequency::FrequencyModel;
pub use time_dependent::RegimeConcession;

use boa_negotiator_component::static_lib::{factory, register_negotiator};

/// Library name under which builtin components are registered.
pub const LIBRARY: &str = "boa";

pub fn register_negotiators() {
    register_negotiator(LIBRARY, "FrequencyModel", factory::<FrequencyModel>());
    register_negotiator(LIBRARY, "BayesianModel", factory::<BayesianModel>());
    register_negotiator(LIBRARY, "RegimeConcession", factory::<RegimeConcession>());
    register_negotiator(LIBRARY, "WeightedBestBid", factory::<WeightedBestBid>());
    register_negotiator(LIBRARY, "CombiAcceptance", factory::<CombiAcceptance>());
    register_negotiator(
        LIBRARY,
        "NextOrTimeAcceptance",
        factory::<NextOrTimeAcceptance>(),
    );
}
