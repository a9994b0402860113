pub mod bid;
mod error;
pub mod history;
pub mod issue;
pub mod outcome_space;
pub mod session;
pub mod utility;

pub use bid::Bid;
pub use error::Error;
pub use history::{BidDetails, BidHistory};
pub use issue::{Domain, Issue, IssueId, Value};
pub use outcome_space::{OutcomeSpace, Range, SortedOutcomeSpace};
pub use session::NegotiationSession;
pub use utility::{AdditiveUtilitySpace, EvaluatorDiscrete};
