use std::path::PathBuf;

use crate::issue::{IssueId, Value};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Issue {0} doesn't exist in domain.")]
    UnknownIssue(IssueId),
    #[error("Value '{value}' isn't legal for issue {issue}.")]
    UnknownValue { issue: IssueId, value: Value },
    #[error("Bid doesn't assign any value to issue {0}.")]
    MissingIssue(IssueId),
    #[error("Invalid domain definition. {0}")]
    InvalidDomain(String),
    #[error("Invalid utility space. {0}")]
    InvalidUtilitySpace(String),
    #[error("Outcome space has {size} bids, which exceeds limit of {limit}.")]
    OutcomeSpaceTooLarge { size: u128, limit: u128 },
    #[error("Can't read file {path}. {error}")]
    File {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Can't parse yaml. {0}")]
    Yaml(#[from] serde_yaml::Error),
}
