use derive_more::Display;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::TryFrom;
use std::path::Path;

use crate::bid::Bid;
use crate::Error;

#[derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct IssueId(pub u32);

/// Discrete value of an issue.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value(pub String);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value(value)
    }
}

/// Negotiable dimension with finite, ordered set of legal values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: IssueId,
    pub name: String,
    pub values: Vec<Value>,
}

impl Issue {
    pub fn new(id: u32, name: impl ToString, values: &[&str]) -> Issue {
        Issue {
            id: IssueId(id),
            name: name.to_string(),
            values: values.iter().map(|value| Value::from(*value)).collect(),
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }

    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.values.iter().position(|legal| legal == value)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub issues: Vec<Issue>,
}

impl Domain {
    pub fn new(name: impl ToString, issues: Vec<Issue>) -> Result<Domain, Error> {
        let domain = Domain {
            name: name.to_string(),
            issues,
        };
        domain.validate()?;
        Ok(domain)
    }

    pub fn from_yaml_str(content: &str) -> Result<Domain, Error> {
        let domain: Domain = serde_yaml::from_str(content)?;
        domain.validate()?;
        Ok(domain)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.issues.is_empty() {
            return Err(Error::InvalidDomain(format!(
                "Domain '{}' has no issues.",
                self.name
            )));
        }

        let mut ids = HashSet::new();
        for issue in &self.issues {
            if !ids.insert(issue.id) {
                return Err(Error::InvalidDomain(format!(
                    "Issue id {} used more than once.",
                    issue.id
                )));
            }
            if issue.values.is_empty() {
                return Err(Error::InvalidDomain(format!(
                    "Issue '{}' has no values.",
                    issue.name
                )));
            }
            let unique = issue.values.iter().collect::<HashSet<_>>();
            if unique.len() != issue.values.len() {
                return Err(Error::InvalidDomain(format!(
                    "Issue '{}' has duplicated values.",
                    issue.name
                )));
            }
        }
        Ok(())
    }

    pub fn issue(&self, id: IssueId) -> Option<&Issue> {
        self.issues.iter().find(|issue| issue.id == id)
    }

    pub fn issue_ids(&self) -> impl Iterator<Item = IssueId> + '_ {
        self.issues.iter().map(|issue| issue.id)
    }

    pub fn num_issues(&self) -> usize {
        self.issues.len()
    }

    /// Number of all possible bids. Saturates at `u128::MAX` for domains
    /// too large to count.
    pub fn num_outcomes(&self) -> u128 {
        self.issues.iter().fold(1u128, |count, issue| {
            count.saturating_mul(issue.values.len() as u128)
        })
    }

    /// Checks if bid assigns legal value to every issue of this domain.
    pub fn check_bid(&self, bid: &Bid) -> Result<(), Error> {
        for issue in &self.issues {
            let value = bid.value(issue.id).ok_or(Error::MissingIssue(issue.id))?;
            if !issue.contains(value) {
                return Err(Error::UnknownValue {
                    issue: issue.id,
                    value: value.clone(),
                });
            }
        }
        for id in bid.issues() {
            if self.issue(id).is_none() {
                return Err(Error::UnknownIssue(id));
            }
        }
        Ok(())
    }

    pub fn random_bid<R: Rng + ?Sized>(&self, rng: &mut R) -> Bid {
        Bid::new(self.issues.iter().map(|issue| {
            let idx = rng.gen_range(0..issue.values.len());
            (issue.id, issue.values[idx].clone())
        }))
    }

    /// Enumerates all bids of the domain. Last issue changes fastest.
    pub fn iter_bids(&self) -> BidIterator<'_> {
        BidIterator {
            domain: self,
            indices: vec![0; self.issues.len()],
            finished: self.issues.iter().any(|issue| issue.values.is_empty()),
        }
    }
}

impl TryFrom<&Path> for Domain {
    type Error = Error;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let content = std::fs::read_to_string(path).map_err(|error| Error::File {
            path: path.to_path_buf(),
            error,
        })?;
        Domain::from_yaml_str(&content)
    }
}

pub struct BidIterator<'a> {
    domain: &'a Domain,
    indices: Vec<usize>,
    finished: bool,
}

impl<'a> Iterator for BidIterator<'a> {
    type Item = Bid;

    fn next(&mut self) -> Option<Bid> {
        if self.finished {
            return None;
        }

        let issues = &self.domain.issues;
        let bid = Bid::new(
            issues
                .iter()
                .zip(self.indices.iter())
                .map(|(issue, idx)| (issue.id, issue.values[*idx].clone())),
        );

        // Odometer increment.
        self.finished = true;
        for pos in (0..issues.len()).rev() {
            self.indices[pos] += 1;
            if self.indices[pos] < issues[pos].values.len() {
                self.finished = false;
                break;
            }
            self.indices[pos] = 0;
        }

        Some(bid)
    }
}
