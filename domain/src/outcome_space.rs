use std::cmp::Ordering;

use crate::history::BidDetails;
use crate::issue::Domain;
use crate::utility::AdditiveUtilitySpace;
use crate::Error;

/// Upper limit of enumerated outcome space size.
pub const MAX_OUTCOMES: u128 = 2_000_000;

/// Closed utility interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range {
    pub lower: f64,
    pub upper: f64,
}

impl Range {
    pub fn new(lower: f64, upper: f64) -> Range {
        Range { lower, upper }
    }

    pub fn contains(&self, utility: f64) -> bool {
        utility >= self.lower && utility <= self.upper
    }
}

/// Access to all possible bids of a domain, indexed by our own utility.
pub trait OutcomeSpace {
    /// Bid with own utility closest to `utility`.
    fn bid_near_utility(&self, utility: f64) -> Option<BidDetails>;

    /// All bids with own utility in range.
    fn bids_in_range(&self, range: Range) -> Vec<BidDetails>;

    /// Bid with the highest own utility.
    fn max_bid(&self) -> Option<BidDetails>;

    fn size(&self) -> usize;
}

/// Enumerated outcome space sorted by own utility in descending order.
pub struct SortedOutcomeSpace {
    bids: Vec<BidDetails>,
}

impl SortedOutcomeSpace {
    pub fn new(domain: &Domain, utility: &AdditiveUtilitySpace) -> Result<SortedOutcomeSpace, Error> {
        let size = domain.num_outcomes();
        if size > MAX_OUTCOMES {
            return Err(Error::OutcomeSpaceTooLarge {
                size,
                limit: MAX_OUTCOMES,
            });
        }

        let mut bids = domain
            .iter_bids()
            .map(|bid| {
                let util = utility.utility(&bid);
                BidDetails::new(bid, util, 0.0)
            })
            .collect::<Vec<_>>();

        // Stable sort keeps enumeration order for bids with equal utility.
        bids.sort_by(|a, b| {
            b.my_undiscounted_util
                .partial_cmp(&a.my_undiscounted_util)
                .unwrap_or(Ordering::Equal)
        });

        log::debug!(
            "Enumerated outcome space of domain '{}': {} bids.",
            domain.name,
            bids.len()
        );
        Ok(SortedOutcomeSpace { bids })
    }

    pub fn iter(&self) -> impl Iterator<Item = &BidDetails> {
        self.bids.iter()
    }
}

impl OutcomeSpace for SortedOutcomeSpace {
    fn bid_near_utility(&self, utility: f64) -> Option<BidDetails> {
        // Index of first bid with utility lower than target.
        let idx = self
            .bids
            .partition_point(|details| details.my_undiscounted_util >= utility);

        let above = idx.checked_sub(1).and_then(|i| self.bids.get(i));
        let below = self.bids.get(idx);
        let nearest = match (above, below) {
            (Some(above), Some(below)) => {
                let above_dist = above.my_undiscounted_util - utility;
                let below_dist = utility - below.my_undiscounted_util;
                if above_dist <= below_dist {
                    above
                } else {
                    below
                }
            }
            (Some(above), None) => above,
            (None, Some(below)) => below,
            (None, None) => return None,
        };
        Some(nearest.clone())
    }

    fn bids_in_range(&self, range: Range) -> Vec<BidDetails> {
        self.bids
            .iter()
            .skip_while(|details| details.my_undiscounted_util > range.upper)
            .take_while(|details| details.my_undiscounted_util >= range.lower)
            .cloned()
            .collect()
    }

    fn max_bid(&self) -> Option<BidDetails> {
        self.bids.first().cloned()
    }

    fn size(&self) -> usize {
        self.bids.len()
    }
}
