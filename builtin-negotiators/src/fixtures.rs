use boa_domain::{AdditiveUtilitySpace, Bid, Domain, Issue, IssueId, NegotiationSession, Value};

/// Domain with `n` issues, each having values "a", "b", "c".
pub fn abc_domain(n: u32) -> Domain {
    Domain::new(
        "abc",
        (1..=n)
            .map(|id| Issue::new(id, format!("issue-{}", id), &["a", "b", "c"]))
            .collect(),
    )
    .unwrap()
}

pub fn flat_session(n: u32) -> NegotiationSession {
    let domain = abc_domain(n);
    let utility = AdditiveUtilitySpace::flat(&domain);
    NegotiationSession::new(domain, utility).unwrap()
}

/// Laptop domain with utility preferring apple, big disk and big screen.
pub fn laptop_session() -> NegotiationSession {
    let domain = Domain::new(
        "laptop",
        vec![
            Issue::new(1, "brand", &["dell", "lenovo", "apple"]),
            Issue::new(2, "disk", &["256", "512", "1024"]),
            Issue::new(3, "screen", &["13", "15", "17"]),
        ],
    )
    .unwrap();
    let utility = AdditiveUtilitySpace::from_yaml_str(
        r#"
weights: { 1: 0.5, 2: 0.3, 3: 0.2 }
evaluators:
  1:
    evaluations: { dell: 1, lenovo: 2, apple: 4 }
  2:
    evaluations: { "256": 1, "512": 3, "1024": 5 }
  3:
    evaluations: { "13": 1, "15": 2, "17": 3 }
"#,
    )
    .unwrap();
    NegotiationSession::new(domain, utility).unwrap()
}

/// Bid in `abc_domain` built from values listed in issue order.
pub fn abc_bid(values: &str) -> Bid {
    Bid::new(
        values
            .chars()
            .enumerate()
            .map(|(idx, value)| (IssueId(idx as u32 + 1), Value(value.to_string()))),
    )
}
