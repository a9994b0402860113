#[derive(thiserror::Error, Debug)]
pub enum NegotiatorError {
    #[error("Party {party} failed. {error}")]
    Party { party: String, error: String },
    #[error("Party {party} accepted bid {bid}, which wasn't offered.")]
    AcceptedUnknownBid { party: String, bid: String },
    #[error("Session {0} didn't finish before timeout.")]
    Timeout(String),
    #[error("Session {session} task failed. {error}")]
    Task { session: String, error: String },
}
