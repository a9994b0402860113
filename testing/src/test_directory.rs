use anyhow::Context;
use std::convert::TryFrom;
use std::path::{Path, PathBuf};

use boa_negotiators::domain::{AdditiveUtilitySpace, Domain, NegotiationSession};

pub fn test_assets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("assets")
}

/// Loads domain and utility profile from yaml files in assets directory.
pub fn load_session(domain: &str, profile: &str) -> anyhow::Result<NegotiationSession> {
    let assets = test_assets_dir();
    load_session_from(&assets.join(domain), &assets.join(profile))
}

pub fn load_session_from(domain: &Path, profile: &Path) -> anyhow::Result<NegotiationSession> {
    let domain = Domain::try_from(domain)?;
    let utility = AdditiveUtilitySpace::try_from(profile)?;

    NegotiationSession::new(domain, utility)
        .with_context(|| format!("Profile {} doesn't match domain.", profile.display()))
}
