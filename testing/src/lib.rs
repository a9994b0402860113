pub mod error;
mod framework;
mod negotiation_record;
mod parties;
mod test_directory;

pub use framework::{Framework, FrameworkError};
pub use negotiation_record::{
    Agreement, NegotiationRecord, NegotiationRecordSync, NegotiationResult, NegotiationStage,
    PartyPair,
};
pub use parties::{BoaParty, Hardliner, Party, RandomWalker, ScriptedOpponent};
pub use test_directory::{load_session, load_session_from, test_assets_dir};
