//! HerCycle cycle tracker core.
//!
//! The prediction path (`prediction`, `phase`, `summary`) is pure: it takes typed
//! inputs and a reference day and never touches I/O. `intake` turns loosely shaped
//! JSON into those inputs; `storage` and `session` keep a user's history in an
//! encrypted local file.

pub mod config;
pub mod crypto;
pub mod intake;
pub mod models;
pub mod phase;
pub mod prediction;
pub mod session;
pub mod storage;
pub mod summary;

pub use models::{
    Confidence, CycleAverage, CycleProfile, CycleSummary, CycleTrackerEntry, Phase, PhaseInfo,
    PredictionSettings,
};
pub use summary::compose;
