//! Album reconciliation: matching local albums against trackers and
//! recording the outcome.

pub mod engine;
pub mod resolver;
pub mod storage;

pub use engine::{Engine, RunSummary, TrackerContext, TrackerSummary};
pub use resolver::{MatchResult, SearchStrategy, resolve};
