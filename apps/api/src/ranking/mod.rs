//! Ranking stored resumes against a job description.

pub mod handlers;
pub mod pipeline;
pub mod results;
pub mod tracker;

pub use pipeline::{rank_candidates, RankedCandidate, RankingRun};
pub use tracker::{ProcessingSnapshot, ProcessingStatus, ProcessingTracker};
