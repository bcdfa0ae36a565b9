//! Hybrid scoring: LLM similarity merged with two deterministic rule boosts.
//!
//! Every function here is pure. Nothing holds state between calls, so scorers
//! can be shared freely across tasks.

pub mod hybrid;
pub mod recency;
pub mod requirements;

pub use hybrid::{HybridScorer, ScoreBreakdown, ScoreResult, ScoringWeights};
