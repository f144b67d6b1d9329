//! Cache-and-aggregation engine for brand sentiment data.
//!
//! The [`Orchestrator`] answers one question per (brand, window, target)
//! request: do we already have enough scored items in the durable cache, or
//! do we need to fetch, score, and persist more? Cache hits short-circuit
//! every downstream API and scoring call — that is the engine's central
//! cost-control invariant.
//!
//! Collaborators are behind traits ([`ContentSource`], [`Scorer`],
//! [`ScoreCache`]) so the orchestration logic is testable with in-memory
//! fakes; [`adapters`] wraps the real HTTP and Postgres clients.

pub mod adapters;
pub mod aggregate;
pub mod orchestrator;
pub mod traits;

pub use adapters::{ApiContentSource, PgScoreCache, RpcScorer};
pub use aggregate::{distribution, series, Bucket};
pub use orchestrator::{BrandDataReport, Orchestrator, OrchestratorSettings, SkipReason, SkippedItem};
pub use traits::{ContentSource, ScoreCache, Scorer};
