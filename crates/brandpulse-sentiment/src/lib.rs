//! Client for the external sentiment scoring RPC.
//!
//! The service accepts batches of texts grouped into "teams" and returns one
//! float array per team, order-preserving, one value in [-1, 1] per input
//! text. This crate pins that wire contract to a single fixed schema and
//! normalizes it once at the boundary — callers only ever see a flat
//! `Vec<f64>`.

pub mod client;
pub mod error;
mod types;

pub use client::SentimentClient;
pub use error::SentimentError;
