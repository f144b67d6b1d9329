//! Wire types for the `/get_sentiment` RPC.

use serde::{Deserialize, Serialize};

/// One group of texts scored together. The orchestrator sends exactly one
/// team per content item.
#[derive(Debug, Serialize)]
pub(crate) struct Team<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'a str>,
    pub texts: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct SentimentQuery<'a> {
    pub teams: Vec<Team<'a>>,
}

/// One float array per team, order-preserving, one value per input text.
#[derive(Debug, Deserialize)]
pub(crate) struct SentimentResponse {
    pub sentiment: Vec<Vec<f64>>,
}
