use std::time::Duration;

use crate::error::SentimentError;
use crate::types::{SentimentQuery, SentimentResponse, Team};

pub struct SentimentClient {
    client: reqwest::Client,
    url: String,
}

impl SentimentClient {
    /// # Errors
    ///
    /// Returns [`SentimentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, SentimentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// Scores `texts` as a single team, returning one value in [-1, 1] per
    /// input text, in input order.
    ///
    /// An empty `texts` slice short-circuits to `Ok(vec![])` without an RPC
    /// call. Out-of-range values from the service are clamped rather than
    /// rejected.
    ///
    /// # Errors
    ///
    /// - [`SentimentError::Http`] — network or timeout failure.
    /// - [`SentimentError::UnexpectedStatus`] — non-2xx response.
    /// - [`SentimentError::MalformedResponse`] — body is not the fixed
    ///   `{"sentiment": [[f64]]}` schema, or the team array is missing.
    /// - [`SentimentError::LengthMismatch`] — the team array does not have
    ///   exactly one score per input text; never silently truncated.
    pub async fn score(
        &self,
        brand: Option<&str>,
        title: Option<&str>,
        texts: &[String],
    ) -> Result<Vec<f64>, SentimentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let query = SentimentQuery {
            teams: vec![Team {
                brand,
                title,
                texts,
            }],
        };

        let response = self.client.post(&self.url).json(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SentimentError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        let parsed: SentimentResponse =
            response
                .json()
                .await
                .map_err(|e| SentimentError::MalformedResponse {
                    reason: e.to_string(),
                })?;

        // One team in, one team out.
        let mut arrays = parsed.sentiment;
        if arrays.len() != 1 {
            return Err(SentimentError::MalformedResponse {
                reason: format!("expected 1 team array, got {}", arrays.len()),
            });
        }
        let scores = arrays.remove(0);

        if scores.len() != texts.len() {
            return Err(SentimentError::LengthMismatch {
                sent: texts.len(),
                got: scores.len(),
            });
        }

        Ok(scores.into_iter().map(|s| s.clamp(-1.0, 1.0)).collect())
    }
}
