use thiserror::Error;

/// Every variant means "scoring unavailable" to the caller; the split exists
/// so callers can distinguish an unreachable service from a corrupt response
/// when deciding whether a neutral fallback is safe.
#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from scoring service")]
    UnexpectedStatus { status: u16 },

    #[error("malformed scoring response: {reason}")]
    MalformedResponse { reason: String },

    #[error("scoring response length mismatch: sent {sent} texts, got {got} scores")]
    LengthMismatch { sent: usize, got: usize },
}
