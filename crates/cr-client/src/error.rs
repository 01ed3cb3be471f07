use thiserror::Error;

/// Errors surfaced by transport and store implementations.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not found")]
    NotFound,

    #[error("HTTP {0}")]
    Http(u16),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    BadResponse(String),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound)
    }

    /// Transient failures are worth one retry; everything else is definitive.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout | TransportError::Network(_)
        )
    }
}
