use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Network or HTTP failure talking to the game backend.
    #[error("backend request failed: {0}")]
    Backend(anyhow::Error),

    /// The backend answered, but not with a recognizable event payload.
    #[error("malformed event payload: {reason}")]
    MalformedPayload { reason: String },

    /// `resolve` was called while no event was pending.
    #[error("no event is pending")]
    NoPendingEvent,

    /// Save slot could not be read or written. Always non-fatal.
    #[error("persistence failure: {0}")]
    Persistence(anyhow::Error),
}
