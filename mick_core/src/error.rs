use thiserror::Error;

/// Any failure surfaced by a completion call.
///
/// The `Display` output is what ends up in front of the user, so each
/// variant renders a short human-readable description.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    pub fn transport<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(err))
    }
}
