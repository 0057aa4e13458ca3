use async_trait::async_trait;

/// Outbound side of one chat: where replies to the current sender go.
#[async_trait]
pub trait ReplySink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one plain-text message.
    async fn send_text(&self, text: &str) -> Result<(), Self::Error>;

    /// Show that a reply is being prepared. Best effort.
    async fn typing(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
