// Text generation trait
use async_trait::async_trait;

/// Stateless prompt-in, text-out generation. Each call is an independent
/// session.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
