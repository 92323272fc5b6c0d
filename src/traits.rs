use async_trait::async_trait;

use crate::error::FetchError;

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Browser initialization
    async fn initialize(&mut self) -> Result<(), FetchError>;

    /// Navigate to the URL and return the fully rendered markup
    async fn render(&mut self, url: &str) -> Result<String, FetchError>;

    /// Release the browser session
    async fn close(&mut self) -> Result<(), FetchError>;

    /// Single-shot fetch (initialize → render → close). The session is
    /// released on the failure path as well.
    async fn fetch(&mut self, url: &str) -> Result<String, FetchError> {
        self.initialize().await?;
        let markup = self.render(url).await;
        self.close().await?;
        markup
    }
}
