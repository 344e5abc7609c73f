//! Browser capability consumed by the engine.
//!
//! The engine drives a single page through this trait and knows nothing about
//! how the page is rendered. Locator interpretation (CSS query, visible-text
//! scan, attribute match) is the backend's job so the engine stays free of
//! DOM concerns.

use async_trait::async_trait;
pub use boletin_core::error::BackendError;
use boletin_core::strategy::Locator;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

#[async_trait]
pub trait Backend: Send + Sync {
    /// Launch the backend (start browser, open the working page).
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close the backend and clean up resources.
    async fn close(&mut self) -> Result<(), BackendError>;

    /// Whether the backend is ready to accept commands.
    async fn is_ready(&self) -> bool;

    /// Navigate to a URL and wait for the page to settle.
    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Current page URL.
    async fn current_url(&mut self) -> Result<String, BackendError>;

    /// Wait for the next navigation / DOM load to settle, bounded.
    async fn wait_for_navigation(
        &mut self,
        timeout: Duration,
    ) -> Result<NavigationResult, BackendError>;

    /// One visibility probe against the current page state. Bounded waiting
    /// is the resolver's responsibility, not the backend's.
    async fn is_visible(&mut self, locator: &Locator) -> Result<bool, BackendError>;

    async fn click(&mut self, locator: &Locator) -> Result<(), BackendError>;

    async fn hover(&mut self, locator: &Locator) -> Result<(), BackendError>;

    /// Clear the field and type `text`, pausing `char_delay` between
    /// characters when non-zero.
    async fn fill(
        &mut self,
        locator: &Locator,
        text: &str,
        char_delay: Duration,
    ) -> Result<(), BackendError>;

    /// Evaluate a script in the page context.
    async fn evaluate(&mut self, _script: &str) -> Result<serde_json::Value, BackendError> {
        Err(BackendError::NotSupported("evaluate".into()))
    }

    /// Capture a screenshot, full-page when requested.
    async fn screenshot(&mut self, full_page: bool) -> Result<Vec<u8>, BackendError>;

    /// Render the current page to PDF.
    async fn pdf(&mut self) -> Result<Vec<u8>, BackendError> {
        Err(BackendError::NotSupported("pdf".into()))
    }

    /// Extract the cell text grid (`tr` × `td`, trimmed inner text) of the
    /// first table matching `locator`. Errors when no table matches.
    async fn table_text(&mut self, locator: &Locator) -> Result<Vec<Vec<String>>, BackendError>;
}
