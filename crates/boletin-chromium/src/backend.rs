//! `Backend` implementation over a Chromium page.
//!
//! Element interaction goes through in-page probe scripts (`js` module) so a
//! single code path serves CSS, text and attribute locators; navigation and
//! capture use the native CDP commands.

use crate::cdp::CdpClient;
use crate::js;
use async_trait::async_trait;
use boletin_core::strategy::Locator;
use boletin_engine::backend::{Backend, BackendError, NavigationResult};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, PrintToPdfParams};
use chromiumoxide::page::ScreenshotParams;
use std::time::Duration;
use tracing::info;

pub struct ChromiumBackend {
    client: Option<CdpClient>,
    visible: bool,
}

impl ChromiumBackend {
    pub fn new() -> Self {
        Self {
            client: None,
            visible: false,
        }
    }

    pub fn new_with_visibility(visible: bool) -> Self {
        Self {
            client: None,
            visible,
        }
    }

    fn client(&self) -> Result<&CdpClient, BackendError> {
        self.client.as_ref().ok_or(BackendError::NotReady)
    }

    async fn eval(&self, script: &str) -> Result<serde_json::Value, BackendError> {
        let client = self.client()?;
        let result = client
            .page
            .evaluate(script)
            .await
            .map_err(|e| BackendError::Evaluation(e.to_string()))?;
        Ok(result.into_value().unwrap_or(serde_json::Value::Null))
    }

    async fn eval_action(&self, script: &str, what: &str) -> Result<(), BackendError> {
        match self.eval(script).await?.as_bool() {
            Some(true) => Ok(()),
            _ => Err(BackendError::Evaluation(format!(
                "{} failed: element not interactable",
                what
            ))),
        }
    }

    async fn navigation_result(&self) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;
        let title = client
            .page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = client
            .page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }
}

impl Default for ChromiumBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for ChromiumBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Chromium backend...");
        let client = CdpClient::launch(self.visible)
            .await
            .map_err(|e| BackendError::Other(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        if let Some(client) = self.client.take() {
            client
                .close()
                .await
                .map_err(|e| BackendError::Other(e.to_string()))?;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;
        info!("Navigating to: {}", url);
        client
            .page
            .goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;
        self.navigation_result().await
    }

    async fn current_url(&mut self) -> Result<String, BackendError> {
        let client = self.client()?;
        Ok(client
            .page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default())
    }

    async fn wait_for_navigation(
        &mut self,
        timeout: Duration,
    ) -> Result<NavigationResult, BackendError> {
        let client = self.client()?;
        match tokio::time::timeout(timeout, client.page.wait_for_navigation()).await {
            Ok(Ok(_)) => self.navigation_result().await,
            Ok(Err(e)) => Err(BackendError::Navigation(e.to_string())),
            Err(_) => Err(BackendError::Navigation(format!(
                "no navigation within {:?}",
                timeout
            ))),
        }
    }

    async fn is_visible(&mut self, locator: &Locator) -> Result<bool, BackendError> {
        Ok(self
            .eval(&js::is_visible(locator))
            .await?
            .as_bool()
            .unwrap_or(false))
    }

    async fn click(&mut self, locator: &Locator) -> Result<(), BackendError> {
        self.eval_action(&js::click(locator), "click").await
    }

    async fn hover(&mut self, locator: &Locator) -> Result<(), BackendError> {
        self.eval_action(&js::hover(locator), "hover").await
    }

    async fn fill(
        &mut self,
        locator: &Locator,
        text: &str,
        char_delay: Duration,
    ) -> Result<(), BackendError> {
        let Locator::Css(sel) = locator else {
            return Err(BackendError::NotSupported(
                "fill requires a css locator".into(),
            ));
        };
        self.eval_action(&js::clear(locator), "clear").await?;
        let element = self
            .client()?
            .page
            .find_element(sel.as_str())
            .await
            .map_err(|e| BackendError::Evaluation(e.to_string()))?;
        element
            .focus()
            .await
            .map_err(|e| BackendError::Evaluation(e.to_string()))?;
        if char_delay.is_zero() {
            element
                .type_str(text)
                .await
                .map_err(|e| BackendError::Evaluation(e.to_string()))?;
        } else {
            let mut buf = [0u8; 4];
            for ch in text.chars() {
                element
                    .type_str(ch.encode_utf8(&mut buf))
                    .await
                    .map_err(|e| BackendError::Evaluation(e.to_string()))?;
                tokio::time::sleep(char_delay).await;
            }
        }
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<serde_json::Value, BackendError> {
        self.eval(script).await
    }

    async fn screenshot(&mut self, full_page: bool) -> Result<Vec<u8>, BackendError> {
        let client = self.client()?;
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(full_page)
            .build();
        client
            .page
            .screenshot(params)
            .await
            .map_err(|e| BackendError::Capture(e.to_string()))
    }

    async fn pdf(&mut self) -> Result<Vec<u8>, BackendError> {
        let client = self.client()?;
        let params = PrintToPdfParams {
            print_background: Some(true),
            ..Default::default()
        };
        client
            .page
            .pdf(params)
            .await
            .map_err(|e| BackendError::Capture(e.to_string()))
    }

    async fn table_text(&mut self, locator: &Locator) -> Result<Vec<Vec<String>>, BackendError> {
        let value = self.eval(&js::table_text(locator)).await?;
        if value.is_null() {
            return Err(BackendError::Evaluation(format!(
                "no table matched {}",
                locator
            )));
        }
        Ok(serde_json::from_value(value)?)
    }
}
