//! WebDriver session for one chart page.

use std::time::Duration;

use fantoccini::actions::{InputSource, MouseActions, PointerAction};
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::json;

use super::surface::{ChartSession, ChartSurface, SurfaceError};
use crate::config::{BrowserConfig, Offset};
use crate::error::ScrapeError;

/// Input source id for the simulated mouse. Reusing the same id keeps the
/// pointer position across separate action batches.
const POINTER_ID: &str = "mouse";

/// A live browser session. Must be ended with [`ChartSession::close`].
pub struct BrowserSession {
    client: Client,
}

impl BrowserSession {
    /// Starts Chrome through the WebDriver endpoint with the configured
    /// viewport and flags.
    pub async fn connect(config: &BrowserConfig) -> Result<Self, ScrapeError> {
        let mut args = vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-notifications".to_string(),
            format!(
                "--window-size={},{}",
                config.viewport.width, config.viewport.height
            ),
            format!("--user-agent={}", config.user_agent),
        ];
        if config.headless {
            args.insert(0, "--headless=new".to_string());
        }

        let mut caps = serde_json::Map::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        tracing::info!("Connecting to WebDriver at {}", config.webdriver_url);
        let client = ClientBuilder::native()
            .capabilities(caps)
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| ScrapeError::Session(e.to_string()))?;

        let session = Self { client };
        let resized = session
            .client
            .set_window_size(config.viewport.width, config.viewport.height)
            .await;
        if let Err(e) = resized {
            session.close().await;
            return Err(ScrapeError::Session(e.to_string()));
        }
        Ok(session)
    }
}

impl ChartSurface for BrowserSession {
    async fn move_pointer_by(&mut self, dx: i64, dy: i64) -> Result<(), SurfaceError> {
        let actions = MouseActions::new(POINTER_ID.to_string()).then(PointerAction::MoveBy {
            duration: None,
            x: dx,
            y: dy,
        });
        self.client
            .perform_actions(actions)
            .await
            .map_err(|e| SurfaceError::Pointer(e.to_string()))
    }

    async fn screenshot_png(&mut self) -> Result<Vec<u8>, SurfaceError> {
        self.client
            .screenshot()
            .await
            .map_err(|e| SurfaceError::Screenshot(e.to_string()))
    }
}

impl ChartSession for BrowserSession {
    /// Waits for the chart to render after navigation; the pointer is parked
    /// relative to the `chart_element_id` container.
    async fn open_chart(
        &mut self,
        url: &str,
        config: &BrowserConfig,
        start: Offset,
    ) -> Result<(), ScrapeError> {
        let nav_err = |reason: String| ScrapeError::Navigation {
            url: url.to_string(),
            reason,
        };

        tracing::info!("Navigating to {}", url);
        self.client
            .goto(url)
            .await
            .map_err(|e| nav_err(e.to_string()))?;

        tracing::info!("Waiting for initial page load...");
        tokio::time::sleep(Duration::from_millis(config.page_load_wait_ms)).await;

        let element_id = &config.chart_element_id;
        let container = self
            .client
            .find(Locator::Id(element_id))
            .await
            .map_err(|e| nav_err(format!("chart element #{}: {}", element_id, e)))?;

        tracing::info!("Moving to starting position...");
        let park = PointerAction::MoveToElement {
            element: container,
            duration: None,
            x: start.x,
            y: start.y,
        };
        let actions = MouseActions::new(POINTER_ID.to_string()).then(park);
        self.client
            .perform_actions(actions)
            .await
            .map_err(|e| nav_err(format!("initial pointer move: {}", e)))?;

        tokio::time::sleep(Duration::from_millis(config.start_position_wait_ms)).await;
        Ok(())
    }

    async fn close(self) {
        if let Err(e) = self.client.close().await {
            tracing::warn!("Failed to close browser session: {}", e);
        }
    }
}
