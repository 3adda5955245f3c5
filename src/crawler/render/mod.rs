use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{config, declare::RendererKind, error::RenderError};

/// WebDriver 無頭瀏覽器
pub mod webdriver;
/// 純 HTTP 取頁
pub mod http;

/// 取得渲染後的報價頁 HTML
///
/// 實作只等待一次：根區塊在 `timeout` 內沒有出現就回傳 `RenderError::Timeout`，
/// 不做重試。
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, ticker: &str, timeout: Duration) -> Result<String, RenderError>;
}

/// 依設定建立渲染器
pub fn from_config(settings: &config::Renderer) -> Arc<dyn Renderer> {
    match settings.kind {
        RendererKind::WebDriver => Arc::new(webdriver::WebDriverRenderer::new(
            settings.webdriver_url.clone(),
            settings.headless,
        )),
        RendererKind::Http => Arc::new(http::HttpRenderer::new()),
    }
}
