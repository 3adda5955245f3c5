use std::time::Duration;

use async_trait::async_trait;
use scraper::Html;

use crate::{
    crawler::{
        render::Renderer,
        yahoo::{self, quote::ROOT_ID},
    },
    error::RenderError,
    logging,
    util::{self, http::element},
};

/// 兩次請求之間的間隔
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 不執行前端腳本，直接取伺服器端輸出的 HTML
///
/// 在 `timeout` 內反覆請求，直到頁面含有根區塊為止。
pub struct HttpRenderer {
    base_url: String,
}

impl Default for HttpRenderer {
    fn default() -> Self {
        HttpRenderer {
            base_url: format!("https://{}", yahoo::HOST),
        }
    }
}

impl HttpRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 改向其他主機取頁，例如本機的鏡像站
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        HttpRenderer {
            base_url: base_url.into(),
        }
    }
}

/// 頁面是否已經含有根區塊
pub(crate) fn has_root(markup: &str) -> bool {
    let document = Html::parse_document(markup);
    element::parse_selector(&format!("#{}", ROOT_ID))
        .map(|selector| document.select(&selector).next().is_some())
        .unwrap_or(false)
}

async fn poll_until_root(url: &str) -> Result<String, RenderError> {
    loop {
        let markup = util::http::get(url).await?;
        if has_root(&markup) {
            return Ok(markup);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&self, ticker: &str, timeout: Duration) -> Result<String, RenderError> {
        let url = yahoo::quote_url_at(&self.base_url, ticker);
        logging::info_file_async(format!("visit url:{}", url));

        match tokio::time::timeout(timeout, poll_until_root(&url)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::Timeout {
                ticker: ticker.to_string(),
                waited: timeout,
            }),
        }
    }
}
