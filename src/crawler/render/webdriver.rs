use std::time::Duration;

use async_trait::async_trait;
use fantoccini::{error::CmdError, wd::Capabilities, Client, ClientBuilder, Locator};
use serde_json::json;

use crate::{
    crawler::{
        render::Renderer,
        yahoo::{self, quote::ROOT_ID},
    },
    error::RenderError,
    logging,
};

/// 透過 WebDriver（例如 chromedriver）開啟瀏覽器取得執行過前端腳本的頁面
///
/// 每個股票代號各開一個 session，取完原始碼後一律關閉。
pub struct WebDriverRenderer {
    webdriver_url: String,
    headless: bool,
}

impl WebDriverRenderer {
    pub fn new(webdriver_url: String, headless: bool) -> Self {
        WebDriverRenderer {
            webdriver_url,
            headless,
        }
    }

    fn capabilities(&self) -> Capabilities {
        let mut args = vec!["--disable-gpu", "--no-sandbox"];
        if self.headless {
            args.push("--headless");
        }

        let mut caps = Capabilities::new();
        caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
        caps
    }

    async fn connect(&self) -> Result<Client, RenderError> {
        ClientBuilder::native()
            .capabilities(self.capabilities())
            .connect(&self.webdriver_url)
            .await
            .map_err(|why| {
                RenderError::Session(format!(
                    "Failed to connect to {} because {:?}",
                    self.webdriver_url, why
                ))
            })
    }

    async fn page_source(
        client: &Client,
        ticker: &str,
        url: &str,
        timeout: Duration,
    ) -> Result<String, RenderError> {
        client
            .goto(url)
            .await
            .map_err(|why| RenderError::Session(format!("Failed to goto {} because {:?}", url, why)))?;

        match client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Id(ROOT_ID))
            .await
        {
            Ok(_) => {}
            Err(CmdError::WaitTimeout) => {
                return Err(RenderError::Timeout {
                    ticker: ticker.to_string(),
                    waited: timeout,
                })
            }
            Err(why) => {
                return Err(RenderError::Session(format!(
                    "Failed to wait for #{} because {:?}",
                    ROOT_ID, why
                )))
            }
        }

        client
            .source()
            .await
            .map_err(|why| RenderError::Session(format!("Failed to read page source because {:?}", why)))
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn render(&self, ticker: &str, timeout: Duration) -> Result<String, RenderError> {
        let url = yahoo::quote_url(ticker);
        logging::info_file_async(format!("visit url:{}", url));

        let client = self.connect().await?;
        let source = Self::page_source(&client, ticker, &url, timeout).await;

        if let Err(why) = client.close().await {
            logging::warn_file_async(format!("Failed to close webdriver session because {:?}", why));
        }

        source
    }
}
