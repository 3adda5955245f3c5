use std::{sync::Arc, time::Duration};

use crate::{
    crawler::{render::Renderer, yahoo::quote::QuoteExtractor},
    database::{store::QuoteStore, table::quote_record::QuoteRecord},
    error::QuoteError,
    logging,
};

/// 頁面渲染
pub mod render;
/// 雅虎財經
pub mod yahoo;

/// 一次送出最多可查詢的股票代號數
pub const MAX_TICKERS_PER_BATCH: usize = 5;

/// 單一股票代號的處理結果
#[derive(Debug)]
pub struct TickerOutcome {
    pub ticker: String,
    pub result: Result<QuoteRecord, QuoteError>,
}

/// 渲染 → 擷取 → 寫入 的報價採集流程
///
/// 渲染器與資料庫都由外部注入，方便測試替換。
#[derive(Clone)]
pub struct QuoteCrawler {
    renderer: Arc<dyn Renderer>,
    store: Arc<dyn QuoteStore>,
    extractor: QuoteExtractor,
    timeout: Duration,
}

impl QuoteCrawler {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        store: Arc<dyn QuoteStore>,
        extractor: QuoteExtractor,
        timeout: Duration,
    ) -> Self {
        QuoteCrawler {
            renderer,
            store,
            extractor,
            timeout,
        }
    }

    pub fn store(&self) -> &Arc<dyn QuoteStore> {
        &self.store
    }

    /// 抓取一檔股票的報價並寫入資料庫
    ///
    /// 任何一個階段失敗都不會寫入資料，也不會重試。
    pub async fn visit(&self, ticker: &str) -> Result<QuoteRecord, QuoteError> {
        let ticker = ticker.trim();
        let markup = self.renderer.render(ticker, self.timeout).await?;
        logging::debug_file_async(format!("rendered {} bytes for {}", markup.len(), ticker));
        let record = self.extractor.extract(&markup)?;
        let stored = self.store.save(&record).await?;

        Ok(stored)
    }

    /// 依序處理多檔股票，單一檔失敗不影響其他檔
    ///
    /// 空白代號會被忽略，最多處理前 `MAX_TICKERS_PER_BATCH` 檔。
    pub async fn visit_batch(&self, tickers: &[String]) -> Vec<TickerOutcome> {
        let tickers = normalize_tickers(tickers);
        let mut outcomes = Vec::with_capacity(tickers.len());

        for ticker in tickers {
            let result = self.visit(&ticker).await;
            if let Err(why) = &result {
                logging::error_file_async(format!(
                    "Failed to visit quote of {} because {:?}",
                    ticker, why
                ));
            }
            outcomes.push(TickerOutcome { ticker, result });
        }

        outcomes
    }
}

/// 去除空白代號並限制數量
pub fn normalize_tickers(tickers: &[String]) -> Vec<String> {
    tickers
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(MAX_TICKERS_PER_BATCH)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::{
        crawler::yahoo::quote::tests::{quote_page, ITEMS},
        database::store::MemoryQuoteStore,
        error::{ExtractionError, RenderError},
    };

    /// 依股票代號回傳固定 HTML；沒有登錄的代號視為等待逾時
    pub(crate) struct FakeRenderer {
        pages: HashMap<String, String>,
    }

    impl FakeRenderer {
        pub(crate) fn new(pages: &[(&str, String)]) -> Self {
            FakeRenderer {
                pages: pages
                    .iter()
                    .map(|(t, p)| (t.to_string(), p.clone()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl Renderer for FakeRenderer {
        async fn render(&self, ticker: &str, timeout: Duration) -> Result<String, RenderError> {
            self.pages
                .get(ticker)
                .cloned()
                .ok_or_else(|| RenderError::Timeout {
                    ticker: ticker.to_string(),
                    waited: timeout,
                })
        }
    }

    pub(crate) fn crawler(pages: &[(&str, String)]) -> QuoteCrawler {
        QuoteCrawler::new(
            Arc::new(FakeRenderer::new(pages)),
            Arc::new(MemoryQuoteStore::new()),
            QuoteExtractor::default(),
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn test_visit_saves_record() {
        let crawler = crawler(&[(
            "2330",
            quote_page("C($c-trend-up)", "C($c-trend-down)", &ITEMS),
        )]);

        let stored = crawler.visit(" 2330 ").await.unwrap();
        assert_eq!(stored.final_price, "123.45");
        assert_eq!(stored.change, "+1.20");
        assert_eq!(stored.change_rate, "-2.5%");
        assert!(stored.persisted_at.is_some());

        let all = crawler.store().query_all().await.unwrap();
        assert_eq!(all, vec![stored]);
    }

    #[tokio::test]
    async fn test_timeout_persists_nothing() {
        let crawler = crawler(&[]);

        let result = crawler.visit("9999").await;
        assert!(matches!(
            result,
            Err(QuoteError::Render(RenderError::Timeout { .. }))
        ));
        assert!(crawler.store().query_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_persists_nothing() {
        let crawler = crawler(&[("2330", quote_page("", "", &ITEMS[..4]))]);

        let result = crawler.visit("2330").await;
        assert!(matches!(
            result,
            Err(QuoteError::Extraction(ExtractionError::MissingField { .. }))
        ));
        assert!(crawler.store().query_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_continues_after_failure() {
        let page = quote_page("C($c-trend-up)", "C($c-trend-up)", &ITEMS);
        let crawler = crawler(&[("2330", page.clone()), ("2317", page)]);
        let tickers = ["2330", "", "9999", "  ", "2317"]
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();

        let outcomes = crawler.visit_batch(&tickers).await;

        assert_eq!(
            outcomes.iter().map(|o| o.ticker.as_str()).collect::<Vec<_>>(),
            vec!["2330", "9999", "2317"]
        );
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[1].result.is_err());
        assert!(outcomes[2].result.is_ok());
        assert_eq!(crawler.store().query_all().await.unwrap().len(), 2);
    }

    #[test]
    fn test_normalize_tickers() {
        let tickers = ["1", " 2 ", "", "3", "4", "5", "6"]
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>();

        assert_eq!(normalize_tickers(&tickers), vec!["1", "2", "3", "4", "5"]);
    }
}
