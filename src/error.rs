//! 報價採集流程的錯誤分類
//!
//! - `RenderError`：頁面渲染階段（等待逾時、瀏覽器 session、HTTP）。
//! - `ExtractionError`：從渲染後的 DOM 取值失敗。
//! - `StorageError`：寫入或讀取 SQLite 失敗。
//!
//! 任一錯誤都只影響單一股票代號，批次中的其他代號照常處理。
use std::time::Duration;

use thiserror::Error;

/// 從渲染後的頁面擷取報價時的失敗原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// 必要的 DOM 區塊不存在
    #[error("required region `{region}` not found in markup")]
    MissingRegion { region: &'static str },

    /// 價格明細清單的項目數不足，無法以固定索引取值
    #[error("price detail item #{index} missing, only {len} item(s) present")]
    MissingField { index: usize, len: usize },

    /// 嚴格模式下漲跌標記無法判讀（兩種 sentinel 都沒出現或同時出現）
    #[error("unrecognized trend sentinel for `{slot}`")]
    UnrecognizedSign { slot: &'static str },

    /// CSS selector 無法解析
    #[error("invalid selector: {0}")]
    Selector(String),
}

/// 頁面渲染失敗
#[derive(Error, Debug)]
pub enum RenderError {
    /// 等待根區塊出現逾時
    #[error("timed out after {waited:?} waiting for quote page of {ticker}")]
    Timeout { ticker: String, waited: Duration },

    /// WebDriver session 建立或操作失敗
    #[error("webdriver session error: {0}")]
    Session(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// 資料庫操作失敗
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("{context}: {source}")]
    Database {
        context: String,
        #[source]
        source: sqlx::Error,
    },
}

/// 替 sqlx 的錯誤補上說明，用法同 `anyhow::Context`
pub trait StorageContext<T> {
    fn storage_context(self, context: impl Into<String>) -> Result<T, StorageError>;
}

impl<T> StorageContext<T> for Result<T, sqlx::Error> {
    fn storage_context(self, context: impl Into<String>) -> Result<T, StorageError> {
        self.map_err(|source| StorageError::Database {
            context: context.into(),
            source,
        })
    }
}

/// 單一股票代號在整條流程中的失敗
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuoteError {
    /// 給前端顯示用的錯誤類別名稱
    pub fn kind(&self) -> &'static str {
        match self {
            QuoteError::Render(RenderError::Timeout { .. }) => "timeout",
            QuoteError::Render(_) => "render",
            QuoteError::Extraction(ExtractionError::MissingRegion { .. }) => "missing_region",
            QuoteError::Extraction(ExtractionError::MissingField { .. }) => "missing_field",
            QuoteError::Extraction(ExtractionError::UnrecognizedSign { .. }) => "unrecognized_sign",
            QuoteError::Extraction(ExtractionError::Selector(_)) => "selector",
            QuoteError::Storage(_) => "storage",
        }
    }
}
