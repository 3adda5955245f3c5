//! 報價紀錄的儲存介面
//!
//! 以 `QuoteStore` trait 注入到流程與前端，正式環境使用 `SqliteQuoteStore`，
//! 測試可換成 `MemoryQuoteStore`。兩者都是只新增、不更新的紀錄檔。
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tokio::sync::OnceCell;

use crate::{
    database::{self, table::quote_record::QuoteRecord},
    error::StorageError,
    logging,
    util::datetime::MonotonicClock,
};

#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// 新增一筆紀錄，回傳帶有 `id` 與 `persisted_at` 的儲存結果
    ///
    /// `persisted_at` 已有值時沿用，否則取寫入當下的時間。傳入的紀錄不會被修改。
    async fn save(&self, record: &QuoteRecord) -> Result<QuoteRecord, StorageError>;

    /// 依寫入順序回傳全部紀錄
    async fn query_all(&self) -> Result<Vec<QuoteRecord>, StorageError>;
}

/// 以 SQLite 檔案保存的紀錄
pub struct SqliteQuoteStore {
    pool: SqlitePool,
    clock: MonotonicClock,
    schema: OnceCell<()>,
}

impl SqliteQuoteStore {
    /// 包裝既有的連線池，資料表在第一次使用前建立
    pub fn new(pool: SqlitePool) -> Self {
        SqliteQuoteStore {
            pool,
            clock: MonotonicClock::new(),
            schema: OnceCell::new(),
        }
    }

    /// 開啟資料庫並立即建立資料表
    pub async fn open(path: &str) -> Result<Self, StorageError> {
        let store = Self::new(database::connect(path).await?);
        store.ready().await?;
        Ok(store)
    }

    /// 關閉連線池，行程結束前呼叫
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn ready(&self) -> Result<(), StorageError> {
        self.schema
            .get_or_try_init(|| database::ensure_schema(&self.pool))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl QuoteStore for SqliteQuoteStore {
    async fn save(&self, record: &QuoteRecord) -> Result<QuoteRecord, StorageError> {
        self.ready().await?;

        let persisted_at = record.persisted_at.unwrap_or_else(|| self.clock.now());
        let id = record.insert(&self.pool, persisted_at).await?;

        logging::info_file_async(format!(
            "saved quote #{} {} {} {}",
            id, record.ticker_code, record.final_price, record.change
        ));

        Ok(QuoteRecord {
            id: Some(id),
            persisted_at: Some(persisted_at),
            ..record.clone()
        })
    }

    async fn query_all(&self) -> Result<Vec<QuoteRecord>, StorageError> {
        self.ready().await?;
        QuoteRecord::fetch_all(&self.pool).await
    }
}

/// 存在記憶體中的紀錄，行程結束即消失
#[derive(Default)]
pub struct MemoryQuoteStore {
    records: Mutex<Vec<QuoteRecord>>,
    clock: MonotonicClock,
}

impl MemoryQuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> std::sync::MutexGuard<'_, Vec<QuoteRecord>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl QuoteStore for MemoryQuoteStore {
    async fn save(&self, record: &QuoteRecord) -> Result<QuoteRecord, StorageError> {
        let persisted_at = record.persisted_at.unwrap_or_else(|| self.clock.now());
        let mut records = self.records();
        let stored = QuoteRecord {
            id: Some(records.len() as i64 + 1),
            persisted_at: Some(persisted_at),
            ..record.clone()
        };
        records.push(stored.clone());

        Ok(stored)
    }

    async fn query_all(&self) -> Result<Vec<QuoteRecord>, StorageError> {
        Ok(self.records().clone())
    }
}
