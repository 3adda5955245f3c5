use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::{StorageContext, StorageError};

/// 一次報價觀測
///
/// 價格與成交量皆保留頁面上的原始文字，不做數值轉換。
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    /// 由資料庫指派
    pub id: Option<i64>,
    /// 股票代號
    pub ticker_code: String,
    /// 公司名稱
    pub company_name: String,
    /// 成交量（含單位與千分位）
    pub volume: String,
    /// 成交價
    pub final_price: String,
    /// 開盤價
    pub open_price: String,
    /// 最高價
    pub high_price: String,
    /// 最低價
    pub low_price: String,
    /// 昨收
    pub prior_close_price: String,
    /// 漲跌，前綴 `+`、`-` 或無
    pub change: String,
    /// 漲跌幅，正負號規則同 `change`
    pub change_rate: String,
    /// 頁面顯示的報價時間，原樣保留
    pub quote_timestamp: String,
    /// 寫入時間，由資料庫層指派
    pub persisted_at: Option<DateTime<Local>>,
}

pub(crate) const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS quote_record (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    ticker_code       TEXT NOT NULL,
    company_name      TEXT NOT NULL,
    volume            TEXT NOT NULL,
    final_price       TEXT NOT NULL,
    open_price        TEXT NOT NULL,
    high_price        TEXT NOT NULL,
    low_price         TEXT NOT NULL,
    prior_close_price TEXT NOT NULL,
    change            TEXT NOT NULL,
    change_rate       TEXT NOT NULL,
    quote_timestamp   TEXT NOT NULL,
    persisted_at      TEXT NOT NULL
)"#;

impl QuoteRecord {
    /// 除了資料庫指派的欄位（`id`、`persisted_at`）之外是否相同
    pub fn same_observation(&self, other: &QuoteRecord) -> bool {
        QuoteRecord {
            id: None,
            persisted_at: None,
            ..self.clone()
        } == QuoteRecord {
            id: None,
            persisted_at: None,
            ..other.clone()
        }
    }

    /// 取得所有報價紀錄，依寫入順序排列
    pub async fn fetch_all(pool: &SqlitePool) -> Result<Vec<QuoteRecord>, StorageError> {
        sqlx::query_as::<_, QuoteRecord>(
            r#"
SELECT
    id,
    ticker_code,
    company_name,
    volume,
    final_price,
    open_price,
    high_price,
    low_price,
    prior_close_price,
    change,
    change_rate,
    quote_timestamp,
    persisted_at
FROM
    quote_record
ORDER BY
    id
"#,
        )
        .fetch_all(pool)
        .await
        .storage_context("Failed to QuoteRecord::fetch_all from database")
    }

    /// 新增一筆紀錄，回傳資料庫指派的 id
    ///
    /// 永遠是新增，不會依股票代號覆蓋既有資料。
    pub async fn insert(
        &self,
        pool: &SqlitePool,
        persisted_at: DateTime<Local>,
    ) -> Result<i64, StorageError> {
        let sql = r#"
INSERT INTO
    quote_record (
        ticker_code,
        company_name,
        volume,
        final_price,
        open_price,
        high_price,
        low_price,
        prior_close_price,
        change,
        change_rate,
        quote_timestamp,
        persisted_at
    )
VALUES
    (
      $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12
    )
"#;
        let result = sqlx::query(sql)
            .bind(self.ticker_code.as_str())
            .bind(self.company_name.as_str())
            .bind(self.volume.as_str())
            .bind(self.final_price.as_str())
            .bind(self.open_price.as_str())
            .bind(self.high_price.as_str())
            .bind(self.low_price.as_str())
            .bind(self.prior_close_price.as_str())
            .bind(self.change.as_str())
            .bind(self.change_rate.as_str())
            .bind(self.quote_timestamp.as_str())
            .bind(persisted_at)
            .execute(pool)
            .await
            .storage_context(format!("Failed to insert({:#?}) into database", self))?;

        Ok(result.last_insert_rowid())
    }
}
