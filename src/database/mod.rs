use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::{
    error::{StorageContext, StorageError},
    logging,
};

pub mod store;
pub mod table;

/// 記憶體資料庫的連線字串，測試用
pub const IN_MEMORY: &str = "sqlite::memory:";

/// 建立 SQLite 連線池
///
/// `path` 可以是檔案路徑或 `sqlite:` 開頭的連線字串；檔案不存在時自動建立。
/// 連線數固定為 1，所有寫入都經由同一條連線依序執行。
///
/// # Errors
/// 連線字串無效或無法開啟資料庫檔案時回傳錯誤。
pub async fn connect(path: &str) -> Result<SqlitePool, StorageError> {
    let options = if path.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(path)
            .storage_context(format!("wrong database URL {}", path))?
    } else {
        SqliteConnectOptions::new().filename(path)
    }
    .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        // 記憶體資料庫的內容跟著連線走，連線不能被回收
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .storage_context(format!("Failed to open database {}", path))?;

    logging::info_file_async(format!("database opened: {}", path));

    Ok(pool)
}

/// 建立資料表（已存在則略過）
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    sqlx::query(table::quote_record::CREATE_TABLE)
        .execute(pool)
        .await
        .storage_context("Failed to create table quote_record")?;

    Ok(())
}
