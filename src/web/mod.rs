//! 表單前端
//!
//! - `GET /`：全部歷史紀錄
//! - `POST /`：送出最多五個股票代號，即時抓取並顯示結果
//! - `GET /api/quotes`：以 JSON 回傳全部歷史紀錄
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use serde::Deserialize;

use crate::{
    crawler::{QuoteCrawler, MAX_TICKERS_PER_BATCH},
    logging,
};

pub mod view;

/// 查詢表單，空白欄位會被忽略
#[derive(Deserialize, Debug, Default)]
pub struct QuoteForm {
    #[serde(default)]
    pub stock_code_1: String,
    #[serde(default)]
    pub stock_code_2: String,
    #[serde(default)]
    pub stock_code_3: String,
    #[serde(default)]
    pub stock_code_4: String,
    #[serde(default)]
    pub stock_code_5: String,
}

impl QuoteForm {
    pub fn tickers(&self) -> Vec<String> {
        let codes: [&String; MAX_TICKERS_PER_BATCH] = [
            &self.stock_code_1,
            &self.stock_code_2,
            &self.stock_code_3,
            &self.stock_code_4,
            &self.stock_code_5,
        ];
        codes.into_iter().cloned().collect()
    }
}

pub fn router(crawler: QuoteCrawler) -> Router {
    Router::new()
        .route("/", get(history).post(submit))
        .route("/api/quotes", get(history_json))
        .with_state(crawler)
}

async fn history(State(crawler): State<QuoteCrawler>) -> Response {
    match crawler.store().query_all().await {
        Ok(records) => Html(view::page(&records, &[])).into_response(),
        Err(why) => storage_failure(why),
    }
}

async fn submit(State(crawler): State<QuoteCrawler>, Form(form): Form<QuoteForm>) -> Response {
    let outcomes = crawler.visit_batch(&form.tickers()).await;
    let mut records = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(record) => records.push(record),
            Err(why) => failures.push((outcome.ticker, why)),
        }
    }

    Html(view::page(&records, &failures)).into_response()
}

async fn history_json(State(crawler): State<QuoteCrawler>) -> Response {
    match crawler.store().query_all().await {
        Ok(records) => Json(records).into_response(),
        Err(why) => storage_failure(why),
    }
}

fn storage_failure(why: crate::error::StorageError) -> Response {
    logging::error_file_async(format!("Failed to query_all because {:?}", why));
    (StatusCode::INTERNAL_SERVER_ERROR, why.to_string()).into_response()
}
