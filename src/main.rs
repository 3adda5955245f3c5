pub mod config;
pub mod crawler;
pub mod database;
pub mod declare;
pub mod error;
pub mod logging;
pub mod util;
pub mod web;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};

use crate::{
    crawler::{render, yahoo::quote::QuoteExtractor, QuoteCrawler},
    database::store::SqliteQuoteStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let settings = crate::config::App::load()?;
    let store = Arc::new(SqliteQuoteStore::open(&settings.sqlite.path).await?);
    let crawler = QuoteCrawler::new(
        render::from_config(&settings.renderer),
        store.clone(),
        QuoteExtractor::new(settings.extraction.strict_sign),
        Duration::from_secs(settings.renderer.timeout_secs),
    );

    let addr = settings.web.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    logging::info_console(format!(
        "listening on http://{} (renderer: {}, database: {})",
        addr, settings.renderer.kind, settings.sqlite.path
    ));
    logging::info_file_async(format!("start with {:?}", settings));

    axum::serve(listener, web::router(crawler))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("web server stopped unexpectedly")?;

    store.close().await;
    logging::info_console("bye".to_string());

    Ok(())
}

async fn shutdown_signal() {
    if let Err(why) = tokio::signal::ctrl_c().await {
        logging::error_console(format!("Failed to listen for ctrl-c because {:?}", why));
        std::future::pending::<()>().await;
    }
}
