pub mod element;

use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use reqwest::Client;

use crate::logging;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

/// 以桌面版瀏覽器身分請求，避免站方回傳精簡版頁面
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
fn get_client() -> Result<&'static Client, reqwest::Error> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
    })
}

/// Performs an HTTP GET request and returns the response as text.
///
/// No retry is attempted; the caller owns the wait policy.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
pub async fn get(url: &str) -> Result<String, reqwest::Error> {
    let rb = get_client()?.get(url);

    let start = Instant::now();
    let res = rb.send().await.and_then(|r| r.error_for_status());
    let elapsed = start.elapsed().as_millis();

    match res {
        Ok(response) => {
            logging::info_file_async(format!("GET:{} {} ms", url, elapsed));
            response.text().await
        }
        Err(why) => {
            logging::error_file_async(format!(
                "GET:{} failed because {:?}. {} ms",
                url, why, elapsed
            ));
            Err(why)
        }
    }
}
