//! # Yahoo 奇摩股市採集模組
//!
//! 報價頁的數值大多只靠版面樣式區分：欄位依清單中的位置取得，
//! 漲跌方向則由標記元素上的 class 判讀。
//!
//! ## 站點資訊
//!
//! - 來源域名：`tw.stock.yahoo.com`
//! - 抓取技術：渲染後的 HTML 搭配 CSS Selector 解析。

/// 報價頁擷取子模組
pub mod quote;

/// Yahoo 財經台灣站的主機域名
pub const HOST: &str = "tw.stock.yahoo.com";

/// 報價頁網址
pub fn quote_url(ticker: &str) -> String {
    quote_url_at(&format!("https://{}", HOST), ticker)
}

/// 以 `base_url`（不含結尾斜線）組出報價頁網址
pub fn quote_url_at(base_url: &str, ticker: &str) -> String {
    format!(
        "{base}/quote/{symbol}",
        base = base_url.trim_end_matches('/'),
        symbol = urlencoding::encode(ticker)
    )
}
