use std::fmt::Write as _;

use crate::{
    crawler::MAX_TICKERS_PER_BATCH, database::table::quote_record::QuoteRecord,
    error::QuoteError, util::text::escape_html,
};

const HEADERS: [&str; 12] = [
    "代號", "名稱", "成交量", "成交", "開盤", "最高", "最低", "昨收", "漲跌", "漲跌幅", "報價時間",
    "寫入時間",
];

/// 產生查詢表單、錯誤清單與報價表格
pub fn page(records: &[QuoteRecord], failures: &[(String, QuoteError)]) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="zh-Hant">
<head>
<meta charset="utf-8">
<title>股票報價</title>
<style>
table { border-collapse: collapse; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: right; }
.up { color: #e0241b; }
.down { color: #009e3c; }
.error { color: #b00020; }
</style>
</head>
<body>
<form method="post" action="/">
"#,
    );

    for i in 1..=MAX_TICKERS_PER_BATCH {
        let _ = writeln!(
            html,
            r#"<input type="text" name="stock_code_{i}" placeholder="股票代號 {i}">"#,
            i = i
        );
    }
    html.push_str("<button type=\"submit\">查詢</button>\n</form>\n");

    if !failures.is_empty() {
        html.push_str("<ul class=\"error\">\n");
        for (ticker, why) in failures {
            let _ = writeln!(
                html,
                "<li>{} [{}] {}</li>",
                escape_html(ticker),
                why.kind(),
                escape_html(&why.to_string())
            );
        }
        html.push_str("</ul>\n");
    }

    html.push_str("<table>\n<tr>");
    for header in HEADERS {
        let _ = write!(html, "<th>{}</th>", header);
    }
    html.push_str("</tr>\n");

    for record in records {
        html.push_str(&row(record));
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn row(record: &QuoteRecord) -> String {
    let persisted_at = record
        .persisted_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    let cells = [
        record.ticker_code.as_str(),
        record.company_name.as_str(),
        record.volume.as_str(),
        record.final_price.as_str(),
        record.open_price.as_str(),
        record.high_price.as_str(),
        record.low_price.as_str(),
        record.prior_close_price.as_str(),
    ];

    let mut tr = String::from("<tr>");
    for cell in cells {
        let _ = write!(tr, "<td>{}</td>", escape_html(cell));
    }
    for signed in [record.change.as_str(), record.change_rate.as_str()] {
        let _ = write!(
            tr,
            r#"<td class="{}">{}</td>"#,
            trend_class(signed),
            escape_html(signed)
        );
    }
    let _ = writeln!(
        tr,
        "<td>{}</td><td>{}</td></tr>",
        escape_html(&record.quote_timestamp),
        persisted_at
    );

    tr
}

fn trend_class(signed: &str) -> &'static str {
    if signed.starts_with('+') {
        "up"
    } else if signed.starts_with('-') {
        "down"
    } else {
        "flat"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::error::RenderError;

    #[test]
    fn test_page_escapes_text() {
        let record = QuoteRecord {
            ticker_code: "<2330>".to_string(),
            company_name: "A&B".to_string(),
            change: "+1.20".to_string(),
            change_rate: "-2.5%".to_string(),
            ..Default::default()
        };
        let failures = vec![(
            "<script>".to_string(),
            QuoteError::from(RenderError::Timeout {
                ticker: "<script>".to_string(),
                waited: Duration::from_secs(10),
            }),
        )];

        let html = page(&[record], &failures);

        assert!(html.contains("&lt;2330&gt;"));
        assert!(html.contains("A&amp;B"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"<td class="up">+1.20</td>"#));
        assert!(html.contains(r#"<td class="down">-2.5%</td>"#));
        assert!(html.contains("[timeout]"));
    }

    #[test]
    fn test_trend_class() {
        assert_eq!(trend_class("+1.20"), "up");
        assert_eq!(trend_class("-1.20"), "down");
        assert_eq!(trend_class("0.00"), "flat");
    }
}
