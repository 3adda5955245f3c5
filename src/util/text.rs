/// 以字面子字串移除所有 `labels`，再去除前後空白
///
/// 只做字面比對，不使用樣式比對。
///
/// # Example
///
/// ```
/// let s = strip_labels(" 漲跌幅2.5% ", &["漲跌幅"]);
/// assert_eq!(s, "2.5%");
/// ```
pub fn strip_labels(s: &str, labels: &[&str]) -> String {
    labels
        .iter()
        .fold(s.to_string(), |acc, label| acc.replace(label, ""))
        .trim()
        .to_string()
}

/// Escapes the five HTML special characters so the text can be embedded in markup.
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
