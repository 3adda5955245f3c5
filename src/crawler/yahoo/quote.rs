use scraper::{ElementRef, Html};

use crate::{
    database::table::quote_record::QuoteRecord,
    declare::Trend,
    error::ExtractionError,
    util::{
        http::element::{self, element_text},
        text,
    },
};

/// 主要內容區塊的 id，其餘查找都限定在此區塊內
pub const ROOT_ID: &str = "layout-col1";

/// 股票代號：第一個此樣式的 span
const TICKER_CLASSES: &[&str] = &["C($c-icon)", "Fz(24px)", "Mend(20px)"];
/// 成交量所在的群組容器
const VOLUME_GROUP_CLASSES: &[&str] = &[
    "D(f)",
    "Fld(c)",
    "Ai(c)",
    "Fw(b)",
    "Pend(8px)",
    "Bdendc($bd-primary-divider)",
    "Bdends(s)",
    "Bdendw(1px)",
];
/// 成交量數值
const VOLUME_CLASSES: &[&str] = &["Fz(16px)", "C($c-link-text)", "Mb(4px)"];
/// 價格明細清單
const PRICE_DETAIL_LIST_CLASSES: &[&str] = &["D(f)", "Fld(c)", "Flw(w)", "H(192px)", "Mx(-16px)"];
const PRICE_DETAIL_ITEM_CLASSES: &[&str] = &["price-detail-item"];
/// 報價時間
const QUOTE_TIME_CLASSES: &[&str] = &["C(#6e7780)", "Fz(12px)", "Fw(b)"];

/// 漲跌標記元素（class 子字串比對）
const CHANGE_MARKER_SELECTOR: &str = r#"span[class*="Fz(20px) Fw(b) Lh(1.2) Mend(4px) D(f) Ai(c)"]"#;
/// 漲跌幅標記元素（class 子字串比對）
const CHANGE_RATE_MARKER_SELECTOR: &str = r#"span[class*="Jc(fe) Fz(20px) Lh(1.2) Fw(b) D(f) Ai(c)"]"#;

const CHANGE_LABELS: &[&str] = &["漲跌"];
const CHANGE_RATE_LABELS: &[&str] = &["漲跌幅"];
const QUOTE_TIME_LABELS: &[&str] = &["開盤 |", "收盤 |"];

/// 價格明細清單中各欄位的固定位置
///
/// 站方改變清單順序時，欄位會對應錯誤而不會失敗，只能靠數量檢查擋下
/// 清單縮短的情況。
pub struct PriceDetailIndex;

impl PriceDetailIndex {
    /// 成交
    pub const FINAL: usize = 0;
    /// 開盤
    pub const OPEN: usize = 1;
    /// 最高
    pub const HIGH: usize = 2;
    /// 最低
    pub const LOW: usize = 3;
    /// 昨收
    pub const PRIOR_CLOSE: usize = 6;
    /// 漲跌幅
    pub const CHANGE_RATE: usize = 7;
    /// 漲跌
    pub const CHANGE: usize = 8;
    /// 清單至少需要的項目數
    pub const REQUIRED_LEN: usize = 9;

    /// 有對應欄位的索引
    pub const BOUND: [usize; 7] = [
        Self::FINAL,
        Self::OPEN,
        Self::HIGH,
        Self::LOW,
        Self::PRIOR_CLOSE,
        Self::CHANGE_RATE,
        Self::CHANGE,
    ];
}

/// Yahoo 奇摩股市報價頁的擷取器
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteExtractor {
    /// 為 `true` 時，找不到任何漲跌 sentinel 視為錯誤而不是平盤
    pub strict_sign: bool,
}

/// 以預設（寬鬆）規則從渲染後的頁面擷取報價
pub fn extract_quote(markup: &str) -> Result<QuoteRecord, ExtractionError> {
    QuoteExtractor::default().extract(markup)
}

impl QuoteExtractor {
    pub fn new(strict_sign: bool) -> Self {
        QuoteExtractor { strict_sign }
    }

    /// 從渲染後的 HTML 擷取一筆報價
    ///
    /// 純函式，不會產生任何副作用；回傳的紀錄尚未寫入資料庫，
    /// `id` 與 `persisted_at` 皆為 `None`。
    pub fn extract(&self, markup: &str) -> Result<QuoteRecord, ExtractionError> {
        let document = Html::parse_document(markup);
        let root_selector = element::parse_selector(&format!("#{}", ROOT_ID))?;
        let root = document
            .select(&root_selector)
            .next()
            .ok_or(ExtractionError::MissingRegion { region: ROOT_ID })?;

        let ticker_code = required_text(&root, "span", TICKER_CLASSES, "ticker_code")?;

        let heading = element::parse_selector("h1")?;
        let company_name = element::select_first(&root, &heading)
            .map(|e| element_text(&e))
            .ok_or(ExtractionError::MissingRegion {
                region: "company_name",
            })?;

        let volume_group = element::find_by_classes(&root, "div", VOLUME_GROUP_CLASSES)?
            .ok_or(ExtractionError::MissingRegion {
                region: "volume_group",
            })?;
        let volume = required_text(&volume_group, "span", VOLUME_CLASSES, "volume")?;

        let items = price_detail_items(&root)?;
        let item = |index: usize| element_text(&items[index]);

        let change_trend = self.trend(&root, CHANGE_MARKER_SELECTOR, "change")?;
        let change_rate_trend = self.trend(&root, CHANGE_RATE_MARKER_SELECTOR, "change_rate")?;

        let change = text::strip_labels(&item(PriceDetailIndex::CHANGE), CHANGE_LABELS);
        let change_rate =
            text::strip_labels(&item(PriceDetailIndex::CHANGE_RATE), CHANGE_RATE_LABELS);

        let quote_time = required_text(&root, "span", QUOTE_TIME_CLASSES, "quote_timestamp")?;

        Ok(QuoteRecord {
            id: None,
            ticker_code,
            company_name,
            volume,
            final_price: item(PriceDetailIndex::FINAL),
            open_price: item(PriceDetailIndex::OPEN),
            high_price: item(PriceDetailIndex::HIGH),
            low_price: item(PriceDetailIndex::LOW),
            prior_close_price: item(PriceDetailIndex::PRIOR_CLOSE),
            change: change_trend.apply(&change),
            change_rate: change_rate_trend.apply(&change_rate),
            quote_timestamp: text::strip_labels(&quote_time, QUOTE_TIME_LABELS),
            persisted_at: None,
        })
    }

    /// 找出第一個符合標記樣式的元素並判讀漲跌方向
    fn trend(
        &self,
        root: &ElementRef,
        marker_selector: &str,
        slot: &'static str,
    ) -> Result<Trend, ExtractionError> {
        let selector = element::parse_selector(marker_selector)?;
        let marker = element::select_first(root, &selector)
            .ok_or(ExtractionError::MissingRegion { region: slot })?;

        match Trend::from_classes(marker.value().classes()) {
            Some(Trend::Neither) if self.strict_sign => {
                Err(ExtractionError::UnrecognizedSign { slot })
            }
            Some(trend) => Ok(trend),
            None if self.strict_sign => Err(ExtractionError::UnrecognizedSign { slot }),
            // 兩者並存時以上漲為準
            None => Ok(Trend::Upward),
        }
    }
}

fn required_text(
    scope: &ElementRef,
    tag: &str,
    classes: &[&str],
    region: &'static str,
) -> Result<String, ExtractionError> {
    element::find_by_classes(scope, tag, classes)?
        .map(|e| element_text(&e))
        .ok_or(ExtractionError::MissingRegion { region })
}

/// 取得價格明細清單，並確認項目數足以用固定索引取值
fn price_detail_items<'a>(root: &ElementRef<'a>) -> Result<Vec<ElementRef<'a>>, ExtractionError> {
    let list = element::find_by_classes(root, "ul", PRICE_DETAIL_LIST_CLASSES)?.ok_or(
        ExtractionError::MissingRegion {
            region: "price_detail_list",
        },
    )?;
    let items = element::find_all_by_classes(&list, "li", PRICE_DETAIL_ITEM_CLASSES)?;

    if items.len() < PriceDetailIndex::REQUIRED_LEN {
        let index = PriceDetailIndex::BOUND
            .into_iter()
            .filter(|index| *index >= items.len())
            .min()
            .unwrap_or(PriceDetailIndex::CHANGE);
        return Err(ExtractionError::MissingField {
            index,
            len: items.len(),
        });
    }

    Ok(items)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    const UP: &str = "C($c-trend-up)";
    const DOWN: &str = "C($c-trend-down)";

    /// 組出與報價頁結構相同的 HTML
    pub(crate) fn quote_page(change_cue: &str, rate_cue: &str, items: &[&str]) -> String {
        let lis = items
            .iter()
            .map(|text| format!(r#"<li class="price-detail-item">{}</li>"#, text))
            .collect::<String>();

        format!(
            r#"<!DOCTYPE html>
<html><body>
<span class="Fz(20px) Fw(b) Lh(1.2) Mend(4px) D(f) Ai(c) {down}">outside root</span>
<div id="layout-col1">
  <div class="D(f) Ai(c) Mb(6px)">
    <h1 class="C($c-link-text) Fw(b) Fz(24px) Mend(8px)"> 台積電 </h1>
    <span class="C($c-icon) Fz(24px) Mend(20px)">2330</span>
  </div>
  <div class="D(f) Fld(c) Ai(fs)">
    <span class="Fz(32px) Fw(b) Lh(1) Mend(16px) D(f) Ai(c)">123.45</span>
    <span class="Fz(20px) Fw(b) Lh(1.2) Mend(4px) D(f) Ai(c) {change_cue}"><span>1.20</span></span>
    <span class="Jc(fe) Fz(20px) Lh(1.2) Fw(b) D(f) Ai(c) {rate_cue}"><span>(2.5%)</span></span>
  </div>
  <span class="C(#6e7780) Fz(12px) Fw(b)">收盤 | 2024/05/10 14:30 更新</span>
  <div class="D(f) Fld(c) Ai(c) Fw(b) Pend(8px) Bdendc($bd-primary-divider) Bdends(s) Bdendw(1px)">
    <span class="Fz(16px) C($c-link-text) Mb(4px)"> 25,301 </span>
    <span class="C(#232a31) Fz(12px)">成交量(張)</span>
  </div>
  <ul class="D(f) Fld(c) Flw(w) H(192px) Mx(-16px)">{lis}</ul>
</div>
</body></html>"#,
            down = DOWN,
            change_cue = change_cue,
            rate_cue = rate_cue,
            lis = lis,
        )
    }

    pub(crate) const ITEMS: [&str; 10] = [
        "123.45", "122.00", "124.50", "121.80", "10.20", "3,094", "122.25", "漲跌幅2.5%",
        "漲跌1.20", "1.70%",
    ];

    #[test]
    fn test_extract_upward() {
        let record = extract_quote(&quote_page(UP, UP, &ITEMS)).unwrap();

        assert_eq!(record.ticker_code, "2330");
        assert_eq!(record.company_name, "台積電");
        assert_eq!(record.volume, "25,301");
        assert_eq!(record.final_price, "123.45");
        assert_eq!(record.open_price, "122.00");
        assert_eq!(record.high_price, "124.50");
        assert_eq!(record.low_price, "121.80");
        assert_eq!(record.prior_close_price, "122.25");
        assert_eq!(record.change, "+1.20");
        assert_eq!(record.change_rate, "+2.5%");
        assert_eq!(record.quote_timestamp, "2024/05/10 14:30 更新");
        assert_eq!(record.id, None);
        assert_eq!(record.persisted_at, None);
    }

    #[test]
    fn test_extract_downward_rate() {
        let record = extract_quote(&quote_page(DOWN, DOWN, &ITEMS)).unwrap();

        assert_eq!(record.change, "-1.20");
        assert_eq!(record.change_rate, "-2.5%");
    }

    #[test]
    fn test_slots_are_independent() {
        let record = extract_quote(&quote_page(UP, DOWN, &ITEMS)).unwrap();

        assert_eq!(record.change, "+1.20");
        assert_eq!(record.change_rate, "-2.5%");
    }

    #[test]
    fn test_flat_passes_through() {
        let record = extract_quote(&quote_page("", "C($c-trend-flat)", &ITEMS)).unwrap();

        assert_eq!(record.change, "1.20");
        assert_eq!(record.change_rate, "2.5%");
    }

    #[test]
    fn test_strict_sign_rejects_missing_cue() {
        let extractor = QuoteExtractor::new(true);

        assert_eq!(
            extractor.extract(&quote_page(UP, "", &ITEMS)),
            Err(ExtractionError::UnrecognizedSign {
                slot: "change_rate"
            })
        );
        assert!(extractor.extract(&quote_page(UP, DOWN, &ITEMS)).is_ok());
    }

    #[test]
    fn test_both_sentinels_prefer_upward() {
        let both = format!("{} {}", UP, DOWN);

        let record = extract_quote(&quote_page(&both, DOWN, &ITEMS)).unwrap();
        assert_eq!(record.change, "+1.20");
        assert_eq!(record.change_rate, "-2.5%");

        assert_eq!(
            QuoteExtractor::new(true).extract(&quote_page(&both, UP, &ITEMS)),
            Err(ExtractionError::UnrecognizedSign { slot: "change" })
        );
    }

    #[test]
    fn test_missing_root() {
        let markup = quote_page(UP, UP, &ITEMS).replace("layout-col1", "layout-col2");

        assert_eq!(
            extract_quote(&markup),
            Err(ExtractionError::MissingRegion { region: ROOT_ID })
        );
    }

    #[test]
    fn test_short_price_detail_list() {
        let markup = quote_page(UP, UP, &ITEMS[..8]);

        assert_eq!(
            extract_quote(&markup),
            Err(ExtractionError::MissingField { index: 8, len: 8 })
        );
    }

    #[test]
    fn test_missing_field_reports_first_bound_index() {
        assert_eq!(
            extract_quote(&quote_page(UP, UP, &ITEMS[..5])),
            Err(ExtractionError::MissingField { index: 6, len: 5 })
        );
    }

    #[test]
    fn test_empty_price_detail_list() {
        assert_eq!(
            extract_quote(&quote_page(UP, UP, &[])),
            Err(ExtractionError::MissingField { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_missing_change_marker() {
        let markup = quote_page(UP, UP, &ITEMS).replace("Mend(4px) D(f) Ai(c)", "Mend(4px)");

        assert_eq!(
            extract_quote(&markup),
            Err(ExtractionError::MissingRegion { region: "change" })
        );
    }

    #[test]
    fn test_missing_volume() {
        let markup = quote_page(UP, UP, &ITEMS).replace("Bdendw(1px)", "");

        assert_eq!(
            extract_quote(&markup),
            Err(ExtractionError::MissingRegion {
                region: "volume_group"
            })
        );
    }

    #[test]
    fn test_open_session_label_stripped() {
        let markup = quote_page(UP, UP, &ITEMS).replace("收盤 |", "開盤 |");
        let record = extract_quote(&markup).unwrap();

        assert_eq!(record.quote_timestamp, "2024/05/10 14:30 更新");
    }
}
