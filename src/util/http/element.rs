use scraper::{ElementRef, Selector};

use crate::error::ExtractionError;

/// Parses a CSS selector, mapping the parser error into an `ExtractionError`.
pub fn parse_selector(css_selector: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css_selector).map_err(|why| {
        ExtractionError::Selector(format!(
            "Failed to Selector::parse({}) because: {:?}",
            css_selector, why
        ))
    })
}

/// Collects the text of an element and all of its descendants, whitespace-trimmed.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// 回傳 `scope` 之下第一個符合 `selector` 的元素
pub fn select_first<'a>(scope: &ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// 回傳 `scope` 之下第一個標籤為 `tag` 且 class 含有全部 `classes` 的元素
///
/// class 比對以 token 為單位（順序不拘），不做子字串比對。
pub fn find_by_classes<'a>(
    scope: &ElementRef<'a>,
    tag: &str,
    classes: &[&str],
) -> Result<Option<ElementRef<'a>>, ExtractionError> {
    let selector = parse_selector(tag)?;
    Ok(scope.select(&selector).find(|element| {
        classes
            .iter()
            .all(|wanted| element.value().classes().any(|class| class == *wanted))
    }))
}

/// 回傳 `scope` 之下所有標籤為 `tag` 且 class 含有全部 `classes` 的元素
pub fn find_all_by_classes<'a>(
    scope: &ElementRef<'a>,
    tag: &str,
    classes: &[&str],
) -> Result<Vec<ElementRef<'a>>, ExtractionError> {
    let selector = parse_selector(tag)?;
    Ok(scope
        .select(&selector)
        .filter(|element| {
            classes
                .iter()
                .all(|wanted| element.value().classes().any(|class| class == *wanted))
        })
        .collect())
}
