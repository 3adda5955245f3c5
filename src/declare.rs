use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 漲跌方向的 class sentinel：上漲
pub const TREND_UP_CLASS: &str = "C($c-trend-up)";
/// 漲跌方向的 class sentinel：下跌
pub const TREND_DOWN_CLASS: &str = "C($c-trend-down)";

/// 漲跌方向
///
/// 頁面上的數值本身不帶正負號，方向是以標記元素上的 class 表示。
#[derive(PartialEq, Eq, Debug, Copy, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Trend {
    /// 上漲，數值前綴 `+`
    Upward,
    /// 下跌，數值前綴 `-`
    Downward,
    /// 平盤或沒有方向標記，數值原樣保留
    Neither,
}

impl Trend {
    /// 從 class token 集合判讀方向
    ///
    /// 兩個 sentinel 同時出現時回傳 `None`，由呼叫端決定以上漲為準或視為錯誤。
    pub fn from_classes<'a>(classes: impl IntoIterator<Item = &'a str>) -> Option<Trend> {
        let (mut up, mut down) = (false, false);
        for class in classes {
            up |= class == TREND_UP_CLASS;
            down |= class == TREND_DOWN_CLASS;
        }

        match (up, down) {
            (true, false) => Some(Trend::Upward),
            (false, true) => Some(Trend::Downward),
            (false, false) => Some(Trend::Neither),
            (true, true) => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Trend::Upward => "+",
            Trend::Downward => "-",
            Trend::Neither => "",
        }
    }

    /// 將方向套用到未帶正負號的數值文字
    pub fn apply(&self, magnitude: &str) -> String {
        format!("{}{}", self.prefix(), magnitude)
    }
}

/// 頁面渲染方式
#[derive(
    PartialEq, Eq, Debug, Copy, Clone, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// 透過 WebDriver 驅動無頭瀏覽器，等待前端腳本執行完成
    #[default]
    WebDriver,
    /// 直接以 HTTP 取得伺服器端輸出的 HTML
    Http,
}
