use std::{env, path::Path, str::FromStr};

use anyhow::{Context, Result};
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

use crate::{declare::RendererKind, logging};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct App {
    #[serde(default)]
    pub sqlite: Sqlite,
    #[serde(default)]
    pub renderer: Renderer,
    #[serde(default)]
    pub web: Web,
    #[serde(default)]
    pub extraction: Extraction,
}

const SQLITE_PATH: &str = "SQLITE_PATH";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Sqlite {
    /// 資料庫檔案路徑，或 `sqlite:` 開頭的連線字串
    pub path: String,
}

impl Default for Sqlite {
    fn default() -> Self {
        Sqlite {
            path: "stock_data.db".to_string(),
        }
    }
}

const RENDERER_KIND: &str = "RENDERER_KIND";
const WEBDRIVER_URL: &str = "WEBDRIVER_URL";
const RENDERER_HEADLESS: &str = "RENDERER_HEADLESS";
const RENDER_TIMEOUT_SECS: &str = "RENDER_TIMEOUT_SECS";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Renderer {
    pub kind: RendererKind,
    pub webdriver_url: String,
    pub headless: bool,
    /// 等待報價頁根區塊出現的秒數
    pub timeout_secs: u64,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer {
            kind: RendererKind::WebDriver,
            webdriver_url: "http://localhost:9515".to_string(),
            headless: true,
            timeout_secs: 10,
        }
    }
}

const WEB_HOST: &str = "WEB_HOST";
const WEB_PORT: &str = "WEB_PORT";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Web {
    pub host: String,
    pub port: u16,
}

impl Default for Web {
    fn default() -> Self {
        Web {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Web {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

const EXTRACTION_STRICT_SIGN: &str = "EXTRACTION_STRICT_SIGN";

#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Extraction {
    /// 找不到漲跌標記時視為錯誤，而不是當作平盤
    pub strict_sign: bool,
}

impl App {
    /// 讀取 `app.json`（若存在），再以環境變數覆蓋
    pub fn load() -> Result<Self> {
        let config = Self::load_file(Path::new(CONFIG_PATH))?.unwrap_or_default();
        Ok(config.override_with_env())
    }

    /// 讀取指定的設定檔，檔案不存在時回傳 `None`
    pub fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let config: App = config_config::builder()
            .add_source(config_file::from(path))
            .build()
            .and_then(|c| c.try_deserialize())
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        Ok(Some(config))
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    pub fn override_with_env(self) -> Self {
        self.override_with(|key| env::var(key).ok())
    }

    fn override_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(SQLITE_PATH) {
            self.sqlite.path = path;
        }

        if let Some(kind) = lookup(RENDERER_KIND) {
            match RendererKind::from_str(&kind) {
                Ok(kind) => self.renderer.kind = kind,
                Err(why) => logging::error_file_async(format!(
                    "Ignore {}={} because {:?}",
                    RENDERER_KIND, kind, why
                )),
            }
        }

        if let Some(url) = lookup(WEBDRIVER_URL) {
            self.renderer.webdriver_url = url;
        }

        if let Some(headless) = lookup(RENDERER_HEADLESS) {
            self.renderer.headless = parse_bool(&headless).unwrap_or(self.renderer.headless);
        }

        if let Some(secs) = lookup(RENDER_TIMEOUT_SECS) {
            self.renderer.timeout_secs = secs.trim().parse().unwrap_or(self.renderer.timeout_secs);
        }

        if let Some(host) = lookup(WEB_HOST) {
            self.web.host = host;
        }

        if let Some(port) = lookup(WEB_PORT) {
            self.web.port = port.trim().parse().unwrap_or(self.web.port);
        }

        if let Some(strict) = lookup(EXTRACTION_STRICT_SIGN) {
            self.extraction.strict_sign =
                parse_bool(&strict).unwrap_or(self.extraction.strict_sign);
        }

        self
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs};

    use super::*;

    #[test]
    fn test_defaults() {
        let app = App::default();

        assert_eq!(app.sqlite.path, "stock_data.db");
        assert_eq!(app.renderer.kind, RendererKind::WebDriver);
        assert_eq!(app.renderer.timeout_secs, 10);
        assert_eq!(app.web.bind_addr(), "127.0.0.1:5000");
        assert!(!app.extraction.strict_sign);
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        fs::write(
            &path,
            r#"{
  "sqlite": { "path": "quotes.db" },
  "renderer": { "kind": "http", "timeout_secs": 3 },
  "web": { "port": 8080 }
}"#,
        )
        .unwrap();

        let app = App::load_file(&path).unwrap().unwrap();

        assert_eq!(app.sqlite.path, "quotes.db");
        assert_eq!(app.renderer.kind, RendererKind::Http);
        assert_eq!(app.renderer.timeout_secs, 3);
        // 沒寫的欄位沿用預設
        assert_eq!(app.renderer.webdriver_url, "http://localhost:9515");
        assert_eq!(app.web.host, "127.0.0.1");
        assert_eq!(app.web.port, 8080);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(App::load_file(&dir.path().join("none.json"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_override_with() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (SQLITE_PATH, "/data/stock.db"),
            (RENDERER_KIND, "HTTP"),
            (RENDERER_HEADLESS, "false"),
            (RENDER_TIMEOUT_SECS, "not a number"),
            (WEB_PORT, "8000"),
            (EXTRACTION_STRICT_SIGN, "1"),
        ]);

        let app = App::default().override_with(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(app.sqlite.path, "/data/stock.db");
        assert_eq!(app.renderer.kind, RendererKind::Http);
        assert!(!app.renderer.headless);
        assert_eq!(app.renderer.timeout_secs, 10);
        assert_eq!(app.web.port, 8000);
        assert!(app.extraction.strict_sign);
    }
}
