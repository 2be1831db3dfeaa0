use crate::adapters::csv_sink::CsvSink;
use crate::adapters::line::{LineMessenger, DEFAULT_API_BASE_URL};
use crate::adapters::sheets::{
    ServiceAccountKey, SheetsSettings, SheetsSink, SpreadsheetRef, DEFAULT_DRIVE_BASE_URL,
    DEFAULT_SHEETS_BASE_URL, DEFAULT_SPREADSHEET_TITLE,
};
use crate::adapters::AnySink;
use crate::utils::error::{BotError, Result};
use crate::utils::validation::{self, Validate};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_CALLBACK_PATH: &str = "/callback";

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub line: LineConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_callback_path")]
    pub callback_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            callback_path: default_callback_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    #[serde(default = "default_line_api_base_url")]
    pub api_base_url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    GoogleSheets,
    Csv,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,
    pub google_sheets: Option<GoogleSheetsConfig>,
    pub csv: Option<CsvConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSheetsConfig {
    /// Service account JSON 內容
    pub credentials: Option<String>,
    /// 或是 service account JSON 檔案路徑
    pub credentials_file: Option<String>,
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_spreadsheet_title")]
    pub spreadsheet_title: String,
    pub worksheet: Option<String>,
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    #[serde(default = "default_drive_base_url")]
    pub drive_base_url: String,
}

impl Default for GoogleSheetsConfig {
    fn default() -> Self {
        Self {
            credentials: None,
            credentials_file: None,
            spreadsheet_id: None,
            spreadsheet_title: default_spreadsheet_title(),
            worksheet: None,
            sheets_base_url: default_sheets_base_url(),
            drive_base_url: default_drive_base_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsvConfig {
    pub path: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_callback_path() -> String {
    DEFAULT_CALLBACK_PATH.to_string()
}

fn default_line_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_spreadsheet_title() -> String {
    DEFAULT_SPREADSHEET_TITLE.to_string()
}

fn default_sheets_base_url() -> String {
    DEFAULT_SHEETS_BASE_URL.to_string()
}

fn default_drive_base_url() -> String {
    DEFAULT_DRIVE_BASE_URL.to_string()
}

impl BotConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content, |name| std::env::var(name).ok());

        toml::from_str(&processed_content).map_err(|e| BotError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn google_sheets(&self) -> GoogleSheetsConfig {
        self.sink.google_sheets.clone().unwrap_or_default()
    }

    pub fn messenger(&self) -> LineMessenger {
        LineMessenger::new(
            self.line.channel_access_token.clone(),
            self.line.api_base_url.clone(),
        )
    }

    /// 依 `sink.kind` 建立 sink；Google 憑證在這裡就先解析
    pub fn build_sink(&self) -> Result<AnySink> {
        match self.sink.kind {
            SinkKind::Csv => {
                let csv = validation::validate_required_field("sink.csv", &self.sink.csv)?;
                Ok(AnySink::Csv(CsvSink::new(&csv.path)))
            }
            SinkKind::GoogleSheets => {
                let sheets = self.google_sheets();
                let credentials = match (&sheets.credentials, &sheets.credentials_file) {
                    (Some(json), _) => ServiceAccountKey::from_json(json)?,
                    (None, Some(path)) => ServiceAccountKey::from_file(path)?,
                    (None, None) => {
                        return Err(BotError::MissingConfigError {
                            field: "sink.google_sheets.credentials".to_string(),
                        })
                    }
                };
                let spreadsheet = match sheets.spreadsheet_id {
                    Some(id) => SpreadsheetRef::Id(id),
                    None => SpreadsheetRef::Title(sheets.spreadsheet_title),
                };

                let sink = SheetsSink::new(SheetsSettings {
                    credentials,
                    spreadsheet,
                    worksheet: sheets.worksheet,
                    sheets_base_url: sheets.sheets_base_url,
                    drive_base_url: sheets.drive_base_url,
                })?;
                Ok(AnySink::Sheets(sink))
            }
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("server.host", &self.server.host)?;
        validation::validate_range("server.port", self.server.port, 1, u16::MAX)?;
        validation::validate_route("server.callback_path", &self.server.callback_path)?;

        validate_secret("line.channel_secret", &self.line.channel_secret)?;
        validate_secret("line.channel_access_token", &self.line.channel_access_token)?;
        validation::validate_url("line.api_base_url", &self.line.api_base_url)?;

        match self.sink.kind {
            SinkKind::Csv => {
                let csv = validation::validate_required_field("sink.csv", &self.sink.csv)?;
                validation::validate_path("sink.csv.path", &csv.path)?;
            }
            SinkKind::GoogleSheets => {
                let sheets = self.google_sheets();
                match (&sheets.credentials, &sheets.credentials_file) {
                    (Some(json), _) => validate_secret("sink.google_sheets.credentials", json)?,
                    (None, Some(path)) => {
                        validation::validate_path("sink.google_sheets.credentials_file", path)?
                    }
                    (None, None) => {
                        return Err(BotError::MissingConfigError {
                            field: "sink.google_sheets.credentials".to_string(),
                        })
                    }
                }
                if sheets.spreadsheet_id.is_none() {
                    validation::validate_non_empty_string(
                        "sink.google_sheets.spreadsheet_title",
                        &sheets.spreadsheet_title,
                    )?;
                }
                validation::validate_url(
                    "sink.google_sheets.sheets_base_url",
                    &sheets.sheets_base_url,
                )?;
                validation::validate_url(
                    "sink.google_sheets.drive_base_url",
                    &sheets.drive_base_url,
                )?;
            }
        }

        Ok(())
    }
}

impl Validate for BotConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// 非空且沒有殘留未替換的 `${VAR}`
fn validate_secret(field_name: &str, value: &str) -> Result<()> {
    validation::validate_non_empty_string(field_name, value)?;
    if value.trim_start().starts_with("${") {
        return Err(BotError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "environment variable placeholder was not resolved".to_string(),
        });
    }
    Ok(())
}

/// 替換環境變數 (例如 ${CHANNEL_SECRET})，找不到的保留原文
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    use regex::{Captures, Regex};

    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid");
    re.replace_all(content, |caps: &Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    })
    .into_owned()
}
