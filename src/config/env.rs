use crate::config::toml_config::{
    BotConfig, CsvConfig, GoogleSheetsConfig, LineConfig, ServerConfig, SinkConfig, SinkKind,
};
use crate::utils::error::{BotError, Result};

/// 沒有設定檔時，從環境變數組出配置
pub fn from_env() -> Result<BotConfig> {
    from_lookup(|name| std::env::var(name).ok())
}

pub fn from_lookup<F>(lookup: F) -> Result<BotConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |name: &str| {
        lookup(name).ok_or_else(|| BotError::MissingConfigError {
            field: name.to_string(),
        })
    };

    let mut server = ServerConfig::default();
    if let Some(host) = lookup("HOST") {
        server.host = host;
    }
    if let Some(port) = lookup("PORT") {
        server.port = port
            .trim()
            .parse()
            .map_err(|e| BotError::InvalidConfigValueError {
                field: "PORT".to_string(),
                value: port.clone(),
                reason: format!("{}", e),
            })?;
    }

    let mut line = LineConfig {
        channel_secret: required("CHANNEL_SECRET")?,
        channel_access_token: required("CHANNEL_ACCESS_TOKEN")?,
        api_base_url: crate::adapters::line::DEFAULT_API_BASE_URL.to_string(),
    };
    if let Some(url) = lookup("LINE_API_BASE_URL") {
        line.api_base_url = url;
    }

    let sink = match lookup("QC_CSV_PATH") {
        Some(path) => SinkConfig {
            kind: SinkKind::Csv,
            google_sheets: None,
            csv: Some(CsvConfig { path }),
        },
        None => {
            let mut sheets = GoogleSheetsConfig {
                credentials: lookup("GOOGLE_CREDENTIALS"),
                credentials_file: lookup("GOOGLE_CREDENTIALS_FILE"),
                spreadsheet_id: lookup("QC_SPREADSHEET_ID"),
                worksheet: lookup("QC_WORKSHEET"),
                ..GoogleSheetsConfig::default()
            };
            if let Some(title) = lookup("QC_SPREADSHEET_TITLE") {
                sheets.spreadsheet_title = title;
            }
            SinkConfig {
                kind: SinkKind::GoogleSheets,
                google_sheets: Some(sheets),
                csv: None,
            }
        }
    };

    Ok(BotConfig { server, line, sink })
}
