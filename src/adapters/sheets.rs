//! Google Sheets sink.
//!
//! Each append authorizes with the service account (JWT bearer grant),
//! resolves the spreadsheet and worksheet, then appends one row through the
//! `values:append` endpoint.

use crate::domain::model::DefectReport;
use crate::domain::ports::ReportSink;
use crate::utils::error::{BotError, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

pub const DEFAULT_SPREADSHEET_TITLE: &str = "QC_Defect_Log";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com";

const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Service account JSON key（只取需要的欄位）
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetRef {
    Id(String),
    Title(String),
}

#[derive(Debug, Clone)]
pub struct SheetsSettings {
    pub credentials: ServiceAccountKey,
    pub spreadsheet: SpreadsheetRef,
    /// 未指定時使用第一個工作表
    pub worksheet: Option<String>,
    pub sheets_base_url: String,
    pub drive_base_url: String,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Serialize)]
struct ValueRange {
    values: Vec<Vec<serde_json::Value>>,
}

pub struct SheetsSink {
    client: Client,
    settings: SheetsSettings,
    signing_key: EncodingKey,
}

impl SheetsSink {
    pub fn new(settings: SheetsSettings) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(settings.credentials.private_key.as_bytes())?;
        Ok(Self {
            client: Client::new(),
            settings,
            signing_key,
        })
    }

    /// 以 service account 換取 access token
    async fn access_token(&self) -> Result<String> {
        let credentials = &self.settings.credentials;
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &credentials.client_email,
            scope: SCOPES.join(" "),
            aud: &credentials.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let assertion =
            jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        tracing::debug!("Requesting access token from: {}", credentials.token_uri);
        let response = self
            .client
            .post(&credentials.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let token: TokenResponse = check(response).await?.json().await?;
        Ok(token.access_token)
    }

    async fn spreadsheet_id(&self, token: &str) -> Result<String> {
        let title = match &self.settings.spreadsheet {
            SpreadsheetRef::Id(id) => return Ok(id.clone()),
            SpreadsheetRef::Title(title) => title,
        };

        let query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            title.replace('\\', "\\\\").replace('\'', "\\'"),
            SPREADSHEET_MIME_TYPE
        );
        let url = endpoint(&self.settings.drive_base_url, &["drive", "v3", "files"])?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id,name)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;

        let list: FileList = check(response).await?.json().await?;
        list.files
            .into_iter()
            .next()
            .map(|f| f.id)
            .ok_or_else(|| BotError::SheetApiError {
                status: 404,
                message: format!("Spreadsheet '{}' not found", title),
            })
    }

    async fn worksheet_title(&self, token: &str, spreadsheet_id: &str) -> Result<String> {
        if let Some(worksheet) = &self.settings.worksheet {
            return Ok(worksheet.clone());
        }

        let url = endpoint(
            &self.settings.sheets_base_url,
            &["v4", "spreadsheets", spreadsheet_id],
        )?;
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;

        let meta: SpreadsheetMeta = check(response).await?.json().await?;
        meta.sheets
            .into_iter()
            .next()
            .map(|s| s.properties.title)
            .ok_or_else(|| BotError::SheetApiError {
                status: 404,
                message: format!("Spreadsheet {} has no worksheets", spreadsheet_id),
            })
    }
}

impl ReportSink for SheetsSink {
    async fn append(&self, report: &DefectReport) -> Result<()> {
        let token = self.access_token().await?;
        let spreadsheet_id = self.spreadsheet_id(&token).await?;
        let worksheet = self.worksheet_title(&token, &spreadsheet_id).await?;

        let range = format!("'{}':append", worksheet.replace('\'', "''"));
        let url = endpoint(
            &self.settings.sheets_base_url,
            &["v4", "spreadsheets", spreadsheet_id.as_str(), "values", range.as_str()],
        )?;

        tracing::debug!("Appending row to spreadsheet {} ({})", spreadsheet_id, worksheet);
        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange {
                values: vec![report.to_row()],
            })
            .send()
            .await?;

        check(response).await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "google_sheets"
    }
}

fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url).map_err(|e| BotError::InvalidConfigValueError {
        field: "sink.google_sheets base url".to_string(),
        value: base_url.to_string(),
        reason: e.to_string(),
    })?;

    url.path_segments_mut()
        .map_err(|_| BotError::ConfigError {
            message: format!("{} cannot be used as a base URL", base_url),
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(BotError::SheetApiError {
        status: status.as_u16(),
        message,
    })
}
