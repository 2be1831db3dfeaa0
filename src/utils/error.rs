use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Token signing error: {0}")]
    TokenError(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Webhook signature rejected: {reason}")]
    SignatureError { reason: String },

    #[error("Malformed webhook payload: {message}")]
    WebhookError { message: String },

    #[error("Report format incorrect: {reason}")]
    ReportFormatError { reason: String },

    #[error("Sheet API error ({status}): {message}")]
    SheetApiError { status: u16, message: String },

    #[error("Messaging API error ({status}): {message}")]
    MessagingApiError { status: u16, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Storage,
    Configuration,
    Security,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl BotError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BotError::HttpError(_)
            | BotError::SheetApiError { .. }
            | BotError::MessagingApiError { .. } => ErrorCategory::Network,
            BotError::CsvError(_) | BotError::IoError(_) => ErrorCategory::Storage,
            BotError::SerializationError(_)
            | BotError::WebhookError { .. }
            | BotError::ReportFormatError { .. } => ErrorCategory::Input,
            BotError::TokenError(_) | BotError::SignatureError { .. } => ErrorCategory::Security,
            BotError::ConfigError { .. }
            | BotError::MissingConfigError { .. }
            | BotError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Storage | ErrorCategory::Security => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "檢查網路連線與 API 憑證後重試",
            ErrorCategory::Storage => "確認輸出路徑存在且可寫入",
            ErrorCategory::Configuration => "檢查設定檔或環境變數 (CHANNEL_SECRET, CHANNEL_ACCESS_TOKEN, GOOGLE_CREDENTIALS)",
            ErrorCategory::Security => "確認 channel secret 與 service account 私鑰正確",
            ErrorCategory::Input => "請使用者依照 #report 範本重新輸入",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BotError::MissingConfigError { field } => format!("缺少必要設定: {}", field),
            BotError::InvalidConfigValueError { field, reason, .. } => {
                format!("設定值錯誤 {}: {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
