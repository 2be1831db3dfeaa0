pub mod env;
pub mod toml_config;

pub use toml_config::BotConfig;

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "qc-report-bot")]
#[command(about = "LINE bot that logs QC defect reports to Google Sheets")]
pub struct CliConfig {
    #[arg(long, help = "TOML config file; environment variables are used when omitted")]
    pub config: Option<String>,

    #[arg(long, help = "Override the listen host")]
    pub host: Option<String>,

    #[arg(long, help = "Override the listen port")]
    pub port: Option<u16>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔或環境變數，再套用命令列覆寫
    pub fn load(&self) -> crate::utils::error::Result<BotConfig> {
        let mut config = match &self.config {
            Some(path) => BotConfig::from_file(path)?,
            None => env::from_env()?,
        };

        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }

        Ok(config)
    }
}
