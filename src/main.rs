use clap::Parser;
use qc_report_bot::domain::ports::ReportSink;
use qc_report_bot::server::{self, AppState};
use qc_report_bot::utils::error::{BotError, ErrorSeverity};
use qc_report_bot::utils::{logger, validation::Validate};
use qc_report_bot::{CliConfig, ReportBot};

fn exit_with(e: &BotError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting qc-report-bot");

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed");
        exit_with(&e);
    }

    let sink = match config.build_sink() {
        Ok(sink) => sink,
        Err(e) => exit_with(&e),
    };
    tracing::info!("🗂️ Reports will be appended via {} sink", sink.name());

    let state = AppState {
        bot: ReportBot::new(sink),
        messenger: config.messenger(),
        channel_secret: config.line.channel_secret.clone(),
    };
    let app = server::router(state, &config.server.callback_path);

    if let Err(e) = server::serve(&config.server.host, config.server.port, app).await {
        exit_with(&e);
    }

    Ok(())
}
