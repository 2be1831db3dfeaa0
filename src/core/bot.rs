use crate::core::parser::ReportParser;
use crate::domain::model::{Command, ReplyKind};
use crate::domain::ports::ReportSink;
use chrono::NaiveDateTime;

/// 單則訊息的處理流程：指令判斷 → 解析 → 寫入 → 選擇回覆
pub struct ReportBot<S: ReportSink> {
    parser: ReportParser,
    sink: S,
}

impl<S: ReportSink> ReportBot<S> {
    pub fn new(sink: S) -> Self {
        Self {
            parser: ReportParser::new(),
            sink,
        }
    }

    /// 回傳 `None` 表示訊息不是 `#report` 指令，不需回覆
    pub async fn handle_text(&self, text: &str, received_at: NaiveDateTime) -> Option<ReplyKind> {
        let body = match self.parser.command(text)? {
            Command::Template => {
                tracing::debug!("📋 Empty #report, sending template");
                return Some(ReplyKind::Template);
            }
            Command::Submit(body) => body,
        };

        let report = match self.parser.parse(&body, received_at) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("⚠️ Report rejected: {}", e);
                return Some(ReplyKind::FormatIncorrect);
            }
        };

        tracing::info!(
            kind = %report.kind,
            line = %report.line,
            model = %report.model,
            sn = %report.sn,
            total = report.total,
            "📝 Parsed defect report"
        );

        match self.sink.append(&report).await {
            Ok(()) => {
                tracing::info!("✅ Report appended to {}", self.sink.name());
                Some(ReplyKind::Saved)
            }
            Err(e) => {
                tracing::error!(
                    "❌ Failed to append report to {}: {} (Category: {:?}, Severity: {:?})",
                    self.sink.name(),
                    e,
                    e.category(),
                    e.severity()
                );
                tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
                Some(ReplyKind::SaveFailed)
            }
        }
    }
}
