// Adapters layer: concrete implementations for external systems (LINE, Google Sheets, local CSV).

pub mod csv_sink;
pub mod line;
pub mod sheets;

use crate::domain::model::DefectReport;
use crate::domain::ports::ReportSink;
use crate::utils::error::Result;

/// 執行期依設定選擇的 sink
pub enum AnySink {
    Sheets(sheets::SheetsSink),
    Csv(csv_sink::CsvSink),
}

impl ReportSink for AnySink {
    async fn append(&self, report: &DefectReport) -> Result<()> {
        match self {
            AnySink::Sheets(sink) => sink.append(report).await,
            AnySink::Csv(sink) => sink.append(report).await,
        }
    }

    fn name(&self) -> &str {
        match self {
            AnySink::Sheets(sink) => sink.name(),
            AnySink::Csv(sink) => sink.name(),
        }
    }
}
