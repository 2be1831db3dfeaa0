use crate::domain::model::DefectReport;
use crate::domain::ports::ReportSink;
use crate::utils::error::Result;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// 寫入本地 CSV 檔，沒有 Google 憑證時用來開發測試
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }
}

impl ReportSink for CsvSink {
    async fn append(&self, report: &DefectReport) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // 新檔案或空檔案才寫標題列
        let needs_header = fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::Writer::from_writer(file);

        if needs_header {
            writer.write_record(DefectReport::COLUMNS)?;
        }
        writer.write_record(report.to_record())?;
        writer.flush()?;

        tracing::debug!("Row appended to: {}", self.path.display());
        Ok(())
    }

    fn name(&self) -> &str {
        "csv"
    }
}
