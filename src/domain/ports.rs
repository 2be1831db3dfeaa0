use crate::domain::model::DefectReport;
use crate::utils::error::Result;
use async_trait::async_trait;

/// 回報資料的寫入端（試算表、本地 CSV 等）
pub trait ReportSink: Send + Sync {
    fn append(&self, report: &DefectReport)
        -> impl std::future::Future<Output = Result<()>> + Send;

    fn name(&self) -> &str;
}

/// 聊天平台的回覆通道
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;
}
