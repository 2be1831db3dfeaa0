use serde::{Deserialize, Serialize};

/// 時間欄位格式，例如 `2024-05-01 13:45:00`
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 一筆 QC 不良回報，欄位已正規化
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DefectReport {
    #[serde(rename = "Type")]
    pub kind: String,
    pub line: String,
    pub defect: String,
    pub position: String,
    pub model: String,
    pub total: u32,
    #[serde(rename = "SN")]
    pub sn: String,
    pub datetime: String,
}

impl DefectReport {
    /// 試算表欄位順序
    pub const COLUMNS: [&'static str; 8] = [
        "Type", "Line", "Defect", "Position", "Model", "Total", "SN", "Datetime",
    ];

    /// 轉成一列試算表資料，Total 保持數字型態
    pub fn to_row(&self) -> Vec<serde_json::Value> {
        vec![
            self.kind.clone().into(),
            self.line.clone().into(),
            self.defect.clone().into(),
            self.position.clone().into(),
            self.model.clone().into(),
            self.total.into(),
            self.sn.clone().into(),
            self.datetime.clone().into(),
        ]
    }

    pub fn to_record(&self) -> [String; 8] {
        [
            self.kind.clone(),
            self.line.clone(),
            self.defect.clone(),
            self.position.clone(),
            self.model.clone(),
            self.total.to_string(),
            self.sn.clone(),
            self.datetime.clone(),
        ]
    }
}

/// 使用者輸入的指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// 只輸入 `#report`，回傳空白範本
    Template,
    /// `#report` 後面接著回報內容
    Submit(String),
}

/// 回覆訊息的種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Template,
    Saved,
    FormatIncorrect,
    SaveFailed,
}
