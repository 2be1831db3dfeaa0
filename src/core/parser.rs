//! 將使用者輸入的自由文字回報解析成 [`DefectReport`]。
//!
//! 回報格式（不分大小寫，換行可用空白取代）：
//!
//! ```text
//! #report
//! Cosmetic Fail
//! Line: L1
//! Defect: scratch
//! Position: top
//! Model: X100
//! TOTAL: 3
//! SN: SN123
//! ```

use crate::domain::model::{Command, DefectReport, DATETIME_FORMAT};
use crate::utils::error::{BotError, Result};
use chrono::NaiveDateTime;
use regex::Regex;

pub const COMMAND_PREFIX: &str = "#report";

const REPORT_PATTERN: &str = r"(?i)(?P<kind>.+?)\s+line:\s*(?P<line>\S+)\s+defect:\s*(?P<defect>\S+)\s+position:\s*(?P<position>\S+)\s+model:\s*(?P<model>\S+)\s+total:\s*(?P<total>\d+)\s+sn:\s*(?P<sn>\S+)";

pub struct ReportParser {
    pattern: Regex,
    whitespace: Regex,
    digit: Regex,
}

impl ReportParser {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(REPORT_PATTERN).expect("report pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
            digit: Regex::new(r"\A\d\z").expect("digit pattern is valid"),
        }
    }

    /// 判斷訊息是否為 `#report` 指令；不是的話回傳 `None`
    pub fn command(&self, text: &str) -> Option<Command> {
        let text = text.trim();
        let prefix = text.get(..COMMAND_PREFIX.len())?;
        if !prefix.eq_ignore_ascii_case(COMMAND_PREFIX) {
            return None;
        }

        let body = text[COMMAND_PREFIX.len()..].trim();
        if body.is_empty() {
            Some(Command::Template)
        } else {
            Some(Command::Submit(body.to_string()))
        }
    }

    /// 解析 `#report` 後面的內容
    pub fn parse(&self, body: &str, received_at: NaiveDateTime) -> Result<DefectReport> {
        let collapsed = self.whitespace.replace_all(body.trim(), " ");

        let caps = self
            .pattern
            .captures(&collapsed)
            .ok_or_else(|| BotError::ReportFormatError {
                reason: "fields missing or out of order".to_string(),
            })?;

        let total_text = &caps["total"];
        let total = self
            .parse_count(total_text)
            .ok_or_else(|| BotError::ReportFormatError {
                reason: format!("TOTAL '{}' is not a valid count", total_text),
            })?;

        Ok(DefectReport {
            kind: title_case(caps["kind"].trim()),
            line: caps["line"].trim().to_uppercase(),
            defect: caps["defect"].trim().to_string(),
            position: caps["position"].trim().to_string(),
            model: caps["model"].trim().to_uppercase(),
            total,
            sn: caps["sn"].trim().to_uppercase(),
            datetime: received_at.format(DATETIME_FORMAT).to_string(),
        })
    }
}

impl ReportParser {
    fn is_digit(&self, ch: char) -> bool {
        let mut buf = [0u8; 4];
        self.digit.is_match(ch.encode_utf8(&mut buf))
    }

    /// 十進位數字（任何文字系統，例如 ๓ 或 ３）；超出 u32 回傳 `None`
    fn parse_count(&self, text: &str) -> Option<u32> {
        text.chars().try_fold(0u32, |acc, ch| {
            let digit = self.digit_value(ch)?;
            acc.checked_mul(10)?.checked_add(digit)
        })
    }

    /// Unicode 的十進位數字都是 0..9 連續排列，往前數到非數字即可得出值
    fn digit_value(&self, ch: char) -> Option<u32> {
        if let Some(d) = ch.to_digit(10) {
            return Some(d);
        }
        if !self.is_digit(ch) {
            return None;
        }
        let mut offset = 0;
        let mut code = ch as u32;
        while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
            if !self.is_digit(prev) {
                break;
            }
            offset += 1;
            code -= 1;
        }
        Some(offset % 10)
    }
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 每個單字首字大寫、其餘小寫；沒有大小寫之分的字元（數字、泰文等）視為單字分隔
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;

    for ch in text.chars() {
        let cased = ch.is_lowercase() || ch.is_uppercase();
        if !cased {
            out.push(ch);
        } else if in_word {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        in_word = cased;
    }

    out
}
