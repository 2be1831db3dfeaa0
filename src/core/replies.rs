use crate::domain::model::ReplyKind;

pub const TEMPLATE_REPLY: &str = "📋 Please fill in the report using this format:\n\n\
#report\n\
Cosmetic Fail\n\
Line: \n\
Defect: \n\
Position: \n\
Model: \n\
TOTAL: \n\
SN: ";

pub const SAVED_REPLY: &str = "✅ Report saved to Google Sheet successfully.";

pub const FORMAT_INCORRECT_REPLY: &str = "⚠️ Format incorrect.\n\nPlease Retry:\n\n";

pub const SAVE_FAILED_REPLY: &str = "❌ Could not save the report. Please try again later.";

pub fn render(kind: ReplyKind) -> &'static str {
    match kind {
        ReplyKind::Template => TEMPLATE_REPLY,
        ReplyKind::Saved => SAVED_REPLY,
        ReplyKind::FormatIncorrect => FORMAT_INCORRECT_REPLY,
        ReplyKind::SaveFailed => SAVE_FAILED_REPLY,
    }
}
