pub mod bot;
pub mod parser;
pub mod replies;

pub use crate::domain::model::{Command, DefectReport, ReplyKind};
pub use crate::domain::ports::{Messenger, ReportSink};
pub use crate::utils::error::Result;
