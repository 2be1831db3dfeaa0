pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{csv_sink::CsvSink, line::LineMessenger, sheets::SheetsSink, AnySink};
pub use config::BotConfig;
pub use crate::core::{bot::ReportBot, parser::ReportParser};
pub use domain::model::DefectReport;
pub use utils::error::{BotError, Result};
