//! Reports, progress display and run packaging.

mod csv;
mod json;
mod package;
pub mod progress;
mod report;
mod writer;

pub use self::csv::{CONSENSUS_ROW, CsvReportWriter};
pub use json::{JsonReport, JsonReportWriter};
pub use package::package_run;
pub use report::{BatchReport, DetectionRecord};
pub use writer::{ReportWriter, write_report};

use crate::config::ReportFormat;
use crate::error::Result;
use std::path::Path;

/// Write `report` to `path` in the given format.
pub fn save_report(report: &BatchReport, path: &Path, format: ReportFormat) -> Result<()> {
    let mut writer: Box<dyn ReportWriter> = match format {
        ReportFormat::Csv => Box::new(CsvReportWriter::new(path)?),
        ReportFormat::Json => Box::new(JsonReportWriter::new(path)),
    };
    write_report(writer.as_mut(), report)
}
