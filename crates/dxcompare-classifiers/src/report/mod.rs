//! HTML artifacts: plotly figures and the maud summary report.
pub mod plots;
pub mod report;

pub use report::{Report, ReportSection};
