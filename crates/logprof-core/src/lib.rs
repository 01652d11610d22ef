pub mod error;
pub mod lines;
pub mod parse;
pub mod report;
pub mod stats;

pub use error::{Error, Result};
pub use lines::LineSource;
pub use parse::{LogRecord, parse_line, parse_lines};
pub use report::{ReportBuilder, ReportRow};
pub use stats::{AggregationState, UrlAggregate};
