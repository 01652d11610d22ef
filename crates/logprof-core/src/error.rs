use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error ratio {ratio:.1}% exceeds the configured ceiling of {ceiling:.1}%")]
    ThresholdExceeded { ratio: f64, ceiling: f64 },

    #[error("No parsable records in log ({parse_errors} lines failed to parse)")]
    NoParsableRecords { parse_errors: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
