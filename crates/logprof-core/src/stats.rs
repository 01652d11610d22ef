use crate::Result;
use crate::parse::{LogRecord, parse_line};
use indexmap::IndexMap;
use std::io;

/// Running statistics for one URL.
///
/// Invariants after every update: `time_sum == samples.iter().sum()`,
/// `count == samples.len()`, `time_max == samples.iter().max()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrlAggregate {
    pub count: u64,
    pub time_sum: f64,
    pub time_max: f64,
    /// Recomputed as `time_sum / count` on every update rather than kept as an
    /// incremental mean, so repeated runs over the same input agree bit for bit.
    pub time_avg: f64,
    /// Every observed elapsed time, kept for the median at report time.
    pub samples: Vec<f64>,
    /// Ordinal of the global record that last touched this URL. Diagnostic only.
    pub last_seen: u64,
}

/// The mutable state of one aggregation pass.
///
/// Built by exactly one pass over the extractor's records, then handed to the
/// report builder read-only. The mapping preserves first-occurrence order,
/// which the ranking tie-break relies on.
#[derive(Debug, Default)]
pub struct AggregationState {
    pub mapping: IndexMap<String, UrlAggregate>,
    /// Count of all lines seen, including unparsable ones.
    pub total_requests: u64,
    /// Sum of elapsed times over the lines that passed numeric conversion.
    pub total_time: f64,
    /// Lines whose elapsed-time field could not be converted to a number.
    pub parse_error_count: u64,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct_urls(&self) -> usize {
        self.mapping.len()
    }

    /// Fold one record into the running state.
    ///
    /// Every record counts toward `total_requests`. A record whose elapsed
    /// field is missing or not a number only bumps `parse_error_count`; it
    /// contributes to no URL's statistics and not to `total_time`. An empty or
    /// malformed URL is still a valid aggregation key.
    pub fn push(&mut self, record: LogRecord) {
        self.total_requests += 1;

        let elapsed = record
            .elapsed
            .as_deref()
            .and_then(|text| text.parse::<f64>().ok());
        let Some(value) = elapsed else {
            self.parse_error_count += 1;
            return;
        };

        self.total_time += value;

        let aggregate = self
            .mapping
            .entry(record.url.unwrap_or_default())
            .or_default();
        aggregate.count += 1;
        aggregate.samples.push(value);
        aggregate.time_sum += value;
        aggregate.time_avg = aggregate.time_sum / aggregate.count as f64;
        aggregate.time_max = aggregate.time_max.max(value);
        aggregate.last_seen = self.total_requests;
    }

    /// Aggregate an already-extracted record sequence in a single pass.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = LogRecord>,
    {
        let mut state = Self::new();
        for record in records {
            state.push(record);
        }
        state.log_summary();
        state
    }

    /// Extract and aggregate raw lines in a single pass, propagating I/O
    /// failures from the line source.
    pub fn from_lines<I>(lines: I) -> Result<Self>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mut state = Self::new();
        for line in lines {
            state.push(parse_line(&line?));
        }
        state.log_summary();
        Ok(state)
    }

    fn log_summary(&self) {
        tracing::info!(
            "Aggregation complete: {} lines, {} distinct urls, {} parse errors",
            self.total_requests,
            self.mapping.len(),
            self.parse_error_count
        );
    }
}
