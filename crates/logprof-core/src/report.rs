use crate::error::{Error, Result};
use crate::stats::AggregationState;
use serde::Serialize;

/// One row of the final report, numeric fields pre-rounded to 3 decimals.
///
/// Serialized field names match what the report template's table script
/// expects, hence `count_perc`/`time_perc` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub url: String,
    pub count: u64,
    #[serde(rename = "count_perc")]
    pub count_pct: f64,
    pub time_avg: f64,
    pub time_max: f64,
    pub time_med: f64,
    pub time_sum: f64,
    #[serde(rename = "time_perc")]
    pub time_pct: f64,
}

/// Turns a finished aggregation pass into the ranked report.
pub struct ReportBuilder {
    time_sum_floor: f64,
    error_ceiling: f64,
}

impl ReportBuilder {
    /// `time_sum_floor` is the minimum cumulative elapsed time a URL must
    /// exceed to appear in the report; `error_ceiling` is the tolerated parse
    /// error ratio in percent.
    pub fn new(time_sum_floor: f64, error_ceiling: f64) -> Self {
        Self {
            time_sum_floor,
            error_ceiling,
        }
    }

    /// Gate on the parse-error ratio, derive per-URL figures, filter and rank.
    ///
    /// The error ratio divides by the distinct-URL count, not the line count.
    /// That denominator is surprising (and probably a latent defect, since the
    /// ratio can exceed 100%), but existing error ceilings are tuned against
    /// it, so it is preserved as-is.
    ///
    /// Reading the state never mutates it: building twice from the same state
    /// yields identical rows.
    pub fn build(&self, state: &AggregationState) -> Result<Vec<ReportRow>> {
        let distinct = state.distinct_urls();
        if distinct == 0 {
            if state.parse_error_count > 0 {
                return Err(Error::NoParsableRecords {
                    parse_errors: state.parse_error_count,
                });
            }
            tracing::warn!("No records observed; producing an empty report");
            return Ok(Vec::new());
        }

        let ratio = state.parse_error_count as f64 / distinct as f64 * 100.0;
        if ratio > self.error_ceiling {
            return Err(Error::ThresholdExceeded {
                ratio,
                ceiling: self.error_ceiling,
            });
        }

        let mut rows: Vec<ReportRow> = state
            .mapping
            .iter()
            .filter(|(_, aggregate)| aggregate.time_sum > self.time_sum_floor)
            .map(|(url, aggregate)| {
                let time_pct = if state.total_time > 0.0 {
                    aggregate.time_sum / state.total_time * 100.0
                } else {
                    0.0
                };
                ReportRow {
                    url: url.clone(),
                    count: aggregate.count,
                    count_pct: round3(aggregate.count as f64 / distinct as f64 * 100.0),
                    time_avg: round3(aggregate.time_avg),
                    time_max: round3(aggregate.time_max),
                    time_med: round3(median(&aggregate.samples)),
                    time_sum: round3(aggregate.time_sum),
                    time_pct: round3(time_pct),
                }
            })
            .collect();

        // Stable sort: equal averages keep first-occurrence order.
        rows.sort_by(|a, b| b.time_avg.total_cmp(&a.time_avg));

        tracing::info!(
            "Report built: {} of {} urls pass the time-sum floor of {}",
            rows.len(),
            distinct,
            self.time_sum_floor
        );
        Ok(rows)
    }
}

/// Standard median: mean of the two middle values for even-length input.
/// Callers guarantee at least one sample.
fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
