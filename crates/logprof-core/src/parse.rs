/// One log line reduced to the two fields the report cares about.
///
/// `None` in both slots marks a line whose structure could not be split into
/// the expected fields. Malformed elapsed-time text is *not* rejected here; it
/// survives as text and fails numeric conversion in the accumulator instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub url: Option<String>,
    pub elapsed: Option<String>,
}

impl LogRecord {
    fn unparsable() -> Self {
        Self {
            url: None,
            elapsed: None,
        }
    }
}

/// Extract the `(url, elapsed)` pair from a single raw log line.
///
/// The URL is the first double-quote-delimited field of the line (the quoted
/// HTTP request line); the elapsed time is the final whitespace-delimited
/// token, with trailing escape artifacts stripped. Never fails: a line that
/// does not fit this shape yields an unparsable record.
pub fn parse_line(line: &str) -> LogRecord {
    let Some(url) = line.split('"').nth(1) else {
        return LogRecord::unparsable();
    };
    let Some(elapsed) = line.split_whitespace().next_back() else {
        return LogRecord::unparsable();
    };
    // Some log shippers leave a literal `\n'` glued to the last token.
    let elapsed = elapsed.trim_end_matches("\\n'");

    LogRecord {
        url: Some(url.to_string()),
        elapsed: Some(elapsed.to_string()),
    }
}

/// Lazily map raw lines to records, one record per line.
pub fn parse_lines<I>(lines: I) -> impl Iterator<Item = LogRecord>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    lines.into_iter().map(|line| parse_line(line.as_ref()))
}
