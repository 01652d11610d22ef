use anyhow::{Context, Result};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref LOG_NAME: Regex = Regex::new(r"^nginx-access-ui\.log-(\d{8})(\.gz)?$").unwrap();
}

/// The most recent access log found in the log directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestLog {
    pub date: NaiveDate,
    pub path: PathBuf,
    pub compressed: bool,
}

/// Scan `log_dir` for access logs and return the most recent one.
///
/// A missing or empty directory yields `None`, not an error. Names that match
/// the pattern but encode an impossible date are skipped. When a date has both
/// a plain and a gzipped file, the plain one wins.
pub fn find_latest(log_dir: &Path) -> Result<Option<LatestLog>> {
    if !log_dir.is_dir() {
        tracing::info!("Log directory {} does not exist", log_dir.display());
        return Ok(None);
    }

    let mut latest: Option<LatestLog> = None;
    let entries = fs::read_dir(log_dir)
        .with_context(|| format!("failed to read log directory {}", log_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(captures) = LOG_NAME.captures(name) else {
            tracing::debug!("Skipping non-log file {name}");
            continue;
        };
        let Ok(date) = NaiveDate::parse_from_str(&captures[1], "%Y%m%d") else {
            tracing::debug!("Skipping {name}: not a valid date");
            continue;
        };
        let compressed = captures.get(2).is_some();

        let newer = match &latest {
            None => true,
            Some(current) => {
                date > current.date || (date == current.date && current.compressed && !compressed)
            }
        };
        if newer {
            latest = Some(LatestLog {
                date,
                path: entry.path(),
                compressed,
            });
        }
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), "").unwrap();
    }

    #[test]
    fn test_picks_latest_date() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nginx-access-ui.log-20170628");
        touch(dir.path(), "nginx-access-ui.log-20170630");
        touch(dir.path(), "nginx-access-ui.log-20170629.gz");

        let log = find_latest(dir.path()).unwrap().unwrap();

        assert_eq!(log.date, NaiveDate::from_ymd_opt(2017, 6, 30).unwrap());
        assert!(!log.compressed);
        assert!(log.path.ends_with("nginx-access-ui.log-20170630"));
    }

    #[test]
    fn test_recognizes_gzipped_log() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nginx-access-ui.log-20170630.gz");

        let log = find_latest(dir.path()).unwrap().unwrap();
        assert!(log.compressed);
    }

    #[test]
    fn test_date_tie_prefers_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nginx-access-ui.log-20170630.gz");
        touch(dir.path(), "nginx-access-ui.log-20170630");

        let log = find_latest(dir.path()).unwrap().unwrap();
        assert!(!log.compressed);
    }

    #[test]
    fn test_ignores_unrelated_and_near_miss_names() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nginx-access-ui.log-20170630.bz2");
        touch(dir.path(), "nginx-access-ui.log-2017063");
        touch(dir.path(), "otherservice.log-20170630");
        touch(dir.path(), "report-2017.06.30.html");

        assert_eq!(find_latest(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_impossible_date_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nginx-access-ui.log-20179999");
        touch(dir.path(), "nginx-access-ui.log-20170630");

        let log = find_latest(dir.path()).unwrap().unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2017, 6, 30).unwrap());
    }

    #[test]
    fn test_missing_directory_yields_none() {
        assert_eq!(find_latest(Path::new("/nonexistent/logs")).unwrap(), None);
    }

    #[test]
    fn test_empty_directory_yields_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_latest(dir.path()).unwrap(), None);
    }
}
