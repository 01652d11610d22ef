use crate::Result;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Line-oriented reader over a plain or gzip-compressed access log.
///
/// Both variants hand out lines through the same iterator, so the rest of the
/// pipeline never knows which one it is reading. Lines are pulled on demand;
/// only one line is buffered at a time.
pub struct LineSource {
    inner: Reader,
}

enum Reader {
    Plain(BufReader<File>),
    Gzip(BufReader<GzDecoder<File>>),
}

impl LineSource {
    /// Open a log file, decompressing on the fly when `compressed` is set.
    pub fn open(path: &Path, compressed: bool) -> Result<Self> {
        tracing::debug!("Opening log file: {}", path.display());

        let file = File::open(path)?;
        let inner = if compressed {
            Reader::Gzip(BufReader::new(GzDecoder::new(file)))
        } else {
            Reader::Plain(BufReader::new(file))
        };
        Ok(Self { inner })
    }

    /// Open a log file, inferring compression from a `.gz` extension.
    pub fn open_auto(path: &Path) -> Result<Self> {
        let compressed = path.extension().is_some_and(|ext| ext == "gz");
        Self::open(path, compressed)
    }
}

impl Iterator for LineSource {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        let read = match &mut self.inner {
            Reader::Plain(reader) => reader.read_line(&mut line),
            Reader::Gzip(reader) => reader.read_line(&mut line),
        };
        match read {
            Ok(0) => None,
            Ok(_) => Some(Ok(line)),
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn test_reads_plain_file_line_by_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "first line\nsecond line\n").unwrap();

        let lines: Vec<String> = LineSource::open(&path, false)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(lines, vec!["first line\n", "second line\n"]);
    }

    #[test]
    fn test_reads_gzip_file_line_by_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(b"first line\nsecond line\n").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = LineSource::open(&path, true)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(lines, vec!["first line\n", "second line\n"]);
    }

    #[test]
    fn test_open_auto_detects_gz_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(b"only line\n").unwrap();
        encoder.finish().unwrap();

        let lines: Vec<String> = LineSource::open_auto(&path)
            .unwrap()
            .collect::<io::Result<_>>()
            .unwrap();

        assert_eq!(lines, vec!["only line\n"]);
    }

    #[test]
    fn test_empty_file_yields_no_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.log");
        std::fs::write(&path, "").unwrap();

        let mut source = LineSource::open(&path, false).unwrap();
        assert!(source.next().is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = LineSource::open(Path::new("/nonexistent/access.log"), false);
        assert!(result.is_err());
    }
}
