//! FileSink - blackboard records as JSON lines
//!
//! One record per line, appended; the parent directory is created on open.

use contracts::{ContractError, EventSink, LogRecord};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

pub struct FileSink {
    name: String,
    path: PathBuf,
    writer: BufWriter<File>,
    lines: u64,
}

impl FileSink {
    /// Open `path` for appending
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            name: name.into(),
            path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&mut self, record: &LogRecord) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }
}

impl EventSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, record),
        fields(sink = %self.name, kind = record.event.kind())
    )]
    async fn write(&mut self, record: &LogRecord) -> Result<(), ContractError> {
        self.append(record)
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    async fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        debug!(sink = %self.name, path = %self.path.display(), lines = self.lines, "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use contracts::{BlackboardStats, LogEvent};
    use tempfile::tempdir;

    fn record(id: &str) -> LogRecord {
        LogRecord {
            timestamp: Utc::now(),
            from: "CoordinatorAgent".into(),
            event: LogEvent::NoResponses {
                incident_id: id.into(),
            },
            stats: BlackboardStats {
                escalations: 1,
                ..BlackboardStats::default()
            },
        }
    }

    #[tokio::test]
    async fn test_writes_one_json_line_per_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("blackboard.jsonl");

        let mut sink = FileSink::open("file", &path).unwrap();
        sink.write(&record("INC-1")).await.unwrap();
        sink.write(&record("INC-2")).await.unwrap();
        sink.close().await.unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: LogRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.event, record("INC-2").event);
        assert_eq!(parsed.stats.escalations, 1);
    }

    #[tokio::test]
    async fn test_appends_to_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bb.jsonl");

        for id in ["INC-1", "INC-2"] {
            let mut sink = FileSink::open("file", &path).unwrap();
            sink.write(&record(id)).await.unwrap();
            sink.close().await.unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
