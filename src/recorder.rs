//! CSV session recorder
//!
//! [`RecordWriter`] is a two-state machine (Closed / Open). Opening creates
//! `<prefix>-<YYYYMMDD_HHMMSS>.csv` in the working directory and writes the
//! header; every append writes and flushes one row; closing moves the file
//! into the completed-jobs directory.
//!
//! ```ignore
//! let mut writer = RecordWriter::new(".", "Finished");
//! writer.open("SenseLog")?;
//! writer.append(&record)?;
//! let summary = writer.close()?;
//! println!("{} rows in {:?}", summary.rows, summary.path);
//! ```

use crate::core::types::SampleRecord;
use crate::error::{Error, Result};
use chrono::Local;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// File name timestamp, local time
const FILE_TIME_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Make sure the completed-jobs directory exists and is a directory.
///
/// Called once at startup; failure is fatal.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(Error::OutputDirectory {
                path: dir.to_path_buf(),
                reason: "exists but is not a directory".to_string(),
            });
        }
        return Ok(());
    }

    fs::create_dir_all(dir).map_err(|e| Error::OutputDirectory {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;
    log::info!("Created completed-jobs directory {:?}", dir);
    Ok(())
}

/// Result of closing a session
#[derive(Debug, Clone)]
pub struct SessionSummary {
    /// Final location inside the completed-jobs directory
    pub path: PathBuf,
    /// Data rows written (header excluded)
    pub rows: u64,
    /// Wall time the session was open
    pub duration: Duration,
}

/// Byte sink behind an open session
pub trait SessionSink: Write + Send {
    /// Push written data to stable storage before the file is moved
    fn sync(&mut self) -> io::Result<()>;
}

impl SessionSink for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Creates the sink for a new session file at the given path
pub type SinkFactory = Box<dyn Fn(&Path) -> io::Result<Box<dyn SessionSink>> + Send>;

fn create_file(path: &Path) -> io::Result<Box<dyn SessionSink>> {
    Ok(Box::new(File::create(path)?))
}

/// One open output file
struct Session {
    file_name: String,
    path: PathBuf,
    writer: BufWriter<Box<dyn SessionSink>>,
    rows: u64,
    opened_at: Instant,
}

pub struct RecordWriter {
    working_dir: PathBuf,
    output_dir: PathBuf,
    create: SinkFactory,
    /// `None` = Closed, `Some` = Open
    session: Option<Session>,
}

impl RecordWriter {
    pub fn new(working_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            output_dir: output_dir.into(),
            create: Box::new(create_file),
            session: None,
        }
    }

    /// Replace how session files are created
    pub fn with_sink_factory(mut self, create: SinkFactory) -> Self {
        self.create = create;
        self
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Name of the open file, if any
    pub fn file_name(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.file_name.as_str())
    }

    /// Rows appended to the open file so far
    pub fn rows(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.rows)
    }

    /// Closed → Open. Creates the file and writes the header row.
    ///
    /// Rejected with [`Error::SessionActive`] while a session is open; the
    /// active file is left untouched.
    pub fn open(&mut self, prefix: &str) -> Result<&str> {
        if self.session.is_some() {
            return Err(Error::SessionActive);
        }

        let stamp = Local::now().format(FILE_TIME_FORMAT).to_string();
        let file_name = self.unique_name(prefix, &stamp);
        let path = self.working_dir.join(&file_name);

        let sink = (self.create)(&path)?;
        let mut writer = BufWriter::new(sink);
        writeln!(writer, "{}", SampleRecord::header())?;
        writer.flush()?;

        log::info!("Opened {:?} for writing", path);
        let session = self.session.insert(Session {
            file_name,
            path,
            writer,
            rows: 0,
            opened_at: Instant::now(),
        });
        Ok(&session.file_name)
    }

    /// Write one row. Flushed immediately so a power cut loses at most one row.
    pub fn append(&mut self, record: &SampleRecord) -> Result<()> {
        let session = self.session.as_mut().ok_or(Error::NoActiveSession)?;
        writeln!(session.writer, "{}", record)?;
        session.writer.flush()?;
        session.rows += 1;
        Ok(())
    }

    /// Open → Closed. Flushes, closes and moves the file into the
    /// completed-jobs directory.
    ///
    /// The writer is Closed afterwards even when the move fails; the file then
    /// stays in the working directory.
    pub fn close(&mut self) -> Result<SessionSummary> {
        let session = self.session.take().ok_or(Error::NoActiveSession)?;
        let Session {
            file_name,
            path,
            writer,
            rows,
            opened_at,
        } = session;

        let mut sink = writer.into_inner().map_err(|e| e.into_error())?;
        sink.sync()?;
        drop(sink);

        let target = self.output_dir.join(&file_name);
        move_file(&path, &target)?;

        log::info!("Closed {} ({} rows) -> {:?}", file_name, rows, target);
        Ok(SessionSummary {
            path: target,
            rows,
            duration: opened_at.elapsed(),
        })
    }

    /// `<prefix>-<stamp>.csv`, suffixed `-N` if a file of that name already
    /// exists in either directory (two sessions within one second).
    fn unique_name(&self, prefix: &str, stamp: &str) -> String {
        let taken =
            |name: &str| self.working_dir.join(name).exists() || self.output_dir.join(name).exists();

        let base = format!("{}-{}.csv", prefix, stamp);
        if !taken(&base) {
            return base;
        }
        (1u32..)
            .map(|n| format!("{}-{}-{}.csv", prefix, stamp, n))
            .find(|name| !taken(name))
            .unwrap_or(base)
    }
}

/// Rename, falling back to copy + remove across filesystems
fn move_file(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            log::debug!("rename {:?} failed ({}), copying instead", from, rename_err);
            fs::copy(from, to).map_err(|_| rename_err)?;
            fs::remove_file(from)?;
            Ok(())
        }
    }
}

impl Drop for RecordWriter {
    fn drop(&mut self) {
        if self.session.is_some() {
            match self.close() {
                Ok(summary) => log::info!("Session finalised on drop: {:?}", summary.path),
                Err(e) => log::error!("Failed to finalise session on drop: {}", e),
            }
        }
    }
}

/// File sink whose writes start failing when a shared switch is set
#[cfg(test)]
pub mod test_sink {
    use super::{SessionSink, SinkFactory};
    use std::fs::File;
    use std::io::{self, Write};
    use std::path::Path;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub struct SwitchedSink {
        file: File,
        fail: Arc<AtomicBool>,
    }

    impl Write for SwitchedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"));
            }
            self.file.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.file.flush()
        }
    }

    impl SessionSink for SwitchedSink {
        fn sync(&mut self) -> io::Result<()> {
            self.file.sync_all()
        }
    }

    pub fn factory(fail: Arc<AtomicBool>) -> SinkFactory {
        Box::new(move |path: &Path| -> io::Result<Box<dyn SessionSink>> {
            let sink = SwitchedSink {
                file: File::create(path)?,
                fail: Arc::clone(&fail),
            };
            Ok(Box::new(sink))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Orientation, Vector3};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tempfile::TempDir;

    fn record(i: u32) -> SampleRecord {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, i)
            .unwrap();
        SampleRecord::new(
            20.0 + i as f64,
            21.0,
            50.0,
            1000.0,
            Orientation::default(),
            Vector3::default(),
            Vector3::new(0.5, 0.25, 0.0),
            ts,
        )
    }

    fn dirs() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let work = temp_dir.path().join("work");
        let done = temp_dir.path().join("Finished");
        fs::create_dir(&work).unwrap();
        fs::create_dir(&done).unwrap();
        (temp_dir, work, done)
    }

    #[test]
    fn test_open_writes_header_and_name() {
        let (_tmp, work, done) = dirs();
        let mut writer = RecordWriter::new(&work, &done);

        let name = writer.open("SenseLog").unwrap().to_string();
        assert!(name.starts_with("SenseLog-"));
        assert!(name.ends_with(".csv"));
        // SenseLog-YYYYMMDD_HHMMSS.csv
        assert_eq!(name.len(), "SenseLog-".len() + 15 + ".csv".len());

        let contents = fs::read_to_string(work.join(&name)).unwrap();
        assert_eq!(contents, format!("{}\n", SampleRecord::header()));
        writer.close().unwrap();
    }

    #[test]
    fn test_full_cycle_moves_file() {
        let (_tmp, work, done) = dirs();
        let mut writer = RecordWriter::new(&work, &done);

        let name = writer.open("Test").unwrap().to_string();
        for i in 0..5 {
            writer.append(&record(i)).unwrap();
        }
        assert_eq!(writer.rows(), 5);

        let summary = writer.close().unwrap();
        assert!(!writer.is_open());
        assert_eq!(summary.rows, 5);
        assert_eq!(summary.path, done.join(&name));
        assert!(!work.join(&name).exists());

        let contents = fs::read_to_string(&summary.path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 6);
        for (i, line) in lines[1..].iter().enumerate() {
            let parsed: SampleRecord = line.parse().unwrap();
            assert_eq!(parsed, record(i as u32));
        }
    }

    #[test]
    fn test_second_open_keeps_active_session() {
        let (_tmp, work, done) = dirs();
        let mut writer = RecordWriter::new(&work, &done);

        let first = writer.open("Test").unwrap().to_string();
        writer.append(&record(0)).unwrap();
        assert!(matches!(writer.open("Test"), Err(Error::SessionActive)));
        assert_eq!(writer.file_name(), Some(first.as_str()));
        assert_eq!(writer.rows(), 1);

        writer.close().unwrap();
        assert_eq!(fs::read_dir(&done).unwrap().count(), 1);
    }

    #[test]
    fn test_append_and_close_require_session() {
        let (_tmp, work, done) = dirs();
        let mut writer = RecordWriter::new(&work, &done);
        assert!(matches!(
            writer.append(&record(0)),
            Err(Error::NoActiveSession)
        ));
        assert!(matches!(writer.close(), Err(Error::NoActiveSession)));
    }

    #[test]
    fn test_same_second_sessions_do_not_collide() {
        let (_tmp, work, done) = dirs();
        let mut writer = RecordWriter::new(&work, &done);

        writer.open("Fast").unwrap();
        let first = writer.close().unwrap();
        writer.open("Fast").unwrap();
        let second = writer.close().unwrap();

        assert_ne!(first.path, second.path);
        assert!(first.path.exists());
        assert!(second.path.exists());
    }

    #[test]
    fn test_open_fails_without_working_dir() {
        let (tmp, _work, done) = dirs();
        let mut writer = RecordWriter::new(tmp.path().join("missing"), &done);
        assert!(matches!(writer.open("Test"), Err(Error::Io(_))));
        assert!(!writer.is_open());
    }

    #[test]
    fn test_close_reports_failed_move() {
        let (tmp, work, _done) = dirs();
        let mut writer = RecordWriter::new(&work, tmp.path().join("gone"));
        let name = writer.open("Test").unwrap().to_string();

        assert!(writer.close().is_err());
        assert!(!writer.is_open());
        assert!(work.join(name).exists());
    }

    #[test]
    fn test_append_failure_keeps_session_open() {
        let (_tmp, work, done) = dirs();
        let fail = Arc::new(AtomicBool::new(false));
        let mut writer = RecordWriter::new(&work, &done)
            .with_sink_factory(test_sink::factory(Arc::clone(&fail)));
        writer.open("Full").unwrap();
        writer.append(&record(0)).unwrap();

        fail.store(true, Ordering::SeqCst);
        assert!(matches!(writer.append(&record(1)), Err(Error::Io(_))));
        assert!(writer.is_open());
        assert_eq!(writer.rows(), 1);

        // The unflushed row cannot be written out either
        assert!(writer.close().is_err());
        assert!(!writer.is_open());
    }

    #[test]
    fn test_ensure_output_dir() {
        let tmp = TempDir::new().unwrap();

        let fresh = tmp.path().join("a").join("Finished");
        ensure_output_dir(&fresh).unwrap();
        assert!(fresh.is_dir());
        // Idempotent
        ensure_output_dir(&fresh).unwrap();

        let file = tmp.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            ensure_output_dir(&file),
            Err(Error::OutputDirectory { .. })
        ));
    }

    #[test]
    fn test_drop_finalises_open_session() {
        let (_tmp, work, done) = dirs();
        let name = {
            let mut writer = RecordWriter::new(&work, &done);
            let name = writer.open("Drop").unwrap().to_string();
            writer.append(&record(1)).unwrap();
            name
        };
        assert!(done.join(&name).exists());
        assert!(!work.join(&name).exists());
    }
}
