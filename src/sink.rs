use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Synchronous destination for encoded log lines.
///
/// Implementations must write each line atomically with respect to other
/// callers; the logger calls `write_line` from arbitrary threads.
pub trait LogSink: Send + Sync {
    /// Write one encoded record.
    ///
    /// **Parameters**
    /// - `line`: a fully-encoded record, including its trailing newline.
    ///
    /// **Returns**
    /// - `Ok(())` if the line was accepted.
    /// - `Err(..)` if the underlying stream failed. The logger reports the
    ///   failure on its error output and carries on.
    fn write_line(&self, line: &[u8]) -> io::Result<()>;

    /// Flush any buffered data. Default implementation is a no-op.
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Where a logger writes: a standard stream or a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stderr,
    Stdout,
    Path(PathBuf),
}

impl Destination {
    /// `"stderr"` and `"stdout"` name the standard streams; anything else
    /// is a file path.
    pub fn parse(name: &str) -> Self {
        match name {
            "stderr" => Destination::Stderr,
            "stdout" => Destination::Stdout,
            path => Destination::Path(PathBuf::from(path)),
        }
    }

    /// Open the destination as a sink. Files are created if missing and
    /// appended to.
    pub fn open(&self) -> io::Result<Arc<dyn LogSink>> {
        match self {
            Destination::Stderr => Ok(Arc::new(StderrSink)),
            Destination::Stdout => Ok(Arc::new(StdoutSink)),
            Destination::Path(path) => Ok(Arc::new(FileSink::open(path)?)),
        }
    }
}

/// Standard error. `Stderr` locks internally for each `write_all`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        io::stderr().lock().write_all(line)
    }

    fn flush(&self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        io::stdout().lock().write_all(line)
    }

    fn flush(&self) -> io::Result<()> {
        io::stdout().flush()
    }
}

/// Append-only file.
#[derive(Debug)]
pub struct FileSink {
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSink { file: Mutex::new(file) })
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_all(line)
    }

    fn flush(&self) -> io::Result<()> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner).flush()
    }
}

/// In-memory sink; clones share the same buffer.
///
/// Handy for asserting on encoded output.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    pub fn contents(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Written lines, without their terminators.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl LogSink for MemorySink {
    fn write_line(&self, line: &[u8]) -> io::Result<()> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(line);
        Ok(())
    }
}
