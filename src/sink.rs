use std::fs::File;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Destination for formatted records.
///
/// The committer calls `write` once per record with the complete formatted
/// bytes while holding the logger's write lock, so implementations never see
/// interleaved records. Fatal and panic calls `close` the sink after their
/// record has been written.
///
/// # Usage
///
/// ```
/// # use chainlog::Sink;
/// # use std::io;
/// // Sink counting the bytes it receives
/// struct Counter(usize);
///
/// impl Sink for Counter {
///     fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
///         self.0 += buf.len();
///         Ok(buf.len())
///     }
///
///     fn close(&mut self) -> io::Result<()> {
///         Ok(())
///     }
/// }
/// ```
pub trait Sink: Send {
    /// Writes one formatted record, returning the number of bytes written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Flushes and releases the destination.
    fn close(&mut self) -> io::Result<()>;
}

impl Sink for io::Stdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for io::Stderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl Sink for File {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.flush()?;
        self.sync_all()
    }
}

/// Adapts any [`io::Write`] into a [`Sink`]; closing flushes the writer.
#[derive(Debug)]
pub struct WriterSink<W>(pub W);

impl<W: Write + Send> Sink for WriterSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write_all(buf)?;
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

/// In-memory sink whose clones share one buffer.
///
/// Useful for capturing output in tests or for handing records to another
/// component. Closing only counts the call; the buffer stays writable.
///
/// # Examples
///
/// ```
/// # use chainlog::{Config, SharedBuffer};
/// let out = SharedBuffer::new();
/// let logger = Config::new("app").sink(out.clone()).build();
/// logger.print("hello");
/// assert!(out.contents_string().ends_with("hello\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    data: Arc<Mutex<Vec<u8>>>,
    closes: Arc<AtomicUsize>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.data.lock().clone()
    }

    pub fn contents_string(&self) -> String {
        String::from_utf8_lossy(&self.data.lock()).into_owned()
    }

    /// Returns the complete lines written so far, without their newlines.
    pub fn lines(&self) -> Vec<String> {
        self.contents_string().lines().map(str::to_owned).collect()
    }

    /// Returns the captured bytes and empties the buffer.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.data.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Number of times `close` has been called.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Sink for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
