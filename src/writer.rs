use std::io;

use crate::handle::Logger;

/// [`io::Write`] adapter that logs each complete line as one record.
///
/// Partial lines are buffered until their newline arrives; whatever is left
/// is logged on `flush` or when the writer is dropped.
///
/// # Examples
///
/// ```
/// # use chainlog::{Config, SharedBuffer};
/// # use std::io::Write;
/// let out = SharedBuffer::new();
/// let logger = Config::new("app").sink(out.clone()).build();
///
/// let mut writer = logger.writer();
/// write!(writer, "first line\nsecond ").unwrap();
/// writer.write_all(b"line\n").unwrap();
///
/// let lines = out.lines();
/// assert_eq!(lines.len(), 2);
/// assert!(lines[1].ends_with(" - second line"));
/// ```
#[derive(Debug)]
pub struct LogWriter {
    logger: Logger,
    pending: Vec<u8>,
}

impl LogWriter {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            pending: Vec::new(),
        }
    }

    fn emit_line(&self, line: &[u8]) {
        self.logger.print(String::from_utf8_lossy(line));
    }
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        let mut start = 0;
        while let Some(pos) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            self.emit_line(&self.pending[start..end]);
            start = end + 1;
        }
        self.pending.drain(..start);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            self.emit_line(&self.pending);
            self.pending.clear();
        }
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
