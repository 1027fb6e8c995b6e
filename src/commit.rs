use std::fmt;
use std::io;

use tracing::subscriber::NoSubscriber;

use crate::buffer_pool::BufferPool;
use crate::error::FormatError;
use crate::format::Formatter;
use crate::handle::Env;
use crate::record::Record;

/// Writes a record that passed the level and filter checks.
///
/// The handle runs the level comparison and the filter before calling the
/// committer, and recycles itself afterwards whatever the committer does. A
/// committer owns the middle of the pipeline: stamping the time, formatting
/// and handing the bytes to a destination. Failures are reported with
/// [`report`] and swallowed; emitting is fire-and-forget.
///
/// A custom committer can send records somewhere other than the sink:
///
/// ```
/// # use chainlog::{Config, Committer, Output, Record};
/// # use std::sync::{Arc, Mutex};
/// struct Collect(Arc<Mutex<Vec<String>>>);
///
/// impl Committer for Collect {
///     fn commit(&self, record: &mut Record, _out: &Output<'_>) {
///         self.0.lock().unwrap().push(record.message_line().to_owned());
///     }
/// }
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let logger = Config::new("app").committer(Collect(seen.clone())).build();
/// logger.print("kept");
/// assert_eq!(*seen.lock().unwrap(), vec!["kept"]);
/// ```
pub trait Committer: Send + Sync {
    fn commit(&self, record: &mut Record, out: &Output<'_>);
}

impl<F> Committer for F
where
    F: Fn(&mut Record, &Output<'_>) + Send + Sync,
{
    fn commit(&self, record: &mut Record, out: &Output<'_>) {
        self(record, out)
    }
}

/// The logger's formatter, sink and buffer pool, as seen by a committer.
pub struct Output<'a> {
    env: &'a Env,
}

impl<'a> Output<'a> {
    pub(crate) fn new(env: &'a Env) -> Self {
        Self { env }
    }

    pub fn formatter(&self) -> &dyn Formatter {
        self.env.formatter.as_ref()
    }

    pub fn buffers(&self) -> &BufferPool {
        &self.env.buffers
    }

    /// Formats `record` into a pooled buffer.
    ///
    /// On failure the buffer has already gone back to the pool. On success the
    /// caller hands it back with [`Output::release`].
    pub fn format(&self, record: &Record) -> Result<Vec<u8>, FormatError> {
        let mut buf = self.env.buffers.acquire();
        match self.env.formatter.format(record, &mut buf) {
            Ok(()) => Ok(buf),
            Err(err) => {
                self.env.buffers.release(buf);
                Err(err)
            }
        }
    }

    /// Writes `bytes` to the sink under the logger's write lock.
    pub fn write(&self, bytes: &[u8]) -> io::Result<usize> {
        self.env.sink.lock().write(bytes)
    }

    pub fn release(&self, buf: Vec<u8>) {
        self.env.buffers.release(buf);
    }
}

/// Default committer: stamp, format into a pooled buffer, write to the sink.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteCommitter;

impl Committer for WriteCommitter {
    fn commit(&self, record: &mut Record, out: &Output<'_>) {
        record.stamp();
        let buf = match out.format(record) {
            Ok(buf) => buf,
            Err(err) => {
                report("formatter failed", &err);
                return;
            }
        };
        if let Err(err) = out.write(&buf) {
            report("writer failed", &err);
        }
        out.release(buf);
    }
}

/// Reports an internal failure on the diagnostic stream.
///
/// The stream is the `tracing` subscriber current on the calling thread when
/// there is one, stderr otherwise. It is never the logger's own sink.
pub fn report(what: &str, err: &dyn fmt::Display) {
    if has_subscriber() {
        tracing::error!(target: "chainlog", error = %err, "{what}");
    } else {
        eprintln!("chainlog: {what}: {err}");
    }
}

fn has_subscriber() -> bool {
    tracing::dispatcher::get_default(|dispatch| !dispatch.is::<NoSubscriber>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_subscriber_check_follows_scope() {
        let subscriber = tracing_subscriber::fmt().with_writer(std::io::sink).finish();
        tracing::subscriber::with_default(subscriber, || assert!(has_subscriber()));

        // A scoped subscriber that has ended leaves nothing to report to
        assert!(!has_subscriber());
        assert!(!thread::spawn(has_subscriber).join().unwrap());
    }
}
