use parking_lot::Mutex;

use crate::record::Record;

/// Default number of handles created when a logger is built.
pub const DEFAULT_POOL_SIZE: usize = 100;

/// Free list of recycled handle state.
///
/// A [`Handle`](crate::Handle) is a thin wrapper around a pooled [`Record`]
/// plus reference-counted configuration. The record is the only part that owns
/// heap storage (domain bytes, tags, message), so the pool keeps records and
/// reassembles a handle around one on every `get`.
///
/// The pool is pre-filled when the logger is built, grows on demand when it
/// runs dry and never shrinks.
///
/// # Thread Safety
///
/// `get` and `put` may be called concurrently from any thread. The lock is
/// held only for the pop or push.
#[derive(Debug)]
pub struct HandlePool {
    domain: Vec<u8>,
    free: Mutex<Vec<Record>>,
}

impl HandlePool {
    /// Creates a pool holding `size` records for `domain`.
    pub fn new(domain: &[u8], size: usize) -> Self {
        let free = (0..size).map(|_| Record::new(domain)).collect();
        Self {
            domain: domain.to_vec(),
            free: Mutex::new(free),
        }
    }

    /// Takes a reset record, allocating a new one if the pool is empty.
    pub fn get(&self) -> Record {
        let recycled = self.free.lock().pop();
        recycled.unwrap_or_else(|| Record::new(&self.domain))
    }

    /// Resets `record` and returns it to the pool.
    pub fn put(&self, mut record: Record) {
        record.reset();
        self.free.lock().push(record);
    }

    /// Number of idle records currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}
