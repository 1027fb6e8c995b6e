//! Recycled byte buffers for assembling formatted records.
//!
//! Formatting a record appends into a buffer taken from this pool, so the
//! steady state of a logger performs no per-record heap allocation for the
//! output bytes. Buffers are handed out by value: `release` takes ownership,
//! which makes releasing the same buffer twice impossible, and a formatter
//! only ever sees `&mut Vec<u8>` so it cannot keep the buffer past the call.
//!
//! # Thread Safety
//!
//! The pool is a mutex-guarded free list and may be shared by any number of
//! threads. The lock is held only for the push or pop.

use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

/// Initial capacity of pooled buffers.
pub const DEFAULT_BUFFER_CAPACITY: usize = 512;

/// Buffers that grew past this size are dropped on release instead of pooled.
const MAX_POOLED_CAPACITY: usize = 64 * 1024;

lazy_static! {
    /// Process-wide buffer pool used by the default committer.
    static ref BUFFERS: Arc<BufferPool> = Arc::new(BufferPool::new(DEFAULT_BUFFER_CAPACITY));
}

/// Returns the process-wide buffer pool, shared by every logger that was not
/// configured with its own buffer capacity.
pub fn buffer_pool() -> Arc<BufferPool> {
    Arc::clone(&BUFFERS)
}

/// A free list of byte buffers with a common initial capacity.
///
/// # Examples
///
/// ```
/// # use chainlog::buffer_pool::BufferPool;
/// let pool = BufferPool::new(512);
/// let mut buf = pool.acquire();
/// assert!(buf.is_empty());
/// assert!(buf.capacity() >= 512);
///
/// buf.extend_from_slice(b"hello");
/// pool.release(buf);
///
/// // The released buffer comes back empty
/// let again = pool.acquire();
/// assert!(again.is_empty());
/// ```
#[derive(Debug)]
pub struct BufferPool {
    capacity: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Creates a pool pre-filled with `count` buffers.
    pub fn with_buffers(capacity: usize, count: usize) -> Self {
        let free = (0..count).map(|_| Vec::with_capacity(capacity)).collect();
        Self {
            capacity,
            free: Mutex::new(free),
        }
    }

    /// Takes an empty buffer from the pool, allocating one if the pool is dry.
    pub fn acquire(&self) -> Vec<u8> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.capacity))
    }

    /// Clears `buf` and returns it to the pool.
    pub fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        buf.clear();
        self.free.lock().push(buf);
    }

    /// Initial capacity of buffers allocated by this pool.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of idle buffers currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}
