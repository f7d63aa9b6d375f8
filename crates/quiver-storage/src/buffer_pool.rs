//! Process-wide pool of scratch buffers for bucket reads.

use parking_lot::Mutex;

/// Initial capacity of pooled buffers.
///
/// 10 KiB fits a 1536-dimension uncompressed f32 vector plus about 3 KiB of
/// object payload, which covers the typical case. Callers that need a larger
/// buffer allocate one themselves and return it to the pool afterwards, so
/// the pool warms up to the workload's real sizes over time.
pub const DEFAULT_BUFFER_CAPACITY: usize = 10 * 1024;

/// A free-list of reusable byte buffers.
///
/// `get` hands out an owned buffer; `put` restores it. Dropping a buffer
/// instead of returning it only costs an extra allocation later, never
/// correctness.
#[derive(Debug)]
pub struct BufferPool {
    initial_capacity: usize,
    free: Mutex<Vec<Vec<u8>>>,
}

impl BufferPool {
    pub const fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            free: Mutex::new(Vec::new()),
        }
    }

    /// Take a cleared buffer from the pool, allocating if the pool is empty.
    pub fn get(&self) -> Vec<u8> {
        self.free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.initial_capacity))
    }

    /// Return a buffer to the pool.
    ///
    /// Buffers that grew past the initial capacity are kept at their grown
    /// size.
    pub fn put(&self, mut buf: Vec<u8>) {
        buf.clear();
        self.free.lock().push(buf);
    }
}

/// The process-wide pool used by the bulk materializer.
pub fn shared() -> &'static BufferPool {
    static POOL: BufferPool = BufferPool::new(DEFAULT_BUFFER_CAPACITY);
    &POOL
}
