use std::sync::OnceLock;

use bytes::BytesMut;
use crossbeam::queue::SegQueue;
use tracing::trace;

use crate::cursor::{ByteCursor, DEFAULT_BUF_CAPACITY};

/// Reuse pool for cursor lookahead buffers.
///
/// Amortizes allocation when many short-lived decodes run against different
/// sources. The idle set is unbounded and entries never expire; safe under
/// concurrent `acquire`/`release` from independent decode calls.
pub struct CursorPool {
    idle: SegQueue<BytesMut>,
}

impl CursorPool {
    pub fn new() -> Self {
        Self {
            idle: SegQueue::new(),
        }
    }

    /// The process-wide pool used by [`parse`](crate::parse) when the caller
    /// supplies a raw, unbuffered source.
    pub fn global() -> &'static CursorPool {
        static GLOBAL: OnceLock<CursorPool> = OnceLock::new();
        GLOBAL.get_or_init(CursorPool::new)
    }

    /// Returns a cursor over `source`, re-binding an idle buffer if one is
    /// available and constructing a new one otherwise. Ownership of the
    /// cursor transfers fully to the caller until release.
    pub fn acquire<R>(&self, source: R) -> ByteCursor<R> {
        match self.idle.pop() {
            Some(buf) => ByteCursor::with_buffer(source, buf),
            None => {
                trace!("cursor pool empty, allocating a fresh buffer");
                ByteCursor::new(source)
            }
        }
    }

    /// Returns a cursor's buffer to the idle set. The source is dropped; the
    /// cursor must not be used afterwards.
    pub fn release<R>(&self, cursor: ByteCursor<R>) {
        let mut buf = cursor.into_buffer();
        buf.clear();
        if buf.capacity() < DEFAULT_BUF_CAPACITY {
            buf.reserve(DEFAULT_BUF_CAPACITY - buf.capacity());
        }
        self.idle.push(buf);
    }

    /// Number of idle buffers currently parked in the pool.
    pub fn available(&self) -> usize {
        self.idle.len()
    }
}

impl Default for CursorPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::decode::{parse_cursor, DecodeOptions};
    use crate::value::TreeBuilder;

    #[test]
    fn acquire_on_empty_pool_allocates() {
        let pool = CursorPool::new();
        assert_eq!(pool.available(), 0);

        let mut cursor = pool.acquire(&b"i7e"[..]);
        assert_eq!(cursor.read_byte().unwrap(), b'i');
        pool.release(cursor);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn release_then_acquire_reuses_buffer() {
        let pool = CursorPool::new();
        pool.release(pool.acquire(&b""[..]));
        assert_eq!(pool.available(), 1);

        let cursor = pool.acquire(&b""[..]);
        assert_eq!(pool.available(), 0);
        pool.release(cursor);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn global_pool_is_shared() {
        assert!(std::ptr::eq(CursorPool::global(), CursorPool::global()));
    }

    #[test]
    fn concurrent_acquire_release_cycles() {
        const THREADS: usize = 8;
        const ITERATIONS: usize = 200;

        let pool = Arc::new(CursorPool::new());
        let mut handles = Vec::new();
        for _ in 0..THREADS {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for _ in 0..ITERATIONS {
                    let mut cursor = pool.acquire(&b"d3:cow3:moo4:spam4:eggse"[..]);
                    let mut root = None;
                    let mut builder = TreeBuilder::root(&mut root);
                    parse_cursor(&mut cursor, &mut builder, &DecodeOptions::default()).unwrap();
                    pool.release(cursor);

                    let value = root.expect("decode produced no value");
                    assert_eq!(value.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
                    assert_eq!(value.get(b"spam").and_then(|v| v.as_str()), Some("eggs"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Each thread holds at most one cursor at a time, so the pool can
        // never end up with more buffers than threads, and every buffer that
        // went in must still be there.
        let idle = pool.available();
        assert!(idle >= 1 && idle <= THREADS, "idle set corrupted: {idle}");
    }
}
