use std::io::Read;

use bytes::{Buf, Bytes, BytesMut};

use crate::error::DecodeError;

pub(crate) const DEFAULT_BUF_CAPACITY: usize = 8 * 1024;

const READ_CHUNK: usize = 4 * 1024;

/// Buffered reader over a byte source with one byte of pushback.
///
/// A cursor owns its source exclusively for its lifetime. After every decode
/// step the read position sits exactly at the first byte following the value
/// just decoded, so trailing bytes (a protocol envelope, a concatenated
/// document) remain readable by the caller.
pub struct ByteCursor<R> {
    source: R,
    buf: BytesMut,
    pos: usize,
}

impl<R> ByteCursor<R> {
    /// Creates a cursor over `source` with a fresh lookahead buffer.
    ///
    /// Use [`CursorPool::acquire`](crate::CursorPool::acquire) instead when
    /// many short-lived cursors are created against different sources.
    pub fn new(source: R) -> Self {
        Self::with_buffer(source, BytesMut::with_capacity(DEFAULT_BUF_CAPACITY))
    }

    pub(crate) fn with_buffer(source: R, buf: BytesMut) -> Self {
        debug_assert!(buf.is_empty());
        Self {
            source,
            buf,
            pos: 0,
        }
    }

    /// Consumes the cursor and returns the underlying source.
    ///
    /// Any bytes already pulled into the lookahead buffer are discarded.
    pub fn into_inner(self) -> R {
        self.source
    }

    pub(crate) fn into_buffer(self) -> BytesMut {
        self.buf
    }

    /// Pushes back the single most recently read byte.
    ///
    /// Calling this twice without an intervening read is a contract violation;
    /// the decode engine never does so.
    pub fn unread_byte(&mut self) {
        debug_assert!(self.pos > 0, "unread_byte without a preceding read");
        self.pos = self.pos.saturating_sub(1);
    }

    fn buffered(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl<R: Read> ByteCursor<R> {
    /// Pulls one chunk from the source into the lookahead buffer.
    ///
    /// Consumed bytes are compacted away first, keeping one byte of history
    /// so `unread_byte` stays valid across a refill. Returns the number of
    /// bytes read; zero means end of stream.
    fn fill(&mut self) -> std::io::Result<usize> {
        if self.pos > 1 {
            self.buf.advance(self.pos - 1);
            self.pos = 1;
        }
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.source.read(&mut chunk)?;
        self.buf.extend_from_slice(&chunk[..n]);
        Ok(n)
    }

    /// Reads one byte, failing with [`DecodeError::UnexpectedEof`] if none
    /// remains.
    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        while self.buffered() == 0 {
            if self.fill()? == 0 {
                return Err(DecodeError::UnexpectedEof);
            }
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Returns up to `n` bytes without consuming them.
    ///
    /// Fills from the source as needed; a shorter slice is returned only at
    /// true end of stream.
    pub fn peek(&mut self, n: usize) -> Result<&[u8], DecodeError> {
        while self.buffered() < n {
            if self.fill()? == 0 {
                break;
            }
        }
        let end = self.buf.len().min(self.pos + n);
        Ok(&self.buf[self.pos..end])
    }

    /// Reads bytes up to `delim`, consuming the delimiter but excluding it
    /// from the result.
    ///
    /// Fails with [`DecodeError::UnterminatedField`] if the stream ends before
    /// the delimiter appears.
    pub fn read_until(&mut self, delim: u8) -> Result<Vec<u8>, DecodeError> {
        let mut scanned = 0;
        loop {
            if let Some(i) = self.buf[self.pos + scanned..].iter().position(|&b| b == delim) {
                let end = self.pos + scanned + i;
                let out = self.buf[self.pos..end].to_vec();
                self.pos = end + 1;
                return Ok(out);
            }
            scanned = self.buffered();
            if self.fill()? == 0 {
                return Err(DecodeError::UnterminatedField);
            }
        }
    }

    /// Reads exactly `n` bytes.
    ///
    /// When the whole span is already resident in the lookahead buffer the
    /// result is a shared view into that allocation; otherwise the buffered
    /// prefix is drained and the remainder read from the source into a fresh
    /// buffer. Both paths yield byte-identical output.
    ///
    /// Exhaustion with nothing delivered fails with
    /// [`DecodeError::UnexpectedEof`]; exhaustion after partial data fails
    /// with [`DecodeError::Truncated`].
    pub fn read_exact(&mut self, n: usize) -> Result<Bytes, DecodeError> {
        if self.buffered() >= n {
            self.buf.advance(self.pos);
            self.pos = 0;
            return Ok(self.buf.split_to(n).freeze());
        }

        let mut out = BytesMut::with_capacity(n);
        out.extend_from_slice(&self.buf[self.pos..]);
        self.buf.clear();
        self.pos = 0;

        let mut filled = out.len();
        out.resize(n, 0);
        while filled < n {
            let r = self.source.read(&mut out[filled..])?;
            if r == 0 {
                break;
            }
            filled += r;
        }
        if filled < n {
            return Err(if filled == 0 {
                DecodeError::UnexpectedEof
            } else {
                DecodeError::Truncated
            });
        }
        Ok(out.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_byte_and_unread() {
        let mut cursor = ByteCursor::new(&b"abc"[..]);
        assert_eq!(cursor.read_byte().unwrap(), b'a');
        cursor.unread_byte();
        assert_eq!(cursor.read_byte().unwrap(), b'a');
        assert_eq!(cursor.read_byte().unwrap(), b'b');
        assert_eq!(cursor.read_byte().unwrap(), b'c');
        assert!(matches!(
            cursor.read_byte(),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut cursor = ByteCursor::new(&b"spam"[..]);
        assert_eq!(cursor.peek(2).unwrap(), b"sp");
        assert_eq!(cursor.peek(10).unwrap(), b"spam");
        assert_eq!(cursor.read_byte().unwrap(), b's');
    }

    #[test]
    fn read_until_excludes_delimiter() {
        let mut cursor = ByteCursor::new(&b"42:rest"[..]);
        assert_eq!(cursor.read_until(b':').unwrap(), b"42");
        assert_eq!(cursor.read_byte().unwrap(), b'r');
    }

    #[test]
    fn read_until_unterminated() {
        let mut cursor = ByteCursor::new(&b"42"[..]);
        assert!(matches!(
            cursor.read_until(b':'),
            Err(DecodeError::UnterminatedField)
        ));
    }

    #[test]
    fn read_exact_leaves_position_at_boundary() {
        let mut cursor = ByteCursor::new(&b"spamtail"[..]);
        assert_eq!(cursor.read_exact(4).unwrap(), Bytes::from_static(b"spam"));
        assert_eq!(cursor.read_byte().unwrap(), b't');
    }

    #[test]
    fn read_exact_distinguishes_truncation_from_eof() {
        let mut cursor = ByteCursor::new(&b"ab"[..]);
        assert!(matches!(cursor.read_exact(5), Err(DecodeError::Truncated)));

        let mut cursor = ByteCursor::new(&b""[..]);
        assert!(matches!(
            cursor.read_exact(3),
            Err(DecodeError::UnexpectedEof)
        ));
    }

    #[test]
    fn read_exact_zero_length() {
        let mut cursor = ByteCursor::new(&b"i0e"[..]);
        assert_eq!(cursor.read_exact(0).unwrap(), Bytes::new());
        assert_eq!(cursor.read_byte().unwrap(), b'i');
    }

    #[test]
    fn unread_survives_refill() {
        // Source longer than one read chunk forces a refill mid-stream.
        let data: Vec<u8> = (0..3 * READ_CHUNK).map(|i| (i % 7) as u8).collect();
        let mut cursor = ByteCursor::new(&data[..]);
        for &expected in &data {
            let b = cursor.read_byte().unwrap();
            cursor.unread_byte();
            assert_eq!(cursor.read_byte().unwrap(), b);
            assert_eq!(b, expected);
        }
    }
}
