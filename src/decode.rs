use std::collections::HashSet;
use std::io::Read;

use bytes::Bytes;
use tracing::debug;

use crate::builder::Builder;
use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use crate::pool::CursorPool;
use crate::value::{TreeBuilder, Value};

const MAX_DEPTH: usize = 64;

/// Configuration for a decode call.
///
/// The defaults match the permissive wire-compatible behavior: a 64-level
/// nesting cap, the float fallback for integer literals outside the 64-bit
/// range, and no canonical-form validation.
///
/// # Examples
///
/// ```
/// use rbenc::{decode_with, DecodeOptions, DecodeError};
///
/// let strict = DecodeOptions::new()
///     .float_fallback(false)
///     .require_sorted_keys(true);
///
/// let err = decode_with(b"i1.5e", &strict).unwrap_err();
/// assert!(matches!(err, DecodeError::BadIntegerLiteral(_)));
/// ```
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    max_depth: usize,
    float_fallback: bool,
    reject_duplicate_keys: bool,
    require_sorted_keys: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            float_fallback: true,
            reject_duplicate_keys: false,
            require_sorted_keys: false,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth, bounding stack use against
    /// adversarial input. Defaults to 64.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enables or disables the float fallback for integer literals that fit
    /// neither `i64` nor `u64`. On by default; when off, such literals fail
    /// with [`DecodeError::BadIntegerLiteral`].
    pub fn float_fallback(mut self, enabled: bool) -> Self {
        self.float_fallback = enabled;
        self
    }

    /// Rejects dictionaries containing the same key twice. Off by default:
    /// duplicates are passed through to the builder in stream order.
    pub fn reject_duplicate_keys(mut self, enabled: bool) -> Self {
        self.reject_duplicate_keys = enabled;
        self
    }

    /// Requires dictionary keys to appear in non-descending raw-byte order,
    /// as canonical bencode encoders emit them. Off by default.
    pub fn require_sorted_keys(mut self, enabled: bool) -> Self {
        self.require_sorted_keys = enabled;
        self
    }
}

/// Decodes one bencode value from `data` into a [`Value`] tree.
///
/// Trailing bytes after the value are ignored; use [`parse_cursor`] to decode
/// concatenated documents. The top-level decode of an empty source fails with
/// [`DecodeError::UnexpectedEof`], which callers reading document streams can
/// treat as a clean end.
///
/// # Examples
///
/// ```
/// use rbenc::decode;
///
/// let value = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
/// assert_eq!(value.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
/// ```
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    decode_with(data, &DecodeOptions::default())
}

/// Decodes one bencode value from `data` with explicit [`DecodeOptions`].
pub fn decode_with(data: &[u8], options: &DecodeOptions) -> Result<Value, DecodeError> {
    let mut root = None;
    let mut builder = TreeBuilder::root(&mut root);
    parse_with(data, &mut builder, options)?;
    root.ok_or(DecodeError::UnexpectedEof)
}

/// Decodes one bencode value from an arbitrary byte source into a [`Value`]
/// tree, reading only the bytes belonging to that value.
pub fn decode_from<R: Read>(source: R) -> Result<Value, DecodeError> {
    let mut root = None;
    let mut builder = TreeBuilder::root(&mut root);
    parse(source, &mut builder)?;
    root.ok_or(DecodeError::UnexpectedEof)
}

/// Decodes one bencode value from `source`, driving `builder` with the
/// decoded structure.
///
/// The source is wrapped in a cursor drawn from the process-wide
/// [`CursorPool`] and returned to it when the decode completes, success or
/// failure.
///
/// # Examples
///
/// ```
/// use rbenc::{parse, TreeBuilder};
///
/// let mut root = None;
/// let mut builder = TreeBuilder::root(&mut root);
/// parse(&b"i42e"[..], &mut builder).unwrap();
/// assert_eq!(root.unwrap().as_integer(), Some(42));
/// ```
pub fn parse<R: Read>(source: R, builder: &mut dyn Builder) -> Result<(), DecodeError> {
    parse_with(source, builder, &DecodeOptions::default())
}

/// [`parse`] with explicit [`DecodeOptions`].
pub fn parse_with<R: Read>(
    source: R,
    builder: &mut dyn Builder,
    options: &DecodeOptions,
) -> Result<(), DecodeError> {
    let pool = CursorPool::global();
    let mut cursor = pool.acquire(source);
    let result = parse_cursor(&mut cursor, builder, options);
    pool.release(cursor);
    result
}

/// Decodes one bencode value from a caller-supplied cursor, bypassing the
/// cursor pool.
///
/// The cursor is left positioned at the first byte after the decoded value,
/// so repeated calls walk a stream of concatenated documents.
pub fn parse_cursor<R: Read>(
    cursor: &mut ByteCursor<R>,
    builder: &mut dyn Builder,
    options: &DecodeOptions,
) -> Result<(), DecodeError> {
    let result = parse_value(cursor, builder, options, 0);
    if let Err(err) = &result {
        debug!("bencode decode failed: {err}");
    }
    result
}

/// Flushes the builder when dropped, so the finalize guarantee holds on
/// every exit path of `parse_value`, including error propagation out of
/// nested recursion.
struct FlushGuard<'a> {
    builder: &'a mut dyn Builder,
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.builder.flush();
    }
}

fn parse_value<R: Read>(
    cursor: &mut ByteCursor<R>,
    builder: &mut dyn Builder,
    options: &DecodeOptions,
    depth: usize,
) -> Result<(), DecodeError> {
    let mut guard = FlushGuard { builder };
    parse_value_inner(cursor, &mut *guard.builder, options, depth)
}

fn parse_value_inner<R: Read>(
    cursor: &mut ByteCursor<R>,
    builder: &mut dyn Builder,
    options: &DecodeOptions,
    depth: usize,
) -> Result<(), DecodeError> {
    if depth > options.max_depth {
        return Err(DecodeError::NestingTooDeep);
    }

    let c = cursor.read_byte()?;
    match c {
        b'0'..=b'9' => {
            cursor.unread_byte();
            let bytes = read_string(cursor)?;
            builder.string(bytes);
        }

        b'i' => {
            let literal = cursor.read_until(b'e')?;
            let text = std::str::from_utf8(&literal).map_err(|_| {
                DecodeError::BadIntegerLiteral(String::from_utf8_lossy(&literal).into_owned())
            })?;
            if let Ok(v) = text.parse::<i64>() {
                builder.int64(v);
            } else if let Ok(v) = text.parse::<u64>() {
                builder.uint64(v);
            } else if options.float_fallback {
                match text.parse::<f64>() {
                    Ok(v) => builder.float64(v),
                    Err(_) => return Err(DecodeError::BadIntegerLiteral(text.to_owned())),
                }
            } else {
                return Err(DecodeError::BadIntegerLiteral(text.to_owned()));
            }
        }

        b'd' => {
            builder.map();
            let mut prev_key: Option<Bytes> = None;
            let mut seen: Option<HashSet<Bytes>> =
                options.reject_duplicate_keys.then(HashSet::new);
            loop {
                let next = peek_byte(cursor)?;
                if next == b'e' {
                    cursor.read_byte()?;
                    break;
                }
                if !next.is_ascii_digit() {
                    return Err(DecodeError::NonStringDictionaryKey(next));
                }
                let key = read_string(cursor)?;
                if options.require_sorted_keys {
                    if let Some(prev) = &prev_key {
                        if key < *prev {
                            return Err(DecodeError::UnsortedKey(
                                String::from_utf8_lossy(&key).into_owned(),
                            ));
                        }
                    }
                }
                if let Some(seen) = &mut seen {
                    if !seen.insert(key.clone()) {
                        return Err(DecodeError::DuplicateKey(
                            String::from_utf8_lossy(&key).into_owned(),
                        ));
                    }
                }
                let mut sub = builder.key(key.clone());
                parse_value(cursor, &mut *sub, options, depth + 1)?;
                prev_key = Some(key);
            }
        }

        b'l' => {
            builder.array();
            let mut index = 0usize;
            loop {
                let next = peek_byte(cursor)?;
                if next == b'e' {
                    cursor.read_byte()?;
                    break;
                }
                let mut sub = builder.elem(index);
                parse_value(cursor, &mut *sub, options, depth + 1)?;
                index += 1;
            }
        }

        other => return Err(DecodeError::UnexpectedDiscriminator(other)),
    }

    Ok(())
}

fn peek_byte<R: Read>(cursor: &mut ByteCursor<R>) -> Result<u8, DecodeError> {
    match cursor.peek(1)? {
        [b, ..] => Ok(*b),
        [] => Err(DecodeError::UnexpectedEof),
    }
}

fn read_string<R: Read>(cursor: &mut ByteCursor<R>) -> Result<Bytes, DecodeError> {
    let prefix = cursor.read_until(b':')?;
    let len = parse_length(&prefix)?;
    cursor.read_exact(len)
}

fn parse_length(prefix: &[u8]) -> Result<usize, DecodeError> {
    let text = std::str::from_utf8(prefix).map_err(|_| DecodeError::MalformedLength)?;
    let len = text
        .parse::<i64>()
        .map_err(|_| DecodeError::MalformedLength)?;
    if len < 0 {
        return Err(DecodeError::NegativeLength);
    }
    usize::try_from(len).map_err(|_| DecodeError::MalformedLength)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_parsing() {
        assert_eq!(parse_length(b"0").unwrap(), 0);
        assert_eq!(parse_length(b"42").unwrap(), 42);
        assert!(matches!(
            parse_length(b"-5"),
            Err(DecodeError::NegativeLength)
        ));
        assert!(matches!(
            parse_length(b"4x2"),
            Err(DecodeError::MalformedLength)
        ));
        assert!(matches!(
            parse_length(b""),
            Err(DecodeError::MalformedLength)
        ));
        // Larger than any i64 length.
        assert!(matches!(
            parse_length(b"99999999999999999999"),
            Err(DecodeError::MalformedLength)
        ));
    }
}
