//! rbenc - Streaming bencode decoding ([BEP-3]).
//!
//! Bencode is the serialization format used throughout BitTorrent for storing
//! and transmitting structured data, including `.torrent` files and tracker
//! responses. This crate decodes a bencode byte stream in a single pass,
//! driving a caller-supplied [`Builder`] with the decoded structure instead of
//! forcing an intermediate generic value tree. A convenience entry point that
//! does materialize a generic [`Value`] is layered on top.
//!
//! # Data Types
//!
//! Bencode supports four data types:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Examples
//!
//! ## Decoding into a generic value
//!
//! ```
//! use rbenc::decode;
//!
//! // Decode an integer
//! let value = decode(b"i42e").unwrap();
//! assert_eq!(value.as_integer(), Some(42));
//!
//! // Decode a string
//! let value = decode(b"4:spam").unwrap();
//! assert_eq!(value.as_str(), Some("spam"));
//!
//! // Decode a dictionary (entries keep stream order)
//! let value = decode(b"d3:cow3:moo4:spam4:eggse").unwrap();
//! assert_eq!(value.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
//! ```
//!
//! ## Decoding through a builder
//!
//! The engine reports structure to a [`Builder`] as it is recognized: one
//! terminal or container call per value, sub-builders for list elements and
//! dictionary keys, and exactly one `flush` per builder on every exit path.
//! [`TreeBuilder`] is the reference implementation; custom builders can bind
//! directly into struct fields or validate a stream without materializing it.
//!
//! ```
//! use rbenc::{parse, TreeBuilder};
//!
//! let mut root = None;
//! let mut builder = TreeBuilder::root(&mut root);
//! parse(&b"l4:spami42ee"[..], &mut builder).unwrap();
//!
//! let value = root.unwrap();
//! assert_eq!(value.as_list().map(|l| l.len()), Some(2));
//! ```
//!
//! ## Decoding a stream of documents
//!
//! The decoder consumes only the bytes belonging to one value, so a cursor
//! can be walked across concatenated documents:
//!
//! ```
//! use rbenc::{parse_cursor, ByteCursor, DecodeOptions, TreeBuilder};
//!
//! let mut cursor = ByteCursor::new(&b"i1ei2e"[..]);
//! let options = DecodeOptions::default();
//!
//! for expected in [1, 2] {
//!     let mut root = None;
//!     let mut builder = TreeBuilder::root(&mut root);
//!     parse_cursor(&mut cursor, &mut builder, &options).unwrap();
//!     assert_eq!(root.unwrap().as_integer(), Some(expected));
//! }
//! ```
//!
//! # Error Handling
//!
//! Decoding can fail for various reasons:
//!
//! - [`DecodeError::UnexpectedEof`] - Input ended where a value was required
//! - [`DecodeError::Truncated`] - A byte string was cut short mid-payload
//! - [`DecodeError::UnterminatedField`] - A length or integer literal never
//!   reached its delimiter
//! - [`DecodeError::BadIntegerLiteral`] - Integer literal matched no numeric
//!   form
//! - [`DecodeError::NonStringDictionaryKey`] - A dictionary key position held
//!   a non-string value
//! - [`DecodeError::NestingTooDeep`] - Recursion limit exceeded (64 levels by
//!   default, see [`DecodeOptions::max_depth`])
//!
//! The first error anywhere in the recursion aborts the whole decode; no
//! partial result is published.
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod builder;
mod cursor;
mod decode;
mod error;
mod pool;
mod value;

pub use builder::Builder;
pub use cursor::ByteCursor;
pub use decode::{decode, decode_from, decode_with, parse, parse_cursor, parse_with, DecodeOptions};
pub use error::DecodeError;
pub use pool::CursorPool;
pub use value::{TreeBuilder, Value};
