use bytes::Bytes;

use crate::builder::Builder;

/// A decoded bencode value.
///
/// Bencode has four data types: integers, byte strings, lists, and
/// dictionaries. Integer literals outside the signed 64-bit range surface as
/// [`Unsigned`](Value::Unsigned) or, as a last resort, [`Float`](Value::Float)
/// (see [`DecodeOptions::float_fallback`](crate::DecodeOptions::float_fallback)).
///
/// Dictionaries preserve stream order and may hold duplicate keys; the decoder
/// reports keys exactly as encountered and leaves duplicate resolution to the
/// consumer.
///
/// # Examples
///
/// ```
/// use rbenc::{decode, Value};
///
/// let int = decode(b"i42e").unwrap();
/// assert_eq!(int.as_integer(), Some(42));
///
/// let string = decode(b"4:spam").unwrap();
/// assert_eq!(string.as_str(), Some("spam"));
///
/// let list = decode(b"l4:spami42ee").unwrap();
/// assert_eq!(list.as_list().map(|l| l.len()), Some(2));
///
/// let dict = decode(b"d3:foo3:bare").unwrap();
/// assert_eq!(dict.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A signed 64-bit integer.
    Integer(i64),
    /// An unsigned 64-bit integer that does not fit in `i64`.
    Unsigned(u64),
    /// A 64-bit float, produced only by the integer-literal fallback.
    Float(f64),
    /// A byte string (may or may not be valid UTF-8).
    Bytes(Bytes),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A dictionary in stream order. Duplicate keys are preserved.
    Dict(Vec<(Bytes, Value)>),
}

impl Value {
    /// Creates a byte string value from a UTF-8 string.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// Returns the value as a signed integer, if it is one.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbenc::Value;
    ///
    /// assert_eq!(Value::Integer(42).as_integer(), Some(42));
    /// assert_eq!(Value::string("hello").as_integer(), None);
    /// ```
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an unsigned integer, if it decoded through the
    /// unsigned path.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbenc::decode;
    ///
    /// let value = decode(b"i18446744073709551615e").unwrap();
    /// assert_eq!(value.as_unsigned(), Some(u64::MAX));
    /// ```
    pub fn as_unsigned(&self) -> Option<u64> {
        match self {
            Value::Unsigned(u) => Some(*u),
            _ => None,
        }
    }

    /// Returns the value as a float, if it decoded through the float
    /// fallback.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a byte string, if it is one.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a UTF-8 string, if it is a byte string holding
    /// valid UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbenc::Value;
    ///
    /// assert_eq!(Value::string("hello").as_str(), Some("hello"));
    /// assert_eq!(Value::Integer(42).as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Returns the value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Returns the value as dictionary entries in stream order, if it is a
    /// dictionary.
    pub fn as_dict(&self) -> Option<&[(Bytes, Value)]> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Consumes the value and returns the dictionary entries, if it is one.
    pub fn into_dict(self) -> Option<Vec<(Bytes, Value)>> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Looks up a key in this value if it is a dictionary.
    ///
    /// Returns the first entry with that key in stream order, or `None` if
    /// the value is not a dictionary or the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbenc::decode;
    ///
    /// let value = decode(b"d3:foo3:bare").unwrap();
    /// assert_eq!(value.get(b"foo").and_then(|v| v.as_str()), Some("bar"));
    /// assert_eq!(value.get(b"missing"), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict()?
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Unsigned(u)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(l: Vec<Value>) -> Self {
        Value::List(l)
    }
}

enum Slot<'a> {
    Root(&'a mut Option<Value>),
    List(&'a mut Vec<Value>),
    Dict(&'a mut Vec<(Bytes, Value)>, Bytes),
}

/// Reference [`Builder`] that materializes a [`Value`] tree.
///
/// # Examples
///
/// ```
/// use rbenc::{parse, TreeBuilder};
///
/// let mut root = None;
/// let mut builder = TreeBuilder::root(&mut root);
/// parse(&b"l4:spami42ee"[..], &mut builder).unwrap();
///
/// let value = root.unwrap();
/// assert_eq!(value.as_list().map(|l| l.len()), Some(2));
/// ```
pub struct TreeBuilder<'a> {
    slot: Slot<'a>,
    value: Option<Value>,
}

impl<'a> TreeBuilder<'a> {
    /// Creates a top-level builder writing its result into `slot` on flush.
    ///
    /// The slot stays `None` if the decode fails before a complete value is
    /// assembled.
    pub fn root(slot: &'a mut Option<Value>) -> Self {
        Self {
            slot: Slot::Root(slot),
            value: None,
        }
    }

    fn child(slot: Slot<'a>) -> Self {
        Self { slot, value: None }
    }
}

impl Builder for TreeBuilder<'_> {
    fn int64(&mut self, v: i64) {
        self.value = Some(Value::Integer(v));
    }

    fn uint64(&mut self, v: u64) {
        self.value = Some(Value::Unsigned(v));
    }

    fn float64(&mut self, v: f64) {
        self.value = Some(Value::Float(v));
    }

    fn string(&mut self, v: Bytes) {
        self.value = Some(Value::Bytes(v));
    }

    fn array(&mut self) {
        self.value = Some(Value::List(Vec::new()));
    }

    fn map(&mut self) {
        self.value = Some(Value::Dict(Vec::new()));
    }

    fn elem(&mut self, _index: usize) -> Box<dyn Builder + '_> {
        if !matches!(self.value, Some(Value::List(_))) {
            self.value = Some(Value::List(Vec::new()));
        }
        match &mut self.value {
            Some(Value::List(items)) => Box::new(TreeBuilder::child(Slot::List(items))),
            _ => unreachable!("array() precedes elem()"),
        }
    }

    fn key(&mut self, name: Bytes) -> Box<dyn Builder + '_> {
        if !matches!(self.value, Some(Value::Dict(_))) {
            self.value = Some(Value::Dict(Vec::new()));
        }
        match &mut self.value {
            Some(Value::Dict(entries)) => Box::new(TreeBuilder::child(Slot::Dict(entries, name))),
            _ => unreachable!("map() precedes key()"),
        }
    }

    fn flush(&mut self) {
        if let Some(value) = self.value.take() {
            match &mut self.slot {
                Slot::Root(slot) => **slot = Some(value),
                Slot::List(items) => items.push(value),
                Slot::Dict(entries, key) => entries.push((std::mem::take(key), value)),
            }
        }
    }
}
