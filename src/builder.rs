use bytes::Bytes;

/// Sink driven by the decode engine.
///
/// A builder receives decoded structure directly, letting callers bind a
/// bencode stream into any target representation (a generic tree, struct
/// fields, a streaming validator) without an intermediate value graph. The
/// crate's [`TreeBuilder`](crate::TreeBuilder) is the reference
/// implementation, materializing a [`Value`](crate::Value).
///
/// # Contract
///
/// Per decode call it backs, a builder instance receives exactly one terminal
/// setter ([`int64`](Builder::int64), [`uint64`](Builder::uint64),
/// [`float64`](Builder::float64), [`string`](Builder::string)) *or* exactly
/// one container init ([`array`](Builder::array), [`map`](Builder::map)),
/// followed by exactly one [`flush`](Builder::flush). On a decode error the
/// terminal/container call may be absent, but `flush` still fires on every
/// exit path, at every recursion depth, so implementations can release
/// partial state. Builders are responsible for not publishing an incomplete
/// value when the decode call that owns them fails.
///
/// Sub-builders from [`elem`](Builder::elem) and [`key`](Builder::key) are
/// each bound 1:1 to one child decode call and receive their own `flush`
/// before the parent decode call returns.
pub trait Builder {
    /// Sets a signed 64-bit integer value.
    fn int64(&mut self, v: i64);

    /// Sets an unsigned 64-bit integer value (literals above `i64::MAX`).
    fn uint64(&mut self, v: u64);

    /// Sets a 64-bit float value (compatibility fallback for integer
    /// literals that fit neither 64-bit form).
    fn float64(&mut self, v: f64);

    /// Sets a byte string value.
    fn string(&mut self, v: Bytes);

    /// Declares the value under construction to be a list. Called before any
    /// `elem` call on this builder.
    fn array(&mut self);

    /// Declares the value under construction to be a dictionary. Called
    /// before any `key` call on this builder.
    fn map(&mut self);

    /// Returns a builder bound to position `index` of the current list.
    /// Indices arrive strictly increasing from 0, in stream order.
    fn elem(&mut self, index: usize) -> Box<dyn Builder + '_>;

    /// Returns a builder bound to dictionary key `name`. Keys arrive in
    /// encounter order, not sorted; a duplicate key arrives as a second,
    /// separate binding. Resolving duplicates is the implementation's
    /// choice, not the engine's.
    fn key(&mut self, name: Bytes) -> Box<dyn Builder + '_>;

    /// Finalizes this builder's value, committing a sub-builder's result into
    /// its parent container. Invoked exactly once per instance.
    fn flush(&mut self);
}
