//! Cursors over packed (key, value) pair buffers.
//!
//! A pair buffer is a contiguous byte sequence of records laid out as a
//! little-endian `i64` key followed immediately by `el_size` value bytes,
//! so the record stride is `8 + el_size`. The stride is a runtime value
//! that depends on the algebraic structure, which is the whole reason
//! these cursors exist: plain slices cannot step by a dynamic stride.

use crate::algebra::Algstrct;

/// Byte width of the key field of a pair.
pub const KEY_BYTES: usize = 8;

/// In-memory image of one pair for a statically known element type.
///
/// `repr(C, packed)` pins the layout to the buffer contract: key at offset
/// zero, value at offset 8, no alignment padding, alignment one. A byte
/// buffer of pairs can therefore be reinterpreted as a slice of these at
/// any address.
#[repr(C, packed)]
#[derive(Clone, Copy)]
pub(crate) struct PackedPair<T> {
    pub key: i64,
    // Never read by name; carried so the record has the value's width.
    #[allow(dead_code)]
    pub val: T,
}

/// Read-only cursor over a pair buffer.
#[derive(Clone, Copy)]
pub struct PairsRef<'a> {
    buf: &'a [u8],
    pair_size: usize,
}

/// Handle to a single pair inside a buffer.
#[derive(Clone, Copy)]
pub struct PairRef<'a> {
    bytes: &'a [u8],
}

impl<'a> PairRef<'a> {
    pub(crate) fn from_bytes(bytes: &'a [u8]) -> Self {
        PairRef { bytes }
    }

    /// The pair's key.
    pub fn key(&self) -> i64 {
        i64::from_le_bytes(self.bytes[..KEY_BYTES].try_into().unwrap())
    }

    /// The pair's value bytes.
    pub fn val(&self) -> &'a [u8] {
        &self.bytes[KEY_BYTES..]
    }

    /// The raw bytes of the whole record.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl<'a> PairsRef<'a> {
    /// Wrap `buf`, whose stride is given by `sr`.
    pub fn new(buf: &'a [u8], sr: &dyn Algstrct) -> Self {
        Self::with_stride(buf, sr.pair_size())
    }

    pub(crate) fn with_stride(buf: &'a [u8], pair_size: usize) -> Self {
        assert!(
            buf.len() % pair_size == 0,
            "pair buffer of {} bytes is not a multiple of the pair stride {}",
            buf.len(),
            pair_size
        );
        PairsRef { buf, pair_size }
    }

    /// Number of pairs in the buffer.
    pub fn len(&self) -> usize {
        self.buf.len() / self.pair_size
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Handle to the `i`-th pair.
    pub fn pair(&self, i: usize) -> PairRef<'a> {
        let at = i * self.pair_size;
        PairRef::from_bytes(&self.buf[at..at + self.pair_size])
    }

    /// Key of the `i`-th pair.
    pub fn key(&self, i: usize) -> i64 {
        self.pair(i).key()
    }
}

/// Mutable cursor over a pair buffer.
pub struct PairsMut<'a> {
    buf: &'a mut [u8],
    pair_size: usize,
}

impl<'a> PairsMut<'a> {
    /// Wrap `buf`, whose stride is given by `sr`.
    pub fn new(buf: &'a mut [u8], sr: &dyn Algstrct) -> Self {
        Self::with_stride(buf, sr.pair_size())
    }

    pub(crate) fn with_stride(buf: &'a mut [u8], pair_size: usize) -> Self {
        assert!(
            buf.len() % pair_size == 0,
            "pair buffer of {} bytes is not a multiple of the pair stride {}",
            buf.len(),
            pair_size
        );
        PairsMut { buf, pair_size }
    }

    /// Number of pairs in the buffer.
    pub fn len(&self) -> usize {
        self.buf.len() / self.pair_size
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Key of the `i`-th pair.
    pub fn key(&self, i: usize) -> i64 {
        self.pair(i).key()
    }

    /// Read-only handle to the `i`-th pair.
    pub fn pair(&self, i: usize) -> PairRef<'_> {
        let at = i * self.pair_size;
        PairRef::from_bytes(&self.buf[at..at + self.pair_size])
    }

    /// Overwrite the key of the `i`-th pair.
    pub fn write_key(&mut self, i: usize, key: i64) {
        let at = i * self.pair_size;
        self.buf[at..at + KEY_BYTES].copy_from_slice(&key.to_le_bytes());
    }

    /// Overwrite the value of the `i`-th pair.
    pub fn write_val(&mut self, i: usize, val: &[u8]) {
        let at = i * self.pair_size + KEY_BYTES;
        let width = self.pair_size - KEY_BYTES;
        self.buf[at..at + width].copy_from_slice(&val[..width]);
    }

    /// Overwrite the `i`-th record with another pair.
    pub fn write(&mut self, i: usize, src: PairRef<'_>) {
        let at = i * self.pair_size;
        self.buf[at..at + self.pair_size].copy_from_slice(src.bytes());
    }
}
