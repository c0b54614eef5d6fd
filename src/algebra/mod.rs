//! Type-erased algebraic structures over opaque byte elements.
//!
//! Every kernel in this crate is written against [`Algstrct`], a trait
//! object that knows the element width, identities, and operations of the
//! ring (or weaker structure) the tensor is defined over. The concrete
//! carriers are generic over an element type and erase it behind the
//! trait, so the bulk kernels are compiled once instead of once per
//! element type:
//!
//! - [`Set<T>`]: no identities, no arithmetic; ordering/limits/abs and the
//!   memory operations only.
//! - [`Monoid<T>`]: adds an additive identity and an addition.
//! - [`Semiring<T>`]: adds a multiplicative identity and a multiplication.
//!
//! Operations a structure does not support abort with a diagnostic rather
//! than returning garbage; see the failure notes on [`Algstrct`].

use std::fmt;
use std::mem;
use std::ptr;

pub mod elem;
pub mod monoid;
pub mod set;
pub mod semiring;
pub mod transport;

pub use elem::Elem;
pub use monoid::Monoid;
pub use set::Set;
pub use semiring::Semiring;
pub use transport::Transport;

/// Read one element from the front of a byte buffer.
///
/// Buffers carry no alignment guarantee, so the load is unaligned.
pub(crate) fn read_el<T: Elem>(buf: &[u8]) -> T {
    assert!(
        buf.len() >= mem::size_of::<T>(),
        "element read past the end of a {}-byte buffer",
        buf.len()
    );
    unsafe { ptr::read_unaligned(buf.as_ptr() as *const T) }
}

/// Write one element to the front of a byte buffer.
pub(crate) fn write_el<T: Elem>(buf: &mut [u8], v: T) {
    assert!(
        buf.len() >= mem::size_of::<T>(),
        "element write past the end of a {}-byte buffer",
        buf.len()
    );
    unsafe { ptr::write_unaligned(buf.as_mut_ptr() as *mut T, v) }
}

/// Byte image of one element value.
pub(crate) fn el_bytes<T: Elem>(v: T) -> Box<[u8]> {
    let mut b = vec![0u8; mem::size_of::<T>()];
    write_el(&mut b, v);
    b.into_boxed_slice()
}

/// Type-erased element vocabulary.
///
/// All buffers are caller-owned byte slices; an element occupies
/// [`el_size`](Algstrct::el_size) bytes and a pair occupies
/// [`pair_size`](Algstrct::pair_size) bytes (8-byte little-endian key, then
/// the value).
///
/// # Failure semantics
///
/// Operations that the underlying element type cannot support (the
/// numeric casts on a non-arithmetic element, `min`/`max`/`abs` on an
/// unordered one, `add`/`mul` on a structure without them) panic with a
/// diagnostic. Nothing in this layer reports errors as values: a misuse
/// here is a caller bug, and limping on would corrupt state that is
/// replicated across processes.
pub trait Algstrct: Send + Sync {
    /// Byte width of one element.
    fn el_size(&self) -> usize;

    /// Byte width of one (key, value) pair.
    fn pair_size(&self) -> usize;

    /// Whether comparison, limits, and `abs` are meaningful.
    fn is_ordered(&self) -> bool;

    /// Transport datatype for shipping elements between processes.
    fn transport(&self) -> Transport;

    /// Whether the transport datatype is a constructed byte-contiguous one
    /// owned by this structure, as opposed to a standard named datatype.
    fn is_custom_transport(&self) -> bool {
        self.transport().is_custom()
    }

    /// Byte pattern of the additive identity.
    ///
    /// For a plain [`Set`] this is the default value of the element type;
    /// richer structures carry the identity they were constructed with.
    /// Code must broadcast these bytes, never inspect them: a tropical
    /// semiring's additive identity is not a zero bit pattern.
    fn addid(&self) -> &[u8];

    /// Byte pattern of the multiplicative identity, if the structure has
    /// one.
    fn mulid(&self) -> Option<&[u8]>;

    /// `c = a + b`. Aborts on structures without an addition.
    fn add(&self, a: &[u8], b: &[u8], c: &mut [u8]);

    /// `c = a * b`. Aborts on structures without a multiplication.
    fn mul(&self, a: &[u8], b: &[u8], c: &mut [u8]);

    /// `c = min(a, b)`. Aborts when the element type is unordered.
    fn min(&self, a: &[u8], b: &[u8], c: &mut [u8]);

    /// `c = max(a, b)`. Aborts when the element type is unordered.
    fn max(&self, a: &[u8], b: &[u8], c: &mut [u8]);

    /// Write the smallest representable value into `c`.
    fn min_limit(&self, c: &mut [u8]);

    /// Write the largest representable value into `c`.
    fn max_limit(&self, c: &mut [u8]);

    /// `c = |a|`. Aborts when the element type is unordered.
    fn abs(&self, a: &[u8], c: &mut [u8]);

    /// Value equality of two elements.
    fn isequal(&self, a: &[u8], b: &[u8]) -> bool;

    /// Fill `n` elements of `dst` with the value in `src`.
    fn set(&self, dst: &mut [u8], src: &[u8], n: usize);

    /// Copy one element.
    fn copy(&self, dst: &mut [u8], src: &[u8]);

    /// Copy `n` contiguous elements.
    fn copy_n(&self, dst: &mut [u8], src: &[u8], n: usize);

    /// Copy `n` elements with source stride `inc_src` and destination
    /// stride `inc_dst`, both in elements.
    fn copy_strided(&self, n: usize, src: &[u8], inc_src: usize, dst: &mut [u8], inc_dst: usize);

    /// Copy an `m` by `n` column block with leading dimensions in elements.
    fn copy_block(
        &self,
        m: usize,
        n: usize,
        src: &[u8],
        lda_src: usize,
        dst: &mut [u8],
        lda_dst: usize,
    );

    /// Copy one pair record.
    fn copy_pair(&self, dst: &mut [u8], src: &[u8]);

    /// Copy `n` contiguous pair records.
    fn copy_pairs(&self, dst: &mut [u8], src: &[u8], n: usize);

    /// Set `n` elements to the default-constructed value.
    fn init(&self, n: usize, arr: &mut [u8]);

    /// Allocate a buffer of `n` elements, default-initialized.
    fn alloc(&self, n: usize) -> Vec<u8>;

    /// Allocate a buffer of `n` pairs with zero keys and
    /// default-initialized values.
    fn pair_alloc(&self, n: usize) -> Vec<u8>;

    /// Decode the key of a pair record.
    fn get_key(&self, pair: &[u8]) -> i64;

    /// Borrow the value bytes of a pair record.
    fn get_value<'a>(&self, pair: &'a [u8]) -> &'a [u8];

    /// Write one pair record.
    fn set_pair(&self, dst: &mut [u8], key: i64, val: &[u8]);

    /// Write `n` pair records replicating one key and value.
    fn set_pairs(&self, dst: &mut [u8], key: i64, val: &[u8], n: usize);

    /// Sort the first `n` pairs of a buffer in ascending key order.
    fn sort(&self, n: usize, pairs: &mut [u8]);

    /// Format one element for humans.
    fn fmt_el(&self, a: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// Write the element closest to `d` into `c`. Aborts for element types
    /// without a double bridge.
    fn cast_from_f64(&self, d: f64, c: &mut [u8]);

    /// Read an element as `f64`. Aborts for element types without a double
    /// bridge.
    fn cast_to_f64(&self, c: &[u8]) -> f64;

    /// Write the element closest to `i` into `c`. Aborts for element types
    /// without an integer bridge.
    fn cast_from_i64(&self, i: i64, c: &mut [u8]);

    /// Read an element as `i64`. Aborts for element types without an
    /// integer bridge.
    fn cast_to_i64(&self, c: &[u8]) -> i64;

    /// Convert a COO triple to CSR. See [`crate::sparse::coo_to_csr`].
    #[allow(clippy::too_many_arguments)]
    fn coo_to_csr(
        &self,
        nz: i64,
        nrow: i32,
        csr_vs: &mut [u8],
        csr_ja: &mut [i32],
        csr_ia: &mut [i32],
        coo_vs: &[u8],
        coo_rs: &[i32],
        coo_cs: &[i32],
    );

    /// Convert a CSR triple to COO. See [`crate::sparse::csr_to_coo`].
    #[allow(clippy::too_many_arguments)]
    fn csr_to_coo(
        &self,
        nz: i64,
        nrow: i32,
        csr_vs: &[u8],
        csr_ja: &[i32],
        csr_ia: &[i32],
        coo_vs: &mut [u8],
        coo_rs: &mut [i32],
        coo_cs: &mut [i32],
    );
}

/// Display adaptor pairing an element's bytes with its structure.
///
/// ```
/// use sympack::{ElemDisplay, Semiring};
///
/// let sr = Semiring::<i64>::default();
/// let bytes = 42i64.to_le_bytes();
/// assert_eq!(format!("{}", ElemDisplay::new(&sr, &bytes)), "42");
/// ```
pub struct ElemDisplay<'a> {
    sr: &'a dyn Algstrct,
    bytes: &'a [u8],
}

impl<'a> ElemDisplay<'a> {
    pub fn new(sr: &'a dyn Algstrct, bytes: &'a [u8]) -> Self {
        ElemDisplay { sr, bytes }
    }
}

impl fmt::Display for ElemDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.sr.fmt_el(self.bytes, f)
    }
}

/// Expands to the [`Algstrct`] methods whose behaviour every structure
/// shares; the identity and arithmetic methods stay per-structure.
macro_rules! impl_algstrct_common {
    ($t:ident) => {
        fn el_size(&self) -> usize {
            std::mem::size_of::<$t>()
        }

        fn pair_size(&self) -> usize {
            $crate::pairs::KEY_BYTES + std::mem::size_of::<$t>()
        }

        fn is_ordered(&self) -> bool {
            <$t as $crate::algebra::Elem>::IS_ORDERED
        }

        fn transport(&self) -> $crate::algebra::Transport {
            <$t as $crate::algebra::Elem>::transport()
        }

        fn min(&self, a: &[u8], b: &[u8], c: &mut [u8]) {
            let r = <$t as $crate::algebra::Elem>::el_min(
                $crate::algebra::read_el::<$t>(a),
                $crate::algebra::read_el::<$t>(b),
            );
            $crate::algebra::write_el(c, r);
        }

        fn max(&self, a: &[u8], b: &[u8], c: &mut [u8]) {
            let r = <$t as $crate::algebra::Elem>::el_max(
                $crate::algebra::read_el::<$t>(a),
                $crate::algebra::read_el::<$t>(b),
            );
            $crate::algebra::write_el(c, r);
        }

        fn min_limit(&self, c: &mut [u8]) {
            $crate::algebra::write_el(c, <$t as $crate::algebra::Elem>::min_limit());
        }

        fn max_limit(&self, c: &mut [u8]) {
            $crate::algebra::write_el(c, <$t as $crate::algebra::Elem>::max_limit());
        }

        fn abs(&self, a: &[u8], c: &mut [u8]) {
            let r = <$t as $crate::algebra::Elem>::el_abs($crate::algebra::read_el::<$t>(a));
            $crate::algebra::write_el(c, r);
        }

        fn isequal(&self, a: &[u8], b: &[u8]) -> bool {
            $crate::algebra::read_el::<$t>(a) == $crate::algebra::read_el::<$t>(b)
        }

        fn set(&self, dst: &mut [u8], src: &[u8], n: usize) {
            let el = std::mem::size_of::<$t>();
            assert!(dst.len() >= n * el, "set of {} elements overruns the buffer", n);
            let v = $crate::algebra::read_el::<$t>(src);
            for chunk in dst[..n * el].chunks_exact_mut(el) {
                $crate::algebra::write_el(chunk, v);
            }
        }

        fn copy(&self, dst: &mut [u8], src: &[u8]) {
            let el = std::mem::size_of::<$t>();
            dst[..el].copy_from_slice(&src[..el]);
        }

        fn copy_n(&self, dst: &mut [u8], src: &[u8], n: usize) {
            let el = std::mem::size_of::<$t>();
            dst[..n * el].copy_from_slice(&src[..n * el]);
        }

        fn copy_strided(
            &self,
            n: usize,
            src: &[u8],
            inc_src: usize,
            dst: &mut [u8],
            inc_dst: usize,
        ) {
            let el = std::mem::size_of::<$t>();
            for i in 0..n {
                let v = $crate::algebra::read_el::<$t>(&src[i * inc_src * el..]);
                $crate::algebra::write_el(&mut dst[i * inc_dst * el..], v);
            }
        }

        fn copy_block(
            &self,
            m: usize,
            n: usize,
            src: &[u8],
            lda_src: usize,
            dst: &mut [u8],
            lda_dst: usize,
        ) {
            let el = std::mem::size_of::<$t>();
            for j in 0..n {
                for i in 0..m {
                    let v = $crate::algebra::read_el::<$t>(&src[(j * lda_src + i) * el..]);
                    $crate::algebra::write_el(&mut dst[(j * lda_dst + i) * el..], v);
                }
            }
        }

        fn copy_pair(&self, dst: &mut [u8], src: &[u8]) {
            let ps = self.pair_size();
            dst[..ps].copy_from_slice(&src[..ps]);
        }

        fn copy_pairs(&self, dst: &mut [u8], src: &[u8], n: usize) {
            let ps = self.pair_size();
            dst[..n * ps].copy_from_slice(&src[..n * ps]);
        }

        fn init(&self, n: usize, arr: &mut [u8]) {
            let el = std::mem::size_of::<$t>();
            let v = <$t as Default>::default();
            for chunk in arr[..n * el].chunks_exact_mut(el) {
                $crate::algebra::write_el(chunk, v);
            }
        }

        fn alloc(&self, n: usize) -> Vec<u8> {
            let mut buf = vec![0u8; n * std::mem::size_of::<$t>()];
            self.init(n, &mut buf);
            buf
        }

        fn pair_alloc(&self, n: usize) -> Vec<u8> {
            let ps = self.pair_size();
            let mut buf = vec![0u8; n * ps];
            let v = <$t as Default>::default();
            for chunk in buf.chunks_exact_mut(ps) {
                $crate::algebra::write_el(&mut chunk[$crate::pairs::KEY_BYTES..], v);
            }
            buf
        }

        fn get_key(&self, pair: &[u8]) -> i64 {
            i64::from_le_bytes(pair[..$crate::pairs::KEY_BYTES].try_into().unwrap())
        }

        fn get_value<'a>(&self, pair: &'a [u8]) -> &'a [u8] {
            &pair[$crate::pairs::KEY_BYTES..$crate::pairs::KEY_BYTES + std::mem::size_of::<$t>()]
        }

        fn set_pair(&self, dst: &mut [u8], key: i64, val: &[u8]) {
            let el = std::mem::size_of::<$t>();
            dst[..$crate::pairs::KEY_BYTES].copy_from_slice(&key.to_le_bytes());
            dst[$crate::pairs::KEY_BYTES..$crate::pairs::KEY_BYTES + el]
                .copy_from_slice(&val[..el]);
        }

        fn set_pairs(&self, dst: &mut [u8], key: i64, val: &[u8], n: usize) {
            let ps = self.pair_size();
            for i in 0..n {
                self.set_pair(&mut dst[i * ps..], key, val);
            }
        }

        fn sort(&self, n: usize, pairs: &mut [u8]) {
            let ps = self.pair_size();
            assert_eq!(std::mem::size_of::<$crate::pairs::PackedPair<$t>>(), ps);
            assert!(pairs.len() >= n * ps, "sort of {} pairs overruns the buffer", n);
            // PackedPair has alignment one, so any byte address is valid.
            let slice = unsafe {
                std::slice::from_raw_parts_mut(
                    pairs.as_mut_ptr() as *mut $crate::pairs::PackedPair<$t>,
                    n,
                )
            };
            slice.sort_unstable_by_key(|p| {
                let k = p.key;
                i64::from_le(k)
            });
        }

        fn fmt_el(&self, a: &[u8], f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let v = $crate::algebra::read_el::<$t>(a);
            <$t as $crate::algebra::Elem>::fmt_el(&v, f)
        }

        fn cast_from_f64(&self, d: f64, c: &mut [u8]) {
            $crate::algebra::write_el(c, <$t as $crate::algebra::Elem>::from_f64(d));
        }

        fn cast_to_f64(&self, c: &[u8]) -> f64 {
            <$t as $crate::algebra::Elem>::to_f64($crate::algebra::read_el::<$t>(c))
        }

        fn cast_from_i64(&self, i: i64, c: &mut [u8]) {
            $crate::algebra::write_el(c, <$t as $crate::algebra::Elem>::from_i64(i));
        }

        fn cast_to_i64(&self, c: &[u8]) -> i64 {
            <$t as $crate::algebra::Elem>::to_i64($crate::algebra::read_el::<$t>(c))
        }

        #[allow(clippy::too_many_arguments)]
        fn coo_to_csr(
            &self,
            nz: i64,
            nrow: i32,
            csr_vs: &mut [u8],
            csr_ja: &mut [i32],
            csr_ia: &mut [i32],
            coo_vs: &[u8],
            coo_rs: &[i32],
            coo_cs: &[i32],
        ) {
            $crate::sparse::coo_to_csr::<$t>(nz, nrow, csr_vs, csr_ja, csr_ia, coo_vs, coo_rs, coo_cs);
        }

        #[allow(clippy::too_many_arguments)]
        fn csr_to_coo(
            &self,
            nz: i64,
            nrow: i32,
            csr_vs: &[u8],
            csr_ja: &[i32],
            csr_ia: &[i32],
            coo_vs: &mut [u8],
            coo_rs: &mut [i32],
            coo_cs: &mut [i32],
        ) {
            $crate::sparse::csr_to_coo::<$t>(nz, nrow, csr_vs, csr_ja, csr_ia, coo_vs, coo_rs, coo_cs);
        }
    };
}

pub(crate) use impl_algstrct_common;
