//! # sympack: symmetry-packed tensor layout kernels
//!
//! The in-process core of a distributed tensor engine: the pieces that
//! move tensor data between logical and physical layouts on one rank,
//! independent of how the surrounding layer schedules communication.
//!
//! ## What lives here
//!
//! - **Algebraic structures** ([`algebra`]): a type-erased element
//!   vocabulary. Kernels manipulate opaque byte elements through an
//!   [`Algstrct`] trait object carrying the element width, identities,
//!   ordering, casts, and transport datatype; [`Set`], [`Monoid`], and
//!   [`Semiring`] erase a concrete element type behind it.
//! - **Pair cursors** ([`pairs`]): iteration over packed
//!   `(i64 key, value)` records whose stride depends on the element width.
//! - **Sparse layout** ([`sparse`]): element-generic COO↔CSR conversion
//!   with a vendor fast-path hook for the primitive widths.
//! - **Padding** ([`padding`]): the logical↔physical key remapping,
//!   symmetry-aware filtering, and in-place zeroing of padding regions
//!   that let local kernels run branch-free over padded virtualized
//!   blocks.
//!
//! ## Data layout
//!
//! A pair is a little-endian `i64` key followed immediately by the value
//! bytes (stride `8 + el_size`, no alignment padding). Keys are row-major
//! linearised multi-indices, mode 0 fastest. CSR/COO indices are 1-based
//! `i32`. Symmetry tags relate a mode to its successor: [`Sym::SY`]
//! (symmetric), [`Sym::AS`] (antisymmetric), [`Sym::SH`] (symmetric
//! hollow), [`Sym::NS`] (none).
//!
//! ## Failure model
//!
//! Nothing here returns errors as values. An operation an element type
//! cannot support, or a violated internal invariant, aborts with a
//! diagnostic: every such condition is a caller bug, and a rank that
//! limps on with corrupt layout data poisons its peers. The one
//! recoverable condition, a vendor sparse kernel declining a conversion,
//! falls back to the portable path transparently.
//!
//! ## Quick start
//!
//! ```
//! use sympack::{depad_tsr, pad_key, Algstrct, Semiring, Sym};
//!
//! let sr = Semiring::<f64>::default();
//!
//! // One pair at logical key 5 of a 3x2 tensor.
//! let mut pairs = sr.pair_alloc(1);
//! sr.set_pair(&mut pairs, 5, &2.5f64.to_le_bytes());
//!
//! // Mode 0 is padded from 3 to 4: logical (2, 1) becomes key 6.
//! pad_key(&[3, 2], &[1, 0], &mut pairs, &sr, None);
//! assert_eq!(sr.get_key(&pairs), 6);
//!
//! // Stripping the padding recovers the pair.
//! let mut out = sr.pair_alloc(1);
//! let n = depad_tsr(
//!     &[3, 2],
//!     &[Sym::NS, Sym::NS],
//!     &[1, 0],
//!     &[0, 0],
//!     &pairs,
//!     &mut out,
//!     &sr,
//! );
//! assert_eq!(n, 1);
//! assert_eq!(sr.get_key(&out), 6);
//! ```

pub mod algebra;
pub mod padding;
pub mod pairs;
pub mod sparse;

mod index;

pub use algebra::{Algstrct, Elem, ElemDisplay, Monoid, Semiring, Set, Transport};
pub use padding::{depad_tsr, pad_key, pad_tsr, zero_padding, Sym};
pub use pairs::{PairRef, PairsMut, PairsRef, KEY_BYTES};
pub use sparse::{coo_to_csr, csr_to_coo};
