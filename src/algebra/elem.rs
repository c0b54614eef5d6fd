//! Per-element-type defaults inherited by the algebraic structures.
//!
//! An [`Elem`] is a fixed-width, trivially copyable value. The trait
//! supplies the compile-time defaults an algebraic structure picks up
//! unless its constructor overrides them: whether the type is ordered,
//! how to negate and take absolute values, the transport datatype, the
//! formatter, and the numeric cast bridges.
//!
//! Ordered arithmetic primitives get full implementations through the
//! macros below. Everything else inherits the defaults, which fail loudly:
//! calling `min` on an unordered type or `to_f64` on a non-arithmetic type
//! is a caller bug, and the whole layer aborts rather than fabricating
//! bytes (peers in a distributed run cannot tolerate one rank silently
//! diverging).

use std::fmt;
use std::mem;

use num_complex::Complex;
use num_traits::Bounded;

use super::transport::Transport;

fn unordered(op: &str) -> ! {
    panic!(
        "sympack error: cannot compute {} unless the element type is ordered",
        op
    );
}

fn no_cast(dir: &str) -> ! {
    panic!("sympack error: {} cast not possible for this element type", dir);
}

/// A fixed-width element value.
///
/// Elements live in raw byte buffers at runtime-determined strides, so the
/// trait is restricted to trivially copyable types; a value is moved with a
/// byte copy of `size_of::<Self>()` bytes.
pub trait Elem: Copy + Default + PartialEq + Send + Sync + 'static {
    /// Whether comparison, limits, and `abs` are meaningful.
    const IS_ORDERED: bool = false;

    /// Transport datatype used when shipping elements over the wire.
    fn transport() -> Transport {
        Transport::contiguous(mem::size_of::<Self>())
    }

    /// Additive inverse. Defined for the arithmetic types; aborts otherwise.
    fn addinv(self) -> Self {
        panic!(
            "sympack error: no additive inverse for element type {}",
            std::any::type_name::<Self>()
        );
    }

    /// Smaller of two values. Aborts when the type is unordered.
    fn el_min(self, _other: Self) -> Self {
        unordered("a min");
    }

    /// Larger of two values. Aborts when the type is unordered.
    fn el_max(self, _other: Self) -> Self {
        unordered("a max");
    }

    /// Smallest representable value. Aborts when the type is unordered.
    fn min_limit() -> Self {
        unordered("a min");
    }

    /// Largest representable value. Aborts when the type is unordered.
    fn max_limit() -> Self {
        unordered("a max");
    }

    /// Absolute value as `max(a, -a)`. Aborts when the type is unordered.
    fn el_abs(self) -> Self {
        if !Self::IS_ORDERED {
            unordered("abs");
        }
        let b = self.addinv();
        self.el_max(b)
    }

    /// Human-readable formatter. The fallback is a hex dump of the bytes.
    fn fmt_el(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = unsafe {
            std::slice::from_raw_parts(self as *const Self as *const u8, mem::size_of::<Self>())
        };
        for b in bytes {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }

    /// Convert from `f64`. Defined for arithmetic and complex types only.
    fn from_f64(_d: f64) -> Self {
        no_cast("double");
    }

    /// Convert to `f64`. Defined for arithmetic types only.
    fn to_f64(self) -> f64 {
        no_cast("double");
    }

    /// Convert from `i64`. Defined for arithmetic and complex types only.
    fn from_i64(_i: i64) -> Self {
        no_cast("integer");
    }

    /// Convert to `i64`. Defined for arithmetic types only.
    fn to_i64(self) -> i64 {
        no_cast("integer");
    }
}

macro_rules! impl_int_elem {
    ($t:ty, $tr:expr) => {
        impl Elem for $t {
            const IS_ORDERED: bool = true;

            fn transport() -> Transport {
                $tr
            }

            fn addinv(self) -> Self {
                self.wrapping_neg()
            }

            fn el_min(self, other: Self) -> Self {
                if self > other {
                    other
                } else {
                    self
                }
            }

            fn el_max(self, other: Self) -> Self {
                if other > self {
                    other
                } else {
                    self
                }
            }

            fn min_limit() -> Self {
                <$t as Bounded>::min_value()
            }

            fn max_limit() -> Self {
                <$t as Bounded>::max_value()
            }

            fn fmt_el(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self)
            }

            fn from_f64(d: f64) -> Self {
                d as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_i64(i: i64) -> Self {
                i as $t
            }

            fn to_i64(self) -> i64 {
                self as i64
            }
        }
    };
}

macro_rules! impl_float_elem {
    ($t:ty, $tr:expr) => {
        impl Elem for $t {
            const IS_ORDERED: bool = true;

            fn transport() -> Transport {
                $tr
            }

            fn addinv(self) -> Self {
                -self
            }

            fn el_min(self, other: Self) -> Self {
                if self > other {
                    other
                } else {
                    self
                }
            }

            fn el_max(self, other: Self) -> Self {
                if other > self {
                    other
                } else {
                    self
                }
            }

            fn min_limit() -> Self {
                <$t as Bounded>::min_value()
            }

            fn max_limit() -> Self {
                <$t as Bounded>::max_value()
            }

            fn fmt_el(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:11.5E}", self)
            }

            fn from_f64(d: f64) -> Self {
                d as $t
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_i64(i: i64) -> Self {
                i as $t
            }

            fn to_i64(self) -> i64 {
                self as i64
            }
        }
    };
}

macro_rules! impl_complex_elem {
    ($t:ty, $tr:expr) => {
        impl Elem for Complex<$t> {
            const IS_ORDERED: bool = false;

            fn transport() -> Transport {
                $tr
            }

            fn addinv(self) -> Self {
                -self
            }

            fn fmt_el(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "({:11.5E},{:11.5E})", self.re, self.im)
            }

            fn from_f64(d: f64) -> Self {
                Complex::new(d as $t, 0.0)
            }

            fn from_i64(i: i64) -> Self {
                Complex::new(i as $t, 0.0)
            }
        }
    };
}

impl_int_elem!(i32, Transport::Int32);
impl_int_elem!(u32, Transport::Uint32);
impl_int_elem!(i64, Transport::Int64);
impl_int_elem!(u64, Transport::Uint64);
impl_float_elem!(f32, Transport::Float);
impl_float_elem!(f64, Transport::Double);
impl_complex_elem!(f32, Transport::ComplexFloat);
impl_complex_elem!(f64, Transport::ComplexDouble);

impl Elem for bool {
    const IS_ORDERED: bool = true;

    fn transport() -> Transport {
        Transport::Bool
    }

    // -1 == 1 mod 2, so every boolean is its own additive inverse.
    fn addinv(self) -> Self {
        self
    }

    fn el_min(self, other: Self) -> Self {
        self & other
    }

    fn el_max(self, other: Self) -> Self {
        self | other
    }

    fn min_limit() -> Self {
        false
    }

    fn max_limit() -> Self {
        true
    }

    fn fmt_el(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }

    fn to_i64(self) -> i64 {
        self as i64
    }
}

impl Elem for u8 {
    const IS_ORDERED: bool = true;

    fn transport() -> Transport {
        Transport::Char
    }

    fn addinv(self) -> Self {
        self.wrapping_neg()
    }

    fn el_min(self, other: Self) -> Self {
        self.min(other)
    }

    fn el_max(self, other: Self) -> Self {
        self.max(other)
    }

    fn min_limit() -> Self {
        u8::MIN
    }

    fn max_limit() -> Self {
        u8::MAX
    }

    fn fmt_el(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}
