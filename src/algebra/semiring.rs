//! Monoids with a multiplicative identity and a multiplication.

use std::marker::PhantomData;
use std::ops::{Add, Mul};

use num_traits::{One, Zero};

use super::monoid::add_op;
use super::{el_bytes, impl_algstrct_common, read_el, write_el, Algstrct, Elem};

fn mul_op<T: Mul<Output = T>>(a: T, b: T) -> T {
    a * b
}

/// A semiring over element type `T`.
///
/// The common case is the arithmetic semiring of a primitive ring, which
/// [`Semiring::default`] builds from `Zero`/`One` and the ring operators.
/// Custom identities and operations cover the rest (min-plus, bitwise,
/// user types).
pub struct Semiring<T: Elem> {
    addid: Box<[u8]>,
    mulid: Box<[u8]>,
    add_fn: fn(T, T) -> T,
    mul_fn: fn(T, T) -> T,
    _elem: PhantomData<T>,
}

impl<T: Elem> Semiring<T> {
    pub fn new(addid: T, add: fn(T, T) -> T, mulid: T, mul: fn(T, T) -> T) -> Self {
        Semiring {
            addid: el_bytes(addid),
            mulid: el_bytes(mulid),
            add_fn: add,
            mul_fn: mul,
            _elem: PhantomData,
        }
    }
}

/// The arithmetic semiring `(0, +, 1, *)` for element types that have it.
impl<T: Elem + Zero + One + Add<Output = T> + Mul<Output = T>> Default for Semiring<T> {
    fn default() -> Self {
        Self::new(T::zero(), add_op::<T>, T::one(), mul_op::<T>)
    }
}

impl<T: Elem> Algstrct for Semiring<T> {
    impl_algstrct_common!(T);

    fn addid(&self) -> &[u8] {
        &self.addid
    }

    fn mulid(&self) -> Option<&[u8]> {
        Some(&self.mulid)
    }

    fn add(&self, a: &[u8], b: &[u8], c: &mut [u8]) {
        let r = (self.add_fn)(read_el::<T>(a), read_el::<T>(b));
        write_el(c, r);
    }

    fn mul(&self, a: &[u8], b: &[u8], c: &mut [u8]) {
        let r = (self.mul_fn)(read_el::<T>(a), read_el::<T>(b));
        write_el(c, r);
    }
}
