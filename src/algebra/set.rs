//! The base algebraic structure: a set of elements with no arithmetic.

use std::marker::PhantomData;

use super::{el_bytes, impl_algstrct_common, Algstrct, Elem};

/// A plain set over element type `T`.
///
/// Carries the per-type defaults only: ordering, limits, abs, transport
/// type, formatting, casts, and the memory operations. `add` and `mul`
/// abort; the "additive identity" reported to the padding layer is the
/// default value of `T`, which is also what [`Algstrct::init`] broadcasts.
pub struct Set<T: Elem> {
    addid: Box<[u8]>,
    _elem: PhantomData<T>,
}

impl<T: Elem> Set<T> {
    pub fn new() -> Self {
        Set {
            addid: el_bytes(T::default()),
            _elem: PhantomData,
        }
    }
}

impl<T: Elem> Default for Set<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Elem> Algstrct for Set<T> {
    impl_algstrct_common!(T);

    fn addid(&self) -> &[u8] {
        &self.addid
    }

    fn mulid(&self) -> Option<&[u8]> {
        None
    }

    fn add(&self, _a: &[u8], _b: &[u8], _c: &mut [u8]) {
        panic!("sympack error: addition is not defined on a plain set");
    }

    fn mul(&self, _a: &[u8], _b: &[u8], _c: &mut [u8]) {
        panic!("sympack error: multiplication is not defined on a plain set");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Transport;
    use num_complex::Complex;

    #[test]
    fn reports_element_geometry() {
        let s = Set::<f64>::new();
        assert_eq!(s.el_size(), 8);
        assert_eq!(s.pair_size(), 16);
        assert!(s.is_ordered());
        assert_eq!(s.transport(), Transport::Double);
        assert!(!s.is_custom_transport());
    }

    #[test]
    fn complex_set_is_unordered() {
        let s = Set::<Complex<f64>>::new();
        assert!(!s.is_ordered());
        assert_eq!(s.el_size(), 16);
        assert_eq!(s.transport(), Transport::ComplexDouble);
    }

    #[test]
    #[should_panic(expected = "unless the element type is ordered")]
    fn complex_min_aborts() {
        let s = Set::<Complex<f64>>::new();
        let a = [0u8; 16];
        let b = [0u8; 16];
        let mut c = [0u8; 16];
        s.min(&a, &b, &mut c);
    }

    #[test]
    #[should_panic(expected = "addition is not defined")]
    fn set_add_aborts() {
        let s = Set::<f64>::new();
        let a = [0u8; 8];
        let b = [0u8; 8];
        let mut c = [0u8; 8];
        s.add(&a, &b, &mut c);
    }

    #[test]
    fn init_broadcasts_the_default() {
        let s = Set::<i32>::new();
        let mut buf = vec![0xffu8; 4 * 4];
        s.init(4, &mut buf);
        assert_eq!(buf, vec![0u8; 16]);
        assert_eq!(s.addid(), &0i32.to_le_bytes());
        assert_eq!(s.mulid(), None);
    }

    #[test]
    fn isequal_is_value_equality_for_floats() {
        let s = Set::<f64>::new();
        // 0.0 and -0.0 differ bitwise but compare equal.
        assert!(s.isequal(&0.0f64.to_le_bytes(), &(-0.0f64).to_le_bytes()));
        assert!(!s.isequal(&1.0f64.to_le_bytes(), &2.0f64.to_le_bytes()));
    }

    #[test]
    fn min_max_and_limits() {
        let s = Set::<i64>::new();
        let a = (-5i64).to_le_bytes();
        let b = 3i64.to_le_bytes();
        let mut c = [0u8; 8];
        s.min(&a, &b, &mut c);
        assert_eq!(i64::from_le_bytes(c), -5);
        s.max(&a, &b, &mut c);
        assert_eq!(i64::from_le_bytes(c), 3);
        s.max_limit(&mut c);
        assert_eq!(i64::from_le_bytes(c), i64::MAX);
        s.min_limit(&mut c);
        assert_eq!(i64::from_le_bytes(c), i64::MIN);
    }

    #[test]
    fn abs_of_negative() {
        let s = Set::<f64>::new();
        let mut c = [0u8; 8];
        s.abs(&(-2.5f64).to_le_bytes(), &mut c);
        assert_eq!(f64::from_le_bytes(c), 2.5);
    }

    #[test]
    fn sort_orders_pairs_by_key() {
        let s = Set::<f64>::new();
        let mut buf = s.pair_alloc(3);
        s.set_pair(&mut buf[0..], 9, &1.0f64.to_le_bytes());
        s.set_pair(&mut buf[16..], 2, &2.0f64.to_le_bytes());
        s.set_pair(&mut buf[32..], 5, &3.0f64.to_le_bytes());
        s.sort(3, &mut buf);
        assert_eq!(s.get_key(&buf[0..]), 2);
        assert_eq!(s.get_key(&buf[16..]), 5);
        assert_eq!(s.get_key(&buf[32..]), 9);
        assert_eq!(s.get_value(&buf[0..]), &2.0f64.to_le_bytes());
    }

    #[test]
    fn strided_and_block_copies() {
        let s = Set::<i32>::new();
        let src: Vec<u8> = [1i32, 2, 3, 4, 5, 6]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        // Every other source element.
        let mut dst = vec![0u8; 3 * 4];
        s.copy_strided(3, &src, 2, &mut dst, 1);
        let got: Vec<i32> = dst
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(got, vec![1, 3, 5]);

        // 2x2 block out of a 3-row column-major matrix.
        let mut dst = vec![0u8; 4 * 4];
        s.copy_block(2, 2, &src, 3, &mut dst, 2);
        let got: Vec<i32> = dst
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(got, vec![1, 2, 4, 5]);
    }

    #[test]
    fn set_pairs_replicates_key_and_value() {
        let s = Set::<i32>::new();
        let mut buf = s.pair_alloc(3);
        s.set_pairs(&mut buf, 7, &9i32.to_le_bytes(), 3);
        for i in 0..3 {
            assert_eq!(s.get_key(&buf[i * 12..]), 7);
            assert_eq!(s.get_value(&buf[i * 12..]), &9i32.to_le_bytes());
        }
    }
}
