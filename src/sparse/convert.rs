//! Element-generic COO↔CSR conversion.

use std::mem;

use rayon::prelude::*;
use tracing::trace_span;

use super::vendor;
use crate::algebra::{read_el, write_el, Elem};

/// Element sizes a vendor kernel may understand.
fn vendor_eligible(el_size: usize) -> bool {
    matches!(el_size, 4 | 8 | 16)
}

/// Convert a COO triple to CSR.
///
/// `coo_rs[i]` / `coo_cs[i]` are the 1-based row and column of the `i`-th
/// nonzero and `coo_vs` holds the element bytes in the same order. The
/// output groups nonzeros by row with columns ascending within each row;
/// `csr_ia` is the 1-based row pointer (`csr_ia[0] == 1`,
/// `csr_ia[nrow] - 1 == nz`). Both passes of the reorder sort are stable,
/// so duplicate (row, column) entries keep their input order; duplicates
/// are preserved, never merged. Empty rows are fine.
#[allow(clippy::too_many_arguments)]
pub fn coo_to_csr<T: Elem>(
    nz: i64,
    nrow: i32,
    csr_vs: &mut [u8],
    csr_ja: &mut [i32],
    csr_ia: &mut [i32],
    coo_vs: &[u8],
    coo_rs: &[i32],
    coo_cs: &[i32],
) {
    let _span = trace_span!("coo_to_csr").entered();
    let el = mem::size_of::<T>();
    if vendor_eligible(el)
        && vendor::try_coo_to_csr(nz, nrow, csr_vs, csr_ja, csr_ia, coo_vs, coo_rs, coo_cs, el)
    {
        return;
    }

    assert!(nz >= 0 && nrow >= 0);
    assert!(nz <= i32::MAX as i64, "nonzero count {} overflows the index width", nz);
    let nz = nz as usize;
    let nrow = nrow as usize;
    assert!(csr_ia.len() >= nrow + 1);
    assert!(coo_rs.len() >= nz && coo_cs.len() >= nz);
    assert!(csr_ja.len() >= nz);
    assert!(csr_vs.len() >= nz * el && coo_vs.len() >= nz * el);

    csr_ia[0] = 1;
    for slot in csr_ia[1..=nrow].iter_mut() {
        *slot = 0;
    }
    for i in 0..nz {
        csr_ia[coo_rs[i] as usize] += 1;
    }
    for i in 0..nrow {
        csr_ia[i + 1] += csr_ia[i];
    }

    // csr_ja first holds the permutation, then the columns.
    for (i, slot) in csr_ja[..nz].iter_mut().enumerate() {
        *slot = i as i32;
    }
    csr_ja[..nz].sort_by_key(|&j| coo_cs[j as usize]);
    csr_ja[..nz].sort_by_key(|&j| coo_rs[j as usize]);

    // Scatter with the element copy, not a byte shuffle of the buffer.
    {
        let csr_ja = &csr_ja[..nz];
        csr_vs[..nz * el]
            .par_chunks_exact_mut(el)
            .zip(csr_ja.par_iter())
            .for_each(|(dst, &j)| {
                let v = read_el::<T>(&coo_vs[j as usize * el..]);
                write_el(dst, v);
            });
    }
    csr_ja[..nz]
        .par_iter_mut()
        .for_each(|j| *j = coo_cs[*j as usize]);
}

/// Convert a CSR triple to COO.
///
/// The inverse of [`coo_to_csr`] up to ordering: values and columns are
/// copied through and each row's index is expanded from the row pointer.
#[allow(clippy::too_many_arguments)]
pub fn csr_to_coo<T: Elem>(
    nz: i64,
    nrow: i32,
    csr_vs: &[u8],
    csr_ja: &[i32],
    csr_ia: &[i32],
    coo_vs: &mut [u8],
    coo_rs: &mut [i32],
    coo_cs: &mut [i32],
) {
    let _span = trace_span!("csr_to_coo").entered();
    let el = mem::size_of::<T>();
    if vendor_eligible(el)
        && vendor::try_csr_to_coo(nz, nrow, csr_vs, csr_ja, csr_ia, coo_vs, coo_rs, coo_cs, el)
    {
        return;
    }

    assert!(nz >= 0 && nrow >= 0);
    let nz = nz as usize;
    let nrow = nrow as usize;
    assert!(csr_ia.len() >= nrow + 1);
    assert!(coo_rs.len() >= nz && coo_cs.len() >= nz && csr_ja.len() >= nz);
    assert!(csr_vs.len() >= nz * el && coo_vs.len() >= nz * el);

    coo_vs[..nz * el]
        .par_chunks_exact_mut(el)
        .zip(csr_vs[..nz * el].par_chunks_exact(el))
        .for_each(|(dst, src)| {
            let v = read_el::<T>(src);
            write_el(dst, v);
        });
    coo_cs[..nz].copy_from_slice(&csr_ja[..nz]);
    for i in 0..nrow {
        let row_start = csr_ia[i] as usize - 1;
        let row_end = csr_ia[i + 1] as usize - 1;
        coo_rs[row_start..row_end].fill(i as i32 + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_bytes(vals: &[f64]) -> Vec<u8> {
        vals.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn f64_vals(bytes: &[u8]) -> Vec<f64> {
        bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }

    #[test]
    fn coo_to_csr_small() {
        let coo_rs = [1, 3, 1, 2];
        let coo_cs = [2, 1, 1, 3];
        let coo_vs = f64_bytes(&[7.0, 9.0, 5.0, 6.0]);
        let mut csr_vs = vec![0u8; 4 * 8];
        let mut csr_ja = [0i32; 4];
        let mut csr_ia = [0i32; 4];
        coo_to_csr::<f64>(4, 3, &mut csr_vs, &mut csr_ja, &mut csr_ia, &coo_vs, &coo_rs, &coo_cs);
        assert_eq!(csr_ia, [1, 3, 4, 5]);
        assert_eq!(csr_ja, [1, 2, 3, 1]);
        assert_eq!(f64_vals(&csr_vs), vec![5.0, 7.0, 6.0, 9.0]);
    }

    #[test]
    fn csr_to_coo_recovers_row_grouping() {
        let csr_ia = [1, 3, 4, 5];
        let csr_ja = [1, 2, 3, 1];
        let csr_vs = f64_bytes(&[5.0, 7.0, 6.0, 9.0]);
        let mut coo_vs = vec![0u8; 4 * 8];
        let mut coo_rs = [0i32; 4];
        let mut coo_cs = [0i32; 4];
        csr_to_coo::<f64>(4, 3, &csr_vs, &csr_ja, &csr_ia, &mut coo_vs, &mut coo_rs, &mut coo_cs);
        assert_eq!(coo_rs, [1, 1, 2, 3]);
        assert_eq!(coo_cs, [1, 2, 3, 1]);
        assert_eq!(f64_vals(&coo_vs), vec![5.0, 7.0, 6.0, 9.0]);
    }

    #[test]
    fn empty_rows_are_allowed() {
        // One nonzero in row 3 of 4; rows 1, 2, 4 are empty.
        let coo_rs = [3];
        let coo_cs = [2];
        let coo_vs = f64_bytes(&[1.5]);
        let mut csr_vs = vec![0u8; 8];
        let mut csr_ja = [0i32; 1];
        let mut csr_ia = [0i32; 5];
        coo_to_csr::<f64>(1, 4, &mut csr_vs, &mut csr_ja, &mut csr_ia, &coo_vs, &coo_rs, &coo_cs);
        assert_eq!(csr_ia, [1, 1, 1, 2, 2]);
        assert_eq!(csr_ja, [2]);
    }

    #[test]
    fn duplicates_are_preserved_in_input_order() {
        // Two entries at (2, 2) and one at (2, 1).
        let coo_rs = [2, 2, 2];
        let coo_cs = [2, 2, 1];
        let coo_vs = f64_bytes(&[10.0, 20.0, 30.0]);
        let mut csr_vs = vec![0u8; 3 * 8];
        let mut csr_ja = [0i32; 3];
        let mut csr_ia = [0i32; 3];
        coo_to_csr::<f64>(3, 2, &mut csr_vs, &mut csr_ja, &mut csr_ia, &coo_vs, &coo_rs, &coo_cs);
        assert_eq!(csr_ia, [1, 1, 4]);
        assert_eq!(csr_ja, [1, 2, 2]);
        // The (2,2) duplicates keep their relative order.
        assert_eq!(f64_vals(&csr_vs), vec![30.0, 10.0, 20.0]);
    }

    #[test]
    fn zero_nonzeros() {
        let mut csr_vs = vec![];
        let mut csr_ja = [0i32; 0];
        let mut csr_ia = [0i32; 3];
        coo_to_csr::<f64>(0, 2, &mut csr_vs, &mut csr_ja, &mut csr_ia, &[], &[], &[]);
        assert_eq!(csr_ia, [1, 1, 1]);
    }

    #[test]
    fn opaque_element_conversion() {
        // A 3-byte element exercises the generic path (no vendor width).
        #[derive(Clone, Copy, Default, PartialEq, Debug)]
        struct Rgb([u8; 3]);
        impl Elem for Rgb {}

        let coo_rs = [2, 1];
        let coo_cs = [1, 1];
        let a = Rgb([1, 2, 3]);
        let b = Rgb([4, 5, 6]);
        let mut coo_vs = vec![0u8; 6];
        write_el(&mut coo_vs[0..], a);
        write_el(&mut coo_vs[3..], b);
        let mut csr_vs = vec![0u8; 6];
        let mut csr_ja = [0i32; 2];
        let mut csr_ia = [0i32; 3];
        coo_to_csr::<Rgb>(2, 2, &mut csr_vs, &mut csr_ja, &mut csr_ia, &coo_vs, &coo_rs, &coo_cs);
        assert_eq!(csr_ia, [1, 2, 3]);
        assert_eq!(csr_ja, [1, 1]);
        assert_eq!(read_el::<Rgb>(&csr_vs[0..]), b);
        assert_eq!(read_el::<Rgb>(&csr_vs[3..]), a);
    }
}
