//! Mixed-radix index arithmetic shared by the padding kernels.
//!
//! Keys are linearised multi-indices: digit `j` has radix `lens[j]` and
//! mode 0 is the fastest-varying. Symmetry-packed blocks additionally
//! constrain consecutive digits, which makes the linearisation non-uniform;
//! [`calc_idx_arr`] inverts it.

use crate::padding::Sym;

/// Split a linear key into its per-mode digits under the given radices.
pub(crate) fn key_to_digits(key: i64, lens: &[i64], digits: &mut [i64]) {
    let mut k = key;
    for (d, &len) in digits.iter_mut().zip(lens) {
        *d = k % len;
        k /= len;
    }
}

/// Accumulate per-mode digits into a linear key under the given radices.
pub(crate) fn digits_to_key(digits: &[i64], lens: &[i64]) -> i64 {
    let mut key = 0;
    let mut lda = 1;
    for (d, &len) in digits.iter().zip(lens) {
        key += lda * d;
        lda *= len;
    }
    key
}

/// Per-mode counting tables of a symmetry-packed block.
///
/// `ways[m][v]` is the number of stored digit tuples `(d_0, ..., d_m)` with
/// `d_m = v`: one for every admissible completion of the lower modes under
/// the symmetry links (`d_j <= d_{j+1}` for `SY`, strict for `AS`/`SH`, no
/// constraint across `NS`).
fn ways_tables(lens: &[i64], sym: &[Sym]) -> Vec<Vec<i64>> {
    let order = lens.len();
    let mut ways: Vec<Vec<i64>> = Vec::with_capacity(order);
    for m in 0..order {
        let n = lens[m] as usize;
        let mut w = vec![0i64; n];
        if m == 0 {
            w.fill(1);
        } else {
            let prev = &ways[m - 1];
            let mut pre = vec![0i64; prev.len() + 1];
            for (i, &p) in prev.iter().enumerate() {
                pre[i + 1] = pre[i] + p;
            }
            for (v, slot) in w.iter_mut().enumerate() {
                *slot = match sym[m - 1] {
                    Sym::NS => pre[prev.len()],
                    Sym::SY => pre[(v + 1).min(prev.len())],
                    Sym::AS | Sym::SH => pre[v.min(prev.len())],
                };
            }
        }
        ways.push(w);
    }
    ways
}

/// Number of stored positions of a symmetry-packed block.
pub(crate) fn packed_size(lens: &[i64], sym: &[Sym]) -> i64 {
    if lens.is_empty() {
        return 1;
    }
    ways_tables(lens, sym).last().unwrap().iter().sum()
}

/// Invert the packed linearisation: compute the multi-index of the
/// `position`-th stored element of a symmetry-packed block.
///
/// The enumeration order is the one the block walkers use: mode 0 varies
/// fastest, each mode bounded by its symmetry link to the next.
pub(crate) fn calc_idx_arr(lens: &[i64], sym: &[Sym], position: i64, idx: &mut [i64]) {
    let order = lens.len();
    if order == 0 {
        return;
    }
    let ways = ways_tables(lens, sym);
    let mut rem = position;
    let mut bound: Option<(i64, bool)> = None;
    for dim in (0..order).rev() {
        let w = &ways[dim];
        let limit = match bound {
            None => lens[dim],
            Some((top, false)) => (top + 1).min(lens[dim]),
            Some((top, true)) => top.min(lens[dim]),
        };
        let mut v = 0i64;
        loop {
            assert!(
                v < limit,
                "packed position {} lies outside a block of {} elements",
                position,
                packed_size(lens, sym)
            );
            let lw = w[v as usize];
            if rem < lw {
                break;
            }
            rem -= lw;
            v += 1;
        }
        idx[dim] = v;
        bound = if dim > 0 {
            match sym[dim - 1] {
                Sym::NS => None,
                Sym::SY => Some((v, false)),
                Sym::AS | Sym::SH => Some((v, true)),
            }
        } else {
            None
        };
    }
    debug_assert_eq!(rem, 0);
}
