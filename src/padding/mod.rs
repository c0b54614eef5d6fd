//! Padding arithmetic: the bridge between logical and physical index
//! spaces.
//!
//! A tensor mode of logical extent `edge_len[i]` is stored with
//! `padding[i]` extra positions so that the padded extent divides the
//! mode's processor-grid phase. Keys of sparse pairs live either in the
//! logical (unpadded) space or in the physical (padded) space; dense
//! virtualized blocks always carry the padded positions. The kernels here
//! move pairs between the two spaces, strip pairs that fall into padding
//! or violate a mode symmetry, and zero the padding regions of dense
//! blocks in place so that local kernels never branch on padding.

use rayon::prelude::*;
use tracing::trace_span;

use crate::algebra::Algstrct;
use crate::index::{calc_idx_arr, digits_to_key, key_to_digits};
use crate::pairs::{PairsMut, PairsRef, KEY_BYTES};

/// Per-mode symmetry tag.
///
/// A tag other than `NS` on mode `i` relates mode `i` to mode `i + 1`:
/// stored digit sequences ascend across the link, strictly for the
/// antisymmetric and hollow kinds.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sym {
    /// No symmetry.
    NS = 0,
    /// Symmetric: `a[..i..j..] = a[..j..i..]`.
    SY,
    /// Antisymmetric: `a[..i..j..] = -a[..j..i..]`.
    AS,
    /// Symmetric hollow: symmetric with a zeroed diagonal.
    SH,
}

impl Sym {
    /// Whether the link forbids equal digits (antisymmetric and hollow).
    pub fn is_strict(self) -> bool {
        matches!(self, Sym::AS | Sym::SH)
    }
}

/// Rewrite pair keys from the logical index space to the padded one.
///
/// Each key is decomposed into per-mode digits under `edge_len`, biased by
/// `offsets` when given, and re-accumulated against the padded strides
/// `edge_len[j] + padding[j]`. Pairs are independent, so the rewrite runs
/// in parallel.
pub fn pad_key(
    edge_len: &[i64],
    padding: &[i64],
    pairs: &mut [u8],
    sr: &dyn Algstrct,
    offsets: Option<&[i64]>,
) {
    let _span = trace_span!("pad_key").entered();
    let order = edge_len.len();
    assert_eq!(padding.len(), order);
    if let Some(off) = offsets {
        assert_eq!(off.len(), order);
    }
    let ps = sr.pair_size();
    assert!(pairs.len() % ps == 0);

    let padded: Vec<i64> = edge_len.iter().zip(padding).map(|(e, p)| e + p).collect();
    pairs.par_chunks_mut(ps).for_each_init(
        || vec![0i64; order],
        |digits, rec| {
            let k = i64::from_le_bytes(rec[..KEY_BYTES].try_into().unwrap());
            key_to_digits(k, edge_len, digits);
            if let Some(off) = offsets {
                for (d, &o) in digits.iter_mut().zip(off) {
                    *d += o;
                }
            }
            let knew = digits_to_key(digits, &padded);
            rec[..KEY_BYTES].copy_from_slice(&knew.to_le_bytes());
        },
    );
}

/// Compact a padded-space pair buffer down to the pairs that carry data.
///
/// A pair survives iff every digit of its key lies inside the logical
/// extent (`prepadding[j] <= d_j < edge_len[j]`) and consecutive digits
/// respect the mode symmetry. Survivors are written to `new_pairs` in
/// their input order; the retained count is returned.
///
/// Symmetry is checked across each link `j -> j + 1` for `j < order - 1`;
/// a non-`NS` tag on the last mode has nothing to relate to and is
/// accepted unconstrained.
pub fn depad_tsr(
    edge_len: &[i64],
    sym: &[Sym],
    padding: &[i64],
    prepadding: &[i64],
    pairs: &[u8],
    new_pairs: &mut [u8],
    sr: &dyn Algstrct,
) -> i64 {
    let _span = trace_span!("depad_tsr").entered();
    let order = edge_len.len();
    assert_eq!(sym.len(), order);
    assert_eq!(padding.len(), order);
    assert_eq!(prepadding.len(), order);

    let ps = sr.pair_size();
    let input = PairsRef::new(pairs, sr);
    let num_pair = input.len();
    if num_pair == 0 {
        return 0;
    }
    let padded: Vec<i64> = edge_len.iter().zip(padding).map(|(e, p)| e + p).collect();

    let keep = |key: i64, kparts: &mut [i64]| -> bool {
        key_to_digits(key, &padded, kparts);
        for j in 0..order {
            if kparts[j] >= edge_len[j] || kparts[j] < prepadding[j] {
                return false;
            }
        }
        for j in 0..order.saturating_sub(1) {
            match sym[j] {
                Sym::SY => {
                    if kparts[j + 1] < kparts[j] {
                        return false;
                    }
                }
                Sym::AS | Sym::SH => {
                    if kparts[j + 1] <= kparts[j] {
                        return false;
                    }
                }
                Sym::NS => {}
            }
        }
        true
    };

    let ntd = rayon::current_num_threads().max(1);
    let chunk = num_pair / ntd;
    let range = |t: usize| -> (usize, usize) {
        let st = chunk * t;
        let end = if t == ntd - 1 { num_pair } else { chunk * (t + 1) };
        (st, end)
    };

    // Count survivors per range, then write each range into its window of
    // the output computed by the exclusive prefix sum of the counts.
    let counts: Vec<usize> = (0..ntd)
        .into_par_iter()
        .map(|t| {
            let (st, end) = range(t);
            let mut kparts = vec![0i64; order];
            (st..end)
                .filter(|&i| keep(input.key(i), &mut kparts))
                .count()
        })
        .collect();

    let total: usize = counts.iter().sum();
    assert!(
        new_pairs.len() >= total * ps,
        "depad output buffer holds {} pairs, needs {}",
        new_pairs.len() / ps,
        total
    );

    let mut windows: Vec<&mut [u8]> = Vec::with_capacity(ntd);
    let mut rest: &mut [u8] = new_pairs;
    for &c in &counts {
        let (win, tail) = std::mem::take(&mut rest).split_at_mut(c * ps);
        windows.push(win);
        rest = tail;
    }

    windows
        .into_par_iter()
        .enumerate()
        .for_each(|(t, win)| {
            let (st, end) = range(t);
            let mut out = PairsMut::with_stride(win, ps);
            let mut kparts = vec![0i64; order];
            let mut n = 0;
            for i in st..end {
                let p = input.pair(i);
                if keep(p.key(), &mut kparts) {
                    out.write(n, p);
                    n += 1;
                }
            }
        });

    total as i64
}

/// Expand a local block's interior pairs into a fully padded pair buffer.
///
/// `old_data` holds `size` pairs describing the interior (non-padded)
/// positions of the virtual sub-blocks owned under `virt_phys_rank`. The
/// result is a fresh buffer whose leading records are one pair per padded
/// position (key in the padded space, value the additive identity),
/// followed by a verbatim copy of `old_data`, `pad_el` pairs in total.
///
/// The enumeration advances `virt_phys_rank` componentwise modulo
/// `virt_phase` as it walks the sub-blocks; a full walk returns the ranks
/// to their initial values.
#[allow(clippy::too_many_arguments)]
pub fn pad_tsr(
    edge_len: &[i64],
    sym: &[Sym],
    padding: &[i64],
    phys_phase: &[i64],
    virt_phys_rank: &mut [i64],
    virt_phase: &[i64],
    old_data: &[u8],
    sr: &dyn Algstrct,
) -> (Vec<u8>, i64) {
    let _span = trace_span!("pad_tsr").entered();
    let order = edge_len.len();
    assert_eq!(sym.len(), order);
    assert_eq!(padding.len(), order);
    assert_eq!(phys_phase.len(), order);
    assert_eq!(virt_phys_rank.len(), order);
    assert_eq!(virt_phase.len(), order);
    for i in 0..order {
        assert!(phys_phase[i] > 0 && virt_phase[i] > 0);
        assert!(
            (edge_len[i] + padding[i]) % phys_phase[i] == 0,
            "padded extent of mode {} does not divide its physical phase",
            i
        );
    }

    let ps = sr.pair_size();
    assert!(old_data.len() % ps == 0);
    let size = (old_data.len() / ps) as i64;

    if order == 0 {
        return (old_data.to_vec(), size);
    }

    let mut idx = vec![0i64; order];

    // Counting sweep: every stored position of every owned sub-block.
    let mut pad_el: i64 = 0;
    loop {
        idx.fill(0);
        loop {
            let pad_max = if order > 1 && sym[0] != Sym::NS {
                idx[1] + 1
            } else {
                (edge_len[0] + padding[0]) / phys_phase[0]
            };
            pad_el += pad_max;
            let mut act_lda = 1;
            while act_lda < order {
                idx[act_lda] += 1;
                let mut imax = (edge_len[act_lda] + padding[act_lda]) / phys_phase[act_lda];
                if sym[act_lda] != Sym::NS && act_lda + 1 < order {
                    imax = idx[act_lda + 1] + 1;
                }
                if idx[act_lda] >= imax {
                    idx[act_lda] = 0;
                }
                if idx[act_lda] != 0 {
                    break;
                }
                act_lda += 1;
            }
            if act_lda == order {
                break;
            }
        }
        let mut act_lda = 0;
        while act_lda < order {
            virt_phys_rank[act_lda] += 1;
            if virt_phys_rank[act_lda] % virt_phase[act_lda] == 0 {
                virt_phys_rank[act_lda] -= virt_phase[act_lda];
            }
            if virt_phys_rank[act_lda] % virt_phase[act_lda] != 0 {
                break;
            }
            act_lda += 1;
        }
        if act_lda == order {
            break;
        }
    }

    let mut buf = sr.pair_alloc(pad_el as usize);
    let addid = sr.addid().to_vec();

    // Writing sweep: emit one identity-valued pair per position that is
    // unreachable from this rank or outside the logical region.
    let mut new_el: i64 = 0;
    {
        let mut padded = PairsMut::new(&mut buf, sr);
        let mut offset: i64 = 0;
        let mut outside: i64 = -1;
        let mut virt_lda: i64 = 1;
        for i in 0..order {
            offset += virt_phys_rank[i] * virt_lda;
            virt_lda *= edge_len[i] + padding[i];
        }

        loop {
            idx.fill(0);
            loop {
                let imax;
                let pad_max;
                if order > 1 && sym[0] != Sym::NS {
                    if idx[1] < edge_len[0] / phys_phase[0] {
                        let mut m = idx[1];
                        if sym[0] != Sym::SY && virt_phys_rank[0] < virt_phys_rank[1] {
                            m += 1;
                        }
                        if sym[0] == Sym::SY && virt_phys_rank[0] <= virt_phys_rank[1] {
                            m += 1;
                        }
                        imax = m;
                    } else {
                        let mut m = edge_len[0] / phys_phase[0];
                        if virt_phys_rank[0] < edge_len[0] % phys_phase[0] {
                            m += 1;
                        }
                        imax = m;
                    }
                    pad_max = idx[1] + 1;
                } else {
                    let mut m = edge_len[0] / phys_phase[0];
                    if virt_phys_rank[0] < edge_len[0] % phys_phase[0] {
                        m += 1;
                    }
                    imax = m;
                    pad_max = (edge_len[0] + padding[0]) / phys_phase[0];
                }

                if outside == -1 {
                    for i in 0..(pad_max - imax) {
                        let at = (new_el + i) as usize;
                        padded.write_key(at, offset + (imax + i) * phys_phase[0]);
                        padded.write_val(at, &addid);
                    }
                    new_el += pad_max - imax;
                } else {
                    for i in 0..pad_max {
                        let at = (new_el + i) as usize;
                        padded.write_key(at, offset + i * phys_phase[0]);
                        padded.write_val(at, &addid);
                    }
                    new_el += pad_max;
                }

                let mut edge_lda = edge_len[0] + padding[0];
                let mut act_lda = 1;
                while act_lda < order {
                    offset -= idx[act_lda] * edge_lda * phys_phase[act_lda];
                    idx[act_lda] += 1;
                    let mut imax = (edge_len[act_lda] + padding[act_lda]) / phys_phase[act_lda];
                    if sym[act_lda] != Sym::NS
                        && act_lda + 1 < order
                        && idx[act_lda + 1] + 1 <= imax
                    {
                        imax = idx[act_lda + 1] + 1;
                    }
                    if idx[act_lda] >= imax {
                        idx[act_lda] = 0;
                    }
                    offset += idx[act_lda] * edge_lda * phys_phase[act_lda];

                    let interior = edge_len[act_lda] / phys_phase[act_lda];
                    if idx[act_lda] > interior
                        || (idx[act_lda] == interior
                            && edge_len[act_lda] % phys_phase[act_lda]
                                <= virt_phys_rank[act_lda])
                    {
                        if outside < act_lda as i64 {
                            outside = act_lda as i64;
                        }
                    } else if outside == act_lda as i64 {
                        outside = -1;
                    }
                    if sym[act_lda] != Sym::NS
                        && act_lda + 1 < order
                        && idx[act_lda] == idx[act_lda + 1]
                    {
                        if sym[act_lda] != Sym::SY
                            && virt_phys_rank[act_lda] >= virt_phys_rank[act_lda + 1]
                            && outside < act_lda as i64
                        {
                            outside = act_lda as i64;
                        }
                        if sym[act_lda] == Sym::SY
                            && virt_phys_rank[act_lda] > virt_phys_rank[act_lda + 1]
                            && outside < act_lda as i64
                        {
                            outside = act_lda as i64;
                        }
                    }
                    if idx[act_lda] != 0 {
                        break;
                    }
                    edge_lda *= edge_len[act_lda] + padding[act_lda];
                    act_lda += 1;
                }
                if act_lda == order {
                    break;
                }
            }

            let mut virt_lda: i64 = 1;
            let mut act_lda = 0;
            while act_lda < order {
                offset -= virt_phys_rank[act_lda] * virt_lda;
                virt_phys_rank[act_lda] += 1;
                if virt_phys_rank[act_lda] % virt_phase[act_lda] == 0 {
                    virt_phys_rank[act_lda] -= virt_phase[act_lda];
                }
                offset += virt_phys_rank[act_lda] * virt_lda;
                if virt_phys_rank[act_lda] % virt_phase[act_lda] != 0 {
                    break;
                }
                virt_lda *= edge_len[act_lda] + padding[act_lda];
                act_lda += 1;
            }
            if act_lda == order {
                break;
            }
        }
    }

    assert_eq!(
        new_el + size,
        pad_el,
        "padded position count does not close: {} padding + {} interior != {}",
        new_el,
        size,
        pad_el
    );
    buf[new_el as usize * ps..].copy_from_slice(old_data);
    (buf, pad_el)
}

/// Per-thread walk parameters for [`zero_padding`].
struct BlockRange {
    vst: i64,
    vend: i64,
    st_index: i64,
    end_index: i64,
    st_idx: Option<Vec<i64>>,
}

/// Overwrite the padding and symmetry-forbidden regions of a dense
/// virtualized block with the additive identity, in place.
///
/// `vdata` holds `nvirt` packed virtual sub-blocks, each of
/// `prod(edge_len[i] / phase[i])` stored positions under the weakened
/// (non-strict) symmetry. `edge_len` here is the padded extent; `phase`
/// is the total phase (physical times virtual) and `virt_dim` the virtual
/// factor; `phase_rank` is the combined phase rank of the first sub-block.
///
/// Writes are idempotent: applying the kernel twice leaves the bytes of
/// the first application.
#[allow(clippy::too_many_arguments)]
pub fn zero_padding(
    nvirt: i64,
    edge_len: &[i64],
    sym: &[Sym],
    padding: &[i64],
    phase: &[i64],
    virt_dim: &[i64],
    phase_rank: &[i64],
    vdata: &mut [u8],
    sr: &dyn Algstrct,
) {
    let order = edge_len.len();
    if order == 0 {
        return;
    }
    let _span = trace_span!("zero_padding").entered();
    assert_eq!(sym.len(), order);
    assert_eq!(padding.len(), order);
    assert_eq!(phase.len(), order);
    assert_eq!(virt_dim.len(), order);
    assert_eq!(phase_rank.len(), order);
    for i in 0..order {
        assert!(phase[i] > 0 && virt_dim[i] > 0);
        assert!(
            edge_len[i] % phase[i] == 0,
            "padded extent of mode {} does not divide its phase",
            i
        );
    }

    let el = sr.el_size();
    assert!(vdata.len() % el == 0);
    let size = (vdata.len() / el) as i64;
    if size == 0 {
        return;
    }
    assert!(nvirt > 0 && size % nvirt == 0);
    let vrt_sz = size / nvirt;

    let virt_len: Vec<i64> = edge_len.iter().zip(phase).map(|(e, p)| e / p).collect();
    // Slicing respects the packed storage layout, which is non-strict for
    // every symmetric kind.
    let ssym: Vec<Sym> = sym
        .iter()
        .map(|s| if *s == Sym::NS { Sym::NS } else { Sym::SY })
        .collect();

    let ntd = rayon::current_num_threads().max(1);

    // Thread boundaries as global element positions. Whole sub-blocks per
    // thread when there are enough of them; otherwise an even element
    // split whose boundaries are snapped down to mode-0 row starts, so
    // each boundary row is owned by exactly one thread.
    let mut starts = vec![0i64; ntd + 1];
    let mut start_idx: Vec<Option<Vec<i64>>> = (0..ntd).map(|_| None).collect();
    if (ntd as i64) <= nvirt {
        for t in 0..ntd {
            let t64 = t as i64;
            let vst = (nvirt / ntd as i64) * t64 + t64.min(nvirt % ntd as i64);
            starts[t] = vst * vrt_sz;
        }
    } else {
        let chunk = size / ntd as i64;
        for t in 0..ntd {
            let t64 = t as i64;
            let st_chunk = chunk * t64 + t64.min(size % ntd as i64);
            let vst = st_chunk / vrt_sz;
            let mut st_index = st_chunk - vst * vrt_sz;
            if st_index != 0 {
                let mut idx = vec![0i64; order];
                calc_idx_arr(&virt_len, &ssym, st_index, &mut idx);
                st_index -= idx[0];
                idx[0] = 0;
                start_idx[t] = Some(idx);
            }
            starts[t] = vst * vrt_sz + st_index;
        }
    }
    starts[ntd] = size;

    let mut ranges: Vec<(BlockRange, &mut [u8])> = Vec::with_capacity(ntd);
    let mut rest: &mut [u8] = vdata;
    for t in 0..ntd {
        let start = starts[t];
        let end = starts[t + 1];
        let bytes = ((end - start).max(0) as usize) * el;
        let (win, tail) = std::mem::take(&mut rest).split_at_mut(bytes);
        rest = tail;
        if start >= end {
            continue;
        }
        let vst = start / vrt_sz;
        let st_index = start - vst * vrt_sz;
        let vend = if end % vrt_sz == 0 {
            end / vrt_sz
        } else {
            end / vrt_sz + 1
        };
        let end_index = end - (vend - 1) * vrt_sz;
        ranges.push((
            BlockRange {
                vst,
                vend,
                st_index,
                end_index,
                st_idx: start_idx[t].take(),
            },
            win,
        ));
    }

    let addid = sr.addid();

    ranges.into_par_iter().for_each(|(range, slice)| {
        let mut idx = vec![0i64; order];
        let mut virt_rank = vec![0i64; order];
        let mut prank = phase_rank.to_vec();

        for p in 0..nvirt {
            if p >= range.vst && p < range.vend {
                let is_sh_pad0 = order > 1
                    && ((sym[0].is_strict() && prank[0] >= prank[1])
                        || (sym[0] == Sym::SY && prank[0] > prank[1]));
                let pad0 = (padding[0] + prank[0]) / phase[0];
                let len0 = virt_len[0] - pad0;
                let mut plen0 = virt_len[0];
                let block_base = (p - range.vst) * vrt_sz - range.st_index;

                let mut buf_offset: i64;
                if p == range.vst && range.st_index != 0 {
                    let st = range.st_idx.as_ref().unwrap();
                    idx[0] = 0;
                    idx[1..].copy_from_slice(&st[1..]);
                    buf_offset = range.st_index;
                } else {
                    idx.fill(0);
                    buf_offset = 0;
                }

                loop {
                    let mut is_outside = false;
                    for i in 1..order {
                        let curr_idx = idx[i] * phase[i] + prank[i];
                        if curr_idx >= edge_len[i] - padding[i] {
                            is_outside = true;
                            break;
                        }
                        if i < order - 1 {
                            let sym_idx = idx[i + 1] * phase[i + 1] + prank[i + 1];
                            if (sym[i].is_strict() && curr_idx >= sym_idx)
                                || (sym[i] == Sym::SY && curr_idx > sym_idx)
                            {
                                is_outside = true;
                                break;
                            }
                        }
                    }

                    if order > 1 && sym[0] != Sym::NS {
                        plen0 = idx[1] + 1;
                    }

                    let at = ((block_base + buf_offset) * el as i64) as usize;
                    if is_outside {
                        let n = plen0 as usize;
                        sr.set(&mut slice[at..at + n * el], addid, n);
                    } else {
                        let s1 = (plen0 - is_sh_pad0 as i64).min(len0).clamp(0, plen0);
                        let n = (plen0 - s1) as usize;
                        if n > 0 {
                            let from = at + s1 as usize * el;
                            sr.set(&mut slice[from..from + n * el], addid, n);
                        }
                    }
                    buf_offset += plen0;

                    if p == range.vend - 1 && buf_offset >= range.end_index {
                        break;
                    }
                    let mut i = 1;
                    while i < order {
                        idx[i] += 1;
                        let mut act_max = virt_len[i];
                        if sym[i] != Sym::NS && i + 1 < order {
                            act_max = act_max.min(idx[i + 1] + 1);
                        }
                        if idx[i] >= act_max {
                            idx[i] = 0;
                        }
                        if idx[i] > 0 {
                            break;
                        }
                        i += 1;
                    }
                    if i >= order {
                        break;
                    }
                }
            }

            for d in 0..order {
                prank[d] -= virt_rank[d];
                virt_rank[d] += 1;
                if virt_rank[d] >= virt_dim[d] {
                    virt_rank[d] = 0;
                }
                prank[d] += virt_rank[d];
                if virt_rank[d] > 0 {
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::Semiring;
    use crate::pairs::PairsRef;

    fn pair_buf(sr: &dyn Algstrct, entries: &[(i64, f64)]) -> Vec<u8> {
        let mut buf = sr.pair_alloc(entries.len());
        for (i, (k, v)) in entries.iter().enumerate() {
            sr.set_pair(&mut buf[i * sr.pair_size()..], *k, &v.to_le_bytes());
        }
        buf
    }

    fn keys(sr: &dyn Algstrct, buf: &[u8], n: usize) -> Vec<i64> {
        let pairs = PairsRef::new(&buf[..n * sr.pair_size()], sr);
        (0..n).map(|i| pairs.key(i)).collect()
    }

    #[test]
    fn pad_key_2d() {
        let sr = Semiring::<f64>::default();
        // Logical key 5 under edge [3, 2] is (2, 1); padded stride is 4.
        let mut buf = pair_buf(&sr, &[(5, 1.0)]);
        pad_key(&[3, 2], &[1, 0], &mut buf, &sr, None);
        assert_eq!(keys(&sr, &buf, 1), vec![6]);
    }

    #[test]
    fn pad_key_with_offsets() {
        let sr = Semiring::<f64>::default();
        let mut buf = pair_buf(&sr, &[(5, 1.0)]);
        pad_key(&[3, 2], &[1, 0], &mut buf, &sr, Some(&[1, 0]));
        // Digits (2, 1) biased to (3, 1): 3 + 1 * 4.
        assert_eq!(keys(&sr, &buf, 1), vec![7]);
    }

    #[test]
    fn pad_key_many() {
        let sr = Semiring::<f64>::default();
        let entries: Vec<(i64, f64)> = (0..6).map(|k| (k, k as f64)).collect();
        let mut buf = pair_buf(&sr, &entries);
        pad_key(&[3, 2], &[2, 1], &mut buf, &sr, None);
        // (d0, d1) -> d0 + 5 * d1.
        assert_eq!(keys(&sr, &buf, 6), vec![0, 1, 2, 5, 6, 7]);
    }

    #[test]
    fn depad_2d_symmetric() {
        let sr = Semiring::<f64>::default();
        let entries: Vec<(i64, f64)> = (0..9).map(|k| (k, k as f64)).collect();
        let input = pair_buf(&sr, &entries);
        let mut out = sr.pair_alloc(9);
        let n = depad_tsr(
            &[3, 3],
            &[Sym::SY, Sym::NS],
            &[0, 0],
            &[0, 0],
            &input,
            &mut out,
            &sr,
        );
        assert_eq!(n, 6);
        assert_eq!(keys(&sr, &out, 6), vec![0, 3, 4, 6, 7, 8]);
    }

    #[test]
    fn depad_antisymmetric_drops_diagonal() {
        let sr = Semiring::<f64>::default();
        let entries: Vec<(i64, f64)> = (0..9).map(|k| (k, k as f64)).collect();
        let input = pair_buf(&sr, &entries);
        let mut out = sr.pair_alloc(9);
        let n = depad_tsr(
            &[3, 3],
            &[Sym::AS, Sym::NS],
            &[0, 0],
            &[0, 0],
            &input,
            &mut out,
            &sr,
        );
        // Strictly below-diagonal digit pairs only: (0,1), (0,2), (1,2).
        assert_eq!(n, 3);
        assert_eq!(keys(&sr, &out, 3), vec![3, 6, 7]);
    }

    #[test]
    fn depad_respects_bounds_and_prepadding() {
        let sr = Semiring::<f64>::default();
        let entries: Vec<(i64, f64)> = (0..4).map(|k| (k, k as f64)).collect();
        let input = pair_buf(&sr, &entries);

        let mut out = sr.pair_alloc(4);
        let n = depad_tsr(&[3], &[Sym::NS], &[1], &[0], &input, &mut out, &sr);
        assert_eq!(n, 3);
        assert_eq!(keys(&sr, &out, 3), vec![0, 1, 2]);

        let n = depad_tsr(&[3], &[Sym::NS], &[1], &[1], &input, &mut out, &sr);
        assert_eq!(n, 2);
        assert_eq!(keys(&sr, &out, 2), vec![1, 2]);
    }

    #[test]
    fn depad_keeps_values_with_keys() {
        let sr = Semiring::<f64>::default();
        let input = pair_buf(&sr, &[(0, 10.0), (3, 13.0), (1, 11.0)]);
        let mut out = sr.pair_alloc(3);
        let n = depad_tsr(&[3], &[Sym::NS], &[1], &[0], &input, &mut out, &sr);
        assert_eq!(n, 2);
        let pairs = PairsRef::new(&out[..2 * sr.pair_size()], &sr);
        assert_eq!(pairs.key(0), 0);
        assert_eq!(pairs.pair(0).val(), &10.0f64.to_le_bytes());
        assert_eq!(pairs.key(1), 1);
        assert_eq!(pairs.pair(1).val(), &11.0f64.to_le_bytes());
    }

    #[test]
    fn pad_tsr_1d() {
        let sr = Semiring::<f64>::default();
        let old = pair_buf(&sr, &[(0, 1.0), (1, 2.0), (2, 3.0)]);
        let mut rank = vec![0i64];
        let (buf, pad_el) = pad_tsr(
            &[3],
            &[Sym::NS],
            &[1],
            &[1],
            &mut rank,
            &[1],
            &old,
            &sr,
        );
        assert_eq!(pad_el, 4);
        assert_eq!(rank, vec![0]);
        let pairs = PairsRef::new(&buf, &sr);
        // One padding pair at the tail position, identity-valued.
        assert_eq!(pairs.key(0), 3);
        assert_eq!(pairs.pair(0).val(), sr.addid());
        assert_eq!(pairs.key(1), 0);
        assert_eq!(pairs.key(2), 1);
        assert_eq!(pairs.key(3), 2);
    }

    #[test]
    fn pad_tsr_2d_distributed_mode() {
        let sr = Semiring::<f64>::default();
        // Mode 0 of logical extent 4 padded to 6 over a physical phase of
        // 2; this rank owns positions 0, 2, 4 per row and 4 is padding.
        let interior = pair_buf(&sr, &[(0, 1.0), (2, 2.0), (6, 3.0), (8, 4.0)]);
        let mut rank = vec![0i64, 0];
        let (buf, pad_el) = pad_tsr(
            &[4, 2],
            &[Sym::NS, Sym::NS],
            &[2, 0],
            &[2, 1],
            &mut rank,
            &[1, 1],
            &interior,
            &sr,
        );
        assert_eq!(pad_el, 6);
        assert_eq!(rank, vec![0, 0]);
        let pairs = PairsRef::new(&buf, &sr);
        assert_eq!(pairs.key(0), 4);
        assert_eq!(pairs.key(1), 10);
        assert_eq!(pairs.pair(0).val(), sr.addid());
        assert_eq!(pairs.pair(1).val(), sr.addid());
    }

    #[test]
    fn pad_tsr_counting_consistency() {
        let sr = Semiring::<f64>::default();
        // Symmetric 3x3 interior padded to 4x4: the six packed interior
        // positions (d0 <= d1 < 3) under the padded stride of 4.
        let interior = pair_buf(
            &sr,
            &[(0, 1.0), (4, 2.0), (5, 3.0), (8, 4.0), (9, 5.0), (10, 6.0)],
        );
        let mut rank = vec![0i64, 0];
        let (buf, pad_el) = pad_tsr(
            &[3, 3],
            &[Sym::SY, Sym::NS],
            &[1, 1],
            &[1, 1],
            &mut rank,
            &[1, 1],
            &interior,
            &sr,
        );
        // Packed positions of a 4x4 non-strict triangle; the kernel
        // asserts padding + interior == pad_el internally.
        assert_eq!(pad_el, 10);
        let pairs = PairsRef::new(&buf, &sr);
        // The padding pairs are the whole d1 = 3 row.
        assert_eq!(
            (0..4).map(|i| pairs.key(i)).collect::<Vec<_>>(),
            vec![12, 13, 14, 15]
        );
        for i in 0..4 {
            assert_eq!(pairs.pair(i).val(), sr.addid());
        }
    }

    fn f64_block(vals: &[f64]) -> Vec<u8> {
        vals.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn block_vals(bytes: &[u8]) -> Vec<f64> {
        bytes
            .chunks_exact(8)
            .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
            .collect()
    }

    #[test]
    fn zero_padding_order_zero_is_identity() {
        let sr = Semiring::<f64>::default();
        let mut data = f64_block(&[42.0]);
        let before = data.clone();
        zero_padding(1, &[], &[], &[], &[], &[], &[], &mut data, &sr);
        assert_eq!(data, before);
    }

    #[test]
    fn zero_padding_1d_tail() {
        let sr = Semiring::<f64>::default();
        let mut data = f64_block(&[1.0; 6]);
        zero_padding(1, &[6], &[Sym::NS], &[2], &[1], &[1], &[0], &mut data, &sr);
        assert_eq!(block_vals(&data), vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_padding_1d_two_virtual_blocks() {
        let sr = Semiring::<f64>::default();
        // Padded extent 8, total phase 2, two virtual blocks of 4. Global
        // mode-0 positions 6 and 7 are padding: the last slot of each
        // block.
        let mut data = f64_block(&[1.0; 8]);
        zero_padding(2, &[8], &[Sym::NS], &[2], &[2], &[2], &[0], &mut data, &sr);
        assert_eq!(
            block_vals(&data),
            vec![1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0]
        );
    }

    #[test]
    fn zero_padding_2d_symmetric() {
        let sr = Semiring::<f64>::default();
        // 4x4 padded, logical 3x3, symmetric: packed rows of lengths 1, 2,
        // 3, 4; the last row is entirely padding.
        let mut data = f64_block(&[1.0; 10]);
        zero_padding(
            1,
            &[4, 4],
            &[Sym::SY, Sym::NS],
            &[1, 1],
            &[1, 1],
            &[1, 1],
            &[0, 0],
            &mut data,
            &sr,
        );
        assert_eq!(
            block_vals(&data),
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn zero_padding_antisymmetric_zeroes_diagonal() {
        let sr = Semiring::<f64>::default();
        let mut data = f64_block(&[1.0; 10]);
        zero_padding(
            1,
            &[4, 4],
            &[Sym::AS, Sym::NS],
            &[1, 1],
            &[1, 1],
            &[1, 1],
            &[0, 0],
            &mut data,
            &sr,
        );
        // Rows (d1 = 0..3): diagonal slot of each interior row zeroed,
        // padding row zeroed whole.
        assert_eq!(
            block_vals(&data),
            vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn zero_padding_is_idempotent() {
        let sr = Semiring::<f64>::default();
        // Logical 3x3 padded to 4x4 over a 2x2 virtual grid: four 2x2
        // sub-blocks.
        let mut data = f64_block(&(0..16).map(|i| i as f64 + 1.0).collect::<Vec<_>>());
        let edge = [4i64, 4];
        let sym = [Sym::NS, Sym::NS];
        let pad = [1i64, 1];
        let phase = [2i64, 2];
        let vdim = [2i64, 2];
        zero_padding(4, &edge, &sym, &pad, &phase, &vdim, &[0, 0], &mut data, &sr);
        let once = data.clone();
        zero_padding(4, &edge, &sym, &pad, &phase, &vdim, &[0, 0], &mut data, &sr);
        assert_eq!(data, once);
        // Something was actually zeroed.
        assert!(block_vals(&data).contains(&0.0));
    }

    #[test]
    fn tropical_identity_fills_padding() {
        // The identity bytes are broadcast, never inspected: a max-plus
        // monoid pads with -inf, not zero.
        use crate::algebra::Monoid;
        let sr = Monoid::<f64>::new(f64::NEG_INFINITY, f64::max);
        let mut data = f64_block(&[1.0; 4]);
        zero_padding(1, &[4], &[Sym::NS], &[1], &[1], &[1], &[0], &mut data, &sr);
        assert_eq!(block_vals(&data), vec![1.0, 1.0, 1.0, f64::NEG_INFINITY]);
    }
}
