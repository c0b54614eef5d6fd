//! Delegation hooks for a vendor sparse kernel.
//!
//! Vendor math libraries ship COO↔CSR converters for their native numeric
//! widths (4, 8, and 16 byte elements). The portable conversion consults
//! these hooks first and falls back transparently when they decline, so a
//! build with a vendor kernel linked in behaves identically to one
//! without. This build carries no vendor library: the hooks always
//! decline, which is the supported answer, not an error.

#[allow(clippy::too_many_arguments)]
pub(crate) fn try_coo_to_csr(
    _nz: i64,
    _nrow: i32,
    _csr_vs: &mut [u8],
    _csr_ja: &mut [i32],
    _csr_ia: &mut [i32],
    _coo_vs: &[u8],
    _coo_rs: &[i32],
    _coo_cs: &[i32],
    _el_size: usize,
) -> bool {
    false
}

#[allow(clippy::too_many_arguments)]
pub(crate) fn try_csr_to_coo(
    _nz: i64,
    _nrow: i32,
    _csr_vs: &[u8],
    _csr_ja: &[i32],
    _csr_ia: &[i32],
    _coo_vs: &mut [u8],
    _coo_rs: &mut [i32],
    _coo_cs: &mut [i32],
    _el_size: usize,
) -> bool {
    false
}
