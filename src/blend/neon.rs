//! NEON row kernels for aarch64.

use std::arch::aarch64::*;

use crate::blend::{PremulTable, scalar};

pub(crate) fn write_row_neon(dst: &mut [u8], alpha: &[u8], table: &PremulTable) {
    // SAFETY: installed only when NEON was detected.
    unsafe { write_row_neon_impl(dst, alpha, table) }
}

pub(crate) fn fill_row_neon(dst: &mut [u8], pixel: u32) {
    // SAFETY: installed only when NEON was detected.
    unsafe { fill_row_neon_impl(dst, pixel) }
}

pub(crate) fn clear_row_neon(dst: &mut [u8]) {
    // SAFETY: installed only when NEON was detected.
    unsafe { fill_row_neon_impl(dst, 0) }
    // Truncated rows may end mid-pixel.
    let tail = dst.len() - dst.len() % 4;
    dst[tail..].fill(0);
}

#[target_feature(enable = "neon")]
unsafe fn write_row_neon_impl(dst: &mut [u8], alpha: &[u8], table: &PremulTable) {
    let n = alpha.len().min(dst.len() / 4);
    let full = n - n % 4;
    let mut i = 0;
    while i < full {
        let lanes = [
            table.get(alpha[i]),
            table.get(alpha[i + 1]),
            table.get(alpha[i + 2]),
            table.get(alpha[i + 3]),
        ];
        // SAFETY: `lanes` is a local u32 array; the byte store ends at `(i + 4) * 4 <= dst.len()`.
        unsafe {
            let v = vld1q_u32(lanes.as_ptr());
            vst1q_u8(dst.as_mut_ptr().add(i * 4), vreinterpretq_u8_u32(v));
        }
        i += 4;
    }
    scalar::write_row(&mut dst[full * 4..n * 4], &alpha[full..n], table);
}

#[target_feature(enable = "neon")]
unsafe fn fill_row_neon_impl(dst: &mut [u8], pixel: u32) {
    let v = vreinterpretq_u8_u32(vdupq_n_u32(pixel));
    let mut chunks = dst.chunks_exact_mut(16);
    for chunk in &mut chunks {
        // SAFETY: chunk is exactly 16 bytes.
        unsafe { vst1q_u8(chunk.as_mut_ptr(), v) };
    }
    scalar::fill_row(chunks.into_remainder(), pixel);
}
