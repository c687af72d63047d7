//! SSE2 and AVX2 row kernels.
//!
//! The safe wrappers are only installed by `Blender` after runtime detection confirmed the
//! instruction set, which is what makes the inner `unsafe` calls sound.

use std::arch::x86_64::*;

use crate::blend::{PremulTable, scalar};

pub(crate) fn write_row_sse2(dst: &mut [u8], alpha: &[u8], table: &PremulTable) {
    // SAFETY: installed only when SSE2 was detected.
    unsafe { write_row_sse2_impl(dst, alpha, table) }
}

pub(crate) fn fill_row_sse2(dst: &mut [u8], pixel: u32) {
    // SAFETY: installed only when SSE2 was detected.
    unsafe { fill_row_sse2_impl(dst, pixel) }
}

pub(crate) fn clear_row_sse2(dst: &mut [u8]) {
    // SAFETY: installed only when SSE2 was detected.
    unsafe { fill_row_sse2_impl(dst, 0) }
    // Truncated rows may end mid-pixel.
    let tail = dst.len() - dst.len() % 4;
    dst[tail..].fill(0);
}

pub(crate) fn write_row_avx2(dst: &mut [u8], alpha: &[u8], table: &PremulTable) {
    // SAFETY: installed only when AVX2 was detected.
    unsafe { write_row_avx2_impl(dst, alpha, table) }
}

pub(crate) fn fill_row_avx2(dst: &mut [u8], pixel: u32) {
    // SAFETY: installed only when AVX2 was detected.
    unsafe { fill_row_avx2_impl(dst, pixel) }
}

pub(crate) fn clear_row_avx2(dst: &mut [u8]) {
    // SAFETY: installed only when AVX2 was detected.
    unsafe { fill_row_avx2_impl(dst, 0) }
    // Truncated rows may end mid-pixel.
    let tail = dst.len() - dst.len() % 4;
    dst[tail..].fill(0);
}

#[target_feature(enable = "sse2")]
unsafe fn write_row_sse2_impl(dst: &mut [u8], alpha: &[u8], table: &PremulTable) {
    let n = alpha.len().min(dst.len() / 4);
    let full = n - n % 4;
    let mut i = 0;
    while i < full {
        let v = _mm_set_epi32(
            table.get(alpha[i + 3]) as i32,
            table.get(alpha[i + 2]) as i32,
            table.get(alpha[i + 1]) as i32,
            table.get(alpha[i]) as i32,
        );
        // SAFETY: `i * 4 + 16 <= full * 4 <= dst.len()`; unaligned store.
        unsafe { _mm_storeu_si128(dst.as_mut_ptr().add(i * 4).cast::<__m128i>(), v) };
        i += 4;
    }
    scalar::write_row(&mut dst[full * 4..n * 4], &alpha[full..n], table);
}

#[target_feature(enable = "sse2")]
unsafe fn fill_row_sse2_impl(dst: &mut [u8], pixel: u32) {
    let v = _mm_set1_epi32(pixel as i32);
    let mut chunks = dst.chunks_exact_mut(16);
    for chunk in &mut chunks {
        // SAFETY: chunk is exactly 16 bytes; unaligned store.
        unsafe { _mm_storeu_si128(chunk.as_mut_ptr().cast::<__m128i>(), v) };
    }
    scalar::fill_row(chunks.into_remainder(), pixel);
}

#[target_feature(enable = "avx2")]
unsafe fn write_row_avx2_impl(dst: &mut [u8], alpha: &[u8], table: &PremulTable) {
    let n = alpha.len().min(dst.len() / 4);
    let full = n - n % 8;
    let base = table.entries().as_ptr().cast::<i32>();
    let mut i = 0;
    while i < full {
        // SAFETY: 8 alpha bytes at `i` are in bounds (`i + 8 <= full <= alpha.len()`), gather
        // indices are bytes so they stay inside the 256-entry table, and the 32-byte store
        // ends at `(i + 8) * 4 <= dst.len()`.
        unsafe {
            let a8 = _mm_loadl_epi64(alpha.as_ptr().add(i).cast::<__m128i>());
            let idx = _mm256_cvtepu8_epi32(a8);
            let px = _mm256_i32gather_epi32::<4>(base, idx);
            _mm256_storeu_si256(dst.as_mut_ptr().add(i * 4).cast::<__m256i>(), px);
        }
        i += 8;
    }
    scalar::write_row(&mut dst[full * 4..n * 4], &alpha[full..n], table);
}

#[target_feature(enable = "avx2")]
unsafe fn fill_row_avx2_impl(dst: &mut [u8], pixel: u32) {
    let v = _mm256_set1_epi32(pixel as i32);
    let mut chunks = dst.chunks_exact_mut(32);
    for chunk in &mut chunks {
        // SAFETY: chunk is exactly 32 bytes; unaligned store.
        unsafe { _mm256_storeu_si256(chunk.as_mut_ptr().cast::<__m256i>(), v) };
    }
    // SAFETY: AVX2 implies SSE2.
    unsafe { fill_row_sse2_impl(chunks.into_remainder(), pixel) };
}
