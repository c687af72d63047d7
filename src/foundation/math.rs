/// Premultiply one channel: `round(c * a / 255)` without a division.
#[inline]
pub(crate) fn premul8(c: u8, a: u8) -> u8 {
    let t = u32::from(c) * u32::from(a) + 128;
    ((t + (t >> 8)) >> 8) as u8
}

/// `round(x * y / 255)` for an 8-bit channel scaled by an 8-bit factor.
#[inline]
pub(crate) fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

/// Pack premultiplied channels into the little-endian BGRA word layout.
#[inline]
pub(crate) fn pack_bgra(b: u8, g: u8, r: u8, a: u8) -> u32 {
    u32::from(b) | (u32::from(g) << 8) | (u32::from(r) << 16) | (u32::from(a) << 24)
}

/// Extent of one axis at `level`: `ceil(extent / 2^level)`.
#[inline]
pub(crate) fn mip_extent(extent: u32, level: u8) -> u32 {
    if extent == 0 {
        return 0;
    }
    let shift = u32::from(level.min(63));
    let divisor = 1u64 << shift;
    (u64::from(extent).div_ceil(divisor)) as u32
}

/// Byte length of a `width x height` buffer with `bpp` bytes per pixel.
pub(crate) fn checked_buffer_len(width: u32, height: u32, bpp: usize) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(bpp))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
