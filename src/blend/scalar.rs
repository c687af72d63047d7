//! Reference kernels. Every vector path must match these byte for byte.

use crate::blend::PremulTable;
use crate::foundation::math::premul8;

pub(crate) fn write_row(dst: &mut [u8], alpha: &[u8], table: &PremulTable) {
    for (px, &a) in dst.chunks_exact_mut(4).zip(alpha) {
        px.copy_from_slice(&table.get(a).to_le_bytes());
    }
}

pub(crate) fn fill_row(dst: &mut [u8], pixel: u32) {
    let bytes = pixel.to_le_bytes();
    for px in dst.chunks_exact_mut(4) {
        px.copy_from_slice(&bytes);
    }
}

pub(crate) fn clear_row(dst: &mut [u8]) {
    dst.fill(0);
}

pub(crate) fn premultiply_row(src: &[u8], dst: &mut [u8]) {
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3];
        d[0] = premul8(s[0], a);
        d[1] = premul8(s[1], a);
        d[2] = premul8(s[2], a);
        d[3] = a;
    }
}
