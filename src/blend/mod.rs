//! Row-level premultiplication primitives with runtime SIMD dispatch.
//!
//! A [`Blender`] picks the widest instruction set the running CPU supports once, stores the
//! matching kernels as function pointers and applies them uniformly. The scalar kernels are the
//! oracle: every vector path produces byte-identical output for every input.
//!
//! Pixels are 32-bit BGRA words in memory order `B, G, R, A`, premultiplied with
//! `premul8(c, a) = ((c*a + 128) + ((c*a + 128) >> 8)) >> 8`.

use std::sync::OnceLock;

use crate::foundation::core::Color;
use crate::foundation::math::{pack_bgra, premul8};

#[cfg(target_arch = "aarch64")]
#[allow(unsafe_code)]
mod neon;
pub(crate) mod scalar;
#[cfg(target_arch = "x86_64")]
#[allow(unsafe_code)]
mod x86;

/// Instruction sets the blender can dispatch to, narrowest first.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum SimdLevel {
    /// Portable byte loops.
    Scalar,
    /// 128-bit x86 vectors.
    Sse2,
    /// 128-bit aarch64 vectors.
    Neon,
    /// 256-bit x86 vectors with gathers.
    Avx2,
}

impl SimdLevel {
    /// Every level, narrowest first.
    pub const ALL: [SimdLevel; 4] = [Self::Scalar, Self::Sse2, Self::Neon, Self::Avx2];

    /// Widest level supported by the running CPU.
    pub fn detect() -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|level| level.is_supported())
            .unwrap_or(Self::Scalar)
    }

    /// `true` when the running CPU can execute this level.
    pub fn is_supported(self) -> bool {
        match self {
            Self::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            Self::Sse2 => std::arch::is_x86_feature_detected!("sse2"),
            #[cfg(target_arch = "x86_64")]
            Self::Avx2 => std::arch::is_x86_feature_detected!("avx2"),
            #[cfg(target_arch = "aarch64")]
            Self::Neon => std::arch::is_aarch64_feature_detected!("neon"),
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }
}

/// 256-entry lookup of premultiplied packed pixels for one source color, indexed by alpha.
#[derive(Clone, PartialEq, Eq)]
pub struct PremulTable([u32; 256]);

impl PremulTable {
    /// Build the table for `color`. The color's own alpha is ignored: the index is the alpha.
    ///
    /// Entry 0 is the fully transparent pixel regardless of color.
    pub fn for_color(color: Color) -> Self {
        let mut table = [0u32; 256];
        for (a, entry) in table.iter_mut().enumerate().skip(1) {
            let a = a as u8;
            *entry = pack_bgra(
                premul8(color.b, a),
                premul8(color.g, a),
                premul8(color.r, a),
                a,
            );
        }
        Self(table)
    }

    /// Packed pixel for straight alpha `a`.
    #[inline]
    pub fn get(&self, a: u8) -> u32 {
        self.0[usize::from(a)]
    }

    /// All 256 entries.
    pub fn entries(&self) -> &[u32; 256] {
        &self.0
    }
}

impl std::fmt::Debug for PremulTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PremulTable")
            .field("opaque", &format_args!("{:#010x}", self.0[255]))
            .finish()
    }
}

/// Build the premultiplied lookup table for `color`.
pub fn build_premultiplied_table(color: Color) -> PremulTable {
    PremulTable::for_color(color)
}

type WriteRowFn = fn(&mut [u8], &[u8], &PremulTable);
type FillRowFn = fn(&mut [u8], u32);
type ClearRowFn = fn(&mut [u8]);

/// Capability-dispatched row primitives. Stateless, `Copy`, and safe to share across threads.
#[derive(Clone, Copy, Debug)]
pub struct Blender {
    level: SimdLevel,
    write_row: WriteRowFn,
    fill_row: FillRowFn,
    clear_row: ClearRowFn,
}

impl Default for Blender {
    fn default() -> Self {
        *Self::global()
    }
}

impl Blender {
    /// Process-wide blender using the detected level, chosen on first use.
    pub fn global() -> &'static Blender {
        static GLOBAL: OnceLock<Blender> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            let level = SimdLevel::detect();
            tracing::trace!(?level, "selected blend kernels");
            Self::with_level(level)
        })
    }

    /// Blender pinned to `level`, or to scalar if the CPU lacks it.
    pub fn with_level(level: SimdLevel) -> Self {
        let level = if level.is_supported() {
            level
        } else {
            SimdLevel::Scalar
        };
        match level {
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Avx2 => Self {
                level,
                write_row: x86::write_row_avx2,
                fill_row: x86::fill_row_avx2,
                clear_row: x86::clear_row_avx2,
            },
            #[cfg(target_arch = "x86_64")]
            SimdLevel::Sse2 => Self {
                level,
                write_row: x86::write_row_sse2,
                fill_row: x86::fill_row_sse2,
                clear_row: x86::clear_row_sse2,
            },
            #[cfg(target_arch = "aarch64")]
            SimdLevel::Neon => Self {
                level,
                write_row: neon::write_row_neon,
                fill_row: neon::fill_row_neon,
                clear_row: neon::clear_row_neon,
            },
            _ => Self::scalar(),
        }
    }

    /// The reference implementation.
    pub fn scalar() -> Self {
        Self {
            level: SimdLevel::Scalar,
            write_row: scalar::write_row,
            fill_row: scalar::fill_row,
            clear_row: scalar::clear_row,
        }
    }

    /// Level these kernels run at.
    pub fn level(&self) -> SimdLevel {
        self.level
    }

    /// Write `table[alpha_row[i]]` for each alpha sample that fits in `dst`.
    pub fn write_row(&self, dst: &mut [u8], alpha_row: &[u8], table: &PremulTable) {
        let n = alpha_row.len().min(dst.len() / 4);
        if n == 0 {
            return;
        }
        (self.write_row)(&mut dst[..n * 4], &alpha_row[..n], table);
    }

    /// Write a row of `color` modulated by an alpha mask.
    pub fn write_row_from_color(&self, dst: &mut [u8], alpha_row: &[u8], color: Color) {
        self.write_row(dst, alpha_row, &PremulTable::for_color(color));
    }

    /// Fill up to `count` pixels with `color` premultiplied by its own alpha.
    pub fn fill_row(&self, dst: &mut [u8], count: usize, color: Color) {
        let n = count.min(dst.len() / 4);
        if n == 0 {
            return;
        }
        let a = color.a;
        let pixel = pack_bgra(
            premul8(color.b, a),
            premul8(color.g, a),
            premul8(color.r, a),
            a,
        );
        (self.fill_row)(&mut dst[..n * 4], pixel);
    }

    /// Zero every byte of `dst`.
    pub fn clear_row(&self, dst: &mut [u8]) {
        (self.clear_row)(dst);
    }

    /// Zero `width * 4` bytes in each of `height` rows spaced `stride` bytes apart.
    ///
    /// Rows that run past the end of `buf` are truncated.
    pub fn clear_region(&self, buf: &mut [u8], stride: usize, width: usize, height: usize) {
        if width == 0 || height == 0 {
            return;
        }
        let row_bytes = width.saturating_mul(4);
        for y in 0..height {
            let Some(start) = y.checked_mul(stride) else {
                return;
            };
            if start >= buf.len() {
                return;
            }
            let end = start.saturating_add(row_bytes).min(buf.len());
            (self.clear_row)(&mut buf[start..end]);
            if stride == 0 {
                return;
            }
        }
    }

    /// Premultiply straight-alpha BGRA `src` into `dst` (pixel count is the shorter of both).
    pub fn premultiply_into(&self, src: &[u8], dst: &mut [u8]) {
        scalar::premultiply_row(src, dst);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/blend/mod.rs"]
mod tests;
