use std::collections::HashMap;

use vello_cpu::peniko::color::PremulRgba8;

use crate::cache::backend::{BackendIdentity, ImageBackend, SurfaceBinding};
use crate::foundation::error::{PresentError, PresentResult};
use crate::foundation::math::mul_div255;
use crate::mip::MipBuffer;
use crate::present::DrawImage;

/// Options for [`CpuPixmapBackend`].
#[derive(Clone, Copy, Debug)]
pub struct CpuPixmapBackendOpts {
    /// Identity reported in [`CpuPixmapBackend::binding`]. Must not be null to receive handles.
    pub identity: BackendIdentity,
    /// Largest accepted bitmap edge; `vello_cpu` pixmaps top out at `u16::MAX`.
    pub max_dimension: u32,
}

impl Default for CpuPixmapBackendOpts {
    fn default() -> Self {
        Self {
            identity: BackendIdentity(1),
            max_dimension: u32::from(u16::MAX),
        }
    }
}

/// Handle to a pixmap owned by a [`CpuPixmapBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixmapHandle(u64);

/// Reference backend keeping each uploaded level as a `vello_cpu` pixmap.
pub struct CpuPixmapBackend {
    opts: CpuPixmapBackendOpts,
    generation: u64,
    next_handle: u64,
    pixmaps: HashMap<PixmapHandle, vello_cpu::Pixmap>,
}

impl std::fmt::Debug for CpuPixmapBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuPixmapBackend")
            .field("opts", &self.opts)
            .field("generation", &self.generation)
            .field("live", &self.pixmaps.len())
            .finish()
    }
}

impl Default for CpuPixmapBackend {
    fn default() -> Self {
        Self::new(CpuPixmapBackendOpts::default())
    }
}

impl CpuPixmapBackend {
    /// Backend with no pixmaps at generation 0.
    pub fn new(opts: CpuPixmapBackendOpts) -> Self {
        Self {
            opts,
            generation: 0,
            next_handle: 0,
            pixmaps: HashMap::new(),
        }
    }

    /// Binding to pass with every request targeting this backend.
    pub fn binding(&self) -> SurfaceBinding {
        SurfaceBinding::new(self.opts.identity, self.generation)
    }

    /// Simulate device loss: every pixmap is gone and the generation moves on.
    pub fn device_lost(&mut self) {
        let lost = self.pixmaps.len();
        self.pixmaps.clear();
        self.generation = self.generation.saturating_add(1);
        tracing::debug!(lost, generation = self.generation, "cpu backend device lost");
    }

    /// Pixmaps currently alive.
    pub fn live_resources(&self) -> usize {
        self.pixmaps.len()
    }

    /// Pixmap behind `handle`, if still alive.
    pub fn pixmap(&self, handle: PixmapHandle) -> Option<&vello_cpu::Pixmap> {
        self.pixmaps.get(&handle)
    }

    /// Composite `draw` into `target` with nearest sampling and premultiplied source-over.
    ///
    /// A target pixel is covered when its center lies inside both `draw.dest` and `draw.clip`;
    /// pixels outside the target are clipped too.
    pub fn draw_image(
        &self,
        target: &mut vello_cpu::Pixmap,
        draw: &DrawImage<PixmapHandle>,
    ) -> PresentResult<()> {
        let image = self
            .pixmaps
            .get(&draw.handle)
            .ok_or_else(|| PresentError::backend("unknown or released pixmap handle"))?;

        let (dest, src) = (draw.dest, draw.src);
        if !(dest.width() > 0.0 && dest.height() > 0.0 && src.width() > 0.0 && src.height() > 0.0)
        {
            return Ok(());
        }

        let iw = usize::from(image.width());
        let ih = usize::from(image.height());
        let tw = usize::from(target.width());
        let th = usize::from(target.height());
        if iw == 0 || ih == 0 || tw == 0 || th == 0 {
            return Ok(());
        }

        let visible = dest.intersect(draw.clip);
        let x_span = covered_span(visible.x0, visible.x1, tw);
        let y_span = covered_span(visible.y0, visible.y1, th);
        let Some(((x_start, x_end), (y_start, y_end))) = x_span.zip(y_span) else {
            return Ok(());
        };

        let sample = |center: f64, d0: f64, dw: f64, s0: f64, sw: f64, limit: usize| {
            let s = (s0 + (center - d0) / dw * sw).floor();
            s.clamp(0.0, (limit - 1) as f64) as usize
        };

        let image_bytes = image.data_as_u8_slice();
        let target_bytes = target.data_as_u8_slice_mut();
        for y in y_start..y_end {
            let sy = sample(y as f64 + 0.5, dest.y0, dest.height(), src.y0, src.height(), ih);
            let src_row = &image_bytes[sy * iw * 4..(sy + 1) * iw * 4];
            let dst_row = &mut target_bytes[y * tw * 4..(y + 1) * tw * 4];
            for x in x_start..x_end {
                let sx = sample(x as f64 + 0.5, dest.x0, dest.width(), src.x0, src.width(), iw);
                let s = &src_row[sx * 4..sx * 4 + 4];
                let d = &mut dst_row[x * 4..x * 4 + 4];
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        }
        Ok(())
    }
}

impl ImageBackend for CpuPixmapBackend {
    type Handle = PixmapHandle;

    fn create_bitmap(
        &mut self,
        binding: SurfaceBinding,
        level: u8,
        buffer: &MipBuffer,
    ) -> PresentResult<PixmapHandle> {
        if binding != self.binding() {
            return Err(PresentError::backend(format!(
                "stale binding {binding:?}; backend is at {:?}",
                self.binding()
            )));
        }
        let (width, height) = (buffer.width(), buffer.height());
        if width > self.opts.max_dimension || height > self.opts.max_dimension {
            return Err(PresentError::backend(format!(
                "mip level {level} is {width}x{height}, above the {} pixel limit",
                self.opts.max_dimension
            )));
        }
        let pixmap = pixmap_from_premul_bgra(buffer.bytes(), width, height)?;

        self.next_handle += 1;
        let handle = PixmapHandle(self.next_handle);
        self.pixmaps.insert(handle, pixmap);
        Ok(handle)
    }

    fn release_bitmap(&mut self, handle: PixmapHandle) {
        // Handles from before a device loss are already gone.
        self.pixmaps.remove(&handle);
    }
}

fn pixmap_from_premul_bgra(
    bgra8_premul: &[u8],
    width: u32,
    height: u32,
) -> PresentResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PresentError::backend("bitmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PresentError::backend("bitmap height exceeds u16"))?;
    if bgra8_premul.len() != width as usize * height as usize * 4 {
        return Err(PresentError::backend("mip buffer byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in bgra8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(PremulRgba8 {
            r: px[2],
            g: px[1],
            b: px[0],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

/// Half-open pixel index range whose centers fall in `[lo, hi)`, clipped to `0..len`.
fn covered_span(lo: f64, hi: f64, len: usize) -> Option<(usize, usize)> {
    let start = (lo - 0.5).ceil().max(0.0);
    let end = (hi - 0.5).ceil().min(len as f64);
    (start < end).then_some((start as usize, end as usize))
}

fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/cache/cpu.rs"]
mod tests;
