use std::fmt::Debug;

use crate::foundation::error::PresentResult;
use crate::mip::MipBuffer;

/// Opaque identity of a render surface or device. `0` is the null identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BackendIdentity(pub u64);

impl BackendIdentity {
    /// No surface; requests carrying it are ignored.
    pub const NULL: Self = Self(0);

    /// `true` for [`BackendIdentity::NULL`].
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Surface a draw request targets: identity plus a generation bumped on device loss or
/// surface recreation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceBinding {
    /// Surface identity.
    pub identity: BackendIdentity,
    /// Monotonic generation of that surface.
    pub generation: u64,
}

impl SurfaceBinding {
    /// Bind to `identity` at `generation`.
    pub fn new(identity: BackendIdentity, generation: u64) -> Self {
        Self {
            identity,
            generation,
        }
    }
}

/// Key of one cached device resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BackendResourceKey {
    /// Surface identity the handle was created for.
    pub identity: BackendIdentity,
    /// Surface generation at creation time.
    pub generation: u64,
    /// Mip level the handle holds.
    pub mip_level: u8,
}

impl BackendResourceKey {
    /// Key for `level` under `binding`.
    pub fn new(binding: SurfaceBinding, mip_level: u8) -> Self {
        Self {
            identity: binding.identity,
            generation: binding.generation,
            mip_level,
        }
    }

    /// `true` when the key was created under `binding`.
    pub fn matches(&self, binding: SurfaceBinding) -> bool {
        self.identity == binding.identity && self.generation == binding.generation
    }
}

/// Device side of the cache: turns premultiplied BGRA levels into backend handles.
///
/// Handles are released exactly once through [`ImageBackend::release_bitmap`]; releasing a
/// handle whose device has since been lost must be harmless.
pub trait ImageBackend {
    /// Backend resource handle.
    type Handle: Copy + Eq + Debug;

    /// Upload `buffer` (mip level `level`) for the surface in `binding`.
    fn create_bitmap(
        &mut self,
        binding: SurfaceBinding,
        level: u8,
        buffer: &MipBuffer,
    ) -> PresentResult<Self::Handle>;

    /// Release a handle previously returned by `create_bitmap`.
    fn release_bitmap(&mut self, handle: Self::Handle);
}
