//! Compute dispatch contract between generators and whatever executes kernels.
//!
//! A generator never touches texels itself: it issues one [`DispatchRequest`]
//! naming a kernel and carrying its constant bytes. The dispatcher writes the
//! target buffer before returning.

mod cpu;

pub use cpu::CpuDispatcher;

use crate::biome_map::BiomeTables;
use crate::settings::{
    RidgeNoiseSettings, SimpleNoiseSettings, TerrainNoiseSettings, WarpedSimpleNoiseSettings,
};

/// Kernels a dispatcher must provide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelId {
    SimpleNoise,
    RidgeNoise,
    WarpedSimpleNoise,
    TerrainNoise,
}

impl KernelId {
    /// Size in bytes of the constants this kernel expects.
    pub fn constants_size(self) -> usize {
        match self {
            KernelId::SimpleNoise => std::mem::size_of::<SimpleNoiseSettings>(),
            KernelId::RidgeNoise => std::mem::size_of::<RidgeNoiseSettings>(),
            KernelId::WarpedSimpleNoise => std::mem::size_of::<WarpedSimpleNoiseSettings>(),
            KernelId::TerrainNoise => std::mem::size_of::<TerrainNoiseSettings>(),
        }
    }
}

/// Errors returned by a [`ComputeDispatcher`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// Constant bytes do not match the kernel's parameter layout.
    #[error("{kernel:?} expects {expected} constant bytes, got {actual}")]
    ConstantsSize {
        kernel: KernelId,
        expected: usize,
        actual: usize,
    },
    /// Buffer length disagrees with its resolution.
    #[error("height buffer holds {actual} texels, resolution {resolution} needs {expected}")]
    BufferSize {
        resolution: u32,
        expected: usize,
        actual: usize,
    },
    /// Backend-specific failure.
    #[error("dispatch failed: {0}")]
    Backend(String),
}

/// Square buffer of heights, row-major, zero-initialized.
///
/// Resolution is fixed for the buffer's lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightBuffer {
    resolution: u32,
    texels: Vec<f32>,
}

impl HeightBuffer {
    /// Allocate a zeroed `resolution`×`resolution` buffer.
    pub fn new(resolution: u32) -> Self {
        Self {
            resolution,
            texels: vec![0.0; (resolution as usize) * (resolution as usize)],
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn texels(&self) -> &[f32] {
        &self.texels
    }

    pub fn texels_mut(&mut self) -> &mut [f32] {
        &mut self.texels
    }

    /// Height at texel `(x, y)`, `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        if x >= self.resolution || y >= self.resolution {
            return None;
        }
        self.texels.get((y * self.resolution + x) as usize).copied()
    }

    /// Reset every texel to zero.
    pub fn clear(&mut self) {
        self.texels.fill(0.0);
    }

    /// `(min, max)` height, `None` for an empty buffer.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.texels.iter().copied();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), h| (lo.min(h), hi.max(h))))
    }

    pub(crate) fn check_len(&self) -> Result<(), DispatchError> {
        let expected = (self.resolution as usize) * (self.resolution as usize);
        if self.texels.len() != expected {
            return Err(DispatchError::BufferSize {
                resolution: self.resolution,
                expected,
                actual: self.texels.len(),
            });
        }
        Ok(())
    }
}

/// One kernel invocation over a whole height buffer.
#[derive(Clone, Copy, Debug)]
pub struct DispatchRequest<'a> {
    pub kernel: KernelId,
    /// World position of texel `(0, 0)`, in tile units.
    pub world_offset: [f32; 2],
    /// Kernel parameters, byte-for-byte the `#[repr(C)]` settings record.
    pub constants: &'a [u8],
    /// Biome map and per-biome tables, read-only.
    pub tables: &'a BiomeTables,
}

/// Executes kernels against height buffers.
///
/// Implementations add the kernel output onto the existing buffer contents and
/// return only once the buffer is fully written.
pub trait ComputeDispatcher {
    fn dispatch(
        &mut self,
        target: &mut HeightBuffer,
        request: &DispatchRequest<'_>,
    ) -> Result<(), DispatchError>;
}

impl<D: ComputeDispatcher + ?Sized> ComputeDispatcher for &mut D {
    fn dispatch(
        &mut self,
        target: &mut HeightBuffer,
        request: &DispatchRequest<'_>,
    ) -> Result<(), DispatchError> {
        (**self).dispatch(target, request)
    }
}
