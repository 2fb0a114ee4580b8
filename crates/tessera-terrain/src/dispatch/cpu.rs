//! CPU reference implementation of the noise kernels.
//!
//! Texel `(i, j)` of a resolution-`R` buffer samples world point
//! `offset + (i, j) / (R - 1)`, so neighbouring tiles share their edge samples
//! and the field is continuous across tiles.

use bytemuck::Pod;
use noise::{NoiseFn, Simplex};

use super::{ComputeDispatcher, DispatchError, DispatchRequest, HeightBuffer, KernelId};
use crate::biome_map::BiomeTables;
use crate::settings::{
    RidgeNoiseSettings, SimpleNoiseSettings, TerrainNoiseSettings, WarpedSimpleNoiseSettings,
};

/// Offset between the two warp samples so x and y displacement decorrelate.
const WARP_DECORRELATION: [f64; 2] = [5.2, 1.3];

/// Runs every kernel on the calling thread with simplex noise.
pub struct CpuDispatcher {
    noise: Simplex,
    dispatches: u64,
}

impl CpuDispatcher {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Simplex::new(seed),
            dispatches: 0,
        }
    }

    /// Number of successful dispatches so far.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatches
    }

    /// Fractal Brownian motion: `(Σ noise · persistenceⁱ + verticalShift) · elevation`.
    fn fbm(&self, s: &SimpleNoiseSettings, p: [f64; 2]) -> f64 {
        let mut total = 0.0;
        let mut frequency = s.frequency as f64;
        let mut amplitude = 1.0;

        for _ in 0..s.octaves.max(0) {
            let nx = (p[0] + s.offset_x as f64) * frequency;
            let ny = (p[1] + s.offset_y as f64) * frequency;
            total += self.noise.get([nx, ny]) * amplitude;

            frequency *= s.lacunarity as f64;
            amplitude *= s.persistence as f64;
        }

        (total + s.vertical_shift as f64) * s.elevation as f64
    }

    /// Ridged multifractal; each octave is weighted by the previous one.
    fn ridge(&self, s: &RidgeNoiseSettings, p: [f64; 2]) -> f64 {
        let mut total = 0.0;
        let mut frequency = s.frequency as f64;
        let mut amplitude = 1.0;
        let mut weight = 1.0;
        let smoothing = (s.peak_smoothing as f64).clamp(0.0, 1.0);

        for _ in 0..s.octaves.max(0) {
            let nx = (p[0] + s.offset_x as f64) * frequency;
            let ny = (p[1] + s.offset_y as f64) * frequency;
            let mut n = (1.0 - self.noise.get([nx, ny]).abs()).powf(s.power as f64);
            n += (n * n * (3.0 - 2.0 * n) - n) * smoothing;
            n *= weight;
            weight = (n * s.gain as f64).clamp(0.0, 1.0);
            total += n * amplitude;

            frequency *= s.lacunarity as f64;
            amplitude *= s.persistence as f64;
        }

        (total + s.vertical_shift as f64) * s.elevation as f64
    }

    fn warp(&self, s: &SimpleNoiseSettings, p: [f64; 2]) -> [f64; 2] {
        let dx = self.fbm(s, p);
        let dy = self.fbm(s, [p[0] + WARP_DECORRELATION[0], p[1] + WARP_DECORRELATION[1]]);
        [p[0] + dx, p[1] + dy]
    }

    fn warped(&self, s: &WarpedSimpleNoiseSettings, p: [f64; 2]) -> f64 {
        self.fbm(&s.noise_settings, self.warp(&s.warp_settings, p))
    }

    /// Continents below zero are floored and deepened; mountains fade in
    /// across `mountain_blend` around the coastline.
    fn terrain(&self, s: &TerrainNoiseSettings, p: [f64; 2]) -> f64 {
        let q = self.warp(&s.warp_settings, p);
        let continent = self.fbm(&s.continent_settings, q);

        let shaped = if continent < 0.0 {
            let floored = smooth_max(
                continent,
                -(s.ocean_floor_depth as f64),
                s.ocean_floor_smoothing as f64,
            );
            floored * (1.0 + s.ocean_depth_multiplier as f64)
        } else {
            continent
        };

        let blend = s.mountain_blend as f64;
        let mask = if blend > 0.0 {
            smoothstep(-blend, blend, continent)
        } else if continent > 0.0 {
            1.0
        } else {
            0.0
        };
        if mask == 0.0 {
            return shaped;
        }

        shaped + self.ridge(&s.mountain_settings, q) * mask
    }

    /// Terrain composite plus the blended per-biome composites under `p`.
    fn biome_terrain(&self, s: &TerrainNoiseSettings, tables: &BiomeTables, p: [f64; 2]) -> f64 {
        let base = self.terrain(s, p);
        tables
            .blend_weights([p[0] as f32, p[1] as f32])
            .into_iter()
            .filter_map(|(id, w)| tables.generation_settings.get(id.index()).map(|b| (b, w)))
            .fold(base, |acc, (biome, w)| acc + self.terrain(biome, p) * w as f64)
    }
}

impl Default for CpuDispatcher {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ComputeDispatcher for CpuDispatcher {
    fn dispatch(
        &mut self,
        target: &mut HeightBuffer,
        request: &DispatchRequest<'_>,
    ) -> Result<(), DispatchError> {
        target.check_len()?;
        let offset = request.world_offset;

        match request.kernel {
            KernelId::SimpleNoise => {
                let s: SimpleNoiseSettings = read_constants(request)?;
                accumulate(target, offset, |p| self.fbm(&s, p));
            }
            KernelId::RidgeNoise => {
                let s: RidgeNoiseSettings = read_constants(request)?;
                accumulate(target, offset, |p| self.ridge(&s, p));
            }
            KernelId::WarpedSimpleNoise => {
                let s: WarpedSimpleNoiseSettings = read_constants(request)?;
                accumulate(target, offset, |p| self.warped(&s, p));
            }
            KernelId::TerrainNoise => {
                let s: TerrainNoiseSettings = read_constants(request)?;
                accumulate(target, offset, |p| self.biome_terrain(&s, request.tables, p));
            }
        }

        self.dispatches += 1;
        Ok(())
    }
}

fn read_constants<T: Pod>(request: &DispatchRequest<'_>) -> Result<T, DispatchError> {
    bytemuck::try_pod_read_unaligned(request.constants).map_err(|_| {
        DispatchError::ConstantsSize {
            kernel: request.kernel,
            expected: std::mem::size_of::<T>(),
            actual: request.constants.len(),
        }
    })
}

/// Add `f(world)` onto every texel.
fn accumulate(target: &mut HeightBuffer, offset: [f32; 2], f: impl Fn([f64; 2]) -> f64) {
    let res = target.resolution();
    let span = res.saturating_sub(1).max(1) as f64;
    let texels = target.texels_mut();

    for j in 0..res {
        let wy = offset[1] as f64 + j as f64 / span;
        for i in 0..res {
            let wx = offset[0] as f64 + i as f64 / span;
            texels[(j * res + i) as usize] += f([wx, wy]) as f32;
        }
    }
}

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Polynomial smooth maximum; `k <= 0` is a hard max.
fn smooth_max(a: f64, b: f64, k: f64) -> f64 {
    if k <= 0.0 {
        return a.max(b);
    }
    let h = (0.5 + 0.5 * (a - b) / k).clamp(0.0, 1.0);
    b + (a - b) * h + k * h * (1.0 - h)
}
