//! The generated biome map and the side tables published with it.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use static_assertions::const_assert_eq;

use crate::biome::BiomeId;
use crate::grid::Grid;
use crate::settings::TerrainNoiseSettings;

/// Square grid of biome ids. Resolution is `4 · 2^k`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BiomeMap {
    grid: Grid<BiomeId>,
}

impl BiomeMap {
    pub fn new(grid: Grid<BiomeId>) -> Self {
        Self { grid }
    }

    /// A zero-resolution map, used before the first generation.
    pub fn empty() -> Self {
        Self {
            grid: Grid::filled(0, BiomeId(0)),
        }
    }

    pub fn resolution(&self) -> u32 {
        self.grid.size()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.size() == 0
    }

    /// Biome at cell `(x, y)`, `None` outside the map.
    pub fn get(&self, x: i32, y: i32) -> Option<BiomeId> {
        self.grid.get(x, y)
    }

    pub fn grid(&self) -> &Grid<BiomeId> {
        &self.grid
    }

    /// Number of cells holding `id`.
    pub fn count(&self, id: BiomeId) -> usize {
        self.grid.cells().iter().filter(|&&c| c == id).count()
    }
}

/// Surface tint colours for one biome, laid out as four padded `float3`s.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiomeTan {
    pub shore_colour: [f32; 3],
    #[serde(skip)]
    pub _pad0: f32,
    pub flat_colour: [f32; 3],
    #[serde(skip)]
    pub _pad1: f32,
    pub slope_colour: [f32; 3],
    #[serde(skip)]
    pub _pad2: f32,
    pub cliff_colour: [f32; 3],
    #[serde(skip)]
    pub _pad3: f32,
}

impl Default for BiomeTan {
    fn default() -> Self {
        Self {
            shore_colour: [0.89, 0.8, 0.42],
            _pad0: 0.0,
            flat_colour: [0.3, 0.5, 0.05],
            _pad1: 0.0,
            slope_colour: [0.35, 0.23, 0.04],
            _pad2: 0.0,
            cliff_colour: [0.19, 0.18, 0.15],
            _pad3: 0.0,
        }
    }
}

/// Placement of the biome map in world space, in tile units.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiomeMapping {
    /// World position of the map's `(0, 0)` corner.
    pub top_left: [f32; 2],
    /// World extent covered by the whole map, per side.
    pub scale: f32,
    /// Map resolution; overwritten on every publish.
    #[serde(skip)]
    pub resolution: u32,
    /// Width, in cells, of the band over which neighbouring biomes are blended.
    pub blending: f32,
    #[serde(skip)]
    pub _padding: [f32; 3],
}

impl Default for BiomeMapping {
    fn default() -> Self {
        Self {
            top_left: [0.0, 0.0],
            scale: 8.0,
            resolution: 0,
            blending: 0.5,
            _padding: [0.0; 3],
        }
    }
}

const_assert_eq!(std::mem::size_of::<BiomeTan>(), 64);
const_assert_eq!(std::mem::size_of::<BiomeMapping>(), 32);

/// Immutable snapshot handed to dispatchers and renderers.
///
/// Replaced wholesale by the generator, never edited in place.
#[derive(Clone, Debug, PartialEq)]
pub struct BiomeTables {
    pub map: BiomeMap,
    /// Composite terrain parameters, indexed by biome id.
    pub generation_settings: Vec<TerrainNoiseSettings>,
    /// Surface tints, indexed by biome id.
    pub tans: Vec<BiomeTan>,
    /// RGBA minimap colours, indexed by biome id.
    pub minimap_colours: Vec<[f32; 4]>,
    pub mapping: BiomeMapping,
}

impl BiomeTables {
    /// Tables with no biome map; kernels skip the biome term.
    pub fn empty() -> Self {
        Self {
            map: BiomeMap::empty(),
            generation_settings: Vec::new(),
            tans: Vec::new(),
            minimap_colours: Vec::new(),
            mapping: BiomeMapping::default(),
        }
    }

    /// Continuous cell-space coordinate of a world position.
    fn cell_coord(&self, world: [f32; 2]) -> Option<[f32; 2]> {
        let res = self.map.resolution();
        if res == 0 || self.mapping.scale <= 0.0 {
            return None;
        }
        let u = (world[0] - self.mapping.top_left[0]) / self.mapping.scale;
        let v = (world[1] - self.mapping.top_left[1]) / self.mapping.scale;
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            return None;
        }
        Some([u * res as f32, v * res as f32])
    }

    /// Biome under a world position, `None` outside the mapped area.
    pub fn biome_at(&self, world: [f32; 2]) -> Option<BiomeId> {
        let [cx, cy] = self.cell_coord(world)?;
        self.map.get(cx as i32, cy as i32)
    }

    /// Blend weights of the biomes around a world position.
    ///
    /// Each axis fades linearly across a band of `mapping.blending` cells
    /// centred on the cell boundary. Weights sum to 1. Empty outside the map.
    pub fn blend_weights(&self, world: [f32; 2]) -> Vec<(BiomeId, f32)> {
        let Some([cx, cy]) = self.cell_coord(world) else {
            return Vec::new();
        };
        let res = self.map.resolution() as i32;
        let blending = self.mapping.blending.max(0.0);

        let axis = |c: f32| -> (i32, f32) {
            // Position relative to cell centres: base cell and weight of base + 1.
            let rel = c - 0.5;
            let base = rel.floor();
            let frac = rel - base;
            let t = if blending > 0.0 {
                ((frac - 0.5) / blending + 0.5).clamp(0.0, 1.0)
            } else if frac >= 0.5 {
                1.0
            } else {
                0.0
            };
            (base as i32, t)
        };
        let (bx, tx) = axis(cx);
        let (by, ty) = axis(cy);

        let mut weights: Vec<(BiomeId, f32)> = Vec::with_capacity(4);
        for (dx, wx) in [(0, 1.0 - tx), (1, tx)] {
            for (dy, wy) in [(0, 1.0 - ty), (1, ty)] {
                let w = wx * wy;
                if w <= 0.0 {
                    continue;
                }
                let x = (bx + dx).clamp(0, res - 1);
                let y = (by + dy).clamp(0, res - 1);
                let Some(id) = self.map.get(x, y) else {
                    continue;
                };
                match weights.iter_mut().find(|(b, _)| *b == id) {
                    Some((_, acc)) => *acc += w,
                    None => weights.push((id, w)),
                }
            }
        }
        weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn striped_tables() -> BiomeTables {
        // Left half biome 0, right half biome 1.
        let grid = Grid::from_fn(4, |x, _| BiomeId(if x < 2 { 0 } else { 1 }));
        BiomeTables {
            map: BiomeMap::new(grid),
            mapping: BiomeMapping {
                scale: 4.0,
                resolution: 4,
                ..Default::default()
            },
            ..BiomeTables::empty()
        }
    }

    #[test]
    fn test_biome_at_maps_world_to_cell() {
        let tables = striped_tables();
        assert_eq!(tables.biome_at([0.5, 0.5]), Some(BiomeId(0)));
        assert_eq!(tables.biome_at([3.5, 2.0]), Some(BiomeId(1)));
        assert_eq!(tables.biome_at([-0.1, 0.0]), None);
        assert_eq!(tables.biome_at([4.0, 0.0]), None, "right edge is exclusive");
    }

    #[test]
    fn test_blend_weights_sum_to_one() {
        let tables = striped_tables();
        for x in [0.1f32, 1.0, 1.9, 2.0, 2.1, 3.9] {
            let weights = tables.blend_weights([x, 1.3]);
            let total: f32 = weights.iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-5, "weights at x={x} sum to {total}");
        }
    }

    #[test]
    fn test_blend_weights_mix_at_boundary() {
        let tables = striped_tables();
        let weights = tables.blend_weights([2.0, 1.5]);
        assert_eq!(weights.len(), 2, "boundary should mix both stripes: {weights:?}");
        let inside = tables.blend_weights([0.5, 1.5]);
        assert_eq!(inside, vec![(BiomeId(0), 1.0)]);
    }

    #[test]
    fn test_empty_tables_have_no_biome() {
        let tables = BiomeTables::empty();
        assert_eq!(tables.biome_at([0.0, 0.0]), None);
        assert!(tables.blend_weights([0.0, 0.0]).is_empty());
    }

    #[test]
    fn test_tan_defaults_serialize_without_padding() {
        let json = serde_json::to_value(BiomeTan::default()).unwrap();
        assert_eq!(json["flatColour"][1].as_f64().map(|v| v as f32), Some(0.5));
        assert!(json.get("_pad0").is_none());
    }
}
