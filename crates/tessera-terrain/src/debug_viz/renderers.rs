//! Renderers for biome maps and height buffers.

use super::image::{DebugImage, rgba_to_bytes};
use crate::biome_map::BiomeTables;
use crate::dispatch::HeightBuffer;

const UNKNOWN_BIOME: [u8; 4] = [255, 0, 255, 255];

/// One pixel per biome cell, coloured with the biome's minimap colour.
/// Biomes without a colour entry render magenta.
pub fn render_biome_map(tables: &BiomeTables) -> DebugImage {
    let grid = tables.map.grid();
    let mut image = DebugImage::new(grid.size(), grid.size());
    for y in 0..grid.size() {
        for x in 0..grid.size() {
            let id = grid.at(x, y);
            let rgba = tables
                .minimap_colours
                .get(id.index())
                .map(|&c| rgba_to_bytes(c))
                .unwrap_or(UNKNOWN_BIOME);
            image.set_pixel(x, y, rgba);
        }
    }
    image
}

/// Grey ramp from the buffer's minimum (black) to maximum (white).
/// A constant buffer renders mid-grey.
pub fn render_heightmap(buffer: &HeightBuffer) -> DebugImage {
    let res = buffer.resolution();
    let mut image = DebugImage::new(res, res);
    let Some((lo, hi)) = buffer.min_max() else {
        return image;
    };
    let range = hi - lo;

    for y in 0..res {
        for x in 0..res {
            let h = buffer.get(x, y).unwrap_or(lo);
            let t = if range > 0.0 { (h - lo) / range } else { 0.5 };
            let v = (t * 255.0).round() as u8;
            image.set_pixel(x, y, [v, v, v, 255]);
        }
    }
    image
}
