//! A streamed terrain tile: a coordinate plus the height buffer it owns.

use tessera_terrain::HeightBuffer;

/// Integer tile-grid position. World position of tile `(x, y)` is
/// `(x, y) * tile_size`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Row-major sort key, so ordering walks rows first.
    pub(crate) fn row_major(self) -> (i32, i32) {
        (self.y, self.x)
    }

    /// World offset handed to generators, in tile units.
    pub fn offset(self) -> [f32; 2] {
        [self.x as f32, self.y as f32]
    }
}

/// Allocation identity of a tile. Survives repurposing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u64);

/// One resident tile.
#[derive(Debug)]
pub struct Tile {
    id: TileId,
    coord: TileCoord,
    offset: [f32; 2],
    buffer: HeightBuffer,
    regenerations: u32,
}

impl Tile {
    /// Allocate a tile with a zeroed `resolution`² buffer.
    pub fn new(id: TileId, coord: TileCoord, resolution: u32) -> Self {
        Self {
            id,
            coord,
            offset: coord.offset(),
            buffer: HeightBuffer::new(resolution),
            regenerations: 0,
        }
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    /// World offset of texel `(0, 0)`, in tile units.
    pub fn offset(&self) -> [f32; 2] {
        self.offset
    }

    pub fn buffer(&self) -> &HeightBuffer {
        &self.buffer
    }

    /// How many times the generator chain has filled this tile.
    pub fn regenerations(&self) -> u32 {
        self.regenerations
    }

    /// Move the tile to `coord`, keeping its buffer.
    pub(crate) fn relocate(&mut self, coord: TileCoord) {
        self.coord = coord;
        self.offset = coord.offset();
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut HeightBuffer {
        &mut self.buffer
    }

    pub(crate) fn mark_regenerated(&mut self) {
        self.regenerations += 1;
    }
}
