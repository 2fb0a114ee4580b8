use tessera_terrain::DispatchError;

use crate::tile::TileCoord;

/// Errors raised while streaming tiles.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// The generator chain failed on a tile. Fatal for the update.
    #[error("generating tile ({}, {}) failed: {source}", .coord.x, .coord.y)]
    Dispatch {
        coord: TileCoord,
        #[source]
        source: DispatchError,
    },
    /// Height buffers need at least one texel per side.
    #[error("invalid heightmap resolution {0}")]
    InvalidResolution(u32),
    /// Tile size must be finite and positive.
    #[error("invalid tile size {0}")]
    InvalidTileSize(f32),
}
