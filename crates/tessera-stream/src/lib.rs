//! Terrain tile streaming: keeps the tiles around a moving viewer resident,
//! repurposing buffers of tiles that leave the view for tiles that enter it.

mod error;
mod streaming;
mod tile;
mod tile_store;

pub use error::StreamError;
pub use streaming::{
    MAX_VIEW_WINDOW, StreamConfig, StreamUpdate, TileGenerator, TileStreamer, reference_tile,
    tiles_in_view,
};
pub use tile::{Tile, TileCoord, TileId};
pub use tile_store::TileStore;
