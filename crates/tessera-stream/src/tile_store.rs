//! Owner of every resident tile, keyed by [`TileCoord`].
//!
//! Backed by an [`FxHashMap`](rustc_hash::FxHashMap) for fast hashing of small
//! fixed-size keys.

use rustc_hash::FxHashMap;

use crate::tile::{Tile, TileCoord};

/// Resident tiles. A coordinate maps to at most one tile, and a tile's own
/// coordinate always equals its key.
#[derive(Debug, Default)]
pub struct TileStore {
    tiles: FxHashMap<TileCoord, Tile>,
}

impl TileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tile under its own coordinate, returning any tile it replaced.
    pub fn insert(&mut self, tile: Tile) -> Option<Tile> {
        self.tiles.insert(tile.coord(), tile)
    }

    /// Removes and returns the tile at `coord`.
    pub fn remove(&mut self, coord: TileCoord) -> Option<Tile> {
        self.tiles.remove(&coord)
    }

    pub fn get(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles.get(&coord)
    }

    pub(crate) fn get_mut(&mut self, coord: TileCoord) -> Option<&mut Tile> {
        self.tiles.get_mut(&coord)
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        self.tiles.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Resident coordinates in row-major order.
    pub fn coords(&self) -> Vec<TileCoord> {
        let mut coords: Vec<TileCoord> = self.tiles.keys().copied().collect();
        coords.sort_by_key(|c| c.row_major());
        coords
    }

    /// Iterates over all `(coord, tile)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&TileCoord, &Tile)> {
        self.tiles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileId;

    fn tile(id: u64, x: i32, y: i32) -> Tile {
        Tile::new(TileId(id), TileCoord::new(x, y), 2)
    }

    #[test]
    fn test_insert_then_get() {
        let mut store = TileStore::new();
        assert!(store.insert(tile(0, 1, 2)).is_none());
        assert_eq!(store.get(TileCoord::new(1, 2)).map(Tile::id), Some(TileId(0)));
        assert!(store.get(TileCoord::new(2, 1)).is_none());
    }

    #[test]
    fn test_len_tracks_insert_and_remove() {
        let mut store = TileStore::new();
        store.insert(tile(0, 0, 0));
        store.insert(tile(1, 1, 0));
        assert_eq!(store.len(), 2);
        assert!(store.remove(TileCoord::new(1, 0)).is_some());
        assert!(store.remove(TileCoord::new(9, 9)).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_coords_are_row_major() {
        let mut store = TileStore::new();
        for (i, (x, y)) in [(1, 1), (0, 1), (1, 0), (0, 0)].into_iter().enumerate() {
            store.insert(tile(i as u64, x, y));
        }
        assert_eq!(
            store.coords(),
            [
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
    }
}
