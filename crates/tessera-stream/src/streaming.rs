//! Streaming of terrain tiles around a moving viewer.
//!
//! Whenever the viewer's reference tile changes, the set of tiles inside the
//! view window is recomputed and diffed against the resident set. Tiles that
//! left the window are repurposed for tiles that entered it: the buffer stays,
//! only the coordinate changes and the generator chain re-runs. Leftover
//! entries are allocated fresh or dropped. Tiles present before and after the
//! move are not touched.
//!
//! A tile enters the store only after its chain run succeeded. When a run
//! fails the tile is dropped and the next update retries the missing tiles.

use glam::Vec2;
use rustc_hash::FxHashSet;
use tessera_terrain::{BiomeTables, ComputeDispatcher, FilterChain};

use crate::error::StreamError;
use crate::tile::{Tile, TileCoord, TileId};
use crate::tile_store::TileStore;

/// Largest accepted view window; larger values are clamped.
pub const MAX_VIEW_WINDOW: u32 = 255;

/// Streaming parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamConfig {
    /// Edge length of a tile in world units.
    pub tile_size: f32,
    /// Tiles per side of the view window, clamped to `1..=MAX_VIEW_WINDOW`.
    pub view_window: u32,
    /// Height buffer resolution of every tile. Fixed for the streamer's lifetime.
    pub resolution: u32,
    /// Skip tiles with a negative coordinate.
    pub world_edge: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            tile_size: 100.0,
            view_window: 3,
            resolution: 1024,
            world_edge: true,
        }
    }
}

/// What the generator chain needs to fill a tile.
pub struct TileGenerator<'a> {
    pub chain: &'a FilterChain,
    pub tables: &'a BiomeTables,
    pub dispatcher: &'a mut dyn ComputeDispatcher,
}

impl TileGenerator<'_> {
    /// Clear the tile's buffer and run the whole chain at the tile's offset.
    ///
    /// An empty chain leaves the buffer as it was.
    fn fill(&mut self, tile: &mut Tile) -> Result<(), StreamError> {
        if self.chain.is_empty() {
            return Ok(());
        }
        let coord = tile.coord();
        let offset = tile.offset();
        let buffer = tile.buffer_mut();
        buffer.clear();
        self.chain
            .run(buffer, offset, self.tables, &mut *self.dispatcher)
            .map_err(|source| StreamError::Dispatch { coord, source })?;
        tile.mark_regenerated();
        Ok(())
    }
}

/// Outcome of one recompute.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamUpdate {
    /// Coordinates that left the window, row-major.
    pub evicted: Vec<TileCoord>,
    /// Coordinates that entered the window, row-major.
    pub created: Vec<TileCoord>,
    /// How many created tiles reused an evicted tile's buffer.
    pub repurposed: usize,
}

impl StreamUpdate {
    pub fn is_empty(&self) -> bool {
        self.evicted.is_empty() && self.created.is_empty()
    }

    /// Created tiles that needed a new buffer.
    pub fn allocated(&self) -> usize {
        self.created.len() - self.repurposed
    }

    /// Evicted tiles whose buffer was freed.
    pub fn destroyed(&self) -> usize {
        self.evicted.len() - self.repurposed
    }
}

/// Tile containing world position `pos`.
pub fn reference_tile(pos: Vec2, tile_size: f32) -> TileCoord {
    let t = (pos / tile_size).floor();
    TileCoord::new(t.x as i32, t.y as i32)
}

/// Coordinates of the `window`×`window` square around `reference`, row-major.
///
/// Even windows extend one extra tile on the positive side. With `world_edge`
/// negative coordinates are left out.
pub fn tiles_in_view(reference: TileCoord, window: u32, world_edge: bool) -> Vec<TileCoord> {
    let n = clamp_window(window);
    let below = ((n - 1) / 2) as i32;
    let above = (n / 2) as i32;

    let mut coords = Vec::with_capacity(n as usize * n as usize);
    for y in reference.y - below..=reference.y + above {
        for x in reference.x - below..=reference.x + above {
            if world_edge && (x < 0 || y < 0) {
                continue;
            }
            coords.push(TileCoord::new(x, y));
        }
    }
    coords
}

fn clamp_window(window: u32) -> u32 {
    window.clamp(1, MAX_VIEW_WINDOW)
}

/// Keeps the tiles around the viewer resident and generated.
#[derive(Debug)]
pub struct TileStreamer {
    config: StreamConfig,
    store: TileStore,
    reference: TileCoord,
    viewer: Vec2,
    next_id: u64,
    /// A chain run failed; some tiles of the window are missing.
    incomplete: bool,
}

impl TileStreamer {
    /// Materialize every tile of the window around `viewer`.
    ///
    /// # Errors
    ///
    /// Fails on a zero resolution, a non-positive tile size, or a generator failure.
    pub fn new(
        mut config: StreamConfig,
        viewer: Vec2,
        generator: &mut TileGenerator<'_>,
    ) -> Result<Self, StreamError> {
        if config.resolution == 0 {
            return Err(StreamError::InvalidResolution(config.resolution));
        }
        validate_tile_size(config.tile_size)?;
        config.view_window = clamp_window(config.view_window);

        let reference = reference_tile(viewer, config.tile_size);
        let mut streamer = Self {
            config,
            store: TileStore::new(),
            reference,
            viewer,
            next_id: 0,
            incomplete: false,
        };
        let update = streamer.recompute(reference, generator)?;
        tracing::info!(
            tiles = update.created.len(),
            x = reference.x,
            y = reference.y,
            "tile streamer initialized"
        );
        Ok(streamer)
    }

    /// Track the viewer. Recomputes when the reference tile changes or an
    /// earlier failure left tiles missing.
    pub fn update(
        &mut self,
        viewer: Vec2,
        generator: &mut TileGenerator<'_>,
    ) -> Result<StreamUpdate, StreamError> {
        self.viewer = viewer;
        let reference = reference_tile(viewer, self.config.tile_size);
        if reference == self.reference && !self.incomplete {
            return Ok(StreamUpdate::default());
        }
        self.recompute(reference, generator)
    }

    /// Resize the view window and recompute around the current reference.
    pub fn set_view_window(
        &mut self,
        window: u32,
        generator: &mut TileGenerator<'_>,
    ) -> Result<StreamUpdate, StreamError> {
        self.config.view_window = clamp_window(window);
        self.recompute(self.reference, generator)
    }

    /// Change the tile size; the reference is re-derived from the last viewer
    /// position.
    pub fn set_tile_size(
        &mut self,
        tile_size: f32,
        generator: &mut TileGenerator<'_>,
    ) -> Result<StreamUpdate, StreamError> {
        validate_tile_size(tile_size)?;
        self.config.tile_size = tile_size;
        let reference = reference_tile(self.viewer, tile_size);
        self.recompute(reference, generator)
    }

    /// Toggle the world edge and recompute around the current reference.
    pub fn set_world_edge(
        &mut self,
        world_edge: bool,
        generator: &mut TileGenerator<'_>,
    ) -> Result<StreamUpdate, StreamError> {
        self.config.world_edge = world_edge;
        self.recompute(self.reference, generator)
    }

    /// Re-run the chain over every resident tile, in row-major order.
    ///
    /// A tile whose run fails is removed; the next update regenerates it.
    pub fn regenerate_all(
        &mut self,
        generator: &mut TileGenerator<'_>,
    ) -> Result<usize, StreamError> {
        let coords = self.store.coords();
        for &coord in &coords {
            let Some(tile) = self.store.get_mut(coord) else {
                continue;
            };
            if let Err(e) = generator.fill(tile) {
                tracing::warn!(?coord, "tile regeneration failed, dropping tile");
                self.store.remove(coord);
                self.incomplete = true;
                return Err(e);
            }
        }
        tracing::info!(tiles = coords.len(), "regenerated all tiles");
        Ok(coords.len())
    }

    fn recompute(
        &mut self,
        reference: TileCoord,
        generator: &mut TileGenerator<'_>,
    ) -> Result<StreamUpdate, StreamError> {
        let in_view = tiles_in_view(reference, self.config.view_window, self.config.world_edge);
        let wanted: FxHashSet<TileCoord> = in_view.iter().copied().collect();

        let evicted: Vec<TileCoord> = self
            .store
            .coords()
            .into_iter()
            .filter(|c| !wanted.contains(c))
            .collect();
        let created: Vec<TileCoord> = in_view
            .into_iter()
            .filter(|&c| !self.store.contains(c))
            .collect();

        let mut freed = evicted.iter().copied();
        let mut repurposed = 0;
        for &coord in &created {
            let mut tile = match freed.next().and_then(|old| self.store.remove(old)) {
                Some(mut tile) => {
                    tracing::debug!(from = ?tile.coord(), to = ?coord, "repurposing tile");
                    tile.relocate(coord);
                    repurposed += 1;
                    tile
                }
                None => {
                    tracing::debug!(?coord, "allocating tile");
                    let id = TileId(self.next_id);
                    self.next_id += 1;
                    Tile::new(id, coord, self.config.resolution)
                }
            };
            if let Err(e) = generator.fill(&mut tile) {
                tracing::warn!(?coord, "tile generation failed, dropping tile");
                self.incomplete = true;
                return Err(e);
            }
            self.store.insert(tile);
        }
        for old in freed {
            tracing::debug!(coord = ?old, "evicting tile");
            self.store.remove(old);
        }

        self.reference = reference;
        self.incomplete = false;
        Ok(StreamUpdate {
            evicted,
            created,
            repurposed,
        })
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Reference tile of the last recompute.
    pub fn reference(&self) -> TileCoord {
        self.reference
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.store.get(coord)
    }

    /// Total tile buffers allocated since construction.
    pub fn allocations(&self) -> u64 {
        self.next_id
    }
}

fn validate_tile_size(tile_size: f32) -> Result<(), StreamError> {
    if tile_size.is_finite() && tile_size > 0.0 {
        Ok(())
    } else {
        Err(StreamError::InvalidTileSize(tile_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use tessera_terrain::{
        CpuDispatcher, DispatchError, DispatchRequest, Generator, HeightBuffer, SimpleNoiseSettings,
    };

    /// Runs the CPU kernels until `remaining` reaches zero, then fails.
    struct FailAfter {
        inner: CpuDispatcher,
        remaining: usize,
    }

    impl ComputeDispatcher for FailAfter {
        fn dispatch(
            &mut self,
            target: &mut HeightBuffer,
            request: &DispatchRequest<'_>,
        ) -> Result<(), DispatchError> {
            if self.remaining == 0 {
                return Err(DispatchError::Backend("device lost".into()));
            }
            self.remaining -= 1;
            self.inner.dispatch(target, request)
        }
    }

    struct Fixture {
        chain: FilterChain,
        tables: BiomeTables,
        dispatcher: CpuDispatcher,
    }

    impl Fixture {
        fn new() -> Self {
            let mut chain = FilterChain::new();
            chain.push(Generator::SimpleNoise(SimpleNoiseSettings {
                octaves: 1,
                ..Default::default()
            }));
            Self {
                chain,
                tables: BiomeTables::empty(),
                dispatcher: CpuDispatcher::new(0),
            }
        }

        fn generator(&mut self) -> TileGenerator<'_> {
            TileGenerator {
                chain: &self.chain,
                tables: &self.tables,
                dispatcher: &mut self.dispatcher,
            }
        }
    }

    fn config(window: u32, world_edge: bool) -> StreamConfig {
        StreamConfig {
            tile_size: 100.0,
            view_window: window,
            resolution: 4,
            world_edge,
        }
    }

    fn assert_matches_view(streamer: &TileStreamer) {
        let cfg = streamer.config();
        let mut expected = tiles_in_view(streamer.reference(), cfg.view_window, cfg.world_edge);
        expected.sort_by_key(|c| c.row_major());
        assert_eq!(streamer.store().coords(), expected, "resident set != view window");
        for (coord, tile) in streamer.store().iter() {
            assert_eq!(*coord, tile.coord(), "tile keyed under a foreign coordinate");
        }
    }

    #[test]
    fn test_tiles_in_view_odd_window() {
        let coords = tiles_in_view(TileCoord::new(0, 0), 3, false);
        assert_eq!(coords.len(), 9);
        assert_eq!(coords[0], TileCoord::new(-1, -1));
        assert_eq!(coords[8], TileCoord::new(1, 1));
    }

    #[test]
    fn test_tiles_in_view_even_window_extends_positive() {
        let coords = tiles_in_view(TileCoord::new(5, 5), 4, true);
        assert_eq!(coords.first(), Some(&TileCoord::new(4, 4)));
        assert_eq!(coords.last(), Some(&TileCoord::new(7, 7)));
        assert_eq!(coords.len(), 16);
    }

    #[test]
    fn test_world_edge_clamps_negative() {
        let coords = tiles_in_view(TileCoord::new(0, 0), 3, true);
        assert_eq!(
            coords,
            [
                TileCoord::new(0, 0),
                TileCoord::new(1, 0),
                TileCoord::new(0, 1),
                TileCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn test_zero_window_acts_as_one() {
        assert_eq!(tiles_in_view(TileCoord::new(2, 3), 0, true), [TileCoord::new(2, 3)]);
    }

    #[test]
    fn test_reference_tile_floors() {
        assert_eq!(reference_tile(Vec2::new(50.0, 199.9), 100.0), TileCoord::new(0, 1));
        assert_eq!(reference_tile(Vec2::new(-0.1, -100.0), 100.0), TileCoord::new(-1, -1));
    }

    #[test]
    fn test_construction_fills_window() {
        let mut fx = Fixture::new();
        let streamer =
            TileStreamer::new(config(3, false), Vec2::new(50.0, 50.0), &mut fx.generator())
                .unwrap();
        assert_eq!(streamer.store().len(), 9);
        assert_eq!(streamer.allocations(), 9);
        assert!(streamer.store().iter().all(|(_, t)| t.regenerations() == 1));
        assert_matches_view(&streamer);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut fx = Fixture::new();
        let mut cfg = config(3, false);
        cfg.resolution = 0;
        let err = TileStreamer::new(cfg, Vec2::ZERO, &mut fx.generator()).unwrap_err();
        assert!(matches!(err, StreamError::InvalidResolution(0)));

        let mut cfg = config(3, false);
        cfg.tile_size = 0.0;
        let err = TileStreamer::new(cfg, Vec2::ZERO, &mut fx.generator()).unwrap_err();
        assert!(matches!(err, StreamError::InvalidTileSize(_)));
    }

    #[test]
    fn test_step_east_repurposes_column() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, false), Vec2::new(50.0, 50.0), &mut fx.generator())
                .unwrap();

        let before: Vec<_> = streamer
            .store()
            .iter()
            .map(|(c, t)| (*c, t.id(), t.buffer().texels().as_ptr()))
            .collect();
        let west_ids: FxHashSet<TileId> = before
            .iter()
            .filter(|(c, _, _)| c.x == -1)
            .map(|(_, id, _)| *id)
            .collect();

        let update = streamer
            .update(Vec2::new(150.0, 50.0), &mut fx.generator())
            .unwrap();

        assert_eq!(streamer.reference(), TileCoord::new(1, 0));
        assert_eq!(update.evicted, (-1..=1).map(|y| TileCoord::new(-1, y)).collect::<Vec<_>>());
        assert_eq!(update.created, (-1..=1).map(|y| TileCoord::new(2, y)).collect::<Vec<_>>());
        assert_eq!(update.repurposed, 3);
        assert_eq!(streamer.allocations(), 9, "no new buffers");

        for (coord, id, ptr) in before.iter().filter(|(c, _, _)| c.x >= 0) {
            let tile = streamer.tile(*coord).unwrap();
            assert_eq!(tile.id(), *id, "overlapping tile {coord:?} replaced");
            assert_eq!(tile.buffer().texels().as_ptr(), *ptr);
            assert_eq!(tile.regenerations(), 1, "overlapping tile {coord:?} regenerated");
        }
        for y in -1..=1 {
            let tile = streamer.tile(TileCoord::new(2, y)).unwrap();
            assert!(west_ids.contains(&tile.id()), "new column should reuse evicted tiles");
            assert_eq!(tile.regenerations(), 2);
            assert_eq!(tile.offset(), [2.0, y as f32]);
        }
        assert_matches_view(&streamer);
    }

    #[test]
    fn test_same_reference_is_noop() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, false), Vec2::new(10.0, 10.0), &mut fx.generator())
                .unwrap();
        let update = streamer
            .update(Vec2::new(90.0, 99.0), &mut fx.generator())
            .unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_repurposed_tile_matches_fresh_generation() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(1, false), Vec2::new(0.0, 0.0), &mut fx.generator())
                .unwrap();
        streamer
            .update(Vec2::new(350.0, 120.0), &mut fx.generator())
            .unwrap();

        let fresh = TileStreamer::new(config(1, false), Vec2::new(350.0, 120.0), &mut fx.generator())
            .unwrap();
        let coord = TileCoord::new(3, 1);
        assert_eq!(
            streamer.tile(coord).unwrap().buffer(),
            fresh.tile(coord).unwrap().buffer(),
            "old heights must not leak into a repurposed tile"
        );
    }

    #[test]
    fn test_far_jump_reuses_every_tile() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, false), Vec2::ZERO, &mut fx.generator()).unwrap();
        let update = streamer
            .update(Vec2::new(5000.0, -5000.0), &mut fx.generator())
            .unwrap();
        assert_eq!(update.created.len(), 9);
        assert_eq!(update.repurposed, 9);
        assert_eq!(update.allocated(), 0);
        assert_eq!(update.destroyed(), 0);
        assert_eq!(streamer.allocations(), 9);
    }

    #[test]
    fn test_random_walk_keeps_invariant() {
        let mut fx = Fixture::new();
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        for world_edge in [false, true] {
            let mut streamer =
                TileStreamer::new(config(3, world_edge), Vec2::new(250.0, 250.0), &mut fx.generator())
                    .unwrap();
            let mut pos = Vec2::new(250.0, 250.0);
            for _ in 0..200 {
                pos += Vec2::new(rng.random_range(-180.0..180.0), rng.random_range(-180.0..180.0));
                let before = streamer.store().len();
                let update = streamer.update(pos, &mut fx.generator()).unwrap();
                let reuse = update.created.len().min(update.evicted.len());
                assert!(update.repurposed >= reuse, "repurposed {} < {reuse}", update.repurposed);
                assert_eq!(
                    streamer.store().len(),
                    before + update.created.len() - update.evicted.len()
                );
                assert_matches_view(&streamer);
            }
        }
    }

    #[test]
    fn test_view_window_change() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, false), Vec2::new(50.0, 50.0), &mut fx.generator())
                .unwrap();

        let grow = streamer.set_view_window(5, &mut fx.generator()).unwrap();
        assert_eq!(grow.created.len(), 16);
        assert!(grow.evicted.is_empty());
        assert_eq!(streamer.allocations(), 25);
        assert_matches_view(&streamer);

        let shrink = streamer.set_view_window(0, &mut fx.generator()).unwrap();
        assert_eq!(streamer.config().view_window, 1, "window clamps to 1");
        assert_eq!(shrink.evicted.len(), 24);
        assert_eq!(shrink.destroyed(), 24);
        assert_eq!(streamer.store().len(), 1);
        assert_matches_view(&streamer);
    }

    #[test]
    fn test_tile_size_change_rederives_reference() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, false), Vec2::new(250.0, 50.0), &mut fx.generator())
                .unwrap();
        assert_eq!(streamer.reference(), TileCoord::new(2, 0));
        streamer.set_tile_size(50.0, &mut fx.generator()).unwrap();
        assert_eq!(streamer.reference(), TileCoord::new(5, 1));
        assert_matches_view(&streamer);
        assert!(streamer.set_tile_size(-1.0, &mut fx.generator()).is_err());
    }

    #[test]
    fn test_regenerate_all_touches_every_tile() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, true), Vec2::new(0.0, 0.0), &mut fx.generator()).unwrap();
        let count = streamer.regenerate_all(&mut fx.generator()).unwrap();
        assert_eq!(count, 4);
        assert!(streamer.store().iter().all(|(_, t)| t.regenerations() == 2));
    }

    #[test]
    fn test_failed_generation_leaves_no_blank_tile() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, false), Vec2::new(50.0, 50.0), &mut fx.generator())
                .unwrap();

        let mut failing = FailAfter {
            inner: CpuDispatcher::new(0),
            remaining: 1,
        };
        let err = streamer
            .update(
                Vec2::new(150.0, 50.0),
                &mut TileGenerator {
                    chain: &fx.chain,
                    tables: &fx.tables,
                    dispatcher: &mut failing,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StreamError::Dispatch { coord, .. } if coord == TileCoord::new(2, 0)
        ));
        assert!(streamer.tile(TileCoord::new(2, -1)).is_some());
        assert!(streamer.tile(TileCoord::new(2, 0)).is_none(), "failed tile must not be resident");
        assert_eq!(streamer.reference(), TileCoord::new(0, 0));

        // Same position again: the missing tiles are retried.
        let retry = streamer
            .update(Vec2::new(150.0, 50.0), &mut fx.generator())
            .unwrap();
        assert_eq!(retry.created, [TileCoord::new(2, 0), TileCoord::new(2, 1)]);
        assert_eq!(retry.evicted, [TileCoord::new(-1, 1)]);
        assert_eq!(streamer.reference(), TileCoord::new(1, 0));
        assert_matches_view(&streamer);

        let fresh =
            TileStreamer::new(config(3, false), Vec2::new(150.0, 50.0), &mut fx.generator())
                .unwrap();
        for (coord, tile) in streamer.store().iter() {
            assert_eq!(tile.buffer(), fresh.tile(*coord).unwrap().buffer(), "tile {coord:?}");
        }
    }

    #[test]
    fn test_failed_regeneration_drops_tile_until_next_update() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, true), Vec2::ZERO, &mut fx.generator()).unwrap();
        let mut failing = FailAfter {
            inner: CpuDispatcher::new(0),
            remaining: 0,
        };
        let result = streamer.regenerate_all(&mut TileGenerator {
            chain: &fx.chain,
            tables: &fx.tables,
            dispatcher: &mut failing,
        });
        assert!(result.is_err());
        assert!(streamer.tile(TileCoord::new(0, 0)).is_none());
        assert_eq!(streamer.store().len(), 3);

        let update = streamer.update(Vec2::ZERO, &mut fx.generator()).unwrap();
        assert_eq!(update.created, [TileCoord::new(0, 0)]);
        assert_matches_view(&streamer);
    }

    #[test]
    fn test_empty_chain_keeps_heights() {
        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(3, false), Vec2::new(50.0, 50.0), &mut fx.generator())
                .unwrap();
        let before: Vec<HeightBuffer> =
            streamer.store().iter().map(|(_, t)| t.buffer().clone()).collect();
        assert!(before.iter().any(|b| b.texels().iter().any(|&h| h != 0.0)));

        let empty = FilterChain::new();
        let mut generator = TileGenerator {
            chain: &empty,
            tables: &fx.tables,
            dispatcher: &mut fx.dispatcher,
        };
        streamer.regenerate_all(&mut generator).unwrap();
        let after: Vec<HeightBuffer> =
            streamer.store().iter().map(|(_, t)| t.buffer().clone()).collect();
        assert_eq!(before, after);
        assert!(streamer.store().iter().all(|(_, t)| t.regenerations() == 1));

        // A repurposed tile keeps the heights it carried.
        let west = streamer.tile(TileCoord::new(-1, -1)).unwrap().buffer().clone();
        streamer.update(Vec2::new(150.0, 50.0), &mut generator).unwrap();
        assert_eq!(streamer.tile(TileCoord::new(2, -1)).unwrap().buffer(), &west);
    }

    #[test]
    fn test_huge_window_is_clamped() {
        let coords = tiles_in_view(TileCoord::new(0, 0), 50_000, true);
        let side = (MAX_VIEW_WINDOW / 2 + 1) as usize;
        assert_eq!(coords.len(), side * side);
        assert_eq!(tiles_in_view(TileCoord::new(0, 0), u32::MAX, false).len(), 255 * 255);

        let mut fx = Fixture::new();
        let mut streamer =
            TileStreamer::new(config(1, true), Vec2::ZERO, &mut fx.generator()).unwrap();
        streamer.set_view_window(u32::MAX, &mut fx.generator()).unwrap();
        assert_eq!(streamer.config().view_window, MAX_VIEW_WINDOW);
    }
}
