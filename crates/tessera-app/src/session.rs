//! One generator session: settings document, biome map, filter chain and the
//! tile streamer following a scripted viewer.

use std::path::Path;
use std::sync::Arc;

use tessera_config::{CliArgs, Config, ConfigError, StreamingConfig};
use tessera_stream::{StreamConfig, StreamError, StreamUpdate, TileGenerator, TileStreamer};
use tessera_terrain::debug_viz::{render_biome_map, render_heightmap};
use tessera_terrain::{
    BiomeGenConfig, BiomeMapGenerator, BiomeRosterError, BiomeTables, CpuDispatcher, FilterChain,
    Generator, SettingsError, load_settings, save_settings,
};
use tracing::{debug, info, warn};

use crate::game_loop::{FIXED_DT, FixedTimestep};
use crate::walk::Walker;

/// Frames between checks of `config.ron` for edits.
pub const RELOAD_INTERVAL: u64 = 120;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Roster(#[from] BiomeRosterError),
    #[error(transparent)]
    Stream(#[from] StreamError),
    #[error("failed to export biome map: {0}")]
    Export(#[from] image::ImageError),
}

/// Totals over a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub steps: u64,
    /// Recomputes that changed the resident tiles.
    pub reference_moves: u64,
    pub created: u64,
    pub evicted: u64,
    pub repurposed: u64,
    pub allocations: u64,
    pub resident: usize,
}

impl SessionStats {
    fn record(&mut self, update: &StreamUpdate) {
        if update.is_empty() {
            return;
        }
        self.reference_moves += 1;
        self.created += update.created.len() as u64;
        self.evicted += update.evicted.len() as u64;
        self.repurposed += update.repurposed as u64;
    }
}

pub fn stream_config(streaming: &StreamingConfig) -> StreamConfig {
    StreamConfig {
        tile_size: streaming.tile_size,
        view_window: streaming.view_window,
        resolution: streaming.heightmap_resolution,
        world_edge: streaming.world_edge,
    }
}

pub struct Session {
    config: Config,
    biomes: BiomeMapGenerator,
    chain: FilterChain,
    tables: Arc<BiomeTables>,
    dispatcher: CpuDispatcher,
    streamer: TileStreamer,
    walker: Walker,
    clock: FixedTimestep,
    stats: SessionStats,
    overrides: CliArgs,
}

impl Session {
    /// Load the settings document, regenerate the biome map and stream the
    /// initial window around the walker.
    ///
    /// A missing settings document is not an error; the defaults are used.
    /// The seed from `config` overrides any seed stored in the document.
    pub fn open(config: Config) -> Result<Self, AppError> {
        let mut biomes = BiomeMapGenerator::with_default_roster(BiomeGenConfig::default())?;
        let mut chain = FilterChain::new();

        let settings_path = config.world.settings_file.as_path();
        if config.world.load_on_open {
            match load_settings(settings_path, &mut biomes, &mut chain) {
                Ok(()) => {}
                Err(SettingsError::Read { path, source }) => {
                    warn!(%path, error = %source, "settings document unavailable, using defaults");
                }
                Err(e) => return Err(e.into()),
            }
        }
        if chain.is_empty() {
            chain.push(Generator::TerrainNoise(Default::default()));
        }

        biomes.config_mut().seed = config.world.seed;
        let tables = biomes.regenerate();
        info!(
            seed = config.world.seed,
            resolution = tables.map.resolution(),
            filters = chain.len(),
            "biome map generated"
        );

        if let Some(path) = &config.debug.biome_map_export {
            render_biome_map(&tables).save_png(path)?;
            info!(path = %path.display(), "exported biome map");
        }

        // Simplex seeds are 32-bit; fold the high half in.
        let seed = config.world.seed;
        let mut dispatcher = CpuDispatcher::new((seed ^ (seed >> 32)) as u32);
        let walker = Walker::centred(config.streaming.tile_size, config.streaming.view_window);
        let streamer = TileStreamer::new(
            stream_config(&config.streaming),
            walker.position(),
            &mut TileGenerator {
                chain: &chain,
                tables: &tables,
                dispatcher: &mut dispatcher,
            },
        )?;
        info!(
            tiles = streamer.store().len(),
            reference = ?streamer.reference(),
            "initial window streamed"
        );

        Ok(Self {
            config,
            biomes,
            chain,
            tables,
            dispatcher,
            streamer,
            walker,
            clock: FixedTimestep::new(),
            stats: SessionStats::default(),
            overrides: CliArgs::default(),
        })
    }

    /// Command-line overrides re-applied on top of every reloaded config.
    pub fn with_overrides(mut self, overrides: CliArgs) -> Self {
        self.overrides = overrides;
        self
    }

    /// Move the walker by `dt` seconds and restream.
    pub fn step(&mut self, dt: f64) -> Result<StreamUpdate, AppError> {
        let viewer = self.walker.step(dt as f32);
        let update = self.streamer.update(
            viewer,
            &mut TileGenerator {
                chain: &self.chain,
                tables: &self.tables,
                dispatcher: &mut self.dispatcher,
            },
        )?;
        if !update.is_empty() {
            debug!(
                reference = ?self.streamer.reference(),
                created = update.created.len(),
                evicted = update.evicted.len(),
                repurposed = update.repurposed,
                "reference tile moved"
            );
        }
        self.stats.record(&update);
        Ok(update)
    }

    /// Simulate `frames` frames of one fixed step each. When `config_dir` is
    /// given, `config.ron` is re-read every [`RELOAD_INTERVAL`] frames.
    pub fn run(&mut self, frames: u64, config_dir: Option<&Path>) -> Result<SessionStats, AppError> {
        for frame in 0..frames {
            let mut clock = std::mem::take(&mut self.clock);
            let mut failure = None;
            clock.advance(FIXED_DT, |dt, _| {
                if failure.is_none()
                    && let Err(e) = self.step(dt)
                {
                    failure = Some(e);
                }
            });
            self.clock = clock;
            if let Some(e) = failure {
                return Err(e);
            }

            if let Some(dir) = config_dir
                && (frame + 1) % RELOAD_INTERVAL == 0
            {
                match self.config.reload(dir) {
                    Ok(Some(mut new_config)) => {
                        new_config.apply_cli_overrides(&self.overrides);
                        if new_config != self.config {
                            self.apply_config(new_config)?;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "config reload failed, keeping current config"),
                }
            }
        }
        Ok(self.stats())
    }

    /// Apply an edited config to the running session.
    ///
    /// Resolution changes are ignored until the next session.
    pub fn apply_config(&mut self, new_config: Config) -> Result<(), AppError> {
        let old = &self.config.streaming;
        let new = &new_config.streaming;
        let mut generator = TileGenerator {
            chain: &self.chain,
            tables: &self.tables,
            dispatcher: &mut self.dispatcher,
        };

        if new.heightmap_resolution != old.heightmap_resolution {
            warn!(
                current = old.heightmap_resolution,
                requested = new.heightmap_resolution,
                "heightmap resolution is fixed for the session"
            );
        }
        if new.tile_size != old.tile_size {
            let update = self.streamer.set_tile_size(new.tile_size, &mut generator)?;
            self.stats.record(&update);
        }
        if new.world_edge != old.world_edge {
            let update = self.streamer.set_world_edge(new.world_edge, &mut generator)?;
            self.stats.record(&update);
        }
        if new.view_window != old.view_window {
            let update = self.streamer.set_view_window(new.view_window, &mut generator)?;
            self.stats.record(&update);
        }

        if new_config.world.seed != self.config.world.seed {
            self.biomes.config_mut().seed = new_config.world.seed;
            self.tables = self.biomes.regenerate();
            let count = self.streamer.regenerate_all(&mut TileGenerator {
                chain: &self.chain,
                tables: &self.tables,
                dispatcher: &mut self.dispatcher,
            })?;
            info!(seed = new_config.world.seed, tiles = count, "biome map regenerated");
        }

        self.config = new_config;
        Ok(())
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats {
            frames: self.clock.frame_count(),
            steps: self.clock.update_count(),
            allocations: self.streamer.allocations(),
            resident: self.streamer.store().len(),
            ..self.stats.clone()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn streamer(&self) -> &TileStreamer {
        &self.streamer
    }

    pub fn tables(&self) -> &BiomeTables {
        &self.tables
    }

    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// Save the settings document if `save_on_exit` is set and export the
    /// reference tile's heights if requested.
    pub fn close(self) -> Result<SessionStats, AppError> {
        let stats = self.stats();
        if let Some(path) = &self.config.debug.heightmap_export
            && let Some(tile) = self.streamer.tile(self.streamer.reference())
        {
            render_heightmap(tile.buffer()).save_png(path)?;
            info!(path = %path.display(), coord = ?tile.coord(), "exported heightmap");
        }
        if self.config.world.save_on_exit {
            save_settings(&self.config.world.settings_file, &self.biomes, &self.chain)?;
        }
        Ok(stats)
    }
}
