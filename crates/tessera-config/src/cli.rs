//! Command-line argument parsing for the Tessera driver.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Tessera command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "tessera", about = "Procedural biome map and streaming terrain tiles")]
pub struct CliArgs {
    /// Biome map seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Tiles per side of the view window.
    #[arg(long)]
    pub view_window: Option<u32>,

    /// Tile edge length in world units.
    #[arg(long)]
    pub tile_size: Option<f32>,

    /// Height buffer resolution per tile.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Generation-settings document to load and save.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames the headless driver simulates.
    #[arg(long, default_value_t = 600)]
    pub frames: u64,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(window) = args.view_window {
            self.streaming.view_window = window;
        }
        if let Some(size) = args.tile_size {
            self.streaming.tile_size = size;
        }
        if let Some(res) = args.resolution {
            self.streaming.heightmap_resolution = res;
        }
        if let Some(ref path) = args.settings {
            self.world.settings_file = path.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
