//! Procedural terrain: biome map generation, noise parameter sets, the height
//! filter chain and the compute dispatch contract it runs on.

pub mod biome;
pub mod debug_viz;
pub mod dispatch;
pub mod document;
pub mod filter;
pub mod grid;
pub mod settings;

mod biome_map;
mod generator;

pub use biome::{
    Biome, BiomeId, BiomeRoster, BiomeRosterError, MAX_BIOMES, SurfaceType, Temperature,
    default_roster,
};
pub use biome_map::{BiomeMap, BiomeMapping, BiomeTables, BiomeTan};
pub use dispatch::{
    ComputeDispatcher, CpuDispatcher, DispatchError, DispatchRequest, HeightBuffer, KernelId,
};
pub use document::{SettingsError, apply_document, load_settings, save_settings, to_document};
pub use filter::{FilterChain, Generator};
pub use generator::{BiomeGenConfig, BiomeMapGenerator};
pub use grid::{Connectivity, Grid};
pub use settings::{
    NoiseParameters, RidgeNoiseSettings, SimpleNoiseSettings, TerrainNoiseSettings,
    WarpedSimpleNoiseSettings,
};
