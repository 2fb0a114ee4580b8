//! Biome roster: the fixed set of biomes a map is built from.

mod def;
mod roster;

pub use def::{Biome, SurfaceType, Temperature};
pub use roster::{
    BiomeId, BiomeRoster, BiomeRosterError, COLD_SHORE, MAX_BIOMES, SHORE, default_roster,
};
