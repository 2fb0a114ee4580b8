//! Biome definition: the spawning properties of a single biome.

/// Whether a biome sits on water or on land.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceType {
    Ocean,
    Land,
}

/// Climate band a biome belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Temperature {
    Cold,
    Temperate,
    Warm,
}

impl Temperature {
    /// The opposite climate extreme, if this is one.
    pub fn opposite(self) -> Option<Temperature> {
        match self {
            Temperature::Cold => Some(Temperature::Warm),
            Temperature::Warm => Some(Temperature::Cold),
            Temperature::Temperate => None,
        }
    }
}

/// Descriptor for a biome type.
#[derive(Clone, Debug, PartialEq)]
pub struct Biome {
    /// Display name, also the key used in settings documents (e.g. "Snowy Taiga").
    pub name: String,
    /// Ocean or land.
    pub surface: SurfaceType,
    /// Climate band the biome is selected for.
    pub temperature: Temperature,
    /// Relative weight during biome selection. Zero removes the biome from selection.
    pub spawn_weight: u32,
}

impl Biome {
    pub fn new(
        name: impl Into<String>,
        surface: SurfaceType,
        temperature: Temperature,
        spawn_weight: u32,
    ) -> Self {
        Self {
            name: name.into(),
            surface,
            temperature,
            spawn_weight,
        }
    }
}
