//! Biome roster: maps [`BiomeId`] to [`Biome`] with name-based lookup.

use hashbrown::HashMap;

use super::{Biome, SurfaceType, Temperature};

/// Capacity of the per-biome side tables.
pub const MAX_BIOMES: usize = 16;

/// Name of the biome tagged onto temperate/warm coast cells.
pub const SHORE: &str = "Shore";
/// Name of the biome tagged onto cold coast cells.
pub const COLD_SHORE: &str = "Cold Shore";

/// Index of a biome in the roster and in every per-biome table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BiomeId(pub u16);

impl BiomeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Errors that can occur when building a roster.
#[derive(Debug, thiserror::Error)]
pub enum BiomeRosterError {
    /// Registering would exceed [`MAX_BIOMES`].
    #[error("biome roster is full ({MAX_BIOMES} biomes), cannot add {0}")]
    TooMany(String),
    /// A biome with this name is already registered.
    #[error("duplicate biome name: {0}")]
    DuplicateName(String),
    /// Shore tagging needs this biome to exist.
    #[error("roster has no \"{0}\" biome")]
    MissingShore(&'static str),
}

/// Ordered set of biomes. Declaration order is the id order and breaks
/// selection ties.
#[derive(Clone, Debug)]
pub struct BiomeRoster {
    biomes: Vec<Biome>,
    name_to_id: HashMap<String, BiomeId>,
}

impl BiomeRoster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self {
            biomes: Vec::new(),
            name_to_id: HashMap::new(),
        }
    }

    /// Build a roster from biomes in declaration order.
    pub fn from_biomes(
        biomes: impl IntoIterator<Item = Biome>,
    ) -> Result<Self, BiomeRosterError> {
        let mut roster = Self::new();
        for biome in biomes {
            roster.register(biome)?;
        }
        Ok(roster)
    }

    /// Registers a biome, returning its assigned [`BiomeId`].
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRosterError::DuplicateName`] if the name is taken and
    /// [`BiomeRosterError::TooMany`] once [`MAX_BIOMES`] biomes exist.
    pub fn register(&mut self, biome: Biome) -> Result<BiomeId, BiomeRosterError> {
        if self.name_to_id.contains_key(&biome.name) {
            return Err(BiomeRosterError::DuplicateName(biome.name));
        }
        if self.biomes.len() >= MAX_BIOMES {
            return Err(BiomeRosterError::TooMany(biome.name));
        }
        let id = BiomeId(self.biomes.len() as u16);
        self.name_to_id.insert(biome.name.clone(), id);
        self.biomes.push(biome);
        Ok(id)
    }

    /// Returns the biome for the given ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn get(&self, id: BiomeId) -> &Biome {
        &self.biomes[id.index()]
    }

    /// Looks up a biome ID by name.
    pub fn lookup_by_name(&self, name: &str) -> Option<BiomeId> {
        self.name_to_id.get(name).copied()
    }

    /// Change a biome's spawn weight. Returns `false` for an unknown id.
    pub fn set_spawn_weight(&mut self, id: BiomeId, weight: u32) -> bool {
        match self.biomes.get_mut(id.index()) {
            Some(biome) => {
                biome.spawn_weight = weight;
                true
            }
            None => false,
        }
    }

    /// Iterate `(id, biome)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &Biome)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(i, biome)| (BiomeId(i as u16), biome))
    }

    /// Selection candidates for a cell class: positive weight, declaration order.
    pub fn candidates(&self, surface: SurfaceType, temperature: Temperature) -> Vec<BiomeId> {
        self.iter()
            .filter(|(_, b)| b.surface == surface && b.temperature == temperature)
            .filter(|(_, b)| b.spawn_weight > 0)
            .map(|(id, _)| id)
            .collect()
    }

    /// Returns the number of registered biomes.
    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    /// Returns `true` if no biomes are registered.
    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }
}

impl Default for BiomeRoster {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in Earth-like roster.
pub fn default_roster() -> BiomeRoster {
    use SurfaceType::{Land, Ocean};
    use Temperature::{Cold, Temperate, Warm};

    let biomes = [
        Biome::new("Ocean", Ocean, Temperate, 3),
        Biome::new("Deep Ocean", Ocean, Temperate, 1),
        Biome::new("Tundra", Land, Cold, 1),
        Biome::new("Snowy Taiga", Land, Cold, 1),
        Biome::new("Plains", Land, Temperate, 2),
        Biome::new("Forest", Land, Temperate, 2),
        Biome::new("Hills", Land, Temperate, 1),
        Biome::new("Desert", Land, Warm, 1),
        Biome::new("Savanna", Land, Warm, 1),
        Biome::new(SHORE, Land, Temperate, 0),
        Biome::new(COLD_SHORE, Land, Cold, 0),
    ];

    let mut roster = BiomeRoster::new();
    for biome in biomes {
        // Eleven distinct names always fit.
        let _ = roster.register(biome);
    }
    roster
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut roster = BiomeRoster::new();
        let a = roster
            .register(Biome::new("A", SurfaceType::Land, Temperature::Cold, 1))
            .unwrap();
        let b = roster
            .register(Biome::new("B", SurfaceType::Ocean, Temperature::Warm, 1))
            .unwrap();
        assert_eq!(a, BiomeId(0));
        assert_eq!(b, BiomeId(1));
        assert_eq!(roster.lookup_by_name("B"), Some(b));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut roster = BiomeRoster::new();
        roster
            .register(Biome::new("A", SurfaceType::Land, Temperature::Cold, 1))
            .unwrap();
        let err = roster
            .register(Biome::new("A", SurfaceType::Land, Temperature::Warm, 1))
            .unwrap_err();
        assert!(matches!(err, BiomeRosterError::DuplicateName(name) if name == "A"));
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut roster = BiomeRoster::new();
        for i in 0..MAX_BIOMES {
            roster
                .register(Biome::new(format!("b{i}"), SurfaceType::Land, Temperature::Cold, 1))
                .unwrap();
        }
        let err = roster
            .register(Biome::new("overflow", SurfaceType::Land, Temperature::Cold, 1))
            .unwrap_err();
        assert!(matches!(err, BiomeRosterError::TooMany(_)));
        assert_eq!(roster.len(), MAX_BIOMES);
    }

    #[test]
    fn test_default_roster_contents() {
        let roster = default_roster();
        assert_eq!(roster.len(), 11);
        assert!(roster.lookup_by_name(SHORE).is_some());
        assert!(roster.lookup_by_name(COLD_SHORE).is_some());
        assert_eq!(roster.get(BiomeId(0)).name, "Ocean");
    }

    #[test]
    fn test_candidates_skip_zero_weight() {
        let roster = default_roster();
        let cold_land = roster.candidates(SurfaceType::Land, Temperature::Cold);
        let names: Vec<_> = cold_land.iter().map(|&id| roster.get(id).name.as_str()).collect();
        assert_eq!(names, ["Tundra", "Snowy Taiga"], "Cold Shore has no spawn weight");
    }
}
