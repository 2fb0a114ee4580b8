//! Seeded cellular-automata biome map generator.
//!
//! Starting from a 4×4 land/ocean grid, the map is refined by nearest-neighbour
//! zooms interleaved with growth, erosion and climate passes:
//!
//! seed → zoom → grow/erode → zoom → grow/erode ×3 → de-isolate →
//! temperature-assign → zoom → temperature-smooth → biome-select → zoom →
//! shore-tag
//!
//! Every chance check draws an integer from `1..=100` and succeeds when the
//! draw is at most the configured percentage.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::biome::{
    BiomeId, BiomeRoster, BiomeRosterError, COLD_SHORE, SHORE, SurfaceType, Temperature,
    default_roster,
};
use crate::biome_map::{BiomeMap, BiomeMapping, BiomeTables, BiomeTan};
use crate::grid::{Connectivity, Grid};
use crate::settings::{NoiseParameters, TerrainNoiseSettings, overlay};

/// Side length of the initial grid.
const SEED_GRID_SIZE: u32 = 4;

/// Tunable scalars of the pipeline. Percentages are in `[0, 100]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BiomeGenConfig {
    pub seed: u64,
    /// Chance a seed cell starts as land.
    pub continent_chance: u32,
    /// Chance an ocean cell touching land becomes land.
    pub island_expand_chance: u32,
    /// Chance a land cell touching two or more oceans becomes ocean.
    pub island_erode_chance: u32,
    /// Chance an ocean cell surrounded by ocean becomes land.
    pub remove_ocean_chance: u32,
    /// Chance a zoomed cell samples a neighbour of its parent.
    pub zoom_perturbation_chance: u32,
    pub cold_weight: u32,
    pub temperate_weight: u32,
    pub warm_weight: u32,
    /// Opposite-extreme neighbours tolerated before a cell turns temperate.
    pub transition_threshold: u32,
    pub shore_connectivity: Connectivity,
}

impl Default for BiomeGenConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            continent_chance: 15,
            island_expand_chance: 30,
            island_erode_chance: 15,
            remove_ocean_chance: 45,
            zoom_perturbation_chance: 20,
            cold_weight: 17,
            temperate_weight: 66,
            warm_weight: 17,
            transition_threshold: 0,
            shore_connectivity: Connectivity::Eight,
        }
    }
}

/// Cell state before concrete biomes are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Climate {
    surface: SurfaceType,
    temperature: Temperature,
}

impl Climate {
    const OCEAN: Climate = Climate {
        surface: SurfaceType::Ocean,
        temperature: Temperature::Temperate,
    };
    const LAND: Climate = Climate {
        surface: SurfaceType::Land,
        temperature: Temperature::Temperate,
    };

    fn is_land(self) -> bool {
        self.surface == SurfaceType::Land
    }
}

/// Owns the roster, per-biome tables and the current map.
///
/// Edits go to the generator's own fields; [`BiomeMapGenerator::publish`] or
/// [`BiomeMapGenerator::regenerate`] swap in a fresh [`BiomeTables`] snapshot.
pub struct BiomeMapGenerator {
    config: BiomeGenConfig,
    roster: BiomeRoster,
    generation_settings: Vec<TerrainNoiseSettings>,
    tans: Vec<BiomeTan>,
    minimap_colours: Vec<[f32; 4]>,
    mapping: BiomeMapping,
    map: BiomeMap,
    tables: Arc<BiomeTables>,
    shore: BiomeId,
    cold_shore: BiomeId,
}

impl BiomeMapGenerator {
    /// Create a generator over `roster`. No map is generated yet.
    ///
    /// # Errors
    ///
    /// Returns [`BiomeRosterError::MissingShore`] if the roster lacks the
    /// "Shore" or "Cold Shore" biome.
    pub fn new(config: BiomeGenConfig, roster: BiomeRoster) -> Result<Self, BiomeRosterError> {
        let shore = roster
            .lookup_by_name(SHORE)
            .ok_or(BiomeRosterError::MissingShore(SHORE))?;
        let cold_shore = roster
            .lookup_by_name(COLD_SHORE)
            .ok_or(BiomeRosterError::MissingShore(COLD_SHORE))?;

        let generation_settings = roster
            .iter()
            .map(|(_, b)| default_generation_settings(&b.name))
            .collect();
        let minimap_colours = roster.iter().map(|(_, b)| default_minimap_colour(&b.name)).collect();

        let mut generator = Self {
            config,
            tans: vec![BiomeTan::default(); roster.len()],
            roster,
            generation_settings,
            minimap_colours,
            mapping: BiomeMapping::default(),
            map: BiomeMap::empty(),
            tables: Arc::new(BiomeTables::empty()),
            shore,
            cold_shore,
        };
        generator.publish();
        Ok(generator)
    }

    /// Generator over [`default_roster`].
    pub fn with_default_roster(config: BiomeGenConfig) -> Result<Self, BiomeRosterError> {
        Self::new(config, default_roster())
    }

    /// Run the full pipeline for `seed`. Same seed and config, same map.
    pub fn generate(&self, seed: u64) -> BiomeMap {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let c = &self.config;

        let mut grid = self.seed_pass(&mut rng);
        grid = self.zoom(&grid, &mut rng);
        grid = self.grow_erode(&grid, &mut rng);
        grid = self.zoom(&grid, &mut rng);
        for _ in 0..3 {
            grid = self.grow_erode(&grid, &mut rng);
        }
        grid = self.de_isolate(&grid, &mut rng);
        grid = self.assign_temperatures(&grid, &mut rng);
        grid = self.zoom(&grid, &mut rng);
        grid = smooth_temperatures(&grid, c.transition_threshold);
        let biomes = self.select_biomes(&grid, &mut rng);
        let biomes = self.zoom(&biomes, &mut rng);
        let biomes = self.tag_shores(&biomes);

        tracing::debug!(seed, resolution = biomes.size(), "biome map generated");
        BiomeMap::new(biomes)
    }

    /// Regenerate with the configured seed and publish new tables.
    pub fn regenerate(&mut self) -> Arc<BiomeTables> {
        self.map = self.generate(self.config.seed);
        self.publish();
        tracing::info!(
            seed = self.config.seed,
            resolution = self.map.resolution(),
            "biome map regenerated"
        );
        self.tables()
    }

    /// Snapshot the current map and per-biome tables.
    pub fn publish(&mut self) -> Arc<BiomeTables> {
        let mut mapping = self.mapping;
        mapping.resolution = self.map.resolution();
        self.tables = Arc::new(BiomeTables {
            map: self.map.clone(),
            generation_settings: self.generation_settings.clone(),
            tans: self.tans.clone(),
            minimap_colours: self.minimap_colours.clone(),
            mapping,
        });
        self.tables()
    }

    /// Most recently published tables.
    pub fn tables(&self) -> Arc<BiomeTables> {
        Arc::clone(&self.tables)
    }

    pub fn map(&self) -> &BiomeMap {
        &self.map
    }

    pub fn config(&self) -> &BiomeGenConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BiomeGenConfig {
        &mut self.config
    }

    pub fn roster(&self) -> &BiomeRoster {
        &self.roster
    }

    /// Change a spawn weight by biome name. Returns `false` for unknown names.
    pub fn set_spawn_weight(&mut self, name: &str, weight: u32) -> bool {
        match self.roster.lookup_by_name(name) {
            Some(id) => self.roster.set_spawn_weight(id, weight),
            None => false,
        }
    }

    pub fn generation_settings(&self, id: BiomeId) -> Option<&TerrainNoiseSettings> {
        self.generation_settings.get(id.index())
    }

    pub fn generation_settings_mut(&mut self, id: BiomeId) -> Option<&mut TerrainNoiseSettings> {
        self.generation_settings.get_mut(id.index())
    }

    pub fn tan_mut(&mut self, id: BiomeId) -> Option<&mut BiomeTan> {
        self.tans.get_mut(id.index())
    }

    pub fn minimap_colour_mut(&mut self, id: BiomeId) -> Option<&mut [f32; 4]> {
        self.minimap_colours.get_mut(id.index())
    }

    pub fn mapping_mut(&mut self) -> &mut BiomeMapping {
        &mut self.mapping
    }

    // --- Passes ---

    fn chance(rng: &mut ChaCha8Rng, percent: u32) -> bool {
        rng.random_range(1..=100) <= percent
    }

    fn seed_pass(&self, rng: &mut ChaCha8Rng) -> Grid<Climate> {
        let chance = self.config.continent_chance;
        Grid::from_fn(SEED_GRID_SIZE, |_, _| {
            if Self::chance(rng, chance) {
                Climate::LAND
            } else {
                Climate::OCEAN
            }
        })
    }

    /// Double the resolution; a perturbed cell samples a neighbour of its parent.
    fn zoom<T: Copy>(&self, grid: &Grid<T>, rng: &mut ChaCha8Rng) -> Grid<T> {
        let old = grid.size() as i32;
        let chance = self.config.zoom_perturbation_chance;
        Grid::from_fn(grid.size() * 2, |x, y| {
            let mut sx = (x / 2) as i32;
            let mut sy = (y / 2) as i32;
            if Self::chance(rng, chance) {
                let step = if rng.random::<bool>() { 1 } else { -1 };
                if rng.random::<bool>() {
                    sx = (sx + step).clamp(0, old - 1);
                } else {
                    sy = (sy + step).clamp(0, old - 1);
                }
            }
            grid.at(sx as u32, sy as u32)
        })
    }

    fn grow_erode(&self, grid: &Grid<Climate>, rng: &mut ChaCha8Rng) -> Grid<Climate> {
        let c = &self.config;
        grid.map(|x, y, cell| {
            if cell.is_land() {
                let oceans = grid.count_neighbours(x, y, Connectivity::Four, |n| !n.is_land());
                if oceans >= 2 && Self::chance(rng, c.island_erode_chance) {
                    return Climate::OCEAN;
                }
            } else {
                let lands = grid.count_neighbours(x, y, Connectivity::Four, Climate::is_land);
                if lands >= 1 && Self::chance(rng, c.island_expand_chance) {
                    return Climate::LAND;
                }
            }
            cell
        })
    }

    /// Ocean cells with four ocean neighbours may become land. Edge cells have
    /// fewer than four neighbours and are never converted.
    fn de_isolate(&self, grid: &Grid<Climate>, rng: &mut ChaCha8Rng) -> Grid<Climate> {
        let chance = self.config.remove_ocean_chance;
        grid.map(|x, y, cell| {
            if !cell.is_land()
                && grid.count_neighbours(x, y, Connectivity::Four, |n| !n.is_land())
                    == Connectivity::Four.max_neighbours()
                && Self::chance(rng, chance)
            {
                return Climate::LAND;
            }
            cell
        })
    }

    fn assign_temperatures(&self, grid: &Grid<Climate>, rng: &mut ChaCha8Rng) -> Grid<Climate> {
        let c = &self.config;
        let total = c.cold_weight + c.temperate_weight + c.warm_weight;
        grid.map(|_, _, cell| {
            if !cell.is_land() {
                return Climate::OCEAN;
            }
            let temperature = if total == 0 {
                Temperature::Temperate
            } else {
                let draw = rng.random_range(0..total);
                if draw < c.cold_weight {
                    Temperature::Cold
                } else if draw < c.cold_weight + c.temperate_weight {
                    Temperature::Temperate
                } else {
                    Temperature::Warm
                }
            };
            Climate {
                surface: SurfaceType::Land,
                temperature,
            }
        })
    }

    /// Cumulative percentage ladder over the positive-weight candidates.
    fn select_biomes(&self, grid: &Grid<Climate>, rng: &mut ChaCha8Rng) -> Grid<BiomeId> {
        let classes = [SurfaceType::Ocean, SurfaceType::Land].into_iter().flat_map(|s| {
            [Temperature::Cold, Temperature::Temperate, Temperature::Warm]
                .into_iter()
                .map(move |t| (s, t))
        });
        let ladders: Vec<((SurfaceType, Temperature), Vec<(BiomeId, f32)>)> = classes
            .map(|(s, t)| ((s, t), self.ladder(s, t)))
            .collect();

        grid.map(|_, _, cell| {
            let ladder = ladders
                .iter()
                .find(|(class, _)| *class == (cell.surface, cell.temperature))
                .map(|(_, ladder)| ladder.as_slice())
                .unwrap_or(&[]);
            match ladder {
                [] => self.fallback_biome(cell.surface),
                [(only, _)] => *only,
                _ => Self::climb(ladder, rng.random::<f32>() * 100.0),
            }
        })
    }

    fn ladder(&self, surface: SurfaceType, temperature: Temperature) -> Vec<(BiomeId, f32)> {
        let candidates = self.roster.candidates(surface, temperature);
        let total: u64 = candidates
            .iter()
            .map(|&id| u64::from(self.roster.get(id).spawn_weight))
            .sum();
        let mut cumulative = 0u64;
        candidates
            .into_iter()
            .map(|id| {
                cumulative += u64::from(self.roster.get(id).spawn_weight);
                (id, (cumulative as f64 * 100.0 / total as f64) as f32)
            })
            .collect()
    }

    /// First rung whose bound exceeds `draw`; the last rung catches rounding.
    fn climb(ladder: &[(BiomeId, f32)], draw: f32) -> BiomeId {
        ladder
            .iter()
            .find(|(_, bound)| *bound > draw)
            .or(ladder.last())
            .map(|(id, _)| *id)
            .unwrap_or_default()
    }

    /// First biome with the right surface, else biome 0.
    fn fallback_biome(&self, surface: SurfaceType) -> BiomeId {
        self.roster
            .iter()
            .find(|(_, b)| b.surface == surface)
            .map(|(id, _)| id)
            .unwrap_or_default()
    }

    fn tag_shores(&self, grid: &Grid<BiomeId>) -> Grid<BiomeId> {
        let connectivity = self.config.shore_connectivity;
        grid.map(|x, y, id| {
            let biome = self.roster.get(id);
            if biome.surface != SurfaceType::Land {
                return id;
            }
            let is_ocean = |n: BiomeId| self.roster.get(n).surface == SurfaceType::Ocean;
            if grid.count_neighbours(x, y, connectivity, is_ocean) == 0 {
                return id;
            }
            if biome.temperature == Temperature::Cold {
                self.cold_shore
            } else {
                self.shore
            }
        })
    }

    // --- Persistence ---

    /// Complete generator state as a settings-document object.
    pub fn to_json(&self) -> Value {
        let mut obj = match serde_json::to_value(&self.config) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        obj.insert(
            "mapping".into(),
            serde_json::to_value(self.mapping).unwrap_or(Value::Null),
        );

        let mut biomes = Map::new();
        for (id, biome) in self.roster.iter() {
            let mut entry = Map::new();
            entry.insert("spawnWeight".into(), Value::from(biome.spawn_weight));
            if let Some(tan) = self.tans.get(id.index()) {
                entry.insert("tan".into(), serde_json::to_value(tan).unwrap_or(Value::Null));
            }
            if let Some(colour) = self.minimap_colours.get(id.index()) {
                entry.insert(
                    "minimapColour".into(),
                    serde_json::to_value(colour).unwrap_or(Value::Null),
                );
            }
            biomes.insert(biome.name.clone(), Value::Object(entry));
        }
        obj.insert("biomes".into(), Value::Object(biomes));

        let settings: Vec<Value> = self
            .generation_settings
            .iter()
            .map(|s| serde_json::to_value(s).unwrap_or(Value::Null))
            .collect();
        obj.insert("generationSettings".into(), Value::Array(settings));

        Value::Object(obj)
    }

    /// Apply a settings-document object. Missing keys keep their current value
    /// and unknown biome names are skipped. Call [`Self::regenerate`] afterwards
    /// to rebuild the map.
    pub fn load_json(&mut self, data: &Value) {
        match overlay(&self.config, data) {
            Ok(config) => self.config = config,
            Err(err) => tracing::warn!(%err, "ignoring malformed biome generator scalars"),
        }
        if let Some(mapping) = data.get("mapping") {
            match overlay(&self.mapping, mapping) {
                Ok(m) => self.mapping = m,
                Err(err) => tracing::warn!(%err, "ignoring malformed biome mapping"),
            }
        }

        if let Some(biomes) = data.get("biomes").and_then(Value::as_object) {
            for (name, entry) in biomes {
                let Some(id) = self.roster.lookup_by_name(name) else {
                    tracing::warn!(biome = %name, "unknown biome in settings, skipped");
                    continue;
                };
                if let Some(weight) = entry.get("spawnWeight").and_then(Value::as_u64) {
                    match u32::try_from(weight) {
                        Ok(weight) => {
                            self.roster.set_spawn_weight(id, weight);
                        }
                        Err(_) => {
                            tracing::warn!(biome = %name, weight, "spawn weight out of range, skipped")
                        }
                    }
                }
                if let (Some(tan), Some(slot)) = (entry.get("tan"), self.tan_mut(id))
                    && let Ok(updated) = overlay(slot, tan)
                {
                    *slot = updated;
                }
                if let (Some(colour), Some(slot)) =
                    (entry.get("minimapColour"), self.minimap_colour_mut(id))
                    && let Ok(updated) = overlay(slot, colour)
                {
                    *slot = updated;
                }
            }
        }

        if let Some(settings) = data.get("generationSettings").and_then(Value::as_array) {
            for (slot, entry) in self.generation_settings.iter_mut().zip(settings) {
                slot.load_json(entry);
            }
        }
    }
}

fn smooth_temperatures(grid: &Grid<Climate>, threshold: u32) -> Grid<Climate> {
    grid.map(|x, y, cell| {
        let Some(opposite) = cell.temperature.opposite() else {
            return cell;
        };
        if !cell.is_land() {
            return cell;
        }
        let clashes = grid.count_neighbours(x, y, Connectivity::Four, |n| {
            n.is_land() && n.temperature == opposite
        });
        if clashes > threshold {
            Climate {
                temperature: Temperature::Temperate,
                ..cell
            }
        } else {
            cell
        }
    })
}

fn default_generation_settings(name: &str) -> TerrainNoiseSettings {
    let mut settings = TerrainNoiseSettings::flat();
    match name {
        "Deep Ocean" => {
            settings.continent_settings.elevation = 1.0;
            settings.continent_settings.vertical_shift = -1.5;
        }
        "Hills" => {
            settings.mountain_settings.elevation = 2.0;
        }
        _ => {}
    }
    settings
}

fn default_minimap_colour(name: &str) -> [f32; 4] {
    match name {
        "Ocean" => [0.1, 0.3, 0.8, 1.0],
        "Deep Ocean" => [0.05, 0.15, 0.5, 1.0],
        "Tundra" => [0.85, 0.9, 0.95, 1.0],
        "Snowy Taiga" => [0.55, 0.7, 0.65, 1.0],
        "Plains" => [0.45, 0.75, 0.3, 1.0],
        "Forest" => [0.15, 0.5, 0.15, 1.0],
        "Hills" => [0.45, 0.5, 0.3, 1.0],
        "Desert" => [0.93, 0.85, 0.55, 1.0],
        "Savanna" => [0.75, 0.7, 0.3, 1.0],
        SHORE => [0.95, 0.9, 0.6, 1.0],
        COLD_SHORE => [0.7, 0.7, 0.65, 1.0],
        _ => [0.5, 0.5, 0.5, 1.0],
    }
}
