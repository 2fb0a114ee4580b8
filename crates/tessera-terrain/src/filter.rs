//! Height generators and the ordered chain that applies them to a tile.

use serde_json::{Map, Value};

use crate::biome_map::BiomeTables;
use crate::dispatch::{ComputeDispatcher, DispatchError, DispatchRequest, HeightBuffer, KernelId};
use crate::settings::{
    NoiseParameters, RidgeNoiseSettings, SimpleNoiseSettings, TerrainNoiseSettings,
    WarpedSimpleNoiseSettings,
};

/// One height generator and its parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Generator {
    SimpleNoise(SimpleNoiseSettings),
    RidgeNoise(RidgeNoiseSettings),
    WarpedSimpleNoise(WarpedSimpleNoiseSettings),
    TerrainNoise(TerrainNoiseSettings),
}

impl Generator {
    /// Every label, in the order generators are offered to users.
    pub const LABELS: [&'static str; 4] = [
        "Simple Noise",
        "Ridge Noise",
        "Warped Simple Noise",
        "Terrain Noise",
    ];

    /// Stable identifier, also the `name` key in settings documents.
    pub fn label(&self) -> &'static str {
        match self {
            Generator::SimpleNoise(_) => Self::LABELS[0],
            Generator::RidgeNoise(_) => Self::LABELS[1],
            Generator::WarpedSimpleNoise(_) => Self::LABELS[2],
            Generator::TerrainNoise(_) => Self::LABELS[3],
        }
    }

    /// A generator with default parameters, `None` for an unknown label.
    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "Simple Noise" => Generator::SimpleNoise(Default::default()),
            "Ridge Noise" => Generator::RidgeNoise(Default::default()),
            "Warped Simple Noise" => Generator::WarpedSimpleNoise(Default::default()),
            "Terrain Noise" => Generator::TerrainNoise(Default::default()),
            _ => return None,
        })
    }

    pub fn kernel(&self) -> KernelId {
        match self {
            Generator::SimpleNoise(_) => KernelId::SimpleNoise,
            Generator::RidgeNoise(_) => KernelId::RidgeNoise,
            Generator::WarpedSimpleNoise(_) => KernelId::WarpedSimpleNoise,
            Generator::TerrainNoise(_) => KernelId::TerrainNoise,
        }
    }

    /// Dispatch constants: the parameter record's bytes.
    pub fn constants(&self) -> &[u8] {
        match self {
            Generator::SimpleNoise(s) => s.constants(),
            Generator::RidgeNoise(s) => s.constants(),
            Generator::WarpedSimpleNoise(s) => s.constants(),
            Generator::TerrainNoise(s) => s.constants(),
        }
    }

    /// Flat `(key, value)` parameter listing for settings editors.
    pub fn params(&self) -> Vec<(String, f64)> {
        match self {
            Generator::SimpleNoise(s) => s.params(),
            Generator::RidgeNoise(s) => s.params(),
            Generator::WarpedSimpleNoise(s) => s.params(),
            Generator::TerrainNoise(s) => s.params(),
        }
    }

    /// Edit one parameter by key; see [`NoiseParameters::set_param`].
    pub fn set_param(&mut self, key: &str, value: f64) -> bool {
        match self {
            Generator::SimpleNoise(s) => s.set_param(key, value),
            Generator::RidgeNoise(s) => s.set_param(key, value),
            Generator::WarpedSimpleNoise(s) => s.set_param(key, value),
            Generator::TerrainNoise(s) => s.set_param(key, value),
        }
    }

    /// Add this generator's output onto `target` with a single dispatch.
    pub fn run(
        &self,
        target: &mut HeightBuffer,
        world_offset: [f32; 2],
        tables: &BiomeTables,
        dispatcher: &mut dyn ComputeDispatcher,
    ) -> Result<(), DispatchError> {
        let request = DispatchRequest {
            kernel: self.kernel(),
            world_offset,
            constants: self.constants(),
            tables,
        };
        dispatcher.dispatch(target, &request)
    }

    /// JSON object of the parameters plus `"name": label`.
    pub fn to_json(&self) -> Value {
        let params = match self {
            Generator::SimpleNoise(s) => serde_json::to_value(s),
            Generator::RidgeNoise(s) => serde_json::to_value(s),
            Generator::WarpedSimpleNoise(s) => serde_json::to_value(s),
            Generator::TerrainNoise(s) => serde_json::to_value(s),
        };
        let mut obj = match params {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        obj.insert("name".into(), Value::from(self.label()));
        Value::Object(obj)
    }

    /// Rebuild a generator from [`Self::to_json`] output. Missing parameters
    /// take defaults. `None` when `name` is absent or unknown.
    pub fn from_json(data: &Value) -> Option<Self> {
        let name = data.get("name")?.as_str()?;
        let mut generator = Self::from_label(name)?;
        match &mut generator {
            Generator::SimpleNoise(s) => s.load_json(data),
            Generator::RidgeNoise(s) => s.load_json(data),
            Generator::WarpedSimpleNoise(s) => s.load_json(data),
            Generator::TerrainNoise(s) => s.load_json(data),
        }
        Some(generator)
    }
}

/// Ordered list of generators. Each entry adds onto the output of the ones
/// before it; an empty chain leaves buffers untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterChain {
    filters: Vec<Generator>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, generator: Generator) {
        self.filters.push(generator);
    }

    /// Insert at `index`, clamped to the end of the chain.
    pub fn insert(&mut self, index: usize, generator: Generator) {
        let index = index.min(self.filters.len());
        self.filters.insert(index, generator);
    }

    pub fn remove(&mut self, index: usize) -> Option<Generator> {
        (index < self.filters.len()).then(|| self.filters.remove(index))
    }

    /// Swap entry `index` with the one before it. `false` if already first.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.filters.len() {
            return false;
        }
        self.filters.swap(index - 1, index);
        true
    }

    /// Swap entry `index` with the one after it. `false` if already last.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.filters.len() {
            return false;
        }
        self.filters.swap(index, index + 1);
        true
    }

    pub fn get(&self, index: usize) -> Option<&Generator> {
        self.filters.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Generator> {
        self.filters.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Generator> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Run every generator in order over `target`. Stops at the first failure.
    pub fn run(
        &self,
        target: &mut HeightBuffer,
        world_offset: [f32; 2],
        tables: &BiomeTables,
        dispatcher: &mut dyn ComputeDispatcher,
    ) -> Result<(), DispatchError> {
        for generator in &self.filters {
            generator.run(target, world_offset, tables, dispatcher)?;
        }
        Ok(())
    }

    /// JSON array of [`Generator::to_json`] objects, in chain order.
    pub fn to_json(&self) -> Value {
        Value::Array(self.filters.iter().map(Generator::to_json).collect())
    }

    /// Replace the chain with the entries of a JSON array. Entries with an
    /// unknown or missing name are dropped and logged.
    pub fn load_json(&mut self, data: &Value) {
        let Some(entries) = data.as_array() else {
            tracing::warn!("filter list is not an array, keeping current chain");
            return;
        };
        self.filters = entries
            .iter()
            .filter_map(|entry| {
                let generator = Generator::from_json(entry);
                if generator.is_none() {
                    let name = entry.get("name").and_then(Value::as_str).unwrap_or("<missing>");
                    tracing::warn!(name, "unknown generator in settings, dropped");
                }
                generator
            })
            .collect();
    }
}
