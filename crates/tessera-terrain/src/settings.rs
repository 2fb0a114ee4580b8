//! Noise parameter sets.
//!
//! Each record is `#[repr(C)]` plain-old-data padded to a multiple of 16 bytes
//! and is uploaded verbatim as a kernel's dispatch constants. Field order is
//! part of that layout. The serde form (camelCase keys, padding skipped) is the
//! settings document format, and [`NoiseParameters`] exposes a flat
//! `dotted.key -> f64` view for settings editors.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use static_assertions::const_assert_eq;

/// Fractal (fBm) simplex noise.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimpleNoiseSettings {
    pub elevation: f32,
    pub frequency: f32,
    pub vertical_shift: f32,
    pub octaves: i32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub persistence: f32,
    pub lacunarity: f32,
}

/// Ridged multifractal noise.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RidgeNoiseSettings {
    pub elevation: f32,
    pub frequency: f32,
    pub vertical_shift: f32,
    pub octaves: i32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub persistence: f32,
    pub lacunarity: f32,
    /// Exponent applied to each ridge octave; higher is sharper.
    pub power: f32,
    /// Feeds each octave's ridge value into the next octave's weight.
    pub gain: f32,
    /// Blend factor `[0, 1]` towards rounded peaks.
    pub peak_smoothing: f32,
    #[serde(skip)]
    pub padding: f32,
}

/// Simple noise whose sampling coordinate is displaced by a warp noise.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WarpedSimpleNoiseSettings {
    pub warp_settings: SimpleNoiseSettings,
    pub noise_settings: SimpleNoiseSettings,
}

/// Composite terrain: warped continents, ocean floor shaping and ridged
/// mountains masked onto land.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TerrainNoiseSettings {
    pub warp_settings: SimpleNoiseSettings,
    pub continent_settings: SimpleNoiseSettings,
    pub mountain_settings: RidgeNoiseSettings,
    /// Extra depth applied below sea level, as a fraction of the continent value.
    pub ocean_depth_multiplier: f32,
    /// Depth at which the ocean floor flattens out.
    pub ocean_floor_depth: f32,
    /// Softness of the ocean floor clamp.
    pub ocean_floor_smoothing: f32,
    /// Width of the coastline band over which mountains fade in.
    pub mountain_blend: f32,
}

const_assert_eq!(std::mem::size_of::<SimpleNoiseSettings>(), 32);
const_assert_eq!(std::mem::size_of::<RidgeNoiseSettings>(), 48);
const_assert_eq!(std::mem::size_of::<WarpedSimpleNoiseSettings>(), 64);
const_assert_eq!(std::mem::size_of::<TerrainNoiseSettings>(), 128);
const_assert_eq!(std::mem::size_of::<TerrainNoiseSettings>() % 16, 0);

impl Default for SimpleNoiseSettings {
    fn default() -> Self {
        Self {
            elevation: 1.0,
            frequency: 1.0,
            vertical_shift: 0.0,
            octaves: 4,
            offset_x: 0.0,
            offset_y: 0.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl Default for RidgeNoiseSettings {
    fn default() -> Self {
        Self {
            elevation: 8.0,
            frequency: 0.5,
            vertical_shift: 0.0,
            octaves: 8,
            offset_x: 0.0,
            offset_y: 0.0,
            persistence: 0.6,
            lacunarity: 2.2,
            power: 5.0,
            gain: 7.0,
            peak_smoothing: 0.0,
            padding: 0.0,
        }
    }
}

impl Default for WarpedSimpleNoiseSettings {
    fn default() -> Self {
        Self {
            warp_settings: SimpleNoiseSettings {
                elevation: 0.5,
                ..SimpleNoiseSettings::default()
            },
            noise_settings: SimpleNoiseSettings::default(),
        }
    }
}

impl Default for TerrainNoiseSettings {
    fn default() -> Self {
        Self {
            warp_settings: SimpleNoiseSettings {
                elevation: 0.0,
                ..SimpleNoiseSettings::default()
            },
            continent_settings: SimpleNoiseSettings::default(),
            mountain_settings: RidgeNoiseSettings::default(),
            ocean_depth_multiplier: 0.0,
            ocean_floor_depth: 3.0,
            ocean_floor_smoothing: 0.5,
            mountain_blend: 0.0,
        }
    }
}

impl TerrainNoiseSettings {
    /// Per-biome default: same shape parameters as [`Default`] but every
    /// elevation zeroed, so a biome contributes nothing until tuned.
    pub fn flat() -> Self {
        let mut settings = Self::default();
        settings.warp_settings.elevation = 0.0;
        settings.continent_settings.elevation = 0.0;
        settings.mountain_settings.elevation = 0.0;
        settings
    }
}

// --- Settings editor contract ---

/// Flat key/value access shared by every parameter record.
pub trait NoiseParameters: Pod + Serialize + DeserializeOwned + Default + PartialEq {
    /// Bytes uploaded as dispatch constants.
    fn constants(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Every numeric parameter as `(dotted.key, value)`, keys sorted
    /// alphabetically within each level, e.g. `("mountainSettings.power", 5.0)`.
    fn params(&self) -> Vec<(String, f64)> {
        let mut out = Vec::new();
        if let Ok(value) = serde_json::to_value(self) {
            flatten_into("", &value, &mut out);
        }
        out
    }

    /// Set one parameter by its dotted key. Integer parameters are rounded.
    /// Returns `false` if the key does not exist or the value does not fit.
    fn set_param(&mut self, key: &str, value: f64) -> bool {
        let Ok(mut tree) = serde_json::to_value(&*self) else {
            return false;
        };
        let Some(slot) = key.split('.').try_fold(&mut tree, |node, part| node.get_mut(part))
        else {
            return false;
        };
        let replacement = match slot {
            Value::Number(n) if n.is_i64() || n.is_u64() => Value::from(value.round() as i64),
            Value::Number(_) => match serde_json::Number::from_f64(value) {
                Some(n) => Value::Number(n),
                None => return false,
            },
            _ => return false,
        };
        *slot = replacement;
        match serde_json::from_value(tree) {
            Ok(updated) => {
                *self = updated;
                true
            }
            Err(_) => false,
        }
    }

    /// Overlay the keys present in `data` onto `self`, keeping current values
    /// for missing or mistyped keys.
    fn load_json(&mut self, data: &Value) {
        if let Ok(updated) = overlay(self, data) {
            *self = updated;
        }
    }
}

impl NoiseParameters for SimpleNoiseSettings {}
impl NoiseParameters for RidgeNoiseSettings {}
impl NoiseParameters for WarpedSimpleNoiseSettings {}
impl NoiseParameters for TerrainNoiseSettings {}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, f64)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&path, child, out);
            }
        }
        Value::Number(n) => {
            if let Some(v) = n.as_f64() {
                out.push((prefix.to_string(), v));
            }
        }
        _ => {}
    }
}

/// Serialize `current`, merge the keys of `patch` that exist with a matching
/// JSON kind, and deserialize the result.
pub(crate) fn overlay<T: Serialize + DeserializeOwned>(
    current: &T,
    patch: &Value,
) -> Result<T, serde_json::Error> {
    let mut base = serde_json::to_value(current)?;
    merge(&mut base, patch);
    serde_json::from_value(base)
}

fn merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => merge_objects(base, patch),
        (Value::Array(base), Value::Array(patch)) => {
            for (slot, item) in base.iter_mut().zip(patch) {
                merge(slot, item);
            }
        }
        (slot @ Value::Number(_), Value::Number(n)) => {
            let is_int = matches!(&*slot, Value::Number(b) if b.is_i64() || b.is_u64());
            *slot = match (is_int, n.as_f64()) {
                (true, Some(v)) if n.is_f64() => Value::from(v.round() as i64),
                _ => Value::Number(n.clone()),
            };
        }
        (slot @ Value::Bool(_), Value::Bool(b)) => *slot = Value::Bool(*b),
        (slot @ Value::String(_), Value::String(s)) => *slot = Value::String(s.clone()),
        _ => {}
    }
}

fn merge_objects(base: &mut Map<String, Value>, patch: &Map<String, Value>) {
    for (key, slot) in base.iter_mut() {
        if let Some(item) = patch.get(key) {
            merge(slot, item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(RidgeNoiseSettings::default()).unwrap();
        let obj = json.as_object().unwrap();
        for key in ["verticalShift", "offsetX", "offsetY", "peakSmoothing", "power"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert!(!obj.contains_key("padding"), "padding must not be serialized");
    }

    #[test]
    fn test_constants_match_layout() {
        let settings = SimpleNoiseSettings {
            frequency: 3.0,
            ..Default::default()
        };
        let bytes = settings.constants();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[4..8], &3.0f32.to_ne_bytes(), "frequency is the second field");
    }

    #[test]
    fn test_params_are_flat_dotted_keys() {
        let params = TerrainNoiseSettings::default().params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"mountainSettings.gain"));
        assert!(keys.contains(&"continentSettings.octaves"));
        assert!(keys.contains(&"oceanFloorDepth"));
        assert_eq!(params.len(), 8 + 8 + 11 + 4);
    }

    #[test]
    fn test_params_sorted_by_key() {
        let keys: Vec<String> = SimpleNoiseSettings::default()
            .params()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.first().map(String::as_str), Some("elevation"));
    }

    #[test]
    fn test_set_param_by_key() {
        let mut settings = TerrainNoiseSettings::default();
        assert!(settings.set_param("mountainSettings.power", 2.5));
        assert!(settings.set_param("continentSettings.octaves", 6.4));
        assert_eq!(settings.mountain_settings.power, 2.5);
        assert_eq!(settings.continent_settings.octaves, 6, "integers are rounded");
    }

    #[test]
    fn test_set_param_unknown_key() {
        let mut settings = SimpleNoiseSettings::default();
        assert!(!settings.set_param("nope", 1.0));
        assert!(!settings.set_param("frequency.inner", 1.0));
        assert_eq!(settings, SimpleNoiseSettings::default());
    }

    #[test]
    fn test_load_json_keeps_missing_keys() {
        let mut settings = SimpleNoiseSettings {
            elevation: 4.0,
            ..Default::default()
        };
        settings.load_json(&serde_json::json!({ "frequency": 0.25, "octaves": "six" }));
        assert_eq!(settings.frequency, 0.25);
        assert_eq!(settings.elevation, 4.0, "missing key keeps current value");
        assert_eq!(settings.octaves, 4, "mistyped key keeps current value");
    }

    #[test]
    fn test_flat_zeroes_elevations() {
        let flat = TerrainNoiseSettings::flat();
        assert_eq!(flat.continent_settings.elevation, 0.0);
        assert_eq!(flat.mountain_settings.elevation, 0.0);
        assert_eq!(flat.ocean_floor_depth, 3.0);
    }
}
