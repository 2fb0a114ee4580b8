//! Debug visualization: render biome maps and height buffers to images.

mod image;
mod renderers;

pub use self::image::{DebugImage, rgba_to_bytes};
pub use renderers::{render_biome_map, render_heightmap};
