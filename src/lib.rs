// Tile-based fog-of-war engine with a projection-aware minimap
// rasterizer. The fog updater recomputes visibility over a moving
// window around the observer; the minimap redraws terrain only when
// visibility changed and rebuilds its entity overlay every frame.

#![allow(clippy::collapsible_if)]

pub mod log;
pub mod utils;
pub mod map;
pub mod world;
pub mod fog;
pub mod render;
pub mod minimap;

pub use fog::{FogMode, FogOfWar, FogSettings, FowGrid, FowTile};
pub use map::{EventActivation, EventFlags, Map, MapEvent, TileCollision};
pub use minimap::{Minimap, MinimapConfig, MinimapMode};
pub use minimap::markers::{MarkerKind, PixelMarker};
pub use minimap::projection::{Projection, ProjectionKind};
pub use render::{ImageHandle, PixelBatch, PixelSurface, RenderDevice,
                 SoftwareDevice, SoftwareSurface, SurfaceRect};
pub use world::{EntityState, Observer};
