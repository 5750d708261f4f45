use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::{
    fog::{FogOfWar, FowTile},
    log,
    map::Map,
    render::{ImageHandle, PixelBatch, PixelSurface, RenderDevice, SurfaceRect},
    utils::{
        coords::{CellRange, PixelPoint},
        Rect,
        Rgba8,
        Size,
        Vec2,
    },
    world::{EntityState, Observer},
};

use markers::{MarkerCollector, MarkerKind};
use projection::{Projection, ProjectionKind};

pub mod markers;
pub mod projection;

#[cfg(test)]
mod tests;

// ----------------------------------------------
// Constants
// ----------------------------------------------

// Zoom factors of the two surface pairs.
const ZOOM_LEVELS: [i32; 2] = [1, 2];

// Marker visibility circle relative to the viewport diagonal (~1/sqrt(2)).
const VISIBLE_RADIUS_FACTOR: f32 = 0.7071;

// ----------------------------------------------
// MinimapMode
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq,
         Display, EnumCount, EnumIter, Serialize, Deserialize)]
pub enum MinimapMode {
    Hidden,
    #[default]
    Normal, // 1x zoom
    TwoX,   // 2x zoom
}

impl MinimapMode {
    #[inline]
    pub fn zoom(self) -> Option<i32> {
        match self {
            Self::Hidden => None,
            Self::Normal => Some(1),
            Self::TwoX   => Some(2),
        }
    }
}

// ----------------------------------------------
// MinimapConfig
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinimapConfig {
    // Viewport rectangle of the map display area, in screen pixels.
    pub pos: Rect,
    pub mode: MinimapMode,

    // Terrain colors:
    pub color_wall: Rgba8,
    pub color_obstacle: Rgba8,

    // Marker colors:
    pub color_hero: Rgba8,
    pub color_enemy: Rgba8,
    pub color_ally: Rgba8,
    pub color_npc: Rgba8,
    pub color_teleport: Rgba8,
}

impl Default for MinimapConfig {
    fn default() -> Self {
        Self {
            pos: Rect::from_pos_and_size(Vec2::zero(), Vec2::new(100.0, 100.0)),
            mode: MinimapMode::Normal,
            color_wall: Rgba8::rgb(128, 128, 128),
            color_obstacle: Rgba8::rgb(64, 64, 64),
            color_hero: Rgba8::rgb(255, 255, 255),
            color_enemy: Rgba8::rgb(255, 0, 0),
            color_ally: Rgba8::rgb(255, 255, 0),
            color_npc: Rgba8::rgb(0, 255, 0),
            color_teleport: Rgba8::rgb(0, 191, 255),
        }
    }
}

impl MinimapConfig {
    // Radius of the marker visibility circle, derived from the viewport.
    #[inline]
    pub fn visible_radius(&self) -> f32 {
        self.pos.width().max(self.pos.height()) * VISIBLE_RADIUS_FACTOR
    }

    #[inline]
    pub fn marker_color(&self, kind: MarkerKind) -> Rgba8 {
        match kind {
            MarkerKind::Hero     => self.color_hero,
            MarkerKind::Npc      => self.color_npc,
            MarkerKind::Teleport => self.color_teleport,
            MarkerKind::Ally     => self.color_ally,
            MarkerKind::Enemy    => self.color_enemy,
        }
    }
}

// ----------------------------------------------
// MinimapSurfaces
// ----------------------------------------------

// The four off-screen surfaces: static terrain and the transient entity
// overlay, each at 1x and 2x zoom. Dropping a field releases the
// previous surface, so reallocation can never leak one even when a
// later allocation fails.
#[derive(Default)]
struct MinimapSurfaces {
    terrain: Option<Box<dyn PixelSurface>>,
    terrain_2x: Option<Box<dyn PixelSurface>>,
    entities: Option<Box<dyn PixelSurface>>,
    entities_2x: Option<Box<dyn PixelSurface>>,
}

impl MinimapSurfaces {
    // Terrain surfaces are sized to hold the whole projected map;
    // entity overlays are viewport-sized and rebuilt every frame.
    fn reallocate(&mut self,
                  device: &mut dyn RenderDevice,
                  projection: &ProjectionKind,
                  viewport: Size) {

        self.terrain     = device.create_surface("minimap_terrain_1x", projection.surface_extent(1));
        self.terrain_2x  = device.create_surface("minimap_terrain_2x", projection.surface_extent(2));
        self.entities    = device.create_surface("minimap_entities_1x", viewport);
        self.entities_2x = device.create_surface("minimap_entities_2x", viewport);

        if self.terrain.is_none() || self.terrain_2x.is_none()
            || self.entities.is_none() || self.entities_2x.is_none() {
            log::warn!(log::channel!("minimap"),
                       "Minimap surface allocation failed; affected zoom levels will not draw.");
        }
    }

    #[inline]
    fn terrain(&self, zoom: i32) -> Option<&dyn PixelSurface> {
        match zoom {
            1 => self.terrain.as_deref(),
            2 => self.terrain_2x.as_deref(),
            _ => None,
        }
    }

    #[inline]
    fn terrain_mut(&mut self, zoom: i32) -> Option<&mut (dyn PixelSurface + 'static)> {
        match zoom {
            1 => self.terrain.as_deref_mut(),
            2 => self.terrain_2x.as_deref_mut(),
            _ => None,
        }
    }

    #[inline]
    fn entities_mut(&mut self, zoom: i32) -> Option<&mut (dyn PixelSurface + 'static)> {
        match zoom {
            1 => self.entities.as_deref_mut(),
            2 => self.entities_2x.as_deref_mut(),
            _ => None,
        }
    }
}

// ----------------------------------------------
// Minimap
// ----------------------------------------------

// Minimap rasterizer. Terrain surfaces are redrawn only when the fog
// of war uncovers something (cheap, infrequent); the entity overlay is
// rebuilt every frame since entity positions change continuously.
pub struct Minimap {
    config: MinimapConfig,
    projection: ProjectionKind,
    map_size: Size,
    surfaces: MinimapSurfaces,
    collector: MarkerCollector,
    compass: ImageHandle,
}

impl Minimap {
    pub fn new(config: MinimapConfig) -> Self {
        Self {
            config,
            projection: ProjectionKind::orthogonal(Size::zero()),
            map_size: Size::zero(),
            surfaces: MinimapSurfaces::default(),
            collector: MarkerCollector::new(),
            compass: ImageHandle::invalid(),
        }
    }

    #[inline]
    pub fn config(&self) -> &MinimapConfig {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut MinimapConfig {
        &mut self.config
    }

    // Map load or projection-mode change: recreate all four surfaces
    // for the new map and draw the full terrain extent once.
    pub fn prerender(&mut self,
                     device: &mut dyn RenderDevice,
                     map: &Map,
                     fog: &FogOfWar,
                     projection: ProjectionKind) {

        self.projection = projection;
        self.map_size = map.size();

        self.surfaces.reallocate(device, &self.projection, self.config.pos.integer_size());
        self.compass = device.load_image(self.projection.compass_image_path());

        log::info!(log::channel!("minimap"),
                   "Minimap surfaces reallocated for {} map cells.", self.map_size);

        for zoom in ZOOM_LEVELS {
            self.redraw_terrain(map, fog, map.bounds(), None, zoom);
        }
    }

    // Partial terrain redraw over the window the fog updater flagged,
    // additionally clipped to a viewport-sized region around the
    // observer to bound the pixel batch.
    pub fn update(&mut self,
                  map: &Map,
                  fog: &FogOfWar,
                  window: CellRange,
                  observer: &Observer) {

        debug_assert!(map.size() == self.map_size);

        for zoom in ZOOM_LEVELS {
            let clip = self.observer_clip(observer, zoom);
            self.redraw_terrain(map, fog, window, Some(clip), zoom);
        }
    }

    // Per-frame compose: terrain pair selected by display mode, entity
    // overlay rebuilt from scratch, both blitted through a viewport
    // window centered on the observer, then the compass decoration.
    pub fn render(&mut self,
                  device: &mut dyn RenderDevice,
                  map: &Map,
                  fog: &FogOfWar,
                  entities: &[EntityState],
                  observer: &Observer) {

        let Some(zoom) = self.config.mode.zoom() else {
            return; // Minimap hidden.
        };

        let map_area = self.config.pos;
        let viewport = map_area.integer_size();
        let entity_offset = self.entity_offset(observer, zoom);

        if let Some(surface) = self.surfaces.terrain(zoom) {
            let clip = SurfaceRect::new(entity_offset.x, entity_offset.y,
                                        viewport.width, viewport.height);
            device.blit(surface, clip, map_area);
        }

        self.collector.collect(map, fog, entities, observer, self.config.visible_radius());

        let projection = self.projection;
        if let Some(surface) = self.surfaces.entities_mut(zoom) {
            surface.fill(Rgba8::TRANSPARENT);
            {
                let mut batch = PixelBatch::new(surface, None);
                for marker in self.collector.markers() {
                    let origin = projection.tile_to_pixel(marker.cell, zoom) - entity_offset;
                    projection.draw_block(&mut batch, origin, zoom,
                                          self.config.marker_color(marker.kind));
                }
            }
            device.blit(&*surface, SurfaceRect::whole_surface(viewport), map_area);
        }

        if self.compass.is_valid() {
            let size = device.image_size(self.compass).to_vec2();
            let pos = Vec2::new(map_area.max.x - size.x, map_area.min.y);
            device.draw_image(self.compass, Rect::from_pos_and_size(pos, size));
        }
    }

    // Terrain pixels for the window, written through the projection so
    // they land exactly where the entity overlay will place markers.
    fn redraw_terrain(&mut self,
                      map: &Map,
                      fog: &FogOfWar,
                      window: CellRange,
                      clip: Option<SurfaceRect>,
                      zoom: i32) {

        debug_assert!(!window.is_valid() || map.bounds().contains(window.start));
        debug_assert!(!window.is_valid() || map.bounds().contains(window.end));

        let projection = self.projection;
        let color_wall = self.config.color_wall;
        let color_obstacle = self.config.color_obstacle;

        let Some(surface) = self.surfaces.terrain_mut(zoom) else {
            return; // Allocation failed; this zoom level draws nothing.
        };

        let clip = clip.map(|rect| rect.clamped_to(surface.size()));
        let fog_enabled = fog.settings().mode.is_enabled();

        let mut batch = PixelBatch::new(surface, clip);

        for cell in &window {
            let collision = map.collision(cell);

            let color = if collision.blocks_all() {
                color_wall
            } else if collision.blocks_movement() {
                color_obstacle
            } else {
                continue;
            };

            // Concealed cells are skipped, never erased: pixels drawn
            // while the cell was uncovered stay on the surface.
            if fog_enabled && fog.grid().state(cell) == FowTile::Hidden {
                continue;
            }
            if color.is_transparent() {
                continue;
            }

            projection.draw_block(&mut batch, projection.tile_to_pixel(cell, zoom), zoom, color);
        }
    }

    // Top-left corner of the viewport window centered on the observer,
    // in surface pixels at the given zoom. Shared by terrain clipping
    // and entity placement so both layers stay aligned.
    fn entity_offset(&self, observer: &Observer, zoom: i32) -> PixelPoint {
        let viewport = self.config.pos.integer_size();
        let offset = self.projection.observer_offset(observer.cell());
        PixelPoint::new(
            (zoom * offset.x) - (viewport.width / 2),
            (zoom * offset.y) - (viewport.height / 2),
        )
    }

    fn observer_clip(&self, observer: &Observer, zoom: i32) -> SurfaceRect {
        let viewport = self.config.pos.integer_size();
        let offset = self.entity_offset(observer, zoom);
        SurfaceRect::new(offset.x, offset.y, viewport.width, viewport.height)
    }
}
