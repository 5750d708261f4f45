use super::*;

use std::any::Any;

use crate::{
    fog::{FogMode, FogSettings},
    map::{EventActivation, EventFlags, MapEvent, TileCollision},
    render::SoftwareDevice,
    utils::coords::Cell,
};

use super::markers::PixelMarker;
use super::projection::{Isometric, Orthogonal};

fn observer(x: f32, y: f32, sight_radius: f32) -> Observer {
    Observer::new(Vec2::new(x, y), sight_radius)
}

fn fog_with_mode(size: Size, mode: FogMode) -> FogOfWar {
    let settings = FogSettings { mode, ..Default::default() };
    FogOfWar::new(size, settings)
}

fn config_with_viewport(side: f32) -> MinimapConfig {
    MinimapConfig {
        pos: Rect::from_pos_and_size(Vec2::zero(), Vec2::new(side, side)),
        ..Default::default()
    }
}

// ----------------------------------------------
// Projection
// ----------------------------------------------

#[test]
fn orthogonal_projection_math() {
    let ortho = Orthogonal::new(Size::new(10, 10));

    assert_eq!(ortho.tile_to_pixel(Cell::new(3, 4), 1), PixelPoint::new(2, 3));
    assert_eq!(ortho.tile_to_pixel(Cell::new(3, 4), 2), PixelPoint::new(5, 7));
    assert_eq!(ortho.observer_offset(Cell::new(3, 4)), PixelPoint::new(3, 4));

    assert_eq!(ortho.surface_extent(1), Size::new(11, 11));
    assert_eq!(ortho.surface_extent(2), Size::new(24, 24));
}

#[test]
fn isometric_projection_math() {
    let iso = Isometric::new(Size::new(10, 10));

    // Axis shift of max(W,H) keeps every projected column positive.
    assert_eq!(iso.tile_to_pixel(Cell::new(3, 4), 1), PixelPoint::new(9, 6));
    assert_eq!(iso.tile_to_pixel(Cell::new(3, 4), 2), PixelPoint::new(18, 13));
    assert_eq!(iso.observer_offset(Cell::new(3, 4)), PixelPoint::new(9, 7));

    // Doubled extent for the diagonal span.
    assert_eq!(iso.surface_extent(1), Size::new(22, 22));
    assert_eq!(iso.surface_extent(2), Size::new(48, 48));

    // Corner cells stay on the surface.
    assert_eq!(iso.tile_to_pixel(Cell::new(0, 9), 1).x, 1);
    assert_eq!(iso.tile_to_pixel(Cell::new(9, 0), 1).x, 19);
}

#[test]
fn projections_round_trip() {
    let projections = [
        ProjectionKind::orthogonal(Size::new(12, 9)),
        ProjectionKind::isometric(Size::new(12, 9)),
    ];
    let cells = [
        Cell::zero(),
        Cell::new(3, 4),
        Cell::new(11, 8),
        Cell::new(0, 8),
        Cell::new(11, 0),
    ];

    for projection in &projections {
        for zoom in [1, 2] {
            for &cell in &cells {
                let pixel = projection.tile_to_pixel(cell, zoom);
                assert_eq!(projection.pixel_to_tile(pixel, zoom), cell,
                           "zoom {zoom}, cell {cell}");
            }
        }
    }
}

// The clip window and the entity overlay derive from the same observer
// offset, so the observer's own tile must land at the viewport center
// for every projection and zoom.
#[test]
fn observer_tile_lands_at_viewport_center() {
    const VIEWPORT: i32 = 50;

    let hero = Cell::new(7, 3);
    let ortho = ProjectionKind::orthogonal(Size::new(16, 16));
    let iso = ProjectionKind::isometric(Size::new(16, 16));

    for zoom in [1, 2] {
        for projection in [&ortho, &iso] {
            let offset = projection.observer_offset(hero);
            let clip_origin = PixelPoint::new(
                (zoom * offset.x) - VIEWPORT / 2,
                (zoom * offset.y) - VIEWPORT / 2,
            );
            let on_screen = projection.tile_to_pixel(hero, zoom) - clip_origin;

            // Within one pixel block of dead center (the fixed -1 offsets).
            assert!((on_screen.x - VIEWPORT / 2).abs() <= 1, "{on_screen}");
            assert!((on_screen.y - VIEWPORT / 2).abs() <= 1, "{on_screen}");
        }
    }
}

// ----------------------------------------------
// Marker collection
// ----------------------------------------------

#[test]
fn ally_within_radius_enemy_beyond_mask_yields_one_marker() {
    let map = Map::new(Size::new(20, 20));
    let fog = fog_with_mode(Size::new(20, 20), FogMode::Standard); // mask_radius = 8
    let obs = observer(10.0, 10.0, 3.0);

    let entities = [
        EntityState::ally(Vec2::new(12.0, 10.0), 10.0),
        EntityState::hostile(Vec2::new(19.0, 10.0), 10.0, true), // distance 9 > mask
    ];

    let mut collector = MarkerCollector::new();
    collector.collect(&map, &fog, &entities, &obs, 70.0);

    let entity_markers: Vec<_> = collector.markers().iter()
        .filter(|marker| marker.kind != MarkerKind::Hero)
        .collect();

    assert_eq!(entity_markers.len(), 1);
    assert_eq!(*entity_markers[0], PixelMarker::new(Cell::new(12, 10), MarkerKind::Ally));
}

#[test]
fn collection_order_is_deterministic() {
    let mut map = Map::new(Size::new(20, 20));
    map.add_event(MapEvent::npc_hotspot(Cell::new(11, 10)));
    map.add_event(MapEvent::intermap_teleport(
        CellRange::new(Cell::new(9, 9), Cell::new(9, 9)),
        EventActivation::OnTrigger,
    ));

    let mut fog = fog_with_mode(Size::new(20, 20), FogMode::Standard);
    let obs = observer(10.0, 10.0, 3.0);
    fog.update(&obs); // uncovers the teleport tile

    let entities = [
        EntityState::ally(Vec2::new(12.0, 10.0), 10.0),
        EntityState::hostile(Vec2::new(13.0, 10.0), 10.0, true),
    ];

    let mut collector = MarkerCollector::new();
    collector.collect(&map, &fog, &entities, &obs, 70.0);

    let kinds: Vec<_> = collector.markers().iter().map(|marker| marker.kind).collect();
    assert_eq!(kinds, [
        MarkerKind::Hero,
        MarkerKind::Npc,
        MarkerKind::Teleport,
        MarkerKind::Ally,
        MarkerKind::Enemy,
    ]);
}

#[test]
fn dead_idle_and_distant_entities_are_excluded() {
    let map = Map::new(Size::new(20, 20));
    let fog = fog_with_mode(Size::new(20, 20), FogMode::Off);
    let obs = observer(10.0, 10.0, 3.0);

    let entities = [
        EntityState::hostile(Vec2::new(11.0, 10.0), 0.0, true),   // dead
        EntityState::hostile(Vec2::new(11.0, 11.0), 10.0, false), // not in combat
        EntityState::ally(Vec2::new(18.0, 10.0), 10.0),           // beyond visible radius
    ];

    let mut collector = MarkerCollector::new();
    collector.collect(&map, &fog, &entities, &obs, 5.0);

    assert_eq!(collector.markers().len(), 1); // hero only
    assert_eq!(collector.markers()[0].kind, MarkerKind::Hero);
}

#[test]
fn teleport_markers_skip_fog_hidden_tiles() {
    let mut map = Map::new(Size::new(10, 10));
    map.add_event(MapEvent::intermap_teleport(
        CellRange::new(Cell::new(0, 0), Cell::new(1, 0)),
        EventActivation::OnInteract,
    ));

    let mut fog = fog_with_mode(Size::new(10, 10), FogMode::Standard);
    let obs = observer(2.5, 0.5, 2.0);
    fog.update(&obs); // (1,0) is sighted, (0,0) stays hidden

    assert_eq!(fog.grid().state(Cell::new(1, 0)), FowTile::Sighted);
    assert_eq!(fog.grid().state(Cell::new(0, 0)), FowTile::Hidden);

    let mut collector = MarkerCollector::new();
    collector.collect(&map, &fog, &[], &obs, 70.0);

    let teleports: Vec<_> = collector.markers().iter()
        .filter(|marker| marker.kind == MarkerKind::Teleport)
        .collect();

    assert_eq!(teleports.len(), 1);
    assert_eq!(teleports[0].cell, Cell::new(1, 0));
}

#[test]
fn inactive_and_unlisted_events_are_skipped() {
    let mut map = Map::new(Size::new(10, 10));

    let mut inactive = MapEvent::npc_hotspot(Cell::new(4, 5));
    inactive.flags.remove(EventFlags::Active);
    map.add_event(inactive);

    let mut unlisted = MapEvent::npc_hotspot(Cell::new(6, 5));
    unlisted.flags.remove(EventFlags::ShowOnMinimap);
    map.add_event(unlisted);

    let fog = fog_with_mode(Size::new(10, 10), FogMode::Off);
    let obs = observer(5.0, 5.0, 3.0);

    let mut collector = MarkerCollector::new();
    collector.collect(&map, &fog, &[], &obs, 70.0);

    assert_eq!(collector.markers().len(), 1); // hero only
}

// ----------------------------------------------
// Terrain rasterization
// ----------------------------------------------

#[test]
fn terrain_rasterizes_walls_and_obstacles() {
    let mut map = Map::new(Size::new(8, 8));
    map.set_collision(Cell::new(2, 2), TileCollision::Wall);
    map.set_collision(Cell::new(3, 2), TileCollision::Obstacle);

    let fog = fog_with_mode(Size::new(8, 8), FogMode::Off);
    let mut device = SoftwareDevice::new(Size::new(64, 64));
    let mut minimap = Minimap::new(config_with_viewport(20.0));

    minimap.prerender(&mut device, &map, &fog, ProjectionKind::orthogonal(map.size()));

    let config = *minimap.config();

    // 1x: one pixel per tile at (zoom*cell - 1).
    let terrain = minimap.surfaces.terrain(1).unwrap();
    assert_eq!(terrain.pixel_at(1, 1), config.color_wall);
    assert_eq!(terrain.pixel_at(2, 1), config.color_obstacle);
    assert_eq!(terrain.pixel_at(5, 5), Rgba8::TRANSPARENT);

    // 2x: a 2x2 block per tile.
    let terrain_2x = minimap.surfaces.terrain(2).unwrap();
    assert_eq!(terrain_2x.pixel_at(3, 3), config.color_wall);
    assert_eq!(terrain_2x.pixel_at(4, 4), config.color_wall);
    assert_eq!(terrain_2x.pixel_at(5, 3), config.color_obstacle);
}

#[test]
fn hidden_cells_are_suppressed_not_erased() {
    let mut map = Map::new(Size::new(8, 8));
    map.set_collision(Cell::new(2, 2), TileCollision::Wall);
    map.set_collision(Cell::new(6, 1), TileCollision::Wall);

    let mut fog = fog_with_mode(Size::new(8, 8), FogMode::Standard);
    let mut device = SoftwareDevice::new(Size::new(64, 64));
    let mut minimap = Minimap::new(config_with_viewport(20.0));

    // Everything is concealed at load: nothing rasterizes.
    minimap.prerender(&mut device, &map, &fog, ProjectionKind::orthogonal(map.size()));
    let wall_color = minimap.config().color_wall;
    assert_eq!(minimap.surfaces.terrain(1).unwrap().pixel_at(1, 1), Rgba8::TRANSPARENT);

    // Sighting (2,2) uncovers its wall; (6,1) stays concealed.
    let obs = observer(2.0, 2.0, 3.0);
    fog.update(&obs);
    let window = fog.take_dirty_window().expect("uncovering must flag a redraw");
    minimap.update(&map, &fog, window, &obs);

    assert_eq!(minimap.surfaces.terrain(1).unwrap().pixel_at(1, 1), wall_color);
    assert_eq!(minimap.surfaces.terrain(1).unwrap().pixel_at(5, 0), Rgba8::TRANSPARENT);

    // Relocating away decays (2,2) to Visited; its pixel must survive.
    let obs = observer(7.0, 7.0, 3.0);
    fog.handle_intramap_teleport(&obs);
    if let Some(window) = fog.take_dirty_window() {
        minimap.update(&map, &fog, window, &obs);
    }

    assert_eq!(minimap.surfaces.terrain(1).unwrap().pixel_at(1, 1), wall_color);
    assert_eq!(minimap.surfaces.terrain(1).unwrap().pixel_at(5, 0), Rgba8::TRANSPARENT);
}

// ----------------------------------------------
// Frame composition
// ----------------------------------------------

#[test]
fn render_composes_hero_marker_onto_display() {
    let map = Map::new(Size::new(16, 16));
    let fog = fog_with_mode(Size::new(16, 16), FogMode::Off);
    let mut device = SoftwareDevice::new(Size::new(64, 64));
    let mut minimap = Minimap::new(config_with_viewport(16.0));

    minimap.prerender(&mut device, &map, &fog, ProjectionKind::orthogonal(map.size()));

    let obs = observer(8.0, 8.0, 3.0);
    minimap.render(&mut device, &map, &fog, &[], &obs);

    // Hero block lands one pixel off viewport center (the fixed -1 offset).
    let hero_color = minimap.config().color_hero;
    assert_eq!(device.display().pixel_at(7, 7), hero_color);
}

#[test]
fn isometric_marker_draws_diamond_row() {
    let map = Map::new(Size::new(8, 8));
    let fog = fog_with_mode(Size::new(8, 8), FogMode::Off);
    let mut device = SoftwareDevice::new(Size::new(64, 64));
    let mut minimap = Minimap::new(config_with_viewport(16.0));

    minimap.prerender(&mut device, &map, &fog, ProjectionKind::isometric(map.size()));

    let obs = observer(4.0, 4.0, 3.0);
    minimap.render(&mut device, &map, &fog, &[], &obs);

    // Two columns at 1x zoom: the flattened diamond.
    let hero_color = minimap.config().color_hero;
    assert_eq!(device.display().pixel_at(8, 7), hero_color);
    assert_eq!(device.display().pixel_at(7, 7), hero_color);
    assert_eq!(device.display().pixel_at(6, 7), Rgba8::TRANSPARENT);
}

#[test]
fn entity_overlay_is_rebuilt_every_frame() {
    let map = Map::new(Size::new(16, 16));
    let fog = fog_with_mode(Size::new(16, 16), FogMode::Off);
    let mut device = SoftwareDevice::new(Size::new(64, 64));
    let mut minimap = Minimap::new(config_with_viewport(16.0));

    minimap.prerender(&mut device, &map, &fog, ProjectionKind::orthogonal(map.size()));

    let ally = [EntityState::ally(Vec2::new(9.0, 8.0), 10.0)];
    minimap.render(&mut device, &map, &fog, &ally, &observer(8.0, 8.0, 3.0));
    assert_eq!(device.display().pixel_at(8, 7), minimap.config().color_ally);

    // Next frame without the ally: its pixel must be gone.
    device.clear_display();
    minimap.render(&mut device, &map, &fog, &[], &observer(8.0, 8.0, 3.0));
    assert_eq!(device.display().pixel_at(8, 7), Rgba8::TRANSPARENT);
}

#[test]
fn hidden_display_mode_renders_nothing() {
    let map = Map::new(Size::new(16, 16));
    let fog = fog_with_mode(Size::new(16, 16), FogMode::Off);
    let mut device = SoftwareDevice::new(Size::new(32, 32));

    let mut config = config_with_viewport(16.0);
    config.mode = MinimapMode::Hidden;
    let mut minimap = Minimap::new(config);

    minimap.prerender(&mut device, &map, &fog, ProjectionKind::orthogonal(map.size()));
    minimap.render(&mut device, &map, &fog, &[], &observer(8.0, 8.0, 3.0));

    let display = device.display();
    for y in 0..32 {
        for x in 0..32 {
            assert_eq!(display.pixel_at(x, y), Rgba8::TRANSPARENT);
        }
    }
}

// ----------------------------------------------
// Degraded allocation
// ----------------------------------------------

// Device whose surface allocation always fails; every rasterizer
// operation must degrade to a silent no-op.
struct NullDevice;

impl RenderDevice for NullDevice {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn create_surface(&mut self, _label: &str, _size: Size) -> Option<Box<dyn PixelSurface>> {
        None
    }

    fn load_image(&mut self, _file_path: &str) -> ImageHandle {
        ImageHandle::invalid()
    }

    fn image_size(&self, _handle: ImageHandle) -> Size {
        Size::zero()
    }

    fn blit(&mut self, _surface: &dyn PixelSurface, _src_clip: SurfaceRect, _dest: Rect) {
        unreachable!("nothing should blit without surfaces");
    }

    fn draw_image(&mut self, _handle: ImageHandle, _dest: Rect) {
        unreachable!("no image was ever loaded");
    }

    fn display_size(&self) -> Size {
        Size::zero()
    }
}

#[test]
fn failed_surface_allocation_degrades_to_noop() {
    let mut map = Map::new(Size::new(8, 8));
    map.set_collision(Cell::new(2, 2), TileCollision::Wall);

    let mut fog = fog_with_mode(Size::new(8, 8), FogMode::Standard);
    let mut device = NullDevice;
    let mut minimap = Minimap::new(config_with_viewport(20.0));

    minimap.prerender(&mut device, &map, &fog, ProjectionKind::orthogonal(map.size()));

    let obs = observer(2.0, 2.0, 3.0);
    fog.update(&obs);
    if let Some(window) = fog.take_dirty_window() {
        minimap.update(&map, &fog, window, &obs);
    }
    minimap.render(&mut device, &map, &fog, &[], &obs);
}

// ----------------------------------------------
// Pixel batch scope
// ----------------------------------------------

#[test]
fn pixel_batch_honors_clip_and_reopens_after_drop() {
    use crate::render::{PixelBatch, SoftwareSurface};

    let mut surface = SoftwareSurface::new("test", Size::new(8, 8));

    {
        let mut batch = PixelBatch::new(&mut surface, Some(SurfaceRect::new(2, 2, 2, 2)));
        batch.draw_pixel(2, 2, Rgba8::WHITE);
        batch.draw_pixel(5, 5, Rgba8::WHITE); // outside the clip
    }

    assert_eq!(surface.pixel_at(2, 2), Rgba8::WHITE);
    assert_eq!(surface.pixel_at(5, 5), Rgba8::TRANSPARENT);

    // The guard closed the batch; a fresh unclipped one can open.
    {
        let mut batch = PixelBatch::new(&mut surface, None);
        batch.draw_pixel(5, 5, Rgba8::WHITE);
    }
    assert_eq!(surface.pixel_at(5, 5), Rgba8::WHITE);
}

// ----------------------------------------------
// Config
// ----------------------------------------------

#[test]
fn configs_round_trip_through_json() {
    let minimap_config = MinimapConfig {
        mode: MinimapMode::TwoX,
        color_wall: Rgba8::rgb(10, 20, 30),
        ..Default::default()
    };
    let json = serde_json::to_string(&minimap_config).unwrap();
    assert_eq!(serde_json::from_str::<MinimapConfig>(&json).unwrap(), minimap_config);

    let fog_settings = FogSettings {
        mode: FogMode::Overlay,
        mask_radius: 12.5,
        ..Default::default()
    };
    let json = serde_json::to_string(&fog_settings).unwrap();
    assert_eq!(serde_json::from_str::<FogSettings>(&json).unwrap(), fog_settings);
}
