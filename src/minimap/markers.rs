use smallvec::SmallVec;
use strum_macros::{Display, EnumCount, EnumIter};

use crate::{
    fog::{FogOfWar, FowTile},
    map::{EventActivation, EventFlags, Map},
    utils::{coords::Cell, Vec2},
    world::{EntityState, Observer},
};

// ----------------------------------------------
// PixelMarker
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumCount, EnumIter)]
pub enum MarkerKind {
    Hero,
    Npc,
    Teleport,
    Ally,
    Enemy,
}

// One drawable point on the minimap entity overlay. Plain value; the
// color is resolved from the minimap config at draw time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelMarker {
    pub cell: Cell,
    pub kind: MarkerKind,
}

impl PixelMarker {
    #[inline]
    pub const fn new(cell: Cell, kind: MarkerKind) -> Self {
        Self { cell, kind }
    }
}

// ----------------------------------------------
// MarkerCollector
// ----------------------------------------------

const INLINE_MARKER_COUNT: usize = 32;

// Rebuilds the transient marker list every frame. The buffer is
// cleared, not deallocated, so steady-state frames allocate nothing.
#[derive(Default)]
pub struct MarkerCollector {
    markers: SmallVec<[PixelMarker; INLINE_MARKER_COUNT]>,
}

impl MarkerCollector {
    pub fn new() -> Self {
        Self { markers: SmallVec::new() }
    }

    #[inline]
    pub fn markers(&self) -> &[PixelMarker] {
        &self.markers
    }

    // Gathers this frame's markers in a fixed order: the observer
    // itself, then map events (NPC hotspots and intermap teleports, in
    // map order), then living entities (in world order). `visible_radius`
    // bounds every marker to the minimap viewport circle; the fog mask
    // radius additionally conceals NPCs and entities when fog is on.
    pub fn collect(&mut self,
                   map: &Map,
                   fog: &FogOfWar,
                   entities: &[EntityState],
                   observer: &Observer,
                   visible_radius: f32) {

        self.markers.clear();

        let fog_enabled = fog.settings().mode.is_enabled();
        let mask_radius = fog.settings().mask_radius;

        let hero_cell = observer.cell();
        if map.is_within_bounds(hero_cell) {
            self.markers.push(PixelMarker::new(hero_cell, MarkerKind::Hero));
        }

        for event in map.events() {
            if !event.shows_on_minimap() || !event.is_active() {
                continue;
            }

            if event.flags.contains(EventFlags::NpcHotspot) {
                if fog_enabled && observer.pos.distance(event.center) > mask_radius {
                    continue;
                }
                let cell = event.location.start;
                if observer.pos.distance(cell_center(cell)) <= visible_radius {
                    self.markers.push(PixelMarker::new(cell, MarkerKind::Npc));
                }
            }
            else if event.flags.contains(EventFlags::Intermap)
                 && matches!(event.activation, EventActivation::OnTrigger | EventActivation::OnInteract) {
                // One marker per covered tile, each suppressed
                // individually while its own tile is still fog-hidden.
                for cell in &event.location {
                    if !map.is_within_bounds(cell) {
                        continue;
                    }
                    if fog_enabled && fog.grid().state(cell) == FowTile::Hidden {
                        continue;
                    }
                    if observer.pos.distance(cell_center(cell)) <= visible_radius {
                        self.markers.push(PixelMarker::new(cell, MarkerKind::Teleport));
                    }
                }
            }
        }

        for entity in entities {
            if !entity.is_alive() {
                continue;
            }
            if fog_enabled && observer.pos.distance(entity.pos) > mask_radius {
                continue;
            }

            if entity.hero_ally {
                if observer.pos.distance(entity.pos) <= visible_radius {
                    self.markers.push(PixelMarker::new(entity.cell(), MarkerKind::Ally));
                }
            }
            else if entity.in_combat {
                if observer.pos.distance(entity.pos) <= visible_radius {
                    self.markers.push(PixelMarker::new(entity.cell(), MarkerKind::Enemy));
                }
            }
        }
    }
}

// Marker distance tests use the tile's integer coordinates as floats,
// matching the distance metric of the visibility updater.
#[inline]
fn cell_center(cell: Cell) -> Vec2 {
    Vec2::new(cell.x as f32, cell.y as f32)
}
