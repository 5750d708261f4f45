use bitflags::bitflags;
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::{
    bitflags_with_display,
    log,
    utils::{
        coords::{Cell, CellRange},
        Size,
        Vec2,
    },
};

// ----------------------------------------------
// TileCollision
// ----------------------------------------------

// Per-tile collision classification, decoded from the raw collision
// layer bytes of the map file. The `Hidden` variants behave the same
// for minimap purposes but are not revealed by the in-world renderer.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq,
         Display, EnumCount, EnumIter, TryFromPrimitive,
         Serialize, Deserialize)]
pub enum TileCollision {
    #[default]
    Passable = 0,
    Wall = 1,
    Obstacle = 2,
    WallHidden = 5,
    ObstacleHidden = 6,
}

impl TileCollision {
    // Walls and pits that fully block the tile.
    #[inline]
    pub fn blocks_all(self) -> bool {
        matches!(self, Self::Wall | Self::WallHidden)
    }

    // Small obstacles that block movement but not sight.
    #[inline]
    pub fn blocks_movement(self) -> bool {
        matches!(self, Self::Obstacle | Self::ObstacleHidden)
    }
}

// ----------------------------------------------
// MapEvent
// ----------------------------------------------

bitflags_with_display! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct EventFlags: u8 {
        const ShowOnMinimap = 1 << 0;
        const NpcHotspot    = 1 << 1;
        const Intermap      = 1 << 2;
        const Active        = 1 << 3;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum EventActivation {
    #[default]
    Static,
    OnTrigger,
    OnInteract,
}

// A spatial event placed on the map: NPC hotspots, intermap teleports
// and the like. Only the fields the minimap consumes are modeled here.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct MapEvent {
    pub location: CellRange, // Tiles covered by the event.
    pub center: Vec2,        // Continuous center, used for fog mask distance tests.
    pub activation: EventActivation,
    pub flags: EventFlags,
}

impl MapEvent {
    pub fn npc_hotspot(cell: Cell) -> Self {
        Self {
            location: CellRange::new(cell, cell),
            center: Vec2::new(cell.x as f32 + 0.5, cell.y as f32 + 0.5),
            activation: EventActivation::Static,
            flags: EventFlags::ShowOnMinimap | EventFlags::NpcHotspot | EventFlags::Active,
        }
    }

    pub fn intermap_teleport(location: CellRange, activation: EventActivation) -> Self {
        debug_assert!(location.is_valid());
        let center = Vec2::new(
            (location.start.x + location.end.x) as f32 * 0.5,
            (location.start.y + location.end.y) as f32 * 0.5,
        );
        Self {
            location,
            center,
            activation,
            flags: EventFlags::ShowOnMinimap | EventFlags::Intermap | EventFlags::Active,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.flags.contains(EventFlags::Active)
    }

    #[inline]
    pub fn shows_on_minimap(&self) -> bool {
        self.flags.contains(EventFlags::ShowOnMinimap)
    }
}

// ----------------------------------------------
// Map
// ----------------------------------------------

// Static map context consumed by the fog and minimap systems:
// grid dimensions, the collision layer and the spatial event list.
pub struct Map {
    size: Size,
    collision: Vec<TileCollision>,
    events: Vec<MapEvent>,
}

impl Map {
    pub fn new(size: Size) -> Self {
        debug_assert!(size.is_valid());
        let cell_count = (size.width * size.height).max(0) as usize;
        Self {
            size,
            collision: vec![TileCollision::Passable; cell_count],
            events: Vec::new(),
        }
    }

    // Builds the collision layer from raw map bytes. Bytes that do not
    // name a known collision kind decode as Passable.
    pub fn with_collision_bytes(size: Size, bytes: &[u8]) -> Self {
        let mut map = Self::new(size);
        debug_assert!(bytes.len() == map.collision.len());

        let mut unknown = 0;
        for (tile, &byte) in map.collision.iter_mut().zip(bytes) {
            *tile = TileCollision::try_from_primitive(byte).unwrap_or_else(|_| {
                unknown += 1;
                TileCollision::Passable
            });
        }

        if unknown != 0 {
            log::warn!(log::channel!("map"),
                       "{unknown} unknown collision bytes decoded as Passable.");
        }

        map
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn bounds(&self) -> CellRange {
        CellRange::whole_grid(self.size)
    }

    #[inline]
    pub fn is_within_bounds(&self, cell: Cell) -> bool {
        cell.is_within(self.size)
    }

    // Precondition: `cell` is within map bounds. Callers pre-clamp.
    #[inline]
    pub fn collision(&self, cell: Cell) -> TileCollision {
        debug_assert!(self.is_within_bounds(cell), "cell {cell} out of bounds {}", self.size);
        self.collision[self.cell_index(cell)]
    }

    #[inline]
    pub fn set_collision(&mut self, cell: Cell, collision: TileCollision) {
        debug_assert!(self.is_within_bounds(cell), "cell {cell} out of bounds {}", self.size);
        let index = self.cell_index(cell);
        self.collision[index] = collision;
    }

    #[inline]
    pub fn events(&self) -> &[MapEvent] {
        &self.events
    }

    pub fn add_event(&mut self, event: MapEvent) {
        self.events.push(event);
    }

    #[inline]
    fn cell_index(&self, cell: Cell) -> usize {
        (cell.x + (cell.y * self.size.width)) as usize
    }
}
