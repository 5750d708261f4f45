use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::{
    log,
    utils::{
        coords::{Cell, CellRange},
        Rgba8,
        Size,
        Vec2,
    },
    world::Observer,
};


// ----------------------------------------------
// Constants
// ----------------------------------------------

// Cells beyond the sight radius included in every update window, so the
// soft-edge ring one cell outside the radius is always recomputed.
pub const SIGHT_MARGIN: i32 = 2;

// ----------------------------------------------
// FowTile
// ----------------------------------------------

// Visibility state of one map cell.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq,
         Display, EnumCount, EnumIter, Serialize, Deserialize)]
pub enum FowTile {
    Sighted = 0,    // Currently within the observer's sight radius.
    Visited,        // Previously sighted, now out of range.
    #[default]
    Hidden,         // Never sighted.
    HiddenBoundary, // Never sighted, but touching sighted/visited terrain.
}

impl FowTile {
    // Tiles the player has never uncovered.
    // HiddenBoundary is derived from Hidden every update pass and is
    // never produced by the distance comparison itself.
    #[inline]
    pub fn is_concealed(self) -> bool {
        matches!(self, Self::Hidden | Self::HiddenBoundary)
    }
}

// ----------------------------------------------
// FogMode
// ----------------------------------------------

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq,
         Display, EnumCount, EnumIter, Serialize, Deserialize)]
pub enum FogMode {
    Off,
    #[default]
    Standard,
    Overlay, // Standard masking plus soft-edge boundary shading.
}

impl FogMode {
    #[inline]
    pub fn is_enabled(self) -> bool {
        !matches!(self, Self::Off)
    }

    #[inline]
    pub fn has_soft_edges(self) -> bool {
        matches!(self, Self::Overlay)
    }
}

// ----------------------------------------------
// FogSettings
// ----------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FogSettings {
    pub mode: FogMode,
    // Fog masking distance for minimap markers, independent of the
    // observer's sight radius.
    pub mask_radius: f32,
    // Tint colors reported by the per-tile classification query.
    pub color_sight: Rgba8,
    pub color_visited: Rgba8,
    pub color_hidden: Rgba8,
}

impl Default for FogSettings {
    fn default() -> Self {
        Self {
            mode: FogMode::Standard,
            mask_radius: 8.0,
            color_sight: Rgba8::WHITE,
            color_visited: Rgba8::GRAY,
            color_hidden: Rgba8::BLACK,
        }
    }
}

// ----------------------------------------------
// FowGrid
// ----------------------------------------------

// Dense per-cell visibility storage for one map layer.
// Dimensions are fixed at construction and tied to the active map;
// every cell starts Hidden on map load.
pub struct FowGrid {
    size: Size,
    tiles: Vec<FowTile>,
}

impl FowGrid {
    pub fn new(size: Size) -> Self {
        debug_assert!(size.is_valid());
        let cell_count = (size.width * size.height).max(0) as usize;
        Self {
            size,
            tiles: vec![FowTile::Hidden; cell_count],
        }
    }

    // Map load: resize to the new map and conceal everything again.
    pub fn reset(&mut self, size: Size) {
        debug_assert!(size.is_valid());

        if size == self.size {
            self.tiles.fill(FowTile::Hidden);
            return; // No change in size.
        }

        self.tiles.clear();

        let cell_count = (size.width * size.height).max(0) as usize;
        self.tiles.resize(cell_count, FowTile::Hidden);
        self.size = size;
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.size
    }

    #[inline]
    pub fn is_within_bounds(&self, cell: Cell) -> bool {
        cell.is_within(self.size)
    }

    // Precondition: `cell` is within grid bounds. Callers pre-clamp.
    #[inline]
    pub fn state(&self, cell: Cell) -> FowTile {
        debug_assert!(self.is_within_bounds(cell), "cell {cell} out of bounds {}", self.size);
        self.tiles[self.cell_index(cell)]
    }

    #[inline]
    pub fn set_state(&mut self, cell: Cell, state: FowTile) {
        debug_assert!(self.is_within_bounds(cell), "cell {cell} out of bounds {}", self.size);
        let index = self.cell_index(cell);
        self.tiles[index] = state;
    }

    #[inline]
    fn cell_index(&self, cell: Cell) -> usize {
        (cell.x + (cell.y * self.size.width)) as usize
    }
}

// ----------------------------------------------
// FogOfWar
// ----------------------------------------------

// Incremental fog-of-war updater. Owns the visibility grid for the
// active map and recomputes the window of cells around the observer
// as it moves, flagging the minimap for a partial redraw whenever a
// concealed cell is uncovered.
pub struct FogOfWar {
    grid: FowGrid,
    settings: FogSettings,
    bounds: CellRange, // Window processed by the last update.
    minimap_dirty: bool,
}

impl FogOfWar {
    pub fn new(map_size: Size, settings: FogSettings) -> Self {
        log::info!(log::channel!("fog"),
                   "Fog of war layer created: {map_size} cells, mode {}.", settings.mode);
        Self {
            grid: FowGrid::new(map_size),
            settings,
            bounds: CellRange::default(),
            minimap_dirty: false,
        }
    }

    // Map load/unload boundary: conceal the whole grid again.
    pub fn reset(&mut self, map_size: Size) {
        self.grid.reset(map_size);
        self.bounds = CellRange::default();
        self.minimap_dirty = false;
        log::info!(log::channel!("fog"), "Fog of war layer reset: {map_size} cells.");
    }

    #[inline]
    pub fn grid(&self) -> &FowGrid {
        &self.grid
    }

    #[inline]
    pub fn settings(&self) -> &FogSettings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut FogSettings {
        &mut self.settings
    }

    // Window processed by the most recent update.
    #[inline]
    pub fn bounds(&self) -> CellRange {
        self.bounds
    }

    // Ordinary per-frame update: cells inside the sight radius become
    // Sighted, cells that fell out of range decay to Visited.
    pub fn update(&mut self, observer: &Observer) {
        if !self.settings.mode.is_enabled() {
            return;
        }
        self.calc_bounds(observer);
        self.update_tiles(observer, FowTile::Sighted);
    }

    // Instantaneous relocation within the same map: the observer never
    // traversed the intervening tiles, so the destination window is
    // uncovered directly as Visited instead of Sighted.
    pub fn handle_intramap_teleport(&mut self, observer: &Observer) {
        if !self.settings.mode.is_enabled() {
            return;
        }
        self.calc_bounds(observer);
        self.update_tiles(observer, FowTile::Visited);
    }

    // Hands the dirty window to the minimap rasterizer and clears the
    // flag. Returns None when no concealed cell changed since the last
    // call, so a consumer can skip the redraw entirely.
    pub fn take_dirty_window(&mut self) -> Option<CellRange> {
        if !self.minimap_dirty {
            return None;
        }
        self.minimap_dirty = false;
        Some(self.bounds)
    }

    // Fog classification of an arbitrary tile, for HUD widgets that
    // tint their own drawing (e.g. map tile color modulation).
    pub fn tile_color_mod(&self, cell: Cell) -> Rgba8 {
        match self.grid.state(cell) {
            FowTile::Visited | FowTile::HiddenBoundary => self.settings.color_visited,
            FowTile::Hidden => self.settings.color_hidden,
            FowTile::Sighted => self.settings.color_sight,
        }
    }

    fn calc_bounds(&mut self, observer: &Observer) {
        let map_size = self.grid.size();
        let sight = observer.sight_radius;

        let start = Cell::new(
            ((observer.pos.x - sight) as i32 - SIGHT_MARGIN).max(0),
            ((observer.pos.y - sight) as i32 - SIGHT_MARGIN).max(0),
        );
        // Exclusive upper corner, clamped to the map, then made inclusive.
        let end = Cell::new(
            ((observer.pos.x + sight) as i32 + SIGHT_MARGIN).min(map_size.width) - 1,
            ((observer.pos.y + sight) as i32 + SIGHT_MARGIN).min(map_size.height) - 1,
        );

        self.bounds = CellRange::new(start, end);
    }

    fn update_tiles(&mut self, observer: &Observer, sight_state: FowTile) {
        let bounds = self.bounds;
        if !bounds.is_valid() {
            return; // Observer is entirely off-map.
        }

        for cell in &bounds {
            let delta = Vec2::new(cell.x as f32, cell.y as f32).distance(observer.pos);
            let prev_state = self.grid.state(cell);

            if delta < observer.sight_radius {
                self.grid.set_state(cell, sight_state);
            } else if prev_state == FowTile::Sighted {
                self.grid.set_state(cell, FowTile::Visited);
            }
            // Hidden and Visited cells out of range keep their state.

            if prev_state.is_concealed() && prev_state != self.grid.state(cell) {
                self.minimap_dirty = true;
            }
        }

        if self.settings.mode.has_soft_edges() {
            self.shade_boundaries(bounds);
        }
    }

    // Single-pass soft-edge derivation: any Hidden cell with a sighted
    // or visited 8-neighbor becomes HiddenBoundary. Promoted cells are
    // never promotion sources themselves, so one pass is exact enough
    // and re-running it changes nothing.
    fn shade_boundaries(&mut self, bounds: CellRange) {
        let map_size = self.grid.size();

        for cell in &bounds {
            if self.grid.state(cell) != FowTile::Hidden {
                continue;
            }
            'neighbors: for i in (cell.x - 1)..=(cell.x + 1) {
                for j in (cell.y - 1)..=(cell.y + 1) {
                    let neighbor = Cell::new(i, j);
                    if !neighbor.is_within(map_size) {
                        continue;
                    }
                    match self.grid.state(neighbor) {
                        FowTile::Sighted | FowTile::Visited => {
                            self.grid.set_state(cell, FowTile::HiddenBoundary);
                            break 'neighbors;
                        }
                        _ => {}
                    }
                }
            }
        }
    }
}
