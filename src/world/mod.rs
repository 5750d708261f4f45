use serde::{Deserialize, Serialize};

use crate::utils::{coords::Cell, Vec2};

// ----------------------------------------------
// Observer
// ----------------------------------------------

// Snapshot of the fog-of-war observer (the player avatar): continuous
// map position plus sight radius, both in tile units. Passed explicitly
// into every update so the core never reaches for ambient game state.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Observer {
    pub pos: Vec2,
    pub sight_radius: f32,
}

impl Observer {
    #[inline]
    pub fn new(pos: Vec2, sight_radius: f32) -> Self {
        debug_assert!(sight_radius >= 0.0);
        Self { pos, sight_radius }
    }

    // Grid cell the observer currently stands on.
    #[inline]
    pub fn cell(&self) -> Cell {
        Cell::new(self.pos.x as i32, self.pos.y as i32)
    }
}

// ----------------------------------------------
// EntityState
// ----------------------------------------------

// Per-frame snapshot of one dynamic entity, as the minimap sees it.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityState {
    pub pos: Vec2,
    pub hp: f32,
    pub hero_ally: bool,
    pub in_combat: bool,
}

impl EntityState {
    pub fn ally(pos: Vec2, hp: f32) -> Self {
        Self { pos, hp, hero_ally: true, in_combat: false }
    }

    pub fn hostile(pos: Vec2, hp: f32, in_combat: bool) -> Self {
        Self { pos, hp, hero_ally: false, in_combat }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    #[inline]
    pub fn cell(&self) -> Cell {
        Cell::new(self.pos.x as i32, self.pos.y as i32)
    }
}
