//! Developer tooling
//!
//! Cheats run as [`StepHooks`] the clock calls around every step; world
//! shortcuts are plain functions over the state. Nothing here is reachable
//! from normal play unless the host wires it in.

use crate::error::GameError;
use crate::platform::StepHooks;
use crate::sim::ally;
use crate::sim::destruction::destroy_enemy;
use crate::sim::progression::{self, UpgradeAxis};
use crate::sim::spawner;
use crate::sim::state::{GameState, ProjectileSource};

/// Damage given to player shots in one-shot mode
pub const ONE_SHOT_DAMAGE: f32 = 999_999.0;

/// Toggleable cheats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DevTools {
    /// Multiplies the simulated step (re-clamped by the clock)
    pub time_scale: f32,
    pub god_mode: bool,
    /// Keeps the weapon permanently cool
    pub no_heat: bool,
    pub one_shot: bool,
}

impl Default for DevTools {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            god_mode: false,
            no_heat: false,
            one_shot: false,
        }
    }
}

impl StepHooks for DevTools {
    fn pre_step(&mut self, state: &mut GameState, dt: f32) -> f32 {
        state.god_mode = self.god_mode;
        if self.no_heat {
            state.player.vent();
        }
        dt * self.time_scale.max(0.0)
    }

    fn post_step(&mut self, state: &mut GameState, _dt: f32) {
        if self.no_heat {
            state.player.vent();
        }
        if self.one_shot {
            for shot in state
                .projectiles
                .iter_mut()
                .filter(|p| p.source == ProjectileSource::Player)
            {
                shot.damage = ONE_SHOT_DAMAGE;
            }
        }
    }
}

/// Destroy every enemy through the normal handler and clear enemy fire
pub fn kill_all(state: &mut GameState) -> usize {
    let mut destroyed = 0;
    // Splitters leave children behind; keep sweeping until the field is empty
    while state.enemies.iter().any(|e| !e.destroyed) {
        let ids: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        for id in ids {
            if let Some(enemy) = state.enemy_mut(id) {
                enemy.health = 0.0;
            }
            if destroy_enemy(state, id) {
                destroyed += 1;
            }
        }
    }
    state.enemy_projectiles.clear();
    log::info!("[dev] destroyed {} enemies", destroyed);
    destroyed
}

/// Jump the clock; the next regular boss follows a minute later
pub fn set_game_time(state: &mut GameState, secs: f32) {
    state.game_time = secs.max(0.0);
    state.next_boss_time = state.game_time + state.tuning.boss_period;
    log::info!("[dev] game time set to {:.1}s", state.game_time);
}

/// Summon the final boss now (no-op once it has been defeated)
pub fn summon_final_boss(state: &mut GameState) -> Option<u32> {
    if state.final_boss_defeated || state.final_boss.is_some() {
        return None;
    }
    Some(spawner::spawn_final_boss(state))
}

/// Fresh start of Void Mode, as if the final boss had just fallen
pub fn jump_to_void(state: &mut GameState) {
    state.final_boss_defeated = true;
    state.is_final_boss_active = false;
    state.final_boss = None;
    state.is_boss_active = false;
    state.aim_unlocked = true;
    state.enemies.clear();
    state.enemy_projectiles.clear();
    state.game_time = 0.0;
    ally::spawn_echo(state);
    state.status("[DEV] Void Mode", true);
    log::info!("[dev] jumped to void mode");
}

/// Void Mode right at the behemoth's arrival
pub fn jump_to_behemoth(state: &mut GameState) {
    jump_to_void(state);
    state.extended.behemoth_spawned = false;
    state.game_time = state.tuning.behemoth_spawn;
}

/// Void Mode right at the monolith's arrival
pub fn jump_to_monolith(state: &mut GameState) {
    jump_to_void(state);
    state.extended.behemoth_spawned = true;
    state.extended.behemoth_defeated = true;
    state.extended.monolith_spawned = false;
    state.game_time = state.tuning.monolith_spawn;
}

/// Unlock every ally and max every axis
pub fn max_upgrades(state: &mut GameState) {
    if !state.unlocks.drones {
        state.unlocks.drones = true;
        ally::spawn_drones(state);
    }
    if !state.unlocks.laser {
        state.unlocks.laser = true;
        ally::spawn_laser(state);
    }
    for axis in UpgradeAxis::ALL {
        while state.upgrades.level(axis) < axis.cap() {
            state.upgrade_points += axis.cost();
            if progression::purchase(state, axis).is_err() {
                break;
            }
        }
    }
    log::info!("[dev] upgrades maxed: {:?}", state.upgrades);
}

pub fn set_shields(state: &mut GameState, charges: u32) {
    state.player.shield_charges = charges;
}

/// Pretty JSON snapshot of the whole world
pub fn dump_state(state: &GameState) -> Result<String, GameError> {
    Ok(serde_json::to_string_pretty(state)?)
}
