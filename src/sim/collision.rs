//! Collision detection and response
//!
//! Everything collides as circles: two bodies touch when their centers are
//! closer than [`COLLISION_FACTOR`] of their summed radii. Pairs are resolved
//! in a fixed order each frame; dead enemies are only marked here and
//! reaped afterwards by the destruction handler.

use glam::Vec2;

use super::ally;
use super::boss::{self, HitOutcome};
use super::destruction::game_over;
use super::state::{EnemyKind, GameState, ProjectileSource};
use crate::audio::SoundId;
use crate::consts::*;

/// Circle overlap test shared by every pair
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < (ra + rb) * COLLISION_FACTOR
}

const SPARK_COLOR: u32 = 0xffa500;

/// Resolve one frame of collisions
pub fn resolve_collisions(state: &mut GameState) {
    if state.is_game_over() {
        return;
    }

    if !state.god_mode && !state.player.destroyed {
        player_vs_enemies(state);
        if state.is_game_over() {
            return;
        }
        player_vs_enemy_projectiles(state);
        if state.is_game_over() {
            return;
        }
        player_vs_pickups(state);
    }

    shots_vs_echo(state);
    shots_vs_enemies(state);
}

fn player_vs_enemies(state: &mut GameState) {
    let (pos, size) = (state.player.pos, state.player.size);
    for i in 0..state.enemies.len() {
        let enemy = &state.enemies[i];
        if !enemy.is_alive() || !circles_overlap(pos, size, enemy.pos, enemy.size) {
            continue;
        }
        let enemy_pos = enemy.pos;

        if enemy.is_boss {
            state.player.shield_charges = 0;
            game_over(state, "Your shield was destroyed by the boss!");
            return;
        }
        if state.player.shield_charges == 0 {
            game_over(state, "You collided with an asteroid.");
            return;
        }

        state.player.shield_charges -= 1;
        state.enemies[i].health = 0.0;
        state.explode(enemy_pos, SHIELD_COLOR, 40);
        state.sound(SoundId::EnemyDefeated, 0.5);
        log::debug!("Shield absorbed a ram, {} left", state.player.shield_charges);
    }
}

fn player_vs_enemy_projectiles(state: &mut GameState) {
    let (pos, size) = (state.player.pos, state.player.size);
    let Some(index) = state
        .enemy_projectiles
        .iter()
        .position(|p| circles_overlap(pos, size, p.pos, p.size))
    else {
        return;
    };
    state.enemy_projectiles.remove(index);

    if state.player.shield_charges == 0 {
        game_over(state, "You were hit by a projectile.");
        return;
    }
    state.player.shield_charges -= 1;
    state.spawn_particles(pos, SHIELD_COLOR, 20);
    state.sound(SoundId::EnemyDefeated, 0.3);
}

fn player_vs_pickups(state: &mut GameState) {
    let (pos, size) = (state.player.pos, state.player.size);
    let before = state.pickups.len();
    state
        .pickups
        .retain(|p| !circles_overlap(pos, size, p.pos, p.size));
    for _ in state.pickups.len()..before {
        state.player.vent();
        state.spawn_particles(pos, COOLANT_COLOR, 15);
        state.status("Coolant acquired! Weapon Cooled.", true);
        state.sound(SoundId::AllyUpgraded, 0.5);
    }
}

fn shots_vs_echo(state: &mut GameState) {
    let Some(echo_index) = state
        .allies
        .iter()
        .position(|a| a.is_echo() && !a.retreating)
    else {
        return;
    };
    let (echo_pos, echo_size) = (state.allies[echo_index].pos, state.allies[echo_index].size);

    let mut i = 0;
    while i < state.projectiles.len() {
        let shot = &state.projectiles[i];
        if shot.source == ProjectileSource::Player
            && circles_overlap(shot.pos, shot.size, echo_pos, echo_size)
        {
            let shot = state.projectiles.remove(i);
            ally::refract(state, echo_index, &shot);
            continue;
        }
        i += 1;
    }
}

fn shots_vs_enemies(state: &mut GameState) {
    let player_pos = state.player.pos;
    let mut i = 0;
    'shots: while i < state.projectiles.len() {
        let (shot_pos, shot_size, damage) = {
            let shot = &state.projectiles[i];
            (shot.pos, shot.size, shot.damage)
        };

        for e in 0..state.enemies.len() {
            let enemy = &mut state.enemies[e];
            if enemy.destroyed || !circles_overlap(shot_pos, shot_size, enemy.pos, enemy.size) {
                continue;
            }

            // Dead but not yet reaped: the hull still stops the shot
            if !enemy.is_alive() {
                state.projectiles.remove(i);
                state.spawn_particles(shot_pos, SPARK_COLOR, 5);
                continue 'shots;
            }

            // Bulwark shield faces the player, who is almost always below
            let outcome = if enemy.kind == EnemyKind::Bulwark && player_pos.y > enemy.pos.y {
                HitOutcome::Deflected
            } else {
                boss::projectile_hit(enemy, shot_pos, shot_size, damage)
            };
            state.projectiles.remove(i);

            match outcome {
                HitOutcome::Deflected => {
                    state.spawn_particles(shot_pos, SHIELD_COLOR, 5);
                }
                HitOutcome::NodeHit { pos, broken } => {
                    state.spawn_particles(pos, SPARK_COLOR, if broken { 30 } else { 5 });
                }
                HitOutcome::Damaged { guarded } => {
                    let color = if guarded { 0xffffff } else { SPARK_COLOR };
                    state.spawn_particles(shot_pos, color, 5);
                }
            }
            continue 'shots;
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::{EnemySpawn, spawn_enemy};
    use crate::sim::state::{GameEvent, Pickup, Projectile};

    fn state() -> GameState {
        GameState::new(&Settings::default())
    }

    fn spawn_at(state: &mut GameState, kind: EnemyKind, pos: Vec2) -> u32 {
        spawn_enemy(
            state,
            EnemySpawn {
                kind,
                pos: Some(pos),
                ..Default::default()
            },
        )
    }

    fn player_shot(pos: Vec2) -> Projectile {
        Projectile::bolt(pos, Vec2::new(0.0, -8.0), 5.0, 1.0, ProjectileSource::Player)
    }

    fn game_over_reason(state: &GameState) -> Option<String> {
        state.events.iter().find_map(|e| match e {
            GameEvent::GameOver { reason, .. } => Some(reason.clone()),
            _ => None,
        })
    }

    #[test]
    fn test_overlap_uses_scaled_radii() {
        assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0));
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(16.0, 0.0), 10.0));
    }

    #[test]
    fn test_shield_absorbs_ram() {
        let mut state = state();
        state.player.shield_charges = 2;
        let pos = state.player.pos;
        let id = spawn_at(&mut state, EnemyKind::Standard, pos);
        resolve_collisions(&mut state);
        assert_eq!(state.player.shield_charges, 1);
        assert_eq!(state.enemy(id).map(|e| e.health), Some(0.0));
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_ram_explodes_at_the_enemy() {
        let mut state = state();
        state.player.shield_charges = 1;
        let at = state.player.pos + Vec2::new(6.0, -4.0);
        spawn_at(&mut state, EnemyKind::Standard, at);
        resolve_collisions(&mut state);
        let blast = state.events.iter().find_map(|e| match e {
            GameEvent::Explosion { pos, .. } => Some(*pos),
            _ => None,
        });
        assert_eq!(blast, Some(at));
    }

    #[test]
    fn test_ram_without_shield_ends_game() {
        let mut state = state();
        let pos = state.player.pos;
        spawn_at(&mut state, EnemyKind::Standard, pos);
        resolve_collisions(&mut state);
        assert!(state.is_game_over());
        assert_eq!(
            game_over_reason(&state).as_deref(),
            Some("You collided with an asteroid.")
        );
    }

    #[test]
    fn test_boss_ram_breaks_every_shield() {
        let mut state = state();
        state.player.shield_charges = 4;
        let pos = state.player.pos;
        spawn_at(&mut state, EnemyKind::Boss, pos);
        resolve_collisions(&mut state);
        assert_eq!(state.player.shield_charges, 0);
        assert_eq!(
            game_over_reason(&state).as_deref(),
            Some("Your shield was destroyed by the boss!")
        );
    }

    #[test]
    fn test_one_enemy_bolt_per_frame() {
        let mut state = state();
        state.player.shield_charges = 5;
        let pos = state.player.pos;
        for _ in 0..3 {
            state.enemy_projectiles.push(Projectile::bolt(
                pos,
                Vec2::ZERO,
                ENEMY_BOLT_SIZE,
                1.0,
                ProjectileSource::Enemy,
            ));
        }
        resolve_collisions(&mut state);
        assert_eq!(state.player.shield_charges, 4);
        assert_eq!(state.enemy_projectiles.len(), 2);
    }

    #[test]
    fn test_god_mode_ignores_player_hits() {
        let mut state = state();
        state.god_mode = true;
        let pos = state.player.pos;
        spawn_at(&mut state, EnemyKind::Boss, pos);
        resolve_collisions(&mut state);
        assert!(!state.is_game_over());
    }

    #[test]
    fn test_coolant_vents_weapon() {
        let mut state = state();
        state.player.heat = 80.0;
        state.player.overheat_timer = 1.0;
        let pos = state.player.pos;
        state.pickups.push(Pickup::coolant(pos));
        resolve_collisions(&mut state);
        assert!(state.pickups.is_empty());
        assert_eq!(state.player.heat, 0.0);
        assert!(!state.player.is_overheated());
    }

    #[test]
    fn test_shot_always_consumed() {
        let mut state = state();
        let id = spawn_at(&mut state, EnemyKind::Tanker, Vec2::new(200.0, 100.0));
        state.projectiles.push(player_shot(Vec2::new(200.0, 100.0)));
        resolve_collisions(&mut state);
        assert!(state.projectiles.is_empty());
        let tanker = state.enemy(id).expect("still alive");
        assert_eq!(tanker.health, tanker.max_health - 1.0);
    }

    #[test]
    fn test_bulwark_deflects_from_below() {
        let mut state = state();
        let id = spawn_at(&mut state, EnemyKind::Bulwark, Vec2::new(200.0, 100.0));
        state.projectiles.push(player_shot(Vec2::new(200.0, 100.0)));
        resolve_collisions(&mut state);
        assert!(state.projectiles.is_empty());
        let bulwark = state.enemy(id).expect("alive");
        assert_eq!(bulwark.health, bulwark.max_health);
    }

    #[test]
    fn test_multiple_hits_before_reap() {
        let mut state = state();
        let id = spawn_at(&mut state, EnemyKind::Brute, Vec2::new(200.0, 100.0));
        state.projectiles.push(player_shot(Vec2::new(200.0, 100.0)));
        state.projectiles.push(player_shot(Vec2::new(205.0, 100.0)));
        state.projectiles.push(player_shot(Vec2::new(195.0, 100.0)));
        resolve_collisions(&mut state);
        // Both hits land, the third stops on the wreck without overkill
        assert_eq!(state.enemy(id).map(|e| e.health), Some(0.0));
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_wreck_shields_enemies_behind_it() {
        let mut state = state();
        let front = spawn_at(&mut state, EnemyKind::Standard, Vec2::new(200.0, 100.0));
        let back = spawn_at(&mut state, EnemyKind::Brute, Vec2::new(200.0, 104.0));
        if let Some(enemy) = state.enemy_mut(front) {
            enemy.health = 0.0;
        }
        state.projectiles.push(player_shot(Vec2::new(200.0, 102.0)));
        resolve_collisions(&mut state);
        assert!(state.projectiles.is_empty());
        assert_eq!(state.enemy(front).map(|e| e.health), Some(0.0));
        let full = state.enemy(back).map(|e| e.health == e.max_health);
        assert_eq!(full, Some(true));
    }

    #[test]
    fn test_echo_refracts_player_shots() {
        let mut state = state();
        ally::spawn_echo(&mut state);
        let echo = state.allies.iter().find(|a| a.is_echo()).map(|a| a.pos);
        let pos = echo.expect("echo spawned");
        state.projectiles.push(player_shot(pos));
        resolve_collisions(&mut state);
        assert_eq!(state.projectiles.len(), 3);
        assert!(state
            .projectiles
            .iter()
            .all(|p| p.source == ProjectileSource::Echo && p.homing));
    }
}
