//! Per-frame simulation step
//!
//! Order is load-bearing: spawn, move everything, collide, reap, then
//! recompute HUD values and run progression checks.

use glam::Vec2;

use super::ally;
use super::collision::resolve_collisions;
use super::destruction::{game_over, reap};
use super::enemy::{enrage_partner, update_enemies};
use super::progression::check_score_unlocks;
use super::spawner::update_spawning;
use super::state::{EnemyKind, GameState, Hud, Projectile, ProjectileSource};
use crate::audio::SoundId;
use crate::consts::*;
use crate::{direction_to, move_factor};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub move_left: bool,
    pub move_right: bool,
    /// Trigger held
    pub fire: bool,
    /// Aim point (only honored once aim mode is unlocked)
    pub aim: Option<Vec2>,
    /// Demo mode - AI flies the ship
    pub autopilot: bool,
}

/// Fraction of knockback kept per reference frame
const KNOCKBACK_DECAY: f32 = 0.9;
const DOUBLE_SHOT_SPREAD: f32 = 7.0;
const AUTOPILOT_DANGER_RADIUS: f32 = 90.0;

/// Advance the world by `dt` seconds (clamped)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    state.session_time += dt;

    let input = if input.autopilot {
        autopilot(state)
    } else {
        input.clone()
    };

    if !state.is_game_over() {
        state.game_time += dt;
        update_spawning(state, dt);
    }

    update_player(state, &input, dt);
    ally::update_allies(state, dt);
    update_pickups(state, dt);
    update_projectiles(state, dt);
    update_enemies(state, dt);
    handle_escapes(state);
    update_effects(state, dt);

    if !state.is_game_over() {
        resolve_collisions(state);
        reap(state);
        refresh_hud(state);
        check_score_unlocks(state);
    }
}

/// Synthesize input for demo play: dodge bolts, chase the lowest enemy, fire
fn autopilot(state: &GameState) -> TickInput {
    let player = state.player.pos;
    let threat = state
        .enemy_projectiles
        .iter()
        .filter(|p| p.pos.y < player.y && p.pos.distance(player) < AUTOPILOT_DANGER_RADIUS)
        .min_by(|a, b| {
            a.pos
                .distance_squared(player)
                .partial_cmp(&b.pos.distance_squared(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let target_x = match threat {
        // Step away from the incoming bolt
        Some(bolt) if bolt.pos.x >= player.x => player.x - AUTOPILOT_DANGER_RADIUS,
        Some(_) => player.x + AUTOPILOT_DANGER_RADIUS,
        None => state
            .enemies
            .iter()
            .filter(|e| e.is_alive() && e.pos.y > 0.0)
            .max_by(|a, b| a.pos.y.partial_cmp(&b.pos.y).unwrap_or(std::cmp::Ordering::Equal))
            .map(|e| e.pos.x)
            .unwrap_or(state.width / 2.0),
    };

    let aim = state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(player)
                .partial_cmp(&b.pos.distance_squared(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| e.pos);

    let deadzone = state.player.speed;
    TickInput {
        move_left: target_x < player.x - deadzone,
        move_right: target_x > player.x + deadzone,
        fire: true,
        aim,
        autopilot: true,
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.player.destroyed {
        return;
    }
    let mf = move_factor(dt);
    let width = state.width;
    let can_fire = !state.is_game_over();
    let player = &mut state.player;

    let mut dir = 0.0;
    if input.move_left {
        dir -= 1.0;
    }
    if input.move_right {
        dir += 1.0;
    }
    player.pos.x += (dir * player.speed + player.knockback.x) * mf;
    player.pos.x = player.pos.x.clamp(player.size, width - player.size);
    player.knockback *= KNOCKBACK_DECAY.powf(mf);

    if player.overheat_timer > 0.0 {
        player.overheat_timer -= dt;
        if player.overheat_timer <= 0.0 {
            player.overheat_timer = 0.0;
            player.heat = 0.0;
        }
    } else if player.heat > 0.0 {
        player.heat = (player.heat - HEAT_DECAY_RATE * dt).max(0.0);
    }

    player.fire_timer = (player.fire_timer - dt).max(0.0);
    if can_fire && input.fire && player.fire_timer <= 0.0 && !player.is_overheated() {
        player.fire_timer = PLAYER_FIRE_INTERVAL;
        shoot(state, input.aim);
    }
}

fn shoot(state: &mut GameState, aim: Option<Vec2>) {
    state.add_player_heat(HEAT_PER_SHOT);
    state.sound(SoundId::Shoot, 0.5);

    let player = &state.player;
    let aimed = aim
        .filter(|_| state.aim_unlocked)
        .map(|target| direction_to(player.pos, target))
        .filter(|dir| *dir != Vec2::ZERO);
    let vel = match aimed {
        Some(dir) => dir * PLAYER_AIMED_SHOT_SPEED,
        None => Vec2::new(0.0, -PLAYER_SHOT_SPEED),
    };

    let shot = |pos: Vec2, vel: Vec2| {
        Projectile::bolt(
            pos,
            vel,
            player.projectile_size,
            player.projectile_damage,
            ProjectileSource::Player,
        )
    };
    let shots = if player.fire_rate >= 2 {
        if aimed.is_some() {
            vec![
                shot(player.pos, vel + Vec2::X),
                shot(player.pos, vel - Vec2::X),
            ]
        } else {
            vec![
                shot(player.pos - Vec2::X * DOUBLE_SHOT_SPREAD, vel),
                shot(player.pos + Vec2::X * DOUBLE_SHOT_SPREAD, vel),
            ]
        }
    } else {
        vec![shot(player.pos, vel)]
    };
    state.projectiles.extend(shots);
}

fn update_pickups(state: &mut GameState, dt: f32) {
    let mf = move_factor(dt);
    let height = state.height;
    for pickup in &mut state.pickups {
        pickup.pos += pickup.vel * mf;
    }
    state.pickups.retain(|p| p.pos.y <= height);
}

fn in_bounds(pos: Vec2, width: f32, height: f32) -> bool {
    pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= width && pos.y <= height
}

fn steer_homing(state: &GameState, shot: &mut Projectile, dt: f32) {
    let target_alive = shot
        .target
        .and_then(|id| state.enemy(id))
        .is_some_and(|e| e.is_alive());
    if !target_alive {
        shot.target = state
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| (e.id, e.pos.distance(shot.pos)))
            .filter(|(_, dist)| *dist < HOMING_RANGE)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id);
    }

    let Some(target) = shot.target.and_then(|id| state.enemy(id)) else {
        return;
    };
    let dir = direction_to(shot.pos, target.pos);
    if dir == Vec2::ZERO {
        return;
    }
    let desired = dir * HOMING_SPEED;
    shot.vel += (desired - shot.vel) * HOMING_TURN_RATE * dt;
    shot.vel = shot.vel.normalize_or(dir) * HOMING_SPEED;
}

fn update_projectiles(state: &mut GameState, dt: f32) {
    let mf = move_factor(dt);
    let (width, height) = (state.width, state.height);

    let mut shots = std::mem::take(&mut state.projectiles);
    for shot in &mut shots {
        if shot.homing {
            steer_homing(state, shot, dt);
        }
        shot.pos += shot.vel * mf;
        if let Some(life) = &mut shot.lifespan {
            *life -= dt;
        }
    }
    shots.retain(|p| !p.is_expired() && in_bounds(p.pos, width, height));
    state.projectiles = shots;

    for bolt in &mut state.enemy_projectiles {
        bolt.pos += bolt.vel * mf;
        if let Some(life) = &mut bolt.lifespan {
            *life -= dt;
        }
    }
    state
        .enemy_projectiles
        .retain(|p| !p.is_expired() && in_bounds(p.pos, width, height));
}

/// Enemies past the bottom edge leave silently; an escaped boss ends the run
fn handle_escapes(state: &mut GameState) {
    let height = state.height;
    let mut i = 0;
    while i < state.enemies.len() {
        let enemy = &state.enemies[i];
        if enemy.pos.y <= height + enemy.size {
            i += 1;
            continue;
        }
        let escaped = state.enemies.remove(i);
        enrage_partner(state, &escaped);

        if escaped.is_boss && escaped.kind != EnemyKind::FinalBoss {
            if !escaped.summoned {
                state.is_boss_active = false;
            }
            log::info!("{} {} escaped", escaped.kind.name(), escaped.id);
            game_over(state, "Boss escaped!");
            return;
        }
    }
}

fn update_effects(state: &mut GameState, dt: f32) {
    let mf = move_factor(dt);
    for particle in &mut state.particles {
        particle.pos += particle.vel * mf;
        particle.life -= dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    for beam in &mut state.beams {
        beam.life -= dt;
    }
    state.beams.retain(|b| b.life > 0.0);

    let shake = &mut state.screen_shake;
    shake.remaining = (shake.remaining - dt).max(0.0);
    if shake.remaining == 0.0 {
        shake.intensity = 0.0;
    }
    state.flash = (state.flash - dt).max(0.0);
}

/// Recompute the HUD-facing values
pub fn refresh_hud(state: &mut GameState) {
    let player = &state.player;
    state.hud = Hud {
        score: state.score,
        shield_charges: player.shield_charges,
        time_secs: state.game_time.max(0.0) as u32,
        void_mode: state.is_void_mode(),
        upgrade_points: state.upgrade_points,
        heat: if player.max_heat > 0.0 {
            (player.heat / player.max_heat).clamp(0.0, 1.0)
        } else {
            0.0
        },
        overheated: player.is_overheated(),
        heat_visible: state.aim_unlocked,
        final_boss_health: state
            .final_boss
            .filter(|_| state.is_final_boss_active)
            .and_then(|id| state.enemy(id))
            .map(|boss| boss.health_fraction()),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::{EnemySpawn, spawn_enemy};
    use crate::sim::state::{GameEvent, GamePhase};

    const DT: f32 = 1.0 / 60.0;

    fn state() -> GameState {
        GameState::new(&Settings::default())
    }

    fn fire() -> TickInput {
        TickInput {
            fire: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_time_advances_and_clamps() {
        let mut state = state();
        tick(&mut state, &TickInput::default(), 3.0);
        assert_eq!(state.game_time, MAX_FRAME_DT);
        assert_eq!(state.session_time, MAX_FRAME_DT);
    }

    #[test]
    fn test_player_moves_and_stays_inside() {
        let mut state = state();
        state.spawn_timer = 1000.0;
        let start = state.player.pos.x;
        let left = TickInput {
            move_left: true,
            ..Default::default()
        };
        tick(&mut state, &left, DT);
        assert!((state.player.pos.x - (start - PLAYER_SPEED)).abs() < 1e-3);
        for _ in 0..400 {
            tick(&mut state, &left, DT);
        }
        assert_eq!(state.player.pos.x, state.player.size);
    }

    #[test]
    fn test_fire_interval() {
        let mut state = state();
        state.spawn_timer = 100.0;
        tick(&mut state, &fire(), DT);
        assert_eq!(state.projectiles.len(), 1);
        tick(&mut state, &fire(), DT);
        assert_eq!(state.projectiles.len(), 1);
        for _ in 0..12 {
            tick(&mut state, &fire(), DT);
        }
        assert_eq!(state.projectiles.len(), 2);
    }

    #[test]
    fn test_double_shot_spread() {
        let mut state = state();
        state.spawn_timer = 100.0;
        state.player.fire_rate = 2;
        tick(&mut state, &fire(), DT);
        let xs: Vec<f32> = state.projectiles.iter().map(|p| p.pos.x).collect();
        assert_eq!(xs, vec![393.0, 407.0]);
    }

    #[test]
    fn test_aim_ignored_until_unlocked() {
        let mut state = state();
        state.spawn_timer = 100.0;
        let aimed = TickInput {
            fire: true,
            aim: Some(Vec2::new(0.0, 560.0)),
            ..Default::default()
        };
        tick(&mut state, &aimed, DT);
        assert_eq!(state.projectiles[0].vel, Vec2::new(0.0, -PLAYER_SHOT_SPEED));

        state.aim_unlocked = true;
        state.player.fire_timer = 0.0;
        state.projectiles.clear();
        tick(&mut state, &aimed, DT);
        let vel = state.projectiles[0].vel;
        assert!((vel.x + PLAYER_AIMED_SHOT_SPEED).abs() < 1e-4);
        assert!(state.player.heat > 0.0);
    }

    #[test]
    fn test_jam_blocks_fire_then_clears() {
        let mut state = state();
        state.spawn_timer = 100.0;
        state.aim_unlocked = true;
        state.player.heat = 95.0;
        tick(&mut state, &fire(), DT);
        assert!(state.player.is_overheated());
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::Status { text, .. } if text == "WEAPON JAMMED!")));

        state.projectiles.clear();
        for _ in 0..60 {
            tick(&mut state, &fire(), DT);
        }
        assert!(state.projectiles.is_empty());
        for _ in 0..70 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(!state.player.is_overheated());
        assert_eq!(state.player.heat, 0.0);
    }

    #[test]
    fn test_shots_pruned_off_screen() {
        let mut state = state();
        state.spawn_timer = 100.0;
        tick(&mut state, &fire(), DT);
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_mine_expires() {
        let mut state = state();
        state.spawn_timer = 1000.0;
        state.enemy_projectiles.push(Projectile::mine(Vec2::new(100.0, 100.0)));
        for _ in 0..40 {
            tick(&mut state, &TickInput::default(), MAX_FRAME_DT);
        }
        assert!(state.enemy_projectiles.is_empty());
    }

    #[test]
    fn test_escaped_enemy_removed_quietly() {
        let mut state = state();
        state.spawn_timer = 100.0;
        spawn_enemy(
            &mut state,
            EnemySpawn {
                kind: EnemyKind::Scout,
                pos: Some(Vec2::new(20.0, 700.0)),
                ..Default::default()
            },
        );
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.enemies.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_escaped_boss_ends_game() {
        let mut state = state();
        state.spawn_timer = 100.0;
        state.is_boss_active = true;
        spawn_enemy(
            &mut state,
            EnemySpawn {
                kind: EnemyKind::Boss,
                pos: Some(Vec2::new(20.0, 700.0)),
                ..Default::default()
            },
        );
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.is_game_over());
        assert!(!state.is_boss_active);
        assert!(state.events.iter().any(
            |e| matches!(e, GameEvent::GameOver { reason, .. } if reason == "Boss escaped!")
        ));
    }

    #[test]
    fn test_game_over_freezes_clock_and_spawns() {
        let mut state = state();
        game_over(&mut state, "test");
        let time = state.game_time;
        for _ in 0..100 {
            tick(&mut state, &fire(), MAX_FRAME_DT);
        }
        assert_eq!(state.game_time, time);
        assert!(state.enemies.is_empty());
        assert!(state.projectiles.is_empty());
    }

    #[test]
    fn test_hud_tracks_final_boss() {
        let mut state = state();
        state.game_time = 300.0;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.hud.final_boss_health, Some(1.0));
        assert_eq!(state.hud.time_secs, 300);
        assert!(!state.hud.heat_visible);
    }

    #[test]
    fn test_determinism() {
        let settings = Settings {
            seed: 99,
            ..Default::default()
        };
        let mut a = GameState::new(&settings);
        let mut b = GameState::new(&settings);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..1800 {
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.phase, b.phase);
    }

    #[test]
    fn test_autopilot_scores() {
        let mut state = state();
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..1800 {
            tick(&mut state, &input, DT);
        }
        assert!(state.score > 0);
    }
}
