//! Allied units: escort drones, the heavy laser and the echo companion

use glam::Vec2;

use super::boss;
use super::state::{
    Ally, AllyKind, DroneSide, GameEvent, GameState, LaserState, Projectile, ProjectileSource,
};
use crate::audio::SoundId;
use crate::consts::PLAYER_SIZE;
use crate::{direction_to, move_factor};

const DRONE_PROJECTILE_SIZE: f32 = 4.0;
const DRONE_PROJECTILE_DAMAGE: f32 = 1.0;
/// Half-angle between the two barrels of a double shot
const DRONE_SPREAD: f32 = std::f32::consts::PI / 18.0;
const RETREAT_SPEED: f32 = 1.0;
const LASER_BOTTOM_OFFSET: f32 = 70.0;
const ECHO_OFFSET: Vec2 = Vec2::new(50.0, -30.0);
const ECHO_FOLLOW_RATE: f32 = 2.0;
const ECHO_SIZE: f32 = 20.0;
/// Angle between refracted echo shots
const ECHO_FAN: f32 = 0.35;

fn drone_patrol_center(width: f32, side: DroneSide) -> f32 {
    match side {
        DroneSide::Left => width / 4.0,
        DroneSide::Right => width * 3.0 / 4.0,
    }
}

pub fn spawn_drones(state: &mut GameState) {
    for side in [DroneSide::Left, DroneSide::Right] {
        let ally = Ally {
            pos: Vec2::new(
                drone_patrol_center(state.width, side),
                state.height - crate::consts::PLAYER_BOTTOM_OFFSET,
            ),
            size: PLAYER_SIZE * 0.7,
            speed: RETREAT_SPEED,
            kind: AllyKind::Drone {
                side,
                fire_timer: 0.0,
            },
            stun_timer: 0.0,
            retreating: false,
        };
        state.allies.push(ally);
    }
    log::info!("Escort drones online");
}

pub fn spawn_laser(state: &mut GameState) {
    state.allies.push(Ally {
        pos: Vec2::new(state.width / 2.0, state.height - LASER_BOTTOM_OFFSET),
        size: PLAYER_SIZE * 2.0,
        speed: RETREAT_SPEED,
        kind: AllyKind::Laser(LaserState {
            firing: false,
            phase_timer: 0.0,
            beam_end: None,
        }),
        stun_timer: 0.0,
        retreating: false,
    });
    log::info!("Laser ally online");
}

pub fn spawn_echo(state: &mut GameState) {
    if state.has_echo() {
        return;
    }
    state.allies.push(Ally {
        pos: state.player.pos + ECHO_OFFSET,
        size: ECHO_SIZE,
        speed: RETREAT_SPEED,
        kind: AllyKind::Echo { pulse: 0.0 },
        stun_timer: 0.0,
        retreating: false,
    });
    log::info!("Echo ally online");
}

/// Drone fire cooldown for the current fire-rate level
pub fn drone_fire_cooldown(state: &GameState) -> f32 {
    let level = usize::from(state.upgrades.fire_rate).min(state.tuning.drone_fire_cooldowns.len() - 1);
    state.tuning.drone_fire_cooldowns[level]
}

/// Laser damage per second and cooldown for the current upgrade levels
pub fn laser_stats(state: &GameState) -> (f32, f32) {
    let tuning = &state.tuning;
    let dmg = usize::from(state.upgrades.laser_damage).min(tuning.laser_damage_levels.len() - 1);
    let cd = usize::from(state.upgrades.laser_cooldown).min(tuning.laser_cooldown_levels.len() - 1);
    (tuning.laser_damage_levels[dmg], tuning.laser_cooldown_levels[cd])
}

/// Order every ally off the field
pub fn retreat_all(state: &mut GameState) {
    for ally in &mut state.allies {
        ally.retreating = true;
    }
}

/// Preferred target: the final boss, then any boss, then `fallback`
fn boss_target(state: &GameState) -> Option<u32> {
    if state.is_final_boss_active {
        if let Some(id) = state.final_boss {
            return Some(id);
        }
    }
    if state.is_boss_active {
        return state.enemies.iter().find(|e| e.is_boss && e.is_alive()).map(|e| e.id);
    }
    None
}

fn drone_target(state: &GameState, pos: Vec2, side: DroneSide) -> Option<u32> {
    if let Some(id) = boss_target(state) {
        return Some(id);
    }
    let half = state.width / 2.0;
    state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .filter(|e| match side {
            DroneSide::Left => e.pos.x < half,
            DroneSide::Right => e.pos.x >= half,
        })
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| e.id)
}

fn laser_target(state: &GameState, pos: Vec2) -> Option<u32> {
    if state.is_final_boss_active {
        if let Some(id) = state.final_boss {
            return Some(id);
        }
    }
    state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|e| e.id)
}

/// Advance every ally by `dt`
pub fn update_allies(state: &mut GameState, dt: f32) {
    let mf = move_factor(dt);
    let mut allies = std::mem::take(&mut state.allies);

    for ally in &mut allies {
        if ally.retreating {
            ally.pos.y -= ally.speed * mf;
            if let AllyKind::Laser(laser) = &mut ally.kind {
                if laser.firing {
                    laser.firing = false;
                    laser.beam_end = None;
                    state.push_event(GameEvent::LoopStop {
                        id: SoundId::Lasering,
                    });
                }
            }
            continue;
        }

        if ally.stun_timer > 0.0 {
            ally.stun_timer = (ally.stun_timer - dt).max(0.0);
            if let AllyKind::Laser(laser) = &mut ally.kind {
                laser.beam_end = None;
            }
            continue;
        }

        match &mut ally.kind {
            AllyKind::Drone { side, fire_timer } => {
                let side = *side;
                let center = drone_patrol_center(state.width, side);
                let range = state.width / 5.0;
                ally.pos.x = center + (state.session_time * 1.25).sin() * (range / 2.0);
                ally.pos.y = state.height - crate::consts::PLAYER_BOTTOM_OFFSET;

                *fire_timer -= dt;
                if *fire_timer <= 0.0 && !state.is_game_over() {
                    if let Some(target) = drone_target(state, ally.pos, side) {
                        drone_shoot(state, ally.pos, target);
                    }
                    *fire_timer = drone_fire_cooldown(state);
                }
            }
            AllyKind::Laser(laser) => {
                ally.pos.x = state.width / 2.0;
                update_laser(state, ally.pos, laser, dt);
            }
            AllyKind::Echo { pulse } => {
                *pulse = (*pulse - 0.1 * mf).max(0.0);
                if !state.player.destroyed {
                    let target = state.player.pos + ECHO_OFFSET;
                    ally.pos.x += (target.x - ally.pos.x) * ECHO_FOLLOW_RATE * dt;
                    ally.pos.y = target.y;
                }
            }
        }
    }

    allies.retain(|a| a.pos.y >= -a.size * 2.0);
    state.allies = allies;
}

fn drone_shoot(state: &mut GameState, from: Vec2, target: u32) {
    let Some(target_pos) = state.enemy(target).map(|e| e.pos) else {
        return;
    };
    state.sound(SoundId::Shoot, 0.2);

    let mut speed = state.tuning.ally_shot_speed;
    if state.upgrades.has_faster_projectiles() {
        speed *= state.tuning.faster_projectile_multiplier;
    }
    let dir = direction_to(from, target_pos);
    if dir == Vec2::ZERO {
        return;
    }

    if state.upgrades.has_double_shot() {
        let angle = dir.y.atan2(dir.x);
        for offset in [-DRONE_SPREAD, DRONE_SPREAD] {
            let vel = Vec2::from_angle(angle + offset) * speed;
            state.projectiles.push(Projectile::bolt(
                from,
                vel,
                DRONE_PROJECTILE_SIZE,
                DRONE_PROJECTILE_DAMAGE,
                ProjectileSource::Ally,
            ));
        }
    } else {
        state.projectiles.push(Projectile::bolt(
            from,
            dir * speed,
            DRONE_PROJECTILE_SIZE,
            DRONE_PROJECTILE_DAMAGE,
            ProjectileSource::Ally,
        ));
    }
}

fn update_laser(state: &mut GameState, pos: Vec2, laser: &mut LaserState, dt: f32) {
    let (damage, cooldown) = laser_stats(state);

    laser.phase_timer -= dt;
    if laser.phase_timer <= 0.0 {
        if laser.firing {
            laser.firing = false;
            laser.beam_end = None;
            laser.phase_timer = cooldown;
            state.push_event(GameEvent::LoopStop {
                id: SoundId::Lasering,
            });
        } else {
            laser.firing = true;
            laser.phase_timer = state.tuning.laser_fire_duration;
            state.push_event(GameEvent::LoopStart {
                id: SoundId::Lasering,
                volume: 0.6,
            });
        }
    }

    if !laser.firing {
        return;
    }

    laser.beam_end = None;
    let Some(target) = laser_target(state, pos) else {
        return;
    };
    if let Some(enemy) = state.enemy_mut(target) {
        laser.beam_end = Some(boss::laser_damage(enemy, pos, damage * dt));
    }
}

/// Split one player shot into a homing fan at the echo
pub fn refract(state: &mut GameState, echo_index: usize, shot: &Projectile) {
    let Some(echo) = state.allies.get_mut(echo_index) else {
        return;
    };
    if let AllyKind::Echo { pulse } = &mut echo.kind {
        *pulse = 1.0;
    }
    let origin = echo.pos;
    let base = shot.vel.normalize_or(Vec2::NEG_Y);
    let speed = shot.vel.length().max(crate::consts::PLAYER_SHOT_SPEED);
    for i in -1..=1 {
        let vel = Vec2::from_angle(i as f32 * ECHO_FAN).rotate(base) * speed;
        state
            .projectiles
            .push(Projectile::homing(origin, vel, shot.size, shot.damage));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::enemy::{EnemySpawn, spawn_enemy};
    use crate::sim::state::EnemyKind;

    fn state() -> GameState {
        GameState::new(&Settings::default())
    }

    #[test]
    fn test_drone_cooldown_follows_fire_rate_level() {
        let mut state = state();
        assert_eq!(drone_fire_cooldown(&state), 0.5);
        state.upgrades.fire_rate = 5;
        assert_eq!(drone_fire_cooldown(&state), 0.3);
    }

    #[test]
    fn test_drone_fires_at_enemy_on_its_side() {
        let mut state = state();
        spawn_drones(&mut state);
        spawn_enemy(
            &mut state,
            EnemySpawn {
                kind: EnemyKind::Standard,
                pos: Some(Vec2::new(100.0, 100.0)),
                ..Default::default()
            },
        );
        update_allies(&mut state, 1.0 / 60.0);
        assert_eq!(state.projectiles.len(), 1);
        assert_eq!(state.projectiles[0].source, ProjectileSource::Ally);
        assert!(state.projectiles[0].vel.y < 0.0);
    }

    #[test]
    fn test_laser_duty_cycle() {
        let mut state = state();
        spawn_laser(&mut state);
        update_allies(&mut state, 0.1);
        assert!(matches!(
            state.allies[0].kind,
            AllyKind::Laser(LaserState { firing: true, .. })
        ));
        // 10 s of fire, then the cooldown
        for _ in 0..101 {
            update_allies(&mut state, 0.1);
        }
        assert!(matches!(
            state.allies[0].kind,
            AllyKind::Laser(LaserState { firing: false, .. })
        ));
        assert!(state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::LoopStop { id: SoundId::Lasering })));
    }

    #[test]
    fn test_laser_burns_nearest_enemy() {
        let mut state = state();
        spawn_laser(&mut state);
        let id = spawn_enemy(
            &mut state,
            EnemySpawn {
                kind: EnemyKind::Tanker,
                pos: Some(Vec2::new(400.0, 200.0)),
                ..Default::default()
            },
        );
        let before = state.enemy(id).map(|e| e.health).unwrap_or_default();
        update_allies(&mut state, 0.1);
        let after = state.enemy(id).map(|e| e.health).unwrap_or_default();
        assert!((before - after - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_stunned_ally_holds_fire() {
        let mut state = state();
        spawn_drones(&mut state);
        for ally in &mut state.allies {
            ally.stun_timer = 3.0;
        }
        spawn_enemy(
            &mut state,
            EnemySpawn {
                pos: Some(Vec2::new(100.0, 100.0)),
                ..Default::default()
            },
        );
        update_allies(&mut state, 0.5);
        assert!(state.projectiles.is_empty());
        assert!(state.allies.iter().all(|a| (a.stun_timer - 2.5).abs() < 1e-5));
    }

    #[test]
    fn test_retreating_allies_leave_and_are_pruned() {
        let mut state = state();
        spawn_drones(&mut state);
        retreat_all(&mut state);
        for _ in 0..40 {
            update_allies(&mut state, 0.25);
        }
        assert!(state.allies.is_empty());
    }

    #[test]
    fn test_refract_makes_three_homing_shots() {
        let mut state = state();
        spawn_echo(&mut state);
        let shot = Projectile::bolt(
            state.allies[0].pos,
            Vec2::new(0.0, -8.0),
            5.0,
            1.0,
            ProjectileSource::Player,
        );
        refract(&mut state, 0, &shot);
        assert_eq!(state.projectiles.len(), 3);
        assert!(state.projectiles.iter().all(|p| p.homing));
        assert!(matches!(state.allies[0].kind, AllyKind::Echo { pulse } if pulse == 1.0));
    }
}
