//! Enemy construction and per-kind behavior

use glam::Vec2;

use super::boss::{self, BehemothBrain, FinalBossBrain, MonolithBrain};
use super::state::{
    Beam, Behavior, Enemy, EnemyKind, GameEvent, GameState, LinkState, Projectile,
    ProjectileSource,
};
use crate::audio::SoundId;
use crate::consts::*;
use crate::{direction_to, move_factor};

const SHAPE_SIDES: usize = 8;
const TELEPORT_INTERVAL: f32 = 3.0;
const TELEPORT_MARGIN: f32 = 50.0;
const ORBIT_RADIUS: f32 = 150.0;
const ORBIT_BAND: f32 = 50.0;
/// Radians per reference frame
const ORBIT_SPEED: f32 = 0.05;
const WEAVE_AMPLITUDE: f32 = 100.0;
const WEAVE_RATE: f32 = 0.05;
/// Per reference frame
const MINE_DROP_CHANCE: f32 = 0.01;
const SIZZLER_AURA_RADIUS: f32 = 140.0;
/// Heat per second inside the aura
const SIZZLER_HEAT_RATE: f32 = 15.0;
const JUGGLER_KEEP_DISTANCE: f32 = 180.0;
const JUGGLER_DEADZONE: f32 = 10.0;
const JUGGLER_PUSH_RADIUS: f32 = 150.0;
/// Per reference frame
const JUGGLER_PUSH_CHANCE: f32 = 0.02;
const JUGGLER_PUSH_IMPULSE: f32 = 6.0;
const ANCHOR_ORBIT_RADIUS: f32 = 70.0;
const STUN_INTERVAL: f32 = 4.0;
const STUN_DURATION: f32 = 3.0;
const STUN_BEAM_LIFE: f32 = 0.3;
/// Fraction of enraged speed used to drift toward the player's x
const ENRAGE_HOMING_BIAS: f32 = 0.25;
const SPAWN_Y: f32 = -50.0;

/// Everything needed to place one enemy; unset fields come from the stat table
#[derive(Debug, Clone, Default)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Option<Vec2>,
    pub size: Option<f32>,
    /// Replaces the computed health (no multipliers)
    pub health: Option<f32>,
    pub elite: bool,
    pub summoned: bool,
}

/// Health after the time, void and elite multipliers, in that order
pub fn stacked_health(state: &GameState, base: f32, elite: bool) -> f32 {
    let tuning = &state.tuning;
    let mut health = base;
    if state.game_time >= tuning.health_time_threshold {
        health *= tuning.time_health_multiplier;
    }
    if state.is_void_mode() {
        health *= tuning.void_health_multiplier;
    }
    if elite {
        health *= tuning.elite_health_multiplier;
    }
    health
}

fn random_shape(state: &mut GameState, size: f32) -> Vec<Vec2> {
    (0..SHAPE_SIDES)
        .map(|i| {
            let angle = i as f32 / SHAPE_SIDES as f32 * std::f32::consts::TAU;
            let radius = size * (0.85 + state.roll() * 0.3);
            Vec2::from_angle(angle) * radius
        })
        .collect()
}

/// Insert an enemy; returns its id
pub fn spawn_enemy(state: &mut GameState, spawn: EnemySpawn) -> u32 {
    let kind = spawn.kind;
    let stats = *state.tuning.enemies.get(kind);
    let id = state.next_entity_id();

    let size = spawn
        .size
        .unwrap_or_else(|| stats.size + state.roll() * stats.size_jitter);
    let speed = stats.speed + state.roll() * stats.speed_jitter;
    let health = spawn
        .health
        .unwrap_or_else(|| stacked_health(state, stats.health, spawn.elite));

    let pos = match (spawn.pos, kind) {
        (Some(pos), _) => pos,
        (None, EnemyKind::FinalBoss | EnemyKind::Behemoth | EnemyKind::Monolith) => {
            Vec2::new(state.width / 2.0, -size)
        }
        (None, _) => Vec2::new(state.roll() * state.width, SPAWN_Y),
    };

    let vx = match kind {
        EnemyKind::Shard => (state.roll() - 0.5) * 2.0,
        EnemyKind::Seeker => direction_to(pos, state.player.pos).x * 2.0,
        EnemyKind::FinalBoss => speed,
        _ => 0.0,
    };

    let behavior = match kind {
        EnemyKind::Seeker => Behavior::Seeker,
        EnemyKind::Teleporter => Behavior::Teleporter {
            teleport_timer: TELEPORT_INTERVAL,
        },
        EnemyKind::Orbiter => Behavior::Orbiter {
            angle: 0.0,
            orbiting: false,
        },
        EnemyKind::Weaver => Behavior::Weaver {
            base_x: pos.x,
            phase: 0.0,
        },
        EnemyKind::Bulwark => Behavior::Bulwark,
        EnemyKind::Sizzler => Behavior::Sizzler,
        EnemyKind::Juggler => Behavior::Juggler,
        EnemyKind::Anchor => Behavior::Anchor {
            ward: None,
            angle: 0.0,
        },
        EnemyKind::Stunner => Behavior::Stunner {
            stun_timer: STUN_INTERVAL,
        },
        EnemyKind::FinalBoss => Behavior::FinalBoss(FinalBossBrain::new()),
        EnemyKind::Behemoth => Behavior::Behemoth(BehemothBrain::new()),
        EnemyKind::Monolith => Behavior::Monolith(MonolithBrain::new(size)),
        _ => Behavior::Drift,
    };

    let shape = random_shape(state, size);
    state.enemies.push(Enemy {
        id,
        kind,
        pos,
        vx,
        speed,
        size,
        health,
        max_health: health,
        color: stats.color,
        shape,
        is_boss: kind.is_boss_kind(),
        elite: spawn.elite,
        link: LinkState::Unlinked,
        protected_by: None,
        summoned: spawn.summoned,
        fire_timer: kind.fire_cooldown().unwrap_or(0.0),
        behavior,
        destroyed: false,
    });
    id
}

/// Spawn two bonded copies of `kind` side by side
pub fn spawn_linked_pair(state: &mut GameState, kind: EnemyKind, elite: bool) -> (u32, u32) {
    let x = TELEPORT_MARGIN + state.roll() * (state.width - TELEPORT_MARGIN * 2.0);
    let a = spawn_enemy(
        state,
        EnemySpawn {
            kind,
            pos: Some(Vec2::new(x - 30.0, SPAWN_Y)),
            elite,
            ..Default::default()
        },
    );
    let b = spawn_enemy(
        state,
        EnemySpawn {
            kind,
            pos: Some(Vec2::new(x + 30.0, SPAWN_Y)),
            elite,
            ..Default::default()
        },
    );
    if let Some(enemy) = state.enemy_mut(a) {
        enemy.link = LinkState::Linked { partner: b };
    }
    if let Some(enemy) = state.enemy_mut(b) {
        enemy.link = LinkState::Linked { partner: a };
    }
    (a, b)
}

/// Minion table used by boss summons
pub fn random_minion_kind(state: &mut GameState) -> EnemyKind {
    let r = state.roll();
    if r < 0.1 {
        EnemyKind::Scout
    } else if r < 0.2 {
        EnemyKind::Brute
    } else if r < 0.3 {
        EnemyKind::Shard
    } else if r < 0.35 {
        EnemyKind::Shooter
    } else if r < 0.45 {
        EnemyKind::Splitter
    } else {
        EnemyKind::Standard
    }
}

/// Enrage whoever was bonded to `gone`
pub fn enrage_partner(state: &mut GameState, gone: &Enemy) {
    let LinkState::Linked { partner } = gone.link else {
        return;
    };
    let multiplier = state.tuning.enrage_speed_multiplier;
    if let Some(survivor) = state.enemy_mut(partner) {
        if survivor.link == (LinkState::Linked { partner: gone.id }) {
            survivor.link = LinkState::Enraged;
            survivor.speed *= multiplier;
            log::debug!("{} {} enraged", survivor.kind.name(), survivor.id);
        }
    }
}

/// Position snapshot used for cross-enemy targeting within one update
#[derive(Debug, Clone, Copy)]
struct RosterEntry {
    id: u32,
    kind: EnemyKind,
    pos: Vec2,
}

/// Advance every enemy by `dt`
pub fn update_enemies(state: &mut GameState, dt: f32) {
    let mut enemies = std::mem::take(&mut state.enemies);
    let roster: Vec<RosterEntry> = enemies
        .iter()
        .filter(|e| e.is_alive())
        .map(|e| RosterEntry {
            id: e.id,
            kind: e.kind,
            pos: e.pos,
        })
        .collect();
    let mut claimed: Vec<u32> = enemies
        .iter()
        .filter_map(|e| match e.behavior {
            Behavior::Anchor { ward, .. } => ward,
            _ => None,
        })
        .collect();

    for enemy in &mut enemies {
        update_enemy(state, enemy, &roster, &mut claimed, dt);
    }

    // Anything summoned during the pass landed in the (emptied) live list
    let summoned = std::mem::replace(&mut state.enemies, enemies);
    state.enemies.extend(summoned);

    refresh_anchor_protection(state);
}

/// Recompute `protected_by` from the anchors' current wards
pub fn refresh_anchor_protection(state: &mut GameState) {
    let guards: Vec<(u32, u32)> = state
        .enemies
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| match e.behavior {
            Behavior::Anchor { ward: Some(ward), .. } => Some((ward, e.id)),
            _ => None,
        })
        .collect();
    for enemy in &mut state.enemies {
        enemy.protected_by = guards
            .iter()
            .find(|(ward, _)| *ward == enemy.id)
            .map(|(_, anchor)| *anchor);
    }
}

fn player_target(state: &GameState) -> Option<Vec2> {
    (!state.player.destroyed).then_some(state.player.pos)
}

fn bounce_drift(enemy: &mut Enemy, width: f32, mf: f32) {
    enemy.pos.y += enemy.speed * mf;
    enemy.pos.x += enemy.vx * mf;
    if enemy.pos.x < enemy.size || enemy.pos.x > width - enemy.size {
        enemy.vx = -enemy.vx;
    }
}

fn update_enemy(
    state: &mut GameState,
    enemy: &mut Enemy,
    roster: &[RosterEntry],
    claimed: &mut Vec<u32>,
    dt: f32,
) {
    let mf = move_factor(dt);
    let player = player_target(state);

    if enemy.link == LinkState::Enraged {
        enemy.pos.y += enemy.speed * mf;
        if let Some(target) = player {
            let dx = target.x - enemy.pos.x;
            let step = enemy.speed * ENRAGE_HOMING_BIAS * mf;
            enemy.pos.x += dx.clamp(-step, step);
        }
        fire_aimed_bolt(state, enemy, dt);
        return;
    }

    match &mut enemy.behavior {
        Behavior::Drift | Behavior::Bulwark => bounce_drift(enemy, state.width, mf),
        Behavior::Seeker => match player {
            Some(target) => {
                enemy.pos += direction_to(enemy.pos, target) * enemy.speed * mf;
            }
            None => enemy.pos.y += enemy.speed * mf,
        },
        Behavior::Teleporter { teleport_timer } => {
            enemy.pos.y += enemy.speed * mf;
            *teleport_timer -= dt;
            if *teleport_timer <= 0.0 {
                *teleport_timer = TELEPORT_INTERVAL;
                let x = TELEPORT_MARGIN + state.roll() * (state.width - TELEPORT_MARGIN * 2.0);
                let y = state.roll() * (state.height / 2.0);
                enemy.pos = Vec2::new(x, y);
                state.spawn_particles(enemy.pos, enemy.color, 10);
                state.sound(SoundId::EnemyShoot, 0.2);
                log::debug!("Teleporter {} blinked to ({:.0}, {:.0})", enemy.id, x, y);
            }
        }
        Behavior::Orbiter { angle, orbiting } => match player {
            Some(target) => {
                let dist = enemy.pos.distance(target);
                let in_band = (dist - ORBIT_RADIUS).abs() < ORBIT_BAND;
                if in_band && !*orbiting {
                    let offset = enemy.pos - target;
                    *angle = offset.y.atan2(offset.x);
                }
                *orbiting = in_band;
                if *orbiting {
                    *angle += ORBIT_SPEED * mf;
                    enemy.pos = target + Vec2::from_angle(*angle) * ORBIT_RADIUS;
                } else {
                    enemy.pos.y += enemy.speed * mf;
                    enemy.pos.x += direction_to(enemy.pos, target).x * enemy.speed * mf;
                }
            }
            None => {
                *orbiting = false;
                enemy.pos.y += enemy.speed * mf;
            }
        },
        Behavior::Weaver { base_x, phase } => {
            *phase += WEAVE_RATE * mf;
            enemy.pos.y += enemy.speed * mf;
            enemy.pos.x = *base_x + phase.sin() * WEAVE_AMPLITUDE;
            if state.roll() < MINE_DROP_CHANCE * mf {
                state.enemy_projectiles.push(Projectile::mine(enemy.pos));
            }
        }
        Behavior::Sizzler => {
            enemy.pos.y += enemy.speed * mf;
            if let Some(target) = player {
                if enemy.pos.distance(target) < SIZZLER_AURA_RADIUS {
                    state.add_player_heat(SIZZLER_HEAT_RATE * dt);
                }
            }
        }
        Behavior::Juggler => match player {
            Some(target) => {
                let dist = enemy.pos.distance(target);
                let dir = direction_to(enemy.pos, target);
                if dist > JUGGLER_KEEP_DISTANCE + JUGGLER_DEADZONE {
                    enemy.pos += dir * enemy.speed * mf;
                } else if dist < JUGGLER_KEEP_DISTANCE - JUGGLER_DEADZONE {
                    enemy.pos -= dir * enemy.speed * mf;
                }
                enemy.pos.x = enemy.pos.x.clamp(enemy.size, state.width - enemy.size);
                if dist < JUGGLER_PUSH_RADIUS && state.roll() < JUGGLER_PUSH_CHANCE * mf {
                    let sign = if state.roll() < 0.5 { -1.0 } else { 1.0 };
                    state.player.knockback.x += sign * JUGGLER_PUSH_IMPULSE;
                    state.spawn_particles(target, enemy.color, 8);
                }
            }
            None => enemy.pos.y += enemy.speed * mf,
        },
        Behavior::Anchor { ward, angle } => {
            let ward_pos = ward.and_then(|w| roster.iter().find(|r| r.id == w).map(|r| r.pos));
            let ward_pos = match ward_pos {
                Some(pos) => Some(pos),
                None => {
                    // Old ward is gone; look for a new unguarded heavy
                    if let Some(old) = ward.take() {
                        claimed.retain(|&c| c != old);
                    }
                    let next = roster
                        .iter()
                        .filter(|r| r.kind.is_protectable() && !claimed.contains(&r.id))
                        .min_by(|a, b| {
                            a.pos
                                .distance_squared(enemy.pos)
                                .partial_cmp(&b.pos.distance_squared(enemy.pos))
                                .unwrap_or(std::cmp::Ordering::Equal)
                        })
                        .copied();
                    next.map(|r| {
                        *ward = Some(r.id);
                        claimed.push(r.id);
                        log::debug!("Anchor {} guarding {} {}", enemy.id, r.kind.name(), r.id);
                        r.pos
                    })
                }
            };
            match ward_pos {
                Some(center) => {
                    let dist = enemy.pos.distance(center);
                    if dist > ANCHOR_ORBIT_RADIUS + JUGGLER_DEADZONE {
                        enemy.pos += direction_to(enemy.pos, center) * enemy.speed * mf;
                        let offset = enemy.pos - center;
                        *angle = offset.y.atan2(offset.x);
                    } else {
                        *angle += ORBIT_SPEED * mf;
                        enemy.pos = center + Vec2::from_angle(*angle) * ANCHOR_ORBIT_RADIUS;
                    }
                }
                None => enemy.pos.y += enemy.speed * mf,
            }
        }
        Behavior::Stunner { stun_timer } => {
            enemy.pos.y += enemy.speed * mf;
            *stun_timer -= dt;
            if *stun_timer <= 0.0 {
                *stun_timer = STUN_INTERVAL;
                stun_random_ally(state, enemy.pos);
            }
        }
        Behavior::FinalBoss(_) => boss::update_final_boss(state, enemy, dt),
        Behavior::Behemoth(_) => boss::update_behemoth(state, enemy, dt),
        Behavior::Monolith(_) => boss::update_monolith(state, enemy, dt),
    }

    fire_aimed_bolt(state, enemy, dt);
}

fn stun_random_ally(state: &mut GameState, from: Vec2) {
    let candidates: Vec<usize> = state
        .allies
        .iter()
        .enumerate()
        .filter(|(_, a)| !a.retreating && !a.is_stunned())
        .map(|(i, _)| i)
        .collect();
    if candidates.is_empty() {
        return;
    }
    let pick = ((state.roll() * candidates.len() as f32) as usize).min(candidates.len() - 1);
    let ally = &mut state.allies[candidates[pick]];
    ally.stun_timer = STUN_DURATION;
    let to = ally.pos;
    state.beams.push(Beam {
        from,
        to,
        color: 0xffffe0,
        life: STUN_BEAM_LIFE,
    });
    state.push_event(GameEvent::AllyStunned { pos: to });
    log::debug!("Ally stunned at ({:.0}, {:.0})", to.x, to.y);
}

/// Aimed bolt for shooter, teleporter and orbiter kinds
fn fire_aimed_bolt(state: &mut GameState, enemy: &mut Enemy, dt: f32) {
    let Some(cooldown) = enemy.kind.fire_cooldown() else {
        return;
    };
    enemy.fire_timer -= dt;
    if enemy.fire_timer > 0.0 || state.is_game_over() || state.player.destroyed {
        return;
    }
    enemy.fire_timer = cooldown;
    let dir = direction_to(enemy.pos, state.player.pos);
    if dir == Vec2::ZERO {
        return;
    }
    state.enemy_projectiles.push(Projectile::bolt(
        enemy.pos,
        dir * ENEMY_BOLT_SPEED,
        ENEMY_BOLT_SIZE,
        1.0,
        ProjectileSource::Enemy,
    ));
    state.sound(SoundId::EnemyShoot, 0.4);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::ally;
    use crate::sim::state::ProjectileKind;

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

    #[test]
    fn test_health_stacking_order() {
        let mut state = state();
        assert_eq!(stacked_health(&state, 10.0, false), 10.0);
        state.game_time = 200.0;
        assert_eq!(stacked_health(&state, 10.0, false), 20.0);
        state.final_boss_defeated = true;
        assert_eq!(stacked_health(&state, 10.0, false), 30.0);
        assert_eq!(stacked_health(&state, 10.0, true), 60.0);
    }

    #[test]
    fn test_spawned_enemy_is_consistent() {
        let mut state = state();
        let id = spawn_enemy(&mut state, EnemySpawn::default());
        let enemy = state.enemy(id).expect("spawned");
        assert_eq!(enemy.shape.len(), SHAPE_SIDES);
        assert_eq!(enemy.health, enemy.max_health);
        assert!(enemy.size >= 15.0 && enemy.size < 35.0);
        assert_eq!(enemy.pos.y, SPAWN_Y);
        assert!(!enemy.is_boss);
    }

    #[test]
    fn test_health_override_skips_multipliers() {
        let mut state = state();
        state.game_time = 250.0;
        let id = spawn_enemy(
            &mut state,
            EnemySpawn {
                kind: EnemyKind::Boss,
                health: Some(50.0),
                summoned: true,
                ..Default::default()
            },
        );
        let enemy = state.enemy(id).expect("spawned");
        assert_eq!(enemy.health, 50.0);
        assert!(enemy.is_boss && enemy.summoned);
    }

    #[test]
    fn test_seeker_homes_on_player() {
        let mut state = state();
        let id = spawn_at(&mut state, EnemyKind::Seeker, Vec2::new(100.0, 100.0));
        let before = state.enemy(id).map(|e| e.pos.distance(state.player.pos));
        update_enemies(&mut state, 1.0 / 60.0);
        let after = state.enemy(id).map(|e| e.pos.distance(state.player.pos));
        assert!((before.unwrap_or_default() - after.unwrap_or_default() - 6.0).abs() < 1e-3);
    }

    #[test]
    fn test_drifter_bounces_off_walls() {
        let mut state = state();
        let id = spawn_at(&mut state, EnemyKind::Shard, Vec2::new(5.0, 100.0));
        if let Some(e) = state.enemy_mut(id) {
            e.vx = -1.0;
        }
        update_enemies(&mut state, 1.0 / 60.0);
        assert!(state.enemy(id).is_some_and(|e| e.vx > 0.0));
    }

    #[test]
    fn test_shooter_fires_every_two_seconds() {
        let mut state = state();
        spawn_at(&mut state, EnemyKind::Shooter, Vec2::new(400.0, 100.0));
        update_enemies(&mut state, 0.25);
        assert!(state.enemy_projectiles.is_empty());
        for _ in 0..7 {
            update_enemies(&mut state, 0.25);
        }
        assert_eq!(state.enemy_projectiles.len(), 1);
        let bolt = &state.enemy_projectiles[0];
        assert_eq!(bolt.size, ENEMY_BOLT_SIZE);
        assert!((bolt.vel.length() - ENEMY_BOLT_SPEED).abs() < 1e-4);
    }

    #[test]
    fn test_teleporter_relocates_into_upper_half() {
        let mut state = state();
        let id = spawn_at(&mut state, EnemyKind::Teleporter, Vec2::new(400.0, 500.0));
        for _ in 0..13 {
            update_enemies(&mut state, 0.25);
        }
        let enemy = state.enemy(id).expect("alive");
        assert!(enemy.pos.x >= 50.0 && enemy.pos.x <= 750.0);
        assert!(enemy.pos.y <= 300.0 + 5.0);
    }

    #[test]
    fn test_orbiter_locks_into_orbit() {
        let mut state = state();
        let player = state.player.pos;
        let id = spawn_at(&mut state, EnemyKind::Orbiter, player + Vec2::new(0.0, -150.0));
        update_enemies(&mut state, 1.0 / 60.0);
        let enemy = state.enemy(id).expect("alive");
        assert!(matches!(enemy.behavior, Behavior::Orbiter { orbiting: true, .. }));
        assert!((enemy.pos.distance(player) - ORBIT_RADIUS).abs() < 1e-3);
    }

    #[test]
    fn test_weaver_mines_are_stationary() {
        let mut state = state();
        spawn_at(&mut state, EnemyKind::Weaver, Vec2::new(400.0, 0.0));
        for _ in 0..2000 {
            update_enemies(&mut state, 1.0 / 60.0);
            if !state.enemy_projectiles.is_empty() {
                break;
            }
        }
        let mine = state.enemy_projectiles.first().expect("a mine after 2000 frames");
        assert_eq!(mine.kind, ProjectileKind::Mine);
        assert_eq!(mine.vel, Vec2::ZERO);
    }

    #[test]
    fn test_anchor_guards_nearest_heavy() {
        let mut state = state();
        let tanker = spawn_at(&mut state, EnemyKind::Tanker, Vec2::new(300.0, 100.0));
        spawn_at(&mut state, EnemyKind::Standard, Vec2::new(200.0, 100.0));
        let anchor = spawn_at(&mut state, EnemyKind::Anchor, Vec2::new(200.0, 120.0));
        update_enemies(&mut state, 1.0 / 60.0);
        assert_eq!(state.enemy(tanker).and_then(|e| e.protected_by), Some(anchor));
    }

    #[test]
    fn test_stunner_disables_an_ally() {
        let mut state = state();
        ally::spawn_drones(&mut state);
        spawn_at(&mut state, EnemyKind::Stunner, Vec2::new(400.0, 50.0));
        for _ in 0..17 {
            update_enemies(&mut state, 0.25);
        }
        assert_eq!(state.allies.iter().filter(|a| a.is_stunned()).count(), 1);
        assert_eq!(state.beams.len(), 1);
    }

    #[test]
    fn test_sizzler_heats_player_in_aim_mode() {
        let mut state = state();
        state.aim_unlocked = true;
        let player = state.player.pos;
        spawn_at(&mut state, EnemyKind::Sizzler, player + Vec2::new(0.0, -100.0));
        update_enemies(&mut state, 0.2);
        assert!((state.player.heat - 3.0).abs() < 1e-4);
    }

    #[test]
    fn test_linked_partner_enrages() {
        let mut state = state();
        let (a, b) = spawn_linked_pair(&mut state, EnemyKind::Weaver, false);
        let base_speed = state.enemy(b).map(|e| e.speed).unwrap_or_default();
        let gone = state.enemy(a).cloned().expect("spawned");
        state.enemies.retain(|e| e.id != a);
        enrage_partner(&mut state, &gone);
        let survivor = state.enemy(b).expect("alive");
        assert_eq!(survivor.link, LinkState::Enraged);
        assert!((survivor.speed - base_speed * 2.5).abs() < 1e-4);
    }
}
