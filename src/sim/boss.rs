//! Boss phase machines
//!
//! Each boss keeps an explicit phase enum in its behavior payload. Phases only
//! change when a countdown runs out, a spatial condition is met or an external
//! event (node destruction) is observed on a later tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::enemy::{EnemySpawn, random_minion_kind, spawn_enemy};
use super::state::{Behavior, Enemy, EnemyKind, GameState, Pickup, Projectile, ProjectileSource};
use crate::audio::SoundId;
use crate::consts::*;
use crate::{direction_to, move_factor};

// === Final boss ===

const FINAL_BOSS_HOME_Y: f32 = 120.0;
const FINAL_BOSS_ENTRY_SPEED: f32 = 5.0;
const FINAL_BOSS_FIRST_ATTACK: f32 = 3.0;
const DASH_WARNING: f32 = 1.2;
const DASH_SPEED: f32 = 20.0;
const DASH_ARRIVE_RADIUS: f32 = 20.0;
const RETURN_SPEED: f32 = 5.0;
const RETURN_SNAP: f32 = 5.0;
const POST_RETURN_GRACE: f32 = 1.0;
const MINION_COUNT: usize = 5;
const COMMANDER_HEALTH: f32 = 50.0;
const COMMANDER_OFFSET: f32 = 100.0;
const BARRAGE_COUNT: usize = 30;

/// Final boss phases
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FinalBossPhase {
    /// Descending to its home row; no attacks
    Entering,
    Patrolling,
    /// Reticle shown on the target; boss holds position
    WarningDash { timer: f32, target: Vec2 },
    Dashing { target: Vec2 },
    /// Climbing back to the home row while patrolling sideways
    Returning,
    /// Short patrol after a return before attacks resume
    PostReturnPatrol { timer: f32 },
}

/// Attack the final boss picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalBossAttack {
    SummonMinions,
    Dash,
    SummonCommanders,
    Barrage,
}

impl FinalBossAttack {
    /// Roll weighted 50 / 25 / 15 / rest
    pub fn choose(roll: f32) -> Self {
        if roll < 0.5 {
            FinalBossAttack::SummonMinions
        } else if roll < 0.75 {
            FinalBossAttack::Dash
        } else if roll < 0.9 {
            FinalBossAttack::SummonCommanders
        } else {
            FinalBossAttack::Barrage
        }
    }

    /// Seconds before the next attack may be chosen
    pub fn cooldown(&self) -> f32 {
        match self {
            FinalBossAttack::SummonMinions => 4.0,
            FinalBossAttack::Dash => 5.0,
            FinalBossAttack::SummonCommanders => 8.0,
            FinalBossAttack::Barrage => 6.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalBossBrain {
    pub phase: FinalBossPhase,
    pub attack_timer: f32,
    pub home_y: f32,
    pub defeated: bool,
}

impl FinalBossBrain {
    pub fn new() -> Self {
        Self {
            phase: FinalBossPhase::Entering,
            attack_timer: FINAL_BOSS_FIRST_ATTACK,
            home_y: FINAL_BOSS_HOME_Y,
            defeated: false,
        }
    }

    /// Dash reticle, while one is shown
    pub fn dash_warning(&self) -> Option<Vec2> {
        match self.phase {
            FinalBossPhase::WarningDash { target, .. } => Some(target),
            _ => None,
        }
    }
}

impl Default for FinalBossBrain {
    fn default() -> Self {
        Self::new()
    }
}

fn patrol(enemy: &mut Enemy, width: f32, mf: f32) {
    enemy.pos.x += enemy.vx * mf;
    if enemy.pos.x < enemy.size || enemy.pos.x > width - enemy.size {
        enemy.vx = -enemy.vx;
    }
}

pub fn update_final_boss(state: &mut GameState, enemy: &mut Enemy, dt: f32) {
    let mf = move_factor(dt);
    let Behavior::FinalBoss(brain) = &enemy.behavior else {
        return;
    };
    let mut brain = brain.clone();

    brain.phase = match brain.phase {
        FinalBossPhase::Entering => {
            enemy.pos.y += FINAL_BOSS_ENTRY_SPEED * mf;
            if enemy.pos.y >= brain.home_y {
                enemy.pos.y = brain.home_y;
                state.shake(20.0, 8.0);
                state.sound(SoundId::FinalBossBegin, 1.0);
                log::info!("Final boss engaged");
                FinalBossPhase::Patrolling
            } else {
                FinalBossPhase::Entering
            }
        }
        FinalBossPhase::Patrolling => {
            patrol(enemy, state.width, mf);
            FinalBossPhase::Patrolling
        }
        FinalBossPhase::WarningDash { timer, target } => {
            let timer = timer - dt;
            if timer <= 0.0 {
                FinalBossPhase::Dashing { target }
            } else {
                FinalBossPhase::WarningDash { timer, target }
            }
        }
        FinalBossPhase::Dashing { target } => {
            let dist = enemy.pos.distance(target);
            if dist < DASH_ARRIVE_RADIUS {
                let sign = if state.roll() < 0.5 { 1.0 } else { -1.0 };
                enemy.vx = enemy.speed * sign;
                FinalBossPhase::Returning
            } else {
                let step = (DASH_SPEED * mf).min(dist);
                enemy.pos += direction_to(enemy.pos, target) * step;
                FinalBossPhase::Dashing { target }
            }
        }
        FinalBossPhase::Returning => {
            let dy = brain.home_y - enemy.pos.y;
            patrol(enemy, state.width, mf);
            if dy.abs() < RETURN_SNAP {
                enemy.pos.y = brain.home_y;
                FinalBossPhase::PostReturnPatrol {
                    timer: POST_RETURN_GRACE,
                }
            } else {
                enemy.pos.y += dy.signum() * (RETURN_SPEED * mf).min(dy.abs());
                FinalBossPhase::Returning
            }
        }
        FinalBossPhase::PostReturnPatrol { timer } => {
            patrol(enemy, state.width, mf);
            let timer = timer - dt;
            if timer <= 0.0 {
                FinalBossPhase::Patrolling
            } else {
                FinalBossPhase::PostReturnPatrol { timer }
            }
        }
    };

    if brain.phase != FinalBossPhase::Entering {
        brain.attack_timer -= dt;
    }
    if brain.phase == FinalBossPhase::Patrolling && brain.attack_timer <= 0.0 {
        let attack = FinalBossAttack::choose(state.roll());
        brain.attack_timer = attack.cooldown();
        if let Some(phase) = perform_attack(state, enemy, attack) {
            brain.phase = phase;
        }
    }

    enemy.behavior = Behavior::FinalBoss(brain);
}

/// Carry out an attack; returns a phase change when the attack needs one
fn perform_attack(
    state: &mut GameState,
    enemy: &Enemy,
    attack: FinalBossAttack,
) -> Option<FinalBossPhase> {
    log::debug!("Final boss attack: {:?}", attack);
    match attack {
        FinalBossAttack::SummonMinions => {
            state.status("Boss summoning minions!", true);
            for _ in 0..MINION_COUNT {
                let kind = random_minion_kind(state);
                let x = enemy.pos.x + (state.roll() - 0.5) * 100.0;
                spawn_enemy(
                    state,
                    EnemySpawn {
                        kind,
                        pos: Some(Vec2::new(x, enemy.pos.y)),
                        summoned: true,
                        ..Default::default()
                    },
                );
            }
            None
        }
        FinalBossAttack::SummonCommanders => {
            state.status("Boss summoning commanders!", true);
            for offset in [-COMMANDER_OFFSET, COMMANDER_OFFSET] {
                spawn_enemy(
                    state,
                    EnemySpawn {
                        kind: EnemyKind::Boss,
                        pos: Some(Vec2::new(enemy.pos.x + offset, enemy.pos.y)),
                        health: Some(COMMANDER_HEALTH),
                        summoned: true,
                        ..Default::default()
                    },
                );
            }
            None
        }
        FinalBossAttack::Dash => {
            if state.player.destroyed {
                return None;
            }
            state.status("Boss incoming charge!", true);
            let target = Vec2::new(
                state.player.pos.x + (state.roll() - 0.5) * 150.0,
                state.player.pos.y - (state.roll() * 100.0 + 50.0),
            );
            Some(FinalBossPhase::WarningDash {
                timer: DASH_WARNING,
                target,
            })
        }
        FinalBossAttack::Barrage => {
            state.status("Boss firing barrage!", true);
            state.sound(SoundId::EnemyShoot, 0.8);
            for _ in 0..BARRAGE_COUNT {
                let angle = state.roll() * std::f32::consts::PI;
                let speed = state.roll() * 2.0 + 3.0;
                state.enemy_projectiles.push(Projectile::bolt(
                    enemy.pos,
                    Vec2::from_angle(angle) * speed,
                    5.0,
                    1.0,
                    ProjectileSource::Enemy,
                ));
            }
            None
        }
    }
}

// === Behemoth ===

const BEHEMOTH_HOME_Y: f32 = 150.0;
const BEHEMOTH_ENTRY_SPEED: f32 = 2.0;
const SIEGE_DURATION: f32 = 8.0;
const SIEGE_FIRE_INTERVAL: f32 = 1.6;
const SIEGE_SPREAD: f32 = 0.2;
const SPIRAL_DURATION: f32 = 4.0;
const SPIRAL_FIRE_INTERVAL: f32 = 0.12;
const SPIRAL_STEP: f32 = 0.3;
const SPIRAL_SHOT_SPEED: f32 = 3.0;
const RECHARGE_DURATION: f32 = 2.5;
const BEHEMOTH_BOLT_SIZE: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BehemothPhase {
    Entering,
    /// Track the player and fire aimed spreads
    Siege { timer: f32 },
    /// Rotating four-arm spray
    Spiral { timer: f32 },
    /// Idle, no attacks
    Recharge { timer: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehemothBrain {
    pub phase: BehemothPhase,
    pub fire_timer: f32,
    pub spiral_angle: f32,
}

impl BehemothBrain {
    pub fn new() -> Self {
        Self {
            phase: BehemothPhase::Entering,
            fire_timer: SIEGE_FIRE_INTERVAL,
            spiral_angle: 0.0,
        }
    }
}

impl Default for BehemothBrain {
    fn default() -> Self {
        Self::new()
    }
}

pub fn update_behemoth(state: &mut GameState, enemy: &mut Enemy, dt: f32) {
    let mf = move_factor(dt);
    let Behavior::Behemoth(brain) = &enemy.behavior else {
        return;
    };
    let mut brain = brain.clone();

    brain.phase = match brain.phase {
        BehemothPhase::Entering => {
            enemy.pos.y += BEHEMOTH_ENTRY_SPEED * mf;
            if enemy.pos.y >= BEHEMOTH_HOME_Y {
                enemy.pos.y = BEHEMOTH_HOME_Y;
                state.shake(40.0, 10.0);
                state.status("THE BEHEMOTH AWAKENS", true);
                log::info!("Behemoth engaged");
                brain.fire_timer = SIEGE_FIRE_INTERVAL;
                BehemothPhase::Siege {
                    timer: SIEGE_DURATION,
                }
            } else {
                BehemothPhase::Entering
            }
        }
        BehemothPhase::Siege { timer } => {
            if !state.player.destroyed {
                let dx = state.player.pos.x - enemy.pos.x;
                let step = enemy.speed * mf;
                enemy.pos.x += dx.clamp(-step, step);
            }
            brain.fire_timer -= dt;
            if brain.fire_timer <= 0.0 {
                brain.fire_timer = SIEGE_FIRE_INTERVAL;
                fire_spread(state, enemy.pos);
            }
            let timer = timer - dt;
            if timer <= 0.0 {
                brain.fire_timer = SPIRAL_FIRE_INTERVAL;
                BehemothPhase::Spiral {
                    timer: SPIRAL_DURATION,
                }
            } else {
                BehemothPhase::Siege { timer }
            }
        }
        BehemothPhase::Spiral { timer } => {
            brain.fire_timer -= dt;
            if brain.fire_timer <= 0.0 {
                brain.fire_timer = SPIRAL_FIRE_INTERVAL;
                for arm in 0..4 {
                    let angle = brain.spiral_angle + arm as f32 * std::f32::consts::FRAC_PI_2;
                    state.enemy_projectiles.push(Projectile::bolt(
                        enemy.pos,
                        Vec2::from_angle(angle) * SPIRAL_SHOT_SPEED,
                        ENEMY_BOLT_SIZE,
                        1.0,
                        ProjectileSource::Enemy,
                    ));
                }
                brain.spiral_angle += SPIRAL_STEP;
            }
            let timer = timer - dt;
            if timer <= 0.0 {
                BehemothPhase::Recharge {
                    timer: RECHARGE_DURATION,
                }
            } else {
                BehemothPhase::Spiral { timer }
            }
        }
        BehemothPhase::Recharge { timer } => {
            let timer = timer - dt;
            if timer <= 0.0 {
                brain.fire_timer = SIEGE_FIRE_INTERVAL;
                BehemothPhase::Siege {
                    timer: SIEGE_DURATION,
                }
            } else {
                BehemothPhase::Recharge { timer }
            }
        }
    };

    enemy.behavior = Behavior::Behemoth(brain);
}

fn fire_spread(state: &mut GameState, from: Vec2) {
    if state.player.destroyed {
        return;
    }
    let aim = direction_to(from, state.player.pos);
    if aim == Vec2::ZERO {
        return;
    }
    for offset in [-SIEGE_SPREAD, 0.0, SIEGE_SPREAD] {
        state.enemy_projectiles.push(Projectile::bolt(
            from,
            Vec2::from_angle(offset).rotate(aim) * ENEMY_BOLT_SPEED,
            BEHEMOTH_BOLT_SIZE,
            1.0,
            ProjectileSource::Enemy,
        ));
    }
    state.sound(SoundId::EnemyShoot, 0.6);
}

// === Monolith ===

const MONOLITH_HOME_Y: f32 = 130.0;
const MONOLITH_ENTRY_SPEED: f32 = 1.0;
const NODE_COUNT: usize = 4;
const NODE_SIZE: f32 = 14.0;
const NODE_HEALTH: f32 = 40.0;
const NODE_MIN_HEALTH: f32 = 5.0;
/// Node distance from the core as a fraction of the core radius
const NODE_RING: f32 = 0.6;
const NODE_FIRE_INTERVAL: f32 = 2.0;
const MONOLITH_STUN: f32 = 5.0;
const MONOLITH_REGEN: f32 = 1.5;

/// Weak point orbiting the monolith core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonolithNode {
    /// Position relative to the core
    pub offset: Vec2,
    pub health: f32,
    pub max_health: f32,
}

impl MonolithNode {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MonolithPhase {
    Entering,
    /// Nodes alive and firing; core deflects hits
    Drifting,
    /// All nodes broken; core open
    Stunned { timer: f32 },
    /// Nodes come back weaker at the end of the countdown
    Regenerating { timer: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonolithBrain {
    pub phase: MonolithPhase,
    pub nodes: Vec<MonolithNode>,
    pub node_fire_timer: f32,
}

impl MonolithBrain {
    pub fn new(core_size: f32) -> Self {
        let nodes = (0..NODE_COUNT)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / NODE_COUNT as f32;
                MonolithNode {
                    offset: Vec2::from_angle(angle) * core_size * NODE_RING,
                    health: NODE_HEALTH,
                    max_health: NODE_HEALTH,
                }
            })
            .collect();
        Self {
            phase: MonolithPhase::Entering,
            nodes,
            node_fire_timer: NODE_FIRE_INTERVAL,
        }
    }

    pub fn live_nodes(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_alive()).count()
    }

    /// Core takes damage only once every node is down
    pub fn core_exposed(&self) -> bool {
        self.live_nodes() == 0
    }
}

pub fn update_monolith(state: &mut GameState, enemy: &mut Enemy, dt: f32) {
    let mf = move_factor(dt);
    let Behavior::Monolith(brain) = &enemy.behavior else {
        return;
    };
    let mut brain = brain.clone();

    brain.phase = match brain.phase {
        MonolithPhase::Entering => {
            enemy.pos.y += MONOLITH_ENTRY_SPEED * mf;
            if enemy.pos.y >= MONOLITH_HOME_Y {
                enemy.pos.y = MONOLITH_HOME_Y;
                enemy.vx = enemy.speed;
                state.shake(40.0, 10.0);
                state.status("THE MONOLITH DESCENDS", true);
                log::info!("Monolith engaged");
                MonolithPhase::Drifting
            } else {
                MonolithPhase::Entering
            }
        }
        MonolithPhase::Drifting => {
            patrol(enemy, state.width, mf);
            if brain.core_exposed() {
                on_nodes_broken(state, enemy.pos);
                MonolithPhase::Stunned {
                    timer: MONOLITH_STUN,
                }
            } else {
                brain.node_fire_timer -= dt;
                if brain.node_fire_timer <= 0.0 {
                    brain.node_fire_timer = NODE_FIRE_INTERVAL;
                    fire_nodes(state, enemy.pos, &brain.nodes);
                }
                MonolithPhase::Drifting
            }
        }
        MonolithPhase::Stunned { timer } => {
            let timer = timer - dt;
            if timer <= 0.0 {
                MonolithPhase::Regenerating {
                    timer: MONOLITH_REGEN,
                }
            } else {
                MonolithPhase::Stunned { timer }
            }
        }
        MonolithPhase::Regenerating { timer } => {
            let timer = timer - dt;
            if timer <= 0.0 {
                for node in &mut brain.nodes {
                    node.max_health = (node.max_health * 0.5).max(NODE_MIN_HEALTH);
                    node.health = node.max_health;
                }
                brain.node_fire_timer = NODE_FIRE_INTERVAL;
                state.status("Monolith nodes restored!", true);
                MonolithPhase::Drifting
            } else {
                MonolithPhase::Regenerating { timer }
            }
        }
    };

    enemy.behavior = Behavior::Monolith(brain);
}

fn on_nodes_broken(state: &mut GameState, pos: Vec2) {
    state.score += state.tuning.monolith_break_bonus;
    state.status("Monolith core exposed!", true);
    state.shake(20.0, 6.0);
    state.explode(pos, EXPLOSION_COLOR, 60);
    for dx in [-40.0, 40.0] {
        state.pickups.push(Pickup::coolant(pos + Vec2::new(dx, 0.0)));
    }
    log::debug!("Monolith stunned");
}

fn fire_nodes(state: &mut GameState, core: Vec2, nodes: &[MonolithNode]) {
    if state.player.destroyed {
        return;
    }
    for node in nodes.iter().filter(|n| n.is_alive()) {
        let from = core + node.offset;
        let dir = direction_to(from, state.player.pos);
        state.enemy_projectiles.push(Projectile::bolt(
            from,
            dir * ENEMY_BOLT_SPEED,
            ENEMY_BOLT_SIZE,
            1.0,
            ProjectileSource::Enemy,
        ));
    }
    state.sound(SoundId::EnemyShoot, 0.4);
}

/// What a player shot did to an enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitOutcome {
    /// Enemy health reduced (possibly absorbed by an anchor)
    Damaged { guarded: bool },
    /// A monolith node took the hit; `broken` when it just died
    NodeHit { pos: Vec2, broken: bool },
    /// Armor turned the shot away
    Deflected,
}

/// Resolve a player projectile landing on `enemy`
pub fn projectile_hit(enemy: &mut Enemy, shot_pos: Vec2, shot_size: f32, damage: f32) -> HitOutcome {
    if let Behavior::Monolith(brain) = &mut enemy.behavior {
        if !brain.core_exposed() {
            let core = enemy.pos;
            let node = brain.nodes.iter_mut().filter(|n| n.is_alive()).find(|n| {
                (core + n.offset).distance(shot_pos) < (NODE_SIZE + shot_size) * COLLISION_FACTOR
            });
            return match node {
                Some(node) => {
                    node.health -= damage;
                    HitOutcome::NodeHit {
                        pos: core + node.offset,
                        broken: !node.is_alive(),
                    }
                }
                None => HitOutcome::Deflected,
            };
        }
    }
    HitOutcome::Damaged {
        guarded: enemy.apply_damage(damage),
    }
}

/// Sustained beam damage; returns where the beam lands
pub fn laser_damage(enemy: &mut Enemy, from: Vec2, damage: f32) -> Vec2 {
    if let Behavior::Monolith(brain) = &mut enemy.behavior {
        if !brain.core_exposed() {
            let core = enemy.pos;
            let nearest = brain
                .nodes
                .iter_mut()
                .filter(|n| n.is_alive())
                .min_by(|a, b| {
                    (core + a.offset)
                        .distance_squared(from)
                        .partial_cmp(&(core + b.offset).distance_squared(from))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some(node) = nearest {
                node.health -= damage;
                return core + node.offset;
            }
        }
    }
    enemy.apply_damage(damage);
    enemy.pos
}
