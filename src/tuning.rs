//! Data-driven game balance
//!
//! Every number that shapes pacing or economy lives here so a session can be
//! rebalanced from JSON without touching simulation code. Speeds are in
//! pixels per 60 Hz reference frame, times in seconds.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::sim::state::EnemyKind;

/// Base stats for one enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub size: f32,
    /// Random extra size in `[0, size_jitter)`
    #[serde(default)]
    pub size_jitter: f32,
    pub speed: f32,
    /// Random extra speed in `[0, speed_jitter)`
    #[serde(default)]
    pub speed_jitter: f32,
    pub health: f32,
    pub color: u32,
}

impl EnemyStats {
    const fn new(size: f32, speed: f32, health: f32, color: u32) -> Self {
        Self {
            size,
            size_jitter: 0.0,
            speed,
            speed_jitter: 0.0,
            health,
            color,
        }
    }

    const fn jittered(mut self, size_jitter: f32, speed_jitter: f32) -> Self {
        self.size_jitter = size_jitter;
        self.speed_jitter = speed_jitter;
        self
    }
}

/// Stat table, one entry per enemy kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStatTable {
    pub standard: EnemyStats,
    pub scout: EnemyStats,
    pub brute: EnemyStats,
    pub shard: EnemyStats,
    pub shooter: EnemyStats,
    pub splitter: EnemyStats,
    pub seeker: EnemyStats,
    pub teleporter: EnemyStats,
    pub orbiter: EnemyStats,
    pub weaver: EnemyStats,
    pub bulwark: EnemyStats,
    pub sizzler: EnemyStats,
    pub juggler: EnemyStats,
    pub anchor: EnemyStats,
    pub tanker: EnemyStats,
    pub stunner: EnemyStats,
    pub boss: EnemyStats,
    pub final_boss: EnemyStats,
    pub behemoth: EnemyStats,
    pub monolith: EnemyStats,
}

impl Default for EnemyStatTable {
    fn default() -> Self {
        Self {
            standard: EnemyStats::new(15.0, 1.0, 1.0, 0xa9a9a9).jittered(20.0, 2.0),
            scout: EnemyStats::new(12.0, 2.5, 1.0, 0xadd8e6).jittered(0.0, 2.0),
            brute: EnemyStats::new(35.0, 0.8, 2.0, 0xd2b48c).jittered(0.0, 1.0),
            shard: EnemyStats::new(20.0, 1.0, 1.0, 0xdda0dd).jittered(0.0, 1.5),
            shooter: EnemyStats::new(25.0, 1.0, 2.0, 0x9400d3).jittered(0.0, 1.0),
            splitter: EnemyStats::new(30.0, 1.0, 1.0, 0xff8c00).jittered(0.0, 1.0),
            seeker: EnemyStats::new(18.0, 6.0, 1.0, 0xff3333),
            teleporter: EnemyStats::new(28.0, 0.2, 3.0, 0x00ffcc),
            orbiter: EnemyStats::new(15.0, 3.0, 3.0, 0xffff00),
            weaver: EnemyStats::new(20.0, 2.0, 2.0, 0xff00ff),
            bulwark: EnemyStats::new(40.0, 0.5, 10.0, 0x444444),
            sizzler: EnemyStats::new(50.0, 0.5, 25.0, 0xff6600),
            juggler: EnemyStats::new(25.0, 2.5, 4.0, 0x00ff00),
            anchor: EnemyStats::new(15.0, 4.0, 3.0, 0xffffff),
            tanker: EnemyStats::new(45.0, 1.0, 30.0, 0x8b4513),
            stunner: EnemyStats::new(30.0, 0.5, 15.0, 0xffffe0),
            boss: EnemyStats::new(60.0, 0.8, 50.0, 0xff4500),
            final_boss: EnemyStats::new(100.0, 1.5, 1000.0, 0x8b0000),
            behemoth: EnemyStats::new(80.0, 0.5, 2000.0, 0x800000),
            monolith: EnemyStats::new(120.0, 0.6, 3000.0, 0x1a1a1a),
        }
    }
}

impl EnemyStatTable {
    pub fn get(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Standard => &self.standard,
            EnemyKind::Scout => &self.scout,
            EnemyKind::Brute => &self.brute,
            EnemyKind::Shard => &self.shard,
            EnemyKind::Shooter => &self.shooter,
            EnemyKind::Splitter => &self.splitter,
            EnemyKind::Seeker => &self.seeker,
            EnemyKind::Teleporter => &self.teleporter,
            EnemyKind::Orbiter => &self.orbiter,
            EnemyKind::Weaver => &self.weaver,
            EnemyKind::Bulwark => &self.bulwark,
            EnemyKind::Sizzler => &self.sizzler,
            EnemyKind::Juggler => &self.juggler,
            EnemyKind::Anchor => &self.anchor,
            EnemyKind::Tanker => &self.tanker,
            EnemyKind::Stunner => &self.stunner,
            EnemyKind::Boss => &self.boss,
            EnemyKind::FinalBoss => &self.final_boss,
            EnemyKind::Behemoth => &self.behemoth,
            EnemyKind::Monolith => &self.monolith,
        }
    }
}

/// Rewards granted when a boss-tagged enemy is destroyed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BossReward {
    pub score: u64,
    pub upgrade_points: u32,
    pub shield_charges: u32,
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Schedule ===
    pub boss_first_spawn: f32,
    pub boss_period: f32,
    pub final_boss_warning: f32,
    pub final_boss_spawn: f32,
    /// Void-time thresholds for the extended bosses
    pub behemoth_spawn: f32,
    pub monolith_spawn: f32,

    // === Spawn pacing ===
    pub spawn_interval_base: f32,
    /// Interval shrink per whole second of game time
    pub spawn_interval_step: f32,
    pub spawn_interval_min: f32,

    // === Health stacking (applied in this order) ===
    pub health_time_threshold: f32,
    pub time_health_multiplier: f32,
    pub void_health_multiplier: f32,
    pub elite_health_multiplier: f32,

    // === Modifiers ===
    pub elite_chance: f32,
    pub elite_after: f32,
    pub void_elite_chance: f32,
    pub void_linked_chance: f32,
    pub linked_after: f32,
    pub enrage_speed_multiplier: f32,

    // === Economy ===
    pub kill_score: u64,
    pub coolant_drop_chance: f32,
    pub shield_recharge_step: u64,
    pub shield_recharge_amount: u32,
    pub boss_reward: BossReward,
    pub commander_reward: BossReward,
    pub final_boss_reward: BossReward,
    pub behemoth_reward: BossReward,
    pub monolith_reward: BossReward,
    /// Score bonus for breaking every monolith node
    pub monolith_break_bonus: u64,

    // === Allies ===
    pub drone_fire_cooldowns: [f32; 6],
    pub laser_damage_levels: [f32; 6],
    pub laser_cooldown_levels: [f32; 6],
    pub laser_fire_duration: f32,
    pub ally_shot_speed: f32,
    pub faster_projectile_multiplier: f32,

    pub enemies: EnemyStatTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            boss_first_spawn: 60.0,
            boss_period: 60.0,
            final_boss_warning: 295.0,
            final_boss_spawn: 300.0,
            behemoth_spawn: 150.0,
            monolith_spawn: 300.0,

            spawn_interval_base: 1.2,
            spawn_interval_step: 0.01,
            spawn_interval_min: 0.4,

            health_time_threshold: 200.0,
            time_health_multiplier: 2.0,
            void_health_multiplier: 1.5,
            elite_health_multiplier: 2.0,

            elite_chance: 0.05,
            elite_after: 120.0,
            void_elite_chance: 0.15,
            void_linked_chance: 0.10,
            linked_after: 30.0,
            enrage_speed_multiplier: 2.5,

            kill_score: 10,
            coolant_drop_chance: 0.1,
            shield_recharge_step: 1500,
            shield_recharge_amount: 3,
            boss_reward: BossReward {
                score: 250,
                upgrade_points: 1,
                shield_charges: 1,
            },
            commander_reward: BossReward {
                score: 250,
                upgrade_points: 1,
                shield_charges: 0,
            },
            final_boss_reward: BossReward {
                score: 5000,
                upgrade_points: 10,
                shield_charges: 5,
            },
            behemoth_reward: BossReward {
                score: 2000,
                upgrade_points: 5,
                shield_charges: 3,
            },
            monolith_reward: BossReward {
                score: 3000,
                upgrade_points: 8,
                shield_charges: 5,
            },
            monolith_break_bonus: 500,

            drone_fire_cooldowns: [0.5, 0.45, 0.4, 0.35, 0.32, 0.3],
            laser_damage_levels: [20.0, 25.0, 32.0, 40.0, 50.0, 65.0],
            laser_cooldown_levels: [15.0, 14.0, 13.0, 11.5, 10.0, 8.0],
            laser_fire_duration: 10.0,
            ally_shot_speed: 8.0,
            faster_projectile_multiplier: 1.5,

            enemies: EnemyStatTable::default(),
        }
    }
}

impl Tuning {
    /// Spawn interval for the given game time
    pub fn spawn_interval(&self, game_time: f32) -> f32 {
        let shrink = game_time.floor() * self.spawn_interval_step;
        (self.spawn_interval_base - shrink).max(self.spawn_interval_min)
    }

    /// Reject balance sheets that would stall or break the schedule
    pub fn validate(&self) -> Result<(), GameError> {
        if self.spawn_interval_min <= 0.0 {
            return Err(GameError::InvalidSetting {
                field: "spawn_interval_min",
                reason: format!("must be positive, got {}", self.spawn_interval_min),
            });
        }
        if self.boss_period <= 0.0 {
            return Err(GameError::InvalidSetting {
                field: "boss_period",
                reason: format!("must be positive, got {}", self.boss_period),
            });
        }
        if self.final_boss_warning > self.final_boss_spawn {
            return Err(GameError::InvalidSetting {
                field: "final_boss_warning",
                reason: format!(
                    "warning at {}s comes after the spawn at {}s",
                    self.final_boss_warning, self.final_boss_spawn
                ),
            });
        }
        if self.shield_recharge_step == 0 {
            return Err(GameError::InvalidSetting {
                field: "shield_recharge_step",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}
