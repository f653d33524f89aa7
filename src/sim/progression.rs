//! Score unlocks, shield recharges and the upgrade-point economy

use serde::{Deserialize, Serialize};

use super::ally;
use super::state::{AllyKind, GameEvent, GameState};
use crate::audio::SoundId;
use crate::consts::UPGRADE_COLOR;
use crate::error::UpgradeError;

/// Purchasable ally upgrades, in auto-upgrade priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeAxis {
    FireRate,
    DoubleShot,
    ProjectileSpeed,
    LaserDamage,
    LaserCooldown,
}

impl UpgradeAxis {
    pub const ALL: [UpgradeAxis; 5] = [
        UpgradeAxis::FireRate,
        UpgradeAxis::DoubleShot,
        UpgradeAxis::ProjectileSpeed,
        UpgradeAxis::LaserDamage,
        UpgradeAxis::LaserCooldown,
    ];

    pub fn cost(&self) -> u32 {
        match self {
            UpgradeAxis::FireRate | UpgradeAxis::DoubleShot | UpgradeAxis::ProjectileSpeed => 1,
            UpgradeAxis::LaserDamage => 3,
            UpgradeAxis::LaserCooldown => 4,
        }
    }

    pub fn cap(&self) -> u8 {
        match self {
            UpgradeAxis::DoubleShot | UpgradeAxis::ProjectileSpeed => 1,
            _ => 5,
        }
    }

    pub fn requires_laser(&self) -> bool {
        matches!(self, UpgradeAxis::LaserDamage | UpgradeAxis::LaserCooldown)
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpgradeAxis::FireRate => "Ally Fire Rate",
            UpgradeAxis::DoubleShot => "Ally Double Shot",
            UpgradeAxis::ProjectileSpeed => "Ally Projectile Speed",
            UpgradeAxis::LaserDamage => "Laser Damage",
            UpgradeAxis::LaserCooldown => "Laser Cooldown",
        }
    }
}

/// Current level on each axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub fire_rate: u8,
    pub double_shot: u8,
    pub projectile_speed: u8,
    pub laser_damage: u8,
    pub laser_cooldown: u8,
}

impl UpgradeLevels {
    pub fn level(&self, axis: UpgradeAxis) -> u8 {
        match axis {
            UpgradeAxis::FireRate => self.fire_rate,
            UpgradeAxis::DoubleShot => self.double_shot,
            UpgradeAxis::ProjectileSpeed => self.projectile_speed,
            UpgradeAxis::LaserDamage => self.laser_damage,
            UpgradeAxis::LaserCooldown => self.laser_cooldown,
        }
    }

    fn level_mut(&mut self, axis: UpgradeAxis) -> &mut u8 {
        match axis {
            UpgradeAxis::FireRate => &mut self.fire_rate,
            UpgradeAxis::DoubleShot => &mut self.double_shot,
            UpgradeAxis::ProjectileSpeed => &mut self.projectile_speed,
            UpgradeAxis::LaserDamage => &mut self.laser_damage,
            UpgradeAxis::LaserCooldown => &mut self.laser_cooldown,
        }
    }

    pub fn has_double_shot(&self) -> bool {
        self.double_shot > 0
    }

    pub fn has_faster_projectiles(&self) -> bool {
        self.projectile_speed > 0
    }
}

/// One-time score unlocks that already fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unlocks {
    pub bigger_projectiles: bool,
    pub double_shot: bool,
    pub drones: bool,
    pub laser: bool,
}

/// Score thresholds for the one-time unlocks
pub const BIGGER_PROJECTILES_SCORE: u64 = 250;
pub const DOUBLE_SHOT_SCORE: u64 = 500;
pub const DRONES_SCORE: u64 = 2000;
pub const LASER_SCORE: u64 = 5000;

/// Check whether an axis can be bought right now
pub fn check_purchase(state: &GameState, axis: UpgradeAxis) -> Result<(), UpgradeError> {
    if axis.requires_laser() && !state.has_laser() {
        return Err(UpgradeError::Unavailable(axis));
    }
    if state.upgrades.level(axis) >= axis.cap() {
        return Err(UpgradeError::Maxed {
            axis,
            cap: axis.cap(),
        });
    }
    if state.upgrade_points < axis.cost() {
        return Err(UpgradeError::InsufficientPoints {
            axis,
            cost: axis.cost(),
            available: state.upgrade_points,
        });
    }
    Ok(())
}

/// Spend points on one axis; returns the new level
pub fn purchase(state: &mut GameState, axis: UpgradeAxis) -> Result<u8, UpgradeError> {
    check_purchase(state, axis)?;
    state.upgrade_points -= axis.cost();
    let level = state.upgrades.level_mut(axis);
    *level += 1;
    let level = *level;
    log::debug!("Upgraded {} to level {}", axis.label(), level);

    state.sound(SoundId::AllyUpgraded, 1.0);

    // Sparkle on whichever allies the upgrade touched
    let targets: Vec<_> = state
        .allies
        .iter()
        .filter(|a| match a.kind {
            AllyKind::Laser(_) => axis.requires_laser(),
            AllyKind::Drone { .. } => !axis.requires_laser(),
            AllyKind::Echo { .. } => false,
        })
        .map(|a| a.pos)
        .collect();
    for pos in targets {
        state.spawn_particles(pos, UPGRADE_COLOR, 30);
    }
    Ok(level)
}

/// True when nothing is left to buy (laser axes only count once the laser exists)
pub fn all_maxed(state: &GameState) -> bool {
    UpgradeAxis::ALL
        .iter()
        .filter(|axis| !axis.requires_laser() || state.has_laser())
        .all(|&axis| state.upgrades.level(axis) >= axis.cap())
}

/// Cheapest purchasable axis, ties broken by priority order
pub fn cheapest_purchasable(state: &GameState) -> Option<UpgradeAxis> {
    UpgradeAxis::ALL
        .iter()
        .copied()
        .filter(|&axis| check_purchase(state, axis).is_ok())
        .min_by_key(|axis| axis.cost())
}

/// Spend points until broke or maxed; returns how many upgrades were bought
pub fn auto_upgrade(state: &mut GameState) -> u32 {
    let mut bought = 0;
    while let Some(axis) = cheapest_purchasable(state) {
        if purchase(state, axis).is_err() {
            break;
        }
        bought += 1;
    }
    if bought > 0 {
        log::debug!("Auto-upgrade bought {} upgrades", bought);
    }
    bought
}

/// After a boss reward: spend automatically or ask the host
pub fn offer_upgrades(state: &mut GameState) {
    if all_maxed(state) {
        return;
    }
    if state.auto_upgrade {
        auto_upgrade(state);
    } else {
        state.pause = super::state::PauseState::AwaitingUpgrade;
        state.push_event(GameEvent::UpgradeChoiceRequested {
            points: state.upgrade_points,
        });
    }
}

/// Score-threshold unlocks and shield recharges, once per frame
pub fn check_score_unlocks(state: &mut GameState) {
    let score = state.score;

    if score >= BIGGER_PROJECTILES_SCORE && !state.unlocks.bigger_projectiles {
        state.unlocks.bigger_projectiles = true;
        state.player.projectile_size = 7.0;
        state.player.projectile_damage = 2.0;
        state.status("Upgrade! Larger Bullets!", true);
        state.sound(SoundId::PlayerUpgraded, 1.0);
    }

    if score >= DOUBLE_SHOT_SCORE && !state.unlocks.double_shot {
        state.unlocks.double_shot = true;
        state.player.fire_rate = 2;
        state.status("Upgrade! Double Shot!", true);
        state.sound(SoundId::PlayerUpgraded, 1.0);
    }

    if score >= DRONES_SCORE && !state.unlocks.drones {
        state.unlocks.drones = true;
        ally::spawn_drones(state);
        state.status("Upgrade! AI Allies!", true);
        state.sound(SoundId::PlayerUpgraded, 0.8);
    }

    if score >= LASER_SCORE && !state.unlocks.laser {
        state.unlocks.laser = true;
        ally::spawn_laser(state);
        state.status("Laser Ally joined the battle!", true);
        state.sound(SoundId::PlayerUpgraded, 0.8);
    }

    if score >= state.next_shield_score {
        state.player.shield_charges += state.tuning.shield_recharge_amount;
        state.next_shield_score += state.tuning.shield_recharge_step;
        state.status("Shield Recharged!", true);
        state.sound(SoundId::PlayerUpgraded, 1.0);
    }
}
