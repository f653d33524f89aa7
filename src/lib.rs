//! Void Legion - simulation core for a vertical arcade space shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, behaviors, collisions, progression)
//! - `clock`: Host-driven frame pump (delta clamping, pause, event dispatch)
//! - `platform`: Renderer / notifier / step-hook collaborator traits
//! - `settings`: Player preferences and session configuration
//! - `tuning`: Data-driven game balance
//! - `devtools`: Explicit developer hooks and world shortcuts

pub mod audio;
pub mod clock;
pub mod devtools;
pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use clock::{Clock, LoopControl};
pub use error::{GameError, UpgradeError};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest simulated step per frame (seconds); larger gaps are clamped
    pub const MAX_FRAME_DT: f32 = 0.25;
    /// Reference frame rate that per-frame speeds are expressed in
    pub const REFERENCE_FPS: f32 = 60.0;

    /// Default playfield dimensions
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;

    /// Two circles collide when closer than this fraction of their summed radii
    pub const COLLISION_FACTOR: f32 = 0.8;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 15.0;
    pub const PLAYER_SPEED: f32 = 4.0;
    pub const PLAYER_BOTTOM_OFFSET: f32 = 40.0;
    pub const PLAYER_PROJECTILE_SIZE: f32 = 5.0;
    pub const PLAYER_PROJECTILE_DAMAGE: f32 = 1.0;
    pub const PLAYER_SHOT_SPEED: f32 = 8.0;
    pub const PLAYER_AIMED_SHOT_SPEED: f32 = 10.0;
    /// Seconds between shots while the trigger is held
    pub const PLAYER_FIRE_INTERVAL: f32 = 0.2;

    /// Heat system
    pub const MAX_HEAT: f32 = 100.0;
    pub const HEAT_DECAY_RATE: f32 = 40.0;
    pub const HEAT_PER_SHOT: f32 = 10.0;
    /// Weapon jam duration once heat maxes out
    pub const OVERHEAT_LOCKOUT: f32 = 2.0;

    /// Enemy bolts
    pub const ENEMY_BOLT_SPEED: f32 = 4.0;
    pub const ENEMY_BOLT_SIZE: f32 = 4.0;
    pub const ENEMY_BOLT_COLOR: u32 = 0xff69b4;
    pub const MINE_SIZE: f32 = 8.0;
    pub const MINE_FUSE: f32 = 10.0;

    /// Homing shots
    pub const HOMING_SPEED: f32 = 14.0;
    pub const HOMING_TURN_RATE: f32 = 8.0;
    pub const HOMING_RANGE: f32 = 400.0;
    pub const HOMING_LIFESPAN: f32 = 2.0;

    /// Status messages fade after this many seconds
    pub const STATUS_FADE_SECS: f32 = 2.5;

    /// Colors
    pub const SHIELD_COLOR: u32 = 0x00e5ff;
    pub const EXPLOSION_COLOR: u32 = 0xff4500;
    pub const UPGRADE_COLOR: u32 = 0xffd700;
    pub const COOLANT_COLOR: u32 = 0x00ffff;
}

/// Movement multiplier that converts per-reference-frame speeds to this step
#[inline]
pub fn move_factor(dt: f32) -> f32 {
    consts::REFERENCE_FPS * dt
}

/// Unit vector from `from` toward `to`, or zero when they coincide
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Clamp a raw wall-clock gap (seconds) into a simulation step
#[inline]
pub fn clamp_frame_delta(raw_secs: f64) -> f32 {
    if !raw_secs.is_finite() || raw_secs <= 0.0 {
        return 0.0;
    }
    (raw_secs as f32).min(consts::MAX_FRAME_DT)
}
