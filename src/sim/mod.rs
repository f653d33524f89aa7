//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed-time scaling only (no wall clock)
//! - Seeded RNG only
//! - Stable iteration order (insertion order, ids never reused)
//! - No rendering or platform dependencies; side effects leave as events

pub mod ally;
pub mod boss;
pub mod collision;
pub mod destruction;
pub mod enemy;
pub mod progression;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, resolve_collisions};
pub use destruction::{destroy_enemy, game_over, reap};
pub use progression::{UpgradeAxis, UpgradeLevels, Unlocks};
pub use state::{
    Ally, AllyKind, Behavior, Enemy, EnemyKind, GameEvent, GamePhase, GameState, Hud, PauseState,
    Pickup, PickupKind, Player, Projectile, ProjectileKind, ProjectileSource,
};
pub use tick::{TickInput, refresh_hud, tick};
