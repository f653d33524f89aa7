//! Error types
//!
//! The simulation itself never fails: missing targets fall back to default
//! behavior and game over is a state, not an error. These types cover the
//! fallible edges - configuration loading, state dumps and upgrade purchases.

use thiserror::Error;

use crate::sim::progression::UpgradeAxis;

/// Errors raised while loading or exporting configuration and state
#[derive(Error, Debug)]
pub enum GameError {
    /// Error reading a settings file from disk
    #[error("Failed to read settings file '{path}': {source}")]
    SettingsRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON could not be parsed or produced
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is outside its allowed range
    #[error("Invalid setting '{field}': {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}

/// Reasons an upgrade purchase can be refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeError {
    /// Not enough upgrade points
    #[error("{axis:?} costs {cost} points but only {available} are available")]
    InsufficientPoints {
        axis: UpgradeAxis,
        cost: u32,
        available: u32,
    },

    /// Axis is already at its cap
    #[error("{axis:?} is already at its maximum level {cap}")]
    Maxed { axis: UpgradeAxis, cap: u8 },

    /// Laser axes need the laser ally
    #[error("{0:?} requires the laser ally")]
    Unavailable(UpgradeAxis),
}
