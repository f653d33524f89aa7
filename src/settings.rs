//! Session configuration and player preferences
//!
//! Loaded from JSON; any missing field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::error::GameError;
use crate::tuning::Tuning;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 150,
            QualityPreset::Medium => 600,
            QualityPreset::High => 2000,
        }
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// RNG seed for the session
    pub seed: u64,
    /// Playfield size in pixels
    pub width: f32,
    pub height: f32,
    /// Spend upgrade points automatically instead of prompting
    pub auto_upgrade: bool,

    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on explosions/impacts
    pub screen_shake: bool,
    /// Particle effects (explosions, sparks, etc.)
    pub particles: bool,
    /// White flash on boss kills and game over
    pub screen_flash: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Accessibility ===
    /// Reduced motion (minimize shake, flashes)
    pub reduced_motion: bool,

    /// Balance sheet
    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            auto_upgrade: false,

            quality: QualityPreset::Medium,

            // Visual effects - all on by default
            screen_shake: true,
            particles: true,
            screen_flash: true,

            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,

            // Accessibility
            reduced_motion: false,

            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset disables the flash for performance
        if preset == QualityPreset::Low {
            self.screen_flash = false;
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective screen flash (respects reduced_motion)
    pub fn effective_screen_flash(&self) -> bool {
        self.screen_flash && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Volume multiplier applied to every sound trigger
    pub fn effective_sfx_volume(&self) -> f32 {
        self.master_volume * self.sfx_volume
    }

    /// Parse settings from JSON and validate them
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| GameError::SettingsRead {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject impossible playfields, clamp volumes into range
    pub fn validate(&mut self) -> Result<(), GameError> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(GameError::InvalidSetting {
                field: "width/height",
                reason: format!("playfield must be positive, got {}x{}", self.width, self.height),
            });
        }
        for (name, volume) in [
            ("master_volume", &mut self.master_volume),
            ("sfx_volume", &mut self.sfx_volume),
        ] {
            if !(0.0..=1.0).contains(volume) {
                log::warn!("{} {} out of range, clamping", name, volume);
                *volume = volume.clamp(0.0, 1.0);
            }
        }
        self.tuning.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{ "seed": 7, "auto_upgrade": true }"#)
            .expect("valid settings");
        assert_eq!(settings.seed, 7);
        assert!(settings.auto_upgrade);
        assert_eq!(settings.width, DEFAULT_WIDTH);
        assert_eq!(settings.tuning.final_boss_spawn, 300.0);
    }

    #[test]
    fn test_volume_is_clamped() {
        let settings = Settings::from_json(r#"{ "master_volume": 3.0 }"#).expect("valid settings");
        assert_eq!(settings.master_volume, 1.0);
    }

    #[test]
    fn test_rejects_empty_playfield() {
        let err = Settings::from_json(r#"{ "width": 0.0 }"#).unwrap_err();
        assert!(matches!(err, GameError::InvalidSetting { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Settings::from_json("{ nope"),
            Err(GameError::Json(_))
        ));
    }

    #[test]
    fn test_reduced_motion_disables_effects() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_screen_flash());
    }

    #[test]
    fn test_preset_particle_caps() {
        assert_eq!(Settings::from_preset(QualityPreset::Low).max_particles(), 150);
        let no_particles = Settings {
            particles: false,
            ..Default::default()
        };
        assert_eq!(no_particles.max_particles(), 0);
    }

    #[test]
    fn test_quality_comes_from_json() {
        let settings = Settings::from_json(r#"{ "quality": "High" }"#).expect("valid settings");
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.max_particles(), 2000);
        assert!(Settings::from_json(r#"{ "quality": "ultra" }"#).is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_tuning() {
        let mut settings = Settings::default();
        settings.tuning.kill_score = 42;
        let json = settings.to_json().expect("serializable");
        let back = Settings::from_json(&json).expect("valid settings");
        assert_eq!(back.tuning.kill_score, 42);
    }
}
