//! Symbolic sound identifiers
//!
//! The simulation only names sounds; playback belongs to the host's
//! [`Notifier`](crate::platform::Notifier).

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundId {
    /// Player or ally fires
    Shoot,
    /// Enemy fires a bolt (also used for teleports)
    EnemyShoot,
    /// Regular enemy destroyed
    EnemyDefeated,
    /// Player ship destroyed
    PlayerDead,
    /// Score unlock or shield recharge
    PlayerUpgraded,
    /// Upgrade point spent on an ally
    AllyUpgraded,
    /// Final boss warning siren (also weapon jam)
    FinalBossWarning,
    /// Final boss finishes its entrance
    FinalBossBegin,
    /// Boss-class enemy destroyed
    FinalBossExplosion,
    /// Laser ally beam loop
    Lasering,
}

impl SoundId {
    /// Asset key the host uses to look the sound up
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundId::Shoot => "shoot",
            SoundId::EnemyShoot => "enemyShoot",
            SoundId::EnemyDefeated => "enemyDefeated",
            SoundId::PlayerDead => "PlayerDead",
            SoundId::PlayerUpgraded => "Playerupgraded",
            SoundId::AllyUpgraded => "AIupgraded",
            SoundId::FinalBossWarning => "finalbossWarning",
            SoundId::FinalBossBegin => "finalbossBegin",
            SoundId::FinalBossExplosion => "finalbossExplosion",
            SoundId::Lasering => "laseringSound",
        }
    }
}
