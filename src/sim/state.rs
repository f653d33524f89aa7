//! Game state and core simulation types
//!
//! Everything a session needs lives in [`GameState`]; it is owned by the
//! [`Clock`](crate::clock::Clock) and only mutated inside a tick.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boss::{BehemothBrain, FinalBossBrain, MonolithBrain};
use super::progression::{Unlocks, UpgradeLevels};
use crate::audio::SoundId;
use crate::consts::*;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Whether the run is still alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Player destroyed; entities keep animating, nothing collides
    GameOver,
}

/// Why the simulation step is being skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PauseState {
    Running,
    /// Paused by the player
    Paused,
    /// Waiting for the upgrade prompt to hand control back
    AwaitingUpgrade,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per reference frame
    pub speed: f32,
    pub projectile_size: f32,
    pub projectile_damage: f32,
    /// 1 = single shot, 2 = double shot
    pub fire_rate: u8,
    pub shield_charges: u32,
    pub heat: f32,
    pub max_heat: f32,
    /// Seconds left on a weapon jam (0 = not jammed)
    pub overheat_timer: f32,
    /// Seconds until the trigger can fire again
    pub fire_timer: f32,
    /// Lateral shove from jugglers, decays each tick
    pub knockback: Vec2,
    pub destroyed: bool,
}

impl Player {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            pos: Vec2::new(width / 2.0, height - PLAYER_BOTTOM_OFFSET),
            size: PLAYER_SIZE,
            speed: PLAYER_SPEED,
            projectile_size: PLAYER_PROJECTILE_SIZE,
            projectile_damage: PLAYER_PROJECTILE_DAMAGE,
            fire_rate: 1,
            shield_charges: 0,
            heat: 0.0,
            max_heat: MAX_HEAT,
            overheat_timer: 0.0,
            fire_timer: 0.0,
            knockback: Vec2::ZERO,
            destroyed: false,
        }
    }

    pub fn is_overheated(&self) -> bool {
        self.overheat_timer > 0.0
    }

    /// Add heat; returns true if this jammed the weapon
    pub fn add_heat(&mut self, amount: f32) -> bool {
        if self.is_overheated() {
            return false;
        }
        self.heat += amount;
        if self.heat >= self.max_heat {
            self.heat = self.max_heat;
            self.overheat_timer = OVERHEAT_LOCKOUT;
            return true;
        }
        false
    }

    /// Coolant pickup: clear heat and any jam
    pub fn vent(&mut self) {
        self.heat = 0.0;
        self.overheat_timer = 0.0;
    }
}

/// Enemy kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Standard,
    Scout,
    Brute,
    Shard,
    Shooter,
    Splitter,
    Seeker,
    Teleporter,
    Orbiter,
    Weaver,
    Bulwark,
    Sizzler,
    Juggler,
    Anchor,
    Tanker,
    Stunner,
    Boss,
    FinalBoss,
    Behemoth,
    Monolith,
}

impl EnemyKind {
    /// Kinds that spawn with the boss tag
    pub fn is_boss_kind(&self) -> bool {
        matches!(
            self,
            EnemyKind::Boss | EnemyKind::FinalBoss | EnemyKind::Behemoth | EnemyKind::Monolith
        )
    }

    /// Heavy kinds an anchor is willing to guard
    pub fn is_protectable(&self) -> bool {
        matches!(
            self,
            EnemyKind::Brute
                | EnemyKind::Bulwark
                | EnemyKind::Sizzler
                | EnemyKind::Tanker
                | EnemyKind::Stunner
                | EnemyKind::Behemoth
        )
    }

    /// Seconds between aimed shots, for kinds that shoot
    pub fn fire_cooldown(&self) -> Option<f32> {
        match self {
            EnemyKind::Shooter | EnemyKind::Orbiter => Some(2.0),
            EnemyKind::Teleporter => Some(1.5),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnemyKind::Standard => "standard",
            EnemyKind::Scout => "scout",
            EnemyKind::Brute => "brute",
            EnemyKind::Shard => "shard",
            EnemyKind::Shooter => "shooter",
            EnemyKind::Splitter => "splitter",
            EnemyKind::Seeker => "seeker",
            EnemyKind::Teleporter => "teleporter",
            EnemyKind::Orbiter => "orbiter",
            EnemyKind::Weaver => "weaver",
            EnemyKind::Bulwark => "bulwark",
            EnemyKind::Sizzler => "sizzler",
            EnemyKind::Juggler => "juggler",
            EnemyKind::Anchor => "anchor",
            EnemyKind::Tanker => "tanker",
            EnemyKind::Stunner => "stunner",
            EnemyKind::Boss => "boss",
            EnemyKind::FinalBoss => "final boss",
            EnemyKind::Behemoth => "behemoth",
            EnemyKind::Monolith => "monolith",
        }
    }
}

/// Pair bond between two enemies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkState {
    Unlinked,
    Linked { partner: u32 },
    /// Partner is gone; permanent speed burst and direct descent
    Enraged,
}

/// Kind-specific behavior payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    /// Fall and bounce off the side walls
    Drift,
    Seeker,
    Teleporter { teleport_timer: f32 },
    Orbiter { angle: f32, orbiting: bool },
    Weaver { base_x: f32, phase: f32 },
    Bulwark,
    Sizzler,
    Juggler,
    Anchor { ward: Option<u32>, angle: f32 },
    Stunner { stun_timer: f32 },
    FinalBoss(FinalBossBrain),
    Behemoth(BehemothBrain),
    Monolith(MonolithBrain),
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Horizontal drift, pixels per reference frame
    pub vx: f32,
    /// Pixels per reference frame
    pub speed: f32,
    /// Collision radius
    pub size: f32,
    pub health: f32,
    pub max_health: f32,
    pub color: u32,
    /// Polygon outline relative to `pos`
    pub shape: Vec<Vec2>,
    pub is_boss: bool,
    pub elite: bool,
    pub link: LinkState,
    /// Anchor currently guarding this enemy
    pub protected_by: Option<u32>,
    /// Summoned by a boss rather than the spawner
    pub summoned: bool,
    /// Seconds until the next aimed shot
    pub fire_timer: f32,
    pub behavior: Behavior,
    /// Set by the destruction handler; rewards never apply twice
    pub destroyed: bool,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0.0 && !self.destroyed
    }

    /// Apply damage; a guarded enemy cannot drop below 1 health.
    /// Returns true if the anchor's guard absorbed the killing blow.
    pub fn apply_damage(&mut self, damage: f32) -> bool {
        self.health -= damage;
        if self.protected_by.is_some() && self.health < 1.0 {
            self.health = 1.0;
            return true;
        }
        false
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileSource {
    Player,
    Ally,
    Echo,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileKind {
    Bolt,
    /// Stationary hazard that expires after its fuse
    Mine,
}

/// A projectile (player and enemy pools share the record)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Pixels per reference frame
    pub vel: Vec2,
    pub size: f32,
    pub damage: f32,
    pub color: u32,
    pub source: ProjectileSource,
    pub kind: ProjectileKind,
    pub homing: bool,
    pub target: Option<u32>,
    /// Seconds until expiry (homing shots and mines only)
    pub lifespan: Option<f32>,
}

impl Projectile {
    pub fn bolt(pos: Vec2, vel: Vec2, size: f32, damage: f32, source: ProjectileSource) -> Self {
        Self {
            pos,
            vel,
            size,
            damage,
            color: if source == ProjectileSource::Enemy {
                ENEMY_BOLT_COLOR
            } else {
                0x00ffff
            },
            source,
            kind: ProjectileKind::Bolt,
            homing: false,
            target: None,
            lifespan: None,
        }
    }

    pub fn homing(pos: Vec2, vel: Vec2, size: f32, damage: f32) -> Self {
        Self {
            color: 0xe500ff,
            homing: true,
            lifespan: Some(HOMING_LIFESPAN),
            ..Self::bolt(pos, vel, size, damage, ProjectileSource::Echo)
        }
    }

    pub fn mine(pos: Vec2) -> Self {
        Self {
            color: 0xff0000,
            kind: ProjectileKind::Mine,
            lifespan: Some(MINE_FUSE),
            ..Self::bolt(pos, Vec2::ZERO, MINE_SIZE, 1.0, ProjectileSource::Enemy)
        }
    }

    pub fn is_expired(&self) -> bool {
        self.lifespan.is_some_and(|t| t <= 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DroneSide {
    Left,
    Right,
}

/// Heavy laser duty cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaserState {
    pub firing: bool,
    /// Seconds left in the current firing or cooldown window
    pub phase_timer: f32,
    /// Where the beam currently lands (cosmetic)
    pub beam_end: Option<Vec2>,
}

/// Ally variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AllyKind {
    /// Twin escort drone with autofire
    Drone { side: DroneSide, fire_timer: f32 },
    /// Sustained beam unit
    Laser(LaserState),
    /// Refracts player shots into homing swarms
    Echo { pulse: f32 },
}

/// An allied unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ally {
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per reference frame (retreat speed)
    pub speed: f32,
    pub kind: AllyKind,
    /// Seconds of stun remaining
    pub stun_timer: f32,
    pub retreating: bool,
}

impl Ally {
    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    pub fn is_laser(&self) -> bool {
        matches!(self.kind, AllyKind::Laser(_))
    }

    pub fn is_echo(&self) -> bool {
        matches!(self.kind, AllyKind::Echo { .. })
    }
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub radius: f32,
    /// Seconds remaining
    pub life: f32,
    pub max_life: f32,
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    /// Clears heat and weapon jams
    Coolant,
}

/// A pickup entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
}

impl Pickup {
    pub fn coolant(pos: Vec2) -> Self {
        Self {
            kind: PickupKind::Coolant,
            pos,
            vel: Vec2::new(0.0, 2.0),
            size: 10.0,
        }
    }
}

/// Cosmetic stunner beam
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beam {
    pub from: Vec2,
    pub to: Vec2,
    pub color: u32,
    pub life: f32,
}

/// Screen shake countdown
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScreenShake {
    pub remaining: f32,
    pub intensity: f32,
}

/// Extended boss bookkeeping for Void Mode
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ExtendedBosses {
    pub behemoth_spawned: bool,
    pub behemoth_defeated: bool,
    pub monolith_spawned: bool,
    pub monolith_defeated: bool,
}

/// Side effects produced during a tick, drained by the clock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound { id: SoundId, volume: f32 },
    LoopStart { id: SoundId, volume: f32 },
    LoopStop { id: SoundId },
    StopAllLoops,
    Status { text: String, auto_fade: bool },
    /// An enemy went through the destruction handler (or was cleared by the final boss)
    Explosion { pos: Vec2, color: u32, count: u32 },
    EnemyDestroyed { id: u32, kind: EnemyKind, pos: Vec2 },
    BossSpawned { kind: EnemyKind },
    BossDefeated { kind: EnemyKind },
    AllyStunned { pos: Vec2 },
    UpgradeChoiceRequested { points: u32 },
    GameOver { reason: String, score: u64 },
}

/// HUD-facing values recomputed every active frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub score: u64,
    pub shield_charges: u32,
    /// Whole seconds of game time (void time in Void Mode)
    pub time_secs: u32,
    pub void_mode: bool,
    pub upgrade_points: u32,
    /// 0..=1
    pub heat: f32,
    pub overheated: bool,
    pub heat_visible: bool,
    /// 0..=1 while the final boss is on the field
    pub final_boss_health: Option<f32>,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub width: f32,
    pub height: f32,
    pub tuning: Tuning,
    pub auto_upgrade: bool,
    pub max_particles: usize,

    pub phase: GamePhase,
    pub pause: PauseState,

    pub player: Player,
    pub allies: Vec<Ally>,
    /// Player-owned projectiles (player, ally and echo shots)
    pub projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub pickups: Vec<Pickup>,
    pub beams: Vec<Beam>,

    pub score: u64,
    /// Seconds of game time; restarts at 0 when Void Mode begins
    pub game_time: f32,
    /// Seconds simulated this session, never reset
    pub session_time: f32,
    /// Seconds until the next regular spawn
    pub spawn_timer: f32,
    pub next_boss_time: f32,
    pub next_shield_score: u64,

    pub upgrade_points: u32,
    pub upgrades: UpgradeLevels,
    pub unlocks: Unlocks,

    pub is_boss_active: bool,
    pub is_final_boss_active: bool,
    pub final_boss: Option<u32>,
    pub final_boss_warning_shown: bool,
    pub final_boss_defeated: bool,
    pub extended: ExtendedBosses,

    /// Aimed fire and heat, unlocked by beating the final boss
    pub aim_unlocked: bool,
    /// Dev tooling: player ignores collisions
    pub god_mode: bool,

    pub screen_shake: ScreenShake,
    /// Seconds of white flash remaining
    pub flash: f32,

    pub hud: Hud,
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a fresh session from settings
    pub fn new(settings: &Settings) -> Self {
        let tuning = settings.tuning.clone();
        let mut state = Self {
            seed: settings.seed,
            rng: Pcg32::seed_from_u64(settings.seed),
            width: settings.width,
            height: settings.height,
            auto_upgrade: settings.auto_upgrade,
            max_particles: settings.max_particles(),
            phase: GamePhase::Playing,
            pause: PauseState::Running,
            player: Player::new(settings.width, settings.height),
            allies: Vec::new(),
            projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            pickups: Vec::new(),
            beams: Vec::new(),
            score: 0,
            game_time: 0.0,
            session_time: 0.0,
            spawn_timer: 0.0,
            next_boss_time: tuning.boss_first_spawn,
            next_shield_score: tuning.shield_recharge_step,
            upgrade_points: 0,
            upgrades: UpgradeLevels::default(),
            unlocks: Unlocks::default(),
            is_boss_active: false,
            is_final_boss_active: false,
            final_boss: None,
            final_boss_warning_shown: false,
            final_boss_defeated: false,
            extended: ExtendedBosses::default(),
            aim_unlocked: false,
            god_mode: false,
            screen_shake: ScreenShake::default(),
            flash: 0.0,
            hud: Hud::default(),
            events: Vec::new(),
            next_id: 1,
            tuning,
        };
        state.status("Ready", false);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    pub fn is_paused(&self) -> bool {
        self.pause != PauseState::Running
    }

    /// Void Mode is everything after the final boss falls
    pub fn is_void_mode(&self) -> bool {
        self.final_boss_defeated
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn has_laser(&self) -> bool {
        self.allies.iter().any(Ally::is_laser)
    }

    pub fn has_echo(&self) -> bool {
        self.allies.iter().any(Ally::is_echo)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn sound(&mut self, id: SoundId, volume: f32) {
        self.events.push(GameEvent::Sound { id, volume });
    }

    pub fn status(&mut self, text: impl Into<String>, auto_fade: bool) {
        self.events.push(GameEvent::Status {
            text: text.into(),
            auto_fade,
        });
    }

    /// Take every queued event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start (or strengthen) a screen shake; durations are in reference frames
    pub fn shake(&mut self, frames: f32, intensity: f32) {
        let secs = frames / REFERENCE_FPS;
        self.screen_shake.remaining = self.screen_shake.remaining.max(secs);
        self.screen_shake.intensity = intensity;
    }

    /// Start a white flash; duration in reference frames
    pub fn flash(&mut self, frames: f32) {
        self.flash = self.flash.max(frames / REFERENCE_FPS);
    }

    /// Burst of cosmetic particles, oldest ones dropped past the cap
    pub fn spawn_particles(&mut self, pos: Vec2, color: u32, count: u32) {
        if self.max_particles == 0 {
            return;
        }
        let count = (count as usize).min(self.max_particles);
        let overflow = (self.particles.len() + count).saturating_sub(self.max_particles);
        if overflow > 0 {
            self.particles.drain(..overflow);
        }
        for _ in 0..count {
            let max_life = self.rng.random_range(20.0..60.0) / REFERENCE_FPS;
            let particle = Particle {
                pos,
                vel: Vec2::new(
                    self.rng.random_range(-2.0..2.0),
                    self.rng.random_range(-2.0..2.0),
                ),
                color,
                radius: self.rng.random_range(1.0..4.0),
                life: max_life,
                max_life,
            };
            self.particles.push(particle);
        }
    }

    /// Particles plus an explosion event for the collaborators
    pub fn explode(&mut self, pos: Vec2, color: u32, count: u32) {
        self.spawn_particles(pos, color, count);
        self.events.push(GameEvent::Explosion { pos, color, count });
    }

    /// Heat the player's weapon (aim mode only); announces a jam
    pub fn add_player_heat(&mut self, amount: f32) {
        if !self.aim_unlocked || self.player.destroyed {
            return;
        }
        if self.player.add_heat(amount) {
            self.sound(SoundId::FinalBossWarning, 1.0);
            self.status("WEAPON JAMMED!", true);
            log::debug!("Weapon jammed");
        }
    }

    /// Uniform random in `[0, 1)`
    pub fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(&Settings::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.next_boss_time, 60.0);
        assert_eq!(state.next_shield_score, 1500);
        assert_eq!(state.player.pos, Vec2::new(400.0, 560.0));
        assert!(!state.is_boss_active && !state.is_final_boss_active);
        assert!(matches!(
            state.events.first(),
            Some(GameEvent::Status { auto_fade: false, .. })
        ));
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(&Settings::default());
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_particle_cap() {
        let settings = Settings::from_preset(crate::settings::QualityPreset::Low);
        let mut state = GameState::new(&settings);
        state.spawn_particles(Vec2::ZERO, 0xffffff, 400);
        state.spawn_particles(Vec2::ZERO, 0xffffff, 100);
        assert_eq!(state.particles.len(), settings.max_particles());
    }

    #[test]
    fn test_heat_jams_at_max() {
        let mut player = Player::new(800.0, 600.0);
        for _ in 0..9 {
            assert!(!player.add_heat(HEAT_PER_SHOT));
        }
        assert!(player.add_heat(HEAT_PER_SHOT));
        assert!(player.is_overheated());
        assert_eq!(player.heat, MAX_HEAT);
        player.vent();
        assert!(!player.is_overheated());
        assert_eq!(player.heat, 0.0);
    }

    #[test]
    fn test_guarded_enemy_survives_lethal_damage() {
        let mut state = GameState::new(&Settings::default());
        let id = super::super::enemy::spawn_enemy(
            &mut state,
            super::super::enemy::EnemySpawn {
                kind: EnemyKind::Tanker,
                ..Default::default()
            },
        );
        let enemy = state.enemy_mut(id).expect("spawned");
        enemy.protected_by = Some(99);
        assert!(enemy.apply_damage(1000.0));
        assert_eq!(enemy.health, 1.0);
    }
}
