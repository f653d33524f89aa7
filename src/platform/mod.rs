//! Platform abstraction layer
//!
//! The simulation never draws, plays audio or touches UI widgets. Hosts plug
//! those in through three narrow seams:
//! - [`Renderer`]: draws live entities after all mutation for the frame
//! - [`Notifier`]: sound, status line, HUD, upgrade prompt and game over
//! - [`StepHooks`]: explicit pre/post-step interception (dev tooling)

use glam::Vec2;

use crate::audio::SoundId;
use crate::sim::progression::UpgradeLevels;
use crate::sim::state::{
    Ally, Beam, Enemy, GameState, Hud, Particle, Pickup, Player, Projectile,
};

/// One live entity handed to the renderer
#[derive(Debug, Clone, Copy)]
pub enum Drawable<'a> {
    Player(&'a Player),
    Ally(&'a Ally),
    Projectile(&'a Projectile),
    EnemyProjectile(&'a Projectile),
    Enemy(&'a Enemy),
    Particle(&'a Particle),
    Pickup(&'a Pickup),
    Beam(&'a Beam),
    /// Final boss dash target, shown until the charge starts
    DashReticle(Vec2),
}

/// Draw side of the host
pub trait Renderer {
    /// Called once per frame before any `draw`; `shake` is the current offset
    fn begin_frame(&mut self, state: &GameState, shake: Vec2);
    fn draw(&mut self, drawable: Drawable<'_>);
    fn end_frame(&mut self);
}

/// Audio, status text, HUD and upgrade UI. Fire-and-forget.
pub trait Notifier {
    fn play_sound(&mut self, id: SoundId, volume: f32);
    fn play_looping_sound(&mut self, id: SoundId, volume: f32);
    fn stop_looping_sound(&mut self, id: SoundId);
    fn stop_all_looping_sounds(&mut self);
    /// A new status supersedes any pending fade
    fn update_status(&mut self, text: &str, auto_fade: bool);
    fn clear_status(&mut self);
    fn update_hud(&mut self, hud: &Hud);
    /// The host resumes play with [`Clock::resume`](crate::clock::Clock::resume)
    fn pause_for_upgrade_choice(&mut self, points: u32, levels: &UpgradeLevels);
    fn game_over(&mut self, reason: &str, score: u64);
}

/// Explicit interception points around the simulation step
pub trait StepHooks {
    /// May rewrite the world or the step; returns the delta to simulate
    fn pre_step(&mut self, state: &mut GameState, dt: f32) -> f32 {
        let _ = state;
        dt
    }

    fn post_step(&mut self, state: &mut GameState, dt: f32) {
        let _ = (state, dt);
    }
}

/// Renderer that draws nothing (headless runs, tests)
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub last_draw_count: usize,
    draw_count: usize,
}

impl Renderer for NullRenderer {
    fn begin_frame(&mut self, _state: &GameState, _shake: Vec2) {
        self.draw_count = 0;
    }

    fn draw(&mut self, _drawable: Drawable<'_>) {
        self.draw_count += 1;
    }

    fn end_frame(&mut self) {
        self.frames += 1;
        self.last_draw_count = self.draw_count;
    }
}

/// Notifier that forwards everything to the `log` facade
#[derive(Debug, Default)]
pub struct LogNotifier {
    pub last_status: Option<String>,
    pub last_hud: Hud,
    pub game_over_reason: Option<String>,
}

impl Notifier for LogNotifier {
    fn play_sound(&mut self, id: SoundId, volume: f32) {
        log::trace!("sound {} @ {:.2}", id.as_str(), volume);
    }

    fn play_looping_sound(&mut self, id: SoundId, volume: f32) {
        log::debug!("loop start {} @ {:.2}", id.as_str(), volume);
    }

    fn stop_looping_sound(&mut self, id: SoundId) {
        log::debug!("loop stop {}", id.as_str());
    }

    fn stop_all_looping_sounds(&mut self) {
        log::debug!("all loops stopped");
    }

    fn update_status(&mut self, text: &str, _auto_fade: bool) {
        log::info!("status: {}", text);
        self.last_status = Some(text.to_string());
    }

    fn clear_status(&mut self) {
        self.last_status = None;
    }

    fn update_hud(&mut self, hud: &Hud) {
        self.last_hud = hud.clone();
    }

    fn pause_for_upgrade_choice(&mut self, points: u32, levels: &UpgradeLevels) {
        log::info!("upgrade choice: {} points, levels {:?}", points, levels);
    }

    fn game_over(&mut self, reason: &str, score: u64) {
        log::info!("game over: {} (score {})", reason, score);
        self.game_over_reason = Some(reason.to_string());
    }
}

/// Hooks that leave every step untouched
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl StepHooks for NoHooks {}

/// Notifier that records every call, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sounds: Vec<(SoundId, f32)>,
    pub loops_started: Vec<SoundId>,
    pub loops_stopped: Vec<SoundId>,
    pub stop_all_calls: usize,
    pub statuses: Vec<(String, bool)>,
    pub clears: usize,
    pub hud_updates: usize,
    pub upgrade_prompts: Vec<u32>,
    pub game_overs: Vec<(String, u64)>,
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn play_sound(&mut self, id: SoundId, volume: f32) {
        self.sounds.push((id, volume));
    }

    fn play_looping_sound(&mut self, id: SoundId, _volume: f32) {
        self.loops_started.push(id);
    }

    fn stop_looping_sound(&mut self, id: SoundId) {
        self.loops_stopped.push(id);
    }

    fn stop_all_looping_sounds(&mut self) {
        self.stop_all_calls += 1;
    }

    fn update_status(&mut self, text: &str, auto_fade: bool) {
        self.statuses.push((text.to_string(), auto_fade));
    }

    fn clear_status(&mut self) {
        self.clears += 1;
    }

    fn update_hud(&mut self, _hud: &Hud) {
        self.hud_updates += 1;
    }

    fn pause_for_upgrade_choice(&mut self, points: u32, _levels: &UpgradeLevels) {
        self.upgrade_prompts.push(points);
    }

    fn game_over(&mut self, reason: &str, score: u64) {
        self.game_overs.push((reason.to_string(), score));
    }
}
