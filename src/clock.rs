//! Host-driven frame pump
//!
//! The host calls [`Clock::frame`] once per display refresh with a monotonic
//! timestamp in seconds. The clock owns the world outright: it clamps the
//! delta, runs the hooks and the simulation step, forwards queued events to
//! the notifier, advances the status fade and finally hands live entities to
//! the renderer.

use glam::Vec2;

use crate::consts::{MAX_FRAME_DT, STATUS_FADE_SECS};
use crate::error::UpgradeError;
use crate::platform::{Drawable, NoHooks, Notifier, Renderer, StepHooks};
use crate::settings::Settings;
use crate::sim::progression::{self, UpgradeAxis};
use crate::sim::state::{Behavior, GameEvent, GameState, PauseState};
use crate::sim::tick::{TickInput, tick};
use crate::clamp_frame_delta;

/// Whether the host should keep scheduling frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Owns the world and its collaborators
pub struct Clock<R: Renderer, N: Notifier, H: StepHooks = NoHooks> {
    settings: Settings,
    state: GameState,
    renderer: R,
    notifier: N,
    hooks: H,
    running: bool,
    /// Timestamp of the previous frame (seconds)
    last_frame: Option<f64>,
    /// Seconds until the current status line is cleared
    status_fade: Option<f32>,
    input: TickInput,
    last_step: f32,
}

impl<R: Renderer, N: Notifier> Clock<R, N, NoHooks> {
    pub fn new(settings: Settings, renderer: R, notifier: N) -> Self {
        Self::with_hooks(settings, renderer, notifier, NoHooks)
    }
}

impl<R: Renderer, N: Notifier, H: StepHooks> Clock<R, N, H> {
    pub fn with_hooks(settings: Settings, renderer: R, notifier: N, hooks: H) -> Self {
        let state = GameState::new(&settings);
        Self {
            settings,
            state,
            renderer,
            notifier,
            hooks,
            running: false,
            last_frame: None,
            status_fade: None,
            input: TickInput::default(),
            last_step: 0.0,
        }
    }

    /// Reset the world and begin accepting frames
    pub fn start(&mut self, now: f64) {
        self.notifier.stop_all_looping_sounds();
        self.state = GameState::new(&self.settings);
        self.status_fade = None;
        self.input = TickInput::default();
        self.last_step = 0.0;
        self.last_frame = Some(now);
        self.running = true;
        log::info!(
            "Session started (seed {}, {}x{})",
            self.settings.seed,
            self.settings.width,
            self.settings.height
        );
        self.dispatch_events();
        self.notifier.update_hud(&self.state.hud);
    }

    /// Stop accepting frames; cancels loops and the pending status fade
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.last_frame = None;
        self.status_fade = None;
        self.notifier.stop_all_looping_sounds();
        log::info!("Session stopped (score {})", self.state.score);
    }

    pub fn set_input(&mut self, input: TickInput) {
        self.input = input;
    }

    /// Pump one frame
    pub fn frame(&mut self, now: f64) -> LoopControl {
        if !self.running {
            return LoopControl::Stop;
        }
        let raw = self.last_frame.map_or(0.0, |last| now - last);
        self.last_frame = Some(now);
        let dt = clamp_frame_delta(raw);

        if self.state.is_paused() {
            self.last_step = 0.0;
            self.dispatch_events();
            return LoopControl::Continue;
        }

        let dt = self.hooks.pre_step(&mut self.state, dt).clamp(0.0, MAX_FRAME_DT);
        tick(&mut self.state, &self.input, dt);
        self.hooks.post_step(&mut self.state, dt);
        self.last_step = dt;

        self.advance_status_fade(dt);
        self.dispatch_events();
        self.notifier.update_hud(&self.state.hud);

        if !self.settings.effective_screen_flash() {
            self.state.flash = 0.0;
        }
        self.render();
        LoopControl::Continue
    }

    /// Leave a pause or upgrade prompt; re-syncs the time baseline
    pub fn resume(&mut self, now: f64) {
        if self.state.pause == PauseState::Running {
            return;
        }
        self.state.pause = PauseState::Running;
        self.last_frame = Some(now);
        log::debug!("Resumed at {:.3}", now);
    }

    /// Player pause toggle; an upgrade prompt can only be left via `resume`
    pub fn toggle_pause(&mut self, now: f64) -> PauseState {
        match self.state.pause {
            PauseState::Running if !self.state.is_game_over() => {
                self.state.pause = PauseState::Paused;
            }
            PauseState::Paused => self.resume(now),
            _ => {}
        }
        self.state.pause
    }

    /// Spend upgrade points on one axis (upgrade prompt or dev tooling)
    pub fn purchase_upgrade(&mut self, axis: UpgradeAxis) -> Result<u8, UpgradeError> {
        let level = progression::purchase(&mut self.state, axis)?;
        self.dispatch_events();
        self.notifier.update_hud(&self.state.hud);
        Ok(level)
    }

    fn advance_status_fade(&mut self, dt: f32) {
        if let Some(remaining) = &mut self.status_fade {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.status_fade = None;
                self.notifier.clear_status();
            }
        }
    }

    fn dispatch_events(&mut self) {
        let volume = self.settings.effective_sfx_volume();
        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound { id, volume: v } => self.notifier.play_sound(id, v * volume),
                GameEvent::LoopStart { id, volume: v } => {
                    self.notifier.play_looping_sound(id, v * volume)
                }
                GameEvent::LoopStop { id } => self.notifier.stop_looping_sound(id),
                GameEvent::StopAllLoops => self.notifier.stop_all_looping_sounds(),
                GameEvent::Status { text, auto_fade } => {
                    self.status_fade = auto_fade.then_some(STATUS_FADE_SECS);
                    self.notifier.update_status(&text, auto_fade);
                }
                GameEvent::UpgradeChoiceRequested { points } => {
                    self.notifier
                        .pause_for_upgrade_choice(points, &self.state.upgrades);
                }
                GameEvent::GameOver { reason, score } => self.notifier.game_over(&reason, score),
                GameEvent::BossSpawned { kind } => log::debug!("event: {} spawned", kind.name()),
                GameEvent::BossDefeated { kind } => log::debug!("event: {} defeated", kind.name()),
                GameEvent::Explosion { .. }
                | GameEvent::EnemyDestroyed { .. }
                | GameEvent::AllyStunned { .. } => {}
            }
        }
    }

    /// Cosmetic offset; does not touch the simulation RNG
    fn shake_offset(&self) -> Vec2 {
        let shake = &self.state.screen_shake;
        if shake.remaining <= 0.0 || !self.settings.effective_screen_shake() {
            return Vec2::ZERO;
        }
        let t = self.state.session_time;
        Vec2::new((t * 97.0).sin(), (t * 57.0).cos()) * shake.intensity
    }

    fn render(&mut self) {
        let shake = self.shake_offset();
        let state = &self.state;
        let renderer = &mut self.renderer;
        renderer.begin_frame(state, shake);
        if !state.player.destroyed {
            renderer.draw(Drawable::Player(&state.player));
        }
        for ally in &state.allies {
            renderer.draw(Drawable::Ally(ally));
        }
        for pickup in &state.pickups {
            renderer.draw(Drawable::Pickup(pickup));
        }
        for shot in &state.projectiles {
            renderer.draw(Drawable::Projectile(shot));
        }
        for bolt in &state.enemy_projectiles {
            renderer.draw(Drawable::EnemyProjectile(bolt));
        }
        for enemy in state.enemies.iter().filter(|e| e.is_alive()) {
            renderer.draw(Drawable::Enemy(enemy));
            if let Behavior::FinalBoss(brain) = &enemy.behavior {
                if let Some(target) = brain.dash_warning() {
                    renderer.draw(Drawable::DashReticle(target));
                }
            }
        }
        for beam in &state.beams {
            renderer.draw(Drawable::Beam(beam));
        }
        for particle in &state.particles {
            renderer.draw(Drawable::Particle(particle));
        }
        renderer.end_frame();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds simulated by the most recent frame
    pub fn last_step(&self) -> f32 {
        self.last_step
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}
