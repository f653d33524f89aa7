//! Void Legion headless runner
//!
//! Plays a session on autopilot at a fixed 60 Hz and logs the outcome.
//! Usage: `void-legion [settings.json] [seconds]`

use std::process::ExitCode;

use void_legion::devtools;
use void_legion::platform::{LogNotifier, NullRenderer};
use void_legion::sim::TickInput;
use void_legion::{Clock, LoopControl, Settings};

const FRAME_SECS: f64 = 1.0 / 60.0;
const DEFAULT_RUN_SECS: f64 = 120.0;

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings {
            auto_upgrade: true,
            ..Default::default()
        },
    };
    let run_secs = args
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(DEFAULT_RUN_SECS);

    log::info!("Void Legion (headless) starting, {:.0}s on autopilot", run_secs);
    let mut clock = Clock::new(settings, NullRenderer::default(), LogNotifier::default());
    clock.start(0.0);
    clock.set_input(TickInput {
        autopilot: true,
        ..Default::default()
    });

    let mut now = 0.0;
    while now < run_secs {
        now += FRAME_SECS;
        if clock.frame(now) == LoopControl::Stop {
            break;
        }
        if clock.state().is_paused() {
            // Prompts only appear with auto-upgrade off; keep playing
            clock.resume(now);
        }
        if clock.state().is_game_over() {
            break;
        }
    }

    let state = clock.state();
    match &clock.notifier().game_over_reason {
        Some(reason) => println!("Game over after {:.1}s: {}", state.session_time, reason),
        None => println!("Survived {:.1}s", state.session_time),
    }
    println!(
        "Score {} | shields {} | void mode {} | frames {}",
        state.score,
        state.player.shield_charges,
        state.is_void_mode(),
        clock.renderer().frames
    );
    if log::log_enabled!(log::Level::Trace) {
        match devtools::dump_state(state) {
            Ok(json) => log::trace!("final state: {}", json),
            Err(e) => log::warn!("state dump failed: {}", e),
        }
    }
    clock.stop();
    ExitCode::SUCCESS
}
