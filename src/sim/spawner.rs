//! Spawn scheduling: regular waves, boss encounters and the final boss
//!
//! Everything here runs on game time, which restarts at zero when Void Mode
//! begins, so the same thresholds drive both the normal run and the void
//! schedule.

use super::enemy::{EnemySpawn, spawn_enemy, spawn_linked_pair};
use super::state::{EnemyKind, GameEvent, GameState};
use crate::audio::SoundId;

/// Length of one spawn-table band
const BAND_SECS: f32 = 60.0;
/// Void time after which tankers and stunners join
const VOID_HEAVY_AFTER: f32 = 240.0;

type Weights = &'static [(EnemyKind, u32)];

const NORMAL_BANDS: [Weights; 4] = [
    &[
        (EnemyKind::Standard, 25),
        (EnemyKind::Shard, 20),
        (EnemyKind::Splitter, 15),
        (EnemyKind::Scout, 15),
        (EnemyKind::Brute, 15),
        (EnemyKind::Seeker, 10),
    ],
    &[
        (EnemyKind::Standard, 20),
        (EnemyKind::Shard, 15),
        (EnemyKind::Splitter, 15),
        (EnemyKind::Scout, 5),
        (EnemyKind::Brute, 15),
        (EnemyKind::Seeker, 10),
        (EnemyKind::Shooter, 20),
    ],
    &[
        (EnemyKind::Standard, 10),
        (EnemyKind::Shard, 10),
        (EnemyKind::Splitter, 15),
        (EnemyKind::Scout, 5),
        (EnemyKind::Brute, 15),
        (EnemyKind::Seeker, 15),
        (EnemyKind::Shooter, 20),
        (EnemyKind::Teleporter, 10),
    ],
    &[
        (EnemyKind::Standard, 5),
        (EnemyKind::Shard, 5),
        (EnemyKind::Splitter, 5),
        (EnemyKind::Scout, 5),
        (EnemyKind::Brute, 5),
        (EnemyKind::Seeker, 25),
        (EnemyKind::Shooter, 25),
        (EnemyKind::Teleporter, 25),
    ],
];

const VOID_BANDS: [Weights; 4] = [
    &[
        (EnemyKind::Orbiter, 30),
        (EnemyKind::Weaver, 30),
        (EnemyKind::Bulwark, 30),
        (EnemyKind::Teleporter, 10),
    ],
    &[
        (EnemyKind::Orbiter, 15),
        (EnemyKind::Weaver, 30),
        (EnemyKind::Bulwark, 30),
        (EnemyKind::Teleporter, 10),
        (EnemyKind::Juggler, 15),
    ],
    &[
        (EnemyKind::Orbiter, 15),
        (EnemyKind::Weaver, 15),
        (EnemyKind::Bulwark, 30),
        (EnemyKind::Teleporter, 10),
        (EnemyKind::Juggler, 15),
        (EnemyKind::Sizzler, 15),
    ],
    &[
        (EnemyKind::Orbiter, 15),
        (EnemyKind::Weaver, 15),
        (EnemyKind::Bulwark, 15),
        (EnemyKind::Teleporter, 10),
        (EnemyKind::Juggler, 15),
        (EnemyKind::Sizzler, 15),
        (EnemyKind::Anchor, 15),
    ],
];

const VOID_HEAVIES: Weights = &[(EnemyKind::Tanker, 10), (EnemyKind::Stunner, 10)];

/// Weighted table for the current mode and time band
pub fn spawn_weights(void_mode: bool, game_time: f32) -> Vec<(EnemyKind, u32)> {
    let band = ((game_time.max(0.0) / BAND_SECS) as usize).min(3);
    let mut weights = if void_mode {
        VOID_BANDS[band].to_vec()
    } else {
        NORMAL_BANDS[band].to_vec()
    };
    if void_mode && game_time >= VOID_HEAVY_AFTER {
        weights.extend_from_slice(VOID_HEAVIES);
    }
    weights
}

/// Weighted pick; `roll` is uniform in `[0, 1)`
pub fn pick_weighted(weights: &[(EnemyKind, u32)], roll: f32) -> EnemyKind {
    let total: u32 = weights.iter().map(|(_, w)| w).sum();
    let mut remaining = roll * total as f32;
    for &(kind, weight) in weights {
        remaining -= weight as f32;
        if remaining < 0.0 {
            return kind;
        }
    }
    weights.last().map(|(kind, _)| *kind).unwrap_or_default()
}

fn any_boss_active(state: &GameState) -> bool {
    state.is_boss_active || state.is_final_boss_active
}

/// Decide what enters the field this frame
pub fn update_spawning(state: &mut GameState, dt: f32) {
    if !any_boss_active(state) {
        state.spawn_timer -= dt;
        if state.spawn_timer <= 0.0 {
            state.spawn_timer = state.tuning.spawn_interval(state.game_time);
            spawn_regular(state);
        }
    }

    if state.is_void_mode() {
        update_void_bosses(state);
        return;
    }

    if state.game_time >= state.tuning.final_boss_warning && !state.final_boss_warning_shown {
        state.final_boss_warning_shown = true;
        state.status("!!! FINAL BOSS WARNING !!!", true);
        state.sound(SoundId::FinalBossWarning, 1.0);
        log::info!("Final boss warning at {:.1}s", state.game_time);
    }

    if state.game_time >= state.tuning.final_boss_spawn
        && !state.is_final_boss_active
        && state.final_boss.is_none()
    {
        spawn_final_boss(state);
        return;
    }

    if state.game_time >= state.next_boss_time && !any_boss_active(state) {
        spawn_regular_boss(state);
        state.next_boss_time += state.tuning.boss_period;
    }
}

fn roll_elite(state: &mut GameState) -> bool {
    let chance = if state.is_void_mode() {
        state.tuning.void_elite_chance
    } else if state.game_time >= state.tuning.elite_after {
        state.tuning.elite_chance
    } else {
        return false;
    };
    state.roll() < chance
}

fn spawn_regular(state: &mut GameState) {
    let weights = spawn_weights(state.is_void_mode(), state.game_time);
    let roll = state.roll();
    let kind = pick_weighted(&weights, roll);
    let elite = roll_elite(state);

    let linked = state.is_void_mode()
        && state.game_time >= state.tuning.linked_after
        && state.roll() < state.tuning.void_linked_chance;
    if linked {
        let (a, b) = spawn_linked_pair(state, kind, elite);
        log::debug!("Linked {} pair {} + {}", kind.name(), a, b);
    } else {
        spawn_enemy(
            state,
            EnemySpawn {
                kind,
                elite,
                ..Default::default()
            },
        );
    }
}

/// Regular boss encounter
pub fn spawn_regular_boss(state: &mut GameState) -> u32 {
    let id = spawn_enemy(
        state,
        EnemySpawn {
            kind: EnemyKind::Boss,
            ..Default::default()
        },
    );
    state.is_boss_active = true;
    state.status("Boss appeared!", true);
    state.push_event(GameEvent::BossSpawned {
        kind: EnemyKind::Boss,
    });
    log::info!("Boss spawned at {:.1}s", state.game_time);
    id
}

/// Clear the field and install the final boss as the only enemy
pub fn spawn_final_boss(state: &mut GameState) -> u32 {
    let cleared = std::mem::take(&mut state.enemies);
    for enemy in &cleared {
        state.explode(enemy.pos, enemy.color, enemy.size as u32);
    }
    state.enemy_projectiles.clear();

    let id = spawn_enemy(
        state,
        EnemySpawn {
            kind: EnemyKind::FinalBoss,
            ..Default::default()
        },
    );
    state.is_boss_active = false;
    state.is_final_boss_active = true;
    state.final_boss = Some(id);
    state.final_boss_warning_shown = true;

    state.status("!!! FINAL BOSS APPEARED !!!", true);
    state.sound(SoundId::FinalBossBegin, 1.0);
    state.shake(120.0, 4.0);
    state.push_event(GameEvent::BossSpawned {
        kind: EnemyKind::FinalBoss,
    });
    log::info!(
        "Final boss spawned at {:.1}s, cleared {} enemies",
        state.game_time,
        cleared.len()
    );
    id
}

fn update_void_bosses(state: &mut GameState) {
    if any_boss_active(state) {
        return;
    }
    let extended = state.extended;
    if !extended.behemoth_spawned && state.game_time >= state.tuning.behemoth_spawn {
        spawn_extended_boss(state, EnemyKind::Behemoth);
    } else if extended.behemoth_defeated
        && !extended.monolith_spawned
        && state.game_time >= state.tuning.monolith_spawn
    {
        spawn_extended_boss(state, EnemyKind::Monolith);
    }
}

/// Void Mode encounter boss (Behemoth or Monolith)
pub fn spawn_extended_boss(state: &mut GameState, kind: EnemyKind) -> u32 {
    let id = spawn_enemy(
        state,
        EnemySpawn {
            kind,
            ..Default::default()
        },
    );
    match kind {
        EnemyKind::Behemoth => state.extended.behemoth_spawned = true,
        EnemyKind::Monolith => state.extended.monolith_spawned = true,
        _ => {}
    }
    state.is_boss_active = true;
    state.status(format!("WARNING: {} APPROACHING!", kind.name().to_uppercase()), true);
    state.sound(SoundId::FinalBossWarning, 1.0);
    state.shake(60.0, 6.0);
    state.push_event(GameEvent::BossSpawned { kind });
    log::info!("{} spawned at void time {:.1}s", kind.name(), state.game_time);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn state() -> GameState {
        GameState::new(&Settings::default())
    }

    fn count(state: &GameState, kind: EnemyKind) -> usize {
        state.enemies.iter().filter(|e| e.kind == kind).count()
    }

    #[test]
    fn test_weighted_pick_edges() {
        let weights = [(EnemyKind::Scout, 1), (EnemyKind::Brute, 3)];
        assert_eq!(pick_weighted(&weights, 0.0), EnemyKind::Scout);
        assert_eq!(pick_weighted(&weights, 0.24), EnemyKind::Scout);
        assert_eq!(pick_weighted(&weights, 0.26), EnemyKind::Brute);
        assert_eq!(pick_weighted(&weights, 0.999), EnemyKind::Brute);
        assert_eq!(pick_weighted(&[], 0.5), EnemyKind::Standard);
    }

    #[test]
    fn test_bands() {
        let intro = spawn_weights(false, 10.0);
        assert!(!intro.iter().any(|(k, _)| *k == EnemyKind::Shooter));
        let late = spawn_weights(false, 250.0);
        assert!(late.iter().any(|(k, _)| *k == EnemyKind::Teleporter));

        let void_early = spawn_weights(true, 0.0);
        assert!(!void_early.iter().any(|(k, _)| *k == EnemyKind::Juggler));
        let void_late = spawn_weights(true, 250.0);
        assert!(void_late.iter().any(|(k, _)| *k == EnemyKind::Anchor));
        assert!(void_late.iter().any(|(k, _)| *k == EnemyKind::Stunner));
        assert!(!spawn_weights(true, 200.0)
            .iter()
            .any(|(k, _)| *k == EnemyKind::Tanker));
    }

    #[test]
    fn test_regular_spawn_cadence() {
        let mut state = state();
        update_spawning(&mut state, 0.1);
        assert_eq!(state.enemies.len(), 1);
        assert!((state.spawn_timer - 1.2).abs() < 1e-6);
        update_spawning(&mut state, 1.0);
        assert_eq!(state.enemies.len(), 1);
        update_spawning(&mut state, 0.3);
        assert_eq!(state.enemies.len(), 2);
    }

    #[test]
    fn test_no_regular_spawns_during_boss() {
        let mut state = state();
        state.is_boss_active = true;
        for _ in 0..20 {
            update_spawning(&mut state, 0.25);
        }
        assert!(state.enemies.is_empty());
    }

    #[test]
    fn test_regular_boss_schedule() {
        let mut state = state();
        state.game_time = 60.0;
        update_spawning(&mut state, 0.0);
        assert_eq!(count(&state, EnemyKind::Boss), 1);
        assert!(state.is_boss_active);
        assert_eq!(state.next_boss_time, 120.0);

        state.game_time = 130.0;
        update_spawning(&mut state, 0.0);
        assert_eq!(count(&state, EnemyKind::Boss), 1);
    }

    #[test]
    fn test_final_boss_clears_field() {
        let mut state = state();
        for _ in 0..5 {
            spawn_enemy(&mut state, EnemySpawn::default());
        }
        state.is_boss_active = true;
        state.enemy_projectiles.push(crate::sim::state::Projectile::mine(
            glam::Vec2::new(10.0, 10.0),
        ));
        state.game_time = 300.0;
        update_spawning(&mut state, 0.0);

        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].kind, EnemyKind::FinalBoss);
        assert!(state.enemy_projectiles.is_empty());
        assert!(state.is_final_boss_active && !state.is_boss_active);
        let explosions = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
            .count();
        assert_eq!(explosions, 5);

        update_spawning(&mut state, 0.0);
        assert_eq!(count(&state, EnemyKind::FinalBoss), 1);
    }

    #[test]
    fn test_warning_fires_once() {
        let mut state = state();
        state.is_boss_active = true;
        state.game_time = 296.0;
        update_spawning(&mut state, 0.1);
        update_spawning(&mut state, 0.1);
        let warnings = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Status { text, .. } if text.contains("WARNING")))
            .count();
        assert_eq!(warnings, 1);
    }

    #[test]
    fn test_void_mode_never_respawns_final_boss() {
        let mut state = state();
        state.final_boss_defeated = true;
        state.game_time = 400.0;
        state.extended.behemoth_spawned = true;
        state.extended.behemoth_defeated = true;
        state.extended.monolith_spawned = true;
        state.spawn_timer = 10.0;
        update_spawning(&mut state, 0.0);
        assert_eq!(count(&state, EnemyKind::FinalBoss), 0);
        assert_eq!(count(&state, EnemyKind::Boss), 0);
    }

    #[test]
    fn test_void_boss_sequence() {
        let mut state = state();
        state.final_boss_defeated = true;
        state.spawn_timer = 100.0;
        state.game_time = 150.0;
        update_spawning(&mut state, 0.0);
        assert_eq!(count(&state, EnemyKind::Behemoth), 1);
        assert!(state.is_boss_active);

        // Monolith waits for the behemoth to fall
        state.game_time = 300.0;
        update_spawning(&mut state, 0.0);
        assert_eq!(count(&state, EnemyKind::Monolith), 0);

        state.enemies.clear();
        state.is_boss_active = false;
        state.extended.behemoth_defeated = true;
        update_spawning(&mut state, 0.0);
        assert_eq!(count(&state, EnemyKind::Monolith), 1);
        assert_eq!(count(&state, EnemyKind::Behemoth), 0);
    }
}
