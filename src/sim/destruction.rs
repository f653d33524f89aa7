//! The single destruction handler and game over
//!
//! Health reaching zero only marks an enemy; [`reap`] feeds every marked
//! enemy through [`destroy_enemy`], which checks and sets `destroyed` before
//! touching score, so a repeated request is a no-op.

use glam::Vec2;

use super::ally;
use super::enemy::{self, EnemySpawn, spawn_enemy};
use super::progression;
use super::state::{Behavior, Enemy, EnemyKind, GameEvent, GameState, GamePhase, Pickup};
use crate::audio::SoundId;
use crate::consts::*;
use crate::tuning::BossReward;

const SPLIT_OFFSET: f32 = 10.0;
const SPLIT_SIZE: f32 = 15.0;
const ANCHOR_BREAK_FRACTION: f32 = 0.5;

/// Destroy one enemy and apply its rewards; false if it was already handled
pub fn destroy_enemy(state: &mut GameState, id: u32) -> bool {
    let Some(index) = state.enemies.iter().position(|e| e.id == id) else {
        return false;
    };
    if state.enemies[index].destroyed {
        return false;
    }
    state.enemies[index].destroyed = true;
    let mut enemy = state.enemies.remove(index);

    enemy::enrage_partner(state, &enemy);
    state.push_event(GameEvent::EnemyDestroyed {
        id: enemy.id,
        kind: enemy.kind,
        pos: enemy.pos,
    });

    match enemy.kind {
        EnemyKind::FinalBoss => defeat_final_boss(state, &mut enemy),
        EnemyKind::Boss | EnemyKind::Behemoth | EnemyKind::Monolith if !enemy.summoned => {
            defeat_encounter_boss(state, &enemy)
        }
        _ if enemy.is_boss => defeat_commander(state, &enemy),
        _ => defeat_regular(state, &enemy),
    }
    true
}

/// Run the handler on every enemy whose health ran out
pub fn reap(state: &mut GameState) {
    // Anchor deaths can finish off their ward, so repeat until stable
    loop {
        let doomed: Vec<u32> = state
            .enemies
            .iter()
            .filter(|e| e.health <= 0.0 && !e.destroyed)
            .map(|e| e.id)
            .collect();
        if doomed.is_empty() {
            break;
        }
        for id in doomed {
            destroy_enemy(state, id);
        }
    }
}

fn grant(state: &mut GameState, reward: BossReward) {
    state.score += reward.score;
    state.upgrade_points += reward.upgrade_points;
    state.player.shield_charges += reward.shield_charges;
}

fn defeat_regular(state: &mut GameState, enemy: &Enemy) {
    state.explode(enemy.pos, enemy.color, enemy.size as u32);
    state.sound(SoundId::EnemyDefeated, 0.3);
    state.score += state.tuning.kill_score;

    match enemy.kind {
        EnemyKind::Splitter => {
            for dx in [-SPLIT_OFFSET, SPLIT_OFFSET] {
                spawn_enemy(
                    state,
                    EnemySpawn {
                        kind: EnemyKind::Standard,
                        pos: Some(enemy.pos + Vec2::new(dx, 0.0)),
                        size: Some(SPLIT_SIZE),
                        ..Default::default()
                    },
                );
            }
        }
        EnemyKind::Anchor => {
            if let Behavior::Anchor { ward: Some(ward), .. } = enemy.behavior {
                break_anchor_ward(state, ward);
            }
        }
        EnemyKind::Orbiter | EnemyKind::Weaver | EnemyKind::Bulwark => {
            if state.is_void_mode() && state.roll() < state.tuning.coolant_drop_chance {
                state.pickups.push(Pickup::coolant(enemy.pos));
            }
        }
        _ => {}
    }
}

fn break_anchor_ward(state: &mut GameState, ward: u32) {
    let Some(target) = state.enemy_mut(ward) else {
        return;
    };
    target.protected_by = None;
    target.health -= target.max_health * ANCHOR_BREAK_FRACTION;
    let pos = target.pos;
    state.spawn_particles(pos, 0xff0000, 20);
    state.status("Anchor Destroyed! Shield Down!", true);
}

fn defeat_commander(state: &mut GameState, enemy: &Enemy) {
    state.explode(enemy.pos, enemy.color, enemy.size as u32);
    state.sound(SoundId::EnemyDefeated, 0.3);
    let reward = state.tuning.commander_reward;
    grant(state, reward);
    state.status("Commander down!", true);
    log::debug!("Commander {} destroyed", enemy.id);
}

fn defeat_encounter_boss(state: &mut GameState, enemy: &Enemy) {
    let reward = match enemy.kind {
        EnemyKind::Behemoth => {
            state.extended.behemoth_defeated = true;
            state.tuning.behemoth_reward
        }
        EnemyKind::Monolith => {
            state.extended.monolith_defeated = true;
            state.tuning.monolith_reward
        }
        _ => state.tuning.boss_reward,
    };
    state.is_boss_active = false;
    grant(state, reward);

    state.explode(enemy.pos, enemy.color, (enemy.size * 2.0) as u32);
    state.sound(SoundId::FinalBossExplosion, 1.0);
    state.shake(40.0, 12.0);
    state.flash(10.0);
    state.status(format!("{} defeated!", capitalize(enemy.kind.name())), true);
    state.push_event(GameEvent::BossDefeated { kind: enemy.kind });
    log::info!(
        "{} defeated at {:.1}s (score {})",
        enemy.kind.name(),
        state.game_time,
        state.score
    );

    progression::offer_upgrades(state);
}

fn defeat_final_boss(state: &mut GameState, enemy: &mut Enemy) {
    if let Behavior::FinalBoss(brain) = &mut enemy.behavior {
        if brain.defeated {
            return;
        }
        brain.defeated = true;
    }

    state.sound(SoundId::FinalBossExplosion, 1.0);
    state.final_boss_defeated = true;
    state.is_final_boss_active = false;
    state.final_boss = None;
    let reward = state.tuning.final_boss_reward;
    grant(state, reward);

    state.aim_unlocked = true;
    state.status("FINAL BOSS DEFEATED! VOID MODE UNLOCKED!", true);
    state.game_time = 0.0;
    state.spawn_timer = 0.0;

    state.shake(60.0, 20.0);
    state.flash(10.0);
    state.explode(enemy.pos, enemy.color, 400);
    state.push_event(GameEvent::BossDefeated {
        kind: EnemyKind::FinalBoss,
    });
    log::info!("Final boss defeated, void mode begins (score {})", state.score);

    ally::spawn_echo(state);
    state.status("Echo Ally Acquired!", true);

    progression::offer_upgrades(state);
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// End the run; later calls are ignored
pub fn game_over(state: &mut GameState, reason: &str) {
    if state.is_game_over() {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.player.destroyed = true;
    state.sound(SoundId::PlayerDead, 1.0);
    state.push_event(GameEvent::StopAllLoops);
    ally::retreat_all(state);

    state.shake(30.0, 10.0);
    state.flash(10.0);
    let pos = state.player.pos;
    state.explode(pos, EXPLOSION_COLOR, 100);

    state.status("Game Over!", false);
    state.push_event(GameEvent::GameOver {
        reason: reason.to_string(),
        score: state.score,
    });
    log::info!("Game over: {} (score {})", reason, state.score);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::state::PauseState;

    fn state() -> GameState {
        GameState::new(&Settings::default())
    }

    fn spawn(state: &mut GameState, kind: EnemyKind) -> u32 {
        spawn_enemy(
            state,
            EnemySpawn {
                kind,
                pos: Some(Vec2::new(300.0, 100.0)),
                ..Default::default()
            },
        )
    }

    fn explosions(state: &GameState) -> usize {
        state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Explosion { .. }))
            .count()
    }

    #[test]
    fn test_double_destroy_is_noop() {
        let mut state = state();
        let id = spawn(&mut state, EnemyKind::Standard);
        assert!(destroy_enemy(&mut state, id));
        assert!(!destroy_enemy(&mut state, id));
        assert_eq!(state.score, 10);
        assert_eq!(explosions(&state), 1);
    }

    #[test]
    fn test_splitter_spawns_two_standards() {
        let mut state = state();
        let id = spawn(&mut state, EnemyKind::Splitter);
        destroy_enemy(&mut state, id);
        assert_eq!(state.enemies.len(), 2);
        assert!(state
            .enemies
            .iter()
            .all(|e| e.kind == EnemyKind::Standard && e.size == SPLIT_SIZE));
        let xs: Vec<f32> = state.enemies.iter().map(|e| e.pos.x).collect();
        assert_eq!(xs, vec![290.0, 310.0]);
    }

    #[test]
    fn test_regular_boss_rewards_and_prompt() {
        let mut state = state();
        state.is_boss_active = true;
        let id = spawn(&mut state, EnemyKind::Boss);
        destroy_enemy(&mut state, id);
        assert!(!state.is_boss_active);
        assert_eq!(state.score, 250);
        assert_eq!(state.upgrade_points, 1);
        assert_eq!(state.player.shield_charges, 1);
        assert_eq!(state.pause, PauseState::AwaitingUpgrade);
    }

    #[test]
    fn test_commander_rewards_without_prompt() {
        let mut state = state();
        state.is_final_boss_active = true;
        let id = spawn_enemy(
            &mut state,
            EnemySpawn {
                kind: EnemyKind::Boss,
                health: Some(50.0),
                summoned: true,
                ..Default::default()
            },
        );
        destroy_enemy(&mut state, id);
        assert_eq!(state.score, 250);
        assert_eq!(state.upgrade_points, 1);
        assert_eq!(state.pause, PauseState::Running);
        assert!(state.is_final_boss_active);
    }

    #[test]
    fn test_final_boss_opens_void_mode() {
        let mut state = state();
        state.game_time = 320.0;
        state.auto_upgrade = true;
        let id = spawn(&mut state, EnemyKind::FinalBoss);
        state.final_boss = Some(id);
        state.is_final_boss_active = true;

        destroy_enemy(&mut state, id);
        assert!(state.final_boss_defeated);
        assert!(!state.is_final_boss_active);
        assert_eq!(state.final_boss, None);
        assert_eq!(state.score, 5000);
        assert_eq!(state.game_time, 0.0);
        assert!(state.aim_unlocked);
        assert!(state.has_echo());
        assert_eq!(state.player.shield_charges, 5);
        // auto-upgrade spent what it could
        assert_eq!(state.upgrades.fire_rate, 5);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::BossDefeated { kind: EnemyKind::FinalBoss }))
                .count(),
            1
        );
    }

    #[test]
    fn test_anchor_death_strips_ward() {
        let mut state = state();
        let tanker = spawn(&mut state, EnemyKind::Tanker);
        let anchor = spawn(&mut state, EnemyKind::Anchor);
        if let Some(a) = state.enemy_mut(anchor) {
            a.behavior = Behavior::Anchor {
                ward: Some(tanker),
                angle: 0.0,
            };
        }
        if let Some(t) = state.enemy_mut(tanker) {
            t.protected_by = Some(anchor);
        }
        destroy_enemy(&mut state, anchor);
        let ward = state.enemy(tanker).expect("ward survives");
        assert_eq!(ward.protected_by, None);
        assert_eq!(ward.health, ward.max_health * 0.5);
    }

    #[test]
    fn test_reap_handles_every_dead_enemy() {
        let mut state = state();
        for _ in 0..3 {
            let id = spawn(&mut state, EnemyKind::Scout);
            if let Some(e) = state.enemy_mut(id) {
                e.health = 0.0;
            }
        }
        spawn(&mut state, EnemyKind::Scout);
        reap(&mut state);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 30);
    }

    #[test]
    fn test_game_over_once() {
        let mut state = state();
        crate::sim::ally::spawn_drones(&mut state);
        game_over(&mut state, "first");
        game_over(&mut state, "second");
        let overs: Vec<_> = state
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::GameOver { reason, .. } => Some(reason.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(overs, vec!["first".to_string()]);
        assert!(state.player.destroyed);
        assert!(state.allies.iter().all(|a| a.retreating));
    }
}
