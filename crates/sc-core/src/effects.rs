//! Queued chaos side effects
//!
//! A chaotic fumble does not recurse into the combat code. It leaves an
//! entry here, and [`run_effects`] drains the queue once the attack that
//! caused it has finished. An effect may queue another on the same actor,
//! up to the configured depth.

use std::collections::VecDeque;

use strum::Display;

use crate::actor::{Actor, Combatant, EnchKind, Enchantment, Holiness};
use crate::message::Channel;
use crate::polymorph::{PolyTarget, PowerBias, polymorph};
use crate::rng::RandomSource;
use crate::state::GameState;

/// What chaos can do to a single actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SelfEffect {
    Haste,
    Heal,
    Confuse,
    Polymorph,
}

const SELF_EFFECTS: [(u32, SelfEffect); 4] = [
    (10, SelfEffect::Haste),
    (10, SelfEffect::Heal),
    (10, SelfEffect::Confuse),
    (10, SelfEffect::Polymorph),
];

/// The player cannot be polymorphed by chaos
const PLAYER_SELF_EFFECTS: [(u32, SelfEffect); 3] = [
    (10, SelfEffect::Haste),
    (10, SelfEffect::Heal),
    (10, SelfEffect::Confuse),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuedEffect {
    pub target: Actor,
    /// How many effects led to this one
    pub depth: u32,
}

/// Pending chaos effects, first in first out
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    pending: VecDeque<QueuedEffect>,
}

impl EffectQueue {
    pub fn push(&mut self, target: Actor, depth: u32) {
        self.pending.push_back(QueuedEffect { target, depth });
    }

    pub fn pop(&mut self) -> Option<QueuedEffect> {
        self.pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Queue a top-level chaos effect on `target`
pub fn chaos_affects_actor(state: &mut GameState, target: Actor) {
    state.effects.push(target, 0);
}

/// Apply every queued effect, including any they queue in turn.
///
/// Returns how many effects were applied. Effects aimed at actors that
/// have since died or left the level are dropped.
pub fn run_effects(state: &mut GameState) -> usize {
    let mut applied = 0;
    while let Some(entry) = state.effects.pop() {
        if !state.is_alive(entry.target) {
            log::trace!("dropping effect on departed {:?}", entry.target);
            continue;
        }
        let table: &[(u32, SelfEffect)] = if entry.target.is_player() {
            &PLAYER_SELF_EFFECTS
        } else {
            &SELF_EFFECTS
        };
        let Some(effect) = state.rng.weighted_choice(table) else {
            continue;
        };
        log::debug!("chaos {effect} on {:?} (depth {})", entry.target, entry.depth);
        apply_effect(state, entry.target, effect);
        applied += 1;

        if entry.depth + 1 < state.options.effect_depth
            && state.is_alive(entry.target)
            && state.rng.chance_in_n(4)
        {
            state.effects.push(entry.target, entry.depth + 1);
        }
    }
    applied
}

fn apply_effect(state: &mut GameState, target: Actor, effect: SelfEffect) {
    match effect {
        SelfEffect::Haste => {
            let duration = 10 + state.rng.uniform(10);
            let Some(actor) = state.actor_mut(target) else {
                return;
            };
            if actor.has_ench(EnchKind::Slow) {
                actor.ench_mut().remove(EnchKind::Slow);
            } else {
                actor.ench_mut().add(EnchKind::Haste, Enchantment::new(1, duration));
            }
            match target {
                Actor::Player => state.msg(Channel::Plain, "You feel yourself speed up."),
                Actor::Monster(id) => {
                    state.monster_msg(id, " seems to speed up.", Channel::MonsterEnchant);
                }
            }
        }
        SelfEffect::Heal => {
            let amount = state.rng.random_range(5, 15);
            let healed = state.actor_mut(target).map_or(0, |a| a.heal(amount));
            if healed == 0 {
                return;
            }
            match target {
                Actor::Player => state.msg(Channel::Plain, "You feel better."),
                Actor::Monster(id) => {
                    state.monster_msg(id, " looks healthier.", Channel::MonsterEnchant);
                }
            }
        }
        SelfEffect::Confuse => {
            let duration = 5 + state.rng.uniform(5);
            let Some(actor) = state.actor_mut(target) else {
                return;
            };
            if matches!(actor.holiness(), Holiness::Nonliving | Holiness::Plant) {
                return;
            }
            actor.ench_mut().add(EnchKind::Confusion, Enchantment::new(1, duration));
            match target {
                Actor::Player => state.msg(Channel::Warning, "You feel confused."),
                Actor::Monster(id) => {
                    state.monster_msg(id, " looks confused.", Channel::MonsterEnchant);
                }
            }
        }
        SelfEffect::Polymorph => {
            if let Actor::Monster(id) = target {
                polymorph(state, id, PolyTarget::Random, PowerBias::Same);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::level::Coord;
    use crate::rng::EngineRng;

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = EffectQueue::default();
        queue.push(Actor::Player, 0);
        queue.push(Actor::Player, 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop().map(|e| e.depth), Some(0));
        assert_eq!(queue.pop().map(|e| e.depth), Some(1));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_haste_monster() {
        // 0 picks haste, 3 is its duration roll, 1 declines a nested effect
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0, 3, 1]));
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        chaos_affects_actor(&mut state, Actor::Monster(id));
        assert_eq!(run_effects(&mut state), 1);
        assert!(state.monster(id).unwrap().ench.has(EnchKind::Haste));
        assert!(state.messages.contains("The orc seems to speed up."));
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_heal_player() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![15, 4, 1]));
        state.player.hp = 3;
        chaos_affects_actor(&mut state, Actor::Player);
        run_effects(&mut state);
        assert_eq!(state.player.hp, 3 + 5 + 4);
    }

    #[test]
    fn test_player_never_polymorphed() {
        let mut state = GameState::new(7);
        for _ in 0..50 {
            chaos_affects_actor(&mut state, Actor::Player);
        }
        let applied = run_effects(&mut state);
        assert!(applied >= 50);
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_depth_bounds_nesting() {
        // Every nested roll succeeds, so only the depth limit stops it
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0; 64]));
        state.options.effect_depth = 3;
        chaos_affects_actor(&mut state, Actor::Player);
        assert_eq!(run_effects(&mut state), 3);
    }

    #[test]
    fn test_dead_target_dropped() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        chaos_affects_actor(&mut state, Actor::Monster(id));
        state.dismiss(id);
        assert_eq!(run_effects(&mut state), 0);
    }

    #[test]
    fn test_confuse_skips_plants() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![25, 0, 1]));
        let id = state.spawn(Species::Plant, Coord::new(11, 10)).unwrap();
        chaos_affects_actor(&mut state, Actor::Monster(id));
        run_effects(&mut state);
        assert!(!state.monster(id).unwrap().ench.has(EnchKind::Confusion));
    }
}
