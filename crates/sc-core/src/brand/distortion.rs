//! Distortion: warping space around the defender

use super::{BrandOutcome, HitContext, attack_strength_punctuation, the, the_cap, visible};
use crate::actor::{Actor, Combatant};
use crate::consts::{GXM, GYM};
use crate::level::{Branch, Coord, LevelId};
use crate::message::Channel;
use crate::rng::RandomSource;
use crate::state::GameState;

/// Outcomes of a distorting hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistortionEffect {
    /// The wielder is knitted back together
    HealSelf,
    SmallDamage,
    BigDamage,
    Blink,
    Banish,
}

const DISTORTION_TABLE: [(u32, DistortionEffect); 5] = [
    (10, DistortionEffect::HealSelf),
    (35, DistortionEffect::SmallDamage),
    (25, DistortionEffect::BigDamage),
    (20, DistortionEffect::Blink),
    (10, DistortionEffect::Banish),
];

pub fn distortion_affects_defender(state: &mut GameState, hit: HitContext) -> BrandOutcome {
    let Some(effect) = state.rng.weighted_choice(&DISTORTION_TABLE) else {
        return BrandOutcome::default();
    };
    log::trace!("distortion: {effect:?}");
    match effect {
        DistortionEffect::HealSelf => {
            let amount = 1 + state.rng.random2avg(7, 2);
            let healed = state.actor_mut(hit.attacker).map_or(0, |a| a.heal(amount));
            let mut outcome = BrandOutcome::default();
            if healed > 0 && visible(state, hit.attacker) {
                outcome.message = Some(if hit.attacker.is_player() {
                    "Space warps around you, knitting your wounds.".to_string()
                } else {
                    format!("Space warps around {}, knitting its wounds.", the(state, hit.attacker))
                });
                outcome.obvious = true;
            }
            outcome
        }
        DistortionEffect::SmallDamage => {
            let special = 1 + state.rng.random2avg(7, 2);
            let message = format!(
                "Space warps around {}{}",
                the(state, hit.defender),
                attack_strength_punctuation(special)
            );
            BrandOutcome::damage(special, Some(message))
        }
        DistortionEffect::BigDamage => {
            let special = 3 + state.rng.random2avg(24, 2);
            let message = format!(
                "Space warps horribly around {}{}",
                the(state, hit.defender),
                attack_strength_punctuation(special)
            );
            BrandOutcome::damage(special, Some(message))
        }
        DistortionEffect::Blink => BrandOutcome {
            obvious: visible(state, hit.defender),
            ..blink(state, hit.defender)
        },
        DistortionEffect::Banish => banish(state, hit),
    }
}

/// Move an actor to a random free cell nearby
pub(crate) fn blink(state: &mut GameState, who: Actor) -> BrandOutcome {
    let stationary = match who {
        Actor::Player => false,
        Actor::Monster(id) => state.monster(id).is_none_or(|m| m.is_stationary()),
    };
    let Some(from) = state.actor_pos(who) else {
        return BrandOutcome::default();
    };
    if stationary {
        return BrandOutcome::default();
    }
    let player_pos = state.player.pos;
    let cells = state.level().free_cells_within(from, 2, &[player_pos]);
    if cells.is_empty() {
        return BrandOutcome::default();
    }
    let to = cells[state.rng.uniform(cells.len() as i32) as usize];
    if let Some(actor) = state.actor_mut(who) {
        actor.set_pos(to);
    }
    log::trace!("{who:?} blinks from {from} to {to}");
    let message = visible(state, who).then(|| match who {
        Actor::Player => "You blink.".to_string(),
        Actor::Monster(_) => format!("{} blinks!", the_cap(state, who)),
    });
    BrandOutcome {
        message,
        ..Default::default()
    }
}

fn banish(state: &mut GameState, hit: HitContext) -> BrandOutcome {
    if !state.current.branch.allows_banishment() {
        return BrandOutcome::default();
    }
    let obvious = visible(state, hit.defender);
    match hit.defender {
        Actor::Player => {
            state.msg(Channel::Warning, "You are cast into the Abyss!");
            let abyss = LevelId::new(Branch::Abyss, 1);
            state.change_level(abyss, Coord::new(GXM / 2, GYM / 2));
        }
        Actor::Monster(id) => {
            state.monster_msg(id, " is devoured by a tear in reality.", Channel::MonsterDamage);
            state.dismiss(id);
            log::debug!("{id:?} banished by {:?}", hit.attacker);
        }
    }
    BrandOutcome {
        obvious,
        terminal: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::rng::EngineRng;

    fn setup(script: Vec<i32>) -> (GameState, HitContext) {
        let mut state = GameState::with_rng(EngineRng::scripted(script));
        let orc = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        let hit = HitContext {
            attacker: Actor::Player,
            defender: Actor::Monster(orc),
            damage_done: 5,
            attack_damage: 7,
        };
        (state, hit)
    }

    #[test]
    fn test_small_damage() {
        // 10 lands in the small-damage band, then two 0 rolls
        let (mut state, hit) = setup(vec![10, 0, 0]);
        let out = distortion_affects_defender(&mut state, hit);
        assert_eq!(out.special_damage, 1);
        assert_eq!(out.message.as_deref(), Some("Space warps around the orc."));
    }

    #[test]
    fn test_big_damage() {
        let (mut state, hit) = setup(vec![50, 23, 24]);
        let out = distortion_affects_defender(&mut state, hit);
        assert_eq!(out.special_damage, 3 + 23);
        assert!(out.message.unwrap().starts_with("Space warps horribly"));
    }

    #[test]
    fn test_heal_self() {
        let (mut state, hit) = setup(vec![0, 6, 7]);
        state.player.hp = 5;
        let out = distortion_affects_defender(&mut state, hit);
        assert_eq!(out.special_damage, 0);
        assert_eq!(state.player.hp, 5 + 1 + 6);
    }

    #[test]
    fn test_blink_moves_defender() {
        let (mut state, hit) = setup(vec![75, 0]);
        let id = hit.defender.monster_id().unwrap();
        let before = state.monster(id).unwrap().pos;
        let out = distortion_affects_defender(&mut state, hit);
        let after = state.monster(id).unwrap().pos;
        assert_ne!(before, after);
        assert!(before.distance(after) <= 2);
        assert_ne!(after, state.player.pos);
        assert!(!out.terminal);
    }

    #[test]
    fn test_banish_removes_monster() {
        let (mut state, hit) = setup(vec![95]);
        let out = distortion_affects_defender(&mut state, hit);
        assert!(out.terminal);
        assert!(state.monster(hit.defender.monster_id().unwrap()).is_none());
        assert!(state.kills.is_empty());
    }

    #[test]
    fn test_no_banishment_from_abyss() {
        let (mut state, _) = setup(vec![]);
        state.change_level(LevelId::new(Branch::Abyss, 1), Coord::new(10, 10));
        let orc = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        let hit = HitContext {
            attacker: Actor::Player,
            defender: Actor::Monster(orc),
            damage_done: 5,
            attack_damage: 7,
        };
        state.rng = EngineRng::scripted(vec![95]);
        let out = distortion_affects_defender(&mut state, hit);
        assert_eq!(out, BrandOutcome::default());
        assert!(state.monster(orc).is_some());
    }
}
