//! Hydra decapitation and head regrowth

use crate::actor::{Actor, AttackKind, Combatant, DamageKind, Desc, Holiness, MonsterId, Mutation};
use crate::brand::WeaponBrand;
use crate::message::{Channel, capitalize, third_person};
use crate::rng::RandomSource;
use crate::state::GameState;

/// What a chop did to the hydra
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decapitation {
    /// No head came off
    None,
    /// A head came off and the hydra lives on
    Severed,
    /// The last head came off
    Killed,
}

pub fn can_lose_heads(state: &GameState, defender: Actor) -> bool {
    defender
        .monster_id()
        .and_then(|id| state.monster(id))
        .is_some_and(|m| m.species.is_hydra() && m.heads > 0)
}

/// Whether this hit can take a head off.
///
/// Only edges and sharp claws sever; glancing blows mostly bounce off, and
/// monsters fighting each other only manage it occasionally.
pub fn attack_chops_heads(
    state: &mut GameState,
    attacker: Actor,
    damage: i32,
    kind: DamageKind,
    monster_claw: bool,
) -> bool {
    if !attacker.is_player() && !state.rng.chance_in_n(4) {
        return false;
    }
    if !kind.can_sever() {
        return false;
    }
    if kind == DamageKind::Claws {
        let sharp = match attacker {
            Actor::Player => state.player.mutation_level(Mutation::Claws) >= 3,
            Actor::Monster(_) => monster_claw,
        };
        if !sharp {
            return false;
        }
    }
    if damage <= 0 {
        return false;
    }
    damage >= 4 || state.rng.coin_flip()
}

/// Take a head off a hydra, and maybe grow more in its place.
pub fn decapitate(
    state: &mut GameState,
    attacker: Actor,
    defender: MonsterId,
    kind: DamageKind,
    brand: WeaponBrand,
) -> Decapitation {
    let Some(heads) = state.monster(defender).map(|m| m.heads) else {
        return Decapitation::None;
    };
    if heads == 0 {
        return Decapitation::None;
    }

    let verbs: &[&str] = if kind == DamageKind::Claws {
        &["rip", "tear", "claw"]
    } else {
        &["slice", "lop", "chop", "hack"]
    };
    let verb = verbs[state.rng.uniform(verbs.len() as i32) as usize];
    let verb = if attacker.is_player() {
        verb.to_string()
    } else {
        third_person(verb)
    };
    let who = capitalize(&state.actor_name(attacker, Desc::The));
    let whose = state.actor_name(Actor::Monster(defender), Desc::The);

    if heads == 1 {
        state.msg(Channel::Combat, format!("{who} {verb} {whose}'s last head off!"));
        state.monster_msg(defender, " is completely decapitated!", Channel::MonsterDamage);
        if let Some(m) = state.monster_mut(defender) {
            m.heads = 0;
            m.hp = 0;
        }
        log::debug!("{defender:?} lost its last head to {attacker:?}");
        return Decapitation::Killed;
    }

    state.msg(Channel::Combat, format!("{who} {verb} one of {whose}'s heads off!"));
    if let Some(m) = state.monster_mut(defender) {
        m.heads -= 1;
    }

    regrow_heads(state, defender, brand);
    Decapitation::Severed
}

fn regrow_heads(state: &mut GameState, id: MonsterId, brand: WeaponBrand) {
    let Some(mon) = state.monster(id) else {
        return;
    };
    if !mon.is_alive() || mon.holiness() != Holiness::Natural {
        return;
    }
    let (heads, limit) = (mon.heads, mon.max_heads());

    if brand == WeaponBrand::Flaming {
        state.msg(Channel::Combat, "The flame cauterises the wound!");
        return;
    }
    if heads >= limit.saturating_sub(1) {
        return;
    }

    state.monster_msg(id, " grows two more!", Channel::MonsterDamage);
    let heal = 8 + state.rng.uniform(8);
    if let Some(m) = state.monster_mut(id) {
        m.heads += 2;
        m.heal(heal);
    }
}

/// Monsters need a clawing attack to sever with claws
pub fn is_claw_attack(kind: AttackKind) -> bool {
    kind == AttackKind::Claw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::level::Coord;
    use crate::rng::EngineRng;

    fn hydra(state: &mut GameState, heads: u8) -> MonsterId {
        let id = state.spawn(Species::Hydra, Coord::new(11, 10)).unwrap();
        state.monster_mut(id).unwrap().heads = heads;
        id
    }

    #[test]
    fn test_only_edges_sever() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        assert!(attack_chops_heads(&mut state, Actor::Player, 10, DamageKind::Slicing, false));
        assert!(attack_chops_heads(&mut state, Actor::Player, 10, DamageKind::Chopping, false));
        assert!(!attack_chops_heads(&mut state, Actor::Player, 10, DamageKind::Crushing, false));
        assert!(!attack_chops_heads(&mut state, Actor::Player, 10, DamageKind::Piercing, false));
        assert!(!attack_chops_heads(&mut state, Actor::Player, 10, DamageKind::Claws, false));
        assert!(!attack_chops_heads(&mut state, Actor::Player, 0, DamageKind::Slicing, false));
    }

    #[test]
    fn test_sharp_claws() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        state.player.set_mutation(Mutation::Claws, 3);
        assert!(attack_chops_heads(&mut state, Actor::Player, 10, DamageKind::Claws, false));
    }

    #[test]
    fn test_weak_blow_needs_coin() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![1]));
        assert!(!attack_chops_heads(&mut state, Actor::Player, 2, DamageKind::Slicing, false));
    }

    #[test]
    fn test_monsters_rarely_sever() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![1]));
        let id = state.spawn(Species::Orc, Coord::new(9, 10)).unwrap();
        assert!(!attack_chops_heads(&mut state, Actor::Monster(id), 10, DamageKind::Slicing, false));
    }

    #[test]
    fn test_regrowth() {
        // verb roll, then the heal roll
        let mut state = GameState::with_rng(EngineRng::scripted(vec![2, 3]));
        let id = hydra(&mut state, 5);
        state.monster_mut(id).unwrap().hp = 10;
        let out = decapitate(&mut state, Actor::Player, id, DamageKind::Chopping, WeaponBrand::None);
        assert_eq!(out, Decapitation::Severed);
        let mon = state.monster(id).unwrap();
        assert_eq!(mon.heads, 6);
        assert_eq!(mon.hp, 10 + 8 + 3);
        assert!(state.messages.contains("You chop one of the hydra's heads off!"));
        assert!(state.messages.contains("The hydra grows two more!"));
    }

    #[test]
    fn test_fire_cauterises() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0]));
        let id = hydra(&mut state, 5);
        decapitate(&mut state, Actor::Player, id, DamageKind::Slicing, WeaponBrand::Flaming);
        assert_eq!(state.monster(id).unwrap().heads, 4);
        assert!(state.messages.contains("The flame cauterises the wound!"));
    }

    #[test]
    fn test_last_head() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0]));
        let id = hydra(&mut state, 1);
        let out = decapitate(&mut state, Actor::Player, id, DamageKind::Slicing, WeaponBrand::None);
        assert_eq!(out, Decapitation::Killed);
        assert_eq!(state.monster(id).unwrap().hp, 0);
        assert!(state.messages.contains("You slice the hydra's last head off!"));
        assert!(state.messages.contains("The hydra is completely decapitated!"));
    }

    #[test]
    fn test_no_regrowth_at_limit() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0]));
        let id = hydra(&mut state, 20);
        decapitate(&mut state, Actor::Player, id, DamageKind::Slicing, WeaponBrand::None);
        assert_eq!(state.monster(id).unwrap().heads, 19);
    }
}
