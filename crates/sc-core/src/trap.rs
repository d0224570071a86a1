//! Net traps
//!
//! Traps are only modelled as far as they touch actor state: a monster
//! stepping onto an armed net may end up held.

use serde::{Deserialize, Serialize};

use crate::actor::{
    Actor, BodySize, Combatant, EnchKind, Enchantment, MonsterFlags, MonsterId, SpeciesFlags,
};
use crate::level::Coord;
use crate::message::Channel;
use crate::rng::RandomSource;
use crate::state::GameState;

/// Evasion a monster must beat to dodge a falling net
const NET_DODGE_THRESHOLD: i32 = 8;

/// A net trap on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub pos: Coord,
    /// Nets left; the trap disarms when this reaches zero
    pub ammo: i32,
}

impl Trap {
    pub fn net(pos: Coord, ammo: i32) -> Self {
        Self { pos, ammo }
    }

    pub fn is_armed(&self) -> bool {
        self.ammo > 0
    }
}

/// What happened when a monster stepped on a trap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapOutcome {
    /// No armed trap, or the monster avoided setting it off
    NotTriggered,
    Dodged,
    /// The net fell but could not hold the monster
    PassedThrough,
    TornFree,
    Caught,
}

/// Run the effects of the cell a monster now stands on
pub fn apply_location_effects(state: &mut GameState, id: MonsterId) -> TrapOutcome {
    let Some(pos) = state.monster(id).map(|m| m.pos) else {
        return TrapOutcome::NotTriggered;
    };
    let armed = state
        .level()
        .traps
        .iter()
        .any(|t| t.pos == pos && t.is_armed());
    if !armed {
        return TrapOutcome::NotTriggered;
    }
    trigger_net(state, id, pos)
}

fn trigger_net(state: &mut GameState, id: MonsterId, pos: Coord) -> TrapOutcome {
    let Some(mon) = state.monster(id) else {
        return TrapOutcome::NotTriggered;
    };
    let knows_traps = mon.has_flag(MonsterFlags::KNOWS_TRAPS);
    let ev = Combatant::ev(mon);
    let size = mon.body_size();
    let insubstantial = mon.is_insubstantial();
    let oozes = mon.species.has_flag(SpeciesFlags::OOZES);

    // Monsters that know about the trap usually step around the trigger
    if knows_traps && state.rng.chance_in_n(3) {
        return TrapOutcome::NotTriggered;
    }

    if let Some(trap) = state.level_mut().trap_at_mut(pos) {
        trap.ammo -= 1;
        if trap.ammo <= 0 {
            log::debug!("net trap at {pos} disarmed");
        }
    }

    if state.rng.uniform(ev) > NET_DODGE_THRESHOLD {
        state.monster_msg(id, " nimbly dodges the net.", Channel::Plain);
        return TrapOutcome::Dodged;
    }

    if insubstantial {
        let name = state.actor_name(Actor::Monster(id), crate::actor::Desc::The);
        if state.player_can_see(Actor::Monster(id)) {
            state.msg(Channel::Plain, format!("The net passes right through {name}!"));
        }
        return TrapOutcome::PassedThrough;
    }
    if oozes {
        state.monster_msg(id, " oozes right through the net!", Channel::Plain);
        return TrapOutcome::PassedThrough;
    }
    if size >= BodySize::Giant {
        state.monster_msg(id, " tears through the net!", Channel::Plain);
        return TrapOutcome::TornFree;
    }

    if let Some(mon) = state.monster_mut(id) {
        mon.ench.add(EnchKind::Held, Enchantment::new(1, 0));
    }
    state.monster_msg(id, " is caught in the net!", Channel::Plain);
    TrapOutcome::Caught
}
