//! Divine companions
//!
//! Permanent allies granted by a god are tracked across levels with a
//! snapshot of their last known state, so they can be recalled or restored
//! when the player changes levels.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, EnchKind, Monster, MonsterId};
use crate::errors::{EngineError, EngineResult};
use crate::god::God;
use crate::level::LevelId;
use crate::message::Channel;
use crate::rng::RandomSource;
use crate::state::GameState;

/// Last known state of one companion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Companion {
    pub mons: Monster,
    /// Where it was last seen; `None` once it has gone missing
    pub level: Option<LevelId>,
    pub timestamp: u64,
}

/// All companions, keyed by monster id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanionTable {
    entries: HashMap<MonsterId, Companion>,
}

impl CompanionTable {
    pub fn contains(&self, id: MonsterId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: MonsterId) -> Option<&Companion> {
        self.entries.get(&id)
    }

    pub fn insert(&mut self, id: MonsterId, companion: Companion) {
        self.entries.insert(id, companion);
    }

    pub fn remove(&mut self, id: MonsterId) -> Option<Companion> {
        self.entries.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MonsterId, &Companion)> {
        self.entries.iter().map(|(id, c)| (*id, c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Start tracking a live monster on the current level
pub fn add_companion(state: &mut GameState, id: MonsterId) -> EngineResult<()> {
    let mons = state
        .monster(id)
        .filter(|m| m.hp > 0)
        .cloned()
        .ok_or(EngineError::NoSuchMonster(id))?;
    let companion = Companion {
        mons,
        level: Some(state.current),
        timestamp: state.turn,
    };
    state.companions.insert(id, companion);
    Ok(())
}

pub fn remove_companion(state: &mut GameState, id: MonsterId) {
    state.companions.remove(id);
}

/// Forget every companion granted by `god`
pub fn remove_all_companions(state: &mut GameState, god: God) {
    let doomed: Vec<MonsterId> = state
        .companions
        .iter()
        .filter(|(id, c)| {
            state
                .monster(*id)
                .unwrap_or(&c.mons)
                .is_god_gift(god)
        })
        .map(|(id, _)| id)
        .collect();
    for id in doomed {
        state.companions.remove(id);
    }
}

/// Record that a companion now lives on `level`
pub fn move_companion_to(state: &mut GameState, mons: &Monster, level: LevelId) {
    let turn = state.turn;
    state.companions.insert(
        mons.id,
        Companion {
            mons: mons.clone(),
            level: Some(level),
            timestamp: turn,
        },
    );
}

/// Refresh the snapshots of companions on the current level
pub fn update_companions(state: &mut GameState) {
    let turn = state.turn;
    let current = state.current;
    let fresh: Vec<Monster> = state
        .companions
        .iter()
        .filter_map(|(id, _)| state.monster(id))
        .filter(|m| m.hp > 0)
        .cloned()
        .collect();
    for mons in fresh {
        if let Some(entry) = state.companions.entries.get_mut(&mons.id) {
            entry.mons = mons;
            entry.level = Some(current);
            entry.timestamp = turn;
        }
    }
}

/// Whether a known companion is somewhere other than the current level.
///
/// A companion recorded here but missing from the roster is marked lost.
/// Unknown ids count as elsewhere unless `must_exist` is set.
pub fn companion_is_elsewhere(state: &mut GameState, id: MonsterId, must_exist: bool) -> bool {
    let current = state.current;
    let present = state.monster(id).is_some();
    match state.companions.entries.get_mut(&id) {
        Some(entry) => {
            if entry.level != Some(current) {
                return true;
            }
            if !present {
                entry.level = None;
                return true;
            }
            false
        }
        None => !must_exist,
    }
}

/// Hit points regained per 100 turns spent off-level
fn off_level_regen_rate(mons: &Monster) -> i32 {
    (mons.hit_dice.min(10) * 4).max(10)
}

/// Bring a companion from another level to the player's side.
///
/// Returns whether the companion arrived on the current level.
pub fn recall_offlevel_ally(state: &mut GameState, id: MonsterId) -> bool {
    if !companion_is_elsewhere(state, id, true) {
        return false;
    }
    let Some(entry) = state.companions.get(id).cloned() else {
        return false;
    };

    // Take the freshest copy: in transit, on a stored level, or the snapshot
    let mut mons = entry.mons.clone();
    if let Some(from) = entry.level {
        if let Some(m) = state.transit.remove(from, id) {
            mons = m;
        } else if let Some(m) = state
            .levels
            .get_mut(&from)
            .and_then(|lvl| lvl.remove_monster(id))
        {
            mons = m;
        }
    }

    let player_pos = state.player.pos;
    let Some(spot) = state
        .level()
        .free_cells_within(player_pos, 2, &[player_pos])
        .first()
        .copied()
    else {
        log::warn!("no room to recall {id:?}");
        return false;
    };
    mons.pos = spot;
    if let Err(e) = state.level_mut().add_monster(mons) {
        log::warn!("recall of {id:?} failed: {e}");
        return false;
    }

    let current = state.current;
    if let Some(entry) = state.companions.entries.get_mut(&id) {
        entry.level = Some(current);
    }
    state.monster_msg(id, " is recalled.", Channel::Plain);

    crate::trap::apply_location_effects(state, id);
    if !state.is_alive(Actor::Monster(id)) {
        return true;
    }

    let turns = state.turn.saturating_sub(entry.timestamp) as i32;
    let regen = state.monster(id).map_or(0, off_level_regen_rate);
    let heal = state.rng.div_rand_round(turns.saturating_mul(regen), 100);
    if let Some(mons) = state.monster_mut(id) {
        crate::actor::Combatant::heal(mons, heal);
        if turns >= 10 {
            mons.ench.remove(EnchKind::Confusion);
            mons.ench.tick(turns / 10);
        }
        mons.foe = None;
    }
    true
}

/// Drop a companion that has turned against the player
pub(crate) fn update_after_attitude_change(state: &mut GameState, mon: &Monster) {
    if !mon.wont_attack() && state.companions.remove(mon.id).is_some() {
        log::debug!("{:?} is no longer a companion", mon.id);
    }
}
