//! Delayed dungeon actions
//!
//! Some religious events have to reach every matching monster in the dungeon,
//! not only the ones on the current level. Each such event is appended to a
//! global log. A level remembers how much of the log it has seen and catches
//! up when the player next arrives; monsters in transit get each new action
//! once, at the moment it is appended.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use crate::actor::{
    Actor, Attitude, Band, EnchKind, Monster, MonsterFlags, MonsterId, Species,
};
use crate::god::{God, piety_rank};
use crate::level::{LevelId, Terrain};
use crate::message::Channel;
use crate::state::GameState;

/// Number of daction kinds that keep per-level counters
pub const NUM_COUNTED: usize = 4;

/// A dungeon-wide delayed action
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[repr(u8)]
pub enum Daction {
    /// Beogh's orcs and their summons go hostile
    #[strum(serialize = "beogh orcs go hostile")]
    AllyBeogh = 0,
    #[strum(serialize = "fellow slimes go hostile")]
    AllySlime = 1,
    #[strum(serialize = "plants go hostile")]
    AllyPlant = 2,
    #[strum(serialize = "ancestor vanishes")]
    AllyHepliaklqana = 3,
    #[strum(serialize = "old bound souls go poof")]
    OldBoundSoulsPoof = 4,
    #[strum(serialize = "slimes allow another conversion attempt")]
    SlimeNewAttempt = 5,
    #[strum(serialize = "reapply passive mapping")]
    Reautomap = 6,
    #[strum(serialize = "remove Ignis altars")]
    RemoveIgnisAltars = 7,
    #[strum(serialize = "Pikel's minions go poof")]
    PikelMinions = 8,
    #[strum(serialize = "corpses rot")]
    RotCorpses = 9,
    #[strum(serialize = "hogs to humans")]
    KirkeHogs = 10,
    #[strum(serialize = "bribe timeout")]
    BribeTimeout = 11,
}

impl Daction {
    /// Index into the per-level counters, for kinds that have one
    pub const fn counter(self) -> Option<usize> {
        match self {
            Daction::AllyBeogh => Some(0),
            Daction::AllySlime => Some(1),
            Daction::AllyPlant => Some(2),
            Daction::AllyHepliaklqana => Some(3),
            _ => None,
        }
    }

    /// Whether the action acts on monsters rather than on the level itself
    pub const fn targets_monsters(self) -> bool {
        !matches!(
            self,
            Daction::Reautomap | Daction::RemoveIgnisAltars | Daction::RotCorpses
        )
    }
}

/// The daction log plus per-level progress through it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DelayedActionQueue {
    log: Vec<Daction>,
    cursors: HashMap<LevelId, usize>,
    counters: HashMap<LevelId, [u32; NUM_COUNTED]>,
}

impl DelayedActionQueue {
    pub fn log(&self) -> &[Daction] {
        &self.log
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// How many log entries `level` has applied
    pub fn applied(&self, level: LevelId) -> usize {
        self.cursors.get(&level).copied().unwrap_or(0)
    }

    /// A freshly generated level has nothing to catch up on
    pub fn start_level(&mut self, level: LevelId) {
        let tip = self.log.len();
        self.cursors.entry(level).or_insert(tip);
    }

    /// Stored count of matching monsters on `level`, as of the last visit
    pub fn stored_count(&self, level: LevelId, act: Daction) -> u32 {
        act.counter()
            .and_then(|idx| self.counters.get(&level).map(|c| c[idx]))
            .unwrap_or(0)
    }

    fn clear_counter(&mut self, idx: usize) {
        for counts in self.counters.values_mut() {
            counts[idx] = 0;
        }
    }
}

/// Whether a delayed action applies to `mon`
pub fn matches(mon: &Monster, act: Daction) -> bool {
    if mon.hp <= 0 {
        return false;
    }
    match act {
        Daction::AllyBeogh => mon.wont_attack() && mon.is_god_gift(God::Beogh),
        Daction::AllySlime => mon.is_fellow_slime(),
        // Every plant counts: they all turned friendly on conversion
        Daction::AllyPlant => mon.species.is_plant(),
        Daction::AllyHepliaklqana => mon.wont_attack() && mon.is_god_gift(God::Hepliaklqana),
        Daction::OldBoundSoulsPoof => mon.species == Species::BoundSoul,
        Daction::SlimeNewAttempt => mon.species.is_slime(),
        Daction::PikelMinions => mon.species == Species::Lemure && mon.band == Some(Band::Pikel),
        Daction::KirkeHogs => {
            mon.species == Species::Hog
                && !mon.is_shapeshifter()
                && (mon.band == Some(Band::Kirke) || mon.original.is_some())
        }
        Daction::BribeTimeout => {
            mon.ench.has(EnchKind::Bribed)
                || mon.has_flag(MonsterFlags::NEUTRAL_BRIBE)
                || mon.has_flag(MonsterFlags::FRIENDLY_BRIBE)
        }
        Daction::Reautomap | Daction::RemoveIgnisAltars | Daction::RotCorpses => false,
    }
}

/// Append an action and apply it everywhere it can be applied now
pub fn add(state: &mut GameState, act: Daction) {
    log::debug!("scheduling delayed action: {act}");
    state.dactions.log.push(act);

    // Counted monsters are treated as gone before the levels catch up
    if let Some(idx) = act.counter() {
        state.dactions.clear_counter(idx);
    }

    catch_up(state);
    apply_to_transit(state, act);
}

/// Replay every action the current level has not seen yet, in log order
pub fn catch_up(state: &mut GameState) {
    let level = state.current;
    loop {
        let done = state.dactions.applied(level);
        let Some(&act) = state.dactions.log.get(done) else {
            break;
        };
        state.dactions.cursors.insert(level, done + 1);
        apply_to_level(state, act);
    }
}

/// Refresh the stored counters for the level being left
pub fn leave_level(state: &mut GameState) {
    let mut counts = [0u32; NUM_COUNTED];
    for mon in &state.level().monsters {
        for act in [
            Daction::AllyBeogh,
            Daction::AllySlime,
            Daction::AllyPlant,
            Daction::AllyHepliaklqana,
        ] {
            if let Some(idx) = act.counter()
                && matches(mon, act)
            {
                counts[idx] += 1;
            }
        }
    }
    let current = state.current;
    state.dactions.counters.insert(current, counts);
}

/// Matching monsters across the dungeon: live on this level, stored
/// counts for other levels, and monsters in transit
pub fn count(state: &GameState, act: Daction) -> usize {
    let local = state
        .level()
        .monsters
        .iter()
        .filter(|m| matches(m, act))
        .count();
    let elsewhere: u32 = state
        .dactions
        .counters
        .keys()
        .filter(|lvl| **lvl != state.current)
        .map(|lvl| state.dactions.stored_count(*lvl, act))
        .sum();
    let in_transit = state.transit.iter().filter(|(_, m)| matches(m, act)).count();
    local + elsewhere as usize + in_transit
}

/// What became of a monster after an action was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Stays,
    Gone,
}

fn apply_to_level(state: &mut GameState, act: Daction) {
    log::debug!("applying delayed action on {}: {act}", state.current);
    match act {
        Daction::Reautomap => {
            let god = state.player.god;
            let mapped = god.grants_passive_mapping() && state.player.penance_for(god) == 0;
            state.level_mut().mapped = mapped;
        }
        Daction::RemoveIgnisAltars => {
            let removed = state
                .level_mut()
                .replace_terrain(Terrain::Altar(God::Ignis), Terrain::Floor);
            log::trace!("removed {removed} altars of Ignis");
        }
        Daction::RotCorpses => {
            state.level_mut().rot_corpses();
        }
        _ => {
            if act == Daction::PikelMinions {
                pikel_band_message(state);
            }
            let targets: Vec<MonsterId> = state
                .level()
                .monsters
                .iter()
                .filter(|m| matches(m, act))
                .map(|m| m.id)
                .collect();
            for id in targets {
                apply_to_local(state, id, act);
            }
        }
    }
}

fn apply_to_local(state: &mut GameState, id: MonsterId, act: Daction) {
    let Some(mut mon) = state.monster(id).cloned() else {
        return;
    };
    let from = mon.attitude;
    match apply_to_mons(state, &mut mon, act, true) {
        Fate::Gone => {
            if let Some(gone) = state.dismiss(id) {
                let pos = gone.pos;
                for item in gone.inventory.into_iter().filter(|i| !i.summoned) {
                    state.level_mut().drop_item(pos, item);
                }
            }
        }
        Fate::Stays => {
            if mon.attitude != from {
                state.attitude_changed(&mut mon, from);
            }
            if let Some(slot) = state.monster_mut(id) {
                *slot = mon;
            }
        }
    }
}

fn apply_to_transit(state: &mut GameState, act: Daction) {
    if !act.targets_monsters() {
        return;
    }
    let mut transit = std::mem::take(&mut state.transit);
    for (dest, mon) in transit.iter_mut() {
        if !matches(mon, act) {
            continue;
        }
        log::trace!("applying {act} to {:?} in transit to {dest}", mon.id);
        let from = mon.attitude;
        match apply_to_mons(state, mon, act, false) {
            Fate::Gone => {
                state.companions.remove(mon.id);
                mon.hp = 0;
            }
            Fate::Stays if mon.attitude != from => state.attitude_changed(mon, from),
            Fate::Stays => {}
        }
    }
    transit.remove_dead();
    state.transit = transit;
}

/// Apply one action to one monster.
///
/// `mon` is a working copy; the caller writes it back or removes the
/// original depending on the returned fate.
fn apply_to_mons(state: &mut GameState, mon: &mut Monster, act: Daction, local: bool) -> Fate {
    match act {
        Daction::AllyBeogh | Daction::AllySlime | Daction::AllyPlant => {
            log::debug!("going hostile: {}", mon.species);
            mon.attitude = Attitude::Hostile;
            mon.ench.remove(EnchKind::Charm);
            if local {
                mon.alert(Some(Actor::Player));
            }
            // Reconverting to Fedhas or Jiyva wins them back
            if act != Daction::AllyBeogh {
                mon.flags.remove(MonsterFlags::ATT_CHANGE_ATTEMPT);
            }
            Fate::Stays
        }
        Daction::AllyHepliaklqana => {
            if state.player.worships(God::Hepliaklqana) && piety_rank(state.player.piety) >= 1 {
                return Fate::Stays;
            }
            say(state, mon, local, " returns to the mists of memory.");
            Fate::Gone
        }
        Daction::OldBoundSoulsPoof => {
            if state.companions.contains(mon.id) {
                return Fate::Stays;
            }
            say(state, mon, local, " is freed.");
            Fate::Gone
        }
        Daction::SlimeNewAttempt => {
            mon.flags.remove(MonsterFlags::ATT_CHANGE_ATTEMPT);
            Fate::Stays
        }
        Daction::PikelMinions => {
            say(state, mon, local, " departs this earthly plane.");
            Fate::Gone
        }
        Daction::KirkeHogs => {
            *mon = hog_to_human(mon);
            Fate::Stays
        }
        Daction::BribeTimeout => {
            if mon.ench.remove(EnchKind::Bribed).is_some() {
                mon.attitude = Attitude::Neutral;
                mon.flags |= MonsterFlags::WAS_NEUTRAL;
            }
            mon.flags
                .remove(MonsterFlags::NEUTRAL_BRIBE | MonsterFlags::FRIENDLY_BRIBE);
            Fate::Stays
        }
        Daction::Reautomap | Daction::RemoveIgnisAltars | Daction::RotCorpses => {
            crate::errors::fatal("level daction applied to a monster")
        }
    }
}

fn say(state: &mut GameState, mon: &Monster, local: bool, suffix: &str) {
    if local {
        state.monster_msg(mon.id, suffix, Channel::MonsterEnchant);
    }
}

/// Build the monster a hog was before Kirke's magic, merged with what the
/// hog has been through since.
pub fn hog_to_human(hog: &Monster) -> Monster {
    let mut restored = match &hog.original {
        Some(orig) => {
            let mut orig = (**orig).clone();
            orig.id = hog.id;
            orig
        }
        None => Monster::new(hog.id, Species::Human, hog.pos).with_attitude(hog.attitude),
    };

    restored.pos = hog.pos;
    restored.ench = hog.ench.clone();
    restored.band = hog.band;
    restored.original = None;
    let hp = i64::from(restored.max_hp) * i64::from(hog.hp) / i64::from(hog.max_hp.max(1));
    restored.hp = (hp as i32).max(1);
    restored.flags |= hog.flags - (MonsterFlags::JUST_SUMMONED | MonsterFlags::WAS_IN_VIEW);

    // Helping a monster never costs a permanent ally
    if restored.attitude == Attitude::Hostile {
        restored.attitude = Attitude::GoodNeutral;
        restored.flags |= MonsterFlags::WAS_NEUTRAL;
    }
    restored
}

fn pikel_band_message(state: &mut GameState) {
    let visible = state
        .level()
        .monsters
        .iter()
        .filter(|m| matches(m, Daction::PikelMinions))
        .filter(|m| state.player_can_see(Actor::Monster(m.id)))
        .count();
    if visible == 0 || state.turn == 0 {
        return;
    }
    let text = if visible > 1 {
        "minions thank you for their"
    } else {
        "minion thanks you for its"
    };
    state.msg(
        Channel::Plain,
        format!("With Pikel's spell broken, his former {text} freedom."),
    );
}
