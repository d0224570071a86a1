//! Game state
//!
//! [`GameState`] owns everything the combat and attitude code touches: the
//! player, the levels, the random source, the delayed-action log, the
//! transit registry and the companion table. Every engine operation takes it
//! by mutable reference; there are no globals.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::actor::{
    Actor, Attitude, Combatant, Desc, Monster, MonsterFlags, MonsterId, Player, Species,
};
use crate::companion::CompanionTable;
use crate::consts::LOS_RADIUS;
use crate::daction::DelayedActionQueue;
use crate::effects::EffectQueue;
use crate::errors::{fatal, EngineError, EngineResult};
use crate::god::God;
use crate::level::{Branch, Coord, Level, LevelId, TransitRegistry};
use crate::message::{capitalize, Channel, MessageLog, MessageSink};
use crate::options::EngineOptions;
use crate::rng::EngineRng;

/// A noise made during the turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noise {
    pub pos: Coord,
    pub loudness: i32,
    pub source: Actor,
}

/// One recorded attitude change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttitudeChange {
    pub monster: MonsterId,
    pub from: Attitude,
    pub to: Attitude,
}

/// One recorded kill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KillRecord {
    pub victim: MonsterId,
    pub species: Species,
    pub killer: Option<Actor>,
    /// Whether the kill counts for experience
    pub rewarded: bool,
    pub turn: u64,
}

/// The complete engine state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    pub levels: HashMap<LevelId, Level>,
    pub current: LevelId,
    pub rng: EngineRng,
    pub turn: u64,
    pub options: EngineOptions,
    pub dactions: DelayedActionQueue,
    pub transit: TransitRegistry,
    pub companions: CompanionTable,
    pub kills: Vec<KillRecord>,
    next_monster_id: MonsterId,

    #[serde(skip)]
    pub messages: MessageLog,
    #[serde(skip)]
    pub effects: EffectQueue,
    #[serde(skip)]
    pub noises: Vec<Noise>,
    #[serde(skip)]
    pub attitude_log: Vec<AttitudeChange>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_rng(EngineRng::default())
    }
}

impl GameState {
    /// A fresh state on D:1 with a seeded random source
    pub fn new(seed: u64) -> Self {
        Self::with_rng(EngineRng::seeded(seed))
    }

    pub fn with_rng(rng: EngineRng) -> Self {
        let start = LevelId::new(Branch::Dungeon, 1);
        let mut levels = HashMap::new();
        levels.insert(start, Level::new(start));
        let mut player = Player::default();
        player.pos = Coord::new(10, 10);
        Self {
            player,
            levels,
            current: start,
            rng,
            turn: 0,
            options: EngineOptions::default(),
            dactions: DelayedActionQueue::default(),
            transit: TransitRegistry::new(),
            companions: CompanionTable::default(),
            kills: Vec::new(),
            next_monster_id: MonsterId(1),
            messages: MessageLog::new(),
            effects: EffectQueue::default(),
            noises: Vec::new(),
            attitude_log: Vec::new(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// The active level
    pub fn level(&self) -> &Level {
        match self.levels.get(&self.current) {
            Some(level) => level,
            None => fatal("current level is not loaded"),
        }
    }

    pub fn level_mut(&mut self) -> &mut Level {
        let current = self.current;
        match self.levels.get_mut(&current) {
            Some(level) => level,
            None => fatal("current level is not loaded"),
        }
    }

    pub fn level_by_id(&self, id: LevelId) -> EngineResult<&Level> {
        self.levels.get(&id).ok_or(EngineError::NoSuchLevel(id))
    }

    /// Register a level without entering it
    pub fn add_level(&mut self, level: Level) {
        self.levels.insert(level.id, level);
    }

    /// Hand out a fresh monster id
    pub fn next_id(&mut self) -> MonsterId {
        let id = self.next_monster_id;
        self.next_monster_id = id.next();
        id
    }

    /// Place a new monster of `species` on the current level
    pub fn spawn(&mut self, species: Species, pos: Coord) -> EngineResult<MonsterId> {
        let id = self.next_id();
        self.place(Monster::new(id, species, pos))
    }

    /// Place an already built monster on the current level
    pub fn place(&mut self, monster: Monster) -> EngineResult<MonsterId> {
        let pos = monster.pos;
        if pos == self.player.pos {
            return Err(EngineError::CellUnavailable { x: pos.x, y: pos.y });
        }
        if monster.id.0 >= self.next_monster_id.0 {
            self.next_monster_id = monster.id.next();
        }
        log::debug!("placing {} {:?} at {pos}", monster.species, monster.id);
        self.level_mut().add_monster(monster)
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.level().monster(id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.level_mut().monster_mut(id)
    }

    pub fn actor(&self, actor: Actor) -> Option<&dyn Combatant> {
        match actor {
            Actor::Player => Some(&self.player),
            Actor::Monster(id) => self.monster(id).map(|m| m as &dyn Combatant),
        }
    }

    pub fn actor_mut(&mut self, actor: Actor) -> Option<&mut dyn Combatant> {
        match actor {
            Actor::Player => Some(&mut self.player),
            Actor::Monster(id) => self.monster_mut(id).map(|m| m as &mut dyn Combatant),
        }
    }

    pub fn is_alive(&self, actor: Actor) -> bool {
        self.actor(actor).is_some_and(|a| a.is_alive())
    }

    pub fn actor_name(&self, actor: Actor, desc: Desc) -> String {
        self.actor(actor)
            .map_or_else(|| "something".to_string(), |a| a.name(desc))
    }

    pub fn actor_pos(&self, actor: Actor) -> Option<Coord> {
        self.actor(actor).map(|a| a.pos())
    }

    /// Who, if anyone, stands on `c`
    pub fn actor_at(&self, c: Coord) -> Option<Actor> {
        if self.player.pos == c {
            return Some(Actor::Player);
        }
        self.level().monster_at(c).map(|m| Actor::Monster(m.id))
    }

    /// Passable and unoccupied by the player or a monster
    pub fn is_free(&self, c: Coord) -> bool {
        self.level().is_passable(c) && self.actor_at(c).is_none()
    }

    /// Whether the player has line of sight to `c`
    pub fn player_sees_cell(&self, c: Coord) -> bool {
        self.player.pos.distance(c) <= LOS_RADIUS && self.level().line_of_sight(self.player.pos, c)
    }

    /// Whether the player can see the actor
    pub fn player_can_see(&self, actor: Actor) -> bool {
        match actor {
            Actor::Player => true,
            Actor::Monster(id) => self.monster(id).is_some_and(|m| {
                self.player_sees_cell(m.pos)
                    && (!m.invisible() || self.player.see_invisible)
                    && !m.ench.has(crate::actor::EnchKind::Submerged)
            }),
        }
    }

    /// Whether the monster can see the player
    pub fn player_visible_to(&self, id: MonsterId) -> bool {
        self.monster(id).is_some_and(|m| {
            self.player_sees_cell(m.pos)
                && (!self.player.invisible()
                    || m.species.has_flag(crate::actor::SpeciesFlags::SEE_INVIS))
        })
    }

    /// Monster ids within `radius` of `centre`, in roster order
    pub fn monsters_within(&self, centre: Coord, radius: i32) -> Vec<MonsterId> {
        self.level()
            .monsters
            .iter()
            .filter(|m| m.hp > 0 && m.pos.distance(centre) <= radius)
            .map(|m| m.id)
            .collect()
    }

    pub fn msg(&mut self, channel: Channel, text: impl Into<String>) {
        self.messages.emit(channel, text.into());
    }

    /// Message about a monster, shown only if the player can see it.
    ///
    /// `suffix` follows the capitalised name directly, so it carries its
    /// own leading space. Returns whether anything was printed.
    pub fn monster_msg(&mut self, id: MonsterId, suffix: &str, channel: Channel) -> bool {
        if !self.player_can_see(Actor::Monster(id)) && !self.options.verbose {
            return false;
        }
        let name = self.actor_name(Actor::Monster(id), Desc::The);
        self.msg(channel, format!("{}{suffix}", capitalize(&name)));
        true
    }

    /// A message spoken by a god
    pub fn god_msg(&mut self, god: God, suffix: &str) {
        self.msg(Channel::God, format!("{}{suffix}", god.title()));
    }

    pub fn noisy(&mut self, pos: Coord, loudness: i32, source: Actor) {
        log::trace!("noise {loudness} at {pos} from {source:?}");
        self.noises.push(Noise {
            pos,
            loudness,
            source,
        });
    }

    /// Set a monster's attitude, firing the change hooks only on a real change
    pub fn set_attitude(&mut self, id: MonsterId, attitude: Attitude) -> bool {
        let Some(mut mon) = self.monster(id).cloned() else {
            return false;
        };
        let from = mon.attitude;
        if from == attitude {
            return false;
        }
        mon.attitude = attitude;
        self.attitude_changed(&mut mon, from);
        if let Some(slot) = self.monster_mut(id) {
            *slot = mon;
        }
        true
    }

    /// Bookkeeping after a monster's attitude changed from `from`.
    ///
    /// A monster that was ever on the player's side no longer rewards a
    /// kill, and companion records follow the new allegiance. `mon` may be
    /// a working copy of a monster on the level or one held in transit.
    pub fn attitude_changed(&mut self, mon: &mut Monster, from: Attitude) {
        let to = mon.attitude;
        log::debug!("{:?} attitude {from} -> {to}", mon.id);
        if to.wont_attack() {
            mon.flags |= MonsterFlags::NO_REWARD;
        }
        self.attitude_log.push(AttitudeChange {
            monster: mon.id,
            from,
            to,
        });
        crate::companion::update_after_attitude_change(self, mon);
    }

    /// Record a monster's death and take it off the roster
    pub fn record_kill(&mut self, id: MonsterId, killer: Option<Actor>) {
        let turn = self.turn;
        let Some(mon) = self.level_mut().remove_monster(id) else {
            return;
        };
        let rewarded = killer == Some(Actor::Player)
            && !mon.has_flag(MonsterFlags::NO_REWARD)
            && !mon.species.has_flag(crate::actor::SpeciesFlags::NO_EXP)
            && !mon.is_summoned();
        self.kills.push(KillRecord {
            victim: id,
            species: mon.species,
            killer,
            rewarded,
            turn,
        });
        self.companions.remove(id);
        for item in mon.inventory {
            if !item.summoned {
                self.level_mut().drop_item(mon.pos, item);
            }
        }
        if let Some(weapon) = mon.weapon
            && !weapon.summoned
        {
            self.level_mut().drop_item(mon.pos, weapon.into());
        }
    }

    /// Advance the clock one turn.
    ///
    /// Shields recover their blocks and timed enchantments count down.
    /// Summoned monsters whose abjuration runs out are dismissed.
    pub fn new_turn(&mut self) {
        self.turn += 1;
        self.player.shield_blocks = 0;
        self.player.ench.tick(1);
        self.noises.clear();

        let mut expired = Vec::new();
        for mon in self.level_mut().monsters.iter_mut() {
            mon.shield_blocks = 0;
            if mon.ench.tick(1).contains(&crate::actor::EnchKind::Abjuration) {
                expired.push(mon.id);
            }
        }
        for id in expired {
            log::debug!("{id:?} abjured at turn end");
            self.monster_msg(id, " disappears!", Channel::MonsterDamage);
            self.dismiss(id);
        }
    }

    /// Remove a monster without a kill record (dismissal, banishment)
    pub fn dismiss(&mut self, id: MonsterId) -> Option<Monster> {
        self.companions.remove(id);
        self.level_mut().remove_monster(id)
    }

    /// Leave the current level for `dest`, creating it if needed.
    ///
    /// The new level catches up on delayed actions before monsters waiting
    /// in transit for `dest` arrive near the player. Arrivals already had
    /// every logged action applied while they travelled.
    pub fn change_level(&mut self, dest: LevelId, arrival: Coord) {
        crate::daction::leave_level(self);
        if !self.levels.contains_key(&dest) {
            self.levels.insert(dest, Level::new(dest));
            self.dactions.start_level(dest);
        }
        self.current = dest;
        self.player.pos = arrival;
        log::info!("entering {dest}");
        crate::daction::catch_up(self);

        for mut mon in self.transit.take_arrivals(dest) {
            let spot = if self.is_free(mon.pos) && mon.pos.distance(arrival) <= 2 {
                Some(mon.pos)
            } else {
                self.level().free_cells_within(arrival, 2, &[arrival]).first().copied()
            };
            match spot {
                Some(pos) => {
                    mon.pos = pos;
                    if let Err(e) = self.level_mut().add_monster(mon) {
                        log::warn!("dropping arrival: {e}");
                    }
                }
                None => log::warn!("no room for {:?} arriving on {dest}", mon.id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::EnchKind;

    #[test]
    fn test_spawn_assigns_ids() {
        let mut state = GameState::new(42);
        let a = state.spawn(Species::Orc, Coord::new(12, 10)).unwrap();
        let b = state.spawn(Species::Rat, Coord::new(13, 10)).unwrap();
        assert_ne!(a, b);
        assert_eq!(state.monster(a).map(|m| m.species), Some(Species::Orc));
    }

    #[test]
    fn test_spawn_on_player_fails() {
        let mut state = GameState::new(42);
        let pos = state.player.pos;
        assert!(matches!(
            state.spawn(Species::Orc, pos),
            Err(EngineError::CellUnavailable { .. })
        ));
    }

    #[test]
    fn test_actor_access() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Goblin, Coord::new(11, 10)).unwrap();
        let goblin = Actor::Monster(id);
        assert_eq!(state.actor_name(goblin, Desc::The), "the goblin");
        assert_eq!(state.actor_name(Actor::Player, Desc::The), "you");
        let taken = state.actor_mut(goblin).map(|a| a.hurt(1000));
        assert_eq!(taken, Some(Species::Goblin.base_hp()));
        assert!(!state.is_alive(goblin));
    }

    #[test]
    fn test_new_turn_resets_and_abjures() {
        let mut state = GameState::new(42);
        state.player.shield_blocks = 3;
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        let summoned = state.spawn(Species::Imp, Coord::new(12, 10)).unwrap();
        state.monster_mut(id).unwrap().shield_blocks = 2;
        state
            .monster_mut(summoned)
            .unwrap()
            .ench
            .add(EnchKind::Abjuration, crate::actor::Enchantment::new(1, 1));
        state.new_turn();
        assert_eq!(state.turn, 1);
        assert_eq!(state.player.shield_blocks, 0);
        assert_eq!(state.monster(id).unwrap().shield_blocks, 0);
        assert!(state.monster(summoned).is_none());
        assert!(state.messages.contains("The imp disappears!"));
    }

    #[test]
    fn test_set_attitude_notifies_only_on_change() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        assert!(!state.set_attitude(id, Attitude::Hostile));
        assert!(state.attitude_log.is_empty());
        assert!(state.set_attitude(id, Attitude::Friendly));
        assert!(!state.set_attitude(id, Attitude::Friendly));
        assert_eq!(state.attitude_log.len(), 1);
        assert!(state.monster(id).unwrap().has_flag(MonsterFlags::NO_REWARD));
    }

    #[test]
    fn test_visibility() {
        let mut state = GameState::new(42);
        let near = state.spawn(Species::Orc, Coord::new(12, 10)).unwrap();
        let far = state.spawn(Species::Orc, Coord::new(40, 40)).unwrap();
        assert!(state.player_can_see(Actor::Monster(near)));
        assert!(!state.player_can_see(Actor::Monster(far)));
        state
            .monster_mut(near)
            .unwrap()
            .ench
            .add(EnchKind::Invisible, crate::actor::Enchantment::new(1, 10));
        assert!(!state.player_can_see(Actor::Monster(near)));
        state.player.see_invisible = true;
        assert!(state.player_can_see(Actor::Monster(near)));
    }

    #[test]
    fn test_record_kill_drops_real_items_only() {
        let mut state = GameState::new(42);
        let pos = Coord::new(12, 10);
        let id = state.spawn(Species::Orc, pos).unwrap();
        {
            let orc = state.monster_mut(id).unwrap();
            orc.weapon = Some(crate::item::Weapon::new(crate::item::WeaponKind::Club));
            let mut summoned = crate::item::Item::new(crate::item::ItemKind::Potion);
            summoned.summoned = true;
            orc.inventory.push(summoned);
        }
        state.record_kill(id, Some(Actor::Player));
        assert!(state.monster(id).is_none());
        assert_eq!(state.level().items.len(), 1);
        assert!(state.kills[0].rewarded);
    }

    #[test]
    fn test_change_level_brings_transit_monsters() {
        let mut state = GameState::new(42);
        let d2 = LevelId::new(Branch::Dungeon, 2);
        let id = state.next_id();
        state
            .transit
            .add(d2, Monster::new(id, Species::Orc, Coord::new(20, 20)));
        state.change_level(d2, Coord::new(20, 20));
        assert_eq!(state.current, d2);
        let orc = state.monster(id).unwrap();
        assert!(orc.pos.distance(Coord::new(20, 20)) <= 2);
        assert_ne!(orc.pos, state.player.pos);
        assert!(state.transit.is_empty());
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let mut state = GameState::new(7);
        state.spawn(Species::Orc, Coord::new(12, 10)).unwrap();
        state.msg(Channel::Plain, "not saved");
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level().monsters.len(), 1);
        assert!(back.messages.is_empty());
        assert_eq!(back.current, state.current);
    }
}
