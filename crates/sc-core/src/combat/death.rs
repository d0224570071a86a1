//! Death bookkeeping for melee kills

use crate::actor::{Actor, Attitude, Combatant, Desc, EnchKind, Enchantment, Holiness, Monster, MonsterId, Species};
use crate::consts::DEFAULT_ABJ_DURATION;
use crate::item::Item;
use crate::level::Coord;
use crate::message::{Channel, capitalize};
use crate::state::GameState;

/// Whether the body leaves something behind
fn leaves_corpse(mon: &Monster) -> bool {
    !mon.is_summoned()
        && matches!(mon.holiness(), Holiness::Natural | Holiness::Holy)
        && !mon.is_insubstantial()
}

/// Attitude of whatever fights on the killer's side
fn killer_side(state: &GameState, killer: Option<Actor>) -> Attitude {
    match killer {
        Some(Actor::Player) => Attitude::Friendly,
        Some(Actor::Monster(id)) => match state.monster(id).map(|m| m.attitude) {
            Some(Attitude::Friendly) => Attitude::Friendly,
            _ => Attitude::Hostile,
        },
        None => Attitude::Hostile,
    }
}

/// Process a monster whose hit points ran out.
///
/// Runs once: the monster leaves the roster on the first call, so a second
/// call finds nothing to do. A slain orc may instead be spared by Beogh, in
/// which case it stays on the level and this returns false. `reaping`
/// raises a natural victim as a zombie for the killer's side.
pub fn monster_died(state: &mut GameState, id: MonsterId, killer: Option<Actor>, reaping: bool) -> bool {
    let Some(mon) = state.monster(id) else {
        return false;
    };
    if mon.hp > 0 {
        return false;
    }

    if crate::attitude::beogh_spare_orc(state, id, killer) {
        return false;
    }

    let Some(mon) = state.monster(id) else {
        return false;
    };
    let (pos, species) = (mon.pos, mon.species);
    let destroyed = matches!(mon.holiness(), Holiness::Undead | Holiness::Nonliving);
    let corpse = leaves_corpse(mon);
    let rises = reaping && corpse && mon.holiness() == Holiness::Natural;
    let name = mon.name(Desc::The);
    let seen = state.player_can_see(Actor::Monster(id));

    if killer == Some(Actor::Player) {
        let verb = if destroyed { "destroy" } else { "kill" };
        state.msg(Channel::Combat, format!("You {verb} {name}!"));
    } else {
        let suffix = if destroyed { " is destroyed!" } else { " dies!" };
        state.monster_msg(id, suffix, Channel::MonsterDamage);
    }
    log::debug!("{id:?} ({species}) killed by {killer:?}");

    let side = killer_side(state, killer);
    state.record_kill(id, killer);

    if rises {
        raise_zombie(state, pos, side, &name, seen);
    } else if corpse {
        state.level_mut().drop_item(pos, Item::corpse(species));
    }
    true
}

fn raise_zombie(state: &mut GameState, pos: Coord, side: Attitude, name: &str, seen: bool) {
    let id = state.next_id();
    let mut zombie = Monster::new(id, Species::Zombie, pos).with_attitude(side);
    zombie
        .ench
        .add(EnchKind::Abjuration, Enchantment::new(1, DEFAULT_ABJ_DURATION));
    if side == Attitude::Friendly {
        zombie.foe = None;
    }
    match state.place(zombie) {
        Ok(_) => {
            if seen {
                state.msg(Channel::MonsterDamage, format!("{} rises from the dead!", capitalize(name)));
            }
        }
        Err(e) => log::warn!("no room to raise a zombie: {e}"),
    }
}

/// The player ran out of hit points
pub fn player_died(state: &mut GameState, killer: Option<Actor>) {
    let by = killer.map_or_else(|| "something".to_string(), |k| state.actor_name(k, Desc::A));
    log::info!("player killed by {by} on turn {}", state.turn);
    state.msg(Channel::Warning, "You die...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;

    #[test]
    fn test_kill_drops_corpse() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        state.monster_mut(id).unwrap().hp = 0;
        assert!(monster_died(&mut state, id, Some(Actor::Player), false));
        assert!(state.monster(id).is_none());
        assert!(state.messages.contains("You kill the orc!"));
        assert!(state.level().items.iter().any(|(c, i)| *c == Coord::new(11, 10) && i.is_corpse()));
        assert_eq!(state.kills.len(), 1);
        assert!(state.kills[0].rewarded);
    }

    #[test]
    fn test_runs_once() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        state.monster_mut(id).unwrap().hp = 0;
        assert!(monster_died(&mut state, id, Some(Actor::Player), false));
        assert!(!monster_died(&mut state, id, Some(Actor::Player), false));
        assert_eq!(state.kills.len(), 1);
    }

    #[test]
    fn test_living_monster_untouched() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        assert!(!monster_died(&mut state, id, Some(Actor::Player), false));
        assert!(state.monster(id).is_some());
    }

    #[test]
    fn test_undead_destroyed_without_corpse() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Skeleton, Coord::new(11, 10)).unwrap();
        state.monster_mut(id).unwrap().hp = 0;
        monster_died(&mut state, id, Some(Actor::Player), false);
        assert!(state.messages.contains("You destroy the skeleton!"));
        assert!(state.level().items.is_empty());
    }

    #[test]
    fn test_summoned_leaves_nothing() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        let mon = state.monster_mut(id).unwrap();
        mon.hp = 0;
        mon.ench.add(EnchKind::Abjuration, Enchantment::new(1, 50));
        monster_died(&mut state, id, Some(Actor::Player), false);
        assert!(state.level().items.is_empty());
        assert!(!state.kills[0].rewarded);
    }

    #[test]
    fn test_reaping_raises_zombie() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        state.monster_mut(id).unwrap().hp = 0;
        monster_died(&mut state, id, Some(Actor::Player), true);
        let zombie = state.level().monster_at(Coord::new(11, 10)).unwrap();
        assert_eq!(zombie.species, Species::Zombie);
        assert_eq!(zombie.attitude, Attitude::Friendly);
        assert!(zombie.is_summoned());
        assert!(state.messages.contains("The orc rises from the dead!"));
        assert!(!state.level().items.iter().any(|(_, i)| matches!(i.kind, ItemKind::Corpse { .. })));
    }

    #[test]
    fn test_monster_kill_message() {
        let mut state = GameState::new(42);
        let killer = state.spawn(Species::Troll, Coord::new(12, 10)).unwrap();
        let id = state.spawn(Species::Orc, Coord::new(11, 10)).unwrap();
        state.monster_mut(id).unwrap().hp = 0;
        monster_died(&mut state, id, Some(Actor::Monster(killer)), false);
        assert!(state.messages.contains("The orc dies!"));
        assert!(!state.kills[0].rewarded);
    }

    #[test]
    fn test_player_death_message() {
        let mut state = GameState::new(42);
        state.player.hp = 0;
        player_died(&mut state, None);
        assert_eq!(state.messages.last().map(|m| m.text.as_str()), Some("You die..."));
    }
}
