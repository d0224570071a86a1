//! Monster attitude changes driven by the player's religion
//!
//! Holy beings may make peace with followers of the good gods, orcs may
//! join a Beoghite, slimes and plants may settle down for followers of
//! Jiyva and Fedhas, and followers turn on a player under penance. Each
//! check that rolls marks the monster with
//! [`MonsterFlags::ATT_CHANGE_ATTEMPT`] so it is tried only once, until a
//! delayed action clears the mark.

use crate::actor::{
    Actor, Attitude, Combatant, Desc, EnchKind, Enchantment, Holiness, MonsterFlags, MonsterId,
    PlayerSpecies, Skill, Species,
};
use crate::companion::remove_all_companions;
use crate::daction::{self, Daction};
use crate::god::{God, piety_breakpoint};
use crate::message::{Channel, capitalize};
use crate::rng::RandomSource;
use crate::state::GameState;

/// Conditions shared by every conversion check that needs the monster to
/// be paying attention to the player.
fn attentive(state: &GameState, id: MonsterId) -> bool {
    state.player_visible_to(id)
        && state
            .monster(id)
            .is_some_and(|m| !m.asleep() && !m.confused() && !m.paralysed())
}

fn mark_attempt(state: &mut GameState, id: MonsterId) {
    if let Some(m) = state.monster_mut(id) {
        m.flags |= MonsterFlags::ATT_CHANGE_ATTEMPT;
    }
}

/// Change attitude and let the bookkeeping know, once per real change
fn change_attitude(state: &mut GameState, id: MonsterId, to: Attitude) -> bool {
    state.set_attitude(id, to)
}

// Good gods

/// A hostile holy being may turn good neutral toward a follower of a good
/// god. Returns whether a roll was made.
pub fn good_god_follower_attitude_change(state: &mut GameState, id: MonsterId) -> bool {
    if state.player.undead_or_demonic() || !state.player.god.is_good() {
        return false;
    }
    let Some(mon) = state.monster(id) else {
        return false;
    };
    if mon.foe != Some(Actor::Player)
        || !mon.is_holy()
        || mon.has_flag(MonsterFlags::ATT_CHANGE_ATTEMPT)
        || mon.wont_attack()
        || !attentive(state, id)
    {
        return false;
    }

    mark_attempt(state, id);

    let piety = state.player.piety;
    if state.rng.x_chance_in_y(piety, crate::consts::MAX_PIETY) && !state.player.under_penance() {
        let profane = state
            .player
            .weapon
            .is_some_and(|w| w.is_unholy() || w.is_evil());
        if profane && state.rng.coin_flip() {
            state.monster_msg(id, " glares at your weapon.", Channel::FriendAction);
            holy_fail_reaction(state, id);
            return true;
        }
        holy_attitude_change(state, id);
    } else {
        holy_fail_reaction(state, id);
    }
    true
}

fn holy_attitude_change(state: &mut GameState, id: MonsterId) {
    if state.player_can_see(Actor::Monster(id)) {
        state.monster_msg(id, " seems to accept your presence.", Channel::FriendAction);
        if !state.rng.chance_in_n(3) {
            state.monster_msg(id, " says, \"Go in peace, friend.\"", Channel::Talk);
        }
    }

    let Some(mon) = state.monster_mut(id) else {
        return;
    };
    // Kills of it no longer count, should it turn on the player later
    mon.flags |= MonsterFlags::WAS_NEUTRAL;
    mon.god = God::ShiningOne;
    mon.alert(None);
    log::debug!("{id:?} made peace with a follower of {}", state.player.god);
    change_attitude(state, id, Attitude::GoodNeutral);
}

fn holy_fail_reaction(state: &mut GameState, id: MonsterId) {
    if !state.player_can_see(Actor::Monster(id)) {
        return;
    }
    state.monster_msg(id, " looks at you sternly.", Channel::FriendAction);
    if !state.rng.chance_in_n(3) {
        state.monster_msg(id, " says, \"Your faith is not enough.\"", Channel::Talk);
    }
}

// Beogh

fn beogh_can_convert(state: &GameState, id: MonsterId) -> bool {
    state.player.species == PlayerSpecies::HillOrc
        && state.player.worships(God::Beogh)
        && state.monster(id).is_some_and(|m| {
            m.species.is_orc() && !m.is_summoned() && !m.is_shapeshifter()
        })
}

/// An orc facing a Beoghite may join them. `orc_hit` is set when the
/// player has just struck it. Returns whether the orc converted.
pub fn beogh_follower_convert(state: &mut GameState, id: MonsterId, orc_hit: bool) -> bool {
    if !beogh_can_convert(state, id) {
        return false;
    }
    let Some(mon) = state.monster(id) else {
        return false;
    };
    if mon.foe != Some(Actor::Player)
        || mon.has_flag(MonsterFlags::ATT_CHANGE_ATTEMPT)
        || mon.friendly()
        || !attentive(state, id)
    {
        return false;
    }
    let hd = mon.hit_dice;

    mark_attempt(state, id);

    if state.player.piety < piety_breakpoint(2) || state.player.under_penance() {
        return false;
    }
    let (piety, xl) = (state.player.piety, state.player.xl);
    if !beogh_convert_roll(state, piety, xl, hd) {
        return false;
    }

    let slayer = state.player.weapon.is_some_and(|w| w.slays_orcs);
    if slayer && state.rng.coin_flip() {
        state.monster_msg(id, " flinches from your weapon.", Channel::FriendAction);
        return false;
    }
    beogh_convert_orc(state, id, orc_hit, false);
    true
}

/// The opposed roll for orc conversion: the player's piety and level
/// against the orc's hit dice.
pub fn beogh_convert_roll(state: &mut GameState, piety: i32, xl: i32, hd: i32) -> bool {
    let ours = state.rng.uniform(piety / 15) + state.rng.uniform(4 + xl / 3);
    let theirs = state.rng.uniform(hd) + hd + state.rng.uniform(5);
    ours > theirs
}

/// Turn an orc into a friendly gift of Beogh.
///
/// `emergency` marks a conversion in the middle of a fight, and
/// `by_follower` one where another follower spared it. A slain orc comes
/// back with a few hit points.
pub fn beogh_convert_orc(state: &mut GameState, id: MonsterId, emergency: bool, by_follower: bool) {
    let Some(mon) = state.monster(id) else {
        return;
    };
    let dead = !mon.is_alive();

    if state.player_can_see(Actor::Monster(id)) {
        if emergency || dead {
            let reaction = if by_follower {
                " is spared by your follower, and bows before you."
            } else if dead {
                " rises, bloodied but alive, and bows before you."
            } else {
                " stops fighting and bows before you."
            };
            state.monster_msg(id, reaction, Channel::FriendAction);
            state.monster_msg(id, " says, \"Beogh be praised!\"", Channel::Talk);
        } else {
            state.monster_msg(id, " bows before you.", Channel::FriendAction);
            if !state.rng.chance_in_n(3) {
                state.monster_msg(id, " says, \"I will follow you!\"", Channel::Talk);
            }
        }
    }

    let revive_hp = if dead {
        Some(state.rng.random_range(1, 4))
    } else {
        None
    };
    let Some(mon) = state.monster_mut(id) else {
        return;
    };
    mon.flags |= MonsterFlags::NO_REWARD;
    mon.god = God::NoGod;
    mon.make_god_gift(God::Beogh);
    mon.patrol_point = None;
    if let Some(hp) = revive_hp {
        mon.hp = hp.min(mon.max_hp);
    }
    mon.alert(None);
    log::debug!("{id:?} converted to Beogh");
    change_attitude(state, id, Attitude::Friendly);
}

/// Beogh may spare an orc at the moment of death, when the player or one
/// of their followers dealt the blow. Returns whether the orc lives.
pub fn beogh_spare_orc(state: &mut GameState, id: MonsterId, killer: Option<Actor>) -> bool {
    if !beogh_can_convert(state, id)
        || state.player.under_penance()
        || state.player.piety < piety_breakpoint(2)
    {
        return false;
    }
    let Some(pos) = state.monster(id).map(|m| m.pos) else {
        return false;
    };
    if !state.player_sees_cell(pos) {
        return false;
    }

    let by_follower = match killer {
        Some(Actor::Player) => false,
        Some(Actor::Monster(k)) => {
            let follower = state.monster(k).is_some_and(|m| m.friendly());
            if !follower || state.rng.chance_in_n(3) {
                return false;
            }
            true
        }
        None => return false,
    };

    let hd = state.monster(id).map_or(0, |m| m.hit_dice);
    let (piety, xl) = (state.player.piety, state.player.xl);
    let spared = state.rng.uniform(piety) >= piety_breakpoint(0)
        && state.rng.uniform(xl) >= state.rng.uniform(hd)
        // Tougher orcs are the ones worth sparing
        && state.rng.uniform(hd) > 2;
    if spared {
        beogh_convert_orc(state, id, true, by_follower);
    }
    spared
}

// Jiyva and Fedhas

/// A hostile slime may become a neutral fellow slime of Jiyva.
/// Returns whether it converted.
pub fn slime_convert(state: &mut GameState, id: MonsterId) -> bool {
    if !state.player.worships(God::Jiyva) {
        return false;
    }
    let Some(mon) = state.monster(id) else {
        return false;
    };
    if !mon.species.is_slime()
        || mon.is_summoned()
        || mon.is_shapeshifter()
        || mon.neutral()
        || mon.friendly()
        || mon.has_flag(MonsterFlags::ATT_CHANGE_ATTEMPT)
        || !attentive(state, id)
    {
        return false;
    }

    mark_attempt(state, id);
    if state.player.under_penance() {
        return false;
    }
    jiyva_convert_slime(state, id);
    true
}

fn jiyva_convert_slime(state: &mut GameState, id: MonsterId) {
    let Some(mon) = state.monster(id) else {
        return;
    };
    let eyeball = mon.species.genus() == Species::GiantEyeball;
    let hungry = !mon.eats_items();

    if state.player_can_see(Actor::Monster(id)) {
        let name = capitalize(&state.actor_name(Actor::Monster(id), Desc::The));
        let text = if eyeball {
            format!("{name} stares at you suspiciously for a moment, then relaxes.")
        } else {
            format!("{name} trembles before you.")
        };
        state.msg(Channel::God, text);
    }

    if let Some(mon) = state.monster_mut(id) {
        mon.flags |= MonsterFlags::WAS_NEUTRAL;
        if hungry {
            mon.ench.add(EnchKind::EatItems, Enchantment::new(1, 0));
        }
        mon.god = God::NoGod;
        mon.flags.remove(MonsterFlags::GOD_GIFT);
        mon.make_god_gift(God::Jiyva);
    }
    if hungry {
        state.monster_msg(id, " looks hungrier.", Channel::MonsterEnchant);
    }
    change_attitude(state, id, Attitude::StrictNeutral);
}

/// Plants stop fighting a follower of Fedhas. Returns whether one did.
pub fn fedhas_neutralise(state: &mut GameState, id: MonsterId) -> bool {
    if !state.player.worships(God::Fedhas) || state.player.under_penance() {
        return false;
    }
    let Some(mon) = state.monster(id) else {
        return false;
    };
    if mon.attitude != Attitude::Hostile
        || !fedhas_neutralises(mon.species, mon.is_summoned())
        || mon.has_flag(MonsterFlags::ATT_CHANGE_ATTEMPT)
    {
        return false;
    }

    if let Some(mon) = state.monster_mut(id) {
        mon.flags |= MonsterFlags::WAS_NEUTRAL | MonsterFlags::ATT_CHANGE_ATTEMPT;
    }
    change_attitude(state, id, Attitude::GoodNeutral)
}

fn fedhas_neutralises(species: Species, summoned: bool) -> bool {
    species.holiness() == Holiness::Plant && !summoned
}

// Penance and abandonment

/// A follower's saving throw against walking out on a player in penance
fn follower_keeps_faith(state: &mut GameState, god: God, hd: i32) -> bool {
    let deficit = state.player.piety - state.player.penance_for(god);
    let invocations = state.player.skill(Skill::Invocations);
    let ours = state.rng.uniform(deficit / 18) + state.rng.uniform(invocations - 6);
    let theirs = state.rng.uniform(hd) + hd + state.rng.uniform(5);
    ours > theirs
}

fn abandon_tier(turned: usize, total: usize) -> &'static str {
    if turned == 1 && total > 1 {
        "one of"
    } else if turned == total {
        "all of"
    } else {
        "some of"
    }
}

fn turn_hostile(state: &mut GameState, id: MonsterId) {
    if let Some(mon) = state.monster_mut(id) {
        mon.alert(Some(Actor::Player));
    }
    change_attitude(state, id, Attitude::Hostile);
}

/// Under Yredelemnul's penance, nearby undead slaves may be reclaimed.
/// Returns whether any were.
pub fn yred_slaves_abandon_you(state: &mut GameState) -> bool {
    let radius = state.options.abandon_radius;
    let mut slaves = 0;
    let mut reclaimed = 0;

    for id in state.monsters_within(state.player.pos, radius) {
        let Some(mon) = state.monster(id) else {
            continue;
        };
        if !is_yred_undead_slave(mon) {
            continue;
        }
        slaves += 1;
        let hd = mon.hit_dice;
        if follower_keeps_faith(state, God::Yredelemnul, hd) {
            continue;
        }
        turn_hostile(state, id);
        reclaimed += 1;
    }

    if reclaimed == 0 {
        return false;
    }
    let text = match abandon_tier(reclaimed, slaves) {
        "one of" => " reclaims one of your granted undead slaves!",
        "all of" => " reclaims your granted undead slaves!",
        _ => " reclaims some of your granted undead slaves!",
    };
    state.god_msg(God::Yredelemnul, text);
    log::info!("Yredelemnul reclaimed {reclaimed} of {slaves} slaves");
    true
}

fn is_yred_undead_slave(mon: &crate::actor::Monster) -> bool {
    mon.friendly() && mon.holiness() == Holiness::Undead && mon.is_god_gift(God::Yredelemnul)
}

/// Under Beogh's penance, nearby orcish followers may desert.
/// Returns whether any did.
pub fn beogh_followers_abandon_you(state: &mut GameState) -> bool {
    let radius = state.options.abandon_radius;
    let mut followers = 0;
    let mut visible_deserters = 0;
    let mut any = false;

    for id in state.monsters_within(state.player.pos, radius) {
        let Some(mon) = state.monster(id) else {
            continue;
        };
        // Summons of orc priests are gifts too
        if !mon.is_god_gift(God::Beogh) {
            continue;
        }
        followers += 1;
        if mon.cannot_act() || !attentive(state, id) {
            continue;
        }
        let hd = mon.hit_dice;
        if follower_keeps_faith(state, God::Beogh, hd) {
            continue;
        }
        turn_hostile(state, id);
        if state.player_can_see(Actor::Monster(id)) {
            visible_deserters += 1;
        }
        any = true;
    }

    if !any {
        return false;
    }
    state.god_msg(God::Beogh, "'s voice booms out, \"Who do you think you are?\"");
    if visible_deserters > 0 {
        let text = match abandon_tier(visible_deserters, followers) {
            "one of" => "One of your followers decides to abandon you.",
            "all of" => "Your followers decide to abandon you.",
            _ => "Some of your followers decide to abandon you.",
        };
        state.msg(Channel::MonsterEnchant, text);
    }
    true
}

/// Temporary gifts of `god` leave when the god turns away.
/// Returns how many the player saw go.
pub fn make_god_gifts_disappear(state: &mut GameState, god: God) -> usize {
    let gifts: Vec<MonsterId> = state
        .level()
        .monsters
        .iter()
        .filter(|m| {
            m.is_alive() && m.friendly() && m.ench.has(EnchKind::Abjuration) && m.is_god_gift(god)
        })
        .map(|m| m.id)
        .collect();

    let mut seen = 0;
    for id in gifts {
        if state.monster_msg(id, " abandons you!", Channel::MonsterDamage) {
            seen += 1;
        }
        state.dismiss(id);
    }
    seen
}

/// Penance for leaving `god`
fn desertion_penance(god: God) -> i32 {
    match god {
        God::Kikubaaqudgha | God::Yredelemnul => 30,
        God::Makhleb => 25,
        _ => 50,
    }
}

/// The player leaves their god.
///
/// Followers granted by the god turn or vanish, wherever they are, through
/// the delayed-action log.
pub fn excommunication(state: &mut GameState) {
    let old = state.player.god;
    if old.is_none() {
        return;
    }
    state.player.god = God::NoGod;
    state.player.piety = 0;
    state.msg(Channel::God, "You have lost your religion!");
    log::info!("player abandoned {old}");

    match old {
        God::Beogh => {
            beogh_followers_abandon_you(state);
            daction::add(state, Daction::AllyBeogh);
        }
        God::Jiyva => daction::add(state, Daction::AllySlime),
        God::Fedhas => daction::add(state, Daction::AllyPlant),
        God::Hepliaklqana => daction::add(state, Daction::AllyHepliaklqana),
        God::Ignis => daction::add(state, Daction::RemoveIgnisAltars),
        God::Trog | God::ShiningOne | God::Yredelemnul => {
            make_god_gifts_disappear(state, old);
        }
        _ => {}
    }
    if old.grants_passive_mapping() {
        daction::add(state, Daction::Reautomap);
    }
    remove_all_companions(state, old);

    *state.player.penance.entry(old).or_insert(0) += desertion_penance(old);
}

/// Run the religion checks for every monster the player can see.
/// Returns how many attitudes changed.
pub fn god_reacts_to_monsters(state: &mut GameState) -> usize {
    let before = state.attitude_log.len();
    let ids: Vec<MonsterId> = state
        .monsters_within(state.player.pos, crate::consts::LOS_RADIUS)
        .into_iter()
        .filter(|id| state.player_can_see(Actor::Monster(*id)))
        .collect();

    for id in ids {
        good_god_follower_attitude_change(state, id);
        beogh_follower_convert(state, id, false);
        slime_convert(state, id);
        fedhas_neutralise(state, id);
    }
    state.attitude_log.len() - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Weapon, WeaponKind};
    use crate::level::Coord;
    use crate::rng::EngineRng;

    fn state_with(script: Vec<i32>) -> GameState {
        GameState::with_rng(EngineRng::scripted(script))
    }

    fn hostile(state: &mut GameState, species: Species) -> MonsterId {
        state.spawn(species, Coord::new(12, 10)).unwrap()
    }

    #[test]
    fn test_holy_conversion_success() {
        // piety roll 0 < 200, then the speech roll
        let mut state = state_with(vec![0, 0]);
        state.player.god = God::ShiningOne;
        state.player.piety = 200;
        let id = hostile(&mut state, Species::Angel);

        assert!(good_god_follower_attitude_change(&mut state, id));
        let mon = state.monster(id).unwrap();
        assert_eq!(mon.attitude, Attitude::GoodNeutral);
        assert_eq!(mon.god, God::ShiningOne);
        assert!(mon.has_flag(MonsterFlags::WAS_NEUTRAL));
        assert!(mon.has_flag(MonsterFlags::NO_REWARD));
        assert_eq!(mon.foe, None);
        assert_eq!(state.attitude_log.len(), 1);
    }

    #[test]
    fn test_holy_conversion_rolls_once() {
        let mut state = state_with(vec![199, 0, 0, 0]);
        state.player.god = God::Zin;
        state.player.piety = 10;
        let id = hostile(&mut state, Species::Angel);

        assert!(good_god_follower_attitude_change(&mut state, id));
        assert_eq!(state.monster(id).unwrap().attitude, Attitude::Hostile);
        let said = state.messages.len();
        assert!(!good_god_follower_attitude_change(&mut state, id));
        assert_eq!(state.messages.len(), said);
    }

    #[test]
    fn test_holy_glares_at_profane_weapon() {
        let mut state = state_with(vec![0, 0, 0]);
        state.player.god = God::ShiningOne;
        state.player.piety = 200;
        state.player.weapon = Some(Weapon::new(WeaponKind::DemonBlade));
        let id = hostile(&mut state, Species::Angel);

        good_god_follower_attitude_change(&mut state, id);
        assert_eq!(state.monster(id).unwrap().attitude, Attitude::Hostile);
        assert!(state.messages.contains("The angel glares at your weapon."));
    }

    #[test]
    fn test_demonic_player_never_converts() {
        let mut state = state_with(vec![]);
        state.player.species = PlayerSpecies::Demonspawn;
        state.player.god = God::ShiningOne;
        let id = hostile(&mut state, Species::Angel);
        assert!(!good_god_follower_attitude_change(&mut state, id));
        assert!(!state.monster(id).unwrap().has_flag(MonsterFlags::ATT_CHANGE_ATTEMPT));
    }

    fn beoghite(state: &mut GameState, piety: i32) {
        state.player.species = PlayerSpecies::HillOrc;
        state.player.god = God::Beogh;
        state.player.piety = piety;
        state.player.xl = 10;
    }

    #[test]
    fn test_orc_conversion() {
        // ours: 9 + 6 = 15; theirs: 0 + 1 + 0 = 1
        let mut state = state_with(vec![9, 6, 0, 0]);
        beoghite(&mut state, 150);
        let id = hostile(&mut state, Species::Orc);

        assert!(beogh_follower_convert(&mut state, id, false));
        let mon = state.monster(id).unwrap();
        assert_eq!(mon.attitude, Attitude::Friendly);
        assert!(mon.is_god_gift(God::Beogh));
        assert!(mon.has_flag(MonsterFlags::NO_REWARD));
        assert!(state.messages.contains("The orc bows before you."));
    }

    #[test]
    fn test_orc_conversion_needs_piety() {
        let mut state = state_with(vec![]);
        beoghite(&mut state, 74);
        let id = hostile(&mut state, Species::Orc);
        assert!(!beogh_follower_convert(&mut state, id, false));
        assert!(state.monster(id).unwrap().has_flag(MonsterFlags::ATT_CHANGE_ATTEMPT));
        assert_eq!(state.monster(id).unwrap().attitude, Attitude::Hostile);
    }

    #[test]
    fn test_orc_conversion_only_for_hill_orcs() {
        let mut state = state_with(vec![]);
        beoghite(&mut state, 150);
        state.player.species = PlayerSpecies::Human;
        let id = hostile(&mut state, Species::Orc);
        assert!(!beogh_follower_convert(&mut state, id, false));
    }

    #[test]
    fn test_orc_slayer_veto() {
        let mut state = state_with(vec![9, 6, 0, 0, 0]);
        beoghite(&mut state, 150);
        let mut weapon = Weapon::new(WeaponKind::LongSword);
        weapon.slays_orcs = true;
        state.player.weapon = Some(weapon);
        let id = hostile(&mut state, Species::Orc);
        assert!(!beogh_follower_convert(&mut state, id, false));
        assert!(state.messages.contains("The orc flinches from your weapon."));
    }

    #[test]
    fn test_dying_orc_spared() {
        // piety roll, level roll, hd roll, hd > 2 roll, revive hp
        let mut state = state_with(vec![100, 9, 0, 8, 2]);
        beoghite(&mut state, 150);
        let id = hostile(&mut state, Species::OrcKnight);
        state.monster_mut(id).unwrap().hp = 0;

        assert!(beogh_spare_orc(&mut state, id, Some(Actor::Player)));
        let mon = state.monster(id).unwrap();
        assert_eq!(mon.hp, 3);
        assert_eq!(mon.attitude, Attitude::Friendly);
        assert!(state.messages.contains("bloodied but alive"));
    }

    #[test]
    fn test_weak_orc_not_spared() {
        let mut state = state_with(vec![100, 9, 0, 0]);
        beoghite(&mut state, 150);
        let id = hostile(&mut state, Species::Orc);
        state.monster_mut(id).unwrap().hp = 0;
        assert!(!beogh_spare_orc(&mut state, id, Some(Actor::Player)));
    }

    #[test]
    fn test_slime_conversion() {
        let mut state = state_with(vec![]);
        state.player.god = God::Jiyva;
        let id = hostile(&mut state, Species::Jelly);
        assert!(slime_convert(&mut state, id));
        let mon = state.monster(id).unwrap();
        assert!(mon.is_fellow_slime());
        assert!(mon.has_flag(MonsterFlags::WAS_NEUTRAL));
        assert!(state.messages.contains("The jelly trembles before you."));
    }

    #[test]
    fn test_eyeball_conversion_message() {
        let mut state = state_with(vec![]);
        state.player.god = God::Jiyva;
        let id = hostile(&mut state, Species::GiantEyeball);
        slime_convert(&mut state, id);
        assert!(state.messages.contains("stares at you suspiciously for a moment, then relaxes."));
    }

    #[test]
    fn test_slime_conversion_under_penance() {
        let mut state = state_with(vec![]);
        state.player.god = God::Jiyva;
        state.player.penance.insert(God::Jiyva, 10);
        let id = hostile(&mut state, Species::Jelly);
        assert!(!slime_convert(&mut state, id));
        assert!(state.monster(id).unwrap().has_flag(MonsterFlags::ATT_CHANGE_ATTEMPT));
    }

    #[test]
    fn test_plant_neutralised_once() {
        let mut state = state_with(vec![]);
        state.player.god = God::Fedhas;
        let id = hostile(&mut state, Species::Plant);
        assert!(fedhas_neutralise(&mut state, id));
        assert_eq!(state.monster(id).unwrap().attitude, Attitude::GoodNeutral);
        assert!(!fedhas_neutralise(&mut state, id));
        assert_eq!(state.attitude_log.len(), 1);
    }

    #[test]
    fn test_abandon_tiers() {
        assert_eq!(abandon_tier(1, 3), "one of");
        assert_eq!(abandon_tier(3, 3), "all of");
        assert_eq!(abandon_tier(2, 3), "some of");
        assert_eq!(abandon_tier(1, 1), "all of");
    }

    #[test]
    fn test_beogh_followers_desert() {
        let mut state = state_with(vec![]);
        beoghite(&mut state, 10);
        state.player.penance.insert(God::Beogh, 50);
        let mut ids = Vec::new();
        for x in 11..14 {
            let id = state.spawn(Species::Orc, Coord::new(x, 11)).unwrap();
            let mon = state.monster_mut(id).unwrap();
            mon.attitude = Attitude::Friendly;
            mon.make_god_gift(God::Beogh);
            ids.push(id);
        }

        assert!(beogh_followers_abandon_you(&mut state));
        for id in ids {
            assert_eq!(state.monster(id).unwrap().attitude, Attitude::Hostile);
            assert_eq!(state.monster(id).unwrap().foe, Some(Actor::Player));
        }
        assert!(state.messages.contains("Your followers decide to abandon you."));
    }

    #[test]
    fn test_yred_reclaims_one() {
        // The first slave keeps faith, the second does not
        let mut state = state_with(vec![0, 10, 0, 0, 0, 0, 0, 0, 0]);
        state.player.god = God::Yredelemnul;
        state.player.piety = 100;
        state.player.set_skill(Skill::Invocations, 20);
        for x in 11..13 {
            let id = state.spawn(Species::Zombie, Coord::new(x, 11)).unwrap();
            let mon = state.monster_mut(id).unwrap();
            mon.attitude = Attitude::Friendly;
            mon.make_god_gift(God::Yredelemnul);
        }
        assert!(yred_slaves_abandon_you(&mut state));
        assert!(state.messages.contains("reclaims one of your granted undead slaves!"));
    }

    #[test]
    fn test_god_gifts_disappear() {
        let mut state = state_with(vec![]);
        let id = state.spawn(Species::Angel, Coord::new(11, 11)).unwrap();
        let mon = state.monster_mut(id).unwrap();
        mon.attitude = Attitude::Friendly;
        mon.make_god_gift(God::ShiningOne);
        mon.ench.add(EnchKind::Abjuration, Enchantment::new(1, 100));
        let keeper = state.spawn(Species::Angel, Coord::new(12, 11)).unwrap();
        let mon = state.monster_mut(keeper).unwrap();
        mon.attitude = Attitude::Friendly;
        mon.make_god_gift(God::ShiningOne);

        assert_eq!(make_god_gifts_disappear(&mut state, God::ShiningOne), 1);
        assert!(state.monster(id).is_none());
        assert!(state.monster(keeper).is_some());
    }

    #[test]
    fn test_excommunication_from_beogh() {
        let mut state = GameState::new(42);
        beoghite(&mut state, 100);
        let id = state.spawn(Species::Orc, Coord::new(11, 11)).unwrap();
        let mon = state.monster_mut(id).unwrap();
        mon.attitude = Attitude::Friendly;
        mon.make_god_gift(God::Beogh);

        excommunication(&mut state);
        assert_eq!(state.player.god, God::NoGod);
        assert_eq!(state.player.penance_for(God::Beogh), 50);
        assert_eq!(state.monster(id).unwrap().attitude, Attitude::Hostile);
        assert_eq!(state.dactions.log(), &[Daction::AllyBeogh]);
    }

    #[test]
    fn test_god_reacts_to_visible_monsters() {
        let mut state = state_with(vec![]);
        state.player.god = God::Fedhas;
        hostile(&mut state, Species::Plant);
        state.spawn(Species::Oklob, Coord::new(13, 10)).unwrap();
        assert_eq!(god_reacts_to_monsters(&mut state), 2);
    }
}
