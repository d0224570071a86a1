//! Monster polymorph
//!
//! Rewrites a monster's species in place. Position, a share of its hit
//! points and a short allow-list of enchantments survive the change; the
//! rest is re-derived from the new species. Random targets are drawn from
//! the species table and filtered by [`valid_morph`] and a power window
//! that widens the longer nothing suitable turns up.

use strum::IntoEnumIterator;

use crate::actor::{
    Actor, Attitude, BodySize, EnchKind, Enchantment, Holiness, Monster, MonsterFlags, MonsterId,
    Species, SpeciesFlags,
};
use crate::god::God;
use crate::message::Channel;
use crate::rng::RandomSource;
use crate::state::GameState;

/// Relaxation beyond which a random polymorph gives up
const MAX_RELAX: i32 = 50;

/// What to turn into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyTarget {
    Random,
    Species(Species),
}

/// Desired strength of a random target relative to the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerBias {
    Less,
    More,
    #[default]
    Same,
}

/// How the change is described to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Normal,
    Slimify,
}

/// Whether the power gap between source and target is outside the window
fn power_unsuitable(bias: PowerBias, source: i32, target: i32, relax: i32) -> bool {
    match bias {
        PowerBias::Less => target > source - 3 + relax * 3 / 2 || target < source - relax / 2,
        PowerBias::More => target < source + 2 - relax || target > source + relax,
        PowerBias::Same => target < source - relax || target > source + relax * 3 / 2,
    }
}

/// Whether `mon` may become `target` where it stands.
///
/// Coloured draconians are far tougher than their hit dice suggest, so they
/// pass only one time in ten; that roll draws from the random source.
pub fn valid_morph(state: &mut GameState, mon: &Monster, target: Species) -> bool {
    if target.is_nonbase_draconian() && !state.rng.chance_in_n(10) {
        return false;
    }
    let flags = target.flags();
    let banned = SpeciesFlags::UNIQUE
        | SpeciesFlags::NO_EXP
        | SpeciesFlags::NO_POLY_TO
        | SpeciesFlags::UNFINISHED
        | SpeciesFlags::PROGRAM_BUG
        | SpeciesFlags::DERIVED
        | SpeciesFlags::GHOST_DEMON
        | SpeciesFlags::TEST_SPAWNER
        | SpeciesFlags::STATUE
        | SpeciesFlags::PROJECTILE;
    if flags.intersects(banned)
        || target == mon.species
        || target == Species::OrbGuardian
        || target.holiness() != mon.species.holiness()
        || (target == Species::Human && mon.species == Species::PrinceRibbit)
    {
        return false;
    }
    // Shapeshifters only ever take living forms
    if mon.is_shapeshifter() && target.holiness() != Holiness::Natural {
        return false;
    }
    state.level().terrain(mon.pos).suits(target.info().habitat)
}

/// Change a monster's species.
///
/// Returns whether the monster changed. Failures are not errors: the
/// monster shudders or looks momentarily different and stays as it was.
pub fn polymorph(state: &mut GameState, id: MonsterId, target: PolyTarget, bias: PowerBias) -> bool {
    let Some(mon) = state.monster(id).cloned() else {
        return false;
    };
    let chosen = match target {
        PolyTarget::Species(species) => species,
        PolyTarget::Random => match pick_random_target(state, &mon, bias) {
            Some(species) => species,
            None => return false,
        },
    };
    if !valid_morph(state, &mon, chosen) {
        state.monster_msg(id, " looks momentarily different.", Channel::MonsterEnchant);
        return false;
    }
    transform(state, id, chosen, Style::Normal)
}

fn pick_random_target(state: &mut GameState, mon: &Monster, bias: PowerBias) -> Option<Species> {
    let terrain = state.level().terrain(mon.pos);
    let candidates: Vec<Species> = Species::iter()
        .filter(|s| terrain.suits(s.info().habitat))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let source = mon.hit_dice;
    let mut relax = 1;
    let mut last = mon.species;
    for _ in 0..state.options.polymorph_tries {
        let pick = candidates[state.rng.uniform(candidates.len() as i32) as usize];
        last = pick;
        if state.rng.chance_in_n(200) {
            relax += 1;
        }
        if relax > MAX_RELAX {
            state.monster_msg(mon.id, " shudders.", Channel::MonsterEnchant);
            log::warn!("polymorph of {:?} gave up at relax {relax}", mon.id);
            return None;
        }
        let power = pick.info().hit_dice as i32;
        if !power_unsuitable(bias, source, power, relax) && valid_morph(state, mon, pick) {
            log::debug!("polymorph {:?}: {} -> {pick} (relax {relax})", mon.id, mon.species);
            return Some(pick);
        }
    }
    // Out of tries; the caller's validity check reports the failure
    Some(last)
}

fn a_name(species: Species) -> String {
    use crate::actor::{Combatant, Desc};
    Monster::new(MonsterId::NONE, species, Default::default()).name(Desc::A)
}

/// Rewrite the monster as `species`, keeping what survives a change of form
fn transform(state: &mut GameState, id: MonsterId, species: Species, style: Style) -> bool {
    let Some(old) = state.monster(id).cloned() else {
        return false;
    };
    let saw_before = state.player_can_see(Actor::Monster(id));

    let verb = if old.species == Species::Ogre && species == Species::TwoHeadedOgre {
        " grows a second head!".to_string()
    } else {
        let lead = match style {
            Style::Slimify => " quivers uncontrollably and liquefies into ",
            Style::Normal if old.is_shapeshifter() => " changes into ",
            Style::Normal => " evaporates and reforms as ",
        };
        format!("{lead}{}!", a_name(species))
    };
    if saw_before {
        state.monster_msg(id, &verb, Channel::MonsterEnchant);
    }

    let mut mon = old.clone();
    mon.define_as(species);

    // Hit points keep their proportion of the maximum, and never reach zero
    let percent = old.hp * 100 / old.max_hp.max(1);
    mon.hp = (mon.max_hp * percent / 100).clamp(1, mon.max_hp);

    mon.flags.remove(
        MonsterFlags::SEEN | MonsterFlags::ATT_CHANGE_ATTEMPT | MonsterFlags::WAS_IN_VIEW,
    );
    // Beogh has no interest in what is no longer an orc
    if old.god == God::Beogh && !species.is_orc() {
        mon.god = God::NoGod;
        mon.flags.remove(MonsterFlags::GOD_GIFT);
    }

    let was_held = old.ench.has(EnchKind::Held);
    mon.ench.retain_kinds(&EnchKind::POLYMORPH_CARRY);
    if mon.ench.has(EnchKind::Submerged) && !mon.can_submerge() {
        mon.ench.remove(EnchKind::Submerged);
    }
    if was_held && mon.species.info().size < BodySize::Giant {
        mon.ench.add(EnchKind::Held, Enchantment::new(1, 0));
    }
    mon.heads = mon.heads.min(mon.max_heads());

    let pos = mon.pos;
    let items: Vec<_> = mon.inventory.drain(..).collect();
    let weapon = mon.weapon.take();
    if saw_before && old.is_shapeshifter() {
        mon.flags |= MonsterFlags::KNOWN_POLY;
    }

    if let Some(slot) = state.monster_mut(id) {
        *slot = mon;
    }
    for item in items.into_iter().chain(weapon.map(Into::into)) {
        if !item.summoned {
            state.level_mut().drop_item(pos, item);
        }
    }
    if state.player_can_see(Actor::Monster(id)) {
        if let Some(m) = state.monster_mut(id) {
            m.flags |= MonsterFlags::SEEN;
        }
    }
    log::debug!("{id:?} is now {species}");
    true
}

/// Slime species picked for a monster of `hit_dice`
fn slime_for(state: &mut GameState, hit_dice: i32) -> Species {
    match hit_dice {
        hd if hd < 3 => Species::Endoplasm,
        hd if hd < 5 => Species::Jelly,
        hd if hd < 12 => Species::SlimeCreature,
        _ if state.rng.coin_flip() => Species::AcidBlob,
        _ => Species::AzureJelly,
    }
}

/// Whether a slimifying touch can work on the monster
pub fn can_be_slimified(mon: &Monster) -> bool {
    !mon.is_unique()
        && !mon.species.is_slime()
        && mon.species.holiness() == Holiness::Natural
}

/// Turn a monster into a neutral slime of Jiyva
pub fn slimify(state: &mut GameState, id: MonsterId) -> bool {
    let Some(mon) = state.monster(id) else {
        return false;
    };
    if !can_be_slimified(mon) {
        return false;
    }
    let hd = mon.hit_dice;
    let target = slime_for(state, hd);
    if !transform(state, id, target, Style::Slimify) {
        return false;
    }
    let Some(mut mon) = state.monster(id).cloned() else {
        return false;
    };
    if !mon.eats_items() {
        mon.ench.add(EnchKind::EatItems, Enchantment::new(1, 0));
    }
    mon.make_god_gift(God::Jiyva);
    mon.ench.remove(EnchKind::Shapeshifter);
    mon.ench.remove(EnchKind::GlowingShapeshifter);
    let from = mon.attitude;
    mon.attitude = Attitude::StrictNeutral;
    if from != Attitude::StrictNeutral {
        state.attitude_changed(&mut mon, from);
    }
    if let Some(slot) = state.monster_mut(id) {
        *slot = mon;
    }
    true
}
