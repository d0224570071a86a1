//! To-hit rolls, the opposed hit test and stab detection

use crate::actor::{Actor, Combatant, EnchKind, MonsterId, Skill, SpeciesFlags};
use crate::consts::{AUTOMATIC_HIT, BACKLIGHT_TO_HIT_BONUS, CONFUSION_TO_HIT_MALUS};
use crate::rng::RandomSource;
use crate::state::GameState;

/// Evasion added by phasing partly out of reality
pub const PHASE_SHIFT_EV: i32 = 8;

/// Roll an attack against evasion and return the margin.
///
/// A positive margin is a hit; a tie goes to the defender. A small share
/// of rolls (`auto_percent`) are forced, half to hit and half to miss.
pub fn test_hit<R: RandomSource>(
    rng: &mut R,
    to_land: i32,
    ev: i32,
    randomise_ev: bool,
    auto_percent: i32,
) -> i32 {
    let ev = if randomise_ev {
        rng.random2avg(2 * ev, 2)
    } else {
        ev
    };

    if to_land >= AUTOMATIC_HIT {
        return AUTOMATIC_HIT;
    }
    if rng.x_chance_in_y(auto_percent, 100) {
        return if rng.coin_flip() {
            AUTOMATIC_HIT
        } else {
            -AUTOMATIC_HIT
        };
    }
    to_land - ev
}

/// Whether `viewer` can make out `target`
pub fn can_see(state: &GameState, viewer: Actor, target: Actor) -> bool {
    match viewer {
        Actor::Player => state.player_can_see(target),
        Actor::Monster(id) => match target {
            Actor::Player => state.player_visible_to(id),
            Actor::Monster(other) => monster_sees_monster(state, id, other),
        },
    }
}

fn monster_sees_monster(state: &GameState, viewer: MonsterId, target: MonsterId) -> bool {
    let (Some(v), Some(t)) = (state.monster(viewer), state.monster(target)) else {
        return false;
    };
    if t.invisible() && !v.species.has_flag(SpeciesFlags::SEE_INVIS) {
        return false;
    }
    state.level().line_of_sight(v.pos, t.pos)
}

/// Modifiers applied after the base roll, for any attacker
fn post_roll_modifiers(state: &GameState, attacker: Actor, defender: Actor, to_hit: i32) -> i32 {
    let mut modifier = 0;
    let Some(atk) = state.actor(attacker) else {
        return 0;
    };

    if atk.confused() {
        modifier += CONFUSION_TO_HIT_MALUS;
    }

    // Swinging at something you cannot see
    if !can_see(state, attacker, defender) {
        modifier -= if attacker.is_player() {
            6
        } else {
            to_hit * 35 / 100
        };
    }

    // A glowing defender is easier to hit
    if let Some(def) = state.actor(defender) {
        let corona = def.ench().degree(EnchKind::Corona);
        if corona > 0 {
            modifier += BACKLIGHT_TO_HIT_BONUS + (corona - 1);
        }
    }

    modifier
}

/// The player's to-hit for a swing trained by `skill`
pub fn player_to_hit(state: &mut GameState, defender: Actor, skill: Skill, weapon_bonus: i32) -> i32 {
    let p = &state.player;
    let base = 15
        + p.dex / 2
        + p.skill(Skill::Fighting)
        + p.skill(skill)
        + weapon_bonus
        + p.slaying;

    let rolled = state.rng.uniform(base.max(1));
    let to_hit = rolled + post_roll_modifiers(state, Actor::Player, defender, rolled);
    log::trace!("player to-hit: base {base} rolled {rolled} final {to_hit}");
    to_hit
}

/// A monster's to-hit; fighters train harder
pub fn monster_to_hit(state: &mut GameState, attacker: MonsterId, defender: Actor, weapon_bonus: i32) -> i32 {
    let Some(mon) = state.monster(attacker) else {
        return 0;
    };
    let hd_mult = if mon.species.has_flag(SpeciesFlags::FIGHTER) {
        25
    } else {
        15
    };
    let mut to_hit = 18 + mon.hit_dice * hd_mult / 10 + weapon_bonus;
    to_hit += post_roll_modifiers(state, Actor::Monster(attacker), defender, to_hit);
    state.rng.uniform(to_hit.max(0) + 1)
}

/// Defender evasion as the attacker faces it
pub fn defender_ev(state: &GameState, defender: Actor) -> i32 {
    let Some(def) = state.actor(defender) else {
        return 0;
    };
    let mut ev = def.ev();
    if phase_shifts(state, defender) && !def.is_helpless() {
        ev += PHASE_SHIFT_EV;
    }
    ev
}

pub fn phase_shifts(state: &GameState, actor: Actor) -> bool {
    actor
        .monster_id()
        .and_then(|id| state.monster(id))
        .is_some_and(|m| m.species.has_flag(SpeciesFlags::PHASE_SHIFT))
}

/// How exposed a monster is to a sneak attack by the player.
///
/// 4 for sleeping, paralysed or petrifying; 3 for held in a net or web; 2
/// for confused; 1 for fleeing or unaware; 0 means no stab. Confused
/// players never stab.
pub fn stab_bonus(state: &GameState, defender: Actor) -> i32 {
    if state.player.confused() {
        return 0;
    }
    let Actor::Monster(id) = defender else {
        return 0;
    };
    let Some(mon) = state.monster(id) else {
        return 0;
    };

    if mon.asleep() || mon.paralysed() || mon.ench.has(EnchKind::Petrifying) {
        4
    } else if mon.ench.has(EnchKind::Held) {
        3
    } else if mon.ench.has(EnchKind::Confusion) {
        2
    } else if mon.fleeing() || !state.player_visible_to(id) {
        1
    } else {
        0
    }
}

/// Adverb describing how close a miss was
pub fn evasion_margin_adverb(margin: i32) -> &'static str {
    match margin {
        m if m <= -20 => " completely",
        m if m <= -12 => "",
        m if m <= -6 => " closely",
        _ => " barely",
    }
}
