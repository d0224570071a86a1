//! Chaos: a brand that picks another brand each hit

use super::{
    AttackFlavour, WeaponBrand, antimagic_susceptible, at_full_hp, holiness,
    holy_wrath_susceptible, resist, susceptible_to_vampirism,
};
use crate::actor::{Actor, Holiness, ResistKind};
use crate::rng::RandomSource;
use crate::state::GameState;

/// One entry of the chaos table, naming the brand and its flavour twin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChaosChoice {
    pub weight: u32,
    pub brand: WeaponBrand,
    pub flavour: AttackFlavour,
}

const fn choice(weight: u32, brand: WeaponBrand, flavour: AttackFlavour) -> ChaosChoice {
    ChaosChoice {
        weight,
        brand,
        flavour,
    }
}

/// What chaos can turn into. Chaos itself is never on the list.
pub const CHAOS_TABLE: [ChaosChoice; 12] = [
    choice(10, WeaponBrand::Flaming, AttackFlavour::Fire),
    choice(10, WeaponBrand::Freezing, AttackFlavour::Cold),
    choice(10, WeaponBrand::Electrocution, AttackFlavour::Elec),
    choice(10, WeaponBrand::Venom, AttackFlavour::Poison),
    choice(5, WeaponBrand::Vorpal, AttackFlavour::Plain),
    choice(5, WeaponBrand::Draining, AttackFlavour::DrainXp),
    choice(5, WeaponBrand::Vampirism, AttackFlavour::Vampiric),
    choice(5, WeaponBrand::HolyWrath, AttackFlavour::Holy),
    choice(5, WeaponBrand::Antimagic, AttackFlavour::Antimagic),
    choice(5, WeaponBrand::Pain, AttackFlavour::Pain),
    choice(5, WeaponBrand::Confuse, AttackFlavour::Confuse),
    choice(2, WeaponBrand::Distortion, AttackFlavour::Distort),
];

/// Whether `brand` can do anything to `defender`
pub fn is_susceptible(state: &GameState, defender: Actor, brand: WeaponBrand) -> bool {
    let player = defender.is_player();
    match brand {
        WeaponBrand::Flaming => player || resist(state, defender, ResistKind::Fire) < 3,
        WeaponBrand::Freezing => player || resist(state, defender, ResistKind::Cold) < 3,
        WeaponBrand::Electrocution => player || resist(state, defender, ResistKind::Elec) <= 0,
        WeaponBrand::Venom => !matches!(
            holiness(state, defender),
            Holiness::Undead | Holiness::Nonliving
        ),
        WeaponBrand::Draining | WeaponBrand::Pain => {
            resist(state, defender, ResistKind::Negative) < 3
        }
        WeaponBrand::Vampirism => susceptible_to_vampirism(state, defender),
        WeaponBrand::HolyWrath => holy_wrath_susceptible(state, defender),
        WeaponBrand::Antimagic => antimagic_susceptible(state, defender),
        WeaponBrand::Confuse => !matches!(
            holiness(state, defender),
            Holiness::Nonliving | Holiness::Plant
        ),
        _ => true,
    }
}

fn pick(state: &mut GameState, attacker: Actor, defender: Actor) -> ChaosChoice {
    // No point stealing life when already whole
    let full = at_full_hp(state, attacker);
    let table: Vec<(u32, ChaosChoice)> = CHAOS_TABLE
        .iter()
        .filter(|c| !(full && c.brand == WeaponBrand::Vampirism))
        .map(|c| (c.weight, *c))
        .collect();

    let cap = state.options.chaos_retry_cap;
    for _ in 0..cap {
        let Some(c) = state.rng.weighted_choice(&table) else {
            break;
        };
        if is_susceptible(state, defender, c.brand) || state.rng.chance_in_n(3) {
            return c;
        }
    }
    log::debug!("chaos gave up after {cap} rejections");
    table
        .iter()
        .map(|(_, c)| *c)
        .find(|c| is_susceptible(state, defender, c.brand))
        .unwrap_or(CHAOS_TABLE[4])
}

/// Concrete brand for one chaos hit
pub fn random_chaos_brand(state: &mut GameState, attacker: Actor, defender: Actor) -> WeaponBrand {
    pick(state, attacker, defender).brand
}

/// Concrete flavour for one chaotic monster attack
pub fn random_chaos_flavour(
    state: &mut GameState,
    attacker: Actor,
    defender: Actor,
) -> AttackFlavour {
    pick(state, attacker, defender).flavour
}
