//! Weapon brands and attack flavours
//!
//! After a hit lands, the weapon's brand (or the monster attack's flavour)
//! may add damage or a side effect. [`apply`] works out both. It applies
//! enchantments, healing and displacement directly, and hands the extra
//! damage back to the caller to inflict, since that damage may kill.

mod chaos;
mod distortion;
mod flavour;
mod weapon;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use crate::actor::{Actor, Combatant, Desc, EnchKind, Enchantment, Holiness, ResistKind};
use crate::message::{capitalize, third_person};
use crate::rng::RandomSource;
use crate::state::GameState;

pub use chaos::{CHAOS_TABLE, ChaosChoice, is_susceptible, random_chaos_brand, random_chaos_flavour};
pub use distortion::{DistortionEffect, distortion_affects_defender};

/// Weapon brands (SPWPN_*)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[repr(u8)]
pub enum WeaponBrand {
    #[default]
    None = 0,
    Flaming = 1,
    Freezing = 2,
    #[strum(serialize = "holy wrath")]
    HolyWrath = 3,
    Electrocution = 4,
    Venom = 5,
    Pain = 6,
    Draining = 7,
    Speed = 8,
    Vorpal = 9,
    Vampirism = 10,
    Protection = 11,
    Antimagic = 12,
    Distortion = 13,
    Chaos = 14,
    Confuse = 15,
    Reaping = 16,
    Penetration = 17,
    Evasion = 18,
    Acid = 19,
}

impl WeaponBrand {
    /// Brands that still act on a defender the hit just killed
    pub const fn acts_on_corpse(self) -> bool {
        matches!(
            self,
            WeaponBrand::Flaming
                | WeaponBrand::Freezing
                | WeaponBrand::Electrocution
                | WeaponBrand::Vampirism
                | WeaponBrand::Protection
        )
    }

    /// Brands that do nothing unless the hit did some damage
    pub const fn needs_damage(self) -> bool {
        matches!(
            self,
            WeaponBrand::Flaming
                | WeaponBrand::Freezing
                | WeaponBrand::HolyWrath
                | WeaponBrand::Antimagic
                | WeaponBrand::Vampirism
        )
    }
}

/// Intrinsic monster attack flavours (AF_*)
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[repr(u8)]
pub enum AttackFlavour {
    #[default]
    Plain = 0,
    Fire = 1,
    Cold = 2,
    Elec = 3,
    Poison = 4,
    PoisonStrong = 5,
    Vampiric = 6,
    DrainStr = 7,
    DrainInt = 8,
    DrainDex = 9,
    Confuse = 10,
    /// Negative energy (AF_DRAIN)
    DrainXp = 11,
    /// Poison with a chance of paralysis or slowing
    Paralyse = 12,
    Distort = 13,
    Rage = 14,
    Holy = 15,
    Antimagic = 16,
    Pain = 17,
    Ensnare = 18,
    Crush = 19,
    Engulf = 20,
    /// Fire that armour only half stops
    PureFire = 21,
    DrainSpeed = 22,
    /// Strips willpower
    Vuln = 23,
    Drown = 24,
    Weakness = 25,
    Chaotic = 26,
    /// Knocks the defender back a square
    Trample = 27,
    Corrode = 28,
}

impl AttackFlavour {
    /// Flavours that still act on a defender the hit just killed
    pub const fn acts_on_corpse(self) -> bool {
        matches!(self, AttackFlavour::Vampiric)
    }
}

/// Which table an on-hit effect comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Special {
    Brand(WeaponBrand),
    Flavour(AttackFlavour),
}

/// The facts about a landed hit that effects depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitContext {
    pub attacker: Actor,
    pub defender: Actor,
    /// Damage after armour
    pub damage_done: i32,
    /// Nominal damage of the attack before any roll
    pub attack_damage: i32,
}

/// Result of one brand or flavour application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandOutcome {
    /// Extra damage for the caller to inflict
    pub special_damage: i32,
    pub message: Option<String>,
    /// Whether the player could tell which brand did it
    pub obvious: bool,
    /// The defender is gone from the level; the attack sequence ends
    pub terminal: bool,
}

impl BrandOutcome {
    fn damage(special_damage: i32, message: Option<String>) -> Self {
        Self {
            special_damage,
            obvious: message.is_some(),
            message,
            terminal: false,
        }
    }
}

/// Scale damage by a resistance rating: vulnerable takes half again,
/// each level of resistance divides further, and 3 is immunity.
pub fn resist_adjust(rating: i32, damage: i32) -> i32 {
    match rating {
        r if r < 0 => damage * 3 / 2,
        0 => damage,
        1 => damage / 2,
        2 => damage / 3,
        _ => 0,
    }
}

/// Run a brand or flavour for a landed hit
pub fn apply(state: &mut GameState, special: Special, hit: HitContext) -> BrandOutcome {
    let outcome = match special {
        Special::Brand(brand) => weapon::apply_brand(state, brand, hit),
        Special::Flavour(flavour) => flavour::apply_flavour(state, flavour, hit),
    };
    if outcome.special_damage > 0 || outcome.message.is_some() {
        log::trace!(
            "{special:?} on {:?}: +{} {:?}",
            hit.defender,
            outcome.special_damage,
            outcome.message
        );
    }
    outcome
}

/// "." up to "!!!" as damage grows
pub fn attack_strength_punctuation(damage: i32) -> &'static str {
    match damage {
        d if d < 6 => ".",
        d if d < 12 => "!",
        d if d < 18 => "!!",
        _ => "!!!",
    }
}

// Text helpers shared by the effect tables

fn the(state: &GameState, actor: Actor) -> String {
    state.actor_name(actor, Desc::The)
}

fn the_cap(state: &GameState, actor: Actor) -> String {
    capitalize(&the(state, actor))
}

fn conj(actor: Actor, verb: &str) -> String {
    if actor.is_player() {
        verb.to_string()
    } else {
        third_person(verb)
    }
}

fn possessive(state: &GameState, actor: Actor) -> String {
    if actor.is_player() {
        "your".to_string()
    } else {
        format!("{}'s", the(state, actor))
    }
}

fn visible(state: &GameState, actor: Actor) -> bool {
    state.player_can_see(actor)
}

// Actor queries that need the concrete type behind the handle

fn resist(state: &GameState, actor: Actor, kind: ResistKind) -> i32 {
    state.actor(actor).map_or(0, |a| a.res(kind))
}

fn holiness(state: &GameState, actor: Actor) -> Holiness {
    state.actor(actor).map_or(Holiness::Nonliving, |a| a.holiness())
}

fn hit_dice(state: &GameState, actor: Actor) -> i32 {
    state.actor(actor).map_or(0, |a| a.hit_dice())
}

fn at_full_hp(state: &GameState, actor: Actor) -> bool {
    state.actor(actor).is_some_and(|a| a.hp() >= a.max_hp())
}

/// Undead and demons: holy damage hurts them
pub fn holy_wrath_susceptible(state: &GameState, actor: Actor) -> bool {
    match actor {
        Actor::Player => state.player.undead_or_demonic(),
        Actor::Monster(_) => holiness(state, actor).is_evil(),
    }
}

/// Bleeding, living, unsummoned and not negative-energy immune
pub fn susceptible_to_vampirism(state: &GameState, actor: Actor) -> bool {
    state.actor(actor).is_some_and(|a| {
        a.holiness() == Holiness::Natural
            && a.can_bleed()
            && !a.is_summoned()
            && a.res(ResistKind::Negative) < 3
    })
}

/// Has magic that antimagic can disrupt
pub fn antimagic_susceptible(state: &GameState, actor: Actor) -> bool {
    match actor {
        Actor::Player => state.player.mp_max > 0,
        Actor::Monster(id) => state.monster(id).is_some_and(|m| m.is_spellcaster()),
    }
}

fn undead_or_demonic(state: &GameState, actor: Actor) -> bool {
    holy_wrath_susceptible(state, actor)
}

fn worships_trog(state: &GameState, actor: Actor) -> bool {
    match actor {
        Actor::Player => state.player.worships(crate::god::God::Trog),
        Actor::Monster(id) => state
            .monster(id)
            .is_some_and(|m| m.god == crate::god::God::Trog),
    }
}

// Status effects, shared by brands and flavours

/// Poison an actor. Returns whether the poison took hold.
fn poison(state: &mut GameState, target: Actor, source: Actor, amount: i32, strong: bool) -> bool {
    let rpois = resist(state, target, ResistKind::Poison);
    let blocked = if strong { rpois >= 2 } else { rpois >= 1 };
    if blocked || amount <= 0 {
        return false;
    }
    let Some(actor) = state.actor_mut(target) else {
        return false;
    };
    actor
        .ench_mut()
        .add(EnchKind::Poison, Enchantment::from_source(1, amount, source))
}

fn confuse(state: &mut GameState, target: Actor, source: Actor, duration: i32) -> bool {
    if matches!(holiness(state, target), Holiness::Nonliving | Holiness::Plant) {
        return false;
    }
    state.actor_mut(target).is_some_and(|a| {
        a.ench_mut()
            .add(EnchKind::Confusion, Enchantment::from_source(1, duration, source))
    })
}

fn enchant(state: &mut GameState, target: Actor, source: Actor, kind: EnchKind, duration: i32) {
    if let Some(a) = state.actor_mut(target) {
        a.ench_mut()
            .add(kind, Enchantment::from_source(1, duration, source));
    }
}

fn heal(state: &mut GameState, target: Actor, amount: i32) -> i32 {
    state.actor_mut(target).map_or(0, |a| a.heal(amount))
}

/// Negative energy: experience loss for the player, a drained level for
/// monsters. Returns whether anything was drained.
fn drain(state: &mut GameState, target: Actor, amount: i32) -> bool {
    if resist(state, target, ResistKind::Negative) >= 3 {
        return false;
    }
    match target {
        Actor::Player => {
            state.player.drain_exp(amount);
            true
        }
        Actor::Monster(id) => state.monster_mut(id).is_some_and(|m| {
            m.ench
                .add_capped(EnchKind::Drained, Enchantment::new(1, 0), m.hit_dice.max(1))
        }),
    }
}

/// Weapon and flavour draining (drain_defender)
fn drain_defender(state: &mut GameState, hit: HitContext) -> BrandOutcome {
    if !hit.defender.is_player() && state.rng.coin_flip() {
        return BrandOutcome::default();
    }
    if !matches!(
        holiness(state, hit.defender),
        Holiness::Natural | Holiness::Plant
    ) {
        return BrandOutcome::default();
    }
    let raw = (1 + state.rng.uniform(hit.damage_done)) / 2;
    let special = resist_adjust(resist(state, hit.defender, ResistKind::Negative), raw);
    if !drain(state, hit.defender, 1 + hit.damage_done) {
        return BrandOutcome::damage(special, None);
    }
    let message = (!hit.defender.is_player() && visible(state, hit.defender)).then(|| {
        format!(
            "{} {} {}{}",
            the_cap(state, hit.attacker),
            conj(hit.attacker, "drain"),
            the(state, hit.defender),
            attack_strength_punctuation(special)
        )
    });
    let mut outcome = BrandOutcome::damage(special, message);
    outcome.obvious |= hit.defender.is_player();
    outcome
}

/// Necromantic pain; `power` is the user's necromancy
fn pain_affects_defender(state: &mut GameState, hit: HitContext, power: i32) -> BrandOutcome {
    if state.rng.chance_in_n(power + 1) {
        return BrandOutcome::default();
    }
    let raw = state.rng.uniform(1 + power);
    let special = resist_adjust(resist(state, hit.defender, ResistKind::Negative), raw);
    let message = (special > 0 && visible(state, hit.defender)).then(|| {
        format!(
            "{} {} in agony{}",
            the_cap(state, hit.defender),
            conj(hit.defender, "writhe"),
            attack_strength_punctuation(special)
        )
    });
    BrandOutcome::damage(special, message)
}

/// Antimagic: disrupts a monster's spells or leaks the player's magic
fn antimagic_affects_defender(state: &mut GameState, hit: HitContext, power: i32) -> BrandOutcome {
    if !antimagic_susceptible(state, hit.defender) {
        return BrandOutcome::default();
    }
    let mut outcome = BrandOutcome::default();
    match hit.defender {
        Actor::Player => {
            let loss = 1 + state.rng.uniform(power / 10 + 1);
            state.player.mp = (state.player.mp - loss).max(0);
            outcome.message = Some("You feel your power leaking away.".to_string());
        }
        Actor::Monster(_) => {
            let duration = 1 + state.rng.uniform(power / 4 + 1);
            enchant(state, hit.defender, hit.attacker, EnchKind::Antimagic, duration);
            if visible(state, hit.defender) {
                outcome.message = Some(format!(
                    "{} magic leaks into the air.",
                    capitalize(&possessive(state, hit.defender))
                ));
            }
        }
    }
    outcome.obvious = true;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::level::Coord;
    use crate::rng::EngineRng;
    use strum::IntoEnumIterator;

    #[test]
    fn test_enum_sizes() {
        assert_eq!(WeaponBrand::COUNT, 20);
        assert_eq!(AttackFlavour::COUNT, 29);
        assert_eq!(WeaponBrand::default(), WeaponBrand::None);
        let on_corpse: Vec<_> = AttackFlavour::iter().filter(|f| f.acts_on_corpse()).collect();
        assert_eq!(on_corpse, vec![AttackFlavour::Vampiric]);
        assert!(WeaponBrand::Flaming.needs_damage());
        assert!(!WeaponBrand::Venom.acts_on_corpse());
    }

    #[test]
    fn test_resist_adjust_table() {
        assert_eq!(resist_adjust(-1, 10), 15);
        assert_eq!(resist_adjust(0, 10), 10);
        assert_eq!(resist_adjust(1, 10), 5);
        assert_eq!(resist_adjust(2, 10), 3);
        assert_eq!(resist_adjust(3, 10), 0);
        assert_eq!(resist_adjust(7, 10), 0);
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(attack_strength_punctuation(0), ".");
        assert_eq!(attack_strength_punctuation(6), "!");
        assert_eq!(attack_strength_punctuation(12), "!!");
        assert_eq!(attack_strength_punctuation(40), "!!!");
    }

    #[test]
    fn test_susceptibility_queries() {
        let mut state = GameState::new(42);
        let orc = Actor::Monster(state.spawn(Species::Orc, Coord::new(11, 10)).unwrap());
        let zombie = Actor::Monster(state.spawn(Species::Zombie, Coord::new(12, 10)).unwrap());
        let priest = Actor::Monster(state.spawn(Species::OrcPriest, Coord::new(13, 10)).unwrap());
        assert!(susceptible_to_vampirism(&state, orc));
        assert!(!susceptible_to_vampirism(&state, zombie));
        assert!(holy_wrath_susceptible(&state, zombie));
        assert!(!holy_wrath_susceptible(&state, orc));
        assert!(antimagic_susceptible(&state, priest));
        assert!(!antimagic_susceptible(&state, orc));
        assert!(antimagic_susceptible(&state, Actor::Player));
    }

    #[test]
    fn test_poison_respects_resistance() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        let orc = Actor::Monster(state.spawn(Species::Orc, Coord::new(11, 10)).unwrap());
        let zombie = Actor::Monster(state.spawn(Species::Zombie, Coord::new(12, 10)).unwrap());
        assert!(poison(&mut state, orc, Actor::Player, 10, false));
        assert!(state.actor(orc).unwrap().has_ench(EnchKind::Poison));
        assert!(!poison(&mut state, zombie, Actor::Player, 10, false));
    }
}
