//! Actors: the player and monsters
//!
//! [`Actor`] is a cheap copyable handle naming one combatant. The state
//! behind it is reached through [`crate::GameState::actor`] as a
//! [`Combatant`], the read/write surface combat and brand code rely on.

pub mod ench;
pub mod monster;
pub mod player;
pub mod species;

pub use ench::{EnchKind, Enchantment, EnchantmentSet};
pub use monster::{Band, Monster, MonsterFlags, MonsterId};
pub use player::{Mutation, Player, PlayerSpecies, Skill, Stat};
pub use species::{AttackKind, MonAttack, Species, SpeciesFlags, SpeciesInfo};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::item::Weapon;
use crate::level::Coord;

/// Handle to a combatant
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Actor {
    Player,
    Monster(MonsterId),
}

impl Actor {
    pub const fn is_player(self) -> bool {
        matches!(self, Actor::Player)
    }

    pub const fn monster_id(self) -> Option<MonsterId> {
        match self {
            Actor::Monster(id) => Some(id),
            Actor::Player => None,
        }
    }
}

impl From<MonsterId> for Actor {
    fn from(id: MonsterId) -> Self {
        Actor::Monster(id)
    }
}

/// Holiness category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Holiness {
    #[default]
    Natural = 0,
    Undead = 1,
    Demonic = 2,
    Holy = 3,
    Nonliving = 4,
    Plant = 5,
}

impl Holiness {
    pub const fn is_evil(self) -> bool {
        matches!(self, Holiness::Undead | Holiness::Demonic)
    }
}

/// Disposition towards the player
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Attitude {
    #[default]
    Hostile = 0,
    /// Neutral to everyone, fights anything
    Neutral = 1,
    /// Neutral, and does not attack the player
    StrictNeutral = 2,
    /// Neutral, attacks only hostiles
    GoodNeutral = 3,
    Friendly = 4,
}

impl Attitude {
    /// Whether a monster with this attitude leaves the player alone
    pub const fn wont_attack(self) -> bool {
        matches!(
            self,
            Attitude::Friendly | Attitude::GoodNeutral | Attitude::StrictNeutral
        )
    }

    pub const fn is_neutral(self) -> bool {
        matches!(
            self,
            Attitude::Neutral | Attitude::StrictNeutral | Attitude::GoodNeutral
        )
    }
}

/// Body size
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum BodySize {
    Tiny = 0,
    Little = 1,
    Small = 2,
    #[default]
    Medium = 3,
    Large = 4,
    Big = 5,
    Giant = 6,
}

/// Where a species can live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[repr(u8)]
pub enum Habitat {
    #[default]
    Land = 0,
    Amphibious = 1,
    Water = 2,
    Lava = 3,
}

/// Resistance categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum ResistKind {
    Fire,
    Cold,
    Elec,
    Poison,
    Negative,
}

/// Resistance levels; negative values are vulnerabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Resistances {
    pub fire: i8,
    pub cold: i8,
    pub elec: i8,
    pub poison: i8,
    pub neg: i8,
}

impl Resistances {
    pub const NONE: Resistances = Resistances::new(0, 0, 0, 0, 0);

    pub const fn new(fire: i8, cold: i8, elec: i8, poison: i8, neg: i8) -> Self {
        Self {
            fire,
            cold,
            elec,
            poison,
            neg,
        }
    }

    pub const fn get(&self, kind: ResistKind) -> i32 {
        (match kind {
            ResistKind::Fire => self.fire,
            ResistKind::Cold => self.cold,
            ResistKind::Elec => self.elec,
            ResistKind::Poison => self.poison,
            ResistKind::Negative => self.neg,
        }) as i32
    }
}

/// How a weapon or natural attack deals damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[repr(u8)]
pub enum DamageKind {
    #[default]
    Crushing = 0,
    Slicing = 1,
    Piercing = 2,
    Chopping = 3,
    Claws = 4,
}

impl DamageKind {
    /// Damage kinds able to sever a head
    pub const fn can_sever(self) -> bool {
        matches!(
            self,
            DamageKind::Slicing | DamageKind::Chopping | DamageKind::Claws
        )
    }

    /// Multiplier used for blood spatter
    pub const fn bleed_factor(self) -> i32 {
        match self {
            DamageKind::Crushing => 1,
            DamageKind::Piercing => 2,
            DamageKind::Slicing | DamageKind::Chopping | DamageKind::Claws => 3,
        }
    }
}

/// Article used when naming an actor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Desc {
    #[default]
    The,
    A,
    Plain,
}

/// Read/write access to one combatant
pub trait Combatant {
    fn name(&self, desc: Desc) -> String;
    fn is_player(&self) -> bool;

    fn hp(&self) -> i32;
    fn max_hp(&self) -> i32;
    fn set_hp(&mut self, hp: i32);

    fn pos(&self) -> Coord;
    fn set_pos(&mut self, pos: Coord);

    fn ac(&self) -> i32;
    fn ev(&self) -> i32;
    /// Guaranteed damage reduction percentage
    fn gdr(&self) -> i32;
    fn resists(&self) -> Resistances;
    fn holiness(&self) -> Holiness;
    fn body_size(&self) -> BodySize;
    fn hit_dice(&self) -> i32;
    fn attitude(&self) -> Attitude;

    fn ench(&self) -> &EnchantmentSet;
    fn ench_mut(&mut self) -> &mut EnchantmentSet;

    fn weapon(&self) -> Option<&Weapon>;
    fn shield_bonus(&self) -> i32;
    fn is_summoned(&self) -> bool;
    fn can_bleed(&self) -> bool;
    fn flies(&self) -> bool;
    fn is_insubstantial(&self) -> bool;

    fn is_alive(&self) -> bool {
        self.hp() > 0
    }

    fn res(&self, kind: ResistKind) -> i32 {
        self.resists().get(kind)
    }

    fn has_ench(&self, kind: EnchKind) -> bool {
        self.ench().has(kind)
    }

    fn incapacitated(&self) -> bool {
        self.ench().iter().any(|(k, _)| k.incapacitates())
    }

    fn is_helpless(&self) -> bool {
        self.incapacitated() || self.has_ench(EnchKind::Held)
    }

    fn confused(&self) -> bool {
        self.has_ench(EnchKind::Confusion)
    }

    fn invisible(&self) -> bool {
        self.has_ench(EnchKind::Invisible)
    }

    /// Remove up to `amount` hit points, returning what was taken.
    ///
    /// Hit points never drop below zero and an actor already at zero is
    /// not damaged further.
    fn hurt(&mut self, amount: i32) -> i32 {
        let hp = self.hp();
        if hp <= 0 || amount <= 0 {
            return 0;
        }
        let new_hp = (hp - amount).max(0);
        self.set_hp(new_hp);
        hp - new_hp
    }

    /// Restore up to `amount` hit points, capped at the maximum.
    fn heal(&mut self, amount: i32) -> i32 {
        let hp = self.hp();
        if hp <= 0 || amount <= 0 {
            return 0;
        }
        let new_hp = (hp + amount).min(self.max_hp());
        self.set_hp(new_hp.max(hp));
        self.hp() - hp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wont_attack() {
        assert!(Attitude::Friendly.wont_attack());
        assert!(Attitude::GoodNeutral.wont_attack());
        assert!(Attitude::StrictNeutral.wont_attack());
        assert!(!Attitude::Neutral.wont_attack());
        assert!(!Attitude::Hostile.wont_attack());
    }

    #[test]
    fn test_resistances_get() {
        let r = Resistances::new(2, -1, 0, 1, 3);
        assert_eq!(r.get(ResistKind::Fire), 2);
        assert_eq!(r.get(ResistKind::Cold), -1);
        assert_eq!(r.get(ResistKind::Negative), 3);
    }

    #[test]
    fn test_hurt_and_heal_clamp() {
        let mut orc = Monster::new(MonsterId(1), Species::Orc, Coord::new(1, 1));
        let max = orc.max_hp();
        assert_eq!(orc.heal(10), 0);
        let taken = orc.hurt(max + 10);
        assert_eq!(taken, max);
        assert_eq!(orc.hp(), 0);
        assert_eq!(orc.hurt(5), 0);
        assert_eq!(orc.heal(5), 0);
    }

    #[test]
    fn test_actor_handle() {
        assert!(Actor::Player.is_player());
        assert_eq!(Actor::from(MonsterId(4)).monster_id(), Some(MonsterId(4)));
    }
}
