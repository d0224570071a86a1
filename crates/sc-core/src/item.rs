//! Items as the combat core sees them
//!
//! Only weapons carry rules here. Everything else is tracked so that death
//! and polymorph can drop or destroy it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::actor::{DamageKind, Skill, Species};
use crate::brand::WeaponBrand;

/// Weapon base types
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum WeaponKind {
    Dagger,
    ShortSword,
    Rapier,
    #[default]
    LongSword,
    GreatSword,
    HandAxe,
    WarAxe,
    BattleAxe,
    Club,
    Mace,
    Flail,
    Whip,
    Spear,
    Trident,
    Halberd,
    Quarterstaff,
    DemonBlade,
    DemonWhip,
    SacredScourge,
}

/// Static weapon properties
#[derive(Debug, Clone, Copy)]
pub struct WeaponInfo {
    pub name: &'static str,
    pub damage: i32,
    pub to_hit: i32,
    pub skill: Skill,
    pub damage_kind: DamageKind,
    /// Extra loudness when swung
    pub noise: i32,
}

const fn winfo(
    name: &'static str,
    damage: i32,
    to_hit: i32,
    skill: Skill,
    damage_kind: DamageKind,
    noise: i32,
) -> WeaponInfo {
    WeaponInfo {
        name,
        damage,
        to_hit,
        skill,
        damage_kind,
        noise,
    }
}

impl WeaponKind {
    pub const fn info(self) -> WeaponInfo {
        use DamageKind as D;
        use Skill as S;
        match self {
            WeaponKind::Dagger => winfo("dagger", 4, 6, S::ShortBlades, D::Piercing, 0),
            WeaponKind::ShortSword => winfo("short sword", 5, 4, S::ShortBlades, D::Piercing, 0),
            WeaponKind::Rapier => winfo("rapier", 7, 4, S::ShortBlades, D::Piercing, 0),
            WeaponKind::LongSword => winfo("long sword", 10, 1, S::LongBlades, D::Slicing, 0),
            WeaponKind::GreatSword => winfo("great sword", 17, -3, S::LongBlades, D::Slicing, 1),
            WeaponKind::HandAxe => winfo("hand axe", 7, 3, S::Axes, D::Chopping, 0),
            WeaponKind::WarAxe => winfo("war axe", 11, 0, S::Axes, D::Chopping, 1),
            WeaponKind::BattleAxe => winfo("battleaxe", 15, -4, S::Axes, D::Chopping, 1),
            WeaponKind::Club => winfo("club", 5, 3, S::MacesFlails, D::Crushing, 1),
            WeaponKind::Mace => winfo("mace", 8, 3, S::MacesFlails, D::Crushing, 1),
            WeaponKind::Flail => winfo("flail", 10, 0, S::MacesFlails, D::Crushing, 1),
            WeaponKind::Whip => winfo("whip", 6, 2, S::MacesFlails, D::Slicing, 0),
            WeaponKind::Spear => winfo("spear", 6, 4, S::Polearms, D::Piercing, 0),
            WeaponKind::Trident => winfo("trident", 9, 1, S::Polearms, D::Piercing, 0),
            WeaponKind::Halberd => winfo("halberd", 13, -3, S::Polearms, D::Chopping, 1),
            WeaponKind::Quarterstaff => winfo("quarterstaff", 10, 3, S::Staves, D::Crushing, 1),
            WeaponKind::DemonBlade => winfo("demon blade", 13, -1, S::LongBlades, D::Slicing, 0),
            WeaponKind::DemonWhip => winfo("demon whip", 11, 1, S::MacesFlails, D::Slicing, 0),
            WeaponKind::SacredScourge => winfo("sacred scourge", 12, 0, S::MacesFlails, D::Slicing, 0),
        }
    }

    /// Short blades stab more effectively
    pub const fn is_stab_weapon(self) -> bool {
        matches!(self.info().skill, Skill::ShortBlades)
    }

    pub const fn is_unholy(self) -> bool {
        matches!(self, WeaponKind::DemonBlade | WeaponKind::DemonWhip)
    }
}

/// A wielded weapon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub brand: WeaponBrand,
    pub plus: i32,
    /// Summoned weapons vanish instead of dropping
    pub summoned: bool,
    /// Artefact property that angers orcs
    pub slays_orcs: bool,
}

impl Weapon {
    pub fn new(kind: WeaponKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    pub fn with_brand(kind: WeaponKind, brand: WeaponBrand) -> Self {
        Self {
            kind,
            brand,
            ..Default::default()
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.info().name
    }

    pub fn damage_kind(&self) -> DamageKind {
        self.kind.info().damage_kind
    }

    /// Necromantic brands that good gods and holy beings despise
    pub fn is_evil(&self) -> bool {
        matches!(
            self.brand,
            WeaponBrand::Draining | WeaponBrand::Pain | WeaponBrand::Vampirism | WeaponBrand::Reaping
        )
    }

    pub fn is_unholy(&self) -> bool {
        self.kind.is_unholy()
    }

    pub fn is_holy(&self) -> bool {
        self.brand == WeaponBrand::HolyWrath || self.kind == WeaponKind::SacredScourge
    }
}

/// Non-weapon item classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon(Weapon),
    Armour,
    Potion,
    Scroll,
    Gold,
    Corpse { species: Species, rotten: bool },
}

/// An item on the floor or in an inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub quantity: u32,
    pub summoned: bool,
}

impl Item {
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            quantity: 1,
            summoned: false,
        }
    }

    pub fn corpse(species: Species) -> Self {
        Self::new(ItemKind::Corpse {
            species,
            rotten: false,
        })
    }

    pub fn is_corpse(&self) -> bool {
        matches!(self.kind, ItemKind::Corpse { .. })
    }
}

impl From<Weapon> for Item {
    fn from(weapon: Weapon) -> Self {
        Item {
            kind: ItemKind::Weapon(weapon),
            quantity: 1,
            summoned: weapon.summoned,
        }
    }
}
