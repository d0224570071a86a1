//! Player state
//!
//! The subset of the character that melee, religion and attitude code reads
//! and writes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::{Attitude, BodySize, Combatant, Desc, EnchantmentSet, Holiness, Resistances};
use crate::god::God;
use crate::item::Weapon;
use crate::level::Coord;

/// Playable species
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum PlayerSpecies {
    #[default]
    Human = 0,
    HillOrc = 1,
    Minotaur = 2,
    Demonspawn = 3,
    Mummy = 4,
    Vampire = 5,
}

impl PlayerSpecies {
    pub const fn holiness(self) -> Holiness {
        match self {
            PlayerSpecies::Mummy | PlayerSpecies::Vampire => Holiness::Undead,
            PlayerSpecies::Demonspawn => Holiness::Demonic,
            _ => Holiness::Natural,
        }
    }
}

/// Trainable skills
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum Skill {
    Fighting,
    ShortBlades,
    LongBlades,
    Axes,
    MacesFlails,
    Polearms,
    Staves,
    Unarmed,
    Shields,
    Stealth,
    Invocations,
    Necromancy,
}

/// Mutations that change melee behaviour
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum Mutation {
    Horns,
    Hooves,
    Talons,
    Tail,
    Fangs,
    Claws,
    Spiny,
    ReflectiveScales,
    FoulStench,
}

/// Stats that can be drained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Stat {
    Str,
    Int,
    Dex,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub species: PlayerSpecies,
    pub pos: Coord,
    pub hp: i32,
    pub hp_max: i32,
    pub mp: i32,
    pub mp_max: i32,
    pub xl: i32,
    pub exp: i32,
    pub ac: i32,
    pub ev: i32,
    pub shield: i32,
    pub strength: i32,
    pub dex: i32,
    pub int: i32,
    pub slaying: i32,
    pub skills: BTreeMap<Skill, i32>,
    pub mutations: BTreeMap<Mutation, u8>,
    pub weapon: Option<Weapon>,
    pub god: God,
    pub piety: i32,
    pub penance: BTreeMap<God, i32>,
    pub ench: EnchantmentSet,
    pub res: Resistances,
    pub energy: i32,
    pub see_invisible: bool,
    pub flying: bool,
    pub shield_blocks: u8,
}

impl Default for Player {
    fn default() -> Self {
        Self::new("Player", PlayerSpecies::Human)
    }
}

impl Player {
    pub fn new(name: &str, species: PlayerSpecies) -> Self {
        Self {
            name: name.to_string(),
            species,
            pos: Coord::new(1, 1),
            hp: 20,
            hp_max: 20,
            mp: 5,
            mp_max: 5,
            xl: 1,
            exp: 0,
            ac: 2,
            ev: 10,
            shield: 0,
            strength: 10,
            dex: 10,
            int: 10,
            slaying: 0,
            skills: BTreeMap::new(),
            mutations: BTreeMap::new(),
            weapon: None,
            god: God::NoGod,
            piety: 0,
            penance: BTreeMap::new(),
            ench: EnchantmentSet::new(),
            res: Resistances::NONE,
            energy: 0,
            see_invisible: false,
            flying: false,
            shield_blocks: 0,
        }
    }

    pub fn skill(&self, skill: Skill) -> i32 {
        self.skills.get(&skill).copied().unwrap_or(0)
    }

    pub fn set_skill(&mut self, skill: Skill, level: i32) {
        self.skills.insert(skill, level);
    }

    pub fn mutation_level(&self, mutation: Mutation) -> i32 {
        self.mutations.get(&mutation).copied().unwrap_or(0) as i32
    }

    pub fn set_mutation(&mut self, mutation: Mutation, level: u8) {
        if level == 0 {
            self.mutations.remove(&mutation);
        } else {
            self.mutations.insert(mutation, level);
        }
    }

    pub fn penance_for(&self, god: God) -> i32 {
        self.penance.get(&god).copied().unwrap_or(0)
    }

    /// Under penance with the current god
    pub fn under_penance(&self) -> bool {
        self.penance_for(self.god) > 0
    }

    pub fn worships(&self, god: God) -> bool {
        self.god == god
    }

    pub fn undead_or_demonic(&self) -> bool {
        matches!(
            self.species.holiness(),
            Holiness::Undead | Holiness::Demonic
        )
    }

    /// Weapon skill used with the current weapon
    pub fn weapon_skill(&self) -> i32 {
        match &self.weapon {
            Some(w) => self.skill(w.kind.info().skill),
            None => self.skill(Skill::Unarmed),
        }
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Str => self.strength,
            Stat::Int => self.int,
            Stat::Dex => self.dex,
        }
    }

    /// Reduce a stat, never below 1. Returns the amount lost.
    pub fn drain_stat(&mut self, stat: Stat, amount: i32) -> i32 {
        let slot = match stat {
            Stat::Str => &mut self.strength,
            Stat::Int => &mut self.int,
            Stat::Dex => &mut self.dex,
        };
        let before = *slot;
        *slot = (*slot - amount).max(1);
        before - *slot
    }

    /// Lose experience; drops a level when it runs out
    pub fn drain_exp(&mut self, amount: i32) {
        self.exp -= amount;
        if self.exp < 0 && self.xl > 1 {
            self.xl -= 1;
            self.exp = 0;
        }
        self.exp = self.exp.max(0);
    }
}

impl Combatant for Player {
    fn name(&self, _desc: Desc) -> String {
        "you".to_string()
    }

    fn is_player(&self) -> bool {
        true
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn max_hp(&self) -> i32 {
        self.hp_max
    }

    fn set_hp(&mut self, hp: i32) {
        self.hp = hp.min(self.hp_max);
    }

    fn pos(&self) -> Coord {
        self.pos
    }

    fn set_pos(&mut self, pos: Coord) {
        self.pos = pos;
    }

    fn ac(&self) -> i32 {
        self.ac
    }

    fn ev(&self) -> i32 {
        if self.is_helpless() { 0 } else { self.ev }
    }

    fn gdr(&self) -> i32 {
        let body = (self.ac - 2).max(0) as f64;
        ((14.0 * body.sqrt()) as i32).min(50)
    }

    fn resists(&self) -> Resistances {
        self.res
    }

    fn holiness(&self) -> Holiness {
        self.species.holiness()
    }

    fn body_size(&self) -> BodySize {
        match self.species {
            PlayerSpecies::Minotaur => BodySize::Large,
            _ => BodySize::Medium,
        }
    }

    fn hit_dice(&self) -> i32 {
        self.xl
    }

    fn attitude(&self) -> Attitude {
        Attitude::Friendly
    }

    fn ench(&self) -> &EnchantmentSet {
        &self.ench
    }

    fn ench_mut(&mut self) -> &mut EnchantmentSet {
        &mut self.ench
    }

    fn weapon(&self) -> Option<&Weapon> {
        self.weapon.as_ref()
    }

    fn shield_bonus(&self) -> i32 {
        self.shield + self.skill(Skill::Shields)
    }

    fn is_summoned(&self) -> bool {
        false
    }

    fn can_bleed(&self) -> bool {
        self.species != PlayerSpecies::Mummy
    }

    fn flies(&self) -> bool {
        self.flying
    }

    fn is_insubstantial(&self) -> bool {
        false
    }
}
