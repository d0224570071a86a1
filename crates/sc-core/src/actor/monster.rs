//! Monster instances

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{
    Actor, Attitude, BodySize, Combatant, Desc, EnchKind, EnchantmentSet, Holiness, Resistances,
    Species, SpeciesFlags,
};
use crate::consts::MAX_LERNAEAN_HEADS;
use crate::god::God;
use crate::item::{Item, Weapon};
use crate::level::Coord;

/// Unique identifier for monster instances
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

impl MonsterId {
    pub const NONE: MonsterId = MonsterId(0);

    pub fn next(self) -> Self {
        MonsterId(self.0 + 1)
    }
}

bitflags! {
    /// Per-instance monster flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MonsterFlags: u32 {
        /// An attitude-change roll has been made
        const ATT_CHANGE_ATTEMPT = 0x0001;
        const GOD_GIFT = 0x0002;
        /// Killing it gives no experience
        const NO_REWARD = 0x0004;
        const WAS_NEUTRAL = 0x0008;
        const CREATED_FRIENDLY = 0x0010;
        const JUST_SUMMONED = 0x0020;
        const WAS_IN_VIEW = 0x0040;
        const SEEN = 0x0080;
        const NEUTRAL_BRIBE = 0x0100;
        const FRIENDLY_BRIBE = 0x0200;
        /// The player has watched it change shape
        const KNOWN_POLY = 0x0400;
        const KNOWS_TRAPS = 0x0800;
    }
}

impl Serialize for MonsterFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MonsterFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(MonsterFlags::from_bits_truncate(bits))
    }
}

/// Named bands whose members share a fate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Pikel,
    Kirke,
}

/// A monster on a level or in transit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub species: Species,
    pub pos: Coord,
    pub hp: i32,
    pub max_hp: i32,
    pub hit_dice: i32,
    pub ac: i32,
    pub ev: i32,
    pub attitude: Attitude,
    pub god: God,
    pub flags: MonsterFlags,
    pub ench: EnchantmentSet,
    pub inventory: Vec<Item>,
    pub weapon: Option<Weapon>,
    pub shield: i32,
    pub foe: Option<Actor>,
    /// Number of heads (hydras)
    pub heads: u8,
    pub patrol_point: Option<Coord>,
    pub band: Option<Band>,
    /// What this monster was before being turned into a hog
    pub original: Option<Box<Monster>>,
    pub last_hit_by: Option<Actor>,
    pub energy: i32,
    pub shield_blocks: u8,
}

impl Monster {
    /// Create a monster with its species' average stats
    pub fn new(id: MonsterId, species: Species, pos: Coord) -> Self {
        let info = species.info();
        let hp = species.base_hp();
        let heads = match species {
            Species::LernaeanHydra => MAX_LERNAEAN_HEADS,
            s if s.is_hydra() => 5,
            _ => 1,
        };
        Self {
            id,
            species,
            pos,
            hp,
            max_hp: hp,
            hit_dice: info.hit_dice as i32,
            ac: info.ac,
            ev: info.ev,
            attitude: Attitude::Hostile,
            god: God::NoGod,
            flags: MonsterFlags::empty(),
            ench: EnchantmentSet::new(),
            inventory: Vec::new(),
            weapon: None,
            shield: 0,
            foe: Some(Actor::Player),
            heads,
            patrol_point: None,
            band: None,
            original: None,
            last_hit_by: None,
            energy: 0,
            shield_blocks: 0,
        }
    }

    pub fn with_attitude(mut self, attitude: Attitude) -> Self {
        self.attitude = attitude;
        if attitude == Attitude::Friendly {
            self.flags |= MonsterFlags::CREATED_FRIENDLY;
        }
        self
    }

    pub fn with_weapon(mut self, weapon: Weapon) -> Self {
        self.weapon = Some(weapon);
        self
    }

    pub fn with_god(mut self, god: God) -> Self {
        self.god = god;
        self
    }

    /// Re-derive species stats after a change of type, keeping the id
    pub fn define_as(&mut self, species: Species) {
        let fresh = Monster::new(self.id, species, self.pos);
        self.species = species;
        self.hit_dice = fresh.hit_dice;
        self.max_hp = fresh.max_hp;
        self.hp = fresh.hp;
        self.ac = fresh.ac;
        self.ev = fresh.ev;
        self.heads = fresh.heads;
    }

    pub fn has_flag(&self, flag: MonsterFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn species_flags(&self) -> SpeciesFlags {
        self.species.flags()
    }

    pub fn is_unique(&self) -> bool {
        self.species.is_unique()
    }

    pub fn wont_attack(&self) -> bool {
        self.attitude.wont_attack()
    }

    pub fn friendly(&self) -> bool {
        self.attitude == Attitude::Friendly
    }

    pub fn neutral(&self) -> bool {
        self.attitude.is_neutral()
    }

    pub fn asleep(&self) -> bool {
        self.ench.has(EnchKind::Sleep)
    }

    pub fn paralysed(&self) -> bool {
        self.ench.has(EnchKind::Paralysis) || self.ench.has(EnchKind::Petrified)
    }

    pub fn cannot_act(&self) -> bool {
        self.paralysed() || self.asleep()
    }

    pub fn fleeing(&self) -> bool {
        self.ench.has(EnchKind::Fear)
    }

    pub fn is_holy(&self) -> bool {
        self.species.holiness() == Holiness::Holy
    }

    pub fn is_shapeshifter(&self) -> bool {
        self.ench.has(EnchKind::Shapeshifter) || self.ench.has(EnchKind::GlowingShapeshifter)
    }

    pub fn is_god_gift(&self, god: God) -> bool {
        self.has_flag(MonsterFlags::GOD_GIFT) && self.god == god
    }

    /// Mark as a gift of `god`
    pub fn make_god_gift(&mut self, god: God) {
        self.god = god;
        self.flags |= MonsterFlags::GOD_GIFT;
    }

    pub fn eats_items(&self) -> bool {
        self.species.has_flag(SpeciesFlags::EATS_ITEMS) || self.ench.has(EnchKind::EatItems)
    }

    /// A slime that has joined Jiyva's fold
    pub fn is_fellow_slime(&self) -> bool {
        self.species.is_slime()
            && self.attitude == Attitude::StrictNeutral
            && self.is_god_gift(God::Jiyva)
    }

    pub fn is_patrolling(&self) -> bool {
        self.patrol_point.is_some()
    }

    pub fn can_submerge(&self) -> bool {
        self.species.has_flag(SpeciesFlags::SUBMERGES)
    }

    pub fn is_stationary(&self) -> bool {
        self.species.has_flag(SpeciesFlags::STATIONARY)
    }

    pub fn is_spellcaster(&self) -> bool {
        self.species.has_flag(SpeciesFlags::SPELLCASTER)
    }

    /// Head limit for regrowing hydras
    pub fn max_heads(&self) -> u8 {
        if self.species == Species::LernaeanHydra {
            MAX_LERNAEAN_HEADS
        } else {
            crate::consts::MAX_HYDRA_HEADS
        }
    }

    /// Alert the monster and point it at `foe`
    pub fn alert(&mut self, foe: Option<Actor>) {
        self.ench.remove(EnchKind::Sleep);
        self.foe = foe;
    }
}

impl Combatant for Monster {
    fn name(&self, desc: Desc) -> String {
        let base = self.species.name();
        if self.is_unique() {
            return base.to_string();
        }
        match desc {
            Desc::The => format!("the {base}"),
            Desc::A => {
                let article = if base.starts_with(['a', 'e', 'i', 'o', 'u']) {
                    "an"
                } else {
                    "a"
                };
                format!("{article} {base}")
            }
            Desc::Plain => base.to_string(),
        }
    }

    fn is_player(&self) -> bool {
        false
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn max_hp(&self) -> i32 {
        self.max_hp
    }

    fn set_hp(&mut self, hp: i32) {
        self.hp = hp.min(self.max_hp);
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
        (self.ac / 2).min(50)
    }

    fn resists(&self) -> Resistances {
        self.species.info().resists
    }

    fn holiness(&self) -> Holiness {
        self.species.holiness()
    }

    fn body_size(&self) -> BodySize {
        self.species.info().size
    }

    fn hit_dice(&self) -> i32 {
        self.hit_dice
    }

    fn attitude(&self) -> Attitude {
        self.attitude
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
        self.shield
    }

    fn is_summoned(&self) -> bool {
        self.ench.has(EnchKind::Abjuration) || self.ench.has(EnchKind::Summon)
    }

    fn can_bleed(&self) -> bool {
        !self.species.has_flag(SpeciesFlags::NO_BLOOD)
            && matches!(self.holiness(), Holiness::Natural | Holiness::Holy)
    }

    fn flies(&self) -> bool {
        self.species.has_flag(SpeciesFlags::FLIES)
    }

    fn is_insubstantial(&self) -> bool {
        self.species.has_flag(SpeciesFlags::INSUBSTANTIAL)
    }
}
