//! Monster species definitions (mon-data)
//!
//! Static per-species data: hit dice, defences, holiness, size, habitat,
//! intrinsic attacks and classification flags.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use super::{BodySize, Habitat, Holiness, Resistances};
use crate::brand::AttackFlavour;
use crate::consts::MAX_NUM_ATTACKS;
use crate::errors::{EngineError, EngineResult};

/// How an intrinsic attack is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum AttackKind {
    #[default]
    None = 0,
    Hit = 1,
    Bite = 2,
    Sting = 3,
    Claw = 4,
    Kick = 5,
    Headbutt = 6,
    Trample = 7,
    Engulf = 8,
    Touch = 9,
    Punch = 10,
    TailSlap = 11,
    Constrict = 12,
}

impl AttackKind {
    /// Verb used when the attack lands
    pub const fn verb(self) -> &'static str {
        match self {
            AttackKind::None | AttackKind::Hit => "hit",
            AttackKind::Bite => "bite",
            AttackKind::Sting => "sting",
            AttackKind::Claw => "claw",
            AttackKind::Kick => "kick",
            AttackKind::Headbutt => "headbutt",
            AttackKind::Trample => "trample",
            AttackKind::Engulf => "engulf",
            AttackKind::Touch => "touch",
            AttackKind::Punch => "punch",
            AttackKind::TailSlap => "tail-slap",
            AttackKind::Constrict => "grab",
        }
    }
}

/// One intrinsic attack of a species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonAttack {
    pub kind: AttackKind,
    pub flavour: AttackFlavour,
    pub damage: i32,
}

impl MonAttack {
    pub const NONE: MonAttack = MonAttack::new(AttackKind::None, AttackFlavour::Plain, 0);

    pub const fn new(kind: AttackKind, flavour: AttackFlavour, damage: i32) -> Self {
        Self {
            kind,
            flavour,
            damage,
        }
    }

    pub const fn is_active(&self) -> bool {
        !matches!(self.kind, AttackKind::None)
    }
}

bitflags! {
    /// Species classification flags (M_* in mon-data)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpeciesFlags: u32 {
        const UNIQUE = 0x0000_0001;
        const NO_POLY_TO = 0x0000_0002;
        const NO_EXP = 0x0000_0004;
        const UNFINISHED = 0x0000_0008;
        const DERIVED = 0x0000_0010;
        const GHOST_DEMON = 0x0000_0020;
        const TEST_SPAWNER = 0x0000_0040;
        const STATUE = 0x0000_0080;
        const PROJECTILE = 0x0000_0100;
        const PROGRAM_BUG = 0x0000_0200;
        const FLIES = 0x0000_0400;
        const SPINY = 0x0000_0800;
        const INSUBSTANTIAL = 0x0000_1000;
        const EATS_ITEMS = 0x0000_2000;
        const SUBMERGES = 0x0000_4000;
        const FIGHTER = 0x0000_8000;
        const STATIONARY = 0x0001_0000;
        const WEAPON_USER = 0x0002_0000;
        const NO_BLOOD = 0x0004_0000;
        const HYDRA = 0x0008_0000;
        const SPELLCASTER = 0x0010_0000;
        const PHASE_SHIFT = 0x0020_0000;
        const SEE_INVIS = 0x0040_0000;
        const OOZES = 0x0080_0000;
    }
}

/// Static data for one species
#[derive(Debug, Clone, Copy)]
pub struct SpeciesInfo {
    pub name: &'static str,
    pub genus: Species,
    pub hit_dice: u8,
    /// Average hit points per hit die
    pub hp_per_hd: u8,
    pub ac: i32,
    pub ev: i32,
    pub holiness: Holiness,
    pub size: BodySize,
    pub habitat: Habitat,
    pub resists: Resistances,
    pub attacks: [MonAttack; MAX_NUM_ATTACKS],
    pub flags: SpeciesFlags,
}

/// Every monster species
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
    EnumIter,
    EnumCount,
)]
pub enum Species {
    Rat,
    Jackal,
    Goblin,
    Kobold,
    #[default]
    Orc,
    OrcWarrior,
    OrcPriest,
    OrcKnight,
    Gnoll,
    Centaur,
    Troll,
    Ogre,
    TwoHeadedOgre,
    Minotaur,
    Hydra,
    LernaeanHydra,
    FireGiant,
    Angel,
    Daeva,
    Cherub,
    Zombie,
    Skeleton,
    Wight,
    Wraith,
    Phantom,
    Mummy,
    Vampire,
    Ghoul,
    Imp,
    Lemure,
    Endoplasm,
    Jelly,
    SlimeCreature,
    AcidBlob,
    AzureJelly,
    Ooze,
    GiantEyeball,
    Plant,
    Oklob,
    Toadstool,
    ElectricEel,
    SpinyFrog,
    Draconian,
    RedDraconian,
    BlackDraconian,
    Hog,
    Human,
    Sigmund,
    Pikel,
    Kirke,
    PrinceRibbit,
    Shapeshifter,
    GlowingShapeshifter,
    Statue,
    OrbOfDestruction,
    OrbGuardian,
    PlayerGhost,
    PandemonicLord,
    ProgramBug,
    TestSpawner,
    UnseenHorror,
    Ancestor,
    BoundSoul,
}

use AttackFlavour as F;
use AttackKind as K;

const fn atk(kind: AttackKind, flavour: AttackFlavour, damage: i32) -> MonAttack {
    MonAttack::new(kind, flavour, damage)
}

const fn one(a: MonAttack) -> [MonAttack; MAX_NUM_ATTACKS] {
    [a, MonAttack::NONE, MonAttack::NONE, MonAttack::NONE]
}

const fn two(a: MonAttack, b: MonAttack) -> [MonAttack; MAX_NUM_ATTACKS] {
    [a, b, MonAttack::NONE, MonAttack::NONE]
}

const NO_ATTACKS: [MonAttack; MAX_NUM_ATTACKS] = [MonAttack::NONE; MAX_NUM_ATTACKS];

const UNDEAD_RES: Resistances = Resistances::new(0, 1, 0, 1, 3);
const DEMON_RES: Resistances = Resistances::new(1, 0, 0, 1, 3);
const HOLY_RES: Resistances = Resistances::new(0, 0, 0, 0, 3);
const PLANT_RES: Resistances = Resistances::new(0, 0, 0, 1, 0);
const INERT_RES: Resistances = Resistances::new(3, 3, 1, 1, 3);

#[allow(clippy::too_many_arguments)]
const fn info(
    name: &'static str,
    genus: Species,
    hit_dice: u8,
    hp_per_hd: u8,
    ac: i32,
    ev: i32,
    holiness: Holiness,
    size: BodySize,
    habitat: Habitat,
    resists: Resistances,
    attacks: [MonAttack; MAX_NUM_ATTACKS],
    flags: SpeciesFlags,
) -> SpeciesInfo {
    SpeciesInfo {
        name,
        genus,
        hit_dice,
        hp_per_hd,
        ac,
        ev,
        holiness,
        size,
        habitat,
        resists,
        attacks,
        flags,
    }
}

impl Species {
    /// Static data for this species
    pub const fn info(self) -> SpeciesInfo {
        use BodySize as S;
        use Habitat as H;
        use Holiness as Ho;
        const N: Resistances = Resistances::NONE;
        const W: SpeciesFlags = SpeciesFlags::WEAPON_USER;
        const E: SpeciesFlags = SpeciesFlags::empty();

        match self {
            Species::Rat => info("rat", Species::Rat, 1, 3, 1, 10, Ho::Natural, S::Little, H::Land, N,
                one(atk(K::Bite, F::Plain, 3)), E),
            Species::Jackal => info("jackal", Species::Jackal, 1, 3, 2, 12, Ho::Natural, S::Small, H::Land, N,
                one(atk(K::Bite, F::Plain, 3)), E),
            Species::Goblin => info("goblin", Species::Goblin, 1, 4, 0, 10, Ho::Natural, S::Small, H::Land, N,
                one(atk(K::Hit, F::Plain, 4)), W),
            Species::Kobold => info("kobold", Species::Kobold, 1, 4, 2, 12, Ho::Natural, S::Small, H::Land, N,
                one(atk(K::Hit, F::Plain, 4)), W),
            Species::Orc => info("orc", Species::Orc, 1, 5, 0, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 5)), W),
            Species::OrcWarrior => info("orc warrior", Species::Orc, 4, 5, 0, 13, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 10)), W.union(SpeciesFlags::FIGHTER)),
            Species::OrcPriest => info("orc priest", Species::Orc, 3, 4, 1, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 7)), W.union(SpeciesFlags::SPELLCASTER)),
            Species::OrcKnight => info("orc knight", Species::Orc, 9, 5, 2, 13, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 25)), W.union(SpeciesFlags::FIGHTER)),
            Species::Gnoll => info("gnoll", Species::Gnoll, 2, 5, 2, 9, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 9)), W),
            Species::Centaur => info("centaur", Species::Centaur, 4, 5, 3, 7, Ho::Natural, S::Large, H::Land, N,
                one(atk(K::Hit, F::Plain, 10)), W),
            Species::Troll => info("troll", Species::Troll, 7, 6, 3, 10, Ho::Natural, S::Large, H::Land, N,
                [atk(K::Bite, F::Plain, 20), atk(K::Claw, F::Plain, 15), atk(K::Claw, F::Plain, 15), MonAttack::NONE],
                E),
            Species::Ogre => info("ogre", Species::Ogre, 5, 6, 1, 6, Ho::Natural, S::Large, H::Land, N,
                one(atk(K::Hit, F::Plain, 17)), W),
            Species::TwoHeadedOgre => info("two-headed ogre", Species::Ogre, 6, 6, 1, 4, Ho::Natural, S::Large, H::Land, N,
                two(atk(K::Hit, F::Plain, 17), atk(K::Hit, F::Plain, 13)), W),
            Species::Minotaur => info("minotaur", Species::Minotaur, 13, 6, 5, 7, Ho::Natural, S::Large, H::Land, N,
                two(atk(K::Hit, F::Plain, 35), atk(K::Headbutt, F::Plain, 20)), W),
            Species::Hydra => info("hydra", Species::Hydra, 13, 5, 0, 5, Ho::Natural, S::Giant, H::Amphibious,
                Resistances::new(0, 0, 0, 1, 0),
                one(atk(K::Bite, F::Plain, 18)), SpeciesFlags::HYDRA),
            Species::LernaeanHydra => info("the Lernaean hydra", Species::Hydra, 30, 6, 0, 5, Ho::Natural, S::Giant, H::Amphibious,
                Resistances::new(0, 0, 0, 1, 0),
                one(atk(K::Bite, F::Plain, 18)),
                SpeciesFlags::HYDRA.union(SpeciesFlags::UNIQUE)),
            Species::FireGiant => info("fire giant", Species::FireGiant, 16, 6, 8, 4, Ho::Natural, S::Giant, H::Land,
                Resistances::new(2, -1, 0, 0, 0),
                one(atk(K::Hit, F::Fire, 30)), W.union(SpeciesFlags::SPELLCASTER)),
            Species::Angel => info("angel", Species::Angel, 12, 6, 12, 10, Ho::Holy, S::Medium, H::Land, HOLY_RES,
                one(atk(K::Hit, F::Plain, 25)),
                W.union(SpeciesFlags::FLIES).union(SpeciesFlags::SEE_INVIS).union(SpeciesFlags::SPELLCASTER)),
            Species::Daeva => info("daeva", Species::Angel, 12, 6, 10, 13, Ho::Holy, S::Medium, H::Land, HOLY_RES,
                one(atk(K::Hit, F::Plain, 25)), W.union(SpeciesFlags::FLIES)),
            Species::Cherub => info("cherub", Species::Cherub, 7, 5, 4, 10, Ho::Holy, S::Medium, H::Land, HOLY_RES,
                two(atk(K::Hit, F::Plain, 15), atk(K::Hit, F::Holy, 8)),
                W.union(SpeciesFlags::FLIES)),
            Species::Zombie => info("zombie", Species::Zombie, 4, 6, 0, 4, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Hit, F::Plain, 10)),
                SpeciesFlags::DERIVED.union(SpeciesFlags::NO_BLOOD)),
            Species::Skeleton => info("skeleton", Species::Skeleton, 3, 5, 0, 6, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Hit, F::Plain, 8)),
                SpeciesFlags::DERIVED.union(SpeciesFlags::NO_BLOOD)),
            Species::Wight => info("wight", Species::Wight, 3, 5, 4, 10, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Hit, F::DrainXp, 8)), W.union(SpeciesFlags::NO_BLOOD)),
            Species::Wraith => info("wraith", Species::Wraith, 6, 5, 10, 10, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Hit, F::DrainXp, 13)),
                SpeciesFlags::FLIES.union(SpeciesFlags::NO_BLOOD).union(SpeciesFlags::SEE_INVIS)),
            Species::Phantom => info("phantom", Species::Phantom, 7, 4, 3, 13, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Hit, F::Plain, 10)),
                SpeciesFlags::INSUBSTANTIAL.union(SpeciesFlags::PHASE_SHIFT).union(SpeciesFlags::NO_BLOOD)),
            Species::Mummy => info("mummy", Species::Mummy, 3, 5, 3, 6, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Hit, F::Plain, 6)), SpeciesFlags::NO_BLOOD),
            Species::Vampire => info("vampire", Species::Vampire, 11, 5, 10, 10, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                two(atk(K::Hit, F::Plain, 22), atk(K::Bite, F::Vampiric, 10)),
                W.union(SpeciesFlags::SPELLCASTER)),
            Species::Ghoul => info("ghoul", Species::Ghoul, 7, 5, 4, 10, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Claw, F::Plain, 9)), E),
            Species::Imp => info("imp", Species::Imp, 3, 4, 3, 14, Ho::Demonic, S::Little, H::Land, DEMON_RES,
                one(atk(K::Hit, F::Plain, 4)), SpeciesFlags::FLIES),
            Species::Lemure => info("lemure", Species::Lemure, 3, 5, 1, 7, Ho::Demonic, S::Medium, H::Land, DEMON_RES,
                one(atk(K::Hit, F::Plain, 8)), E),
            Species::Endoplasm => info("endoplasm", Species::Jelly, 1, 4, 1, 3, Ho::Natural, S::Small, H::Land, N,
                one(atk(K::Hit, F::Plain, 3)), SpeciesFlags::NO_BLOOD),
            Species::Jelly => info("jelly", Species::Jelly, 3, 5, 0, 2, Ho::Natural, S::Medium, H::Land,
                Resistances::new(0, 0, 0, 1, 0),
                one(atk(K::Hit, F::Corrode, 8)),
                SpeciesFlags::EATS_ITEMS.union(SpeciesFlags::NO_BLOOD)),
            Species::SlimeCreature => info("slime creature", Species::Jelly, 11, 5, 1, 4, Ho::Natural, S::Large, H::Amphibious,
                Resistances::new(0, 0, 0, 1, 0),
                one(atk(K::Hit, F::Plain, 22)), SpeciesFlags::NO_BLOOD),
            Species::AcidBlob => info("acid blob", Species::Jelly, 18, 4, 1, 3, Ho::Natural, S::Medium, H::Land,
                Resistances::new(0, 0, 0, 1, 0),
                one(atk(K::Hit, F::Corrode, 42)), SpeciesFlags::NO_BLOOD),
            Species::AzureJelly => info("azure jelly", Species::Jelly, 12, 6, 5, 10, Ho::Natural, S::Large, H::Land,
                Resistances::new(-1, 3, 1, 1, 0),
                [atk(K::Touch, F::Cold, 12), atk(K::Touch, F::Cold, 12), atk(K::Hit, F::Plain, 12), MonAttack::NONE],
                SpeciesFlags::NO_BLOOD),
            Species::Ooze => info("ooze", Species::Jelly, 3, 5, 3, 5, Ho::Natural, S::Little, H::Land,
                Resistances::new(0, 0, 0, 1, 0),
                one(atk(K::Hit, F::Plain, 5)),
                SpeciesFlags::OOZES.union(SpeciesFlags::NO_BLOOD)),
            Species::GiantEyeball => info("giant eyeball", Species::GiantEyeball, 3, 4, 0, 1, Ho::Natural, S::Little, H::Land, N,
                NO_ATTACKS, SpeciesFlags::FLIES.union(SpeciesFlags::NO_BLOOD)),
            Species::Plant => info("plant", Species::Plant, 10, 3, 10, 0, Ho::Plant, S::Large, H::Land, PLANT_RES,
                NO_ATTACKS,
                SpeciesFlags::STATIONARY.union(SpeciesFlags::NO_EXP).union(SpeciesFlags::NO_BLOOD)),
            Species::Oklob => info("oklob plant", Species::Plant, 10, 4, 10, 0, Ho::Plant, S::Large, H::Land, PLANT_RES,
                NO_ATTACKS, SpeciesFlags::STATIONARY.union(SpeciesFlags::NO_BLOOD)),
            Species::Toadstool => info("toadstool", Species::Toadstool, 1, 3, 1, 0, Ho::Plant, S::Tiny, H::Land, PLANT_RES,
                NO_ATTACKS,
                SpeciesFlags::STATIONARY.union(SpeciesFlags::NO_EXP).union(SpeciesFlags::NO_BLOOD)),
            Species::ElectricEel => info("electric eel", Species::ElectricEel, 3, 5, 1, 15, Ho::Natural, S::Small, H::Water,
                Resistances::new(0, 0, 1, 0, 0),
                one(atk(K::Bite, F::Elec, 8)), SpeciesFlags::SUBMERGES),
            Species::SpinyFrog => info("spiny frog", Species::SpinyFrog, 4, 5, 6, 9, Ho::Natural, S::Small, H::Amphibious,
                Resistances::new(0, 0, 0, 1, 0),
                one(atk(K::Kick, F::Poison, 9)), SpeciesFlags::SPINY),
            Species::Draconian => info("draconian", Species::Draconian, 10, 6, 9, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 15)), W),
            Species::RedDraconian => info("red draconian", Species::Draconian, 14, 6, 9, 10, Ho::Natural, S::Medium, H::Land,
                Resistances::new(2, -1, 0, 0, 0),
                one(atk(K::Hit, F::Plain, 15)), W),
            Species::BlackDraconian => info("black draconian", Species::Draconian, 14, 6, 9, 10, Ho::Natural, S::Medium, H::Land,
                Resistances::new(0, 0, 1, 0, 0),
                one(atk(K::Hit, F::Plain, 15)), W),
            Species::Hog => info("hog", Species::Hog, 3, 5, 2, 9, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Bite, F::Plain, 8)), E),
            Species::Human => info("human", Species::Human, 1, 5, 3, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 5)), W),
            Species::Sigmund => info("Sigmund", Species::Human, 3, 6, 0, 11, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 5)),
                W.union(SpeciesFlags::UNIQUE).union(SpeciesFlags::SPELLCASTER)),
            Species::Pikel => info("Pikel", Species::Human, 4, 6, 4, 12, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 7)), W.union(SpeciesFlags::UNIQUE)),
            Species::Kirke => info("Kirke", Species::Human, 5, 5, 0, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 7)),
                W.union(SpeciesFlags::UNIQUE).union(SpeciesFlags::SPELLCASTER)),
            Species::PrinceRibbit => info("Prince Ribbit", Species::SpinyFrog, 7, 5, 0, 16, Ho::Natural, S::Little, H::Amphibious, N,
                one(atk(K::Hit, F::Plain, 12)), SpeciesFlags::UNIQUE),
            Species::Shapeshifter => info("shapeshifter", Species::Shapeshifter, 7, 5, 0, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 5)), SpeciesFlags::NO_POLY_TO),
            Species::GlowingShapeshifter => info("glowing shapeshifter", Species::Shapeshifter, 10, 5, 0, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 8)), SpeciesFlags::NO_POLY_TO),
            Species::Statue => info("statue", Species::Statue, 8, 8, 12, 0, Ho::Nonliving, S::Large, H::Land, INERT_RES,
                NO_ATTACKS,
                SpeciesFlags::STATUE.union(SpeciesFlags::STATIONARY).union(SpeciesFlags::NO_BLOOD)),
            Species::OrbOfDestruction => info("orb of destruction", Species::OrbOfDestruction, 1, 1, 0, 10, Ho::Nonliving, S::Little, H::Land, INERT_RES,
                NO_ATTACKS,
                SpeciesFlags::PROJECTILE.union(SpeciesFlags::FLIES).union(SpeciesFlags::NO_BLOOD)),
            Species::OrbGuardian => info("orb guardian", Species::OrbGuardian, 15, 6, 13, 13, Ho::Natural, S::Giant, H::Land, N,
                one(atk(K::Hit, F::Plain, 45)), SpeciesFlags::SEE_INVIS),
            Species::PlayerGhost => info("ghost", Species::PlayerGhost, 5, 5, 0, 10, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                one(atk(K::Hit, F::Plain, 5)),
                SpeciesFlags::GHOST_DEMON.union(SpeciesFlags::UNIQUE).union(SpeciesFlags::INSUBSTANTIAL)),
            Species::PandemonicLord => info("pandemonium lord", Species::PandemonicLord, 16, 6, 10, 10, Ho::Demonic, S::Large, H::Land, DEMON_RES,
                one(atk(K::Hit, F::Plain, 30)),
                SpeciesFlags::GHOST_DEMON.union(SpeciesFlags::UNIQUE)),
            Species::ProgramBug => info("program bug", Species::ProgramBug, 1, 1, 0, 0, Ho::Nonliving, S::Tiny, H::Land, INERT_RES,
                NO_ATTACKS, SpeciesFlags::PROGRAM_BUG.union(SpeciesFlags::NO_BLOOD)),
            Species::TestSpawner => info("test spawner", Species::TestSpawner, 1, 1, 0, 0, Ho::Nonliving, S::Tiny, H::Land, INERT_RES,
                NO_ATTACKS,
                SpeciesFlags::TEST_SPAWNER.union(SpeciesFlags::STATIONARY).union(SpeciesFlags::NO_BLOOD)),
            Species::UnseenHorror => info("unseen horror", Species::UnseenHorror, 7, 5, 10, 15, Ho::Natural, S::Large, H::Land, N,
                one(atk(K::Hit, F::Plain, 12)), SpeciesFlags::UNFINISHED),
            Species::Ancestor => info("ancestor", Species::Ancestor, 1, 5, 2, 10, Ho::Natural, S::Medium, H::Land, N,
                one(atk(K::Hit, F::Plain, 6)),
                W.union(SpeciesFlags::NO_POLY_TO).union(SpeciesFlags::NO_EXP)),
            Species::BoundSoul => info("bound soul", Species::BoundSoul, 1, 3, 0, 10, Ho::Undead, S::Medium, H::Land, UNDEAD_RES,
                NO_ATTACKS,
                SpeciesFlags::INSUBSTANTIAL.union(SpeciesFlags::NO_POLY_TO).union(SpeciesFlags::NO_BLOOD)),
        }
    }

    pub const fn name(self) -> &'static str {
        self.info().name
    }

    pub const fn genus(self) -> Species {
        self.info().genus
    }

    pub const fn flags(self) -> SpeciesFlags {
        self.info().flags
    }

    pub const fn has_flag(self, flag: SpeciesFlags) -> bool {
        self.info().flags.contains(flag)
    }

    pub const fn holiness(self) -> Holiness {
        self.info().holiness
    }

    pub const fn is_unique(self) -> bool {
        self.has_flag(SpeciesFlags::UNIQUE)
    }

    /// Slimes (and eyeballs) count as Jiyva's fellows
    pub const fn is_slime(self) -> bool {
        matches!(self.genus(), Species::Jelly | Species::GiantEyeball)
    }

    pub const fn is_plant(self) -> bool {
        matches!(self.holiness(), Holiness::Plant)
    }

    pub const fn is_orc(self) -> bool {
        matches!(self.genus(), Species::Orc)
    }

    pub const fn is_hydra(self) -> bool {
        self.has_flag(SpeciesFlags::HYDRA)
    }

    pub const fn is_draconian(self) -> bool {
        matches!(self.genus(), Species::Draconian)
    }

    /// Coloured draconians, as opposed to the base type
    pub const fn is_nonbase_draconian(self) -> bool {
        self.is_draconian() && !matches!(self, Species::Draconian)
    }

    pub const fn is_shapeshifter(self) -> bool {
        matches!(self, Species::Shapeshifter | Species::GlowingShapeshifter)
    }

    /// Look a species up by its display name
    pub fn from_name(name: &str) -> EngineResult<Species> {
        let wanted = name.trim().to_ascii_lowercase();
        Species::iter()
            .find(|s| s.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| EngineError::UnknownSpecies(name.to_string()))
    }

    /// Average hit points at creation
    pub const fn base_hp(self) -> i32 {
        let info = self.info();
        let hp = info.hit_dice as i32 * info.hp_per_hd as i32;
        if hp < 1 { 1 } else { hp }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_species_has_info() {
        for species in Species::iter() {
            let info = species.info();
            assert!(!info.name.is_empty());
            assert!(info.hit_dice >= 1, "{species:?} has no hit dice");
            assert!(species.base_hp() >= 1);
        }
        assert_eq!(Species::iter().count(), Species::COUNT);
    }

    #[test]
    fn test_genus_queries() {
        assert!(Species::OrcKnight.is_orc());
        assert!(!Species::Goblin.is_orc());
        assert!(Species::GiantEyeball.is_slime());
        assert!(Species::AcidBlob.is_slime());
        assert!(Species::Oklob.is_plant());
        assert!(Species::LernaeanHydra.is_hydra());
        assert!(Species::RedDraconian.is_nonbase_draconian());
        assert!(!Species::Draconian.is_nonbase_draconian());
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Species::from_name("Orc Warrior"), Ok(Species::OrcWarrior));
        assert_eq!(Species::from_name("two-headed ogre"), Ok(Species::TwoHeadedOgre));
        assert!(matches!(
            Species::from_name("wumpus"),
            Err(EngineError::UnknownSpecies(_))
        ));
    }

    #[test]
    fn test_attack_tables() {
        let troll = Species::Troll.info();
        assert_eq!(troll.attacks.iter().filter(|a| a.is_active()).count(), 3);
        assert!(Species::Plant.info().attacks.iter().all(|a| !a.is_active()));
    }
}
