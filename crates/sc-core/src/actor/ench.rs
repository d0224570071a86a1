//! Enchantments and timed status effects
//!
//! A closed set of status kinds with typed payloads. Both the player and
//! monsters carry an [`EnchantmentSet`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::Actor;

/// Every status effect the engine knows about
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
pub enum EnchKind {
    Confusion,
    Paralysis,
    Sleep,
    Petrifying,
    Petrified,
    Held,
    Engulfed,
    Fear,
    Haste,
    Slow,
    Berserk,
    Might,
    Weak,
    Invisible,
    Corona,
    Poison,
    Drained,
    Corrosion,
    LoweredMr,
    Antimagic,
    Charm,
    Abjuration,
    Summon,
    Shapeshifter,
    GlowingShapeshifter,
    Submerged,
    Teleport,
    AwakenVines,
    AwakenForest,
    Hexed,
    EatItems,
    TempPacified,
    Bribed,
    BoundSoul,
    Shroud,
}

impl EnchKind {
    /// Enchantments that survive a change of species
    pub const POLYMORPH_CARRY: [EnchKind; 11] = [
        EnchKind::Abjuration,
        EnchKind::Charm,
        EnchKind::TempPacified,
        EnchKind::Shapeshifter,
        EnchKind::GlowingShapeshifter,
        EnchKind::Submerged,
        EnchKind::Summon,
        EnchKind::Teleport,
        EnchKind::AwakenVines,
        EnchKind::AwakenForest,
        EnchKind::Hexed,
    ];

    /// Whether the effect leaves its bearer unable to defend itself
    pub const fn incapacitates(self) -> bool {
        matches!(
            self,
            EnchKind::Paralysis | EnchKind::Petrified | EnchKind::Sleep
        )
    }

    /// Whether the effect should be counted down each turn
    pub const fn is_timed(self) -> bool {
        !matches!(
            self,
            EnchKind::Held
                | EnchKind::Shapeshifter
                | EnchKind::GlowingShapeshifter
                | EnchKind::Submerged
                | EnchKind::EatItems
                | EnchKind::Summon
                | EnchKind::BoundSoul
                | EnchKind::Drained
                | EnchKind::Corrosion
                | EnchKind::Shroud
                | EnchKind::Bribed
        )
    }
}

/// One active enchantment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enchantment {
    /// Strength or stack count
    pub degree: i32,
    /// Remaining duration in turns; ignored for untimed kinds
    pub duration: i32,
    /// Who applied it
    pub source: Option<Actor>,
}

impl Enchantment {
    pub const fn new(degree: i32, duration: i32) -> Self {
        Self {
            degree,
            duration,
            source: None,
        }
    }

    pub const fn from_source(degree: i32, duration: i32, source: Actor) -> Self {
        Self {
            degree,
            duration,
            source: Some(source),
        }
    }
}

/// Registry of active enchantments keyed by kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantmentSet {
    active: BTreeMap<EnchKind, Enchantment>,
}

impl EnchantmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, kind: EnchKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn get(&self, kind: EnchKind) -> Option<&Enchantment> {
        self.active.get(&kind)
    }

    pub fn degree(&self, kind: EnchKind) -> i32 {
        self.active.get(&kind).map_or(0, |e| e.degree)
    }

    /// Add an enchantment, returning true if it was not already present.
    ///
    /// Re-applying stacks the degree and keeps the longer duration.
    pub fn add(&mut self, kind: EnchKind, ench: Enchantment) -> bool {
        match self.active.get_mut(&kind) {
            Some(existing) => {
                existing.degree += ench.degree;
                existing.duration = existing.duration.max(ench.duration);
                if ench.source.is_some() {
                    existing.source = ench.source;
                }
                false
            }
            None => {
                self.active.insert(kind, ench);
                true
            }
        }
    }

    /// Add with a degree cap
    pub fn add_capped(&mut self, kind: EnchKind, ench: Enchantment, max_degree: i32) -> bool {
        let added = self.add(kind, ench);
        if let Some(e) = self.active.get_mut(&kind) {
            e.degree = e.degree.min(max_degree);
        }
        added
    }

    pub fn remove(&mut self, kind: EnchKind) -> Option<Enchantment> {
        self.active.remove(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EnchKind, &Enchantment)> {
        self.active.iter().map(|(k, e)| (*k, e))
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Keep only the listed kinds
    pub fn retain_kinds(&mut self, keep: &[EnchKind]) {
        self.active.retain(|k, _| keep.contains(k));
    }

    /// Count timed enchantments down by `turns`, returning those that expired
    pub fn tick(&mut self, turns: i32) -> Vec<EnchKind> {
        let mut expired = Vec::new();
        for (kind, ench) in self.active.iter_mut() {
            if !kind.is_timed() {
                continue;
            }
            ench.duration -= turns;
            if ench.duration <= 0 {
                expired.push(*kind);
            }
        }
        for kind in &expired {
            self.active.remove(kind);
        }
        expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_stacks() {
        let mut set = EnchantmentSet::new();
        assert!(set.add(EnchKind::Poison, Enchantment::new(1, 10)));
        assert!(!set.add(EnchKind::Poison, Enchantment::new(2, 5)));
        let p = set.get(EnchKind::Poison).unwrap();
        assert_eq!(p.degree, 3);
        assert_eq!(p.duration, 10);
    }

    #[test]
    fn test_add_capped() {
        let mut set = EnchantmentSet::new();
        for _ in 0..10 {
            set.add_capped(EnchKind::Poison, Enchantment::new(1, 10), 4);
        }
        assert_eq!(set.degree(EnchKind::Poison), 4);
    }

    #[test]
    fn test_tick_expires_timed_only() {
        let mut set = EnchantmentSet::new();
        set.add(EnchKind::Confusion, Enchantment::new(1, 2));
        set.add(EnchKind::Held, Enchantment::new(1, 0));
        assert!(set.tick(1).is_empty());
        assert_eq!(set.tick(1), vec![EnchKind::Confusion]);
        assert!(set.has(EnchKind::Held));
    }

    #[test]
    fn test_retain_kinds() {
        let mut set = EnchantmentSet::new();
        set.add(EnchKind::Confusion, Enchantment::new(1, 5));
        set.add(EnchKind::Charm, Enchantment::new(1, 5));
        set.add(EnchKind::Hexed, Enchantment::new(1, 5));
        set.retain_kinds(&EnchKind::POLYMORPH_CARRY);
        assert!(!set.has(EnchKind::Confusion));
        assert!(set.has(EnchKind::Charm));
        assert!(set.has(EnchKind::Hexed));
    }

    #[test]
    fn test_incapacitates() {
        assert!(EnchKind::Paralysis.incapacitates());
        assert!(!EnchKind::Confusion.incapacitates());
    }
}
