//! Monsters in transit between levels
//!
//! A monster following the player down the stairs, or recalled from another
//! level, leaves its level's roster and waits here until the destination is
//! entered.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::LevelId;
use crate::actor::{Monster, MonsterId};

/// Monsters waiting to arrive on a level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitRegistry {
    lists: HashMap<LevelId, Vec<Monster>>,
}

impl TransitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a monster into transit towards `dest`
    pub fn add(&mut self, dest: LevelId, monster: Monster) {
        log::debug!("{:?} enters transit to {dest}", monster.id);
        self.lists.entry(dest).or_default().push(monster);
    }

    /// Take a monster back out of transit
    pub fn remove(&mut self, dest: LevelId, id: MonsterId) -> Option<Monster> {
        let list = self.lists.get_mut(&dest)?;
        let idx = list.iter().position(|m| m.id == id)?;
        let monster = list.remove(idx);
        if list.is_empty() {
            self.lists.remove(&dest);
        }
        Some(monster)
    }

    /// Everything waiting for `dest`, removed from the registry
    pub fn take_arrivals(&mut self, dest: LevelId) -> Vec<Monster> {
        self.lists.remove(&dest).unwrap_or_default()
    }

    pub fn find(&self, id: MonsterId) -> Option<(LevelId, &Monster)> {
        self.iter().find(|(_, m)| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LevelId, &Monster)> {
        self.lists
            .iter()
            .flat_map(|(lvl, list)| list.iter().map(move |m| (*lvl, m)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (LevelId, &mut Monster)> {
        self.lists
            .iter_mut()
            .flat_map(|(lvl, list)| list.iter_mut().map(move |m| (*lvl, m)))
    }

    /// Drop monsters that died while in transit
    pub fn remove_dead(&mut self) -> usize {
        let mut removed = 0;
        for list in self.lists.values_mut() {
            let before = list.len();
            list.retain(|m| m.hp > 0);
            removed += before - list.len();
        }
        self.lists.retain(|_, list| !list.is_empty());
        removed
    }

    pub fn len(&self) -> usize {
        self.lists.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::level::{Branch, Coord};

    fn orc(id: u32) -> Monster {
        Monster::new(MonsterId(id), Species::Orc, Coord::new(1, 1))
    }

    #[test]
    fn test_add_remove() {
        let mut reg = TransitRegistry::new();
        let d2 = LevelId::new(Branch::Dungeon, 2);
        reg.add(d2, orc(1));
        reg.add(d2, orc(2));
        assert_eq!(reg.len(), 2);
        assert!(reg.find(MonsterId(2)).is_some());
        assert_eq!(reg.remove(d2, MonsterId(1)).map(|m| m.id), Some(MonsterId(1)));
        assert!(reg.remove(d2, MonsterId(1)).is_none());
        assert_eq!(reg.take_arrivals(d2).len(), 1);
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove_dead() {
        let mut reg = TransitRegistry::new();
        let lair = LevelId::new(Branch::Lair, 1);
        let mut dead = orc(3);
        dead.hp = 0;
        reg.add(lair, dead);
        reg.add(lair, orc(4));
        assert_eq!(reg.remove_dead(), 1);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut reg = TransitRegistry::new();
        reg.add(LevelId::new(Branch::Crypt, 2), orc(7));
        let json = serde_json::to_string(&reg).unwrap();
        let back: TransitRegistry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reg);
    }
}
