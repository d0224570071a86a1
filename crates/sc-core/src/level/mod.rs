//! Levels: terrain, the monster roster and per-level bookkeeping

pub mod transit;

pub use transit::TransitRegistry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::actor::{Habitat, Monster, MonsterId};
use crate::consts::{GXM, GYM};
use crate::errors::{EngineError, EngineResult};
use crate::god::God;
use crate::item::{Item, ItemKind};
use crate::trap::Trap;

/// A map position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i16,
    pub y: i16,
}

impl Coord {
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance
    pub fn distance(self, other: Coord) -> i32 {
        let dx = (self.x as i32 - other.x as i32).abs();
        let dy = (self.y as i32 - other.y as i32).abs();
        dx.max(dy)
    }

    pub fn is_adjacent(self, other: Coord) -> bool {
        self != other && self.distance(other) == 1
    }

    pub fn offset(self, dx: i16, dy: i16) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }

    /// The cell one step further along the line from `from` through `self`
    pub fn away_from(self, from: Coord) -> Coord {
        let dx = (self.x - from.x).signum();
        let dy = (self.y - from.y).signum();
        self.offset(dx, dy)
    }

    /// The eight surrounding cells, in scan order
    pub fn neighbours(self) -> impl Iterator<Item = Coord> {
        (-1..=1).flat_map(move |dy| {
            (-1..=1)
                .filter(move |&dx| dx != 0 || dy != 0)
                .map(move |dx| self.offset(dx, dy))
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dungeon branches
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
    EnumString,
)]
#[repr(u8)]
pub enum Branch {
    #[default]
    #[strum(serialize = "D")]
    Dungeon = 0,
    Lair = 1,
    Orc = 2,
    Slime = 3,
    Vaults = 4,
    Crypt = 5,
    Abyss = 6,
    #[strum(serialize = "Pan")]
    Pandemonium = 7,
    Hell = 8,
}

impl Branch {
    /// Banishment makes no sense from inside the Abyss
    pub const fn allows_banishment(self) -> bool {
        !matches!(self, Branch::Abyss)
    }
}

/// Identifies one level: branch plus depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LevelId {
    pub branch: Branch,
    pub depth: u8,
}

impl LevelId {
    pub const fn new(branch: Branch, depth: u8) -> Self {
        Self { branch, depth }
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.branch, self.depth)
    }
}

impl FromStr for LevelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (branch, depth) = s
            .split_once(':')
            .ok_or_else(|| format!("malformed level id: {s}"))?;
        let branch = Branch::from_str(branch).map_err(|e| e.to_string())?;
        let depth = depth.parse().map_err(|_| format!("bad depth in {s}"))?;
        Ok(LevelId::new(branch, depth))
    }
}

// Serialized as "Lair:3" so level ids can key JSON maps
impl Serialize for LevelId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LevelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Terrain features
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    #[default]
    Floor,
    Wall,
    ShallowWater,
    DeepWater,
    Lava,
    Tree,
    Altar(God),
}

impl Terrain {
    pub const fn is_passable(self) -> bool {
        matches!(
            self,
            Terrain::Floor | Terrain::ShallowWater | Terrain::Altar(_)
        )
    }

    pub const fn blocks_sight(self) -> bool {
        matches!(self, Terrain::Wall | Terrain::Tree)
    }

    /// Whether a creature of `habitat` can survive here
    pub const fn suits(self, habitat: Habitat) -> bool {
        match habitat {
            Habitat::Land => self.is_passable(),
            Habitat::Amphibious => self.is_passable() || matches!(self, Terrain::DeepWater),
            Habitat::Water => matches!(self, Terrain::DeepWater | Terrain::ShallowWater),
            Habitat::Lava => matches!(self, Terrain::Lava),
        }
    }
}

/// One dungeon level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub id: LevelId,
    terrain: Vec<Terrain>,
    pub monsters: Vec<Monster>,
    pub traps: Vec<Trap>,
    pub items: Vec<(Coord, Item)>,
    pub blood: Vec<(Coord, i32)>,
    /// Whether the level map is known to the player
    pub mapped: bool,
}

impl Level {
    /// An open floor level walled at the edges
    pub fn new(id: LevelId) -> Self {
        let mut terrain = vec![Terrain::Floor; GXM as usize * GYM as usize];
        for y in 0..GYM {
            for x in 0..GXM {
                if x == 0 || y == 0 || x == GXM - 1 || y == GYM - 1 {
                    terrain[y as usize * GXM as usize + x as usize] = Terrain::Wall;
                }
            }
        }
        Self {
            id,
            terrain,
            monsters: Vec::new(),
            traps: Vec::new(),
            items: Vec::new(),
            blood: Vec::new(),
            mapped: false,
        }
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && c.x < GXM && c.y < GYM
    }

    pub fn terrain(&self, c: Coord) -> Terrain {
        if self.in_bounds(c) {
            self.terrain[c.y as usize * GXM as usize + c.x as usize]
        } else {
            Terrain::Wall
        }
    }

    pub fn set_terrain(&mut self, c: Coord, t: Terrain) {
        if self.in_bounds(c) {
            self.terrain[c.y as usize * GXM as usize + c.x as usize] = t;
        }
    }

    /// Replace every cell of one terrain type with another
    pub fn replace_terrain(&mut self, from: Terrain, to: Terrain) -> usize {
        let mut count = 0;
        for t in self.terrain.iter_mut().filter(|t| **t == from) {
            *t = to;
            count += 1;
        }
        count
    }

    pub fn is_passable(&self, c: Coord) -> bool {
        self.terrain(c).is_passable()
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.id == id)
    }

    pub fn monster_mut(&mut self, id: MonsterId) -> Option<&mut Monster> {
        self.monsters.iter_mut().find(|m| m.id == id)
    }

    pub fn monster_at(&self, c: Coord) -> Option<&Monster> {
        self.monsters.iter().find(|m| m.pos == c && m.hp > 0)
    }

    /// Place a monster, refusing occupied or impassable cells
    pub fn add_monster(&mut self, monster: Monster) -> EngineResult<MonsterId> {
        let pos = monster.pos;
        if !self.terrain(pos).suits(monster.species.info().habitat) || self.monster_at(pos).is_some()
        {
            return Err(EngineError::CellUnavailable { x: pos.x, y: pos.y });
        }
        let id = monster.id;
        self.monsters.push(monster);
        Ok(id)
    }

    pub fn remove_monster(&mut self, id: MonsterId) -> Option<Monster> {
        let idx = self.monsters.iter().position(|m| m.id == id)?;
        Some(self.monsters.remove(idx))
    }

    /// Drop dead monsters from the roster
    pub fn reap(&mut self) -> Vec<Monster> {
        let (dead, alive): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.monsters).into_iter().partition(|m| m.hp <= 0);
        self.monsters = alive;
        dead
    }

    /// Whether sight passes between two cells
    pub fn line_of_sight(&self, from: Coord, to: Coord) -> bool {
        let (mut x0, mut y0) = (from.x as i32, from.y as i32);
        let (x1, y1) = (to.x as i32, to.y as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if x0 == x1 && y0 == y1 {
                return true;
            }
            let here = Coord::new(x0 as i16, y0 as i16);
            if here != from && self.terrain(here).blocks_sight() {
                return false;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    /// Passable, unoccupied cells within `radius` of `centre`, in scan order
    pub fn free_cells_within(&self, centre: Coord, radius: i32, exclude: &[Coord]) -> Vec<Coord> {
        let r = radius as i16;
        let mut cells = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let c = centre.offset(dx, dy);
                if c != centre
                    && self.in_bounds(c)
                    && self.is_passable(c)
                    && self.monster_at(c).is_none()
                    && !exclude.contains(&c)
                {
                    cells.push(c);
                }
            }
        }
        cells
    }

    pub fn bleed(&mut self, c: Coord, amount: i32) {
        if amount <= 0 {
            return;
        }
        match self.blood.iter_mut().find(|(p, _)| *p == c) {
            Some((_, total)) => *total += amount,
            None => self.blood.push((c, amount)),
        }
    }

    pub fn blood_at(&self, c: Coord) -> i32 {
        self.blood
            .iter()
            .find(|(p, _)| *p == c)
            .map_or(0, |(_, amount)| *amount)
    }

    pub fn drop_item(&mut self, c: Coord, item: Item) {
        self.items.push((c, item));
    }

    /// Mark every corpse on the level thoroughly rotten
    pub fn rot_corpses(&mut self) -> usize {
        let mut count = 0;
        for (_, item) in self.items.iter_mut() {
            if let ItemKind::Corpse { rotten, .. } = &mut item.kind {
                *rotten = true;
                count += 1;
            }
        }
        count
    }

    pub fn trap_at_mut(&mut self, c: Coord) -> Option<&mut Trap> {
        self.traps.iter_mut().find(|t| t.pos == c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;

    fn level() -> Level {
        Level::new(LevelId::new(Branch::Dungeon, 1))
    }

    #[test]
    fn test_level_id_display_and_parse() {
        let id = LevelId::new(Branch::Lair, 3);
        assert_eq!(id.to_string(), "Lair:3");
        assert_eq!("Lair:3".parse::<LevelId>(), Ok(id));
        assert_eq!("D:1".parse::<LevelId>(), Ok(LevelId::new(Branch::Dungeon, 1)));
        assert!("Nowhere:1".parse::<LevelId>().is_err());
    }

    #[test]
    fn test_level_id_as_json_key() {
        let mut map = hashbrown::HashMap::new();
        map.insert(LevelId::new(Branch::Orc, 2), 7usize);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Orc:2":7}"#);
        let back: hashbrown::HashMap<LevelId, usize> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_distance() {
        let a = Coord::new(1, 1);
        assert_eq!(a.distance(Coord::new(4, 2)), 3);
        assert!(a.is_adjacent(Coord::new(2, 2)));
        assert!(!a.is_adjacent(a));
        assert_eq!(Coord::new(5, 5).away_from(Coord::new(4, 5)), Coord::new(6, 5));
        assert_eq!(a.neighbours().count(), 8);
    }

    #[test]
    fn test_edges_are_walls() {
        let lvl = level();
        assert_eq!(lvl.terrain(Coord::new(0, 0)), Terrain::Wall);
        assert_eq!(lvl.terrain(Coord::new(10, 10)), Terrain::Floor);
        assert_eq!(lvl.terrain(Coord::new(-3, 10)), Terrain::Wall);
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let mut lvl = level();
        let a = Coord::new(5, 5);
        let b = Coord::new(9, 5);
        assert!(lvl.line_of_sight(a, b));
        lvl.set_terrain(Coord::new(7, 5), Terrain::Wall);
        assert!(!lvl.line_of_sight(a, b));
    }

    #[test]
    fn test_add_monster_rejects_occupied() {
        let mut lvl = level();
        let pos = Coord::new(3, 3);
        lvl.add_monster(Monster::new(MonsterId(1), Species::Orc, pos)).unwrap();
        let err = lvl.add_monster(Monster::new(MonsterId(2), Species::Orc, pos));
        assert_eq!(err, Err(EngineError::CellUnavailable { x: 3, y: 3 }));
    }

    #[test]
    fn test_eel_needs_water() {
        let mut lvl = level();
        let pos = Coord::new(4, 4);
        assert!(lvl
            .add_monster(Monster::new(MonsterId(1), Species::ElectricEel, pos))
            .is_err());
        lvl.set_terrain(pos, Terrain::DeepWater);
        assert!(lvl
            .add_monster(Monster::new(MonsterId(1), Species::ElectricEel, pos))
            .is_ok());
    }

    #[test]
    fn test_bleed_accumulates() {
        let mut lvl = level();
        let c = Coord::new(2, 2);
        lvl.bleed(c, 3);
        lvl.bleed(c, 4);
        lvl.bleed(c, 0);
        assert_eq!(lvl.blood_at(c), 7);
    }

    #[test]
    fn test_rot_corpses() {
        let mut lvl = level();
        lvl.drop_item(Coord::new(2, 2), Item::corpse(Species::Orc));
        lvl.drop_item(Coord::new(2, 2), Item::new(ItemKind::Gold));
        assert_eq!(lvl.rot_corpses(), 1);
        assert!(matches!(
            lvl.items[0].1.kind,
            ItemKind::Corpse { rotten: true, .. }
        ));
    }

    #[test]
    fn test_free_cells_within() {
        let mut lvl = level();
        let c = Coord::new(10, 10);
        lvl.add_monster(Monster::new(MonsterId(1), Species::Rat, Coord::new(11, 10)))
            .unwrap();
        let cells = lvl.free_cells_within(c, 1, &[Coord::new(9, 9)]);
        assert_eq!(cells.len(), 6);
        assert!(!cells.contains(&Coord::new(11, 10)));
    }
}
