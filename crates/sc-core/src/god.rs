//! Gods, piety and penance

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::consts::{MAX_PIETY, PIETY_BREAKPOINTS};

/// Deities a player or monster can serve
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
pub enum God {
    #[default]
    #[strum(serialize = "no god")]
    NoGod = 0,
    #[strum(serialize = "the Shining One")]
    ShiningOne = 1,
    Zin = 2,
    Elyvilon = 3,
    Beogh = 4,
    Jiyva = 5,
    Fedhas = 6,
    Yredelemnul = 7,
    Hepliaklqana = 8,
    Ignis = 9,
    Trog = 10,
    Makhleb = 11,
    Kikubaaqudgha = 12,
    Ashenzari = 13,
}

impl God {
    /// Gods that oppose evil and cannot be served by undead or demons
    pub const fn is_good(self) -> bool {
        matches!(self, God::ShiningOne | God::Zin | God::Elyvilon)
    }

    pub const fn is_evil(self) -> bool {
        matches!(
            self,
            God::Yredelemnul | God::Makhleb | God::Kikubaaqudgha
        )
    }

    /// Gods whose followers get levels mapped for them
    pub const fn grants_passive_mapping(self) -> bool {
        matches!(self, God::Ashenzari)
    }

    pub const fn is_none(self) -> bool {
        matches!(self, God::NoGod)
    }

    /// Name with the leading article capitalised, for sentence starts
    pub fn title(self) -> String {
        crate::message::capitalize(&self.to_string())
    }
}

/// Piety needed for the `n`th power tier, clamped to the table
pub fn piety_breakpoint(n: usize) -> i32 {
    PIETY_BREAKPOINTS
        .get(n)
        .copied()
        .unwrap_or(MAX_PIETY)
}

/// Number of breakpoints reached at `piety`
pub fn piety_rank(piety: i32) -> usize {
    PIETY_BREAKPOINTS.iter().filter(|&&bp| piety >= bp).count()
}
