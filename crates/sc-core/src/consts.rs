//! Core game constants
//!
//! Tuning values shared by combat, attitude and polymorph code.

/// Map dimensions
pub const GXM: i16 = 80;
pub const GYM: i16 = 70;

/// Line-of-sight radius used for "can the player see this" checks
pub const LOS_RADIUS: i32 = 7;

/// Maximum number of intrinsic attacks per monster species
pub const MAX_NUM_ATTACKS: usize = 4;

/// Piety ceiling
pub const MAX_PIETY: i32 = 200;

/// Piety thresholds at which god powers unlock
pub const PIETY_BREAKPOINTS: [i32; 6] = [30, 50, 75, 100, 120, 160];

/// A to-hit value this large always lands
pub const AUTOMATIC_HIT: i32 = 1500;

/// Percentage of to-hit rolls that are forced hits or forced misses
pub const MIN_HIT_MISS_PERCENTAGE: i32 = 5;

/// To-hit penalty for a confused attacker
pub const CONFUSION_TO_HIT_MALUS: i32 = -5;

/// To-hit bonus against a backlit (corona) defender
pub const BACKLIGHT_TO_HIT_BONUS: i32 = 5;

/// Loudest noise an attack can make (a shout)
pub const MAX_ATTACK_LOUDNESS: i32 = 12;

/// Maximum number of hydra heads outside the Lernaean hydra
pub const MAX_HYDRA_HEADS: u8 = 20;

/// The Lernaean hydra can grow this many heads
pub const MAX_LERNAEAN_HEADS: u8 = 27;

/// Action energy spent by one melee round
pub const ATTACK_ENERGY: i32 = 100;

/// Shield blocks a defender can make per turn before it is exhausted
pub const SHIELD_BLOCKS_PER_TURN: u8 = 3;

/// Skill level used to scale abandonment saving throws
pub const MAX_SKILL_LEVEL: i32 = 27;

/// Abjuration duration granted to summoned creatures, in aut
pub const DEFAULT_ABJ_DURATION: i32 = 300;
