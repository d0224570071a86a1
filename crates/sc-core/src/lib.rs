//! sc-core: melee resolution and monster attitude engine
//!
//! This crate holds the computational core of a roguelike's fighting and
//! faction rules with no I/O: melee rounds, weapon brands and attack
//! flavours, god-driven attitude changes, the delayed-action log, and the
//! polymorph engine. Every operation takes a [`GameState`] by mutable
//! reference and draws its randomness from the state's [`RandomSource`].

pub mod actor;
pub mod attitude;
pub mod brand;
pub mod combat;
pub mod companion;
pub mod daction;
pub mod effects;
pub mod god;
pub mod item;
pub mod level;
pub mod message;
pub mod options;
pub mod polymorph;
pub mod trap;

mod consts;
mod errors;
mod rng;
mod state;

pub use consts::*;
pub use errors::{EngineError, EngineResult, fatal};
pub use options::{EngineOptions, OptionsError};
pub use rng::{EngineRng, GameRng, RandomSource, ScriptedRng};
pub use state::{AttitudeChange, GameState, KillRecord, Noise};
