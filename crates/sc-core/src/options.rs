//! Engine options and configuration
//!
//! Tunables read from an rc-style file (`OPTIONS=name:value` lines) or
//! deserialized from any serde format by the front-end.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::MIN_HIT_MISS_PERCENTAGE;

/// Errors raised while reading engine options
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Missing value for option: {0}")]
    MissingValue(String),
}

/// User-configurable engine options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Percentage of to-hit rolls forced to hit or miss
    pub auto_hit_miss_percent: i32,

    /// Whether the player gets mutation-based auxiliary attacks
    pub aux_attacks: bool,

    /// Radius in which penance makes followers abandon the player
    pub abandon_radius: i32,

    /// Rejected chaos draws before falling back to the first susceptible brand
    pub chaos_retry_cap: u32,

    /// Maximum nesting of queued chaos self-effects
    pub effect_depth: u32,

    /// Random species drawn before a polymorph gives up
    pub polymorph_tries: u32,

    /// Whether messages about unseen monsters are kept
    pub verbose: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            auto_hit_miss_percent: MIN_HIT_MISS_PERCENTAGE,
            aux_attacks: true,
            abandon_radius: 9,
            chaos_retry_cap: 20,
            effect_depth: 4,
            polymorph_tries: 1000,
            verbose: false,
        }
    }
}

impl EngineOptions {
    /// Load options from a file
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::IoError(e.to_string()))?;

        Self::parse_config(&contents)
    }

    /// Parse options from a config string
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(opts) = line.strip_prefix("OPTIONS=") {
                for opt in opts.split(',') {
                    options.parse_option(opt.trim())?;
                }
            }
        }

        Ok(options)
    }

    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if let Some((key, value)) = opt.split_once(':').or_else(|| opt.split_once('=')) {
            return self.set_option(key.trim(), value.trim());
        }

        let (value, name) = match opt.strip_prefix('!') {
            Some(name) => (false, name),
            None => (true, opt),
        };
        self.set_bool_option(name, value)
    }

    fn set_bool_option(&mut self, name: &str, value: bool) -> Result<(), OptionsError> {
        match name {
            "aux_attacks" => self.aux_attacks = value,
            "verbose" => self.verbose = value,
            "auto_hit_miss_percent" | "abandon_radius" | "chaos_retry_cap" | "effect_depth"
            | "polymorph_tries" => return Err(OptionsError::MissingValue(name.to_string())),
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        let invalid = || OptionsError::InvalidValue(name.to_string(), value.to_string());

        match name {
            "auto_hit_miss_percent" => {
                let pct: i32 = value.parse().map_err(|_| invalid())?;
                if !(0..=100).contains(&pct) {
                    return Err(invalid());
                }
                self.auto_hit_miss_percent = pct;
            }
            "abandon_radius" => self.abandon_radius = value.parse().map_err(|_| invalid())?,
            "chaos_retry_cap" => self.chaos_retry_cap = value.parse().map_err(|_| invalid())?,
            "effect_depth" => self.effect_depth = value.parse().map_err(|_| invalid())?,
            "polymorph_tries" => self.polymorph_tries = value.parse().map_err(|_| invalid())?,
            "aux_attacks" | "verbose" => {
                let flag = match value {
                    "true" | "yes" | "on" => true,
                    "false" | "no" | "off" => false,
                    _ => return Err(invalid()),
                };
                self.set_bool_option(name, flag)?;
            }
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }
}
