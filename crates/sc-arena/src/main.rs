//! Monster arena
//!
//! Pits two monster species against each other in repeated seeded duels
//! and reports who won. Handy for eyeballing balance and for replaying a
//! single fight's messages.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde_json::json;
use strum::IntoEnumIterator;

use sc_core::actor::{Actor, Attitude, MonsterId, Species};
use sc_core::combat::fight_melee;
use sc_core::level::Coord;
use sc_core::{EngineOptions, EngineResult, GameState, OptionsError};

const LEFT: Coord = Coord::new(20, 10);
const RIGHT: Coord = Coord::new(21, 10);

/// Monster arena for the melee engine
#[derive(Parser, Debug)]
#[command(name = "sc-arena")]
#[command(author, version, about = "Run seeded monster duels", long_about = None)]
struct Args {
    /// First fighter (e.g. orc, troll, "spiny frog")
    a: Option<String>,

    /// Second fighter
    b: Option<String>,

    /// Number of duels to run
    #[arg(short = 'n', long = "duels", default_value_t = 100)]
    duels: u32,

    /// Rounds before a duel is called a draw
    #[arg(long = "rounds", default_value_t = 200)]
    rounds: u32,

    /// Seed of the first duel; later duels use the following seeds
    #[arg(short = 's', long = "seed", default_value_t = 1)]
    seed: u64,

    /// Engine options file (JSON, or OPTIONS= lines)
    #[arg(short = 'o', long = "options")]
    options: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long = "json")]
    json: bool,

    /// List species and exit
    #[arg(long = "list")]
    list: bool,

    /// Print every message of every duel
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    First,
    Second,
    Draw,
}

#[derive(Debug, Default)]
struct Tally {
    first: u32,
    second: u32,
    draws: u32,
    rounds: u64,
}

impl Tally {
    fn record(&mut self, outcome: Outcome, rounds: u32) {
        match outcome {
            Outcome::First => self.first += 1,
            Outcome::Second => self.second += 1,
            Outcome::Draw => self.draws += 1,
        }
        self.rounds += u64::from(rounds);
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if args.list {
        for species in Species::iter() {
            println!("{}", species.name());
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> EngineResult<()> {
    let first = Species::from_name(args.a.as_deref().unwrap_or("orc"))?;
    let second = Species::from_name(args.b.as_deref().unwrap_or("jackal"))?;
    let mut options = match &args.options {
        Some(path) => load_options(path)?,
        None => EngineOptions::default(),
    };
    options.verbose |= args.verbose;

    log::info!(
        "{} vs {}: {} duels from seed {}",
        first.name(),
        second.name(),
        args.duels,
        args.seed
    );

    let mut tally = Tally::default();
    for i in 0..args.duels {
        let seed = args.seed.wrapping_add(u64::from(i));
        let mut state = GameState::new(seed).with_options(options.clone());
        let (outcome, rounds) = duel(&mut state, first, second, args.rounds)?;
        log::debug!("duel {i} (seed {seed}): {outcome:?} after {rounds} rounds");
        if args.verbose {
            println!("--- duel {} (seed {seed}) ---", i + 1);
            for m in state.messages.drain() {
                println!("{}", m.text);
            }
        }
        tally.record(outcome, rounds);
    }

    report(args, first, second, &tally);
    Ok(())
}

/// Read engine options from JSON, or from an rc-style file otherwise.
fn load_options(path: &Path) -> EngineResult<EngineOptions> {
    if path.extension().is_some_and(|e| e == "json") {
        let text = std::fs::read_to_string(path)
            .map_err(|e| OptionsError::IoError(e.to_string()))?;
        let options = serde_json::from_str(&text)
            .map_err(|e| OptionsError::InvalidValue(path.display().to_string(), e.to_string()))?;
        return Ok(options);
    }
    Ok(EngineOptions::load_from_file(path)?)
}

/// Fight one duel to the death, or until `max_rounds` pass.
fn duel(
    state: &mut GameState,
    first: Species,
    second: Species,
    max_rounds: u32,
) -> EngineResult<(Outcome, u32)> {
    // Friendly against hostile so each side counts the other as a foe
    let a = state.spawn(first, LEFT)?;
    let b = state.spawn(second, RIGHT)?;
    set_sides(state, a, b);

    for round in 1..=max_rounds {
        fight_melee(state, Actor::Monster(a), Actor::Monster(b));
        if let Some(outcome) = settled(state, a, b) {
            return Ok((outcome, round));
        }
        fight_melee(state, Actor::Monster(b), Actor::Monster(a));
        if let Some(outcome) = settled(state, a, b) {
            return Ok((outcome, round));
        }
        state.new_turn();
    }
    Ok((Outcome::Draw, max_rounds))
}

fn set_sides(state: &mut GameState, a: MonsterId, b: MonsterId) {
    if let Some(m) = state.monster_mut(a) {
        m.attitude = Attitude::Friendly;
        m.foe = Some(Actor::Monster(b));
    }
    if let Some(m) = state.monster_mut(b) {
        m.attitude = Attitude::Hostile;
        m.foe = Some(Actor::Monster(a));
    }
}

fn settled(state: &GameState, a: MonsterId, b: MonsterId) -> Option<Outcome> {
    match (state.is_alive(Actor::Monster(a)), state.is_alive(Actor::Monster(b))) {
        (true, true) => None,
        (true, false) => Some(Outcome::First),
        (false, true) => Some(Outcome::Second),
        (false, false) => Some(Outcome::Draw),
    }
}

fn report(args: &Args, first: Species, second: Species, tally: &Tally) {
    let duels = args.duels.max(1);
    let mean_rounds = tally.rounds as f64 / f64::from(duels);
    if args.json {
        let summary = json!({
            "first": first.name(),
            "second": second.name(),
            "duels": args.duels,
            "seed": args.seed,
            "first_wins": tally.first,
            "second_wins": tally.second,
            "draws": tally.draws,
            "mean_rounds": mean_rounds,
        });
        println!("{summary}");
        return;
    }

    let pct = |n: u32| 100.0 * f64::from(n) / f64::from(duels);
    println!("{:<20} {:>6} wins ({:5.1}%)", first.name(), tally.first, pct(tally.first));
    println!("{:<20} {:>6} wins ({:5.1}%)", second.name(), tally.second, pct(tally.second));
    println!("{:<20} {:>6}", "draws", tally.draws);
    println!("mean duel length: {mean_rounds:.1} rounds");
}
