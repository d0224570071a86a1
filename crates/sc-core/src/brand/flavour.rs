//! Intrinsic monster attack flavours

use super::{
    AttackFlavour, BrandOutcome, HitContext, antimagic_affects_defender, attack_strength_punctuation,
    confuse, conj, distortion_affects_defender, drain_defender, enchant, heal, hit_dice, holiness,
    holy_wrath_susceptible, pain_affects_defender, poison, possessive, random_chaos_flavour,
    resist, resist_adjust, susceptible_to_vampirism, the, the_cap, visible,
};
use crate::actor::{Actor, EnchKind, Enchantment, Holiness, ResistKind, Stat};
use crate::message::capitalize;
use crate::rng::RandomSource;
use crate::state::GameState;

const MAX_CORROSION: i32 = 4;

/// "The ogre freezes you!" style message, gated on visibility
fn verb_message(state: &GameState, hit: HitContext, verb: &str, tail: &str) -> Option<String> {
    visible(state, hit.defender).then(|| {
        format!(
            "{} {} {}{tail}",
            the_cap(state, hit.attacker),
            conj(hit.attacker, verb),
            the(state, hit.defender)
        )
    })
}

/// "You are engulfed in flames." style message about the defender
fn passive_message(state: &GameState, who: Actor, rest: &str) -> Option<String> {
    visible(state, who).then(|| format!("{} {} {rest}", the_cap(state, who), conj(who, "are")))
}

fn status(message: Option<String>) -> BrandOutcome {
    BrandOutcome {
        obvious: message.is_some(),
        message,
        ..Default::default()
    }
}

pub(super) fn apply_flavour(
    state: &mut GameState,
    flavour: AttackFlavour,
    hit: HitContext,
) -> BrandOutcome {
    let hd = hit_dice(state, hit.attacker).max(1);
    let dmg = hit.damage_done;
    match flavour {
        AttackFlavour::Plain | AttackFlavour::Trample => BrandOutcome::default(),

        AttackFlavour::Fire => {
            let raw = hd + state.rng.uniform(hd);
            let special = resist_adjust(resist(state, hit.defender, ResistKind::Fire), raw);
            if special <= 0 {
                return BrandOutcome::default();
            }
            let message = passive_message(
                state,
                hit.defender,
                &format!("engulfed in flames{}", attack_strength_punctuation(special)),
            );
            BrandOutcome::damage(special, message)
        }

        AttackFlavour::Cold => {
            let raw = hd + state.rng.uniform(hd * 2);
            let special = resist_adjust(resist(state, hit.defender, ResistKind::Cold), raw);
            if special <= 0 {
                return BrandOutcome::default();
            }
            let message = verb_message(state, hit, "freeze", attack_strength_punctuation(special));
            BrandOutcome::damage(special, message)
        }

        AttackFlavour::Elec => {
            let raw = hd + state.rng.uniform(hd / 2 + 1);
            let special = resist_adjust(resist(state, hit.defender, ResistKind::Elec), raw);
            if special <= 0 {
                return BrandOutcome::default();
            }
            let message = verb_message(state, hit, "shock", attack_strength_punctuation(special));
            BrandOutcome::damage(special, message)
        }

        AttackFlavour::PureFire => {
            let raw = hd * 3 / 2 + state.rng.uniform(hd);
            let ac = state.actor(hit.defender).map_or(0, |a| a.ac());
            let special = (raw - state.rng.uniform(1 + ac / 2)).max(0);
            if special <= 0 {
                return BrandOutcome::default();
            }
            let message = verb_message(state, hit, "burn", "!");
            BrandOutcome::damage(special, message)
        }

        AttackFlavour::Drown => {
            if matches!(
                holiness(state, hit.defender),
                Holiness::Undead | Holiness::Nonliving
            ) {
                return BrandOutcome::default();
            }
            let special = hd * 3 / 4 + state.rng.uniform(hd * 3 / 4 + 1);
            let message = verb_message(state, hit, "drown", attack_strength_punctuation(special));
            BrandOutcome::damage(special, message)
        }

        AttackFlavour::Poison | AttackFlavour::PoisonStrong => {
            if !state.rng.chance_in_n(3) {
                return BrandOutcome::default();
            }
            let strong = flavour == AttackFlavour::PoisonStrong;
            let amount = if strong {
                state.rng.random_range(hd * 11 / 3, hd * 13 / 2)
            } else {
                state.rng.random_range(hd * 2, hd * 4)
            };
            if !poison(state, hit.defender, hit.attacker, amount, strong) {
                return BrandOutcome::default();
            }
            status(verb_message(state, hit, "poison", "!"))
        }

        AttackFlavour::Vampiric => {
            if dmg < 1 || !susceptible_to_vampirism(state, hit.defender) {
                return BrandOutcome::default();
            }
            let raw = 1 + state.rng.uniform(dmg);
            let amount = resist_adjust(resist(state, hit.defender, ResistKind::Negative), raw);
            if heal(state, hit.attacker, amount) <= 0 {
                return BrandOutcome::default();
            }
            let message = visible(state, hit.attacker).then(|| {
                format!(
                    "{} {} vitality from {} injuries!",
                    the_cap(state, hit.attacker),
                    conj(hit.attacker, "draw"),
                    possessive(state, hit.defender)
                )
            });
            status(message)
        }

        AttackFlavour::DrainStr => drain_stat(state, hit, Stat::Str),
        AttackFlavour::DrainInt => drain_stat(state, hit, Stat::Int),
        AttackFlavour::DrainDex => drain_stat(state, hit, Stat::Dex),

        AttackFlavour::Confuse => {
            if !state.rng.chance_in_n(3) {
                return BrandOutcome::default();
            }
            let duration = 1 + state.rng.uniform(3 + hd);
            if !confuse(state, hit.defender, hit.attacker, duration) {
                return BrandOutcome::default();
            }
            status(passive_message(state, hit.defender, "afflicted by dizzying energies!"))
        }

        AttackFlavour::DrainXp => {
            if state.rng.coin_flip() {
                drain_defender(state, hit)
            } else {
                BrandOutcome::default()
            }
        }

        AttackFlavour::Paralyse => paralyse(state, hit, hd),

        AttackFlavour::Distort => distortion_affects_defender(state, hit),

        AttackFlavour::Rage => {
            if !state.rng.chance_in_n(3) || !can_go_berserk(state, hit.defender) {
                return BrandOutcome::default();
            }
            let duration = 10 + state.rng.uniform(10);
            enchant(state, hit.defender, hit.attacker, EnchKind::Berserk, duration);
            status(verb_message(state, hit, "infuriate", "!"))
        }

        AttackFlavour::Holy => {
            if !holy_wrath_susceptible(state, hit.defender) {
                return BrandOutcome::default();
            }
            let special = hit.attack_damage * 3 / 4;
            let message = verb_message(state, hit, "sear", attack_strength_punctuation(special));
            BrandOutcome::damage(special, message)
        }

        AttackFlavour::Antimagic => {
            let shielded = state
                .actor(hit.defender)
                .is_some_and(|a| a.has_ench(EnchKind::Antimagic));
            let power = if shielded { hd * 12 } else { hd * 18 };
            antimagic_affects_defender(state, hit, power)
        }

        AttackFlavour::Pain => pain_affects_defender(state, hit, hd / 2),

        AttackFlavour::Ensnare => {
            if !state.rng.chance_in_n(3) || is_held(state, hit.defender) {
                return BrandOutcome::default();
            }
            enchant(state, hit.defender, hit.attacker, EnchKind::Held, 0);
            status(passive_message(state, hit.defender, "caught in a web!"))
        }

        AttackFlavour::Crush => {
            if !state.rng.x_chance_in_y(2, 3) || is_held(state, hit.defender) {
                return BrandOutcome::default();
            }
            enchant(state, hit.defender, hit.attacker, EnchKind::Held, 0);
            status(verb_message(state, hit, "grab", "."))
        }

        AttackFlavour::Engulf => {
            if !state.rng.x_chance_in_y(2, 3) {
                return BrandOutcome::default();
            }
            let duration = 2 + state.rng.uniform(3);
            enchant(state, hit.defender, hit.attacker, EnchKind::Engulfed, duration);
            status(verb_message(state, hit, "engulf", " in water!"))
        }

        AttackFlavour::DrainSpeed => {
            if !state.rng.x_chance_in_y(3, 5) {
                return BrandOutcome::default();
            }
            let duration = 5 + state.rng.uniform(7);
            enchant(state, hit.defender, hit.attacker, EnchKind::Slow, duration);
            let message = visible(state, hit.defender).then(|| {
                format!(
                    "{} {} {} vigour!",
                    the_cap(state, hit.attacker),
                    conj(hit.attacker, "drain"),
                    possessive(state, hit.defender)
                )
            });
            status(message)
        }

        AttackFlavour::Vuln => {
            if !state.rng.chance_in_n(3) {
                return BrandOutcome::default();
            }
            let duration = 20 + state.rng.uniform(20);
            enchant(state, hit.defender, hit.attacker, EnchKind::LoweredMr, duration);
            let message = visible(state, hit.defender).then(|| {
                format!(
                    "{} willpower is stripped away!",
                    capitalize(&possessive(state, hit.defender))
                )
            });
            status(message)
        }

        AttackFlavour::Weakness => {
            if !state.rng.coin_flip() {
                return BrandOutcome::default();
            }
            enchant(state, hit.defender, hit.attacker, EnchKind::Weak, 12);
            let message = match hit.defender {
                Actor::Player => Some("You feel weaker.".to_string()),
                Actor::Monster(_) => visible(state, hit.defender)
                    .then(|| format!("{} looks weaker.", the_cap(state, hit.defender))),
            };
            status(message)
        }

        AttackFlavour::Chaotic => {
            let concrete = random_chaos_flavour(state, hit.attacker, hit.defender);
            log::trace!("chaotic attack resolved to {concrete}");
            apply_flavour(state, concrete, hit)
        }

        AttackFlavour::Corrode => {
            if let Some(a) = state.actor_mut(hit.defender) {
                a.ench_mut().add_capped(
                    EnchKind::Corrosion,
                    Enchantment::from_source(1, 0, hit.attacker),
                    MAX_CORROSION,
                );
            }
            let message = visible(state, hit.defender).then(|| {
                format!(
                    "{} equipment corrodes!",
                    capitalize(&possessive(state, hit.defender))
                )
            });
            status(message)
        }
    }
}

fn is_held(state: &GameState, who: Actor) -> bool {
    state.actor(who).is_some_and(|a| a.has_ench(EnchKind::Held))
}

fn can_go_berserk(state: &GameState, who: Actor) -> bool {
    state.actor(who).is_some_and(|a| {
        a.holiness() == Holiness::Natural
            && !a.has_ench(EnchKind::Berserk)
            && !a.has_ench(EnchKind::Slow)
    })
}

/// Stat drain only ever touches the player
fn drain_stat(state: &mut GameState, hit: HitContext, stat: Stat) -> BrandOutcome {
    if !hit.defender.is_player() {
        return BrandOutcome::default();
    }
    let fires =
        state.rng.chance_in_n(20) || (hit.damage_done > 0 && state.rng.chance_in_n(3));
    if !fires || state.player.drain_stat(stat, 1) == 0 {
        return BrandOutcome::default();
    }
    let feeling = match stat {
        Stat::Str => "weaker",
        Stat::Int => "dopey",
        Stat::Dex => "clumsy",
    };
    status(Some(format!("You feel {feeling}.")))
}

fn paralyse(state: &mut GameState, hit: HitContext, hd: i32) -> BrandOutcome {
    let rpois = resist(state, hit.defender, ResistKind::Poison);
    if rpois >= 3 {
        return BrandOutcome::default();
    }
    let mut outcome = BrandOutcome::default();
    if state.rng.chance_in_n(3) {
        let amount = state.rng.random_range(hd * 3 / 2, hd * 5 / 2);
        if poison(state, hit.defender, hit.attacker, amount, false) {
            outcome = status(verb_message(state, hit, "poison", "!"));
        }
    }
    if !state.rng.chance_in_n(6) {
        return outcome;
    }
    let (kind, duration, what) = if rpois <= 0 || state.rng.chance_in_n(3) {
        (EnchKind::Paralysis, state.rng.random_range(1, 3), "paralysed")
    } else {
        (EnchKind::Slow, 5 + state.rng.uniform(5), "slowed")
    };
    enchant(state, hit.defender, hit.attacker, kind, duration);
    if let Some(text) = passive_message(state, hit.defender, &format!("{what}!")) {
        outcome.message = Some(match outcome.message.take() {
            Some(prev) => format!("{prev} {text}"),
            None => text,
        });
        outcome.obvious = true;
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::level::Coord;
    use crate::rng::EngineRng;

    fn monster_hits_player(state: &mut GameState, species: Species, damage: i32) -> HitContext {
        let id = state.spawn(species, Coord::new(11, 10)).unwrap();
        HitContext {
            attacker: Actor::Monster(id),
            defender: Actor::Player,
            damage_done: damage,
            attack_damage: damage,
        }
    }

    #[test]
    fn test_cold_scales_with_hit_dice() {
        // Azure jelly has 12 HD: 12 + random2(24)
        let mut state = GameState::with_rng(EngineRng::scripted(vec![5]));
        let hit = monster_hits_player(&mut state, Species::AzureJelly, 8);
        let out = apply_flavour(&mut state, AttackFlavour::Cold, hit);
        assert_eq!(out.special_damage, 17);
        assert_eq!(out.message.as_deref(), Some("The azure jelly freezes you!!"));
    }

    #[test]
    fn test_fire_resisted() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0]));
        state.player.res.fire = 3;
        let hit = monster_hits_player(&mut state, Species::FireGiant, 10);
        assert_eq!(apply_flavour(&mut state, AttackFlavour::Fire, hit), BrandOutcome::default());
    }

    #[test]
    fn test_fire_message() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0]));
        let hit = monster_hits_player(&mut state, Species::FireGiant, 10);
        let out = apply_flavour(&mut state, AttackFlavour::Fire, hit);
        assert_eq!(out.special_damage, 16);
        assert_eq!(out.message.as_deref(), Some("You are engulfed in flames!!"));
    }

    #[test]
    fn test_crush_holds() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0]));
        let hit = monster_hits_player(&mut state, Species::Troll, 5);
        let out = apply_flavour(&mut state, AttackFlavour::Crush, hit);
        assert!(state.player.ench.has(EnchKind::Held));
        assert_eq!(out.message.as_deref(), Some("The troll grabs you."));
        // Already held: nothing more to do
        let again = apply_flavour(&mut state, AttackFlavour::Crush, hit);
        assert_eq!(again, BrandOutcome::default());
    }

    #[test]
    fn test_drain_stat_only_on_player() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0]));
        let hit = monster_hits_player(&mut state, Species::Wight, 3);
        let out = apply_flavour(&mut state, AttackFlavour::DrainStr, hit);
        assert_eq!(state.player.strength, 9);
        assert_eq!(out.message.as_deref(), Some("You feel weaker."));

        let orc = state.spawn(Species::Orc, Coord::new(12, 10)).unwrap();
        let at_monster = HitContext {
            defender: Actor::Monster(orc),
            ..hit
        };
        assert_eq!(
            apply_flavour(&mut state, AttackFlavour::DrainDex, at_monster),
            BrandOutcome::default()
        );
    }

    #[test]
    fn test_vampiric_bite_heals() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![5]));
        let hit = monster_hits_player(&mut state, Species::Vampire, 8);
        let id = hit.attacker.monster_id().unwrap();
        state.monster_mut(id).unwrap().hp = 10;
        let out = apply_flavour(&mut state, AttackFlavour::Vampiric, hit);
        assert_eq!(state.monster(id).unwrap().hp, 16);
        assert_eq!(
            out.message.as_deref(),
            Some("The vampire draws vitality from your injuries!")
        );
    }

    #[test]
    fn test_paralyse_needs_poison_vulnerability() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        state.player.res.poison = 3;
        let hit = monster_hits_player(&mut state, Species::SpinyFrog, 5);
        assert_eq!(apply_flavour(&mut state, AttackFlavour::Paralyse, hit), BrandOutcome::default());
        assert!(!state.player.ench.has(EnchKind::Paralysis));
    }

    #[test]
    fn test_paralyse_poisons_and_paralyses() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        let hit = monster_hits_player(&mut state, Species::SpinyFrog, 5);
        let out = apply_flavour(&mut state, AttackFlavour::Paralyse, hit);
        assert!(state.player.ench.has(EnchKind::Poison));
        assert!(state.player.ench.has(EnchKind::Paralysis));
        assert_eq!(
            out.message.as_deref(),
            Some("The spiny frog poisons you! You are paralysed!")
        );
    }

    #[test]
    fn test_holy_sears_undead() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        let cherub = state.spawn(Species::Cherub, Coord::new(11, 10)).unwrap();
        let zombie = state.spawn(Species::Zombie, Coord::new(12, 10)).unwrap();
        let hit = HitContext {
            attacker: Actor::Monster(cherub),
            defender: Actor::Monster(zombie),
            damage_done: 4,
            attack_damage: 8,
        };
        let out = apply_flavour(&mut state, AttackFlavour::Holy, hit);
        assert_eq!(out.special_damage, 6);
        assert_eq!(out.message.as_deref(), Some("The cherub sears the zombie."));
    }

    #[test]
    fn test_chaotic_resolves_to_concrete_flavour() {
        let mut state = GameState::new(42);
        let hit = monster_hits_player(&mut state, Species::Ogre, 5);
        for _ in 0..50 {
            state.player.hp = state.player.hp_max;
            apply_flavour(&mut state, AttackFlavour::Chaotic, hit);
        }
    }

    #[test]
    fn test_drown_skips_undead() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        state.player.species = crate::actor::PlayerSpecies::Mummy;
        let hit = monster_hits_player(&mut state, Species::Ogre, 5);
        assert_eq!(apply_flavour(&mut state, AttackFlavour::Drown, hit), BrandOutcome::default());
    }
}
