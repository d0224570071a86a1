//! Weapon brand effects

use super::{
    BrandOutcome, HitContext, WeaponBrand, antimagic_affects_defender, at_full_hp,
    attack_strength_punctuation, confuse, conj, distortion_affects_defender, drain_defender,
    heal, hit_dice, holy_wrath_susceptible, pain_affects_defender, poison, random_chaos_brand,
    resist, resist_adjust, susceptible_to_vampirism, the, the_cap, undead_or_demonic, visible,
    worships_trog,
};
use crate::actor::{Actor, EnchKind, Enchantment, ResistKind, Skill};
use crate::rng::RandomSource;
use crate::state::GameState;

/// Corrosion stacks no deeper than this
const MAX_CORROSION: i32 = 4;

pub(super) fn apply_brand(state: &mut GameState, brand: WeaponBrand, hit: HitContext) -> BrandOutcome {
    let dmg = hit.damage_done;
    match brand {
        WeaponBrand::None
        | WeaponBrand::Speed
        | WeaponBrand::Vorpal
        | WeaponBrand::Protection
        | WeaponBrand::Penetration
        | WeaponBrand::Evasion
        | WeaponBrand::Reaping => BrandOutcome::default(),

        WeaponBrand::Flaming => elemental(state, hit, ResistKind::Fire, "burn"),
        WeaponBrand::Freezing => elemental(state, hit, ResistKind::Cold, "freeze"),

        WeaponBrand::HolyWrath => {
            if undead_or_demonic(state, hit.attacker) || !holy_wrath_susceptible(state, hit.defender)
            {
                return BrandOutcome::default();
            }
            let special = 1 + state.rng.uniform(dmg * 15) / 10;
            let message = visible(state, hit.defender).then(|| {
                format!(
                    "{} {}{}",
                    the_cap(state, hit.defender),
                    conj(hit.defender, "convulse"),
                    attack_strength_punctuation(special)
                )
            });
            BrandOutcome::damage(special, message)
        }

        WeaponBrand::Electrocution => {
            if resist(state, hit.defender, ResistKind::Elec) > 0 || !state.rng.chance_in_n(4) {
                return BrandOutcome::default();
            }
            let special = 8 + state.rng.uniform(13);
            let message = match hit.defender {
                Actor::Player => Some("You are electrocuted!".to_string()),
                Actor::Monster(_) => visible(state, hit.defender)
                    .then(|| format!("Lightning courses through {}!", the(state, hit.defender))),
            };
            BrandOutcome::damage(special, message)
        }

        WeaponBrand::Venom => {
            if state.rng.chance_in_n(4) {
                return BrandOutcome::default();
            }
            let amount = 6 + state.rng.uniform(8) + state.rng.uniform(dmg * 3 / 2);
            if !poison(state, hit.defender, hit.attacker, amount, false) {
                return BrandOutcome::default();
            }
            let message = match hit.defender {
                Actor::Player => Some("You are poisoned.".to_string()),
                Actor::Monster(_) => visible(state, hit.defender)
                    .then(|| format!("{} looks ill.", the_cap(state, hit.defender))),
            };
            BrandOutcome {
                obvious: message.is_some(),
                message,
                ..Default::default()
            }
        }

        WeaponBrand::Draining => drain_defender(state, hit),

        WeaponBrand::Vampirism => vampirism(state, hit),

        WeaponBrand::Pain => {
            if worships_trog(state, hit.attacker) {
                return BrandOutcome::default();
            }
            let power = match hit.attacker {
                Actor::Player => state.player.skill(Skill::Necromancy),
                Actor::Monster(_) => hit_dice(state, hit.attacker) / 2,
            };
            pain_affects_defender(state, hit, power)
        }

        WeaponBrand::Antimagic => antimagic_affects_defender(state, hit, dmg * 8),

        WeaponBrand::Distortion => distortion_affects_defender(state, hit),

        WeaponBrand::Confuse => confuse_brand(state, hit),

        WeaponBrand::Chaos => {
            let concrete = random_chaos_brand(state, hit.attacker, hit.defender);
            log::trace!("chaos resolved to {concrete}");
            apply_brand(state, concrete, hit)
        }

        WeaponBrand::Acid => {
            let special = 1 + state.rng.uniform(dmg);
            if let Some(a) = state.actor_mut(hit.defender) {
                a.ench_mut().add_capped(
                    EnchKind::Corrosion,
                    Enchantment::from_source(1, 0, hit.attacker),
                    MAX_CORROSION,
                );
            }
            let message = visible(state, hit.defender).then(|| {
                format!(
                    "{} {} splashed with acid{}",
                    the_cap(state, hit.defender),
                    conj(hit.defender, "are"),
                    attack_strength_punctuation(special)
                )
            });
            BrandOutcome::damage(special, message)
        }
    }
}

/// Fire and cold: a modest roll scaled by the matching resistance
fn elemental(state: &mut GameState, hit: HitContext, kind: ResistKind, verb: &str) -> BrandOutcome {
    let rating = resist(state, hit.defender, kind);
    let raw = state.rng.uniform(hit.damage_done) / 2 + 1;
    let special = resist_adjust(rating, raw);
    if special <= 0 {
        return BrandOutcome::default();
    }
    let message = visible(state, hit.defender).then(|| {
        format!(
            "{} {} {}{}{}",
            the_cap(state, hit.attacker),
            conj(hit.attacker, verb),
            the(state, hit.defender),
            if rating < 0 { " terribly" } else { "" },
            attack_strength_punctuation(special)
        )
    });
    BrandOutcome::damage(special, message)
}

fn vampirism(state: &mut GameState, hit: HitContext) -> BrandOutcome {
    if hit.damage_done < 1
        || !susceptible_to_vampirism(state, hit.defender)
        || at_full_hp(state, hit.attacker)
        || state.rng.x_chance_in_y(2, 5)
    {
        return BrandOutcome::default();
    }
    let raw = 1 + state.rng.uniform(hit.damage_done);
    let amount = resist_adjust(resist(state, hit.defender, ResistKind::Negative), raw);
    if heal(state, hit.attacker, amount) <= 0 {
        return BrandOutcome::default();
    }
    let message = match (hit.attacker, hit.defender) {
        (Actor::Player, _) => Some("You feel better.".to_string()),
        (_, Actor::Player) => Some(format!(
            "{} draws strength from your wounds!",
            the_cap(state, hit.attacker)
        )),
        _ => visible(state, hit.attacker)
            .then(|| format!("{} is healed.", the_cap(state, hit.attacker))),
    };
    BrandOutcome {
        obvious: message.is_some(),
        message,
        ..Default::default()
    }
}

fn confuse_brand(state: &mut GameState, hit: HitContext) -> BrandOutcome {
    let (chance, duration) = match hit.attacker {
        Actor::Player => {
            let hd = hit_dice(state, hit.defender);
            let pct = (80 * (24 - hd) / 24).max(0);
            let duration = 1 + state.rng.uniform(3 + state.player.xl);
            (state.rng.x_chance_in_y(pct, 100), duration)
        }
        Actor::Monster(_) => {
            let duration = 1 + state.rng.uniform(3 + hit_dice(state, hit.attacker));
            (state.rng.chance_in_n(3), duration)
        }
    };
    if !chance || !confuse(state, hit.defender, hit.attacker, duration) {
        return BrandOutcome::default();
    }
    let message = match hit.defender {
        Actor::Player => Some("You are confused.".to_string()),
        Actor::Monster(_) => visible(state, hit.defender)
            .then(|| format!("{} looks confused.", the_cap(state, hit.defender))),
    };
    BrandOutcome {
        obvious: message.is_some(),
        message,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Species;
    use crate::level::Coord;
    use crate::rng::EngineRng;

    fn hit_on(state: &mut GameState, species: Species, damage: i32) -> HitContext {
        let id = state.spawn(species, Coord::new(11, 10)).unwrap();
        HitContext {
            attacker: Actor::Player,
            defender: Actor::Monster(id),
            damage_done: damage,
            attack_damage: damage,
        }
    }

    #[test]
    fn test_flaming_damage_and_message() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![9]));
        let hit = hit_on(&mut state, Species::Orc, 10);
        let out = apply_brand(&mut state, WeaponBrand::Flaming, hit);
        assert_eq!(out.special_damage, 9 / 2 + 1);
        assert_eq!(out.message.as_deref(), Some("You burn the orc."));
        assert!(out.obvious);
    }

    #[test]
    fn test_freezing_vulnerable_is_terrible() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![9]));
        let hit = hit_on(&mut state, Species::FireGiant, 10);
        let out = apply_brand(&mut state, WeaponBrand::Freezing, hit);
        assert_eq!(out.special_damage, 5 * 3 / 2);
        assert_eq!(out.message.as_deref(), Some("You freeze the fire giant terribly!"));
    }

    #[test]
    fn test_holy_wrath_only_on_evil() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        let orc = hit_on(&mut state, Species::Orc, 10);
        assert_eq!(apply_brand(&mut state, WeaponBrand::HolyWrath, orc), BrandOutcome::default());

        let mut state = GameState::with_rng(EngineRng::scripted(vec![100]));
        let zombie = hit_on(&mut state, Species::Zombie, 10);
        let out = apply_brand(&mut state, WeaponBrand::HolyWrath, zombie);
        assert_eq!(out.special_damage, 1 + 100 / 10);
        assert_eq!(out.message.as_deref(), Some("The zombie convulses!"));
    }

    #[test]
    fn test_holy_wrath_refuses_evil_wielder() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        state.player.species = crate::actor::PlayerSpecies::Demonspawn;
        let zombie = hit_on(&mut state, Species::Zombie, 10);
        assert_eq!(
            apply_brand(&mut state, WeaponBrand::HolyWrath, zombie),
            BrandOutcome::default()
        );
    }

    #[test]
    fn test_electrocution() {
        // 0 passes the 1-in-4, then 12 for the damage
        let mut state = GameState::with_rng(EngineRng::scripted(vec![0, 12]));
        let hit = hit_on(&mut state, Species::Orc, 3);
        let out = apply_brand(&mut state, WeaponBrand::Electrocution, hit);
        assert_eq!(out.special_damage, 20);
        assert_eq!(out.message.as_deref(), Some("Lightning courses through the orc!"));

        let mut state = GameState::with_rng(EngineRng::scripted(vec![0, 12]));
        let insulated = hit_on(&mut state, Species::BlackDraconian, 3);
        assert_eq!(
            apply_brand(&mut state, WeaponBrand::Electrocution, insulated),
            BrandOutcome::default()
        );
    }

    #[test]
    fn test_venom_poisons() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![1, 2, 3]));
        let hit = hit_on(&mut state, Species::Orc, 4);
        let out = apply_brand(&mut state, WeaponBrand::Venom, hit);
        assert_eq!(out.special_damage, 0);
        assert_eq!(out.message.as_deref(), Some("The orc looks ill."));
        let poison = state.actor(hit.defender).unwrap().ench().get(EnchKind::Poison).copied();
        assert_eq!(poison.map(|p| p.duration), Some(6 + 2 + 3));
    }

    #[test]
    fn test_vampirism_heal_is_capped() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![4, 9]));
        state.player.hp = state.player.hp_max - 1;
        let hit = hit_on(&mut state, Species::Orc, 10);
        let out = apply_brand(&mut state, WeaponBrand::Vampirism, hit);
        assert_eq!(state.player.hp, state.player.hp_max);
        assert_eq!(out.message.as_deref(), Some("You feel better."));
    }

    #[test]
    fn test_vampirism_skips_bloodless() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![4, 9]));
        state.player.hp = 5;
        let hit = hit_on(&mut state, Species::Skeleton, 10);
        assert_eq!(apply_brand(&mut state, WeaponBrand::Vampirism, hit), BrandOutcome::default());
        assert_eq!(state.player.hp, 5);
    }

    #[test]
    fn test_acid_corrodes() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![2]));
        let hit = hit_on(&mut state, Species::Orc, 6);
        for _ in 0..6 {
            apply_brand(&mut state, WeaponBrand::Acid, hit);
        }
        let degree = state.actor(hit.defender).unwrap().ench().degree(EnchKind::Corrosion);
        assert_eq!(degree, MAX_CORROSION);
    }

    #[test]
    fn test_confuse_against_plant_fails() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        let hit = hit_on(&mut state, Species::Plant, 6);
        assert_eq!(apply_brand(&mut state, WeaponBrand::Confuse, hit), BrandOutcome::default());
    }

    #[test]
    fn test_confuse_by_player() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![1, 0]));
        let hit = hit_on(&mut state, Species::Orc, 6);
        let out = apply_brand(&mut state, WeaponBrand::Confuse, hit);
        assert!(state.actor(hit.defender).unwrap().confused());
        assert_eq!(out.message.as_deref(), Some("The orc looks confused."));
    }

    #[test]
    fn test_pain_blocked_for_trog() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        state.player.god = crate::god::God::Trog;
        state.player.set_skill(Skill::Necromancy, 10);
        let hit = hit_on(&mut state, Species::Orc, 6);
        assert_eq!(apply_brand(&mut state, WeaponBrand::Pain, hit), BrandOutcome::default());
    }

    #[test]
    fn test_inert_brands() {
        let mut state = GameState::with_rng(EngineRng::scripted(vec![]));
        let hit = hit_on(&mut state, Species::Orc, 6);
        for brand in [WeaponBrand::Speed, WeaponBrand::Vorpal, WeaponBrand::Reaping] {
            assert_eq!(apply_brand(&mut state, brand, hit), BrandOutcome::default());
        }
    }
}
