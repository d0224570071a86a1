//! Damage rolls and armour

use crate::actor::{Actor, Combatant, EnchKind, MonAttack, MonsterId, Mutation, Skill};
use crate::consts::MAX_ATTACK_LOUDNESS;
use crate::rng::RandomSource;
use crate::state::GameState;

/// Armour class after corrosion
pub fn effective_ac(state: &GameState, defender: Actor) -> i32 {
    state.actor(defender).map_or(0, |d| {
        (d.ac() - d.ench().degree(EnchKind::Corrosion)).max(0)
    })
}

/// Reduce `damage` by the defender's armour.
///
/// Armour saves a random amount up to its class. Guaranteed damage
/// reduction raises the floor of that saving in proportion to the
/// attack's maximum damage, but never past half the armour class.
pub fn apply_ac(state: &mut GameState, defender: Actor, damage: i32, max_damage: i32) -> i32 {
    let ac = effective_ac(state, defender);
    if ac <= 0 {
        return damage.max(0);
    }
    let gdr = state.actor(defender).map_or(0, |d| d.gdr());

    let mut saved = state.rng.uniform(1 + ac);
    let guaranteed = (gdr * max_damage / 100).min(ac / 2);
    saved = saved.max(guaranteed);

    (damage - saved).max(0)
}

/// Scale damage by the attacker's temporary strength
fn strength_effects(state: &GameState, attacker: Actor, damage: i32) -> i32 {
    let Some(atk) = state.actor(attacker) else {
        return damage;
    };
    let mut damage = damage;
    if atk.has_ench(EnchKind::Might) || atk.has_ench(EnchKind::Berserk) {
        damage = damage * 3 / 2;
    }
    if atk.has_ench(EnchKind::Weak) {
        damage = damage * 2 / 3;
    }
    damage
}

/// Base damage of the player's bare hands
pub fn unarmed_damage(state: &GameState) -> i32 {
    let p = &state.player;
    3 + p.skill(Skill::Unarmed) / 3 + 2 * p.mutation_level(Mutation::Claws)
}

/// Roll the player's melee damage from `potential`, the base damage of the
/// weapon or body part in use.
pub fn player_damage(state: &mut GameState, potential: i32, skill: Skill, plus: i32) -> i32 {
    let strength = state.player.strength;
    let fighting = state.player.skill(Skill::Fighting);
    let weapon_skill = state.player.skill(skill);
    let slaying = state.player.slaying;

    // Strength
    let potential = (potential * (30 + strength) / 40).max(1);
    let mut damage = state.rng.uniform(potential + 1);

    // Weapon skill
    let roll = state.rng.uniform(weapon_skill * 100 + 1);
    damage = damage * (2500 + roll) / 2500;

    // Fighting skill
    let roll = state.rng.uniform(fighting * 100 + 1);
    damage = damage * (3000 + roll) / 3000;

    // Enchantment and slaying bonuses
    let bonus = plus + slaying;
    if bonus > 0 {
        damage += state.rng.uniform(bonus + 1);
    } else if bonus < 0 {
        damage -= state.rng.uniform(1 - bonus);
    }

    strength_effects(state, Actor::Player, damage).max(0)
}

/// Roll a monster attack's damage.
///
/// Returns the rolled damage and the most it could have been, which
/// feeds guaranteed damage reduction.
pub fn monster_damage(
    state: &mut GameState,
    attacker: MonsterId,
    defender: Actor,
    attack: MonAttack,
    with_weapon: bool,
) -> (i32, i32) {
    let weapon = if with_weapon {
        state.monster(attacker).and_then(|m| m.weapon)
    } else {
        None
    };

    let mut damage = 0;
    let mut max_damage = attack.damage;
    if let Some(w) = weapon {
        let wdam = w.kind.info().damage;
        damage += state.rng.uniform(wdam) + w.plus;
        max_damage += wdam;
    }
    damage += 1 + state.rng.uniform(attack.damage);

    damage = strength_effects(state, Actor::Monster(attacker), damage);

    // Sleeping defenders take a beating
    if let Actor::Monster(id) = defender
        && state.monster(id).is_some_and(|m| m.asleep())
    {
        damage = damage * 5 / 2;
    }

    (damage.max(0), max_damage)
}

/// Multiply damage for a stab of the given bonus level
pub fn stab_damage(damage: i32, bonus: i32, stab_weapon: bool) -> i32 {
    if bonus <= 0 {
        return damage;
    }
    let damage = damage.max(1);
    if stab_weapon {
        damage * (1 + bonus)
    } else {
        damage * ((bonus + 1) / 2).max(1)
    }
}

/// Loudness of a hit: harder hits and noisier weapons carry further
pub fn attack_noise(damage: i32, weapon_noise: i32) -> i32 {
    (damage / 4 + weapon_noise).clamp(1, MAX_ATTACK_LOUDNESS)
}
