//! Attack verbs

use crate::actor::{AttackKind, DamageKind};
use crate::message::third_person;

const HIT_WEAK: i32 = 7;
const HIT_MED: i32 = 18;
const HIT_STRONG: i32 = 36;

/// The verb for a player hit, graded by damage
pub fn player_attack_verb(kind: DamageKind, damage: i32, unarmed: bool) -> &'static str {
    let tier = match damage {
        d if d < HIT_WEAK => 0,
        d if d < HIT_MED => 1,
        d if d < HIT_STRONG => 2,
        _ => 3,
    };
    let table: [&str; 4] = match kind {
        DamageKind::Piercing => ["hit", "puncture", "impale", "skewer"],
        DamageKind::Slicing => ["hit", "slash", "slice", "open up"],
        DamageKind::Chopping => ["hit", "chop", "hack", "cleave"],
        DamageKind::Crushing if unarmed => ["punch", "smack", "pound", "crush"],
        DamageKind::Crushing => ["hit", "smack", "pound", "crush"],
        DamageKind::Claws => ["scratch", "claw", "mangle", "eviscerate"],
    };
    table[tier]
}

/// A monster attack verb conjugated for its subject
pub fn monster_attack_verb(kind: AttackKind, attacker_is_player: bool) -> String {
    let verb = kind.verb();
    if attacker_is_player {
        verb.to_string()
    } else {
        third_person(verb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbs_grow_with_damage() {
        assert_eq!(player_attack_verb(DamageKind::Slicing, 3, false), "hit");
        assert_eq!(player_attack_verb(DamageKind::Slicing, 10, false), "slash");
        assert_eq!(player_attack_verb(DamageKind::Slicing, 20, false), "slice");
        assert_eq!(player_attack_verb(DamageKind::Slicing, 40, false), "open up");
        assert_eq!(player_attack_verb(DamageKind::Chopping, 40, false), "cleave");
    }

    #[test]
    fn test_unarmed_verbs() {
        assert_eq!(player_attack_verb(DamageKind::Crushing, 2, true), "punch");
        assert_eq!(player_attack_verb(DamageKind::Claws, 2, true), "scratch");
    }

    #[test]
    fn test_monster_verbs() {
        assert_eq!(monster_attack_verb(AttackKind::Bite, false), "bites");
        assert_eq!(monster_attack_verb(AttackKind::Bite, true), "bite");
    }
}
