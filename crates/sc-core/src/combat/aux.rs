//! Auxiliary unarmed attacks from the player's body
//!
//! After the main swing, mutations and a free off hand can add extra
//! blows: kicks from hooves or talons, headbutts from horns, tail slaps,
//! bites and punches.

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::actor::{DamageKind, Mutation, Player, Skill};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum AuxAttack {
    Kick,
    Headbutt,
    TailSlap,
    Bite,
    Punch,
}

impl AuxAttack {
    pub fn verb(self) -> &'static str {
        match self {
            AuxAttack::Kick => "kick",
            AuxAttack::Headbutt => "headbutt",
            AuxAttack::TailSlap => "tail-slap",
            AuxAttack::Bite => "bite",
            AuxAttack::Punch => "punch",
        }
    }

    fn mutation_level(self, player: &Player) -> i32 {
        match self {
            AuxAttack::Kick => player
                .mutation_level(Mutation::Hooves)
                .max(player.mutation_level(Mutation::Talons)),
            AuxAttack::Headbutt => player.mutation_level(Mutation::Horns),
            AuxAttack::TailSlap => player.mutation_level(Mutation::Tail),
            AuxAttack::Bite => player.mutation_level(Mutation::Fangs),
            AuxAttack::Punch => 0,
        }
    }

    /// Whether the player has the body for this attack
    pub fn is_usable(self, player: &Player) -> bool {
        match self {
            AuxAttack::Punch => player.shield <= 0,
            _ => self.mutation_level(player) > 0,
        }
    }

    /// Percent chance the attack is tried on a given turn
    pub fn chance(self, player: &Player) -> i32 {
        match self {
            AuxAttack::Punch => (10 + 2 * player.skill(Skill::Unarmed)).min(50),
            _ => (20 * self.mutation_level(player)).min(100),
        }
    }

    pub fn base_damage(self, player: &Player) -> i32 {
        let level = self.mutation_level(player);
        match self {
            AuxAttack::Kick => 5 + 2 * level,
            AuxAttack::Headbutt => 5 + 3 * level,
            AuxAttack::TailSlap => 6 + 2 * level,
            AuxAttack::Bite => 1 + 2 * level,
            AuxAttack::Punch => {
                5 + player.skill(Skill::Unarmed) / 2 + 2 * player.mutation_level(Mutation::Claws)
            }
        }
    }

    pub fn damage_kind(self, player: &Player) -> DamageKind {
        match self {
            AuxAttack::Kick if player.mutation_level(Mutation::Talons) > 0 => DamageKind::Piercing,
            AuxAttack::Headbutt | AuxAttack::Bite => DamageKind::Piercing,
            AuxAttack::Punch if player.mutation_level(Mutation::Claws) > 0 => DamageKind::Claws,
            _ => DamageKind::Crushing,
        }
    }
}

/// Every aux attack the player's body allows, in firing order
pub fn available_aux_attacks(player: &Player) -> Vec<AuxAttack> {
    AuxAttack::iter().filter(|a| a.is_usable(player)).collect()
}
