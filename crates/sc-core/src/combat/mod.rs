//! Melee combat
//!
//! Implements player-vs-monster, monster-vs-player, and monster-vs-monster
//! melee. [`MeleeAttack`] drives a round; the submodules hold the rolls,
//! verbs and follow-ups it is built from.

mod aux;
mod damage;
mod death;
mod decap;
mod resolver;
mod to_hit;
mod verbs;

pub use aux::{AuxAttack, available_aux_attacks};
pub use damage::{
    apply_ac, attack_noise, effective_ac, monster_damage, player_damage, stab_damage,
    unarmed_damage,
};
pub use death::{monster_died, player_died};
pub use decap::{Decapitation, attack_chops_heads, can_lose_heads, decapitate, is_claw_attack};
pub use resolver::{MeleeAttack, fight_melee};
pub use to_hit::{
    PHASE_SHIFT_EV, can_see, defender_ev, evasion_margin_adverb, monster_to_hit, phase_shifts,
    player_to_hit, stab_bonus, test_hit,
};
pub use verbs::{monster_attack_verb, player_attack_verb};
