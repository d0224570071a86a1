//! The melee attack state machine
//!
//! One [`MeleeAttack`] resolves a full round between two adjacent actors.
//! A round is a list of blows: the player's weapon hand and any auxiliary
//! body attacks, or a monster's intrinsic attacks in order. Each blow goes
//! through to-hit, block, hit and damaged phases; deaths are settled
//! between blows and the round stops as soon as either side falls.

use crate::actor::{
    Actor, AttackKind, Combatant, DamageKind, Desc, EnchKind, Enchantment, Holiness, MonAttack,
    MonsterId, Mutation, Player, Skill, Species, SpeciesFlags,
};
use crate::attitude;
use crate::brand::{self, AttackFlavour, HitContext, Special, WeaponBrand, attack_strength_punctuation};
use crate::consts::{ATTACK_ENERGY, AUTOMATIC_HIT, SHIELD_BLOCKS_PER_TURN};
use crate::effects;
use crate::level::Terrain;
use crate::message::{Channel, capitalize, third_person};
use crate::rng::RandomSource;
use crate::state::GameState;

use super::aux::{AuxAttack, available_aux_attacks};
use super::damage::{
    apply_ac, attack_noise, monster_damage, player_damage, stab_damage, unarmed_damage,
};
use super::death;
use super::decap::{self, is_claw_attack};
use super::to_hit::{
    PHASE_SHIFT_EV, can_see, defender_ev, evasion_margin_adverb, monster_to_hit, phase_shifts,
    player_to_hit, stab_bonus, test_hit,
};
use super::verbs::{monster_attack_verb, player_attack_verb};

/// Which body part or weapon a blow comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Blow {
    /// The player's weapon hand, armed or not
    Main,
    Aux(AuxAttack),
    /// A monster's intrinsic attack, the first hit using its weapon
    Natural { attack: MonAttack, with_weapon: bool },
}

/// Everything about a blow that is fixed before the dice roll
#[derive(Debug, Clone, Copy)]
struct BlowProfile {
    blow: Blow,
    damage_kind: DamageKind,
    brand: WeaponBrand,
    flavour: AttackFlavour,
    skill: Skill,
    /// Nominal damage before any roll
    base_damage: i32,
    plus: i32,
    weapon_to_hit: i32,
    weapon_noise: i32,
    stab_weapon: bool,
    monster_claw: bool,
}

impl BlowProfile {
    fn plain(blow: Blow) -> Self {
        Self {
            blow,
            damage_kind: DamageKind::Crushing,
            brand: WeaponBrand::None,
            flavour: AttackFlavour::Plain,
            skill: Skill::Unarmed,
            base_damage: 0,
            plus: 0,
            weapon_to_hit: 0,
            weapon_noise: 0,
            stab_weapon: false,
            monster_claw: false,
        }
    }

    fn is_aux(&self) -> bool {
        matches!(self.blow, Blow::Aux(_))
    }
}

/// Flavours that act even when armour soaked the whole hit
fn flavour_triggers_damageless(flavour: AttackFlavour) -> bool {
    matches!(
        flavour,
        AttackFlavour::Crush
            | AttackFlavour::Engulf
            | AttackFlavour::PureFire
            | AttackFlavour::Drown
            | AttackFlavour::Corrode
    )
}

/// One round of melee between two actors
#[derive(Debug, Clone)]
pub struct MeleeAttack {
    pub attacker: Actor,
    pub defender: Actor,
    confirmed: bool,
    /// Whether any blow was rolled
    pub attack_occurred: bool,
    /// Whether any blow connected
    pub did_hit: bool,
    /// Stopped before anything happened
    pub cancelled: bool,
    /// Hit points taken from the defender, brand damage included
    pub total_damage: i32,
    blows_fired: usize,
    finished: bool,
}

impl MeleeAttack {
    pub fn new(attacker: Actor, defender: Actor) -> Self {
        Self {
            attacker,
            defender,
            confirmed: false,
            attack_occurred: false,
            did_hit: false,
            cancelled: false,
            total_damage: 0,
            blows_fired: 0,
            finished: false,
        }
    }

    /// Skip the refusal to strike monsters that leave the player alone
    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    /// Run the round. Returns whether any blow was actually rolled.
    pub fn attack(&mut self, state: &mut GameState) -> bool {
        if !self.handle_phase_attempted(state) {
            effects::run_effects(state);
            return false;
        }

        let blows = self.plan_blows(state);
        log::debug!(
            "{:?} attacks {:?} with {} blow(s)",
            self.attacker,
            self.defender,
            blows.len()
        );

        for profile in blows {
            if self.finished || !self.in_reach(state) {
                break;
            }
            if let Blow::Aux(aux) = profile.blow {
                let chance = aux.chance(&state.player);
                if state.rng.uniform(100) >= chance {
                    continue;
                }
            }
            self.attack_occurred = true;
            self.resolve_blow(state, &profile);
            self.blows_fired += 1;
            if self.handle_phase_killed(state) {
                break;
            }
        }

        self.handle_phase_end(state);
        effects::run_effects(state);
        self.attack_occurred
    }

    fn in_reach(&self, state: &GameState) -> bool {
        if !state.is_alive(self.attacker) || !state.is_alive(self.defender) {
            return false;
        }
        match (state.actor_pos(self.attacker), state.actor_pos(self.defender)) {
            (Some(a), Some(d)) => a.is_adjacent(d),
            _ => false,
        }
    }

    /// Whether the player gets to hear about this round
    fn observed(&self, state: &GameState) -> bool {
        self.attacker.is_player()
            || self.defender.is_player()
            || state.player_can_see(self.attacker)
            || state.player_can_see(self.defender)
            || state.options.verbose
    }

    fn say(&self, state: &mut GameState, text: String) {
        if self.observed(state) {
            state.msg(Channel::Combat, text);
        }
    }

    // Attempted

    fn handle_phase_attempted(&mut self, state: &mut GameState) -> bool {
        if !self.in_reach(state) {
            self.cancelled = true;
            return false;
        }

        if self.attacker.is_player()
            && !self.confirmed
            && let Actor::Monster(id) = self.defender
            && state.monster(id).is_some_and(|m| m.wont_attack())
        {
            let name = the(state, self.defender);
            state.msg(Channel::Plain, format!("You refrain from attacking {name}."));
            self.cancelled = true;
            return false;
        }

        spend_energy(state, self.attacker);

        if let Actor::Monster(id) = self.attacker
            && state.monster(id).is_some_and(|m| m.confused())
            && aligned(state, self.attacker, self.defender)
            && state.rng.coin_flip()
        {
            self.redirect_in_confusion(state, id);
        }

        if self.fumbles(state) {
            if state.rng.chance_in_n(10) {
                effects::chaos_affects_actor(state, self.attacker);
            }
            return false;
        }
        true
    }

    /// A confused monster lashes out at whoever is nearest
    fn redirect_in_confusion(&mut self, state: &GameState, id: MonsterId) {
        let Some(pos) = state.actor_pos(self.attacker) else {
            return;
        };
        if let Some(target) = pos.neighbours().find_map(|c| state.actor_at(c)) {
            log::debug!("confused {id:?} turns on {target:?}");
            self.defender = target;
        }
    }

    fn fumbles(&self, state: &mut GameState) -> bool {
        let confused = state.actor(self.attacker).is_some_and(|a| a.confused());
        let floundering = self.attacker.is_player()
            && !state.player.flying
            && state.level().terrain(state.player.pos) == Terrain::ShallowWater;

        if floundering && state.rng.chance_in_n(40) {
            state.msg(
                Channel::Combat,
                "Unstable footing causes you to fumble your attack.",
            );
            return true;
        }
        if confused && state.rng.chance_in_n(15) {
            let text = format!(
                "{} {} {} attack.",
                the_cap(state, self.attacker),
                conj(self.attacker, "fumble"),
                its(self.attacker)
            );
            self.say(state, text);
            return true;
        }
        false
    }

    // Planning

    fn plan_blows(&self, state: &GameState) -> Vec<BlowProfile> {
        match self.attacker {
            Actor::Player => {
                let mut blows = vec![player_main_blow(state)];
                let aux_target = self
                    .defender
                    .monster_id()
                    .and_then(|id| state.monster(id))
                    .is_some_and(|m| !m.friendly());
                if state.options.aux_attacks && aux_target {
                    blows.extend(
                        available_aux_attacks(&state.player)
                            .into_iter()
                            .map(|aux| player_aux_blow(&state.player, aux)),
                    );
                }
                blows
            }
            Actor::Monster(id) => state.monster(id).map_or_else(Vec::new, |mon| {
                let mut weapon = mon.weapon;
                let mut blows = Vec::new();
                for attack in mon.species.info().attacks.iter().filter(|a| a.is_active()) {
                    let with_weapon = attack.kind == AttackKind::Hit && weapon.is_some();
                    let mut profile = BlowProfile::plain(Blow::Natural {
                        attack: *attack,
                        with_weapon,
                    });
                    profile.flavour = attack.flavour;
                    profile.base_damage = attack.damage;
                    profile.damage_kind = natural_damage_kind(attack.kind);
                    profile.monster_claw = is_claw_attack(attack.kind);
                    if with_weapon && let Some(w) = weapon.take() {
                        let info = w.kind.info();
                        profile.damage_kind = info.damage_kind;
                        profile.brand = w.brand;
                        profile.plus = w.plus;
                        profile.weapon_to_hit = info.to_hit + w.plus;
                        profile.weapon_noise = info.noise;
                        profile.base_damage += info.damage;
                    }
                    blows.push(profile);
                }
                blows
            }),
        }
    }

    // One blow: to-hit, block, hit or dodge

    fn resolve_blow(&mut self, state: &mut GameState, profile: &BlowProfile) {
        let first_natural = self.blows_fired == 0 && !profile.is_aux();

        let stab = if self.attacker.is_player() && profile.blow == Blow::Main {
            stab_bonus(state, self.defender)
        } else {
            0
        };

        let to_hit = self.roll_to_hit(state, profile);
        let margin = if stab > 0 {
            AUTOMATIC_HIT
        } else {
            let ev = defender_ev(state, self.defender);
            let auto = state.options.auto_hit_miss_percent;
            test_hit(&mut state.rng, to_hit, ev, !self.attacker.is_player(), auto)
        };
        log::trace!("blow {:?}: to-hit {to_hit}, margin {margin}", profile.blow);

        if margin > 0 && margin < AUTOMATIC_HIT && self.attempt_shield_block(state, to_hit) {
            // blocked outright
        } else if margin > 0 {
            let pos = state.actor_pos(self.defender);
            let dealt = self.handle_phase_hit(state, profile, stab);
            if stab == 0
                && let Some(pos) = pos
            {
                state.noisy(pos, attack_noise(dealt, profile.weapon_noise), self.attacker);
            }
        } else {
            self.handle_phase_dodged(state, margin);
        }

        if first_natural {
            self.do_spines(state);
        }
    }

    fn roll_to_hit(&self, state: &mut GameState, profile: &BlowProfile) -> i32 {
        match (self.attacker, profile.blow) {
            (Actor::Player, Blow::Aux(_)) => player_to_hit(state, self.defender, Skill::Unarmed, 0),
            (Actor::Player, _) => {
                player_to_hit(state, self.defender, profile.skill, profile.weapon_to_hit)
            }
            (Actor::Monster(id), _) => {
                monster_to_hit(state, id, self.defender, profile.weapon_to_hit)
            }
        }
    }

    fn attempt_shield_block(&mut self, state: &mut GameState, to_hit: i32) -> bool {
        let Some(def) = state.actor(self.defender) else {
            return false;
        };
        let bonus = def.shield_bonus();
        if bonus <= 0 || def.incapacitated() {
            return false;
        }
        if shield_blocks(state, self.defender) >= SHIELD_BLOCKS_PER_TURN {
            return false;
        }

        let pro_block = if can_see(state, self.defender, self.attacker) {
            bonus
        } else {
            bonus / 3
        };
        let con_block = state.rng.uniform(to_hit.max(0) + 15);
        if pro_block < con_block {
            return false;
        }

        count_shield_block(state, self.defender);
        let text = format!(
            "{} {} {} attack.",
            the_cap(state, self.defender),
            conj(self.defender, "block"),
            possessive(state, self.attacker)
        );
        self.say(state, text);
        true
    }

    // Hit

    /// Returns the damage that got through armour
    fn handle_phase_hit(&mut self, state: &mut GameState, profile: &BlowProfile, stab: i32) -> i32 {
        self.did_hit = true;
        let (rolled, max_damage) = self.roll_damage(state, profile);

        let mut damage = rolled;
        if stab > 0 {
            self.announce_stab(state, stab);
            let bonus = stab + i32::from(profile.stab_weapon);
            damage = stab_damage(damage, bonus, profile.stab_weapon);
        }
        let damage = apply_ac(state, self.defender, damage, max_damage);

        if damage > 0 || flavour_triggers_damageless(profile.flavour) {
            self.handle_phase_damaged(state, profile, damage);
        } else {
            let text = format!(
                "{} {} {} but {} no damage.",
                the_cap(state, self.attacker),
                conj(self.attacker, "hit"),
                the(state, self.defender),
                conj(self.attacker, "do")
            );
            self.say(state, text);
            self.apply_specials(state, profile, 0);
        }
        damage
    }

    fn roll_damage(&self, state: &mut GameState, profile: &BlowProfile) -> (i32, i32) {
        match (self.attacker, profile.blow) {
            (Actor::Player, Blow::Aux(_)) => {
                let dmg = player_damage(state, profile.base_damage, Skill::Unarmed, 0);
                (dmg, profile.base_damage)
            }
            (Actor::Player, _) => {
                let dmg = player_damage(state, profile.base_damage, profile.skill, profile.plus);
                (dmg, profile.base_damage)
            }
            (Actor::Monster(id), Blow::Natural { attack, with_weapon }) => {
                monster_damage(state, id, self.defender, attack, with_weapon)
            }
            (Actor::Monster(_), _) => (0, 0),
        }
    }

    fn announce_stab(&self, state: &mut GameState, stab: i32) {
        let name = the(state, self.defender);
        let text = match stab {
            4 => format!("You catch {name} completely off-guard!"),
            3 => format!("You strike {name} from a blind spot!"),
            2 => format!("You catch {name} momentarily off-guard."),
            _ => format!("{} fails to defend itself.", capitalize(&name)),
        };
        state.msg(Channel::Combat, text);
    }

    // Damaged

    fn handle_phase_damaged(&mut self, state: &mut GameState, profile: &BlowProfile, damage: i32) {
        if damage > 0 && self.shroud_deflects(state, damage) {
            return;
        }

        self.announce_hit(state, profile, damage);
        self.bleed(state, damage);
        let woke_orc = self.wake_defender(state);

        self.total_damage += inflict(state, self.defender, self.attacker, damage);

        if let Actor::Monster(id) = self.defender
            && damage > 0
            && state.is_alive(self.defender)
            && decap::can_lose_heads(state, self.defender)
            && decap::attack_chops_heads(
                state,
                self.attacker,
                damage,
                profile.damage_kind,
                profile.monster_claw,
            )
        {
            decap::decapitate(state, self.attacker, id, profile.damage_kind, profile.brand);
        }

        self.apply_specials(state, profile, damage);

        if !self.finished && profile.flavour == AttackFlavour::Trample {
            self.knockback(state);
        }

        if damage > 0 {
            self.reflect_with_scales(state, damage);
        }

        if woke_orc && let Actor::Monster(id) = self.defender {
            attitude::beogh_follower_convert(state, id, true);
        }
    }

    /// A shrouded defender may turn the blow aside entirely
    fn shroud_deflects(&mut self, state: &mut GameState, damage: i32) -> bool {
        if !state
            .actor(self.defender)
            .is_some_and(|d| d.has_ench(EnchKind::Shroud))
        {
            return false;
        }
        if state.rng.chance_in_n(3) {
            return false;
        }

        let owner = capitalize(&possessive(state, self.defender));
        let whose = possessive(state, self.attacker);
        let text = format!("{owner} shroud bends {whose} attack away!");
        self.say(state, text);

        if state.rng.x_chance_in_y(damage, 10 + damage) {
            if let Some(def) = state.actor_mut(self.defender) {
                def.ench_mut().remove(EnchKind::Shroud);
            }
            let text = format!("{owner} shroud falls apart!");
            self.say(state, text);
        }
        true
    }

    fn announce_hit(&self, state: &mut GameState, profile: &BlowProfile, damage: i32) {
        let verb = match (self.attacker, profile.blow) {
            (Actor::Player, Blow::Main) => player_attack_verb(
                profile.damage_kind,
                damage,
                state.player.weapon.is_none(),
            )
            .to_string(),
            (Actor::Player, Blow::Aux(aux)) => aux.verb().to_string(),
            (actor, Blow::Natural { attack, .. }) => {
                monster_attack_verb(attack.kind, actor.is_player())
            }
            (Actor::Monster(_), _) => "hits".to_string(),
        };
        let text = format!(
            "{} {} {}{}",
            the_cap(state, self.attacker),
            verb,
            the(state, self.defender),
            attack_strength_punctuation(damage)
        );
        self.say(state, text);
    }

    fn bleed(&self, state: &mut GameState, damage: i32) {
        let Some(def) = state.actor(self.defender) else {
            return;
        };
        if damage <= 0 || !def.can_bleed() || def.is_summoned() {
            return;
        }
        let (pos, amount) = (def.pos(), damage.min(def.hp()));
        state.level_mut().bleed(pos, amount);
    }

    /// A hit rouses a sleeping monster. Returns whether it was an orc
    /// woken by the player.
    fn wake_defender(&self, state: &mut GameState) -> bool {
        let Actor::Monster(id) = self.defender else {
            return false;
        };
        let Some(mon) = state.monster_mut(id) else {
            return false;
        };
        if mon.ench.remove(EnchKind::Sleep).is_none() {
            return false;
        }
        self.attacker.is_player() && mon.species.is_orc()
    }

    fn apply_specials(&mut self, state: &mut GameState, profile: &BlowProfile, damage: i32) {
        let brand = profile.brand;
        if brand != WeaponBrand::None
            && (damage > 0 || !brand.needs_damage())
            && (state.is_alive(self.defender) || brand.acts_on_corpse())
        {
            self.run_special(state, Special::Brand(brand), damage, profile.base_damage);
        }

        let flavour = profile.flavour;
        if !self.finished
            && !matches!(flavour, AttackFlavour::Plain | AttackFlavour::Trample)
            && (damage > 0 || flavour_triggers_damageless(flavour))
            && (state.is_alive(self.defender) || flavour.acts_on_corpse())
        {
            self.run_special(state, Special::Flavour(flavour), damage, profile.base_damage);
        }
    }

    fn run_special(&mut self, state: &mut GameState, special: Special, damage: i32, base: i32) {
        if state.actor(self.defender).is_none() {
            return;
        }
        let hit = HitContext {
            attacker: self.attacker,
            defender: self.defender,
            damage_done: damage,
            attack_damage: base,
        };
        let outcome = brand::apply(state, special, hit);
        if let Some(text) = outcome.message {
            state.msg(Channel::Combat, text);
        }
        if outcome.special_damage > 0 {
            self.total_damage += inflict(state, self.defender, self.attacker, outcome.special_damage);
        }
        if outcome.terminal {
            log::debug!("{special:?} ended the round");
            self.finished = true;
        }
    }

    /// Push the defender one step back, the attacker following
    fn knockback(&mut self, state: &mut GameState) {
        if !state.is_alive(self.defender) {
            return;
        }
        let (Some(from), Some(at)) = (state.actor_pos(self.attacker), state.actor_pos(self.defender))
        else {
            return;
        };
        let stationary = self
            .defender
            .monster_id()
            .and_then(|id| state.monster(id))
            .is_some_and(|m| m.is_stationary());
        let dest = at.away_from(from);

        if stationary || !state.is_free(dest) {
            let text = format!(
                "{} {} {} ground!",
                the_cap(state, self.defender),
                conj(self.defender, "hold"),
                its(self.defender)
            );
            self.say(state, text);
            return;
        }

        if let Some(def) = state.actor_mut(self.defender) {
            def.set_pos(dest);
        }
        if let Some(atk) = state.actor_mut(self.attacker) {
            atk.set_pos(at);
        }
        let text = format!(
            "{} {} backwards!",
            the_cap(state, self.defender),
            conj(self.defender, "stumble")
        );
        self.say(state, text);
    }

    fn reflect_with_scales(&mut self, state: &mut GameState, damage: i32) {
        if !self.defender.is_player() || !state.is_alive(self.attacker) {
            return;
        }
        let level = state.player.mutation_level(Mutation::ReflectiveScales);
        if level <= 0 || !state.rng.x_chance_in_y(level, 4) {
            return;
        }
        let reflected = state.rng.uniform(damage * level / 4);
        if reflected <= 0 {
            return;
        }
        let text = format!(
            "Your scales reflect {} attack back at {}{}",
            possessive(state, self.attacker),
            the(state, self.attacker),
            attack_strength_punctuation(reflected)
        );
        state.msg(Channel::Combat, text);
        inflict(state, self.attacker, self.defender, reflected);
    }

    // Dodged

    fn handle_phase_dodged(&mut self, state: &mut GameState, margin: i32) {
        if phase_shifts(state, self.defender) && margin + PHASE_SHIFT_EV > 0 {
            let text = format!(
                "{} {} {}.",
                the_cap(state, self.attacker),
                conj(self.attacker, "pass through"),
                the(state, self.defender)
            );
            self.say(state, text);
        } else {
            let text = format!(
                "{}{} {} {}.",
                the_cap(state, self.attacker),
                evasion_margin_adverb(margin),
                conj(self.attacker, "miss"),
                the(state, self.defender)
            );
            self.say(state, text);
        }

        if has_horns(state, self.defender)
            && state.is_alive(self.attacker)
            && state.rng.chance_in_n(3)
        {
            self.minotaur_retaliation(state);
        }
    }

    fn minotaur_retaliation(&mut self, state: &mut GameState) {
        let raw = match self.defender {
            Actor::Player => {
                let horns = state.player.mutation_level(Mutation::Horns);
                state.rng.uniform(5 + 3 * horns)
            }
            Actor::Monster(_) => state.rng.uniform(21),
        };
        let hurt = apply_ac(state, self.attacker, raw, raw);

        let who = the_cap(state, self.defender);
        let text = format!("{who} furiously {}!", conj(self.defender, "retaliate"));
        self.say(state, text);

        let target = the(state, self.attacker);
        let headbutt = conj(self.defender, "headbutt");
        if hurt <= 0 {
            let text = format!(
                "{who} {headbutt} {target}, but {} no damage.",
                conj(self.defender, "do")
            );
            self.say(state, text);
            return;
        }
        let text = format!("{who} {headbutt} {target}{}", attack_strength_punctuation(hurt));
        self.say(state, text);
        inflict(state, self.attacker, self.defender, hurt);
    }

    /// A spiny defender pricks whoever swings at it
    fn do_spines(&mut self, state: &mut GameState) {
        let level = match self.defender {
            Actor::Player => state.player.mutation_level(Mutation::Spiny),
            Actor::Monster(id) => {
                if state
                    .monster(id)
                    .is_some_and(|m| m.species.has_flag(SpeciesFlags::SPINY))
                {
                    3
                } else {
                    0
                }
            }
        };
        if level <= 0 || !state.is_alive(self.attacker) {
            return;
        }
        if !state.rng.x_chance_in_y(level * 5, 100) {
            return;
        }

        let hd = state.actor(self.defender).map_or(0, |d| d.hit_dice());
        let max = level * 5 + hd / 2;
        let raw = state.rng.uniform(max);
        let hurt = apply_ac(state, self.attacker, raw, max);
        if hurt <= 0 {
            return;
        }
        let text = format!(
            "{} {} struck by {} spines.",
            the_cap(state, self.attacker),
            conj(self.attacker, "are"),
            possessive(state, self.defender)
        );
        self.say(state, text);
        inflict(state, self.attacker, self.defender, hurt);
    }

    // Killed

    /// Settle any deaths. Returns whether the round is over.
    fn handle_phase_killed(&mut self, state: &mut GameState) -> bool {
        let reaping = state
            .actor(self.attacker)
            .and_then(|a| a.weapon())
            .is_some_and(|w| w.brand == WeaponBrand::Reaping);

        let mut over = false;
        for (victim, killer) in [(self.defender, self.attacker), (self.attacker, self.defender)] {
            if !state.actor(victim).is_some_and(|a| a.hp() <= 0) {
                continue;
            }
            over = true;
            match victim {
                Actor::Player => death::player_died(state, Some(killer)),
                Actor::Monster(id) => {
                    let reaped = reaping && victim == self.defender;
                    death::monster_died(state, id, Some(killer), reaped);
                }
            }
        }
        over
    }

    // End

    fn handle_phase_end(&mut self, state: &mut GameState) {
        if self.attack_occurred {
            self.emit_foul_stench(state);
        }

        if let Actor::Monster(id) = self.defender
            && self.attack_occurred
            && let Some(mon) = state.monster_mut(id)
            && mon.hp > 0
        {
            if mon.wont_attack() {
                mon.ench.remove(EnchKind::Sleep);
            } else {
                mon.alert(Some(self.attacker));
            }
        }
    }

    fn emit_foul_stench(&mut self, state: &mut GameState) {
        let Actor::Monster(id) = self.attacker else {
            return;
        };
        if !self.defender.is_player() || !self.in_reach(state) {
            return;
        }
        let level = state.player.mutation_level(Mutation::FoulStench);
        if level <= 0 {
            return;
        }
        let natural = state
            .monster(id)
            .is_some_and(|m| m.holiness() == Holiness::Natural && !m.confused());
        if !natural || !state.rng.x_chance_in_y(level * 5, 100) {
            return;
        }
        let duration = 2 + state.rng.uniform(4);
        if let Some(mon) = state.monster_mut(id) {
            mon.ench.add(
                EnchKind::Confusion,
                Enchantment::from_source(1, duration, Actor::Player),
            );
        }
        state.monster_msg(id, " chokes on your stench!", Channel::MonsterEnchant);
    }
}

/// Resolve one melee round from `attacker` against `defender`
pub fn fight_melee(state: &mut GameState, attacker: Actor, defender: Actor) -> bool {
    MeleeAttack::new(attacker, defender).attack(state)
}

fn player_main_blow(state: &GameState) -> BlowProfile {
    let player = &state.player;
    let mut profile = BlowProfile::plain(Blow::Main);
    match player.weapon {
        Some(w) => {
            let info = w.kind.info();
            profile.damage_kind = info.damage_kind;
            profile.brand = w.brand;
            profile.skill = info.skill;
            profile.base_damage = info.damage;
            profile.plus = w.plus;
            profile.weapon_to_hit = info.to_hit + w.plus;
            profile.weapon_noise = info.noise;
            profile.stab_weapon = w.kind.is_stab_weapon();
        }
        None => {
            if player.mutation_level(Mutation::Claws) > 0 {
                profile.damage_kind = DamageKind::Claws;
            }
            profile.base_damage = unarmed_damage(state);
        }
    }
    profile
}

fn player_aux_blow(player: &Player, aux: AuxAttack) -> BlowProfile {
    let mut profile = BlowProfile::plain(Blow::Aux(aux));
    profile.damage_kind = aux.damage_kind(player);
    profile.base_damage = aux.base_damage(player);
    profile
}

fn natural_damage_kind(kind: AttackKind) -> DamageKind {
    match kind {
        AttackKind::Bite | AttackKind::Sting | AttackKind::Headbutt => DamageKind::Piercing,
        AttackKind::Claw => DamageKind::Claws,
        _ => DamageKind::Crushing,
    }
}

fn spend_energy(state: &mut GameState, actor: Actor) {
    match actor {
        Actor::Player => state.player.energy -= ATTACK_ENERGY,
        Actor::Monster(id) => {
            if let Some(mon) = state.monster_mut(id) {
                mon.energy -= ATTACK_ENERGY;
            }
        }
    }
}

/// Whether two actors fight on the same side
fn aligned(state: &GameState, a: Actor, b: Actor) -> bool {
    let friendly = |actor: Actor| match actor {
        Actor::Player => true,
        Actor::Monster(id) => state.monster(id).is_some_and(|m| m.friendly()),
    };
    friendly(a) == friendly(b)
}

fn has_horns(state: &GameState, actor: Actor) -> bool {
    match actor {
        Actor::Player => state.player.mutation_level(Mutation::Horns) > 0,
        Actor::Monster(id) => state
            .monster(id)
            .is_some_and(|m| m.species == Species::Minotaur),
    }
}

fn shield_blocks(state: &GameState, actor: Actor) -> u8 {
    match actor {
        Actor::Player => state.player.shield_blocks,
        Actor::Monster(id) => state.monster(id).map_or(0, |m| m.shield_blocks),
    }
}

fn count_shield_block(state: &mut GameState, actor: Actor) {
    match actor {
        Actor::Player => state.player.shield_blocks += 1,
        Actor::Monster(id) => {
            if let Some(mon) = state.monster_mut(id) {
                mon.shield_blocks += 1;
            }
        }
    }
}

/// Hurt `victim`, crediting `source`. Returns the hit points taken.
fn inflict(state: &mut GameState, victim: Actor, source: Actor, amount: i32) -> i32 {
    let taken = state.actor_mut(victim).map_or(0, |a| a.hurt(amount));
    if let Actor::Monster(id) = victim
        && let Some(mon) = state.monster_mut(id)
    {
        mon.last_hit_by = Some(source);
    }
    taken
}

fn the(state: &GameState, actor: Actor) -> String {
    state.actor_name(actor, Desc::The)
}

fn the_cap(state: &GameState, actor: Actor) -> String {
    capitalize(&the(state, actor))
}

fn conj(actor: Actor, verb: &str) -> String {
    if actor.is_player() {
        verb.to_string()
    } else {
        third_person(verb)
    }
}

fn possessive(state: &GameState, actor: Actor) -> String {
    if actor.is_player() {
        "your".to_string()
    } else {
        format!("{}'s", the(state, actor))
    }
}

fn its(actor: Actor) -> &'static str {
    if actor.is_player() { "your" } else { "its" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Attitude;
    use crate::item::{Weapon, WeaponKind};
    use crate::level::Coord;
    use crate::options::EngineOptions;

    const NEXT_TO_PLAYER: Coord = Coord::new(11, 10);

    fn sturdy_player(state: &mut GameState) {
        state.player.hp = 10_000;
        state.player.hp_max = 10_000;
    }

    fn sturdy(state: &mut GameState, id: MonsterId) {
        let mon = state.monster_mut(id).unwrap();
        mon.hp = 10_000;
        mon.max_hp = 10_000;
    }

    fn reset_turn(state: &mut GameState) {
        state.player.shield_blocks = 0;
        for mon in state.level_mut().monsters.iter_mut() {
            mon.shield_blocks = 0;
        }
    }

    #[test]
    fn test_refrain_from_friendly() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        state.set_attitude(id, Attitude::Friendly);
        let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id));
        assert!(!attack.attack(&mut state));
        assert!(attack.cancelled);
        assert_eq!(state.player.energy, 0);
        assert!(state.messages.contains("You refrain from attacking the orc."));
    }

    #[test]
    fn test_confirmed_attack_on_friendly() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        state.set_attitude(id, Attitude::Friendly);
        let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id)).confirmed();
        assert!(attack.attack(&mut state));
        assert_eq!(state.player.energy, -ATTACK_ENERGY);
    }

    #[test]
    fn test_out_of_reach() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, Coord::new(13, 10)).unwrap();
        assert!(!fight_melee(&mut state, Actor::Player, Actor::Monster(id)));
        assert_eq!(state.player.energy, 0);
    }

    #[test]
    fn test_dead_defender_not_attacked() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        state.monster_mut(id).unwrap().hp = 0;
        assert!(!fight_melee(&mut state, Actor::Player, Actor::Monster(id)));
    }

    #[test]
    fn test_monster_spends_energy() {
        let mut state = GameState::new(42);
        sturdy_player(&mut state);
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        fight_melee(&mut state, Actor::Monster(id), Actor::Player);
        assert_eq!(state.monster(id).unwrap().energy, -ATTACK_ENERGY);
    }

    #[test]
    fn test_stab_kills_sleeping_orc() {
        let mut state = GameState::new(42);
        state.player.weapon = Some(Weapon::new(WeaponKind::Dagger));
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        let orc = state.monster_mut(id).unwrap();
        orc.hp = 1;
        orc.ench.add(EnchKind::Sleep, Enchantment::new(1, 100));

        let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id));
        assert!(attack.attack(&mut state));
        assert!(attack.did_hit);
        assert!(state.messages.contains("You catch the orc completely off-guard!"));
        assert!(state.messages.contains("You kill the orc!"));
        assert!(state.monster(id).is_none());
        assert!(state.noises.is_empty());
    }

    #[test]
    fn test_hp_never_negative() {
        for seed in 0..50 {
            let mut state = GameState::new(seed);
            state.player.weapon = Some(Weapon::new(WeaponKind::GreatSword));
            state.player.strength = 30;
            let id = state.spawn(Species::Goblin, NEXT_TO_PLAYER).unwrap();
            let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id));
            attack.attack(&mut state);
            if let Some(mon) = state.monster(id) {
                assert!(mon.hp > 0);
            }
            assert!(attack.total_damage >= 0);
        }
    }

    #[test]
    fn test_rounds_both_hit_and_miss() {
        let mut state = GameState::new(7);
        sturdy_player(&mut state);
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        let (mut hits, mut misses) = (0, 0);
        for _ in 0..100 {
            let mut attack = MeleeAttack::new(Actor::Monster(id), Actor::Player);
            attack.attack(&mut state);
            if attack.did_hit {
                hits += 1;
            } else {
                misses += 1;
            }
        }
        assert!(hits > 0 && misses > 0, "hits {hits} misses {misses}");
        assert!(state.player.hp < 10_000);
    }

    #[test]
    fn test_big_shield_blocks() {
        let mut state = GameState::new(3).with_options(EngineOptions {
            auto_hit_miss_percent: 0,
            ..EngineOptions::default()
        });
        sturdy_player(&mut state);
        state.player.shield = 200;
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        for _ in 0..30 {
            reset_turn(&mut state);
            fight_melee(&mut state, Actor::Monster(id), Actor::Player);
        }
        assert_eq!(state.player.hp, 10_000);
        assert!(state.messages.contains("You block the orc's attack."));
    }

    #[test]
    fn test_shield_tires() {
        let mut state = GameState::new(3).with_options(EngineOptions {
            auto_hit_miss_percent: 0,
            ..EngineOptions::default()
        });
        sturdy_player(&mut state);
        state.player.shield = 200;
        state.player.shield_blocks = SHIELD_BLOCKS_PER_TURN;
        let id = state.spawn(Species::Troll, NEXT_TO_PLAYER).unwrap();
        for _ in 0..30 {
            fight_melee(&mut state, Actor::Monster(id), Actor::Player);
        }
        assert!(!state.messages.contains("You block"));
        assert!(state.player.hp < 10_000);
    }

    #[test]
    fn test_phase_shift_passes_through() {
        let mut state = GameState::new(11);
        let id = state.spawn(Species::Phantom, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        for _ in 0..100 {
            fight_melee(&mut state, Actor::Player, Actor::Monster(id));
        }
        assert!(state.messages.contains("You pass through the phantom."));
    }

    #[test]
    fn test_spines_prick_attacker() {
        let mut state = GameState::new(5);
        sturdy_player(&mut state);
        let id = state.spawn(Species::SpinyFrog, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        for _ in 0..150 {
            fight_melee(&mut state, Actor::Player, Actor::Monster(id));
        }
        assert!(state.messages.contains("You are struck by the spiny frog's spines."));
    }

    #[test]
    fn test_aux_headbutt() {
        let mut state = GameState::new(9);
        state.player.set_mutation(Mutation::Horns, 5);
        let id = state.spawn(Species::Troll, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        for _ in 0..60 {
            fight_melee(&mut state, Actor::Player, Actor::Monster(id));
        }
        assert!(state.messages.contains("You headbutt the troll"));
    }

    #[test]
    fn test_aux_disabled_by_option() {
        let mut state = GameState::new(9).with_options(EngineOptions {
            aux_attacks: false,
            ..EngineOptions::default()
        });
        state.player.set_mutation(Mutation::Horns, 5);
        let id = state.spawn(Species::Troll, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        for _ in 0..60 {
            fight_melee(&mut state, Actor::Player, Actor::Monster(id));
        }
        assert!(!state.messages.contains("headbutt"));
    }

    #[test]
    fn test_hydra_loses_heads() {
        let mut state = GameState::new(13);
        state.player.weapon = Some(Weapon::new(WeaponKind::BattleAxe));
        state.player.strength = 30;
        let id = state.spawn(Species::Hydra, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        for _ in 0..80 {
            fight_melee(&mut state, Actor::Player, Actor::Monster(id));
        }
        assert!(state.messages.contains("heads off!"));
    }

    #[test]
    fn test_minotaur_retaliates() {
        let mut state = GameState::new(17);
        sturdy_player(&mut state);
        state.player.ev = 40;
        state.player.set_mutation(Mutation::Horns, 3);
        let id = state.spawn(Species::Goblin, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        for _ in 0..100 {
            fight_melee(&mut state, Actor::Monster(id), Actor::Player);
        }
        assert!(state.messages.contains("You furiously retaliate!"));
    }

    #[test]
    fn test_trample_knockback() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Orc, NEXT_TO_PLAYER).unwrap();
        let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id));
        attack.knockback(&mut state);
        assert_eq!(state.monster(id).unwrap().pos, Coord::new(12, 10));
        assert_eq!(state.player.pos, NEXT_TO_PLAYER);
        assert!(state.messages.contains("The orc stumbles backwards!"));
    }

    #[test]
    fn test_stationary_holds_ground() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Plant, NEXT_TO_PLAYER).unwrap();
        let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id));
        attack.knockback(&mut state);
        assert_eq!(state.monster(id).unwrap().pos, NEXT_TO_PLAYER);
        assert!(state.messages.contains("The plant holds its ground!"));
    }

    #[test]
    fn test_noise_recorded_on_hit() {
        let mut state = GameState::new(21);
        state.player.weapon = Some(Weapon::new(WeaponKind::Mace));
        let id = state.spawn(Species::Troll, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        let mut landed = false;
        for _ in 0..40 {
            let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id));
            attack.attack(&mut state);
            landed |= attack.total_damage > 0;
        }
        assert!(landed);
        assert!(!state.noises.is_empty());
        assert!(state.noises.iter().all(|n| (1..=12).contains(&n.loudness)));
    }

    #[test]
    fn test_absorbed_hit_still_noisy() {
        let mut state = GameState::new(21);
        state.player.weapon = Some(Weapon::new(WeaponKind::Mace));
        let id = state.spawn(Species::Troll, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        {
            let troll = state.monster_mut(id).unwrap();
            troll.ac = 100_000;
            troll.ev = 0;
        }
        let mut landed = false;
        for _ in 0..40 {
            let mut attack = MeleeAttack::new(Actor::Player, Actor::Monster(id));
            attack.attack(&mut state);
            if attack.did_hit {
                landed = true;
                assert_eq!(attack.total_damage, 0);
                break;
            }
        }
        assert!(landed);
        assert!(!state.noises.is_empty());
        assert!(state.noises.iter().all(|n| n.loudness >= 1));
    }

    #[test]
    fn test_defender_alerted() {
        let mut state = GameState::new(42);
        let id = state.spawn(Species::Troll, NEXT_TO_PLAYER).unwrap();
        sturdy(&mut state, id);
        state.monster_mut(id).unwrap().foe = None;
        fight_melee(&mut state, Actor::Player, Actor::Monster(id));
        assert_eq!(state.monster(id).unwrap().foe, Some(Actor::Player));
    }

    #[test]
    fn test_killer_monster_ends_round() {
        let mut state = GameState::new(42);
        state.player.hp = 1;
        state.player.hp_max = 1;
        state.player.ac = 0;
        state.player.ev = 0;
        let id = state.spawn(Species::Minotaur, NEXT_TO_PLAYER).unwrap();
        for _ in 0..20 {
            fight_melee(&mut state, Actor::Monster(id), Actor::Player);
            if state.player.hp <= 0 {
                break;
            }
        }
        assert_eq!(state.player.hp, 0);
        assert!(state.messages.contains("You die..."));
    }
}
