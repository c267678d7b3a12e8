//! Damage and healing calculators.
//!
//! Every additive term is computed by its own fixed formula and reported
//! in the outcome, so callers (and tests) can assert on each piece rather
//! than only the final number. The critical-hit Bernoulli trial is the
//! only random input; the `_with_rng` variants roll it and defer to the
//! deterministic arithmetic.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::character::round_stat;
use crate::combat::{
    CombatItem, CombatParticipant, CombatSkill, EnvironmentalEffect, EnvironmentalKind, ItemEffect,
    ModifiedStat,
};

/// What is dealing the damage.
#[derive(Debug, Clone, Copy)]
pub enum DamageSource<'a> {
    BasicAttack,
    Skill(&'a CombatSkill),
}

/// What is doing the healing.
#[derive(Debug, Clone, Copy)]
pub enum HealingSource<'a> {
    Skill(&'a CombatSkill),
    Item(&'a CombatItem),
}

/// Full term breakdown of one damage calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageOutcome {
    pub base: i32,
    pub attribute_modifier: i32,
    pub weapon_bonus: i32,
    pub skill_bonus: i32,
    pub status_modifier: i32,
    pub environmental_modifier: i32,
    pub critical: bool,
    pub critical_multiplier: f64,
    /// Sum of the additive terms, before the critical multiplier and
    /// mitigation.
    pub pre_mitigation: i32,
    pub resistance: i32,
    pub armor_reduction: i32,
    pub final_damage: i32,
    /// True iff mitigation absorbed a real hit: final damage is 0 while
    /// the pre-mitigation total was positive.
    pub blocked: bool,
}

/// Full term breakdown of one healing calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealingOutcome {
    pub base: i32,
    pub attribute_modifier: i32,
    pub skill_bonus: i32,
    pub status_modifier: i32,
    pub environmental_modifier: i32,
    /// Sum of the additive terms before clamping to missing health.
    pub total: i32,
    pub final_healing: i32,
    /// Healing discarded because the target was already near full. Always
    /// reported, never silently dropped.
    pub overheal: i32,
}

/// Critical-hit chance for this attacker and source: participant chance
/// plus weapon bonus plus passive effect bonuses, clamped to `[0, 100]`.
pub fn effective_crit_chance(attacker: &CombatParticipant, source: DamageSource<'_>) -> i32 {
    let weapon_bonus = match source {
        DamageSource::BasicAttack => attacker.weapon.as_ref().map_or(0, |w| w.crit_bonus),
        DamageSource::Skill(_) => 0,
    };
    (attacker.crit_chance + weapon_bonus + attacker.passive_modifier(ModifiedStat::CritChance))
        .clamp(0, 100)
}

fn environment_total(environment: &[EnvironmentalEffect], kind: EnvironmentalKind) -> i32 {
    environment
        .iter()
        .filter(|e| e.kind == kind)
        .map(|e| e.value)
        .sum()
}

/// Compute damage with the critical outcome decided by the caller.
///
/// `final = max(0, trunc(pre_mitigation x crit_mult - resistance -
/// armor_reduction))`, with each additive term per its own formula.
pub fn calculate_damage(
    attacker: &CombatParticipant,
    target: &CombatParticipant,
    source: DamageSource<'_>,
    environment: &[EnvironmentalEffect],
    critical: bool,
) -> DamageOutcome {
    let attack = attacker.attack as f64;

    let base = match source {
        DamageSource::BasicAttack => attacker
            .weapon
            .as_ref()
            .map_or_else(|| round_stat(attack * 0.5), |w| w.damage),
        DamageSource::Skill(skill) => skill.power,
    };
    let attribute_modifier = round_stat(attack * 0.1);
    let weapon_bonus = match source {
        DamageSource::BasicAttack => attacker
            .weapon
            .as_ref()
            .map_or(0, |w| round_stat(w.accuracy as f64 * 0.05)),
        DamageSource::Skill(_) => 0,
    };
    let skill_bonus = match source {
        DamageSource::BasicAttack => 0,
        DamageSource::Skill(_) => round_stat(attack * 0.05),
    };
    let status_modifier = attacker.passive_modifier(ModifiedStat::Damage);
    let environmental_modifier = environment_total(environment, EnvironmentalKind::Damage);

    let pre_mitigation = base
        + attribute_modifier
        + weapon_bonus
        + skill_bonus
        + status_modifier
        + environmental_modifier;

    let critical_multiplier = if critical {
        attacker.crit_multiplier
    } else {
        1.0
    };

    let resistance =
        round_stat(target.defense as f64 * 0.5) + target.passive_modifier(ModifiedStat::Defense);
    let armor_reduction = target.armor.as_ref().map_or(0, |a| a.defense);

    let final_damage = ((pre_mitigation as f64 * critical_multiplier)
        - resistance as f64
        - armor_reduction as f64)
        .trunc()
        .max(0.0) as i32;

    DamageOutcome {
        base,
        attribute_modifier,
        weapon_bonus,
        skill_bonus,
        status_modifier,
        environmental_modifier,
        critical,
        critical_multiplier,
        pre_mitigation,
        resistance,
        armor_reduction,
        final_damage,
        blocked: final_damage == 0 && pre_mitigation > 0,
    }
}

/// Compute damage, rolling the critical-hit Bernoulli trial:
/// `rng.gen::<f64>() x 100 < effective_crit_chance`.
pub fn calculate_damage_with_rng<R: Rng>(
    attacker: &CombatParticipant,
    target: &CombatParticipant,
    source: DamageSource<'_>,
    environment: &[EnvironmentalEffect],
    rng: &mut R,
) -> DamageOutcome {
    let critical = rng.gen::<f64>() * 100.0 < effective_crit_chance(attacker, source) as f64;
    calculate_damage(attacker, target, source, environment, critical)
}

/// Compute healing. No critical trial; the result is clamped to the
/// target's missing health and the remainder reported as overheal.
pub fn calculate_healing(
    healer: &CombatParticipant,
    target: &CombatParticipant,
    source: HealingSource<'_>,
    environment: &[EnvironmentalEffect],
) -> HealingOutcome {
    let attack = healer.attack as f64;

    let base = match source {
        HealingSource::Skill(skill) => skill.power,
        HealingSource::Item(item) => match item.effect {
            ItemEffect::RestoreHealth { amount } => amount,
            ItemEffect::RestoreMana { .. } => 0,
        },
    };
    let attribute_modifier = round_stat(attack * 0.1);
    let skill_bonus = match source {
        HealingSource::Skill(_) => round_stat(attack * 0.05),
        HealingSource::Item(_) => 0,
    };
    let status_modifier = healer.passive_modifier(ModifiedStat::Healing);
    let environmental_modifier = environment_total(environment, EnvironmentalKind::Healing);

    let total =
        (base + attribute_modifier + skill_bonus + status_modifier + environmental_modifier).max(0);
    let missing = (target.max_health - target.health).max(0);
    let final_healing = total.min(missing);

    HealingOutcome {
        base,
        attribute_modifier,
        skill_bonus,
        status_modifier,
        environmental_modifier,
        total,
        final_healing,
        overheal: total - final_healing,
    }
}
