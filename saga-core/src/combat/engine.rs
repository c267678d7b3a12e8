//! Action validation and resolution state machine.
//!
//! [`CombatEngine::process_action`] is the single entry point for a turn:
//! validate the intended action, execute it on a copy of the state, check
//! end conditions, and advance the turn. Validation failures are expected
//! game flow and come back as [`ActionRejection`] values, never errors.
//!
//! Randomness (crit rolls, flee rolls, the one-time initiative roll) and
//! the wall clock (the `time_limit` defeat condition) are always injected,
//! so every path is callable deterministically from a test.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::character::round_stat;
use crate::combat::damage::{
    calculate_damage_with_rng, calculate_healing, DamageOutcome, DamageSource, HealingOutcome,
    HealingSource,
};
use crate::combat::{
    ActionRecord, CombatAction, CombatActionKind, CombatItem, CombatOutcome, CombatParticipant,
    CombatPhase, CombatSkill, CombatState, DefeatCondition, EnvironmentalEffect, ItemEffect,
    ModifiedStat, ParticipantKind, Position, SkillKind, StatusApplication, StatusEffect,
    TargetRule, TickTiming, VictoryCondition,
};

/// Flee chance bounds and speed scaling.
const FLEE_BASE_CHANCE: f64 = 0.5;
const FLEE_SPEED_FACTOR: f64 = 0.02;
const FLEE_MIN_CHANCE: f64 = 0.05;
const FLEE_MAX_CHANCE: f64 = 0.95;

/// Why an action was refused. Expected game flow, surfaced to the player,
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionRejection {
    CombatOver,
    UnknownActor(String),
    ActorDefeated(String),
    NotYourTurn {
        actor_id: String,
        current_turn_id: String,
    },
    InsufficientActionPoints {
        required: u32,
        available: u32,
    },
    InsufficientMana {
        required: i32,
        available: i32,
    },
    MissingTarget,
    UnknownTarget(String),
    CannotTargetSelf,
    CannotTargetSameKind,
    TargetDefeated(String),
    MissingSkill,
    UnknownSkill(String),
    SkillOnCooldown {
        skill_id: String,
        remaining: u32,
    },
    InvalidSkillTarget {
        rule: TargetRule,
    },
    MissingItem,
    UnknownItem(String),
    ItemExhausted(String),
    MissingDestination,
}

impl fmt::Display for ActionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionRejection::CombatOver => write!(f, "the encounter is already over"),
            ActionRejection::UnknownActor(id) => write!(f, "no participant '{id}'"),
            ActionRejection::ActorDefeated(id) => write!(f, "'{id}' is defeated and cannot act"),
            ActionRejection::NotYourTurn {
                actor_id,
                current_turn_id,
            } => write!(f, "it is '{current_turn_id}'s turn, not '{actor_id}'s"),
            ActionRejection::InsufficientActionPoints {
                required,
                available,
            } => write!(f, "needs {required} action points, {available} available"),
            ActionRejection::InsufficientMana {
                required,
                available,
            } => write!(f, "needs {required} mana, {available} available"),
            ActionRejection::MissingTarget => write!(f, "a target is required"),
            ActionRejection::UnknownTarget(id) => write!(f, "no target '{id}'"),
            ActionRejection::CannotTargetSelf => write!(f, "cannot target yourself"),
            ActionRejection::CannotTargetSameKind => {
                write!(f, "cannot attack a participant of the same kind")
            }
            ActionRejection::TargetDefeated(id) => write!(f, "'{id}' is already defeated"),
            ActionRejection::MissingSkill => write!(f, "a skill id is required"),
            ActionRejection::UnknownSkill(id) => write!(f, "unknown skill '{id}'"),
            ActionRejection::SkillOnCooldown { skill_id, remaining } => {
                write!(f, "'{skill_id}' is on cooldown for {remaining} more turns")
            }
            ActionRejection::InvalidSkillTarget { rule } => {
                write!(f, "target not legal for targeting rule {rule:?}")
            }
            ActionRejection::MissingItem => write!(f, "an item id is required"),
            ActionRejection::UnknownItem(id) => write!(f, "no item '{id}' carried"),
            ActionRejection::ItemExhausted(id) => write!(f, "no '{id}' remaining"),
            ActionRejection::MissingDestination => write!(f, "a destination is required"),
        }
    }
}

/// A status effect applied as part of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedEffect {
    pub name: String,
    pub application: StatusApplication,
}

/// What a successfully executed action did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Attack {
        target_id: String,
        damage: DamageOutcome,
        target_defeated: bool,
    },
    Skill {
        skill_id: String,
        target_id: String,
        damage: Option<DamageOutcome>,
        healing: Option<HealingOutcome>,
        applied_effect: Option<AppliedEffect>,
        target_defeated: bool,
    },
    Item {
        item_id: String,
        target_id: String,
        healing: Option<HealingOutcome>,
        mana_restored: Option<i32>,
    },
    Defended {
        defense_bonus: i32,
    },
    Moved {
        from: Position,
        to: Position,
    },
    FleeAttempt {
        chance: f64,
        escaped: bool,
    },
    Waited,
}

/// How and when the encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatEnd {
    pub outcome: CombatOutcome,
    pub round: u32,
}

/// Result of one call to [`CombatEngine::process_action`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatTurnResult {
    pub success: bool,
    pub rejection: Option<ActionRejection>,
    /// The new state snapshot. On rejection this is an unchanged copy of
    /// the input.
    pub state: CombatState,
    pub action_result: Option<ActionOutcome>,
    pub combat_end: Option<CombatEnd>,
    /// Whose side holds the turn next; absent once the encounter ends.
    pub next_phase: Option<CombatPhase>,
}

/// Resolved resource costs for a validated action.
struct ActionCosts {
    action_points: u32,
    mana: i32,
}

/// Everything validation resolved, snapshotted so execution never has to
/// re-look anything up.
struct ValidatedAction {
    costs: ActionCosts,
    actor: CombatParticipant,
    target_id: Option<String>,
    skill: Option<CombatSkill>,
    item: Option<CombatItem>,
}

/// The combat resolution engine. Stateless; every call takes the full
/// encounter state and returns a new snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatEngine;

impl CombatEngine {
    pub fn new() -> Self {
        CombatEngine
    }

    /// Roll initiative: `speed + random() x 20` per participant, sorted
    /// descending. Called once at encounter start, never mid-combat.
    pub fn calculate_initiative_with_rng<R: Rng>(
        &self,
        participants: &[CombatParticipant],
        rng: &mut R,
    ) -> Vec<String> {
        let mut rolls: Vec<(String, f64)> = participants
            .iter()
            .map(|p| (p.id.clone(), p.speed as f64 + rng.gen::<f64>() * 20.0))
            .collect();
        rolls.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        rolls.into_iter().map(|(id, _)| id).collect()
    }

    pub fn calculate_initiative(&self, participants: &[CombatParticipant]) -> Vec<String> {
        self.calculate_initiative_with_rng(participants, &mut rand::thread_rng())
    }

    /// Open an encounter: roll initiative, set round 1, and hand the first
    /// actor a full turn of action points.
    pub fn start_encounter_with_rng<R: Rng>(
        &self,
        participants: Vec<CombatParticipant>,
        victory_conditions: Vec<VictoryCondition>,
        defeat_conditions: Vec<DefeatCondition>,
        environment: Vec<EnvironmentalEffect>,
        started_at: u64,
        rng: &mut R,
    ) -> CombatState {
        let turn_order = self.calculate_initiative_with_rng(&participants, rng);
        let current_turn_id = turn_order.first().cloned().unwrap_or_default();
        let mut state = CombatState {
            id: Uuid::new_v4(),
            participants,
            turn_order,
            current_turn_id: current_turn_id.clone(),
            round: 1,
            victory_conditions,
            defeat_conditions,
            environment,
            action_history: Vec::new(),
            started_at,
            active: true,
            outcome: None,
        };
        if let Some(first) = state.participant_mut(&current_turn_id) {
            first.action_points = first.max_action_points;
        }
        state
    }

    pub fn start_encounter(
        &self,
        participants: Vec<CombatParticipant>,
        victory_conditions: Vec<VictoryCondition>,
        defeat_conditions: Vec<DefeatCondition>,
        environment: Vec<EnvironmentalEffect>,
        started_at: u64,
    ) -> CombatState {
        self.start_encounter_with_rng(
            participants,
            victory_conditions,
            defeat_conditions,
            environment,
            started_at,
            &mut rand::thread_rng(),
        )
    }

    /// Process one action: validate, execute on a copy, check end
    /// conditions, advance the turn.
    pub fn process_action_with_rng<R: Rng>(
        &self,
        state: &CombatState,
        action: &CombatAction,
        now_seconds: u64,
        rng: &mut R,
    ) -> CombatTurnResult {
        let plan = match self.validate(state, action) {
            Ok(plan) => plan,
            Err(rejection) => {
                return CombatTurnResult {
                    success: false,
                    rejection: Some(rejection),
                    state: state.clone(),
                    action_result: None,
                    combat_end: None,
                    next_phase: Some(state.phase()),
                };
            }
        };

        let mut next = state.clone();
        let (outcome, summary) = self.execute(&mut next, action, &plan, rng);

        if let Some(actor) = next.participant_mut(&action.actor_id) {
            actor.action_points = actor.action_points.saturating_sub(plan.costs.action_points);
            actor.mana = (actor.mana - plan.costs.mana).max(0);
        }
        next.action_history.push(ActionRecord {
            id: Uuid::new_v4(),
            round: next.round,
            actor_id: action.actor_id.clone(),
            action: action.clone(),
            summary,
        });

        let fled = matches!(outcome, ActionOutcome::FleeAttempt { escaped: true, .. });
        let mut end = if fled {
            Some(CombatOutcome::Fled)
        } else {
            check_end_conditions(&next, now_seconds)
        };

        if end.is_none() {
            advance_turn(&mut next);
            // Start/end-turn ticks can defeat someone; re-check.
            end = check_end_conditions(&next, now_seconds);
        }

        if let Some(outcome) = end {
            next.active = false;
            next.outcome = Some(outcome);
        }

        CombatTurnResult {
            success: true,
            rejection: None,
            combat_end: end.map(|outcome| CombatEnd {
                outcome,
                round: next.round,
            }),
            next_phase: if next.active { Some(next.phase()) } else { None },
            action_result: Some(outcome),
            state: next,
        }
    }

    pub fn process_action(
        &self,
        state: &CombatState,
        action: &CombatAction,
        now_seconds: u64,
    ) -> CombatTurnResult {
        self.process_action_with_rng(state, action, now_seconds, &mut rand::thread_rng())
    }

    fn validate(
        &self,
        state: &CombatState,
        action: &CombatAction,
    ) -> Result<ValidatedAction, ActionRejection> {
        if !state.active {
            return Err(ActionRejection::CombatOver);
        }
        let actor = state
            .participant(&action.actor_id)
            .ok_or_else(|| ActionRejection::UnknownActor(action.actor_id.clone()))?;
        if !actor.is_alive() {
            return Err(ActionRejection::ActorDefeated(actor.id.clone()));
        }
        if state.current_turn_id != action.actor_id {
            return Err(ActionRejection::NotYourTurn {
                actor_id: action.actor_id.clone(),
                current_turn_id: state.current_turn_id.clone(),
            });
        }

        let mut costs = ActionCosts {
            action_points: action.action_point_cost,
            mana: action.mana_cost.unwrap_or(0),
        };
        let mut target_id = None;
        let mut skill = None;
        let mut item = None;

        match action.kind {
            CombatActionKind::Attack => {
                let id = action
                    .target_id
                    .as_deref()
                    .ok_or(ActionRejection::MissingTarget)?;
                let target = state
                    .participant(id)
                    .ok_or_else(|| ActionRejection::UnknownTarget(id.to_string()))?;
                if target.id == actor.id {
                    return Err(ActionRejection::CannotTargetSelf);
                }
                if target.kind == actor.kind {
                    return Err(ActionRejection::CannotTargetSameKind);
                }
                if !target.is_alive() {
                    return Err(ActionRejection::TargetDefeated(target.id.clone()));
                }
                target_id = Some(target.id.clone());
            }
            CombatActionKind::Skill => {
                let skill_id = action
                    .skill_id
                    .as_deref()
                    .ok_or(ActionRejection::MissingSkill)?;
                let known = actor
                    .skill(skill_id)
                    .ok_or_else(|| ActionRejection::UnknownSkill(skill_id.to_string()))?;
                if let Some(&remaining) = actor.cooldowns.get(skill_id) {
                    if remaining > 0 {
                        return Err(ActionRejection::SkillOnCooldown {
                            skill_id: skill_id.to_string(),
                            remaining,
                        });
                    }
                }
                let target = self.validate_skill_target(state, actor, known, action)?;
                costs.action_points = known.action_point_cost;
                costs.mana = action.mana_cost.unwrap_or(known.mana_cost);
                target_id = Some(target);
                skill = Some(known.clone());
            }
            CombatActionKind::Item => {
                let item_id = action
                    .item_id
                    .as_deref()
                    .ok_or(ActionRejection::MissingItem)?;
                let carried = actor
                    .item(item_id)
                    .ok_or_else(|| ActionRejection::UnknownItem(item_id.to_string()))?;
                if carried.quantity == 0 {
                    return Err(ActionRejection::ItemExhausted(item_id.to_string()));
                }
                let id = action.target_id.clone().unwrap_or_else(|| actor.id.clone());
                if state.participant(&id).is_none() {
                    return Err(ActionRejection::UnknownTarget(id));
                }
                target_id = Some(id);
                item = Some(carried.clone());
            }
            CombatActionKind::Move => {
                if action.target_position.is_none() {
                    return Err(ActionRejection::MissingDestination);
                }
            }
            CombatActionKind::Defend | CombatActionKind::Flee | CombatActionKind::Wait => {}
        }

        if actor.action_points < costs.action_points {
            return Err(ActionRejection::InsufficientActionPoints {
                required: costs.action_points,
                available: actor.action_points,
            });
        }
        if actor.mana < costs.mana {
            return Err(ActionRejection::InsufficientMana {
                required: costs.mana,
                available: actor.mana,
            });
        }

        Ok(ValidatedAction {
            costs,
            actor: actor.clone(),
            target_id,
            skill,
            item,
        })
    }

    /// Resolve and check a skill's target against its declared rule.
    fn validate_skill_target(
        &self,
        state: &CombatState,
        actor: &CombatParticipant,
        skill: &CombatSkill,
        action: &CombatAction,
    ) -> Result<String, ActionRejection> {
        let target_id = match (skill.target_type, action.target_id.as_deref()) {
            // Self-targeting rules reject any other target id outright.
            (TargetRule::SelfOnly, Some(id)) if id != actor.id => {
                return Err(ActionRejection::InvalidSkillTarget {
                    rule: skill.target_type,
                });
            }
            (TargetRule::SelfOnly, _) => actor.id.clone(),
            (TargetRule::Any, None) => actor.id.clone(),
            (_, Some(id)) => id.to_string(),
            (_, None) => return Err(ActionRejection::MissingTarget),
        };

        let target = state
            .participant(&target_id)
            .ok_or_else(|| ActionRejection::UnknownTarget(target_id.clone()))?;

        let legal = match skill.target_type {
            TargetRule::SelfOnly => true,
            TargetRule::SingleAlly => target.kind.side() == actor.kind.side(),
            TargetRule::SingleEnemy => target.kind.side() != actor.kind.side(),
            TargetRule::Any => true,
        };
        if !legal {
            return Err(ActionRejection::InvalidSkillTarget {
                rule: skill.target_type,
            });
        }
        // Damage must land on someone standing; healing may raise the
        // fallen.
        if skill.kind == SkillKind::Damage && !target.is_alive() {
            return Err(ActionRejection::TargetDefeated(target.id.clone()));
        }
        Ok(target_id)
    }

    fn execute<R: Rng>(
        &self,
        next: &mut CombatState,
        action: &CombatAction,
        plan: &ValidatedAction,
        rng: &mut R,
    ) -> (ActionOutcome, String) {
        match action.kind {
            CombatActionKind::Attack => self.execute_attack(next, plan, rng),
            CombatActionKind::Skill => self.execute_skill(next, plan, rng),
            CombatActionKind::Item => self.execute_item(next, plan),
            CombatActionKind::Defend => self.execute_defend(next, plan),
            CombatActionKind::Move => {
                let to = action.target_position.unwrap_or_default();
                let from = plan.actor.position;
                if let Some(actor) = next.participant_mut(&plan.actor.id) {
                    actor.position = to;
                }
                (
                    ActionOutcome::Moved { from, to },
                    format!("{} moves to ({}, {})", plan.actor.name, to.x, to.y),
                )
            }
            CombatActionKind::Flee => self.execute_flee(next, plan, rng),
            CombatActionKind::Wait => (
                ActionOutcome::Waited,
                format!("{} waits", plan.actor.name),
            ),
        }
    }

    fn execute_attack<R: Rng>(
        &self,
        next: &mut CombatState,
        plan: &ValidatedAction,
        rng: &mut R,
    ) -> (ActionOutcome, String) {
        let target_id = plan.target_id.clone().unwrap_or_default();
        let Some(target) = next.participant(&target_id).cloned() else {
            return (ActionOutcome::Waited, "target vanished".to_string());
        };
        let damage = calculate_damage_with_rng(
            &plan.actor,
            &target,
            DamageSource::BasicAttack,
            &next.environment,
            rng,
        );
        let mut target_defeated = false;
        if let Some(target) = next.participant_mut(&target_id) {
            target.apply_damage(damage.final_damage);
            target_defeated = !target.is_alive();
        }
        let summary = format!(
            "{} attacks {} for {} damage{}",
            plan.actor.name,
            target.name,
            damage.final_damage,
            if damage.critical { " (critical)" } else { "" },
        );
        (
            ActionOutcome::Attack {
                target_id,
                damage,
                target_defeated,
            },
            summary,
        )
    }

    fn execute_skill<R: Rng>(
        &self,
        next: &mut CombatState,
        plan: &ValidatedAction,
        rng: &mut R,
    ) -> (ActionOutcome, String) {
        let target_id = plan.target_id.clone().unwrap_or_default();
        let Some(skill) = plan.skill.clone() else {
            return (ActionOutcome::Waited, "skill vanished".to_string());
        };
        let Some(target) = next.participant(&target_id).cloned() else {
            return (ActionOutcome::Waited, "target vanished".to_string());
        };

        let mut damage = None;
        let mut healing = None;
        match skill.kind {
            SkillKind::Damage => {
                let outcome = calculate_damage_with_rng(
                    &plan.actor,
                    &target,
                    DamageSource::Skill(&skill),
                    &next.environment,
                    rng,
                );
                if let Some(target) = next.participant_mut(&target_id) {
                    target.apply_damage(outcome.final_damage);
                }
                damage = Some(outcome);
            }
            SkillKind::Healing => {
                let outcome = calculate_healing(
                    &plan.actor,
                    &target,
                    HealingSource::Skill(&skill),
                    &next.environment,
                );
                if let Some(target) = next.participant_mut(&target_id) {
                    target.apply_healing(outcome.final_healing);
                }
                healing = Some(outcome);
            }
        }

        let mut applied_effect = None;
        let mut target_defeated = false;
        if let Some(target) = next.participant_mut(&target_id) {
            target_defeated = !target.is_alive();
            if let Some(effect) = skill.applies_effect.clone() {
                if target.is_alive() {
                    let name = effect.name.clone();
                    let application = target.apply_status(effect);
                    applied_effect = Some(AppliedEffect { name, application });
                }
            }
        }
        if skill.cooldown > 0 {
            if let Some(actor) = next.participant_mut(&plan.actor.id) {
                actor.cooldowns.insert(skill.id.clone(), skill.cooldown);
            }
        }

        let summary = match (&damage, &healing) {
            (Some(d), _) => format!(
                "{} uses {} on {} for {} damage",
                plan.actor.name, skill.name, target.name, d.final_damage
            ),
            (_, Some(h)) => format!(
                "{} uses {} on {}, restoring {} health",
                plan.actor.name, skill.name, target.name, h.final_healing
            ),
            _ => format!("{} uses {}", plan.actor.name, skill.name),
        };
        (
            ActionOutcome::Skill {
                skill_id: skill.id,
                target_id,
                damage,
                healing,
                applied_effect,
                target_defeated,
            },
            summary,
        )
    }

    fn execute_item(
        &self,
        next: &mut CombatState,
        plan: &ValidatedAction,
    ) -> (ActionOutcome, String) {
        let target_id = plan.target_id.clone().unwrap_or_default();
        let Some(item) = plan.item.clone() else {
            return (ActionOutcome::Waited, "item vanished".to_string());
        };
        let Some(target) = next.participant(&target_id).cloned() else {
            return (ActionOutcome::Waited, "target vanished".to_string());
        };

        if let Some(actor) = next.participant_mut(&plan.actor.id) {
            if let Some(carried) = actor.items.iter_mut().find(|i| i.id == item.id) {
                carried.quantity = carried.quantity.saturating_sub(1);
            }
        }

        let mut healing = None;
        let mut mana_restored = None;
        match item.effect {
            ItemEffect::RestoreHealth { .. } => {
                let outcome = calculate_healing(
                    &plan.actor,
                    &target,
                    HealingSource::Item(&item),
                    &next.environment,
                );
                if let Some(target) = next.participant_mut(&target_id) {
                    target.apply_healing(outcome.final_healing);
                }
                healing = Some(outcome);
            }
            ItemEffect::RestoreMana { amount } => {
                if let Some(target) = next.participant_mut(&target_id) {
                    mana_restored = Some(target.restore_mana(amount));
                }
            }
        }

        let summary = format!("{} uses {} on {}", plan.actor.name, item.name, target.name);
        (
            ActionOutcome::Item {
                item_id: item.id,
                target_id,
                healing,
                mana_restored,
            },
            summary,
        )
    }

    /// Defend: a one-turn flat defense buff worth half the actor's
    /// defense, expiring at the start of their next turn.
    fn execute_defend(
        &self,
        next: &mut CombatState,
        plan: &ValidatedAction,
    ) -> (ActionOutcome, String) {
        let defense_bonus = round_stat(plan.actor.defense as f64 * 0.5);
        if let Some(actor) = next.participant_mut(&plan.actor.id) {
            actor.apply_status(
                StatusEffect::new("defending", 1, TickTiming::StartTurn)
                    .with_modifier(ModifiedStat::Defense, defense_bonus),
            );
        }
        (
            ActionOutcome::Defended { defense_bonus },
            format!("{} takes a defensive stance", plan.actor.name),
        )
    }

    /// Flee: a speed-based escape attempt against the mean speed of living
    /// opponents. Success ends the encounter as [`CombatOutcome::Fled`].
    fn execute_flee<R: Rng>(
        &self,
        next: &mut CombatState,
        plan: &ValidatedAction,
        rng: &mut R,
    ) -> (ActionOutcome, String) {
        let opposing: Vec<i32> = next
            .participants
            .iter()
            .filter(|p| p.kind.side() != plan.actor.kind.side() && p.is_alive())
            .map(|p| p.speed)
            .collect();
        let mean_speed = if opposing.is_empty() {
            plan.actor.speed as f64
        } else {
            opposing.iter().sum::<i32>() as f64 / opposing.len() as f64
        };
        let chance = (FLEE_BASE_CHANCE + FLEE_SPEED_FACTOR * (plan.actor.speed as f64 - mean_speed))
            .clamp(FLEE_MIN_CHANCE, FLEE_MAX_CHANCE);
        let escaped = rng.gen::<f64>() < chance;
        let summary = if escaped {
            format!("{} escapes the battle", plan.actor.name)
        } else {
            format!("{} fails to escape", plan.actor.name)
        };
        (ActionOutcome::FleeAttempt { chance, escaped }, summary)
    }
}

/// Evaluate end predicates: victory conditions first, then defeat, each
/// list in declared order. The first match wins and short-circuits.
fn check_end_conditions(state: &CombatState, now_seconds: u64) -> Option<CombatOutcome> {
    for condition in &state.victory_conditions {
        let met = match condition {
            VictoryCondition::DefeatAllEnemies => !state
                .participants
                .iter()
                .any(|p| p.kind == ParticipantKind::Enemy && p.health > 0),
            VictoryCondition::SurviveTurns { rounds } => state.round >= *rounds,
        };
        if met {
            return Some(CombatOutcome::Victory(*condition));
        }
    }
    for condition in &state.defeat_conditions {
        let met = match condition {
            DefeatCondition::PlayerDeath => !state
                .participants
                .iter()
                .any(|p| p.kind == ParticipantKind::Player && p.health > 0),
            DefeatCondition::TimeLimit { seconds } => {
                now_seconds.saturating_sub(state.started_at) > *seconds
            }
        };
        if met {
            return Some(CombatOutcome::Defeat(*condition));
        }
    }
    None
}

/// Rotate the turn: end-turn ticks and cooldown decay for the departing
/// actor, skip defeated participants, bump the round exactly once on
/// wraparound, and open the incoming actor's turn (action points reset,
/// start-turn ticks).
fn advance_turn(state: &mut CombatState) {
    let order = state.turn_order.clone();
    if order.is_empty() {
        return;
    }
    let departing_id = state.current_turn_id.clone();
    if let Some(departing) = state.participant_mut(&departing_id) {
        departing.tick_statuses(TickTiming::EndTurn);
        departing.tick_cooldowns();
    }

    let current = order.iter().position(|id| *id == departing_id).unwrap_or(0);
    let mut index = current;
    for _ in 0..order.len() {
        index += 1;
        if index == order.len() {
            index = 0;
            state.round += 1;
        }
        if state
            .participant(&order[index])
            .is_some_and(|p| p.is_alive())
        {
            break;
        }
    }

    state.current_turn_id = order[index].clone();
    if let Some(incoming) = state.participant_mut(&order[index]) {
        incoming.action_points = incoming.max_action_points;
        incoming.tick_statuses(TickTiming::StartTurn);
    }
}
