//! Combat data model: participants, status effects, actions, and the
//! per-encounter state aggregate.
//!
//! A [`CombatState`] is created fresh for each encounter and discarded when
//! it ends. Participants are built from normalized character profiles via
//! [`CombatParticipant::from_profile`], so their combat stats always come
//! from the derived-stat formulas and are never hand-copied.

pub mod damage;
pub mod engine;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::character::CharacterProfile;

/// Action points a fresh participant starts each turn with.
pub const DEFAULT_MAX_ACTION_POINTS: u32 = 3;

/// Which side of an encounter a participant fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Player,
    Ally,
    Enemy,
}

/// Targeting side grouping: players and allies are one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Friendly,
    Hostile,
}

impl ParticipantKind {
    pub fn side(&self) -> Side {
        match self {
            ParticipantKind::Player | ParticipantKind::Ally => Side::Friendly,
            ParticipantKind::Enemy => Side::Hostile,
        }
    }
}

/// Equipped weapon stat block (read-only reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponStats {
    pub name: String,
    pub damage: i32,
    pub accuracy: i32,
    /// Flat addition to the wielder's critical-hit chance.
    #[serde(default)]
    pub crit_bonus: i32,
}

/// Equipped armor stat block (read-only reference data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmorStats {
    pub name: String,
    pub defense: i32,
}

/// Who a skill may legally target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRule {
    #[serde(rename = "self")]
    SelfOnly,
    #[serde(rename = "single_ally")]
    SingleAlly,
    #[serde(rename = "single_enemy")]
    SingleEnemy,
    #[serde(rename = "any")]
    Any,
}

/// What a combat skill does when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillKind {
    Damage,
    Healing,
}

/// A usable combat skill (read-only reference data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatSkill {
    pub id: String,
    pub name: String,
    pub kind: SkillKind,
    /// Base damage or healing amount.
    pub power: i32,
    pub mana_cost: i32,
    pub action_point_cost: u32,
    /// Turns before the skill can be used again; 0 means no cooldown.
    #[serde(default)]
    pub cooldown: u32,
    pub target_type: TargetRule,
    /// Status effect applied to the target on a successful use.
    #[serde(default)]
    pub applies_effect: Option<StatusEffect>,
}

/// What a consumable item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemEffect {
    RestoreHealth { amount: i32 },
    RestoreMana { amount: i32 },
}

/// A consumable carried into combat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub effect: ItemEffect,
}

/// When a status effect's modifiers fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickTiming {
    StartTurn,
    EndTurn,
}

/// Which participant stat a modifier touches.
///
/// `Health` and `Mana` modifiers are instant: they mutate the participant
/// on each matching tick. Every other stat is passive and only feeds the
/// damage/healing calculators at calculation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifiedStat {
    Health,
    Mana,
    Damage,
    Healing,
    Defense,
    CritChance,
    Accuracy,
    Evasion,
    Speed,
}

impl ModifiedStat {
    pub fn is_instant(&self) -> bool {
        matches!(self, ModifiedStat::Health | ModifiedStat::Mana)
    }
}

/// One stat adjustment carried by a status effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatModifier {
    pub stat: ModifiedStat,
    pub amount: i32,
}

/// A timed, stacking modifier attached to a combat participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub name: String,
    /// Ticks remaining; an effect at 0 is removed.
    pub duration: u32,
    pub stacks: u32,
    pub max_stacks: u32,
    pub tick_timing: TickTiming,
    pub modifiers: Vec<StatModifier>,
}

impl StatusEffect {
    pub fn new(name: impl Into<String>, duration: u32, tick_timing: TickTiming) -> Self {
        Self {
            name: name.into(),
            duration,
            stacks: 1,
            max_stacks: 1,
            tick_timing,
            modifiers: Vec::new(),
        }
    }

    pub fn with_max_stacks(mut self, max_stacks: u32) -> Self {
        self.max_stacks = max_stacks;
        self
    }

    pub fn with_modifier(mut self, stat: ModifiedStat, amount: i32) -> Self {
        self.modifiers.push(StatModifier { stat, amount });
        self
    }
}

/// What applying a status effect did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusApplication {
    /// No effect of this name existed; added as new.
    Added,
    /// An existing effect gained a stack; duration extended to the longer
    /// of the two.
    Stacked { stacks: u32 },
    /// The existing effect is at `max_stacks`; the application was ignored.
    AtCap,
}

/// One status effect's contribution during a tick pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTick {
    pub effect: String,
    pub health_delta: i32,
    pub mana_delta: i32,
    pub expired: bool,
}

/// Grid position inside an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

/// One fighter in an encounter.
///
/// Defeated participants stay in the list (history and resurrection need
/// them) but are skipped by turn rotation and excluded from the
/// `health > 0` counting in end conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatParticipant {
    pub id: String,
    pub name: String,
    pub kind: ParticipantKind,

    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,

    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub accuracy: i32,
    pub evasion: i32,
    pub crit_chance: i32,
    pub crit_multiplier: f64,

    pub action_points: u32,
    pub max_action_points: u32,

    #[serde(default)]
    pub weapon: Option<WeaponStats>,
    #[serde(default)]
    pub armor: Option<ArmorStats>,
    #[serde(default)]
    pub skills: Vec<CombatSkill>,
    #[serde(default)]
    pub items: Vec<CombatItem>,
    #[serde(default)]
    pub status_effects: Vec<StatusEffect>,
    /// Skill id -> turns until usable again.
    #[serde(default)]
    pub cooldowns: HashMap<String, u32>,
    #[serde(default)]
    pub position: Position,
}

impl CombatParticipant {
    /// Build a participant from a normalized character profile.
    ///
    /// Combat stats come straight from the derived-stat formulas, so the
    /// two engines always agree on attack/defense/speed semantics.
    pub fn from_profile(profile: &CharacterProfile, kind: ParticipantKind) -> Self {
        let derived = profile.derived_stats();
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            kind,
            health: profile.health,
            max_health: derived.max_health,
            mana: profile.mana,
            max_mana: derived.max_mana,
            attack: derived.attack,
            defense: derived.defense,
            speed: derived.speed,
            accuracy: derived.accuracy,
            evasion: derived.evasion,
            crit_chance: derived.critical_chance,
            crit_multiplier: derived.critical_multiplier,
            action_points: DEFAULT_MAX_ACTION_POINTS,
            max_action_points: DEFAULT_MAX_ACTION_POINTS,
            weapon: None,
            armor: None,
            skills: Vec::new(),
            items: Vec::new(),
            status_effects: Vec::new(),
            cooldowns: HashMap::new(),
            position: Position::default(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, clamping health into `[0, max_health]`.
    pub fn apply_damage(&mut self, amount: i32) {
        self.health = (self.health - amount.max(0)).clamp(0, self.max_health);
    }

    /// Apply healing, clamping health into `[0, max_health]`.
    pub fn apply_healing(&mut self, amount: i32) {
        self.health = (self.health + amount.max(0)).clamp(0, self.max_health);
    }

    /// Restore mana, clamped to `max_mana`. Returns the amount actually
    /// restored.
    pub fn restore_mana(&mut self, amount: i32) -> i32 {
        let before = self.mana;
        self.mana = (self.mana + amount.max(0)).clamp(0, self.max_mana);
        self.mana - before
    }

    pub fn skill(&self, id: &str) -> Option<&CombatSkill> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn item(&self, id: &str) -> Option<&CombatItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Sum of passive modifiers for one stat across active effects,
    /// scaled by stack count. Instant stats always report 0 here.
    pub fn passive_modifier(&self, stat: ModifiedStat) -> i32 {
        if stat.is_instant() {
            return 0;
        }
        self.status_effects
            .iter()
            .flat_map(|effect| {
                effect
                    .modifiers
                    .iter()
                    .filter(move |m| m.stat == stat)
                    .map(move |m| m.amount * effect.stacks as i32)
            })
            .sum()
    }

    /// Apply a status effect using the stacking rules: same-named effects
    /// gain a stack and keep the longer duration until `max_stacks`, at
    /// which point further applications are ignored.
    pub fn apply_status(&mut self, incoming: StatusEffect) -> StatusApplication {
        if let Some(existing) = self
            .status_effects
            .iter_mut()
            .find(|e| e.name == incoming.name)
        {
            if existing.stacks >= existing.max_stacks {
                return StatusApplication::AtCap;
            }
            existing.stacks += 1;
            existing.duration = existing.duration.max(incoming.duration);
            return StatusApplication::Stacked {
                stacks: existing.stacks,
            };
        }
        self.status_effects.push(incoming);
        StatusApplication::Added
    }

    /// Run one tick pass for effects matching `timing`.
    ///
    /// Health/mana modifiers mutate the participant once per tick (scaled
    /// by stacks); passive modifiers are untouched here. Durations
    /// decrement and expired effects are removed.
    pub fn tick_statuses(&mut self, timing: TickTiming) -> Vec<StatusTick> {
        let mut ticks = Vec::new();
        let mut deltas: Vec<(i32, i32)> = Vec::new();

        for effect in &mut self.status_effects {
            if effect.tick_timing != timing {
                continue;
            }
            let mut health_delta = 0;
            let mut mana_delta = 0;
            for modifier in &effect.modifiers {
                let amount = modifier.amount * effect.stacks as i32;
                match modifier.stat {
                    ModifiedStat::Health => health_delta += amount,
                    ModifiedStat::Mana => mana_delta += amount,
                    _ => {}
                }
            }
            effect.duration = effect.duration.saturating_sub(1);
            deltas.push((health_delta, mana_delta));
            ticks.push(StatusTick {
                effect: effect.name.clone(),
                health_delta,
                mana_delta,
                expired: effect.duration == 0,
            });
        }

        for (health_delta, mana_delta) in deltas {
            self.health = (self.health + health_delta).clamp(0, self.max_health);
            self.mana = (self.mana + mana_delta).clamp(0, self.max_mana);
        }
        self.status_effects.retain(|e| e.duration > 0);
        ticks
    }

    /// Decrement every cooldown by one turn, dropping finished entries.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, remaining| {
            *remaining = remaining.saturating_sub(1);
            *remaining > 0
        });
    }
}

/// Declarative victory predicate, evaluated every turn in declared order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VictoryCondition {
    DefeatAllEnemies,
    SurviveTurns { rounds: u32 },
}

/// Declarative defeat predicate, evaluated after victory conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefeatCondition {
    PlayerDeath,
    TimeLimit { seconds: u64 },
}

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Victory(VictoryCondition),
    Defeat(DefeatCondition),
    Fled,
}

/// The kinds of action a participant may attempt on their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatActionKind {
    Attack,
    Skill,
    Item,
    Defend,
    Move,
    Flee,
    Wait,
}

/// One intended action, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatAction {
    pub kind: CombatActionKind,
    pub actor_id: String,
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub target_position: Option<Position>,
    #[serde(default)]
    pub skill_id: Option<String>,
    #[serde(default)]
    pub item_id: Option<String>,
    pub action_point_cost: u32,
    #[serde(default)]
    pub mana_cost: Option<i32>,
}

impl CombatAction {
    fn base(kind: CombatActionKind, actor_id: impl Into<String>, action_point_cost: u32) -> Self {
        Self {
            kind,
            actor_id: actor_id.into(),
            target_id: None,
            target_position: None,
            skill_id: None,
            item_id: None,
            action_point_cost,
            mana_cost: None,
        }
    }

    pub fn attack(actor_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        let mut action = Self::base(CombatActionKind::Attack, actor_id, 1);
        action.target_id = Some(target_id.into());
        action
    }

    /// A skill use. Action-point and mana costs come from the skill's own
    /// declaration at resolution time.
    pub fn skill(
        actor_id: impl Into<String>,
        skill_id: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        let mut action = Self::base(CombatActionKind::Skill, actor_id, 1);
        action.skill_id = Some(skill_id.into());
        action.target_id = Some(target_id.into());
        action
    }

    pub fn item(
        actor_id: impl Into<String>,
        item_id: impl Into<String>,
        target_id: Option<String>,
    ) -> Self {
        let mut action = Self::base(CombatActionKind::Item, actor_id, 1);
        action.item_id = Some(item_id.into());
        action.target_id = target_id;
        action
    }

    pub fn defend(actor_id: impl Into<String>) -> Self {
        Self::base(CombatActionKind::Defend, actor_id, 1)
    }

    pub fn move_to(actor_id: impl Into<String>, position: Position) -> Self {
        let mut action = Self::base(CombatActionKind::Move, actor_id, 1);
        action.target_position = Some(position);
        action
    }

    pub fn flee(actor_id: impl Into<String>) -> Self {
        Self::base(CombatActionKind::Flee, actor_id, 1)
    }

    pub fn wait(actor_id: impl Into<String>) -> Self {
        Self::base(CombatActionKind::Wait, actor_id, 0)
    }
}

/// Append-only audit log entry for a resolved action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub id: Uuid,
    pub round: u32,
    pub actor_id: String,
    pub action: CombatAction,
    pub summary: String,
}

/// Kind of environmental effect active over a whole encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentalKind {
    Damage,
    Healing,
}

/// An encounter-wide modifier feeding the damage/healing calculators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentalEffect {
    pub name: String,
    pub kind: EnvironmentalKind,
    pub value: i32,
}

/// Whose side currently holds the turn. Derived from the current turn
/// holder's kind, never tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    PlayerTurn,
    EnemyTurn,
}

/// Per-encounter state aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub id: Uuid,
    pub participants: Vec<CombatParticipant>,
    /// Fixed id permutation from the encounter-start initiative roll.
    pub turn_order: Vec<String>,
    pub current_turn_id: String,
    pub round: u32,
    pub victory_conditions: Vec<VictoryCondition>,
    pub defeat_conditions: Vec<DefeatCondition>,
    pub environment: Vec<EnvironmentalEffect>,
    pub action_history: Vec<ActionRecord>,
    /// Injected wall-clock seconds at encounter start; only the
    /// `time_limit` defeat condition reads it.
    pub started_at: u64,
    pub active: bool,
    pub outcome: Option<CombatOutcome>,
}

impl CombatState {
    pub fn participant(&self, id: &str) -> Option<&CombatParticipant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub(crate) fn participant_mut(&mut self, id: &str) -> Option<&mut CombatParticipant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn current_participant(&self) -> Option<&CombatParticipant> {
        self.participant(&self.current_turn_id)
    }

    /// The phase is whatever side holds the turn.
    pub fn phase(&self) -> CombatPhase {
        match self.current_participant().map(|p| p.kind) {
            Some(ParticipantKind::Enemy) => CombatPhase::EnemyTurn,
            _ => CombatPhase::PlayerTurn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Attributes, CharacterProfile, RawCharacterProfile};

    fn participant(id: &str, kind: ParticipantKind) -> CombatParticipant {
        CombatParticipant {
            id: id.to_string(),
            name: id.to_string(),
            kind,
            health: 50,
            max_health: 50,
            mana: 20,
            max_mana: 20,
            attack: 10,
            defense: 5,
            speed: 8,
            accuracy: 7,
            evasion: 6,
            crit_chance: 0,
            crit_multiplier: 1.5,
            action_points: 3,
            max_action_points: 3,
            weapon: None,
            armor: None,
            skills: Vec::new(),
            items: Vec::new(),
            status_effects: Vec::new(),
            cooldowns: HashMap::new(),
            position: Position::default(),
        }
    }

    fn poison(duration: u32, max_stacks: u32) -> StatusEffect {
        StatusEffect::new("poison", duration, TickTiming::EndTurn)
            .with_max_stacks(max_stacks)
            .with_modifier(ModifiedStat::Health, -5)
    }

    #[test]
    fn test_from_profile_uses_derived_stats() {
        let profile = CharacterProfile::from_raw(RawCharacterProfile {
            id: "hero".to_string(),
            name: "Hero".to_string(),
            attributes: Some(Attributes::new(14, 12, 13, 10, 10, 9)),
            ..RawCharacterProfile::default()
        });
        let derived = profile.derived_stats();
        let fighter = CombatParticipant::from_profile(&profile, ParticipantKind::Player);

        assert_eq!(fighter.attack, derived.attack);
        assert_eq!(fighter.defense, derived.defense);
        assert_eq!(fighter.speed, derived.speed);
        assert_eq!(fighter.crit_chance, derived.critical_chance);
        assert_eq!(fighter.max_health, derived.max_health);
        assert_eq!(fighter.health, profile.health);
        assert_eq!(fighter.action_points, DEFAULT_MAX_ACTION_POINTS);
    }

    #[test]
    fn test_sides() {
        assert_eq!(ParticipantKind::Player.side(), Side::Friendly);
        assert_eq!(ParticipantKind::Ally.side(), Side::Friendly);
        assert_eq!(ParticipantKind::Enemy.side(), Side::Hostile);
    }

    #[test]
    fn test_damage_and_healing_clamp() {
        let mut p = participant("a", ParticipantKind::Player);
        p.apply_damage(70);
        assert_eq!(p.health, 0);
        assert!(!p.is_alive());
        // Negative amounts are ignored, not inverted.
        p.apply_damage(-10);
        assert_eq!(p.health, 0);
        p.apply_healing(9999);
        assert_eq!(p.health, p.max_health);
    }

    #[test]
    fn test_restore_mana_reports_actual() {
        let mut p = participant("a", ParticipantKind::Player);
        p.mana = 15;
        assert_eq!(p.restore_mana(10), 5);
        assert_eq!(p.mana, 20);
    }

    #[test]
    fn test_status_stacking_respects_cap() {
        let mut p = participant("a", ParticipantKind::Player);
        assert_eq!(p.apply_status(poison(3, 2)), StatusApplication::Added);
        assert_eq!(
            p.apply_status(poison(5, 2)),
            StatusApplication::Stacked { stacks: 2 }
        );
        // Duration extended to the longer of the two.
        assert_eq!(p.status_effects[0].duration, 5);
        // Third application at max_stacks=2 is silently ignored.
        assert_eq!(p.apply_status(poison(9, 2)), StatusApplication::AtCap);
        assert_eq!(p.status_effects[0].stacks, 2);
        assert_eq!(p.status_effects[0].duration, 5);
    }

    #[test]
    fn test_tick_scales_with_stacks_and_expires() {
        let mut p = participant("a", ParticipantKind::Player);
        p.apply_status(poison(2, 3));
        p.apply_status(poison(2, 3));

        let ticks = p.tick_statuses(TickTiming::EndTurn);
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].health_delta, -10); // -5 x 2 stacks
        assert!(!ticks[0].expired);
        assert_eq!(p.health, 40);

        let ticks = p.tick_statuses(TickTiming::EndTurn);
        assert!(ticks[0].expired);
        assert!(p.status_effects.is_empty());
        assert_eq!(p.health, 30);
    }

    #[test]
    fn test_tick_ignores_other_timing() {
        let mut p = participant("a", ParticipantKind::Player);
        p.apply_status(poison(2, 1));
        let ticks = p.tick_statuses(TickTiming::StartTurn);
        assert!(ticks.is_empty());
        assert_eq!(p.health, 50);
        assert_eq!(p.status_effects[0].duration, 2);
    }

    #[test]
    fn test_passive_modifiers_do_not_touch_vitals() {
        let mut p = participant("a", ParticipantKind::Player);
        p.apply_status(
            StatusEffect::new("war cry", 3, TickTiming::StartTurn)
                .with_max_stacks(2)
                .with_modifier(ModifiedStat::Damage, 4),
        );
        p.apply_status(
            StatusEffect::new("war cry", 3, TickTiming::StartTurn)
                .with_max_stacks(2)
                .with_modifier(ModifiedStat::Damage, 4),
        );
        assert_eq!(p.passive_modifier(ModifiedStat::Damage), 8);
        // Ticking a passive-only effect changes no vitals.
        let ticks = p.tick_statuses(TickTiming::StartTurn);
        assert_eq!(ticks[0].health_delta, 0);
        assert_eq!(p.health, 50);
    }

    #[test]
    fn test_instant_stats_never_report_passively() {
        let mut p = participant("a", ParticipantKind::Player);
        p.apply_status(poison(3, 1));
        assert_eq!(p.passive_modifier(ModifiedStat::Health), 0);
    }

    #[test]
    fn test_cooldown_ticks_drop_finished_entries() {
        let mut p = participant("a", ParticipantKind::Player);
        p.cooldowns.insert("fireball".to_string(), 2);
        p.cooldowns.insert("bash".to_string(), 1);
        p.tick_cooldowns();
        assert_eq!(p.cooldowns.get("fireball"), Some(&1));
        assert!(!p.cooldowns.contains_key("bash"));
    }

    #[test]
    fn test_target_rule_serde_names() {
        assert_eq!(
            serde_json::to_string(&TargetRule::SelfOnly).unwrap(),
            "\"self\""
        );
        assert_eq!(
            serde_json::to_string(&TargetRule::SingleEnemy).unwrap(),
            "\"single_enemy\""
        );
        let rule: TargetRule = serde_json::from_str("\"single_ally\"").unwrap();
        assert_eq!(rule, TargetRule::SingleAlly);
    }

    #[test]
    fn test_participant_round_trips_through_json() {
        let mut p = participant("a", ParticipantKind::Enemy);
        p.weapon = Some(WeaponStats {
            name: "rusty blade".to_string(),
            damage: 6,
            accuracy: 10,
            crit_bonus: 2,
        });
        p.apply_status(poison(3, 2));
        p.cooldowns.insert("howl".to_string(), 1);
        let json = serde_json::to_string(&p).unwrap();
        let back: CombatParticipant = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
