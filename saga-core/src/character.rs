//! Character data model: core attributes, progression bookkeeping, and
//! derived combat stats.
//!
//! Host applications store characters as partial JSON blobs. That shape is
//! [`RawCharacterProfile`]; [`CharacterProfile::from_raw`] is the single
//! place defaults are filled in, so every engine downstream can assume a
//! fully-populated record.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::progression;

/// Maximum number of progression points that may ever be allocated to a
/// single attribute, enforced on the allocation delta, not the total.
pub const ATTRIBUTE_ALLOCATION_CAP: i32 = 100;

/// Default base vitals for profiles that arrive without them.
pub const DEFAULT_BASE_MAX_HEALTH: i32 = 100;
pub const DEFAULT_BASE_MAX_MANA: i32 = 50;

/// The six core attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Strength => "strength",
            Attribute::Dexterity => "dexterity",
            Attribute::Constitution => "constitution",
            Attribute::Intelligence => "intelligence",
            Attribute::Wisdom => "wisdom",
            Attribute::Charisma => "charisma",
        }
    }

    pub fn all() -> [Attribute; 6] {
        [
            Attribute::Strength,
            Attribute::Dexterity,
            Attribute::Constitution,
            Attribute::Intelligence,
            Attribute::Wisdom,
            Attribute::Charisma,
        ]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Base attribute scores, before any progression deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Attributes {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Constitution => self.constitution = value,
            Attribute::Intelligence => self.intelligence = value,
            Attribute::Wisdom => self.wisdom = value,
            Attribute::Charisma => self.charisma = value,
        }
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new(10, 10, 10, 10, 10, 10)
    }
}

/// The four typed point currencies earned on level-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressionPoints {
    pub attribute: u32,
    pub skill: u32,
    pub specialization: u32,
    pub talent: u32,
}

impl ProgressionPoints {
    pub fn accumulate(&mut self, other: &ProgressionPoints) {
        self.attribute += other.attribute;
        self.skill += other.skill;
        self.specialization += other.specialization;
        self.talent += other.talent;
    }
}

/// Per-attribute allocated deltas plus the three derived-bonus accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeProgression {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
    pub health_bonus: i32,
    pub mana_bonus: i32,
    pub carry_bonus: i32,
}

impl AttributeProgression {
    /// Cumulative points allocated to a single attribute.
    pub fn allocated(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Constitution => self.constitution,
            Attribute::Intelligence => self.intelligence,
            Attribute::Wisdom => self.wisdom,
            Attribute::Charisma => self.charisma,
        }
    }

    fn allocated_mut(&mut self, attribute: Attribute) -> &mut i32 {
        match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Constitution => &mut self.constitution,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Charisma => &mut self.charisma,
        }
    }
}

/// Error from attribute point allocation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("cannot allocate a negative number of points ({0})")]
    NegativePoints(i32),
    #[error(
        "allocating {requested} more points to {attribute} would exceed the \
         {ATTRIBUTE_ALLOCATION_CAP}-point ceiling ({allocated} already allocated)"
    )]
    AttributeCeilingExceeded {
        attribute: Attribute,
        allocated: i32,
        requested: i32,
    },
    #[error("not enough attribute points ({requested} requested, {available} available)")]
    InsufficientPoints { requested: u32, available: u32 },
}

/// Allocate points to one attribute, returning the updated progression.
///
/// Pure with respect to the point pool: deducting from the pool is the
/// caller's job (see [`spend_attribute_points`]).
pub fn allocate_attribute_point(
    progression: &AttributeProgression,
    attribute: Attribute,
    points: i32,
) -> Result<AttributeProgression, AllocationError> {
    if points < 0 {
        return Err(AllocationError::NegativePoints(points));
    }
    let allocated = progression.allocated(attribute);
    if allocated + points > ATTRIBUTE_ALLOCATION_CAP {
        return Err(AllocationError::AttributeCeilingExceeded {
            attribute,
            allocated,
            requested: points,
        });
    }
    let mut next = *progression;
    *next.allocated_mut(attribute) += points;
    Ok(next)
}

/// Combat stats derived from base attributes and progression deltas.
///
/// Always recomputed, never hand-edited: [`calculate_derived_stats`] is a
/// pure function of its two inputs and is safe to call repeatedly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedStats {
    pub max_health: i32,
    pub max_mana: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub accuracy: i32,
    pub evasion: i32,
    /// Percent chance, 0-100.
    pub critical_chance: i32,
    /// Damage multiplier on a critical hit, 2-decimal precision, >= 1.0.
    pub critical_multiplier: f64,
    pub carry_capacity: i32,
    pub movement_speed: i32,
    pub initiative_bonus: i32,
}

/// Round-half-up for stat math. Every rounded quantity here is
/// non-negative before rounding, so `f64::round` matches.
pub(crate) fn round_stat(value: f64) -> i32 {
    value.round() as i32
}

fn total_attribute(base: i32, delta: i32) -> i32 {
    (base + delta).max(1)
}

/// Compute every derived stat from base attributes plus progression deltas.
pub fn calculate_derived_stats(
    character: &CharacterProfile,
    progression: &AttributeProgression,
) -> DerivedStats {
    let str_total = total_attribute(character.attributes.strength, progression.strength) as f64;
    let dex_total = total_attribute(character.attributes.dexterity, progression.dexterity) as f64;
    let con_total =
        total_attribute(character.attributes.constitution, progression.constitution) as f64;
    let int_total =
        total_attribute(character.attributes.intelligence, progression.intelligence) as f64;
    let wis_total = total_attribute(character.attributes.wisdom, progression.wisdom) as f64;

    let max_health =
        (character.base_max_health + con_total as i32 * 2 + progression.health_bonus).max(1);
    let max_mana = round_stat(
        character.base_max_mana as f64 + int_total * 1.5 + progression.mana_bonus as f64,
    )
    .max(0);

    let attack = round_stat(str_total * 0.8 + dex_total * 0.3).max(1);
    let defense = round_stat(con_total * 0.6 + dex_total * 0.4).max(0);
    let speed = round_stat(dex_total * 0.7 + str_total * 0.2).max(1);
    let accuracy = round_stat(dex_total * 0.6 + wis_total * 0.3).max(0);
    let evasion = round_stat(dex_total * 0.8 + wis_total * 0.2).max(0);
    let critical_chance = round_stat(dex_total * 0.3 + int_total * 0.2).clamp(0, 100);
    let critical_multiplier = (((1.5 + str_total * 0.02) * 100.0).round() / 100.0).max(1.0);
    let carry_capacity = (round_stat(str_total * 5.0) + progression.carry_bonus).max(0);
    let movement_speed = round_stat(dex_total * 0.5 + con_total * 0.3).max(1);
    let initiative_bonus = round_stat(dex_total * 0.4 + wis_total * 0.3).max(0);

    DerivedStats {
        max_health,
        max_mana,
        attack,
        defense,
        speed,
        accuracy,
        evasion,
        critical_chance,
        critical_multiplier,
        carry_capacity,
        movement_speed,
        initiative_bonus,
    }
}

/// A specialization the character has activated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSpecialization {
    pub id: String,
    pub progression_level: u32,
}

/// The character shape host applications actually store: everything the
/// progression systems own may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCharacterProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub archetype: Option<String>,
    #[serde(default)]
    pub health: Option<i32>,
    #[serde(default)]
    pub mana: Option<i32>,
    #[serde(default)]
    pub base_max_health: Option<i32>,
    #[serde(default)]
    pub base_max_mana: Option<i32>,
    #[serde(default)]
    pub attributes: Option<Attributes>,
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub experience_points: Option<u64>,
    #[serde(default)]
    pub total_experience_earned: Option<u64>,
    #[serde(default)]
    pub progression_points: Option<ProgressionPoints>,
    #[serde(default)]
    pub attribute_progression: Option<AttributeProgression>,
    #[serde(default)]
    pub purchased_skill_nodes: Option<HashSet<String>>,
    #[serde(default)]
    pub active_specializations: Option<Vec<ActiveSpecialization>>,
    #[serde(default)]
    pub purchased_talents: Option<Vec<String>>,
    #[serde(default)]
    pub completed_milestones: Option<Vec<String>>,
}

/// Fully-populated character aggregate: the only shape the engines accept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub id: String,
    pub name: String,
    pub archetype: String,

    // Vitals. `max_health`/`max_mana` mirror the derived stats and are
    // refreshed by `recalculate`.
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub base_max_health: i32,
    pub base_max_mana: i32,

    pub attributes: Attributes,

    // Progression bookkeeping
    pub level: i32,
    pub experience_points: u64,
    pub experience_to_next_level: u64,
    pub total_experience_earned: u64,
    pub progression_points: ProgressionPoints,
    pub attribute_progression: AttributeProgression,
    pub purchased_skill_nodes: HashSet<String>,
    pub active_specializations: Vec<ActiveSpecialization>,
    pub purchased_talents: Vec<String>,
    pub completed_milestones: Vec<String>,
}

impl CharacterProfile {
    /// Create a fresh level-1 profile with default attributes.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::from_raw(RawCharacterProfile {
            id: id.into(),
            name: name.into(),
            ..RawCharacterProfile::default()
        })
    }

    /// Normalize an externally-supplied profile.
    ///
    /// This is the single defaulting site: missing pools become zero,
    /// attributes are floored at 1, the level is clamped into the valid
    /// range, and vitals are recomputed and clamped. The normalizer
    /// repairs, it does not reject.
    pub fn from_raw(raw: RawCharacterProfile) -> Self {
        let level = raw.level.unwrap_or(1).clamp(1, progression::LEVEL_CAP);
        let mut attributes = raw.attributes.unwrap_or_default();
        for attribute in Attribute::all() {
            if attributes.get(attribute) < 1 {
                attributes.set(attribute, 1);
            }
        }
        let experience_points = raw.experience_points.unwrap_or(0);

        let mut profile = Self {
            id: raw.id,
            name: raw.name,
            archetype: raw.archetype.unwrap_or_else(|| "adventurer".to_string()),
            health: 0,
            max_health: 0,
            mana: 0,
            max_mana: 0,
            base_max_health: raw.base_max_health.unwrap_or(DEFAULT_BASE_MAX_HEALTH),
            base_max_mana: raw.base_max_mana.unwrap_or(DEFAULT_BASE_MAX_MANA),
            attributes,
            level,
            experience_points,
            experience_to_next_level: progression::xp_curve(level),
            total_experience_earned: raw.total_experience_earned.unwrap_or(experience_points),
            progression_points: raw.progression_points.unwrap_or_default(),
            attribute_progression: raw.attribute_progression.unwrap_or_default(),
            purchased_skill_nodes: raw.purchased_skill_nodes.unwrap_or_default(),
            active_specializations: raw.active_specializations.unwrap_or_default(),
            purchased_talents: raw.purchased_talents.unwrap_or_default(),
            completed_milestones: raw.completed_milestones.unwrap_or_default(),
        };

        let derived = profile.derived_stats();
        profile.max_health = derived.max_health;
        profile.max_mana = derived.max_mana;
        profile.health = raw.health.unwrap_or(derived.max_health);
        profile.mana = raw.mana.unwrap_or(derived.max_mana);
        profile.recalculate();
        profile
    }

    /// Recompute derived vitals and re-clamp current values.
    pub fn recalculate(&mut self) {
        let derived = self.derived_stats();
        self.max_health = derived.max_health;
        self.max_mana = derived.max_mana;
        self.health = self.health.clamp(0, self.max_health);
        self.mana = self.mana.clamp(0, self.max_mana);
    }

    pub fn derived_stats(&self) -> DerivedStats {
        calculate_derived_stats(self, &self.attribute_progression)
    }
}

/// Spend points from the attribute pool on one attribute.
///
/// The pooled companion to [`allocate_attribute_point`]: checks the pool,
/// allocates, deducts, and refreshes vitals. Never partially applies.
pub fn spend_attribute_points(
    character: &CharacterProfile,
    attribute: Attribute,
    points: i32,
) -> Result<CharacterProfile, AllocationError> {
    if points < 0 {
        return Err(AllocationError::NegativePoints(points));
    }
    let available = character.progression_points.attribute;
    if points as u32 > available {
        return Err(AllocationError::InsufficientPoints {
            requested: points as u32,
            available,
        });
    }
    let progression =
        allocate_attribute_point(&character.attribute_progression, attribute, points)?;
    let mut next = character.clone();
    next.attribute_progression = progression;
    next.progression_points.attribute = available - points as u32;
    next.recalculate();
    Ok(next)
}
