//! Deterministic progression and combat engines for a narrative RPG.
//!
//! This crate provides:
//! - Character progression: experience curves, level-up orchestration,
//!   attribute allocation, skill trees, specializations
//! - Derived combat stats computed from base attributes
//! - A turn-based combat resolution engine: damage/healing calculators,
//!   status effects, turn order, victory/defeat conditions
//!
//! Both engines are pure state transformers: no I/O, no hidden global
//! state, no clock reads. Randomness and wall-clock time are injected, so
//! every operation is callable deterministically from a test.
//!
//! # Quick Start
//!
//! ```
//! use saga_core::{grant_experience, CharacterProfile, CombatAction, CombatEngine,
//!     CombatParticipant, DefeatCondition, ParticipantKind, VictoryCondition};
//!
//! // Progression: grant experience and settle the level-ups it triggers.
//! let hero = CharacterProfile::new("hero-1", "Aveline");
//! let (hero, summary) = grant_experience(&hero, 120).unwrap();
//! assert_eq!(hero.level, 2);
//! assert_eq!(summary.levels_gained, 1);
//!
//! // Combat: derived stats feed straight into an encounter.
//! let goblin = CharacterProfile::new("goblin-1", "Goblin");
//! let engine = CombatEngine::new();
//! let state = engine.start_encounter(
//!     vec![
//!         CombatParticipant::from_profile(&hero, ParticipantKind::Player),
//!         CombatParticipant::from_profile(&goblin, ParticipantKind::Enemy),
//!     ],
//!     vec![VictoryCondition::DefeatAllEnemies],
//!     vec![DefeatCondition::PlayerDeath],
//!     Vec::new(),
//!     0,
//! );
//! let actor = state.current_turn_id.clone();
//! let result = engine.process_action(&state, &CombatAction::wait(actor), 0);
//! assert!(result.success);
//! ```

pub mod character;
pub mod combat;
pub mod progression;
pub mod skills;
pub mod specialization;

// Primary public API
pub use character::{
    allocate_attribute_point, calculate_derived_stats, spend_attribute_points, AllocationError,
    Attribute, AttributeProgression, Attributes, CharacterProfile, DerivedStats, ProgressionPoints,
    RawCharacterProfile,
};
pub use combat::engine::{
    ActionOutcome, ActionRejection, CombatEngine, CombatEnd, CombatTurnResult,
};
pub use combat::{
    CombatAction, CombatParticipant, CombatState, DefeatCondition, ParticipantKind, StatusEffect,
    VictoryCondition,
};
pub use progression::{
    grant_experience, process_level_up, xp_to_next_level, LevelUpSummary, ProgressionError,
};
pub use skills::{SkillTree, SkillTreeError, SkillTreeNode};
pub use specialization::{SpecializationDef, SpecializationError};
