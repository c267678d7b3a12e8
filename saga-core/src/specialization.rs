//! Specialization catalog scan and activation.
//!
//! Catalogs are externally authored. Malformed entries are skipped with a
//! warning and a tagged reason; they never fail the scan.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use tracing::warn;

use crate::character::{ActiveSpecialization, CharacterProfile};

/// One entry in the specialization catalog.
///
/// `unlock_level` is optional because authored data sometimes omits it;
/// such entries are reported as skipped rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecializationDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unlock_level: Option<i32>,
    /// Ids this specialization cannot coexist with, checked symmetrically.
    #[serde(default)]
    pub exclusive_with: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Why a catalog entry was excluded from the available list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecializationSkip {
    MissingId,
    MissingUnlockLevel,
    InvalidUnlockLevel(i32),
    LevelTooLow { required: i32 },
    AlreadyActive,
    ExclusiveWithActive(String),
}

impl fmt::Display for SpecializationSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecializationSkip::MissingId => write!(f, "entry has no id"),
            SpecializationSkip::MissingUnlockLevel => write!(f, "entry has no unlock level"),
            SpecializationSkip::InvalidUnlockLevel(level) => {
                write!(f, "entry has invalid unlock level {level}")
            }
            SpecializationSkip::LevelTooLow { required } => {
                write!(f, "requires level {required}")
            }
            SpecializationSkip::AlreadyActive => write!(f, "already active"),
            SpecializationSkip::ExclusiveWithActive(id) => {
                write!(f, "mutually exclusive with active '{id}'")
            }
        }
    }
}

/// A catalog entry excluded by [`available_specializations`], with why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSpecialization {
    pub index: usize,
    pub id: String,
    pub reason: SpecializationSkip,
}

/// Result of scanning a catalog for one character.
#[derive(Debug, Clone, Default)]
pub struct SpecializationScan<'a> {
    pub available: Vec<&'a SpecializationDef>,
    pub skipped: Vec<SkippedSpecialization>,
}

/// Scan the catalog for specializations this character could activate.
pub fn available_specializations<'a>(
    character: &CharacterProfile,
    catalog: &'a [SpecializationDef],
) -> SpecializationScan<'a> {
    let active_ids: HashSet<&str> = character
        .active_specializations
        .iter()
        .map(|s| s.id.as_str())
        .collect();

    let mut scan = SpecializationScan::default();
    for (index, def) in catalog.iter().enumerate() {
        let skip = |reason: SpecializationSkip, scan: &mut SpecializationScan<'a>| {
            scan.skipped.push(SkippedSpecialization {
                index,
                id: def.id.clone(),
                reason,
            });
        };

        if def.id.is_empty() {
            warn!(index, "skipping specialization entry with no id");
            skip(SpecializationSkip::MissingId, &mut scan);
            continue;
        }
        let unlock_level = match def.unlock_level {
            Some(level) if level >= 1 => level,
            Some(level) => {
                warn!(id = %def.id, level, "skipping specialization with invalid unlock level");
                skip(SpecializationSkip::InvalidUnlockLevel(level), &mut scan);
                continue;
            }
            None => {
                warn!(id = %def.id, "skipping specialization with no unlock level");
                skip(SpecializationSkip::MissingUnlockLevel, &mut scan);
                continue;
            }
        };
        if character.level < unlock_level {
            skip(
                SpecializationSkip::LevelTooLow {
                    required: unlock_level,
                },
                &mut scan,
            );
            continue;
        }
        if active_ids.contains(def.id.as_str()) {
            skip(SpecializationSkip::AlreadyActive, &mut scan);
            continue;
        }
        // Exclusivity is symmetric: either side declaring the conflict
        // blocks the pairing.
        let conflict = def
            .exclusive_with
            .iter()
            .find(|id| active_ids.contains(id.as_str()))
            .cloned()
            .or_else(|| {
                character
                    .active_specializations
                    .iter()
                    .find(|active| {
                        catalog
                            .iter()
                            .find(|d| d.id == active.id)
                            .is_some_and(|d| d.exclusive_with.contains(&def.id))
                    })
                    .map(|active| active.id.clone())
            });
        if let Some(conflicting_id) = conflict {
            skip(
                SpecializationSkip::ExclusiveWithActive(conflicting_id),
                &mut scan,
            );
            continue;
        }
        scan.available.push(def);
    }
    scan
}

/// Error type for specialization activation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecializationError {
    #[error("specialization '{0}' does not exist")]
    NotFound(String),
    #[error("specialization '{0}' is not available to this character")]
    NotAvailable(String),
    #[error("not enough specialization points (1 required, {available} available)")]
    InsufficientPoints { available: u32 },
}

/// Activate a specialization: append an active instance at progression
/// level 1 and deduct exactly one specialization point.
pub fn activate(
    character: &CharacterProfile,
    specialization_id: &str,
    catalog: &[SpecializationDef],
) -> Result<CharacterProfile, SpecializationError> {
    let def = catalog
        .iter()
        .find(|d| !d.id.is_empty() && d.id == specialization_id)
        .ok_or_else(|| SpecializationError::NotFound(specialization_id.to_string()))?;

    let scan = available_specializations(character, catalog);
    if !scan.available.iter().any(|d| d.id == def.id) {
        return Err(SpecializationError::NotAvailable(def.id.clone()));
    }
    let available = character.progression_points.specialization;
    if available < 1 {
        return Err(SpecializationError::InsufficientPoints { available });
    }

    let mut next = character.clone();
    next.active_specializations.push(ActiveSpecialization {
        id: def.id.clone(),
        progression_level: 1,
    });
    next.progression_points.specialization = available - 1;
    Ok(next)
}
