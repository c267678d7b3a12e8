//! Experience curve and level-up orchestration.
//!
//! The curve is exponential: each level costs 1.5x the previous one, with
//! a hard ceiling at level 100. Level-ups award four typed point
//! currencies, with milestone levels (divisible by 10) deliberately
//! double-rewarded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::character::{CharacterProfile, ProgressionPoints};

/// Hard level ceiling.
pub const LEVEL_CAP: i32 = 100;

const BASE_XP: f64 = 100.0;
const XP_GROWTH: f64 = 1.5;

/// Error type for experience and level math.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgressionError {
    #[error("invalid level {0}: levels start at 1")]
    InvalidLevel(i32),
    #[error("level {0} exceeds the level {LEVEL_CAP} ceiling")]
    LevelCeilingExceeded(i32),
}

fn validate_level(level: i32) -> Result<(), ProgressionError> {
    if level < 1 {
        Err(ProgressionError::InvalidLevel(level))
    } else if level > LEVEL_CAP {
        Err(ProgressionError::LevelCeilingExceeded(level))
    } else {
        Ok(())
    }
}

/// The raw curve, for callers that have already validated the level
/// (the normalizer clamps into range before calling this).
pub(crate) fn xp_curve(level: i32) -> u64 {
    (BASE_XP * XP_GROWTH.powi(level - 1)).floor() as u64
}

/// Experience required to advance from `level` to `level + 1`:
/// `floor(100 * 1.5^(level - 1))`.
pub fn xp_to_next_level(level: i32) -> Result<u64, ProgressionError> {
    validate_level(level)?;
    Ok(xp_curve(level))
}

/// Total experience required to reach `level` from scratch. Level 1 is 0.
pub fn total_xp_for_level(level: i32) -> Result<u64, ProgressionError> {
    validate_level(level)?;
    Ok((1..level).map(xp_curve).sum())
}

/// Whether the character is due a level-up, and the single next level if
/// so. Multi-level jumps are the orchestrator's job, not this predicate's.
pub fn check_level_up(character: &CharacterProfile) -> Option<i32> {
    if character.level >= LEVEL_CAP {
        return None;
    }
    if character.experience_points >= character.experience_to_next_level {
        Some(character.level + 1)
    } else {
        None
    }
}

/// Progression points awarded for reaching `level`.
///
/// Milestone levels (divisible by 10) earn an extra +2 attribute,
/// +3 skill, +1 specialization on top of the base table.
pub fn points_for_level(level: i32) -> ProgressionPoints {
    let mut points = ProgressionPoints {
        attribute: 2,
        skill: 3,
        specialization: if level % 5 == 0 { 1 } else { 0 },
        talent: if level % 3 == 0 { 1 } else { 0 },
    };
    if level % 10 == 0 {
        points.attribute += 2;
        points.skill += 3;
        points.specialization += 1;
    }
    points
}

/// What a call to [`process_level_up`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpSummary {
    pub starting_level: i32,
    pub new_level: i32,
    pub levels_gained: u32,
    pub points_awarded: ProgressionPoints,
    pub experience_remaining: u64,
    pub experience_to_next_level: u64,
}

/// Settle any pending level-ups.
///
/// Applies repeated single level-ups while [`check_level_up`] holds, so a
/// large experience gain crossing several levels resolves in one call.
/// Excess experience carries forward exactly; rewards accumulate from
/// every level crossed. Terminates at [`LEVEL_CAP`], retaining any
/// remaining experience.
pub fn process_level_up(
    character: &CharacterProfile,
) -> Result<(CharacterProfile, LevelUpSummary), ProgressionError> {
    validate_level(character.level)?;

    let mut next = character.clone();
    let starting_level = next.level;
    let mut awarded = ProgressionPoints::default();

    while let Some(new_level) = check_level_up(&next) {
        next.experience_points -= next.experience_to_next_level;
        next.level = new_level;
        next.experience_to_next_level = xp_curve(new_level);
        awarded.accumulate(&points_for_level(new_level));
        if new_level % 10 == 0 {
            next.completed_milestones.push(format!("level-{new_level}"));
        }
    }
    next.progression_points.accumulate(&awarded);

    let summary = LevelUpSummary {
        starting_level,
        new_level: next.level,
        levels_gained: (next.level - starting_level) as u32,
        points_awarded: awarded,
        experience_remaining: next.experience_points,
        experience_to_next_level: next.experience_to_next_level,
    };
    Ok((next, summary))
}

/// Grant experience and settle any level-ups it triggers.
pub fn grant_experience(
    character: &CharacterProfile,
    amount: u64,
) -> Result<(CharacterProfile, LevelUpSummary), ProgressionError> {
    let mut next = character.clone();
    next.experience_points += amount;
    next.total_experience_earned += amount;
    process_level_up(&next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::RawCharacterProfile;

    fn character_at(level: i32, experience_points: u64) -> CharacterProfile {
        let mut profile = CharacterProfile::from_raw(RawCharacterProfile {
            id: "p1".to_string(),
            name: "Test".to_string(),
            level: Some(level),
            ..RawCharacterProfile::default()
        });
        profile.experience_points = experience_points;
        profile
    }

    #[test]
    fn test_xp_curve_known_values() {
        assert_eq!(xp_to_next_level(1).unwrap(), 100);
        assert_eq!(xp_to_next_level(2).unwrap(), 150);
        assert_eq!(xp_to_next_level(3).unwrap(), 225);
        assert_eq!(total_xp_for_level(1).unwrap(), 0);
        assert_eq!(total_xp_for_level(2).unwrap(), 100);
        assert_eq!(total_xp_for_level(3).unwrap(), 250);
    }

    #[test]
    fn test_xp_curve_telescopes() {
        for level in 1..40 {
            assert_eq!(
                total_xp_for_level(level + 1).unwrap(),
                total_xp_for_level(level).unwrap() + xp_to_next_level(level).unwrap(),
                "mismatch at level {level}"
            );
        }
    }

    #[test]
    fn test_xp_curve_rejects_bad_levels() {
        assert_eq!(xp_to_next_level(0), Err(ProgressionError::InvalidLevel(0)));
        assert_eq!(xp_to_next_level(-1), Err(ProgressionError::InvalidLevel(-1)));
        assert_eq!(
            xp_to_next_level(101),
            Err(ProgressionError::LevelCeilingExceeded(101))
        );
        assert_eq!(total_xp_for_level(0), Err(ProgressionError::InvalidLevel(0)));
        assert_eq!(
            total_xp_for_level(101),
            Err(ProgressionError::LevelCeilingExceeded(101))
        );
    }

    #[test]
    fn test_check_level_up() {
        let ready = character_at(2, 150);
        assert_eq!(check_level_up(&ready), Some(3));

        let not_ready = character_at(2, 149);
        assert_eq!(check_level_up(&not_ready), None);

        let mut capped = character_at(99, 0);
        capped.level = LEVEL_CAP;
        capped.experience_points = u64::MAX;
        assert_eq!(check_level_up(&capped), None);
    }

    #[test]
    fn test_points_for_level_table() {
        let base = points_for_level(2);
        assert_eq!(base.attribute, 2);
        assert_eq!(base.skill, 3);
        assert_eq!(base.specialization, 0);
        assert_eq!(base.talent, 0);

        let third = points_for_level(3);
        assert_eq!(third.talent, 1);

        let fifth = points_for_level(5);
        assert_eq!(fifth.specialization, 1);
        assert_eq!(fifth.talent, 0);

        // Milestone levels are double-rewarded on top of base.
        let tenth = points_for_level(10);
        assert_eq!(tenth.attribute, 4);
        assert_eq!(tenth.skill, 6);
        assert_eq!(tenth.specialization, 2);
        assert_eq!(tenth.talent, 0);

        let thirtieth = points_for_level(30);
        assert_eq!(thirtieth.attribute, 4);
        assert_eq!(thirtieth.skill, 6);
        assert_eq!(thirtieth.specialization, 2);
        assert_eq!(thirtieth.talent, 1);
    }

    #[test]
    fn test_single_level_up_carries_excess() {
        let character = character_at(2, 175);
        let (next, summary) = process_level_up(&character).unwrap();
        assert_eq!(next.level, 3);
        assert_eq!(next.experience_points, 25);
        assert_eq!(next.experience_to_next_level, 225);
        assert_eq!(summary.levels_gained, 1);
        assert_eq!(summary.points_awarded, points_for_level(3));
    }

    #[test]
    fn test_multi_level_up_accumulates_rewards() {
        let character = character_at(1, 500);
        let (next, summary) = process_level_up(&character).unwrap();
        // 500 -> level 2 (spend 100) -> level 3 (spend 150) -> level 4 (spend 225)
        assert_eq!(next.level, 4);
        assert_eq!(next.experience_points, 25);
        assert_eq!(next.experience_to_next_level, 337);
        assert_eq!(summary.levels_gained, 3);
        // Rewards from every level crossed, not just the last.
        assert_eq!(summary.points_awarded.attribute, 6);
        assert_eq!(summary.points_awarded.skill, 9);
        assert_eq!(summary.points_awarded.talent, 1); // level 3
        assert_eq!(summary.points_awarded.specialization, 0);
        assert_eq!(next.progression_points, summary.points_awarded);
    }

    #[test]
    fn test_level_up_records_milestones() {
        let mut character = character_at(9, 0);
        character.experience_points = character.experience_to_next_level;
        let (next, _) = process_level_up(&character).unwrap();
        assert_eq!(next.level, 10);
        assert_eq!(next.completed_milestones, vec!["level-10".to_string()]);
    }

    #[test]
    fn test_level_up_stops_at_cap() {
        let mut character = character_at(99, 0);
        character.experience_points = character.experience_to_next_level + 12345;
        let (next, summary) = process_level_up(&character).unwrap();
        assert_eq!(next.level, LEVEL_CAP);
        assert_eq!(summary.levels_gained, 1);
        // Excess experience is retained, never discarded.
        assert_eq!(next.experience_points, 12345);
    }

    #[test]
    fn test_no_level_up_leaves_character_unchanged() {
        let character = character_at(5, 10);
        let (next, summary) = process_level_up(&character).unwrap();
        assert_eq!(next, character);
        assert_eq!(summary.levels_gained, 0);
        assert_eq!(summary.points_awarded, ProgressionPoints::default());
    }

    #[test]
    fn test_grant_experience_tracks_total() {
        let character = character_at(1, 0);
        let (next, summary) = grant_experience(&character, 120).unwrap();
        assert_eq!(next.level, 2);
        assert_eq!(next.experience_points, 20);
        assert_eq!(next.total_experience_earned, 120);
        assert_eq!(summary.levels_gained, 1);
    }
}
