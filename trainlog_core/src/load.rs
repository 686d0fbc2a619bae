//! Per-session training load.
//!
//! Load is a crude, unitless volume proxy:
//! - a loaded lift contributes `load * reps` (load alone when reps are missing,
//!   reps alone when the load is missing)
//! - a bodyweight-skill metric contributes its value times a fixed difficulty
//!   weight from [`LoadWeights`]
//!
//! Contributions are summed per session number across the strength and skill
//! tables. Sessions that add up to zero are dropped.

use crate::config::LoadWeights;
use crate::{LiftEntry, SessionLoad, SkillMetric, SkillSession, StrengthSession};
use std::collections::BTreeMap;

/// Load contributed by one lift entry
pub fn lift_load(entry: &LiftEntry) -> f64 {
    let value = match (entry.load, entry.reps) {
        (Some(load), Some(reps)) => load * reps,
        (Some(load), None) => load,
        (None, Some(reps)) => reps,
        (None, None) => 0.0,
    };
    value.max(0.0)
}

/// Difficulty weight of a skill metric
pub fn skill_weight(metric: SkillMetric, weights: &LoadWeights) -> f64 {
    match metric {
        SkillMetric::HspuReps => weights.hspu_reps,
        SkillMetric::MuscleUpReps => weights.muscle_up_reps,
        SkillMetric::PlancheSeconds => weights.planche_sec,
        SkillMetric::WeightedPullupKg => weights.weighted_pullup_kg,
        SkillMetric::BoxJumpCm => weights.box_jump_cm,
    }
}

/// Total load of one strength row
pub fn strength_session_load(session: &StrengthSession) -> f64 {
    session.lifts.values().map(lift_load).sum()
}

/// Total load of one skill row
pub fn skill_session_load(session: &SkillSession, weights: &LoadWeights) -> f64 {
    session
        .metrics
        .iter()
        .map(|(metric, value)| (value * skill_weight(*metric, weights)).max(0.0))
        .sum()
}

/// Aggregate load per session number, ascending, zero-load sessions omitted
pub fn session_loads(
    strength: &[StrengthSession],
    skill: &[SkillSession],
    weights: &LoadWeights,
) -> Vec<SessionLoad> {
    // (strength, skill) per session number
    let mut totals: BTreeMap<u32, (f64, f64)> = BTreeMap::new();

    for session in strength {
        totals.entry(session.session).or_default().0 += strength_session_load(session);
    }
    for session in skill {
        totals.entry(session.session).or_default().1 += skill_session_load(session, weights);
    }

    let loads: Vec<SessionLoad> = totals
        .into_iter()
        .map(|(session, (strength_load, skill_load))| SessionLoad {
            session,
            load: strength_load + skill_load,
            strength_load,
            skill_load,
        })
        .filter(|s| s.load > 0.0)
        .collect();

    tracing::debug!("Computed load for {} sessions", loads.len());
    loads
}
