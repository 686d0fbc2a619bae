//! Hybrid athlete score.
//!
//! Three sub-indices, each the mean of personal-best / target ratios (capped)
//! scaled to 0-100:
//! - Strength (weight 0.4): Epley 1RM estimates for squat, bench, deadlift
//! - Skill (weight 0.4): HSPU, muscle-up, planche hold, weighted pull-up
//! - Power (weight 0.2): weighted pull-up, box jump
//!
//! The weighted pull-up feeds both Skill and Power.

use crate::config::TargetConfig;
use crate::snapshot::Snapshot;
use crate::{CanonicalLift, SkillMetric, SkillSession, StrengthSession};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const STRENGTH_WEIGHT: f64 = 0.4;
const SKILL_WEIGHT: f64 = 0.4;
const POWER_WEIGHT: f64 = 0.2;

const SKILL_METRICS: [SkillMetric; 4] = [
    SkillMetric::HspuReps,
    SkillMetric::MuscleUpReps,
    SkillMetric::PlancheSeconds,
    SkillMetric::WeightedPullupKg,
];

const POWER_METRICS: [SkillMetric; 2] = [SkillMetric::WeightedPullupKg, SkillMetric::BoxJumpCm];

/// Epley one-repetition-max estimate
pub fn epley(load: f64, reps: f64) -> f64 {
    load * (1.0 + reps / 30.0)
}

/// Best estimate per movement pattern within one session
///
/// Only entries with both load and reps produce an estimate; squat variants
/// compete for the same pattern.
pub fn session_estimates(session: &StrengthSession) -> BTreeMap<CanonicalLift, f64> {
    let mut best: BTreeMap<CanonicalLift, f64> = BTreeMap::new();

    for (lift, entry) in &session.lifts {
        let (Some(canonical), Some(load), Some(reps)) = (lift.canonical(), entry.load, entry.reps)
        else {
            continue;
        };
        let estimate = epley(load, reps);
        best.entry(canonical)
            .and_modify(|b| *b = b.max(estimate))
            .or_insert(estimate);
    }

    best
}

/// Best estimate per movement pattern across all sessions
pub fn strength_bests(sessions: &[StrengthSession]) -> BTreeMap<CanonicalLift, f64> {
    let mut best: BTreeMap<CanonicalLift, f64> = BTreeMap::new();
    for session in sessions {
        for (lift, estimate) in session_estimates(session) {
            best.entry(lift)
                .and_modify(|b| *b = b.max(estimate))
                .or_insert(estimate);
        }
    }
    best
}

/// Highest logged value per skill metric
pub fn skill_bests(sessions: &[SkillSession]) -> BTreeMap<SkillMetric, f64> {
    let mut best: BTreeMap<SkillMetric, f64> = BTreeMap::new();
    for session in sessions {
        for (metric, value) in &session.metrics {
            best.entry(*metric)
                .and_modify(|b| *b = b.max(*value))
                .or_insert(*value);
        }
    }
    best
}

/// `best / target`, bounded to `[0, cap]`
pub fn capped_ratio(best: f64, target: f64, cap: f64) -> f64 {
    if target <= 0.0 {
        return 0.0;
    }
    (best / target).clamp(0.0, cap)
}

pub fn lift_target(lift: CanonicalLift, targets: &TargetConfig) -> f64 {
    match lift {
        CanonicalLift::Squat => targets.squat,
        CanonicalLift::Bench => targets.bench,
        CanonicalLift::Deadlift => targets.deadlift,
    }
}

pub fn skill_target(metric: SkillMetric, targets: &TargetConfig) -> f64 {
    match metric {
        SkillMetric::HspuReps => targets.hspu_reps,
        SkillMetric::MuscleUpReps => targets.muscle_up_reps,
        SkillMetric::PlancheSeconds => targets.planche_sec,
        SkillMetric::WeightedPullupKg => targets.weighted_pullup_kg,
        SkillMetric::BoxJumpCm => targets.box_jump_cm,
    }
}

/// Skill level derived from the Skill sub-index
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum SkillTier {
    Beginner,
    Intermediate,
    Advanced,
    Elite,
}

impl SkillTier {
    pub fn from_index(skill_index: f64) -> Self {
        if skill_index < 30.0 {
            SkillTier::Beginner
        } else if skill_index < 60.0 {
            SkillTier::Intermediate
        } else if skill_index < 85.0 {
            SkillTier::Advanced
        } else {
            SkillTier::Elite
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkillTier::Beginner => "Beginner",
            SkillTier::Intermediate => "Intermediate",
            SkillTier::Advanced => "Advanced",
            SkillTier::Elite => "Elite",
        }
    }
}

impl fmt::Display for SkillTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One personal best compared against its target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Component<K> {
    pub key: K,
    pub best: Option<f64>,
    pub target: f64,
    pub ratio: f64,
}

/// Composite score with its parts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HybridScore {
    pub strength: f64,
    pub skill: f64,
    pub power: f64,
    /// Weighted composite, clamped to 0-100
    pub score: f64,
    /// False when the skill table is missing or empty; Skill and Power are 0 then
    pub skill_data_present: bool,
    pub lifts: Vec<Component<CanonicalLift>>,
    pub skill_metrics: Vec<Component<SkillMetric>>,
}

impl HybridScore {
    pub fn skill_tier(&self) -> SkillTier {
        SkillTier::from_index(self.skill)
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Compute the hybrid score from a snapshot
///
/// Returns `None` when there are no strength rows at all. Missing skill data
/// does not make the score unavailable; Skill and Power fall back to 0.
pub fn hybrid_score(snapshot: &Snapshot, targets: &TargetConfig) -> Option<HybridScore> {
    let strength_rows = snapshot.strength.as_deref().filter(|rows| !rows.is_empty());
    let Some(strength_rows) = strength_rows else {
        tracing::info!("No strength data, hybrid score unavailable");
        return None;
    };

    let cap = targets.ratio_cap;

    let bests = strength_bests(strength_rows);
    let lifts: Vec<Component<CanonicalLift>> = CanonicalLift::ALL
        .iter()
        .map(|lift| {
            let target = lift_target(*lift, targets);
            let best = bests.get(lift).copied();
            Component {
                key: *lift,
                best,
                target,
                ratio: best.map_or(0.0, |b| capped_ratio(b, target, cap)),
            }
        })
        .collect();
    let strength = mean(lifts.iter().map(|c| c.ratio)) * 100.0;

    let skill_rows = snapshot.skill();
    let skill_data_present = !skill_rows.is_empty();
    let skill_best = skill_bests(skill_rows);
    let skill_metrics: Vec<Component<SkillMetric>> = SkillMetric::ALL
        .iter()
        .map(|metric| {
            let target = skill_target(*metric, targets);
            let best = skill_best.get(metric).copied();
            Component {
                key: *metric,
                best,
                target,
                ratio: best.map_or(0.0, |b| capped_ratio(b, target, cap)),
            }
        })
        .collect();

    let ratio_of = |metric: &SkillMetric| {
        skill_metrics
            .iter()
            .find(|c| c.key == *metric)
            .map_or(0.0, |c| c.ratio)
    };
    let skill = mean(SKILL_METRICS.iter().map(ratio_of)) * 100.0;
    let power = mean(POWER_METRICS.iter().map(ratio_of)) * 100.0;

    let score = (STRENGTH_WEIGHT * strength + SKILL_WEIGHT * skill + POWER_WEIGHT * power)
        .clamp(0.0, 100.0);

    tracing::debug!(
        "Hybrid score {:.1} (strength {:.1}, skill {:.1}, power {:.1})",
        score,
        strength,
        skill,
        power
    );

    Some(HybridScore {
        strength,
        skill,
        power,
        score,
        skill_data_present,
        lifts,
        skill_metrics,
    })
}
