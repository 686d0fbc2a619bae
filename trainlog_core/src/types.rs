//! Core domain types for the training log.
//!
//! This module defines the typed records the analytics engines work on:
//! - Lifestyle (wellness) entries
//! - Strength sessions (loaded lifts)
//! - Skill sessions (bodyweight / calisthenics metrics)
//! - Derived per-session load

use crate::Error;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Lifestyle
// ============================================================================

/// The seven daily wellness ratings, each on a 0-10 scale
///
/// `stress` has inverted polarity: higher is worse.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LifestyleRatings {
    pub sleep: f64,
    pub hydration: f64,
    pub nutrition: f64,
    pub stress: f64,
    pub concentration: f64,
    pub energy: f64,
    pub mood: f64,
}

/// One row of the lifestyle table
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LifestyleEntry {
    pub day: u32,
    /// Calendar date the entry was logged, when recorded
    pub date: Option<NaiveDate>,
    /// Present only when all seven ratings parsed
    pub ratings: Option<LifestyleRatings>,
    /// Stored readiness, or recomputed from `ratings` when the column is empty
    pub readiness: Option<u8>,
}

// ============================================================================
// Strength
// ============================================================================

/// Loaded lifts tracked in the strength table
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Lift {
    Squat,
    FrontSquat,
    Bench,
    Deadlift,
    OverheadPress,
    Row,
    WeightedPullup,
}

/// Movement patterns scored by the strength sub-index
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalLift {
    Squat,
    Bench,
    Deadlift,
}

impl Lift {
    pub const ALL: [Lift; 7] = [
        Lift::Squat,
        Lift::FrontSquat,
        Lift::Bench,
        Lift::Deadlift,
        Lift::OverheadPress,
        Lift::Row,
        Lift::WeightedPullup,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Lift::Squat => "squat",
            Lift::FrontSquat => "front_squat",
            Lift::Bench => "bench",
            Lift::Deadlift => "deadlift",
            Lift::OverheadPress => "ohp",
            Lift::Row => "row",
            Lift::WeightedPullup => "weighted_pullup",
        }
    }

    pub fn load_column(&self) -> &'static str {
        match self {
            Lift::Squat => "squat_kg",
            Lift::FrontSquat => "front_squat_kg",
            Lift::Bench => "bench_kg",
            Lift::Deadlift => "deadlift_kg",
            Lift::OverheadPress => "ohp_kg",
            Lift::Row => "row_kg",
            Lift::WeightedPullup => "weighted_pullup_kg",
        }
    }

    pub fn reps_column(&self) -> &'static str {
        match self {
            Lift::Squat => "squat_reps",
            Lift::FrontSquat => "front_squat_reps",
            Lift::Bench => "bench_reps",
            Lift::Deadlift => "deadlift_reps",
            Lift::OverheadPress => "ohp_reps",
            Lift::Row => "row_reps",
            Lift::WeightedPullup => "weighted_pullup_reps",
        }
    }

    /// Pattern this lift counts toward, if any
    ///
    /// Both squat variants map onto the squat pattern.
    pub fn canonical(&self) -> Option<CanonicalLift> {
        match self {
            Lift::Squat | Lift::FrontSquat => Some(CanonicalLift::Squat),
            Lift::Bench => Some(CanonicalLift::Bench),
            Lift::Deadlift => Some(CanonicalLift::Deadlift),
            _ => None,
        }
    }
}

impl fmt::Display for Lift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Lift {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "squat" | "back_squat" => Ok(Lift::Squat),
            "front_squat" => Ok(Lift::FrontSquat),
            "bench" | "bench_press" => Ok(Lift::Bench),
            "deadlift" => Ok(Lift::Deadlift),
            "ohp" | "overhead_press" | "military_press" => Ok(Lift::OverheadPress),
            "row" | "rowing" => Ok(Lift::Row),
            "weighted_pullup" | "weighted_pull_up" => Ok(Lift::WeightedPullup),
            _ => Err(Error::Input(format!("unknown lift '{}'", s))),
        }
    }
}

impl CanonicalLift {
    pub const ALL: [CanonicalLift; 3] =
        [CanonicalLift::Squat, CanonicalLift::Bench, CanonicalLift::Deadlift];
}

/// A logged (load, reps) pair; either side may be missing
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LiftEntry {
    pub load: Option<f64>,
    pub reps: Option<f64>,
}

impl LiftEntry {
    pub fn is_empty(&self) -> bool {
        self.load.is_none() && self.reps.is_none()
    }
}

/// One row of the strength table
///
/// Lifts that were not performed are simply absent from `lifts`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StrengthSession {
    pub session: u32,
    pub lifts: BTreeMap<Lift, LiftEntry>,
    pub rpe: Option<f64>,
}

// ============================================================================
// Skill (bodyweight)
// ============================================================================

/// Bodyweight-skill metrics tracked in the skill table
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SkillMetric {
    HspuReps,
    MuscleUpReps,
    PlancheSeconds,
    WeightedPullupKg,
    BoxJumpCm,
}

impl SkillMetric {
    pub const ALL: [SkillMetric; 5] = [
        SkillMetric::HspuReps,
        SkillMetric::MuscleUpReps,
        SkillMetric::PlancheSeconds,
        SkillMetric::WeightedPullupKg,
        SkillMetric::BoxJumpCm,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            SkillMetric::HspuReps => "hspu_reps",
            SkillMetric::MuscleUpReps => "muscle_up_reps",
            SkillMetric::PlancheSeconds => "planche_sec",
            SkillMetric::WeightedPullupKg => "weighted_pullup_kg",
            SkillMetric::BoxJumpCm => "box_jump_cm",
        }
    }
}

impl fmt::Display for SkillMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for SkillMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "hspu" | "hspu_reps" => Ok(SkillMetric::HspuReps),
            "mu" | "muscle_up" | "muscle_up_reps" => Ok(SkillMetric::MuscleUpReps),
            "planche" | "planche_sec" => Ok(SkillMetric::PlancheSeconds),
            "weighted_pullup" | "weighted_pullup_kg" => Ok(SkillMetric::WeightedPullupKg),
            "box_jump" | "box_jump_cm" => Ok(SkillMetric::BoxJumpCm),
            _ => Err(Error::Input(format!("unknown skill metric '{}'", s))),
        }
    }
}

/// One row of the skill table
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SkillSession {
    pub session: u32,
    pub metrics: BTreeMap<SkillMetric, f64>,
}

// ============================================================================
// Derived load
// ============================================================================

/// Which table carried most of a session's load
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionDomain {
    Strength,
    Skill,
    Mixed,
}

impl SessionDomain {
    pub fn label(&self) -> &'static str {
        match self {
            SessionDomain::Strength => "strength",
            SessionDomain::Skill => "calisthenics",
            SessionDomain::Mixed => "mixed",
        }
    }
}

/// Aggregate load of one session number across all domain tables
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionLoad {
    pub session: u32,
    pub load: f64,
    pub strength_load: f64,
    pub skill_load: f64,
}

impl SessionLoad {
    pub fn dominant(&self) -> SessionDomain {
        if self.strength_load > self.skill_load {
            SessionDomain::Strength
        } else if self.skill_load > self.strength_load {
            SessionDomain::Skill
        } else {
            SessionDomain::Mixed
        }
    }
}
