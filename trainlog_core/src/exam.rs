//! Exam-based effort table.
//!
//! From a tested maximum per exercise, derive the target for each perceived
//! effort level from RPE 5 to RPE 10. Load-based exercises tolerate a higher
//! relative intensity near the top than rep- or time-based ones, so they use
//! a tighter set of fractions.
//!
//! Handstand progressions are rarely all tested. Untested steps are inferred
//! from the step before them by halving (minimum 1):
//!
//! ```text
//! Pike Hold -> HSPU Negative -> HSPU Wall Partial -> Handstand Push-up
//! ```
//!
//! The day's working sets are logged against the same catalogue.

use crate::numeric::{field, parse_key};
use crate::schema::{daily, effort_table, exam_max};
use crate::store::RawRow;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Fractions of the max for RPE 5..=10 on load-based exercises
pub const LOAD_FRACTIONS: [f64; 6] = [0.80, 0.86, 0.90, 0.94, 0.97, 1.00];

/// Fractions of the max for RPE 5..=10 on rep- or time-based exercises
pub const VOLUME_FRACTIONS: [f64; 6] = [0.50, 0.60, 0.70, 0.80, 0.90, 1.00];

/// Parent -> child edges of the handstand progression, in walk order
pub const PROGRESSION_CHAIN: [(&str, &str); 3] = [
    ("Pike Hold", "HSPU Negative"),
    ("HSPU Negative", "HSPU Wall Partial"),
    ("HSPU Wall Partial", "Handstand Push-up"),
];

/// Unit an exercise maximum is recorded in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Kg,
    Reps,
    Seconds,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Reps => "reps",
            Unit::Seconds => "sec",
        }
    }

    fn fractions(&self) -> &'static [f64; 6] {
        match self {
            Unit::Kg => &LOAD_FRACTIONS,
            Unit::Reps | Unit::Seconds => &VOLUME_FRACTIONS,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Broad grouping used when displaying the table
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExamCategory {
    Lower,
    Push,
    Pull,
    Hinge,
    Skill,
    Power,
    Conditioning,
    Accessory,
}

impl ExamCategory {
    pub fn label(&self) -> &'static str {
        match self {
            ExamCategory::Lower => "lower",
            ExamCategory::Push => "push",
            ExamCategory::Pull => "pull",
            ExamCategory::Hinge => "hinge",
            ExamCategory::Skill => "skill",
            ExamCategory::Power => "power",
            ExamCategory::Conditioning => "conditioning",
            ExamCategory::Accessory => "accessory",
        }
    }
}

impl fmt::Display for ExamCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An exercise that can be tested for a maximum
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct ExamExercise {
    pub name: &'static str,
    pub category: ExamCategory,
    pub unit: Unit,
}

const fn ex(name: &'static str, category: ExamCategory, unit: Unit) -> ExamExercise {
    ExamExercise {
        name,
        category,
        unit,
    }
}

static EXAM_CATALOG: Lazy<Vec<ExamExercise>> = Lazy::new(|| {
    use ExamCategory::*;
    vec![
        ex("Back Squat", Lower, Unit::Kg),
        ex("Front Squat", Lower, Unit::Kg),
        ex("Bulgarian Split Squat", Lower, Unit::Kg),
        ex("Hack Squat", Lower, Unit::Kg),
        ex("Leg Press", Lower, Unit::Kg),
        ex("Belt Squat", Lower, Unit::Kg),
        ex("Pistol Squat", Lower, Unit::Reps),
        ex("Snatch Grip Deadlift", Hinge, Unit::Kg),
        ex("Romanian Deadlift", Hinge, Unit::Kg),
        ex("Good Morning", Hinge, Unit::Kg),
        ex("Hip Thrust", Hinge, Unit::Kg),
        ex("Bench Press", Push, Unit::Kg),
        ex("Military Press", Push, Unit::Kg),
        ex("Weighted Push-ups", Push, Unit::Kg),
        ex("Dips", Push, Unit::Reps),
        ex("Diamond Push-ups", Push, Unit::Reps),
        ex("Weighted Pull-up", Pull, Unit::Kg),
        ex("Rowing", Pull, Unit::Kg),
        ex("Lat Pulldown", Pull, Unit::Kg),
        ex("Pike Hold", Skill, Unit::Seconds),
        ex("HSPU Negative", Skill, Unit::Reps),
        ex("HSPU Wall Partial", Skill, Unit::Reps),
        ex("Handstand Push-up", Skill, Unit::Reps),
        ex("Muscle-up", Skill, Unit::Reps),
        ex("Planche", Skill, Unit::Seconds),
        ex("Box Jump", Power, Unit::Reps),
        ex("Burpees", Conditioning, Unit::Reps),
        ex("Farmer Walk", Conditioning, Unit::Seconds),
        ex("Leg Extension", Accessory, Unit::Kg),
        ex("Leg Curl", Accessory, Unit::Kg),
        ex("Calf Raise", Accessory, Unit::Kg),
        ex("Incline Fly", Accessory, Unit::Kg),
        ex("Lateral Raise", Accessory, Unit::Kg),
        ex("Triceps Extension", Accessory, Unit::Kg),
        ex("Biceps Curl", Accessory, Unit::Kg),
        ex("Face Pull", Accessory, Unit::Kg),
        ex("Kickback", Accessory, Unit::Kg),
        ex("Abduction", Accessory, Unit::Kg),
    ]
});

/// Lowercase name (and short alias) -> catalog index
static EXAM_INDEX: Lazy<HashMap<String, usize>> = Lazy::new(|| {
    let mut index: HashMap<String, usize> = EXAM_CATALOG
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.to_lowercase(), i))
        .collect();

    for (alias, name) in [
        ("hspu", "handstand push-up"),
        ("mu", "muscle-up"),
        ("ohp", "military press"),
        ("traction lestée", "weighted pull-up"),
        ("pompes diamant", "diamond push-ups"),
    ] {
        if let Some(&i) = index.get(name) {
            index.insert(alias.to_string(), i);
        }
    }
    index
});

/// Every testable exercise, in display order
pub fn exam_catalog() -> &'static [ExamExercise] {
    &EXAM_CATALOG
}

/// Look up an exercise by name or alias, ignoring case
pub fn find_exercise(name: &str) -> Option<&'static ExamExercise> {
    EXAM_INDEX
        .get(&name.trim().to_lowercase())
        .map(|&i| &EXAM_CATALOG[i])
}

/// A maximum for one exercise, tested or inferred
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ExamMax {
    pub exercise: ExamExercise,
    pub max: f64,
    pub inferred: bool,
}

/// Tested maxima from the raw exam table, keyed by catalog name
///
/// Unknown exercises and non-positive or unparseable maxima are skipped.
pub fn tested_maxima(rows: &[RawRow]) -> BTreeMap<&'static str, f64> {
    let mut maxima = BTreeMap::new();

    for row in rows {
        let Some(name) = row.get(exam_max::EXERCISE) else {
            continue;
        };
        let Some(exercise) = find_exercise(name) else {
            tracing::warn!("Ignoring exam result for unknown exercise '{}'", name);
            continue;
        };
        match field(row, exam_max::MAX) {
            Some(max) if max > 0.0 => {
                maxima.insert(exercise.name, max);
            }
            _ => tracing::debug!("No usable max for '{}'", exercise.name),
        }
    }

    maxima
}

/// Halving rule for one progression step
///
/// Halves round to even, so an odd parent max of 45 gives 22.
pub fn infer_from_parent(parent_max: f64) -> f64 {
    (parent_max / 2.0).round_ties_even().max(1.0)
}

/// Tested maxima plus those inferred along the progression chain
///
/// Returned in catalog order. A tested value is never overwritten.
pub fn resolve_maxima(tested: &BTreeMap<&'static str, f64>) -> Vec<ExamMax> {
    let mut inferred: BTreeMap<&'static str, f64> = BTreeMap::new();

    for (parent, child) in PROGRESSION_CHAIN {
        if tested.contains_key(child) {
            continue;
        }
        let parent_max = tested.get(parent).or_else(|| inferred.get(parent)).copied();
        if let Some(parent_max) = parent_max {
            let value = infer_from_parent(parent_max);
            tracing::debug!("Inferred {} max {} from {} ({})", child, value, parent, parent_max);
            inferred.insert(child, value);
        }
    }

    exam_catalog()
        .iter()
        .filter_map(|exercise| {
            if let Some(&max) = tested.get(exercise.name) {
                Some(ExamMax {
                    exercise: *exercise,
                    max,
                    inferred: false,
                })
            } else {
                inferred.get(exercise.name).map(|&max| ExamMax {
                    exercise: *exercise,
                    max,
                    inferred: true,
                })
            }
        })
        .collect()
}

fn round_target(value: f64, unit: Unit) -> f64 {
    match unit {
        Unit::Kg => (value * 2.0).round() / 2.0,
        Unit::Reps | Unit::Seconds => value.round().max(1.0),
    }
}

/// Targets for RPE 5 through RPE 10
pub fn effort_targets(max: f64, unit: Unit) -> [f64; 6] {
    (*unit.fractions()).map(|fraction| round_target(max * fraction, unit))
}

/// One row of the effort table
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct EffortRow {
    pub exercise: &'static str,
    pub category: ExamCategory,
    pub unit: Unit,
    pub inferred: bool,
    /// Targets for RPE 5 through RPE 10
    pub targets: [f64; 6],
}

impl EffortRow {
    /// Cells to persist in the effort table (key column included)
    pub fn to_raw_row(&self) -> RawRow {
        let mut row = RawRow::new();
        row.insert(effort_table::EXERCISE.to_string(), self.exercise.to_string());
        row.insert(effort_table::CATEGORY.to_string(), self.category.to_string());
        row.insert(effort_table::UNIT.to_string(), self.unit.to_string());
        for (column, target) in effort_table::RPE_COLUMNS.iter().zip(self.targets) {
            row.insert(column.to_string(), target.to_string());
        }
        row
    }
}

/// Effort table for every exercise with a tested or inferred maximum
pub fn effort_table(exam_rows: &[RawRow]) -> Vec<EffortRow> {
    resolve_maxima(&tested_maxima(exam_rows))
        .into_iter()
        .map(|m| EffortRow {
            exercise: m.exercise.name,
            category: m.exercise.category,
            unit: m.exercise.unit,
            inferred: m.inferred,
            targets: effort_targets(m.max, m.exercise.unit),
        })
        .collect()
}

/// Entry number the day's working set for `exercise` is written to
///
/// The first entry for the exercise that still lacks its load or reps is
/// filled in; otherwise a new entry follows the highest one in use.
pub fn daily_entry(rows: &[RawRow], exercise: &str) -> u32 {
    let open = rows.iter().find(|row| {
        let same = row
            .get(daily::EXERCISE)
            .is_some_and(|name| name.trim().eq_ignore_ascii_case(exercise.trim()));
        same && (field(row, daily::LOAD).is_none() || field(row, daily::REPS).is_none())
    });
    if let Some(entry) = open.and_then(|row| row.get(daily::ENTRY)).and_then(|e| parse_key(e)) {
        return entry;
    }

    rows.iter()
        .filter_map(|row| row.get(daily::ENTRY).and_then(|e| parse_key(e)))
        .max()
        .map_or(1, |last| last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::raw_row;

    fn tested(pairs: &[(&'static str, f64)]) -> BTreeMap<&'static str, f64> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<_> = exam_catalog().iter().map(|e| e.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), exam_catalog().len());
    }

    #[test]
    fn test_chain_nodes_are_in_catalog() {
        for (parent, child) in PROGRESSION_CHAIN {
            assert!(find_exercise(parent).is_some());
            assert!(find_exercise(child).is_some());
        }
    }

    #[test]
    fn test_find_exercise_aliases() {
        assert_eq!(find_exercise("hspu").unwrap().name, "Handstand Push-up");
        assert_eq!(find_exercise("  BACK SQUAT ").unwrap().name, "Back Squat");
        assert!(find_exercise("Zercher Squat").is_none());
    }

    #[test]
    fn test_load_based_targets() {
        let targets = effort_targets(100.0, Unit::Kg);
        assert_eq!(targets, [80.0, 86.0, 90.0, 94.0, 97.0, 100.0]);
    }

    #[test]
    fn test_kg_targets_round_to_half() {
        let targets = effort_targets(142.5, Unit::Kg);
        // 142.5 * 0.86 = 122.55
        assert_eq!(targets[1], 122.5);
        assert_eq!(targets[5], 142.5);
    }

    #[test]
    fn test_rep_based_targets() {
        let targets = effort_targets(20.0, Unit::Reps);
        assert_eq!(targets, [10.0, 12.0, 14.0, 16.0, 18.0, 20.0]);
    }

    #[test]
    fn test_rep_targets_never_below_one() {
        let targets = effort_targets(1.0, Unit::Seconds);
        assert!(targets.iter().all(|&t| t >= 1.0));
    }

    #[test]
    fn test_full_chain_inference() {
        let maxima = resolve_maxima(&tested(&[("Pike Hold", 40.0)]));
        let get = |name: &str| maxima.iter().find(|m| m.exercise.name == name).unwrap();

        assert!(!get("Pike Hold").inferred);
        assert_eq!(get("HSPU Negative").max, 20.0);
        assert_eq!(get("HSPU Wall Partial").max, 10.0);
        assert_eq!(get("Handstand Push-up").max, 5.0);
        assert!(get("Handstand Push-up").inferred);
    }

    #[test]
    fn test_tested_values_win_and_feed_the_chain() {
        let maxima = resolve_maxima(&tested(&[("Pike Hold", 40.0), ("HSPU Wall Partial", 3.0)]));
        let get = |name: &str| maxima.iter().find(|m| m.exercise.name == name).unwrap();

        assert_eq!(get("HSPU Negative").max, 20.0);
        assert_eq!(get("HSPU Wall Partial").max, 3.0);
        assert!(!get("HSPU Wall Partial").inferred);
        // round(3 / 2) = 2
        assert_eq!(get("Handstand Push-up").max, 2.0);
    }

    #[test]
    fn test_odd_parent_rounds_half_to_even() {
        assert_eq!(infer_from_parent(45.0), 22.0);
        assert_eq!(infer_from_parent(47.0), 24.0);
        assert_eq!(infer_from_parent(3.0), 2.0);

        let maxima = resolve_maxima(&tested(&[("Pike Hold", 45.0)]));
        let get = |name: &str| maxima.iter().find(|m| m.exercise.name == name).unwrap();
        assert_eq!(get("HSPU Negative").max, 22.0);
        assert_eq!(get("HSPU Wall Partial").max, 11.0);
        assert_eq!(get("Handstand Push-up").max, 6.0);
    }

    #[test]
    fn test_inference_floor() {
        let maxima = resolve_maxima(&tested(&[("Pike Hold", 1.0)]));
        assert!(maxima.iter().filter(|m| m.inferred).all(|m| m.max == 1.0));
        assert_eq!(maxima.iter().filter(|m| m.inferred).count(), 3);
    }

    #[test]
    fn test_no_parent_no_inference() {
        let maxima = resolve_maxima(&tested(&[("Back Squat", 150.0)]));
        assert_eq!(maxima.len(), 1);
    }

    #[test]
    fn test_effort_table_from_rows() {
        let rows = vec![
            raw_row([("exercise", "back squat"), ("max", "150")]),
            raw_row([("exercise", "Unknown Lift"), ("max", "90")]),
            raw_row([("exercise", "Dips"), ("max", "n/a")]),
            raw_row([("exercise", "Planche"), ("max", "10")]),
        ];
        let table = effort_table(&rows);

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].exercise, "Back Squat");
        assert_eq!(table[0].targets[0], 120.0);
        assert_eq!(table[1].exercise, "Planche");
        assert_eq!(table[1].unit, Unit::Seconds);
        assert_eq!(table[1].targets, [5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn test_effort_row_cells() {
        let row = EffortRow {
            exercise: "Dips",
            category: ExamCategory::Push,
            unit: Unit::Reps,
            inferred: false,
            targets: [5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        };
        let cells = row.to_raw_row();

        assert_eq!(cells["exercise"], "Dips");
        assert_eq!(cells["category"], "push");
        assert_eq!(cells["unit"], "reps");
        assert_eq!(cells["rpe_5"], "5");
        assert_eq!(cells["rpe_10"], "10");
    }

    #[test]
    fn test_daily_entry_appends() {
        assert_eq!(daily_entry(&[], "Back Squat"), 1);

        let rows = vec![
            raw_row([("entry", "1"), ("exercise", "Back Squat"), ("load_kg", "100"), ("reps", "5")]),
            raw_row([("entry", "4"), ("exercise", "Dips"), ("load_kg", "20"), ("reps", "8")]),
        ];
        assert_eq!(daily_entry(&rows, "Back Squat"), 5);
    }

    #[test]
    fn test_daily_entry_fills_incomplete_row() {
        let rows = vec![
            raw_row([("entry", "1"), ("exercise", "Dips"), ("load_kg", "20"), ("reps", "8")]),
            raw_row([("entry", "2"), ("exercise", "Back Squat"), ("load_kg", "100")]),
            raw_row([("entry", "3"), ("exercise", "back squat")]),
        ];
        assert_eq!(daily_entry(&rows, "Back Squat"), 2);
        assert_eq!(daily_entry(&rows, "Dips"), 4);
    }
}
