//! Table and column names shared by the entry commands and the analytics.
//!
//! Every column is referenced through these constants so the writer and the
//! reader of a table cannot drift apart. `check` compares a table header found
//! on disk against the expected layout.

use crate::{Lift, SkillMetric};
use serde::Serialize;
use std::fmt;

/// Column names of the lifestyle table
pub mod lifestyle {
    pub const DAY: &str = "day";
    pub const DATE: &str = "date";
    /// Format of the DATE cells
    pub const DATE_FORMAT: &str = "%Y-%m-%d";
    pub const SLEEP: &str = "sleep";
    pub const HYDRATION: &str = "hydration";
    pub const NUTRITION: &str = "nutrition";
    pub const STRESS: &str = "stress";
    pub const CONCENTRATION: &str = "concentration";
    pub const ENERGY: &str = "energy";
    pub const MOOD: &str = "mood";
    pub const READINESS: &str = "readiness";
}

/// Column names of the strength table (lift columns come from [`Lift`])
pub mod strength {
    pub const SESSION: &str = "session";
    pub const RPE: &str = "rpe";
}

/// Column names of the skill table (metric columns come from [`SkillMetric`])
pub mod skill {
    pub const SESSION: &str = "session";
}

/// Column names of the exam maxima table
pub mod exam_max {
    pub const EXERCISE: &str = "exercise";
    pub const MAX: &str = "max";
}

/// Column names of the derived effort table
pub mod effort_table {
    pub const EXERCISE: &str = "exercise";
    pub const CATEGORY: &str = "category";
    pub const UNIT: &str = "unit";
    pub const RPE_COLUMNS: [&str; 6] = ["rpe_5", "rpe_6", "rpe_7", "rpe_8", "rpe_9", "rpe_10"];
}

/// Column names of the daily working-load log
pub mod daily {
    pub const ENTRY: &str = "entry";
    pub const DATE: &str = "date";
    pub const EXERCISE: &str = "exercise";
    pub const LOAD: &str = "load_kg";
    pub const REPS: &str = "reps";
}

/// The tables held by the record store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Lifestyle,
    Strength,
    Skill,
    ExamMax,
    EffortTable,
    Daily,
}

impl Table {
    pub const ALL: [Table; 6] = [
        Table::Lifestyle,
        Table::Strength,
        Table::Skill,
        Table::ExamMax,
        Table::EffortTable,
        Table::Daily,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Table::Lifestyle => "lifestyle",
            Table::Strength => "strength",
            Table::Skill => "skill",
            Table::ExamMax => "exam_max",
            Table::EffortTable => "effort_table",
            Table::Daily => "daily",
        }
    }

    /// Column holding the unique row key
    pub fn key_column(&self) -> &'static str {
        match self {
            Table::Lifestyle => lifestyle::DAY,
            Table::Strength => strength::SESSION,
            Table::Skill => skill::SESSION,
            Table::ExamMax => exam_max::EXERCISE,
            Table::EffortTable => effort_table::EXERCISE,
            Table::Daily => daily::ENTRY,
        }
    }

    /// Whether keys are integers (session/day/entry numbers)
    pub fn numeric_key(&self) -> bool {
        matches!(
            self,
            Table::Lifestyle | Table::Strength | Table::Skill | Table::Daily
        )
    }

    /// Expected columns, key first
    pub fn columns(&self) -> Vec<&'static str> {
        match self {
            Table::Lifestyle => vec![
                lifestyle::DAY,
                lifestyle::DATE,
                lifestyle::SLEEP,
                lifestyle::HYDRATION,
                lifestyle::NUTRITION,
                lifestyle::STRESS,
                lifestyle::CONCENTRATION,
                lifestyle::ENERGY,
                lifestyle::MOOD,
                lifestyle::READINESS,
            ],
            Table::Strength => {
                let mut cols = vec![strength::SESSION];
                for lift in Lift::ALL {
                    cols.push(lift.load_column());
                    cols.push(lift.reps_column());
                }
                cols.push(strength::RPE);
                cols
            }
            Table::Skill => {
                let mut cols = vec![skill::SESSION];
                cols.extend(SkillMetric::ALL.iter().map(|m| m.column()));
                cols
            }
            Table::ExamMax => vec![exam_max::EXERCISE, exam_max::MAX],
            Table::EffortTable => {
                let mut cols = vec![
                    effort_table::EXERCISE,
                    effort_table::CATEGORY,
                    effort_table::UNIT,
                ];
                cols.extend(effort_table::RPE_COLUMNS);
                cols
            }
            Table::Daily => vec![
                daily::ENTRY,
                daily::DATE,
                daily::EXERCISE,
                daily::LOAD,
                daily::REPS,
            ],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How serious a header mismatch is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The table cannot be keyed; every row will be ignored
    Error,
    /// A column will be ignored by the analytics
    Warning,
}

/// A single mismatch between a stored header and the expected layout
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SchemaIssue {
    pub table: Table,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}] {}: {}", level, self.table, self.message)
    }
}

/// Compare a stored header against the expected columns of `table`
///
/// Expected columns that are missing are fine (sparse tables only gain a
/// column once something is written to it). Unknown columns are reported
/// because they usually mean a renamed field whose data would be silently
/// ignored.
pub fn check(table: Table, headers: &[String]) -> Vec<SchemaIssue> {
    let expected = table.columns();
    let mut issues = Vec::new();

    if !headers.iter().any(|h| h.trim() == table.key_column()) {
        issues.push(SchemaIssue {
            table,
            severity: Severity::Error,
            message: format!("missing key column '{}'", table.key_column()),
        });
    }

    for header in headers {
        let header = header.trim();
        if !expected.contains(&header) {
            issues.push(SchemaIssue {
                table,
                severity: Severity::Warning,
                message: format!("unknown column '{}' will be ignored", header),
            });
        }
    }

    issues
}
