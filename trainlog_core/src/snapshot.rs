//! Typed, immutable view of the record store.
//!
//! A snapshot is read once per command and handed to the pure analytics
//! functions. Missing tables stay `None`; unreadable rows are dropped.

use crate::numeric::{field, parse_key};
use crate::readiness::readiness;
use crate::schema::{self, Table};
use crate::store::{RawRow, RecordStore};
use crate::{
    LifestyleEntry, LifestyleRatings, Lift, LiftEntry, SkillMetric, SkillSession,
    StrengthSession,
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// All domain tables, typed and sorted by key
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct Snapshot {
    pub lifestyle: Option<Vec<LifestyleEntry>>,
    pub strength: Option<Vec<StrengthSession>>,
    pub skill: Option<Vec<SkillSession>>,
}

impl Snapshot {
    /// Read every analytics table from `store`
    ///
    /// A table that cannot be read is logged and treated as missing.
    pub fn load(store: &dyn RecordStore) -> Self {
        Self {
            lifestyle: read_soft(store, Table::Lifestyle).map(|rows| lifestyle_entries(&rows)),
            strength: read_soft(store, Table::Strength).map(|rows| strength_sessions(&rows)),
            skill: read_soft(store, Table::Skill).map(|rows| skill_sessions(&rows)),
        }
    }

    pub fn lifestyle(&self) -> &[LifestyleEntry] {
        self.lifestyle.as_deref().unwrap_or(&[])
    }

    pub fn strength(&self) -> &[StrengthSession] {
        self.strength.as_deref().unwrap_or(&[])
    }

    pub fn skill(&self) -> &[SkillSession] {
        self.skill.as_deref().unwrap_or(&[])
    }
}

fn read_soft(store: &dyn RecordStore, table: Table) -> Option<Vec<RawRow>> {
    match store.read_table(table) {
        Ok(Some(rows)) => Some(rows),
        Ok(None) => {
            tracing::info!("No '{}' table yet", table);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to read table '{}': {}. Treating as missing.", table, e);
            None
        }
    }
}

/// Key rows by their integer key, keeping the last row for a repeated key
fn keyed<'a>(rows: &'a [RawRow], table: Table) -> BTreeMap<u32, &'a RawRow> {
    let key_col = table.key_column();
    let mut keyed = BTreeMap::new();

    for row in rows {
        let Some(key) = row.get(key_col).and_then(|k| parse_key(k)) else {
            tracing::warn!("Skipping '{}' row without a valid {}: {:?}", table, key_col, row);
            continue;
        };
        if keyed.insert(key, row).is_some() {
            tracing::warn!("Duplicate {} {} in '{}', keeping the last row", key_col, key, table);
        }
    }

    keyed
}

/// Build lifestyle entries from raw rows
pub fn lifestyle_entries(rows: &[RawRow]) -> Vec<LifestyleEntry> {
    use schema::lifestyle as col;

    keyed(rows, Table::Lifestyle)
        .into_iter()
        .map(|(day, row)| {
            let ratings = (|| {
                Some(LifestyleRatings {
                    sleep: field(row, col::SLEEP)?,
                    hydration: field(row, col::HYDRATION)?,
                    nutrition: field(row, col::NUTRITION)?,
                    stress: field(row, col::STRESS)?,
                    concentration: field(row, col::CONCENTRATION)?,
                    energy: field(row, col::ENERGY)?,
                    mood: field(row, col::MOOD)?,
                })
            })();

            let stored = field(row, col::READINESS).map(|r| r.round().clamp(0.0, 100.0) as u8);
            let readiness = stored.or_else(|| ratings.as_ref().map(readiness));

            let date = row.get(col::DATE).and_then(|raw| {
                NaiveDate::parse_from_str(raw, col::DATE_FORMAT)
                    .map_err(|e| tracing::debug!("Unparseable date '{}' on day {}: {}", raw, day, e))
                    .ok()
            });

            LifestyleEntry {
                day,
                date,
                ratings,
                readiness,
            }
        })
        .collect()
}

/// Build strength sessions from raw rows
pub fn strength_sessions(rows: &[RawRow]) -> Vec<StrengthSession> {
    keyed(rows, Table::Strength)
        .into_iter()
        .map(|(session, row)| {
            let lifts = Lift::ALL
                .iter()
                .filter_map(|lift| {
                    let entry = LiftEntry {
                        load: field(row, lift.load_column()),
                        reps: field(row, lift.reps_column()),
                    };
                    (!entry.is_empty()).then_some((*lift, entry))
                })
                .collect();

            StrengthSession {
                session,
                lifts,
                rpe: field(row, schema::strength::RPE),
            }
        })
        .collect()
}

/// Build skill sessions from raw rows
pub fn skill_sessions(rows: &[RawRow]) -> Vec<SkillSession> {
    keyed(rows, Table::Skill)
        .into_iter()
        .map(|(session, row)| {
            let metrics = SkillMetric::ALL
                .iter()
                .filter_map(|metric| field(row, metric.column()).map(|v| (*metric, v)))
                .collect();

            SkillSession { session, metrics }
        })
        .collect()
}
