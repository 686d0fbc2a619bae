//! Daily readiness from the lifestyle ratings.
//!
//! Readiness blends the six positive ratings (70%) with the inverted stress
//! rating (30%) on a 0-10 scale, then rescales to 0-100.

use crate::{LifestyleEntry, LifestyleRatings};

const POSITIVE_WEIGHT: f64 = 0.7;
const STRESS_WEIGHT: f64 = 0.3;

/// Readiness score (0-100) for a set of ratings
pub fn readiness(ratings: &LifestyleRatings) -> u8 {
    let positive = (ratings.sleep
        + ratings.hydration
        + ratings.nutrition
        + ratings.concentration
        + ratings.energy
        + ratings.mood)
        / 6.0;
    let calm = 10.0 - ratings.stress;

    let score = (POSITIVE_WEIGHT * positive + STRESS_WEIGHT * calm) * 10.0;
    score.round_ties_even().clamp(0.0, 100.0) as u8
}

/// Next unused day number given the existing entries
pub fn next_day(entries: &[LifestyleEntry]) -> u32 {
    entries.iter().map(|e| e.day).max().map_or(1, |last| last + 1)
}

/// Readiness of the most recent day that has one
pub fn latest_readiness(entries: &[LifestyleEntry]) -> Option<u8> {
    entries
        .iter()
        .filter(|e| e.readiness.is_some())
        .max_by_key(|e| e.day)
        .and_then(|e| e.readiness)
}

/// Mean readiness across every entry that has one
pub fn average_readiness(entries: &[LifestyleEntry]) -> Option<f64> {
    let values: Vec<f64> = entries
        .iter()
        .filter_map(|e| e.readiness)
        .map(f64::from)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(all: f64, stress: f64) -> LifestyleRatings {
        LifestyleRatings {
            sleep: all,
            hydration: all,
            nutrition: all,
            stress,
            concentration: all,
            energy: all,
            mood: all,
        }
    }

    fn entry(day: u32, readiness: Option<u8>) -> LifestyleEntry {
        LifestyleEntry {
            day,
            date: None,
            ratings: None,
            readiness,
        }
    }

    #[test]
    fn test_readiness_formula() {
        // 0.7 * 7 + 0.3 * (10 - 3) = 7.0
        assert_eq!(readiness(&ratings(7.0, 3.0)), 70);
        assert_eq!(readiness(&ratings(10.0, 0.0)), 100);
        assert_eq!(readiness(&ratings(0.0, 10.0)), 0);
    }

    #[test]
    fn test_stress_lowers_readiness() {
        assert!(readiness(&ratings(7.0, 8.0)) < readiness(&ratings(7.0, 2.0)));
    }

    #[test]
    fn test_readiness_is_clamped() {
        assert_eq!(readiness(&ratings(12.0, -5.0)), 100);
    }

    #[test]
    fn test_next_day() {
        assert_eq!(next_day(&[]), 1);
        assert_eq!(next_day(&[entry(1, None), entry(4, None), entry(2, None)]), 5);
    }

    #[test]
    fn test_latest_and_average() {
        let entries = vec![entry(1, Some(60)), entry(3, None), entry(2, Some(80))];
        assert_eq!(latest_readiness(&entries), Some(80));
        assert_eq!(average_readiness(&entries), Some(70.0));
        assert_eq!(latest_readiness(&[]), None);
        assert_eq!(average_readiness(&[entry(1, None)]), None);
    }
}
