//! One-pass synthesis of every derived metric.
//!
//! Nothing is cached: each call recomputes from the snapshot it is given.

use crate::config::Config;
use crate::fatigue::{fatigue, rolling_strain, FatigueSummary};
use crate::hybrid::{hybrid_score, session_estimates, HybridScore};
use crate::readiness::{average_readiness, latest_readiness};
use crate::recommend::{BlockFocus, LastSession, RecommendationInput};
use crate::snapshot::Snapshot;
use crate::{load, CanonicalLift, SessionLoad};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Estimated one-rep maxima logged in one session
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct SessionEstimate {
    pub session: u32,
    pub estimates: BTreeMap<CanonicalLift, f64>,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Dashboard {
    pub loads: Vec<SessionLoad>,
    pub fatigue: Option<FatigueSummary>,
    /// Mean strain over every rolling window
    pub average_strain: Option<f64>,
    pub hybrid: Option<HybridScore>,
    pub latest_readiness: Option<u8>,
    /// Date of the most recent lifestyle entry
    pub last_logged: Option<NaiveDate>,
    pub average_readiness: Option<f64>,
    pub last_session: Option<LastSession>,
    pub estimates: Vec<SessionEstimate>,
}

impl Dashboard {
    pub fn build(snapshot: &Snapshot, config: &Config) -> Self {
        let loads = load::session_loads(snapshot.strength(), snapshot.skill(), &config.load_weights);
        let window = config.fatigue.window;

        let strains = rolling_strain(&loads, window);
        let average_strain = if strains.is_empty() {
            None
        } else {
            Some(strains.iter().map(|(_, s)| s).sum::<f64>() / strains.len() as f64)
        };

        let last_session = loads.last().map(|l| LastSession {
            session: l.session,
            domain: l.dominant(),
            load: l.load,
        });

        let estimates = snapshot
            .strength()
            .iter()
            .map(|s| SessionEstimate {
                session: s.session,
                estimates: session_estimates(s),
            })
            .filter(|e| !e.estimates.is_empty())
            .collect();

        let dashboard = Self {
            fatigue: fatigue(&loads, window),
            average_strain,
            hybrid: hybrid_score(snapshot, &config.targets),
            latest_readiness: latest_readiness(snapshot.lifestyle()),
            average_readiness: average_readiness(snapshot.lifestyle()),
            last_logged: snapshot.lifestyle().iter().filter_map(|e| e.date).max(),
            last_session,
            estimates,
            loads,
        };

        tracing::debug!(
            "Dashboard built: {} sessions, hybrid {}",
            dashboard.loads.len(),
            if dashboard.hybrid.is_some() { "available" } else { "unavailable" }
        );
        dashboard
    }

    /// Inputs for today's recommendation
    ///
    /// Uses the latest readiness and the strain of the current window.
    pub fn recommendation_input(&self, focus: BlockFocus) -> RecommendationInput {
        RecommendationInput {
            readiness: self.latest_readiness.map(f64::from),
            strain: self.fatigue.map(|f| f.strain),
            focus,
            last_session: self.last_session,
            skill_index: self.hybrid.as_ref().map(|h| h.skill),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        LifestyleEntry, LifestyleRatings, Lift, LiftEntry, SessionDomain, SkillMetric,
        SkillSession, StrengthSession,
    };

    fn strength(session: u32, lift: Lift, load: f64, reps: f64) -> StrengthSession {
        StrengthSession {
            session,
            lifts: [(lift, LiftEntry { load: Some(load), reps: Some(reps) })]
                .into_iter()
                .collect(),
            rpe: None,
        }
    }

    fn sample() -> Snapshot {
        let ratings = LifestyleRatings {
            sleep: 8.0,
            hydration: 8.0,
            nutrition: 8.0,
            stress: 3.0,
            concentration: 8.0,
            energy: 8.0,
            mood: 8.0,
        };
        Snapshot {
            lifestyle: Some(vec![
                LifestyleEntry { day: 1, date: None, ratings: Some(ratings), readiness: Some(60) },
                LifestyleEntry { day: 2, date: None, ratings: Some(ratings), readiness: Some(80) },
            ]),
            strength: Some(vec![
                strength(1, Lift::Squat, 100.0, 5.0),
                strength(2, Lift::Bench, 80.0, 10.0),
                strength(3, Lift::Row, 60.0, 10.0),
            ]),
            skill: Some(vec![SkillSession {
                session: 3,
                metrics: [(SkillMetric::HspuReps, 100.0)].into_iter().collect(),
            }]),
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let dashboard = Dashboard::build(&Snapshot::default(), &Config::default());

        assert!(dashboard.loads.is_empty());
        assert!(dashboard.fatigue.is_none());
        assert!(dashboard.average_strain.is_none());
        assert!(dashboard.hybrid.is_none());
        assert!(dashboard.latest_readiness.is_none());
        assert!(dashboard.last_session.is_none());
    }

    #[test]
    fn test_full_snapshot() {
        let dashboard = Dashboard::build(&sample(), &Config::default());

        assert_eq!(dashboard.loads.len(), 3);
        assert_eq!(dashboard.latest_readiness, Some(80));
        assert_eq!(dashboard.average_readiness, Some(70.0));
        assert!(dashboard.fatigue.is_some());
        assert_eq!(dashboard.average_strain.map(|s| s >= 0.0), Some(true));
        assert!(dashboard.hybrid.is_some());

        let last = dashboard.last_session.unwrap();
        assert_eq!(last.session, 3);
        assert_eq!(last.load, 1600.0);
        assert_eq!(last.domain, SessionDomain::Skill);

        // Row is not a canonical lift, so session 3 has no estimate
        let sessions: Vec<u32> = dashboard.estimates.iter().map(|e| e.session).collect();
        assert_eq!(sessions, vec![1, 2]);
    }

    #[test]
    fn test_recommendation_input() {
        let dashboard = Dashboard::build(&sample(), &Config::default());
        let input = dashboard.recommendation_input(BlockFocus::Skill);

        assert_eq!(input.readiness, Some(80.0));
        assert_eq!(input.strain, dashboard.fatigue.map(|f| f.strain));
        assert_eq!(input.focus, BlockFocus::Skill);
        assert!(input.skill_index.is_some());
        assert_eq!(input.last_session.map(|l| l.session), Some(3));
    }

    #[test]
    fn test_rebuild_is_identical() {
        let snapshot = sample();
        let config = Config::default();
        assert_eq!(
            Dashboard::build(&snapshot, &config),
            Dashboard::build(&snapshot, &config)
        );
    }

    #[test]
    fn test_serializes_to_json() {
        let dashboard = Dashboard::build(&sample(), &Config::default());
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["latest_readiness"], 80);
        assert_eq!(json["last_session"]["domain"], "skill");
    }
}
