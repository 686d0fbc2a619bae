//! Monotony and strain over a trailing window of sessions.
//!
//! - Monotony = mean load / population standard deviation
//! - Strain = mean load * monotony
//!
//! A window with zero spread (including a single session) has monotony 0.

use crate::SessionLoad;
use serde::{Deserialize, Serialize};

/// Fatigue indicators for one window
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FatigueSummary {
    /// Number of sessions actually in the window
    pub sessions: usize,
    pub mean_load: f64,
    pub std_load: f64,
    pub monotony: f64,
    pub strain: f64,
}

/// Fatigue over the last `window` sessions (all of them if fewer)
///
/// `loads` must be sorted ascending by session, as produced by
/// [`crate::load::session_loads`]. Returns `None` when there are no sessions.
pub fn fatigue(loads: &[SessionLoad], window: usize) -> Option<FatigueSummary> {
    let window = window.max(1);
    let start = loads.len().saturating_sub(window);
    summarize(&loads[start..])
}

/// Strain of every full-or-partial trailing window, one per session
///
/// Entry `i` covers the sessions ending at `loads[i]`.
pub fn rolling_strain(loads: &[SessionLoad], window: usize) -> Vec<(u32, f64)> {
    let window = window.max(1);
    (0..loads.len())
        .filter_map(|end| {
            let start = (end + 1).saturating_sub(window);
            summarize(&loads[start..=end]).map(|s| (loads[end].session, s.strain))
        })
        .collect()
}

fn summarize(window: &[SessionLoad]) -> Option<FatigueSummary> {
    if window.is_empty() {
        return None;
    }

    let n = window.len() as f64;
    let mean_load = window.iter().map(|s| s.load).sum::<f64>() / n;

    // Exact check on the raw loads: the float mean of equal values can
    // leave a residue
    let uniform = window.iter().all(|s| s.load == window[0].load);

    let std_load = if uniform {
        0.0
    } else {
        let variance = window
            .iter()
            .map(|s| (s.load - mean_load).powi(2))
            .sum::<f64>()
            / n;
        variance.sqrt()
    };

    let monotony = if std_load == 0.0 {
        0.0
    } else {
        mean_load / std_load
    };

    Some(FatigueSummary {
        sessions: window.len(),
        mean_load,
        std_load,
        monotony,
        strain: mean_load * monotony,
    })
}
