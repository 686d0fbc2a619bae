//! Session recommendation engine.
//!
//! Decision order:
//!
//! 1. **Safety override**: low readiness or high strain replaces whatever
//!    block focus was chosen. A deload block becomes Recovery/Off, anything
//!    else becomes Skill/Recovery.
//! 2. **Block focus**: otherwise the prescription follows the focus directly.
//!
//! Every prescription is advisory data; nothing here touches the store.

use crate::config::ZoneConfig;
use crate::hybrid::SkillTier;
use crate::{Error, SessionDomain};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Readiness assumed when nothing has been logged
pub const DEFAULT_READINESS: f64 = 50.0;

/// Strain assumed when there is no training history
pub const DEFAULT_STRAIN: f64 = 0.0;

/// Training block focus chosen by the athlete
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockFocus {
    MaxStrength,
    Hypertrophy,
    Skill,
    Power,
    Deload,
}

impl BlockFocus {
    pub const ALL: [BlockFocus; 5] = [
        BlockFocus::MaxStrength,
        BlockFocus::Hypertrophy,
        BlockFocus::Skill,
        BlockFocus::Power,
        BlockFocus::Deload,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BlockFocus::MaxStrength => "Force maximale",
            BlockFocus::Hypertrophy => "Hypertrophie / Volume",
            BlockFocus::Skill => "Skill calisthénie",
            BlockFocus::Power => "Puissance / Explosivité",
            BlockFocus::Deload => "Deload",
        }
    }

    pub fn intent(&self) -> Intent {
        match self {
            BlockFocus::MaxStrength => Intent::Force,
            BlockFocus::Hypertrophy => Intent::Volume,
            BlockFocus::Skill => Intent::Skill,
            BlockFocus::Power => Intent::Power,
            BlockFocus::Deload => Intent::Deload,
        }
    }
}

impl fmt::Display for BlockFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BlockFocus {
    type Err = Error;

    /// Accepts the snake_case id, a short keyword, or the display label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if let Some(focus) = BlockFocus::ALL
            .iter()
            .find(|f| f.label().to_lowercase() == normalized)
        {
            return Ok(*focus);
        }

        match normalized.replace(['-', ' '], "_").as_str() {
            "max_strength" | "force" | "strength" => Ok(BlockFocus::MaxStrength),
            "hypertrophy" | "volume" | "hypertrophie" => Ok(BlockFocus::Hypertrophy),
            "skill" | "calisthenics" => Ok(BlockFocus::Skill),
            "power" | "puissance" | "explosive" => Ok(BlockFocus::Power),
            "deload" => Ok(BlockFocus::Deload),
            _ => Err(Error::Input(format!(
                "unknown block focus '{}' (expected max_strength, hypertrophy, skill, power or deload)",
                s
            ))),
        }
    }
}

/// Primary intent behind a block focus
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Force,
    Volume,
    Skill,
    Power,
    Deload,
}

/// Three-way bucket for readiness and strain
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Low,
    Medium,
    High,
}

impl Zone {
    pub fn label(&self) -> &'static str {
        match self {
            Zone::Low => "low",
            Zone::Medium => "medium",
            Zone::High => "high",
        }
    }
}

pub fn readiness_zone(readiness: f64, zones: &ZoneConfig) -> Zone {
    if readiness >= zones.readiness_high {
        Zone::High
    } else if readiness >= zones.readiness_medium {
        Zone::Medium
    } else {
        Zone::Low
    }
}

pub fn strain_zone(strain: f64, zones: &ZoneConfig) -> Zone {
    if strain >= zones.strain_high {
        Zone::High
    } else if strain >= zones.strain_medium {
        Zone::Medium
    } else {
        Zone::Low
    }
}

/// Kind of session prescribed
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    RecoveryOff,
    SkillRecovery,
    HeavyStrength,
    HypertrophyVolume,
    SkillCalisthenics,
    Power,
    Deload,
}

impl SessionType {
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::RecoveryOff => "Recovery/Off",
            SessionType::SkillRecovery => "Skill/Recovery",
            SessionType::HeavyStrength => "Heavy Strength",
            SessionType::HypertrophyVolume => "Hypertrophie/Volume",
            SessionType::SkillCalisthenics => "Skill Calisthénie",
            SessionType::Power => "Power/Explosive",
            SessionType::Deload => "Deload",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive integer range, used for volume percentages and RPE
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub low: u16,
    pub high: u16,
}

impl Span {
    pub const fn new(low: u16, high: u16) -> Self {
        Self { low, high }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// The session that preceded today's
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LastSession {
    pub session: u32,
    pub domain: SessionDomain,
    pub load: f64,
}

/// Everything the engine decides on
#[derive(Clone, Debug, PartialEq)]
pub struct RecommendationInput {
    pub readiness: Option<f64>,
    pub strain: Option<f64>,
    pub focus: BlockFocus,
    pub last_session: Option<LastSession>,
    /// Skill sub-index of the hybrid score, when available
    pub skill_index: Option<f64>,
}

/// A concrete session prescription
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Prescription {
    pub session_type: SessionType,
    pub focus: String,
    pub intensity: String,
    /// Volume relative to a normal session, in percent
    pub volume_pct: Span,
    pub target_rpe: Span,
    pub notes: Vec<String>,
    pub blocks: Vec<String>,
    pub readiness: f64,
    pub strain: f64,
    pub readiness_zone: Zone,
    pub strain_zone: Zone,
    /// True when low readiness or high strain replaced the requested focus
    pub safety_override: bool,
}

fn blocks(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Recommend today's session
pub fn recommend(input: &RecommendationInput, zones: &ZoneConfig) -> Prescription {
    let readiness = input.readiness.unwrap_or(DEFAULT_READINESS);
    let strain = input.strain.unwrap_or(DEFAULT_STRAIN);
    let r_zone = readiness_zone(readiness, zones);
    let s_zone = strain_zone(strain, zones);
    let intent = input.focus.intent();

    let mut notes = Vec::new();
    if input.readiness.is_none() {
        notes.push(format!("No readiness logged; assuming {:.0}.", DEFAULT_READINESS));
    }

    let safety_override = r_zone == Zone::Low || s_zone == Zone::High;

    let mut prescription = if safety_override {
        tracing::info!(
            "Safety override: readiness {:.0} ({}), strain {:.0} ({})",
            readiness,
            r_zone.label(),
            strain,
            s_zone.label()
        );
        notes.push(format!(
            "Readiness {:.0} ({}) / strain {:.0} ({}): requested focus '{}' is replaced for today.",
            readiness,
            r_zone.label(),
            strain,
            s_zone.label(),
            input.focus
        ));
        if intent == Intent::Deload {
            recovery_off()
        } else {
            skill_recovery()
        }
    } else {
        tracing::info!("Prescribing from block focus: {}", input.focus);
        match intent {
            Intent::Force => heavy_strength(),
            Intent::Volume => hypertrophy_volume(),
            Intent::Skill => {
                let tier = match input.skill_index {
                    Some(index) => SkillTier::from_index(index),
                    None => {
                        notes.push(
                            "Hybrid score unavailable; assuming Intermediate skill level."
                                .to_string(),
                        );
                        SkillTier::Intermediate
                    }
                };
                skill_calisthenics(tier)
            }
            Intent::Power => power(),
            Intent::Deload => deload(),
        }
    };

    if r_zone == Zone::Medium && !safety_override {
        notes.push("Readiness is moderate: stop sets one rep earlier if bar speed drops.".to_string());
    }
    if s_zone == Zone::Medium && !safety_override {
        notes.push("Strain is building: keep accessory work short.".to_string());
    }

    if let Some(last) = input.last_session {
        notes.push(format!(
            "Last session #{} was {}-dominant (load {:.0}).",
            last.session,
            last.domain.label(),
            last.load
        ));
        if last.domain == SessionDomain::Strength
            && prescription.session_type == SessionType::HeavyStrength
        {
            notes.push("Back-to-back heavy days: rotate the main lift from last time.".to_string());
        }
    }

    notes.append(&mut prescription.notes);
    prescription.notes = notes;
    prescription.readiness = readiness;
    prescription.strain = strain;
    prescription.readiness_zone = r_zone;
    prescription.strain_zone = s_zone;
    prescription.safety_override = safety_override;
    prescription
}

/// Template with neutral zone fields; `recommend` fills them in
fn template(
    session_type: SessionType,
    focus: &str,
    intensity: &str,
    volume_pct: Span,
    target_rpe: Span,
    structure: &[&str],
) -> Prescription {
    Prescription {
        session_type,
        focus: focus.to_string(),
        intensity: intensity.to_string(),
        volume_pct,
        target_rpe,
        notes: Vec::new(),
        blocks: blocks(structure),
        readiness: DEFAULT_READINESS,
        strain: DEFAULT_STRAIN,
        readiness_zone: Zone::Medium,
        strain_zone: Zone::Low,
        safety_override: false,
    }
}

fn recovery_off() -> Prescription {
    template(
        SessionType::RecoveryOff,
        "Rest day: mobility and easy movement only",
        "Minimal",
        Span::new(0, 30),
        Span::new(1, 3),
        &[
            "Mobility flow (hips, thoracic spine, shoulders) 15 min",
            "Easy walk or bike 20-30 min",
            "Breathing / down-regulation 5 min",
        ],
    )
}

fn skill_recovery() -> Prescription {
    template(
        SessionType::SkillRecovery,
        "Low-impact technical work",
        "Low",
        Span::new(40, 60),
        Span::new(5, 6),
        &[
            "Joint prep and wrist warm-up 10 min",
            "Handstand practice against the wall 10 min",
            "Easy skill holds well short of failure",
            "Mobility 10 min",
        ],
    )
}

fn heavy_strength() -> Prescription {
    template(
        SessionType::HeavyStrength,
        "Maximal strength on the main lifts",
        "High",
        Span::new(70, 90),
        Span::new(8, 9),
        &[
            "General warm-up and ramp-up sets",
            "Main lift: 4-5 x 2-4 @ RPE 8-9",
            "Secondary lift: 3 x 4-6 @ RPE 8",
            "Weighted pull-ups 3 x 3-5",
            "Core 10 min",
        ],
    )
}

fn hypertrophy_volume() -> Prescription {
    template(
        SessionType::HypertrophyVolume,
        "Muscle-building volume",
        "Moderate",
        Span::new(90, 110),
        Span::new(7, 8),
        &[
            "Warm-up",
            "Compound lift: 4 x 8-10 @ RPE 7-8",
            "Second compound: 3 x 10-12",
            "Accessory superset: 3 x 12-15",
            "Finisher / pump work 5-10 min",
        ],
    )
}

fn skill_calisthenics(tier: SkillTier) -> Prescription {
    let skill_work: &[&str] = match tier {
        SkillTier::Beginner => &[
            "Pike holds 5 x 20 s",
            "HSPU negatives 4 x 3",
            "Band-assisted muscle-up transitions 4 x 5",
            "Tuck planche leans 5 x 10 s",
        ],
        SkillTier::Intermediate => &[
            "Wall HSPU 5 x 3-5",
            "Muscle-up transitions 5 x 2",
            "Tuck / advanced tuck planche 6 x 8 s",
        ],
        SkillTier::Advanced => &[
            "Freestanding HSPU attempts 6 x 1-3",
            "Muscle-ups 5 x 3",
            "Straddle planche 6 x 6 s",
        ],
        SkillTier::Elite => &[
            "Deficit HSPU 5 x 3-5",
            "Weighted muscle-ups 5 x 2",
            "Full planche / planche push-up combos",
        ],
    };

    let mut structure = vec!["Wrist and shoulder prep 10 min"];
    structure.extend_from_slice(skill_work);
    structure.push("Core compression and mobility 10 min");

    let mut prescription = template(
        SessionType::SkillCalisthenics,
        "Bodyweight skill development",
        "Moderate",
        Span::new(80, 100),
        Span::new(6, 8),
        &structure,
    );
    prescription
        .notes
        .push(format!("Skill level: {}.", tier.label()));
    prescription
}

fn power() -> Prescription {
    template(
        SessionType::Power,
        "Explosive output, low volume, full intent",
        "High intent",
        Span::new(50, 70),
        Span::new(7, 8),
        &[
            "Dynamic warm-up and jump prep",
            "Box jumps 5 x 3",
            "Explosive pull-ups 5 x 3",
            "Speed squats 6 x 2 @ 60%",
            "Mobility cooldown",
        ],
    )
}

fn deload() -> Prescription {
    template(
        SessionType::Deload,
        "Usual structure at reduced load and volume",
        "Low",
        Span::new(50, 60),
        Span::new(5, 6),
        &[
            "Warm-up",
            "Main lift at ~60% of usual load, half the sets",
            "Secondary lift, half the sets",
            "Easy skill practice",
            "Mobility",
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(readiness: Option<f64>, strain: Option<f64>, focus: BlockFocus) -> RecommendationInput {
        RecommendationInput {
            readiness,
            strain,
            focus,
            last_session: None,
            skill_index: None,
        }
    }

    #[test]
    fn test_zones() {
        let zones = ZoneConfig::default();
        assert_eq!(readiness_zone(70.0, &zones), Zone::High);
        assert_eq!(readiness_zone(69.9, &zones), Zone::Medium);
        assert_eq!(readiness_zone(40.0, &zones), Zone::Medium);
        assert_eq!(readiness_zone(39.9, &zones), Zone::Low);
        assert_eq!(strain_zone(25_000.0, &zones), Zone::High);
        assert_eq!(strain_zone(10_000.0, &zones), Zone::Medium);
        assert_eq!(strain_zone(9_999.0, &zones), Zone::Low);
    }

    #[test]
    fn test_low_readiness_overrides_force() {
        let zones = ZoneConfig::default();
        let p = recommend(&input(Some(35.0), Some(30_000.0), BlockFocus::MaxStrength), &zones);

        assert_ne!(p.session_type, SessionType::HeavyStrength);
        assert_eq!(p.session_type, SessionType::SkillRecovery);
        assert!(p.safety_override);
        assert_eq!(p.readiness_zone, Zone::Low);
        assert_eq!(p.strain_zone, Zone::High);
    }

    #[test]
    fn test_high_strain_alone_overrides() {
        let zones = ZoneConfig::default();
        let p = recommend(&input(Some(90.0), Some(26_000.0), BlockFocus::Power), &zones);
        assert_eq!(p.session_type, SessionType::SkillRecovery);
    }

    #[test]
    fn test_override_during_deload_is_full_rest() {
        let zones = ZoneConfig::default();
        let p = recommend(&input(Some(20.0), None, BlockFocus::Deload), &zones);
        assert_eq!(p.session_type, SessionType::RecoveryOff);
    }

    #[test]
    fn test_hypertrophy_when_fresh() {
        let zones = ZoneConfig::default();
        let p = recommend(&input(Some(80.0), Some(5_000.0), BlockFocus::Hypertrophy), &zones);

        assert_eq!(p.session_type, SessionType::HypertrophyVolume);
        assert_eq!(p.session_type.label(), "Hypertrophie/Volume");
        assert_eq!(p.target_rpe, Span::new(7, 8));
        assert_eq!(p.volume_pct, Span::new(90, 110));
        assert!(!p.safety_override);
    }

    #[test]
    fn test_heavy_strength_prescription() {
        let zones = ZoneConfig::default();
        let p = recommend(&input(Some(75.0), Some(12_000.0), BlockFocus::MaxStrength), &zones);

        assert_eq!(p.session_type, SessionType::HeavyStrength);
        assert_eq!(p.target_rpe, Span::new(8, 9));
        assert_eq!(p.volume_pct, Span::new(70, 90));
        assert!(p.notes.iter().any(|n| n.contains("Strain is building")));
    }

    #[test]
    fn test_defaults_when_no_data() {
        let zones = ZoneConfig::default();
        let p = recommend(&input(None, None, BlockFocus::Power), &zones);

        assert_eq!(p.readiness, 50.0);
        assert_eq!(p.strain, 0.0);
        assert_eq!(p.readiness_zone, Zone::Medium);
        assert_eq!(p.session_type, SessionType::Power);
        assert!(p.notes[0].contains("No readiness logged"));
    }

    #[test]
    fn test_skill_prescription_uses_tier() {
        let zones = ZoneConfig::default();
        let mut req = input(Some(80.0), Some(0.0), BlockFocus::Skill);
        req.skill_index = Some(90.0);
        let p = recommend(&req, &zones);

        assert_eq!(p.session_type, SessionType::SkillCalisthenics);
        assert_eq!(p.target_rpe, Span::new(6, 8));
        assert!(p.notes.iter().any(|n| n.contains("Elite")));
        assert!(p.blocks.iter().any(|b| b.contains("Full planche")));
    }

    #[test]
    fn test_skill_prescription_without_score() {
        let zones = ZoneConfig::default();
        let p = recommend(&input(Some(80.0), Some(0.0), BlockFocus::Skill), &zones);
        assert!(p.notes.iter().any(|n| n.contains("Intermediate")));
    }

    #[test]
    fn test_last_session_note() {
        let zones = ZoneConfig::default();
        let mut req = input(Some(80.0), Some(0.0), BlockFocus::MaxStrength);
        req.last_session = Some(LastSession {
            session: 12,
            domain: SessionDomain::Strength,
            load: 8450.0,
        });
        let p = recommend(&req, &zones);

        assert!(p
            .notes
            .iter()
            .any(|n| n == "Last session #12 was strength-dominant (load 8450)."));
        assert!(p.notes.iter().any(|n| n.contains("Back-to-back")));
    }

    #[test]
    fn test_block_focus_parsing() {
        assert_eq!("Force maximale".parse::<BlockFocus>().unwrap(), BlockFocus::MaxStrength);
        assert_eq!("hypertrophie / volume".parse::<BlockFocus>().unwrap(), BlockFocus::Hypertrophy);
        assert_eq!("max-strength".parse::<BlockFocus>().unwrap(), BlockFocus::MaxStrength);
        assert_eq!("power".parse::<BlockFocus>().unwrap(), BlockFocus::Power);
        assert!("cardio".parse::<BlockFocus>().is_err());
    }

    #[test]
    fn test_same_input_same_output() {
        let zones = ZoneConfig::default();
        let req = input(Some(65.0), Some(15_000.0), BlockFocus::Hypertrophy);
        assert_eq!(recommend(&req, &zones), recommend(&req, &zones));
    }
}
