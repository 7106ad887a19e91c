//! Analysis records and verdict classification

use crate::zones::{Zones, clamp_score};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores at or below this are COOKED
pub const COOKED_THRESHOLD: i32 = -60;
/// Scores at or above this are ROCKET
pub const ROCKET_THRESHOLD: i32 = 20;

/// Coarse classification of an aggregate score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Cooked,
    Contested,
    Rocket,
}

impl Verdict {
    /// Classify a score
    ///
    /// COOKED iff `score <= -60`, ROCKET iff `score >= 20`, CONTESTED otherwise.
    pub fn from_score(score: i32) -> Self {
        if score <= COOKED_THRESHOLD {
            Self::Cooked
        } else if score >= ROCKET_THRESHOLD {
            Self::Rocket
        } else {
            Self::Contested
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cooked => "COOKED",
            Self::Contested => "CONTESTED",
            Self::Rocket => "ROCKET",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Cooked => "🔥",
            Self::Contested => "⚔️",
            Self::Rocket => "🚀",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One company's scored exposure snapshot
///
/// `score` is clamped to [-100, 100] and `verdict` is always derived from it;
/// neither can be set independently. Negative scores mean the company is
/// squeezed by agentic AI, positive scores mean it benefits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AuthoredAnalysis")]
pub struct Analysis {
    name: String,
    score: i32,
    verdict: Verdict,
    tagline: String,
    wall_street: String,
    defense: String,
    zones: Zones,
}

/// Trusted, hand-authored shape. Any verdict it carries is ignored.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthoredAnalysis {
    name: String,
    score: i32,
    #[serde(default)]
    tagline: String,
    #[serde(default)]
    wall_street: String,
    #[serde(default)]
    defense: String,
    zones: Zones,
}

impl From<AuthoredAnalysis> for Analysis {
    fn from(a: AuthoredAnalysis) -> Self {
        Analysis::new(a.name, a.score)
            .with_tagline(a.tagline)
            .with_wall_street(a.wall_street)
            .with_defense(a.defense)
            .with_zones(a.zones)
    }
}

impl Analysis {
    /// Create an analysis with empty prose and no zone data
    pub fn new(name: impl Into<String>, score: i32) -> Self {
        let score = clamp_score(score);
        Self {
            name: name.into(),
            score,
            verdict: Verdict::from_score(score),
            tagline: String::new(),
            wall_street: String::new(),
            defense: String::new(),
            zones: Zones::default(),
        }
    }

    pub fn with_tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = tagline.into();
        self
    }

    pub fn with_wall_street(mut self, wall_street: impl Into<String>) -> Self {
        self.wall_street = wall_street.into();
        self
    }

    pub fn with_defense(mut self, defense: impl Into<String>) -> Self {
        self.defense = defense.into();
        self
    }

    pub fn with_zones(mut self, zones: Zones) -> Self {
        self.zones = zones;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn tagline(&self) -> &str {
        &self.tagline
    }

    /// The bear case
    pub fn wall_street(&self) -> &str {
        &self.wall_street
    }

    /// The counter-narrative
    pub fn defense(&self) -> &str {
        &self.defense
    }

    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    /// One-line summary used when asking for a portfolio synthesis
    pub fn summary_line(&self, ticker: &str) -> String {
        format!(
            "{ticker} ({}): score={}, verdict={}, tagline=\"{}\"",
            self.name, self.score, self.verdict, self.tagline
        )
    }
}

/// Aggregate, model-authored view over several analyses
///
/// `overall_score` is only range-clamped, never recomputed from the members;
/// `overall_verdict` is derived from it like any other verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSynthesis {
    overall_score: i32,
    overall_verdict: Verdict,
    pub headline: String,
    pub concentration: String,
    pub blind_spot: String,
    pub playbook: String,
}

impl PortfolioSynthesis {
    pub fn new(overall_score: i32) -> Self {
        let overall_score = clamp_score(overall_score);
        Self {
            overall_score,
            overall_verdict: Verdict::from_score(overall_score),
            headline: String::new(),
            concentration: String::new(),
            blind_spot: String::new(),
            playbook: String::new(),
        }
    }

    pub fn overall_score(&self) -> i32 {
        self.overall_score
    }

    pub fn overall_verdict(&self) -> Verdict {
        self.overall_verdict
    }
}
