//! The five disruption zones and per-zone exposure

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound for scores and exposures
pub const SCORE_MIN: i32 = -100;
/// Upper bound for scores and exposures
pub const SCORE_MAX: i32 = 100;

/// Note used for a zone the source said nothing about
pub const NO_DATA_NOTE: &str = "No data";

/// Clamp a value into the score range
pub fn clamp_score(value: i32) -> i32 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// One of the five fixed disruption zones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZoneKey {
    #[serde(rename = "ephemeral")]
    Ephemeral,
    #[serde(rename = "sre")]
    Sre,
    #[serde(rename = "zeroTicket")]
    ZeroTicket,
    #[serde(rename = "semanticCU")]
    SemanticCu,
    #[serde(rename = "migration")]
    Migration,
}

impl ZoneKey {
    /// Every zone, in display order
    pub const ALL: [ZoneKey; 5] = [
        ZoneKey::Ephemeral,
        ZoneKey::Sre,
        ZoneKey::ZeroTicket,
        ZoneKey::SemanticCu,
        ZoneKey::Migration,
    ];

    /// Wire name used in model payloads
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ephemeral => "ephemeral",
            Self::Sre => "sre",
            Self::ZeroTicket => "zeroTicket",
            Self::SemanticCu => "semanticCU",
            Self::Migration => "migration",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Ephemeral => "Ephemeral App Generator",
            Self::Sre => "Autonomous SRE Swarm",
            Self::ZeroTicket => "Zero-Ticket Enterprise",
            Self::SemanticCu => "Semantic Computer Use",
            Self::Migration => "Zero-Friction Migration",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Ephemeral => "AI generates bespoke apps on demand, killing per-seat SaaS",
            Self::Sre => "Agents auto-diagnose and auto-remediate, bypassing dashboards",
            Self::ZeroTicket => "AI resolves IT/HR requests instantly, collapsing ticket queues",
            Self::SemanticCu => "Vision models navigate any UI at machine speed, replacing RPA",
            Self::Migration => "AI untangles legacy code, destroying switching-cost moats",
        }
    }

    /// Companies most commonly named as exposed to this zone
    pub fn typically_exposed(self) -> &'static str {
        match self {
            Self::Ephemeral => "Salesforce, Workday, Monday.com, Smartsheet",
            Self::Sre => "Datadog, PagerDuty, Dynatrace, Splunk/Cisco",
            Self::ZeroTicket => "ServiceNow, Zendesk, Freshworks",
            Self::SemanticCu => "UiPath, MuleSoft/Salesforce, Zapier, Global System Integrators",
            Self::Migration => "SAP, Oracle, IBM (mainframe franchise), IT services firms",
        }
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a zone's effect on a company
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Harmed,
    Benefits,
    Neutral,
}

/// How strongly one zone affects a company
///
/// Positive exposure means the company is hurt by the zone, negative means it
/// benefits. The value is always within [`SCORE_MIN`]..=[`SCORE_MAX`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawExposure")]
pub struct ZoneExposure {
    exposure: i32,
    note: String,
}

#[derive(Deserialize)]
struct RawExposure {
    exposure: i32,
    note: String,
}

impl From<RawExposure> for ZoneExposure {
    fn from(raw: RawExposure) -> Self {
        Self::new(raw.exposure, raw.note)
    }
}

impl ZoneExposure {
    pub fn new(exposure: i32, note: impl Into<String>) -> Self {
        Self {
            exposure: clamp_score(exposure),
            note: note.into(),
        }
    }

    /// Placeholder for a zone with no information
    pub fn no_data() -> Self {
        Self::new(0, NO_DATA_NOTE)
    }

    pub fn exposure(&self) -> i32 {
        self.exposure
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn effect(&self) -> Effect {
        match self.exposure {
            e if e > 0 => Effect::Harmed,
            e if e < 0 => Effect::Benefits,
            _ => Effect::Neutral,
        }
    }
}

impl Default for ZoneExposure {
    fn default() -> Self {
        Self::no_data()
    }
}

/// Exposure for every zone
///
/// A struct rather than a map, so all five zones are always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zones {
    pub ephemeral: ZoneExposure,
    pub sre: ZoneExposure,
    #[serde(rename = "zeroTicket")]
    pub zero_ticket: ZoneExposure,
    #[serde(rename = "semanticCU")]
    pub semantic_cu: ZoneExposure,
    pub migration: ZoneExposure,
}

impl Zones {
    /// Build every zone from a function of its key
    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(ZoneKey) -> ZoneExposure,
    {
        Self {
            ephemeral: f(ZoneKey::Ephemeral),
            sre: f(ZoneKey::Sre),
            zero_ticket: f(ZoneKey::ZeroTicket),
            semantic_cu: f(ZoneKey::SemanticCu),
            migration: f(ZoneKey::Migration),
        }
    }

    pub fn get(&self, key: ZoneKey) -> &ZoneExposure {
        match key {
            ZoneKey::Ephemeral => &self.ephemeral,
            ZoneKey::Sre => &self.sre,
            ZoneKey::ZeroTicket => &self.zero_ticket,
            ZoneKey::SemanticCu => &self.semantic_cu,
            ZoneKey::Migration => &self.migration,
        }
    }

    pub fn set(&mut self, key: ZoneKey, exposure: ZoneExposure) {
        let slot = match key {
            ZoneKey::Ephemeral => &mut self.ephemeral,
            ZoneKey::Sre => &mut self.sre,
            ZoneKey::ZeroTicket => &mut self.zero_ticket,
            ZoneKey::SemanticCu => &mut self.semantic_cu,
            ZoneKey::Migration => &mut self.migration,
        };
        *slot = exposure;
    }

    /// Zones in display order
    pub fn iter(&self) -> impl Iterator<Item = (ZoneKey, &ZoneExposure)> {
        ZoneKey::ALL.into_iter().map(move |key| (key, self.get(key)))
    }

    /// The zone that hurts the company most, if any zone hurts it at all
    pub fn most_exposed(&self) -> Option<(ZoneKey, &ZoneExposure)> {
        self.iter()
            .filter(|(_, z)| z.effect() == Effect::Harmed)
            .max_by_key(|(_, z)| z.exposure())
    }
}
