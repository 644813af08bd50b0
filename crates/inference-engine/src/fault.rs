//! Bearing fault classes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fault class predicted by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultClass {
    /// Rolling element damage
    Ball,
    /// Inner race damage
    InnerRace,
    /// No fault detected
    Normal,
    /// Outer race damage
    OuterRace,
}

/// Maintenance urgency of a fault class
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Medium,
    High,
    Critical,
}

impl FaultClass {
    /// All classes
    pub const ALL: [FaultClass; 4] = [
        FaultClass::Ball,
        FaultClass::InnerRace,
        FaultClass::Normal,
        FaultClass::OuterRace,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultClass::Ball => "ball",
            FaultClass::InnerRace => "inner_race",
            FaultClass::Normal => "normal",
            FaultClass::OuterRace => "outer_race",
        }
    }

    /// Parse a classifier label or dataset scenario key (`fault/ball`)
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        let label = label.strip_prefix("fault/").unwrap_or(label);
        Self::ALL.into_iter().find(|class| class.as_str() == label)
    }

    /// Dataset scenario key
    pub fn scenario_key(&self) -> &'static str {
        match self {
            FaultClass::Ball => "fault/ball",
            FaultClass::InnerRace => "fault/inner_race",
            FaultClass::Normal => "normal",
            FaultClass::OuterRace => "fault/outer_race",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            FaultClass::Ball => "Ball Fault",
            FaultClass::InnerRace => "Inner Race Fault",
            FaultClass::Normal => "Normal",
            FaultClass::OuterRace => "Outer Race Fault",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FaultClass::Ball => Severity::Critical,
            FaultClass::InnerRace => Severity::High,
            FaultClass::Normal => Severity::None,
            FaultClass::OuterRace => Severity::Medium,
        }
    }

    /// Get recommended action
    pub fn recommended_action(&self) -> &'static str {
        match self {
            FaultClass::Ball => "Critical: replace the bearing immediately",
            FaultClass::InnerRace => "High: replace the bearing within 48 hours",
            FaultClass::Normal => "No action required, continue routine monitoring",
            FaultClass::OuterRace => "Medium: replace the bearing within 72 hours",
        }
    }

    /// Whether the class denotes a healthy bearing
    pub fn is_healthy(&self) -> bool {
        matches!(self, FaultClass::Normal)
    }
}

impl fmt::Display for FaultClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}
