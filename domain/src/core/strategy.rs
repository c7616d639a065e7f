//! Strategy identifier value object

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One independent reasoning approach applied to a problem (Value Object)
///
/// The named strategies carry their own persona prompt; `Custom` strategies
/// fall back to a generic solver prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyId {
    /// Methodical step-by-step analysis with explicit elimination
    Systematic,
    /// Find the single decisive factor and quantify it
    KeyDifference,
    /// Orbital and mechanistic reasoning
    Mechanistic,
    /// Skeptical review hunting for examiner traps
    DevilsAdvocate,
    /// Arbitrator weighing the other strategies' answers after arbitration.
    /// Never part of a request's strategy set.
    Synthesis,
    Custom(String),
}

impl StrategyId {
    /// Get the string identifier for this strategy
    pub fn as_str(&self) -> &str {
        match self {
            StrategyId::Systematic => "systematic",
            StrategyId::KeyDifference => "key-difference",
            StrategyId::Mechanistic => "mechanistic",
            StrategyId::DevilsAdvocate => "devils-advocate",
            StrategyId::Synthesis => "synthesis",
            StrategyId::Custom(s) => s,
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &str {
        match self {
            StrategyId::Systematic => "Systematic",
            StrategyId::KeyDifference => "Key Difference",
            StrategyId::Mechanistic => "Mechanistic",
            StrategyId::DevilsAdvocate => "Devil's Advocate",
            StrategyId::Synthesis => "Synthesis",
            StrategyId::Custom(s) => s,
        }
    }

    /// The default strategy set, in tie-break order
    pub fn default_set() -> Vec<StrategyId> {
        vec![
            StrategyId::Systematic,
            StrategyId::KeyDifference,
            StrategyId::Mechanistic,
            StrategyId::DevilsAdvocate,
        ]
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, StrategyId::Custom(_))
    }

    pub fn is_synthesis(&self) -> bool {
        matches!(self, StrategyId::Synthesis)
    }
}

impl std::fmt::Display for StrategyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StrategyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("Strategy name cannot be empty".to_string());
        }

        Ok(match trimmed.to_lowercase().replace('_', "-").as_str() {
            "systematic" => StrategyId::Systematic,
            "key-difference" | "keydifference" | "chouhan" => StrategyId::KeyDifference,
            "mechanistic" | "orbital" | "bruice" => StrategyId::Mechanistic,
            "devils-advocate" | "devil" | "critic" => StrategyId::DevilsAdvocate,
            "synthesis" | "consensus" | "arbitrator" => StrategyId::Synthesis,
            _ => StrategyId::Custom(trimmed.to_string()),
        })
    }
}

impl Serialize for StrategyId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StrategyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
