//! Quiz modes

use serde::{Deserialize, Serialize};

/// How a session chooses its items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Every item due today, shuffled
    Standard,
    /// A random sample from the whole library, due or not
    Challenge,
    /// Items chosen by an injected policy; misses are collected for the caller
    Gauntlet,
}

impl QuizMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Standard => "standard",
            QuizMode::Challenge => "challenge",
            QuizMode::Gauntlet => "gauntlet",
        }
    }

    /// Whether incorrectly answered items are collected during the session
    pub fn tracks_failures(&self) -> bool {
        matches!(self, QuizMode::Gauntlet)
    }
}

impl std::fmt::Display for QuizMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QuizMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "review" => Ok(QuizMode::Standard),
            "challenge" => Ok(QuizMode::Challenge),
            "gauntlet" => Ok(QuizMode::Gauntlet),
            _ => Err(format!("Unknown quiz mode: {}", s)),
        }
    }
}
