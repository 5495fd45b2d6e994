//! Persona — the tone/detail-level configuration bound to a session.
//!
//! A persona is selected at session creation and never changes for the
//! session's lifetime; switching personas means closing the session and
//! opening a new one.

use serde::{Deserialize, Serialize};

/// The audience a session's answers are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    /// In-depth answers with industry terminology, data, and references.
    Technical,
    /// Simplified, jargon-free answers with analogies.
    NonTechnical,
}

impl Default for Persona {
    fn default() -> Self {
        Persona::Technical
    }
}

impl std::str::FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "technical" => Ok(Persona::Technical),
            "non-technical" | "non_technical" | "nontechnical" => Ok(Persona::NonTechnical),
            other => Err(format!("unknown persona: {other:?}")),
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Persona::Technical => write!(f, "technical"),
            Persona::NonTechnical => write!(f, "non-technical"),
        }
    }
}
