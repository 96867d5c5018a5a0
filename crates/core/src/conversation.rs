//! Conversation types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    /// Message from the unknown counterparty (the suspected scammer)
    Counterparty,
    /// Message from the synthetic persona
    Agent,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::Counterparty => "counterparty",
            TurnRole::Agent => "agent",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single turn in a honeypot conversation
///
/// Turns are immutable once appended to a session; the session owns them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Role of the speaker
    pub role: TurnRole,
    /// Content of the turn
    pub content: String,
    /// When the turn occurred
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new turn
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a counterparty turn
    pub fn counterparty(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Counterparty, content)
    }

    /// Create an agent turn
    pub fn agent(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Agent, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_str() {
        assert_eq!(TurnRole::Counterparty.as_str(), "counterparty");
        assert_eq!(TurnRole::Agent.as_str(), "agent");
    }

    #[test]
    fn test_turn_serialization() {
        let turn = Turn::counterparty("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "counterparty");
        assert_eq!(json["content"], "hello");
    }
}
