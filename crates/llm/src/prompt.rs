//! Prompt building for the honeypot persona

use std::fmt;

use serde::{Deserialize, Serialize};

use honeypot_core::{Turn, TurnRole};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Prompt builder for the honeypot persona
///
/// Assembles the system instruction (persona + emotional tone), the
/// bounded recent history window, and the literal incoming message.
pub struct PromptBuilder {
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Build the persona system prompt
    ///
    /// The persona stays in character as a human correspondent, replies
    /// only to the latest message, asks at most one question, grows
    /// firmer with suspicion, and never reveals the deception.
    pub fn system_prompt(mut self, tone: &str, incoming: &str) -> Self {
        let system = format!(
            r#"You are a real human chatting on a messaging app.

Emotional state: {tone}

Last message:
"{incoming}"

Rules:
- Reply ONLY to the last message
- Ask at most ONE question
- Sound firmer the more suspicious you are
- Never mention AI, scams, police, fraud, or that anything is automated"#,
        );

        self.messages.push(Message::system(system));
        self
    }

    /// Add the recent conversation window, chronological, oldest first
    pub fn with_history(mut self, turns: &[Turn], window: usize) -> Self {
        let start = turns.len().saturating_sub(window);
        for turn in &turns[start..] {
            let message = match turn.role {
                TurnRole::Counterparty => Message::user(&turn.content),
                TurnRole::Agent => Message::assistant(&turn.content),
            };
            self.messages.push(message);
        }
        self
    }

    /// Build the final message list
    pub fn build(self) -> Vec<Message> {
        self.messages
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}
