//! Scam detection gate
//!
//! Session-aware predicate deciding whether the dialogue engine runs at
//! all. Keeps its own intent-focused signal list, stronger than the
//! classifier's per-category tables: multi-word signals here express
//! intent ("send money", "account blocked"), not just topic.

use honeypot_core::TurnRole;

use crate::store::SessionStore;

/// Strong scam-intent signals
const SCAM_SIGNALS: &[&str] = &[
    "send money",
    "transfer money",
    "pay now",
    "urgent",
    "otp",
    "upi",
    "account blocked",
    "verify now",
    "click link",
    "bank account",
    "kyc update",
    "pin",
    "cvv",
];

/// Scam detector
///
/// Scam is indicated only if the current message shows strong intent,
/// or recent counterparty messages in the same session do. Never
/// consults another session's history.
pub struct ScamDetector {
    /// How many recent counterparty messages to inspect
    window: usize,
}

impl ScamDetector {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    fn contains_signal(text: &str) -> bool {
        let t = text.to_lowercase();
        let t = t.trim();
        SCAM_SIGNALS.iter().any(|s| t.contains(s))
    }

    /// Is this session's recent activity scam-indicative?
    pub fn is_scam_indicative(&self, store: &SessionStore, session_id: &str, message: &str) -> bool {
        // Current message first
        if Self::contains_signal(message) {
            return true;
        }

        // Then only the recent counterparty history of this session
        let history = store.history(session_id);
        let recent = history
            .iter()
            .filter(|t| t.role == TurnRole::Counterparty)
            .rev()
            .take(self.window);

        for turn in recent {
            if Self::contains_signal(&turn.content) {
                return true;
            }
        }

        false
    }
}

impl Default for ScamDetector {
    fn default() -> Self {
        Self::new(3)
    }
}
