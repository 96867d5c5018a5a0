//! Session store
//!
//! In-memory, per-session-isolated state with an explicit eviction
//! policy. Each session carries two locks:
//!
//! - a synchronous state mutex guarding the message list, stage and
//!   scam flag — only ever held for short append/read sections, never
//!   across an await point
//! - an async turn gate serializing whole dialogue turns, so concurrent
//!   requests for the same session id cannot interleave history
//!
//! Different session ids only share the brief map access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;

use honeypot_config::SessionConfig;
use honeypot_core::{Turn, TurnRole};

use crate::script::MAX_STAGE;
use crate::EngineError;

/// Mutable per-session state
#[derive(Debug, Default)]
struct SessionState {
    /// Chronological, append-only message list
    turns: Vec<Turn>,
    /// Escalation stage, 0..=3, never decreases
    stage: u8,
    /// One-way scam flag
    is_scam: bool,
}

/// Consistent point-in-time view of a session, used for prompt
/// construction outside the state lock
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub turns: Vec<Turn>,
    pub stage: u8,
    pub is_scam: bool,
}

/// A single session
pub struct SessionHandle {
    /// Session ID (caller-supplied, opaque)
    pub id: String,
    state: Mutex<SessionState>,
    turn_gate: tokio::sync::Mutex<()>,
    created_at: Instant,
    last_activity: RwLock<Instant>,
}

impl SessionHandle {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(SessionState::default()),
            turn_gate: tokio::sync::Mutex::new(()),
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    /// Serialize a whole dialogue turn on this session
    pub async fn lock_turn(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.turn_gate.lock().await
    }

    /// Append a turn to the history
    pub fn append(&self, turn: Turn) {
        self.touch();
        self.state.lock().turns.push(turn);
    }

    /// Consistent snapshot of history, stage and flag
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            turns: state.turns.clone(),
            stage: state.stage,
            is_scam: state.is_scam,
        }
    }

    pub fn stage(&self) -> u8 {
        self.state.lock().stage
    }

    pub fn is_scam(&self) -> bool {
        self.state.lock().is_scam
    }

    /// One-way scam lock; idempotent
    pub fn mark_scam(&self) {
        let mut state = self.state.lock();
        if !state.is_scam {
            tracing::info!(session_id = %self.id, "Session marked as scam");
            state.is_scam = true;
        }
    }

    /// Saturating stage increment, ceiling 3
    pub fn advance_stage(&self) {
        let mut state = self.state.lock();
        state.stage = (state.stage + 1).min(MAX_STAGE);
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if session is idle past the timeout
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }

    /// Session age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

/// Session store keyed by opaque session id
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get a session, creating it lazily on first reference
    pub fn get_or_create(&self, id: &str) -> Result<Arc<SessionHandle>, EngineError> {
        if let Some(session) = self.sessions.read().get(id) {
            return Ok(session.clone());
        }

        let mut sessions = self.sessions.write();
        // Re-check under the write lock
        if let Some(session) = sessions.get(id) {
            return Ok(session.clone());
        }

        if sessions.len() >= self.config.max_sessions {
            self.cleanup_expired_internal(&mut sessions);
            if sessions.len() >= self.config.max_sessions {
                return Err(EngineError::Capacity(self.config.max_sessions));
            }
        }

        let session = Arc::new(SessionHandle::new(id));
        sessions.insert(id.to_string(), session.clone());
        tracing::info!(session_id = %id, "Created session");
        Ok(session)
    }

    /// Look up an existing session without creating it
    pub fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().get(id).cloned()
    }

    /// Append a message to a session's history
    pub fn append_message(
        &self,
        id: &str,
        role: TurnRole,
        content: impl Into<String>,
    ) -> Result<(), EngineError> {
        self.get_or_create(id)?.append(Turn::new(role, content));
        Ok(())
    }

    /// Ordered history of a session; empty for unreferenced sessions
    pub fn history(&self, id: &str) -> Vec<Turn> {
        self.get(id)
            .map(|s| s.snapshot().turns)
            .unwrap_or_default()
    }

    pub fn stage(&self, id: &str) -> u8 {
        self.get(id).map(|s| s.stage()).unwrap_or(0)
    }

    pub fn is_scam(&self, id: &str) -> bool {
        self.get(id).map(|s| s.is_scam()).unwrap_or(false)
    }

    pub fn mark_scam(&self, id: &str) -> Result<(), EngineError> {
        self.get_or_create(id)?.mark_scam();
        Ok(())
    }

    pub fn advance_stage(&self, id: &str) -> Result<(), EngineError> {
        self.get_or_create(id)?.advance_stage();
        Ok(())
    }

    /// Full deletion; the only way a scam flag is ever cleared
    pub fn reset(&self, id: &str) {
        if self.sessions.write().remove(id).is_some() {
            tracing::info!(session_id = %id, "Removed session");
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    /// Evict idle sessions per the configured policy
    pub fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions);
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<SessionHandle>>) {
        if self.config.idle_timeout_secs == 0 {
            // Reference behavior: retain for process lifetime
            return;
        }
        let timeout = Duration::from_secs(self.config.idle_timeout_secs);
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, s)| s.is_expired(timeout))
            .map(|(id, _)| id.clone())
            .collect();

        for id in expired {
            sessions.remove(&id);
            tracing::info!(session_id = %id, "Expired session");
        }
    }

    /// Start a background task that periodically evicts idle sessions
    ///
    /// Returns a shutdown sender used to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let store = Arc::clone(self);
        let interval = Duration::from_secs(store.config.cleanup_interval_secs.max(1));

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let before = store.count();
                        store.cleanup_expired();
                        let after = store.count();
                        if before != after {
                            tracing::info!(
                                "Session cleanup: removed {} idle sessions ({} remaining)",
                                before - after,
                                after
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(SessionConfig::default())
    }

    #[test]
    fn test_lazy_creation() {
        let store = store();
        assert_eq!(store.count(), 0);
        assert!(store.history("fresh").is_empty());
        assert_eq!(store.count(), 0);

        store.get_or_create("fresh").unwrap();
        assert_eq!(store.count(), 1);
        assert_eq!(store.stage("fresh"), 0);
        assert!(!store.is_scam("fresh"));
    }

    #[test]
    fn test_append_preserves_order() {
        let store = store();
        store
            .append_message("s", TurnRole::Counterparty, "one")
            .unwrap();
        store.append_message("s", TurnRole::Agent, "two").unwrap();
        store
            .append_message("s", TurnRole::Counterparty, "three")
            .unwrap();

        let history = store.history("s");
        let contents: Vec<&str> = history.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_stage_saturates_at_three() {
        let store = store();
        for _ in 0..10 {
            store.advance_stage("s").unwrap();
        }
        assert_eq!(store.stage("s"), 3);
    }

    #[test]
    fn test_scam_flag_is_one_way() {
        let store = store();
        store.mark_scam("s").unwrap();
        store.mark_scam("s").unwrap();
        assert!(store.is_scam("s"));

        // Resetting an unrelated session leaves the flag alone
        store.get_or_create("other").unwrap();
        store.reset("other");
        assert!(store.is_scam("s"));

        // Only explicit reset clears it, by deleting the session
        store.reset("s");
        assert!(!store.is_scam("s"));
        assert_eq!(store.stage("s"), 0);
    }

    #[test]
    fn test_capacity_limit() {
        let store = SessionStore::new(SessionConfig {
            max_sessions: 2,
            idle_timeout_secs: 0,
            cleanup_interval_secs: 300,
        });
        store.get_or_create("a").unwrap();
        store.get_or_create("b").unwrap();
        assert!(matches!(
            store.get_or_create("c"),
            Err(EngineError::Capacity(2))
        ));
        // Existing sessions are still reachable
        assert!(store.get_or_create("a").is_ok());
    }

    #[test]
    fn test_cleanup_disabled_by_default() {
        let store = store();
        store.get_or_create("s").unwrap();
        store.cleanup_expired();
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_snapshot_is_consistent() {
        let store = store();
        store
            .append_message("s", TurnRole::Counterparty, "msg")
            .unwrap();
        store.mark_scam("s").unwrap();
        store.advance_stage("s").unwrap();

        let snapshot = store.get("s").unwrap().snapshot();
        assert_eq!(snapshot.turns.len(), 1);
        assert_eq!(snapshot.stage, 1);
        assert!(snapshot.is_scam);
    }
}
