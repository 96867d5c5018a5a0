//! Application state
//!
//! Shared state across all handlers.

use std::sync::Arc;

use parking_lot::RwLock;

use honeypot_config::Settings;
use honeypot_engine::{DialogueEngine, ScamDetector, SessionStore};
use honeypot_llm::LlmBackend;
use honeypot_report::ReportGenerator;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration, shared with the auth middleware
    pub config: Arc<RwLock<Settings>>,
    /// Session store
    pub store: Arc<SessionStore>,
    /// Intake gate
    pub detector: Arc<ScamDetector>,
    /// Dialogue engine
    pub engine: Arc<DialogueEngine>,
    /// Report generator
    pub reports: Arc<ReportGenerator>,
}

impl AppState {
    /// Create application state without a generation backend
    ///
    /// Every reply comes from the scripted tables. Used in tests and as
    /// the degraded mode when no backend is reachable.
    pub fn new(config: Settings) -> Self {
        let store = Arc::new(SessionStore::new(config.sessions.clone()));
        let engine = Arc::new(DialogueEngine::new(store.clone(), &config.agent));
        Self::assemble(config, store, engine)
    }

    /// Create application state with a generation backend
    pub fn with_llm(config: Settings, llm: Arc<dyn LlmBackend>) -> Self {
        let store = Arc::new(SessionStore::new(config.sessions.clone()));
        let engine = Arc::new(DialogueEngine::with_llm(store.clone(), &config.agent, llm));
        Self::assemble(config, store, engine)
    }

    fn assemble(config: Settings, store: Arc<SessionStore>, engine: Arc<DialogueEngine>) -> Self {
        Self {
            detector: Arc::new(ScamDetector::new(config.agent.detector_window)),
            reports: Arc::new(ReportGenerator::new(&config.report)),
            config: Arc::new(RwLock::new(config)),
            store,
            engine,
        }
    }
}
