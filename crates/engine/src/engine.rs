//! Dialogue engine
//!
//! Decides, per incoming message, whether the persona greets, refuses
//! with a scripted line, or hands context to the generation capability,
//! and keeps the session's scam flag and stage current.

use std::sync::Arc;

use honeypot_config::AgentConfig;
use honeypot_core::Turn;
use honeypot_llm::{LlmBackend, PromptBuilder};

use crate::script::{fallback_line, hard_refusal, tone_for_stage, GREETING_OPENER};
use crate::signals::{claims_identity_shift, classify, Category};
use crate::store::SessionStore;
use crate::EngineError;

/// Dialogue engine
///
/// The generation capability is injected behind `LlmBackend`; without
/// one, every reply comes from the scripted tables.
pub struct DialogueEngine {
    store: Arc<SessionStore>,
    llm: Option<Arc<dyn LlmBackend>>,
    history_window: usize,
}

impl DialogueEngine {
    pub fn new(store: Arc<SessionStore>, config: &AgentConfig) -> Self {
        Self {
            store,
            llm: None,
            history_window: config.history_window,
        }
    }

    /// Create an engine with a generation backend
    pub fn with_llm(
        store: Arc<SessionStore>,
        config: &AgentConfig,
        llm: Arc<dyn LlmBackend>,
    ) -> Self {
        Self {
            store,
            llm: Some(llm),
            history_window: config.history_window,
        }
    }

    /// Access the underlying session store
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Produce the persona's reply to an incoming counterparty message
    ///
    /// Side effects: appends both turns to the session, may set the
    /// scam flag, and advances the stage while the flag is set. The
    /// whole turn is serialized per session; the state lock is not held
    /// across the generation call.
    pub async fn respond(&self, session_id: &str, incoming: &str) -> Result<String, EngineError> {
        let session = self.store.get_or_create(session_id)?;
        let _turn = session.lock_turn().await;

        session.append(Turn::counterparty(incoming));

        let category = classify(incoming);
        let identity_shift = claims_identity_shift(incoming);

        if category.is_scam_signal() || identity_shift {
            session.mark_scam();
        }

        let snapshot = session.snapshot();
        let scam_active = snapshot.is_scam;
        let stage = snapshot.stage;

        tracing::debug!(
            session_id = %session_id,
            category = %category,
            identity_shift,
            scam_active,
            stage,
            "Classified incoming message"
        );

        // Friendly short-circuit for clean greetings: no escalation,
        // no stage advance, no wasted engagement
        if category == Category::Greeting && !scam_active {
            session.append(Turn::agent(GREETING_OPENER));
            return Ok(GREETING_OPENER.to_string());
        }

        // Hard control: once engagement has progressed past the probing
        // stage, disclosure-risk categories never reach the generator
        let reply = if stage >= 2 {
            match hard_refusal(category) {
                Some(refusal) => refusal.to_string(),
                None => self.generate_reply(&snapshot.turns, stage, category, incoming).await,
            }
        } else {
            self.generate_reply(&snapshot.turns, stage, category, incoming).await
        };

        session.append(Turn::agent(&reply));

        if scam_active {
            session.advance_stage();
        }

        Ok(reply)
    }

    /// Generated reply, or the deterministic fallback
    ///
    /// Generation failures and empty outputs are swallowed here; the
    /// engine never returns an empty reply once a scam is engaged.
    async fn generate_reply(
        &self,
        history: &[Turn],
        stage: u8,
        category: Category,
        incoming: &str,
    ) -> String {
        if let Some(ref llm) = self.llm {
            let messages = PromptBuilder::new()
                .system_prompt(tone_for_stage(stage), incoming)
                .with_history(history, self.history_window)
                .build();

            match llm.generate(&messages).await {
                Ok(result) if !result.text.is_empty() => {
                    tracing::debug!(
                        tokens = result.tokens,
                        total_time_ms = result.total_time_ms,
                        "Generated reply"
                    );
                    return result.text;
                }
                Ok(_) => {
                    tracing::warn!("Generation returned empty text, using fallback");
                }
                Err(e) => {
                    tracing::warn!("Generation failed, using fallback: {}", e);
                }
            }
        }

        fallback_line(category).to_string()
    }
}
