//! Conversation Flow Engine.
//!
//! One engine drives every pre-consultation chat surface: red-flag
//! interception, track classification, the turn-count phase machine,
//! prompt composition, response finalization, and out-of-band summary
//! extraction. The engine is stateless per call; everything a decision
//! needs (history, turn count, track) arrives in the request, so
//! concurrent requests for the same logical session are the caller's
//! problem to serialize.

pub mod classifier;
pub mod keywords;
pub mod policy;
pub mod postprocess;
pub mod prompt;
pub mod summary;

use std::sync::Arc;

use tracing::{debug, warn};

use shared_models::auth::User;

use crate::error::ConsultationError;
use crate::models::{ChatMessage, ChatRequest, ChatResponse, MessageRole, SummaryResult, Track};
use crate::services::audit::{AuditEntry, AuditService};
use crate::services::provider::{GenerationMode, TextGenerator};

use keywords::KeywordSet;
use policy::{Phase, TurnPolicy};
use postprocess::ControlFlags;

/// Everything product-configurable about the flow: keyword sets, the
/// turn thresholds, and the history window. Injected at construction so
/// thresholds are testable in isolation instead of living as constants
/// in handler code.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub emergency_keywords: KeywordSet,
    pub medical_question_keywords: KeywordSet,
    pub reservation_keywords: KeywordSet,
    pub concern_keywords: KeywordSet,
    pub booking_offer_phrases: KeywordSet,
    pub soft_gate_turn: u32,
    pub hard_stop_turn: u32,
    pub reservation_nudge_turn: u32,
    pub max_history_messages: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            emergency_keywords: KeywordSet::from(keywords::EMERGENCY_KEYWORDS),
            medical_question_keywords: KeywordSet::from(keywords::MEDICAL_QUESTION_KEYWORDS),
            reservation_keywords: KeywordSet::from(keywords::RESERVATION_KEYWORDS),
            concern_keywords: KeywordSet::from(keywords::CONCERN_KEYWORDS),
            booking_offer_phrases: KeywordSet::from(keywords::BOOKING_OFFER_PHRASES),
            soft_gate_turn: 2,
            hard_stop_turn: 4,
            reservation_nudge_turn: 3,
            max_history_messages: 20,
        }
    }
}

pub struct ConversationEngine {
    config: EngineConfig,
    provider: Arc<dyn TextGenerator>,
    audit: Option<AuditService>,
}

impl ConversationEngine {
    pub fn new(config: EngineConfig, provider: Arc<dyn TextGenerator>) -> Self {
        Self {
            config,
            provider,
            audit: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditService) -> Self {
        self.audit = Some(audit);
        self
    }

    fn audit(&self, user: Option<&User>, action: &'static str, request: &ChatRequest, track: Track) {
        if let Some(audit) = &self.audit {
            audit.record(AuditEntry {
                actor: user.map(|u| u.id.clone()),
                action,
                track,
                message_len: request.message.len(),
                turn_count: request.turn_count,
            });
        }
    }

    fn response(
        request: &ChatRequest,
        track: Track,
        content: String,
        flags: ControlFlags,
    ) -> ChatResponse {
        let mut response = ChatResponse::new(content, request.turn_count, track);
        response.require_login = flags.require_login;
        response.is_hard_stop = flags.is_hard_stop;
        response
    }

    /// Handle one inbound message. Every branch terminates in a
    /// constructed response; the only error the caller can see is
    /// invalid input, rejected before any provider call.
    pub async fn respond(
        &self,
        request: &ChatRequest,
        user: Option<&User>,
    ) -> Result<ChatResponse, ConsultationError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ConsultationError::InvalidInput(
                "message must not be empty".to_string(),
            ));
        }

        // Track is classified once per session; a supplied value is
        // never re-derived from the current message.
        let track = request
            .track
            .unwrap_or_else(|| classifier::classify(message));

        // Red-flag interception happens before anything else so that
        // emergency detection costs zero latency and zero tokens.
        if self.config.emergency_keywords.matches(message) {
            self.audit(user, "emergency_redirect", request, track);
            return Ok(Self::response(
                request,
                track,
                postprocess::EMERGENCY_MESSAGE.to_string(),
                ControlFlags::default(),
            ));
        }

        if self.config.medical_question_keywords.matches(message) {
            self.audit(user, "medical_redirect", request, track);
            return Ok(Self::response(
                request,
                track,
                postprocess::MEDICAL_QUESTION_MESSAGE.to_string(),
                ControlFlags::login(),
            ));
        }

        if self.config.concern_keywords.matches(message) {
            self.audit(user, "concern_redirect", request, track);
            return Ok(Self::response(
                request,
                track,
                postprocess::CONCERN_LOGIN_MESSAGE.to_string(),
                ControlFlags::login(),
            ));
        }

        let policy = TurnPolicy::new(self.config.soft_gate_turn, self.config.hard_stop_turn);
        let phase = policy.decide(request.turn_count);
        debug!("Turn {} classified as {:?} on track {:?}", request.turn_count, phase, track);

        match phase {
            Phase::PostHardStop => {
                self.audit(user, "post_hard_stop", request, track);
                Ok(Self::response(
                    request,
                    track,
                    postprocess::SESSION_CONCLUDED_MESSAGE.to_string(),
                    ControlFlags::terminal(),
                ))
            }
            Phase::HardStop => {
                // Final turn: the reply is the closing analysis over the
                // whole exchange, marked terminal.
                let analysis_prompt = prompt::compose(
                    Phase::HardStop,
                    track,
                    request.entry_intent,
                    &request.history,
                    message,
                    self.config.max_history_messages,
                );

                match self
                    .provider
                    .generate(&analysis_prompt, GenerationMode::Analysis)
                    .await
                {
                    Ok(text) => {
                        self.audit(user, "hard_stop_summary", request, track);
                        Ok(Self::response(request, track, text, ControlFlags::terminal()))
                    }
                    Err(e) => {
                        // Degraded but valid; no terminal flags so the
                        // client can retry the final turn.
                        warn!("Provider failed on hard-stop turn: {}", e);
                        Ok(Self::response(
                            request,
                            track,
                            postprocess::UNAVAILABLE_MESSAGE.to_string(),
                            ControlFlags::default(),
                        ))
                    }
                }
            }
            Phase::Normal | Phase::SoftGate => {
                let chat_prompt = prompt::compose(
                    phase,
                    track,
                    request.entry_intent,
                    &request.history,
                    message,
                    self.config.max_history_messages,
                );

                let raw = match self
                    .provider
                    .generate(&chat_prompt, GenerationMode::Chat)
                    .await
                {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Provider failed, returning degraded reply: {}", e);
                        self.audit(user, "provider_unavailable", request, track);
                        return Ok(Self::response(
                            request,
                            track,
                            postprocess::UNAVAILABLE_MESSAGE.to_string(),
                            ControlFlags::default(),
                        ));
                    }
                };

                let reservation_confirmed = self.config.reservation_keywords.matches(message);
                let prior_assistant = request
                    .history
                    .iter()
                    .rev()
                    .find(|m| m.role == MessageRole::Ai)
                    .map(|m| m.content.as_str());

                let (content, flags) = postprocess::finalize(
                    phase,
                    request.turn_count,
                    reservation_confirmed,
                    prior_assistant,
                    raw,
                    &self.config.booking_offer_phrases,
                    self.config.reservation_nudge_turn,
                );

                let action = if flags.reservation_requested {
                    "reservation_request"
                } else {
                    "chat_exchange"
                };
                self.audit(user, action, request, track);

                Ok(Self::response(request, track, content, flags))
            }
        }
    }

    /// Produce the structured session summary. Runs out-of-band over a
    /// stored transcript and never fails: generation or parse problems
    /// resolve to the documented fallback.
    pub async fn summarize(&self, history: &[ChatMessage], topic: Track) -> SummaryResult {
        let summary_prompt = summary::build_summary_prompt(history, topic);

        match self
            .provider
            .generate(&summary_prompt, GenerationMode::Analysis)
            .await
        {
            Ok(raw) => summary::parse_summary_or_fallback(&raw),
            Err(e) => {
                warn!("Summary generation failed, using fallback: {}", e);
                SummaryResult::fallback()
            }
        }
    }
}
