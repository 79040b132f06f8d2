//! Stored-transcript access for the out-of-band summary path.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use shared_database::SupabaseClient;

use crate::error::ConsultationError;
use crate::models::{ChatMessage, MessageRole, SummaryResult};

#[derive(Debug, Deserialize)]
struct StoredMessage {
    role: MessageRole,
    content: String,
}

pub struct SessionService {
    supabase: Arc<SupabaseClient>,
}

impl SessionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Load the full transcript for a session, oldest message first.
    pub async fn load_transcript(
        &self,
        session_id: &str,
        auth_token: &str,
    ) -> Result<Vec<ChatMessage>, ConsultationError> {
        let path = format!(
            "/rest/v1/consultation_messages?session_id=eq.{}&order=created_at.asc",
            session_id
        );

        let rows: Vec<StoredMessage> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))?;

        debug!("Loaded {} transcript messages for session {}", rows.len(), session_id);

        Ok(rows
            .into_iter()
            .map(|m| ChatMessage {
                role: m.role,
                content: m.content,
            })
            .collect())
    }

    pub async fn store_summary(
        &self,
        session_id: &str,
        user_id: &str,
        summary: &SummaryResult,
        auth_token: &str,
    ) -> Result<Value, ConsultationError> {
        let row = json!({
            "session_id": session_id,
            "user_id": user_id,
            "pattern_tags": summary.pattern_tags,
            "rhythm_score": summary.rhythm_score,
            "summary_text": summary.summary_text,
            "main_concern": summary.main_concern,
            "created_at": Utc::now().to_rfc3339(),
        });

        self.supabase
            .insert("consultation_summaries", Some(auth_token), row)
            .await
            .map_err(|e| ConsultationError::Database(e.to_string()))
    }
}
