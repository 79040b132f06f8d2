//! Fire-and-forget audit trail for chat exchanges.
//!
//! Entries carry redacted metadata only (action, message length, turn
//! count), never message content. Recording must not block or fail the
//! response path, so writes run on a detached task and failures are
//! logged and swallowed.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::debug;

use shared_database::SupabaseClient;

use crate::models::Track;

const AUDIT_TABLE: &str = "consultation_audit";

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub actor: Option<String>,
    pub action: &'static str,
    pub track: Track,
    pub message_len: usize,
    pub turn_count: u32,
}

pub struct AuditService {
    supabase: Arc<SupabaseClient>,
}

impl AuditService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub fn record(&self, entry: AuditEntry) {
        let supabase = self.supabase.clone();

        tokio::spawn(async move {
            let row = json!({
                "actor_id": entry.actor,
                "action": entry.action,
                "track": entry.track,
                "message_len": entry.message_len,
                "turn_count": entry.turn_count,
                "created_at": Utc::now().to_rfc3339(),
            });

            if let Err(e) = supabase.insert(AUDIT_TABLE, None, row).await {
                debug!("Audit entry dropped: {}", e);
            }
        });
    }
}
