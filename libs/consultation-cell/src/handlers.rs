use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use tracing::warn;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::user_from_headers;

use crate::engine::{classifier, ConversationEngine, EngineConfig};
use crate::error::ConsultationError;
use crate::models::{ChatRequest, ChatResponse, MessageRole, SummaryRequest, SummaryResult};
use crate::services::audit::AuditService;
use crate::services::provider::OpenAiProvider;
use crate::services::session::SessionService;

fn build_engine(config: &AppConfig) -> Result<ConversationEngine, AppError> {
    let provider = OpenAiProvider::new(config).map_err(|e| AppError::Internal(e.to_string()))?;
    let supabase = Arc::new(SupabaseClient::new(config));

    Ok(ConversationEngine::new(EngineConfig::default(), Arc::new(provider))
        .with_audit(AuditService::new(supabase)))
}

fn map_engine_error(e: ConsultationError) -> AppError {
    match e {
        ConsultationError::InvalidInput(msg) => AppError::BadRequest(msg),
        ConsultationError::Provider(msg) => AppError::ServiceUnavailable(msg),
        ConsultationError::Database(msg) => AppError::Database(msg),
    }
}

/// One exchange of the pre-consultation chat. Public: a bearer token,
/// when present and valid, only tags the audit trail.
pub async fn consultation_chat(
    State(state): State<Arc<AppConfig>>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let user = user_from_headers(&headers, &state.supabase_jwt_secret);

    let engine = build_engine(&state)?;

    let response = engine
        .respond(&request, user.as_ref())
        .await
        .map_err(map_engine_error)?;

    Ok(Json(response))
}

/// Run the summary extractor over a stored session transcript, persist
/// the result, and return it. Requires auth.
pub async fn generate_session_summary(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(session_id): Path<String>,
    body: Option<Json<SummaryRequest>>,
) -> Result<Json<SummaryResult>, AppError> {
    let token = auth.token();

    let supabase = Arc::new(SupabaseClient::new(&state));
    let sessions = SessionService::new(supabase);

    let transcript = sessions
        .load_transcript(&session_id, token)
        .await
        .map_err(map_engine_error)?;

    if transcript.is_empty() {
        return Err(AppError::NotFound(format!(
            "No transcript found for session {}",
            session_id
        )));
    }

    // Topic comes from the request when the caller kept it; otherwise
    // re-derive it from the first user message of the transcript.
    let topic = body
        .and_then(|Json(b)| b.topic)
        .unwrap_or_else(|| {
            transcript
                .iter()
                .find(|m| m.role == MessageRole::User)
                .map(|m| classifier::classify(&m.content))
                .unwrap_or_default()
        });

    let engine = build_engine(&state)?;
    let summary = engine.summarize(&transcript, topic).await;

    // The summary itself is the deliverable; a storage hiccup degrades
    // to an unsaved summary rather than a failed request.
    if let Err(e) = sessions
        .store_summary(&session_id, &user.id, &summary, token)
        .await
    {
        warn!("Failed to store summary for session {}: {}", session_id, e);
    }

    Ok(Json(summary))
}
