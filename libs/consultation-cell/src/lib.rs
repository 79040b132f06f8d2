pub mod engine;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    ChatMessage, ChatRequest, ChatResponse, EntryIntent, MessageRole, SummaryRequest,
    SummaryResult, Track,
};

pub use engine::{ConversationEngine, EngineConfig};
pub use error::ConsultationError;

pub use router::consultation_routes;

pub mod api {
    pub use crate::services::audit::AuditService;
    pub use crate::services::provider::{GenerationMode, OpenAiProvider, TextGenerator};
    pub use crate::services::session::SessionService;
}
