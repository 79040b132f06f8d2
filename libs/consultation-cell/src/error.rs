use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsultationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Text generation failed: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(String),
}
