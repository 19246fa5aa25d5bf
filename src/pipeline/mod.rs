//! Prescription text to cheaper, safety-checked alternatives:
//! prompt → LLM → parse → fuzzy correction → alternatives → safety.

pub mod extractor;
pub mod generic;
pub mod ollama;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod types;

pub use extractor::*;
pub use generic::*;
pub use ollama::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use types::*;

use thiserror::Error;

use crate::db::DatabaseError;
use crate::intelligence::IntelligenceError;
use crate::search::SearchError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Prescription text is empty")]
    InputTooShort,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Intelligence error: {0}")]
    Intelligence(#[from] IntelligenceError),
}
