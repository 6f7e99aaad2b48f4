//! Mentora: a retrieval-augmented educational question-answering
//! assistant.
//!
//! The pipeline for one query is a straight line: an optional uploaded
//! document goes through [`extract`], the question is embedded and
//! matched against the corpus [`index`], [`rag::ContextAssembler`] fuses
//! the two into a bounded context string, and
//! [`rag::AnswerOrchestrator`] frames the prompt and delegates to the
//! [`llm`] generation capability. Conversation turns land in
//! [`history`]; [`state::AppState`] wires it all together once per
//! process.

pub mod core;
pub mod extract;
pub mod history;
pub mod index;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod state;
