//! Retrieval-augmented answer pipeline.
//!
//! `ContextAssembler` fuses retrieved corpus chunks with an optional
//! uploaded document under a character budget; `AnswerOrchestrator`
//! turns the fused context and the question into a completion request.

mod assembler;
mod orchestrator;

pub use assembler::{AssembledContext, AssemblerConfig, ContextAssembler};
pub use orchestrator::{AnswerOrchestrator, ConversationTurn, GENERATION_FAILURE_MARKER};
