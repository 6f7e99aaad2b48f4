//! Answer orchestration: prompt framing and generation delegation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::extract::UploadedDocument;
use crate::llm::Generator;

use super::assembler::ContextAssembler;

/// Prefix of the answer text when the generation call fails. The session
/// keeps going; the caller renders this inline like any other answer.
pub const GENERATION_FAILURE_MARKER: &str = "[generation failed]";

/// One question/answer exchange, owned by the caller. `used_context`
/// records whether the generator saw assembled context or answered from
/// general knowledge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub used_context: bool,
}

/// Builds the final prompt from question plus assembled context and
/// delegates to the generation capability.
pub struct AnswerOrchestrator {
    assembler: ContextAssembler,
    generator: Arc<dyn Generator>,
    max_answer_tokens: u32,
}

impl AnswerOrchestrator {
    pub fn new(
        assembler: ContextAssembler,
        generator: Arc<dyn Generator>,
        max_answer_tokens: u32,
    ) -> Self {
        AnswerOrchestrator {
            assembler,
            generator,
            max_answer_tokens,
        }
    }

    /// Answer a question, optionally against an uploaded document.
    ///
    /// Never fails: generation errors come back as a marked answer
    /// string so the interactive session can continue.
    pub async fn answer(
        &self,
        question: &str,
        doc: Option<&UploadedDocument>,
    ) -> ConversationTurn {
        let context = self.assembler.assemble(question, doc).await;
        tracing::debug!(
            retrieved = context.retrieved_chunks,
            document = context.document_name.as_deref().unwrap_or("-"),
            context_chars = context.text.chars().count(),
            "assembled context"
        );

        let prompt = build_prompt(question, &context.text);
        let answer = match self
            .generator
            .generate(&prompt, self.max_answer_tokens)
            .await
        {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("generation failed: {}", err);
                format!("{} {}", GENERATION_FAILURE_MARKER, err)
            }
        };

        ConversationTurn {
            question: question.to_string(),
            answer,
            used_context: !context.is_empty(),
        }
    }
}

fn build_prompt(question: &str, context: &str) -> String {
    if context.is_empty() {
        format!(
            "Question: {}\n\nProvide a helpful educational answer:",
            question
        )
    } else {
        format!(
            "Context: {}\n\nQuestion: {}\n\nAnswer this question based on the context provided:",
            context, question
        )
    }
}
