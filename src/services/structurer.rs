//! Structured-data extraction over a completion backend.
//!
//! Takes extracted document text, truncates it to the configured character
//! budget, sends it to the model with a fixed instruction, and normalizes
//! whatever comes back into a [`StructuredResult`].

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::models::StructuredResult;
use crate::services::llm::{ChatMessage, CompletionBackend};

/// Fixed instruction sent with every extraction request.
pub const SYSTEM_INSTRUCTION: &str = "Extract key structured information from the medical document. Provide a clean JSON with extracted details.";

/// Truncate `text` to at most `max_chars` characters.
///
/// The budget is character-based, not token- or byte-based, so the cut
/// always lands on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Attempt strict JSON parsing of the model's raw output.
///
/// Valid JSON passes through untouched; anything else is wrapped so the
/// caller never sees a parse failure. No schema validation is performed
/// beyond syntactic JSON-ness.
pub fn normalize(raw: &str) -> StructuredResult {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => StructuredResult::ParsedJson(value),
        Err(_) => StructuredResult::FallbackText(raw.to_string()),
    }
}

pub struct Structurer {
    backend: Arc<dyn CompletionBackend>,
    max_prompt_chars: usize,
}

impl Structurer {
    pub fn new(backend: Arc<dyn CompletionBackend>, max_prompt_chars: usize) -> Self {
        Self {
            backend,
            max_prompt_chars,
        }
    }

    /// Build the two-message exchange for a document's extracted text.
    ///
    /// Truncation happens here, before prompt construction — the model
    /// never receives more than the configured budget.
    pub fn build_messages(&self, text: &str) -> Vec<ChatMessage> {
        let truncated = truncate_chars(text, self.max_prompt_chars);
        vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(format!(
                "Extract structured data from this medical text:\n\n{}",
                truncated
            )),
        ]
    }

    /// Request structured data for the given extracted text.
    ///
    /// Never fails: an upstream error is absorbed into the result as an
    /// `{"error": ...}` object so the caller always receives a value.
    pub async fn structure(&self, text: &str) -> StructuredResult {
        let messages = self.build_messages(text);

        match self.backend.complete(&messages).await {
            Ok(raw) => {
                debug!(completion_length = raw.len(), "Completion received");
                normalize(&raw)
            }
            Err(e) => {
                warn!(error = %e, "Completion request failed, embedding error in result");
                StructuredResult::ParsedJson(json!({ "error": e.to_string() }))
            }
        }
    }
}
