//! Conversational answer generation.
//!
//! `POST /generate` templates the caller-supplied context into a fixed
//! assistant prompt and requests a single completion. Upstream failures are
//! stringified into the generated text rather than failing the request, the
//! same degrade-gracefully policy the upload pipeline uses.

use axum::{extract::State, response::Json};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{GenerateRequest, GenerateResponse};
use crate::services::ChatMessage;
use crate::state::AppState;

fn build_assistant_prompt(user_query: &str, relevant_text: &str, health_data: &str) -> String {
    format!(
        "\
You are MediBuddy, a helpful medical assistant chatbot. Answer the user's question based on their relevant medical data.

- Be clear, accurate, and concise.
- Use markdown for easy reading.
- Emphasize important points using *bold*.
- Provide actionable advice when applicable.

User's Medical Data: {health_data}
Relevant Context: {relevant_text}
User's Question: {user_query}

Your response:
"
    )
}

pub async fn generate_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<Json<GenerateResponse>> {
    let (user_query, relevant_text, health_data) = match (
        request.user_query.as_deref(),
        request.relevant_text.as_deref(),
        request.health_data.as_deref(),
    ) {
        (Some(q), Some(r), Some(h)) if !q.is_empty() && !r.is_empty() && !h.is_empty() => {
            (q, r, h)
        }
        _ => return Err(AppError::MissingFields),
    };

    info!(query_length = user_query.len(), "Starting generation request");

    let prompt = build_assistant_prompt(user_query, relevant_text, health_data);
    let messages = [ChatMessage::user(prompt)];

    let generated_text = match state.backend.complete(&messages).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Completion request failed, returning error text");
            e.to_string()
        }
    };

    Ok(Json(GenerateResponse { generated_text }))
}
