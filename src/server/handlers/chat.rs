use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;
use crate::llm::types::{ChatMessage, ChatRequest};
use crate::prompts::SYSTEM_PROMPT;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequestBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub answer: String,
    pub used_context: bool,
    pub sources: Vec<String>,
}

/// `POST /chat` — retrieve profile context for the message, forward it with
/// the system prompt to the chat model, and report whether the context
/// passed the relevance gate.
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ChatRequestBody>,
) -> Result<Json<ChatResponseBody>, ApiError> {
    let message = body.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_string()));
    }

    let retrieval = state.retriever.retrieve(message, state.config.top_k).await?;
    let used_context = !retrieval.context.is_empty() && state.retriever.is_usable(&retrieval);

    let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
    if !retrieval.context.is_empty() {
        messages.push(ChatMessage::system(format!(
            "Context:\n{}",
            retrieval.context
        )));
    }
    messages.push(ChatMessage::user(message));

    let answer = state
        .llm
        .chat(ChatRequest::new(messages), &state.config.chat_model)
        .await?;

    if used_context {
        tracing::info!(
            sources = retrieval.sources.len(),
            best_distance = retrieval.best_distance.map(f64::from),
            "Answered with retrieved context"
        );
    } else {
        let reason = match retrieval.best_distance {
            Some(distance) => format!(
                "Best distance {:.3} above threshold {}",
                distance, state.config.distance_threshold
            ),
            None => "No relevant context found".to_string(),
        };
        tracing::warn!("Unanswered query: {}", reason);
        // Best-effort: a logging failure never fails the request.
        if let Err(err) =
            state
                .unanswered
                .record(message, &answer, &retrieval.sources, &reason)
        {
            tracing::warn!("Failed to append unanswered log: {}", err);
        }
    }

    Ok(Json(ChatResponseBody {
        answer,
        used_context,
        sources: retrieval.sources,
    }))
}
