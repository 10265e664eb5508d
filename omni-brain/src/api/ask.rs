//! POST /ask, the deep answer path
//!
//! **[BRN-API-020]** Raises the cancellation signal, ensures resources,
//! injects heuristic context (web search or calculator), then generates
//! under the Deep lock. Errors are embedded in `answer` with a 200, so the
//! launcher always has text to show.

use crate::calc;
use crate::error::{ApiError, ApiResult};
use crate::inference::GenerationOptions;
use crate::registry::ResourceState;
use crate::services::web_search::{self, SearchCategory};
use crate::AppState;
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, routing::post, Json, Router};
use omni_common::api::{AskRequest, AskResponse};
use tracing::{info, warn};

/// Substrings that route a query through web search context.
const WEB_CONTEXT_MARKERS: [&str; 4] = ["weather", "news", "who is", "what is"];

/// Substrings that route a query through the calculator context.
const CALC_CONTEXT_MARKERS: [&str; 4] = ["+", "*", "/", "sqrt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextSource {
    None,
    Internet,
    Calculator,
}

impl ContextSource {
    fn label(self) -> &'static str {
        match self {
            ContextSource::None => "None",
            ContextSource::Internet => "Internet",
            ContextSource::Calculator => "Calculator",
        }
    }
}

pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> ApiResult<Json<AskResponse>> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    // Signal first: any in-flight fast work becomes discardable before
    // this request takes a lane lock
    state.cancel.raise();

    if let ResourceState::Failed(reason) = state.registry.ensure_ready().await {
        return Ok(Json(AskResponse {
            answer: format!("Error: Model failed to load. Reason: {}", reason),
        }));
    }

    let query = request.query.trim().to_string();
    info!(query = %query, "Deep request");

    let (source, context) = build_context(&state, &query).await;
    let system = system_prompt(source, &context);

    let options = GenerationOptions {
        max_tokens: state.config.generation.deep_max_tokens,
        temperature: state.config.generation.deep_temperature,
        stop: state.config.generation.stop.clone(),
    };

    // The signal is cleared at the start of the deep inference call; fast
    // work started after this point stands on its own
    state.cancel.clear();
    let answer = {
        let _lane = state.lanes.deep.lock().await;
        state.completion.chat(&system, &query, &options).await
    };

    let answer = match answer {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Deep generation failed");
            format!("Error: {}", e)
        }
    };

    Ok(Json(AskResponse { answer }))
}

/// Keyword routing for context injection. Web search wins over the
/// calculator when both would match.
fn choose_source(query: &str) -> ContextSource {
    let lowered = query.to_lowercase();
    if WEB_CONTEXT_MARKERS.iter().any(|m| lowered.contains(m)) {
        return ContextSource::Internet;
    }
    if CALC_CONTEXT_MARKERS.iter().any(|m| query.contains(m)) {
        return ContextSource::Calculator;
    }
    ContextSource::None
}

async fn build_context(state: &AppState, query: &str) -> (ContextSource, String) {
    match choose_source(query) {
        ContextSource::Internet => {
            let block = match state
                .web_search
                .search(query, SearchCategory::General, state.config.timeouts.general())
                .await
            {
                Ok(records) => web_search::context_block(&records),
                Err(e) => format!("Search failed: {}", e),
            };
            (
                ContextSource::Internet,
                format!("--- Web Search Results ---\n{}\n", block),
            )
        }
        ContextSource::Calculator => (
            ContextSource::Calculator,
            format!("--- Calculation Result ---\n{}\n", calc::context_block(query)),
        ),
        ContextSource::None => (ContextSource::None, String::new()),
    }
}

/// Fixed role-tagged prompt template; the runtime applies the model's
/// chat markup around these roles.
fn system_prompt(source: ContextSource, context: &str) -> String {
    format!(
        "You are Omni, a smart OS assistant.\n\
         Context Source: {}\n\
         Context Data:\n{}\n\n\
         RULES:\n\
         1. Answer concisely.\n\
         2. Use context if available.",
        source.label(),
        if context.is_empty() { "No context." } else { context },
    )
}

pub fn ask_routes() -> Router<AppState> {
    Router::new().route("/ask", post(ask))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_words_route_to_web_search() {
        assert_eq!(choose_source("Who is Ada Lovelace"), ContextSource::Internet);
        assert_eq!(choose_source("weather in Berlin"), ContextSource::Internet);
        assert_eq!(choose_source("latest news"), ContextSource::Internet);
    }

    #[test]
    fn arithmetic_marks_route_to_the_calculator() {
        assert_eq!(choose_source("2+2"), ContextSource::Calculator);
        assert_eq!(choose_source("sqrt(16)"), ContextSource::Calculator);
    }

    #[test]
    fn web_search_outranks_the_calculator() {
        // Contains both "what is" and "+"
        assert_eq!(choose_source("what is 2+2"), ContextSource::Internet);
    }

    #[test]
    fn plain_queries_get_no_context() {
        assert_eq!(choose_source("tell me a story"), ContextSource::None);
    }

    #[test]
    fn prompt_template_embeds_source_and_context() {
        let prompt = system_prompt(ContextSource::Calculator, "--- Calculation Result ---\nExpression: 2+2\nResult: 4\n");
        assert!(prompt.starts_with("You are Omni, a smart OS assistant."));
        assert!(prompt.contains("Context Source: Calculator"));
        assert!(prompt.contains("Result: 4"));
        assert!(prompt.contains("RULES:"));

        let bare = system_prompt(ContextSource::None, "");
        assert!(bare.contains("Context Data:\nNo context."));
    }
}
