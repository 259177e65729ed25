/// AI completion-time suggestions
///
/// Wraps the Gemini `generateContent` API behind the [`SuggestionService`]
/// trait. The API server injects either the real [`GeminiClient`] or a mock,
/// so handler tests never reach the network. The assistant chat flow in
/// [`crate::assistant`] shares the same client.
///
/// The model is asked for JSON with exactly two fields (suggested time and
/// reasoning); the response is parsed strictly and anything else is treated
/// as an upstream failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Error type for suggestion operations
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    /// Transport-level failure reaching the model API
    #[error("Suggestion transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The model API returned a non-success status
    #[error("Suggestion upstream error: {0}")]
    Upstream(String),

    /// The model response did not contain the expected payload
    #[error("Malformed suggestion response: {0}")]
    MalformedResponse(String),
}

/// Inputs to a suggestion request
#[derive(Debug, Clone)]
pub struct SuggestionInput {
    /// Title of the task
    pub task_title: String,

    /// Description of the task (may be empty)
    pub task_description: String,

    /// Human-readable current time, e.g. "Saturday, June 1, 2024 at 9:30 AM"
    pub current_time: String,
}

/// A completion-time suggestion produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// Free-text suggested completion time
    pub suggested_completion_time: String,

    /// Brief explanation of the suggestion
    pub reasoning: String,
}

/// Service capable of suggesting an optimal completion time for a task
#[async_trait]
pub trait SuggestionService: Send + Sync {
    /// Produces a suggestion for the given task
    async fn suggest(&self, input: &SuggestionInput) -> Result<Suggestion, SuggestError>;
}

/// Builds the model prompt for a suggestion request
pub fn build_prompt(input: &SuggestionInput) -> String {
    format!(
        "You are a scheduling assistant. Given the task details and the current time, \
         suggest an optimal completion time for the task.\n\n\
         Task Title: {}\n\
         Task Description: {}\n\
         Current Time: {}\n\n\
         Consider the task details and provide a suggested completion time, along with \
         a brief explanation of your reasoning.\n\n\
         Format the suggested completion time as a string.\n\n\
         Respond with a JSON object containing exactly two string fields: \
         \"suggestedCompletionTime\" and \"reasoning\".",
        input.task_title, input.task_description, input.current_time
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: String,
}

/// Extracts the text of the first candidate from a model response
pub(crate) fn first_candidate_text(body: &GenerateResponse) -> Result<&str, SuggestError> {
    body.candidates
        .first()
        .and_then(|c| c.content.parts.first())
        .map(|p| p.text.as_str())
        .ok_or_else(|| SuggestError::MalformedResponse("no candidates".to_string()))
}

/// Gemini-backed model client
///
/// Implements both [`SuggestionService`] and
/// [`AssistantService`](crate::assistant::AssistantService).
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint_base: String,
}

impl GeminiClient {
    /// Creates a client for the hosted Gemini API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint_base: GEMINI_ENDPOINT.to_string(),
        }
    }

    /// Overrides the API base URL (used by tests)
    pub fn with_endpoint_base(mut self, base: impl Into<String>) -> Self {
        self.endpoint_base = base.into();
        self
    }

    /// POSTs a `generateContent` body and returns the first candidate text
    pub(crate) async fn generate_text(
        &self,
        body: &serde_json::Value,
    ) -> Result<String, SuggestError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint_base, GEMINI_MODEL, self.api_key
        );

        let response = self.http.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Model request rejected upstream");
            return Err(SuggestError::Upstream(format!("{}: {}", status, body)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SuggestError::MalformedResponse(e.to_string()))?;

        first_candidate_text(&body).map(|text| text.to_string())
    }
}

/// Parses the JSON payload the model was asked to produce
fn parse_suggestion(text: &str) -> Result<Suggestion, SuggestError> {
    serde_json::from_str(text).map_err(|e| SuggestError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl SuggestionService for GeminiClient {
    async fn suggest(&self, input: &SuggestionInput) -> Result<Suggestion, SuggestError> {
        let prompt = build_prompt(input);

        debug!(task_title = %input.task_title, "Requesting completion-time suggestion");

        let request = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        let text = self.generate_text(&request).await?;
        parse_suggestion(&text)
    }
}

/// Suggestion service returning a fixed answer, for tests and demos
pub struct StaticSuggestionService {
    suggestion: Suggestion,
}

impl StaticSuggestionService {
    /// Creates a service that always returns the given suggestion
    pub fn new(suggestion: Suggestion) -> Self {
        Self { suggestion }
    }
}

impl Default for StaticSuggestionService {
    fn default() -> Self {
        Self::new(Suggestion {
            suggested_completion_time: "Tomorrow at 10:00 AM".to_string(),
            reasoning: "Mornings tend to be free of conflicting commitments.".to_string(),
        })
    }
}

#[async_trait]
impl SuggestionService for StaticSuggestionService {
    async fn suggest(&self, _input: &SuggestionInput) -> Result<Suggestion, SuggestError> {
        Ok(self.suggestion.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> SuggestionInput {
        SuggestionInput {
            task_title: "Water plants".to_string(),
            task_description: "The ferns on the balcony".to_string(),
            current_time: "Saturday, June 1, 2024 at 9:30 AM".to_string(),
        }
    }

    #[test]
    fn test_build_prompt_includes_all_inputs() {
        let prompt = build_prompt(&sample_input());

        assert!(prompt.starts_with("You are a scheduling assistant."));
        assert!(prompt.contains("Task Title: Water plants"));
        assert!(prompt.contains("Task Description: The ferns on the balcony"));
        assert!(prompt.contains("Current Time: Saturday, June 1, 2024 at 9:30 AM"));
        assert!(prompt.contains("suggestedCompletionTime"));
    }

    #[test]
    fn test_suggestion_serializes_camel_case() {
        let suggestion = Suggestion {
            suggested_completion_time: "Today at 6:00 PM".to_string(),
            reasoning: "Evening is free.".to_string(),
        };

        let json = serde_json::to_value(&suggestion).unwrap();
        assert_eq!(json["suggestedCompletionTime"], "Today at 6:00 PM");
        assert_eq!(json["reasoning"], "Evening is free.");
    }

    #[test]
    fn test_first_candidate_text() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "hello"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(first_candidate_text(&body).unwrap(), "hello");
    }

    #[test]
    fn test_first_candidate_text_rejects_empty_candidates() {
        let body: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        let result = first_candidate_text(&body);
        assert!(matches!(result, Err(SuggestError::MalformedResponse(_))));
    }

    #[test]
    fn test_parse_suggestion_extracts_json_payload() {
        let suggestion = parse_suggestion(
            "{\"suggestedCompletionTime\": \"Today at 6:00 PM\", \"reasoning\": \"Evening is free.\"}",
        )
        .unwrap();

        assert_eq!(suggestion.suggested_completion_time, "Today at 6:00 PM");
        assert_eq!(suggestion.reasoning, "Evening is free.");
    }

    #[test]
    fn test_parse_suggestion_rejects_free_text() {
        let result = parse_suggestion("sometime tomorrow");
        assert!(matches!(result, Err(SuggestError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_static_service_returns_fixed_suggestion() {
        let service = StaticSuggestionService::default();
        let suggestion = service.suggest(&sample_input()).await.unwrap();
        assert_eq!(suggestion.suggested_completion_time, "Tomorrow at 10:00 AM");
    }
}
