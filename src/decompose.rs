use serde::Deserialize;
use std::sync::mpsc::Sender;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// OpenAI-compatible chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Bounded wait for the decomposition request; a timeout is a plain failure
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures at the decomposition boundary. Each surfaces as a single
/// user-facing message; partial results are never applied.
#[derive(Debug, Error)]
pub enum DecomposeError {
    #[error("no API key configured (set OPENAI_API_KEY)")]
    MissingApiKey,
    #[error("decomposition request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("decomposition endpoint returned {status}")]
    Status { status: u16 },
    #[error("decomposition response contained no usable content")]
    EmptyResponse,
    #[error("decomposition response was not in the expected format")]
    MalformedResponse,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// The JSON shape the model is asked to produce
#[derive(Debug, Deserialize)]
struct DecomposeResponse {
    subtasks: Vec<TitleEntry>,
}

#[derive(Debug, Deserialize)]
struct TitleEntry {
    title: String,
}

/// Client for the text-in, list-of-titles-out decomposition service
#[derive(Debug, Clone)]
pub struct DecomposeClient {
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl DecomposeClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, DecomposeError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or(DecomposeError::MissingApiKey)?;
        Ok(Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Decompose free text into an ordered list of short task titles.
    /// The returned strings are untrusted display text.
    pub fn decompose(&self, input: &str) -> Result<Vec<String>, DecomposeError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": build_prompt(input) }
            ],
            "temperature": 0.4,
            "max_tokens": 500,
        });

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;
        let resp = client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()?;

        if !resp.status().is_success() {
            return Err(DecomposeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let chat: ChatResponse = resp.json()?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(DecomposeError::EmptyResponse)?;

        let titles = parse_titles(&content)?;
        info!(count = titles.len(), "decomposition produced subtask titles");
        Ok(titles)
    }
}

fn build_prompt(input: &str) -> String {
    format!(
        "Read the text below and extract the concrete tasks it implies, \
         returning ONLY their titles as JSON.\n\
         \n\
         Rules:\n\
         - Each task should be doable in roughly 30 minutes to 2 hours.\n\
         - Avoid vague titles (\"prepare\", \"handle\").\n\
         - Respond with exactly this shape:\n\
         \n\
         {{\n  \"subtasks\": [\n    {{ \"title\": \"Draft the outline\" }},\n    {{ \"title\": \"Write the first section\" }}\n  ]\n}}\n\
         \n\
         Text:\n{}",
        input
    )
}

/// Extract subtask titles from model output. The model wraps its JSON in
/// prose or code fences often enough that we scan for the first balanced
/// object rather than parsing the whole message.
pub fn parse_titles(content: &str) -> Result<Vec<String>, DecomposeError> {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed).trim();

    let start = trimmed.find('{').ok_or(DecomposeError::MalformedResponse)?;
    let end = trimmed.rfind('}').ok_or(DecomposeError::MalformedResponse)?;
    if end < start {
        return Err(DecomposeError::MalformedResponse);
    }

    let parsed: DecomposeResponse = serde_json::from_str(&trimmed[start..=end])
        .map_err(|_| DecomposeError::MalformedResponse)?;

    let titles: Vec<String> = parsed
        .subtasks
        .into_iter()
        .map(|entry| entry.title.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if titles.is_empty() {
        return Err(DecomposeError::EmptyResponse);
    }
    Ok(titles)
}

/// Result of a background decomposition, tagged with the request generation
/// so stale responses can be discarded after the user moved on.
#[derive(Debug)]
pub struct DecomposeOutcome {
    pub generation: u64,
    pub result: Result<Vec<String>, DecomposeError>,
}

/// Run a decomposition on a background thread, reporting back over the
/// channel. The UI stays interactive; the request itself is not cancellable.
pub fn spawn_decompose(
    client: DecomposeClient,
    input: String,
    generation: u64,
    tx: Sender<DecomposeOutcome>,
) {
    std::thread::spawn(move || {
        let result = client.decompose(&input);
        // Receiver may be gone if the app exited; nothing to do then
        let _ = tx.send(DecomposeOutcome { generation, result });
    });
}
