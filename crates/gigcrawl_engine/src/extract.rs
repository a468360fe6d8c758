use std::fmt;
use std::time::Duration;

use crawl_logging::crawl_debug;
use gigcrawl_core::{parse_event_date, EventCandidate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ContentFragment;

const SYSTEM_INSTRUCTION: &str = "You extract concert and club event listings from HTML. \
For every event on the page return an object with the keys \"artist\", \"date\" (YYYY-MM-DD), \
\"venue\", \"time\", \"genre\", \"description\" and \"ticketUrl\" (null when there is none). \
Reply with a JSON array of these objects and nothing else. Reply with [] if there are no events.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("extraction request failed: {0}")]
    Transport(String),
    #[error("extraction request timed out")]
    Timeout,
    #[error("extraction service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("extraction service returned no message content")]
    EmptyReply,
    #[error("extraction reply is not valid JSON: {0}")]
    Payload(String),
    #[error("extraction reply does not match the event schema: {0}")]
    Schema(String),
}

/// Turns an isolated listing fragment into event candidates.
///
/// One attempt per call; callers decide what a failure means for the run.
#[async_trait::async_trait]
pub trait EventExtractor: Send + Sync {
    async fn extract(
        &self,
        fragment: &ContentFragment,
    ) -> Result<Vec<EventCandidate>, ExtractionError>;
}

#[derive(Clone)]
pub struct ExtractionSettings {
    pub api_base_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
    pub max_fragment_chars: usize,
    pub temperature: f32,
}

impl ExtractionSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(60),
            max_fragment_chars: 60_000,
            temperature: 0.0,
        }
    }
}

impl fmt::Debug for ExtractionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionSettings")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("max_fragment_chars", &self.max_fragment_chars)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Extraction backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionExtractor {
    settings: ExtractionSettings,
    client: reqwest::Client,
}

impl ChatCompletionExtractor {
    pub fn new(settings: ExtractionSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.api_base_url.trim_end_matches('/')
        )
    }
}

#[async_trait::async_trait]
impl EventExtractor for ChatCompletionExtractor {
    async fn extract(
        &self,
        fragment: &ContentFragment,
    ) -> Result<Vec<EventCandidate>, ExtractionError> {
        let markup = truncate_chars(&fragment.html, self.settings.max_fragment_chars);
        if markup.len() < fragment.html.len() {
            crawl_debug!(
                "fragment truncated from {} to {} bytes before extraction",
                fragment.html.len(),
                markup.len()
            );
        }
        let user_content =
            format!("Parse the following HTML content and extract concert information: {markup}");
        let request = ChatRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: &user_content,
                },
            ],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, 200).to_string(),
            });
        }

        let reply: ChatResponse = response.json().await.map_err(|err| {
            if err.is_timeout() {
                ExtractionError::Timeout
            } else {
                ExtractionError::Payload(err.to_string())
            }
        })?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ExtractionError::EmptyReply)?;

        parse_extraction_payload(&content)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ExtractionError {
    if err.is_timeout() {
        ExtractionError::Timeout
    } else {
        ExtractionError::Transport(err.to_string())
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[derive(Debug, Deserialize)]
struct ExtractedEvent {
    artist: Option<String>,
    date: Option<String>,
    venue: Option<String>,
    time: Option<String>,
    genre: Option<String>,
    description: Option<String>,
    #[serde(rename = "ticketUrl", alias = "ticket_url", alias = "ticketURL")]
    ticket_url: Option<String>,
}

/// Parse the service's reply text into candidates.
///
/// Accepts a JSON array of event objects, optionally wrapped in a markdown code
/// fence or in an object with exactly one array-valued member. A single
/// malformed element rejects the whole reply.
pub fn parse_extraction_payload(content: &str) -> Result<Vec<EventCandidate>, ExtractionError> {
    let json = strip_code_fence(content);
    let value: Value =
        serde_json::from_str(json).map_err(|err| ExtractionError::Payload(err.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => {
            let mut arrays = map.into_iter().filter_map(|(_, v)| match v {
                Value::Array(items) => Some(items),
                _ => None,
            });
            match (arrays.next(), arrays.next()) {
                (Some(items), None) => items,
                _ => {
                    return Err(ExtractionError::Schema(
                        "expected a list of events or an object holding one".into(),
                    ))
                }
            }
        }
        _ => {
            return Err(ExtractionError::Schema(
                "expected a list of events".into(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| into_candidate(index, item))
        .collect()
}

fn into_candidate(index: usize, item: Value) -> Result<EventCandidate, ExtractionError> {
    let raw: ExtractedEvent = serde_json::from_value(item)
        .map_err(|err| ExtractionError::Schema(format!("event {index}: {err}")))?;

    let artist = clean(raw.artist)
        .ok_or_else(|| ExtractionError::Schema(format!("event {index}: missing artist")))?;
    let date_text = clean(raw.date)
        .ok_or_else(|| ExtractionError::Schema(format!("event {index}: missing date")))?;
    let date = parse_event_date(&date_text).ok_or_else(|| {
        ExtractionError::Schema(format!("event {index}: unrecognised date {date_text:?}"))
    })?;

    Ok(EventCandidate {
        artist,
        date,
        venue: clean(raw.venue).unwrap_or_default(),
        time: clean(raw.time).unwrap_or_default(),
        genre: clean(raw.genre).unwrap_or_default(),
        description: clean(raw.description).unwrap_or_default(),
        ticket_url: clean(raw.ticket_url),
    })
}

fn clean(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest
        .split_once('\n')
        .map_or_else(|| rest.trim_start_matches("json"), |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_reply() {
        assert_eq!(strip_code_fence("```json\n[1]\n```"), "[1]");
        assert_eq!(strip_code_fence("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fence("  [] "), "[]");
        assert_eq!(strip_code_fence("```json[]```"), "[]");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("Grüße", 3), "Grü");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let settings = ExtractionSettings::new("sk-secret");
        assert!(!format!("{settings:?}").contains("sk-secret"));
    }
}
