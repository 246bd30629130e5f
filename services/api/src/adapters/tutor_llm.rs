//! services/api/src/adapters/tutor_llm.rs
//!
//! This module contains the adapter for the tutoring LLM, an OpenAI-compatible
//! chat completion endpoint (Qwen via DashScope by default).
//! It implements the `TutorResponseService` port from the `core` crate and
//! falls back to the local canned responder whenever the remote call cannot
//! produce a reply.

const SYSTEM_INSTRUCTIONS: &str = "You are an expert Japanese language tutor called Sensei. \
Help users learn Japanese by providing accurate translations, grammar explanations, and cultural context. \
Be encouraging and patient. Focus on helping users improve their Japanese skills.";

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 500;

use async_trait::async_trait;
use nihongo_core::{
    domain::Message,
    fallback::FallbackResponder,
    ports::{PortError, PortResult, TutorResponseService},
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// Where and how to reach the completion API.
#[derive(Debug, Clone)]
pub struct TutorSettings {
    pub api_url: String,
    /// `None` puts the adapter in fallback-only mode.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

/// An adapter that implements `TutorResponseService` using an OpenAI-compatible LLM.
pub struct QwenTutorAdapter {
    client: Client,
    settings: TutorSettings,
    fallback: FallbackResponder,
}

impl QwenTutorAdapter {
    /// Creates a new `QwenTutorAdapter` whose HTTP client enforces `settings.timeout`.
    pub fn new(settings: TutorSettings, fallback: FallbackResponder) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            settings,
            fallback,
        })
    }

    /// Persona prompt, then the prior transcript, then the new input.
    fn build_messages(user_input: &str, context: &str, history: &[Message]) -> Vec<ChatMessage> {
        let system = if context.trim().is_empty() {
            SYSTEM_INSTRUCTIONS.to_string()
        } else {
            format!("{}\n{}", SYSTEM_INSTRUCTIONS, context)
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
        messages.extend(history.iter().map(|msg| ChatMessage {
            role: if msg.is_from_assistant() { "assistant" } else { "user" },
            content: msg.text.clone(),
        }));
        messages.push(ChatMessage {
            role: "user",
            content: user_input.to_string(),
        });
        messages
    }

    /// A single attempt against the completion API. No retries.
    async fn request_completion(&self, api_key: &str, messages: Vec<ChatMessage>) -> PortResult<String> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: false,
        };

        let response = self
            .client
            .post(&self.settings.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PortError::RemoteCallFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Completion API responded with {}: {}", status, body);
            return Err(PortError::RemoteCallFailed(format!("HTTP status {}", status)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| PortError::InvalidRemoteResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::InvalidRemoteResponse("response contained no choices".to_string())
            })
    }
}

//=========================================================================================
// `TutorResponseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TutorResponseService for QwenTutorAdapter {
    async fn generate_response(
        &self,
        user_input: &str,
        context: &str,
        conversation_history: &[Message],
    ) -> String {
        let Some(api_key) = self.settings.api_key.as_deref() else {
            warn!("Completion API key is not configured. Using canned response.");
            return self.fallback.generate_mock_response(user_input);
        };

        let messages = Self::build_messages(user_input, context, conversation_history);
        let started = Instant::now();
        match self.request_completion(api_key, messages).await {
            Ok(reply) => {
                info!("Tutor reply received in {:?}", started.elapsed());
                reply
            }
            Err(e) => {
                error!("Error calling completion API: {}", e);
                self.fallback.generate_mock_response(user_input)
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.settings.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use nihongo_core::{domain::Sender, fallback::Topic};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter(server: &MockServer, api_key: Option<&str>, timeout: Duration) -> QwenTutorAdapter {
        QwenTutorAdapter::new(
            TutorSettings {
                api_url: format!("{}/v1/chat/completions", server.uri()),
                api_key: api_key.map(str::to_string),
                model: "qwen-turbo".to_string(),
                timeout,
            },
            FallbackResponder::seeded(0),
        )
        .unwrap()
    }

    fn message(sender: Sender, text: &str) -> Message {
        Message {
            id: 1,
            sender,
            text: text.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn messages_keep_history_order_and_retag_senders() {
        let history = vec![
            message(Sender::Assistant, "ようこそ"),
            message(Sender::User { user_id: None }, "こんにちは"),
        ];
        let messages = QwenTutorAdapter::build_messages("元気?", "Lesson 1", &history);

        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "assistant", "user", "user"]);
        assert!(messages[0].content.starts_with("You are an expert Japanese language tutor"));
        assert!(messages[0].content.ends_with("Lesson 1"));
        assert_eq!(messages[1].content, "ようこそ");
        assert_eq!(messages[3].content, "元気?");
    }

    #[tokio::test]
    async fn returns_first_choice_from_remote() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "qwen-turbo",
                "temperature": 0.7,
                "max_tokens": 500,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [
                    { "message": { "content": "はい、そうです。" } },
                    { "message": { "content": "second" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let tutor = adapter(&server, Some("test-key"), Duration::from_secs(5));
        assert!(tutor.is_configured());
        let reply = tutor.generate_response("hello", "", &[]).await;
        assert_eq!(reply, "はい、そうです。");
    }

    #[tokio::test]
    async fn empty_choices_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .mount(&server)
            .await;

        let tutor = adapter(&server, Some("test-key"), Duration::from_secs(5));
        let reply = tutor.generate_response("hello", "", &[]).await;
        assert_eq!(reply, Topic::Greeting.reply());
    }

    #[tokio::test]
    async fn server_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let tutor = adapter(&server, Some("test-key"), Duration::from_secs(5));
        let reply = tutor.generate_response("thank you", "", &[]).await;
        assert_eq!(reply, Topic::Gratitude.reply());
    }

    #[tokio::test]
    async fn timeout_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let tutor = adapter(&server, Some("test-key"), Duration::from_millis(50));
        let reply = tutor.generate_response("hello", "", &[]).await;
        assert_eq!(reply, Topic::Greeting.reply());
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back() {
        let tutor = QwenTutorAdapter::new(
            TutorSettings {
                api_url: "http://127.0.0.1:9/v1/chat/completions".to_string(),
                api_key: Some("test-key".to_string()),
                model: "qwen-turbo".to_string(),
                timeout: Duration::from_secs(2),
            },
            FallbackResponder::seeded(0),
        )
        .unwrap();
        let reply = tutor.generate_response("grammar please", "", &[]).await;
        assert_eq!(reply, Topic::Grammar.reply());
    }

    #[tokio::test]
    async fn without_key_no_request_is_made() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let tutor = adapter(&server, None, Duration::from_secs(5));
        assert!(!tutor.is_configured());
        let reply = tutor.generate_response("hello", "", &[]).await;
        assert_eq!(reply, Topic::Greeting.reply());
    }
}
