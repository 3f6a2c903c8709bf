//! Synthesis gateway — the boundary around the external speech API.
//!
//! One synchronous-from-the-caller's-perspective call per request: no retry,
//! no partial result, no timeout beyond the reqwest defaults. Any failure
//! collapses into a single [`SynthesisError`] carrying the provider's
//! message, which the handler surfaces to the user verbatim.

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use murmur_core::types::SpeechRequest;

use crate::error::SynthesisError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Capability interface for speech synthesis so the concrete provider can be
/// swapped out or mocked in tests.
pub trait SynthesisClient: Send + Sync {
    /// Issue one synthesis call and return the complete MP3 byte buffer.
    fn synthesize<'a>(
        &'a self,
        req: &'a SpeechRequest,
    ) -> BoxFuture<'a, Result<Vec<u8>, SynthesisError>>;
}

/// Production client for the OpenAI `/v1/audio/speech` endpoint.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiSpeech {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different API root (used by tests to target a
    /// local mock server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for OpenAiSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisClient for OpenAiSpeech {
    fn synthesize<'a>(
        &'a self,
        req: &'a SpeechRequest,
    ) -> BoxFuture<'a, Result<Vec<u8>, SynthesisError>> {
        async move {
            let url = format!("{}/v1/audio/speech", self.base_url);
            let body = serde_json::json!({
                "model": req.model,
                "voice": req.voice,
                "input": req.text,
                "response_format": "mp3",
            });

            debug!(
                "synth: POST {} chars, model={}, voice={}",
                req.text.len(),
                req.model,
                req.voice
            );

            let resp = self
                .client
                .post(&url)
                .bearer_auth(&req.api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| SynthesisError(format!("request failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(SynthesisError(provider_message(status, &text)));
            }

            let bytes = resp
                .bytes()
                .await
                .map_err(|e| SynthesisError(format!("response read failed: {e}")))?;

            Ok(bytes.to_vec())
        }
        .boxed()
    }
}

/// Prefer the provider's own error message when the body is the usual
/// `{"error": {"message": ...}}` JSON; fall back to the raw body.
fn provider_message(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    format!("{status}: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SpeechRequest {
        SpeechRequest {
            api_key: "sk-test".into(),
            model: "gpt-4o-mini-tts".into(),
            voice: "alloy".into(),
            text: "Hello there".into(),
        }
    }

    #[tokio::test]
    async fn returns_audio_bytes_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini-tts",
                "voice": "alloy",
                "input": "Hello there",
                "response_format": "mp3",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fakeaudio".to_vec()))
            .mount(&server)
            .await;

        let client = OpenAiSpeech::with_base_url(server.uri());
        let bytes = client.synthesize(&request()).await.unwrap();
        assert_eq!(bytes, b"ID3fakeaudio");
    }

    #[tokio::test]
    async fn surfaces_provider_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": { "message": "Incorrect API key provided" }
            })))
            .mount(&server)
            .await;

        let client = OpenAiSpeech::with_base_url(server.uri());
        let err = client.synthesize(&request()).await.unwrap_err();
        assert!(err.0.contains("Incorrect API key provided"), "got: {}", err.0);
        assert!(err.0.contains("401"), "got: {}", err.0);
    }

    #[tokio::test]
    async fn falls_back_to_raw_body_on_non_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/audio/speech"))
            .respond_with(ResponseTemplate::new(503).set_body_string("service unavailable"))
            .mount(&server)
            .await;

        let client = OpenAiSpeech::with_base_url(server.uri());
        let err = client.synthesize(&request()).await.unwrap_err();
        assert!(err.0.contains("service unavailable"), "got: {}", err.0);
    }

    #[tokio::test]
    async fn connection_failure_is_a_synthesis_error() {
        // Nothing listens on this port.
        let client = OpenAiSpeech::with_base_url("http://127.0.0.1:9");
        let err = client.synthesize(&request()).await.unwrap_err();
        assert!(err.0.contains("request failed"), "got: {}", err.0);
    }
}
