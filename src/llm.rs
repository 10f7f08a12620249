use crate::config::Config;
use crate::error::LlmError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Something that turns a prompt into reply text.
///
/// `Ok(None)` means the service answered but the reply held no usable text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError>;
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub contents: Vec<GeminiContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The part of a `generateContent` reply we read. Every level is optional so
/// that a well-formed payload without text is an empty reply, not an error.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

impl GenerateRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

impl GenerateResponse {
    /// `candidates[0].content.parts[0].text`, trimmed, if non-blank
    pub fn reply_text(&self) -> Option<String> {
        let text = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()?
            .trim();
        if text.is_empty() { None } else { Some(text.to_string()) }
    }
}

/// Gemini client for one-shot generation
#[derive(Clone)]
pub struct GeminiClient {
    config: Config,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, LlmError> {
        let url = self.config.endpoint_url().ok_or(LlmError::MissingApiKey)?;
        let payload = GenerateRequest::from_prompt(prompt);

        tracing::debug!(model = %self.config.gemini_model, prompt_chars = prompt.chars().count(), "sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(LlmError::status(status.as_u16(), body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        Ok(parsed.reply_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answer exactly one HTTP request with `status` and `body`; the handle
    /// yields the raw request that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_lowercase();
                    let length = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}/v1beta"), handle)
    }

    fn client_for(url: String) -> GeminiClient {
        let config = Config {
            gemini_api_key: Some("test-key".to_string()),
            gemini_api_url: url,
            ..Config::default()
        };
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn request_body_has_single_content_with_single_text_part() {
        let body = serde_json::to_value(GenerateRequest::from_prompt("hello")).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "hello"}]}]}));
    }

    #[test]
    fn reply_text_reads_first_candidate_first_part() {
        let reply: GenerateResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "  Egg: 70 kcal \n"}, {"text": "ignored"}], "role": "model"}},
                {"content": {"parts": [{"text": "second candidate"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 12}
        }))
        .unwrap();
        assert_eq!(reply.reply_text().as_deref(), Some("Egg: 70 kcal"));
    }

    #[test]
    fn missing_path_is_empty_reply() {
        let cases = [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"candidates": [{"content": {"parts": []}}]}),
            json!({"candidates": [{"content": {"parts": [{"text": "   "}]}}]}),
            json!({"error": {"code": 400, "message": "bad"}}),
        ];
        for case in cases {
            let reply: GenerateResponse = serde_json::from_value(case.clone()).unwrap();
            assert_eq!(reply.reply_text(), None, "case: {case}");
        }
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_any_request() {
        let config = Config {
            gemini_api_key: None,
            ..Config::default()
        };
        let client = GeminiClient::new(config).unwrap();
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[tokio::test]
    async fn successful_reply_is_posted_and_trimmed() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"candidates":[{"content":{"parts":[{"text":"  hi \n"}]}}]}"#,
        )
        .await;

        let reply = client_for(url).generate("say hi").await.unwrap();
        assert_eq!(reply.as_deref(), Some("hi"));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1beta/models/gemini-2.0-flash:generateContent?key=test-key "));
        assert!(request.contains(r#"{"contents":[{"parts":[{"text":"say hi"}]}]}"#));
    }

    #[tokio::test]
    async fn non_success_status_is_reported_with_body() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;

        let err = client_for(url).generate("x").await.unwrap_err();
        match err {
            LlmError::Status { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_decode_error() {
        let (url, server) = serve_once("200 OK", "<html>maintenance</html>").await;

        let err = client_for(url).generate("x").await.unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)), "got {err:?}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn success_without_text_is_an_empty_reply() {
        let (url, server) = serve_once("200 OK", r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).await;

        assert_eq!(client_for(url).generate("x").await.unwrap(), None);
        server.await.unwrap();
    }
}
