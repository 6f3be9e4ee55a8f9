//! # Gemini
//!
//! Text generation collaborator.
//!
//! Calls the `generateContent` REST endpoint with a single user prompt. The server
//! never streams and never retries; a failed call is reported as is.
//!
//! No timeout is set on the client, a hung upstream keeps its request waiting.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::config::Config;

pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, GeneratorError>;
}

#[derive(Serialize)]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
pub struct Content<'a> {
    pub parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
pub struct RequestPart<'a> {
    pub text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

/// Every level is optional, a response missing any of it simply has no text.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

impl GenerateContentResponse {
    pub fn from_text(text: &str) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(CandidateContent {
                    parts: vec![ResponsePart {
                        text: Some(text.to_string()),
                    }],
                }),
            }],
        }
    }

    /// `candidates[0].content.parts[0].text`, if present and non-empty.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }
}

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!(
                "{}/models/{model}:generateContent",
                base_url.trim_end_matches('/')
            ),
            api_key: api_key.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.gemini_url, &config.gemini_model, &config.gemini_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, GeneratorError> {
        let res = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        #[cfg(feature = "verbose")]
        tracing::info!("Gemini status: {}", res.status());

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_else(|e| {
                warn!("Failed to read Gemini error body: {e}");
                String::new()
            });
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(res.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_text() {
        let response = parse(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "A cold is a viral infection."}], "role": "model"}},
                    {"content": {"parts": [{"text": "second"}]}}
                ],
                "usageMetadata": {"totalTokenCount": 12}
            }"#,
        );

        assert_eq!(response.first_text(), Some("A cold is a viral infection."));
    }

    #[test]
    fn test_missing_structure() {
        assert_eq!(parse("{}").first_text(), None);
        assert_eq!(parse(r#"{"candidates": []}"#).first_text(), None);
        assert_eq!(parse(r#"{"candidates": [{}]}"#).first_text(), None);
        assert_eq!(
            parse(r#"{"candidates": [{"content": {"parts": []}}]}"#).first_text(),
            None
        );
        assert_eq!(
            parse(r#"{"candidates": [{"content": {"parts": [{"text": ""}]}}]}"#).first_text(),
            None
        );
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt("hello")).unwrap();

        assert_eq!(
            body,
            serde_json::json!({ "contents": [{ "parts": [{ "text": "hello" }] }] })
        );
    }

    /// Serves one canned HTTP response after reading the whole request.
    async fn serve_once(response: &'static str) -> String {
        use tokio::{
            io::{AsyncReadExt, AsyncWriteExt},
            net::TcpListener,
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];

            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&request).to_lowercase();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{address}")
    }

    #[tokio::test]
    async fn test_error_status_keeps_body() {
        let base = serve_once(
            "HTTP/1.1 429 Too Many Requests\r\nContent-Length: 5\r\nConnection: close\r\n\r\nquota",
        )
        .await;
        let client = GeminiClient::new(&base, "gemini-1.5-pro", "key");

        let err = client.generate("fever").await.unwrap_err();

        assert!(matches!(
            err,
            GeneratorError::Status { status: 429, ref body } if body == "quota"
        ));
    }

    #[tokio::test]
    async fn test_truncated_error_body() {
        // promises 100 bytes, sends 7, then closes
        let base = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial",
        )
        .await;
        let client = GeminiClient::new(&base, "gemini-1.5-pro", "key");

        let err = client.generate("fever").await.unwrap_err();

        assert!(matches!(
            err,
            GeneratorError::Status { status: 500, ref body } if body.is_empty()
        ));
    }

    #[tokio::test]
    async fn test_success_body_parsed() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 54\r\nConnection: close\r\n\r\n{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"hi\"}]}}]}",
        )
        .await;
        let client = GeminiClient::new(&base, "gemini-1.5-pro", "key");

        let response = client.generate("fever").await.unwrap();

        assert_eq!(response.first_text(), Some("hi"));
    }

    #[test]
    fn test_endpoint() {
        let client = GeminiClient::new("https://example.com/v1beta/", "gemini-1.5-pro", "key");

        assert_eq!(
            client.endpoint(),
            "https://example.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }
}
