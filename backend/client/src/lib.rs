//! # Client
//!
//! Command line stand-in for the browser pages.
//!
//! Same flows and same messages as the pages: the symptom is trimmed and refused
//! when empty, a login keeps its token in a local file, and every failure is
//! reported with one generic line.
use std::{fs, path::Path};

use anyhow::{Error, Result, bail};
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";
pub const EMPTY_SYMPTOM: &str = "Please enter symptoms!";
pub const GENERIC_FAILURE: &str = "Something went wrong. Try again later.";

#[derive(Deserialize)]
pub struct ChatReply {
    pub response: String,
}

#[derive(Deserialize)]
pub struct LoginReply {
    pub token: String,
    pub user: UserReply,
}

#[derive(Deserialize)]
pub struct UserReply {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Default, Deserialize)]
struct MessageReply {
    #[serde(default)]
    message: Option<String>,
}

/// Trimmed symptom, or `None` when nothing is left to send.
pub fn prepare_symptom(input: &str) -> Option<&str> {
    Some(input.trim()).filter(|s| !s.is_empty())
}

pub struct Api {
    client: Client,
    base_url: String,
}

impl Api {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn post(&self, path: &str, body: serde_json::Value) -> Result<Response> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;

        tracing::debug!("POST {path} -> {}", res.status());

        Ok(res)
    }

    pub async fn chat(&self, symptom: &str) -> Result<String> {
        let Some(symptom) = prepare_symptom(symptom) else {
            bail!(EMPTY_SYMPTOM);
        };

        let res = self.post("/api/chat", json!({ "symptom": symptom })).await?;
        if !res.status().is_success() {
            bail!(GENERIC_FAILURE);
        }

        let reply: ChatReply = res.json().await?;
        Ok(reply.response)
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let res = self
            .post(
                "/api/auth/signup",
                json!({ "name": name, "email": email, "password": password }),
            )
            .await?;

        let ok = res.status().is_success();
        let reply: MessageReply = res.json().await.unwrap_or_default();

        match (ok, reply.message) {
            (true, message) => Ok(message.unwrap_or_else(|| "Signed up".to_string())),
            (false, Some(message)) => Err(Error::msg(message)),
            (false, None) => bail!(GENERIC_FAILURE),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginReply> {
        let res = self
            .post(
                "/api/auth/login",
                json!({ "email": email, "password": password }),
            )
            .await?;

        if !res.status().is_success() {
            let reply: MessageReply = res.json().await.unwrap_or_default();
            bail!(
                reply
                    .message
                    .unwrap_or_else(|| "Invalid login credentials!".to_string())
            );
        }

        Ok(res.json().await?)
    }
}

pub fn save_token(path: &Path, token: &str) -> Result<()> {
    fs::write(path, token)?;

    Ok(())
}
