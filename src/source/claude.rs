//! Client for the Anthropic Messages API, the service that writes the report.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::error::{DashboardError, Result};

const SERVICE: &str = "report service";
const API_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
}

const WEB_SEARCH: Tool = Tool {
    kind: "web_search_20250305",
    name: "web_search",
};

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

pub struct ClaudeClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeClient {
    pub fn new(settings: &Settings, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DashboardError::upstream(SERVICE, e))?;
        Ok(ClaudeClient {
            client,
            api_url: settings.anthropic_api_url.clone(),
            api_key: api_key.into(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
        })
    }

    /// Send one prompt and return the report text. With `web_search` the
    /// service may browse, and its answer arrives split across text blocks.
    pub async fn complete(&self, prompt: &str, web_search: bool) -> Result<String> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            tools: if web_search { vec![WEB_SEARCH] } else { Vec::new() },
        };
        info!(model = %self.model, prompt_chars = prompt.len(), web_search, "requesting report");

        let spinner = spinner("Waiting for the risk report...");
        let result = self.send(&request).await;
        spinner.finish_and_clear();

        let text = response_text(result?);
        info!(chars = text.len(), "received report");
        Ok(text)
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<MessagesResponse> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(request)
            .send()
            .await
            .map_err(|e| DashboardError::upstream(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::upstream(
                SERVICE,
                format!("HTTP {status}: {body}"),
            ));
        }
        response
            .json()
            .await
            .map_err(|e| DashboardError::upstream(SERVICE, e))
    }
}

fn response_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect()
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_blocks_concatenated_tool_blocks_skipped() {
        let raw = r#"{
            "content": [
                {"type": "text", "text": "Overall Release Risk Level: LOW\n"},
                {"type": "server_tool_use", "id": "x", "name": "web_search", "input": {}},
                {"type": "web_search_tool_result", "tool_use_id": "x", "content": []},
                {"type": "text", "text": "• Small release"}
            ]
        }"#;
        let response: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response_text(response), "Overall Release Risk Level: LOW\n• Small release");
    }

    #[test]
    fn tools_omitted_without_web_search() {
        let request = MessagesRequest {
            model: "m",
            max_tokens: 10,
            messages: vec![Message { role: "user", content: "hi" }],
            tools: Vec::new(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("tools").is_none());

        let request = MessagesRequest {
            tools: vec![WEB_SEARCH],
            ..request
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tools"][0]["type"], "web_search_20250305");
        assert_eq!(json["messages"][0]["content"], "hi");
    }
}
