// OpenAI-compatible chat completions client
use crate::application::critique_model::{CompletionRequest, CritiqueModel};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

impl OpenAiClient {
    pub fn new(base_url: String, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_payload<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: &request.prompt,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: request.image.data_uri(),
                        },
                    },
                ],
            }],
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl CritiqueModel for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<serde_json::Value> {
        let payload = self.build_payload(&request);

        tracing::debug!(
            model = %self.model,
            max_tokens = request.max_tokens,
            image = %request.image.redacted(),
            "Calling critique model with prompt:\n{}",
            request.prompt
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to critique model")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Critique model request failed with status {}: {}", status, body);
        }

        let body = response
            .json::<serde_json::Value>()
            .await
            .context("Failed to parse critique model response")?;

        tracing::debug!("Received critique model response: {}", body);

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart_image::ChartImage;
    use serde_json::json;

    fn client() -> OpenAiClient {
        OpenAiClient::new(
            "https://api.example.com/v1/".to_string(),
            "sk-test".to_string(),
            "gpt-4o".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        assert_eq!(client().completions_url(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn test_payload_shape() {
        let client = client();
        let request = CompletionRequest {
            prompt: "Review this chart".to_string(),
            image: ChartImage::parse("/9j/4AAQSkZJRgABAQAAAQABAAD", "image/png").unwrap(),
            max_tokens: 500,
        };

        let payload = serde_json::to_value(client.build_payload(&request)).unwrap();
        assert_eq!(
            payload,
            json!({
                "model": "gpt-4o",
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": "Review this chart"},
                        {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQAAAQABAAD"}}
                    ]
                }],
                "max_tokens": 500
            })
        );
    }
}
