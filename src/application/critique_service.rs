// Critique service - Requests the model's verdict with a displayable fallback
use crate::application::critique_model::{CompletionRequest, CritiqueModel};
use crate::domain::chart_image::ChartImage;
use serde_json::Value;
use std::sync::Arc;

const FALLBACK_PREFIX: &str = "No additional feedback could be generated";

#[derive(Clone)]
pub struct CritiqueService {
    model: Arc<dyn CritiqueModel>,
    max_tokens: u32,
}

impl CritiqueService {
    pub fn new(model: Arc<dyn CritiqueModel>, max_tokens: u32) -> Self {
        Self { model, max_tokens }
    }

    /// Always returns displayable text: the model's answer, or a fallback
    /// carrying the raw response and/or error for diagnosis.
    pub async fn request_critique(&self, prompt: String, image: ChartImage) -> String {
        let request = CompletionRequest {
            prompt,
            image,
            max_tokens: self.max_tokens,
        };

        let response = match self.model.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Critique request failed: {:#}", e);
                return format!("{}, error: {:#}", FALLBACK_PREFIX, e);
            }
        };

        match extract_content(&response) {
            Ok(content) => content.to_string(),
            Err(reason) => {
                tracing::error!("Unexpected critique response shape: {}", reason);
                format!("{}, response: {} error: {}", FALLBACK_PREFIX, response, reason)
            }
        }
    }
}

/// Read `choices[0].message.content`.
fn extract_content(response: &Value) -> Result<&str, &'static str> {
    let choices = response
        .get("choices")
        .ok_or("missing 'choices'")?
        .as_array()
        .ok_or("'choices' is not a list")?;

    choices
        .first()
        .ok_or("'choices' is empty")?
        .get("message")
        .ok_or("missing 'message'")?
        .get("content")
        .ok_or("missing 'content'")?
        .as_str()
        .ok_or("'content' is not text")
}
