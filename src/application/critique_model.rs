// Model trait for the external multimodal critique endpoint
use crate::domain::chart_image::ChartImage;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub image: ChartImage,
    pub max_tokens: u32,
}

#[async_trait]
pub trait CritiqueModel: Send + Sync {
    /// Send one text + image completion request and return the raw response body
    async fn complete(&self, request: CompletionRequest) -> anyhow::Result<serde_json::Value>;
}
