// Analysis request domain models
use crate::domain::chart_image::ChartImage;
use crate::domain::table::DataTable;
use serde_json::Value;

/// Untyped input exactly as received at the front door.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSubmission {
    pub chart_base64: Option<String>,
    pub chart_data: Option<Value>,
    pub full_data: Option<Value>,
    pub additional_info: Option<String>,
}

/// Typed request. Each table is `None` when absent, empty or malformed.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub chart_image: ChartImage,
    pub chart_data: Option<DataTable>,
    pub full_data: Option<DataTable>,
    pub hint: Option<String>,
}
