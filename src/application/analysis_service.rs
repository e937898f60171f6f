// Analysis service - Top-level use case: check, compose, request critique
use crate::application::critique_service::CritiqueService;
use crate::application::initial_checks::InitialChecker;
use crate::application::prompt_composer::{compose_prompt, PromptInputs};
use crate::domain::analysis::{AnalysisRequest, AnalysisSubmission};
use crate::domain::chart_image::ChartImage;
use crate::domain::table::DataTable;
use serde_json::Value;

pub const NO_IMAGE_MESSAGE: &str = "No chart image provided. Unable to provide analysis.";
pub const APOLOGY_MESSAGE: &str = "Could not provide additional feedback at this time.";

#[derive(Clone)]
pub struct AnalysisService {
    checker: InitialChecker,
    critique_service: CritiqueService,
    default_media_type: String,
}

impl AnalysisService {
    pub fn new(
        checker: InitialChecker,
        critique_service: CritiqueService,
        default_media_type: String,
    ) -> Self {
        Self {
            checker,
            critique_service,
            default_media_type,
        }
    }

    /// Analyze one submission. Always returns text; the work runs on its own
    /// task so that a panic anywhere in the chain still yields the apology.
    pub async fn analyze(&self, submission: AnalysisSubmission) -> String {
        let service = self.clone();
        match tokio::spawn(async move { service.run(submission).await }).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Analysis task failed: {}", e);
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    async fn run(&self, submission: AnalysisSubmission) -> String {
        let Some(request) = self.build_request(submission) else {
            tracing::info!("Rejecting analysis without a chart image");
            return NO_IMAGE_MESSAGE.to_string();
        };

        let checks = self
            .checker
            .run(request.chart_data.as_ref(), request.full_data.as_ref());

        let prompt = compose_prompt(PromptInputs {
            checks: &checks,
            chart_data: request.chart_data.as_ref(),
            full_data: request.full_data.as_ref(),
            hint: request.hint.as_deref(),
        });

        tracing::info!(
            chart_rows = request.chart_data.as_ref().map(DataTable::len).unwrap_or(0),
            full_rows = request.full_data.as_ref().map(DataTable::len).unwrap_or(0),
            has_hint = request.hint.is_some(),
            "Requesting critique"
        );

        self.critique_service
            .request_critique(prompt, request.chart_image)
            .await
    }

    /// Returns `None` when the mandatory chart image is missing. Malformed
    /// tables are dropped individually.
    fn build_request(&self, submission: AnalysisSubmission) -> Option<AnalysisRequest> {
        let chart_image = submission
            .chart_base64
            .as_deref()
            .and_then(|raw| ChartImage::parse(raw, &self.default_media_type))?;

        Some(AnalysisRequest {
            chart_image,
            chart_data: build_table("chart", submission.chart_data.as_ref()),
            full_data: build_table("full", submission.full_data.as_ref()),
            hint: submission
                .additional_info
                .map(|hint| hint.trim().to_string())
                .filter(|hint| !hint.is_empty()),
        })
    }
}

fn build_table(name: &str, raw: Option<&Value>) -> Option<DataTable> {
    match DataTable::from_json(raw?) {
        Ok(table) if table.is_empty() => None,
        Ok(table) => Some(table),
        Err(e) => {
            tracing::warn!("Ignoring malformed {} data: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::critique_model::{CompletionRequest, CritiqueModel};
    use crate::application::critique_service::tests::FakeModel;
    use crate::application::initial_checks::SeriesColumns;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAAB";

    struct PanickingModel;

    #[async_trait]
    impl CritiqueModel for PanickingModel {
        async fn complete(&self, _request: CompletionRequest) -> anyhow::Result<Value> {
            panic!("model client crashed");
        }
    }

    fn service(model: Arc<dyn CritiqueModel>) -> AnalysisService {
        let checker = InitialChecker::new(SeriesColumns {
            value: "Value".to_string(),
            label: None,
        });
        AnalysisService::new(
            checker,
            CritiqueService::new(model, 500),
            "image/jpeg".to_string(),
        )
    }

    fn sample_full() -> Value {
        json!({
            "Date": {"0": "2020-01-01", "1": "2020-01-02", "2": "2020-01-03", "3": "2020-01-04",
                     "4": "2020-01-05", "5": "2020-01-06", "6": "2020-01-07", "7": "2020-01-08",
                     "8": "2020-01-09", "9": "2020-01-10", "10": "2020-01-11", "11": "2020-01-12"},
            "Value": {"0": 10, "1": 9, "2": 8, "3": 7, "4": 6, "5": 5,
                      "6": 5, "7": 6, "8": 7, "9": 8, "10": 9, "11": 10}
        })
    }

    fn sample_chart() -> Value {
        json!({
            "Date": {"0": "2020-01-07", "1": "2020-01-08", "2": "2020-01-09",
                     "3": "2020-01-10", "4": "2020-01-11", "5": "2020-01-12"},
            "Value": {"0": "5", "1": "6", "2": "7", "3": "8", "4": "9", "5": "10"}
        })
    }

    fn sent_prompt(model: &FakeModel) -> String {
        model.requests.lock().unwrap()[0].prompt.clone()
    }

    #[tokio::test]
    async fn test_missing_image_short_circuits() {
        let model = Arc::new(FakeModel::answering("unused"));
        let service = service(model.clone());

        for chart_base64 in [None, Some(String::new()), Some("  ".to_string())] {
            let answer = service
                .analyze(AnalysisSubmission {
                    chart_base64,
                    chart_data: Some(sample_chart()),
                    ..Default::default()
                })
                .await;
            assert_eq!(answer, NO_IMAGE_MESSAGE);
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_full_flow_reports_both_warnings() {
        let model = Arc::new(FakeModel::answering("Ethical considerations ..."));
        let service = service(model.clone());

        let answer = service
            .analyze(AnalysisSubmission {
                chart_base64: Some(PNG_B64.to_string()),
                chart_data: Some(sample_chart()),
                full_data: Some(sample_full()),
                additional_info: Some("Daily sign-ups".to_string()),
            })
            .await;
        assert_eq!(answer, "Ethical considerations ...");

        let prompt = sent_prompt(&model);
        assert!(prompt.contains("Axis Check: Warning: The axis may be truncated"));
        assert!(prompt.contains("Cherry Picking Check: Warning: The chart data may be cherry-picked, as the overall trend differs"));
        assert!(prompt.contains(r#"{"Date":"2020-01-07","Value":"5"}"#));
        assert!(prompt.ends_with("Additional information from the requester:\nDaily sign-ups"));
    }

    #[tokio::test]
    async fn test_image_only_skips_analysis_block() {
        let model = Arc::new(FakeModel::answering("general advice"));
        let service = service(model.clone());

        let answer = service
            .analyze(AnalysisSubmission {
                chart_base64: Some(PNG_B64.to_string()),
                chart_data: Some(json!({})),
                full_data: Some(sample_full()),
                additional_info: Some("   ".to_string()),
            })
            .await;
        assert_eq!(answer, "general advice");

        let prompt = sent_prompt(&model);
        assert!(!prompt.contains("Initial analysis results"));
        assert!(!prompt.contains("Additional information"));
        assert!(prompt.contains("Full dataset"));
    }

    #[tokio::test]
    async fn test_malformed_table_does_not_block_the_other() {
        let model = Arc::new(FakeModel::answering("ok"));
        let service = service(model.clone());

        let answer = service
            .analyze(AnalysisSubmission {
                chart_base64: Some(PNG_B64.to_string()),
                chart_data: Some(json!({"Value": [0, 4, 8]})),
                full_data: Some(json!("not a table")),
                additional_info: None,
            })
            .await;
        assert_eq!(answer, "ok");

        let prompt = sent_prompt(&model);
        assert!(prompt.contains("Axis Check: Axes appear properly scaled."));
        assert!(!prompt.contains("Cherry Picking Check"));
    }

    #[tokio::test]
    async fn test_model_failure_returns_fallback_text() {
        let model = Arc::new(FakeModel::replying(json!({"unexpected": true})));
        let service = service(model);

        let answer = service
            .analyze(AnalysisSubmission {
                chart_base64: Some(PNG_B64.to_string()),
                ..Default::default()
            })
            .await;
        assert!(answer.contains("No additional feedback"));
    }

    #[tokio::test]
    async fn test_unexpected_failure_returns_apology() {
        let service = service(Arc::new(PanickingModel));

        let answer = service
            .analyze(AnalysisSubmission {
                chart_base64: Some(PNG_B64.to_string()),
                chart_data: Some(sample_chart()),
                full_data: Some(sample_full()),
                additional_info: None,
            })
            .await;
        assert_eq!(answer, APOLOGY_MESSAGE);
    }
}
