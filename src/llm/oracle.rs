use async_trait::async_trait;
use log::warn;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::Result;
use crate::llm::client::{clean_json_output, GeminiClient};
use crate::llm::prompts;
use crate::oracle::{
    ClassificationOracle, DebtContext, DualOpinions, EquationFindings, ProjectionCoverage,
    ReportTier,
};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Gemini-backed classification oracle.
///
/// Every capability degrades to its Unknown/Indeterminate default when the
/// service is unreachable or returns an unparseable response: transport
/// problems become invalid-document verdicts downstream, never pipeline
/// crashes.
pub struct GeminiOracle {
    client: GeminiClient,
    model: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct TierResponse {
    tier: ReportTier,
}

impl GeminiOracle {
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn structured<T>(&self, system_prompt: &str, user_text: String) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let schema = serde_json::to_value(schemars::schema_for!(T))?;
        let raw = self
            .client
            .generate_content(&self.model, system_prompt, user_text, Some(schema))
            .await?;
        Ok(serde_json::from_str(&clean_json_output(&raw))?)
    }
}

#[async_trait]
impl ClassificationOracle for GeminiOracle {
    async fn classify_report_tier(&self, text: &str, debt: &DebtContext) -> ReportTier {
        let debt_note = match debt.max_debt_amount {
            Some(amount) => format!("Declared maximum debt: {amount:.2} UYU."),
            None => "No maximum debt declared.".to_string(),
        };
        let user_text = format!("{debt_note}\n\nREPORT TEXT:\n{text}");

        match self
            .structured::<TierResponse>(prompts::SYSTEM_PROMPT_REPORT_TIER, user_text)
            .await
        {
            Ok(response) => response.tier,
            Err(failure) => {
                warn!("report tier classification degraded to Indeterminate: {failure}");
                ReportTier::Indeterminate
            }
        }
    }

    async fn check_accounting_equation(&self, text: &str) -> EquationFindings {
        match self
            .structured::<EquationFindings>(
                prompts::SYSTEM_PROMPT_ACCOUNTING_EQUATION,
                format!("BALANCE TEXT:\n{text}"),
            )
            .await
        {
            Ok(findings) => findings,
            Err(failure) => {
                warn!("accounting equation extraction degraded to unknown: {failure}");
                EquationFindings::default()
            }
        }
    }

    async fn check_dual_opinions(&self, text: &str) -> DualOpinions {
        match self
            .structured::<DualOpinions>(
                prompts::SYSTEM_PROMPT_DUAL_OPINIONS,
                format!("DECLARATION TEXT:\n{text}"),
            )
            .await
        {
            Ok(opinions) => opinions,
            Err(failure) => {
                warn!("dual opinion detection degraded to unknown: {failure}");
                DualOpinions::default()
            }
        }
    }

    async fn check_projection_coverage(&self, text: &str) -> ProjectionCoverage {
        match self
            .structured::<ProjectionCoverage>(
                prompts::SYSTEM_PROMPT_PROJECTION_COVERAGE,
                format!("PROJECTION TEXT:\n{text}"),
            )
            .await
        {
            Ok(coverage) => coverage,
            Err(failure) => {
                warn!("projection coverage reading degraded to none: {failure}");
                ProjectionCoverage::default()
            }
        }
    }
}
