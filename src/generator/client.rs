//! OpenAI-compatible chat-completions client for content generation.
//!
//! Structured calls (narrative, estimate) request `json_object` responses
//! and parse them strictly; anything malformed is a `GeneratorError` the
//! caller downgrades to its local fallback.

use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::json;

use crate::catalog::CatalogEntry;
use crate::error::GeneratorError;
use crate::generator::{ContentGenerator, CustomEstimate, GeneratorConfig, ProposalNarrative};

/// Max catalog examples fed into the few-shot estimate prompt.
const MAX_ESTIMATE_EXAMPLES: usize = 3;

/// Content generator backed by an OpenAI-compatible HTTP API.
pub struct OpenAiCompatGenerator {
    http: reqwest::Client,
    config: GeneratorConfig,
}

impl OpenAiCompatGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// POST a chat completion and return the first choice's content.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        json_mode: bool,
    ) -> Result<String, GeneratorError> {
        let mut body = json!({
            "model": self.config.model,
            "temperature": temperature,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });
        if json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(GeneratorError::RequestFailed(format!(
                "HTTP {status}: {detail}"
            )));
        }

        let completion: Completion = response
            .json()
            .await
            .map_err(|e| GeneratorError::InvalidResponse(e.to_string()))?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GeneratorError::InvalidResponse("no choices returned".into()))
    }
}

#[derive(Debug, Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[async_trait::async_trait]
impl ContentGenerator for OpenAiCompatGenerator {
    async fn narrative(
        &self,
        entry: &CatalogEntry,
        display_name: &str,
    ) -> Result<ProposalNarrative, GeneratorError> {
        let overview = if entry.project_overview.is_empty() {
            "A custom digital solution."
        } else {
            &entry.project_overview
        };
        let modules = if entry.core_modules.is_empty() {
            "Core functionality as per client requirements."
        } else {
            &entry.core_modules
        };
        let user = format!(
            "Write proposal text for the project category \"{display_name}\".\n\
             Project overview: {overview}\n\
             Core modules: {modules}\n\n\
             Respond with a JSON object of the form\n\
             {{\"introduction\": \"...\", \"scope_of_work\": [{{\"title\": \"...\", \"description\": \"...\"}}]}}.\n\
             The introduction is one friendly, confident paragraph addressed to the \
             client. scope_of_work has one item per core module (or 3-4 plausible \
             modules if none are listed), each with a detailed description."
        );
        let raw = self
            .complete(
                "You are a professional business proposal writer. You respond only with \
                 the required JSON object.",
                &user,
                0.6,
                true,
            )
            .await?;
        let narrative: ProposalNarrative = serde_json::from_str(strip_code_fences(&raw))?;
        if narrative.introduction.trim().is_empty() {
            return Err(GeneratorError::InvalidResponse(
                "empty introduction".into(),
            ));
        }
        Ok(narrative)
    }

    async fn general_answer(&self, query: &str) -> Result<String, GeneratorError> {
        let user = format!(
            "--- Company Information Context ---\n{}\n--- End of Context ---\n\n\
             User's question: \"{query}\"\n\n\
             Answer based only on the context above. Be professional, helpful and \
             direct. If the question is vague, ask for clarification. If the answer \
             is not in the context, say you don't have that information but can \
             connect the user with the team.",
            self.config.company_context
        );
        let answer = self
            .complete(
                "You are a professional assistant answering questions about the company \
                 using only the provided text.",
                &user,
                0.2,
                false,
            )
            .await?;
        let trimmed = answer.trim();
        if trimmed.is_empty() {
            return Err(GeneratorError::InvalidResponse("empty answer".into()));
        }
        Ok(trimmed.to_string())
    }

    async fn estimate_custom(
        &self,
        service_name: &str,
        main_service: &str,
        examples: &[&CatalogEntry],
    ) -> Result<CustomEstimate, GeneratorError> {
        let mut example_text = String::new();
        for entry in examples.iter().take(MAX_ESTIMATE_EXAMPLES) {
            example_text.push_str(&format!(
                "- Service '{}' costs around INR {}.\n",
                entry.category, entry.avg_cost_inr
            ));
        }
        let user = format!(
            "Main service category: \"{main_service}\"\n\
             Existing services and costs:\n{example_text}\n\
             New custom project request: \"{service_name}\"\n\n\
             Estimate realistic, non-zero INR costs for each development phase of the \
             request, relative to the examples. avg_cost_inr MUST be the sum of all \
             components except optional_addons_cost_inr. Respond with only a JSON \
             object of the form\n\
             {{\"category\": \"{service_name}\", \"project_overview\": \"...\", \
             \"core_modules\": \"...\", \"ui_ux_cost_inr\": 0, \"frontend_cost_inr\": 0, \
             \"backend_cost_inr\": 0, \"qa_cost_inr\": 0, \"pm_cost_inr\": 0, \
             \"optional_addons_cost_inr\": 0, \"avg_cost_inr\": 0}}\n\
             with integer costs."
        );
        let raw = self
            .complete(
                "You are an expert software project cost estimator. You always produce \
                 an estimate and respond only with the required JSON object.",
                &user,
                0.5,
                true,
            )
            .await?;
        let estimate: CustomEstimate = serde_json::from_str(strip_code_fences(&raw))?;
        if estimate.core_modules.trim().is_empty() && estimate.avg_cost_inr.is_zero() {
            return Err(GeneratorError::InvalidResponse(
                "estimate missing modules and costs".into(),
            ));
        }
        Ok(estimate)
    }
}

/// Tolerate models that wrap JSON in markdown fences despite instructions.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
