//! Wire types for the HTTP surface.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dialog::{Session, Stage, TurnResult, UiDirective};
use crate::generator::CustomEstimate;

/// One chat turn from the caller. An unrecognized `stage` string fails
/// deserialization outright and surfaces as a 4xx.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub stage: Stage,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub user_input: Option<String>,
}

/// The machine's reply: next stage, message, mutated session, optional UI
/// directive.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub next_stage: Stage,
    pub bot_message: String,
    pub session: Session,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui: Option<UiDirective>,
}

impl From<TurnResult> for ChatResponse {
    fn from(result: TurnResult) -> Self {
        Self {
            next_stage: result.next_stage,
            bot_message: result.message,
            session: result.session,
            ui: result.ui,
        }
    }
}

/// Trigger for background proposal generation.
#[derive(Debug, Clone, Deserialize)]
pub struct ProposalRequest {
    pub session: Session,
    pub category: String,
    #[serde(default)]
    pub custom_category_name: Option<String>,
    #[serde(default)]
    pub custom_category_data: Option<CustomEstimate>,
}

/// Immediate acknowledgment for an accepted background run.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedResponse {
    pub message: String,
    pub task_id: Uuid,
}

/// Acknowledgment for a stored resume upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_parses_with_defaults() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"stage": "get_name", "user_input": "Jane"}"#).unwrap();
        assert_eq!(request.stage, Stage::GetName);
        assert_eq!(request.session, Session::default());
        assert_eq!(request.user_input.as_deref(), Some("Jane"));
    }

    #[test]
    fn unknown_stage_is_a_hard_parse_error() {
        let result = serde_json::from_str::<ChatRequest>(r#"{"stage": "get_favorite_color"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn chat_response_omits_absent_ui() {
        let response = ChatResponse {
            next_stage: Stage::GetEmail,
            bot_message: "What is your email address?".into(),
            session: Session::default(),
            ui: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("ui").is_none());
        assert_eq!(json["next_stage"], "get_email");
    }

    #[test]
    fn proposal_request_accepts_custom_data() {
        let request: ProposalRequest = serde_json::from_value(serde_json::json!({
            "session": {"email": "jane@example.com"},
            "category": "Others",
            "custom_category_name": "Space Hotel Portal",
            "custom_category_data": {"category": "Space Hotel Portal", "avg_cost_inr": 500000}
        }))
        .unwrap();
        assert_eq!(
            request.custom_category_data.unwrap().category,
            "Space Hotel Portal"
        );
    }
}
