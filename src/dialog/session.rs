//! The caller-held conversation field bag.
//!
//! The session round-trips on every turn: the caller posts it, the machine
//! mutates it, the caller stores whatever comes back. There is no
//! server-side copy outside the background pipeline's lead upsert.

use serde::{Deserialize, Serialize};

use crate::dialog::Stage;

/// Description recorded when the user skips the optional-features prompt.
pub const NO_FEATURES: &str = "No additional features requested.";

/// Category recorded when the user described a service we don't list.
pub const CUSTOM_SERVICE: &str = "Custom Service";

/// Conversation fields captured so far, plus the back-navigation stack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage_history: Vec<Stage>,
}

impl Session {
    /// Record a visited stage for back-navigation. Sentinel stages are
    /// never recorded.
    pub fn record_visit(&mut self, stage: Stage) {
        if !stage.is_sentinel() {
            self.stage_history.push(stage);
        }
    }

    /// Pop the most recently visited stage, if any.
    pub fn pop_history(&mut self) -> Option<Stage> {
        self.stage_history.pop()
    }

    /// Drop the top history entry if it matches `stage`. Used when a
    /// handler bounces the user back to the stage it just left.
    pub fn unwind_to(&mut self, stage: Stage) {
        if self.stage_history.last() == Some(&stage) {
            self.stage_history.pop();
        }
    }

    /// Clear the whole service-selection path. The path is one owned field
    /// group: choosing a new main service invalidates everything below it.
    pub fn clear_service_path(&mut self) {
        self.sub_category = None;
        self.category = None;
        self.custom_category_name = None;
    }

    /// The project name shown to humans: the custom name when one was
    /// captured, otherwise the selected category.
    pub fn project_name(&self) -> Option<&str> {
        self.custom_category_name
            .as_deref()
            .or(self.category.as_deref())
    }

    /// The service path for the sales summary, e.g. "App Development >
    /// E-commerce".
    pub fn service_path(&self) -> String {
        let main = self.main_service.as_deref().unwrap_or("N/A");
        match self.sub_category.as_deref() {
            Some(sub) if sub != crate::catalog::DEFAULT_SUB_CATEGORY => {
                format!("{main} > {sub}")
            }
            _ => main.to_string(),
        }
    }
}
