//! UI directives — tagged payloads telling the caller how to collect input.
//!
//! The machine only emits these; it never interprets them. The wire shape
//! is `{"type": "buttons", "display_style": "pills", "options": [...]}` and
//! friends, which the chat frontend renders directly.

use serde::{Deserialize, Serialize};

use crate::generator::CustomEstimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    Pills,
    Cards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    Phone,
}

/// How the caller should render the next input collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiDirective {
    Buttons {
        display_style: DisplayStyle,
        options: Vec<String>,
    },
    Dropdown {
        options: Vec<String>,
    },
    Form {
        form_type: FormType,
        options: Vec<String>,
    },
    FileUpload,
    /// Data the client must hold and post back on proposal generation.
    StoreData {
        data: CustomEstimate,
    },
}

impl UiDirective {
    pub fn pills<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Buttons {
            display_style: DisplayStyle::Pills,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn cards<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Buttons {
            display_style: DisplayStyle::Cards,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dropdown<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Dropdown {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn phone_form(countries: Vec<String>) -> Self {
        Self::Form {
            form_type: FormType::Phone,
            options: countries,
        }
    }

    /// The options offered, if this directive carries any.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::Buttons { options, .. } | Self::Dropdown { options } | Self::Form { options, .. } => {
                Some(options)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buttons_wire_shape() {
        let ui = UiDirective::pills(["Yes", "No"]);
        assert_eq!(
            serde_json::to_value(&ui).unwrap(),
            serde_json::json!({
                "type": "buttons",
                "display_style": "pills",
                "options": ["Yes", "No"],
            })
        );
    }

    #[test]
    fn phone_form_wire_shape() {
        let ui = UiDirective::phone_form(vec!["India".into(), "United States".into()]);
        assert_eq!(
            serde_json::to_value(&ui).unwrap(),
            serde_json::json!({
                "type": "form",
                "form_type": "phone",
                "options": ["India", "United States"],
            })
        );
    }

    #[test]
    fn file_upload_wire_shape() {
        assert_eq!(
            serde_json::to_value(UiDirective::FileUpload).unwrap(),
            serde_json::json!({"type": "file_upload"})
        );
    }

    #[test]
    fn store_data_round_trips() {
        let estimate: CustomEstimate = serde_json::from_value(serde_json::json!({
            "category": "Drone Dashboard",
            "avg_cost_inr": 400000
        }))
        .unwrap();
        let ui = UiDirective::StoreData {
            data: estimate.clone(),
        };
        let json = serde_json::to_string(&ui).unwrap();
        let parsed: UiDirective = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, UiDirective::StoreData { data: estimate });
    }
}
