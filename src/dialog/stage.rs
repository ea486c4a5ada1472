//! Conversation stages — the closed state set of the dialog machine.

use serde::{Deserialize, Serialize};

/// A discrete step in the guided conversation.
///
/// The collection path runs `GetName → InitialChoice → GetEmail → GetPhone →
/// GetCompany → GetCompanySize → GetBudget → GetMainService →
/// (GetSubCategory) → GetSpecificService → (GetOtherServiceName) →
/// GetOptionalFeatures → ConfirmProposal → FinalGeneration`, with a
/// `JobApplication` side branch and `GeneralChat`/`Ended` as the free-form
/// tail. Serialized snake_case identifiers are the wire contract; an unknown
/// identifier fails deserialization, which callers surface as a hard error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    GetName,
    InitialChoice,
    GetEmail,
    GetPhone,
    GetCompany,
    GetCompanySize,
    GetBudget,
    GetMainService,
    GetSubCategory,
    GetSpecificService,
    GetOtherServiceName,
    GetOptionalFeatures,
    ConfirmProposal,
    FinalGeneration,
    GeneralChat,
    JobApplication,
    Ended,
}

impl Stage {
    /// Sentinel stages are never recorded in the back-navigation history:
    /// re-entering them by "go back" would either restart the conversation
    /// or loop into a free-form stage with no fields to restore.
    pub fn is_sentinel(&self) -> bool {
        matches!(
            self,
            Self::GetName
                | Self::GeneralChat
                | Self::FinalGeneration
                | Self::JobApplication
                | Self::Ended
        )
    }

    /// Free-form stages route through the catch-all answer handler instead
    /// of structured collection.
    pub fn is_free_form(&self) -> bool {
        matches!(
            self,
            Self::GeneralChat | Self::FinalGeneration | Self::JobApplication | Self::Ended
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::GetName => "get_name",
            Self::InitialChoice => "initial_choice",
            Self::GetEmail => "get_email",
            Self::GetPhone => "get_phone",
            Self::GetCompany => "get_company",
            Self::GetCompanySize => "get_company_size",
            Self::GetBudget => "get_budget",
            Self::GetMainService => "get_main_service",
            Self::GetSubCategory => "get_sub_category",
            Self::GetSpecificService => "get_specific_service",
            Self::GetOtherServiceName => "get_other_service_name",
            Self::GetOptionalFeatures => "get_optional_features",
            Self::ConfirmProposal => "confirm_proposal",
            Self::FinalGeneration => "final_generation",
            Self::GeneralChat => "general_chat",
            Self::JobApplication => "job_application",
            Self::Ended => "ended",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Stage; 17] = [
        Stage::GetName,
        Stage::InitialChoice,
        Stage::GetEmail,
        Stage::GetPhone,
        Stage::GetCompany,
        Stage::GetCompanySize,
        Stage::GetBudget,
        Stage::GetMainService,
        Stage::GetSubCategory,
        Stage::GetSpecificService,
        Stage::GetOtherServiceName,
        Stage::GetOptionalFeatures,
        Stage::ConfirmProposal,
        Stage::FinalGeneration,
        Stage::GeneralChat,
        Stage::JobApplication,
        Stage::Ended,
    ];

    #[test]
    fn display_matches_serde() {
        for stage in ALL {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{stage}\""));
        }
    }

    #[test]
    fn unknown_stage_fails_deserialization() {
        assert!(serde_json::from_str::<Stage>("\"get_shoe_size\"").is_err());
    }

    #[test]
    fn sentinels_are_the_free_form_family_plus_the_root() {
        for stage in ALL {
            let expected = stage == Stage::GetName || stage.is_free_form();
            assert_eq!(stage.is_sentinel(), expected, "{stage}");
        }
    }
}
