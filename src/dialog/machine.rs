//! The dialog engine — maps (stage, session, input) to the next turn.
//!
//! Global interrupts (back, reset, help) are checked before stage dispatch
//! and never touch the history stack. Structured collection stages are pure
//! and in-memory; only the free-form answer mode and the custom-estimate
//! step call out to the content generator, and both degrade gracefully.

use std::sync::Arc;

use tracing::warn;

use crate::catalog::{Catalog, DEFAULT_SUB_CATEGORY};
use crate::currency::{CurrencyProfile, CurrencyTable};
use crate::dialog::session::{CUSTOM_SERVICE, NO_FEATURES};
use crate::dialog::{Session, Stage, UiDirective};
use crate::generator::ContentGenerator;
use crate::pricing::format_amount;
use crate::validation::{validate_email, validate_phone};

/// Reserved input sentinel for "go back". Chosen so no legitimate free-text
/// answer can collide with it.
pub const BACK_COMMAND: &str = "__GO_BACK__";

/// Phrase that restarts the conversation from scratch.
const RESET_PHRASE: &str = "new proposal";

/// Phrases that request a human contact; answered without changing stage.
const HELP_PHRASES: [&str; 2] = ["connect", "talk to"];

const EXPLORE_OPTION: &str = "Explore Products or Services";
const JOB_OPTION: &str = "Looking for a Job";
const OTHERS_OPTION: &str = "Others";
const CONFIRM_YES: &str = "Yes, Send Proposal";
const CONFIRM_NO: &str = "No, I Have Questions";

const SIZE_OPTIONS: [&str; 4] = ["0-10", "10-100", "100-500", "500+"];

/// Budget bands in INR, converted to the session's currency for display.
const BUDGET_BANDS_INR: [(i64, Option<i64>); 4] = [
    (100_000, Some(400_000)),
    (500_000, Some(800_000)),
    (800_000, Some(1_000_000)),
    (1_000_000, None),
];

/// Phrases asking where the proposal went.
const STATUS_PHRASES: [&str; 3] = ["where is my", "get the proposal", "send it"];

/// Farewell words, matched per token so "now" never reads as "no".
const FAREWELL_WORDS: [&str; 3] = ["no", "bye", "goodbye"];

const MIN_NAME_CHARS: usize = 2;

/// Presentation settings for the conversation.
#[derive(Debug, Clone)]
pub struct DialogConfig {
    pub company_name: String,
    pub support_email: String,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            company_name: "Clearpath Digital".to_string(),
            support_email: "sales@clearpathdigital.example".to_string(),
        }
    }
}

/// Result of one chat turn. Immutable once returned.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub next_stage: Stage,
    pub message: String,
    pub ui: Option<UiDirective>,
    pub session: Session,
}

fn turn(next_stage: Stage, message: impl Into<String>, ui: Option<UiDirective>, session: Session) -> TurnResult {
    TurnResult {
        next_stage,
        message: message.into(),
        ui,
        session,
    }
}

/// The conversational state machine.
pub struct DialogEngine {
    catalog: Arc<Catalog>,
    currencies: Arc<CurrencyTable>,
    generator: Arc<dyn ContentGenerator>,
    config: DialogConfig,
}

impl DialogEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        currencies: Arc<CurrencyTable>,
        generator: Arc<dyn ContentGenerator>,
        config: DialogConfig,
    ) -> Self {
        Self {
            catalog,
            currencies,
            generator,
            config,
        }
    }

    /// Process one chat turn.
    pub async fn handle_turn(
        &self,
        stage: Stage,
        session: Session,
        user_input: Option<&str>,
    ) -> TurnResult {
        let input = user_input.unwrap_or("").trim().to_string();
        let lower = input.to_lowercase();

        // Global interrupts, in priority order. None of these touch history.
        if input == BACK_COMMAND {
            return self.go_back(stage, session);
        }
        if lower.contains(RESET_PHRASE) {
            return self.reset();
        }
        if HELP_PHRASES.iter().any(|p| lower.contains(p)) {
            return turn(
                stage,
                format!(
                    "Of course. You can reach our team directly at **{}**.",
                    self.config.support_email
                ),
                None,
                session,
            );
        }

        match stage {
            Stage::GetName => self.on_name(session, &input),
            Stage::InitialChoice => self.on_initial_choice(session, &input),
            Stage::GetEmail => self.on_email(session, &input),
            Stage::GetPhone => self.on_phone(session, &input),
            Stage::GetCompany => self.on_company(session, &input),
            Stage::GetCompanySize => self.on_company_size(session, &input),
            Stage::GetBudget => self.on_budget(session, &input),
            Stage::GetMainService => self.on_main_service(session, &input),
            Stage::GetSubCategory => self.on_sub_category(session, &input),
            Stage::GetSpecificService => self.on_specific_service(session, &input),
            Stage::GetOtherServiceName => self.on_other_service_name(session, &input).await,
            Stage::GetOptionalFeatures => self.on_optional_features(session, &input),
            Stage::ConfirmProposal => self.on_confirm(session, &lower),
            Stage::FinalGeneration
            | Stage::GeneralChat
            | Stage::JobApplication
            | Stage::Ended => self.free_form(stage, session, &input, &lower).await,
        }
    }

    // ── Interrupts ──────────────────────────────────────────────────

    fn go_back(&self, stage: Stage, mut session: Session) -> TurnResult {
        match session.pop_history() {
            Some(previous) => self.reenter(previous, session),
            None => turn(stage, "I can't go back any further.", None, session),
        }
    }

    fn reset(&self) -> TurnResult {
        turn(
            Stage::GetName,
            format!(
                "Of course, let's start a new proposal. I'm the {} assistant. To \
                 begin, please tell me your full name.",
                self.config.company_name
            ),
            None,
            Session::default(),
        )
    }

    /// Re-enter a previously visited stage: discard the fields it owns and
    /// rebuild any option lists that depend on later-captured fields.
    fn reenter(&self, stage: Stage, mut session: Session) -> TurnResult {
        match stage {
            Stage::GetName => {
                session.name = None;
                turn(Stage::GetName, self.greeting(), None, session)
            }
            Stage::InitialChoice => {
                let name = session.name.clone().unwrap_or_else(|| "there".into());
                turn(
                    Stage::InitialChoice,
                    format!("Welcome, {name}! How can I help you today?"),
                    Some(UiDirective::pills([EXPLORE_OPTION, JOB_OPTION])),
                    session,
                )
            }
            Stage::GetEmail => {
                session.email = None;
                turn(Stage::GetEmail, "What is your email address?", None, session)
            }
            Stage::GetPhone => {
                session.phone = None;
                session.country = None;
                turn(
                    Stage::GetPhone,
                    "Please select your country and re-enter your phone number.",
                    Some(self.phone_form()),
                    session,
                )
            }
            Stage::GetCompany => {
                session.company = None;
                turn(
                    Stage::GetCompany,
                    "What is your company's name?",
                    None,
                    session,
                )
            }
            Stage::GetCompanySize => {
                session.company_size = None;
                turn(
                    Stage::GetCompanySize,
                    "What is the size of your company?",
                    Some(UiDirective::dropdown(SIZE_OPTIONS)),
                    session,
                )
            }
            Stage::GetBudget => {
                session.budget = None;
                match self.session_currency(&session) {
                    Some(profile) => {
                        let (message, ui) = self.budget_prompt(profile);
                        turn(Stage::GetBudget, message, Some(ui), session)
                    }
                    // Without a country there are no local budget options.
                    None => self.reenter(Stage::GetPhone, session),
                }
            }
            Stage::GetMainService => {
                session.main_service = None;
                session.clear_service_path();
                turn(
                    Stage::GetMainService,
                    "Which of our main services are you interested in?",
                    Some(UiDirective::cards(self.catalog.main_services())),
                    session,
                )
            }
            Stage::GetSubCategory => {
                session.sub_category = None;
                match session
                    .main_service
                    .clone()
                    .filter(|m| self.catalog.has_sub_categories(m))
                {
                    Some(main) => turn(
                        Stage::GetSubCategory,
                        "Please select the category that best fits your idea.",
                        Some(UiDirective::cards(self.catalog.sub_categories(&main))),
                        session,
                    ),
                    None => self.reenter(Stage::GetMainService, session),
                }
            }
            Stage::GetSpecificService => {
                session.category = None;
                session.custom_category_name = None;
                match session.main_service.clone() {
                    Some(main) => {
                        let scope = session
                            .sub_category
                            .clone()
                            .filter(|s| s != DEFAULT_SUB_CATEGORY)
                            .unwrap_or_else(|| main.clone());
                        let options = self.specific_options(&session);
                        turn(
                            Stage::GetSpecificService,
                            format!("Which specific type of {scope} are you looking for?"),
                            Some(UiDirective::pills(options)),
                            session,
                        )
                    }
                    None => self.reenter(Stage::GetMainService, session),
                }
            }
            Stage::GetOtherServiceName => {
                session.custom_category_name = None;
                turn(
                    Stage::GetOtherServiceName,
                    "Please briefly describe the application you need, and I'll prepare \
                     a custom estimate.",
                    None,
                    session,
                )
            }
            Stage::GetOptionalFeatures => {
                session.description = None;
                turn(
                    Stage::GetOptionalFeatures,
                    "Are there any specific features you'd like to add? (Optional, you \
                     can skip this.)",
                    None,
                    session,
                )
            }
            Stage::ConfirmProposal => self.confirm_summary(session),
            // Sentinels never enter the history; be forgiving anyway.
            _ => turn(stage, "How else can I help?", None, session),
        }
    }

    // ── Collection stages ───────────────────────────────────────────

    fn greeting(&self) -> String {
        format!(
            "Hello! I'm the {} assistant. To get started, please tell me your full name.",
            self.config.company_name
        )
    }

    fn on_name(&self, mut session: Session, input: &str) -> TurnResult {
        if input.chars().count() < MIN_NAME_CHARS {
            return turn(
                Stage::GetName,
                "That looks a bit short. Please tell me your full name.",
                None,
                session,
            );
        }
        session.name = Some(input.to_string());
        session.record_visit(Stage::GetName);
        turn(
            Stage::InitialChoice,
            format!("Welcome, {input}! How can I help you today?"),
            Some(UiDirective::pills([EXPLORE_OPTION, JOB_OPTION])),
            session,
        )
    }

    fn on_initial_choice(&self, mut session: Session, input: &str) -> TurnResult {
        match input {
            EXPLORE_OPTION => {
                session.record_visit(Stage::InitialChoice);
                turn(
                    Stage::GetEmail,
                    "Great! What is your email address?",
                    None,
                    session,
                )
            }
            JOB_OPTION => {
                session.record_visit(Stage::InitialChoice);
                turn(
                    Stage::JobApplication,
                    format!(
                        "You can reach our recruitment team at **{}**, or upload your \
                         CV below.",
                        self.config.support_email
                    ),
                    Some(UiDirective::FileUpload),
                    session,
                )
            }
            _ => turn(
                Stage::InitialChoice,
                "Please pick one of the options below.",
                Some(UiDirective::pills([EXPLORE_OPTION, JOB_OPTION])),
                session,
            ),
        }
    }

    fn on_email(&self, mut session: Session, input: &str) -> TurnResult {
        match validate_email(input) {
            Ok(email) => {
                session.email = Some(email);
                session.record_visit(Stage::GetEmail);
                turn(
                    Stage::GetPhone,
                    "Thank you. Please select your country and enter your phone number.",
                    Some(self.phone_form()),
                    session,
                )
            }
            Err(_) => turn(
                Stage::GetEmail,
                "That email doesn't look valid. Please try again.",
                None,
                session,
            ),
        }
    }

    fn on_phone(&self, mut session: Session, input: &str) -> TurnResult {
        match validate_phone(input, &self.currencies) {
            Ok(validated) => {
                session.phone = Some(validated.e164);
                session.country = Some(validated.country);
                session.record_visit(Stage::GetPhone);
                turn(
                    Stage::GetCompany,
                    "Perfect. What is your company's name?",
                    None,
                    session,
                )
            }
            Err(_) => turn(
                Stage::GetPhone,
                "That phone number doesn't look valid. Please try again.",
                Some(self.phone_form()),
                session,
            ),
        }
    }

    fn on_company(&self, mut session: Session, input: &str) -> TurnResult {
        if input.is_empty() {
            return turn(
                Stage::GetCompany,
                "What is your company's name?",
                None,
                session,
            );
        }
        session.company = Some(input.to_string());
        session.record_visit(Stage::GetCompany);
        turn(
            Stage::GetCompanySize,
            "Got it. What's the size of your company?",
            Some(UiDirective::dropdown(SIZE_OPTIONS)),
            session,
        )
    }

    fn on_company_size(&self, mut session: Session, input: &str) -> TurnResult {
        if !SIZE_OPTIONS.contains(&input) {
            return turn(
                Stage::GetCompanySize,
                "Please choose one of the size ranges below.",
                Some(UiDirective::dropdown(SIZE_OPTIONS)),
                session,
            );
        }
        session.company_size = Some(input.to_string());
        match self.session_currency(&session) {
            Some(profile) => {
                let code = profile.currency_code.clone();
                let (_, ui) = self.budget_prompt(profile);
                session.record_visit(Stage::GetCompanySize);
                turn(
                    Stage::GetBudget,
                    format!(
                        "Thank you. What's your approximate budget for this project in {code}?"
                    ),
                    Some(ui),
                    session,
                )
            }
            // No resolvable country means the budget options can't be
            // localized; collect the phone details again.
            None => self.reenter(Stage::GetPhone, session),
        }
    }

    fn on_budget(&self, mut session: Session, input: &str) -> TurnResult {
        if input.is_empty() {
            return match self.session_currency(&session) {
                Some(profile) => {
                    let (message, ui) = self.budget_prompt(profile);
                    turn(Stage::GetBudget, message, Some(ui), session)
                }
                None => self.reenter(Stage::GetPhone, session),
            };
        }
        session.budget = Some(input.to_string());
        session.record_visit(Stage::GetBudget);
        turn(
            Stage::GetMainService,
            "Understood. Which of our main services are you interested in?",
            Some(UiDirective::cards(self.catalog.main_services())),
            session,
        )
    }

    fn on_main_service(&self, mut session: Session, input: &str) -> TurnResult {
        if !self.catalog.main_services().iter().any(|s| s == input) {
            return turn(
                Stage::GetMainService,
                "Please pick one of our services below.",
                Some(UiDirective::cards(self.catalog.main_services())),
                session,
            );
        }
        session.main_service = Some(input.to_string());
        session.clear_service_path();
        session.record_visit(Stage::GetMainService);

        if self.catalog.has_sub_categories(input) {
            turn(
                Stage::GetSubCategory,
                "Great choice. Please select the category that best fits your idea.",
                Some(UiDirective::cards(self.catalog.sub_categories(input))),
                session,
            )
        } else {
            let options = self.specific_options(&session);
            turn(
                Stage::GetSpecificService,
                format!("Excellent. Which specific type of {input} do you need?"),
                Some(UiDirective::cards(options)),
                session,
            )
        }
    }

    fn on_sub_category(&self, mut session: Session, input: &str) -> TurnResult {
        let Some(main) = session.main_service.clone() else {
            return self.reenter(Stage::GetMainService, session);
        };
        if !self.catalog.sub_categories(&main).iter().any(|s| s == input) {
            return turn(
                Stage::GetSubCategory,
                "Please select one of the categories below.",
                Some(UiDirective::cards(self.catalog.sub_categories(&main))),
                session,
            );
        }
        session.sub_category = Some(input.to_string());
        session.record_visit(Stage::GetSubCategory);
        let options = self.specific_options(&session);
        turn(
            Stage::GetSpecificService,
            format!("Perfect. Which specific type of {input} are you looking for?"),
            Some(UiDirective::pills(options)),
            session,
        )
    }

    fn on_specific_service(&self, mut session: Session, input: &str) -> TurnResult {
        let Some(main) = session.main_service.clone() else {
            return self.reenter(Stage::GetMainService, session);
        };
        if input.is_empty() {
            let options = self.specific_options(&session);
            return turn(
                Stage::GetSpecificService,
                "Please pick a service, or choose Others for a custom request.",
                Some(UiDirective::pills(options)),
                session,
            );
        }
        let sub = session
            .sub_category
            .clone()
            .unwrap_or_else(|| DEFAULT_SUB_CATEGORY.to_string());
        let exists = self.catalog.lookup(&main, &sub, input).is_some();

        if input == OTHERS_OPTION || !exists {
            if input == OTHERS_OPTION {
                session.category = Some(OTHERS_OPTION.to_string());
            } else {
                session.category = Some(CUSTOM_SERVICE.to_string());
                session.custom_category_name = Some(input.to_string());
            }
            session.record_visit(Stage::GetSpecificService);
            turn(
                Stage::GetOtherServiceName,
                format!(
                    "I don't have a standard estimate for **{input}**. Please briefly \
                     describe the application you need, and I'll prepare a custom \
                     estimate."
                ),
                None,
                session,
            )
        } else {
            session.category = Some(input.to_string());
            session.record_visit(Stage::GetSpecificService);
            turn(
                Stage::GetOptionalFeatures,
                "Perfect. Are there any specific features you'd like to add? (Optional, you can skip this.)",
                None,
                session,
            )
        }
    }

    async fn on_other_service_name(&self, mut session: Session, input: &str) -> TurnResult {
        let Some(main) = session.main_service.clone() else {
            return self.reenter(Stage::GetMainService, session);
        };
        if session.custom_category_name.is_none() {
            if input.is_empty() {
                return turn(
                    Stage::GetOtherServiceName,
                    "Please give me a short description of the application you need.",
                    None,
                    session,
                );
            }
            session.custom_category_name = Some(input.to_string());
        }
        let name = session
            .custom_category_name
            .clone()
            .unwrap_or_else(|| input.to_string());

        let examples = self.catalog.entries_for_service(&main);
        match self.generator.estimate_custom(&name, &main, &examples).await {
            Ok(estimate) => {
                session.record_visit(Stage::GetOtherServiceName);
                turn(
                    Stage::GetOptionalFeatures,
                    "I've prepared a preliminary estimate. Are there any other specific \
                     features to add? (Optional, you can skip this.)",
                    Some(UiDirective::StoreData { data: estimate }),
                    session,
                )
            }
            Err(e) => {
                warn!(service = %name, error = %e, "Custom estimate failed");
                // Undo the custom attempt and offer the listed options again.
                session.unwind_to(Stage::GetSpecificService);
                session.category = None;
                session.custom_category_name = None;
                let options = self.specific_options(&session);
                turn(
                    Stage::GetSpecificService,
                    "I'm sorry, I couldn't prepare an estimate for that request. Please \
                     try rephrasing, or pick one of the options below.",
                    Some(UiDirective::pills(options)),
                    session,
                )
            }
        }
    }

    fn on_optional_features(&self, mut session: Session, input: &str) -> TurnResult {
        session.description = Some(if input.is_empty() {
            NO_FEATURES.to_string()
        } else {
            input.to_string()
        });
        session.record_visit(Stage::GetOptionalFeatures);
        self.confirm_summary(session)
    }

    fn on_confirm(&self, mut session: Session, lower: &str) -> TurnResult {
        if lower == CONFIRM_YES.to_lowercase() {
            session.record_visit(Stage::ConfirmProposal);
            turn(
                Stage::FinalGeneration,
                "Excellent. I'm generating your proposal now. It will arrive in your \
                 inbox shortly.",
                None,
                session,
            )
        } else {
            session.record_visit(Stage::ConfirmProposal);
            turn(
                Stage::GeneralChat,
                "No problem. How else can I help?",
                None,
                session,
            )
        }
    }

    // ── Free-form tail ──────────────────────────────────────────────

    async fn free_form(
        &self,
        stage: Stage,
        session: Session,
        input: &str,
        lower: &str,
    ) -> TurnResult {
        if stage == Stage::JobApplication && input.starts_with("Uploaded:") {
            return turn(
                Stage::GeneralChat,
                "Thank you for uploading your resume. Our recruitment team will review \
                 it and reach out if there's a suitable opening. Is there anything else \
                 I can help with?",
                None,
                session,
            );
        }
        if STATUS_PHRASES.iter().any(|p| lower.contains(p)) {
            return turn(
                Stage::GeneralChat,
                "Your proposal was sent to your email address. Please check your inbox \
                 and spam folder.",
                None,
                session,
            );
        }
        if is_farewell(lower) {
            return turn(
                Stage::Ended,
                "You're welcome! Have a great day.",
                None,
                session,
            );
        }
        if input.is_empty() {
            return turn(Stage::GeneralChat, "How can I help?", None, session);
        }
        match self.generator.general_answer(input).await {
            Ok(answer) => turn(Stage::GeneralChat, answer, None, session),
            Err(e) => {
                warn!(error = %e, "General answer failed");
                turn(
                    Stage::GeneralChat,
                    "I'm sorry, I'm having trouble reaching my knowledge base right \
                     now. Please try again in a moment.",
                    None,
                    session,
                )
            }
        }
    }

    // ── Prompt helpers ──────────────────────────────────────────────

    fn phone_form(&self) -> UiDirective {
        UiDirective::phone_form(self.currencies.country_names())
    }

    fn session_currency(&self, session: &Session) -> Option<CurrencyProfile> {
        session
            .country
            .as_deref()
            .and_then(|c| self.currencies.resolve(c))
            .cloned()
    }

    fn budget_prompt(&self, profile: CurrencyProfile) -> (String, UiDirective) {
        let options: Vec<String> = BUDGET_BANDS_INR
            .iter()
            .map(|(low, high)| {
                let low_local =
                    format_amount(rust_decimal::Decimal::from(*low) * profile.exchange_rate, &profile.currency_symbol);
                match high {
                    Some(high) => {
                        let high_local = format_amount(
                            rust_decimal::Decimal::from(*high) * profile.exchange_rate,
                            &profile.currency_symbol,
                        );
                        format!("{low_local} - {high_local}")
                    }
                    None => format!("{low_local}+"),
                }
            })
            .collect();
        (
            format!(
                "What is your approximate budget for this project in your local \
                 currency ({})?",
                profile.currency_code
            ),
            UiDirective::pills(options),
        )
    }

    fn specific_options(&self, session: &Session) -> Vec<String> {
        let Some(main) = session.main_service.as_deref() else {
            return vec![OTHERS_OPTION.to_string()];
        };
        let sub = session
            .sub_category
            .as_deref()
            .unwrap_or(DEFAULT_SUB_CATEGORY);
        let mut options = self.catalog.categories(main, sub);
        options.push(OTHERS_OPTION.to_string());
        options
    }

    fn confirm_summary(&self, session: Session) -> TurnResult {
        let project = session.project_name().unwrap_or("N/A").to_string();
        let additional = match session.description.as_deref() {
            Some(d) if d != NO_FEATURES => format!("\n- **Additional Details:** {d}"),
            _ => String::new(),
        };
        let message = format!(
            "Please confirm your details:\n\
             - **Email:** {}\n\
             - **Phone:** {}\n\
             - **Company:** {}\n\
             - **Project:** {project}{additional}\n\n\
             Shall I generate and email the full proposal now?",
            session.email.as_deref().unwrap_or("N/A"),
            session.phone.as_deref().unwrap_or("N/A"),
            session.company.as_deref().unwrap_or("N/A"),
        );
        turn(
            Stage::ConfirmProposal,
            message,
            Some(UiDirective::pills([CONFIRM_YES, CONFIRM_NO])),
            session,
        )
    }
}

fn is_farewell(lower: &str) -> bool {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|w| FAREWELL_WORDS.contains(&w))
}
