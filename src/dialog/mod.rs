//! The guided conversation — stages, session state, UI directives, and the
//! dialog engine that ties them together.

mod machine;
mod session;
mod stage;
mod ui;

pub use machine::{DialogConfig, DialogEngine, TurnResult, BACK_COMMAND};
pub use session::{Session, CUSTOM_SERVICE, NO_FEATURES};
pub use stage::Stage;
pub use ui::{DisplayStyle, FormType, UiDirective};
