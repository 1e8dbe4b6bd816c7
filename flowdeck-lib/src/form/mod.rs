//! Form state with explicit change subscriptions.
//!
//! - [`FormState`] - values, defaults, dirty tracking, validation and
//!   subscribers notified on every committed edit
//! - [`CodeSettingsForm`] - settings form of a code step

mod code_settings;
mod state;

pub use code_settings::CodeSettings;
pub use code_settings::CodeSettingsForm;
pub use code_settings::INPUTS_HELP;
pub use state::ChangeCallback;
pub use state::FormChange;
pub use state::FormState;
pub use state::Subscription;
