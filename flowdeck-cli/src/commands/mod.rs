//! Subcommand implementations.

pub mod code_settings;
pub mod flows;
pub mod toggle;

use flowdeck_lib::api::FlowdeckClient;
use flowdeck_lib::error::ApiError;

use crate::config::Settings;

/// Builds the API client from resolved settings.
pub fn client(settings: &Settings) -> Result<FlowdeckClient, ApiError> {
    let builder = FlowdeckClient::builder()
        .url(settings.base_url.clone())
        .timeout(settings.timeout);
    match &settings.token {
        Some(token) => builder.token(token.clone()).build(),
        None => builder.build(),
    }
}
