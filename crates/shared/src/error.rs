use thiserror::Error;

use crate::locale::{Locale, ENGLISH};

/// Single user-facing message every failed fetch collapses into, in the default locale.
pub const FETCH_ERROR_MESSAGE: &str = ENGLISH.fetch_error;

/// Why a remote fetch failed. Only logged; screens see [`FETCH_ERROR_MESSAGE`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("failed to decode response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn user_message(&self, locale: Locale) -> &'static str {
        locale.messages().fetch_error
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}
