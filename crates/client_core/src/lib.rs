//! Client-side state controllers for the movie browser: cancellable API
//! requests, validated forms, and the multi-step signup wizard.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod detail;
pub mod form;
pub mod request;
pub mod transport;
pub mod wizard;

pub use catalog::{ApiEndpoints, CatalogScreen, ImageUrls};
pub use config::{load_settings, ClientSettings};
pub use detail::{MovieDetailScreen, MovieDetailView};
pub use form::{FormController, SubmitOutcome};
pub use request::{FetchState, RequestController};
pub use transport::{HttpFetcher, ResourceFetcher};
pub use wizard::{WizardController, WizardError};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
