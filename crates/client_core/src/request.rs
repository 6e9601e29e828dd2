//! Cancellable remote-data fetch shared by every data-driven screen.
//!
//! A [`RequestController`] owns one [`FetchState`]. Each call to
//! [`RequestController::set_resource`] with a new identifier mints a fresh
//! [`RequestToken`] and spawns the fetch; the response is written back only if
//! its token is still the current one when it completes. Superseded responses
//! are dropped, not aborted at the transport, so the last identifier always
//! wins regardless of arrival order.
//!
//! Requests have no timeout: a request that never completes keeps
//! `is_loading` set until the identifier changes again.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use shared::{error::FetchError, locale::Locale};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, warn};
use url::Url;

use crate::transport::ResourceFetcher;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl<T> FetchState<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
        }
    }

    fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
        }
    }

    fn success(data: T) -> Self {
        Self {
            data: Some(data),
            is_loading: false,
            error: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            is_loading: false,
            error: Some(message.into()),
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.is_loading
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Generation marker minted per request. Strictly increasing within one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// What subscribers observe: the state plus the identifier and token it belongs to.
#[derive(Debug, Clone)]
pub struct FetchSnapshot<T> {
    token: RequestToken,
    resource: Option<Url>,
    state: FetchState<T>,
}

impl<T> FetchSnapshot<T> {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn resource(&self) -> Option<&Url> {
        self.resource.as_ref()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }
}

pub struct RequestController<T> {
    fetcher: Arc<dyn ResourceFetcher>,
    snapshot: Arc<watch::Sender<FetchSnapshot<T>>>,
    last_token: u64,
    in_flight: Vec<JoinHandle<()>>,
    torn_down: bool,
    locale: Locale,
}

impl<T> RequestController<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let (snapshot, _) = watch::channel(FetchSnapshot {
            token: RequestToken(0),
            resource: None,
            state: FetchState::idle(),
        });
        Self {
            fetcher,
            snapshot: Arc::new(snapshot),
            last_token: 0,
            in_flight: Vec::new(),
            torn_down: false,
            locale: Locale::default(),
        }
    }

    /// Language of the error message written into [`FetchState::error`].
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Points the controller at a new identifier.
    ///
    /// Returns the token of the spawned request, or `None` when nothing was
    /// issued (absent identifier, unchanged identifier, or torn-down controller).
    /// Must be called from within a tokio runtime.
    pub fn set_resource(&mut self, resource: Option<Url>) -> Option<RequestToken> {
        if self.torn_down {
            warn!("ignoring resource change on torn-down request controller");
            return None;
        }
        if self.snapshot.borrow().resource == resource {
            return None;
        }

        self.in_flight.retain(|task| !task.is_finished());
        let token = self.mint_token();

        let Some(url) = resource else {
            self.snapshot.send_replace(FetchSnapshot {
                token,
                resource: None,
                state: FetchState::idle(),
            });
            return None;
        };

        debug!(token = token.0, resource = %url, "request started");
        self.snapshot.send_replace(FetchSnapshot {
            token,
            resource: Some(url.clone()),
            state: FetchState::loading(),
        });

        let fetcher = Arc::clone(&self.fetcher);
        let snapshot = Arc::clone(&self.snapshot);
        let locale = self.locale;
        self.in_flight.push(tokio::spawn(async move {
            let outcome = match fetcher.fetch(&url).await {
                Ok(body) => serde_json::from_slice::<T>(&body).map_err(FetchError::from),
                Err(err) => Err(err),
            };
            apply_outcome(&snapshot, token, &url, locale, outcome);
        }));

        Some(token)
    }

    pub fn state(&self) -> FetchState<T> {
        self.snapshot.borrow().state.clone()
    }

    pub fn resource(&self) -> Option<Url> {
        self.snapshot.borrow().resource.clone()
    }

    pub fn current_token(&self) -> RequestToken {
        self.snapshot.borrow().token
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot<T>> {
        self.snapshot.subscribe()
    }

    /// Waits until the current request (if any) has settled and returns that state.
    pub async fn settled(&self) -> FetchState<T> {
        let mut rx = self.snapshot.subscribe();
        let settled = rx
            .wait_for(|snapshot| snapshot.state.is_settled())
            .await
            .map(|snapshot| snapshot.state.clone());
        settled.unwrap_or_else(|_| self.state())
    }

    /// Waits for every spawned request task, including superseded ones, to finish.
    pub async fn quiesce(&mut self) {
        for task in self.in_flight.drain(..) {
            if let Err(err) = task.await {
                warn!("request task ended abnormally: {err}");
            }
        }
    }
}

impl<T> RequestController<T> {
    /// Detaches the controller: responses still in flight become no-ops.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        let token = self.mint_token();
        // swap the token without notifying; the visible state stays as it was
        self.snapshot.send_if_modified(|snapshot| {
            snapshot.token = token;
            false
        });
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    fn mint_token(&mut self) -> RequestToken {
        self.last_token += 1;
        RequestToken(self.last_token)
    }
}

impl<T> Drop for RequestController<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn apply_outcome<T>(
    snapshot: &watch::Sender<FetchSnapshot<T>>,
    token: RequestToken,
    url: &Url,
    locale: Locale,
    outcome: Result<T, FetchError>,
) {
    snapshot.send_if_modified(|current| {
        if current.token != token {
            debug!(
                token = token.0,
                current = current.token.0,
                resource = %url,
                "discarding superseded response"
            );
            return false;
        }
        current.state = match outcome {
            Ok(data) => FetchState::success(data),
            Err(err) => {
                warn!(token = token.0, resource = %url, "request failed: {err}");
                FetchState::failure(err.user_message(locale))
            }
        };
        true
    });
}

#[cfg(test)]
#[path = "tests/request_tests.rs"]
mod tests;
