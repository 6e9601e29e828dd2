//! Catalog listing state: category + page drive one listing request.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use shared::{
    domain::{Category, MovieId, Page},
    locale::Locale,
    protocol::{MovieListPage, MovieSummary},
};
use tracing::debug;
use url::Url;

use crate::{
    config::ClientSettings,
    request::{FetchState, RequestController, RequestToken},
    transport::ResourceFetcher,
};

/// Builds resource URLs on the remote movie API.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    base: Url,
    language: String,
}

impl ApiEndpoints {
    pub fn new(base: Url, language: impl Into<String>) -> Result<Self> {
        if base.cannot_be_a_base() {
            return Err(anyhow!("api base url '{base}' cannot carry a path"));
        }
        Ok(Self {
            base,
            language: language.into(),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Self::new(settings.api_base()?, settings.language.clone())
    }

    /// Message catalog matching the language requested from the API.
    pub fn locale(&self) -> Locale {
        Locale::from_language(&self.language)
    }

    pub fn list_url(&self, category: Category, page: Page) -> Url {
        let mut url = self.url_for(&["movie", category.endpoint()]);
        url.query_pairs_mut()
            .append_pair("language", &self.language)
            .append_pair("page", &page.to_string());
        url
    }

    pub fn movie_url(&self, movie_id: &MovieId) -> Url {
        let mut url = self.url_for(&["movie", &movie_id.0]);
        url.query_pairs_mut().append_pair("language", &self.language);
        url
    }

    pub fn credits_url(&self, movie_id: &MovieId) -> Url {
        self.url_for(&["movie", &movie_id.0, "credits"])
    }

    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "original";
pub const PROFILE_SIZE: &str = "w185";

/// Resolves image paths returned by the API (`/abc.jpg`) against the image host.
#[derive(Debug, Clone)]
pub struct ImageUrls {
    base: Url,
}

impl ImageUrls {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        Ok(Self::new(settings.image_base()?))
    }

    pub fn sized(&self, size: &str, path: Option<&str>) -> Option<Url> {
        let path = path?.trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        self.base.join(&format!("{size}/{path}")).ok()
    }

    pub fn poster(&self, path: Option<&str>) -> Option<Url> {
        self.sized(POSTER_SIZE, path)
    }

    pub fn backdrop(&self, path: Option<&str>) -> Option<Url> {
        self.sized(BACKDROP_SIZE, path)
    }

    pub fn profile(&self, path: Option<&str>) -> Option<Url> {
        self.sized(PROFILE_SIZE, path)
    }
}

/// State behind the `/movies/:category` screen.
///
/// Switching category resets the page to 1. Going back stops at page 1; going
/// forward is not bounded by the listing's `total_pages`.
pub struct CatalogScreen {
    endpoints: ApiEndpoints,
    category: Category,
    page: Page,
    listing: RequestController<MovieListPage>,
}

impl CatalogScreen {
    pub fn new(endpoints: ApiEndpoints, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let listing = RequestController::new(fetcher).with_locale(endpoints.locale());
        Self {
            endpoints,
            category: Category::default(),
            page: Page::FIRST,
            listing,
        }
    }

    /// Applies the route's category token and (re)issues the listing request.
    pub fn navigate(&mut self, route_token: Option<&str>) -> Option<RequestToken> {
        self.select_category(route_token);
        self.refresh()
    }

    /// Category and page together, with a single listing request.
    pub fn navigate_to_page(
        &mut self,
        route_token: Option<&str>,
        page: Page,
    ) -> Option<RequestToken> {
        self.select_category(route_token);
        self.page = page;
        self.refresh()
    }

    pub fn go_to_page(&mut self, page: Page) -> Option<RequestToken> {
        self.page = page;
        self.refresh()
    }

    pub fn next_page(&mut self) -> Option<RequestToken> {
        self.page = self.page.next();
        self.refresh()
    }

    pub fn prev_page(&mut self) -> Option<RequestToken> {
        if self.page.is_first() {
            return None;
        }
        self.page = self.page.prev();
        self.refresh()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn can_go_back(&self) -> bool {
        !self.page.is_first()
    }

    pub fn current_url(&self) -> Url {
        self.endpoints.list_url(self.category, self.page)
    }

    pub fn state(&self) -> FetchState<MovieListPage> {
        self.listing.state()
    }

    /// Movies on the current page; empty while loading or after an error.
    pub fn movies(&self) -> Vec<MovieSummary> {
        self.listing
            .state()
            .data
            .map(|page| page.results)
            .unwrap_or_default()
    }

    pub fn listing(&self) -> &RequestController<MovieListPage> {
        &self.listing
    }

    pub async fn settled(&self) -> FetchState<MovieListPage> {
        self.listing.settled().await
    }

    pub async fn quiesce(&mut self) {
        self.listing.quiesce().await;
    }

    pub fn teardown(&mut self) {
        self.listing.teardown();
    }

    fn select_category(&mut self, route_token: Option<&str>) {
        let category = Category::from_route(route_token);
        if category != self.category {
            debug!(from = %self.category, to = %category, "category changed, resetting page");
            self.category = category;
            self.page = Page::FIRST;
        }
    }

    fn refresh(&mut self) -> Option<RequestToken> {
        let url = self.current_url();
        self.listing.set_resource(Some(url))
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
