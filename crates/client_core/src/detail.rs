//! State behind the movie detail screen: one movie fetch plus its credits.

use std::sync::Arc;

use shared::{
    domain::MovieId,
    protocol::{CastMember, Credits, CrewMember, MovieDetail},
};

use crate::{
    catalog::ApiEndpoints,
    request::{FetchState, RequestController},
    transport::ResourceFetcher,
};

pub const MAIN_CAST_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetailView {
    pub movie: MovieDetail,
    pub directors: Vec<CrewMember>,
    pub main_cast: Vec<CastMember>,
}

pub struct MovieDetailScreen {
    endpoints: ApiEndpoints,
    movie_id: Option<MovieId>,
    detail: RequestController<MovieDetail>,
    credits: RequestController<Credits>,
}

impl MovieDetailScreen {
    pub fn new(endpoints: ApiEndpoints, fetcher: Arc<dyn ResourceFetcher>) -> Self {
        let locale = endpoints.locale();
        Self {
            endpoints,
            movie_id: None,
            detail: RequestController::new(Arc::clone(&fetcher)).with_locale(locale),
            credits: RequestController::new(fetcher).with_locale(locale),
        }
    }

    /// Without a movie id both controllers stay idle and nothing is requested.
    pub fn show(&mut self, movie_id: Option<MovieId>) {
        let detail_url = movie_id.as_ref().map(|id| self.endpoints.movie_url(id));
        let credits_url = movie_id.as_ref().map(|id| self.endpoints.credits_url(id));
        self.movie_id = movie_id;
        self.detail.set_resource(detail_url);
        self.credits.set_resource(credits_url);
    }

    pub fn movie_id(&self) -> Option<&MovieId> {
        self.movie_id.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.detail.state().is_loading || self.credits.state().is_loading
    }

    /// First error of the two requests, movie before credits.
    pub fn error(&self) -> Option<String> {
        self.detail.state().error.or(self.credits.state().error)
    }

    pub fn detail_state(&self) -> FetchState<MovieDetail> {
        self.detail.state()
    }

    pub fn credits_state(&self) -> FetchState<Credits> {
        self.credits.state()
    }

    /// Available once both requests succeeded.
    pub fn view(&self) -> Option<MovieDetailView> {
        if self.is_loading() || self.error().is_some() {
            return None;
        }
        let movie = self.detail.state().data?;
        let credits = self.credits.state().data?;
        Some(MovieDetailView {
            directors: credits.directors().cloned().collect(),
            main_cast: credits.leading_cast(MAIN_CAST_LIMIT).to_vec(),
            movie,
        })
    }

    pub async fn settled(&self) {
        self.detail.settled().await;
        self.credits.settled().await;
    }

    pub async fn quiesce(&mut self) {
        self.detail.quiesce().await;
        self.credits.quiesce().await;
    }

    pub fn teardown(&mut self) {
        self.detail.teardown();
        self.credits.teardown();
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;
