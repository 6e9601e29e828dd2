use super::*;

use serde_json::json;

use crate::test_support::{url, GatedFetcher};

const DETAIL_550: &str = "https://api.test/3/movie/550?language=en-US";
const CREDITS_550: &str = "https://api.test/3/movie/550/credits";
const DETAIL_13: &str = "https://api.test/3/movie/13?language=en-US";
const CREDITS_13: &str = "https://api.test/3/movie/13/credits";

fn screen(fetcher: Arc<GatedFetcher>) -> MovieDetailScreen {
    let endpoints = ApiEndpoints::new(url("https://api.test/3/"), "en-US").expect("endpoints");
    MovieDetailScreen::new(endpoints, fetcher)
}

fn movie(id: i64, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "overview": "overview",
        "poster_path": "/poster.jpg",
        "backdrop_path": "/backdrop.jpg",
        "release_date": "1999-10-15",
        "runtime": 139,
        "genres": [{ "id": 18, "name": "Drama" }]
    })
}

fn credits(id: i64, cast: usize) -> serde_json::Value {
    let cast: Vec<_> = (0..cast)
        .map(|i| json!({ "cast_id": i, "name": format!("actor {i}"), "character": "role" }))
        .collect();
    json!({
        "id": id,
        "cast": cast,
        "crew": [
            { "credit_id": "c1", "department": "Directing", "job": "Director", "name": "Director One" },
            { "credit_id": "c2", "department": "Writing", "job": "Screenplay", "name": "Writer" }
        ]
    })
}

#[tokio::test]
async fn missing_movie_id_requests_nothing() {
    let fetcher = GatedFetcher::new();
    let mut screen = screen(fetcher.clone());

    screen.show(MovieId::from_route(Some("")));
    screen.quiesce().await;

    assert!(!screen.is_loading());
    assert_eq!(screen.error(), None);
    assert_eq!(screen.view(), None);
    assert!(fetcher.requested().await.is_empty());
}

#[tokio::test]
async fn view_combines_movie_directors_and_leading_cast() {
    let fetcher = GatedFetcher::new();
    let mut screen = screen(fetcher.clone());

    screen.show(MovieId::from_route(Some("550")));
    assert!(screen.is_loading());

    fetcher.resolve(DETAIL_550, movie(550, "Fight Club")).await;
    fetcher.resolve(CREDITS_550, credits(550, 8)).await;
    screen.settled().await;

    let view = screen.view().expect("view");
    assert_eq!(view.movie.title, "Fight Club");
    assert_eq!(view.movie.genres[0].name, "Drama");
    assert_eq!(view.directors.len(), 1);
    assert_eq!(view.directors[0].name, "Director One");
    assert_eq!(view.main_cast.len(), MAIN_CAST_LIMIT);
    assert_eq!(view.main_cast[0].name, "actor 0");
}

#[tokio::test]
async fn either_failure_surfaces_as_screen_error() {
    let fetcher = GatedFetcher::new();
    let mut screen = screen(fetcher.clone());

    screen.show(Some(MovieId::from(550)));
    fetcher.resolve(DETAIL_550, movie(550, "Fight Club")).await;
    fetcher
        .fail(CREDITS_550, shared::error::FetchError::Status(404))
        .await;
    screen.settled().await;

    assert!(!screen.is_loading());
    assert!(screen.error().is_some());
    assert_eq!(screen.view(), None);
}

#[tokio::test]
async fn switching_movies_ignores_previous_responses() {
    let fetcher = GatedFetcher::new();
    let mut screen = screen(fetcher.clone());

    screen.show(Some(MovieId::from(550)));
    screen.show(Some(MovieId::from(13)));
    assert_eq!(screen.movie_id(), Some(&MovieId::from(13)));

    fetcher.resolve(DETAIL_13, movie(13, "Forrest Gump")).await;
    fetcher.resolve(CREDITS_13, credits(13, 2)).await;
    screen.settled().await;

    fetcher.resolve(DETAIL_550, movie(550, "Fight Club")).await;
    fetcher.resolve(CREDITS_550, credits(550, 8)).await;
    screen.quiesce().await;

    let view = screen.view().expect("view");
    assert_eq!(view.movie.title, "Forrest Gump");
    assert_eq!(view.main_cast.len(), 2);
}
