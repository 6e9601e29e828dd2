use super::*;

use serde_json::json;

use crate::test_support::{url, GatedFetcher};

const POPULAR_1: &str = "https://api.test/3/movie/popular?language=en-US&page=1";
const POPULAR_2: &str = "https://api.test/3/movie/popular?language=en-US&page=2";
const UPCOMING_1: &str = "https://api.test/3/movie/upcoming?language=en-US&page=1";

fn endpoints() -> ApiEndpoints {
    ApiEndpoints::new(url("https://api.test/3/"), "en-US").expect("endpoints")
}

fn listing(title: &str, page: u32) -> serde_json::Value {
    json!({
        "page": page,
        "results": [{ "id": 1, "title": title, "overview": "", "poster_path": "/p.jpg" }],
        "total_pages": 3,
        "total_results": 60
    })
}

#[test]
fn endpoints_build_list_detail_and_credit_urls() {
    let endpoints = endpoints();
    assert_eq!(
        endpoints.list_url(Category::TopRated, Page::new(4)).as_str(),
        "https://api.test/3/movie/top_rated?language=en-US&page=4"
    );
    let movie = MovieId("550".to_string());
    assert_eq!(
        endpoints.movie_url(&movie).as_str(),
        "https://api.test/3/movie/550?language=en-US"
    );
    assert_eq!(
        endpoints.credits_url(&movie).as_str(),
        "https://api.test/3/movie/550/credits"
    );
}

#[test]
fn settings_base_without_trailing_slash_keeps_version_segment() {
    let settings = ClientSettings::default();
    let endpoints = ApiEndpoints::from_settings(&settings).expect("endpoints");
    assert_eq!(
        endpoints.list_url(Category::Popular, Page::FIRST).as_str(),
        "https://api.themoviedb.org/3/movie/popular?language=en-US&page=1"
    );
}

#[test]
fn image_urls_join_size_and_path() {
    let images = ImageUrls::from_settings(&ClientSettings::default()).expect("images");
    assert_eq!(
        images.poster(Some("/abc.jpg")).expect("poster").as_str(),
        "https://image.tmdb.org/t/p/w500/abc.jpg"
    );
    assert_eq!(
        images.backdrop(Some("/b.jpg")).expect("backdrop").as_str(),
        "https://image.tmdb.org/t/p/original/b.jpg"
    );
    assert_eq!(images.profile(None), None);
    assert_eq!(images.profile(Some("")), None);
}

#[tokio::test]
async fn switching_category_resets_page_and_drops_pending_listing() {
    let fetcher = GatedFetcher::new();
    let mut screen = CatalogScreen::new(endpoints(), fetcher.clone());

    screen.navigate(Some("popular")).expect("popular request");
    assert_eq!(screen.current_url(), url(POPULAR_1));
    screen.next_page().expect("page 2");
    assert_eq!(screen.page().get(), 2);

    screen.navigate(Some("upcoming")).expect("upcoming request");
    assert_eq!(screen.category(), Category::Upcoming);
    assert_eq!(screen.page(), Page::FIRST);
    assert_eq!(screen.current_url(), url(UPCOMING_1));

    fetcher.resolve(UPCOMING_1, listing("Soon", 1)).await;
    let settled = screen.settled().await;
    assert_eq!(settled.data.expect("listing").results[0].title, "Soon");

    fetcher.resolve(POPULAR_1, listing("Old", 1)).await;
    fetcher.resolve(POPULAR_2, listing("Older", 2)).await;
    screen.quiesce().await;

    assert_eq!(screen.movies()[0].title, "Soon");
    let requested = fetcher.requested().await;
    assert!(requested.contains(&POPULAR_1.to_string()));
    assert!(requested.contains(&UPCOMING_1.to_string()));
}

#[tokio::test]
async fn previous_page_is_clamped_at_first() {
    let fetcher = GatedFetcher::new();
    let mut screen = CatalogScreen::new(endpoints(), fetcher.clone());

    screen.navigate(None).expect("default request");
    assert_eq!(screen.category(), Category::Popular);
    assert!(!screen.can_go_back());
    assert_eq!(screen.prev_page(), None);
    assert_eq!(screen.page(), Page::FIRST);

    screen.next_page();
    screen.next_page();
    assert!(screen.can_go_back());
    screen.prev_page().expect("back to page 2");
    assert_eq!(screen.page().get(), 2);
    assert_eq!(screen.current_url(), url(POPULAR_2));
}

#[tokio::test]
async fn same_category_navigation_keeps_page() {
    let fetcher = GatedFetcher::new();
    let mut screen = CatalogScreen::new(endpoints(), fetcher.clone());

    screen.navigate(Some("top-rated"));
    screen.next_page();
    assert_eq!(screen.navigate(Some("top_rated")), None);
    assert_eq!(screen.page().get(), 2);
}

#[tokio::test]
async fn movies_are_empty_until_listing_arrives() {
    let fetcher = GatedFetcher::new();
    let mut screen = CatalogScreen::new(endpoints(), fetcher.clone());

    screen.navigate(Some("popular"));
    assert!(screen.state().is_loading);
    assert!(screen.movies().is_empty());

    fetcher
        .fail(POPULAR_1, shared::error::FetchError::Status(503))
        .await;
    let failed = screen.settled().await;
    assert!(failed.error.is_some());
    assert!(screen.movies().is_empty());
}

#[tokio::test]
async fn jumping_to_a_page_issues_one_request() {
    const UPCOMING_7: &str = "https://api.test/3/movie/upcoming?language=en-US&page=7";
    let fetcher = GatedFetcher::new();
    let mut screen = CatalogScreen::new(endpoints(), fetcher.clone());

    screen
        .navigate_to_page(Some("upcoming"), Page::new(7))
        .expect("listing request");
    assert_eq!(screen.category(), Category::Upcoming);
    assert_eq!(screen.page().get(), 7);

    fetcher.resolve(UPCOMING_7, listing("Later", 7)).await;
    screen.quiesce().await;

    assert_eq!(fetcher.requested().await, vec![UPCOMING_7.to_string()]);
    assert_eq!(screen.movies()[0].title, "Later");
}

#[tokio::test]
async fn go_to_page_keeps_category_and_skips_unchanged_page() {
    let fetcher = GatedFetcher::new();
    let mut screen = CatalogScreen::new(endpoints(), fetcher.clone());

    screen.navigate(Some("popular")).expect("page 1");
    screen.go_to_page(Page::new(2)).expect("page 2");
    assert_eq!(screen.current_url(), url(POPULAR_2));
    assert_eq!(screen.go_to_page(Page::new(2)), None);
    assert_eq!(screen.category(), Category::Popular);
}

#[tokio::test]
async fn korean_language_localizes_listing_failure() {
    const POPULAR_KO: &str = "https://api.test/3/movie/popular?language=ko-KR&page=1";
    let fetcher = GatedFetcher::new();
    let endpoints = ApiEndpoints::new(url("https://api.test/3/"), "ko-KR").expect("endpoints");
    let mut screen = CatalogScreen::new(endpoints, fetcher.clone());

    screen.navigate(None);
    fetcher
        .fail(POPULAR_KO, shared::error::FetchError::Status(500))
        .await;

    let failed = screen.settled().await;
    assert_eq!(
        failed.error.as_deref(),
        Some(Locale::Korean.messages().fetch_error)
    );
}
