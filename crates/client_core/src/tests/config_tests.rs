use super::*;

use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn credential_debug_is_redacted() {
    let credential = ApiCredential::new("super-secret");
    let rendered = format!("{:?}", credential);
    assert!(!rendered.contains("super-secret"));
    assert_eq!(credential.bearer_token(), "super-secret");
}

#[test]
fn base_urls_keep_their_last_segment_when_joined() {
    let settings = ClientSettings::default();
    let base = settings.api_base().expect("api base");
    assert_eq!(
        base.join("movie/popular").expect("join").as_str(),
        "https://api.themoviedb.org/3/movie/popular"
    );
    let images = settings.image_base().expect("image base");
    assert_eq!(images.as_str(), "https://image.tmdb.org/t/p/");
}

#[test]
fn file_values_override_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("moviebox_config_test_{suffix}"));
    fs::create_dir_all(&temp_root).expect("temp root");
    let path = temp_root.join("client.toml");
    fs::write(
        &path,
        "api_base_url = \"http://127.0.0.1:9000/3\"\nlanguage = \"ko-KR\"\n",
    )
    .expect("write config");

    let settings = load_settings_from(&path);
    assert_eq!(settings.api_base_url, "http://127.0.0.1:9000/3");
    assert_eq!(settings.language, "ko-KR");
    assert_eq!(settings.locale(), Locale::Korean);
    assert_eq!(settings.image_base_url, "https://image.tmdb.org/t/p");

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn missing_file_yields_defaults() {
    let settings = load_settings_from(Path::new("/definitely/not/here/client.toml"));
    assert_eq!(settings.language, "en-US");
}

#[test]
fn plain_paths_become_sqlite_urls() {
    assert_eq!(
        prepare_scratch_pad_url("./data/scratch.db"),
        "sqlite://./data/scratch.db"
    );
    assert_eq!(prepare_scratch_pad_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        prepare_scratch_pad_url("  "),
        ClientSettings::default().scratch_pad_url
    );
}
