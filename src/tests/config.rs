use crate::config::Config;

#[test]
fn test_load_creates_default_config() {
    let tmp = tempfile::tempdir().unwrap();

    let config = Config::load_with(tmp.path()).unwrap();

    assert!(tmp.path().join("config.yaml").exists());
    assert_eq!(config.environment, "production");
    assert_eq!(config.page_size, 20);
    assert!(config.fixed_phrases.contains(&"system:Incoming".to_string()));
    assert_eq!(config.session_token, None);
}

#[test]
fn test_load_fills_missing_fields() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.yaml"), "environment: develop\npage_size: 50\n").unwrap();

    let config = Config::load_with(tmp.path()).unwrap();

    assert_eq!(config.environment, "develop");
    assert_eq!(config.page_size, 50);
    assert_eq!(config.order, "title");

    let saved = std::fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
    assert!(saved.contains("fixed_phrases"));
}

#[test]
fn test_invalid_page_size() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.yaml"), "page_size: 0\n").unwrap();

    assert!(Config::load_with(tmp.path()).is_err());
}

#[test]
fn test_unknown_environment() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.yaml"), "environment: staging\n").unwrap();
    assert!(Config::load_with(tmp.path()).is_err());

    // a custom server does not need a known environment
    std::fs::write(
        tmp.path().join("config.yaml"),
        "environment: staging\nserver_url: http://example.com/parse\napp_id: abc\n",
    )
    .unwrap();
    let config = Config::load_with(tmp.path()).unwrap();
    let connection = config.connection().unwrap();
    assert_eq!(connection.url, "http://example.com/parse/");
    assert_eq!(connection.app_id, "abc");
}

#[test]
fn test_malformed_fixed_phrase() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("config.yaml"), "fixed_phrases:\n  - Incoming\n").unwrap();
    assert!(Config::load_with(tmp.path()).is_err());
}

#[test]
fn test_book_params() {
    let config = Config::default();

    let first = config.book_params(0);
    assert_eq!(first.limit, Some(20));
    assert_eq!(first.skip, None);
    assert_eq!(first.order.as_deref(), Some("title"));
    assert_eq!(first.include.as_deref(), Some("langPointers,uploader"));

    assert_eq!(config.book_params(3).skip, Some(60));
}

#[test]
fn test_connection_for_environment() {
    let mut config = Config::default();
    config.environment = "local".to_string();
    config.session_token = Some(" token ".to_string());
    let connection = config.connection().unwrap();

    assert_eq!(connection.url, "http://localhost:1337/parse/");
    assert_eq!(connection.session_token.as_deref(), Some("token"));
}
