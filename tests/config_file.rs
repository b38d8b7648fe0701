mod common;

use std::fs;
use std::path::PathBuf;

use goto_token_cache::config::{DEFAULT_AUDIENCE, DEFAULT_REQUEST_TIMEOUT_MS};
use goto_token_cache::{ConfigLocation, ErrorKind, TokenCache, read_config};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer};

use common::{init_logging, token_body};

fn write_config(name: &str, cfg: serde_json::Value) -> String {
    let mut cfg_path = PathBuf::from("target");
    cfg_path.push(name);
    fs::create_dir_all("target").ok();
    fs::write(&cfg_path, serde_json::to_string(&cfg).unwrap()).unwrap();
    cfg_path.to_string_lossy().to_string()
}

#[tokio::test]
async fn file_config_drives_token_cache() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("audience=urn%3Acalls"))
        .respond_with(token_body("from-file", 3600))
        .expect(1)
        .mount(&server)
        .await;

    let cfg_path = write_config(
        &format!("test-config-{}.json", server.address().port()),
        serde_json::json!({
            "client_id": "file-id",
            "client_secret": "file-secret",
            "auth_base_url": server.uri(),
            "audience": "urn:calls",
        }),
    );

    let cache = TokenCache::from_location(ConfigLocation::File(cfg_path))
        .await
        .expect("cache from file");
    assert_eq!(cache.config().client_id, "file-id");
    assert_eq!(cache.get_access_token().await.unwrap(), "from-file");
}

#[tokio::test]
async fn file_config_uses_defaults_for_optional_fields() {
    let cfg_path = write_config(
        "test-config-defaults.json",
        serde_json::json!({ "client_id": "id", "client_secret": "secret" }),
    );
    let config = read_config(ConfigLocation::File(cfg_path)).await.unwrap();
    assert_eq!(config.audience, DEFAULT_AUDIENCE);
    assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
}

#[tokio::test]
async fn file_config_without_secret_is_rejected() {
    let cfg_path = write_config(
        "test-config-no-secret.json",
        serde_json::json!({ "client_id": "id" }),
    );
    let err = read_config(ConfigLocation::File(cfg_path))
        .await
        .expect_err("secret required");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn missing_file_is_config_error() {
    let err = read_config(ConfigLocation::File("target/does-not-exist.json".into()))
        .await
        .expect_err("no file");
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
