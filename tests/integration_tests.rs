//! End-to-end tests: catalogs on disk, a mocked OpenAI-compatible endpoint,
//! and the public API wired together the way the binary wires it.

use catalog_fill::catalog::CatalogSet;
use catalog_fill::config::{CliArgs, Config};
use catalog_fill::i18n::LocaleId;
use catalog_fill::provider::Provider;
use catalog_fill::retry::RetryConfig;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

// ==================== Test Helpers ====================

/// Replies with `<Language:text>` for whatever text the request carries.
struct MarkerResponder;

impl Respond for MarkerResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().expect("request body should be JSON");
        let system = body["messages"][0]["content"].as_str().unwrap_or_default();
        let text = body["messages"][1]["content"].as_str().unwrap_or_default();
        let language = system
            .split("into ")
            .nth(1)
            .and_then(|rest| rest.split('.').next())
            .unwrap_or("?");

        ResponseTemplate::new(200).set_body_json(chat_response(&format!("<{}:{}>", language, text)))
    }
}

fn chat_response(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn create_test_config(server: &MockServer, dir: &TempDir, languages: Option<&str>) -> Config {
    let args = CliArgs {
        languages: languages.map(str::to_string),
        api_key: Some("test-key".to_string()),
        provider: Some("openai".to_string()),
        locales_dir: Some(dir.path().to_path_buf()),
        base_url: Some(server.uri()),
        ..CliArgs::default()
    };
    let mut config = Config::resolve_with(&args, |_| None).expect("config should resolve");
    config.retry = RetryConfig::no_retry();
    config
}

fn write_catalog(dir: &TempDir, name: &str, value: Value) {
    std::fs::write(dir.path().join(name), value.to_string()).expect("Failed to write catalog");
}

fn read_catalog(dir: &TempDir, name: &str) -> Value {
    let raw = std::fs::read_to_string(dir.path().join(name)).expect("Failed to read catalog");
    serde_json::from_str(&raw).expect("catalog should be valid JSON")
}

async fn run(config: &Config) -> anyhow::Result<catalog_fill::catalog::RunSummary> {
    let provider = Provider::from_config(config).await?;
    CatalogSet::new(&config.locales_dir)
        .run(&provider, &config.target_languages)
        .await
}

async fn mount_marker(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(MarkerResponder)
        .mount(server)
        .await;
}

// ==================== Reconciliation Workflow ====================

#[tokio::test]
async fn test_fills_empty_target_and_writes_pretty_json() {
    let server = MockServer::start().await;
    mount_marker(&server).await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"a": "Hello", "b": {"c": "World"}}));
    write_catalog(&dir, "es.json", json!({}));

    let config = create_test_config(&server, &dir, Some("es"));
    let summary = run(&config).await.expect("run should succeed");

    let on_disk = std::fs::read_to_string(dir.path().join("es.json")).unwrap();
    assert_eq!(
        on_disk,
        "{\n  \"a\": \"<Spanish:Hello>\",\n  \"b\": {\n    \"c\": \"<Spanish:World>\"\n  }\n}\n"
    );
    assert_eq!(summary.translated(), 2);
    assert_eq!(summary.fallbacks(), 0);
}

#[tokio::test]
async fn test_complete_target_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(MarkerResponder)
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"a": "Hello"}));
    write_catalog(&dir, "fr.json", json!({"a": "Bonjour"}));

    let config = create_test_config(&server, &dir, Some("fr"));
    let summary = run(&config).await.unwrap();

    assert_eq!(read_catalog(&dir, "fr.json"), json!({"a": "Bonjour"}));
    assert_eq!(summary.preserved(), 1);
    assert_eq!(summary.translated(), 0);
}

#[tokio::test]
async fn test_shorter_target_array_is_extended() {
    let server = MockServer::start().await;
    mount_marker(&server).await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"list": ["One", "Two", "Three"]}));
    write_catalog(&dir, "fr.json", json!({"list": ["Un"]}));

    let config = create_test_config(&server, &dir, Some("fr"));
    run(&config).await.unwrap();

    assert_eq!(
        read_catalog(&dir, "fr.json"),
        json!({"list": ["Un", "<French:Two>", "<French:Three>"]})
    );
}

#[tokio::test]
async fn test_unknown_locale_file_is_created_and_filled() {
    let server = MockServer::start().await;
    mount_marker(&server).await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"title": "Settings", "count": 3}));

    let config = create_test_config(&server, &dir, Some("xx"));
    let summary = run(&config).await.unwrap();

    // No registry name for "xx": the code itself is used as the language label
    assert_eq!(
        read_catalog(&dir, "xx.json"),
        json!({"title": "<xx:Settings>", "count": 3})
    );
    assert!(summary.locales[0].created);
    assert_eq!(summary.locales[0].metrics.copied, 1);
}

#[tokio::test]
async fn test_provider_failures_fall_back_to_source_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let canonical = json!({"a": "Hello", "nested": {"b": "World"}, "list": ["x"]});
    write_catalog(&dir, "en.json", canonical.clone());

    let config = create_test_config(&server, &dir, Some("de"));
    let summary = run(&config).await.expect("run should complete despite failures");

    assert_eq!(read_catalog(&dir, "de.json"), canonical);
    assert_eq!(summary.fallbacks(), 3);
    assert!(summary.is_fully_degraded());
}

#[tokio::test]
async fn test_strict_mode_rejects_run_with_fallbacks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"a": "Hello"}));

    let mut config = create_test_config(&server, &dir, Some("fr"));
    config.fail_on_fallback = true;
    let summary = run(&config).await.expect("run itself should complete");

    // The catalog is still written before the exit policy applies
    assert_eq!(read_catalog(&dir, "fr.json"), json!({"a": "Hello"}));
    let err = summary.check(&config).unwrap_err();
    assert!(err.to_string().contains("1 entries"));

    config.fail_on_fallback = false;
    assert!(summary.check(&config).is_ok());
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"a": "Hello"}));

    let mut config = create_test_config(&server, &dir, Some("ja"));
    config.retry = RetryConfig::new(3, std::time::Duration::from_millis(1));
    let summary = run(&config).await.unwrap();

    assert_eq!(summary.fallbacks(), 1);
    assert_eq!(read_catalog(&dir, "ja.json"), json!({"a": "Hello"}));
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let server = MockServer::start().await;
    mount_marker(&server).await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"a": "Hello", "b": ["One", {"c": "Two"}]}));

    let config = create_test_config(&server, &dir, Some("ko"));
    run(&config).await.unwrap();
    let first = std::fs::read_to_string(dir.path().join("ko.json")).unwrap();
    let requests_after_first = server.received_requests().await.unwrap().len();

    let summary = run(&config).await.unwrap();
    let second = std::fs::read_to_string(dir.path().join("ko.json")).unwrap();

    assert_eq!(first, second);
    assert_eq!(summary.translated(), 0);
    assert_eq!(
        server.received_requests().await.unwrap().len(),
        requests_after_first
    );
}

#[tokio::test]
async fn test_targets_discovered_from_existing_files() {
    let server = MockServer::start().await;
    mount_marker(&server).await;
    let dir = TempDir::new().unwrap();
    write_catalog(&dir, "en.json", json!({"a": "Hello"}));
    write_catalog(&dir, "ru.json", json!({}));
    write_catalog(&dir, "fr.json", json!({"a": "Salut"}));

    let config = create_test_config(&server, &dir, None);
    let summary = run(&config).await.unwrap();

    let processed: Vec<&LocaleId> = summary.locales.iter().map(|l| &l.locale).collect();
    assert_eq!(processed.len(), 2);
    assert_eq!(processed[0].code(), "fr");
    assert_eq!(processed[1].code(), "ru");
    assert_eq!(read_catalog(&dir, "ru.json"), json!({"a": "<Russian:Hello>"}));
    assert_eq!(read_catalog(&dir, "fr.json"), json!({"a": "Salut"}));
}

#[tokio::test]
async fn test_key_order_follows_canonical() {
    let server = MockServer::start().await;
    mount_marker(&server).await;
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("en.json"),
        r#"{"zeta": "Z", "alpha": "A", "mid": "M"}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("tr.json"), r#"{"mid": "Orta", "extra": "kept"}"#).unwrap();

    let config = create_test_config(&server, &dir, Some("tr"));
    run(&config).await.unwrap();

    let on_disk = std::fs::read_to_string(dir.path().join("tr.json")).unwrap();
    let keys: Vec<usize> = ["\"zeta\"", "\"alpha\"", "\"mid\""]
        .iter()
        .map(|k| on_disk.find(k).unwrap())
        .collect();
    assert!(keys[0] < keys[1] && keys[1] < keys[2]);
    // Keys absent from the canonical catalog are not carried over
    assert!(!on_disk.contains("extra"));
    assert!(on_disk.contains("\"Orta\""));
}

// ==================== Setup Failures ====================

#[tokio::test]
async fn test_missing_canonical_aborts_before_writing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let config = create_test_config(&server, &dir, Some("fr"));
    let err = run(&config).await.unwrap_err();

    assert!(err.to_string().contains("en.json"));
    assert!(!dir.path().join("fr.json").exists());
}

#[tokio::test]
async fn test_missing_api_key_fails_setup() {
    let dir = TempDir::new().unwrap();
    let args = CliArgs {
        provider: Some("claude".to_string()),
        locales_dir: Some(dir.path().to_path_buf()),
        ..CliArgs::default()
    };
    let config = Config::resolve_with(&args, |_| None).unwrap();

    let err = Provider::from_config(&config).await.unwrap_err();
    assert!(err.to_string().contains("API key"));
}
