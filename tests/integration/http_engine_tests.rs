/*!
 * Tests for the HTTP engine against a mock model server
 */

use anyhow::Result;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use l10n_fill::engine::{DecodingConfig, Engine, HttpEngine, TranslationEngine};
use l10n_fill::errors::EngineError;

fn config() -> DecodingConfig {
    DecodingConfig {
        beam_count: 3,
        do_sample: false,
        temperature: None,
        repetition_penalty: Some(1.3),
        no_repeat_ngram_size: Some(2),
        length_penalty: 0.6,
        max_new_tokens: 20,
    }
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

async fn mount_health(server: &MockServer, model_loaded: bool) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "model_loaded": model_loaded})))
        .mount(server)
        .await;
}

fn engine(server: &MockServer, retries: u32) -> Result<HttpEngine> {
    Ok(HttpEngine::new(&server.uri(), 5, retries, 10)?)
}

#[tokio::test]
async fn test_translate_shouldSendNllbCodesAndParseOutputs() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(body_partial_json(json!({
            "source_language": "eng_Latn",
            "target_language": "rus_Cyrl",
            "texts": ["Save", "Open"],
            "generation": {"num_beams": 3, "max_new_tokens": 20}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translations": ["Сохранить", null]})))
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::loaded(engine(&server, 0)?).await?;
    let outputs = engine.translate(&texts(&["Save", "Open"]), "en", "ru", &config()).await?;

    assert_eq!(outputs, vec![Some("Сохранить".to_string()), None]);
    Ok(())
}

#[tokio::test]
async fn test_translate_withServerError_shouldRetryThenFail() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(2)
        .mount(&server)
        .await;

    let engine = Engine::loaded(engine(&server, 1)?).await?;
    let result = engine.translate(&texts(&["Save"]), "en", "ru", &config()).await;

    assert!(matches!(result, Err(EngineError::ApiError { status_code: 503, .. })));
    Ok(())
}

#[tokio::test]
async fn test_translate_withClientError_shouldNotRetry() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown language"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::loaded(engine(&server, 3)?).await?;
    let result = engine.translate(&texts(&["Save"]), "en", "xx", &config()).await;

    match result {
        Err(EngineError::ApiError { status_code, message }) => {
            assert_eq!(status_code, 400);
            assert_eq!(message, "unknown language");
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_translate_withShortResponse_shouldReportMismatch() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translations": ["Kaydet"]})))
        .mount(&server)
        .await;

    let engine = Engine::loaded(engine(&server, 0)?).await?;
    let result = engine.translate(&texts(&["Save", "Open"]), "en", "tr", &config()).await;

    assert!(matches!(result, Err(EngineError::ResponseMismatch { expected: 2, actual: 1 })));
    Ok(())
}

#[tokio::test]
async fn test_translate_withInvalidJson_shouldReturnParseError() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&server)
        .await;

    let engine = Engine::loaded(engine(&server, 0)?).await?;
    let result = engine.translate(&texts(&["Save"]), "en", "tr", &config()).await;

    assert!(matches!(result, Err(EngineError::ParseError(_))));
    Ok(())
}

#[tokio::test]
async fn test_load_withModelNotLoaded_shouldRequestReload() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "model_loaded": false})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/reload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let engine = Engine::loaded(engine(&server, 0)?).await?;

    assert!(engine.is_loaded());
    Ok(())
}

#[tokio::test]
async fn test_load_withReloadRefused_shouldFail() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, false).await;
    Mock::given(method("POST"))
        .and(path("/reload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": false})))
        .mount(&server)
        .await;

    let result = Engine::loaded(engine(&server, 0)?).await;

    assert!(matches!(result, Err(EngineError::LoadFailed(_))));
    Ok(())
}

#[tokio::test]
async fn test_reload_shouldCallServerAndStayLoaded() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/reload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = Engine::loaded(engine(&server, 0)?).await?;
    engine.reload().await?;

    assert!(engine.is_loaded());
    assert_eq!(engine.reload_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unload_shouldBlockFurtherTranslation() -> Result<()> {
    let server = MockServer::start().await;
    mount_health(&server, true).await;
    Mock::given(method("POST"))
        .and(path("/unload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translations": ["x"]})))
        .expect(0)
        .mount(&server)
        .await;

    let mut engine = Engine::loaded(engine(&server, 0)?).await?;
    engine.unload().await?;
    let result = engine.translate(&texts(&["Save"]), "en", "tr", &config()).await;

    assert!(matches!(result, Err(EngineError::NotLoaded)));
    Ok(())
}

#[tokio::test]
async fn test_health_withUnreachableServer_shouldReturnConnectionError() -> Result<()> {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let engine = HttpEngine::new(&uri, 1, 0, 10)?;
    let result = engine.health().await;

    assert!(matches!(result, Err(EngineError::ConnectionError(_))));
    Ok(())
}

#[tokio::test]
async fn test_translate_directly_withHttpEngine_shouldWorkWithoutHandle() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"translations": ["Aç"]})))
        .mount(&server)
        .await;

    let engine = engine(&server, 0)?;
    let outputs = TranslationEngine::translate(&engine, &texts(&["Open"]), "en", "tr", &config()).await?;

    assert_eq!(outputs, vec![Some("Aç".to_string())]);
    Ok(())
}
