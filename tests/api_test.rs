use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use parlance::application::ports::{
    AudioDecoder, AudioFetcher, DecodeError, FetchError, MelExtractor, ModelError, SpeechModel,
};
use parlance::application::services::{ModelGateway, SpeechService};
use parlance::domain::{
    AudioSample, LanguageScore, MelSpectrogram, TranscriptionOptions, TranscriptionResult,
};
use parlance::presentation::{create_router, AppState};

struct MockFetcher;

#[async_trait]
impl AudioFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.ends_with("/missing.wav") {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: 404,
            });
        }
        Ok(vec![0u8; 3200])
    }
}

struct MockDecoder;

#[async_trait]
impl AudioDecoder for MockDecoder {
    async fn decode(&self, data: &[u8]) -> Result<AudioSample, DecodeError> {
        Ok(AudioSample::from_pcm_s16le(data))
    }
}

/// Decoder that always fails; lets tests prove `encode=false` bypasses
/// decoding entirely.
struct FailingDecoder;

#[async_trait]
impl AudioDecoder for FailingDecoder {
    async fn decode(&self, _data: &[u8]) -> Result<AudioSample, DecodeError> {
        Err(DecodeError::Failed("decoder should not run".to_string()))
    }
}

struct MockMelExtractor;

impl MelExtractor for MockMelExtractor {
    fn log_mel(&self, audio: &AudioSample) -> Result<MelSpectrogram, ModelError> {
        Ok(MelSpectrogram {
            data: audio.samples().to_vec(),
            n_mel: 1,
        })
    }
}

struct MockModel;

impl SpeechModel for MockModel {
    fn transcribe(
        &mut self,
        _audio: &AudioSample,
        options: &TranscriptionOptions,
    ) -> Result<TranscriptionResult, ModelError> {
        Ok(TranscriptionResult {
            text: "hello world".to_string(),
            segments: vec![],
            language: options.language.clone(),
        })
    }

    fn mel_extractor(&self) -> Arc<dyn MelExtractor> {
        Arc::new(MockMelExtractor)
    }

    fn detect_language(&mut self, _mel: &MelSpectrogram) -> Result<Vec<LanguageScore>, ModelError> {
        Ok(vec![
            LanguageScore {
                code: "en".to_string(),
                probability: 0.9,
            },
            LanguageScore {
                code: "de".to_string(),
                probability: 0.1,
            },
        ])
    }
}

fn create_test_app() -> axum::Router {
    app_with_decoder(Arc::new(MockDecoder))
}

fn app_with_decoder<D: AudioDecoder + 'static>(decoder: Arc<D>) -> axum::Router {
    let speech_service = Arc::new(SpeechService::new(
        Arc::new(MockFetcher),
        decoder,
        Arc::new(ModelGateway::new(MockModel)),
    ));

    let state = AppState {
        speech_service,
        model_name: "base".to_string(),
    };

    create_router(state)
}

async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn given_running_server_when_health_check_then_reports_model() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model"], "base");
}

#[tokio::test]
async fn given_single_item_when_asr_then_returns_indexed_result() {
    let app = create_test_app();

    let (status, json) = post_json(
        app,
        "/asr",
        r#"{"data":[[0,"transcribe",null,"https://host/a.wav",true]]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0][0], 0);
    assert_eq!(json["data"][0][1]["text"], "hello world");
}

#[tokio::test]
async fn given_unordered_indices_when_asr_then_input_order_is_preserved() {
    let app = create_test_app();

    let (status, json) = post_json(
        app,
        "/asr",
        r#"{"data":[
            [3,"transcribe",null,"https://host/a.wav",true],
            [1,"translate","de","https://host/b.wav",true],
            [2,null,null,"https://host/c.wav",true]
        ]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let indices: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry[0].as_i64().unwrap())
        .collect();
    assert_eq!(indices, vec![3, 1, 2]);
}

#[tokio::test]
async fn given_failing_middle_item_when_asr_then_whole_batch_errors() {
    let app = create_test_app();

    let (status, json) = post_json(
        app,
        "/asr",
        r#"{"data":[
            [1,"transcribe",null,"https://host/a.wav",true],
            [2,"transcribe",null,"https://host/missing.wav",true],
            [3,"transcribe",null,"https://host/c.wav",true]
        ]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("404"));
    assert!(json.get("data").is_none());
}

#[tokio::test]
async fn given_raw_pcm_item_when_encode_false_then_decoder_is_bypassed() {
    // A decoder that errors on any call: success proves it never ran.
    let app = app_with_decoder(Arc::new(FailingDecoder));

    let (status, json) = post_json(
        app,
        "/asr",
        r#"{"data":[[0,"transcribe",null,"https://host/raw.pcm",false]]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0][1]["text"], "hello world");
}

#[tokio::test]
async fn given_single_item_when_detect_language_then_returns_name_and_code() {
    let app = create_test_app();

    let (status, json) = post_json(
        app,
        "/detect-language",
        r#"{"data":[[0,"https://host/a.wav",true]]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0][0], 0);
    assert_eq!(json["data"][0][1]["detected_language"], "english");
    assert_eq!(json["data"][0][1]["language_code"], "en");
}

#[tokio::test]
async fn given_failing_item_when_detect_language_then_whole_batch_errors() {
    let app = create_test_app();

    let (status, json) = post_json(
        app,
        "/detect-language",
        r#"{"data":[[0,"https://host/missing.wav",true]]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn given_malformed_body_when_asr_then_returns_client_error() {
    let app = create_test_app();

    let (status, _) = post_json(app, "/asr", "not json at all").await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn given_wrong_item_shape_when_detect_language_then_returns_client_error() {
    let app = create_test_app();

    // Transcription-shaped tuple posted to the detection endpoint.
    let (status, _) = post_json(
        app,
        "/detect-language",
        r#"{"data":[[0,"transcribe",null,"https://host/a.wav",true]]}"#,
    )
    .await;

    assert!(status.is_client_error());
}
