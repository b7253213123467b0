//! End-to-end tests for the session WebSocket
//!
//! A real server is bound to an ephemeral port with scripted speech and
//! translation backends, and driven with a tokio-tungstenite client.
//!
//! Run: cargo test --test session_e2e

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use vaani_gateway::handlers::session::{IDLE_MESSAGE, MAX_AUDIO_PAYLOAD_SIZE};
use vaani_gateway::{
    AppState, Backends, RecognitionError, RecognitionProfile, ServerConfig, SpeechAlternative,
    SpeechRecognizer, SpeechSegment, TranslationError, Translator, routes,
};

type Client = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

mod common {
    use super::*;

    /// Recognizer answering every call with the same transcript, or with
    /// nothing for the primary language when `silent_primary` is set
    pub struct ScriptedSpeech {
        pub transcript: &'static str,
        pub confidence: f32,
        pub silent_primary: bool,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeechRecognizer for ScriptedSpeech {
        async fn recognize(
            &self,
            _audio: &[u8],
            profile: &RecognitionProfile,
        ) -> Result<Vec<SpeechSegment>, RecognitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.silent_primary && profile.language_code == "ne-NP" {
                return Ok(Vec::new());
            }
            Ok(vec![SpeechSegment {
                alternatives: vec![SpeechAlternative {
                    transcript: self.transcript.to_string(),
                    confidence: self.confidence,
                }],
                language_code: Some(profile.language_code.to_lowercase()),
            }])
        }
    }

    /// Recognizer that names the payload size as its transcript and stalls on
    /// payloads of `slow_len` bytes
    pub struct PacedSpeech {
        pub slow_len: usize,
        pub delay: Duration,
        pub calls: AtomicUsize,
    }

    impl PacedSpeech {
        pub fn new(slow_len: usize, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                slow_len,
                delay,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SpeechRecognizer for PacedSpeech {
        async fn recognize(
            &self,
            audio: &[u8],
            _profile: &RecognitionProfile,
        ) -> Result<Vec<SpeechSegment>, RecognitionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if audio.len() == self.slow_len {
                tokio::time::sleep(self.delay).await;
            }
            Ok(vec![SpeechSegment {
                alternatives: vec![SpeechAlternative {
                    transcript: format!("{} bytes", audio.len()),
                    confidence: 0.9,
                }],
                language_code: None,
            }])
        }
    }

    pub struct EchoTranslator;

    #[async_trait]
    impl Translator for EchoTranslator {
        async fn translate(
            &self,
            text: &str,
            _source: &str,
            target: &str,
        ) -> Result<String, TranslationError> {
            Ok(format!("[{target}] {text}"))
        }

        async fn supported_languages(&self) -> Result<Vec<String>, TranslationError> {
            Ok(vec!["en".to_string(), "ne".to_string()])
        }
    }

    pub fn create_test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            secret_key: Some(zeroize::Zeroizing::new("e2e-secret".to_string())),
            google_credentials_path: PathBuf::from("/nonexistent/google-credentials.json"),
            ..Default::default()
        }
    }

    pub fn scripted_backends(speech: Arc<dyn SpeechRecognizer>) -> Backends {
        Backends {
            speech,
            translator: Arc::new(EchoTranslator),
        }
    }

    pub fn speech(transcript: &'static str, confidence: f32) -> Arc<ScriptedSpeech> {
        Arc::new(ScriptedSpeech {
            transcript,
            confidence,
            silent_primary: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub async fn start_test_server(backends: Option<Backends>) -> SocketAddr {
        start_server_with_config(create_test_config(), backends).await
    }

    pub async fn start_server_with_config(
        config: ServerConfig,
        backends: Option<Backends>,
    ) -> SocketAddr {
        let app_state = AppState::with_backends(config, backends);
        let app = routes::create_router(app_state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get address");

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .ok();
        });

        addr
    }

    pub async fn connect(addr: SocketAddr, session: Option<&str>) -> Client {
        let url = match session {
            Some(token) => format!("ws://{addr}/ws?session={token}"),
            None => format!("ws://{addr}/ws"),
        };
        let (ws, _) = timeout(Duration::from_secs(5), connect_async(&url))
            .await
            .expect("connect timed out")
            .expect("connect failed");
        ws
    }

    /// Complete recording request of `len` zero bytes
    pub fn recording(len: usize) -> Value {
        json!({"event": "complete_audio_data", "data": {"audio": audio_payload(len), "duration": 3000}})
    }

    /// Next text frame as JSON
    pub async fn next_event(ws: &mut Client) -> Value {
        loop {
            let msg = timeout(Duration::from_secs(5), ws.next())
                .await
                .expect("timed out waiting for event")
                .expect("stream ended")
                .expect("websocket error");
            if let Message::Text(text) = msg {
                let text_str: &str = &text;
                return serde_json::from_str(text_str).expect("server sent invalid JSON");
            }
        }
    }

    pub async fn send_json(ws: &mut Client, value: Value) {
        ws.send(Message::Text(value.to_string().into()))
            .await
            .expect("send failed");
    }

    /// Base64 of `len` bytes of silence
    pub fn audio_payload(len: usize) -> String {
        base64::engine::general_purpose::STANDARD.encode(vec![0u8; len])
    }
}

use common::*;

#[tokio::test]
async fn test_connect_sends_status_with_session_token() {
    let addr = start_test_server(None).await;
    let mut ws = connect(addr, None).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "status");
    assert_eq!(event["data"]["message"], "Connected to server");

    let token = event["data"]["session_id"].as_str().unwrap();
    let (id, mac) = token.rsplit_once('.').unwrap();
    assert!(uuid::Uuid::parse_str(id).is_ok());
    assert_eq!(mac.len(), 64);
}

#[tokio::test]
async fn test_complete_audio_full_flow() {
    let speech = speech("नमस्ते", 0.92);
    let addr = start_test_server(Some(scripted_backends(speech.clone()))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    send_json(
        &mut ws,
        json!({"event": "complete_audio_data", "data": {"audio": audio_payload(4000), "duration": 3200}}),
    )
    .await;

    let processing = next_event(&mut ws).await;
    assert_eq!(processing["event"], "interim_result");
    assert_eq!(processing["data"]["message"], "Processing audio...");

    let translating = next_event(&mut ws).await;
    assert_eq!(translating["event"], "interim_result");
    assert_eq!(translating["data"]["transcript"], "नमस्ते");
    assert_eq!(translating["data"]["message"], "Translating...");

    let result = next_event(&mut ws).await;
    assert_eq!(result["event"], "transcription_result");
    assert_eq!(result["data"]["transcript"], "नमस्ते");
    assert_eq!(result["data"]["translation"], "[en] नमस्ते");
    assert_eq!(result["data"]["low_confidence"], false);
    let confidence = result["data"]["confidence"].as_f64().unwrap();
    assert!((confidence - 0.92).abs() < 1e-4);

    assert_eq!(speech.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fallback_notice_is_sent() {
    let speech = Arc::new(ScriptedSpeech {
        transcript: "hello",
        confidence: 0.8,
        silent_primary: true,
        calls: AtomicUsize::new(0),
    });
    let addr = start_test_server(Some(scripted_backends(speech.clone()))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    send_json(
        &mut ws,
        json!({"event": "complete_audio_data", "data": {"audio": audio_payload(4000)}}),
    )
    .await;

    assert_eq!(next_event(&mut ws).await["data"]["message"], "Processing audio...");
    assert_eq!(next_event(&mut ws).await["data"]["message"], "Trying with English...");
    assert_eq!(next_event(&mut ws).await["data"]["message"], "Translating...");
    let result = next_event(&mut ws).await;
    assert_eq!(result["event"], "transcription_result");
    assert_eq!(result["data"]["transcript"], "hello");

    assert_eq!(speech.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_short_recording_reports_no_speech() {
    let speech = speech("unused", 0.9);
    let addr = start_test_server(Some(scripted_backends(speech.clone()))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    send_json(
        &mut ws,
        json!({"event": "complete_audio_data", "data": {"audio": audio_payload(200), "duration": 100}}),
    )
    .await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "interim_result");
    assert_eq!(event["data"]["transcript"], "");
    assert_eq!(event["data"]["translation"], "");
    assert_eq!(
        event["data"]["message"],
        "No speech detected (recording too short)"
    );
    assert_eq!(speech.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_not_initialized_error() {
    let addr = start_test_server(None).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    send_json(
        &mut ws,
        json!({"event": "complete_audio_data", "data": {"audio": audio_payload(4000)}}),
    )
    .await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(
        event["data"]["message"],
        "Google Cloud services not initialized"
    );
}

#[tokio::test]
async fn test_invalid_json_keeps_session_open() {
    let addr = start_test_server(Some(scripted_backends(speech("ठीक छ", 0.7)))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    ws.send(Message::Text("{not json".to_string().into()))
        .await
        .unwrap();

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert!(
        event["data"]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid message format:")
    );

    // The same connection still serves requests
    send_json(
        &mut ws,
        json!({"event": "audio_data", "data": {"audio": audio_payload(2000)}}),
    )
    .await;
    let result = next_event(&mut ws).await;
    assert_eq!(result["event"], "transcription_result");
    assert_eq!(result["data"]["transcript"], "ठीक छ");
    assert!(result["data"].get("low_confidence").is_none());
}

#[tokio::test]
async fn test_requests_are_answered_in_order() {
    let speech = PacedSpeech::new(4000, Duration::from_millis(400));
    let addr = start_test_server(Some(scripted_backends(speech.clone()))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    // The first recording stalls in the recognizer; the second is quick
    send_json(&mut ws, recording(4000)).await;
    send_json(&mut ws, recording(2000)).await;

    let mut events = Vec::new();
    for _ in 0..6 {
        events.push(next_event(&mut ws).await);
    }

    let summary: Vec<(String, String)> = events
        .iter()
        .map(|e| {
            let text = e["data"]["transcript"]
                .as_str()
                .or(e["data"]["message"].as_str())
                .unwrap_or_default();
            (e["event"].as_str().unwrap().to_string(), text.to_string())
        })
        .collect();

    let expected: Vec<(String, String)> = [
        ("interim_result", "Processing audio..."),
        ("interim_result", "4000 bytes"),
        ("transcription_result", "4000 bytes"),
        ("interim_result", "Processing audio..."),
        ("interim_result", "2000 bytes"),
        ("transcription_result", "2000 bytes"),
    ]
    .iter()
    .map(|(event, text)| (event.to_string(), text.to_string()))
    .collect();

    assert_eq!(summary, expected);
    assert_eq!(speech.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_queued_requests_dropped_after_disconnect() {
    let speech = PacedSpeech::new(4000, Duration::from_millis(500));
    let addr = start_test_server(Some(scripted_backends(speech.clone()))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    send_json(&mut ws, recording(4000)).await;
    send_json(&mut ws, recording(2000)).await;
    send_json(&mut ws, recording(3000)).await;
    ws.close(None).await.ok();
    drop(ws);

    // Long enough for the stalled request and both queued ones to finish
    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(speech.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_oversized_recording_keeps_session() {
    let addr = start_test_server(Some(scripted_backends(speech("ठूलो", 0.8)))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    let oversized = "A".repeat(MAX_AUDIO_PAYLOAD_SIZE + 4);
    send_json(
        &mut ws,
        json!({"event": "complete_audio_data", "data": {"audio": oversized, "duration": 240000}}),
    )
    .await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(
        event["data"]["message"],
        "Audio too long. Please record a shorter message."
    );

    send_json(&mut ws, recording(4000)).await;
    assert_eq!(next_event(&mut ws).await["data"]["message"], "Processing audio...");
    assert_eq!(next_event(&mut ws).await["data"]["message"], "Translating...");
    let result = next_event(&mut ws).await;
    assert_eq!(result["event"], "transcription_result");
    assert_eq!(result["data"]["transcript"], "ठूलो");
}

#[tokio::test]
async fn test_fractional_duration_is_accepted() {
    let addr = start_test_server(Some(scripted_backends(speech("ठीक", 0.8)))).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    send_json(
        &mut ws,
        json!({"event": "complete_audio_data", "data": {"audio": audio_payload(4000), "duration": 3210.5}}),
    )
    .await;

    assert_eq!(next_event(&mut ws).await["data"]["message"], "Processing audio...");
}

#[tokio::test]
async fn test_idle_session_is_closed() {
    let config = ServerConfig {
        idle_timeout_seconds: 1,
        ..create_test_config()
    };
    let addr = start_server_with_config(config, None).await;
    let mut ws = connect(addr, None).await;
    next_event(&mut ws).await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["event"], "error");
    assert_eq!(event["data"]["message"], IDLE_MESSAGE);

    // Nothing but the close handshake follows
    let rest = timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for close");
    match rest {
        Some(Ok(Message::Close(_))) | None | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("unexpected frame after idle notice: {other:?}"),
    }
}

#[tokio::test]
async fn test_resume_with_valid_token_keeps_session() {
    let addr = start_test_server(None).await;

    let mut first = connect(addr, None).await;
    let token = next_event(&mut first).await["data"]["session_id"]
        .as_str()
        .unwrap()
        .to_string();
    first.close(None).await.ok();

    let mut resumed = connect(addr, Some(&token)).await;
    let event = next_event(&mut resumed).await;
    assert_eq!(event["data"]["session_id"], token.as_str());

    let forged = format!("{}.{}", uuid::Uuid::new_v4(), "00".repeat(32));
    let mut fresh = connect(addr, Some(&forged)).await;
    let event = next_event(&mut fresh).await;
    let new_token = event["data"]["session_id"].as_str().unwrap();
    assert_ne!(new_token, forged);
    assert_ne!(new_token, token);
}
