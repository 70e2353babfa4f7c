//! Mock inference server setup for integration tests

#![allow(dead_code)]

use mockito::{Matcher, Mock, Server, ServerGuard};
use text2vox::{Config, ModelRegistry, SpeechController, VoiceModel};
use url::Url;

pub const API_KEY: &str = "test-key";
pub const VITS_PATH: &str = "/models/espnet/kan-bayashi_ljspeech_vits";
pub const MMS_PATH: &str = "/models/facebook/mms-tts-eng";

/// Test fixture that serves both voice models from one mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Same two models as the built-in registry, pointed at the mock server
    pub fn registry(&self) -> ModelRegistry {
        ModelRegistry::new(vec![
            VoiceModel::new(
                "ESPNET - VITS",
                Url::parse(&format!("{}{}", self.base_url, VITS_PATH)).unwrap(),
                "Clear and natural English voice",
                "English",
            ),
            VoiceModel::new(
                "Facebook - MMS TTS",
                Url::parse(&format!("{}{}", self.base_url, MMS_PATH)).unwrap(),
                "High quality English speech",
                "English",
            ),
        ])
        .unwrap()
    }

    pub fn controller(&self) -> SpeechController {
        let config = Config::builder()
            .api_key(API_KEY)
            .models(self.registry())
            .build()
            .unwrap();
        SpeechController::new(&config).unwrap()
    }

    /// Expect exactly `hits` synthesis calls carrying `text`, answered with audio
    pub async fn mock_audio(&mut self, path: &str, text: &str, body: &[u8], hits: usize) -> Mock {
        self.server
            .mock("POST", path)
            .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({ "inputs": text })))
            .with_status(200)
            .with_header("content-type", "audio/wav")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Create a mock for an error response
    pub async fn mock_status(&mut self, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// A mock that must never be hit
    pub async fn mock_untouched(&mut self, path: &str) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(200)
            .expect(0)
            .create_async()
            .await
    }
}

/// A WAV header followed by `samples` bytes of silence.
pub fn wav_bytes(samples: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(44 + samples);
    data.extend_from_slice(b"RIFF");
    data.extend_from_slice(&((36 + samples) as u32).to_le_bytes());
    data.extend_from_slice(b"WAVEfmt ");
    data.extend_from_slice(&16u32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&16_000u32.to_le_bytes());
    data.extend_from_slice(&16_000u32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&8u16.to_le_bytes());
    data.extend_from_slice(b"data");
    data.extend_from_slice(&(samples as u32).to_le_bytes());
    data.resize(44 + samples, 0x80);
    data
}
