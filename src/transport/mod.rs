//! Outbound synthesis calls.
//!
//! [`SynthesisBackend`] is the seam between the controller and the network;
//! [`HttpSynthesisBackend`] is the production implementation.

mod http;

pub use http::{HttpSynthesisBackend, TransportError};

use async_trait::async_trait;
use serde::Serialize;

use crate::audio::AudioClip;
use crate::models::VoiceModel;
use crate::Result;

/// One synthesis call: the text exactly as entered, and the model it goes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub model: VoiceModel,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, model: VoiceModel) -> Self {
        Self {
            text: text.into(),
            model,
        }
    }

    pub fn payload(&self) -> SynthesisPayload<'_> {
        SynthesisPayload { inputs: &self.text }
    }
}

/// JSON body sent to the inference endpoint: `{"inputs": "..."}`.
#[derive(Debug, Serialize)]
pub struct SynthesisPayload<'a> {
    pub inputs: &'a str,
}

/// Something that can turn a [`SynthesisRequest`] into audio.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioClip>;
}
