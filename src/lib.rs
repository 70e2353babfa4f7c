//! # text2vox
//!
//! Turns typed text into speech through hosted text-to-speech inference
//! endpoints, and keeps the resulting WAV audio around for playback or
//! download.
//!
//! ## Overview
//!
//! The center of the crate is the [`SpeechController`]: it validates the
//! input, sends a single `POST {"inputs": "..."}` to the selected
//! [`VoiceModel`], and settles into exactly one of three outcomes: playable
//! audio, a validation failure, or a generic remote failure.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use text2vox::{Config, RequestState, SpeechController};
//!
//! #[tokio::main]
//! async fn main() -> text2vox::Result<()> {
//!     let config = Config::from_env()?;
//!     let controller = SpeechController::new(&config)?;
//!
//!     if let RequestState::Succeeded(audio) = controller.submit("Hello world").await {
//!         println!("{} bytes at {}", audio.byte_len(), audio.locator());
//!         controller.download(".").await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`controller`] | Request state machine and session-owned audio |
//! | [`transport`] | `SynthesisBackend` seam and the reqwest implementation |
//! | [`models`] | Voice model registry |
//! | [`audio`] | Audio clips and the resource store |
//! | [`config`] | Startup configuration |
//! | [`backdrop`] | Decorative time-driven visualizer |

pub mod audio;
pub mod backdrop;
pub mod config;
pub mod controller;
pub mod models;
pub mod transport;

pub use audio::{AudioClip, AudioFormat, AudioResource, AudioStore};
pub use config::{Config, ConfigBuilder, Credential};
pub use controller::{Failure, RequestState, SpeechController, Ticket, DEFAULT_DOWNLOAD_NAME};
pub use models::{ModelRegistry, VoiceModel};
pub use transport::{HttpSynthesisBackend, SynthesisBackend, SynthesisRequest};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};
