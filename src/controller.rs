//! Speech request controller.
//!
//! Owns the session's [`RequestState`] and drives one synthesis per submit:
//!
//! ```text
//! Idle -> (validate) -> InFlight -> Succeeded | Failed
//!   ^                                   |
//!   +------------- submit again --------+
//! ```
//!
//! Every submit takes a fresh [`Ticket`]. A response is applied only while
//! its ticket is still the newest one; anything older is dropped.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;

use crate::audio::{AudioClip, AudioResource, AudioStore};
use crate::config::Config;
use crate::models::{ModelRegistry, VoiceModel};
use crate::transport::{HttpSynthesisBackend, SynthesisBackend, SynthesisRequest};
use crate::{Error, ErrorContext, ErrorKind, Result};

/// File name used by [`SpeechController::download`].
pub const DEFAULT_DOWNLOAD_NAME: &str = "text2vox-audio.wav";

/// Sequence number tagged on each submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// Terminal failure of a submission, as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
}

impl Failure {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    pub fn message(&self) -> &'static str {
        self.kind.user_message()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight {
        ticket: Ticket,
        model: String,
    },
    Succeeded(AudioResource),
    Failed(Failure),
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight { .. })
    }

    pub fn resource(&self) -> Option<&AudioResource> {
        match self {
            RequestState::Succeeded(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<Failure> {
        match self {
            RequestState::Failed(failure) => Some(*failure),
            _ => None,
        }
    }
}

pub struct SpeechController {
    backend: Arc<dyn SynthesisBackend>,
    models: ModelRegistry,
    selected: Mutex<VoiceModel>,
    current: AtomicU64,
    state: watch::Sender<RequestState>,
    store: AudioStore,
}

impl SpeechController {
    /// Production controller talking HTTP to the configured models.
    pub fn new(config: &Config) -> Result<Self> {
        let backend = HttpSynthesisBackend::new(config)?;
        Ok(Self::with_backend(config.models.clone(), Arc::new(backend)))
    }

    pub fn with_backend(models: ModelRegistry, backend: Arc<dyn SynthesisBackend>) -> Self {
        let selected = models.default_model().clone();
        let (state, _) = watch::channel(RequestState::Idle);
        Self {
            backend,
            models,
            selected: Mutex::new(selected),
            current: AtomicU64::new(0),
            state,
            store: AudioStore::new(),
        }
    }

    /// Validates `text` and, if it is not blank, synthesizes it with the
    /// currently selected model. The text is sent exactly as given.
    ///
    /// Returns the state after this call's outcome was applied or discarded.
    pub async fn submit(&self, text: &str) -> RequestState {
        let model = self.selected_model();
        let blank = text.trim().is_empty();

        let mut ticket = Ticket(0);
        self.state.send_modify(|state| {
            ticket = Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1);
            self.release(state);
            *state = if blank {
                RequestState::Failed(Failure::new(ErrorKind::Validation))
            } else {
                RequestState::InFlight {
                    ticket,
                    model: model.name.clone(),
                }
            };
        });

        if blank {
            tracing::info!(ticket = ticket.get(), "rejected blank input");
            return self.state();
        }

        let request = SynthesisRequest::new(text, model);
        let outcome = self.backend.synthesize(&request).await;
        self.apply(ticket, &request, outcome);
        self.state()
    }

    fn apply(&self, ticket: Ticket, request: &SynthesisRequest, outcome: Result<AudioClip>) {
        self.state.send_if_modified(|state| {
            let current = self.current.load(Ordering::SeqCst);
            if current != ticket.get() {
                tracing::debug!(
                    ticket = ticket.get(),
                    current,
                    "discarding response for superseded request"
                );
                return false;
            }

            *state = match outcome {
                Ok(clip) => {
                    let resource = self.store.register(clip);
                    tracing::info!(
                        ticket = ticket.get(),
                        model = %request.model.name,
                        bytes = resource.byte_len(),
                        locator = resource.locator(),
                        "speech synthesized"
                    );
                    RequestState::Succeeded(resource)
                }
                Err(e) => {
                    tracing::warn!(
                        ticket = ticket.get(),
                        model = %request.model.name,
                        endpoint = %request.model.endpoint,
                        error = %e,
                        "speech synthesis failed"
                    );
                    RequestState::Failed(Failure::new(ErrorKind::Remote))
                }
            };
            true
        });
    }

    /// Selects a model by endpoint. Requests already sent keep their model.
    pub fn select_model(&self, endpoint: &str) -> Result<VoiceModel> {
        let model = self.models.find_by_endpoint(endpoint).ok_or_else(|| {
            Error::validation_with_context(
                format!("unknown model endpoint '{}'", endpoint),
                ErrorContext::new().with_source("controller"),
            )
        })?;
        self.set_selected(model.clone());
        Ok(model.clone())
    }

    /// Selects a model by 1-based index, name, or endpoint.
    pub fn select(&self, selector: &str) -> Result<VoiceModel> {
        let model = self.models.resolve(selector).ok_or_else(|| {
            Error::validation_with_context(
                format!("no model matches '{}'", selector),
                ErrorContext::new().with_source("controller"),
            )
        })?;
        self.set_selected(model.clone());
        Ok(model.clone())
    }

    fn set_selected(&self, model: VoiceModel) {
        tracing::debug!(model = %model.name, "model selected");
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner) = model;
    }

    pub fn selected_model(&self) -> VoiceModel {
        self.selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// The playable audio, if the last submission succeeded.
    pub fn audio(&self) -> Option<AudioClip> {
        let state = self.state.borrow();
        state.resource().and_then(|r| self.store.resolve(r))
    }

    /// Saves the audio as `dir/text2vox-audio.wav`. No-op unless succeeded.
    pub async fn download(&self, dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        self.download_to(dir.as_ref().join(DEFAULT_DOWNLOAD_NAME))
            .await
    }

    /// Saves the audio to `path`. No-op unless succeeded.
    pub async fn download_to(&self, path: impl Into<PathBuf>) -> Result<Option<PathBuf>> {
        let clip = match self.audio() {
            Some(clip) => clip,
            None => return Ok(None),
        };
        let path = path.into();
        tokio::fs::write(&path, &clip.data).await?;
        tracing::info!(path = %path.display(), bytes = clip.len(), "audio saved");
        Ok(Some(path))
    }

    /// Ends the session: drops held audio, returns to idle, and makes any
    /// pending response stale.
    pub fn close(&self) {
        self.state.send_modify(|state| {
            self.current.fetch_add(1, Ordering::SeqCst);
            self.release(state);
            *state = RequestState::Idle;
        });
    }

    /// Live audio buffers held for this session.
    pub fn live_resources(&self) -> usize {
        self.store.live()
    }

    fn release(&self, state: &RequestState) {
        if let RequestState::Succeeded(resource) = state {
            self.store.revoke(resource);
            tracing::debug!(locator = resource.locator(), "released audio resource");
        }
    }
}

impl Drop for SpeechController {
    fn drop(&mut self) {
        self.release(&self.state.borrow());
    }
}
