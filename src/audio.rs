//! Synthesized audio and the per-session resource store.
//!
//! A successful synthesis is registered in an [`AudioStore`] and handed out
//! as an [`AudioResource`]: a small handle carrying a locator, not the bytes.
//! Revoking the handle frees the buffer; a revoked locator no longer resolves.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;

/// Container format of synthesized audio. Inference endpoints answer with
/// WAV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Wav,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
        }
    }
}

/// Raw synthesized audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub data: Bytes,
    pub format: AudioFormat,
}

impl AudioClip {
    /// Inference endpoints answer with WAV regardless of the declared
    /// content type, so the body is always treated as WAV.
    pub fn wav(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            format: AudioFormat::Wav,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when the buffer starts with a RIFF/WAVE header.
    pub fn has_riff_header(&self) -> bool {
        self.data.len() >= 12 && &self.data[0..4] == b"RIFF" && &self.data[8..12] == b"WAVE"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to an audio buffer held by an [`AudioStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioResource {
    id: ResourceId,
    locator: String,
    byte_len: usize,
    format: AudioFormat,
}

impl AudioResource {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Addressable name, e.g. `blob:text2vox/3`.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }
}

/// Registry of live audio buffers, keyed by resource id.
#[derive(Debug, Clone, Default)]
pub struct AudioStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    next_id: AtomicU64,
    clips: Mutex<HashMap<ResourceId, AudioClip>>,
}

pub const LOCATOR_PREFIX: &str = "blob:text2vox/";

impl AudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, clip: AudioClip) -> AudioResource {
        let id = ResourceId(self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let resource = AudioResource {
            id,
            locator: format!("{}{}", LOCATOR_PREFIX, id),
            byte_len: clip.len(),
            format: clip.format,
        };
        self.clips().insert(id, clip);
        resource
    }

    /// Frees the buffer behind `resource`. Returns false if it was already gone.
    pub fn revoke(&self, resource: &AudioResource) -> bool {
        self.clips().remove(&resource.id).is_some()
    }

    pub fn resolve(&self, resource: &AudioResource) -> Option<AudioClip> {
        self.clips().get(&resource.id).cloned()
    }

    pub fn resolve_locator(&self, locator: &str) -> Option<AudioClip> {
        let id = locator.strip_prefix(LOCATOR_PREFIX)?.parse::<u64>().ok()?;
        self.clips().get(&ResourceId(id)).cloned()
    }

    /// Number of buffers currently held.
    pub fn live(&self) -> usize {
        self.clips().len()
    }

    fn clips(&self) -> std::sync::MutexGuard<'_, HashMap<ResourceId, AudioClip>> {
        // Map entries are plain data; a panic elsewhere cannot leave them torn.
        self.inner
            .clips
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
