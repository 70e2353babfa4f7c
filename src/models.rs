//! Voice model registry.
//!
//! A model is identified by its endpoint. The registry is fixed once the
//! process has started: either the two built-in models or a YAML catalog
//! named by `TTS_MODELS_FILE`.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::MODELS_FILE_VAR;
use crate::{Error, ErrorContext, Result};

/// A hosted text-to-speech endpoint the user can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceModel {
    pub name: String,
    pub endpoint: Url,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
}

impl VoiceModel {
    pub fn new(
        name: impl Into<String>,
        endpoint: Url,
        description: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint,
            description: description.into(),
            language: language.into(),
        }
    }

    /// Endpoint identity comparison; `candidate` is parsed so trivially
    /// different spellings of the same URL still match.
    pub fn is_endpoint(&self, candidate: &str) -> bool {
        match Url::parse(candidate.trim()) {
            Ok(url) => url == self.endpoint,
            Err(_) => false,
        }
    }
}

const BUILTIN: [(&str, &str, &str, &str); 2] = [
    (
        "ESPNET - VITS",
        "https://api-inference.huggingface.co/models/espnet/kan-bayashi_ljspeech_vits",
        "Clear and natural English voice",
        "English",
    ),
    (
        "Facebook - MMS TTS",
        "https://api-inference.huggingface.co/models/facebook/mms-tts-eng",
        "High quality English speech",
        "English",
    ),
];

#[derive(Debug, Deserialize)]
struct Catalog {
    models: Vec<VoiceModel>,
}

/// Ordered, non-empty list of voice models with unique endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistry {
    models: Vec<VoiceModel>,
}

impl ModelRegistry {
    pub fn builtin() -> Self {
        let models = BUILTIN
            .iter()
            .map(|(name, endpoint, description, language)| {
                let endpoint = Url::parse(endpoint).expect("built-in endpoint is a valid URL");
                VoiceModel::new(*name, endpoint, *description, *language)
            })
            .collect();
        Self { models }
    }

    pub fn new(models: Vec<VoiceModel>) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::configuration_with_context(
                "model catalog is empty",
                ErrorContext::new().with_source("model_registry"),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (i, model) in models.iter().enumerate() {
            if !matches!(model.endpoint.scheme(), "http" | "https") {
                return Err(Error::configuration_with_context(
                    format!("unsupported endpoint scheme '{}'", model.endpoint.scheme()),
                    ErrorContext::new()
                        .with_field_path(format!("models[{}].endpoint", i))
                        .with_source("model_registry"),
                ));
            }
            if !seen.insert(model.endpoint.as_str()) {
                return Err(Error::configuration_with_context(
                    format!("duplicate endpoint {}", model.endpoint),
                    ErrorContext::new()
                        .with_field_path(format!("models[{}].endpoint", i))
                        .with_source("model_registry"),
                ));
            }
        }

        Ok(Self { models })
    }

    /// Parses `models: [{name, endpoint, description, language}]`.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let catalog: Catalog = serde_yaml::from_str(raw)?;
        Self::new(catalog.models)
    }

    /// Reads and validates a YAML catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read model catalog: {}", e),
                ErrorContext::new()
                    .with_field_path(MODELS_FILE_VAR)
                    .with_details(path.display().to_string())
                    .with_source("model_registry"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    /// First entry; the selection a fresh session starts with.
    pub fn default_model(&self) -> &VoiceModel {
        &self.models[0]
    }

    pub fn get(&self, index: usize) -> Option<&VoiceModel> {
        self.models.get(index)
    }

    pub fn find_by_endpoint(&self, endpoint: &str) -> Option<&VoiceModel> {
        self.models.iter().find(|m| m.is_endpoint(endpoint))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&VoiceModel> {
        let name = name.trim();
        self.models
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Resolves a user-typed selector: 1-based index, name, or endpoint.
    pub fn resolve(&self, selector: &str) -> Option<&VoiceModel> {
        if let Ok(n) = selector.trim().parse::<usize>() {
            return n.checked_sub(1).and_then(|i| self.get(i));
        }
        self.find_by_name(selector)
            .or_else(|| self.find_by_endpoint(selector))
    }

    pub fn iter(&self) -> impl Iterator<Item = &VoiceModel> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_builtin_registry() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.default_model().name, "ESPNET - VITS");
        assert_eq!(
            registry.get(1).unwrap().endpoint.as_str(),
            "https://api-inference.huggingface.co/models/facebook/mms-tts-eng"
        );
        assert!(registry.iter().all(|m| m.language == "English"));
    }

    #[test]
    fn test_resolve_by_index_name_and_endpoint() {
        let registry = ModelRegistry::builtin();
        assert_eq!(registry.resolve("2").unwrap().name, "Facebook - MMS TTS");
        assert_eq!(registry.resolve("espnet - vits").unwrap().name, "ESPNET - VITS");
        assert_eq!(
            registry
                .resolve("https://api-inference.huggingface.co/models/facebook/mms-tts-eng")
                .unwrap()
                .name,
            "Facebook - MMS TTS"
        );
        assert!(registry.resolve("0").is_none());
        assert!(registry.resolve("3").is_none());
        assert!(registry.resolve("not a model").is_none());
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let raw = r#"
models:
  - name: A
    endpoint: https://example.com/tts
  - name: B
    endpoint: https://example.com/tts
"#;
        let err = ModelRegistry::from_yaml_str(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("models[1].endpoint")
        );
    }

    #[test]
    fn test_catalog_rejects_empty_and_bad_scheme() {
        assert!(ModelRegistry::from_yaml_str("models: []").is_err());
        let raw = "models:\n  - name: F\n    endpoint: ftp://example.com/tts\n";
        assert!(ModelRegistry::from_yaml_str(raw).is_err());
    }

    #[test]
    fn test_catalog_malformed_yaml_is_configuration_kind() {
        let err = ModelRegistry::from_yaml_str("models: {not: [a list").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.user_message().contains(MODELS_FILE_VAR));
    }

    #[test]
    fn test_empty_catalog_does_not_blame_the_credential() {
        let err = ModelRegistry::from_yaml_str("models: []").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_ne!(err.user_message(), ErrorKind::MISSING_CREDENTIAL_MESSAGE);
        assert_eq!(
            err.user_message(),
            "The voice model catalog is invalid. Check TTS_MODELS_FILE and restart."
        );
    }

    #[test]
    fn test_from_path_reads_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models.yaml");
        std::fs::write(&path, "models:\n  - name: Local\n    endpoint: http://localhost:9000/tts\n")
            .unwrap();

        let registry = ModelRegistry::from_path(&path).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.default_model().name, "Local");
        assert_eq!(registry.default_model().description, "");
    }

    #[test]
    fn test_from_path_missing_file_names_the_variable() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelRegistry::from_path(dir.path().join("absent.yaml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some(MODELS_FILE_VAR)
        );
        assert!(err.context().unwrap().details.as_deref().unwrap().ends_with("absent.yaml"));
    }
}
